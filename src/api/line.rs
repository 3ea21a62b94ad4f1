use tracing::trace;

use crate::api::chart::{ChartInstance, HoverDatum, MarkLayout, MarkSet};
use crate::api::format::format_grouped;
use crate::core::{
    ChartKind, Color, Dataset, Dimension, GroupBy, PlotArea, RowFilter, aggregate_filtered,
    resolve_scales,
};
use crate::error::ChartResult;
use crate::interaction::TooltipContent;
use crate::render::{Attributes, ElementKind, ElementSpec};

const LINE_KEY: &str = "line";
const POINT_FILL: Color = Color::rgb_u8(0xff, 0x98, 0x00);
const POINT_HOVER_FILL: Color = Color::rgb_u8(0xff, 0xc1, 0x07);
const LINE_STROKE: Color = Color::rgb_u8(0x00, 0x7a, 0xcc);

/// Marks of the trend chart: the connecting path and one circle per year.
#[derive(Debug, Clone, PartialEq)]
pub enum TrendMark {
    Line { metric: String },
    Point { year: i32, value: f64, value_label: String },
}

impl HoverDatum for TrendMark {
    fn highlight(&self) -> Option<Attributes> {
        match self {
            Self::Line { .. } => None,
            Self::Point { .. } => Some(
                Attributes::new()
                    .with("r", 8.0)
                    .with("fill", POINT_HOVER_FILL),
            ),
        }
    }

    fn tooltip(&self) -> TooltipContent {
        match self {
            Self::Line { metric } => TooltipContent::new(metric.clone()),
            Self::Point {
                year,
                value,
                value_label,
            } => TooltipContent::new(year.to_string())
                .with_line(format!("{value_label}: {}", format_grouped(*value))),
        }
    }
}

/// Yearly totals of one metric joined by a line.
#[derive(Debug, Clone)]
pub struct LineLayout {
    dataset: Dataset,
    value_label: String,
}

pub type LineChart = ChartInstance<LineLayout>;

/// Element key of the circle drawn for `year`.
#[must_use]
pub fn point_key(year: i32) -> String {
    format!("point:{year}")
}

impl LineLayout {
    #[must_use]
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            value_label: "Fines".to_owned(),
        }
    }

    #[must_use]
    pub fn with_value_label(mut self, label: impl Into<String>) -> Self {
        self.value_label = label.into();
        self
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

impl MarkLayout for LineLayout {
    type Datum = TrendMark;

    fn kind(&self) -> ChartKind {
        ChartKind::Line
    }

    /// Defaults to the alphabetically first metric.
    fn effective_filter(&self, filter: &RowFilter) -> RowFilter {
        let mut filter = filter.clone();
        if filter.metric.is_none() {
            filter.metric = self.dataset.metrics().into_iter().next();
        }
        filter
    }

    fn layout(&self, filter: &RowFilter, plot: PlotArea) -> ChartResult<MarkSet<TrendMark>> {
        let rows = aggregate_filtered(
            self.dataset.rows(),
            filter,
            &GroupBy::single(Dimension::Year),
        );
        if rows.is_empty() {
            return Ok(MarkSet::empty());
        }

        let scales = resolve_scales(ChartKind::Line, &rows, plot, None)?;
        let (Some(axis), Some(value)) = (&scales.category, scales.value) else {
            return Ok(MarkSet::empty());
        };

        // Rows come back in year order, which is also the point scale's order.
        let points: Vec<(i32, f64, f64, f64)> = rows
            .iter()
            .filter_map(|row| {
                let category = row.primary()?;
                let year = category.as_year()?;
                let total = row.total_f64();
                Some((year, total, axis.position(category)?, value.map(total)))
            })
            .collect();

        let vertices: Vec<(f64, f64)> = points.iter().map(|&(_, _, x, y)| (x, y)).collect();
        let line_target = Attributes::new()
            .with("points", vertices)
            .with("stroke", LINE_STROKE)
            .with("stroke-width", 2.0)
            .with("opacity", 1.0);
        let line_zero = line_target.clone().with("opacity", 0.0);

        let mut specs = Vec::with_capacity(points.len() + 1);
        specs.push(ElementSpec::new(
            LINE_KEY,
            ElementKind::Path,
            TrendMark::Line {
                metric: filter.metric.clone().unwrap_or_default(),
            },
            line_target,
            line_zero,
        ));

        for (year, total, x, y) in points {
            let zero = Attributes::new()
                .with("cx", x)
                .with("cy", y)
                .with("r", 0.0)
                .with("fill", POINT_FILL)
                .with("stroke", Color::rgb(1.0, 1.0, 1.0))
                .with("stroke-width", 1.5);
            let target = zero.clone().with("r", 6.0);
            specs.push(ElementSpec::new(
                point_key(year),
                ElementKind::Circle,
                TrendMark::Point {
                    year,
                    value: total,
                    value_label: self.value_label.clone(),
                },
                target,
                zero,
            ));
        }

        trace!(points = specs.len() - 1, "laid out line chart");
        Ok(MarkSet {
            specs,
            scales: Some(scales),
            unresolved: 0,
        })
    }
}
