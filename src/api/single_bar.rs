use tracing::trace;

use crate::api::chart::{ChartInstance, HoverDatum, MarkLayout, MarkSet};
use crate::api::format::format_grouped;
use crate::core::{
    CategoryAxis, ChartKind, Color, Dataset, Dimension, GroupBy, NO_DATA, PlotArea, RowFilter,
    aggregate_filtered, resolve_scales,
};
use crate::error::ChartResult;
use crate::interaction::TooltipContent;
use crate::render::{Attributes, ElementKind, ElementSpec};

/// One horizontal bar: a metric and its summed value.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricBar {
    pub metric: String,
    pub value: f64,
    pub fill: Color,
    value_label: String,
}

impl HoverDatum for MetricBar {
    fn highlight(&self) -> Option<Attributes> {
        Some(
            Attributes::new()
                .with("fill", self.fill.darker(0.8))
                .with("stroke", Color::rgb(1.0, 1.0, 1.0))
                .with("stroke-width", 2.0),
        )
    }

    fn tooltip(&self) -> TooltipContent {
        TooltipContent::new(self.metric.clone()).with_line(format!(
            "{}: {}",
            self.value_label,
            format_grouped(self.value)
        ))
    }
}

/// Horizontal bars, one per metric, for the selected year.
#[derive(Debug, Clone)]
pub struct SingleBarLayout {
    dataset: Dataset,
    value_label: String,
}

pub type SingleBarChart = ChartInstance<SingleBarLayout>;

impl SingleBarLayout {
    #[must_use]
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            value_label: "Fines".to_owned(),
        }
    }

    /// Word shown before the value in the tooltip.
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

impl MarkLayout for SingleBarLayout {
    type Datum = MetricBar;

    fn kind(&self) -> ChartKind {
        ChartKind::SingleBar
    }

    /// Defaults to the earliest year in the data.
    fn effective_filter(&self, filter: &RowFilter) -> RowFilter {
        let mut filter = filter.clone();
        if filter.year.is_none() {
            filter.year = self.dataset.years().first().copied();
        }
        filter
    }

    fn layout(&self, filter: &RowFilter, plot: PlotArea) -> ChartResult<MarkSet<MetricBar>> {
        let rows = aggregate_filtered(
            self.dataset.rows(),
            filter,
            &GroupBy::single(Dimension::Metric),
        );
        if rows.is_empty() {
            return Ok(MarkSet::empty());
        }

        let scales = resolve_scales(ChartKind::SingleBar, &rows, plot, None)?;
        let (Some(CategoryAxis::Band(band)), Some(value), Some(color)) =
            (&scales.category, scales.value, &scales.color)
        else {
            return Ok(MarkSet::empty());
        };

        let mut specs = Vec::with_capacity(rows.len());
        for row in &rows {
            let Some(category) = row.primary() else {
                continue;
            };
            let Some(y) = band.position(category) else {
                continue;
            };
            let total = row.total_f64();
            let fill = color.color_for(category, total).unwrap_or(NO_DATA);
            let width = (value.map(total) - plot.left).max(0.0);

            let zero = Attributes::new()
                .with("x", plot.left)
                .with("y", y)
                .with("width", 0.0)
                .with("height", band.bandwidth())
                .with("fill", fill)
                .with("stroke-width", 0.0);
            let target = zero.clone().with("width", width);
            let metric = category.to_string();
            specs.push(ElementSpec::new(
                metric.clone(),
                ElementKind::Rect,
                MetricBar {
                    metric,
                    value: total,
                    fill,
                    value_label: self.value_label.clone(),
                },
                target,
                zero,
            ));
        }

        trace!(bars = specs.len(), "laid out single bar chart");
        Ok(MarkSet {
            specs,
            scales: Some(scales),
            unresolved: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::SingleBarLayout;
    use crate::api::chart::{HoverDatum, MarkLayout};
    use crate::core::{Dataset, Margins, NormalizedRow, PlotArea, RowFilter, Viewport};

    fn plot() -> PlotArea {
        PlotArea::from_viewport(Viewport::new(800, 400), Margins::new(40.0, 30.0, 50.0, 150.0))
            .expect("plot")
    }

    #[test]
    fn bars_share_the_left_edge_and_scale_with_value() {
        let layout = SingleBarLayout::new(Dataset::from_rows(vec![
            NormalizedRow::new(2023, "NSW", "Speeding", Decimal::from(100)),
            NormalizedRow::new(2023, "VIC", "Speeding", Decimal::from(100)),
            NormalizedRow::new(2023, "VIC", "Phone", Decimal::from(50)),
            NormalizedRow::new(2024, "VIC", "Phone", Decimal::from(999)),
        ]));
        let filter = layout.effective_filter(&RowFilter::all());
        assert_eq!(filter.year, Some(2023));

        let marks = layout.layout(&filter, plot()).expect("layout");
        assert_eq!(marks.specs.len(), 2);
        let width = |key: &str| {
            marks
                .specs
                .iter()
                .find(|spec| spec.key == key)
                .and_then(|spec| spec.target.number("width"))
                .expect("bar width")
        };
        assert!(width("Speeding") > width("Phone"));
        assert!(marks.specs.iter().all(|spec| spec.target.number("x") == Some(150.0)));
    }

    #[test]
    fn tooltip_groups_thousands() {
        let layout = SingleBarLayout::new(Dataset::from_rows(vec![NormalizedRow::new(
            2020,
            "NSW",
            "Speeding",
            Decimal::from(1_234_567),
        )]));
        let marks = layout
            .layout(&RowFilter::all().with_year(2020), plot())
            .expect("layout");
        let tooltip = marks.specs[0].datum.tooltip();
        assert_eq!(tooltip.title, "Speeding");
        assert_eq!(tooltip.lines, vec!["Fines: 1,234,567".to_owned()]);
    }
}
