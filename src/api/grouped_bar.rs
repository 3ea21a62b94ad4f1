use tracing::trace;

use crate::api::chart::{ChartInstance, HoverDatum, MarkLayout, MarkSet};
use crate::api::format::format_grouped;
use crate::core::{
    CategoryAxis, ChartKind, Color, Dataset, Dimension, NO_DATA, PlotArea, RowFilter,
    complete_grid, resolve_scales,
};
use crate::error::ChartResult;
use crate::interaction::TooltipContent;
use crate::render::{Attributes, ElementKind, ElementSpec};

/// One bar inside a jurisdiction group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedBar {
    pub jurisdiction: String,
    pub metric: String,
    pub value: f64,
    unit: String,
}

impl HoverDatum for GroupedBar {
    fn highlight(&self) -> Option<Attributes> {
        Some(
            Attributes::new()
                .with("fill-opacity", 1.0)
                .with("stroke", Color::rgb(1.0, 1.0, 1.0))
                .with("stroke-width", 1.5),
        )
    }

    fn tooltip(&self) -> TooltipContent {
        TooltipContent::new(self.metric.clone())
            .with_line(format!("{} {}", format_grouped(self.value), self.unit))
    }
}

/// Jurisdictions on the outer band, one bar per metric inside each group,
/// log value axis. Combinations missing from the data draw as zero-height bars.
#[derive(Debug, Clone)]
pub struct GroupedBarLayout {
    dataset: Dataset,
    unit: String,
}

pub type GroupedBarChart = ChartInstance<GroupedBarLayout>;

impl GroupedBarLayout {
    #[must_use]
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            unit: "detections".to_owned(),
        }
    }

    /// Noun shown after the value in the tooltip.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

impl MarkLayout for GroupedBarLayout {
    type Datum = GroupedBar;

    fn kind(&self) -> ChartKind {
        ChartKind::GroupedBar
    }

    fn effective_filter(&self, filter: &RowFilter) -> RowFilter {
        let mut filter = filter.clone();
        if filter.year.is_none() {
            filter.year = self.dataset.years().first().copied();
        }
        filter
    }

    fn layout(&self, filter: &RowFilter, plot: PlotArea) -> ChartResult<MarkSet<GroupedBar>> {
        let grid = complete_grid(
            self.dataset.rows(),
            filter,
            Dimension::Jurisdiction,
            Dimension::Metric,
        );
        let cells = grid.cells();
        if cells.is_empty() {
            return Ok(MarkSet::empty());
        }

        let scales = resolve_scales(ChartKind::GroupedBar, &cells, plot, None)?;
        let (Some(CategoryAxis::Band(outer)), Some(inner), Some(value), Some(color)) = (
            &scales.category,
            &scales.inner_category,
            scales.value,
            &scales.color,
        ) else {
            return Ok(MarkSet::empty());
        };
        let baseline = value.baseline();

        let mut specs = Vec::with_capacity(cells.len());
        for cell in &cells {
            let (Some(jurisdiction), Some(metric)) = (cell.key.first(), cell.key.get(1)) else {
                continue;
            };
            let (Some(group_x), Some(bar_x)) =
                (outer.position(jurisdiction), inner.position(metric))
            else {
                continue;
            };
            let total = cell.total_f64();
            let y = value.map(total).min(baseline);
            let fill = color.color_for(metric, total).unwrap_or(NO_DATA);

            let zero = Attributes::new()
                .with("x", group_x + bar_x)
                .with("y", baseline)
                .with("width", inner.bandwidth())
                .with("height", 0.0)
                .with("fill", fill)
                .with("fill-opacity", 0.7)
                .with("stroke-width", 0.0);
            let target = zero.clone().with("y", y).with("height", baseline - y);
            specs.push(ElementSpec::new(
                cell.key_string(),
                ElementKind::Rect,
                GroupedBar {
                    jurisdiction: jurisdiction.to_string(),
                    metric: metric.to_string(),
                    value: total,
                    unit: self.unit.clone(),
                },
                target,
                zero,
            ));
        }

        trace!(
            groups = grid.outer_categories.len(),
            bars = specs.len(),
            "laid out grouped bar chart"
        );
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

    use super::GroupedBarLayout;
    use crate::api::chart::MarkLayout;
    use crate::core::{Dataset, Margins, NormalizedRow, PlotArea, RowFilter, Viewport};

    #[test]
    fn missing_combinations_draw_as_flat_bars() {
        let layout = GroupedBarLayout::new(Dataset::from_rows(vec![
            NormalizedRow::new(2022, "NSW", "Cannabis", Decimal::from(120)),
            NormalizedRow::new(2022, "NSW", "Meth", Decimal::from(40)),
            NormalizedRow::new(2022, "VIC", "Cannabis", Decimal::from(300)),
        ]));
        let plot = PlotArea::from_viewport(
            Viewport::new(800, 500),
            Margins::new(40.0, 30.0, 100.0, 80.0),
        )
        .expect("plot");
        let marks = layout
            .layout(&layout.effective_filter(&RowFilter::all()), plot)
            .expect("layout");

        assert_eq!(marks.specs.len(), 4);
        let flat = marks
            .specs
            .iter()
            .find(|spec| spec.key == "VIC|Meth")
            .expect("zero-filled cell");
        assert_eq!(flat.target.number("height"), Some(0.0));

        let tall = marks
            .specs
            .iter()
            .find(|spec| spec.key == "VIC|Cannabis")
            .expect("cell");
        assert!(tall.target.number("height").expect("height") > 0.0);
    }
}
