use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::chart::{Chart, ChartRenderSummary};
use crate::core::{ChartKind, Dimension, DimensionValue, RowFilter};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{SharedTooltip, TooltipRegistry};
use crate::render::{Surface, TickSummary};

/// A filter control changed: `value` of `None` clears the dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterChange {
    pub dimension: Dimension,
    pub value: Option<DimensionValue>,
}

impl FilterChange {
    #[must_use]
    pub fn year(year: i32) -> Self {
        Self {
            dimension: Dimension::Year,
            value: Some(DimensionValue::Year(year)),
        }
    }

    #[must_use]
    pub fn metric(metric: impl Into<String>) -> Self {
        Self {
            dimension: Dimension::Metric,
            value: Some(DimensionValue::Text(metric.into())),
        }
    }

    #[must_use]
    pub fn jurisdiction(jurisdiction: impl Into<String>) -> Self {
        Self {
            dimension: Dimension::Jurisdiction,
            value: Some(DimensionValue::Text(jurisdiction.into())),
        }
    }

    #[must_use]
    pub fn clear(dimension: Dimension) -> Self {
        Self {
            dimension,
            value: None,
        }
    }

    /// Writes the change into `filter`.
    pub fn apply_to(&self, filter: &mut RowFilter) -> ChartResult<()> {
        match (self.dimension, &self.value) {
            (Dimension::Year, None) => filter.year = None,
            (Dimension::Year, Some(value)) => {
                filter.year = Some(value.as_year().ok_or_else(|| {
                    ChartError::InvalidData(format!("year filter needs a year, got `{value}`"))
                })?);
            }
            (Dimension::Metric, value) => filter.metric = text_value(value.as_ref()),
            (Dimension::Jurisdiction, value) => filter.jurisdiction = text_value(value.as_ref()),
        }
        Ok(())
    }
}

fn text_value(value: Option<&DimensionValue>) -> Option<String> {
    value.map(ToString::to_string)
}

struct Slot<S> {
    chart: Box<dyn Chart>,
    surface: S,
}

/// The page: one chart per kind, each with its own surface, one visible at a
/// time, all sharing a single tooltip.
pub struct Dashboard<S: Surface> {
    registry: TooltipRegistry,
    slots: IndexMap<ChartKind, Slot<S>>,
    active: Option<ChartKind>,
}

impl<S: Surface> Default for Dashboard<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Surface> Dashboard<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: TooltipRegistry::new(),
            slots: IndexMap::new(),
            active: None,
        }
    }

    /// Tooltip handle to build charts with; the same one on every call.
    #[must_use]
    pub fn tooltip(&self) -> SharedTooltip {
        self.registry.get_or_create()
    }

    /// Registers a chart; a chart of the same kind is replaced.
    pub fn add_chart(&mut self, chart: Box<dyn Chart>, surface: S) {
        let kind = chart.kind();
        if self.slots.insert(kind, Slot { chart, surface }).is_some() {
            warn!(kind = kind.label(), "replaced chart");
        }
    }

    #[must_use]
    pub fn active(&self) -> Option<ChartKind> {
        self.active
    }

    #[must_use]
    pub fn chart(&self, kind: ChartKind) -> Option<&dyn Chart> {
        self.slots.get(&kind).map(|slot| slot.chart.as_ref())
    }

    #[must_use]
    pub fn surface(&self, kind: ChartKind) -> Option<&S> {
        self.slots.get(&kind).map(|slot| &slot.surface)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ChartKind> + '_ {
        self.slots.keys().copied()
    }

    fn slot_mut(&mut self, kind: ChartKind) -> ChartResult<&mut Slot<S>> {
        self.slots.get_mut(&kind).ok_or_else(|| {
            ChartError::InvalidConfig(format!("no {} chart registered", kind.label()))
        })
    }

    /// Shows the chart of `kind` and draws it with its current filter.
    ///
    /// The chart that was visible before loses its hover and the tooltip is
    /// hidden.
    pub fn activate(&mut self, kind: ChartKind) -> ChartResult<ChartRenderSummary> {
        self.slot_mut(kind)?;
        if let Some(previous) = self.active.filter(|previous| *previous != kind) {
            let slot = self.slot_mut(previous)?;
            slot.chart.pointer_leave(&mut slot.surface)?;
        }
        if self.registry.is_created() {
            self.registry.get_or_create().hide();
        }

        let slot = self.slot_mut(kind)?;
        let filter = slot.chart.filter().clone();
        slot.chart.pointer_leave(&mut slot.surface)?;
        let summary = slot.chart.render(&mut slot.surface, &filter)?;
        self.active = Some(kind);
        debug!(kind = kind.label(), "activated chart");
        Ok(summary)
    }

    /// Routes a filter control change to the visible chart and redraws it.
    pub fn apply_filter(&mut self, change: &FilterChange) -> ChartResult<ChartRenderSummary> {
        let kind = self
            .active
            .ok_or_else(|| ChartError::InvalidConfig("no chart is active".to_owned()))?;
        let slot = self.slot_mut(kind)?;
        let mut filter = slot.chart.filter().clone();
        change.apply_to(&mut filter)?;
        slot.chart.render(&mut slot.surface, &filter)
    }

    /// Advances every chart's transitions, visible or not.
    pub fn tick(&mut self, dt: Duration) -> ChartResult<TickSummary> {
        let mut total = TickSummary::default();
        for slot in self.slots.values_mut() {
            let summary = slot.chart.tick(&mut slot.surface, dt)?;
            total.animating += summary.animating;
            total.removed += summary.removed;
        }
        Ok(total)
    }

    pub fn settle(&mut self) -> ChartResult<TickSummary> {
        self.tick(Duration::MAX)
    }

    pub fn pointer_enter(
        &mut self,
        kind: ChartKind,
        key: &str,
        pointer: (f64, f64),
    ) -> ChartResult<()> {
        let slot = self.slot_mut(kind)?;
        slot.chart.pointer_enter(&mut slot.surface, key, pointer)?;
        for (other, slot) in &mut self.slots {
            if *other != kind && slot.chart.sync_hover(&mut slot.surface)? {
                debug!(kind = other.label(), "hover taken over");
            }
        }
        Ok(())
    }

    pub fn pointer_move(&mut self, kind: ChartKind, pointer: (f64, f64)) -> ChartResult<()> {
        let slot = self.slot_mut(kind)?;
        slot.chart.pointer_move(&mut slot.surface, pointer)
    }

    pub fn pointer_leave(&mut self, kind: ChartKind) -> ChartResult<()> {
        let slot = self.slot_mut(kind)?;
        slot.chart.pointer_leave(&mut slot.surface)
    }
}

#[cfg(test)]
mod tests {
    use super::FilterChange;
    use crate::core::{Dimension, DimensionValue, RowFilter};

    #[test]
    fn changes_write_their_dimension_only() {
        let mut filter = RowFilter::all().with_metric("Speeding");
        FilterChange::year(2022).apply_to(&mut filter).expect("year");
        assert_eq!(filter.year, Some(2022));
        assert_eq!(filter.metric.as_deref(), Some("Speeding"));

        FilterChange::clear(Dimension::Metric)
            .apply_to(&mut filter)
            .expect("clear");
        assert_eq!(filter.metric, None);
    }

    #[test]
    fn text_for_year_is_rejected() {
        let change = FilterChange {
            dimension: Dimension::Year,
            value: Some(DimensionValue::Text("soon".to_owned())),
        };
        assert!(change.apply_to(&mut RowFilter::all()).is_err());
    }
}
