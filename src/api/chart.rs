use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::api::ChartConfig;
use crate::core::{ChartKind, PlotArea, RowFilter, ScaleSet};
use crate::error::ChartResult;
use crate::interaction::{HoverController, HoverTarget, SharedTooltip, TooltipContent};
use crate::render::{
    Attributes, ElementSpec, RenderDiffEngine, RenderSummary, Surface, TickSummary,
};

/// Per-datum hover behavior of a chart's marks.
pub trait HoverDatum {
    /// Overlay drawn while hovered; `None` makes the mark inert.
    fn highlight(&self) -> Option<Attributes>;

    fn tooltip(&self) -> TooltipContent;
}

/// Everything one draw pass produces before reconciliation.
#[derive(Debug, Clone)]
pub struct MarkSet<D> {
    pub specs: Vec<ElementSpec<D>>,
    pub scales: Option<ScaleSet>,
    /// Marks drawn with the no-data treatment.
    pub unresolved: usize,
}

impl<D> MarkSet<D> {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            specs: Vec::new(),
            scales: None,
            unresolved: 0,
        }
    }
}

/// Turns data plus a filter into target marks for one chart kind.
pub trait MarkLayout {
    type Datum: HoverDatum + fmt::Debug;

    fn kind(&self) -> ChartKind;

    /// Fills filter fields the chart cannot draw without (default year,
    /// default metric) from its data.
    fn effective_filter(&self, filter: &RowFilter) -> RowFilter {
        filter.clone()
    }

    fn layout(&self, filter: &RowFilter, plot: PlotArea) -> ChartResult<MarkSet<Self::Datum>>;
}

/// Result of one [`ChartInstance::render`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChartRenderSummary {
    pub diff: RenderSummary,
    pub unresolved: usize,
}

/// Object-safe view of a chart, used by [`crate::api::Dashboard`].
pub trait Chart {
    fn id(&self) -> &str;

    fn kind(&self) -> ChartKind;

    fn filter(&self) -> &RowFilter;

    fn render(
        &mut self,
        surface: &mut dyn Surface,
        filter: &RowFilter,
    ) -> ChartResult<ChartRenderSummary>;

    fn tick(&mut self, surface: &mut dyn Surface, dt: Duration) -> ChartResult<TickSummary>;

    fn settle(&mut self, surface: &mut dyn Surface) -> ChartResult<TickSummary>;

    fn pointer_enter(
        &mut self,
        surface: &mut dyn Surface,
        key: &str,
        pointer: (f64, f64),
    ) -> ChartResult<()>;

    fn pointer_move(&mut self, surface: &mut dyn Surface, pointer: (f64, f64)) -> ChartResult<()>;

    fn pointer_leave(&mut self, surface: &mut dyn Surface) -> ChartResult<()>;

    /// Drops this chart's hover if another chart now owns the tooltip.
    fn sync_hover(&mut self, surface: &mut dyn Surface) -> ChartResult<bool>;
}

struct HoverBinding<'a, D> {
    engine: &'a mut RenderDiffEngine<D>,
    surface: &'a mut dyn Surface,
}

impl<D: HoverDatum> HoverTarget for HoverBinding<'_, D> {
    fn highlight(&mut self, key: &str) -> ChartResult<bool> {
        let Some(overlay) = self.engine.datum(key).and_then(HoverDatum::highlight) else {
            return Ok(false);
        };
        self.engine.highlight(&mut *self.surface, key, overlay)
    }

    fn unhighlight(&mut self, key: &str) -> ChartResult<()> {
        self.engine.clear_highlight(&mut *self.surface, key)?;
        Ok(())
    }

    fn tooltip_content(&self, key: &str) -> Option<TooltipContent> {
        self.engine.datum(key).map(HoverDatum::tooltip)
    }
}

/// A chart: its layout, element map, scales and hover state.
///
/// `render` can be called any number of times; each call reconciles against
/// what is already on the surface.
#[derive(Debug)]
pub struct ChartInstance<L: MarkLayout> {
    id: String,
    layout: L,
    config: ChartConfig,
    plot: PlotArea,
    engine: RenderDiffEngine<L::Datum>,
    hover: HoverController,
    filter: RowFilter,
    scales: Option<ScaleSet>,
}

impl<L: MarkLayout> ChartInstance<L> {
    pub fn new(
        id: impl Into<String>,
        layout: L,
        config: ChartConfig,
        tooltip: SharedTooltip,
    ) -> ChartResult<Self> {
        let config = config.validate()?;
        let id = id.into();
        Ok(Self {
            plot: config.plot_area()?,
            engine: RenderDiffEngine::new(config.transitions),
            hover: HoverController::new(id.clone(), tooltip, config.tooltip_offset),
            filter: RowFilter::all(),
            scales: None,
            id,
            layout,
            config,
        })
    }

    /// Builds with the layout and timing the chart kind ships with.
    pub fn with_defaults(
        id: impl Into<String>,
        layout: L,
        tooltip: SharedTooltip,
    ) -> ChartResult<Self> {
        let config = ChartConfig::for_kind(layout.kind());
        Self::new(id, layout, config, tooltip)
    }

    #[must_use]
    pub fn layout(&self) -> &L {
        &self.layout
    }

    #[must_use]
    pub fn config(&self) -> ChartConfig {
        self.config
    }

    #[must_use]
    pub fn plot_area(&self) -> PlotArea {
        self.plot
    }

    #[must_use]
    pub fn engine(&self) -> &RenderDiffEngine<L::Datum> {
        &self.engine
    }

    #[must_use]
    pub fn hover(&self) -> &HoverController {
        &self.hover
    }

    /// Scales of the last draw, `None` before the first one or for empty data.
    #[must_use]
    pub fn scales(&self) -> Option<&ScaleSet> {
        self.scales.as_ref()
    }

    /// Draws the chart for `filter`.
    ///
    /// Hover state is reset first; in-flight transitions are interrupted and
    /// restarted towards the new targets.
    pub fn render<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        filter: &RowFilter,
    ) -> ChartResult<ChartRenderSummary> {
        let filter = self.layout.effective_filter(filter);
        let marks = self.layout.layout(&filter, self.plot)?;

        self.hover.reset();
        self.engine.clear_highlights(surface)?;
        let diff = self.engine.apply(surface, marks.specs)?;

        debug!(
            chart = self.id.as_str(),
            kind = self.layout.kind().label(),
            ?filter,
            unresolved = marks.unresolved,
            "rendered chart"
        );
        self.filter = filter;
        self.scales = marks.scales;
        Ok(ChartRenderSummary {
            diff,
            unresolved: marks.unresolved,
        })
    }

    pub fn tick<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        dt: Duration,
    ) -> ChartResult<TickSummary> {
        self.engine.tick(surface, dt)
    }

    pub fn settle<S: Surface + ?Sized>(&mut self, surface: &mut S) -> ChartResult<TickSummary> {
        self.engine.settle(surface)
    }

    pub fn pointer_enter(
        &mut self,
        surface: &mut dyn Surface,
        key: &str,
        pointer: (f64, f64),
    ) -> ChartResult<()> {
        let mut binding = HoverBinding {
            engine: &mut self.engine,
            surface,
        };
        self.hover.pointer_enter(&mut binding, key, pointer)
    }

    pub fn pointer_move(
        &mut self,
        surface: &mut dyn Surface,
        pointer: (f64, f64),
    ) -> ChartResult<()> {
        let mut binding = HoverBinding {
            engine: &mut self.engine,
            surface,
        };
        self.hover.pointer_move(&mut binding, pointer)
    }

    pub fn pointer_leave(&mut self, surface: &mut dyn Surface) -> ChartResult<()> {
        let mut binding = HoverBinding {
            engine: &mut self.engine,
            surface,
        };
        self.hover.pointer_leave(&mut binding)
    }

    /// Drops a hover another chart took over the shared tooltip.
    pub fn sync_hover(&mut self, surface: &mut dyn Surface) -> ChartResult<bool> {
        let mut binding = HoverBinding {
            engine: &mut self.engine,
            surface,
        };
        self.hover.sync(&mut binding)
    }
}

impl<L: MarkLayout> Chart for ChartInstance<L> {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ChartKind {
        self.layout.kind()
    }

    fn filter(&self) -> &RowFilter {
        &self.filter
    }

    fn render(
        &mut self,
        surface: &mut dyn Surface,
        filter: &RowFilter,
    ) -> ChartResult<ChartRenderSummary> {
        ChartInstance::render(self, surface, filter)
    }

    fn tick(&mut self, surface: &mut dyn Surface, dt: Duration) -> ChartResult<TickSummary> {
        ChartInstance::tick(self, surface, dt)
    }

    fn settle(&mut self, surface: &mut dyn Surface) -> ChartResult<TickSummary> {
        ChartInstance::settle(self, surface)
    }

    fn pointer_enter(
        &mut self,
        surface: &mut dyn Surface,
        key: &str,
        pointer: (f64, f64),
    ) -> ChartResult<()> {
        ChartInstance::pointer_enter(self, surface, key, pointer)
    }

    fn pointer_move(&mut self, surface: &mut dyn Surface, pointer: (f64, f64)) -> ChartResult<()> {
        ChartInstance::pointer_move(self, surface, pointer)
    }

    fn pointer_leave(&mut self, surface: &mut dyn Surface) -> ChartResult<()> {
        ChartInstance::pointer_leave(self, surface)
    }

    fn sync_hover(&mut self, surface: &mut dyn Surface) -> ChartResult<bool> {
        ChartInstance::sync_hover(self, surface)
    }
}
