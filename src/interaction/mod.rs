//! Hover state and the tooltip shared by every chart on a page.

use std::cell::{OnceCell, Ref, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::ChartResult;

/// Pixel offset from the pointer to the tooltip's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TooltipOffset {
    pub dx: f64,
    pub dy: f64,
}

impl TooltipOffset {
    #[must_use]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    #[must_use]
    pub fn apply(self, pointer: (f64, f64)) -> (f64, f64) {
        (pointer.0 + self.dx, pointer.1 + self.dy)
    }
}

impl Default for TooltipOffset {
    fn default() -> Self {
        Self::new(15.0, -28.0)
    }
}

/// Text shown in the tooltip: a bold title and body lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipContent {
    pub title: String,
    pub lines: Vec<String>,
}

impl TooltipContent {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }
}

/// Chart and element currently holding the tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipOwner {
    pub chart_id: String,
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TooltipState {
    pub visible: bool,
    pub x: f64,
    pub y: f64,
    pub content: TooltipContent,
    pub owner: Option<TooltipOwner>,
}

/// Single-threaded handle to the page tooltip.
#[derive(Debug, Clone, Default)]
pub struct SharedTooltip {
    inner: Rc<RefCell<TooltipState>>,
}

impl SharedTooltip {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> Ref<'_, TooltipState> {
        self.inner.borrow()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.inner.borrow().visible
    }

    #[must_use]
    pub fn owner(&self) -> Option<TooltipOwner> {
        self.inner.borrow().owner.clone()
    }

    #[must_use]
    pub fn is_owned_by(&self, chart_id: &str) -> bool {
        self.inner
            .borrow()
            .owner
            .as_ref()
            .is_some_and(|owner| owner.chart_id == chart_id)
    }

    /// Shows `content` at `position`, taking ownership for `owner`.
    pub fn show(&self, owner: TooltipOwner, content: TooltipContent, position: (f64, f64)) {
        let mut state = self.inner.borrow_mut();
        state.visible = true;
        state.x = position.0;
        state.y = position.1;
        state.content = content;
        state.owner = Some(owner);
    }

    pub fn move_to(&self, position: (f64, f64)) {
        let mut state = self.inner.borrow_mut();
        state.x = position.0;
        state.y = position.1;
    }

    pub fn hide(&self) {
        let mut state = self.inner.borrow_mut();
        state.visible = false;
        state.owner = None;
    }

    /// Whether two handles point at the same tooltip.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Page-scoped home of the tooltip; created on first request, then reused.
#[derive(Debug, Default)]
pub struct TooltipRegistry {
    tooltip: OnceCell<SharedTooltip>,
}

impl TooltipRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get_or_create(&self) -> SharedTooltip {
        self.tooltip
            .get_or_init(|| {
                debug!("creating shared tooltip");
                SharedTooltip::new()
            })
            .clone()
    }

    #[must_use]
    pub fn is_created(&self) -> bool {
        self.tooltip.get().is_some()
    }
}

/// What a chart exposes so its hover controller can highlight elements.
pub trait HoverTarget {
    /// Raises `key` and applies the highlight treatment; `false` if unknown.
    fn highlight(&mut self, key: &str) -> ChartResult<bool>;

    fn unhighlight(&mut self, key: &str) -> ChartResult<()>;

    fn tooltip_content(&self, key: &str) -> Option<TooltipContent>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverState {
    Idle,
    Hovering { key: String },
}

/// Per-chart hover state machine over the shared tooltip.
#[derive(Debug, Clone)]
pub struct HoverController {
    chart_id: String,
    tooltip: SharedTooltip,
    offset: TooltipOffset,
    state: HoverState,
}

impl HoverController {
    #[must_use]
    pub fn new(chart_id: impl Into<String>, tooltip: SharedTooltip, offset: TooltipOffset) -> Self {
        Self {
            chart_id: chart_id.into(),
            tooltip,
            offset,
            state: HoverState::Idle,
        }
    }

    #[must_use]
    pub fn chart_id(&self) -> &str {
        &self.chart_id
    }

    #[must_use]
    pub fn state(&self) -> &HoverState {
        &self.state
    }

    #[must_use]
    pub fn hovered_key(&self) -> Option<&str> {
        match &self.state {
            HoverState::Idle => None,
            HoverState::Hovering { key } => Some(key),
        }
    }

    #[must_use]
    pub fn tooltip(&self) -> &SharedTooltip {
        &self.tooltip
    }

    fn owns(&self, key: &str) -> bool {
        self.tooltip
            .owner()
            .is_some_and(|owner| owner.chart_id == self.chart_id && owner.key == key)
    }

    /// Reverts the highlight when another chart or element took the tooltip.
    ///
    /// Returns `true` if the controller dropped back to idle.
    pub fn sync(&mut self, target: &mut dyn HoverTarget) -> ChartResult<bool> {
        let HoverState::Hovering { key } = &self.state else {
            return Ok(false);
        };
        if self.owns(key) {
            return Ok(false);
        }
        trace!(chart = self.chart_id.as_str(), key = key.as_str(), "hover taken over");
        target.unhighlight(key)?;
        self.state = HoverState::Idle;
        Ok(true)
    }

    pub fn pointer_enter(
        &mut self,
        target: &mut dyn HoverTarget,
        key: &str,
        pointer: (f64, f64),
    ) -> ChartResult<()> {
        self.sync(target)?;
        if let HoverState::Hovering { key: previous } = &self.state {
            if previous == key {
                self.tooltip.move_to(self.offset.apply(pointer));
                return Ok(());
            }
            target.unhighlight(previous)?;
            self.state = HoverState::Idle;
        }

        if !target.highlight(key)? {
            if self.tooltip.is_owned_by(&self.chart_id) {
                self.tooltip.hide();
            }
            return Ok(());
        }

        let content = target.tooltip_content(key).unwrap_or_default();
        self.tooltip.show(
            TooltipOwner {
                chart_id: self.chart_id.clone(),
                key: key.to_owned(),
            },
            content,
            self.offset.apply(pointer),
        );
        self.state = HoverState::Hovering {
            key: key.to_owned(),
        };
        Ok(())
    }

    /// Repositions the tooltip; content and highlight stay as they are.
    pub fn pointer_move(
        &mut self,
        target: &mut dyn HoverTarget,
        pointer: (f64, f64),
    ) -> ChartResult<()> {
        self.sync(target)?;
        if matches!(self.state, HoverState::Hovering { .. }) {
            self.tooltip.move_to(self.offset.apply(pointer));
        }
        Ok(())
    }

    pub fn pointer_leave(&mut self, target: &mut dyn HoverTarget) -> ChartResult<()> {
        let state = std::mem::replace(&mut self.state, HoverState::Idle);
        if let HoverState::Hovering { key } = state {
            target.unhighlight(&key)?;
            if self.owns(&key) {
                self.tooltip.hide();
            }
        }
        Ok(())
    }

    /// Forgets hover state after a redraw; the chart clears highlights itself.
    pub fn reset(&mut self) {
        if let HoverState::Hovering { key } = std::mem::replace(&mut self.state, HoverState::Idle)
        {
            if self.owns(&key) {
                self.tooltip.hide();
            }
        }
    }
}
