use serde::{Deserialize, Serialize};

use crate::core::{ChartKind, Margins, PlotArea, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::TooltipOffset;
use crate::render::{Easing, TransitionPolicy, TransitionSpec};

/// Serializable setup of one chart instance.
///
/// Hosts can persist and reload chart setup as JSON; everything except the
/// viewport falls back to defaults when absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub viewport: Viewport,
    #[serde(default)]
    pub margins: Margins,
    #[serde(default)]
    pub transitions: TransitionPolicy,
    #[serde(default)]
    pub tooltip_offset: TooltipOffset,
}

impl ChartConfig {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            margins: Margins::default(),
            transitions: TransitionPolicy::default(),
            tooltip_offset: TooltipOffset::default(),
        }
    }

    /// Layout and timing each chart kind ships with.
    #[must_use]
    pub fn for_kind(kind: ChartKind) -> Self {
        match kind {
            ChartKind::SingleBar => Self::new(Viewport::new(800, 400))
                .with_margins(Margins::new(40.0, 30.0, 50.0, 150.0)),
            ChartKind::GroupedBar => Self::new(Viewport::new(800, 500))
                .with_margins(Margins::new(40.0, 30.0, 100.0, 80.0))
                .with_transitions(TransitionPolicy {
                    enter: TransitionSpec::new(800, Easing::CubicOut),
                    update: TransitionSpec::new(800, Easing::CubicOut),
                    exit: TransitionSpec::new(300, Easing::Linear),
                    stagger_ms: 30,
                })
                .with_tooltip_offset(TooltipOffset::new(10.0, -30.0)),
            ChartKind::Line => Self::new(Viewport::new(900, 500))
                .with_margins(Margins::new(60.0, 40.0, 60.0, 80.0))
                .with_transitions(TransitionPolicy {
                    enter: TransitionSpec::new(800, Easing::CubicOut),
                    update: TransitionSpec::new(800, Easing::CubicOut),
                    exit: TransitionSpec::new(300, Easing::Linear),
                    stagger_ms: 0,
                }),
            ChartKind::Choropleth => Self::new(Viewport::new(1000, 700))
                .with_margins(Margins::zero())
                .with_transitions(TransitionPolicy {
                    enter: TransitionSpec::new(500, Easing::Linear),
                    update: TransitionSpec::new(500, Easing::Linear),
                    exit: TransitionSpec::new(300, Easing::Linear),
                    stagger_ms: 0,
                })
                .with_tooltip_offset(TooltipOffset::new(15.0, -30.0)),
        }
    }

    #[must_use]
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    #[must_use]
    pub fn with_transitions(mut self, transitions: TransitionPolicy) -> Self {
        self.transitions = transitions;
        self
    }

    #[must_use]
    pub fn with_tooltip_offset(mut self, offset: TooltipOffset) -> Self {
        self.tooltip_offset = offset;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        if !self.tooltip_offset.dx.is_finite() || !self.tooltip_offset.dy.is_finite() {
            return Err(ChartError::InvalidConfig(
                "tooltip offset must be finite".to_owned(),
            ));
        }
        self.transitions.validate()?;
        self.plot_area()?;
        Ok(self)
    }

    pub fn plot_area(self) -> ChartResult<PlotArea> {
        PlotArea::from_viewport(self.viewport, self.margins)
    }

    /// Serializes config to pretty JSON.
    pub fn to_json_pretty(self) -> ChartResult<String> {
        serde_json::to_string_pretty(&self)
            .map_err(|e| ChartError::InvalidConfig(format!("failed to serialize config: {e}")))
    }

    /// Deserializes and validates config from JSON.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidConfig(format!("failed to parse config: {e}")))?;
        config.validate()
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self::new(Viewport::new(800, 400))
    }
}
