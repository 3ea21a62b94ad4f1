use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::render::Attributes;

/// Maps linear progress in `[0, 1]` to eased progress in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Easing {
    Linear,
    #[default]
    CubicOut,
    CubicInOut,
}

impl Easing {
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::CubicOut => 1.0 - (1.0 - t).powi(3),
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Timing of one animated attribute change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionSpec {
    pub duration_ms: u64,
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(default)]
    pub easing: Easing,
}

impl TransitionSpec {
    #[must_use]
    pub const fn new(duration_ms: u64, easing: Easing) -> Self {
        Self {
            duration_ms,
            delay_ms: 0,
            easing,
        }
    }

    #[must_use]
    pub const fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    #[must_use]
    pub fn duration(self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    #[must_use]
    pub fn delay(self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    #[must_use]
    pub fn total(self) -> Duration {
        self.delay() + self.duration()
    }
}

/// Transition timings per reconciliation group.
///
/// Enter runs longest, update shorter, exit shortest. `stagger_ms` delays each
/// entering element by its index in the new data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionPolicy {
    pub enter: TransitionSpec,
    pub update: TransitionSpec,
    pub exit: TransitionSpec,
    #[serde(default)]
    pub stagger_ms: u64,
}

impl Default for TransitionPolicy {
    fn default() -> Self {
        Self {
            enter: TransitionSpec::new(900, Easing::CubicOut),
            update: TransitionSpec::new(700, Easing::CubicOut),
            exit: TransitionSpec::new(300, Easing::Linear),
            stagger_ms: 0,
        }
    }
}

impl TransitionPolicy {
    pub fn validate(self) -> ChartResult<Self> {
        if self.update.duration_ms > self.enter.duration_ms {
            return Err(ChartError::InvalidConfig(
                "update transition must not outlast the enter transition".to_owned(),
            ));
        }
        Ok(self)
    }

    /// Enter timing for the element at `index` in the new data.
    #[must_use]
    pub fn enter_at(self, index: usize) -> TransitionSpec {
        let stagger = self.stagger_ms.saturating_mul(index as u64);
        self.enter
            .with_delay_ms(self.enter.delay_ms.saturating_add(stagger))
    }
}

/// In-flight interpolation from one attribute set to another.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    from: Attributes,
    to: Attributes,
    spec: TransitionSpec,
    elapsed: Duration,
    remove_on_end: bool,
}

impl Transition {
    #[must_use]
    pub fn new(from: Attributes, to: Attributes, spec: TransitionSpec) -> Self {
        Self {
            from,
            to,
            spec,
            elapsed: Duration::ZERO,
            remove_on_end: false,
        }
    }

    /// Marks the element for removal once the transition completes.
    #[must_use]
    pub fn removing(mut self) -> Self {
        self.remove_on_end = true;
        self
    }

    #[must_use]
    pub fn spec(&self) -> TransitionSpec {
        self.spec
    }

    #[must_use]
    pub fn target(&self) -> &Attributes {
        &self.to
    }

    #[must_use]
    pub fn removes_on_end(&self) -> bool {
        self.remove_on_end
    }

    /// Linear progress in `[0, 1]`, zero during the delay.
    #[must_use]
    pub fn progress(&self) -> f64 {
        let delay = self.spec.delay();
        if self.elapsed <= delay {
            return if self.spec.duration_ms == 0 && self.elapsed >= delay {
                1.0
            } else {
                0.0
            };
        }
        let duration = self.spec.duration();
        if duration.is_zero() {
            return 1.0;
        }
        ((self.elapsed - delay).as_secs_f64() / duration.as_secs_f64()).min(1.0)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.spec.total()
    }

    /// Advances the clock by `dt`; returns `true` once complete.
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed = self.elapsed.saturating_add(dt);
        self.is_complete()
    }

    /// Attributes at the current time; a complete transition lands exactly
    /// on its target values.
    #[must_use]
    pub fn sample(&self) -> Attributes {
        if self.is_complete() {
            return self.from.merged(&self.to);
        }
        let eased = self.spec.easing.apply(self.progress());
        self.from.interpolate(&self.to, eased)
    }
}
