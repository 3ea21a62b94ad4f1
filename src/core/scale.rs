use std::hash::Hash;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::core::types::DimensionValue;
use crate::error::{ChartError, ChartResult};

const E10: f64 = 7.071_067_811_865_476; // sqrt(50)
const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

fn validate_range(range: (f64, f64)) -> ChartResult<()> {
    if !range.0.is_finite() || !range.1.is_finite() {
        return Err(ChartError::InvalidData(
            "scale range must be finite".to_owned(),
        ));
    }
    Ok(())
}

/// Tick step for `count` ticks over `[start, stop]`, snapped to 1, 2 or 5 x 10^n.
#[must_use]
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let span = (stop - start).abs();
    if count == 0 || !span.is_finite() || span == 0.0 {
        return 0.0;
    }
    let raw = span / count as f64;
    let power = raw.log10().floor();
    let error = raw / 10_f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    10_f64.powf(power) * factor
}

fn step_multiple(index: f64, step: f64) -> f64 {
    // Dividing by the inverse keeps fractional steps like 0.1 exact.
    if step < 1.0 {
        let inverse = (1.0 / step).round();
        index / inverse
    } else {
        index * step
    }
}

/// Continuous linear mapping from a numeric domain to pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
    #[serde(default)]
    clamp: bool,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> ChartResult<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() || domain.0 == domain.1 {
            return Err(ChartError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }
        validate_range(range)?;

        Ok(Self {
            domain_start: domain.0,
            domain_end: domain.1,
            range_start: range.0,
            range_end: range.1,
            clamp: false,
        })
    }

    #[must_use]
    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    /// Maps a domain value to a pixel. Non-finite input maps to the range start.
    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.range_start;
        }
        let mut t = (value - self.domain_start) / (self.domain_end - self.domain_start);
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        self.range_start + t * (self.range_end - self.range_start)
    }

    #[must_use]
    pub fn invert(self, pixel: f64) -> f64 {
        let span = self.range_end - self.range_start;
        if span == 0.0 {
            return self.domain_start;
        }
        let t = (pixel - self.range_start) / span;
        self.domain_start + t * (self.domain_end - self.domain_start)
    }

    /// Extends the domain outward to round tick boundaries.
    #[must_use]
    pub fn nice(mut self, count: usize) -> Self {
        let (mut start, mut stop) = (self.domain_start, self.domain_end);
        let reversed = stop < start;
        if reversed {
            std::mem::swap(&mut start, &mut stop);
        }

        let mut previous = 0.0;
        for _ in 0..10 {
            let step = tick_step(start, stop, count);
            if step == 0.0 || step == previous {
                break;
            }
            start = (start / step).floor() * step;
            stop = (stop / step).ceil() * step;
            previous = step;
        }

        if reversed {
            std::mem::swap(&mut start, &mut stop);
        }
        self.domain_start = start;
        self.domain_end = stop;
        self
    }

    /// Round tick values inside the domain, ascending.
    #[must_use]
    pub fn ticks(self, count: usize) -> Vec<f64> {
        let (start, stop) = if self.domain_start <= self.domain_end {
            (self.domain_start, self.domain_end)
        } else {
            (self.domain_end, self.domain_start)
        };
        let step = tick_step(start, stop, count);
        if step == 0.0 {
            return vec![start];
        }
        let first = (start / step - 1e-9).ceil();
        let last = (stop / step + 1e-9).floor();
        let mut ticks = Vec::new();
        let mut index = first;
        while index <= last {
            ticks.push(step_multiple(index, step));
            index += 1.0;
        }
        ticks
    }
}

/// Base-10 logarithmic mapping.
///
/// Values below the domain floor (including zero and negatives, which a log
/// axis cannot show) are positioned at the floor instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LogScale {
    /// Smallest representable domain bound.
    pub const FLOOR: f64 = 1.0;

    /// Builds a log scale; the lower bound is clamped up to [`Self::FLOOR`].
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> ChartResult<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() {
            return Err(ChartError::InvalidData(
                "log scale domain must be finite".to_owned(),
            ));
        }
        validate_range(range)?;
        let start = domain.0.max(Self::FLOOR);
        let end = domain.1.max(Self::FLOOR);
        if start == end {
            return Err(ChartError::InvalidData(
                "log scale domain must span more than one value above the floor".to_owned(),
            ));
        }
        Ok(Self {
            domain_start: start,
            domain_end: end,
            range_start: range.0,
            range_end: range.1,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        let low = self.domain_start.min(self.domain_end);
        let value = if value.is_finite() { value.max(low) } else { low };
        let start = self.domain_start.log10();
        let t = (value.log10() - start) / (self.domain_end.log10() - start);
        self.range_start + t * (self.range_end - self.range_start)
    }

    #[must_use]
    pub fn invert(self, pixel: f64) -> f64 {
        let span = self.range_end - self.range_start;
        if span == 0.0 {
            return self.domain_start;
        }
        let t = (pixel - self.range_start) / span;
        let start = self.domain_start.log10();
        10_f64.powf(start + t * (self.domain_end.log10() - start))
    }

    /// Extends the domain to whole powers of ten.
    #[must_use]
    pub fn nice(mut self) -> Self {
        let ascending = self.domain_start <= self.domain_end;
        let (low, high) = if ascending {
            (self.domain_start, self.domain_end)
        } else {
            (self.domain_end, self.domain_start)
        };
        let low = 10_f64.powf(low.log10().floor());
        let high = 10_f64.powf(high.log10().ceil());
        if ascending {
            self.domain_start = low;
            self.domain_end = high;
        } else {
            self.domain_start = high;
            self.domain_end = low;
        }
        self
    }

    /// Powers of ten inside the domain, densified with 2x and 5x when the
    /// domain spans fewer decades than `count`.
    #[must_use]
    pub fn ticks(self, count: usize) -> Vec<f64> {
        let low = self.domain_start.min(self.domain_end);
        let high = self.domain_start.max(self.domain_end);
        let first = low.log10().floor() as i32;
        let last = high.log10().ceil() as i32;
        let decades = usize::try_from(last - first).unwrap_or(0);
        let multiples: &[f64] = if decades < count { &[1.0, 2.0, 5.0] } else { &[1.0] };

        let mut ticks = Vec::new();
        for exponent in first..=last {
            let base = 10_f64.powi(exponent);
            for multiple in multiples {
                let tick = base * multiple;
                if tick >= low * (1.0 - 1e-12) && tick <= high * (1.0 + 1e-12) {
                    ticks.push(tick);
                }
            }
        }
        ticks
    }
}

/// Numeric axis of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NumericScale {
    Linear(LinearScale),
    Log(LogScale),
}

impl NumericScale {
    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        match self {
            Self::Linear(scale) => scale.map(value),
            Self::Log(scale) => scale.map(value),
        }
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        match self {
            Self::Linear(scale) => scale.domain(),
            Self::Log(scale) => scale.domain(),
        }
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        match self {
            Self::Linear(scale) => scale.range(),
            Self::Log(scale) => scale.range(),
        }
    }

    #[must_use]
    pub fn ticks(self, count: usize) -> Vec<f64> {
        match self {
            Self::Linear(scale) => scale.ticks(count),
            Self::Log(scale) => scale.ticks(count),
        }
    }

    /// Pixel of the smallest representable value, where bars grow from.
    #[must_use]
    pub fn baseline(self) -> f64 {
        match self {
            Self::Linear(scale) => scale.map(scale.domain().0.min(scale.domain().1).max(0.0)),
            Self::Log(scale) => scale.map(LogScale::FLOOR),
        }
    }
}

/// Padding of a band scale, as fractions of one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPadding {
    pub inner: f64,
    pub outer: f64,
    pub align: f64,
}

impl BandPadding {
    /// Same inner and outer padding.
    #[must_use]
    pub const fn uniform(padding: f64) -> Self {
        Self {
            inner: padding,
            outer: padding,
            align: 0.5,
        }
    }

    #[must_use]
    pub const fn inner_only(inner: f64) -> Self {
        Self {
            inner,
            outer: 0.0,
            align: 0.5,
        }
    }

    fn validate(self) -> ChartResult<Self> {
        if !(0.0..=1.0).contains(&self.inner)
            || !self.outer.is_finite()
            || self.outer < 0.0
            || !(0.0..=1.0).contains(&self.align)
        {
            return Err(ChartError::InvalidData(
                "band padding must satisfy inner in [0, 1], outer >= 0, align in [0, 1]"
                    .to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Discrete categories mapped to contiguous bands.
///
/// The domain keeps the order categories were supplied in.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale<K: Eq + Hash = DimensionValue> {
    domain: IndexSet<K>,
    range: (f64, f64),
    padding: BandPadding,
    step: f64,
    bandwidth: f64,
    start: f64,
}

impl<K: Eq + Hash + Clone> BandScale<K> {
    pub fn new<I>(domain: I, range: (f64, f64), padding: BandPadding) -> ChartResult<Self>
    where
        I: IntoIterator<Item = K>,
    {
        validate_range(range)?;
        let padding = padding.validate()?;
        let domain: IndexSet<K> = domain.into_iter().collect();

        let n = domain.len() as f64;
        let reverse = range.1 < range.0;
        let (r0, r1) = if reverse { (range.1, range.0) } else { range };
        let step = (r1 - r0) / (n - padding.inner + padding.outer * 2.0).max(1.0);
        let start = r0 + (r1 - r0 - step * (n - padding.inner)) * padding.align;
        let bandwidth = step * (1.0 - padding.inner);

        Ok(Self {
            domain,
            range,
            padding,
            step,
            bandwidth,
            start,
        })
    }

    #[must_use]
    pub fn domain(&self) -> impl ExactSizeIterator<Item = &K> {
        self.domain.iter()
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    #[must_use]
    pub fn padding(&self) -> BandPadding {
        self.padding
    }

    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.domain.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    /// Start pixel of the band for `category`, or `None` if it is not in the domain.
    #[must_use]
    pub fn position(&self, category: &K) -> Option<f64> {
        let index = self.domain.get_index_of(category)?;
        let offset = self.step * index as f64;
        if self.range.1 < self.range.0 {
            // Reversed range: first category sits at the high end.
            let n = self.domain.len() as f64;
            Some(self.start + self.step * (n - 1.0) - offset)
        } else {
            Some(self.start + offset)
        }
    }

    /// Center pixel of the band for `category`.
    #[must_use]
    pub fn center(&self, category: &K) -> Option<f64> {
        self.position(category).map(|start| start + self.bandwidth / 2.0)
    }
}

/// Discrete categories mapped to evenly spaced points (zero bandwidth).
#[derive(Debug, Clone, PartialEq)]
pub struct PointScale<K: Eq + Hash = DimensionValue> {
    band: BandScale<K>,
}

impl<K: Eq + Hash + Clone> PointScale<K> {
    /// `padding` is the outer padding in steps on both ends.
    pub fn new<I>(domain: I, range: (f64, f64), padding: f64) -> ChartResult<Self>
    where
        I: IntoIterator<Item = K>,
    {
        let band = BandScale::new(
            domain,
            range,
            BandPadding {
                inner: 1.0,
                outer: padding,
                align: 0.5,
            },
        )?;
        Ok(Self { band })
    }

    #[must_use]
    pub fn domain(&self) -> impl ExactSizeIterator<Item = &K> {
        self.band.domain()
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        self.band.range()
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.band.step()
    }

    #[must_use]
    pub fn position(&self, category: &K) -> Option<f64> {
        self.band.position(category)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.band.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.band.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{BandPadding, BandScale, LinearScale, LogScale, PointScale, tick_step};

    #[test]
    fn tick_step_snaps_to_one_two_five() {
        assert_relative_eq!(tick_step(0.0, 10.0, 10), 1.0);
        assert_relative_eq!(tick_step(0.0, 95.0, 5), 20.0);
        assert_relative_eq!(tick_step(0.0, 1.0, 5), 0.2);
    }

    #[test]
    fn nice_extends_domain_to_round_values() {
        let scale = LinearScale::new((0.0, 97.3), (0.0, 100.0))
            .expect("valid")
            .nice(10);
        assert_eq!(scale.domain(), (0.0, 100.0));
    }

    #[test]
    fn band_scale_matches_uniform_padding_layout() {
        let scale = BandScale::new(["a", "b", "c"], (0.0, 120.0), BandPadding::uniform(0.0))
            .expect("valid");
        assert_relative_eq!(scale.step(), 40.0);
        assert_relative_eq!(scale.bandwidth(), 40.0);
        assert_eq!(scale.position(&"b"), Some(40.0));
        assert_eq!(scale.position(&"z"), None);
    }

    #[test]
    fn point_scale_single_category_sits_in_the_middle() {
        let scale = PointScale::new([2020], (0.0, 100.0), 0.4).expect("valid");
        assert_eq!(scale.position(&2020), Some(50.0));
    }

    #[test]
    fn log_scale_floors_non_positive_values() {
        let scale = LogScale::new((0.0, 100.0), (300.0, 0.0)).expect("valid");
        assert_eq!(scale.domain(), (1.0, 100.0));
        assert_relative_eq!(scale.map(0.0), 300.0);
        assert_relative_eq!(scale.map(-5.0), 300.0);
        assert_relative_eq!(scale.map(10.0), 150.0);
    }
}
