use std::fmt;
use std::hash::Hash;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

/// Fill for regions without a matching statistic.
pub const NO_DATA: Color = Color::rgb_u8(0xee, 0xee, 0xee);

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    #[must_use]
    pub const fn rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self::rgb(
            red as f64 / 255.0,
            green as f64 / 255.0,
            blue as f64 / 255.0,
        )
    }

    /// Parses `#rgb` or `#rrggbb`.
    pub fn from_hex(input: &str) -> ChartResult<Self> {
        let digits = input.trim().trim_start_matches('#');
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_owned(),
            _ => {
                return Err(ChartError::InvalidData(format!(
                    "color `{input}` must be #rgb or #rrggbb"
                )));
            }
        };
        let channel = |index: usize| {
            u8::from_str_radix(&expanded[index..index + 2], 16)
                .map_err(|_| ChartError::InvalidData(format!("color `{input}` is not hex")))
        };
        Ok(Self::rgb_u8(channel(0)?, channel(2)?, channel(4)?))
    }

    /// `#rrggbb`, ignoring alpha.
    #[must_use]
    pub fn to_hex(self) -> String {
        let byte = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            byte(self.red),
            byte(self.green),
            byte(self.blue)
        )
    }

    /// Darkens by `0.7^k`, the factor d3-style color helpers use.
    #[must_use]
    pub fn darker(self, k: f64) -> Self {
        let factor = 0.7_f64.powf(k);
        Self::rgba(
            self.red * factor,
            self.green * factor,
            self.blue * factor,
            self.alpha,
        )
    }

    #[must_use]
    pub fn brighter(self, k: f64) -> Self {
        let factor = 0.7_f64.powf(-k);
        Self::rgba(
            (self.red * factor).min(1.0),
            (self.green * factor).min(1.0),
            (self.blue * factor).min(1.0),
            self.alpha,
        )
    }

    #[must_use]
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self { alpha, ..self }
    }

    /// Channel-wise linear interpolation in RGB space.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self::rgba(
            mix(self.red, other.red),
            mix(self.green, other.green),
            mix(self.blue, other.blue),
            mix(self.alpha, other.alpha),
        )
    }

    pub fn validate(self) -> ChartResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Categorical palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Palette {
    Set2,
    Tableau10,
}

impl Palette {
    #[must_use]
    pub fn colors(self) -> Vec<Color> {
        let hex: &[u32] = match self {
            Self::Set2 => &[
                0x66c2a5, 0xfc8d62, 0x8da0cb, 0xe78ac3, 0xa6d854, 0xffd92f, 0xe5c494, 0xb3b3b3,
            ],
            Self::Tableau10 => &[
                0x4e79a7, 0xf28e2c, 0xe15759, 0x76b7b2, 0x59a14f, 0xedc949, 0xaf7aa1, 0xff9da7,
                0x9c755f, 0xbab0ab,
            ],
        };
        hex.iter().copied().map(color_from_u32).collect()
    }
}

fn color_from_u32(value: u32) -> Color {
    let [_, red, green, blue] = value.to_be_bytes();
    Color::rgb_u8(red, green, blue)
}

/// Single-hue sequential ramps for magnitude coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolator {
    Reds,
    Blues,
    Greens,
    Greys,
}

impl Interpolator {
    /// Ramp used for a metric column; unknown metrics get greys.
    #[must_use]
    pub fn for_metric(metric: &str) -> Self {
        match metric {
            "Sum(FINES)" => Self::Reds,
            "Sum(ARRESTS)" => Self::Blues,
            "Sum(CHARGES)" => Self::Greens,
            _ => Self::Greys,
        }
    }

    fn stops(self) -> [u32; 9] {
        match self {
            Self::Reds => [
                0xfff5f0, 0xfee0d2, 0xfcbba1, 0xfc9272, 0xfb6a4a, 0xef3b2c, 0xcb181d, 0xa50f15,
                0x67000d,
            ],
            Self::Blues => [
                0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c,
                0x08306b,
            ],
            Self::Greens => [
                0xf7fcf5, 0xe5f5e0, 0xc7e9c0, 0xa1d99b, 0x74c476, 0x41ab5d, 0x238b45, 0x006d2c,
                0x00441b,
            ],
            Self::Greys => [
                0xffffff, 0xf0f0f0, 0xd9d9d9, 0xbdbdbd, 0x969696, 0x737373, 0x525252, 0x252525,
                0x000000,
            ],
        }
    }

    /// Color at `t` in `[0, 1]` (clamped), piecewise-linear between stops.
    #[must_use]
    pub fn sample(self, t: f64) -> Color {
        let stops = self.stops();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let scaled = t * (stops.len() - 1) as f64;
        let index = (scaled.floor() as usize).min(stops.len() - 2);
        let local = scaled - index as f64;
        color_from_u32(stops[index]).lerp(color_from_u32(stops[index + 1]), local)
    }
}

/// Categories mapped to a cycled palette in domain order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinalColorScale<K: Eq + Hash> {
    domain: IndexSet<K>,
    palette: Vec<Color>,
}

impl<K: Eq + Hash> OrdinalColorScale<K> {
    pub fn new<I>(domain: I, palette: Vec<Color>) -> ChartResult<Self>
    where
        I: IntoIterator<Item = K>,
    {
        if palette.is_empty() {
            return Err(ChartError::InvalidData(
                "ordinal color palette must not be empty".to_owned(),
            ));
        }
        Ok(Self {
            domain: domain.into_iter().collect(),
            palette,
        })
    }

    /// Color of `category`, or `None` if it was not in the domain.
    #[must_use]
    pub fn map(&self, category: &K) -> Option<Color> {
        let index = self.domain.get_index_of(category)?;
        Some(self.palette[index % self.palette.len()])
    }

    #[must_use]
    pub fn domain(&self) -> impl ExactSizeIterator<Item = &K> {
        self.domain.iter()
    }
}

/// Magnitude mapped through an [`Interpolator`] over `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SequentialColorScale {
    domain: (f64, f64),
    interpolator: Interpolator,
}

impl SequentialColorScale {
    pub fn new(domain: (f64, f64), interpolator: Interpolator) -> ChartResult<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() || domain.0 == domain.1 {
            return Err(ChartError::InvalidData(
                "sequential color domain must be finite and non-zero".to_owned(),
            ));
        }
        Ok(Self {
            domain,
            interpolator,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        self.domain
    }

    #[must_use]
    pub fn interpolator(self) -> Interpolator {
        self.interpolator
    }

    #[must_use]
    pub fn map(self, value: f64) -> Color {
        let t = (value - self.domain.0) / (self.domain.1 - self.domain.0);
        self.interpolator.sample(t)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{Color, Interpolator, OrdinalColorScale, Palette, SequentialColorScale};

    #[test]
    fn hex_round_trips() {
        let color = Color::from_hex("#fc8d62").expect("valid hex");
        assert_eq!(color.to_hex(), "#fc8d62");
        assert_eq!(Color::from_hex("#eee").expect("short hex").to_hex(), "#eeeeee");
        assert!(Color::from_hex("#zzzzzz").is_err());
    }

    #[test]
    fn darker_scales_channels() {
        let color = Color::rgb(1.0, 0.5, 0.0).darker(1.0);
        assert_relative_eq!(color.red, 0.7);
        assert_relative_eq!(color.green, 0.35);
    }

    #[test]
    fn ordinal_scale_cycles_palette() {
        let scale = OrdinalColorScale::new(0..9, Palette::Set2.colors()).expect("valid");
        assert_eq!(scale.map(&0), scale.map(&8));
        assert_eq!(scale.map(&42), None);
    }

    #[test]
    fn sequential_scale_clamps_to_ramp_ends() {
        let scale = SequentialColorScale::new((0.0, 10.0), Interpolator::Reds).expect("valid");
        assert_eq!(scale.map(-1.0).to_hex(), "#fff5f0");
        assert_eq!(scale.map(10.0).to_hex(), "#67000d");
        assert_eq!(scale.map(99.0).to_hex(), "#67000d");
    }
}
