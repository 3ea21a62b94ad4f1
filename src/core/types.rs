use std::fmt;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::primitives::decimal_to_f64;
use crate::error::{ChartError, ChartResult};

/// Jurisdiction used when no candidate field yields a non-empty value.
pub const UNKNOWN_JURISDICTION: &str = "Unknown";

/// Metric label used when no candidate field yields a non-empty value.
pub const UNKNOWN_METRIC: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Pixel margins around the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    #[must_use]
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::new(40.0, 30.0, 50.0, 80.0)
    }
}

/// Inner drawing rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PlotArea {
    /// Derives the plot rectangle from a viewport and its margins.
    pub fn from_viewport(viewport: Viewport, margins: Margins) -> ChartResult<Self> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let area = Self {
            left: margins.left,
            top: margins.top,
            right: f64::from(viewport.width) - margins.right,
            bottom: f64::from(viewport.height) - margins.bottom,
        };
        if !(area.width() > 0.0 && area.height() > 0.0) {
            return Err(ChartError::InvalidConfig(
                "margins leave no room for the plot area".to_owned(),
            ));
        }
        Ok(area)
    }

    #[must_use]
    pub fn width(self) -> f64 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(self) -> f64 {
        self.bottom - self.top
    }
}

/// One raw input record as parsed by an external CSV/JSON loader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: IndexMap<String, String>,
}

impl RawRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Canonical typed row produced by the normalizer.
///
/// `value` is never negative and `jurisdiction` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRow {
    pub year: i32,
    pub jurisdiction: String,
    pub metric: String,
    pub value: Decimal,
}

impl NormalizedRow {
    #[must_use]
    pub fn new(
        year: i32,
        jurisdiction: impl Into<String>,
        metric: impl Into<String>,
        value: Decimal,
    ) -> Self {
        Self {
            year,
            jurisdiction: jurisdiction.into(),
            metric: metric.into(),
            value,
        }
    }

    #[must_use]
    pub fn dimension(&self, dimension: Dimension) -> DimensionValue {
        match dimension {
            Dimension::Year => DimensionValue::Year(self.year),
            Dimension::Jurisdiction => DimensionValue::Text(self.jurisdiction.clone()),
            Dimension::Metric => DimensionValue::Text(self.metric.clone()),
        }
    }
}

/// Grouping dimension of a normalized row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dimension {
    Year,
    Jurisdiction,
    Metric,
}

/// Value of one grouping dimension. Years order numerically, text lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DimensionValue {
    Year(i32),
    Text(String),
}

impl DimensionValue {
    #[must_use]
    pub fn as_year(&self) -> Option<i32> {
        match self {
            Self::Year(year) => Some(*year),
            Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Year(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

impl fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(year) => write!(f, "{year}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Ordered tuple of dimension values, one per grouped dimension.
pub type GroupKey = SmallVec<[DimensionValue; 3]>;

/// Summed value for one group key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub key: GroupKey,
    pub total: Decimal,
}

impl AggregateRow {
    #[must_use]
    pub fn new(key: GroupKey, total: Decimal) -> Self {
        Self { key, total }
    }

    /// Joins key parts into a stable element key (`"NSW|Cannabis"`).
    ///
    /// `|` and backslashes inside a part are backslash-escaped so distinct keys
    /// never join to the same string.
    #[must_use]
    pub fn key_string(&self) -> String {
        let mut out = String::new();
        for (index, part) in self.key.iter().enumerate() {
            if index > 0 {
                out.push('|');
            }
            for ch in part.to_string().chars() {
                if matches!(ch, '|' | '\\') {
                    out.push('\\');
                }
                out.push(ch);
            }
        }
        out
    }

    /// First key part, the category most charts place on their main axis.
    #[must_use]
    pub fn primary(&self) -> Option<&DimensionValue> {
        self.key.first()
    }

    /// Total as `f64` for scale projection. Falls back to 0 when out of range.
    #[must_use]
    pub fn total_f64(&self) -> f64 {
        decimal_to_f64(self.total, "aggregate total").unwrap_or(0.0)
    }
}
