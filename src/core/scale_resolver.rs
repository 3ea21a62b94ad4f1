use indexmap::IndexSet;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::color::{Interpolator, OrdinalColorScale, Palette, SequentialColorScale};
use crate::core::scale::{BandPadding, BandScale, LinearScale, LogScale, NumericScale, PointScale};
use crate::core::types::{AggregateRow, DimensionValue, PlotArea};
use crate::core::Color;
use crate::error::ChartResult;

/// Smallest numeric maximum a linear axis is built with.
pub const MIN_LINEAR_EXTENT: f64 = 1.0;

/// Smallest maximum a log axis is built with (one decade above the floor).
pub const MIN_LOG_EXTENT: f64 = 10.0;

/// Tick count used when niceing linear domains.
const NICE_TICKS: usize = 10;

/// Headroom factor above the maximum on the trend line axis.
const LINE_HEADROOM: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartKind {
    /// Jurisdictions on the outer band, metrics inside, log value axis.
    GroupedBar,
    /// Horizontal bars, one per metric, linear value axis.
    SingleBar,
    /// Values per year joined by a line.
    Line,
    /// Regions colored by magnitude.
    Choropleth,
}

impl ChartKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::GroupedBar => "grouped-bar",
            Self::SingleBar => "single-bar",
            Self::Line => "line",
            Self::Choropleth => "choropleth",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CategoryAxis {
    Band(BandScale),
    Point(PointScale),
}

impl CategoryAxis {
    #[must_use]
    pub fn position(&self, category: &DimensionValue) -> Option<f64> {
        match self {
            Self::Band(scale) => scale.position(category),
            Self::Point(scale) => scale.position(category),
        }
    }

    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        match self {
            Self::Band(scale) => scale.bandwidth(),
            Self::Point(_) => 0.0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Band(scale) => scale.len(),
            Self::Point(scale) => scale.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColorScale {
    Ordinal(OrdinalColorScale<DimensionValue>),
    Sequential(SequentialColorScale),
}

impl ColorScale {
    /// Color of a datum: ordinal scales read the category, sequential scales the value.
    #[must_use]
    pub fn color_for(&self, category: &DimensionValue, value: f64) -> Option<Color> {
        match self {
            Self::Ordinal(scale) => scale.map(category),
            Self::Sequential(scale) => Some(scale.map(value)),
        }
    }
}

/// Every scale one chart needs for a single draw pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleSet {
    pub kind: ChartKind,
    pub category: Option<CategoryAxis>,
    pub inner_category: Option<BandScale>,
    pub value: Option<NumericScale>,
    pub color: Option<ColorScale>,
}

fn max_total(rows: &[AggregateRow]) -> f64 {
    rows.iter()
        .map(|row| OrderedFloat(row.total_f64()))
        .max()
        .map_or(0.0, OrderedFloat::into_inner)
}

/// Returns `max` when it lies above `threshold`, otherwise `fallback`.
fn non_degenerate_max(max: f64, threshold: f64, fallback: f64) -> f64 {
    if max.is_finite() && max > threshold {
        max
    } else {
        fallback
    }
}

fn key_part(row: &AggregateRow, index: usize) -> Option<DimensionValue> {
    row.key.get(index).cloned()
}

fn distinct_parts(rows: &[AggregateRow], index: usize) -> IndexSet<DimensionValue> {
    rows.iter().filter_map(|row| key_part(row, index)).collect()
}

/// Builds the scale set for `kind` from aggregate rows.
///
/// Categorical domains come from the data in row order. Numeric domains start
/// at zero (one for log axes); a maximum of zero is widened to
/// [`MIN_LINEAR_EXTENT`] (or [`MIN_LOG_EXTENT`] for log axes) so coordinates
/// never divide by zero. `active_metric` only affects the choropleth ramp.
pub fn resolve_scales(
    kind: ChartKind,
    rows: &[AggregateRow],
    plot: PlotArea,
    active_metric: Option<&str>,
) -> ChartResult<ScaleSet> {
    let max = max_total(rows);
    trace!(kind = kind.label(), rows = rows.len(), max, "resolving scales");

    let set = match kind {
        ChartKind::SingleBar => {
            let categories = distinct_parts(rows, 0);
            let color = OrdinalColorScale::new(categories.iter().cloned(), Palette::Set2.colors())?;
            let band = BandScale::new(
                categories,
                (plot.top, plot.bottom),
                BandPadding::uniform(0.3),
            )?;
            let value = LinearScale::new(
                (0.0, non_degenerate_max(max, 0.0, MIN_LINEAR_EXTENT)),
                (plot.left, plot.right),
            )?
            .nice(NICE_TICKS);
            ScaleSet {
                kind,
                category: Some(CategoryAxis::Band(band)),
                inner_category: None,
                value: Some(NumericScale::Linear(value)),
                color: Some(ColorScale::Ordinal(color)),
            }
        }
        ChartKind::GroupedBar => {
            let outer = BandScale::new(
                distinct_parts(rows, 0),
                (plot.left, plot.right),
                BandPadding::inner_only(0.2),
            )?;
            let inner_categories = distinct_parts(rows, 1);
            let color = OrdinalColorScale::new(
                inner_categories.iter().cloned(),
                Palette::Tableau10.colors(),
            )?;
            let inner = BandScale::new(
                inner_categories,
                (0.0, outer.bandwidth()),
                BandPadding::uniform(0.05),
            )?;
            let value = LogScale::new(
                (LogScale::FLOOR, non_degenerate_max(max, LogScale::FLOOR, MIN_LOG_EXTENT)),
                (plot.bottom, plot.top),
            )?
            .nice();
            ScaleSet {
                kind,
                category: Some(CategoryAxis::Band(outer)),
                inner_category: Some(inner),
                value: Some(NumericScale::Log(value)),
                color: Some(ColorScale::Ordinal(color)),
            }
        }
        ChartKind::Line => {
            let mut years: Vec<DimensionValue> = distinct_parts(rows, 0).into_iter().collect();
            years.sort();
            let points = PointScale::new(years, (plot.left, plot.right), 0.4)?;
            let value = LinearScale::new(
                (0.0, non_degenerate_max(max, 0.0, MIN_LINEAR_EXTENT) * LINE_HEADROOM),
                (plot.bottom, plot.top),
            )?;
            ScaleSet {
                kind,
                category: Some(CategoryAxis::Point(points)),
                inner_category: None,
                value: Some(NumericScale::Linear(value)),
                color: None,
            }
        }
        ChartKind::Choropleth => {
            let interpolator = active_metric.map_or(Interpolator::Greys, Interpolator::for_metric);
            let color = SequentialColorScale::new(
                (0.0, non_degenerate_max(max, 0.0, MIN_LINEAR_EXTENT)),
                interpolator,
            )?;
            ScaleSet {
                kind,
                category: None,
                inner_category: None,
                value: None,
                color: Some(ColorScale::Sequential(color)),
            }
        }
    };

    Ok(set)
}
