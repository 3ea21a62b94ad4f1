use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::trace;

use crate::core::types::{AggregateRow, Dimension, DimensionValue, GroupKey, NormalizedRow};
use crate::error::{ChartError, ChartResult};

/// Ordered, duplicate-free list of dimensions to group by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupBy {
    dimensions: SmallVec<[Dimension; 3]>,
}

impl GroupBy {
    /// Builds a grouping; rejects an empty or repeated dimension list.
    pub fn new(dimensions: &[Dimension]) -> ChartResult<Self> {
        if dimensions.is_empty() {
            return Err(ChartError::InvalidData(
                "group-by needs at least one dimension".to_owned(),
            ));
        }
        let mut unique: SmallVec<[Dimension; 3]> = SmallVec::new();
        for dimension in dimensions {
            if unique.contains(dimension) {
                return Err(ChartError::InvalidData(format!(
                    "dimension {dimension:?} listed twice in group-by"
                )));
            }
            unique.push(*dimension);
        }
        Ok(Self { dimensions: unique })
    }

    #[must_use]
    pub fn single(dimension: Dimension) -> Self {
        let mut dimensions = SmallVec::new();
        dimensions.push(dimension);
        Self { dimensions }
    }

    #[must_use]
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    fn key_of(&self, row: &NormalizedRow) -> GroupKey {
        self.dimensions.iter().map(|d| row.dimension(*d)).collect()
    }
}

/// Row predicate applied before grouping. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFilter {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub jurisdiction: Option<String>,
}

impl RowFilter {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    #[must_use]
    pub fn with_metric(mut self, metric: impl Into<String>) -> Self {
        self.metric = Some(metric.into());
        self
    }

    #[must_use]
    pub fn with_jurisdiction(mut self, jurisdiction: impl Into<String>) -> Self {
        self.jurisdiction = Some(jurisdiction.into());
        self
    }

    #[must_use]
    pub fn matches(&self, row: &NormalizedRow) -> bool {
        self.year.is_none_or(|year| row.year == year)
            && self.metric.as_deref().is_none_or(|metric| row.metric == metric)
            && self
                .jurisdiction
                .as_deref()
                .is_none_or(|jurisdiction| row.jurisdiction == jurisdiction)
    }
}

/// Groups `rows` by `group_by` and sums their values.
///
/// Output is sorted by the natural order of the group key (years numerically,
/// text lexicographically), so repeated calls on the same input are identical.
/// Summation is exact in `Decimal`; an empty input yields an empty output.
#[must_use]
pub fn aggregate(rows: &[NormalizedRow], group_by: &GroupBy) -> Vec<AggregateRow> {
    aggregate_filtered(rows, &RowFilter::all(), group_by)
}

/// [`aggregate`] restricted to rows matching `filter`.
#[must_use]
pub fn aggregate_filtered(
    rows: &[NormalizedRow],
    filter: &RowFilter,
    group_by: &GroupBy,
) -> Vec<AggregateRow> {
    let mut totals: BTreeMap<GroupKey, Decimal> = BTreeMap::new();
    for row in rows.iter().filter(|row| filter.matches(row)) {
        let total = totals.entry(group_by.key_of(row)).or_insert(Decimal::ZERO);
        *total = total.saturating_add(row.value);
    }

    trace!(
        rows = rows.len(),
        groups = totals.len(),
        dimensions = ?group_by.dimensions(),
        "aggregated rows"
    );
    totals
        .into_iter()
        .map(|(key, total)| AggregateRow::new(key, total))
        .collect()
}

/// Sum of all totals; equals the sum of contributing row values.
#[must_use]
pub fn grand_total(rows: &[AggregateRow]) -> Decimal {
    rows.iter()
        .fold(Decimal::ZERO, |acc, row| acc.saturating_add(row.total))
}

/// One outer category with a value for every inner category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedSeries {
    pub outer: DimensionValue,
    pub values: Vec<(DimensionValue, Decimal)>,
}

/// Zero-filled outer x inner grid for grouped bar charts.
///
/// Outer and inner categories keep the order of first occurrence in `rows`;
/// every combination missing from the data is reported with a zero total.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupedGrid {
    pub outer_categories: Vec<DimensionValue>,
    pub inner_categories: Vec<DimensionValue>,
    pub series: Vec<GroupedSeries>,
}

impl GroupedGrid {
    /// Flattens the grid back into two-part aggregate rows (outer, inner).
    #[must_use]
    pub fn cells(&self) -> Vec<AggregateRow> {
        self.series
            .iter()
            .flat_map(|series| {
                series.values.iter().map(|(inner, total)| {
                    let mut key = GroupKey::new();
                    key.push(series.outer.clone());
                    key.push(inner.clone());
                    AggregateRow::new(key, *total)
                })
            })
            .collect()
    }
}

#[must_use]
pub fn complete_grid(
    rows: &[NormalizedRow],
    filter: &RowFilter,
    outer: Dimension,
    inner: Dimension,
) -> GroupedGrid {
    let mut outer_categories: IndexSet<DimensionValue> = IndexSet::new();
    let mut inner_categories: IndexSet<DimensionValue> = IndexSet::new();
    let mut totals: IndexMap<(DimensionValue, DimensionValue), Decimal> = IndexMap::new();

    for row in rows.iter().filter(|row| filter.matches(row)) {
        let outer_value = row.dimension(outer);
        let inner_value = row.dimension(inner);
        outer_categories.insert(outer_value.clone());
        inner_categories.insert(inner_value.clone());
        let total = totals
            .entry((outer_value, inner_value))
            .or_insert(Decimal::ZERO);
        *total = total.saturating_add(row.value);
    }

    let series = outer_categories
        .iter()
        .map(|outer_value| GroupedSeries {
            outer: outer_value.clone(),
            values: inner_categories
                .iter()
                .map(|inner_value| {
                    let total = totals
                        .get(&(outer_value.clone(), inner_value.clone()))
                        .copied()
                        .unwrap_or(Decimal::ZERO);
                    (inner_value.clone(), total)
                })
                .collect(),
        })
        .collect();

    GroupedGrid {
        outer_categories: outer_categories.into_iter().collect(),
        inner_categories: inner_categories.into_iter().collect(),
        series,
    }
}
