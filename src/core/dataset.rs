use std::collections::BTreeSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::warn;

use crate::core::normalize::{NormalizeReport, RowNormalizer};
use crate::core::types::UNKNOWN_JURISDICTION;
use crate::core::{NormalizedRow, RawRecord};

/// Normalized rows memoized once per load and shared by every chart instance.
///
/// Filter changes re-run aggregation against these rows; normalization is
/// never repeated for the same source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Arc<[NormalizedRow]>,
    report: NormalizeReport,
}

impl Dataset {
    /// Wraps rows that are already typed.
    ///
    /// Negative values are clamped to zero and blank jurisdictions become the
    /// unknown bucket, both counted in the report like the normalizer does.
    #[must_use]
    pub fn from_rows(mut rows: Vec<NormalizedRow>) -> Self {
        let mut report = NormalizeReport {
            input_records: rows.len(),
            output_rows: rows.len(),
            ..NormalizeReport::default()
        };
        for (index, row) in rows.iter_mut().enumerate() {
            if row.value.is_sign_negative() && !row.value.is_zero() {
                warn!(row = index, value = %row.value, "negative value clamped to 0");
                report.negative_values += 1;
                row.value = Decimal::ZERO;
            }
            if row.jurisdiction.trim().is_empty() {
                report.defaulted_jurisdictions += 1;
                row.jurisdiction = UNKNOWN_JURISDICTION.to_owned();
            }
        }
        Self {
            rows: rows.into(),
            report,
        }
    }

    #[must_use]
    pub fn from_records(normalizer: &RowNormalizer, records: &[RawRecord]) -> Self {
        let (rows, report) = normalizer.normalize(records);
        Self {
            rows: rows.into(),
            report,
        }
    }

    #[must_use]
    pub fn from_wide_records(
        normalizer: &RowNormalizer,
        records: &[RawRecord],
        value_columns: &[&str],
    ) -> Self {
        let (rows, report) = normalizer.normalize_wide(records, value_columns);
        Self {
            rows: rows.into(),
            report,
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[NormalizedRow] {
        &self.rows
    }

    #[must_use]
    pub fn report(&self) -> NormalizeReport {
        self.report
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct years, ascending. Feeds the year selector.
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        self.rows
            .iter()
            .map(|row| row.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct metrics, sorted. Feeds the offence buttons.
    #[must_use]
    pub fn metrics(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.metric.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    #[must_use]
    pub fn jurisdictions(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.jurisdiction.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }
}
