use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::candidates::{CandidateChain, Provenance, Resolved, non_empty_trimmed};
use crate::core::primitives::{parse_decimal, parse_year};
use crate::core::types::{UNKNOWN_JURISDICTION, UNKNOWN_METRIC};
use crate::core::vocabulary::{JurisdictionStyle, JurisdictionVocabulary};
use crate::core::{NormalizedRow, RawRecord};
use crate::error::{ChartError, ChartResult};

/// Which rows the normalizer may drop instead of coercing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RowPolicy {
    /// Drop rows whose year is missing or not an integer (otherwise year `0`).
    #[serde(default)]
    pub drop_unparseable_year: bool,
}

/// Field candidates and canonicalization rules for one dataset family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    #[serde(default = "default_year_candidates")]
    pub year_candidates: CandidateChain,
    #[serde(default = "default_jurisdiction_candidates")]
    pub jurisdiction_candidates: CandidateChain,
    #[serde(default = "default_metric_candidates")]
    pub metric_candidates: CandidateChain,
    #[serde(default = "default_value_candidates")]
    pub value_candidates: CandidateChain,
    #[serde(default)]
    pub jurisdiction_style: JurisdictionStyle,
    #[serde(default)]
    pub vocabulary: JurisdictionVocabulary,
    #[serde(default)]
    pub policy: RowPolicy,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            year_candidates: default_year_candidates(),
            jurisdiction_candidates: default_jurisdiction_candidates(),
            metric_candidates: default_metric_candidates(),
            value_candidates: default_value_candidates(),
            jurisdiction_style: JurisdictionStyle::AsIs,
            vocabulary: JurisdictionVocabulary::default(),
            policy: RowPolicy::default(),
        }
    }
}

impl NormalizerConfig {
    #[must_use]
    pub fn with_value_candidates(mut self, candidates: CandidateChain) -> Self {
        self.value_candidates = candidates;
        self
    }

    #[must_use]
    pub fn with_metric_candidates(mut self, candidates: CandidateChain) -> Self {
        self.metric_candidates = candidates;
        self
    }

    #[must_use]
    pub fn with_jurisdiction_candidates(mut self, candidates: CandidateChain) -> Self {
        self.jurisdiction_candidates = candidates;
        self
    }

    #[must_use]
    pub fn with_jurisdiction_style(mut self, style: JurisdictionStyle) -> Self {
        self.jurisdiction_style = style;
        self
    }

    #[must_use]
    pub fn with_vocabulary(mut self, vocabulary: JurisdictionVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        for (label, chain) in [
            ("year", &self.year_candidates),
            ("jurisdiction", &self.jurisdiction_candidates),
            ("metric", &self.metric_candidates),
            ("value", &self.value_candidates),
        ] {
            if chain.is_empty() {
                return Err(ChartError::InvalidConfig(format!(
                    "{label} candidate list must not be empty"
                )));
            }
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ChartError::InvalidConfig(format!("failed to serialize normalizer config: {e}"))
        })
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidConfig(format!("failed to parse normalizer config: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }
}

fn default_year_candidates() -> CandidateChain {
    CandidateChain::new(["YEAR", "Year", "year"])
}

fn default_jurisdiction_candidates() -> CandidateChain {
    CandidateChain::new(["JURISDICTION", "JUR", "State", "state", "STATE"])
}

fn default_metric_candidates() -> CandidateChain {
    CandidateChain::new(["METRIC", "ColumnNames", "Metric", "OFFENCE"])
}

fn default_value_candidates() -> CandidateChain {
    CandidateChain::new(["Sum(FINES)", "TOTAL", "COUNT", "Count(ColumnValues)"])
}

/// Counters describing how much coercion a normalization pass needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NormalizeReport {
    pub input_records: usize,
    pub output_rows: usize,
    pub dropped_rows: usize,
    pub missing_values: usize,
    pub unparseable_values: usize,
    pub negative_values: usize,
    pub defaulted_years: usize,
    pub defaulted_jurisdictions: usize,
    pub defaulted_metrics: usize,
}

/// Coerces heterogeneous raw records into [`NormalizedRow`]s.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowNormalizer {
    config: NormalizerConfig,
}

impl RowNormalizer {
    pub fn new(config: NormalizerConfig) -> ChartResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalizes long-format records (one metric/value pair per record).
    #[must_use]
    pub fn normalize(&self, records: &[RawRecord]) -> (Vec<NormalizedRow>, NormalizeReport) {
        let mut report = NormalizeReport {
            input_records: records.len(),
            ..NormalizeReport::default()
        };
        let mut rows = Vec::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            let Some(year) = self.resolve_year(record, index, &mut report) else {
                report.dropped_rows += 1;
                continue;
            };
            let jurisdiction = self.resolve_jurisdiction(record, &mut report);
            let metric = self.resolve_metric(record, &mut report);
            let value =
                self.resolve_value(&self.config.value_candidates, record, index, &mut report);
            rows.push(NormalizedRow {
                year,
                jurisdiction,
                metric,
                value,
            });
        }

        report.output_rows = rows.len();
        debug!(
            input = report.input_records,
            output = report.output_rows,
            dropped = report.dropped_rows,
            unparseable = report.unparseable_values,
            "normalized long-format records"
        );
        (rows, report)
    }

    /// Normalizes wide-format records: each record yields one row per column
    /// in `value_columns`, with the metric set to the column name.
    #[must_use]
    pub fn normalize_wide(
        &self,
        records: &[RawRecord],
        value_columns: &[&str],
    ) -> (Vec<NormalizedRow>, NormalizeReport) {
        let mut report = NormalizeReport {
            input_records: records.len(),
            ..NormalizeReport::default()
        };
        let mut rows = Vec::with_capacity(records.len() * value_columns.len());

        for (index, record) in records.iter().enumerate() {
            let Some(year) = self.resolve_year(record, index, &mut report) else {
                report.dropped_rows += 1;
                continue;
            };
            let jurisdiction = self.resolve_jurisdiction(record, &mut report);
            for column in value_columns {
                let chain = CandidateChain::new([*column]);
                let value = self.resolve_value(&chain, record, index, &mut report);
                rows.push(NormalizedRow {
                    year,
                    jurisdiction: jurisdiction.clone(),
                    metric: (*column).to_owned(),
                    value,
                });
            }
        }

        report.output_rows = rows.len();
        debug!(
            input = report.input_records,
            output = report.output_rows,
            columns = value_columns.len(),
            "normalized wide-format records"
        );
        (rows, report)
    }

    fn resolve_year(
        &self,
        record: &RawRecord,
        index: usize,
        report: &mut NormalizeReport,
    ) -> Option<i32> {
        match self.config.year_candidates.try_resolve(record, parse_year) {
            Ok(resolved) => Some(resolved.value),
            Err(provenance) => {
                if self.config.policy.drop_unparseable_year {
                    debug!(record = index, ?provenance, "dropping record without a usable year");
                    return None;
                }
                report.defaulted_years += 1;
                Some(0)
            }
        }
    }

    fn resolve_jurisdiction(&self, record: &RawRecord, report: &mut NormalizeReport) -> String {
        let resolved = self.config.jurisdiction_candidates.resolve(
            record,
            non_empty_trimmed,
            UNKNOWN_JURISDICTION.to_owned(),
        );
        if resolved.provenance.is_default() {
            report.defaulted_jurisdictions += 1;
            return resolved.value;
        }
        self.config
            .vocabulary
            .canonicalize(&resolved.value, self.config.jurisdiction_style)
    }

    fn resolve_metric(&self, record: &RawRecord, report: &mut NormalizeReport) -> String {
        let resolved =
            self.config
                .metric_candidates
                .resolve(record, non_empty_trimmed, UNKNOWN_METRIC.to_owned());
        if resolved.provenance.is_default() {
            report.defaulted_metrics += 1;
        }
        resolved.value
    }

    fn resolve_value(
        &self,
        chain: &CandidateChain,
        record: &RawRecord,
        index: usize,
        report: &mut NormalizeReport,
    ) -> Decimal {
        let Resolved { value, provenance } = chain.resolve(record, parse_decimal, Decimal::ZERO);
        match provenance {
            Provenance::Candidate { .. } => {}
            Provenance::Missing => report.missing_values += 1,
            Provenance::Unconvertible { first_present } => {
                let raw = record.get(&first_present).unwrap_or_default();
                if raw.trim().is_empty() {
                    report.missing_values += 1;
                } else {
                    report.unparseable_values += 1;
                    warn!(
                        record = index,
                        field = %first_present,
                        raw,
                        "unparseable numeric value replaced with 0"
                    );
                }
            }
        }

        if value.is_sign_negative() && !value.is_zero() {
            report.negative_values += 1;
            warn!(record = index, %value, "negative value clamped to 0");
            return Decimal::ZERO;
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{NormalizerConfig, RowNormalizer, RowPolicy};
    use crate::core::{JurisdictionStyle, RawRecord};

    fn record(fields: &[(&str, &str)]) -> RawRecord {
        fields.iter().copied().collect()
    }

    #[test]
    fn value_falls_back_through_candidates() {
        let normalizer = RowNormalizer::default();
        let (rows, report) = normalizer.normalize(&[
            record(&[("YEAR", "2020"), ("JURISDICTION", "NSW"), ("Sum(FINES)", "5")]),
            record(&[("YEAR", "2020"), ("JUR", "VIC"), ("TOTAL", "6")]),
            record(&[("YEAR", "2020"), ("State", "QLD"), ("COUNT", "7")]),
            record(&[("YEAR", "2020"), ("state", "SA")]),
        ]);

        let values: Vec<Decimal> = rows.iter().map(|row| row.value).collect();
        assert_eq!(
            values,
            vec![
                Decimal::from(5),
                Decimal::from(6),
                Decimal::from(7),
                Decimal::ZERO
            ]
        );
        assert_eq!(report.missing_values, 1);
        let jurisdictions: Vec<&str> = rows.iter().map(|row| row.jurisdiction.as_str()).collect();
        assert_eq!(jurisdictions, vec!["NSW", "VIC", "QLD", "SA"]);
    }

    #[test]
    fn missing_jurisdiction_uses_sentinel() {
        let normalizer = RowNormalizer::default();
        let (rows, report) = normalizer.normalize(&[record(&[("YEAR", "2021"), ("STATE", "  ")])]);
        assert_eq!(rows[0].jurisdiction, "Unknown");
        assert_eq!(report.defaulted_jurisdictions, 1);
    }

    #[test]
    fn negative_values_are_clamped() {
        let normalizer = RowNormalizer::default();
        let (rows, report) = normalizer.normalize(&[record(&[("TOTAL", "-3")])]);
        assert_eq!(rows[0].value, Decimal::ZERO);
        assert_eq!(report.negative_values, 1);
    }

    #[test]
    fn unparseable_year_is_coerced_unless_policy_drops() {
        let records = [record(&[("YEAR", "unknown"), ("TOTAL", "1")])];

        let (rows, _) = RowNormalizer::default().normalize(&records);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].year, 0);

        let strict = RowNormalizer::new(NormalizerConfig::default().with_policy(RowPolicy {
            drop_unparseable_year: true,
        }))
        .expect("valid config");
        let (rows, report) = strict.normalize(&records);
        assert!(rows.is_empty());
        assert_eq!(report.dropped_rows, 1);
    }

    #[test]
    fn wide_layout_emits_one_row_per_column() {
        let normalizer = RowNormalizer::new(
            NormalizerConfig::default().with_jurisdiction_style(JurisdictionStyle::Name),
        )
        .expect("valid config");
        let (rows, _) = normalizer.normalize_wide(
            &[record(&[
                ("YEAR", "2023"),
                ("JURISDICTION", "NSW"),
                ("Sum(FINES)", "10"),
                ("Sum(ARRESTS)", "x"),
            ])],
            &["Sum(FINES)", "Sum(ARRESTS)"],
        );

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].jurisdiction, "New South Wales");
        assert_eq!(rows[0].metric, "Sum(FINES)");
        assert_eq!(rows[0].value, Decimal::from(10));
        assert_eq!(rows[1].metric, "Sum(ARRESTS)");
        assert_eq!(rows[1].value, Decimal::ZERO);
    }
}
