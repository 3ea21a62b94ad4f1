//! Matching statistics to map features whose identifiers use a different
//! vocabulary (codes vs. names, differing property names and casing).

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::candidates::{CandidateChain, non_empty_trimmed};
use crate::core::types::AggregateRow;
use crate::core::vocabulary::JurisdictionVocabulary;

/// One map region: a property bag plus an opaque shape handed to the path renderer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeometryFeature {
    pub properties: IndexMap<String, String>,
    #[serde(default)]
    pub shape: serde_json::Value,
}

impl GeometryFeature {
    #[must_use]
    pub fn new(shape: serde_json::Value) -> Self {
        Self {
            properties: IndexMap::new(),
            shape,
        }
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

/// Statistic per region key, indexed both as trimmed text and case-folded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoLookup {
    exact: HashMap<String, f64>,
    folded: HashMap<String, f64>,
}

impl GeoLookup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys the lookup by each row's first key part.
    #[must_use]
    pub fn from_aggregates(rows: &[AggregateRow]) -> Self {
        rows.iter()
            .filter_map(|row| Some((row.primary()?.to_string(), row.total_f64())))
            .collect()
    }

    /// Inserts a value; a later insert with the same key replaces the earlier one.
    pub fn insert(&mut self, key: &str, value: f64) {
        let trimmed = key.trim();
        self.exact.insert(trimmed.to_owned(), value);
        self.folded.insert(trimmed.to_uppercase(), value);
    }

    /// Exact trimmed match first, then the uppercased variant against folded keys.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        let trimmed = key.trim();
        self.exact
            .get(trimmed)
            .or_else(|| self.folded.get(&trimmed.to_uppercase()))
            .copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exact.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }
}

impl<K: AsRef<str>> FromIterator<(K, f64)> for GeoLookup {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut lookup = Self::new();
        for (key, value) in iter {
            lookup.insert(key.as_ref(), value);
        }
        lookup
    }
}

/// Outcome of matching one feature.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoMatch {
    /// Statistic for the feature, `None` when no candidate matched.
    pub value: Option<f64>,
    /// Property name whose value matched.
    pub property: Option<String>,
}

impl GeoMatch {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.value.is_some()
    }
}

/// Resolves a feature's statistic through an ordered list of property names.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoKeyResolver {
    candidates: CandidateChain,
    vocabulary: Option<JurisdictionVocabulary>,
    default_value: f64,
}

impl Default for GeoKeyResolver {
    fn default() -> Self {
        Self {
            candidates: default_property_candidates(),
            vocabulary: None,
            default_value: 0.0,
        }
    }
}

fn default_property_candidates() -> CandidateChain {
    CandidateChain::new([
        "STATE_NAME",
        "STATE_CODE",
        "STATE_ABBR",
        "name",
        "NAME",
        "state",
        "STATE",
    ])
}

impl GeoKeyResolver {
    #[must_use]
    pub fn new(candidates: CandidateChain) -> Self {
        Self {
            candidates,
            ..Self::default()
        }
    }

    /// Also tries the other spelling of a jurisdiction (code <-> name).
    #[must_use]
    pub fn with_vocabulary(mut self, vocabulary: JurisdictionVocabulary) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    #[must_use]
    pub fn with_default_value(mut self, value: f64) -> Self {
        self.default_value = value;
        self
    }

    #[must_use]
    pub fn candidates(&self) -> &CandidateChain {
        &self.candidates
    }

    /// Statistic for `feature`, or the default (0) when nothing matches.
    #[must_use]
    pub fn resolve_key(&self, feature: &GeometryFeature, lookup: &GeoLookup) -> f64 {
        self.resolve(feature, lookup)
            .value
            .unwrap_or(self.default_value)
    }

    /// Full match result, keeping unresolved features distinguishable.
    #[must_use]
    pub fn resolve(&self, feature: &GeometryFeature, lookup: &GeoLookup) -> GeoMatch {
        let attempt = self
            .candidates
            .try_resolve(&feature.properties, |raw| self.lookup_with_aliases(raw, lookup));

        match attempt {
            Ok(resolved) => GeoMatch {
                property: resolved.matched_name().map(str::to_owned),
                value: Some(resolved.value),
            },
            Err(provenance) => {
                debug!(?provenance, properties = feature.properties.len(), "unresolved geo key");
                GeoMatch {
                    value: None,
                    property: None,
                }
            }
        }
    }

    fn lookup_with_aliases(&self, raw: &str, lookup: &GeoLookup) -> Option<f64> {
        if let Some(value) = lookup.get(raw) {
            return Some(value);
        }
        let vocabulary = self.vocabulary.as_ref()?;
        vocabulary
            .aliases(raw)
            .into_iter()
            .find_map(|alias| lookup.get(alias))
    }

    /// Stable identity of a feature across redraws: its first non-empty
    /// candidate property, or `None` when it exposes none.
    #[must_use]
    pub fn feature_id(&self, feature: &GeometryFeature) -> Option<String> {
        self.candidates
            .try_resolve(&feature.properties, non_empty_trimmed)
            .ok()
            .map(|resolved| resolved.value)
    }

    /// Human label for tooltips: the matched name, else the first identifier.
    #[must_use]
    pub fn feature_label(&self, feature: &GeometryFeature) -> String {
        self.feature_id(feature)
            .unwrap_or_else(|| "Unknown region".to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{GeoKeyResolver, GeoLookup, GeometryFeature};
    use crate::core::JurisdictionVocabulary;

    #[test]
    fn exact_trimmed_match_wins() {
        let lookup: GeoLookup = [("Victoria", 12.0)].into_iter().collect();
        let feature = GeometryFeature::default().with_property("STATE_NAME", " Victoria ");
        assert_eq!(GeoKeyResolver::default().resolve_key(&feature, &lookup), 12.0);
    }

    #[test]
    fn unresolved_feature_defaults_to_zero_and_reports_none() {
        let lookup: GeoLookup = [("Victoria", 12.0)].into_iter().collect();
        let feature = GeometryFeature::default().with_property("STATE_NAME", "Atlantis");
        let resolver = GeoKeyResolver::default();

        assert_eq!(resolver.resolve_key(&feature, &lookup), 0.0);
        assert!(!resolver.resolve(&feature, &lookup).is_resolved());
    }

    #[test]
    fn later_candidate_matches_when_earlier_misses() {
        let lookup: GeoLookup = [("QLD", 3.0)].into_iter().collect();
        let feature = GeometryFeature::default()
            .with_property("STATE_NAME", "Queensland")
            .with_property("STATE_CODE", "QLD");
        let matched = GeoKeyResolver::default().resolve(&feature, &lookup);

        assert_eq!(matched.value, Some(3.0));
        assert_eq!(matched.property.as_deref(), Some("STATE_CODE"));
    }

    #[test]
    fn vocabulary_bridges_codes_and_names() {
        let lookup: GeoLookup = [("New South Wales", 8.0)].into_iter().collect();
        let feature = GeometryFeature::default().with_property("STATE_ABBR", "NSW");
        let resolver =
            GeoKeyResolver::default().with_vocabulary(JurisdictionVocabulary::australia());
        assert_eq!(resolver.resolve_key(&feature, &lookup), 8.0);
    }
}
