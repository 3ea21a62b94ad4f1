//! Ordered candidate resolution with a typed default.
//!
//! Field extraction in the normalizer and feature matching in the geo-key
//! resolver both walk a priority list of names until one converts; this module
//! is the single implementation of that walk.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::RawRecord;

/// Anything that can answer "what is the value stored under this name".
pub trait CandidateSource {
    fn candidate(&self, name: &str) -> Option<&str>;
}

impl CandidateSource for RawRecord {
    fn candidate(&self, name: &str) -> Option<&str> {
        self.get(name)
    }
}

impl CandidateSource for IndexMap<String, String> {
    fn candidate(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl CandidateSource for std::collections::HashMap<String, String> {
    fn candidate(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// How a resolved value was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// The candidate at `index` (named `name`) was present and converted.
    Candidate { index: usize, name: String },
    /// No candidate was present; the default was used.
    Missing,
    /// At least one candidate was present but none converted; the default was used.
    Unconvertible { first_present: String },
}

impl Provenance {
    #[must_use]
    pub fn is_default(&self) -> bool {
        !matches!(self, Self::Candidate { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub provenance: Provenance,
}

impl<T> Resolved<T> {
    #[must_use]
    pub fn into_value(self) -> T {
        self.value
    }

    #[must_use]
    pub fn matched_name(&self) -> Option<&str> {
        match &self.provenance {
            Provenance::Candidate { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Priority-ordered list of candidate names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateChain {
    names: Vec<String>,
}

impl CandidateChain {
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the first candidate whose present value `convert` accepts.
    ///
    /// Absent names are skipped. A present value that `convert` rejects also
    /// moves on to the next candidate, so a later well-formed column still wins
    /// over an earlier malformed one.
    pub fn try_resolve<S, T, F>(
        &self,
        source: &S,
        mut convert: F,
    ) -> Result<Resolved<T>, Provenance>
    where
        S: CandidateSource + ?Sized,
        F: FnMut(&str) -> Option<T>,
    {
        let mut first_present: Option<&str> = None;
        for (index, name) in self.names.iter().enumerate() {
            let Some(raw) = source.candidate(name) else {
                continue;
            };
            first_present.get_or_insert(name.as_str());
            if let Some(value) = convert(raw) {
                return Ok(Resolved {
                    value,
                    provenance: Provenance::Candidate {
                        index,
                        name: name.clone(),
                    },
                });
            }
        }

        Err(match first_present {
            Some(name) => Provenance::Unconvertible {
                first_present: name.to_owned(),
            },
            None => Provenance::Missing,
        })
    }

    /// Like [`Self::try_resolve`] but falls back to `default`.
    pub fn resolve<S, T, F>(&self, source: &S, convert: F, default: T) -> Resolved<T>
    where
        S: CandidateSource + ?Sized,
        F: FnMut(&str) -> Option<T>,
    {
        self.try_resolve(source, convert)
            .unwrap_or_else(|provenance| Resolved {
                value: default,
                provenance,
            })
    }
}

impl<S: Into<String>> FromIterator<S> for CandidateChain {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Trims and rejects empty strings. The usual text converter.
#[must_use]
pub fn non_empty_trimmed(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Convenience wrapper for `chain.resolve(source, convert, default)`.
pub fn resolve_by_candidates<S, T, F>(
    source: &S,
    chain: &CandidateChain,
    convert: F,
    default: T,
) -> Resolved<T>
where
    S: CandidateSource + ?Sized,
    F: FnMut(&str) -> Option<T>,
{
    chain.resolve(source, convert, default)
}

#[cfg(test)]
mod tests {
    use super::{CandidateChain, Provenance, non_empty_trimmed, resolve_by_candidates};
    use crate::core::RawRecord;

    #[test]
    fn first_present_candidate_wins() {
        let record = RawRecord::new()
            .with_field("TOTAL", "7")
            .with_field("COUNT", "9");
        let chain = CandidateChain::new(["Sum(FINES)", "TOTAL", "COUNT"]);

        let resolved = chain.resolve(&record, |raw| raw.parse::<i64>().ok(), 0);
        assert_eq!(resolved.value, 7);
        assert_eq!(resolved.matched_name(), Some("TOTAL"));
    }

    #[test]
    fn missing_everywhere_uses_default() {
        let record = RawRecord::new().with_field("other", "1");
        let chain = CandidateChain::new(["a", "b"]);

        let resolved = resolve_by_candidates(&record, &chain, non_empty_trimmed, "x".to_owned());
        assert_eq!(resolved.value, "x");
        assert_eq!(resolved.provenance, Provenance::Missing);
    }

    #[test]
    fn malformed_candidate_falls_through_to_next() {
        let record = RawRecord::new()
            .with_field("a", "   ")
            .with_field("b", "VIC");
        let chain = CandidateChain::new(["a", "b"]);

        let resolved = chain.resolve(&record, non_empty_trimmed, String::new());
        assert_eq!(resolved.value, "VIC");
    }

    #[test]
    fn present_but_unconvertible_reports_first_present_name() {
        let record = RawRecord::new().with_field("b", "bad");
        let chain = CandidateChain::new(["a", "b"]);

        let resolved = chain.resolve(&record, |raw| raw.parse::<i64>().ok(), 0);
        assert_eq!(resolved.value, 0);
        assert_eq!(
            resolved.provenance,
            Provenance::Unconvertible {
                first_present: "b".to_owned()
            }
        );
        assert!(resolved.provenance.is_default());
    }
}
