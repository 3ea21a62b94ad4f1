use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Which spelling of a jurisdiction the normalizer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum JurisdictionStyle {
    /// Keep the trimmed source spelling.
    #[default]
    AsIs,
    /// Map known names to their short code (`New South Wales` -> `NSW`).
    Code,
    /// Map known codes to their full name (`NSW` -> `New South Wales`).
    Name,
}

/// Bidirectional code <-> name table for jurisdictions.
///
/// Lookups are case-insensitive and ignore surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionVocabulary {
    code_to_name: IndexMap<String, String>,
}

impl JurisdictionVocabulary {
    #[must_use]
    pub fn new<I, C, N>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, N)>,
        C: Into<String>,
        N: Into<String>,
    {
        Self {
            code_to_name: pairs
                .into_iter()
                .map(|(code, name)| (code.into(), name.into()))
                .collect(),
        }
    }

    /// States and territories of Australia.
    #[must_use]
    pub fn australia() -> Self {
        Self::new([
            ("NSW", "New South Wales"),
            ("VIC", "Victoria"),
            ("QLD", "Queensland"),
            ("SA", "South Australia"),
            ("WA", "Western Australia"),
            ("TAS", "Tasmania"),
            ("NT", "Northern Territory"),
            ("ACT", "Australian Capital Territory"),
        ])
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            code_to_name: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn name_for(&self, code: &str) -> Option<&str> {
        let code = code.trim();
        self.code_to_name
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(code))
            .map(|(_, name)| name.as_str())
    }

    #[must_use]
    pub fn code_for(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.code_to_name
            .iter()
            .find(|(_, known)| known.eq_ignore_ascii_case(name))
            .map(|(code, _)| code.as_str())
    }

    /// Every other known spelling of `value` (code for a name, name for a code).
    #[must_use]
    pub fn aliases(&self, value: &str) -> Vec<&str> {
        self.name_for(value)
            .into_iter()
            .chain(self.code_for(value))
            .collect()
    }

    /// Applies `style` to a trimmed jurisdiction; unknown values pass through.
    #[must_use]
    pub fn canonicalize(&self, value: &str, style: JurisdictionStyle) -> String {
        let trimmed = value.trim();
        let mapped = match style {
            JurisdictionStyle::AsIs => None,
            JurisdictionStyle::Code => self
                .code_for(trimmed)
                .or_else(|| self.name_for(trimmed).and(self.code_key(trimmed))),
            JurisdictionStyle::Name => self
                .name_for(trimmed)
                .or_else(|| self.code_for(trimmed).and(self.name_key(trimmed))),
        };
        mapped.unwrap_or(trimmed).to_owned()
    }

    /// Known code spelled exactly as stored (fixes casing such as `nsw`).
    fn code_key(&self, code: &str) -> Option<&str> {
        self.code_to_name
            .keys()
            .find(|known| known.eq_ignore_ascii_case(code))
            .map(String::as_str)
    }

    fn name_key(&self, name: &str) -> Option<&str> {
        self.code_to_name
            .values()
            .find(|known| known.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }
}

impl Default for JurisdictionVocabulary {
    fn default() -> Self {
        Self::australia()
    }
}
