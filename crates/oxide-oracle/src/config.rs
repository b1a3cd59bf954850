//! Engine configuration.
//!
//! A single [`EngineConfig`] drives every component. It deserializes from
//! JSON with every field optional, so a document only needs to name the
//! settings it changes:
//!
//! ```rust
//! use oxide_oracle::config::{EngineConfig, IdentifierProfile};
//!
//! let config = EngineConfig::from_json(r#"{ "identifier_profile": "extended" }"#).unwrap();
//! assert_eq!(config.identifier_profile, IdentifierProfile::Extended);
//! assert_eq!(config.default_varchar_length, Some(4000));
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dialect::reserved::ORACLE_RESERVED_WORDS;

/// Largest VARCHAR2 length with `MAX_STRING_SIZE = EXTENDED`.
pub const VARCHAR2_EXTENDED_LIMIT: u32 = 32_767;

/// Identifier length profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierProfile {
    /// 30-byte identifiers (Oracle 12.1 and earlier).
    #[default]
    Conservative,
    /// 128-byte identifiers (Oracle 12.2 and later).
    Extended,
}

impl IdentifierProfile {
    /// Returns the maximum identifier length in bytes.
    #[must_use]
    pub const fn max_length(self) -> usize {
        match self {
            Self::Conservative => 30,
            Self::Extended => 128,
        }
    }
}

/// How unquoted identifiers are normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseMode {
    /// Fold to upper case, the way Oracle treats unquoted names.
    #[default]
    FoldUpper,
    /// Keep case as given and emit names double-quoted.
    PreserveQuoted,
}

/// Precision and scale used for NUMBER columns without hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NumericDefault {
    /// Total number of significant digits.
    pub precision: u8,
    /// Digits to the right of the decimal point.
    pub scale: i8,
}

impl Default for NumericDefault {
    fn default() -> Self {
        Self {
            precision: 38,
            scale: 10,
        }
    }
}

/// The reserved word set used by the identifier validator.
///
/// Stored upper case. Deserializing a list replaces the default set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ReservedWords(BTreeSet<String>);

impl ReservedWords {
    /// Creates a reserved word set from any list of words.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            words
                .into_iter()
                .map(|w| w.as_ref().to_ascii_uppercase())
                .collect(),
        )
    }

    /// An empty set.
    #[must_use]
    pub const fn none() -> Self {
        Self(BTreeSet::new())
    }

    /// Returns true if `word` is reserved (case-insensitive).
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        if word.bytes().any(|b| b.is_ascii_lowercase()) {
            self.0.contains(&word.to_ascii_uppercase())
        } else {
            self.0.contains(word)
        }
    }

    /// Adds a word to the set.
    pub fn insert(&mut self, word: &str) {
        self.0.insert(word.to_ascii_uppercase());
    }

    /// Number of reserved words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for ReservedWords {
    fn from(words: Vec<String>) -> Self {
        Self::new(words)
    }
}

impl From<ReservedWords> for Vec<String> {
    fn from(words: ReservedWords) -> Self {
        words.0.into_iter().collect()
    }
}

impl Default for ReservedWords {
    fn default() -> Self {
        Self::new(ORACLE_RESERVED_WORDS.iter().copied())
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON for this structure.
    #[error("invalid configuration document: {0}")]
    Json(#[from] serde_json::Error),
    /// A setting is out of range.
    #[error("invalid setting {setting}: {reason}")]
    Invalid {
        /// The offending setting.
        setting: &'static str,
        /// Why it is rejected.
        reason: String,
    },
}

/// Settings shared by the validator, type mapper, builders and extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Identifier length profile.
    pub identifier_profile: IdentifierProfile,
    /// Identifier case handling.
    pub case_mode: CaseMode,
    /// VARCHAR2 length used when a portable string has no length hint.
    /// `None` makes such strings a mapping error.
    pub default_varchar_length: Option<u32>,
    /// Largest VARCHAR2 length the target database accepts.
    pub max_varchar_length: u32,
    /// NUMBER precision and scale used when a portable number has no hints.
    pub default_numeric_precision_scale: NumericDefault,
    /// Render constraints as clauses of CREATE TABLE (`true`) or as one
    /// ALTER TABLE statement each (`false`).
    pub multi_constraint_per_statement: bool,
    /// Words rejected as unquoted identifiers.
    pub reserved_words: ReservedWords,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            identifier_profile: IdentifierProfile::default(),
            case_mode: CaseMode::default(),
            default_varchar_length: Some(4000),
            max_varchar_length: 4000,
            default_numeric_precision_scale: NumericDefault::default(),
            multi_constraint_per_statement: true,
            reserved_words: ReservedWords::default(),
        }
    }
}

impl EngineConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a JSON configuration document.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the identifier profile.
    #[must_use]
    pub fn identifier_profile(mut self, profile: IdentifierProfile) -> Self {
        self.identifier_profile = profile;
        self
    }

    /// Sets the case mode.
    #[must_use]
    pub fn case_mode(mut self, mode: CaseMode) -> Self {
        self.case_mode = mode;
        self
    }

    /// Sets the default VARCHAR2 length (`None` disables the default).
    #[must_use]
    pub fn default_varchar_length(mut self, length: Option<u32>) -> Self {
        self.default_varchar_length = length;
        self
    }

    /// Sets the largest accepted VARCHAR2 length.
    #[must_use]
    pub fn max_varchar_length(mut self, length: u32) -> Self {
        self.max_varchar_length = length;
        self
    }

    /// Sets the default NUMBER precision and scale.
    #[must_use]
    pub fn default_numeric_precision_scale(mut self, precision: u8, scale: i8) -> Self {
        self.default_numeric_precision_scale = NumericDefault { precision, scale };
        self
    }

    /// Chooses inline constraint clauses or separate ALTER statements.
    #[must_use]
    pub fn multi_constraint_per_statement(mut self, enabled: bool) -> Self {
        self.multi_constraint_per_statement = enabled;
        self
    }

    /// Replaces the reserved word set.
    #[must_use]
    pub fn reserved_words(mut self, words: ReservedWords) -> Self {
        self.reserved_words = words;
        self
    }

    /// Checks that every setting is within the range Oracle accepts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_varchar_length == 0 || self.max_varchar_length > VARCHAR2_EXTENDED_LIMIT {
            return Err(ConfigError::Invalid {
                setting: "max_varchar_length",
                reason: format!(
                    "{} is outside 1..={VARCHAR2_EXTENDED_LIMIT}",
                    self.max_varchar_length
                ),
            });
        }
        if let Some(length) = self.default_varchar_length {
            if length == 0 || length > self.max_varchar_length {
                return Err(ConfigError::Invalid {
                    setting: "default_varchar_length",
                    reason: format!("{length} is outside 1..={}", self.max_varchar_length),
                });
            }
        }
        let NumericDefault { precision, scale } = self.default_numeric_precision_scale;
        if !(1..=38).contains(&precision) || !(-84..=127).contains(&scale) {
            return Err(ConfigError::Invalid {
                setting: "default_numeric_precision_scale",
                reason: format!("NUMBER({precision},{scale}) is not a valid Oracle number"),
            });
        }
        if scale == 0 && (precision == 1 || precision == 38) {
            return Err(ConfigError::Invalid {
                setting: "default_numeric_precision_scale",
                reason: format!(
                    "NUMBER({precision},0) is reserved for boolean and integer columns"
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.identifier_profile.max_length(), 30);
        assert_eq!(config.case_mode, CaseMode::FoldUpper);
        assert_eq!(config.default_varchar_length, Some(4000));
        assert_eq!(
            config.default_numeric_precision_scale,
            NumericDefault {
                precision: 38,
                scale: 10
            }
        );
        assert!(config.multi_constraint_per_statement);
        assert!(config.reserved_words.contains("select"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial_document() {
        let config = EngineConfig::from_json(
            r#"{
                "identifier_profile": "extended",
                "case_mode": "preserve_quoted",
                "default_varchar_length": null,
                "multi_constraint_per_statement": false
            }"#,
        )
        .unwrap();
        assert_eq!(config.identifier_profile.max_length(), 128);
        assert_eq!(config.case_mode, CaseMode::PreserveQuoted);
        assert_eq!(config.default_varchar_length, None);
        assert!(!config.multi_constraint_per_statement);
        assert_eq!(config.max_varchar_length, 4000);
    }

    #[test]
    fn test_from_json_replaces_reserved_words() {
        let config = EngineConfig::from_json(r#"{ "reserved_words": ["foo", "BAR"] }"#).unwrap();
        assert_eq!(config.reserved_words.len(), 2);
        assert!(config.reserved_words.contains("FOO"));
        assert!(!config.reserved_words.contains("SELECT"));
    }

    #[test]
    fn test_rejects_integer_like_numeric_default() {
        let err = EngineConfig::from_json(
            r#"{ "default_numeric_precision_scale": { "precision": 38, "scale": 0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                setting: "default_numeric_precision_scale",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_default_length_above_max() {
        let config = EngineConfig::new().default_varchar_length(Some(5000));
        assert!(config.validate().is_err());
        let config = config.max_varchar_length(VARCHAR2_EXTENDED_LIMIT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = EngineConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
