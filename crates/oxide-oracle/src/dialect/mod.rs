//! Oracle identifier rules.
//!
//! SQL identifiers (schema, table, column and index names) cannot be
//! passed as bind parameters, so every identifier that reaches SQL text
//! goes through [`IdentifierValidator`] first and is emitted only in its
//! validated, canonical form.
//!
//! # Example
//!
//! ```rust
//! use oxide_oracle::config::EngineConfig;
//! use oxide_oracle::dialect::{IdentifierKind, IdentifierValidator};
//!
//! let config = EngineConfig::default();
//! let validator = IdentifierValidator::new(&config);
//!
//! let table = validator.validate("employees", IdentifierKind::Table).unwrap();
//! assert_eq!(table.as_sql(), "EMPLOYEES");
//!
//! let quoted = validator.validate("\"Order Lines\"", IdentifierKind::Table).unwrap();
//! assert_eq!(quoted.as_sql(), "\"Order Lines\"");
//!
//! assert!(validator.validate("1BADNAME", IdentifierKind::Table).is_err());
//! ```

pub mod reserved;

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{CaseMode, EngineConfig};
use crate::error::{BuildIssue, IdentifierIssue, InvalidIdentifierError, Operation};

/// Shape of a legal unquoted Oracle identifier.
static UNQUOTED_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_$#]*$").expect("identifier pattern is valid")
});

/// What an identifier names. Carried in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    /// A schema (owner).
    Schema,
    /// A table.
    Table,
    /// A column.
    Column,
    /// An index.
    Index,
    /// A constraint.
    Constraint,
    /// A tablespace.
    Tablespace,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Schema => "schema",
            Self::Table => "table",
            Self::Column => "column",
            Self::Index => "index",
            Self::Constraint => "constraint",
            Self::Tablespace => "tablespace",
        })
    }
}

/// An identifier that passed validation.
///
/// `name()` is the form stored in the catalog; `as_sql()` is the form
/// emitted into statements (double-quoted only when required).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValidIdentifier {
    name: String,
    quoted: bool,
}

impl ValidIdentifier {
    /// The catalog form of the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the name must be double-quoted in SQL.
    #[must_use]
    pub const fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// The SQL text for this identifier.
    #[must_use]
    pub fn as_sql(&self) -> String {
        if self.quoted {
            format!("\"{}\"", self.name.replace('"', "\"\""))
        } else {
            self.name.clone()
        }
    }

    /// The canonical form. Validating it again yields the same identifier.
    #[must_use]
    pub fn canonical_form(&self) -> String {
        self.as_sql()
    }

    /// Returns true if `other` names the same object.
    ///
    /// Unquoted candidates compare case-insensitively, quoted ones exactly.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        match strip_quotes(other) {
            Some(inner) => inner.replace("\"\"", "\"") == self.name,
            None => {
                if self.quoted {
                    other == self.name
                } else {
                    other.eq_ignore_ascii_case(&self.name)
                }
            }
        }
    }
}

impl fmt::Display for ValidIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "\"{}\"", self.name.replace('"', "\"\""))
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Validates and normalizes identifiers against the configured profile.
#[derive(Debug, Clone, Copy)]
pub struct IdentifierValidator<'a> {
    config: &'a EngineConfig,
}

impl<'a> IdentifierValidator<'a> {
    /// Creates a validator for a configuration.
    #[must_use]
    pub const fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// The maximum identifier length in bytes.
    #[must_use]
    pub const fn max_length(&self) -> usize {
        self.config.identifier_profile.max_length()
    }

    /// Returns true if `word` is a reserved word in this configuration.
    #[must_use]
    pub fn is_reserved(&self, word: &str) -> bool {
        self.config.reserved_words.contains(word)
    }

    /// Validates a name.
    ///
    /// Input wrapped in double quotes is always treated as quoted. Other
    /// input is case-folded unless the configuration asks for
    /// [`CaseMode::PreserveQuoted`].
    pub fn validate(
        &self,
        raw: &str,
        kind: IdentifierKind,
    ) -> Result<ValidIdentifier, InvalidIdentifierError> {
        self.check(raw, kind, Operation::Validate)
    }

    /// Validates a name in quoted (case-preserving) mode regardless of the
    /// configured case mode.
    pub fn validate_quoted(
        &self,
        raw: &str,
        kind: IdentifierKind,
    ) -> Result<ValidIdentifier, InvalidIdentifierError> {
        let body = strip_quotes(raw).unwrap_or(raw);
        self.check_quoted(raw, body, kind, Operation::Validate)
    }

    /// Validates a name on behalf of another operation.
    pub(crate) fn check(
        &self,
        raw: &str,
        kind: IdentifierKind,
        operation: Operation,
    ) -> Result<ValidIdentifier, InvalidIdentifierError> {
        if let Some(body) = strip_quotes(raw) {
            return self.check_quoted(raw, body, kind, operation);
        }
        match self.config.case_mode {
            CaseMode::FoldUpper => self.check_unquoted(raw, kind, operation),
            CaseMode::PreserveQuoted => self.check_quoted(raw, raw, kind, operation),
        }
    }

    fn check_unquoted(
        &self,
        raw: &str,
        kind: IdentifierKind,
        operation: Operation,
    ) -> Result<ValidIdentifier, InvalidIdentifierError> {
        let fail = |issue| InvalidIdentifierError {
            raw: raw.to_string(),
            kind,
            issue,
            operation,
        };

        if raw.is_empty() {
            return Err(fail(IdentifierIssue::Empty));
        }
        if raw.len() > self.max_length() {
            return Err(fail(IdentifierIssue::TooLong {
                length: raw.len(),
                max: self.max_length(),
            }));
        }
        if !UNQUOTED_IDENTIFIER.is_match(raw) {
            return Err(fail(diagnose_unquoted(raw)));
        }

        let name = raw.to_ascii_uppercase();
        if self.is_reserved(&name) {
            return Err(fail(IdentifierIssue::ReservedWord(name)));
        }
        Ok(ValidIdentifier {
            name,
            quoted: false,
        })
    }

    fn check_quoted(
        &self,
        raw: &str,
        body: &str,
        kind: IdentifierKind,
        operation: Operation,
    ) -> Result<ValidIdentifier, InvalidIdentifierError> {
        let fail = |issue| InvalidIdentifierError {
            raw: raw.to_string(),
            kind,
            issue,
            operation,
        };

        if body.is_empty() {
            return Err(fail(IdentifierIssue::Empty));
        }

        let mut name = String::with_capacity(body.len());
        let mut chars = body.chars().enumerate().peekable();
        while let Some((position, c)) = chars.next() {
            match c {
                '\0' => return Err(fail(IdentifierIssue::NulCharacter)),
                '"' => {
                    if matches!(chars.peek(), Some((_, '"'))) {
                        chars.next();
                        name.push('"');
                    } else {
                        return Err(fail(IdentifierIssue::EmbeddedQuote(position)));
                    }
                }
                other => name.push(other),
            }
        }

        if name.len() > self.max_length() {
            return Err(fail(IdentifierIssue::TooLong {
                length: name.len(),
                max: self.max_length(),
            }));
        }

        // A quoted name that Oracle would also accept unquoted renders bare.
        let quoted = !(UNQUOTED_IDENTIFIER.is_match(&name)
            && !name.bytes().any(|b| b.is_ascii_lowercase())
            && !self.is_reserved(&name));
        Ok(ValidIdentifier { name, quoted })
    }

    /// Derives a generated name such as `CK_EMPLOYEES_ACTIVE` from parts.
    ///
    /// Characters outside `[A-Z0-9_$#]` become underscores. Names longer
    /// than the profile allows are truncated and given a short hash suffix
    /// so distinct inputs stay distinct.
    pub fn derive_name(
        &self,
        kind: IdentifierKind,
        parts: &[&str],
    ) -> Result<ValidIdentifier, InvalidIdentifierError> {
        let joined = parts
            .iter()
            .filter(|p| !p.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("_");
        let mut name: String = joined
            .chars()
            .map(|c| {
                let c = c.to_ascii_uppercase();
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '#') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        let max = self.max_length();
        if name.len() > max {
            let hash = fnv1a(joined.as_bytes());
            name.truncate(max - 9);
            name = format!("{}_{hash:08X}", name.trim_end_matches('_'));
        }
        if self.is_reserved(&name) && name.len() < max {
            name.push('_');
        }
        self.check_unquoted(&name, kind, Operation::Describe)
    }
}

/// Returns the text between surrounding double quotes, if present.
fn strip_quotes(raw: &str) -> Option<&str> {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        Some(&raw[1..raw.len() - 1])
    } else {
        None
    }
}

fn diagnose_unquoted(raw: &str) -> IdentifierIssue {
    let mut chars = raw.chars().enumerate();
    if let Some((_, first)) = chars.next() {
        if !first.is_ascii_alphabetic() {
            return IdentifierIssue::LeadingCharacter(first);
        }
    }
    for (position, c) in chars {
        if !(c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '#')) {
            return IdentifierIssue::IllegalCharacter {
                character: c,
                position,
            };
        }
    }
    IdentifierIssue::Empty
}

fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0x811c_9dc5_u32, |hash, b| {
        (hash ^ u32::from(*b)).wrapping_mul(0x0100_0193)
    })
}

/// Checks catalog expression text (column defaults, check conditions)
/// before it is emitted into DDL.
///
/// Text inside single-quoted literals is ignored; outside of literals a
/// statement terminator or comment marker is rejected, as is an
/// unterminated literal or a NUL character.
pub fn validate_expression(text: &str) -> Result<(), BuildIssue> {
    let unsafe_expression = || BuildIssue::UnsafeExpression(text.to_string());

    if text.trim().is_empty() || text.contains('\0') {
        return Err(unsafe_expression());
    }

    let bytes = text.as_bytes();
    let mut in_literal = false;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if in_literal {
            if b == b'\'' {
                if bytes.get(i + 1) == Some(&b'\'') {
                    i += 1;
                } else {
                    in_literal = false;
                }
            }
        } else {
            match b {
                b'\'' => in_literal = true,
                b';' => return Err(unsafe_expression()),
                b'-' if bytes.get(i + 1) == Some(&b'-') => return Err(unsafe_expression()),
                b'/' if bytes.get(i + 1) == Some(&b'*') => return Err(unsafe_expression()),
                b'*' if bytes.get(i + 1) == Some(&b'/') => return Err(unsafe_expression()),
                _ => {}
            }
        }
        i += 1;
    }

    if in_literal {
        return Err(unsafe_expression());
    }
    Ok(())
}

/// Renders text as a single-quoted SQL literal, doubling embedded quotes.
pub(crate) fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}
