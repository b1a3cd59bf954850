//! Oracle column types and the portable type vocabulary.
//!
//! [`NativeType`] models the column types Oracle reports in its catalog.
//! [`PortableTypeDescriptor`] is the database-neutral vocabulary callers
//! use at the boundary, and [`TypeMapper`] converts between the two.

mod mapper;
mod portable;

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

pub use mapper::{MappedColumn, TypeMapper};
pub use portable::{PortableTypeDescriptor, PrimitiveKind, TypeFormat};

/// Length semantics of a character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LengthSemantics {
    /// Length counted in bytes.
    #[default]
    Byte,
    /// Length counted in characters.
    Char,
}

/// Time zone handling of a TIMESTAMP column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeZoneMode {
    /// Plain TIMESTAMP.
    #[default]
    Without,
    /// TIMESTAMP WITH TIME ZONE.
    WithTimeZone,
    /// TIMESTAMP WITH LOCAL TIME ZONE.
    WithLocalTimeZone,
}

/// An Oracle column type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NativeType {
    /// VARCHAR2(n [BYTE|CHAR]).
    Varchar2 {
        /// Maximum length.
        length: u32,
        /// Whether `length` counts bytes or characters.
        semantics: LengthSemantics,
    },
    /// NVARCHAR2(n).
    NVarchar2 {
        /// Maximum length in characters.
        length: u32,
    },
    /// CHAR(n [BYTE|CHAR]).
    Char {
        /// Fixed length.
        length: u32,
        /// Whether `length` counts bytes or characters.
        semantics: LengthSemantics,
    },
    /// NCHAR(n).
    NChar {
        /// Fixed length in characters.
        length: u32,
    },
    /// NUMBER, NUMBER(p) or NUMBER(p,s).
    Number {
        /// Precision, absent for an unconstrained NUMBER.
        precision: Option<u8>,
        /// Scale, absent for an unconstrained NUMBER.
        scale: Option<i8>,
    },
    /// FLOAT(p), binary precision.
    Float {
        /// Binary precision.
        precision: Option<u8>,
    },
    /// BINARY_FLOAT.
    BinaryFloat,
    /// BINARY_DOUBLE.
    BinaryDouble,
    /// DATE.
    Date,
    /// TIMESTAMP[(p)] [WITH [LOCAL] TIME ZONE].
    Timestamp {
        /// Fractional seconds precision.
        fractional_precision: Option<u8>,
        /// Time zone handling.
        time_zone: TimeZoneMode,
    },
    /// RAW(n).
    Raw {
        /// Maximum length in bytes.
        length: u32,
    },
    /// LONG RAW.
    LongRaw,
    /// BLOB.
    Blob,
    /// CLOB.
    Clob,
    /// NCLOB.
    NClob,
    /// LONG.
    Long,
    /// ROWID.
    RowId,
    /// Any other type, kept as its catalog name.
    Other(String),
}

impl NativeType {
    /// VARCHAR2 with byte semantics.
    #[must_use]
    pub const fn varchar2(length: u32) -> Self {
        Self::Varchar2 {
            length,
            semantics: LengthSemantics::Byte,
        }
    }

    /// NUMBER(p,s).
    #[must_use]
    pub const fn number(precision: u8, scale: i8) -> Self {
        Self::Number {
            precision: Some(precision),
            scale: Some(scale),
        }
    }

    /// Plain TIMESTAMP.
    #[must_use]
    pub const fn timestamp() -> Self {
        Self::Timestamp {
            fractional_precision: None,
            time_zone: TimeZoneMode::Without,
        }
    }

    /// Builds a type from the columns of `ALL_TAB_COLUMNS`.
    ///
    /// Unrecognized data types are kept as [`NativeType::Other`].
    #[must_use]
    pub fn from_catalog(column: &CatalogType<'_>) -> Self {
        let length = |value: Option<i64>| value.and_then(|v| u32::try_from(v).ok()).unwrap_or(0);
        let semantics = if column.char_used == Some("C") {
            LengthSemantics::Char
        } else {
            LengthSemantics::Byte
        };
        let char_or_byte_length = match semantics {
            LengthSemantics::Char => length(column.char_length),
            LengthSemantics::Byte => length(column.data_length),
        };

        let data_type = column.data_type.trim().to_ascii_uppercase();
        match data_type.as_str() {
            "VARCHAR2" | "VARCHAR" => Self::Varchar2 {
                length: char_or_byte_length,
                semantics,
            },
            "CHAR" => Self::Char {
                length: char_or_byte_length,
                semantics,
            },
            "NVARCHAR2" => Self::NVarchar2 {
                length: length(column.char_length),
            },
            "NCHAR" => Self::NChar {
                length: length(column.char_length),
            },
            "NUMBER" => Self::Number {
                precision: column.data_precision.and_then(|p| u8::try_from(p).ok()),
                scale: column.data_scale.and_then(|s| i8::try_from(s).ok()),
            },
            "FLOAT" => Self::Float {
                precision: column.data_precision.and_then(|p| u8::try_from(p).ok()),
            },
            "RAW" => Self::Raw {
                length: length(column.data_length),
            },
            _ => match data_type.parse::<Self>() {
                // The catalog reports TIMESTAMP(6) and friends with the
                // precision inside DATA_TYPE and again in DATA_SCALE.
                Ok(Self::Timestamp { time_zone, .. }) => Self::Timestamp {
                    fractional_precision: column.data_scale.and_then(|s| u8::try_from(s).ok()),
                    time_zone,
                },
                Ok(parsed) => parsed,
                Err(_) => Self::Other(data_type),
            },
        }
    }
}

/// The type-describing columns of one `ALL_TAB_COLUMNS` row.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogType<'a> {
    /// `DATA_TYPE`.
    pub data_type: &'a str,
    /// `DATA_LENGTH`.
    pub data_length: Option<i64>,
    /// `DATA_PRECISION`.
    pub data_precision: Option<i64>,
    /// `DATA_SCALE`.
    pub data_scale: Option<i64>,
    /// `CHAR_LENGTH`.
    pub char_length: Option<i64>,
    /// `CHAR_USED` (`B` or `C`).
    pub char_used: Option<&'a str>,
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Varchar2 { length, semantics } => {
                write!(f, "VARCHAR2({length}{})", semantics_suffix(*semantics))
            }
            Self::NVarchar2 { length } => write!(f, "NVARCHAR2({length})"),
            Self::Char { length, semantics } => {
                write!(f, "CHAR({length}{})", semantics_suffix(*semantics))
            }
            Self::NChar { length } => write!(f, "NCHAR({length})"),
            Self::Number { precision, scale } => match (precision, scale) {
                (None, None) => f.write_str("NUMBER"),
                (Some(p), None) => write!(f, "NUMBER({p})"),
                (Some(p), Some(s)) => write!(f, "NUMBER({p},{s})"),
                (None, Some(s)) => write!(f, "NUMBER(*,{s})"),
            },
            Self::Float { precision } => match precision {
                Some(p) => write!(f, "FLOAT({p})"),
                None => f.write_str("FLOAT"),
            },
            Self::BinaryFloat => f.write_str("BINARY_FLOAT"),
            Self::BinaryDouble => f.write_str("BINARY_DOUBLE"),
            Self::Date => f.write_str("DATE"),
            Self::Timestamp {
                fractional_precision,
                time_zone,
            } => {
                f.write_str("TIMESTAMP")?;
                if let Some(p) = fractional_precision {
                    write!(f, "({p})")?;
                }
                match time_zone {
                    TimeZoneMode::Without => Ok(()),
                    TimeZoneMode::WithTimeZone => f.write_str(" WITH TIME ZONE"),
                    TimeZoneMode::WithLocalTimeZone => f.write_str(" WITH LOCAL TIME ZONE"),
                }
            }
            Self::Raw { length } => write!(f, "RAW({length})"),
            Self::LongRaw => f.write_str("LONG RAW"),
            Self::Blob => f.write_str("BLOB"),
            Self::Clob => f.write_str("CLOB"),
            Self::NClob => f.write_str("NCLOB"),
            Self::Long => f.write_str("LONG"),
            Self::RowId => f.write_str("ROWID"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

const fn semantics_suffix(semantics: LengthSemantics) -> &'static str {
    match semantics {
        LengthSemantics::Byte => "",
        LengthSemantics::Char => " CHAR",
    }
}

/// A type name could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse type {text:?}: {reason}")]
pub struct ParseTypeError {
    /// The input text.
    pub text: String,
    /// What was wrong.
    pub reason: &'static str,
}

impl FromStr for NativeType {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason| ParseTypeError {
            text: s.to_string(),
            reason,
        };

        let text = s.split_whitespace().collect::<Vec<_>>().join(" ").to_ascii_uppercase();
        if text.is_empty() {
            return Err(fail("empty type name"));
        }

        let (name, args) = match text.find('(') {
            Some(open) => {
                let close = text[open..]
                    .find(')')
                    .map(|i| open + i)
                    .ok_or_else(|| fail("unbalanced parenthesis"))?;
                let suffix = text[close + 1..].trim();
                if suffix.contains('(') || suffix.contains(')') {
                    return other_type(&text).ok_or_else(|| fail("unsupported type name"));
                }
                let name = format!("{} {suffix}", text[..open].trim());
                (name.trim().to_string(), Some(text[open + 1..close].trim().to_string()))
            }
            None => {
                if text.contains(')') {
                    return Err(fail("unbalanced parenthesis"));
                }
                (text.clone(), None)
            }
        };
        let args = args.as_deref();

        let no_args = |ty: Self| match args {
            None => Ok(ty),
            Some(_) => Err(fail("type takes no arguments")),
        };

        match name.as_str() {
            "VARCHAR2" | "VARCHAR" => {
                let (length, semantics) =
                    parse_length(args.ok_or_else(|| fail("length is required"))?)
                        .ok_or_else(|| fail("invalid length"))?;
                Ok(Self::Varchar2 { length, semantics })
            }
            "CHAR" | "CHARACTER" => {
                let (length, semantics) = match args {
                    Some(a) => parse_length(a).ok_or_else(|| fail("invalid length"))?,
                    None => (1, LengthSemantics::Byte),
                };
                Ok(Self::Char { length, semantics })
            }
            "NVARCHAR2" => {
                let length = parse_u32(args.ok_or_else(|| fail("length is required"))?)
                    .ok_or_else(|| fail("invalid length"))?;
                Ok(Self::NVarchar2 { length })
            }
            "NCHAR" => {
                let length = match args {
                    Some(a) => parse_u32(a).ok_or_else(|| fail("invalid length"))?,
                    None => 1,
                };
                Ok(Self::NChar { length })
            }
            "NUMBER" => {
                let Some(args) = args else {
                    return Ok(Self::Number {
                        precision: None,
                        scale: None,
                    });
                };
                let mut parts = args.split(',').map(str::trim);
                let precision = match parts.next() {
                    Some("*") => None,
                    Some(p) => Some(p.parse::<u8>().map_err(|_| fail("invalid precision"))?),
                    None => None,
                };
                let scale = match parts.next() {
                    Some(s) => Some(s.parse::<i8>().map_err(|_| fail("invalid scale"))?),
                    None => None,
                };
                if parts.next().is_some() {
                    return Err(fail("too many arguments"));
                }
                Ok(Self::Number { precision, scale })
            }
            "INTEGER" | "INT" | "SMALLINT" => no_args(Self::Number {
                precision: None,
                scale: Some(0),
            }),
            "FLOAT" => {
                let precision = match args {
                    Some(a) => Some(a.parse::<u8>().map_err(|_| fail("invalid precision"))?),
                    None => None,
                };
                Ok(Self::Float { precision })
            }
            "BINARY_FLOAT" => no_args(Self::BinaryFloat),
            "BINARY_DOUBLE" => no_args(Self::BinaryDouble),
            "DATE" => no_args(Self::Date),
            "TIMESTAMP" | "TIMESTAMP WITH TIME ZONE" | "TIMESTAMP WITH LOCAL TIME ZONE" => {
                let fractional_precision = match args {
                    Some(a) => {
                        let p = a.parse::<u8>().map_err(|_| fail("invalid precision"))?;
                        if p > 9 {
                            return Err(fail("fractional precision must be 0..=9"));
                        }
                        Some(p)
                    }
                    None => None,
                };
                let time_zone = match name.as_str() {
                    "TIMESTAMP WITH TIME ZONE" => TimeZoneMode::WithTimeZone,
                    "TIMESTAMP WITH LOCAL TIME ZONE" => TimeZoneMode::WithLocalTimeZone,
                    _ => TimeZoneMode::Without,
                };
                Ok(Self::Timestamp {
                    fractional_precision,
                    time_zone,
                })
            }
            "RAW" => {
                let length = parse_u32(args.ok_or_else(|| fail("length is required"))?)
                    .ok_or_else(|| fail("invalid length"))?;
                Ok(Self::Raw { length })
            }
            "LONG RAW" => no_args(Self::LongRaw),
            "BLOB" => no_args(Self::Blob),
            "CLOB" => no_args(Self::Clob),
            "NCLOB" => no_args(Self::NClob),
            "LONG" => no_args(Self::Long),
            "ROWID" => no_args(Self::RowId),
            _ => other_type(&text).ok_or_else(|| fail("unsupported type name")),
        }
    }
}

fn parse_u32(text: &str) -> Option<u32> {
    text.trim().parse().ok()
}

fn parse_length(text: &str) -> Option<(u32, LengthSemantics)> {
    let mut parts = text.split_whitespace();
    let length = parse_u32(parts.next()?)?;
    let semantics = match parts.next() {
        None | Some("BYTE") => LengthSemantics::Byte,
        Some("CHAR") => LengthSemantics::Char,
        Some(_) => return None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some((length, semantics))
}

fn other_type(text: &str) -> Option<NativeType> {
    is_safe_type_name(text).then(|| NativeType::Other(text.to_string()))
}

/// Returns true if a type name can be emitted into DDL verbatim.
///
/// Allows letters, digits, underscores, spaces, commas and balanced
/// parentheses, and requires a leading letter.
#[must_use]
pub fn is_safe_type_name(name: &str) -> bool {
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return false;
    }
    let mut depth = 0_u32;
    for c in name.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            c if c.is_ascii_alphanumeric() || matches!(c, '_' | ' ' | ',') => {}
            _ => return false,
        }
    }
    depth == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(NativeType::varchar2(25).to_string(), "VARCHAR2(25)");
        assert_eq!(
            NativeType::Varchar2 {
                length: 25,
                semantics: LengthSemantics::Char
            }
            .to_string(),
            "VARCHAR2(25 CHAR)"
        );
        assert_eq!(NativeType::number(6, 0).to_string(), "NUMBER(6,0)");
        assert_eq!(
            NativeType::Number {
                precision: None,
                scale: Some(0)
            }
            .to_string(),
            "NUMBER(*,0)"
        );
        assert_eq!(
            NativeType::Timestamp {
                fractional_precision: Some(3),
                time_zone: TimeZoneMode::WithLocalTimeZone
            }
            .to_string(),
            "TIMESTAMP(3) WITH LOCAL TIME ZONE"
        );
        assert_eq!(NativeType::LongRaw.to_string(), "LONG RAW");
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            "varchar2(25 char)".parse::<NativeType>().unwrap(),
            NativeType::Varchar2 {
                length: 25,
                semantics: LengthSemantics::Char
            }
        );
        assert_eq!(
            "NUMBER(8, 2)".parse::<NativeType>().unwrap(),
            NativeType::number(8, 2)
        );
        assert_eq!(
            "NUMBER".parse::<NativeType>().unwrap(),
            NativeType::Number {
                precision: None,
                scale: None
            }
        );
        assert_eq!(
            "TIMESTAMP(6) WITH TIME ZONE".parse::<NativeType>().unwrap(),
            NativeType::Timestamp {
                fractional_precision: Some(6),
                time_zone: TimeZoneMode::WithTimeZone
            }
        );
        assert_eq!("long  raw".parse::<NativeType>().unwrap(), NativeType::LongRaw);
        assert_eq!(
            "INTERVAL DAY(2) TO SECOND(6)".parse::<NativeType>().unwrap(),
            NativeType::Other("INTERVAL DAY(2) TO SECOND(6)".to_string())
        );
    }

    #[test]
    fn test_parse_display_agree() {
        for text in [
            "VARCHAR2(100)",
            "NVARCHAR2(10)",
            "CHAR(1 CHAR)",
            "NUMBER(10,2)",
            "NUMBER(*,0)",
            "FLOAT(126)",
            "TIMESTAMP(9)",
            "RAW(16)",
            "BINARY_DOUBLE",
            "ROWID",
        ] {
            assert_eq!(text.parse::<NativeType>().unwrap().to_string(), text);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("".parse::<NativeType>().is_err());
        assert!("VARCHAR2".parse::<NativeType>().is_err());
        assert!("VARCHAR2(abc)".parse::<NativeType>().is_err());
        assert!("NUMBER(10".parse::<NativeType>().is_err());
        assert!("DATE(3)".parse::<NativeType>().is_err());
        assert!("TIMESTAMP(12)".parse::<NativeType>().is_err());
        assert!("X; DROP TABLE T".parse::<NativeType>().is_err());
    }

    #[test]
    fn test_from_catalog() {
        let varchar = CatalogType {
            data_type: "VARCHAR2",
            data_length: Some(100),
            char_length: Some(25),
            char_used: Some("C"),
            ..CatalogType::default()
        };
        assert_eq!(
            NativeType::from_catalog(&varchar),
            NativeType::Varchar2 {
                length: 25,
                semantics: LengthSemantics::Char
            }
        );

        let integer = CatalogType {
            data_type: "NUMBER",
            data_length: Some(22),
            data_scale: Some(0),
            ..CatalogType::default()
        };
        assert_eq!(
            NativeType::from_catalog(&integer),
            NativeType::Number {
                precision: None,
                scale: Some(0)
            }
        );

        let timestamp = CatalogType {
            data_type: "TIMESTAMP(6) WITH TIME ZONE",
            data_length: Some(13),
            data_scale: Some(6),
            ..CatalogType::default()
        };
        assert_eq!(
            NativeType::from_catalog(&timestamp),
            NativeType::Timestamp {
                fractional_precision: Some(6),
                time_zone: TimeZoneMode::WithTimeZone
            }
        );

        let xml = CatalogType {
            data_type: "XMLTYPE",
            ..CatalogType::default()
        };
        assert_eq!(
            NativeType::from_catalog(&xml),
            NativeType::Other("XMLTYPE".to_string())
        );
    }

    #[test]
    fn test_safe_type_name() {
        assert!(is_safe_type_name("SDO_GEOMETRY"));
        assert!(is_safe_type_name("INTERVAL DAY(2) TO SECOND(6)"));
        assert!(!is_safe_type_name("X)"));
        assert!(!is_safe_type_name("X; DROP"));
        assert!(!is_safe_type_name("1X"));
        assert!(!is_safe_type_name("X -- y"));
    }
}
