//! The portable column-type vocabulary.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Database-neutral primitive kinds.
///
/// `date`, `date-time` and `binary` are shorthands for `string` with the
/// matching [`TypeFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimitiveKind {
    /// Character data.
    String,
    /// Whole numbers.
    Integer,
    /// Decimal numbers.
    Number,
    /// True or false.
    Boolean,
    /// Shorthand for `string` with format `date`.
    Date,
    /// Shorthand for `string` with format `date-time`.
    DateTime,
    /// Shorthand for `string` with format `binary`.
    Binary,
}

impl PrimitiveKind {
    /// Returns the kind as written in portable documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "date-time",
            Self::Binary => "binary",
        }
    }
}

/// Format hints refining a primitive kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeFormat {
    /// Calendar date (strings).
    Date,
    /// Date and time (strings).
    DateTime,
    /// Raw bytes (strings).
    Binary,
    /// Single precision floating point (numbers).
    Float,
    /// Double precision floating point (numbers).
    Double,
}

impl TypeFormat {
    /// Returns the format as written in portable documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::DateTime => "date-time",
            Self::Binary => "binary",
            Self::Float => "float",
            Self::Double => "double",
        }
    }
}

/// A portable column type: a primitive kind plus optional hints.
///
/// Deserializes from documents such as
/// `{"type": "string", "maxLength": 25}` or
/// `{"kind": "number", "precision": 8, "scale": 2}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortableTypeDescriptor {
    /// The primitive kind.
    #[serde(alias = "type")]
    pub kind: PrimitiveKind,
    /// Optional format refinement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<TypeFormat>,
    /// Maximum length for strings.
    #[serde(default, alias = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    /// Precision for numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
    /// Scale for numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<i8>,
}

impl PortableTypeDescriptor {
    /// Creates a descriptor with no hints.
    #[must_use]
    pub const fn new(kind: PrimitiveKind) -> Self {
        Self {
            kind,
            format: None,
            max_length: None,
            precision: None,
            scale: None,
        }
    }

    /// A string with a maximum length.
    #[must_use]
    pub const fn string(max_length: u32) -> Self {
        Self::new(PrimitiveKind::String).with_max_length(max_length)
    }

    /// An integer.
    #[must_use]
    pub const fn integer() -> Self {
        Self::new(PrimitiveKind::Integer)
    }

    /// A number with precision and scale.
    #[must_use]
    pub const fn number(precision: u8, scale: i8) -> Self {
        Self::new(PrimitiveKind::Number)
            .with_precision(precision)
            .with_scale(scale)
    }

    /// A boolean.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::new(PrimitiveKind::Boolean)
    }

    /// A string in the given format.
    #[must_use]
    pub const fn formatted(kind: PrimitiveKind, format: TypeFormat) -> Self {
        Self::new(kind).with_format(format)
    }

    /// Sets the format hint.
    #[must_use]
    pub const fn with_format(mut self, format: TypeFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Sets the maximum length hint.
    #[must_use]
    pub const fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Sets the precision hint.
    #[must_use]
    pub const fn with_precision(mut self, precision: u8) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Sets the scale hint.
    #[must_use]
    pub const fn with_scale(mut self, scale: i8) -> Self {
        self.scale = Some(scale);
        self
    }
}

impl fmt::Display for PortableTypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_str())?;
        let mut hints = Vec::new();
        if let Some(format) = self.format {
            hints.push(format!("format={}", format.as_str()));
        }
        if let Some(length) = self.max_length {
            hints.push(format!("max_length={length}"));
        }
        if let Some(precision) = self.precision {
            hints.push(format!("precision={precision}"));
        }
        if let Some(scale) = self.scale {
            hints.push(format!("scale={scale}"));
        }
        if !hints.is_empty() {
            write!(f, "({})", hints.join(", "))?;
        }
        Ok(())
    }
}
