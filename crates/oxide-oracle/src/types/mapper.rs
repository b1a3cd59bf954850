//! Conversion between portable descriptors and Oracle column types.

use crate::config::EngineConfig;
use crate::dialect::{IdentifierKind, IdentifierValidator};
use crate::error::{AmbiguousTypeMappingError, Operation, Result};
use crate::model::{ColumnDescriptor, ConstraintDescriptor, ConstraintKind};

use super::{NativeType, PortableTypeDescriptor, PrimitiveKind, TypeFormat};

/// Largest NUMBER precision.
const MAX_PRECISION: u8 = 38;

/// A column produced from a portable type, plus the check constraint a
/// boolean column needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedColumn {
    /// The column.
    pub column: ColumnDescriptor,
    /// `CHECK (COL IN (0, 1))` for booleans.
    pub check: Option<ConstraintDescriptor>,
}

/// Maps portable type descriptors to Oracle types and back.
///
/// ```rust
/// use oxide_oracle::config::EngineConfig;
/// use oxide_oracle::types::{NativeType, PortableTypeDescriptor, TypeMapper};
///
/// let config = EngineConfig::default();
/// let mapper = TypeMapper::new(&config);
///
/// let native = mapper.to_native(&PortableTypeDescriptor::string(25)).unwrap();
/// assert_eq!(native, NativeType::varchar2(25));
/// assert_eq!(mapper.to_portable(&native).unwrap(), PortableTypeDescriptor::string(25));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper<'a> {
    config: &'a EngineConfig,
}

impl<'a> TypeMapper<'a> {
    /// Creates a mapper for a configuration.
    #[must_use]
    pub const fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Rewrites a descriptor into the form [`TypeMapper::to_portable`]
    /// returns for its native type.
    ///
    /// Kind shorthands become `string` plus a format, configured defaults
    /// fill missing hints, and hints that do not apply to the kind are
    /// dropped. Fails exactly when [`TypeMapper::to_native`] fails.
    pub fn canonicalize(
        &self,
        portable: &PortableTypeDescriptor,
    ) -> core::result::Result<PortableTypeDescriptor, AmbiguousTypeMappingError> {
        let fail = |reason: String| AmbiguousTypeMappingError {
            type_name: portable.to_string(),
            reason,
            operation: Operation::ToNative,
        };

        let (kind, format) = match (portable.kind, portable.format) {
            (PrimitiveKind::Date, None | Some(TypeFormat::Date)) => {
                (PrimitiveKind::String, Some(TypeFormat::Date))
            }
            (PrimitiveKind::DateTime, None | Some(TypeFormat::DateTime)) => {
                (PrimitiveKind::String, Some(TypeFormat::DateTime))
            }
            (PrimitiveKind::Binary, None | Some(TypeFormat::Binary)) => {
                (PrimitiveKind::String, Some(TypeFormat::Binary))
            }
            (PrimitiveKind::Date | PrimitiveKind::DateTime | PrimitiveKind::Binary, Some(f)) => {
                return Err(fail(format!(
                    "format {} conflicts with kind {}",
                    f.as_str(),
                    portable.kind.as_str()
                )));
            }
            other => other,
        };

        match (kind, format) {
            (PrimitiveKind::String, None) => {
                let length = portable
                    .max_length
                    .or(self.config.default_varchar_length)
                    .ok_or_else(|| {
                        fail("string has no max_length and no default length is configured".into())
                    })?;
                if length == 0 || length > self.config.max_varchar_length {
                    return Err(fail(format!(
                        "max_length {length} is outside 1..={}",
                        self.config.max_varchar_length
                    )));
                }
                Ok(PortableTypeDescriptor::string(length))
            }
            (
                PrimitiveKind::String,
                Some(f @ (TypeFormat::Date | TypeFormat::DateTime | TypeFormat::Binary)),
            ) => Ok(PortableTypeDescriptor::formatted(PrimitiveKind::String, f)),
            (PrimitiveKind::Integer, None) => Ok(PortableTypeDescriptor::integer()),
            (PrimitiveKind::Boolean, None) => Ok(PortableTypeDescriptor::boolean()),
            (PrimitiveKind::Number, None) => {
                let (precision, scale) = match (portable.precision, portable.scale) {
                    (None, None) => {
                        let d = self.config.default_numeric_precision_scale;
                        (d.precision, d.scale)
                    }
                    (Some(p), None) => (p, 0),
                    (None, Some(s)) => (MAX_PRECISION, s),
                    (Some(p), Some(s)) => (p, s),
                };
                if !(1..=MAX_PRECISION).contains(&precision) {
                    return Err(fail(format!("precision {precision} is outside 1..=38")));
                }
                if !(-84..=127).contains(&scale) {
                    return Err(fail(format!("scale {scale} is outside -84..=127")));
                }
                if scale == 0 && (precision == 1 || precision == MAX_PRECISION) {
                    return Err(fail(format!(
                        "NUMBER({precision},0) is reserved for {} columns",
                        if precision == 1 { "boolean" } else { "integer" }
                    )));
                }
                Ok(PortableTypeDescriptor::number(precision, scale))
            }
            (PrimitiveKind::Number, Some(f @ (TypeFormat::Float | TypeFormat::Double))) => {
                Ok(PortableTypeDescriptor::formatted(PrimitiveKind::Number, f))
            }
            (kind, Some(f)) => Err(fail(format!(
                "format {} does not apply to kind {}",
                f.as_str(),
                kind.as_str()
            ))),
            (kind, None) => Err(fail(format!("kind {} needs a format", kind.as_str()))),
        }
    }

    /// Picks the Oracle type for a portable descriptor.
    pub fn to_native(
        &self,
        portable: &PortableTypeDescriptor,
    ) -> core::result::Result<NativeType, AmbiguousTypeMappingError> {
        let canonical = self.canonicalize(portable)?;
        let native = match (canonical.kind, canonical.format) {
            (PrimitiveKind::String, Some(TypeFormat::DateTime)) => NativeType::timestamp(),
            (PrimitiveKind::String, Some(TypeFormat::Date)) => NativeType::Date,
            (PrimitiveKind::String, Some(TypeFormat::Binary)) => NativeType::Blob,
            (PrimitiveKind::Number, Some(TypeFormat::Float)) => NativeType::BinaryFloat,
            (PrimitiveKind::Number, Some(TypeFormat::Double)) => NativeType::BinaryDouble,
            (PrimitiveKind::Integer, _) => NativeType::number(MAX_PRECISION, 0),
            (PrimitiveKind::Boolean, _) => NativeType::number(1, 0),
            (PrimitiveKind::Number, _) => NativeType::Number {
                precision: canonical.precision,
                scale: canonical.scale,
            },
            // canonicalize leaves only a length-bearing string here
            _ => NativeType::varchar2(canonical.max_length.unwrap_or(1)),
        };
        Ok(native)
    }

    /// Describes an Oracle type in portable terms.
    ///
    /// This is a partial inverse of [`TypeMapper::to_native`]: every type
    /// `to_native` produces maps back to the canonical descriptor, and
    /// several other catalog types map onto the nearest portable kind.
    pub fn to_portable(
        &self,
        native: &NativeType,
    ) -> core::result::Result<PortableTypeDescriptor, AmbiguousTypeMappingError> {
        let portable = match native {
            NativeType::Varchar2 { length, .. }
            | NativeType::Char { length, .. }
            | NativeType::NVarchar2 { length }
            | NativeType::NChar { length } => PortableTypeDescriptor::string(*length),
            NativeType::Clob | NativeType::NClob | NativeType::Long => {
                PortableTypeDescriptor::new(PrimitiveKind::String)
            }
            NativeType::Number {
                precision: None | Some(MAX_PRECISION),
                scale: Some(0),
            } => PortableTypeDescriptor::integer(),
            NativeType::Number {
                precision: Some(1),
                scale: Some(0),
            } => PortableTypeDescriptor::boolean(),
            NativeType::Number { precision, scale } => PortableTypeDescriptor {
                precision: *precision,
                scale: *scale,
                ..PortableTypeDescriptor::new(PrimitiveKind::Number)
            },
            NativeType::Float { .. } => PortableTypeDescriptor::new(PrimitiveKind::Number),
            NativeType::BinaryFloat => {
                PortableTypeDescriptor::formatted(PrimitiveKind::Number, TypeFormat::Float)
            }
            NativeType::BinaryDouble => {
                PortableTypeDescriptor::formatted(PrimitiveKind::Number, TypeFormat::Double)
            }
            NativeType::Date => {
                PortableTypeDescriptor::formatted(PrimitiveKind::String, TypeFormat::Date)
            }
            NativeType::Timestamp { .. } => {
                PortableTypeDescriptor::formatted(PrimitiveKind::String, TypeFormat::DateTime)
            }
            NativeType::Blob | NativeType::Raw { .. } | NativeType::LongRaw => {
                PortableTypeDescriptor::formatted(PrimitiveKind::String, TypeFormat::Binary)
            }
            NativeType::RowId | NativeType::Other(_) => {
                return Err(AmbiguousTypeMappingError {
                    type_name: native.to_string(),
                    reason: "no portable equivalent".to_string(),
                    operation: Operation::ToPortable,
                });
            }
        };
        Ok(portable)
    }

    /// Builds a column from a portable type.
    ///
    /// Boolean columns come with a generated `CHECK (COL IN (0, 1))`
    /// constraint named `CK_<TABLE>_<COLUMN>`.
    pub fn column_from_portable(
        &self,
        table: &str,
        column: &str,
        portable: &PortableTypeDescriptor,
    ) -> Result<MappedColumn> {
        let validator = IdentifierValidator::new(self.config);
        let table = validator.check(table, IdentifierKind::Table, Operation::ToNative)?;
        let name = validator.check(column, IdentifierKind::Column, Operation::ToNative)?;
        let native = self.to_native(portable)?;

        let check = if native == NativeType::number(1, 0) {
            let constraint = validator.derive_name(
                IdentifierKind::Constraint,
                &["CK", table.name(), name.name()],
            )?;
            Some(ConstraintDescriptor::new(
                constraint,
                ConstraintKind::Check {
                    condition: format!("{name} IN (0, 1)"),
                },
                vec![name.clone()],
            ))
        } else {
            None
        };

        Ok(MappedColumn {
            column: ColumnDescriptor::new(name, native),
            check,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::TimeZoneMode;

    fn mapper_with(config: &EngineConfig) -> TypeMapper<'_> {
        TypeMapper::new(config)
    }

    #[test]
    fn test_string_uses_length_or_default() {
        let config = EngineConfig::default();
        let mapper = mapper_with(&config);
        assert_eq!(
            mapper.to_native(&PortableTypeDescriptor::string(25)).unwrap(),
            NativeType::varchar2(25)
        );
        assert_eq!(
            mapper
                .to_native(&PortableTypeDescriptor::new(PrimitiveKind::String))
                .unwrap(),
            NativeType::varchar2(4000)
        );
    }

    #[test]
    fn test_string_without_length_fails_without_default() {
        let config = EngineConfig::default().default_varchar_length(None);
        let mapper = mapper_with(&config);
        let err = mapper
            .to_native(&PortableTypeDescriptor::new(PrimitiveKind::String))
            .unwrap_err();
        assert_eq!(err.operation, Operation::ToNative);
    }

    #[test]
    fn test_string_length_bounds() {
        let config = EngineConfig::default();
        let mapper = mapper_with(&config);
        assert!(mapper.to_native(&PortableTypeDescriptor::string(0)).is_err());
        assert!(mapper.to_native(&PortableTypeDescriptor::string(4001)).is_err());
        assert!(mapper.to_native(&PortableTypeDescriptor::string(4000)).is_ok());
    }

    #[test]
    fn test_formats() {
        let config = EngineConfig::default();
        let mapper = mapper_with(&config);
        let cases = [
            (PrimitiveKind::String, TypeFormat::DateTime, NativeType::timestamp()),
            (PrimitiveKind::String, TypeFormat::Date, NativeType::Date),
            (PrimitiveKind::String, TypeFormat::Binary, NativeType::Blob),
            (PrimitiveKind::Number, TypeFormat::Float, NativeType::BinaryFloat),
            (PrimitiveKind::Number, TypeFormat::Double, NativeType::BinaryDouble),
        ];
        for (kind, format, native) in cases {
            let portable = PortableTypeDescriptor::formatted(kind, format);
            assert_eq!(mapper.to_native(&portable).unwrap(), native);
            assert_eq!(mapper.to_portable(&native).unwrap(), portable);
        }
    }

    #[test]
    fn test_kind_shorthands() {
        let config = EngineConfig::default();
        let mapper = mapper_with(&config);
        let date_time = PortableTypeDescriptor::new(PrimitiveKind::DateTime);
        assert_eq!(mapper.to_native(&date_time).unwrap(), NativeType::timestamp());
        assert_eq!(
            mapper.canonicalize(&date_time).unwrap(),
            PortableTypeDescriptor::formatted(PrimitiveKind::String, TypeFormat::DateTime)
        );
        let conflicting = PortableTypeDescriptor::formatted(PrimitiveKind::Date, TypeFormat::Binary);
        assert!(mapper.to_native(&conflicting).is_err());
    }

    #[test]
    fn test_inapplicable_format_fails() {
        let config = EngineConfig::default();
        let mapper = mapper_with(&config);
        assert!(mapper
            .to_native(&PortableTypeDescriptor::formatted(
                PrimitiveKind::Integer,
                TypeFormat::Date
            ))
            .is_err());
        assert!(mapper
            .to_native(&PortableTypeDescriptor::formatted(
                PrimitiveKind::String,
                TypeFormat::Double
            ))
            .is_err());
    }

    #[test]
    fn test_numbers() {
        let config = EngineConfig::default();
        let mapper = mapper_with(&config);
        assert_eq!(
            mapper.to_native(&PortableTypeDescriptor::integer()).unwrap(),
            NativeType::number(38, 0)
        );
        assert_eq!(
            mapper.to_native(&PortableTypeDescriptor::boolean()).unwrap(),
            NativeType::number(1, 0)
        );
        assert_eq!(
            mapper
                .to_native(&PortableTypeDescriptor::new(PrimitiveKind::Number))
                .unwrap(),
            NativeType::number(38, 10)
        );
        assert_eq!(
            mapper
                .to_native(&PortableTypeDescriptor::new(PrimitiveKind::Number).with_precision(10))
                .unwrap(),
            NativeType::number(10, 0)
        );
        assert_eq!(
            mapper.to_native(&PortableTypeDescriptor::number(8, 2)).unwrap(),
            NativeType::number(8, 2)
        );
    }

    #[test]
    fn test_number_range_and_ambiguity() {
        let config = EngineConfig::default();
        let mapper = mapper_with(&config);
        assert!(mapper.to_native(&PortableTypeDescriptor::number(0, 0)).is_err());
        assert!(mapper.to_native(&PortableTypeDescriptor::number(39, 2)).is_err());
        assert!(mapper.to_native(&PortableTypeDescriptor::number(10, -85)).is_err());
        let err = mapper
            .to_native(&PortableTypeDescriptor::number(38, 0))
            .unwrap_err();
        assert!(err.reason.contains("integer"));
        let err = mapper
            .to_native(&PortableTypeDescriptor::new(PrimitiveKind::Number).with_precision(1))
            .unwrap_err();
        assert!(err.reason.contains("boolean"));
    }

    #[test]
    fn test_to_portable_catalog_types() {
        let config = EngineConfig::default();
        let mapper = mapper_with(&config);
        assert_eq!(
            mapper
                .to_portable(&"NVARCHAR2(30)".parse().unwrap())
                .unwrap(),
            PortableTypeDescriptor::string(30)
        );
        assert_eq!(
            mapper.to_portable(&NativeType::Clob).unwrap(),
            PortableTypeDescriptor::new(PrimitiveKind::String)
        );
        assert_eq!(
            mapper.to_portable(&"NUMBER(*,0)".parse().unwrap()).unwrap(),
            PortableTypeDescriptor::integer()
        );
        assert_eq!(
            mapper.to_portable(&"NUMBER(6,0)".parse().unwrap()).unwrap(),
            PortableTypeDescriptor::number(6, 0)
        );
        assert_eq!(
            mapper
                .to_portable(&NativeType::Timestamp {
                    fractional_precision: Some(6),
                    time_zone: TimeZoneMode::WithTimeZone,
                })
                .unwrap(),
            PortableTypeDescriptor::formatted(PrimitiveKind::String, TypeFormat::DateTime)
        );
        assert_eq!(
            mapper.to_portable(&NativeType::Raw { length: 16 }).unwrap(),
            PortableTypeDescriptor::formatted(PrimitiveKind::String, TypeFormat::Binary)
        );
        let err = mapper.to_portable(&NativeType::RowId).unwrap_err();
        assert_eq!(err.operation, Operation::ToPortable);
        assert!(mapper
            .to_portable(&NativeType::Other("XMLTYPE".into()))
            .is_err());
    }

    #[test]
    fn test_date_time_round_trip() {
        let config = EngineConfig::default();
        let mapper = mapper_with(&config);
        let portable: PortableTypeDescriptor =
            serde_json::from_str(r#"{"kind": "string", "format": "date-time"}"#).unwrap();
        let native = mapper.to_native(&portable).unwrap();
        assert_eq!(native.to_string(), "TIMESTAMP");
        assert_eq!(mapper.to_portable(&native).unwrap(), portable);
    }

    #[test]
    fn test_boolean_column_gets_check() {
        let config = EngineConfig::default();
        let mapper = mapper_with(&config);
        let mapped = mapper
            .column_from_portable("employees", "is_active", &PortableTypeDescriptor::boolean())
            .unwrap();
        assert_eq!(mapped.column.native_type(), &NativeType::number(1, 0));
        let check = mapped.check.unwrap();
        assert_eq!(check.name().as_sql(), "CK_EMPLOYEES_IS_ACTIVE");
        assert_eq!(
            check.kind(),
            &ConstraintKind::Check {
                condition: "IS_ACTIVE IN (0, 1)".to_string()
            }
        );

        let mapped = mapper
            .column_from_portable("employees", "hired", &PortableTypeDescriptor::new(PrimitiveKind::Date))
            .unwrap();
        assert!(mapped.check.is_none());
    }

    #[test]
    fn test_column_from_portable_validates_names() {
        let config = EngineConfig::default();
        let mapper = mapper_with(&config);
        let err = mapper
            .column_from_portable("employees", "1col", &PortableTypeDescriptor::integer())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier(_)));
    }
}
