/// Parameter Module
///
/// Argument values handed to the binder, the driver parameter types they map
/// to, and the bound parameters attached to a pending command.

use crate::core::{DbError, Result};
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use rusqlite::types::{ToSqlOutput, Value};
use rusqlite::ToSql;

/// Driver parameter types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Untyped binary, used for NULL arguments
    Raw,
    Date,
    Byte,
    Int16,
    Int32,
    Int64,
    Char,
    Varchar,
    Decimal,
    Double,
}

/// Direction of a bound parameter. Only input parameters are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamDirection {
    #[default]
    Input,
}

/// An argument value supplied to the binder.
///
/// The last four variants have no driver mapping; binding them fails with
/// [`DbError::UnsupportedParameterType`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    DateTime(NaiveDateTime),
    Byte(u8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Char(char),
    Text(String),
    Float(f32),
    Decimal(BigDecimal),
    Double(f64),
    Bool(bool),
    UInt32(u32),
    UInt64(u64),
    Bytes(Vec<u8>),
}

impl ParamValue {
    /// Name of the native type held by this value
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Null => "null",
            ParamValue::DateTime(_) => "NaiveDateTime",
            ParamValue::Byte(_) => "u8",
            ParamValue::Int16(_) => "i16",
            ParamValue::Int32(_) => "i32",
            ParamValue::Int64(_) => "i64",
            ParamValue::Char(_) => "char",
            ParamValue::Text(_) => "String",
            ParamValue::Float(_) => "f32",
            ParamValue::Decimal(_) => "BigDecimal",
            ParamValue::Double(_) => "f64",
            ParamValue::Bool(_) => "bool",
            ParamValue::UInt32(_) => "u32",
            ParamValue::UInt64(_) => "u64",
            ParamValue::Bytes(_) => "Vec<u8>",
        }
    }
}

macro_rules! impl_from_native {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    ParamValue::$variant(value)
                }
            }
        )*
    };
}

impl_from_native! {
    NaiveDateTime => DateTime,
    u8 => Byte,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    char => Char,
    String => Text,
    f32 => Float,
    BigDecimal => Decimal,
    f64 => Double,
    bool => Bool,
    u32 => UInt32,
    u64 => UInt64,
    Vec<u8> => Bytes,
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamValue::Null, Into::into)
    }
}

/// Maps an argument to the driver type used to bind it.
///
/// Dispatch is on the exact variant; there is no widening between numeric
/// types, so unsigned integers and booleans are rejected.
pub fn infer_param_type(value: &ParamValue) -> Result<ParamType> {
    match value {
        ParamValue::Null => Ok(ParamType::Raw),
        ParamValue::DateTime(_) => Ok(ParamType::Date),
        ParamValue::Byte(_) => Ok(ParamType::Byte),
        ParamValue::Int16(_) => Ok(ParamType::Int16),
        ParamValue::Int32(_) => Ok(ParamType::Int32),
        ParamValue::Int64(_) => Ok(ParamType::Int64),
        ParamValue::Char(_) => Ok(ParamType::Char),
        ParamValue::Text(_) => Ok(ParamType::Varchar),
        ParamValue::Float(_) | ParamValue::Decimal(_) => Ok(ParamType::Decimal),
        ParamValue::Double(_) => Ok(ParamType::Double),
        ParamValue::Bool(_) | ParamValue::UInt32(_) | ParamValue::UInt64(_) | ParamValue::Bytes(_) => {
            Err(DbError::UnsupportedParameterType {
                type_name: value.type_name(),
            })
        }
    }
}

/// A named input parameter attached to a pending command.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParameter {
    name: String,
    param_type: ParamType,
    value: ParamValue,
    direction: ParamDirection,
}

impl BoundParameter {
    /// Binds `value` under `par<index>` with its inferred type.
    pub fn new(index: usize, value: ParamValue) -> Result<Self> {
        let param_type = infer_param_type(&value)?;
        Ok(BoundParameter {
            name: format!("par{}", index),
            param_type,
            value,
            direction: ParamDirection::Input,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name as referenced from statement text, e.g. `:par0`
    pub fn placeholder(&self) -> String {
        format!(":{}", self.name)
    }

    pub fn param_type(&self) -> ParamType {
        self.param_type
    }

    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    pub fn direction(&self) -> ParamDirection {
        self.direction
    }
}

impl ToSql for BoundParameter {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match (&self.value, self.param_type) {
            (ParamValue::Null, _) => Value::Null,
            (ParamValue::DateTime(dt), _) => {
                Value::Text(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string())
            }
            (ParamValue::Byte(v), _) => Value::Integer(i64::from(*v)),
            (ParamValue::Int16(v), _) => Value::Integer(i64::from(*v)),
            (ParamValue::Int32(v), _) => Value::Integer(i64::from(*v)),
            (ParamValue::Int64(v), _) => Value::Integer(*v),
            (ParamValue::Char(c), _) => Value::Text(c.to_string()),
            (ParamValue::Text(s), _) => return Ok(ToSqlOutput::from(s.as_str())),
            // Decimal-declared values travel as text so no digits are lost to f64
            (ParamValue::Float(f), ParamType::Decimal) => Value::Text(f.to_string()),
            (ParamValue::Float(f), _) => Value::Real(f64::from(*f)),
            (ParamValue::Decimal(d), _) => Value::Text(d.to_string()),
            (ParamValue::Double(v), _) => Value::Real(*v),
            (other, _) => {
                return Err(rusqlite::Error::ToSqlConversionFailure(Box::new(
                    DbError::UnsupportedParameterType {
                        type_name: other.type_name(),
                    },
                )))
            }
        };
        Ok(ToSqlOutput::Owned(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    #[test]
    fn test_null_maps_to_raw() {
        assert_eq!(infer_param_type(&ParamValue::Null).unwrap(), ParamType::Raw);
        assert_eq!(
            infer_param_type(&ParamValue::from(None::<i32>)).unwrap(),
            ParamType::Raw
        );
    }

    #[test]
    fn test_supported_types() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(13, 45, 0)
            .unwrap();
        let cases: Vec<(ParamValue, ParamType)> = vec![
            (date.into(), ParamType::Date),
            (7u8.into(), ParamType::Byte),
            (7i16.into(), ParamType::Int16),
            (7i32.into(), ParamType::Int32),
            (7i64.into(), ParamType::Int64),
            ('x'.into(), ParamType::Char),
            ("Ann".into(), ParamType::Varchar),
            (1.5f32.into(), ParamType::Decimal),
            (BigDecimal::from_str("1.25").unwrap().into(), ParamType::Decimal),
            (2.5f64.into(), ParamType::Double),
        ];
        for (value, expected) in cases {
            assert_eq!(infer_param_type(&value).unwrap(), expected, "{:?}", value);
        }
    }

    #[test]
    fn test_unsupported_types() {
        for value in [
            ParamValue::from(true),
            ParamValue::from(1u32),
            ParamValue::from(1u64),
            ParamValue::from(vec![1u8, 2]),
        ] {
            match infer_param_type(&value) {
                Err(DbError::UnsupportedParameterType { type_name }) => {
                    assert_eq!(type_name, value.type_name())
                }
                other => panic!("Expected UnsupportedParameterType, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_bound_parameter_shape() {
        let param = BoundParameter::new(3, ParamValue::from("x")).unwrap();
        assert_eq!(param.name(), "par3");
        assert_eq!(param.placeholder(), ":par3");
        assert_eq!(param.param_type(), ParamType::Varchar);
        assert_eq!(param.direction(), ParamDirection::Input);
    }

    #[test]
    fn test_decimal_binds_as_text() {
        let param = BoundParameter::new(
            0,
            BigDecimal::from_str("12345678901234567890.123456789").unwrap().into(),
        )
        .unwrap();
        match param.to_sql().unwrap() {
            ToSqlOutput::Owned(Value::Text(s)) => assert_eq!(s, "12345678901234567890.123456789"),
            other => panic!("Unexpected output {:?}", other),
        }
    }

    #[test]
    fn test_date_binds_as_iso_text() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        let param = BoundParameter::new(0, date.into()).unwrap();
        match param.to_sql().unwrap() {
            ToSqlOutput::Owned(Value::Text(s)) => assert_eq!(s, "2023-01-02 03:04:05"),
            other => panic!("Unexpected output {:?}", other),
        }
    }
}
