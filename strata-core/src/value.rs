use crate::{Result, StrataError};
use atoi::FromRadix10SignedChecked;
use std::{
    any,
    collections::BTreeMap,
    fmt::{self, Display},
};
use time::{
    PrimitiveDateTime,
    format_description::BorrowedFormatItem,
    macros::{datetime, format_description},
};

/// Key/value row, used by map returning queries and map payloads.
pub type Record = BTreeMap<String, Value>;

/// Layout used to write and read time values as text.
pub const TIME_LAYOUT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// The zero time, it means "unset" and is never written on insert.
pub const ZERO_TIME: PrimitiveDateTime = datetime!(0001-01-01 0:00);

#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Timestamp(Option<PrimitiveDateTime>),
    List(Vec<Value>),
    Map(Record),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Value::Null
                | Value::Boolean(None)
                | Value::Int8(None)
                | Value::Int16(None)
                | Value::Int32(None)
                | Value::Int64(None)
                | Value::UInt8(None)
                | Value::UInt16(None)
                | Value::UInt32(None)
                | Value::UInt64(None)
                | Value::Float32(None)
                | Value::Float64(None)
                | Value::Varchar(None)
                | Value::Blob(None)
                | Value::Timestamp(None)
        )
    }

    /// A value that can be passed as a single positional parameter.
    pub fn is_bindable(&self) -> bool {
        !matches!(self, Value::List(..) | Value::Map(..))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(..) => "boolean",
            Value::Int8(..) => "int8",
            Value::Int16(..) => "int16",
            Value::Int32(..) => "int32",
            Value::Int64(..) => "int64",
            Value::UInt8(..) => "uint8",
            Value::UInt16(..) => "uint16",
            Value::UInt32(..) => "uint32",
            Value::UInt64(..) => "uint64",
            Value::Float32(..) => "float32",
            Value::Float64(..) => "float64",
            Value::Varchar(..) => "varchar",
            Value::Blob(..) => "blob",
            Value::Timestamp(..) => "timestamp",
            Value::List(..) => "list",
            Value::Map(..) => "map",
        }
    }

    /// Raw bytes coming back from a driver are exposed as text in records.
    pub fn into_text_if_blob(self) -> Value {
        match self {
            Value::Blob(Some(v)) => Value::Varchar(Some(String::from_utf8_lossy(&v).into_owned())),
            Value::Blob(None) => Value::Varchar(None),
            v => v,
        }
    }

    fn as_i128(&self) -> Option<i128> {
        Some(match *self {
            Value::Int8(Some(v)) => v as i128,
            Value::Int16(Some(v)) => v as i128,
            Value::Int32(Some(v)) => v as i128,
            Value::Int64(Some(v)) => v as i128,
            Value::UInt8(Some(v)) => v as i128,
            Value::UInt16(Some(v)) => v as i128,
            Value::UInt32(Some(v)) => v as i128,
            Value::UInt64(Some(v)) => v as i128,
            Value::Boolean(Some(v)) => v as i128,
            _ => return None,
        })
    }

    fn as_text(&self) -> Option<&[u8]> {
        match self {
            Value::Varchar(Some(v)) => Some(v.as_bytes()),
            Value::Blob(Some(v)) => Some(v),
            _ => None,
        }
    }
}

/// Conversion out of a dynamic [`Value`], the counterpart of `Into<Value>`.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

macro_rules! impl_from_value_integer {
    ($($source:ty => $variant:path),+ $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    $variant(Some(value as _))
                }
            }
            impl FromValue for $source {
                fn from_value(value: Value) -> Result<Self> {
                    if let Some(v) = value.as_i128() {
                        return <$source>::try_from(v).map_err(|_| {
                            StrataError::conversion(&value, any::type_name::<Self>()).into()
                        });
                    }
                    if let Some(text) = value.as_text() {
                        if let (Some(v), len) = <$source>::from_radix_10_signed_checked(text) {
                            if len == text.len() && len > 0 {
                                return Ok(v);
                            }
                        }
                    }
                    Err(StrataError::conversion(&value, any::type_name::<Self>()).into())
                }
            }
        )+
    };
}

impl_from_value_integer!(
    i8 => Value::Int8,
    i16 => Value::Int16,
    i32 => Value::Int32,
    i64 => Value::Int64,
    isize => Value::Int64,
    u8 => Value::UInt8,
    u16 => Value::UInt16,
    u32 => Value::UInt32,
    u64 => Value::UInt64,
    usize => Value::UInt64,
);

macro_rules! impl_from_value_float {
    ($($source:ty => $variant:path),+ $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    $variant(Some(value))
                }
            }
            impl FromValue for $source {
                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::Float32(Some(v)) => Ok(v as _),
                        Value::Float64(Some(v)) => Ok(v as _),
                        ref v => {
                            if let Some(v) = v.as_i128() {
                                return Ok(v as _);
                            }
                            if let Some(text) = v.as_text() {
                                if let Ok(v) = fast_float::parse::<$source, _>(text) {
                                    return Ok(v);
                                }
                            }
                            Err(StrataError::conversion(v, any::type_name::<Self>()).into())
                        }
                    }
                }
            }
        )+
    };
}

impl_from_value_float!(f32 => Value::Float32, f64 => Value::Float64);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(Some(value))
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        if let Value::Boolean(Some(v)) = value {
            return Ok(v);
        }
        if let Some(v) = value.as_i128() {
            return Ok(v != 0);
        }
        match value.as_text() {
            Some(b"1" | b"true" | b"TRUE" | b"t") => Ok(true),
            Some(b"0" | b"false" | b"FALSE" | b"f") => Ok(false),
            _ => Err(StrataError::conversion(&value, "bool").into()),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Varchar(Some(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.to_string()))
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        Ok(match value {
            Value::Varchar(Some(v)) => v,
            Value::Blob(Some(v)) => String::from_utf8_lossy(&v).into_owned(),
            Value::Boolean(Some(v)) => if v { "1" } else { "0" }.to_string(),
            Value::Float32(Some(v)) => ryu::Buffer::new().format(v).to_string(),
            Value::Float64(Some(v)) => ryu::Buffer::new().format(v).to_string(),
            Value::Timestamp(Some(v)) => v
                .format(TIME_LAYOUT)
                .map_err(|_| StrataError::conversion(&value, "String"))?,
            ref v => match v.as_i128() {
                Some(v) => itoa::Buffer::new().format(v).to_string(),
                None => return Err(StrataError::conversion(v, "String").into()),
            },
        })
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(Some(value.into_boxed_slice()))
    }
}

impl From<Box<[u8]>> for Value {
    fn from(value: Box<[u8]>) -> Self {
        Value::Blob(Some(value))
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v.into_vec()),
            Value::Varchar(Some(v)) => Ok(v.into_bytes()),
            v => Err(StrataError::conversion(&v, "Vec<u8>").into()),
        }
    }
}

impl From<PrimitiveDateTime> for Value {
    fn from(value: PrimitiveDateTime) -> Self {
        Value::Timestamp(Some(value))
    }
}

impl FromValue for PrimitiveDateTime {
    fn from_value(value: Value) -> Result<Self> {
        if let Value::Timestamp(Some(v)) = value {
            return Ok(v);
        }
        let parsed = value
            .as_text()
            .and_then(|v| std::str::from_utf8(v).ok())
            .and_then(|v| PrimitiveDateTime::parse(v.trim(), TIME_LAYOUT).ok());
        parsed.ok_or_else(|| StrataError::conversion(&value, "PrimitiveDateTime").into())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(value: [T; N]) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Value>> From<&[T]> for Value {
    fn from(value: &[T]) -> Self {
        Value::List(value.iter().cloned().map(Into::into).collect())
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Map(value)
    }
}

/// SQL literal like rendering: `NULL` for nulls, text as is, blobs as hex.
impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("NULL");
        }
        match self {
            Value::Boolean(Some(v)) => write!(f, "{v}"),
            Value::Int8(Some(v)) => write!(f, "{v}"),
            Value::Int16(Some(v)) => write!(f, "{v}"),
            Value::Int32(Some(v)) => write!(f, "{v}"),
            Value::Int64(Some(v)) => write!(f, "{v}"),
            Value::UInt8(Some(v)) => write!(f, "{v}"),
            Value::UInt16(Some(v)) => write!(f, "{v}"),
            Value::UInt32(Some(v)) => write!(f, "{v}"),
            Value::UInt64(Some(v)) => write!(f, "{v}"),
            Value::Float32(Some(v)) => write!(f, "{v}"),
            Value::Float64(Some(v)) => write!(f, "{v}"),
            Value::Varchar(Some(v)) => f.write_str(v),
            Value::Blob(Some(v)) => write!(f, "0x{}", hex::encode(v)),
            Value::Timestamp(Some(v)) => match v.format(TIME_LAYOUT) {
                Ok(v) => f.write_str(&v),
                Err(..) => Err(fmt::Error),
            },
            Value::List(items) => {
                f.write_str("(")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    v.fmt(f)?;
                }
                f.write_str(")")
            }
            Value::Map(record) => {
                f.write_str("{")?;
                for (i, (k, v)) in record.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{k}:{v}")?;
                }
                f.write_str("}")
            }
            _ => f.write_str("NULL"),
        }
    }
}
