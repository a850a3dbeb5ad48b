use crate::{FromValue, Mapped, Result, StrataError, TIME_LAYOUT, Value, ZERO_TIME};
use std::any;
use time::PrimitiveDateTime;

/// Storage kind of a mapped member, decided once from its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Integer,
    Float,
    Text,
    Boolean,
    Time,
    Bytes,
    Codec,
    /// Absent optional scalar, written as SQL `NULL`.
    Null,
    Nested,
}

impl FieldKind {
    pub fn is_scalar(&self) -> bool {
        !matches!(self, FieldKind::Nested)
    }
}

/// A struct member that can be written to and scanned from a column.
pub trait Field: Send + Sync {
    fn type_kind() -> FieldKind
    where
        Self: Sized;

    fn kind(&self) -> FieldKind;

    /// Value written by insert and update statements.
    fn to_value(&self) -> Value;

    fn is_zero(&self) -> bool;

    /// Empty typed value a driver scans the column into.
    fn scan_buffer(&self) -> Value;

    /// Stores a scanned buffer, converting it to the member type.
    fn assign(&mut self, value: Value) -> Result<()>;

    fn is_null(&self) -> bool {
        false
    }

    /// Makes sure the member can receive a scanned value, returns false when it can't.
    fn allocate(&mut self) -> bool {
        true
    }

    fn as_mapped(&self) -> Option<&dyn Mapped> {
        None
    }

    fn as_mapped_mut(&mut self) -> Option<&mut dyn Mapped> {
        None
    }

    /// A fresh value used to fill an absent optional member before scanning.
    fn new_empty() -> Option<Self>
    where
        Self: Sized;
}

macro_rules! impl_field_number {
    ($kind:path, $buffer:expr, $zero:expr, $($source:ty),+ $(,)?) => {
        $(
            impl Field for $source {
                fn type_kind() -> FieldKind {
                    $kind
                }
                fn kind(&self) -> FieldKind {
                    $kind
                }
                fn to_value(&self) -> Value {
                    (*self).into()
                }
                fn is_zero(&self) -> bool {
                    *self == $zero
                }
                fn scan_buffer(&self) -> Value {
                    $buffer
                }
                fn assign(&mut self, value: Value) -> Result<()> {
                    *self = if value.is_null() {
                        $zero
                    } else {
                        <$source as FromValue>::from_value(value)?
                    };
                    Ok(())
                }
                fn new_empty() -> Option<Self> {
                    Some($zero)
                }
            }
        )+
    };
}

impl_field_number!(
    FieldKind::Integer,
    Value::Int64(None),
    0,
    i8,
    i16,
    i32,
    i64,
    isize
);
impl_field_number!(
    FieldKind::Integer,
    Value::UInt64(None),
    0,
    u8,
    u16,
    u32,
    u64,
    usize
);
impl_field_number!(FieldKind::Float, Value::Float64(None), 0.0, f32, f64);

impl Field for bool {
    fn type_kind() -> FieldKind {
        FieldKind::Boolean
    }
    fn kind(&self) -> FieldKind {
        FieldKind::Boolean
    }
    fn to_value(&self) -> Value {
        (*self).into()
    }
    fn is_zero(&self) -> bool {
        !*self
    }
    fn scan_buffer(&self) -> Value {
        Value::Boolean(None)
    }
    fn assign(&mut self, value: Value) -> Result<()> {
        *self = !value.is_null() && bool::from_value(value)?;
        Ok(())
    }
    fn new_empty() -> Option<Self> {
        Some(false)
    }
}

impl Field for String {
    fn type_kind() -> FieldKind {
        FieldKind::Text
    }
    fn kind(&self) -> FieldKind {
        FieldKind::Text
    }
    fn to_value(&self) -> Value {
        self.clone().into()
    }
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
    fn scan_buffer(&self) -> Value {
        Value::Varchar(None)
    }
    fn assign(&mut self, value: Value) -> Result<()> {
        if value.is_null() {
            self.clear();
        } else {
            *self = String::from_value(value)?;
        }
        Ok(())
    }
    fn new_empty() -> Option<Self> {
        Some(String::new())
    }
}

impl Field for Vec<u8> {
    fn type_kind() -> FieldKind {
        FieldKind::Bytes
    }
    fn kind(&self) -> FieldKind {
        FieldKind::Bytes
    }
    fn to_value(&self) -> Value {
        self.clone().into()
    }
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
    fn scan_buffer(&self) -> Value {
        Value::Blob(None)
    }
    fn assign(&mut self, value: Value) -> Result<()> {
        if value.is_null() {
            self.clear();
        } else {
            *self = Vec::<u8>::from_value(value)?;
        }
        Ok(())
    }
    fn new_empty() -> Option<Self> {
        Some(Vec::new())
    }
}

impl Field for PrimitiveDateTime {
    fn type_kind() -> FieldKind {
        FieldKind::Time
    }
    fn kind(&self) -> FieldKind {
        FieldKind::Time
    }
    fn to_value(&self) -> Value {
        match self.format(TIME_LAYOUT) {
            Ok(v) => Value::Varchar(Some(v)),
            Err(e) => {
                log::error!("Could not format the time value {:?}: {:#}", self, e);
                Value::Null
            }
        }
    }
    fn is_zero(&self) -> bool {
        *self == ZERO_TIME
    }
    fn scan_buffer(&self) -> Value {
        Value::Blob(None)
    }
    fn assign(&mut self, value: Value) -> Result<()> {
        // Unparsable text leaves the zero time, like an unset column.
        *self = if value.is_null() {
            ZERO_TIME
        } else {
            PrimitiveDateTime::from_value(value).unwrap_or(ZERO_TIME)
        };
        Ok(())
    }
    fn new_empty() -> Option<Self> {
        Some(ZERO_TIME)
    }
}

impl<T: Field> Field for Option<T> {
    fn type_kind() -> FieldKind {
        T::type_kind()
    }
    fn kind(&self) -> FieldKind {
        match self {
            Some(v) => v.kind(),
            None if T::type_kind().is_scalar() => FieldKind::Null,
            None => FieldKind::Nested,
        }
    }
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
    fn is_zero(&self) -> bool {
        self.is_none()
    }
    fn scan_buffer(&self) -> Value {
        match self {
            Some(v) => v.scan_buffer(),
            None => T::new_empty()
                .map(|v| v.scan_buffer())
                .unwrap_or(Value::Null),
        }
    }
    fn assign(&mut self, value: Value) -> Result<()> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        if self.is_none() && !self.allocate() {
            return Err(StrataError::NullFieldUnassignable {
                field: any::type_name::<T>().into(),
            }
            .into());
        }
        match self {
            Some(v) => v.assign(value),
            None => Ok(()),
        }
    }
    fn is_null(&self) -> bool {
        self.is_none()
    }
    fn allocate(&mut self) -> bool {
        if self.is_none() {
            *self = T::new_empty();
        }
        self.is_some()
    }
    fn as_mapped(&self) -> Option<&dyn Mapped> {
        self.as_ref().and_then(|v| v.as_mapped())
    }
    fn as_mapped_mut(&mut self) -> Option<&mut dyn Mapped> {
        self.as_mut().and_then(|v| v.as_mapped_mut())
    }
    fn new_empty() -> Option<Self> {
        Some(None)
    }
}

/// A member type that writes and reads its own column bytes.
pub trait Codec {
    fn read_bytes(&mut self, data: &[u8]);
    fn write_bytes(&self) -> Vec<u8>;
}

/// Implements [`Field`] for types implementing [`Codec`] and `Default`.
#[macro_export]
macro_rules! codec_field {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Field for $ty {
                fn type_kind() -> $crate::FieldKind {
                    $crate::FieldKind::Codec
                }
                fn kind(&self) -> $crate::FieldKind {
                    $crate::FieldKind::Codec
                }
                fn to_value(&self) -> $crate::Value {
                    $crate::Codec::write_bytes(self).into()
                }
                fn is_zero(&self) -> bool {
                    $crate::Codec::write_bytes(self).is_empty()
                }
                fn scan_buffer(&self) -> $crate::Value {
                    $crate::Value::Blob(None)
                }
                fn assign(&mut self, value: $crate::Value) -> $crate::Result<()> {
                    let data = if value.is_null() {
                        Vec::new()
                    } else {
                        <Vec<u8> as $crate::FromValue>::from_value(value)?
                    };
                    $crate::Codec::read_bytes(self, &data);
                    Ok(())
                }
                fn new_empty() -> Option<Self> {
                    Some(<$ty as Default>::default())
                }
            }
        )+
    };
}
