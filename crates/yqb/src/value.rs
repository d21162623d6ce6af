//! Argument values bound to placeholders.
//!
//! Every argument is converted into a [`Value`] at the call boundary, so the
//! rendering core never inspects runtime types. Rust scalars convert through
//! `From`; `Option<T>` becomes a nullable [`Value::Optional`] that remembers the
//! declared kind even when empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scalar kind of a value, used to type empty optionals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float,
    Double,
    Text,
    Bytes,
    Timestamp,
    Uuid,
    Json,
}

/// A raw argument value in the parameter stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Untyped NULL.
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Float(f32),
    Double(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
    Uuid(uuid::Uuid),
    /// Raw structured payload.
    Json(serde_json::Value),
    /// Nullable scalar of a known kind.
    Optional(Kind, Option<Box<Value>>),
    /// Pre-built composite value, bound through a single placeholder.
    List(Vec<Value>),
}

impl Value {
    /// Build a pre-built list value.
    ///
    /// Inside an equality map this renders as `col IN ?` with one placeholder,
    /// unlike a plain `Vec` which expands to `col IN (?,?,...)`.
    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a byte-string value.
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(data.into())
    }

    /// Build a JSON value.
    pub fn json(payload: serde_json::Value) -> Self {
        Value::Json(payload)
    }

    /// Build an empty optional of the given kind.
    pub fn null_of(kind: Kind) -> Self {
        Value::Optional(kind, None)
    }

    /// Whether this value is SQL NULL (untyped or an empty optional).
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null | Value::Optional(_, None))
    }

    /// Scalar kind, if this is a scalar or an optional.
    pub fn kind(&self) -> Option<Kind> {
        let kind = match self {
            Value::Bool(_) => Kind::Bool,
            Value::Int8(_) => Kind::Int8,
            Value::Int16(_) => Kind::Int16,
            Value::Int32(_) => Kind::Int32,
            Value::Int64(_) => Kind::Int64,
            Value::Uint8(_) => Kind::Uint8,
            Value::Uint16(_) => Kind::Uint16,
            Value::Uint32(_) => Kind::Uint32,
            Value::Uint64(_) => Kind::Uint64,
            Value::Float(_) => Kind::Float,
            Value::Double(_) => Kind::Double,
            Value::Text(_) => Kind::Text,
            Value::Bytes(_) => Kind::Bytes,
            Value::Timestamp(_) => Kind::Timestamp,
            Value::Uuid(_) => Kind::Uuid,
            Value::Json(_) => Kind::Json,
            Value::Optional(kind, _) => *kind,
            Value::Null | Value::List(_) => return None,
        };
        Some(kind)
    }

    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int8(_) => "i8",
            Value::Int16(_) => "i16",
            Value::Int32(_) => "i32",
            Value::Int64(_) => "i64",
            Value::Uint8(_) => "u8",
            Value::Uint16(_) => "u16",
            Value::Uint32(_) => "u32",
            Value::Uint64(_) => "u64",
            Value::Float(_) => "f32",
            Value::Double(_) => "f64",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Timestamp(_) => "timestamp",
            Value::Uuid(_) => "uuid",
            Value::Json(_) => "json",
            Value::Optional(..) => "optional",
            Value::List(_) => "list",
        }
    }
}

/// Rust types with a fixed scalar [`Kind`].
pub trait ScalarKind {
    const KIND: Kind;
}

macro_rules! impl_scalar {
    ($($ty:ty => $variant:ident;)*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }

            impl ScalarKind for $ty {
                const KIND: Kind = Kind::$variant;
            }
        )*
    };
}

impl_scalar! {
    bool => Bool;
    i8 => Int8;
    i16 => Int16;
    i32 => Int32;
    i64 => Int64;
    u8 => Uint8;
    u16 => Uint16;
    u32 => Uint32;
    u64 => Uint64;
    f32 => Float;
    f64 => Double;
    String => Text;
    Vec<u8> => Bytes;
    DateTime<Utc> => Timestamp;
    uuid::Uuid => Uuid;
    serde_json::Value => Json;
}

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Value::Int64(v as i64)
    }
}

impl ScalarKind for isize {
    const KIND: Kind = Kind::Int64;
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Uint64(v as u64)
    }
}

impl ScalarKind for usize {
    const KIND: Kind = Kind::Uint64;
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl ScalarKind for &str {
    const KIND: Kind = Kind::Text;
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl ScalarKind for &[u8] {
    const KIND: Kind = Kind::Bytes;
}

impl<T: Into<Value> + ScalarKind> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        Value::Optional(T::KIND, v.map(|inner| Box::new(inner.into())))
    }
}

/// Invoke `$m!` with every Rust scalar type that converts into [`Value`].
///
/// Used by the operand types so each gets the same `From` surface without a
/// blanket impl (which would collide with their `From<Vec<T>>`).
macro_rules! for_each_scalar {
    ($m:ident) => {
        $m! {
            bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64,
            String, &str, &[u8], chrono::DateTime<chrono::Utc>, uuid::Uuid,
            serde_json::Value, $crate::value::Value
        }
    };
}

pub(crate) use for_each_scalar;

/// Build a `Vec<Value>` from heterogeneous arguments.
///
/// ```ignore
/// let args = yqb::args![1, "two", 3.0f64];
/// ```
#[macro_export]
macro_rules! args {
    () => { ::std::vec::Vec::<$crate::Value>::new() };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($arg)),+]
    };
}
