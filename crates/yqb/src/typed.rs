//! Typed-parameter adapter.
//!
//! Converts a rendered statement into the form the destination engine expects:
//! `$pN` placeholders, one declared YQL type per parameter and a
//! `DECLARE $pN AS <type>;` preamble in front of the text.
//!
//! ```text
//! DECLARE $p1 AS Int64;
//! DECLARE $p2 AS Utf8;
//! SELECT a FROM t WHERE id = $p1 AND name = $p2
//! ```

use crate::error::{QbError, QbResult};
use crate::placeholder::Dialect;
use crate::qb::BuiltSql;
use crate::value::{Kind, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write;

/// Declared type of a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YqlType {
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
    /// UTF-8 text.
    Utf8,
    /// Arbitrary bytes.
    String,
    Timestamp,
    Uuid,
    Json,
    Optional(Box<YqlType>),
    List(Box<YqlType>),
}

impl fmt::Display for YqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            YqlType::Bool => "Bool",
            YqlType::Int8 => "Int8",
            YqlType::Int16 => "Int16",
            YqlType::Int32 => "Int32",
            YqlType::Int64 => "Int64",
            YqlType::Uint8 => "Uint8",
            YqlType::Uint16 => "Uint16",
            YqlType::Uint32 => "Uint32",
            YqlType::Uint64 => "Uint64",
            YqlType::Float => "Float",
            YqlType::Double => "Double",
            YqlType::Utf8 => "Utf8",
            YqlType::String => "String",
            YqlType::Timestamp => "Timestamp",
            YqlType::Uuid => "Uuid",
            YqlType::Json => "Json",
            YqlType::Optional(inner) => return write!(f, "Optional<{inner}>"),
            YqlType::List(item) => return write!(f, "List<{item}>"),
        };
        f.write_str(name)
    }
}

impl From<Kind> for YqlType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Bool => YqlType::Bool,
            Kind::Int8 => YqlType::Int8,
            Kind::Int16 => YqlType::Int16,
            Kind::Int32 => YqlType::Int32,
            Kind::Int64 => YqlType::Int64,
            Kind::Uint8 => YqlType::Uint8,
            Kind::Uint16 => YqlType::Uint16,
            Kind::Uint32 => YqlType::Uint32,
            Kind::Uint64 => YqlType::Uint64,
            Kind::Float => YqlType::Float,
            Kind::Double => YqlType::Double,
            Kind::Text => YqlType::Utf8,
            Kind::Bytes => YqlType::String,
            Kind::Timestamp => YqlType::Timestamp,
            Kind::Uuid => YqlType::Uuid,
            Kind::Json => YqlType::Json,
        }
    }
}

/// A value in the engine's native representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypedValue {
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
    Utf8(String),
    String(Vec<u8>),
    /// Microseconds since the Unix epoch.
    Timestamp(u64),
    Uuid(uuid::Uuid),
    /// Serialized JSON document.
    Json(String),
    /// Nullable value; carries the inner type so an empty one is typed.
    Optional(YqlType, Option<Box<TypedValue>>),
    /// Homogeneous list; carries the item type.
    List(YqlType, Vec<TypedValue>),
}

impl TypedValue {
    /// Declared type of this value.
    pub fn yql_type(&self) -> YqlType {
        match self {
            TypedValue::Bool(_) => YqlType::Bool,
            TypedValue::Int8(_) => YqlType::Int8,
            TypedValue::Int16(_) => YqlType::Int16,
            TypedValue::Int32(_) => YqlType::Int32,
            TypedValue::Int64(_) => YqlType::Int64,
            TypedValue::Uint8(_) => YqlType::Uint8,
            TypedValue::Uint16(_) => YqlType::Uint16,
            TypedValue::Uint32(_) => YqlType::Uint32,
            TypedValue::Uint64(_) => YqlType::Uint64,
            TypedValue::Float(_) => YqlType::Float,
            TypedValue::Double(_) => YqlType::Double,
            TypedValue::Utf8(_) => YqlType::Utf8,
            TypedValue::String(_) => YqlType::String,
            TypedValue::Timestamp(_) => YqlType::Timestamp,
            TypedValue::Uuid(_) => YqlType::Uuid,
            TypedValue::Json(_) => YqlType::Json,
            TypedValue::Optional(inner, _) => YqlType::Optional(Box::new(inner.clone())),
            TypedValue::List(item, _) => YqlType::List(Box::new(item.clone())),
        }
    }
}

/// A named parameter: `$pN` with its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedParam {
    pub name: String,
    pub value: TypedValue,
}

/// Statement text with its `DECLARE` preamble and typed parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedSql {
    pub sql: String,
    pub params: Vec<TypedParam>,
}

/// Convert one raw argument.
pub fn convert(value: &Value) -> QbResult<TypedValue> {
    let typed = match value {
        Value::Null => {
            return Err(QbError::conversion(
                "null",
                "untyped NULL has no declared type; use an Option",
            ));
        }
        Value::Bool(v) => TypedValue::Bool(*v),
        Value::Int8(v) => TypedValue::Int8(*v),
        Value::Int16(v) => TypedValue::Int16(*v),
        Value::Int32(v) => TypedValue::Int32(*v),
        Value::Int64(v) => TypedValue::Int64(*v),
        Value::Uint8(v) => TypedValue::Uint8(*v),
        Value::Uint16(v) => TypedValue::Uint16(*v),
        Value::Uint32(v) => TypedValue::Uint32(*v),
        Value::Uint64(v) => TypedValue::Uint64(*v),
        Value::Float(v) => TypedValue::Float(*v),
        Value::Double(v) => TypedValue::Double(*v),
        Value::Text(v) => TypedValue::Utf8(v.clone()),
        Value::Bytes(v) => TypedValue::String(v.clone()),
        Value::Timestamp(ts) => {
            let micros = u64::try_from(ts.timestamp_micros()).map_err(|_| {
                QbError::conversion("timestamp", format!("{ts} is before the Unix epoch"))
            })?;
            TypedValue::Timestamp(micros)
        }
        Value::Uuid(v) => TypedValue::Uuid(*v),
        Value::Json(doc) => {
            let text = serde_json::to_string(doc)
                .map_err(|e| QbError::conversion("json", e.to_string()))?;
            TypedValue::Json(text)
        }
        Value::Optional(kind, None) => TypedValue::Optional((*kind).into(), None),
        Value::Optional(kind, Some(inner)) => {
            let scalar = !matches!(**inner, Value::Optional(..) | Value::List(_));
            if !scalar || inner.kind() != Some(*kind) {
                return Err(QbError::conversion(
                    "optional",
                    format!(
                        "payload of type `{}` does not match declared kind {kind:?}",
                        inner.type_name()
                    ),
                ));
            }
            TypedValue::Optional((*kind).into(), Some(Box::new(convert(inner)?)))
        }
        Value::List(items) => convert_list(items)?,
    };
    Ok(typed)
}

fn convert_list(items: &[Value]) -> QbResult<TypedValue> {
    let converted = items.iter().map(convert).collect::<QbResult<Vec<_>>>()?;
    let Some(first) = converted.first() else {
        return Err(QbError::conversion(
            "list",
            "an empty list has no element type",
        ));
    };
    let item_type = first.yql_type();
    if let Some(other) = converted.iter().find(|v| v.yql_type() != item_type) {
        return Err(QbError::conversion(
            "list",
            format!("mixed element types {item_type} and {}", other.yql_type()),
        ));
    }
    Ok(TypedValue::List(item_type, converted))
}

/// `DECLARE $pN AS <type>;` lines, one per parameter, in order.
pub fn declarations(params: &[TypedParam]) -> String {
    let mut out = String::new();
    for param in params {
        let _ = writeln!(out, "DECLARE {} AS {};", param.name, param.value.yql_type());
    }
    out
}

pub(crate) fn to_typed_sql(raw: BuiltSql) -> QbResult<TypedSql> {
    let built = raw.finalize(Dialect::DollarP);
    let params = built
        .args
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            Ok(TypedParam {
                name: Dialect::DollarP.marker(i + 1),
                value: convert(arg)?,
            })
        })
        .collect::<QbResult<Vec<_>>>()?;

    let preamble = declarations(&params);
    tracing::trace!(
        target: "yqb.sql",
        param_count = params.len(),
        preamble = %preamble,
        "built typed statement"
    );

    Ok(TypedSql {
        sql: format!("{preamble}{}", built.sql),
        params,
    })
}
