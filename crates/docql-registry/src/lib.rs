//! Wire type registry
//!
//! Maps the engine's wire-level type tags to relational type descriptors
//! and back. The registry is immutable: it is built once at startup and
//! passed by reference (or shared handle) to the compiler, the cursor and
//! schema discovery. An unrecognized wire tag is a hard error, never a
//! silent coercion.

use std::collections::HashMap;

use docql_ir::{Kind, TypeDescriptor, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypeError {
    #[error("unknown wire type tag `{0}`")]
    UnknownTag(String),
}

/// Total bijection between wire tags and relational kinds.
const TAG_TABLE: [(&str, Kind); 15] = [
    ("null", Kind::Null),
    ("int", Kind::Int),
    ("float", Kind::Float),
    ("bool", Kind::Bool),
    ("string", Kind::String),
    ("bytes", Kind::Bytes),
    ("object", Kind::Object),
    ("array", Kind::Array),
    ("date", Kind::Date),
    ("datetime", Kind::DateTime),
    ("time", Kind::Time),
    ("timestamp", Kind::Timestamp),
    ("microsecond_interval", Kind::MicrosecondInterval),
    ("month_interval", Kind::MonthInterval),
    ("geography", Kind::Geography),
];

#[derive(Debug, Clone)]
pub struct TypeRegistry {
    by_tag: HashMap<&'static str, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let by_tag = TAG_TABLE
            .iter()
            .map(|&(wire_tag, kind)| (wire_tag, TypeDescriptor { wire_tag, kind }))
            .collect();
        Self { by_tag }
    }

    /// Look up the descriptor for a wire tag received from the engine.
    pub fn descriptor(&self, tag: &str) -> Result<TypeDescriptor, TypeError> {
        self.by_tag
            .get(tag)
            .copied()
            .ok_or_else(|| TypeError::UnknownTag(tag.to_string()))
    }

    /// Reverse direction of the bijection.
    pub fn descriptor_of(&self, kind: Kind) -> TypeDescriptor {
        let wire_tag = match kind {
            Kind::Null => "null",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Bool => "bool",
            Kind::String => "string",
            Kind::Bytes => "bytes",
            Kind::Object => "object",
            Kind::Array => "array",
            Kind::Date => "date",
            Kind::DateTime => "datetime",
            Kind::Time => "time",
            Kind::Timestamp => "timestamp",
            Kind::MicrosecondInterval => "microsecond_interval",
            Kind::MonthInterval => "month_interval",
            Kind::Geography => "geography",
        };
        TypeDescriptor { wire_tag, kind }
    }

    pub fn tag_of(&self, kind: Kind) -> &'static str {
        self.descriptor_of(kind).wire_tag
    }

    /// Infer a descriptor from the runtime shape of a result-document value.
    pub fn infer(&self, value: &serde_json::Value) -> TypeDescriptor {
        let kind = match value {
            serde_json::Value::Null => Kind::Null,
            serde_json::Value::Bool(_) => Kind::Bool,
            serde_json::Value::Number(n) if n.is_f64() => Kind::Float,
            serde_json::Value::Number(_) => Kind::Int,
            serde_json::Value::String(_) => Kind::String,
            serde_json::Value::Array(_) => Kind::Array,
            serde_json::Value::Object(_) => Kind::Object,
        };
        self.descriptor_of(kind)
    }

    /// Wire tag for a bind-parameter value. Structured values travel under
    /// the object tag; the value itself is stringified separately.
    pub fn param_tag(&self, value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) | Value::Object(_) => "object",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
