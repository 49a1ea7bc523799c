//! Relational type descriptors for the document engine's value space.

use serde::{Deserialize, Serialize};

use crate::Value;

/// The closed set of relational kinds the engine distinguishes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Null,
    Int,
    Float,
    Bool,
    String,
    Bytes,
    Object,
    Array,
    Date,
    DateTime,
    Time,
    Timestamp,
    MicrosecondInterval,
    MonthInterval,
    Geography,
}

/// A relational kind paired with the wire tag the engine uses for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeDescriptor {
    pub wire_tag: &'static str,
    pub kind: Kind,
}

/// One column of an inferred relational schema. `name` is a dotted path for
/// nested fields. The engine has no column defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub ty: TypeDescriptor,
    pub nullable: bool,
    pub default: Option<Value>,
}

impl ColumnDescriptor {
    /// The identifier column is the only non-null guarantee the engine
    /// offers; everything else is nullable until proven otherwise.
    pub fn forced_non_null(name: &str) -> bool {
        name == "_id" || name.contains("__id")
    }

    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        let name = name.into();
        let nullable = !Self::forced_non_null(&name);
        Self { name, ty, nullable, default: None }
    }
}
