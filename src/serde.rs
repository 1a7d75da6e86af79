//! JSON-deserializable schema description.
//!
//! These types mirror [crate::field] so a schema can ship as a data file and
//! be turned into a [crate::schema::Schema] with `Schema::try_from`.

use serde::{Deserialize, Serialize};

use crate::config::CodecConfig;

/// Top-level schema definition.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchemaDef {
    /// Every struct the schema declares, in any order.
    pub structs: Vec<StructDef>,
    #[serde(default)]
    pub config: Option<CodecConfig>,
}

/// A named struct.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StructDef {
    pub name: String,
    /// Fields in wire order.
    pub fields: Vec<FieldDef>,
}

/// A single field of a struct.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FieldDef {
    pub name: String,
    /// Scalar name or struct name of the element type.
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub kind: FieldKindDef,
}

/// Repetition of a field.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
#[serde(tag = "repeat")]
pub enum FieldKindDef {
    #[default]
    Single,
    /// Count-prefixed list.
    List,
    /// Exactly `count` elements; 0 is read as a dynamic list.
    Fixed { count: usize },
}
