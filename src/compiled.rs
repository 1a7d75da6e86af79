use crate::field::FieldKind;

/// Built-in element types with a fixed wire layout, plus `string`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
    Bool,
    String,
}

impl ScalarKind {
    /// Resolves a type name as written in a schema.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "int8" => ScalarKind::I8,
            "uint8" => ScalarKind::U8,
            "int16" => ScalarKind::I16,
            "uint16" => ScalarKind::U16,
            "int32" => ScalarKind::I32,
            "uint32" => ScalarKind::U32,
            "float" => ScalarKind::F32,
            "double" => ScalarKind::F64,
            "bool" => ScalarKind::Bool,
            "string" => ScalarKind::String,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::I8 => "int8",
            ScalarKind::U8 => "uint8",
            ScalarKind::I16 => "int16",
            ScalarKind::U16 => "uint16",
            ScalarKind::I32 => "int32",
            ScalarKind::U32 => "uint32",
            ScalarKind::F32 => "float",
            ScalarKind::F64 => "double",
            ScalarKind::Bool => "bool",
            ScalarKind::String => "string",
        }
    }

    /// Encoded size in bytes, `None` for the length-prefixed string.
    pub fn width(&self) -> Option<usize> {
        match self {
            ScalarKind::I8 | ScalarKind::U8 | ScalarKind::Bool => Some(1),
            ScalarKind::I16 | ScalarKind::U16 => Some(2),
            ScalarKind::I32 | ScalarKind::U32 | ScalarKind::F32 => Some(4),
            ScalarKind::F64 => Some(8),
            ScalarKind::String => None,
        }
    }
}

/// Element type of a compiled field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompiledType {
    Scalar(ScalarKind),
    /// Index into the schema's struct table.
    Struct(usize),
}

#[derive(Debug, Clone)]
pub struct CompiledField {
    pub name: String,
    pub ty: CompiledType,
    pub kind: FieldKind,
}

#[derive(Debug, Clone)]
pub struct CompiledStruct {
    pub name: String,
    pub fields: Vec<CompiledField>,
}

impl CompiledStruct {
    /// Indices of structs this one needs in order to encode a single value:
    /// single fields and fixed lists. Dynamic lists may be empty and are skipped.
    pub(crate) fn required_structs(&self) -> impl Iterator<Item = usize> + '_ {
        self.fields.iter().filter_map(|field| match (field.ty, field.kind) {
            (CompiledType::Struct(idx), FieldKind::Single | FieldKind::Fixed(_)) => Some(idx),
            _ => None,
        })
    }
}
