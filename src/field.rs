//! Definition of structs and their fields, used to build a [crate::schema::Schema].

/// A named struct: an ordered list of fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    pub name: String,
    /// Fields in wire order.
    pub fields: Vec<Field>,
}

impl StructDef {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        StructDef {
            name: name.into(),
            fields,
        }
    }
}

/// A single named field of a struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Key of the field in a struct [crate::value::Value].
    pub name: String,
    /// Element type: a scalar name (`int32`, `string`, ...) or a struct name.
    pub ty: String,
    /// Whether the field holds one element or a list of them.
    pub kind: FieldKind,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Field {
            name: name.into(),
            ty: ty.into(),
            kind: FieldKind::Single,
        }
    }

    /// A list whose element count is written before the elements.
    pub fn list(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Field {
            kind: FieldKind::List,
            ..Field::new(name, ty)
        }
    }

    /// A list of exactly `count` elements. A count of 0 means a dynamic list.
    pub fn fixed(name: impl Into<String>, ty: impl Into<String>, count: usize) -> Self {
        Field {
            kind: FieldKind::repeated(count),
            ..Field::new(name, ty)
        }
    }
}

/// Repetition of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// One element.
    Single,
    /// Dynamic list, element count carried in the stream.
    List,
    /// Fixed list, element count implied by the schema. Always non-zero.
    Fixed(usize),
}

impl FieldKind {
    /// Repetition for a declared list size, where 0 means dynamic.
    pub fn repeated(count: usize) -> Self {
        match count {
            0 => FieldKind::List,
            n => FieldKind::Fixed(n),
        }
    }

    pub fn is_repeated(&self) -> bool {
        !matches!(self, FieldKind::Single)
    }

    /// Element count fixed by the schema, 0 for single fields and dynamic lists.
    pub fn fixed_count(&self) -> usize {
        match self {
            FieldKind::Fixed(n) => *n,
            _ => 0,
        }
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::StructDef> for StructDef {
    fn from(value: crate::serde::StructDef) -> Self {
        StructDef {
            name: value.name,
            fields: value.fields.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::FieldDef> for Field {
    fn from(value: crate::serde::FieldDef) -> Self {
        Field {
            name: value.name,
            ty: value.ty,
            kind: value.kind.into(),
        }
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::FieldKindDef> for FieldKind {
    fn from(value: crate::serde::FieldKindDef) -> Self {
        match value {
            crate::serde::FieldKindDef::Single => FieldKind::Single,
            crate::serde::FieldKindDef::List => FieldKind::List,
            crate::serde::FieldKindDef::Fixed { count } => FieldKind::repeated(count),
        }
    }
}
