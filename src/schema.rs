//! Schema: compiled registry of named structs, used to serialize values to bytes and back.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::{
    compiled::{CompiledField, CompiledStruct, CompiledType, ScalarKind},
    config::CodecConfig,
    errors::SchemaError,
    field::{FieldKind, StructDef},
};

/// An immutable registry of compiled structs. Use [Schema::compile] to build
/// from [StructDef]s (or [Schema::parse_text] from declarations), then
/// [Schema::serialize] and [Schema::deserialize] to convert values.
#[derive(Debug, Clone)]
pub struct Schema {
    structs: Vec<CompiledStruct>,
    by_name: HashMap<String, usize>,
    pub(crate) config: CodecConfig,
}

impl Schema {
    /// Compiles struct definitions into a schema. Struct references may point
    /// forward or backward in `defs`.
    pub fn compile(defs: &[StructDef]) -> Result<Self, SchemaError> {
        let mut by_name = HashMap::with_capacity(defs.len());
        for (idx, def) in defs.iter().enumerate() {
            if ScalarKind::from_name(&def.name).is_some()
                || by_name.insert(def.name.clone(), idx).is_some()
            {
                return Err(SchemaError::DuplicateStruct(def.name.clone()));
            }
        }

        let mut structs = Vec::with_capacity(defs.len());
        for def in defs {
            structs.push(compile_struct(def, &by_name)?);
        }

        check_cycles(&structs)?;

        debug!(structs = structs.len(), "compiled schema");

        Ok(Self {
            structs,
            by_name,
            config: CodecConfig::default(),
        })
    }

    /// Parses `Name { Type field; ... };` declarations and compiles them.
    pub fn parse_text(text: &str) -> Result<Self, SchemaError> {
        Self::compile(&crate::text::parse_structs(text)?)
    }

    /// Replaces the codec limits used by this schema.
    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Looks up a compiled struct by name.
    pub fn get(&self, name: &str) -> Option<&CompiledStruct> {
        self.by_name.get(name).map(|&idx| &self.structs[idx])
    }

    /// Compiled structs in definition order.
    pub fn structs(&self) -> &[CompiledStruct] {
        &self.structs
    }

    pub(crate) fn struct_at(&self, idx: usize) -> &CompiledStruct {
        &self.structs[idx]
    }

    /// Resolves a top-level type name to a scalar or struct.
    pub(crate) fn resolve(&self, name: &str) -> Option<CompiledType> {
        ScalarKind::from_name(name)
            .map(CompiledType::Scalar)
            .or_else(|| self.by_name.get(name).map(|&idx| CompiledType::Struct(idx)))
    }
}

#[cfg(feature = "serde")]
impl TryFrom<crate::serde::SchemaDef> for Schema {
    type Error = SchemaError;

    fn try_from(value: crate::serde::SchemaDef) -> Result<Self, Self::Error> {
        let config = value.config.unwrap_or_default();
        let defs: Vec<StructDef> = value.structs.into_iter().map(Into::into).collect();

        Ok(Schema::compile(&defs)?.with_config(config))
    }
}

fn compile_struct(
    def: &StructDef,
    by_name: &HashMap<String, usize>,
) -> Result<CompiledStruct, SchemaError> {
    let mut seen = HashSet::with_capacity(def.fields.len());
    let mut fields = Vec::with_capacity(def.fields.len());

    for field in &def.fields {
        if field.name.is_empty() || !seen.insert(field.name.as_str()) {
            return Err(SchemaError::InvalidFieldName {
                owner: def.name.clone(),
                field: field.name.clone(),
            });
        }

        let ty = match ScalarKind::from_name(&field.ty) {
            Some(kind) => CompiledType::Scalar(kind),
            None => match by_name.get(&field.ty) {
                Some(&idx) => CompiledType::Struct(idx),
                None => {
                    return Err(SchemaError::UnknownType {
                        owner: def.name.clone(),
                        field: field.name.clone(),
                        ty: field.ty.clone(),
                    });
                }
            },
        };

        fields.push(CompiledField {
            name: field.name.clone(),
            ty,
            kind: match field.kind {
                FieldKind::Fixed(count) => FieldKind::repeated(count),
                kind => kind,
            },
        });
    }

    Ok(CompiledStruct {
        name: def.name.clone(),
        fields,
    })
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Depth-first search over required struct edges; any back edge is a cycle.
fn check_cycles(structs: &[CompiledStruct]) -> Result<(), SchemaError> {
    let mut marks = vec![Mark::Unvisited; structs.len()];

    for start in 0..structs.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }

        // Explicit stack of (struct, remaining required children) keeps deep
        // schemas off the call stack.
        let mut stack: Vec<(usize, Vec<usize>)> = Vec::new();
        marks[start] = Mark::InProgress;
        stack.push((start, structs[start].required_structs().collect()));

        while let Some((idx, children)) = stack.last_mut() {
            let idx = *idx;
            match children.pop() {
                Some(child) => match marks[child] {
                    Mark::InProgress => {
                        return Err(SchemaError::CyclicSchema(structs[child].name.clone()));
                    }
                    Mark::Unvisited => {
                        marks[child] = Mark::InProgress;
                        let next = structs[child].required_structs().collect();
                        stack.push((child, next));
                    }
                    Mark::Done => {}
                },
                None => {
                    marks[idx] = Mark::Done;
                    stack.pop();
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::field::Field;

    use super::*;

    #[test]
    fn test_compile_empty() {
        let schema = Schema::compile(&[]).unwrap();
        assert!(schema.structs().is_empty());
        assert!(schema.get("Anything").is_none());
    }

    #[test]
    fn test_compile_resolves_forward_reference() {
        let defs = vec![
            StructDef::new("Player", vec![Field::new("pet", "Pet")]),
            StructDef::new("Pet", vec![Field::new("name", "string")]),
        ];
        let schema = Schema::compile(&defs).unwrap();

        let player = schema.get("Player").unwrap();
        assert_eq!(player.fields[0].ty, CompiledType::Struct(1));
        assert_eq!(
            schema.get("Pet").unwrap().fields[0].ty,
            CompiledType::Scalar(ScalarKind::String)
        );
    }

    #[test]
    fn test_fixed_zero_compiles_as_dynamic_list() {
        let def = StructDef {
            name: "Bag".to_string(),
            fields: vec![Field {
                name: "items".to_string(),
                ty: "uint8".to_string(),
                kind: FieldKind::Fixed(0),
            }],
        };
        let schema = Schema::compile(&[def]).unwrap();
        assert_eq!(schema.get("Bag").unwrap().fields[0].kind, FieldKind::List);
    }

    #[test]
    fn test_duplicate_struct() {
        let defs = vec![
            StructDef::new("A", vec![Field::new("x", "int8")]),
            StructDef::new("A", vec![Field::new("y", "int8")]),
        ];
        assert_eq!(
            Schema::compile(&defs).unwrap_err(),
            SchemaError::DuplicateStruct("A".to_string())
        );
    }

    #[test]
    fn test_struct_shadowing_scalar_rejected() {
        let defs = vec![StructDef::new("int32", vec![])];
        assert_eq!(
            Schema::compile(&defs).unwrap_err(),
            SchemaError::DuplicateStruct("int32".to_string())
        );
    }

    #[test]
    fn test_duplicate_field_name() {
        let defs = vec![StructDef::new(
            "A",
            vec![Field::new("x", "int8"), Field::new("x", "int16")],
        )];
        assert_eq!(
            Schema::compile(&defs).unwrap_err(),
            SchemaError::InvalidFieldName {
                owner: "A".to_string(),
                field: "x".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_field_type() {
        let defs = vec![StructDef::new("A", vec![Field::new("x", "int64")])];
        assert_eq!(
            Schema::compile(&defs).unwrap_err(),
            SchemaError::UnknownType {
                owner: "A".to_string(),
                field: "x".to_string(),
                ty: "int64".to_string()
            }
        );
    }

    #[test]
    fn test_direct_self_reference_is_cyclic() {
        let defs = vec![StructDef::new("Loop", vec![Field::new("next", "Loop")])];
        assert_eq!(
            Schema::compile(&defs).unwrap_err(),
            SchemaError::CyclicSchema("Loop".to_string())
        );
    }

    #[test]
    fn test_indirect_cycle_through_fixed_list() {
        let defs = vec![
            StructDef::new("A", vec![Field::fixed("bs", "B", 2)]),
            StructDef::new("B", vec![Field::new("a", "A")]),
        ];
        assert!(matches!(
            Schema::compile(&defs),
            Err(SchemaError::CyclicSchema(_))
        ));
    }

    #[test]
    fn test_dynamic_list_breaks_cycle() {
        let defs = vec![StructDef::new(
            "Tree",
            vec![Field::new("value", "int32"), Field::list("children", "Tree")],
        )];
        assert!(Schema::compile(&defs).is_ok());
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let defs = vec![
            StructDef::new("Top", vec![Field::new("l", "Left"), Field::new("r", "Right")]),
            StructDef::new("Left", vec![Field::new("b", "Bottom")]),
            StructDef::new("Right", vec![Field::new("b", "Bottom")]),
            StructDef::new("Bottom", vec![Field::new("v", "uint8")]),
        ];
        assert!(Schema::compile(&defs).is_ok());
    }
}
