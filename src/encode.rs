//! Struct serialization: [Value]s to little-endian records.

use std::collections::BTreeMap;

use tracing::trace;

use crate::{
    compiled::{CompiledStruct, CompiledType, ScalarKind},
    errors::WriteError,
    field::FieldKind,
    schema::Schema,
    value::Value,
};

/// Largest byte length of a string and element count of a dynamic list.
pub const MAX_PREFIXED_LEN: usize = u16::MAX as usize;

impl Schema {
    /// Serializes `value` as `type_name`, a scalar name or a struct in this schema.
    pub fn serialize(&self, value: &Value, type_name: &str) -> Result<Vec<u8>, WriteError> {
        let ty = self
            .resolve(type_name)
            .ok_or_else(|| WriteError::UnknownType(type_name.to_string()))?;

        let mut out = Vec::new();
        self.write_value(&mut out, value, ty, 0)?;

        Ok(out)
    }

    /// Serializes `values` as a list of `element_type`. With `fixed_count == 0`
    /// a 2-byte element count is written first; otherwise exactly
    /// `fixed_count` values must be supplied and no count is written.
    pub fn serialize_list(
        &self,
        values: &[Value],
        element_type: &str,
        fixed_count: usize,
    ) -> Result<Vec<u8>, WriteError> {
        let ty = self
            .resolve(element_type)
            .ok_or_else(|| WriteError::UnknownType(element_type.to_string()))?;

        let mut out = Vec::new();
        self.write_list(
            &mut out,
            values,
            ty,
            FieldKind::repeated(fixed_count),
            element_type,
            0,
        )?;

        Ok(out)
    }

    fn write_value(
        &self,
        out: &mut Vec<u8>,
        value: &Value,
        ty: CompiledType,
        depth: usize,
    ) -> Result<(), WriteError> {
        match ty {
            CompiledType::Scalar(kind) => write_scalar(out, value, kind),
            CompiledType::Struct(idx) => {
                let fields = match value {
                    Value::Struct(fields) => fields,
                    other => {
                        return Err(WriteError::TypeMismatch {
                            expected: "struct",
                            found: other.kind_name(),
                        });
                    }
                };
                self.write_struct(out, fields, self.struct_at(idx), depth + 1)
            }
        }
    }

    fn write_struct(
        &self,
        out: &mut Vec<u8>,
        values: &BTreeMap<String, Value>,
        def: &CompiledStruct,
        depth: usize,
    ) -> Result<(), WriteError> {
        if depth > self.config.max_depth {
            return Err(WriteError::DepthLimit(self.config.max_depth));
        }

        for field in &def.fields {
            let value = values
                .get(&field.name)
                .ok_or_else(|| WriteError::MissingField(field.name.clone()))?;

            trace!(owner = %def.name, field = %field.name, offset = out.len(), "write field");

            match (field.kind, value) {
                (FieldKind::Single, value) => self.write_value(out, value, field.ty, depth)?,
                (kind, Value::List(items)) => {
                    self.write_list(out, items, field.ty, kind, &field.name, depth)?
                }
                (_, other) => {
                    return Err(WriteError::TypeMismatch {
                        expected: "list",
                        found: other.kind_name(),
                    });
                }
            }
        }

        if values.len() != def.fields.len() {
            let extra = values
                .keys()
                .find(|name| !def.fields.iter().any(|field| &field.name == *name));
            if let Some(name) = extra {
                return Err(WriteError::UnexpectedField(name.clone()));
            }
        }

        Ok(())
    }

    fn write_list(
        &self,
        out: &mut Vec<u8>,
        items: &[Value],
        ty: CompiledType,
        kind: FieldKind,
        name: &str,
        depth: usize,
    ) -> Result<(), WriteError> {
        match kind {
            FieldKind::Fixed(expected) if items.len() != expected => {
                return Err(WriteError::FixedCountMismatch {
                    field: name.to_string(),
                    expected,
                    actual: items.len(),
                });
            }
            FieldKind::Fixed(_) => {}
            FieldKind::List | FieldKind::Single => {
                if items.len() > MAX_PREFIXED_LEN {
                    return Err(WriteError::OversizeList { len: items.len() });
                }
                out.extend_from_slice(&(items.len() as u16).to_le_bytes());
            }
        }

        for item in items {
            self.write_value(out, item, ty, depth)?;
        }

        Ok(())
    }
}

fn write_scalar(out: &mut Vec<u8>, value: &Value, kind: ScalarKind) -> Result<(), WriteError> {
    match (kind, value) {
        (ScalarKind::I8, Value::I8(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (ScalarKind::U8, Value::U8(v)) => out.push(*v),
        (ScalarKind::I16, Value::I16(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (ScalarKind::U16, Value::U16(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (ScalarKind::I32, Value::I32(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (ScalarKind::U32, Value::U32(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (ScalarKind::F32, Value::F32(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (ScalarKind::F64, Value::F64(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (ScalarKind::Bool, Value::Bool(v)) => out.push(*v as u8),
        (ScalarKind::String, Value::String(s)) => {
            let bytes = s.as_bytes();
            if bytes.len() > MAX_PREFIXED_LEN {
                return Err(WriteError::OversizeString { len: bytes.len() });
            }
            out.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
            out.extend_from_slice(bytes);
        }
        (kind, other) => {
            return Err(WriteError::TypeMismatch {
                expected: kind.name(),
                found: other.kind_name(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(text: &str) -> Schema {
        Schema::parse_text(text).unwrap()
    }

    #[test]
    fn test_point_is_two_le_floats() {
        let schema = schema("Point { float x; float y; };");
        let value = Value::record([("x", Value::F32(1.5)), ("y", Value::F32(-2.25))]);

        let bytes = schema.serialize(&value, "Point").unwrap();
        let mut expected = 1.5f32.to_le_bytes().to_vec();
        expected.extend_from_slice(&(-2.25f32).to_le_bytes());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_dynamic_list_has_count_prefix() {
        let schema = schema("Group { int32[] members; };");
        let value = Value::record([("members", Value::from(vec![1, 2, 3]))]);

        let bytes = schema.serialize(&value, "Group").unwrap();
        assert_eq!(
            bytes,
            vec![3, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0]
        );
    }

    #[test]
    fn test_string_has_length_prefix() {
        let schema = Schema::compile(&[]).unwrap();
        let bytes = schema.serialize(&Value::from("hi"), "string").unwrap();
        assert_eq!(bytes, vec![2, 0, b'h', b'i']);
    }

    #[test]
    fn test_utf8_length_counts_bytes() {
        let schema = Schema::compile(&[]).unwrap();
        let bytes = schema.serialize(&Value::from("é"), "string").unwrap();
        assert_eq!(bytes, vec![2, 0, 0xC3, 0xA9]);
    }

    #[test]
    fn test_fixed_list_has_no_prefix() {
        let schema = schema("Pos { float[3] position; };");
        let value = Value::record([(
            "position",
            Value::from(vec![134.5f32, 0.0, 23.41]),
        )]);
        assert_eq!(schema.serialize(&value, "Pos").unwrap().len(), 12);
    }

    #[test]
    fn test_fixed_list_wrong_count() {
        let schema = schema("Pos { float[3] position; };");
        let value = Value::record([("position", Value::from(vec![1.0f32, 2.0]))]);
        assert_eq!(
            schema.serialize(&value, "Pos").unwrap_err(),
            WriteError::FixedCountMismatch {
                field: "position".to_string(),
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_serialize_list_directly() {
        let schema = Schema::compile(&[]).unwrap();
        let values = [Value::U16(0x0102), Value::U16(0x0304)];

        assert_eq!(
            schema.serialize_list(&values, "uint16", 0).unwrap(),
            vec![2, 0, 0x02, 0x01, 0x04, 0x03]
        );
        assert_eq!(
            schema.serialize_list(&values, "uint16", 2).unwrap(),
            vec![0x02, 0x01, 0x04, 0x03]
        );
        assert!(matches!(
            schema.serialize_list(&values, "uint16", 3),
            Err(WriteError::FixedCountMismatch { expected: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn test_oversize_string() {
        let schema = Schema::compile(&[]).unwrap();
        let long = "a".repeat(MAX_PREFIXED_LEN + 1);
        assert_eq!(
            schema.serialize(&Value::from(long), "string").unwrap_err(),
            WriteError::OversizeString {
                len: MAX_PREFIXED_LEN + 1
            }
        );

        let max = "a".repeat(MAX_PREFIXED_LEN);
        assert_eq!(
            schema.serialize(&Value::from(max), "string").unwrap().len(),
            MAX_PREFIXED_LEN + 2
        );
    }

    #[test]
    fn test_oversize_list() {
        let schema = Schema::compile(&[]).unwrap();
        let values = vec![Value::U8(0); MAX_PREFIXED_LEN + 1];
        assert_eq!(
            schema.serialize_list(&values, "uint8", 0).unwrap_err(),
            WriteError::OversizeList {
                len: MAX_PREFIXED_LEN + 1
            }
        );
    }

    #[test]
    fn test_unknown_type() {
        let schema = Schema::compile(&[]).unwrap();
        assert_eq!(
            schema.serialize(&Value::I32(1), "Player").unwrap_err(),
            WriteError::UnknownType("Player".to_string())
        );
    }

    #[test]
    fn test_type_mismatch() {
        let schema = schema("A { int32 id; };");
        let value = Value::record([("id", Value::U32(1))]);
        assert_eq!(
            schema.serialize(&value, "A").unwrap_err(),
            WriteError::TypeMismatch {
                expected: "int32",
                found: "uint32"
            }
        );
    }

    #[test]
    fn test_missing_and_unexpected_fields() {
        let schema = schema("A { int32 id; };");

        let empty = Value::record(Vec::<(&str, Value)>::new());
        assert_eq!(
            schema.serialize(&empty, "A").unwrap_err(),
            WriteError::MissingField("id".to_string())
        );

        let extra = Value::record([("id", Value::I32(1)), ("name", Value::from("x"))]);
        assert_eq!(
            schema.serialize(&extra, "A").unwrap_err(),
            WriteError::UnexpectedField("name".to_string())
        );
    }

    #[test]
    fn test_repeated_field_needs_list_value() {
        let schema = schema("Group { int32[] members; };");
        let value = Value::record([("members", Value::I32(1))]);
        assert_eq!(
            schema.serialize(&value, "Group").unwrap_err(),
            WriteError::TypeMismatch {
                expected: "list",
                found: "int32"
            }
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut config = crate::config::CodecConfig::new();
        config.set_max_depth(2);
        let schema = Schema::parse_text("Node { Node[] children; };")
            .unwrap()
            .with_config(config);

        let leaf = Value::record([("children", Value::List(vec![]))]);
        let two = Value::record([("children", Value::List(vec![leaf]))]);
        assert!(schema.serialize(&two, "Node").is_ok());

        let three = Value::record([("children", Value::List(vec![two]))]);
        assert_eq!(
            schema.serialize(&three, "Node").unwrap_err(),
            WriteError::DepthLimit(2)
        );
    }
}
