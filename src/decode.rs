//! Struct deserialization: little-endian records back to [Value]s.

use std::collections::BTreeMap;

use tracing::trace;

use crate::{
    compiled::{CompiledStruct, CompiledType, ScalarKind},
    cursor::ByteCursor,
    errors::ReadError,
    field::FieldKind,
    schema::Schema,
    value::Value,
};

impl Schema {
    /// Deserializes `data` as `type_name`. The whole input must be consumed;
    /// leftover bytes fail with [ReadError::IncompleteConsumption].
    pub fn deserialize(&self, data: &[u8], type_name: &str) -> Result<Value, ReadError> {
        let ty = self
            .resolve(type_name)
            .ok_or_else(|| ReadError::UnknownType(type_name.to_string()))?;

        let mut cursor = ByteCursor::new(data);
        let value = self.read_value(&mut cursor, ty, 0)?;
        cursor.finish()?;

        Ok(value)
    }

    /// Reads one value of `ty` from a shared cursor, leaving the cursor after it.
    pub fn read_from(&self, cursor: &mut ByteCursor<'_>, type_name: &str) -> Result<Value, ReadError> {
        let ty = self
            .resolve(type_name)
            .ok_or_else(|| ReadError::UnknownType(type_name.to_string()))?;

        self.read_value(cursor, ty, 0)
    }

    fn read_value(
        &self,
        cursor: &mut ByteCursor<'_>,
        ty: CompiledType,
        depth: usize,
    ) -> Result<Value, ReadError> {
        match ty {
            CompiledType::Scalar(kind) => read_scalar(cursor, kind),
            CompiledType::Struct(idx) => self.read_struct(cursor, self.struct_at(idx), depth + 1),
        }
    }

    fn read_struct(
        &self,
        cursor: &mut ByteCursor<'_>,
        def: &CompiledStruct,
        depth: usize,
    ) -> Result<Value, ReadError> {
        if depth > self.config.max_depth {
            return Err(ReadError::DepthLimit(self.config.max_depth));
        }

        let mut fields = BTreeMap::new();
        for field in &def.fields {
            trace!(owner = %def.name, field = %field.name, offset = cursor.position(), "read field");

            let value = match field.kind {
                FieldKind::Single => self.read_value(cursor, field.ty, depth)?,
                kind => self.read_list(cursor, field.ty, kind, depth)?,
            };
            fields.insert(field.name.clone(), value);
        }

        Ok(Value::Struct(fields))
    }

    fn read_list(
        &self,
        cursor: &mut ByteCursor<'_>,
        ty: CompiledType,
        kind: FieldKind,
        depth: usize,
    ) -> Result<Value, ReadError> {
        let count = match kind {
            FieldKind::Fixed(count) => count,
            FieldKind::List | FieldKind::Single => cursor.read_u16_le()? as usize,
        };

        // Every element takes at least one byte, except structs with no fields.
        let mut items = Vec::with_capacity(count.min(cursor.remaining()));
        for _ in 0..count {
            items.push(self.read_value(cursor, ty, depth)?);
        }

        Ok(Value::List(items))
    }
}

fn read_scalar(cursor: &mut ByteCursor<'_>, kind: ScalarKind) -> Result<Value, ReadError> {
    Ok(match kind {
        ScalarKind::I8 => Value::I8(i8::from_le_bytes(cursor.take_array()?)),
        ScalarKind::U8 => Value::U8(cursor.read_u8()?),
        ScalarKind::I16 => Value::I16(i16::from_le_bytes(cursor.take_array()?)),
        ScalarKind::U16 => Value::U16(cursor.read_u16_le()?),
        ScalarKind::I32 => Value::I32(i32::from_le_bytes(cursor.take_array()?)),
        ScalarKind::U32 => Value::U32(cursor.read_u32_le()?),
        ScalarKind::F32 => Value::F32(f32::from_le_bytes(cursor.take_array()?)),
        ScalarKind::F64 => Value::F64(f64::from_le_bytes(cursor.take_array()?)),
        ScalarKind::Bool => {
            let offset = cursor.position();
            match cursor.read_u8()? {
                0 => Value::Bool(false),
                1 => Value::Bool(true),
                value => return Err(ReadError::InvalidBool { offset, value }),
            }
        }
        ScalarKind::String => {
            let len = cursor.read_u16_le()? as usize;
            let offset = cursor.position();
            let bytes = cursor.take(len)?;
            let s = std::str::from_utf8(bytes).map_err(|_| ReadError::InvalidUtf8 { offset })?;
            Value::String(s.to_string())
        }
    })
}
