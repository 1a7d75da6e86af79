//! One-call paths joining the struct codec and the Huffman stage.

use tracing::debug;

use crate::{errors::Result, huffman, schema::Schema, value::Value};

impl Schema {
    /// Serializes `value` as `type_name` and Huffman-compresses the record.
    pub fn compress(&self, value: &Value, type_name: &str) -> Result<Vec<u8>> {
        let raw = self.serialize(value, type_name)?;
        let packed = huffman::compress(&raw)?;

        debug!(type_name, raw = raw.len(), packed = packed.len(), "compressed record");

        Ok(packed)
    }

    /// Decompresses a packet made by [Schema::compress] and deserializes it as `type_name`.
    pub fn decompress(&self, bytes: &[u8], type_name: &str) -> Result<Value> {
        let raw = huffman::decompress(bytes)?;
        Ok(self.deserialize(&raw, type_name)?)
    }
}
