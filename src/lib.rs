//! Schema-driven binary codec for structured records, with an optional
//! Huffman compression stage.
//!
//! ```
//! use packcraft::{Schema, Value};
//!
//! let schema = Schema::parse_text("Point { float x; float y; };").unwrap();
//! let point = Value::record([("x", Value::F32(1.5)), ("y", Value::F32(-2.25))]);
//!
//! let bytes = schema.serialize(&point, "Point").unwrap();
//! assert_eq!(bytes.len(), 8);
//! assert_eq!(schema.deserialize(&bytes, "Point").unwrap(), point);
//!
//! let packed = schema.compress(&point, "Point").unwrap();
//! assert_eq!(schema.decompress(&packed, "Point").unwrap(), point);
//! ```

pub mod bits;
pub mod compiled;
mod compress;
pub mod config;
pub mod cursor;
mod decode;
pub mod encode;
pub mod errors;
pub mod field;
pub mod frame;
pub mod huffman;
pub mod schema;
#[cfg(feature = "serde")]
pub mod serde;
pub mod text;
pub mod value;

pub use bits::BitBuffer;
pub use config::CodecConfig;
pub use errors::{Error, HuffmanError, ReadError, Result, SchemaError, WriteError};
pub use field::{Field, FieldKind, StructDef};
pub use schema::Schema;
pub use value::Value;
