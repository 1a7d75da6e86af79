//! Error types for schema compilation, struct encoding/decoding and the Huffman stage.

use thiserror::Error;

/// Errors produced when compiling struct definitions into a [crate::schema::Schema].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two definitions share the same struct name.
    #[error("struct `{0}` is defined more than once")]
    DuplicateStruct(String),
    /// Field name is invalid (empty or duplicated within its struct).
    #[error("invalid field name `{field}` in struct `{owner}`")]
    InvalidFieldName { owner: String, field: String },
    /// A field refers to a type that is neither a scalar nor a defined struct.
    #[error("unknown type `{ty}` used by field `{owner}.{field}`")]
    UnknownType {
        owner: String,
        field: String,
        ty: String,
    },
    /// A struct contains itself through single fields or fixed lists only.
    #[error("struct `{0}` contains itself with no base case")]
    CyclicSchema(String),
    /// The schema text could not be parsed.
    #[error("syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },
}

/// Errors produced when serializing a [crate::value::Value] against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    /// The requested type name is not a scalar and not in the registry.
    #[error("unknown type `{0}`")]
    UnknownType(String),
    /// UTF-8 encoding of a string is longer than the 16-bit length prefix allows.
    #[error("string of {len} bytes exceeds the 65535 byte limit")]
    OversizeString { len: usize },
    /// Dynamic list is longer than the 16-bit count prefix allows.
    #[error("list of {len} elements exceeds the 65535 element limit")]
    OversizeList { len: usize },
    /// Fixed list was given a different number of elements than declared.
    #[error("field `{field}` expects exactly {expected} elements, got {actual}")]
    FixedCountMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },
    /// The value variant does not match the declared type.
    #[error("expected a {expected} value, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// A struct value is missing a declared field.
    #[error("missing field `{0}`")]
    MissingField(String),
    /// A struct value carries a field its definition does not declare.
    #[error("unexpected field `{0}`")]
    UnexpectedField(String),
    /// Struct nesting went past the configured depth.
    #[error("nesting depth limit of {0} exceeded")]
    DepthLimit(usize),
    /// A framed bit segment is longer than its 32-bit length header can describe.
    #[error("segment of {bits} bits does not fit a 32-bit length header")]
    SegmentTooLong { bits: usize },
}

/// Errors produced when reading bits or bytes back (struct decode, Huffman decode, framing).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// The bit read cursor reached the write cursor.
    #[error("bit read out of range at bit {position}")]
    OutOfRangeRead { position: usize },
    /// The requested type name is not a scalar and not in the registry.
    #[error("unknown type `{0}`")]
    UnknownType(String),
    /// Fewer bytes remain than the type being read requires.
    #[error("truncated input: needed {needed} bytes at offset {offset}, {available} available")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// Bytes were left over after a complete top-level value.
    #[error("{remaining} trailing bytes left after decoding")]
    IncompleteConsumption { remaining: usize },
    /// Framed segment lengths are inconsistent with the available bytes.
    #[error("format error: {0}")]
    Format(String),
    /// A string field is not valid UTF-8.
    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },
    /// A boolean byte is neither 0 nor 1.
    #[error("invalid boolean byte {value:#04x} at offset {offset}")]
    InvalidBool { offset: usize, value: u8 },
    /// Struct nesting went past the configured depth.
    #[error("nesting depth limit of {0} exceeded")]
    DepthLimit(usize),
}

/// Errors produced by the Huffman stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HuffmanError {
    /// No symbols to build a tree from.
    #[error("cannot build a huffman tree from empty input")]
    EmptyInput,
    /// A byte to encode has no entry in the codebook.
    #[error("byte {0:#04x} has no code in the codebook")]
    MissingCode(u8),
    /// A payload bit sequence does not lead to a leaf.
    #[error("invalid huffman code at bit {position}")]
    InvalidCode { position: usize },
    /// A serialized tree carries the same symbol in two leaves.
    #[error("symbol {0:#04x} appears in more than one leaf")]
    DuplicateSymbol(u8),
    /// A serialized tree nests deeper than any 256-symbol tree can.
    #[error("huffman tree deeper than {0} levels")]
    TreeTooDeep(usize),
    /// Bits remain in the tree segment after the root was completed.
    #[error("{0} bits left over after the huffman tree")]
    TrailingTreeBits(usize),
    /// Reading the tree or payload bits failed.
    #[error(transparent)]
    Read(#[from] ReadError),
}

/// Umbrella error for the one-call compress/decompress paths.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("write error: {0}")]
    Write(#[from] WriteError),
    #[error("read error: {0}")]
    Read(#[from] ReadError),
    #[error("huffman error: {0}")]
    Huffman(#[from] HuffmanError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
