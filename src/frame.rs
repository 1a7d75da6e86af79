//! Packet framing: a Huffman tree segment followed by a payload segment.
//!
//! # Frame Format
//!
//! ```text
//! +----------------------+
//! | tree_bits (4)        |  u32 little-endian
//! +----------------------+
//! | tree bytes           |  ceil(tree_bits / 8), pad bits zero
//! +----------------------+
//! | payload_bits (4)     |  u32 little-endian
//! +----------------------+
//! | payload bytes        |  ceil(payload_bits / 8), pad bits zero
//! +----------------------+
//! ```

use crate::{
    bits::{BitBuffer, bytes_for_bits},
    cursor::ByteCursor,
    errors::{ReadError, WriteError},
};

/// Size of one segment header in bytes.
pub const SEGMENT_HEADER_SIZE: usize = 4;

/// Packs a tree buffer and a payload buffer into one byte sequence.
pub fn pack(tree: &BitBuffer, payload: &BitBuffer) -> Result<Vec<u8>, WriteError> {
    let mut out = Vec::with_capacity(
        2 * SEGMENT_HEADER_SIZE + bytes_for_bits(tree.bit_len()) + bytes_for_bits(payload.bit_len()),
    );

    write_segment(&mut out, tree)?;
    write_segment(&mut out, payload)?;

    Ok(out)
}

/// Splits a packed byte sequence back into its tree and payload buffers.
///
/// # Errors
/// [ReadError::Format] if a header is missing, a segment is shorter than its
/// declared bit length, or bytes follow the payload segment.
pub fn unpack(bytes: &[u8]) -> Result<(BitBuffer, BitBuffer), ReadError> {
    let mut cursor = ByteCursor::new(bytes);

    let tree = read_segment(&mut cursor, "tree")?;
    let payload = read_segment(&mut cursor, "payload")?;

    if !cursor.is_empty() {
        return Err(ReadError::Format(format!(
            "{} bytes after the payload segment",
            cursor.remaining()
        )));
    }

    Ok((tree, payload))
}

fn write_segment(out: &mut Vec<u8>, segment: &BitBuffer) -> Result<(), WriteError> {
    let bits = segment.bit_len();
    let header = u32::try_from(bits).map_err(|_| WriteError::SegmentTooLong { bits })?;

    out.extend_from_slice(&header.to_le_bytes());
    out.extend_from_slice(&segment.as_bytes()[..bytes_for_bits(bits)]);

    Ok(())
}

fn read_segment(cursor: &mut ByteCursor<'_>, name: &str) -> Result<BitBuffer, ReadError> {
    let bits = cursor
        .read_u32_le()
        .map_err(|_| ReadError::Format(format!("missing {name} length header")))?
        as usize;

    let needed = bytes_for_bits(bits);
    let data = cursor.take(needed).map_err(|_| {
        ReadError::Format(format!(
            "{name} segment declares {bits} bits ({needed} bytes), only {} bytes remain",
            cursor.remaining()
        ))
    })?;

    BitBuffer::from_bytes(data, bits)
}
