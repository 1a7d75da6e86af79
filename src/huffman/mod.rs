//! Huffman compression over bytes.
//!
//! [encode] produces two bit buffers: the serialized tree and the payload.
//! [compress] additionally frames them into one byte sequence (see
//! [crate::frame]); [decompress] and [decode] are the inverses.

pub mod codebook;
pub mod tree;

use tracing::debug;

pub use codebook::{Code, Codebook};
pub use tree::{HuffmanTree, Node};

use crate::{
    bits::BitBuffer,
    errors::{HuffmanError, ReadError, Result},
    frame,
};

/// Builds a tree for `data` and returns `(tree bits, payload bits)`.
pub fn encode(data: &[u8]) -> Result<(BitBuffer, BitBuffer), HuffmanError> {
    let tree = HuffmanTree::build(data)?;
    let codebook = Codebook::from_tree(&tree);

    let mut payload = BitBuffer::new();
    codebook.encode(data, &mut payload)?;

    Ok((tree.to_bits(), payload))
}

/// Reads the tree from `tree_bits` and decodes every bit of `payload`.
pub fn decode(tree_bits: &mut BitBuffer, payload: &mut BitBuffer) -> Result<Vec<u8>, HuffmanError> {
    let tree = HuffmanTree::read(tree_bits)?;
    decode_payload(&tree, payload)
}

/// Decodes `payload` until its declared bit length is consumed. A code that
/// runs past the end fails with [ReadError::OutOfRangeRead].
pub fn decode_payload(tree: &HuffmanTree, payload: &mut BitBuffer) -> Result<Vec<u8>, HuffmanError> {
    let mut out = Vec::new();

    if let Node::Leaf(symbol) = tree.root() {
        while payload.bits_remaining() > 0 {
            let position = payload.read_position();
            if payload.read_bit()? {
                return Err(HuffmanError::InvalidCode { position });
            }
            out.push(*symbol);
        }
        return Ok(out);
    }

    while payload.bits_remaining() > 0 {
        let mut node = tree.root();
        while let Node::Internal { left, right } = node {
            node = if payload.read_bit()? { &**right } else { &**left };
        }
        if let Node::Leaf(symbol) = node {
            out.push(*symbol);
        }
    }

    Ok(out)
}

/// Compresses `data` into a framed tree + payload packet. Empty input packs
/// two empty segments.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let (tree, payload) = if data.is_empty() {
        (BitBuffer::new(), BitBuffer::new())
    } else {
        encode(data)?
    };

    let packed = frame::pack(&tree, &payload)?;
    debug!(
        raw = data.len(),
        tree_bits = tree.bit_len(),
        payload_bits = payload.bit_len(),
        packed = packed.len(),
        "huffman compressed"
    );

    Ok(packed)
}

/// Inverse of [compress].
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    let (mut tree, mut payload) = frame::unpack(bytes)?;

    if tree.is_empty() {
        if payload.is_empty() {
            return Ok(Vec::new());
        }
        return Err(ReadError::Format(format!(
            "{} payload bits with an empty tree",
            payload.bit_len()
        ))
        .into());
    }

    let data = decode(&mut tree, &mut payload)?;
    debug!(packed = bytes.len(), raw = data.len(), "huffman decompressed");

    Ok(data)
}
