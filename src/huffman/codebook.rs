use std::{collections::BTreeMap, fmt};

use crate::{
    bits::BitBuffer,
    errors::HuffmanError,
    huffman::tree::{HuffmanTree, Node},
};

/// A variable-length Huffman code, first bit first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Code(Vec<bool>);

impl Code {
    pub fn bits(&self) -> &[bool] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.0 {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Byte symbol to code mapping derived from a [HuffmanTree].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codebook {
    codes: BTreeMap<u8, Code>,
}

impl Codebook {
    /// Walks the tree depth first, `0` to the left and `1` to the right. A
    /// tree that is a single leaf gets the one-bit code `0`.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut codes = BTreeMap::new();

        match tree.root() {
            Node::Leaf(symbol) => {
                codes.insert(*symbol, Code(vec![false]));
            }
            root => collect(root, &mut Vec::new(), &mut codes),
        }

        Self { codes }
    }

    pub fn get(&self, symbol: u8) -> Option<&Code> {
        self.codes.get(&symbol)
    }

    /// Codes in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> {
        self.codes.iter().map(|(&symbol, code)| (symbol, code))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Appends the code of every byte of `data` to `out`.
    pub fn encode(&self, data: &[u8], out: &mut BitBuffer) -> Result<(), HuffmanError> {
        for &byte in data {
            let code = self.get(byte).ok_or(HuffmanError::MissingCode(byte))?;
            for &bit in code.bits() {
                out.write_bit(bit);
            }
        }

        Ok(())
    }

    /// Total payload bits needed to encode `data`.
    pub fn encoded_bits(&self, data: &[u8]) -> Result<usize, HuffmanError> {
        data.iter().try_fold(0, |acc, &byte| {
            let code = self.get(byte).ok_or(HuffmanError::MissingCode(byte))?;
            Ok(acc + code.len())
        })
    }
}

fn collect(node: &Node, path: &mut Vec<bool>, codes: &mut BTreeMap<u8, Code>) {
    match node {
        Node::Leaf(symbol) => {
            codes.insert(*symbol, Code(path.clone()));
        }
        Node::Internal { left, right } => {
            path.push(false);
            collect(left, path, codes);
            path.pop();

            path.push(true);
            collect(right, path, codes);
            path.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codebook(data: &[u8]) -> Codebook {
        Codebook::from_tree(&HuffmanTree::build(data).unwrap())
    }

    #[test]
    fn test_codes_for_scenario() {
        let book = codebook(b"AAAAAABCCCCCCDDEEEEE");
        let code = |symbol: u8| book.get(symbol).unwrap().to_string();

        assert_eq!(code(b'A'), "00");
        assert_eq!(code(b'C'), "01");
        assert_eq!(code(b'E'), "10");
        assert_eq!(code(b'D'), "110");
        assert_eq!(code(b'B'), "111");
        assert_eq!(book.len(), 5);
    }

    #[test]
    fn test_single_symbol_gets_one_bit() {
        let book = codebook(b"xxx");
        assert_eq!(book.get(b'x').unwrap().to_string(), "0");
        assert_eq!(book.encoded_bits(b"xxx").unwrap(), 3);
    }

    #[test]
    fn test_no_empty_code() {
        let book = codebook(b"hello world");
        assert!(book.iter().all(|(_, code)| !code.is_empty()));
    }

    #[test]
    fn test_prefix_free() {
        let book = codebook(b"the quick brown fox jumps over the lazy dog");
        for (a, code_a) in book.iter() {
            for (b, code_b) in book.iter() {
                if a != b {
                    assert!(!code_a.is_prefix_of(code_b), "{a} is a prefix of {b}");
                }
            }
        }
    }

    #[test]
    fn test_encode_bits() {
        let book = codebook(b"AAAAAABCCCCCCDDEEEEE");
        let mut out = BitBuffer::new();
        book.encode(b"ABE", &mut out).unwrap();

        // 00 111 10
        assert_eq!(out.bit_len(), 7);
        assert_eq!(out.as_bytes(), &[0b0011_1100]);
    }

    #[test]
    fn test_encode_missing_symbol() {
        let book = codebook(b"ab");
        let mut out = BitBuffer::new();
        assert_eq!(
            book.encode(b"abc", &mut out).unwrap_err(),
            HuffmanError::MissingCode(b'c')
        );
    }
}
