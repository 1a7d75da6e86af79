//! Huffman tree construction and its pre-order bit serialization.

use tracing::debug;

use crate::{bits::BitBuffer, errors::HuffmanError};

/// Deepest leaf a tree over 256 distinct symbols can have.
pub const MAX_TREE_DEPTH: usize = 255;

/// A node of a Huffman tree. Children are exclusively owned by their parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf(u8),
    Internal { left: Box<Node>, right: Box<Node> },
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }
}

/// A node together with the total frequency of the symbols under it. Only
/// exists while a tree is being built; weights are not serialized.
#[derive(Debug)]
struct Weighted {
    weight: u64,
    node: Node,
}

/// Counts every distinct byte in `data`. Returns `(symbol, count)` pairs by
/// count descending; equal counts keep the order in which symbols first appear.
pub fn frequencies(data: &[u8]) -> Vec<(u8, u64)> {
    let mut counts = [0u64; 256];
    let mut first_seen = Vec::new();

    for &byte in data {
        if counts[byte as usize] == 0 {
            first_seen.push(byte);
        }
        counts[byte as usize] += 1;
    }

    let mut freqs: Vec<(u8, u64)> = first_seen
        .into_iter()
        .map(|symbol| (symbol, counts[symbol as usize]))
        .collect();
    // stable sort keeps first-seen order among equal counts
    freqs.sort_by(|a, b| b.1.cmp(&a.1));

    freqs
}

/// A Huffman tree over byte symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: Node,
}

impl HuffmanTree {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Builds the tree for `data`.
    ///
    /// The working list is kept in descending weight order. The two lightest
    /// entries are taken from the tail; the first one taken becomes the right
    /// child and the second the left child. The merged node goes in front of
    /// the first entry whose weight is not greater than its own.
    pub fn build(data: &[u8]) -> Result<Self, HuffmanError> {
        let freqs = frequencies(data);
        let symbols = freqs.len();

        let mut list: Vec<Weighted> = freqs
            .into_iter()
            .map(|(symbol, weight)| Weighted {
                weight,
                node: Node::Leaf(symbol),
            })
            .collect();

        loop {
            let right = list.pop().ok_or(HuffmanError::EmptyInput)?;
            let Some(left) = list.pop() else {
                debug!(symbols, bytes = data.len(), "built huffman tree");
                return Ok(Self { root: right.node });
            };

            let merged = Weighted {
                weight: right.weight + left.weight,
                node: Node::Internal {
                    left: Box::new(left.node),
                    right: Box::new(right.node),
                },
            };

            let at = list
                .iter()
                .position(|entry| entry.weight <= merged.weight)
                .unwrap_or(list.len());
            list.insert(at, merged);
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Number of leaves.
    pub fn symbol_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            match node {
                Node::Leaf(_) => 1,
                Node::Internal { left, right } => count(left) + count(right),
            }
        }
        count(&self.root)
    }

    /// Writes the tree in pre-order: a leaf is bit `1` followed by its 8
    /// symbol bits; an internal node is bit `0` followed by its right subtree
    /// and then its left subtree.
    pub fn write(&self, out: &mut BitBuffer) {
        fn write_node(node: &Node, out: &mut BitBuffer) {
            match node {
                Node::Leaf(symbol) => {
                    out.write_bit(true);
                    out.write_byte(*symbol);
                }
                Node::Internal { left, right } => {
                    out.write_bit(false);
                    write_node(right, out);
                    write_node(left, out);
                }
            }
        }

        write_node(&self.root, out);
    }

    /// Serializes the tree into a fresh buffer.
    pub fn to_bits(&self) -> BitBuffer {
        let mut out = BitBuffer::new();
        self.write(&mut out);
        out
    }

    /// Reads a tree written by [write](Self::write), right subtree first.
    /// The buffer must hold exactly one tree.
    pub fn read(bits: &mut BitBuffer) -> Result<Self, HuffmanError> {
        let mut seen = [false; 256];
        let root = read_node(bits, 0, &mut seen)?;

        match bits.bits_remaining() {
            0 => Ok(Self { root }),
            extra => Err(HuffmanError::TrailingTreeBits(extra)),
        }
    }
}

fn read_node(bits: &mut BitBuffer, depth: usize, seen: &mut [bool; 256]) -> Result<Node, HuffmanError> {
    if depth > MAX_TREE_DEPTH {
        return Err(HuffmanError::TreeTooDeep(MAX_TREE_DEPTH));
    }

    if bits.read_bit()? {
        let symbol = bits.read_byte()?;
        if std::mem::replace(&mut seen[symbol as usize], true) {
            return Err(HuffmanError::DuplicateSymbol(symbol));
        }
        Ok(Node::Leaf(symbol))
    } else {
        let right = read_node(bits, depth + 1, seen)?;
        let left = read_node(bits, depth + 1, seen)?;
        Ok(Node::Internal {
            left: Box::new(left),
            right: Box::new(right),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(symbol: u8) -> Box<Node> {
        Box::new(Node::Leaf(symbol))
    }

    #[test]
    fn test_frequencies_sorted_with_first_seen_ties() {
        let freqs = frequencies(b"AAAAAABCCCCCCDDEEEEE");
        assert_eq!(
            freqs,
            vec![(b'A', 6), (b'C', 6), (b'E', 5), (b'D', 2), (b'B', 1)]
        );
    }

    #[test]
    fn test_build_shape() {
        // B+D -> n3, n3+E -> n8, C+A -> n12, n8+n12 -> root
        let tree = HuffmanTree::build(b"AAAAAABCCCCCCDDEEEEE").unwrap();
        let expected = Node::Internal {
            left: Box::new(Node::Internal {
                left: leaf(b'A'),
                right: leaf(b'C'),
            }),
            right: Box::new(Node::Internal {
                left: leaf(b'E'),
                right: Box::new(Node::Internal {
                    left: leaf(b'D'),
                    right: leaf(b'B'),
                }),
            }),
        };
        assert_eq!(tree.root(), &expected);
        assert_eq!(tree.symbol_count(), 5);
    }

    #[test]
    fn test_merged_node_goes_before_equal_weight() {
        // a:2 b:1 c:1 -> b+c = 2 is inserted ahead of a, so a is taken first
        let tree = HuffmanTree::build(b"aabc").unwrap();
        let expected = Node::Internal {
            left: Box::new(Node::Internal {
                left: leaf(b'b'),
                right: leaf(b'c'),
            }),
            right: leaf(b'a'),
        };
        assert_eq!(tree.root(), &expected);
    }

    #[test]
    fn test_single_symbol_is_single_leaf() {
        let tree = HuffmanTree::build(b"zzzz").unwrap();
        assert_eq!(tree.root(), &Node::Leaf(b'z'));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(HuffmanTree::build(b"").unwrap_err(), HuffmanError::EmptyInput);
    }

    #[test]
    fn test_write_visits_right_before_left() {
        let tree = HuffmanTree::build(b"AAAAAABCCCCCCDDEEEEE").unwrap();
        let mut bits = tree.to_bits();

        // 4 internal nodes + 5 leaves of 9 bits
        assert_eq!(bits.bit_len(), 49);

        // root, right (n8), right (n3), then leaf B
        assert!(!bits.read_bit().unwrap());
        assert!(!bits.read_bit().unwrap());
        assert!(!bits.read_bit().unwrap());
        assert!(bits.read_bit().unwrap());
        assert_eq!(bits.read_byte().unwrap(), b'B');
        assert!(bits.read_bit().unwrap());
        assert_eq!(bits.read_byte().unwrap(), b'D');
        assert!(bits.read_bit().unwrap());
        assert_eq!(bits.read_byte().unwrap(), b'E');
        // left subtree of the root (n12): C then A
        assert!(!bits.read_bit().unwrap());
        assert!(bits.read_bit().unwrap());
        assert_eq!(bits.read_byte().unwrap(), b'C');
        assert!(bits.read_bit().unwrap());
        assert_eq!(bits.read_byte().unwrap(), b'A');
        assert_eq!(bits.bits_remaining(), 0);
    }

    #[test]
    fn test_write_read_round_trip() {
        let tree = HuffmanTree::build(b"AAAAAABCCCCCCDDEEEEE").unwrap();
        let mut bits = tree.to_bits();
        assert_eq!(HuffmanTree::read(&mut bits).unwrap(), tree);
    }

    #[test]
    fn test_single_leaf_round_trip() {
        let tree = HuffmanTree::build(b"q").unwrap();
        let mut bits = tree.to_bits();
        assert_eq!(bits.bit_len(), 9);
        assert_eq!(HuffmanTree::read(&mut bits).unwrap(), tree);
    }

    #[test]
    fn test_read_truncated_tree() {
        let mut bits = BitBuffer::new();
        bits.write_bit(false);
        bits.write_bit(true);
        bits.write_byte(b'x');

        assert!(matches!(
            HuffmanTree::read(&mut bits),
            Err(HuffmanError::Read(_))
        ));
    }

    #[test]
    fn test_read_duplicate_symbol() {
        let mut bits = BitBuffer::new();
        bits.write_bit(false);
        bits.write_bit(true);
        bits.write_byte(b'x');
        bits.write_bit(true);
        bits.write_byte(b'x');

        assert_eq!(
            HuffmanTree::read(&mut bits).unwrap_err(),
            HuffmanError::DuplicateSymbol(b'x')
        );
    }

    #[test]
    fn test_read_trailing_bits() {
        let mut bits = HuffmanTree::build(b"ab").unwrap().to_bits();
        bits.write_bit(false);

        assert_eq!(
            HuffmanTree::read(&mut bits).unwrap_err(),
            HuffmanError::TrailingTreeBits(1)
        );
    }

    #[test]
    fn test_read_too_deep() {
        let mut bits = BitBuffer::new();
        for _ in 0..=MAX_TREE_DEPTH + 1 {
            bits.write_bit(false);
        }

        assert_eq!(
            HuffmanTree::read(&mut bits).unwrap_err(),
            HuffmanError::TreeTooDeep(MAX_TREE_DEPTH)
        );
    }
}
