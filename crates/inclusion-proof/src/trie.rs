//! Ordered Merkle-Patricia transaction trie.
//!
//! Keys are the encoded transaction indices, values the encoded transactions.
//! Nodes whose encoding is shorter than 32 bytes are embedded in their parent;
//! everything else is referenced by hash. The root is always referenced by
//! hash, which is the `transactionsRoot` committed in the block header.

use {
    crate::ProofError,
    alloy::primitives::{B256, keccak256},
    tx_codec::{Item, SignedTransaction},
};

/// Root of the empty trie, `keccak256(rlp(""))`.
const EMPTY_ROOT: B256 =
    alloy::primitives::b256!("56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421");

pub(crate) struct TxTrie {
    root: Option<Node>,
}

enum Node {
    Leaf {
        path: Vec<u8>,
        value: Vec<u8>,
    },
    Extension {
        path: Vec<u8>,
        child: Box<Node>,
    },
    Branch {
        children: [Option<Box<Node>>; 16],
        value: Option<Vec<u8>>,
    },
}

impl TxTrie {
    pub fn from_transactions(transactions: &[SignedTransaction]) -> Self {
        let pairs = transactions
            .iter()
            .enumerate()
            .map(|(index, tx)| (nibbles(&key_for_index(index as u32)), tx.encode()))
            .collect::<Vec<_>>();
        Self {
            root: if pairs.is_empty() {
                None
            } else {
                Some(build(pairs))
            },
        }
    }

    pub fn root_hash(&self) -> B256 {
        match &self.root {
            None => EMPTY_ROOT,
            Some(root) => keccak256(node_item(root).encode()),
        }
    }

    /// The ordered hash-referenced nodes from the root down to the leaf
    /// holding `index`. Inline nodes travel inside their parent's bytes.
    pub fn prove(&self, index: u32) -> Result<Vec<Vec<u8>>, ProofError> {
        let key = nibbles(&key_for_index(index));
        let mut key = key.as_slice();
        let mut node = self.root.as_ref().ok_or(ProofError::AbsentIndex(index))?;
        let mut nodes = Vec::new();

        loop {
            let encoded = node_item(node).encode();
            if nodes.is_empty() || encoded.len() >= 32 {
                nodes.push(encoded);
            }
            match node {
                Node::Leaf { path, .. } => {
                    if path.as_slice() == key {
                        return Ok(nodes);
                    }
                    return Err(ProofError::AbsentIndex(index));
                }
                Node::Extension { path, child } => {
                    key = key
                        .strip_prefix(path.as_slice())
                        .ok_or(ProofError::AbsentIndex(index))?;
                    node = child;
                }
                Node::Branch { children, value } => match key.split_first() {
                    None => {
                        if value.is_some() {
                            return Ok(nodes);
                        }
                        return Err(ProofError::AbsentIndex(index));
                    }
                    Some((&nibble, rest)) => {
                        key = rest;
                        node = children[usize::from(nibble)]
                            .as_deref()
                            .ok_or(ProofError::AbsentIndex(index))?;
                    }
                },
            }
        }
    }
}

/// Transaction trie key: the encoded index.
pub(crate) fn key_for_index(index: u32) -> Vec<u8> {
    Item::uint64(u64::from(index)).encode()
}

pub(crate) fn nibbles(key: &[u8]) -> Vec<u8> {
    key.iter().flat_map(|byte| [byte >> 4, byte & 0x0f]).collect()
}

fn build(mut pairs: Vec<(Vec<u8>, Vec<u8>)>) -> Node {
    debug_assert!(!pairs.is_empty());
    if pairs.len() == 1 {
        let (path, value) = pairs.pop().expect("one pair left");
        return Node::Leaf { path, value };
    }

    let prefix_len = common_prefix_len(&pairs);
    if prefix_len > 0 {
        let path = pairs[0].0[..prefix_len].to_vec();
        for (key, _) in &mut pairs {
            key.drain(..prefix_len);
        }
        return Node::Extension {
            path,
            child: Box::new(build(pairs)),
        };
    }

    let mut value = None;
    let mut buckets: [Vec<(Vec<u8>, Vec<u8>)>; 16] = Default::default();
    for (key, val) in pairs {
        match key.split_first() {
            None => value = Some(val),
            Some((&nibble, rest)) => buckets[usize::from(nibble)].push((rest.to_vec(), val)),
        }
    }
    let children = buckets.map(|bucket| {
        if bucket.is_empty() {
            None
        } else {
            Some(Box::new(build(bucket)))
        }
    });
    Node::Branch { children, value }
}

fn common_prefix_len(pairs: &[(Vec<u8>, Vec<u8>)]) -> usize {
    let first = pairs[0].0.as_slice();
    (0..first.len())
        .take_while(|&i| pairs.iter().all(|(key, _)| key.get(i) == Some(&first[i])))
        .count()
}

fn node_item(node: &Node) -> Item {
    match node {
        Node::Leaf { path, value } => Item::List(vec![
            Item::Bytes(hex_prefix(path, true)),
            Item::bytes(value),
        ]),
        Node::Extension { path, child } => Item::List(vec![
            Item::Bytes(hex_prefix(path, false)),
            node_ref(child),
        ]),
        Node::Branch { children, value } => {
            let mut items = children
                .iter()
                .map(|child| match child {
                    Some(node) => node_ref(node),
                    None => Item::Bytes(Vec::new()),
                })
                .collect::<Vec<_>>();
            items.push(match value {
                Some(value) => Item::bytes(value),
                None => Item::Bytes(Vec::new()),
            });
            Item::List(items)
        }
    }
}

/// Inline rule: short nodes embed, long nodes are referenced by hash.
fn node_ref(node: &Node) -> Item {
    let item = node_item(node);
    let encoded = item.encode();
    if encoded.len() < 32 {
        item
    } else {
        Item::bytes(keccak256(&encoded))
    }
}

/// Hex-prefix path encoding: a flag nibble distinguishing leaf from extension
/// and odd from even path lengths, then the packed path nibbles.
pub(crate) fn hex_prefix(path: &[u8], leaf: bool) -> Vec<u8> {
    let flag: u8 = if leaf { 2 } else { 0 };
    let mut out = Vec::with_capacity(path.len() / 2 + 1);
    let rest = if path.len() % 2 == 1 {
        out.push(((flag + 1) << 4) | path[0]);
        &path[1..]
    } else {
        out.push(flag << 4);
        path
    };
    for pair in rest.chunks(2) {
        out.push((pair[0] << 4) | pair[1]);
    }
    out
}

/// Inverse of [`hex_prefix`]; returns the path nibbles and the leaf flag.
pub(crate) fn decode_hex_prefix(encoded: &[u8]) -> Result<(Vec<u8>, bool), ProofError> {
    let (&first, rest) = encoded.split_first().ok_or(ProofError::MalformedNode)?;
    let flag = first >> 4;
    if flag > 3 {
        return Err(ProofError::MalformedNode);
    }
    let leaf = flag >= 2;
    let mut path = Vec::with_capacity(encoded.len() * 2);
    if flag % 2 == 1 {
        path.push(first & 0x0f);
    } else if first & 0x0f != 0 {
        return Err(ProofError::MalformedNode);
    }
    for &byte in rest {
        path.push(byte >> 4);
        path.push(byte & 0x0f);
    }
    Ok((path, leaf))
}
