//! Proof blob construction and verification.
//!
//! A proof blob carries the full header, the ordered hash-referenced trie
//! nodes along one key path, and the leaf index. The verifier trusts nothing
//! in the blob: it recomputes the header hash, replays the path against the
//! header's transactions root, and decodes the leaf transaction. Every
//! failure is terminal; a caller must rebuild the proof from a canonical
//! block instead of retrying the same bytes.

use {
    crate::{
        header::BlockHeader,
        trie::{TxTrie, decode_hex_prefix, key_for_index, nibbles},
    },
    alloy::primitives::{B256, keccak256},
    thiserror::Error,
    tx_codec::{CodecError, Item, SignedTransaction},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProofError {
    #[error("recomputed header hash does not match the claimed block hash")]
    HashMismatch,
    #[error("replayed trie path does not reach the transactions root")]
    RootMismatch,
    #[error("trie node is not a valid branch, extension or leaf")]
    MalformedNode,
    #[error("no transaction at index {0} in this block")]
    AbsentIndex(u32),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Compact inclusion proof for one transaction of one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofBlob {
    pub header: BlockHeader,
    pub nodes: Vec<Vec<u8>>,
    pub leaf_index: u32,
}

impl ProofBlob {
    pub fn encode(&self) -> Vec<u8> {
        Item::List(vec![
            self.header.to_item(),
            Item::List(self.nodes.iter().map(Item::bytes).collect()),
            Item::uint64(u64::from(self.leaf_index)),
        ])
        .encode()
    }

    pub fn decode(input: &[u8]) -> Result<Self, ProofError> {
        let fields = Item::decode(input)?.into_list()?;
        if fields.len() != 3 {
            return Err(CodecError::WrongFieldCount {
                expected: 3,
                found: fields.len(),
            }
            .into());
        }
        let nodes = fields[1]
            .as_list()?
            .iter()
            .map(|node| node.as_bytes().map(<[u8]>::to_vec))
            .collect::<Result<_, _>>()?;
        let leaf_index = fields[2].to_u64()?;
        Ok(Self {
            header: BlockHeader::from_item(&fields[0])?,
            nodes,
            leaf_index: u32::try_from(leaf_index).map_err(|_| CodecError::ScalarOverflow)?,
        })
    }
}

/// Re-encodes every transaction and returns the trie root the block header
/// must commit to.
pub fn transactions_root(transactions: &[SignedTransaction]) -> B256 {
    TxTrie::from_transactions(transactions).root_hash()
}

/// Builds the proof that `transactions[tx_index]` is part of `header`'s
/// transaction trie. Fails if the header does not commit to exactly this
/// transaction list, or if the index is out of range.
pub fn build_proof(
    header: &BlockHeader,
    transactions: &[SignedTransaction],
    tx_index: u32,
) -> Result<ProofBlob, ProofError> {
    let trie = TxTrie::from_transactions(transactions);
    if trie.root_hash() != header.transactions_root {
        return Err(ProofError::RootMismatch);
    }
    let nodes = trie.prove(tx_index)?;
    tracing::debug!(
        block_number = header.number,
        tx_index,
        node_count = nodes.len(),
        "built inclusion proof"
    );
    Ok(ProofBlob {
        header: header.clone(),
        nodes,
        leaf_index: tx_index,
    })
}

/// Checks a proof blob against an independently known block hash and returns
/// the proven transaction with its index.
pub fn verify_proof(
    claimed_block_hash: B256,
    blob: &[u8],
) -> Result<(u32, SignedTransaction), ProofError> {
    let blob = ProofBlob::decode(blob)?;
    if blob.header.hash() != claimed_block_hash {
        return Err(ProofError::HashMismatch);
    }
    let key = nibbles(&key_for_index(blob.leaf_index));
    let value = replay_path(blob.header.transactions_root, &blob.nodes, &key)?;
    let transaction = SignedTransaction::decode(&value)?;
    Ok((blob.leaf_index, transaction))
}

enum Step {
    Done(Vec<u8>),
    Next(Item),
}

/// Walks the supplied nodes from the root hash down along `key`, checking
/// every hash reference, and returns the leaf value.
fn replay_path(root: B256, nodes: &[Vec<u8>], key: &[u8]) -> Result<Vec<u8>, ProofError> {
    let mut remaining = nodes.iter();
    let mut key = key;
    let mut item = next_hashed(&mut remaining, root)?;
    loop {
        match step(item, &mut key, &mut remaining)? {
            Step::Done(value) => return Ok(value),
            Step::Next(next) => item = next,
        }
    }
}

fn step<'a>(
    item: Item,
    key: &mut &[u8],
    remaining: &mut std::slice::Iter<'a, Vec<u8>>,
) -> Result<Step, ProofError> {
    let fields = item.into_list().map_err(|_| ProofError::MalformedNode)?;
    match fields.len() {
        2 => {
            let (path, leaf) = decode_hex_prefix(fields[0].as_bytes()?)?;
            if leaf {
                if path.as_slice() != *key {
                    return Err(ProofError::RootMismatch);
                }
                return Ok(Step::Done(fields[1].as_bytes()?.to_vec()));
            }
            *key = key
                .strip_prefix(path.as_slice())
                .ok_or(ProofError::RootMismatch)?;
            descend(&fields[1], remaining).map(Step::Next)
        }
        17 => match key.split_first() {
            None => {
                let value = fields[16].as_bytes()?;
                if value.is_empty() {
                    return Err(ProofError::RootMismatch);
                }
                Ok(Step::Done(value.to_vec()))
            }
            Some((&nibble, rest)) => {
                *key = rest;
                descend(&fields[usize::from(nibble)], remaining).map(Step::Next)
            }
        },
        _ => Err(ProofError::MalformedNode),
    }
}

/// Resolves a child reference: an embedded list is an inline node, 32 bytes
/// are a hash pointing at the next supplied node, and an empty string means
/// the path does not exist in the trie.
fn descend<'a>(
    reference: &Item,
    remaining: &mut std::slice::Iter<'a, Vec<u8>>,
) -> Result<Item, ProofError> {
    match reference {
        Item::List(_) => Ok(reference.clone()),
        Item::Bytes(bytes) if bytes.len() == 32 => {
            next_hashed(remaining, B256::from_slice(bytes))
        }
        Item::Bytes(bytes) if bytes.is_empty() => Err(ProofError::RootMismatch),
        Item::Bytes(_) => Err(ProofError::MalformedNode),
    }
}

fn next_hashed(
    remaining: &mut std::slice::Iter<'_, Vec<u8>>,
    expected: B256,
) -> Result<Item, ProofError> {
    let bytes = remaining.next().ok_or(ProofError::RootMismatch)?;
    if keccak256(bytes) != expected {
        return Err(ProofError::RootMismatch);
    }
    Ok(Item::decode(bytes)?)
}
