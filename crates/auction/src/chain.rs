//! Boundary types toward the host ledger.
//!
//! The ledger injects the caller, the carried value and the current block
//! number into every call; the core never reads them from ambient state. The
//! ledger also answers which block hash is canonical for a block number it
//! has observed — the auction only trusts proofs against such hashes.

use alloy::primitives::{Address, B256, U256};

/// Per-call context supplied by the host ledger.
#[derive(Debug, Clone, Copy)]
pub struct CallContext {
    pub sender: Address,
    pub value: U256,
    pub block_number: u32,
}

impl CallContext {
    pub fn new(sender: Address, block_number: u32) -> Self {
        Self {
            sender,
            value: U256::ZERO,
            block_number,
        }
    }

    pub fn with_value(self, value: U256) -> Self {
        Self { value, ..self }
    }
}

/// Canonical block hashes as observed by the host ledger.
pub trait BlockHashes {
    fn block_hash(&self, number: u32) -> Option<B256>;
}

/// Outcome of waiting for a submitted transaction, as reported by the network
/// transport collaborator. Polling and timeouts are its policy, not ours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Confirmed { block_number: u32, tx_index: u32 },
    Pending,
    Failed,
}
