//! Transaction inclusion proofs.
//!
//! The prover re-encodes a block's transaction list, rebuilds the ordered
//! Merkle-Patricia transaction trie, and extracts the minimal node path for
//! one index together with the full header. The verifier replays that path
//! against a block hash it already trusts. Both sides are pure functions and
//! safe to run in parallel across independent proofs.

pub mod header;
pub mod proof;
mod trie;

pub use {
    header::BlockHeader,
    proof::{ProofBlob, ProofError, build_proof, transactions_root, verify_proof},
};
