//! Canonical transaction serialization.
//!
//! This crate implements the chain's recursive length-prefix encoding and the
//! signed/unsigned transaction records built on top of it. Commitment
//! derivation and inclusion proofs both re-encode transactions and compare
//! the resulting hashes, so encoding is strictly deterministic and decoding
//! rejects every non-canonical form.

pub mod rlp;
pub mod transaction;

pub use {
    rlp::{CodecError, Item},
    transaction::{SignedTransaction, UnsignedTransaction},
};
