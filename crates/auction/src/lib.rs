//! Submarine sealed-bid auction state machine.
//!
//! The auction owns one [`Auction`] aggregate and a map of per-commitment
//! records, mutated through the commit → reveal → select-winner → finalize
//! lifecycle. The host ledger serializes calls and injects the call context;
//! nothing here touches the network. The end of the commit window is
//! hash-committed at initialization and only disclosed at winner selection,
//! so bidders cannot time a last-moment bid at the boundary.

pub mod chain;
mod error;
mod game;

pub use {
    chain::{BlockHashes, CallContext, TxStatus},
    error::AuctionError,
    game::{Auction, CommitmentRecord, Payout, Phase, REVEAL_PERIOD_LENGTH, end_commit_block_commitment},
};
