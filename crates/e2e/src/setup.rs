//! Test doubles for the host ledger.
//!
//! [`TestChain`] seals blocks with real transaction tries, so the inclusion
//! proofs exercised by the scenarios are the same bytes a bidder would build
//! against a production block.

use {
    alloy::primitives::{Address, B64, B256, Bloom, Bytes, U256, b256},
    auction::{BlockHashes, TxStatus},
    commitment::{Commitment, derive_commitment},
    inclusion_proof::{BlockHeader, build_proof, transactions_root},
    std::sync::Once,
    tx_codec::{SignedTransaction, UnsignedTransaction},
};

pub const GAS_LIMIT: u64 = 300_000;

pub fn gas_price() -> U256 {
    U256::from(1_000_000_000u64)
}

/// Initializes tracing once per test binary.
pub fn observe() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .init();
    });
}

/// An in-memory chain of sealed blocks. Headers commit to the real
/// transaction trie of their body, so proofs built from it verify against the
/// served block hashes.
#[derive(Debug, Default)]
pub struct TestChain {
    headers: Vec<BlockHeader>,
    bodies: Vec<Vec<SignedTransaction>>,
}

impl TestChain {
    /// A chain with an empty genesis block.
    pub fn new() -> Self {
        let mut chain = Self::default();
        chain.mine_block(vec![]);
        chain
    }

    /// Number of the most recently sealed block.
    pub fn height(&self) -> u32 {
        self.headers.len() as u32 - 1
    }

    /// Seals a block over the given body and returns its number.
    pub fn mine_block(&mut self, transactions: Vec<SignedTransaction>) -> u32 {
        let number = self.headers.len() as u32;
        let header = BlockHeader {
            parent_hash: self.headers.last().map(BlockHeader::hash).unwrap_or(B256::ZERO),
            ommers_hash: b256!("1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347"),
            beneficiary: Address::repeat_byte(0xee),
            state_root: B256::repeat_byte(0x0d),
            transactions_root: transactions_root(&transactions),
            receipts_root: B256::repeat_byte(0x0e),
            logs_bloom: Bloom::ZERO,
            difficulty: U256::from(131_072u64),
            number: u64::from(number),
            gas_limit: 30_000_000,
            gas_used: 21_000 * transactions.len() as u64,
            timestamp: 1_700_000_000 + u64::from(number) * 12,
            extra_data: Bytes::new(),
            mix_hash: B256::ZERO,
            nonce: B64::ZERO,
        };
        self.headers.push(header);
        self.bodies.push(transactions);
        number
    }

    /// Seals the transaction into the next block and reports where it landed,
    /// the way a network transport collaborator would.
    pub fn submit(&mut self, transaction: SignedTransaction) -> TxStatus {
        let block_number = self.mine_block(vec![transaction]);
        TxStatus::Confirmed {
            block_number,
            tx_index: 0,
        }
    }

    /// Seals empty blocks until the chain height reaches `number`.
    pub fn mine_until(&mut self, number: u32) {
        while self.height() < number {
            self.mine_block(vec![]);
        }
    }

    /// Encoded inclusion proof for one transaction of one sealed block.
    pub fn prove(&self, block_number: u32, tx_index: u32) -> Vec<u8> {
        let block = block_number as usize;
        build_proof(&self.headers[block], &self.bodies[block], tx_index)
            .unwrap()
            .encode()
    }
}

impl BlockHashes for TestChain {
    fn block_hash(&self, number: u32) -> Option<B256> {
        self.headers.get(number as usize).map(BlockHeader::hash)
    }
}

/// A plain value transfer. The signature fields are opaque to the inclusion
/// proof; only the recipient and the carried value matter to the auction.
pub fn funding_tx(to: Address, value: U256, seed: u64) -> SignedTransaction {
    SignedTransaction {
        payload: UnsignedTransaction {
            nonce: seed,
            gas_price: gas_price(),
            gas_limit: 21_000,
            to: Some(to),
            value,
            data: Bytes::new(),
        },
        v: 27,
        r: U256::from(seed * 7 + 3),
        s: U256::from(seed * 13 + 5),
    }
}

/// A commitment with its funding transfer already on chain.
#[derive(Debug)]
pub struct Placed {
    pub bidder: Address,
    pub commitment: Commitment,
    pub commit_block: u32,
    pub tx_index: u32,
}

/// Derives a fresh commitment and seals a block funding its commit address,
/// buried among unrelated transfers so the proof walks a non-trivial trie.
pub fn place_commit(
    chain: &mut TestChain,
    bidder: Address,
    contract: Address,
    bid: U256,
    deposit: U256,
) -> Placed {
    let commitment =
        derive_commitment(bidder, contract, bid, b"", gas_price(), GAS_LIMIT).unwrap();
    let commit_block = chain.mine_block(vec![
        funding_tx(Address::repeat_byte(0x99), U256::from(1u64), 1),
        funding_tx(commitment.commit_address, deposit, 2),
        funding_tx(Address::repeat_byte(0x99), U256::from(2u64), 3),
    ]);
    Placed {
        bidder,
        commitment,
        commit_block,
        tx_index: 1,
    }
}
