//! Submarine commitment derivation.
//!
//! A bidder derives a one-time commit address and a pre-authorized unlock
//! transfer entirely off-chain. The only secret is the 32-byte witness: it
//! determines the one-time signing key, which determines the commit address
//! and the unlock signature. The public commit id binds the bid terms without
//! involving the witness, so it reveals nothing about the bid before the
//! reveal call discloses those terms.

use {
    alloy::{
        primitives::{Address, B256, Bytes, U256, keccak256},
        signers::{SignerSync, local::PrivateKeySigner},
    },
    rand::RngCore,
    thiserror::Error,
    tx_codec::{SignedTransaction, UnsignedTransaction},
};

/// The unlock transfer is always the commit address's first transaction.
pub const UNLOCK_NONCE: u64 = 0;

#[derive(Debug, Error)]
pub enum DeriveError {
    /// The hash of the witness is not a valid secp256k1 scalar. With fresh
    /// random witnesses this has negligible probability; callers should
    /// simply derive again.
    #[error("witness does not map to a usable signing key")]
    UnusableWitness,
    #[error("signing the unlock transaction failed: {0}")]
    Signer(#[from] alloy::signers::Error),
}

/// Everything the bidder must retain locally before any network interaction.
#[derive(Debug, Clone)]
pub struct Commitment {
    /// One-time address the funding transfer must pay.
    pub commit_address: Address,
    /// Public identifier the auction keys its record by.
    pub commit_id: B256,
    /// The secret. Losing it forfeits the ability to reveal.
    pub witness: B256,
    /// Fully signed transfer from the commit address to the auction contract,
    /// withheld until reveal.
    pub unlock_tx: SignedTransaction,
}

impl Commitment {
    pub fn unlock_tx_bytes(&self) -> Vec<u8> {
        self.unlock_tx.encode()
    }

    pub fn unsigned_unlock_tx_bytes(&self) -> Vec<u8> {
        self.unlock_tx.payload.encode()
    }
}

/// Derives a commitment with a fresh witness from the operating system's
/// entropy source. Witnesses are never reused across calls; a reused witness
/// would collide the derived private keys.
pub fn derive_commitment(
    bidder: Address,
    auction_contract: Address,
    bid_amount: U256,
    extra_data: &[u8],
    gas_price: U256,
    gas_limit: u64,
) -> Result<Commitment, DeriveError> {
    let mut witness = B256::ZERO;
    rand::rngs::OsRng.fill_bytes(witness.as_mut_slice());
    derive_with_witness(
        witness,
        bidder,
        auction_contract,
        bid_amount,
        extra_data,
        gas_price,
        gas_limit,
    )
}

/// Deterministic derivation from a known witness.
pub fn derive_with_witness(
    witness: B256,
    bidder: Address,
    auction_contract: Address,
    bid_amount: U256,
    extra_data: &[u8],
    gas_price: U256,
    gas_limit: u64,
) -> Result<Commitment, DeriveError> {
    let signer = signer_from_witness(witness)?;
    let unsigned = UnsignedTransaction {
        nonce: UNLOCK_NONCE,
        gas_price,
        gas_limit,
        to: Some(auction_contract),
        value: bid_amount,
        data: Bytes::copy_from_slice(extra_data),
    };
    let signature = signer.sign_hash_sync(&unsigned.signing_hash())?;
    let unlock_tx = SignedTransaction {
        payload: unsigned,
        v: 27 + u64::from(signature.v()),
        r: signature.r(),
        s: signature.s(),
    };

    let commitment = Commitment {
        commit_address: signer.address(),
        commit_id: commit_id(
            bidder,
            auction_contract,
            bid_amount,
            extra_data,
            UNLOCK_NONCE,
            gas_price,
            gas_limit,
        ),
        witness,
        unlock_tx,
    };
    tracing::debug!(
        commit_address = %commitment.commit_address,
        commit_id = %commitment.commit_id,
        "derived submarine commitment"
    );
    Ok(commitment)
}

/// The address controlled by the witness holder. Used by the auction at
/// reveal time to check that the proven funding transaction paid the right
/// recipient.
pub fn commit_address_from_witness(witness: B256) -> Result<Address, DeriveError> {
    Ok(signer_from_witness(witness)?.address())
}

/// Public, collision-resistant binding of the bid terms, independent of the
/// witness.
pub fn commit_id(
    bidder: Address,
    auction_contract: Address,
    bid_amount: U256,
    extra_data: &[u8],
    nonce: u64,
    gas_price: U256,
    gas_limit: u64,
) -> B256 {
    let mut buf = Vec::with_capacity(88 + extra_data.len());
    buf.extend_from_slice(bidder.as_slice());
    buf.extend_from_slice(auction_contract.as_slice());
    buf.extend_from_slice(&bid_amount.to_be_bytes::<32>());
    buf.extend_from_slice(extra_data);
    buf.extend_from_slice(&nonce.to_be_bytes());
    buf.extend_from_slice(&gas_price.to_be_bytes::<32>());
    buf.extend_from_slice(&gas_limit.to_be_bytes());
    keccak256(buf)
}

fn signer_from_witness(witness: B256) -> Result<PrivateKeySigner, DeriveError> {
    PrivateKeySigner::from_bytes(&keccak256(witness)).map_err(|_| DeriveError::UnusableWitness)
}
