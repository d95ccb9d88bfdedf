//! The auction aggregate and its lifecycle transitions.

use {
    crate::{
        chain::{BlockHashes, CallContext},
        error::AuctionError,
    },
    alloy::primitives::{Address, B256, U256, keccak256},
    commitment::UNLOCK_NONCE,
    inclusion_proof::verify_proof,
    serde::Serialize,
    std::collections::HashMap,
    tx_codec::UnsignedTransaction,
};

/// Blocks between the start and the end of the reveal window. Fixed protocol
/// constant.
pub const REVEAL_PERIOD_LENGTH: u32 = 30;

/// The manager's hash commitment to the true end of the commit window.
pub fn end_commit_block_commitment(end_commit_block: u32) -> B256 {
    keccak256(end_commit_block.to_be_bytes())
}

/// Lifecycle phase, derived from stored state and a block number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Uninitialized,
    Commit,
    Reveal,
    Ended,
}

/// Per-commitment state, keyed by commit id. `bid_amount` stays zero until a
/// successful reveal; `unlocked_amount` is only ever set equal to
/// `bid_amount`, and only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentRecord {
    pub bid_amount: U256,
    pub unlocked_amount: U256,
    pub commit_block_number: u32,
    pub commit_block_tx_index: u32,
    pub bidder: Address,
    finalized: bool,
}

impl CommitmentRecord {
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn is_revealed(&self) -> bool {
        !self.bid_amount.is_zero()
    }

    fn is_unlocked(&self) -> bool {
        self.is_revealed() && self.unlocked_amount == self.bid_amount
    }
}

/// A transfer the host ledger must perform. Computed exactly once per commit
/// id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub recipient: Address,
    pub amount: U256,
}

/// The single auction instance of a deployment. Created once, mutated through
/// its lifecycle, never destroyed.
#[derive(Debug)]
pub struct Auction {
    /// The auction contract's own address; reveal recomputes commit ids
    /// against it.
    address: Address,
    manager: Address,
    start_block: u32,
    start_reveal_block: u32,
    end_reveal_block: u32,
    min_bet: U256,
    end_commit_block_commitment: B256,
    end_commit_block_revealed: Option<u32>,
    is_initiated: bool,
    winner_selected: bool,
    winning_commit_id: B256,
    commitments: HashMap<B256, CommitmentRecord>,
}

impl Auction {
    pub fn new(address: Address, manager: Address) -> Self {
        Self {
            address,
            manager,
            start_block: 0,
            start_reveal_block: 0,
            end_reveal_block: 0,
            min_bet: U256::ZERO,
            end_commit_block_commitment: B256::ZERO,
            end_commit_block_revealed: None,
            is_initiated: false,
            winner_selected: false,
            winning_commit_id: B256::ZERO,
            commitments: HashMap::new(),
        }
    }

    /// Stores the schedule and the hash-committed commit deadline. Callable
    /// once, by the manager only.
    pub fn initialize(
        &mut self,
        ctx: CallContext,
        start_block: u32,
        start_reveal_block: u32,
        min_bet: U256,
        end_commit_block_commitment: B256,
    ) -> Result<(), AuctionError> {
        if ctx.sender != self.manager {
            return Err(AuctionError::Unauthorized);
        }
        if self.is_initiated {
            return Err(AuctionError::AlreadyInitialized);
        }
        // The ledger serves historical block hashes at most 256 blocks back,
        // so reveals of the earliest commits must start within that horizon.
        if start_block >= start_reveal_block || start_reveal_block - start_block > 256 {
            return Err(AuctionError::InvalidSchedule);
        }

        self.start_block = start_block;
        self.start_reveal_block = start_reveal_block;
        self.end_reveal_block = start_reveal_block + REVEAL_PERIOD_LENGTH;
        self.min_bet = min_bet;
        self.end_commit_block_commitment = end_commit_block_commitment;
        self.is_initiated = true;
        tracing::info!(
            start_block,
            start_reveal_block,
            end_reveal_block = self.end_reveal_block,
            %min_bet,
            "auction initialized"
        );
        Ok(())
    }

    /// Records that value landed at a derived commit address. The deposit's
    /// semantic meaning as a bid is not attributable yet; the bid amount is
    /// populated only at reveal.
    pub fn on_funded(
        &mut self,
        commit_id: B256,
        ctx: CallContext,
        tx_index: u32,
    ) -> Result<(), AuctionError> {
        if !self.is_initiated {
            return Err(AuctionError::NotInitiated);
        }
        self.commitments
            .entry(commit_id)
            .or_insert_with(|| CommitmentRecord {
                commit_block_number: ctx.block_number,
                commit_block_tx_index: tx_index,
                bidder: ctx.sender,
                ..Default::default()
            });
        tracing::debug!(%commit_id, amount = %ctx.value, "commit address funded");
        Ok(())
    }

    /// Proves that the sender funded a commit address before the (still
    /// undisclosed) deadline and discloses the bid terms. On success the
    /// record's bid amount and commit position are set.
    pub fn reveal(
        &mut self,
        ctx: CallContext,
        commit_block_number: u32,
        extra_data: &[u8],
        witness: B256,
        unsigned_unlock_tx: &[u8],
        proof_blob: &[u8],
        block_hashes: &impl BlockHashes,
    ) -> Result<B256, AuctionError> {
        if !self.is_initiated {
            return Err(AuctionError::NotInitiated);
        }
        if ctx.block_number < self.start_block || ctx.block_number >= self.end_reveal_block {
            return Err(AuctionError::OutsideWindow);
        }

        let unlock_tx = UnsignedTransaction::decode(unsigned_unlock_tx)?;
        if unlock_tx.nonce != UNLOCK_NONCE
            || unlock_tx.to != Some(self.address)
            || unlock_tx.data.as_ref() != extra_data
        {
            return Err(AuctionError::UnlockMismatch);
        }

        let block_hash = block_hashes
            .block_hash(commit_block_number)
            .ok_or(AuctionError::UnknownBlockHash(commit_block_number))?;
        let (tx_index, commit_tx) = verify_proof(block_hash, proof_blob)?;

        // The funding transfer must pay the one-time address controlled by
        // the witness holder, and must cover the bid (the surplus pays for
        // sweeping the commit address later).
        let commit_address = commitment::commit_address_from_witness(witness)?;
        if commit_tx.payload.to != Some(commit_address) {
            return Err(AuctionError::WrongRecipient);
        }
        if commit_tx.payload.value < unlock_tx.value {
            return Err(AuctionError::InsufficientDeposit);
        }

        let bid_amount = unlock_tx.value;
        if bid_amount < self.min_bet {
            return Err(AuctionError::BelowMinBet);
        }

        let commit_id = commitment::commit_id(
            ctx.sender,
            self.address,
            bid_amount,
            extra_data,
            UNLOCK_NONCE,
            unlock_tx.gas_price,
            unlock_tx.gas_limit,
        );
        let record = self.commitments.entry(commit_id).or_default();
        if record.is_revealed() {
            return Err(AuctionError::AlreadyRevealed);
        }
        record.bid_amount = bid_amount;
        record.commit_block_number = commit_block_number;
        record.commit_block_tx_index = tx_index;
        record.bidder = ctx.sender;
        tracing::info!(
            %commit_id,
            bidder = %ctx.sender,
            %bid_amount,
            commit_block_number,
            tx_index,
            "commitment revealed"
        );
        Ok(commit_id)
    }

    /// Acknowledges the pre-signed unlock transfer arriving from the commit
    /// address. The carried value must equal the revealed bid.
    pub fn unlock(&mut self, ctx: CallContext, commit_id: B256) -> Result<(), AuctionError> {
        if !self.is_initiated {
            return Err(AuctionError::NotInitiated);
        }
        let record = self
            .commitments
            .get_mut(&commit_id)
            .ok_or(AuctionError::UnknownCommit)?;
        if !record.is_revealed() {
            return Err(AuctionError::NotRevealed);
        }
        if !record.unlocked_amount.is_zero() {
            return Err(AuctionError::AlreadyUnlocked);
        }
        if ctx.value != record.bid_amount {
            return Err(AuctionError::ValueMismatch);
        }
        record.unlocked_amount = record.bid_amount;
        tracing::info!(%commit_id, amount = %ctx.value, "commitment unlocked");
        Ok(())
    }

    /// Discloses the true commit deadline, excludes late commits and picks
    /// the winner: highest bid, ties broken by the earliest on-chain commit
    /// position. A "no winner" outcome is valid.
    pub fn select_winner(
        &mut self,
        ctx: CallContext,
        end_commit_block_raw: u32,
    ) -> Result<(), AuctionError> {
        if !self.is_initiated {
            return Err(AuctionError::NotInitiated);
        }
        if ctx.sender != self.manager {
            return Err(AuctionError::Unauthorized);
        }
        if self.winner_selected {
            return Err(AuctionError::AlreadySelected);
        }
        if ctx.block_number < self.end_reveal_block {
            return Err(AuctionError::OutsideWindow);
        }
        if end_commit_block_commitment(end_commit_block_raw) != self.end_commit_block_commitment {
            return Err(AuctionError::CommitmentMismatch);
        }

        let winner = self
            .commitments
            .iter()
            .filter(|(_, record)| {
                record.is_unlocked() && record.commit_block_number <= end_commit_block_raw
            })
            .max_by_key(|(_, record)| {
                (
                    record.bid_amount,
                    std::cmp::Reverse((record.commit_block_number, record.commit_block_tx_index)),
                )
            })
            .map(|(commit_id, _)| *commit_id);

        self.end_commit_block_revealed = Some(end_commit_block_raw);
        self.winner_selected = true;
        self.winning_commit_id = winner.unwrap_or(B256::ZERO);
        tracing::info!(
            end_commit_block_raw,
            winning_commit_id = %self.winning_commit_id,
            "winner selected"
        );
        Ok(())
    }

    /// Pays out one commitment: the winning bid goes to the manager, losing
    /// bids are returned to their bidders. Safe against double payment; the
    /// first call marks the record finalized.
    pub fn finalize(&mut self, ctx: CallContext, commit_id: B256) -> Result<Payout, AuctionError> {
        if !self.winner_selected {
            return Err(AuctionError::WinnerNotSelected);
        }
        let winning_commit_id = self.winning_commit_id;
        let manager = self.manager;
        let record = self
            .commitments
            .get_mut(&commit_id)
            .ok_or(AuctionError::UnknownCommit)?;
        if record.finalized {
            return Err(AuctionError::AlreadyFinalized);
        }

        let payout = if commit_id == winning_commit_id {
            Payout {
                recipient: manager,
                amount: record.bid_amount,
            }
        } else {
            Payout {
                recipient: record.bidder,
                amount: record.unlocked_amount,
            }
        };
        record.finalized = true;
        tracing::info!(
            %commit_id,
            caller = %ctx.sender,
            recipient = %payout.recipient,
            amount = %payout.amount,
            "commitment finalized"
        );
        Ok(payout)
    }

    // Read interface.

    pub fn manager(&self) -> Address {
        self.manager
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn min_bet(&self) -> U256 {
        self.min_bet
    }

    pub fn start_block(&self) -> u32 {
        self.start_block
    }

    pub fn start_reveal_block(&self) -> u32 {
        self.start_reveal_block
    }

    pub fn end_reveal_block(&self) -> u32 {
        self.end_reveal_block
    }

    pub fn end_commit_block_commitment(&self) -> B256 {
        self.end_commit_block_commitment
    }

    pub fn end_commit_block_revealed(&self) -> Option<u32> {
        self.end_commit_block_revealed
    }

    pub fn is_initiated(&self) -> bool {
        self.is_initiated
    }

    pub fn winner_selected(&self) -> bool {
        self.winner_selected
    }

    pub fn winning_commit_id(&self) -> B256 {
        self.winning_commit_id
    }

    pub fn commitment(&self, commit_id: B256) -> Option<&CommitmentRecord> {
        self.commitments.get(&commit_id)
    }

    pub fn revealed_and_unlocked(&self, commit_id: B256) -> bool {
        self.commitments
            .get(&commit_id)
            .is_some_and(CommitmentRecord::is_unlocked)
    }

    pub fn phase(&self, block_number: u32) -> Phase {
        if !self.is_initiated {
            Phase::Uninitialized
        } else if self.winner_selected {
            Phase::Ended
        } else if block_number < self.start_reveal_block {
            Phase::Commit
        } else {
            Phase::Reveal
        }
    }
}
