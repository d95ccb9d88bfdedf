use {
    inclusion_proof::ProofError,
    thiserror::Error,
    tx_codec::CodecError,
};

/// Every failure is terminal for the call that triggered it; nothing is
/// retried internally and nothing is swallowed. The idempotence guards
/// (`AlreadyRevealed`, `AlreadyUnlocked`, `AlreadyFinalized`) are safe for
/// retrying callers to treat as success.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuctionError {
    #[error("caller is not the auction manager")]
    Unauthorized,
    #[error("auction has already been initialized")]
    AlreadyInitialized,
    #[error("auction has not been initialized")]
    NotInitiated,
    #[error("start block must precede the reveal start by at most 256 blocks")]
    InvalidSchedule,
    #[error("call made outside its valid block window")]
    OutsideWindow,
    #[error("input is not a valid transaction encoding: {0}")]
    MalformedEncoding(#[from] CodecError),
    #[error("inclusion proof rejected: {0}")]
    ProofInvalid(#[from] ProofError),
    #[error("no canonical block hash known for block {0}")]
    UnknownBlockHash(u32),
    #[error("unlock transaction does not match the reveal arguments")]
    UnlockMismatch,
    #[error("proven transaction does not pay the witness-derived address")]
    WrongRecipient,
    #[error("proven deposit is smaller than the committed bid")]
    InsufficientDeposit,
    #[error("bid is below the minimum bet")]
    BelowMinBet,
    #[error("commitment was already revealed")]
    AlreadyRevealed,
    #[error("commitment is not revealed")]
    NotRevealed,
    #[error("commitment was already unlocked")]
    AlreadyUnlocked,
    #[error("carried value does not equal the revealed bid")]
    ValueMismatch,
    #[error("revealed end-commit block does not match the stored commitment")]
    CommitmentMismatch,
    #[error("winner has already been selected")]
    AlreadySelected,
    #[error("winner has not been selected yet")]
    WinnerNotSelected,
    #[error("unknown commit id")]
    UnknownCommit,
    #[error("commitment was already finalized")]
    AlreadyFinalized,
    #[error("witness does not map to a usable signing key")]
    UnusableWitness,
}

impl From<commitment::DeriveError> for AuctionError {
    fn from(_: commitment::DeriveError) -> Self {
        AuctionError::UnusableWitness
    }
}
