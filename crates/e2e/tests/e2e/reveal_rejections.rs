use {
    alloy::primitives::{Address, B256, U256},
    auction::{Auction, AuctionError, CallContext, end_commit_block_commitment},
    e2e::setup::*,
};

const START_BLOCK: u32 = 1;
const START_REVEAL: u32 = 20;
const END_COMMIT: u32 = 15;

fn contract() -> Address {
    Address::repeat_byte(0xc0)
}

fn setup() -> (TestChain, Auction) {
    observe();
    let manager = Address::repeat_byte(0xa0);
    let mut chain = TestChain::new();
    let mut auction = Auction::new(contract(), manager);
    auction
        .initialize(
            CallContext::new(manager, chain.height()),
            START_BLOCK,
            START_REVEAL,
            U256::from(5u64),
            end_commit_block_commitment(END_COMMIT),
        )
        .unwrap();
    chain.mine_until(START_BLOCK);
    (chain, auction)
}

fn reveal(
    auction: &mut Auction,
    chain: &TestChain,
    placed: &Placed,
    witness: B256,
    proof: &[u8],
) -> Result<B256, AuctionError> {
    auction.reveal(
        CallContext::new(placed.bidder, chain.height()),
        placed.commit_block,
        b"",
        witness,
        &placed.commitment.unsigned_unlock_tx_bytes(),
        proof,
        chain,
    )
}

#[test]
fn tampered_proof_is_rejected() {
    let (mut chain, mut auction) = setup();
    let placed = place_commit(
        &mut chain,
        Address::repeat_byte(0x01),
        contract(),
        U256::from(10u64),
        U256::from(12u64),
    );
    chain.mine_until(START_REVEAL);

    let mut proof = chain.prove(placed.commit_block, placed.tx_index);
    let last = proof.len() - 1;
    proof[last] ^= 0x01;
    assert!(matches!(
        reveal(&mut auction, &chain, &placed, placed.commitment.witness, &proof),
        Err(AuctionError::ProofInvalid(_)),
    ));

    // The untampered proof goes through.
    let proof = chain.prove(placed.commit_block, placed.tx_index);
    reveal(&mut auction, &chain, &placed, placed.commitment.witness, &proof).unwrap();
}

#[test]
fn wrong_witness_is_rejected() {
    let (mut chain, mut auction) = setup();
    let placed = place_commit(
        &mut chain,
        Address::repeat_byte(0x01),
        contract(),
        U256::from(10u64),
        U256::from(12u64),
    );
    chain.mine_until(START_REVEAL);

    // A valid witness, but not the one whose address the proven transfer
    // funded.
    let proof = chain.prove(placed.commit_block, placed.tx_index);
    assert_eq!(
        reveal(&mut auction, &chain, &placed, B256::repeat_byte(0x42), &proof),
        Err(AuctionError::WrongRecipient),
    );
}

#[test]
fn underfunded_commit_is_rejected() {
    let (mut chain, mut auction) = setup();
    let placed = place_commit(
        &mut chain,
        Address::repeat_byte(0x01),
        contract(),
        U256::from(10u64),
        // Deposit smaller than the committed bid.
        U256::from(9u64),
    );
    chain.mine_until(START_REVEAL);

    let proof = chain.prove(placed.commit_block, placed.tx_index);
    assert_eq!(
        reveal(&mut auction, &chain, &placed, placed.commitment.witness, &proof),
        Err(AuctionError::InsufficientDeposit),
    );
}

#[test]
fn bid_below_the_minimum_is_rejected() {
    let (mut chain, mut auction) = setup();
    let placed = place_commit(
        &mut chain,
        Address::repeat_byte(0x01),
        contract(),
        U256::from(4u64),
        U256::from(12u64),
    );
    chain.mine_until(START_REVEAL);

    let proof = chain.prove(placed.commit_block, placed.tx_index);
    assert_eq!(
        reveal(&mut auction, &chain, &placed, placed.commitment.witness, &proof),
        Err(AuctionError::BelowMinBet),
    );
}

#[test]
fn double_reveal_is_rejected() {
    let (mut chain, mut auction) = setup();
    let placed = place_commit(
        &mut chain,
        Address::repeat_byte(0x01),
        contract(),
        U256::from(10u64),
        U256::from(12u64),
    );
    chain.mine_until(START_REVEAL);

    let proof = chain.prove(placed.commit_block, placed.tx_index);
    reveal(&mut auction, &chain, &placed, placed.commitment.witness, &proof).unwrap();
    assert_eq!(
        reveal(&mut auction, &chain, &placed, placed.commitment.witness, &proof),
        Err(AuctionError::AlreadyRevealed),
    );
}

#[test]
fn reveal_after_the_window_is_rejected() {
    let (mut chain, mut auction) = setup();
    let placed = place_commit(
        &mut chain,
        Address::repeat_byte(0x01),
        contract(),
        U256::from(10u64),
        U256::from(12u64),
    );
    chain.mine_until(auction.end_reveal_block());

    let proof = chain.prove(placed.commit_block, placed.tx_index);
    assert_eq!(
        reveal(&mut auction, &chain, &placed, placed.commitment.witness, &proof),
        Err(AuctionError::OutsideWindow),
    );
}
