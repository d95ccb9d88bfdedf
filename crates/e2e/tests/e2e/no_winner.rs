use {
    alloy::primitives::{Address, B256, U256},
    auction::{Auction, CallContext, Payout, end_commit_block_commitment},
    e2e::setup::*,
    tx_codec::SignedTransaction,
};

const START_BLOCK: u32 = 1;
const START_REVEAL: u32 = 20;
const END_COMMIT: u32 = 2;

/// The only commit lands after the hash-committed deadline. It reveals and
/// unlocks successfully, but once the deadline is disclosed nobody is
/// eligible: the auction ends without a winner and the bidder is refunded.
#[test]
fn late_commit_leaves_no_winner() {
    observe();
    let manager = Address::repeat_byte(0xa0);
    let contract = Address::repeat_byte(0xc0);
    let mut chain = TestChain::new();
    let mut auction = Auction::new(contract, manager);
    auction
        .initialize(
            CallContext::new(manager, chain.height()),
            START_BLOCK,
            START_REVEAL,
            U256::from(5u64),
            end_commit_block_commitment(END_COMMIT),
        )
        .unwrap();

    chain.mine_until(END_COMMIT);
    let placed = place_commit(
        &mut chain,
        Address::repeat_byte(0x01),
        contract,
        U256::from(10u64),
        U256::from(12u64),
    );
    assert!(placed.commit_block > END_COMMIT);

    chain.mine_until(START_REVEAL);
    let proof = chain.prove(placed.commit_block, placed.tx_index);
    let commit_id = auction
        .reveal(
            CallContext::new(placed.bidder, chain.height()),
            placed.commit_block,
            b"",
            placed.commitment.witness,
            &placed.commitment.unsigned_unlock_tx_bytes(),
            &proof,
            &chain,
        )
        .unwrap();

    let unlock = SignedTransaction::decode(&placed.commitment.unlock_tx_bytes()).unwrap();
    let carried = unlock.payload.value;
    chain.submit(unlock);
    auction
        .unlock(
            CallContext::new(placed.commitment.commit_address, chain.height())
                .with_value(carried),
            commit_id,
        )
        .unwrap();

    chain.mine_until(auction.end_reveal_block());
    auction
        .select_winner(CallContext::new(manager, chain.height()), END_COMMIT)
        .unwrap();
    assert!(auction.winner_selected());
    assert_eq!(auction.winning_commit_id(), B256::ZERO);

    // Not the winner, so the unlocked deposit flows back to the bidder.
    assert_eq!(
        auction
            .finalize(CallContext::new(placed.bidder, chain.height()), commit_id)
            .unwrap(),
        Payout {
            recipient: placed.bidder,
            amount: U256::from(10u64),
        },
    );
}
