use {
    alloy::primitives::{Address, U256},
    auction::{Auction, CallContext, Payout, Phase, TxStatus, end_commit_block_commitment},
    e2e::setup::*,
    tx_codec::SignedTransaction,
};

const START_BLOCK: u32 = 1;
const START_REVEAL: u32 = 20;
const END_COMMIT: u32 = 15;

fn manager() -> Address {
    Address::repeat_byte(0xa0)
}

fn contract() -> Address {
    Address::repeat_byte(0xc0)
}

/// Three bidders run the whole lifecycle. The highest bid wins, the manager
/// collects it, and the losers get their unlocked deposits back.
#[test]
fn three_bidders_full_lifecycle() {
    observe();
    let mut chain = TestChain::new();
    let mut auction = Auction::new(contract(), manager());

    assert_eq!(auction.phase(chain.height()), Phase::Uninitialized);
    auction
        .initialize(
            CallContext::new(manager(), chain.height()),
            START_BLOCK,
            START_REVEAL,
            U256::from(5u64),
            end_commit_block_commitment(END_COMMIT),
        )
        .unwrap();
    assert_eq!(auction.phase(chain.height()), Phase::Commit);

    tracing::info!("funding commit addresses during the commit window");
    let placed = [10u64, 20, 30].map(|bid| {
        place_commit(
            &mut chain,
            Address::repeat_byte(bid as u8),
            contract(),
            U256::from(bid),
            // Over-fund by the fee budget for the unlock transfer.
            U256::from(bid + 2),
        )
    });
    assert!(placed.iter().all(|p| p.commit_block <= END_COMMIT));

    tracing::info!("revealing and unlocking after the commit window closes");
    chain.mine_until(START_REVEAL);
    assert_eq!(auction.phase(chain.height()), Phase::Reveal);
    let mut ids = vec![];
    for placed in &placed {
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
        assert_eq!(commit_id, placed.commitment.commit_id);

        // The pre-signed unlock transfer lands on chain and delivers the bid.
        let unlock = SignedTransaction::decode(&placed.commitment.unlock_tx_bytes()).unwrap();
        let carried = unlock.payload.value;
        let status = chain.submit(unlock);
        assert!(matches!(status, TxStatus::Confirmed { .. }));
        auction
            .unlock(
                CallContext::new(placed.commitment.commit_address, chain.height())
                    .with_value(carried),
                commit_id,
            )
            .unwrap();
        assert!(auction.revealed_and_unlocked(commit_id));
        ids.push(commit_id);
    }

    tracing::info!("selecting the winner after the reveal window closes");
    chain.mine_until(auction.end_reveal_block());
    auction
        .select_winner(CallContext::new(manager(), chain.height()), END_COMMIT)
        .unwrap();
    assert_eq!(auction.phase(chain.height()), Phase::Ended);
    assert_eq!(auction.end_commit_block_revealed(), Some(END_COMMIT));
    assert_eq!(auction.winning_commit_id(), ids[2]);

    let finalize = |auction: &mut Auction, chain: &TestChain, id| {
        auction
            .finalize(CallContext::new(Address::repeat_byte(0x01), chain.height()), id)
            .unwrap()
    };
    assert_eq!(
        finalize(&mut auction, &chain, ids[2]),
        Payout {
            recipient: manager(),
            amount: U256::from(30u64),
        },
    );
    assert_eq!(
        finalize(&mut auction, &chain, ids[0]),
        Payout {
            recipient: placed[0].bidder,
            amount: U256::from(10u64),
        },
    );
    assert_eq!(
        finalize(&mut auction, &chain, ids[1]),
        Payout {
            recipient: placed[1].bidder,
            amount: U256::from(20u64),
        },
    );
}
