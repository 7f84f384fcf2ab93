//! Property-based tests for ledger invariants
//!
//! These tests use proptest to verify:
//! - Overdrafts and zero amounts are rejected without side effects
//! - Player-to-player transfers conserve money
//! - Bank transfers move only the acting player's balance
//! - The log holds exactly the accepted transfers, newest first
//! - Per-player views are the filtered log in the same order
//! - Replaying a player's entries reproduces the live balance

use bank_ledger::{Config, Error, Ledger, Party, PlayerId};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// A request as the table would submit it
#[derive(Debug, Clone)]
struct Request {
    acting: usize,
    /// `None` targets the bank
    counterparty: Option<usize>,
    amount: i64,
}

/// Strategy for signed amounts, zero included
fn amount_strategy() -> impl Strategy<Value = i64> {
    prop_oneof![
        1 => Just(0i64),
        6 => -3_000i64..3_000,
        1 => 1_500i64..10_000,
    ]
}

/// Strategy for requests against a table of `players` seats
fn request_strategy(players: usize) -> impl Strategy<Value = Request> {
    (
        0..players,
        prop::option::weighted(0.7, 0..players),
        amount_strategy(),
    )
        .prop_map(|(acting, counterparty, amount)| Request {
            acting,
            counterparty,
            amount,
        })
}

fn create_table(players: usize) -> (Ledger, Vec<PlayerId>) {
    let mut ledger = Ledger::new(Config::default()).unwrap();
    let ids = (0..players)
        .map(|i| ledger.add_player(&format!("Player {}", i)).unwrap().id.clone())
        .collect();
    (ledger, ids)
}

fn party(ids: &[PlayerId], seat: Option<usize>) -> Party {
    match seat {
        Some(seat) => Party::Player(ids[seat].clone()),
        None => Party::Bank,
    }
}

fn balance(ledger: &Ledger, id: &PlayerId) -> Decimal {
    ledger.player(id).unwrap().balance
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: paying more than the balance is refused and changes nothing
    #[test]
    fn prop_overdraft_rejected(excess in 1i64..100_000, target in prop::option::of(0usize..1)) {
        let (mut ledger, ids) = create_table(2);
        let counterparty = party(&ids[1..], target);
        let before = ledger.snapshot();

        let amount = balance(&ledger, &ids[0]) + Decimal::from(excess);
        let result = ledger.request_transfer(&ids[0], &counterparty, amount, "");

        let is_insufficient = matches!(result, Err(Error::InsufficientFunds { .. }));
        prop_assert!(is_insufficient);
        prop_assert_eq!(ledger.snapshot(), before);
    }

    /// Property: zero is refused for every counterparty
    #[test]
    fn prop_zero_rejected(acting in 0usize..3, target in prop::option::of(0usize..3)) {
        let (mut ledger, ids) = create_table(3);

        let result = ledger.request_transfer(&ids[acting], &party(&ids, target), Decimal::ZERO, "x");

        prop_assert_eq!(result.unwrap_err(), Error::ZeroAmount);
        prop_assert_eq!(ledger.transaction_count(), 0);
    }

    /// Property: accepted player-to-player transfers are zero-sum
    #[test]
    fn prop_player_transfer_conserves(amount in -1_500i64..=1_500) {
        prop_assume!(amount != 0);
        let (mut ledger, ids) = create_table(2);
        let a_before = balance(&ledger, &ids[0]);
        let b_before = balance(&ledger, &ids[1]);

        ledger
            .request_transfer(&ids[0], &Party::Player(ids[1].clone()), Decimal::from(amount), "")
            .unwrap();

        let a_after = balance(&ledger, &ids[0]);
        let b_after = balance(&ledger, &ids[1]);
        prop_assert_eq!(a_after, a_before - Decimal::from(amount));
        prop_assert_eq!(b_after, b_before + Decimal::from(amount));
        prop_assert_eq!(a_after + b_after, a_before + b_before);
    }

    /// Property: bank transfers only move the acting player's balance
    #[test]
    fn prop_bank_only_moves_acting_player(amount in -5_000i64..=1_500) {
        prop_assume!(amount != 0);
        let (mut ledger, ids) = create_table(3);
        let before: Vec<Decimal> = ids.iter().map(|id| balance(&ledger, id)).collect();

        ledger
            .request_transfer(&ids[1], &Party::Bank, Decimal::from(amount), "")
            .unwrap();

        prop_assert_eq!(balance(&ledger, &ids[0]), before[0]);
        prop_assert_eq!(balance(&ledger, &ids[1]), before[1] - Decimal::from(amount));
        prop_assert_eq!(balance(&ledger, &ids[2]), before[2]);
        prop_assert_eq!(
            ledger.total_player_funds(),
            before.iter().copied().sum::<Decimal>() - Decimal::from(amount)
        );
    }

    /// Property: log, filtered views and balances stay in agreement
    #[test]
    fn prop_log_integrity(requests in prop::collection::vec(request_strategy(4), 1..40)) {
        let (mut ledger, ids) = create_table(4);
        let mut accepted = Vec::new();

        for request in &requests {
            let counterparty = party(&ids, request.counterparty);
            let result = ledger.request_transfer(
                &ids[request.acting],
                &counterparty,
                Decimal::from(request.amount),
                "",
            );
            if let Ok(tx) = result {
                accepted.push(tx.id);
            }
        }

        // Exactly the accepted transfers, newest first, all positive
        let logged: Vec<_> = ledger.transactions().map(|tx| tx.id).collect();
        accepted.reverse();
        prop_assert_eq!(&logged, &accepted);
        prop_assert!(ledger.transactions().all(|tx| tx.amount > Decimal::ZERO));

        for id in &ids {
            // Filtered view equals the subset of the full log, same order
            let filtered: Vec<_> = ledger.transactions_for(id).map(|tx| tx.id).collect();
            let expected: Vec<_> = ledger
                .transactions()
                .filter(|tx| tx.from == Party::Player(id.clone()) || tx.to == Party::Player(id.clone()))
                .map(|tx| tx.id)
                .collect();
            prop_assert_eq!(&filtered, &expected);

            // Restartable
            let view = ledger.transactions_for(id);
            prop_assert_eq!(view.clone().count(), view.count());

            prop_assert_eq!(ledger.reconstruct_balance(id).unwrap(), balance(&ledger, id));
        }

        prop_assert!(ledger.verify_consistency().is_ok());
    }
}
