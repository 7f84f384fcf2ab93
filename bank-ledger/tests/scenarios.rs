//! End-to-end table scenarios
//!
//! One shared game played through the public API: two players, a payment
//! between them, a refused overdraft, a bank payout and a zero request.

use bank_ledger::{Config, Error, Flow, Ledger, Party, PlayerId};
use rust_decimal::Decimal;

struct Table {
    ledger: Ledger,
    alice: PlayerId,
    bob: PlayerId,
}

fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

fn balance(ledger: &Ledger, id: &PlayerId) -> Decimal {
    ledger.player(id).unwrap().balance
}

/// Alice and Bob join, Alice pays Bob 200
fn scenario_a() -> Table {
    let mut ledger = Ledger::new(Config::default()).unwrap();
    let alice = ledger.add_player("Alice").unwrap().id.clone();
    let bob = ledger.add_player("Bob").unwrap().id.clone();

    assert_eq!(balance(&ledger, &alice), dec(1500));
    assert_eq!(balance(&ledger, &bob), dec(1500));

    ledger
        .request_transfer(&alice, &Party::Player(bob.clone()), dec(200), "")
        .unwrap();

    Table { ledger, alice, bob }
}

#[test]
fn test_scenario_a_player_pays_player() {
    let table = scenario_a();

    assert_eq!(balance(&table.ledger, &table.alice), dec(1300));
    assert_eq!(balance(&table.ledger, &table.bob), dec(1700));

    let log: Vec<_> = table.ledger.transactions().collect();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].from, Party::Player(table.alice.clone()));
    assert_eq!(log[0].to, Party::Player(table.bob.clone()));
    assert_eq!(log[0].amount, dec(200));
}

#[test]
fn test_scenario_b_overdraft_refused() {
    let mut table = scenario_a();
    let before = table.ledger.snapshot();

    let err = table
        .ledger
        .request_transfer(&table.alice, &Party::Player(table.bob.clone()), dec(5000), "")
        .unwrap_err();

    assert!(matches!(
        err,
        Error::InsufficientFunds { requested, available, .. }
            if requested == dec(5000) && available == dec(1300)
    ));
    assert_eq!(table.ledger.snapshot(), before);
    assert_eq!(table.ledger.transaction_count(), 1);
    assert_eq!(
        table.ledger.metrics().rejected_count("insufficient-funds"),
        1
    );
}

#[test]
fn test_scenario_c_bank_payout() {
    let mut table = scenario_a();

    let tx = table
        .ledger
        .request_transfer(&table.alice, &Party::Bank, dec(-300), "Go")
        .unwrap()
        .clone();

    assert_eq!(tx.from, Party::Bank);
    assert_eq!(tx.to, Party::Player(table.alice.clone()));
    assert_eq!(tx.amount, dec(300));
    assert_eq!(balance(&table.ledger, &table.alice), dec(1600));
    assert_eq!(balance(&table.ledger, &table.bob), dec(1700));
    assert_eq!(table.ledger.total_player_funds(), dec(3300));
}

#[test]
fn test_scenario_d_zero_amount() {
    let mut table = scenario_a();

    let err = table
        .ledger
        .request_transfer(&table.alice, &Party::Player(table.bob.clone()), dec(0), "")
        .unwrap_err();

    assert_eq!(err, Error::ZeroAmount);
    assert_eq!(err.reason(), "zero-amount");
    assert_eq!(table.ledger.transaction_count(), 1);
}

#[test]
fn test_scenario_e_filtered_history() {
    let mut table = scenario_a();
    let _ = table
        .ledger
        .request_transfer(&table.alice, &Party::Player(table.bob.clone()), dec(5000), "");
    table
        .ledger
        .request_transfer(&table.alice, &Party::Bank, dec(-300), "")
        .unwrap();

    let bob_log: Vec<_> = table.ledger.transactions_for(&table.bob).collect();
    assert_eq!(bob_log.len(), 1);
    assert_eq!(bob_log[0].from, Party::Player(table.alice.clone()));
    assert_eq!(bob_log[0].amount, dec(200));

    let flows: Vec<Flow> = table
        .ledger
        .history_for(&table.alice)
        .map(|row| row.flow)
        .collect();
    assert_eq!(flows, vec![Flow::Incoming, Flow::Outgoing]);

    table.ledger.verify_consistency().unwrap();
}

#[test]
fn test_filtered_history_follows_new_entries() {
    let mut table = scenario_a();
    let earlier: Vec<_> = table
        .ledger
        .transactions_for(&table.bob)
        .map(|tx| tx.id)
        .collect();
    assert_eq!(earlier.len(), 1);

    let paid = table
        .ledger
        .request_transfer(&table.bob, &Party::Bank, dec(100), "Tax")
        .unwrap()
        .id;
    table
        .ledger
        .request_transfer(&table.alice, &Party::Bank, dec(-50), "")
        .unwrap();
    let received = table
        .ledger
        .request_transfer(&table.alice, &Party::Player(table.bob.clone()), dec(-25), "")
        .unwrap()
        .id;

    // Same query re-run against the grown log
    let later: Vec<_> = table
        .ledger
        .transactions_for(&table.bob)
        .map(|tx| tx.id)
        .collect();
    assert_eq!(later.len(), 3);
    assert_eq!(&later[..2], &[received, paid]);
    assert_eq!(&later[2..], &earlier[..]);
    assert_eq!(table.ledger.transaction_count(), 4);
    assert_eq!(balance(&table.ledger, &table.bob), dec(1575));
}

#[test]
fn test_bank_never_appears_on_roster() {
    let table = scenario_a();

    assert_eq!(table.ledger.players().len(), 2);
    assert!(table.ledger.player_by_name("bank").is_none());
    assert_eq!(table.ledger.party_name(&Party::Bank), "Bank");
}

#[test]
fn test_custom_starting_balance_and_label() {
    let config = Config::from_toml(
        r#"
        starting_balance = 20000
        bank_label = "Banque"
        default_description = "Paiement"
        "#,
    )
    .unwrap();
    let mut ledger = Ledger::new(config).unwrap();
    let alice = ledger.add_player("Alice").unwrap().id.clone();

    let tx = ledger
        .request_transfer(&alice, &Party::Bank, dec(500), " ")
        .unwrap()
        .clone();

    assert_eq!(tx.description, "Paiement");
    assert_eq!(balance(&ledger, &alice), dec(19_500));
    assert_eq!(ledger.reconstruct_balance(&alice).unwrap(), dec(19_500));
    assert_eq!(
        ledger.receipt(&alice, &tx).to_string(),
        "500 sent to Banque"
    );
}
