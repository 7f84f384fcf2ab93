//! Ledger store
//!
//! Owns the player roster and the append-only transaction log. Every
//! mutation goes through `&mut self`, so an accepted transfer (log prepend
//! plus one or two balance updates) is never observed half-applied.
//!
//! # Example
//!
//! ```
//! use bank_ledger::{Config, Ledger, Party};
//! use rust_decimal::Decimal;
//!
//! let mut ledger = Ledger::new(Config::default())?;
//! let alice = ledger.add_player("Alice").unwrap().id.clone();
//! let bob = ledger.add_player("Bob").unwrap().id.clone();
//!
//! ledger.request_transfer(&alice, &Party::Player(bob.clone()), Decimal::from(200), "Rent")?;
//!
//! assert_eq!(ledger.player(&alice).unwrap().balance, Decimal::from(1300));
//! assert_eq!(ledger.player(&bob).unwrap().balance, Decimal::from(1700));
//! # Ok::<(), bank_ledger::Error>(())
//! ```

use crate::{
    history::{HistoryEntry, Receipt},
    metrics::Metrics,
    types::{Direction, Party, Player, PlayerId, Transaction, TransactionId},
    validation::{CanonicalTransfer, TransferValidator},
    Config, Error, Result,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Name shown for ids that are neither the bank nor on the roster
pub const UNKNOWN_PARTY_NAME: &str = "Unknown";

/// Roster plus transaction log
#[derive(Debug)]
pub struct Ledger {
    /// Players in join order
    players: Vec<Player>,

    /// Player id -> roster position
    index: HashMap<PlayerId, usize>,

    /// Accepted transfers, newest first
    log: VecDeque<Transaction>,

    /// Next transaction sequence number
    next_seq: u64,

    /// Running sum of player balances
    total_funds: Decimal,

    /// Transfer validator
    validator: TransferValidator,

    /// Metrics
    metrics: Metrics,

    /// Configuration
    config: Config,
}

/// Serializable view of the ledger for rendering or export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Roster in join order
    pub players: Vec<Player>,

    /// Log, newest first
    pub transactions: Vec<Transaction>,

    /// Sum of all player balances
    pub total_player_funds: Decimal,
}

/// Transfer whose new balances are already computed
#[derive(Debug)]
struct StagedTransfer {
    transfer: CanonicalTransfer,
    /// Roster position and new balance, one entry per moved player
    balances: Vec<(usize, Decimal)>,
    total_funds: Decimal,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let metrics = Metrics::new()
            .map_err(|e| Error::Other(format!("Failed to create metrics: {}", e)))?;
        let validator =
            TransferValidator::new(config.policy.clone(), config.default_description.clone());

        tracing::debug!(
            starting_balance = %config.starting_balance,
            verify_counterparty_funds = config.policy.verify_counterparty_funds,
            "Ledger created"
        );

        Ok(Self {
            players: Vec::new(),
            index: HashMap::new(),
            log: VecDeque::new(),
            next_seq: 1,
            total_funds: Decimal::ZERO,
            validator,
            metrics,
            config,
        })
    }

    /// Add a player; blank names (and a player total out of range) are ignored
    pub fn add_player(&mut self, name: &str) -> Option<&Player> {
        match self.try_add_player(name) {
            Ok(player) => Some(player),
            Err(e) => {
                tracing::debug!("Ignoring add_player request: {}", e);
                None
            }
        }
    }

    /// Add a player, reporting blank names as `Error::EmptyName`
    pub fn try_add_player(&mut self, name: &str) -> Result<&Player> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }

        let total_funds = self
            .total_funds
            .checked_add(self.config.starting_balance)
            .ok_or_else(|| {
                Error::Overflow(format!(
                    "total player funds {} plus starting balance {}",
                    self.total_funds, self.config.starting_balance
                ))
            })?;

        let join_order = self.players.len();
        let color = self
            .config
            .palette
            .color_for(join_order)
            .ok_or_else(|| Error::Config("Palette must not be empty".to_string()))?;

        let player = Player {
            id: PlayerId::generate(),
            name: name.to_string(),
            balance: self.config.starting_balance,
            color,
            join_order,
        };

        tracing::info!(
            player = %player.id,
            name = %player.name,
            balance = %player.balance,
            "Player joined"
        );

        self.index.insert(player.id.clone(), join_order);
        self.players.push(player);
        self.total_funds = total_funds;
        self.metrics.record_player_added();

        Ok(&self.players[join_order])
    }

    /// Validate and apply a transfer on behalf of the acting player
    ///
    /// Positive `signed_amount` pays `counterparty`, negative receives from
    /// it. Rejected requests leave the ledger untouched.
    pub fn request_transfer(
        &mut self,
        acting: &PlayerId,
        counterparty: &Party,
        signed_amount: Decimal,
        description: &str,
    ) -> Result<&Transaction> {
        let staged = match self
            .prepare_transfer(acting, counterparty, signed_amount, description)
            .and_then(|transfer| self.stage_transfer(transfer))
        {
            Ok(staged) => staged,
            Err(e) => {
                tracing::warn!(
                    acting = %acting,
                    counterparty = %counterparty,
                    amount = %signed_amount,
                    reason = e.reason(),
                    "Transfer rejected: {}",
                    e
                );
                self.metrics.record_transfer_rejected(e.reason());
                return Err(e);
            }
        };

        Ok(self.commit(staged))
    }

    /// Request a transfer with an unsigned amount and an explicit direction
    pub fn request_directed_transfer(
        &mut self,
        acting: &PlayerId,
        counterparty: &Party,
        direction: Direction,
        amount: Decimal,
        description: &str,
    ) -> Result<&Transaction> {
        self.request_transfer(acting, counterparty, direction.signed(amount), description)
    }

    fn prepare_transfer(
        &self,
        acting: &PlayerId,
        counterparty: &Party,
        signed_amount: Decimal,
        description: &str,
    ) -> Result<CanonicalTransfer> {
        let acting = self
            .player(acting)
            .ok_or_else(|| Error::UnknownPlayer(acting.to_string()))?;

        let transfer = self
            .validator
            .validate(acting, counterparty, signed_amount, description)?;

        self.ensure_known(counterparty)?;

        if let Some(payer) = transfer.from.player_id().and_then(|id| self.player(id)) {
            if payer.id != acting.id {
                self.validator.check_payer_funds(&transfer, payer)?;
            }
        }

        Ok(transfer)
    }

    /// Commit an already validated transfer
    ///
    /// Prepends one transaction to the log, debits `from` and credits `to`
    /// when they are players. The bank is skipped on either side. A transfer
    /// from a player to itself is logged and nets to zero. A balance or the
    /// player total that would leave the `Decimal` range is refused with
    /// `Error::Overflow` and nothing is written.
    pub fn apply_transfer(&mut self, transfer: CanonicalTransfer) -> Result<&Transaction> {
        let staged = self.stage_transfer(transfer)?;
        Ok(self.commit(staged))
    }

    /// Compute every post-transfer value without touching any state
    fn stage_transfer(&self, transfer: CanonicalTransfer) -> Result<StagedTransfer> {
        if transfer.amount <= Decimal::ZERO {
            return Err(Error::InvariantViolation(format!(
                "Transfer amount must be positive, got {}",
                transfer.amount
            )));
        }

        let from_idx = self.position_of(&transfer.from)?;
        let to_idx = self.position_of(&transfer.to)?;
        let amount = transfer.amount;

        let mut balances = Vec::with_capacity(2);
        if from_idx != to_idx {
            if let Some(idx) = from_idx {
                let player = &self.players[idx];
                let balance = player.balance.checked_sub(amount).ok_or_else(|| {
                    Error::Overflow(format!("balance of {} minus {}", player.name, amount))
                })?;
                balances.push((idx, balance));
            }
            if let Some(idx) = to_idx {
                let player = &self.players[idx];
                let balance = player.balance.checked_add(amount).ok_or_else(|| {
                    Error::Overflow(format!("balance of {} plus {}", player.name, amount))
                })?;
                balances.push((idx, balance));
            }
        }

        let total_funds = match (from_idx, to_idx) {
            (Some(_), None) => self.total_funds.checked_sub(amount),
            (None, Some(_)) => self.total_funds.checked_add(amount),
            _ => Some(self.total_funds),
        }
        .ok_or_else(|| {
            Error::Overflow(format!(
                "total player funds {} moved by {}",
                self.total_funds, amount
            ))
        })?;

        Ok(StagedTransfer {
            transfer,
            balances,
            total_funds,
        })
    }

    /// Write a staged transfer; infallible once staging succeeded
    fn commit(&mut self, staged: StagedTransfer) -> &Transaction {
        let StagedTransfer {
            transfer,
            balances,
            total_funds,
        } = staged;

        let transaction = Transaction {
            id: TransactionId::new(self.next_seq),
            from: transfer.from,
            to: transfer.to,
            amount: transfer.amount,
            description: transfer.description,
            timestamp: Utc::now(),
        };
        self.next_seq += 1;

        for (idx, balance) in balances {
            self.players[idx].balance = balance;
        }
        self.total_funds = total_funds;

        tracing::info!(
            tx = %transaction.id,
            from = %transaction.from,
            to = %transaction.to,
            amount = %transaction.amount,
            "Transfer applied"
        );
        self.metrics.record_transfer_accepted(transaction.amount);
        self.log.push_front(transaction);

        &self.log[0]
    }
    /// Roster in join order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Look up a player
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.index.get(id).map(|&idx| &self.players[idx])
    }

    /// Look up a player by name, ignoring case and surrounding whitespace
    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        let name = name.trim();
        self.players
            .iter()
            .find(|player| player.name.eq_ignore_ascii_case(name))
    }

    /// Number of players
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Full log, newest first
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> + Clone + '_ {
        self.log.iter()
    }

    /// Number of logged transactions
    pub fn transaction_count(&self) -> usize {
        self.log.len()
    }

    /// Log entries where the player is payer or payee, newest first
    ///
    /// The iterator is lazy and `Clone`, so it can be restarted at will.
    pub fn transactions_for<'a>(
        &'a self,
        id: &'a PlayerId,
    ) -> impl Iterator<Item = &'a Transaction> + Clone + 'a {
        self.log.iter().filter(move |tx| tx.involves(id))
    }

    /// History rows for a player, newest first
    pub fn history_for<'a>(
        &'a self,
        id: &'a PlayerId,
    ) -> impl Iterator<Item = HistoryEntry<'a>> + 'a {
        self.transactions_for(id).map(move |tx| {
            HistoryEntry::new(tx, id, self.party_name(&tx.from), self.party_name(&tx.to))
        })
    }

    /// Summary of a transaction from the acting player's point of view
    pub fn receipt(&self, acting: &PlayerId, transaction: &Transaction) -> Receipt {
        Receipt::new(transaction, acting, |party| self.party_name(party).to_string())
    }

    /// Display name of a party
    pub fn party_name(&self, party: &Party) -> &str {
        match party {
            Party::Bank => &self.config.bank_label,
            Party::Player(id) => self
                .player(id)
                .map(|player| player.name.as_str())
                .unwrap_or(UNKNOWN_PARTY_NAME),
        }
    }

    /// Sum of all player balances, maintained on every accepted change
    pub fn total_player_funds(&self) -> Decimal {
        self.total_funds
    }

    /// Starting balance plus every logged delta for the player, oldest first
    pub fn reconstruct_balance(&self, id: &PlayerId) -> Result<Decimal> {
        if !self.index.contains_key(id) {
            return Err(Error::UnknownPlayer(id.to_string()));
        }

        self.log
            .iter()
            .rev()
            .filter(|tx| tx.involves(id))
            .try_fold(self.config.starting_balance, |balance, tx| {
                balance.checked_add(tx.delta_for(id)).ok_or_else(|| {
                    Error::Overflow(format!("replaying {}", tx.id))
                })
            })
    }

    /// Check that the log and live balances agree
    pub fn verify_consistency(&self) -> Result<()> {
        let mut previous: Option<TransactionId> = None;

        for tx in &self.log {
            if tx.amount <= Decimal::ZERO {
                return Err(Error::InvariantViolation(format!(
                    "Transaction {} has non-positive amount {}",
                    tx.id, tx.amount
                )));
            }

            for party in [&tx.from, &tx.to] {
                if self.ensure_known(party).is_err() {
                    return Err(Error::InvariantViolation(format!(
                        "Transaction {} references unknown party {}",
                        tx.id, party
                    )));
                }
            }

            if let Some(newer) = previous {
                if tx.id >= newer {
                    return Err(Error::InvariantViolation(format!(
                        "Log out of order: {} listed after {}",
                        tx.id, newer
                    )));
                }
            }
            previous = Some(tx.id);
        }

        for player in &self.players {
            let expected = self.reconstruct_balance(&player.id)?;
            if expected != player.balance {
                return Err(Error::InvariantViolation(format!(
                    "Balance of {} is {}, log says {}",
                    player.name, player.balance, expected
                )));
            }
        }

        let summed = self
            .players
            .iter()
            .try_fold(Decimal::ZERO, |total, player| total.checked_add(player.balance));
        if summed != Some(self.total_funds) {
            return Err(Error::InvariantViolation(format!(
                "Player total is {}, balances sum to {:?}",
                self.total_funds, summed
            )));
        }

        Ok(())
    }

    /// Serializable copy of roster and log
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            players: self.players.clone(),
            transactions: self.log.iter().cloned().collect(),
            total_player_funds: self.total_player_funds(),
        }
    }

    /// Configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Metrics
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn ensure_known(&self, party: &Party) -> Result<()> {
        self.position_of(party).map(|_| ())
    }

    /// Roster position of a party; `None` for the bank
    fn position_of(&self, party: &Party) -> Result<Option<usize>> {
        match party {
            Party::Bank => Ok(None),
            Party::Player(id) => self
                .index
                .get(id)
                .copied()
                .map(Some)
                .ok_or_else(|| Error::UnknownPlayer(id.to_string())),
        }
    }
}
