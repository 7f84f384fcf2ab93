//! Read-side views over the transaction log
//!
//! Rendering itself belongs to the caller; these types only carry what a
//! history row or a confirmation notice needs: resolved names and which way
//! the money moved relative to a given player.

use crate::types::{Direction, Party, PlayerId, Transaction};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Money flow of a transaction relative to one player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    /// Player paid
    Outgoing,
    /// Player was paid
    Incoming,
    /// Player is not involved
    Neutral,
}

impl Flow {
    /// Classify; the payer side wins when a player paid itself
    pub fn of(transaction: &Transaction, perspective: &PlayerId) -> Self {
        if transaction.from.is_player(perspective) {
            Flow::Outgoing
        } else if transaction.to.is_player(perspective) {
            Flow::Incoming
        } else {
            Flow::Neutral
        }
    }
}

/// One history row
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry<'a> {
    /// Underlying log entry
    pub transaction: &'a Transaction,
    /// Display name of the payer
    pub from_name: &'a str,
    /// Display name of the payee
    pub to_name: &'a str,
    /// Flow relative to the viewing player
    pub flow: Flow,
}

impl<'a> HistoryEntry<'a> {
    /// Build a row seen from `perspective`
    pub fn new(
        transaction: &'a Transaction,
        perspective: &PlayerId,
        from_name: &'a str,
        to_name: &'a str,
    ) -> Self {
        Self {
            transaction,
            from_name,
            to_name,
            flow: Flow::of(transaction, perspective),
        }
    }
}

impl fmt::Display for HistoryEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.flow {
            Flow::Outgoing => '-',
            Flow::Incoming => '+',
            Flow::Neutral => ' ',
        };
        write!(
            f,
            "{} {} {} -> {}  {}  ({}, {})",
            marker,
            self.transaction.id,
            self.from_name,
            self.to_name,
            self.transaction.amount,
            self.transaction.description,
            self.transaction.timestamp.format("%H:%M:%S"),
        )
    }
}

/// Confirmation of an accepted transfer for the acting player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    /// Transferred amount
    pub amount: Decimal,
    /// Direction from the acting player's side
    pub direction: Direction,
    /// Name of the other side
    pub counterparty: String,
}

impl Receipt {
    /// Describe `transaction` from `acting`'s side, resolving names with `name_of`
    pub fn new(
        transaction: &Transaction,
        acting: &PlayerId,
        name_of: impl Fn(&Party) -> String,
    ) -> Self {
        let (direction, other) = if transaction.from.is_player(acting) {
            (Direction::Send, &transaction.to)
        } else {
            (Direction::Receive, &transaction.from)
        };

        Self {
            amount: transaction.amount,
            direction,
            counterparty: name_of(other),
        }
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Send => write!(f, "{} sent to {}", self.amount, self.counterparty),
            Direction::Receive => write!(f, "{} received from {}", self.amount, self.counterparty),
        }
    }
}
