//! Core types for the ledger
//!
//! All types are designed for:
//! - Exact arithmetic (Decimal for money)
//! - Identifiers that cannot be confused with the bank
//! - Cheap serialization for the presentation layer (serde)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Textual token of the bank counterparty
pub const BANK_TOKEN: &str = "bank";

/// Opaque player identifier, unique per process run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier (UUIDv7, collision resistant)
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One side of a transfer: the bank sentinel or a player
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Party {
    /// Unlimited funding source and sink, never has a balance
    Bank,
    /// A player on the roster
    Player(PlayerId),
}

impl Party {
    /// Player id, if this party is a player
    pub fn player_id(&self) -> Option<&PlayerId> {
        match self {
            Party::Bank => None,
            Party::Player(id) => Some(id),
        }
    }

    /// Whether this is the bank sentinel
    pub fn is_bank(&self) -> bool {
        matches!(self, Party::Bank)
    }

    /// Whether this party is the given player
    pub fn is_player(&self, id: &PlayerId) -> bool {
        self.player_id() == Some(id)
    }
}

impl From<PlayerId> for Party {
    fn from(id: PlayerId) -> Self {
        Party::Player(id)
    }
}

impl From<String> for Party {
    fn from(raw: String) -> Self {
        if raw == BANK_TOKEN {
            Party::Bank
        } else {
            Party::Player(PlayerId(raw))
        }
    }
}

impl From<Party> for String {
    fn from(party: Party) -> Self {
        match party {
            Party::Bank => BANK_TOKEN.to_string(),
            Party::Player(id) => id.0,
        }
    }
}

impl FromStr for Party {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Party::from(s.to_string()))
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Bank => write!(f, "{}", BANK_TOKEN),
            Party::Player(id) => write!(f, "{}", id),
        }
    }
}

/// Cosmetic player tag (CSS-style hex color)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    /// Create new color tag
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cyclic color palette indexed by join order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(Vec<Color>);

impl Palette {
    /// Create palette from colors
    pub fn new(colors: Vec<Color>) -> Self {
        Self(colors)
    }

    /// Color for the player that joined at `join_order`
    ///
    /// Returns `None` only for an empty palette, which `Config::validate` rejects.
    pub fn color_for(&self, join_order: usize) -> Option<Color> {
        if self.0.is_empty() {
            return None;
        }
        Some(self.0[join_order % self.0.len()].clone())
    }

    /// Number of colors
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the palette has no colors
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self(
            [
                "#FF5733", "#33FF57", "#3357FF", "#FF33F5", "#33FFF5", "#F5FF33", "#FF3333",
                "#33FF33",
            ]
            .into_iter()
            .map(Color::new)
            .collect(),
        )
    }
}

/// Player on the roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Unique player ID
    pub id: PlayerId,

    /// Display name (trimmed, non-empty)
    pub name: String,

    /// Current balance; only `Ledger::apply_transfer` changes it
    pub balance: Decimal,

    /// Palette color derived from join order
    pub color: Color,

    /// Zero-based position on the roster
    pub join_order: usize,
}

impl Player {
    /// Party handle for this player
    pub fn party(&self) -> Party {
        Party::Player(self.id.clone())
    }
}

/// Transaction identifier (store-assigned sequence number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(u64);

impl TransactionId {
    /// Create from sequence number
    pub fn new(seq: u64) -> Self {
        Self(seq)
    }

    /// Sequence number
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Canonical record of an accepted transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique, increasing transaction ID
    pub id: TransactionId,

    /// Payer
    pub from: Party,

    /// Payee
    pub to: Party,

    /// Strictly positive magnitude
    pub amount: Decimal,

    /// Free-text annotation
    pub description: String,

    /// Creation time
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Whether the player appears as payer or payee
    pub fn involves(&self, id: &PlayerId) -> bool {
        self.from.is_player(id) || self.to.is_player(id)
    }

    /// Net effect of this transaction on the player's balance
    pub fn delta_for(&self, id: &PlayerId) -> Decimal {
        let mut delta = Decimal::ZERO;
        if self.from.is_player(id) {
            delta -= self.amount;
        }
        if self.to.is_player(id) {
            delta += self.amount;
        }
        delta
    }
}

/// Direction of a transfer from the acting player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Acting player pays the counterparty
    Send,
    /// Acting player receives from the counterparty
    Receive,
}

impl Direction {
    /// Signed amount as expected by the validator
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Direction::Send => amount,
            Direction::Receive => -amount,
        }
    }

    /// Direction encoded by a signed amount (`None` for zero)
    pub fn of(signed_amount: Decimal) -> Option<Self> {
        if signed_amount > Decimal::ZERO {
            Some(Direction::Send)
        } else if signed_amount < Decimal::ZERO {
            Some(Direction::Receive)
        } else {
            None
        }
    }
}
