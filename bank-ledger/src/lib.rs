//! Table Bank Ledger
//!
//! Shared ledger for an in-person board game: a roster of players with cash
//! balances, a bank with unlimited funds, and an append-only log of
//! transfers between them.
//!
//! # Architecture
//!
//! - **Transfer Validator**: pure decision logic, normalizes a signed request
//!   into a canonical `(from, to, amount)` record
//! - **Ledger Store**: owns roster and log, applies accepted transfers
//! - **Single Owner**: the caller holds the `Ledger` by value, every mutation
//!   takes `&mut self`, nothing is global
//!
//! # Invariants
//!
//! - Every logged amount is strictly positive
//! - Both sides of a transaction are the bank or a known player
//! - Player-to-player transfers are zero-sum
//! - Replaying a player's log entries over the starting balance yields the
//!   live balance

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod config;
pub mod error;
pub mod history;
pub mod ledger;
pub mod metrics;
pub mod types;
pub mod validation;

// Re-exports
pub use config::{Config, TransferPolicy};
pub use error::{Error, Result};
pub use history::{Flow, HistoryEntry, Receipt};
pub use ledger::{Ledger, LedgerSnapshot};
pub use types::{Color, Direction, Palette, Party, Player, PlayerId, Transaction, TransactionId};
pub use validation::{CanonicalTransfer, TransferValidator};
