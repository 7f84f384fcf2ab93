//! Error types for the ledger

use crate::types::Party;
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
///
/// Every variant is recoverable: a rejected request leaves the roster and the
/// log untouched and the caller may simply resubmit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Requested transfer amount is zero
    #[error("Amount must be non-zero")]
    ZeroAmount,

    /// Payer balance is below the requested outgoing amount
    #[error("Insufficient funds: balance is {available}, {requested} requested")]
    InsufficientFunds {
        /// Party whose balance was checked
        party: Party,
        /// Amount requested
        requested: Decimal,
        /// Balance at the time of the request
        available: Decimal,
    },

    /// Blank or whitespace-only player name
    #[error("Player name must not be empty")]
    EmptyName,

    /// Identifier is neither the bank nor a known player
    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    /// Balance or total would leave the representable range
    #[error("Amount out of range: {0}")]
    Overflow(String),

    /// Live balances disagree with the transaction log
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Stable rejection code handed to the presentation layer
    pub fn reason(&self) -> &'static str {
        match self {
            Error::ZeroAmount => "zero-amount",
            Error::InsufficientFunds { .. } => "insufficient-funds",
            Error::EmptyName => "empty-name",
            Error::UnknownPlayer(_) => "unknown-player",
            Error::Overflow(_) => "overflow",
            Error::InvariantViolation(_) => "invariant-violation",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Other(_) => "other",
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
