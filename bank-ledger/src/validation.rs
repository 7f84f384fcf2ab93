//! Transfer validation
//!
//! Pure decision logic: given the acting player, a counterparty and a signed
//! amount, decide whether the transfer is legal and normalize it into a
//! canonical `(from, to, amount)` record. Nothing here touches the ledger.
//!
//! Sign convention, from the acting player's point of view:
//! - positive: the acting player pays the counterparty
//! - negative: the acting player receives from the counterparty

use crate::{
    config::TransferPolicy,
    types::{Party, Player},
    Error, Result,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Validated, direction-normalized transfer ready for `Ledger::apply_transfer`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalTransfer {
    /// Payer
    pub from: Party,
    /// Payee
    pub to: Party,
    /// Strictly positive amount
    pub amount: Decimal,
    /// Trimmed description, never blank
    pub description: String,
}

/// Transfer validator
#[derive(Debug, Clone)]
pub struct TransferValidator {
    policy: TransferPolicy,
    default_description: String,
}

impl TransferValidator {
    /// Create new validator
    pub fn new(policy: TransferPolicy, default_description: impl Into<String>) -> Self {
        Self {
            policy,
            default_description: default_description.into(),
        }
    }

    /// Active policy
    pub fn policy(&self) -> &TransferPolicy {
        &self.policy
    }

    /// Validate a transfer requested on behalf of `acting`
    pub fn validate(
        &self,
        acting: &Player,
        counterparty: &Party,
        signed_amount: Decimal,
        description: &str,
    ) -> Result<CanonicalTransfer> {
        if signed_amount.is_zero() {
            return Err(Error::ZeroAmount);
        }

        let outgoing = signed_amount > Decimal::ZERO;

        // Only the paying direction is balance-constrained
        if outgoing && signed_amount > acting.balance {
            return Err(Error::InsufficientFunds {
                party: acting.party(),
                requested: signed_amount,
                available: acting.balance,
            });
        }

        let (from, to) = if outgoing {
            (acting.party(), counterparty.clone())
        } else {
            (counterparty.clone(), acting.party())
        };

        Ok(CanonicalTransfer {
            from,
            to,
            amount: signed_amount.abs(),
            description: self.describe(description),
        })
    }

    /// Re-check the paying player when the acting player is the payee
    ///
    /// Only runs under `verify_counterparty_funds`; `payer` must be the
    /// player behind `transfer.from`.
    pub fn check_payer_funds(&self, transfer: &CanonicalTransfer, payer: &Player) -> Result<()> {
        if !self.policy.verify_counterparty_funds || !transfer.from.is_player(&payer.id) {
            return Ok(());
        }

        if transfer.amount > payer.balance {
            return Err(Error::InsufficientFunds {
                party: payer.party(),
                requested: transfer.amount,
                available: payer.balance,
            });
        }

        Ok(())
    }

    fn describe(&self, description: &str) -> String {
        let trimmed = description.trim();
        if trimmed.is_empty() {
            self.default_description.clone()
        } else {
            trimmed.to_string()
        }
    }
}

impl Default for TransferValidator {
    fn default() -> Self {
        Self::new(TransferPolicy::default(), "Transaction")
    }
}
