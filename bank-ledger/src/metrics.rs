//! Metrics collection for observability
//!
//! Prometheus metrics on a registry owned by the ledger, so several ledgers
//! (one per test, one per session) never clash on the global registry.
//!
//! # Metrics
//!
//! - `bank_players_total` - Players added
//! - `bank_transfers_accepted_total` - Transfers committed to the log
//! - `bank_transfers_rejected_total{reason}` - Rejected requests by reason code
//! - `bank_transfer_amount` - Histogram of accepted amounts

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Players added
    pub players_total: IntCounter,

    /// Accepted transfers
    pub transfers_accepted: IntCounter,

    /// Rejected transfers, labelled by reason
    pub transfers_rejected: IntCounterVec,

    /// Accepted amount histogram
    pub transfer_amount: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let players_total = IntCounter::new("bank_players_total", "Players added")?;
        registry.register(Box::new(players_total.clone()))?;

        let transfers_accepted = IntCounter::new(
            "bank_transfers_accepted_total",
            "Transfers committed to the log",
        )?;
        registry.register(Box::new(transfers_accepted.clone()))?;

        let transfers_rejected = IntCounterVec::new(
            Opts::new(
                "bank_transfers_rejected_total",
                "Rejected transfer requests by reason",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(transfers_rejected.clone()))?;

        let transfer_amount = Histogram::with_opts(
            HistogramOpts::new("bank_transfer_amount", "Histogram of accepted amounts").buckets(
                vec![10.0, 50.0, 100.0, 200.0, 500.0, 1000.0, 2000.0, 5000.0],
            ),
        )?;
        registry.register(Box::new(transfer_amount.clone()))?;

        Ok(Self {
            players_total,
            transfers_accepted,
            transfers_rejected,
            transfer_amount,
            registry,
        })
    }

    /// Record a new player
    pub fn record_player_added(&self) {
        self.players_total.inc();
    }

    /// Record an accepted transfer
    pub fn record_transfer_accepted(&self, amount: Decimal) {
        self.transfers_accepted.inc();
        self.transfer_amount.observe(amount.to_f64().unwrap_or(0.0));
    }

    /// Record a rejected transfer
    pub fn record_transfer_rejected(&self, reason: &str) {
        self.transfers_rejected.with_label_values(&[reason]).inc();
    }

    /// Rejections recorded for a reason code
    pub fn rejected_count(&self, reason: &str) -> u64 {
        self.transfers_rejected.with_label_values(&[reason]).get()
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics")
            .field("players_total", &self.players_total.get())
            .field("transfers_accepted", &self.transfers_accepted.get())
            .finish_non_exhaustive()
    }
}
