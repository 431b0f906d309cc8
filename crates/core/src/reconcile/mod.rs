//! Periodic reconciliation against an external balance source.
//!
//! The engine's balances can drift from on-chain reality when funds move
//! outside this service. Each tick fetches the external balance for every
//! watched account and folds the difference into the ledger, notifying
//! the account holder of any adjustment.

pub mod error;
pub mod service;

pub use error::SourceError;
pub use service::{BalanceSource, ReconcileHealth, ReconcileSummary, ReconciliationService};
