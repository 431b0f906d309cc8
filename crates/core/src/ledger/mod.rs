//! Authoritative per-account balances.
//!
//! This module implements the core ledger functionality:
//! - Account records and balance snapshots
//! - Atomic credit/debit with the non-negative balance invariant
//! - Compare-and-adjust used by reconciliation
//! - Error types for ledger operations

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::LedgerError;
pub use service::Ledger;
pub use types::{Account, Adjustment, AdjustmentDirection};
