//! Core business logic for Custodia.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, invariants, and background-tick engines live here.
//!
//! # Modules
//!
//! - `ledger` - Authoritative per-account balances with atomic credit/debit
//! - `transaction` - Money-movement requests and the approval state machine
//! - `plan` - Investment plan configuration and registry
//! - `accrual` - Investment contracts and the profit accrual engine
//! - `reconcile` - External balance reconciliation
//! - `notify` - Notification sink interface
//! - `clock` - Injectable time source

pub mod accrual;
pub mod clock;
pub mod ledger;
pub mod notify;
pub mod plan;
pub mod reconcile;
pub mod transaction;
