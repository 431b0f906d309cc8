//! Investment contracts and the profit accrual engine.
//!
//! A contract places a fixed principal under a plan's terms. The accrual
//! engine runs on a recurring tick, credits pro-rata profit to the ledger,
//! and retires contracts that have passed their end timestamp.

pub mod book;
pub mod engine;
pub mod types;

#[cfg(test)]
mod engine_props;

pub use book::ContractBook;
pub use engine::{AccrualEngine, TickSummary};
pub use types::InvestmentContract;
