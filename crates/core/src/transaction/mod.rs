//! Money-movement requests and the approval state machine.
//!
//! Every deposit, withdrawal, or investment enters as a `Pending`
//! transaction and is driven by a reviewer (or the account holder, for
//! cancellation) to exactly one terminal state: `Confirmed`, `Rejected`,
//! or `Cancelled`. Ledger mutations happen at the transition points
//! defined in [`service`].

pub mod error;
pub mod service;
pub mod store;
pub mod types;

pub use error::TransactionError;
pub use service::TransactionService;
pub use store::TransactionStore;
pub use types::{SubmitInput, Transaction, TransactionKind, TransactionStatus};
