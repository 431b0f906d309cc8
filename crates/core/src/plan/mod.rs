//! Investment plan configuration.
//!
//! Plans are administered outside this engine; the registry is read-only
//! from the transaction and accrual paths.

pub mod registry;
pub mod types;

pub use registry::{InMemoryPlanRegistry, PlanRegistry};
pub use types::Plan;
