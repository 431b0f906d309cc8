//! Common types used across the application.

pub mod amount;
pub mod id;
pub mod pagination;

pub use amount::{Asset, round8, AMOUNT_SCALE};
pub use id::*;
pub use pagination::{PageRequest, PageResponse};
