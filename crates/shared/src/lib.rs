//! Shared types, errors, and configuration for Custodia.
//!
//! This crate provides common types used across all other crates:
//! - Amount and asset types with decimal precision
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, PlanSeed};
pub use error::{AppError, AppResult};
