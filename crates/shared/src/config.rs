//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Investment accrual configuration.
    #[serde(default)]
    pub accrual: AccrualConfig,
    /// Reconciliation configuration.
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
    /// Investment plans seeded at startup.
    #[serde(default)]
    pub plans: Vec<PlanSeed>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Investment accrual configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AccrualConfig {
    /// Seconds between accrual ticks.
    #[serde(default = "default_accrual_interval")]
    pub interval_secs: u64,
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_accrual_interval(),
        }
    }
}

fn default_accrual_interval() -> u64 {
    600 // 10 minutes
}

/// Reconciliation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconciliationConfig {
    /// Seconds between reconciliation ticks.
    #[serde(default = "default_reconcile_interval")]
    pub interval_secs: u64,
    /// Timeout for a single external balance fetch, in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Base URL of the external balance source. Reconciliation is
    /// disabled when absent.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_reconcile_interval(),
            fetch_timeout_secs: default_fetch_timeout(),
            endpoint: None,
        }
    }
}

fn default_reconcile_interval() -> u64 {
    900 // 15 minutes
}

fn default_fetch_timeout() -> u64 {
    10
}

/// An investment plan definition loaded from configuration.
///
/// Plans are administered outside this service; the engine treats the
/// registry as read-only.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanSeed {
    /// Human-readable plan name.
    pub name: String,
    /// Minimum principal accepted by the plan.
    pub min_amount: Decimal,
    /// Daily return rate as a fraction of principal (e.g. 0.0075).
    pub daily_rate: Decimal,
    /// Contract duration in days.
    pub duration_days: u32,
    /// Whether the plan accepts new contracts.
    #[serde(default = "default_plan_active")]
    pub active: bool,
}

fn default_plan_active() -> bool {
    true
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CUSTODIA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
