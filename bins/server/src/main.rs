//! Custodia API Server
//!
//! Main entry point for the Custodia backend service.

mod source;

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use custodia_api::{AppState, create_router};
use custodia_core::accrual::{AccrualEngine, ContractBook};
use custodia_core::clock::{Clock, SystemClock};
use custodia_core::ledger::Ledger;
use custodia_core::notify::{NotificationSink, TracingSink};
use custodia_core::plan::{InMemoryPlanRegistry, Plan, PlanRegistry};
use custodia_core::reconcile::{ReconcileHealth, ReconciliationService};
use custodia_core::transaction::{TransactionService, TransactionStore};
use custodia_shared::types::PlanId;
use custodia_shared::{AppConfig, PlanSeed};

use source::HttpBalanceSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "custodia=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Build the engine
    let ledger = Arc::new(Ledger::new());
    let plans = seed_plans(&config.plans);
    let contracts = Arc::new(ContractBook::new());
    let store = Arc::new(TransactionStore::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let transactions = Arc::new(TransactionService::new(
        Arc::clone(&ledger),
        Arc::clone(&plans),
        Arc::clone(&contracts),
        store,
        Arc::clone(&clock),
    ));
    let reconcile_health = Arc::new(ReconcileHealth::new());

    // Background profit accrual
    let engine = AccrualEngine::new(
        Arc::clone(&ledger),
        Arc::clone(&plans),
        Arc::clone(&contracts),
        Arc::clone(&clock),
    );
    spawn_accrual(engine, config.accrual.interval_secs);

    // Background reconciliation, when a balance source is configured
    if let Some(endpoint) = config.reconciliation.endpoint.clone() {
        let service = ReconciliationService::new(
            Arc::clone(&ledger),
            HttpBalanceSource::new(reqwest::Client::new(), endpoint),
            Arc::new(TracingSink) as Arc<dyn NotificationSink>,
            Arc::clone(&reconcile_health),
            Duration::from_secs(config.reconciliation.fetch_timeout_secs),
        );
        spawn_reconciliation(service, config.reconciliation.interval_secs);
    } else {
        info!("No balance source configured; reconciliation disabled");
    }

    // Create application state
    let state = AppState {
        ledger,
        transactions,
        contracts,
        plans,
        clock,
        reconcile_health,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the plan registry from configured plan definitions.
fn seed_plans(seeds: &[PlanSeed]) -> Arc<dyn PlanRegistry> {
    let registry = InMemoryPlanRegistry::new();
    for seed in seeds {
        let plan = Plan {
            id: PlanId::new(),
            name: seed.name.clone(),
            min_amount: seed.min_amount,
            daily_rate: seed.daily_rate,
            duration_days: seed.duration_days,
            active: seed.active,
        };
        info!(
            plan_id = %plan.id,
            name = %plan.name,
            daily_rate = %plan.daily_rate,
            "plan registered"
        );
        registry.insert(plan);
    }
    Arc::new(registry)
}

/// Runs the accrual engine on a fixed interval.
fn spawn_accrual(engine: AccrualEngine, interval_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let summary = engine.run_tick();
            debug!(
                processed = summary.processed,
                credited = %summary.credited,
                retired = summary.retired,
                failures = summary.failures,
                "accrual tick"
            );
        }
    });
}

/// Runs the reconciliation service on a fixed interval.
fn spawn_reconciliation(service: ReconciliationService<HttpBalanceSource>, interval_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let summary = service.run_tick().await;
            debug!(
                checked = summary.checked,
                adjusted = summary.adjusted,
                failures = summary.failures,
                "reconciliation tick"
            );
        }
    });
}
