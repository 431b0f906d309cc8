//! Reconciliation service and external balance source interface.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{info, warn};

use custodia_shared::types::AccountId;

use crate::ledger::{AdjustmentDirection, Ledger};
use crate::notify::{Notification, NotificationSink, Severity};

use super::error::SourceError;

/// Degraded after this many consecutive ticks with at least one failure.
const DEGRADED_AFTER: u32 = 3;

/// Provides externally observed balances, keyed by watch address.
pub trait BalanceSource: Send + Sync {
    /// Fetches the current external balance for one address.
    fn fetch(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Decimal, SourceError>> + Send;
}

/// Shared health indicator for the reconciliation loop.
///
/// The API health endpoint reads this without holding a reference to the
/// generic service, so it lives in its own handle.
#[derive(Debug, Default)]
pub struct ReconcileHealth {
    consecutive_failures: AtomicU32,
}

impl ReconcileHealth {
    /// Creates a healthy indicator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of consecutive ticks that saw at least one fetch failure.
    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }

    /// Returns true once failures have persisted long enough that the
    /// ledger should be treated as potentially stale.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.consecutive_failures() >= DEGRADED_AFTER
    }

    fn record_tick(&self, failed: bool) {
        if failed {
            self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
        } else {
            self.consecutive_failures.store(0, Ordering::Relaxed);
        }
    }
}

/// What one reconciliation tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Watched accounts whose external balance was fetched successfully.
    pub checked: usize,
    /// Accounts whose ledger balance was adjusted.
    pub adjusted: usize,
    /// Fetch failures. Affected accounts are retried next tick.
    pub failures: usize,
}

/// Walks every watched account each tick and folds externally observed
/// balances into the ledger.
pub struct ReconciliationService<S> {
    ledger: Arc<Ledger>,
    source: S,
    sink: Arc<dyn NotificationSink>,
    health: Arc<ReconcileHealth>,
    fetch_timeout: Duration,
}

impl<S: BalanceSource> ReconciliationService<S> {
    /// Creates a service over the given collaborators.
    #[must_use]
    pub fn new(
        ledger: Arc<Ledger>,
        source: S,
        sink: Arc<dyn NotificationSink>,
        health: Arc<ReconcileHealth>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            source,
            sink,
            health,
            fetch_timeout,
        }
    }

    /// Runs one reconciliation pass over every watched account.
    ///
    /// A fetch failure skips that account and moves on; the account is
    /// simply retried on the next tick. Adjustments notify the account
    /// holder with the direction and magnitude of the change.
    pub async fn run_tick(&self) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();

        for (account_id, address) in self.ledger.watched_accounts() {
            let external = match self.fetch_with_deadline(&address).await {
                Ok(external) => external,
                Err(err) => {
                    warn!(
                        account_id = %account_id,
                        address = %address,
                        error = %err,
                        "external balance fetch failed"
                    );
                    summary.failures += 1;
                    continue;
                }
            };
            summary.checked += 1;

            match self.ledger.reconcile_to(account_id, external) {
                Ok(Some(adjustment)) => {
                    summary.adjusted += 1;
                    info!(
                        account_id = %account_id,
                        direction = adjustment.direction.as_str(),
                        amount = %adjustment.amount,
                        new_balance = %adjustment.new_balance,
                        "balance reconciled"
                    );
                    self.notify(account_id, &adjustment.direction, adjustment.amount);
                }
                Ok(None) => {}
                Err(err) => {
                    // Account disappeared between listing and adjustment
                    // or the source returned a negative reading.
                    warn!(account_id = %account_id, error = %err, "reconcile failed");
                    summary.failures += 1;
                }
            }
        }

        self.health.record_tick(summary.failures > 0);
        summary
    }

    async fn fetch_with_deadline(&self, address: &str) -> Result<Decimal, SourceError> {
        tokio::time::timeout(self.fetch_timeout, self.source.fetch(address))
            .await
            .map_err(|_| SourceError::Timeout)?
    }

    fn notify(&self, account_id: AccountId, direction: &AdjustmentDirection, amount: Decimal) {
        let title = match direction {
            AdjustmentDirection::Received => "Funds received",
            AdjustmentDirection::Sent => "Funds sent",
        };
        self.sink.emit(Notification {
            account_id,
            title: title.to_owned(),
            message: format!("{amount} {}", direction.as_str()),
            severity: Severity::Info,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::Utc;
    use custodia_shared::types::Asset;
    use rust_decimal_macros::dec;

    use crate::notify::MemorySink;

    /// Source backed by a mutable map of address readings.
    #[derive(Default)]
    struct MapSource {
        readings: Mutex<HashMap<String, Decimal>>,
    }

    impl MapSource {
        fn set(&self, address: &str, balance: Decimal) {
            self.readings
                .lock()
                .unwrap()
                .insert(address.to_owned(), balance);
        }
    }

    impl BalanceSource for Arc<MapSource> {
        async fn fetch(&self, address: &str) -> Result<Decimal, SourceError> {
            self.readings
                .lock()
                .unwrap()
                .get(address)
                .copied()
                .ok_or_else(|| SourceError::Unavailable(format!("unknown address {address}")))
        }
    }

    /// Source that never answers. Paired with a paused runtime clock to
    /// exercise the deadline.
    struct StalledSource;

    impl BalanceSource for StalledSource {
        async fn fetch(&self, _address: &str) -> Result<Decimal, SourceError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Decimal::ZERO)
        }
    }

    struct Fixture {
        ledger: Arc<Ledger>,
        source: Arc<MapSource>,
        sink: Arc<MemorySink>,
        health: Arc<ReconcileHealth>,
        service: ReconciliationService<Arc<MapSource>>,
    }

    fn fixture() -> Fixture {
        let ledger = Arc::new(Ledger::new());
        let source = Arc::new(MapSource::default());
        let sink = Arc::new(MemorySink::new());
        let health = Arc::new(ReconcileHealth::new());
        let service = ReconciliationService::new(
            Arc::clone(&ledger),
            Arc::clone(&source),
            Arc::clone(&sink) as Arc<dyn NotificationSink>,
            Arc::clone(&health),
            Duration::from_secs(5),
        );
        Fixture {
            ledger,
            source,
            sink,
            health,
            service,
        }
    }

    #[tokio::test]
    async fn test_tick_adjusts_drifted_balance_and_notifies() {
        let f = fixture();
        let account = f.ledger.open_account(Asset::Btc, Some("addr1".into()), Utc::now());
        f.ledger.credit(account.id, dec!(0.005)).unwrap();
        f.source.set("addr1", dec!(0.008));

        let summary = f.service.run_tick().await;
        assert_eq!(summary.checked, 1);
        assert_eq!(summary.adjusted, 1);
        assert_eq!(summary.failures, 0);
        assert_eq!(f.ledger.balance(account.id).unwrap(), dec!(0.008));

        let events = f.sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].account_id, account.id);
        assert_eq!(events[0].title, "Funds received");
        assert!(events[0].message.contains("0.003"));
    }

    #[tokio::test]
    async fn test_tick_notifies_outbound_movement() {
        let f = fixture();
        let account = f.ledger.open_account(Asset::Btc, Some("addr1".into()), Utc::now());
        f.ledger.credit(account.id, dec!(0.01)).unwrap();
        f.source.set("addr1", dec!(0.004));

        f.service.run_tick().await;
        assert_eq!(f.ledger.balance(account.id).unwrap(), dec!(0.004));
        assert_eq!(f.sink.events()[0].title, "Funds sent");
    }

    #[tokio::test]
    async fn test_matching_balance_is_a_noop() {
        let f = fixture();
        let account = f.ledger.open_account(Asset::Btc, Some("addr1".into()), Utc::now());
        f.ledger.credit(account.id, dec!(0.01)).unwrap();
        f.source.set("addr1", dec!(0.01));

        let summary = f.service.run_tick().await;
        assert_eq!(summary.checked, 1);
        assert_eq!(summary.adjusted, 0);
        assert!(f.sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_tick_with_same_reading_adjusts_once() {
        let f = fixture();
        let account = f.ledger.open_account(Asset::Btc, Some("addr1".into()), Utc::now());
        f.source.set("addr1", dec!(0.002));

        let first = f.service.run_tick().await;
        let second = f.service.run_tick().await;
        assert_eq!(first.adjusted, 1);
        assert_eq!(second.adjusted, 0);
        assert_eq!(f.ledger.balance(account.id).unwrap(), dec!(0.002));
        assert_eq!(f.sink.events().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_skips_account_and_continues() {
        let f = fixture();
        let broken = f.ledger.open_account(Asset::Btc, Some("missing".into()), Utc::now());
        let healthy = f.ledger.open_account(Asset::Btc, Some("addr1".into()), Utc::now());
        f.source.set("addr1", dec!(0.5));

        let summary = f.service.run_tick().await;
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.adjusted, 1);
        // The failed account's balance is untouched
        assert_eq!(f.ledger.balance(broken.id).unwrap(), Decimal::ZERO);
        assert_eq!(f.ledger.balance(healthy.id).unwrap(), dec!(0.5));
    }

    #[tokio::test]
    async fn test_unwatched_accounts_are_skipped() {
        let f = fixture();
        let account = f.ledger.open_account(Asset::Btc, None, Utc::now());

        let summary = f.service.run_tick().await;
        assert_eq!(summary, ReconcileSummary::default());
        assert_eq!(f.ledger.balance(account.id).unwrap(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_health_degrades_after_consecutive_failed_ticks() {
        let f = fixture();
        f.ledger.open_account(Asset::Btc, Some("missing".into()), Utc::now());

        for _ in 0..2 {
            f.service.run_tick().await;
        }
        assert!(!f.health.is_degraded());

        f.service.run_tick().await;
        assert!(f.health.is_degraded());
        assert_eq!(f.health.consecutive_failures(), 3);

        // One clean tick restores health
        f.source.set("missing", dec!(0.1));
        f.service.run_tick().await;
        assert!(!f.health.is_degraded());
        assert_eq!(f.health.consecutive_failures(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_source_hits_the_deadline() {
        let ledger = Arc::new(Ledger::new());
        ledger.open_account(Asset::Btc, Some("addr1".into()), Utc::now());
        let health = Arc::new(ReconcileHealth::new());
        let service = ReconciliationService::new(
            Arc::clone(&ledger),
            StalledSource,
            Arc::new(MemorySink::new()) as Arc<dyn NotificationSink>,
            Arc::clone(&health),
            Duration::from_secs(10),
        );

        let summary = service.run_tick().await;
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.checked, 0);
        assert_eq!(health.consecutive_failures(), 1);
    }
}
