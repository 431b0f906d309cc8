//! Profit accrual engine.
//!
//! Runs on a recurring tick. For every active contract it computes the
//! pro-rata profit earned since the contract's watermark, credits the
//! ledger, and advances the watermark. The two updates happen together
//! under the contract lock: a delayed or repeated tick re-reads the
//! watermark and cannot double-credit.
//!
//! Rate law: profit is linear in elapsed time,
//! `increment = principal * daily_rate * elapsed / 1 day`, with the
//! elapsed window clamped at the contract's end timestamp. A contract
//! therefore earns exactly `principal * daily_rate * duration_days`
//! over its life regardless of tick cadence.

use std::sync::{Arc, PoisonError};

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use custodia_shared::types::round8;

use crate::clock::Clock;
use crate::ledger::Ledger;
use crate::plan::PlanRegistry;

use super::book::ContractBook;

/// Milliseconds in one day, as an exact decimal.
const MS_PER_DAY: Decimal = Decimal::from_parts(86_400_000, 0, 0, false, 0);

/// Outcome of one accrual tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Active contracts examined.
    pub processed: usize,
    /// Total profit credited across all contracts.
    pub credited: Decimal,
    /// Contracts retired at maturity this tick.
    pub retired: usize,
    /// Contracts skipped because of a credit or plan lookup failure.
    pub failures: usize,
}

/// Periodic profit accrual over active investment contracts.
pub struct AccrualEngine {
    ledger: Arc<Ledger>,
    plans: Arc<dyn PlanRegistry>,
    book: Arc<ContractBook>,
    clock: Arc<dyn Clock>,
}

impl AccrualEngine {
    /// Creates an engine over the given ledger, plan registry, and
    /// contract book.
    #[must_use]
    pub fn new(
        ledger: Arc<Ledger>,
        plans: Arc<dyn PlanRegistry>,
        book: Arc<ContractBook>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ledger,
            plans,
            book,
            clock,
        }
    }

    /// Processes one accrual tick over all active contracts.
    ///
    /// A failure on one contract (plan missing, ledger credit rejected)
    /// is logged and counted; the watermark stays put so the same window
    /// is retried on the next tick. It never aborts the rest of the batch.
    pub fn run_tick(&self) -> TickSummary {
        let now = self.clock.now();
        let mut summary = TickSummary::default();

        for handle in self.book.active() {
            let mut contract = handle.lock().unwrap_or_else(PoisonError::into_inner);
            if !contract.active {
                continue;
            }
            summary.processed += 1;

            let Some(plan) = self.plans.get(contract.plan_id) else {
                warn!(
                    contract_id = %contract.id,
                    plan_id = %contract.plan_id,
                    "plan missing from registry, skipping contract"
                );
                summary.failures += 1;
                continue;
            };

            // Accrue only up to maturity.
            let accrue_until = now.min(contract.end_at);
            if accrue_until > contract.last_accrued_at {
                let elapsed_ms = (accrue_until - contract.last_accrued_at).num_milliseconds();
                let elapsed_days = Decimal::from(elapsed_ms) / MS_PER_DAY;
                let increment = round8(contract.principal * plan.daily_rate * elapsed_days);

                if increment > Decimal::ZERO {
                    match self.ledger.credit(contract.account_id, increment) {
                        Ok(new_balance) => {
                            contract.accrued_profit += increment;
                            contract.last_accrued_at = accrue_until;
                            summary.credited += increment;
                            debug!(
                                contract_id = %contract.id,
                                account_id = %contract.account_id,
                                %increment,
                                %new_balance,
                                "profit accrued"
                            );
                        }
                        Err(err) => {
                            // Watermark untouched: this window is retried
                            // on the next tick.
                            warn!(
                                contract_id = %contract.id,
                                account_id = %contract.account_id,
                                error = %err,
                                "profit credit failed"
                            );
                            summary.failures += 1;
                            continue;
                        }
                    }
                }
            }

            if contract.is_matured(now) {
                contract.active = false;
                contract.last_accrued_at = contract.end_at;
                summary.retired += 1;
                info!(
                    contract_id = %contract.id,
                    account_id = %contract.account_id,
                    accrued_profit = %contract.accrued_profit,
                    "contract matured and retired"
                );
            }
        }

        summary
    }
}
