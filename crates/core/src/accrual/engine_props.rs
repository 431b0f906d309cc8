//! Property tests for the accrual engine.

use std::sync::Arc;

use chrono::{Duration, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use custodia_shared::types::{Asset, PlanId, round8};

use crate::clock::{Clock, ManualClock};
use crate::plan::{InMemoryPlanRegistry, Plan, PlanRegistry};

use super::book::ContractBook;
use super::engine::AccrualEngine;

fn plan() -> Plan {
    Plan {
        id: PlanId::new(),
        name: "Props".into(),
        min_amount: dec!(0.0001),
        daily_rate: dec!(0.0075),
        duration_days: 3,
        active: true,
    }
}

/// Tick gaps in minutes, enough of them to pass maturity.
fn gaps_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(1i64..=2_000, 3..=30)
}

proptest! {
    /// Accrued profit never decreases, the watermark never moves
    /// backwards, and the total credited over the contract's life stays
    /// within one rounding step per tick of the exact
    /// `principal * daily_rate * duration_days`.
    #[test]
    fn prop_accrual_monotone_and_total_bounded(gaps in gaps_strategy()) {
        let principal = dec!(0.005);
        let plan = plan();

        let ledger = Arc::new(crate::ledger::Ledger::new());
        let plans = Arc::new(InMemoryPlanRegistry::new());
        plans.insert(plan.clone());
        let book = Arc::new(ContractBook::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let engine = AccrualEngine::new(
            Arc::clone(&ledger),
            Arc::clone(&plans) as Arc<dyn PlanRegistry>,
            Arc::clone(&book),
            Arc::clone(&clock) as Arc<dyn Clock>,
        );

        let account = ledger.open_account(Asset::Btc, None, clock.now());
        let contract = book.open(account.id, &plan, principal, clock.now());

        let mut previous_profit = Decimal::ZERO;
        let mut previous_watermark = contract.last_accrued_at;
        let mut ticks = 0u32;
        for gap in &gaps {
            clock.advance(Duration::minutes(*gap));
            engine.run_tick();
            ticks += 1;

            let snapshot = book.get(contract.id).unwrap();
            prop_assert!(snapshot.accrued_profit >= previous_profit);
            prop_assert!(snapshot.last_accrued_at >= previous_watermark);
            previous_profit = snapshot.accrued_profit;
            previous_watermark = snapshot.last_accrued_at;
        }

        // Push well past maturity and retire
        clock.advance(Duration::days(4));
        engine.run_tick();
        ticks += 1;

        let snapshot = book.get(contract.id).unwrap();
        prop_assert!(!snapshot.active);
        prop_assert_eq!(snapshot.last_accrued_at, snapshot.end_at);

        let exact =
            round8(principal * plan.daily_rate * Decimal::from(plan.duration_days));
        let tolerance = Decimal::new(i64::from(ticks), 8);
        prop_assert!((snapshot.accrued_profit - exact).abs() <= tolerance);
        prop_assert_eq!(ledger.balance(account.id).unwrap(), snapshot.accrued_profit);
    }
}
