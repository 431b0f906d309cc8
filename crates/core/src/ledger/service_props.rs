//! Property tests for the ledger service.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;

use custodia_shared::types::{Asset, round8};

use super::error::LedgerError;
use super::service::Ledger;

/// Strategy for a single signed operation: positive = credit, negative = debit.
fn op_strategy() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000i64).prop_map(|n| Decimal::new(n, 8))
}

fn ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(op_strategy(), 1..=max_len)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any sequence of credit/debit calls, the final balance equals the
    /// sum of the successfully applied signed amounts and is never negative.
    #[test]
    fn prop_balance_equals_sum_of_applied_ops(ops in ops_strategy(40)) {
        let ledger = Ledger::new();
        let account = ledger.open_account(Asset::Btc, None, Utc::now());

        let mut expected = Decimal::ZERO;
        for op in ops {
            let amount = round8(op.abs());
            let result = if op.is_sign_negative() {
                ledger.debit(account.id, amount)
            } else {
                ledger.credit(account.id, amount)
            };
            match result {
                Ok(_) => {
                    if op.is_sign_negative() {
                        expected -= amount;
                    } else {
                        expected += amount;
                    }
                }
                Err(LedgerError::InsufficientFunds { .. } | LedgerError::InvalidAmount(_)) => {
                    // Rejected ops leave the balance untouched
                }
                Err(err) => return Err(TestCaseError::fail(format!("unexpected: {err}"))),
            }

            let balance = ledger.balance(account.id).unwrap();
            prop_assert!(balance >= Decimal::ZERO, "balance went negative: {balance}");
            prop_assert_eq!(balance, expected);
        }
    }

    /// Reconciling to any non-negative external reading is idempotent: the
    /// second application computes a zero delta.
    #[test]
    fn prop_reconcile_idempotent(
        initial in 0i64..1_000_000i64,
        external in 0i64..1_000_000i64,
    ) {
        let ledger = Ledger::new();
        let account = ledger.open_account(Asset::Btc, Some("addr".into()), Utc::now());
        if initial > 0 {
            ledger.credit(account.id, Decimal::new(initial, 8)).unwrap();
        }

        let external = Decimal::new(external, 8);
        ledger.reconcile_to(account.id, external).unwrap();
        prop_assert_eq!(ledger.balance(account.id).unwrap(), external);

        let second = ledger.reconcile_to(account.id, external).unwrap();
        prop_assert!(second.is_none());
        prop_assert_eq!(ledger.balance(account.id).unwrap(), external);
    }
}
