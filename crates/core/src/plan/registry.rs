//! Plan registry interface and in-memory implementation.

use custodia_shared::types::PlanId;
use dashmap::DashMap;

use super::types::Plan;

/// Read-only plan lookup used by the transaction and accrual paths.
///
/// Plan administration happens outside this engine.
pub trait PlanRegistry: Send + Sync {
    /// Looks up a plan by ID.
    fn get(&self, id: PlanId) -> Option<Plan>;

    /// Lists all plans.
    fn list(&self) -> Vec<Plan>;
}

/// In-memory plan registry, seeded at startup.
#[derive(Debug, Default)]
pub struct InMemoryPlanRegistry {
    plans: DashMap<PlanId, Plan>,
}

impl InMemoryPlanRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a plan.
    pub fn insert(&self, plan: Plan) {
        self.plans.insert(plan.id, plan);
    }
}

impl PlanRegistry for InMemoryPlanRegistry {
    fn get(&self, id: PlanId) -> Option<Plan> {
        self.plans.get(&id).map(|entry| entry.value().clone())
    }

    fn list(&self) -> Vec<Plan> {
        let mut plans: Vec<Plan> = self.plans.iter().map(|e| e.value().clone()).collect();
        plans.sort_by(|a, b| a.name.cmp(&b.name));
        plans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_plan(name: &str) -> Plan {
        Plan {
            id: PlanId::new(),
            name: name.into(),
            min_amount: dec!(0.001),
            daily_rate: dec!(0.005),
            duration_days: 14,
            active: true,
        }
    }

    #[test]
    fn test_get_returns_inserted_plan() {
        let registry = InMemoryPlanRegistry::new();
        let plan = make_plan("Starter");
        registry.insert(plan.clone());

        let fetched = registry.get(plan.id).unwrap();
        assert_eq!(fetched.name, "Starter");
        assert_eq!(fetched.min_amount, dec!(0.001));
    }

    #[test]
    fn test_get_unknown_plan() {
        let registry = InMemoryPlanRegistry::new();
        assert!(registry.get(PlanId::new()).is_none());
    }

    #[test]
    fn test_list_sorted_by_name() {
        let registry = InMemoryPlanRegistry::new();
        registry.insert(make_plan("Gold"));
        registry.insert(make_plan("Bronze"));
        registry.insert(make_plan("Silver"));

        let names: Vec<String> = registry.list().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Bronze", "Gold", "Silver"]);
    }
}
