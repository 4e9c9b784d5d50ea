//! Carbon budget arithmetic.

use serde::{Deserialize, Serialize};

/// Kilograms of CO₂ per kWh. A flat grid-average approximation, not a measured value.
pub const EMISSION_FACTOR_KG_PER_KWH: f64 = 0.92;

/// Credit figures derived from a usage reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetFigures {
    /// Current emissions in kg CO₂, rounded to 2 places
    pub original_credits: f64,
    /// Emissions after the requested reduction, rounded to 2 places
    pub target_credits: f64,
    /// Difference between the two, rounded to 2 places
    pub savings_needed: f64,
}

/// Maps usage and a reduction target to carbon credit figures.
#[derive(Debug, Clone, Copy)]
pub struct BudgetCalculator {
    clamp_reduction: bool,
}

impl Default for BudgetCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl BudgetCalculator {
    /// Create a calculator that clamps the reduction percent into [0, 100].
    pub fn new() -> Self {
        Self {
            clamp_reduction: true,
        }
    }

    /// Enable or disable clamping of the reduction percent.
    ///
    /// Without clamping, out-of-range values go through the formula as-is:
    /// a negative percent raises the target, above 100 makes it negative.
    pub fn with_clamping(mut self, enabled: bool) -> Self {
        self.clamp_reduction = enabled;
        self
    }

    /// The reduction percent that will actually be applied.
    pub fn effective_reduction(&self, reduction_percent: i32) -> i32 {
        if self.clamp_reduction {
            reduction_percent.clamp(0, 100)
        } else {
            reduction_percent
        }
    }

    /// Compute the budget for `usage_kwh` and `reduction_percent`.
    ///
    /// Rounding is applied to each output independently; intermediate values
    /// stay unrounded.
    pub fn compute_budget(&self, usage_kwh: f64, reduction_percent: i32) -> BudgetFigures {
        let reduction = self.effective_reduction(reduction_percent) as f64;

        let original = usage_kwh * EMISSION_FACTOR_KG_PER_KWH;
        let target = original * (1.0 - reduction / 100.0);

        BudgetFigures {
            original_credits: round2(original),
            target_credits: round2(target),
            savings_needed: round2(original - target),
        }
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 0.0101;

    #[test]
    fn test_compute_budget() {
        let budget = BudgetCalculator::new().compute_budget(245.7, 20);
        assert_eq!(budget.original_credits, 226.04);
        assert_eq!(budget.target_credits, 180.84);
        assert_eq!(budget.savings_needed, 45.21);
    }

    #[test]
    fn test_zero_reduction() {
        let budget = BudgetCalculator::new().compute_budget(300.0, 0);
        assert_eq!(budget.original_credits, 276.0);
        assert_eq!(budget.target_credits, 276.0);
        assert_eq!(budget.savings_needed, 0.0);
    }

    #[test]
    fn test_full_reduction() {
        let budget = BudgetCalculator::new().compute_budget(100.0, 100);
        assert_eq!(budget.original_credits, 92.0);
        assert_eq!(budget.target_credits, 0.0);
        assert_eq!(budget.savings_needed, 92.0);
    }

    #[test]
    fn test_clamps_out_of_range() {
        let calc = BudgetCalculator::new();
        assert_eq!(calc.effective_reduction(150), 100);
        assert_eq!(calc.effective_reduction(-10), 0);

        let budget = calc.compute_budget(100.0, 150);
        assert_eq!(budget.target_credits, 0.0);

        let budget = calc.compute_budget(100.0, -10);
        assert_eq!(budget.target_credits, 92.0);
    }

    #[test]
    fn test_pass_through_out_of_range() {
        let calc = BudgetCalculator::new().with_clamping(false);
        assert_eq!(calc.effective_reduction(150), 150);

        let budget = calc.compute_budget(100.0, 150);
        assert_eq!(budget.target_credits, -46.0);
        assert_eq!(budget.savings_needed, 138.0);

        let budget = calc.compute_budget(100.0, -10);
        assert_eq!(budget.target_credits, 101.2);
        assert_eq!(budget.savings_needed, -9.2);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(round2(2.344), 2.34);
        assert_eq!(round2(0.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_budget_invariants(usage in 0.0f64..100_000.0, reduction in 0i32..=100) {
            let budget = BudgetCalculator::new().compute_budget(usage, reduction);

            let original = usage * EMISSION_FACTOR_KG_PER_KWH;
            prop_assert!((budget.original_credits - original).abs() <= 0.005 + 1e-9);

            let expected_target = budget.original_credits * (1.0 - reduction as f64 / 100.0);
            prop_assert!((budget.target_credits - expected_target).abs() <= EPS);

            let expected_savings = budget.original_credits - budget.target_credits;
            // Each side carries up to three independent roundings.
            prop_assert!((budget.savings_needed - expected_savings).abs() <= 0.0151);

            prop_assert!(budget.target_credits <= budget.original_credits);
            prop_assert!(budget.savings_needed >= 0.0);
        }
    }
}
