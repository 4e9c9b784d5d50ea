//! Budget result returned to callers.

use super::calculator::{round2, BudgetFigures};
use serde::{Deserialize, Serialize};

/// Outcome of analysing one bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetResult {
    /// Monthly usage in kWh, rounded to 2 places
    pub usage_kwh: f64,
    /// Current emissions in kg CO₂
    pub original_credits: f64,
    /// Emissions allowed after the reduction
    pub target_credits: f64,
    /// Reduction percent that was applied
    pub reduction_percent: i32,
    /// kg CO₂ that must be saved to hit the target
    pub savings_needed: f64,
    /// Up to seven recommendations, in model order
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl BudgetResult {
    /// Assemble a result from its parts.
    pub fn new(
        usage_kwh: f64,
        reduction_percent: i32,
        figures: BudgetFigures,
        recommendations: Vec<String>,
    ) -> Self {
        Self {
            usage_kwh: round2(usage_kwh),
            original_credits: figures.original_credits,
            target_credits: figures.target_credits,
            reduction_percent,
            savings_needed: figures.savings_needed,
            recommendations,
        }
    }

    /// Plain-text summary used to seed the follow-up chat.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Electricity bill analysis:\n\
             - Monthly usage: {} kWh\n\
             - Current carbon footprint: {} kg CO2\n\
             - Reduction goal: {}%\n\
             - Target footprint: {} kg CO2\n\
             - Savings needed: {} kg CO2\n",
            self.usage_kwh,
            self.original_credits,
            self.reduction_percent,
            self.target_credits,
            self.savings_needed,
        );

        if !self.recommendations.is_empty() {
            summary.push_str("Recommendations given so far:\n");
            for (i, rec) in self.recommendations.iter().enumerate() {
                summary.push_str(&format!("{}. {}\n", i + 1, rec));
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::BudgetCalculator;

    #[test]
    fn test_serializes_snake_case() {
        let figures = BudgetCalculator::new().compute_budget(245.7, 20);
        let result = BudgetResult::new(245.7, 20, figures, vec!["Switch to LED".to_string()]);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["usage_kwh"], 245.7);
        assert_eq!(json["original_credits"], 226.04);
        assert_eq!(json["target_credits"], 180.84);
        assert_eq!(json["reduction_percent"], 20);
        assert_eq!(json["savings_needed"], 45.21);
        assert_eq!(json["recommendations"][0], "Switch to LED");
    }

    #[test]
    fn test_summary_lists_recommendations() {
        let figures = BudgetCalculator::new().compute_budget(300.0, 10);
        let result = BudgetResult::new(
            300.0,
            10,
            figures,
            vec!["Unplug devices".to_string(), "Use LEDs".to_string()],
        );

        let summary = result.summary();
        assert!(summary.contains("300 kWh"));
        assert!(summary.contains("Reduction goal: 10%"));
        assert!(summary.contains("1. Unplug devices"));
        assert!(summary.contains("2. Use LEDs"));
    }
}
