//! JSON response bodies.
//!
//! Success and failure are separate variants; on the wire a failure is always
//! an object with a single `error` key.

use crate::budget::BudgetResult;
use crate::Result;

use serde::{Deserialize, Serialize};

/// Message returned alongside a successful analysis.
pub const BILL_SUCCESS_MESSAGE: &str =
    "Bill analyzed successfully. You can now ask follow-up questions in the chat.";

/// Response for `POST /bill-handler/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BillResponse {
    /// Analysis succeeded
    Success {
        /// Budget figures and recommendations
        budget_data: BudgetResult,
        /// Human-readable status line
        message: String,
    },
    /// Analysis failed
    Failure {
        /// What went wrong
        error: String,
    },
}

impl From<Result<BudgetResult>> for BillResponse {
    fn from(result: Result<BudgetResult>) -> Self {
        match result {
            Ok(budget_data) => BillResponse::Success {
                budget_data,
                message: BILL_SUCCESS_MESSAGE.to_string(),
            },
            Err(e) => BillResponse::Failure {
                error: e.to_string(),
            },
        }
    }
}

/// Response for `POST /chat-reply/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatResponse {
    /// Model reply
    Reply {
        /// Reply text
        reply: String,
    },
    /// Chat failed
    Failure {
        /// What went wrong
        error: String,
    },
}

impl From<Result<String>> for ChatResponse {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(reply) => ChatResponse::Reply { reply },
            Err(e) => ChatResponse::Failure {
                error: e.to_string(),
            },
        }
    }
}

/// Response for the older `POST /carbon-budget/` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CarbonBudgetResponse {
    /// Flat budget figures
    Success {
        /// Current emissions in kg CO₂
        original_credits: f64,
        /// Emissions after the reduction
        target_credits: f64,
        /// Reduction percent applied
        reduction_percent: i32,
        /// Recommendations
        suggestions: Vec<String>,
    },
    /// Analysis failed
    Failure {
        /// What went wrong
        error: String,
    },
}

impl From<Result<BudgetResult>> for CarbonBudgetResponse {
    fn from(result: Result<BudgetResult>) -> Self {
        match result {
            Ok(budget) => CarbonBudgetResponse::Success {
                original_credits: budget.original_credits,
                target_credits: budget.target_credits,
                reduction_percent: budget.reduction_percent,
                suggestions: budget.recommendations,
            },
            Err(e) => CarbonBudgetResponse::Failure {
                error: e.to_string(),
            },
        }
    }
}
