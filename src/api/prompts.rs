//! Prompt text sent to the model.

use crate::budget::BudgetResult;

/// Asks the model for the bare usage figure.
pub const USAGE_PROMPT: &str = "Extract the total electricity usage in kWh from this bill. \
Return only the number, without units or any other text.";

/// Asks for a numbered list of recommendations for the given usage and goal.
pub fn recommendation_prompt(usage_kwh: f64, reduction_percent: i32) -> String {
    format!(
        "This electricity bill shows {} kWh of usage. The household wants to cut its \
         consumption by {}%. Give 5 to 7 specific, practical recommendations to reach that \
         goal, as a numbered list with one recommendation per item. Do not add an \
         introduction or a conclusion.",
        usage_kwh, reduction_percent
    )
}

/// Opening context for the follow-up chat.
pub fn chat_context(result: &BudgetResult) -> String {
    format!(
        "You are an energy efficiency assistant helping a household lower its electricity \
         use and carbon footprint. Use the attached bill and the analysis below to answer \
         follow-up questions concisely and practically.\n\n{}",
        result.summary()
    )
}
