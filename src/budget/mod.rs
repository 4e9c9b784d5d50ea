//! Deterministic bill analysis: usage extraction, budget arithmetic and
//! recommendation parsing.
//!
//! Nothing in this module performs I/O; the model responses it consumes are
//! plain strings.

mod calculator;
mod recommendations;
mod result;
mod usage;

pub use calculator::{round2, BudgetCalculator, BudgetFigures, EMISSION_FACTOR_KG_PER_KWH};
pub use recommendations::{RecommendationParser, MAX_RECOMMENDATIONS, MIN_SENTENCE_CHARS};
pub use result::BudgetResult;
pub use usage::{UsageExtractor, FALLBACK_USAGE_KWH};
