//! # EcoSync
//!
//! Utility bill analysis service. A user uploads an electricity bill (image or
//! PDF); a hosted multimodal model reads the monthly usage and suggests ways to
//! cut it, the service turns the usage into a carbon budget, and the bill stays
//! available for follow-up questions in a per-user chat session.
//!
//! ## Features
//!
//! - **Usage extraction**: pull a kWh figure out of free-form model text, with a fixed fallback
//! - **Carbon budget**: emissions, target and savings for a requested reduction
//! - **Recommendations**: parse numbered or bulleted model output into a short list
//! - **Chat sessions**: one conversation per user, seeded with the bill and its budget
//! - **HTTP API**: axum routes returning JSON, with structured logging via `tracing`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ecosync::{Config, GeminiClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     config.validate()?;
//!
//!     let model = Arc::new(GeminiClient::new(&config.model)?);
//!     ecosync::server::serve(&config, model).await?;
//!     Ok(())
//! }
//! ```
//!
//! The budget math is usable on its own:
//!
//! ```rust
//! use ecosync::budget::{BudgetCalculator, UsageExtractor};
//!
//! let usage = UsageExtractor::new().extract("Usage: 245.7 kWh");
//! let figures = BudgetCalculator::new().compute_budget(usage, 20);
//! assert_eq!(figures.original_credits, 226.04);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod api;
pub mod budget;
pub mod config;
pub mod error;
pub mod model;
pub mod server;
pub mod session;
pub mod telemetry;

// Re-export main types for convenience
pub use api::{BillIngestionService, BillSubmission, ChatReplyService};
pub use budget::{BudgetCalculator, BudgetResult, RecommendationParser, UsageExtractor};
pub use config::Config;
pub use error::{Error, Result};
pub use model::{GeminiClient, GenerativeModel};
pub use session::{InMemorySessionStore, SessionStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
