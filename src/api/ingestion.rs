//! Bill ingestion: file in, budget and recommendations out.

use super::prompts::{chat_context, recommendation_prompt, USAGE_PROMPT};
use super::submission::{BillSubmission, StagedUpload, DEFAULT_MODE};
use super::call_model;
use crate::budget::{
    BudgetCalculator, BudgetResult, RecommendationParser, UsageExtractor, FALLBACK_USAGE_KWH,
};
use crate::config::{Config, UploadConfig};
use crate::model::{GenerativeModel, PromptPart};
use crate::session::SessionStore;
use crate::telemetry::Telemetry;
use crate::Result;

use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Orchestrates the analysis of one uploaded bill.
///
/// The two model calls run one after the other because the recommendation
/// prompt embeds the extracted usage.
pub struct BillIngestionService {
    model: Arc<dyn GenerativeModel>,
    sessions: Arc<dyn SessionStore>,
    telemetry: Arc<Telemetry>,
    extractor: UsageExtractor,
    parser: RecommendationParser,
    calculator: BudgetCalculator,
    uploads: UploadConfig,
    timeout: Duration,
}

impl BillIngestionService {
    /// Create a service with default upload limits and timeout.
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        sessions: Arc<dyn SessionStore>,
        telemetry: Arc<Telemetry>,
    ) -> Self {
        let config = Config::default();
        Self {
            model,
            sessions,
            telemetry,
            extractor: UsageExtractor::new(),
            parser: RecommendationParser::new(),
            calculator: BudgetCalculator::new()
                .with_clamping(config.budget.clamp_reduction_percent),
            uploads: config.uploads,
            timeout: config.model.timeout(),
        }
    }

    /// Apply upload, budget and timeout settings from `config`.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.uploads = config.uploads.clone();
        self.calculator = self
            .calculator
            .with_clamping(config.budget.clamp_reduction_percent);
        self.timeout = config.model.timeout();
        self
    }

    /// Set the per-call model timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Upload limits in effect.
    pub fn upload_config(&self) -> &UploadConfig {
        &self.uploads
    }

    /// Analyse a bill, start the user's chat session and return the budget.
    ///
    /// The staged copy of the upload is removed whether or not analysis succeeds.
    #[instrument(
        skip_all,
        fields(
            user_id = %submission.user_id,
            mime_type = %submission.mime_type,
            file_name = submission.file_name.as_deref().unwrap_or("-"),
        )
    )]
    pub async fn ingest(&self, submission: BillSubmission) -> Result<BudgetResult> {
        if !submission.mode.eq_ignore_ascii_case(DEFAULT_MODE) {
            tracing::warn!(mode = %submission.mode, "Unknown mode, running budget analysis");
        }

        let outcome = match submission.validate(&self.uploads) {
            Ok(()) => self.stage_and_process(&submission).await,
            Err(e) => Err(e),
        };

        match &outcome {
            Ok((result, used_fallback)) => {
                self.telemetry.record_ingestion(true, *used_fallback);
                tracing::info!(
                    usage_kwh = result.usage_kwh,
                    original_credits = result.original_credits,
                    target_credits = result.target_credits,
                    recommendations = result.recommendations.len(),
                    "Bill analysed"
                );
            }
            Err(e) => {
                self.telemetry.record_ingestion(false, false);
                self.telemetry.record_error(e.category());
                tracing::error!(
                    error = %e,
                    recoverable = e.is_recoverable(),
                    "Bill analysis failed"
                );
            }
        }

        outcome.map(|(result, _)| result)
    }

    async fn stage_and_process(&self, submission: &BillSubmission) -> Result<(BudgetResult, bool)> {
        let upload = StagedUpload::stage(
            &self.uploads.temp_dir,
            &submission.mime_type,
            &submission.file_bytes,
        )
        .await?;

        let outcome = self.process(submission, &upload).await;
        upload.release();
        outcome
    }

    async fn process(
        &self,
        submission: &BillSubmission,
        upload: &StagedUpload,
    ) -> Result<(BudgetResult, bool)> {
        let file = PromptPart::file(&submission.mime_type, upload.read().await?);

        let usage_text = call_model(
            &self.telemetry,
            self.timeout,
            "usage extraction",
            self.model
                .generate_content(&[PromptPart::text(USAGE_PROMPT), file.clone()]),
        )
        .await?;

        let (usage_kwh, used_fallback) = match self.extractor.try_extract(&usage_text) {
            Ok(kwh) => (kwh, false),
            Err(e) => {
                tracing::warn!(error = %e, fallback = FALLBACK_USAGE_KWH, "Using fallback usage");
                (FALLBACK_USAGE_KWH, true)
            }
        };

        let reduction_percent = self.calculator.effective_reduction(submission.reduction_percent);
        let recommendation_text = call_model(
            &self.telemetry,
            self.timeout,
            "recommendations",
            self.model.generate_content(&[
                PromptPart::text(recommendation_prompt(usage_kwh, reduction_percent)),
                file.clone(),
            ]),
        )
        .await?;

        let recommendations = self.parser.parse(&recommendation_text);
        let figures = self
            .calculator
            .compute_budget(usage_kwh, submission.reduction_percent);
        let result = BudgetResult::new(usage_kwh, reduction_percent, figures, recommendations);

        self.sessions.start_session(
            &submission.user_id,
            vec![PromptPart::text(chat_context(&result)), file],
        );

        Ok((result, used_fallback))
    }
}
