//! Form decoding for the upload and chat endpoints.

use crate::api::BillSubmission;
use crate::error::ErrorContext;
use crate::{Error, Result};

use axum::extract::multipart::Field;
use axum::extract::Multipart;
use serde::Deserialize;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// File part of an upload form.
#[derive(Debug)]
pub(crate) struct UploadedFile {
    bytes: Vec<u8>,
    mime_type: String,
    file_name: Option<String>,
}

/// Fields of the bill upload form. Both camelCase and snake_case names are
/// accepted.
#[derive(Debug, Default)]
pub(crate) struct BillForm {
    file: Option<UploadedFile>,
    mode: Option<String>,
    reduction_percent: Option<String>,
    user_id: Option<String>,
}

impl BillForm {
    /// Drain a multipart body.
    pub(crate) async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = BillForm::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let mime_type = field
                        .content_type()
                        .unwrap_or(FALLBACK_CONTENT_TYPE)
                        .to_string();
                    let file_name = field.file_name().map(str::to_string);
                    let bytes = field.bytes().await.map_err(malformed)?;
                    form.file = Some(UploadedFile {
                        bytes: bytes.to_vec(),
                        mime_type,
                        file_name,
                    });
                }
                "mode" => form.mode = Some(text(field).await?),
                "reductionPercent" | "reduction_percent" => {
                    form.reduction_percent =
                        Some(text(field).await.with_field("reductionPercent")?)
                }
                "userId" | "user_id" => {
                    form.user_id = Some(text(field).await.with_field("userId")?)
                }
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    /// Turn the decoded fields into a submission, applying defaults.
    pub(crate) fn into_submission(self) -> Result<BillSubmission> {
        let file = self
            .file
            .ok_or_else(|| Error::validation_field("no file uploaded", "file"))?;

        let reduction_percent = match self.reduction_percent.as_deref().map(str::trim) {
            None | Some("") => 0,
            Some(raw) => raw.parse::<i32>().map_err(|_| {
                Error::validation_field(
                    format!("reductionPercent must be an integer, got '{}'", raw),
                    "reductionPercent",
                )
            })?,
        };

        let mut submission = BillSubmission::new(file.bytes, file.mime_type)
            .with_reduction_percent(reduction_percent);
        if let Some(file_name) = file.file_name {
            submission = submission.with_file_name(file_name);
        }
        if let Some(user_id) = non_blank(self.user_id) {
            submission = submission.with_user_id(user_id);
        }
        if let Some(mode) = non_blank(self.mode) {
            submission = submission.with_mode(mode);
        }

        Ok(submission)
    }
}

/// Fields of the chat form.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChatForm {
    #[serde(default, rename = "userId", alias = "user_id")]
    pub(crate) user_id: Option<String>,
    #[serde(default)]
    pub(crate) message: Option<String>,
}

impl ChatForm {
    /// Drain a multipart body.
    pub(crate) async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = ChatForm::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "userId" | "user_id" => form.user_id = Some(text(field).await?),
                "message" => form.message = Some(text(field).await.with_field("message")?),
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }
}

/// Replace a missing or blank value with nothing.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn text(field: Field<'_>) -> Result<String> {
    field.text().await.map_err(malformed)
}

fn malformed(e: impl std::fmt::Display) -> Error {
    Error::validation(format!("malformed form data: {}", e))
}
