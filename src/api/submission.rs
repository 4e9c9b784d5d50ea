//! Bill submission input and upload staging.

use crate::config::UploadConfig;
use crate::{Error, Result};

use std::path::Path;
use tempfile::NamedTempFile;

/// User id applied when the caller does not send one.
pub const DEFAULT_USER_ID: &str = "default_user";

/// Analysis mode applied when the caller does not send one.
pub const DEFAULT_MODE: &str = "budget";

/// A bill uploaded for analysis. Lives for one request.
#[derive(Clone)]
pub struct BillSubmission {
    /// Raw file content
    pub file_bytes: Vec<u8>,
    /// Declared content type of the file
    pub mime_type: String,
    /// Original file name, if the client sent one
    pub file_name: Option<String>,
    /// Requested reduction in percent
    pub reduction_percent: i32,
    /// Owner of the resulting chat session
    pub user_id: String,
    /// Requested analysis mode. Only budget analysis exists, so this is
    /// recorded but does not change behavior.
    pub mode: String,
}

impl BillSubmission {
    /// Create a submission with default reduction, user and mode.
    pub fn new(file_bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            file_bytes,
            mime_type: mime_type.into(),
            file_name: None,
            reduction_percent: 0,
            user_id: DEFAULT_USER_ID.to_string(),
            mode: DEFAULT_MODE.to_string(),
        }
    }

    /// Set the reduction percent.
    pub fn with_reduction_percent(mut self, reduction_percent: i32) -> Self {
        self.reduction_percent = reduction_percent;
        self
    }

    /// Set the user id.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Set the file name.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Set the analysis mode.
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    /// Check the submission against upload limits.
    pub fn validate(&self, uploads: &UploadConfig) -> Result<()> {
        if self.file_bytes.is_empty() {
            return Err(Error::validation_field("uploaded file is empty", "file"));
        }
        if self.file_bytes.len() > uploads.max_bytes {
            return Err(Error::validation_field(
                format!(
                    "file is {} bytes, the limit is {} bytes",
                    self.file_bytes.len(),
                    uploads.max_bytes
                ),
                "file",
            ));
        }
        if !uploads.is_allowed(&self.mime_type) {
            return Err(Error::validation_field(
                format!(
                    "unsupported file type '{}', please upload a PDF, JPG or PNG",
                    self.mime_type
                ),
                "file",
            ));
        }
        if self.user_id.trim().is_empty() {
            return Err(Error::validation_field("user id is empty", "userId"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for BillSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillSubmission")
            .field("bytes", &self.file_bytes.len())
            .field("mime_type", &self.mime_type)
            .field("file_name", &self.file_name)
            .field("reduction_percent", &self.reduction_percent)
            .field("user_id", &self.user_id)
            .field("mode", &self.mode)
            .finish()
    }
}

/// An uploaded file staged on disk under a unique name.
///
/// The file is removed by [`StagedUpload::release`], or on drop if a step
/// bails out early.
#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
}

impl StagedUpload {
    /// Write `bytes` to a fresh file in `dir`.
    pub async fn stage(dir: &Path, mime_type: &str, bytes: &[u8]) -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("bill-")
            .suffix(extension_for(mime_type))
            .tempfile_in(dir)
            .map_err(|e| Error::upload(format!("cannot create scratch file in {:?}: {}", dir, e)))?;

        tokio::fs::write(file.path(), bytes)
            .await
            .map_err(|e| Error::upload(format!("cannot write scratch file: {}", e)))?;

        Ok(Self { file })
    }

    /// Location of the staged file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Read the staged content back.
    pub async fn read(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(self.path()).await?)
    }

    /// Delete the staged file. Failures are logged, not returned.
    pub fn release(self) {
        let path = self.path().to_path_buf();
        if let Err(e) = self.file.close() {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove staged upload");
        }
    }
}

fn extension_for(mime_type: &str) -> &'static str {
    match mime_type.trim().to_ascii_lowercase().as_str() {
        "application/pdf" => ".pdf",
        "image/png" => ".png",
        "image/jpeg" | "image/jpg" => ".jpg",
        "image/webp" => ".webp",
        _ => ".bin",
    }
}
