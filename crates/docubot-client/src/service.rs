use std::path::Path;

use async_trait::async_trait;
use docubot_core::{AnalysisResult, HistoryEntry, UsageStats};

use crate::ClientError;

/// A file picked for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        Ok(Self { filename, bytes })
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Type hint only: `.pdf` extension or a `%PDF-` header.
    pub fn looks_like_pdf(&self) -> bool {
        self.filename.to_ascii_lowercase().ends_with(".pdf") || self.bytes.starts_with(b"%PDF-")
    }

    pub fn mime(&self) -> &'static str {
        if self.looks_like_pdf() {
            "application/pdf"
        } else {
            "application/octet-stream"
        }
    }
}

/// A successful analysis.
///
/// `analysis_id` identifies the history entry the server created for it,
/// when it could be determined; server-side export needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub analysis_id: Option<i64>,
    pub result: AnalysisResult,
}

/// The remote analysis service as seen by the session layer.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(&self, upload: &Upload) -> Result<Analysis, ClientError>;

    /// Entries in server order, most recent first.
    async fn fetch_history(&self, limit: Option<u32>) -> Result<Vec<HistoryEntry>, ClientError>;

    /// Server-rendered PDF report for a history entry.
    async fn fetch_report(&self, analysis_id: i64) -> Result<Vec<u8>, ClientError>;

    async fn fetch_stats(&self) -> Result<UsageStats, ClientError>;
}
