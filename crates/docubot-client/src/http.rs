//! HTTP client for the DocuBot API: `/api/analyze`, `/api/history`,
//! `/api/generate-pdf/{id}` and `/api/stats`.

use std::time::Duration;

use async_trait::async_trait;
use docubot_core::{HistoryEntry, MalformedResult, UsageStats, normalize};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::{Analysis, AnalysisService, ClientError, Upload};

/// Default upload size hint (the service advertises "PDF files up to 10 MB").
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Like `http://localhost:8000`; a trailing slash is trimmed.
    pub base_url: String,
    /// Transport timeout. `None` waits for as long as the server takes.
    pub timeout: Option<Duration>,
    pub max_upload_bytes: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// reqwest-backed [`AnalysisService`].
pub struct AnalysisClient {
    client: reqwest::Client,
    base_url: String,
    config: ClientConfig,
}

#[derive(Deserialize)]
struct AnalyzeEnvelope {
    status: String,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, alias = "id")]
    analysis_id: Option<i64>,
}

#[derive(Deserialize)]
struct HistoryEnvelope {
    status: String,
    #[serde(default)]
    analyses: Vec<HistoryEntry>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct StatsEnvelope {
    /// The stats endpoint may answer with the bare figures.
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    stats: UsageStats,
}

/// Error bodies: our own envelope, or a framework `detail`.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<Value>,
}

impl AnalysisClient {
    /// Create a client for the given base URL with default settings.
    pub fn new(base_url: String) -> Self {
        let config = ClientConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..ClientConfig::default()
        };
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            config,
        }
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Submit a document and normalize the returned analysis.
    ///
    /// The analyze endpoint does not always report the id of the history
    /// entry it created. When it doesn't, the most recent history entry is
    /// assumed to be ours; another session writing at the same moment can
    /// make that guess wrong. A failed lookup leaves the id unset.
    pub async fn analyze(&self, upload: &Upload) -> Result<Analysis, ClientError> {
        let url = format!("{}/api/analyze", self.base_url);
        info!(url = %url, filename = %upload.filename, bytes = upload.len(), "submitting document");

        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.filename.clone())
            .mime_str(upload.mime())?;
        let form = Form::new().part("file", part);
        let resp = self.client.post(&url).multipart(form).send().await?;
        let http_status = resp.status().as_u16();
        let envelope: AnalyzeEnvelope = read_json(resp).await?;

        if envelope.status != "success" {
            return Err(ClientError::Server {
                status: http_status,
                message: envelope
                    .error
                    .unwrap_or_else(|| format!("analysis status `{}`", envelope.status)),
            });
        }
        let raw = envelope
            .result
            .ok_or(MalformedResult::Missing("result"))?;
        let result = normalize(&raw)?;

        let analysis_id = match envelope.analysis_id {
            Some(id) => Some(id),
            None => self.latest_entry_id().await,
        };
        info!(
            document_type = %result.document_type,
            risks = result.risk_flags.len(),
            analysis_id = ?analysis_id,
            "analysis complete"
        );
        Ok(Analysis {
            analysis_id,
            result,
        })
    }

    /// Fetch past analyses in server order.
    pub async fn fetch_history(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<HistoryEntry>, ClientError> {
        let url = format!("{}/api/history", self.base_url);
        info!(url = %url, limit = ?limit, "fetching history");

        let mut req = self.client.get(&url);
        if let Some(limit) = limit {
            req = req.query(&[("limit", limit)]);
        }
        let resp = req.send().await?;
        let http_status = resp.status().as_u16();
        let envelope: HistoryEnvelope = read_json(resp).await?;
        if envelope.status != "success" {
            return Err(ClientError::Server {
                status: http_status,
                message: envelope
                    .error
                    .unwrap_or_else(|| "history request failed".to_string()),
            });
        }

        info!(count = envelope.analyses.len(), "fetched history");
        Ok(envelope.analyses)
    }

    /// Download the server-rendered report for a history entry.
    pub async fn fetch_report(&self, analysis_id: i64) -> Result<Vec<u8>, ClientError> {
        let url = format!("{}/api/generate-pdf/{}", self.base_url, analysis_id);
        info!(url = %url, "fetching server report");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(server_error(status.as_u16(), &body));
        }
        let bytes = resp.bytes().await?;
        info!(bytes = bytes.len(), "fetched server report");
        Ok(bytes.to_vec())
    }

    pub async fn fetch_stats(&self) -> Result<UsageStats, ClientError> {
        let url = format!("{}/api/stats", self.base_url);
        info!(url = %url, "fetching usage stats");

        let resp = self.client.get(&url).send().await?;
        let http_status = resp.status().as_u16();
        let envelope: StatsEnvelope = read_json(resp).await?;
        if envelope.status.as_deref().is_some_and(|s| s != "success") {
            return Err(ClientError::Server {
                status: http_status,
                message: envelope
                    .error
                    .unwrap_or_else(|| "stats request failed".to_string()),
            });
        }
        Ok(envelope.stats)
    }

    async fn latest_entry_id(&self) -> Option<i64> {
        match self.fetch_history(Some(1)).await {
            Ok(entries) => entries.first().map(|e| e.id),
            Err(err) => {
                warn!(error = %err, "could not correlate analysis with a history entry");
                None
            }
        }
    }
}

#[async_trait]
impl AnalysisService for AnalysisClient {
    async fn analyze(&self, upload: &Upload) -> Result<Analysis, ClientError> {
        AnalysisClient::analyze(self, upload).await
    }

    async fn fetch_history(&self, limit: Option<u32>) -> Result<Vec<HistoryEntry>, ClientError> {
        AnalysisClient::fetch_history(self, limit).await
    }

    async fn fetch_report(&self, analysis_id: i64) -> Result<Vec<u8>, ClientError> {
        AnalysisClient::fetch_report(self, analysis_id).await
    }

    async fn fetch_stats(&self) -> Result<UsageStats, ClientError> {
        AnalysisClient::fetch_stats(self).await
    }
}

/// Check the status, then decode the body as JSON.
async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(server_error(status.as_u16(), &body));
    }
    serde_json::from_str(&body)
        .map_err(|e| ClientError::Malformed(MalformedResult::InvalidJson(e.to_string())))
}

fn server_error(status: u16, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| {
            b.error.or(match b.detail {
                Some(Value::String(s)) => Some(s),
                Some(other) => Some(other.to_string()),
                None => None,
            })
        })
        .unwrap_or_else(|| body.trim().to_string());
    ClientError::Server { status, message }
}
