//! In-memory stand-in for the analysis service.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use docubot_client::{Analysis, AnalysisService, ClientError, Upload};
use docubot_core::{HistoryEntry, UsageStats, normalize};
use serde_json::json;

pub(crate) fn pdf(name: &str) -> Upload {
    Upload::new(name, b"%PDF-1.7 test document".to_vec())
}

pub(crate) fn analysis(analysis_id: Option<i64>) -> Analysis {
    let result = normalize(&json!({
        "extracted_data": {"document_type": "contract", "parties": ["Landlord LLC", "Tenant"]},
        "risk_flags": [
            {
                "level": "high",
                "category": "financial",
                "description": "Deposit is not refundable",
                "suggestion": "Negotiate"
            },
            {
                "level": "low",
                "category": "legal",
                "description": "No jurisdiction clause",
                "suggestion": "Add one"
            }
        ],
        "action_items": ["Check the deposit clause"],
        "summary": "Residential lease.",
        "confidence_score": 0.85
    }))
    .unwrap();
    Analysis {
        analysis_id,
        result,
    }
}

pub(crate) fn entry(id: i64, document_type: &str, risk_count: u32) -> HistoryEntry {
    HistoryEntry {
        id,
        filename: format!("doc-{id}.pdf"),
        document_type: document_type.to_string(),
        created_at: Utc.with_ymd_and_hms(2026, 2, 20 + id as u32 % 5, 9, 30, 0).unwrap(),
        confidence_score: 0.875,
        risk_count,
    }
}

pub(crate) struct FakeService {
    pub(crate) analysis_id: Option<i64>,
    pub(crate) fail_analyze: bool,
    pub(crate) fail_history: bool,
    pub(crate) history: Vec<HistoryEntry>,
    pub(crate) analyze_calls: AtomicUsize,
}

impl Default for FakeService {
    fn default() -> Self {
        Self {
            analysis_id: Some(7),
            fail_analyze: false,
            fail_history: false,
            history: Vec::new(),
            analyze_calls: AtomicUsize::new(0),
        }
    }
}

impl FakeService {
    pub(crate) fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisService for FakeService {
    async fn analyze(&self, _upload: &Upload) -> Result<Analysis, ClientError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_analyze {
            return Err(ClientError::Server {
                status: 500,
                message: "model unavailable".into(),
            });
        }
        Ok(analysis(self.analysis_id))
    }

    async fn fetch_history(&self, limit: Option<u32>) -> Result<Vec<HistoryEntry>, ClientError> {
        if self.fail_history {
            return Err(ClientError::Network("connection refused".into()));
        }
        let n = limit.map_or(self.history.len(), |l| l as usize);
        Ok(self.history.iter().take(n).cloned().collect())
    }

    async fn fetch_report(&self, analysis_id: i64) -> Result<Vec<u8>, ClientError> {
        Ok(format!("%PDF-1.4 server report {analysis_id}").into_bytes())
    }

    async fn fetch_stats(&self) -> Result<UsageStats, ClientError> {
        Ok(UsageStats::default())
    }
}
