//! Read-only snapshots returned by the history and stats endpoints.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Summary of one past analysis, as persisted by the history service.
///
/// `risk_count` is the length of the analysis' risk flags at the time it
/// was stored; the client never recomputes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub filename: String,
    pub document_type: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub confidence_score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub risk_count: u32,
}

/// Aggregate usage figures from `GET /api/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_documents: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub by_type: BTreeMap<String, u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub avg_confidence: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_risks: u64,
}

/// Parse a server timestamp: RFC 3339, a naive ISO timestamp (UTC), or a
/// bare date (midnight UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognised timestamp: {raw}")))
}

/// Explicit `null` reads the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn timestamp_formats() {
        let rfc = parse_timestamp("2026-02-21T10:00:00+03:00").unwrap();
        assert_eq!(rfc.hour(), 7);

        let naive = parse_timestamp("2026-02-21T10:00:00.123456").unwrap();
        assert_eq!(naive.hour(), 10);

        let spaced = parse_timestamp("2026-02-21 10:00:00").unwrap();
        assert_eq!(spaced, naive.with_nanosecond(0).unwrap());

        let date = parse_timestamp("2026-02-21").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2026, 2, 21));

        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn history_entry_from_server_json() {
        let json = r#"{
            "id": 3,
            "filename": "lease.pdf",
            "document_type": "contract",
            "created_at": "2026-02-21T10:00:00.5",
            "confidence_score": null,
            "risk_count": 2
        }"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, 3);
        assert_eq!(entry.confidence_score, 0.0);
        assert_eq!(entry.risk_count, 2);
    }

    #[test]
    fn history_entry_tolerates_null_risk_count() {
        let json = r#"{
            "id": 4,
            "filename": "act.pdf",
            "document_type": "act",
            "created_at": "2026-02-22",
            "confidence_score": 0.7,
            "risk_count": null
        }"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.risk_count, 0);
        assert_eq!(entry.confidence_score, 0.7);
    }

    #[test]
    fn history_entry_rejects_garbage_timestamp() {
        let json =
            r#"{"id": 1, "filename": "a.pdf", "document_type": "act", "created_at": "soon"}"#;
        assert!(serde_json::from_str::<HistoryEntry>(json).is_err());
    }

    #[test]
    fn usage_stats_defaults() {
        let stats: UsageStats = serde_json::from_str(
            r#"{"status": "success", "total_documents": 4, "by_type": {"contract": 3, "act": 1}}"#,
        )
        .unwrap();
        assert_eq!(stats.total_documents, 4);
        assert_eq!(stats.by_type.get("contract"), Some(&3));
        assert_eq!(stats.total_risks, 0);
    }

    #[test]
    fn usage_stats_null_counters() {
        let stats: UsageStats = serde_json::from_str(
            r#"{"total_documents": null, "by_type": null, "total_risks": null}"#,
        )
        .unwrap();
        assert_eq!(stats.total_documents, 0);
        assert!(stats.by_type.is_empty());
        assert_eq!(stats.total_risks, 0);
    }
}
