//! Display rows for the analysis history.

use docubot_client::AnalysisService;
use docubot_core::{
    HistoryEntry, Locale, RiskBucket, color_bucket, format_confidence, format_date,
};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub id: i64,
    /// Localized document type.
    pub title: String,
    pub filename: String,
    pub date: String,
    pub confidence: String,
    pub risk_count: u32,
    pub bucket: RiskBucket,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryListing {
    /// The service has no analyses yet.
    Empty,
    /// Rows in server order.
    Loaded(Vec<HistoryRow>),
    /// Localized message; the session carries on.
    Failed(String),
}

pub struct HistoryView;

impl HistoryView {
    /// Build rows for `entries` without reordering them.
    pub fn list(entries: &[HistoryEntry], locale: &Locale) -> HistoryListing {
        if entries.is_empty() {
            return HistoryListing::Empty;
        }
        let rows = entries
            .iter()
            .map(|entry| HistoryRow {
                id: entry.id,
                title: locale.doc_type_label(&entry.document_type),
                filename: entry.filename.clone(),
                date: format_date(&entry.created_at, locale),
                confidence: format_confidence(entry.confidence_score),
                risk_count: entry.risk_count,
                bucket: color_bucket(entry.risk_count as usize),
            })
            .collect();
        HistoryListing::Loaded(rows)
    }

    pub async fn load<S>(service: &S, limit: Option<u32>, locale: &Locale) -> HistoryListing
    where
        S: AnalysisService + ?Sized,
    {
        match service.fetch_history(limit).await {
            Ok(entries) => {
                info!(count = entries.len(), "history loaded");
                Self::list(&entries, locale)
            }
            Err(err) => {
                warn!(error = %err, "history fetch failed");
                HistoryListing::Failed(locale.t("historyError").to_string())
            }
        }
    }
}

impl HistoryListing {
    pub fn rows(&self) -> &[HistoryRow] {
        match self {
            Self::Loaded(rows) => rows,
            Self::Empty | Self::Failed(_) => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeService, entry};
    use docubot_core::Language;

    #[test]
    fn keeps_server_order() {
        let entries = vec![entry(3, "contract", 2), entry(1, "invoice", 0)];
        let listing = HistoryView::list(&entries, &Locale::new(Language::En));
        let ids: Vec<i64> = listing.rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn rows_are_formatted_for_the_locale() {
        let entries = vec![entry(3, "contract", 2), entry(4, "lease-addendum", 5)];

        let ru = HistoryView::list(&entries, &Locale::new(Language::Ru));
        let row = &ru.rows()[0];
        assert_eq!(row.title, "Договор");
        assert_eq!(row.date, "23.02.2026");
        assert_eq!(row.confidence, "88%");
        assert_eq!(row.bucket, RiskBucket::Low);

        let en = HistoryView::list(&entries, &Locale::new(Language::En));
        assert_eq!(en.rows()[0].title, "Contract");
        assert_eq!(en.rows()[0].date, "02/23/2026");
        assert_eq!(en.rows()[1].title, "lease-addendum");
        assert_eq!(en.rows()[1].bucket, RiskBucket::High);
    }

    #[test]
    fn empty_is_its_own_state() {
        assert_eq!(
            HistoryView::list(&[], &Locale::default()),
            HistoryListing::Empty
        );
    }

    #[tokio::test]
    async fn load_maps_failure_to_message() {
        let service = FakeService {
            fail_history: true,
            ..FakeService::default()
        };
        let listing = HistoryView::load(&service, None, &Locale::new(Language::En)).await;
        assert_eq!(listing, HistoryListing::Failed("Error loading data".into()));
    }

    #[tokio::test]
    async fn load_passes_limit() {
        let service = FakeService {
            history: vec![entry(5, "act", 0), entry(4, "act", 1), entry(3, "act", 3)],
            ..FakeService::default()
        };
        let listing = HistoryView::load(&service, Some(2), &Locale::new(Language::En)).await;
        assert_eq!(listing.rows().len(), 2);
        assert_eq!(listing.rows()[0].bucket, RiskBucket::None);
    }
}
