//! Section-by-section rendering of an [`AnalysisResult`] into a [`Report`].
//!
//! Optional sections (financial, rental, applicant, obligations,
//! recommendations) are emitted only when their backing record has at
//! least one present field; there are no empty headers.

use chrono::{DateTime, Utc};
use docubot_core::{
    AnalysisResult, Locale, color_bucket, flag_heading, format_amount, format_confidence,
    format_date, format_date_str, level_color,
};
use tracing::debug;

use crate::layout::{Cursor, PageGeometry, Pagination, Report, Tone};

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub geometry: PageGeometry,
    /// Used when the result carries no currency code.
    pub default_currency: String,
    pub pagination: Pagination,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::default(),
            default_currency: "RUB".to_string(),
            pagination: Pagination::Paged,
        }
    }
}

pub struct ReportRenderer {
    config: ReportConfig,
}

impl ReportRenderer {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn render(&self, result: &AnalysisResult, locale: &Locale) -> Report {
        self.render_at(result, locale, Utc::now())
    }

    /// Render with an explicit generation timestamp.
    pub fn render_at(
        &self,
        result: &AnalysisResult,
        locale: &Locale,
        generated_at: DateTime<Utc>,
    ) -> Report {
        let geometry = self.config.geometry;
        let mut c = Cursor::new(geometry, self.config.pagination);
        let section_gap = geometry.line_height / 2.0;

        c.title_band(
            locale.t("reportTitle"),
            &format!(
                "{}: {}",
                locale.t("generated"),
                format_date(&generated_at, locale)
            ),
        );

        self.basic_info(&mut c, result, locale);
        c.gap(section_gap);

        let money = |amount: f64| self.money(amount, result, locale);

        if let Some(terms) = result.financial() {
            c.header(locale.t("financialTerms"), Tone::Accent);
            let rate = terms.interest_rate.map(|r| format!("{r}%"));
            field(&mut c, locale, "interestRate", rate);
            field(&mut c, locale, "loanTerm", terms.loan_term.clone());
            field(&mut c, locale, "monthlyPayment", terms.monthly_payment.map(money));
            field(&mut c, locale, "penalties", terms.penalties.clone());
            field(&mut c, locale, "paymentSchedule", terms.payment_schedule.clone());
            c.gap(section_gap);
        }

        if let Some(terms) = result.rental() {
            c.header(locale.t("rentalTerms"), Tone::Accent);
            field(&mut c, locale, "monthlyRent", terms.monthly_rent.map(money));
            field(&mut c, locale, "deposit", terms.deposit.map(money));
            field(&mut c, locale, "utilities", terms.utilities.clone());
            field(&mut c, locale, "leaseDuration", terms.lease_duration.clone());
            c.gap(section_gap);
        }

        if let Some(info) = result.applicant() {
            c.header(locale.t("applicant"), Tone::Accent);
            field(&mut c, locale, "fullName", info.full_name.clone());
            let birth_date = info.birth_date.as_deref().map(|d| format_date_str(d, locale));
            field(&mut c, locale, "birthDate", birth_date);
            field(&mut c, locale, "passport", info.passport.clone());
            field(&mut c, locale, "taxId", info.tax_id.clone());
            field(&mut c, locale, "socialInsuranceId", info.social_insurance_id.clone());
            field(&mut c, locale, "phone", info.phone.clone());
            field(&mut c, locale, "email", info.email.clone());
            field(&mut c, locale, "monthlyIncome", info.monthly_income.map(money));
            field(&mut c, locale, "employment", info.employment.clone());
            field(&mut c, locale, "maritalStatus", info.marital_status.clone());
            field(&mut c, locale, "childrenCount", info.children_count.map(|n| n.to_string()));
            c.gap(section_gap);
        }

        if !result.obligations.is_empty() {
            c.header(locale.t("obligations"), Tone::Accent);
            numbered(&mut c, &result.obligations);
            c.gap(section_gap);
        }

        let risk_count = result.risk_flags.len();
        c.header(
            &format!("{} ({risk_count})", locale.t("risks")),
            Tone::Risk(color_bucket(risk_count).color()),
        );
        if result.risk_flags.is_empty() {
            c.line(locale.t("noRisks"), 0, Tone::Muted, false);
        }
        for flag in &result.risk_flags {
            c.line(&flag_heading(flag, locale), 0, Tone::Risk(level_color(flag.level)), true);
            if !flag.description.is_empty() {
                c.paragraph(&flag.description, 2, Tone::Normal);
            }
            if !flag.suggestion.is_empty() {
                c.paragraph(
                    &format!("{}: {}", locale.t("suggestion"), flag.suggestion),
                    2,
                    Tone::Muted,
                );
            }
            c.gap(geometry.line_height / 3.0);
        }
        c.gap(section_gap);

        if !result.action_items.is_empty() {
            c.header(locale.t("recommendations"), Tone::Accent);
            numbered(&mut c, &result.action_items);
            c.gap(section_gap);
        }

        c.header(locale.t("summary"), Tone::Accent);
        c.paragraph(&result.summary, 0, Tone::Normal);
        c.gap(section_gap);

        c.header(locale.t("confidence"), Tone::Accent);
        c.line(&format_confidence(result.confidence_score), 0, Tone::Normal, true);

        let pages = c.finish(|page, total| {
            format!(
                "DocuBot AI · {} · {} {page}/{total}",
                locale.t("disclaimer"),
                locale.t("page")
            )
        });
        debug!(pages = pages.len(), "report rendered");

        Report { geometry, pages }
    }

    fn basic_info(&self, c: &mut Cursor, result: &AnalysisResult, locale: &Locale) {
        c.header(locale.t("basicInfo"), Tone::Accent);
        field(c, locale, "type", Some(locale.doc_type_label(&result.document_type)));
        field(c, locale, "subtype", result.document_subtype.clone());

        let parties = if result.parties.is_empty() {
            "—".to_string()
        } else {
            result.parties.join(", ")
        };
        field(c, locale, "parties", Some(parties));

        let amount = match result.total_amount {
            Some(a) => self.money(a, result, locale),
            None => locale.t("notSpecified").to_string(),
        };
        field(c, locale, "amount", Some(amount));

        for (role, date) in result.dates.present() {
            let key = format!("date.{role}");
            let label = match locale.t(&key) {
                found if found != key => found.to_string(),
                _ => role.to_string(),
            };
            c.paragraph(&format!("{label}: {}", format_date_str(date, locale)), 0, Tone::Normal);
        }
    }

    fn money(&self, amount: f64, result: &AnalysisResult, locale: &Locale) -> String {
        format_amount(
            amount,
            result.currency.as_deref(),
            &self.config.default_currency,
            locale,
        )
    }
}

/// `Label: value`, wrapped; skipped when the value is absent.
fn field(c: &mut Cursor, locale: &Locale, key: &str, value: Option<String>) {
    if let Some(value) = value {
        c.paragraph(&format!("{}: {value}", locale.t(key)), 0, Tone::Normal);
    }
}

/// `1. first`, `2. second`, ... in original order.
fn numbered(c: &mut Cursor, items: &[String]) {
    for (index, item) in items.iter().enumerate() {
        c.paragraph(&format!("{}. {item}", index + 1), 0, Tone::Normal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ElementKind;
    use chrono::TimeZone;
    use docubot_core::{Language, normalize};
    use serde_json::json;

    fn renderer() -> ReportRenderer {
        ReportRenderer::new(ReportConfig::default())
    }

    fn en() -> Locale {
        Locale::new(Language::En)
    }

    fn generated() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 21, 12, 0, 0).unwrap()
    }

    fn lease() -> AnalysisResult {
        normalize(&json!({
            "extracted_data": {
                "document_type": "contract",
                "parties": ["Landlord LLC", "Anna Smirnova"],
                "total_amount": 540000,
                "dates": {"signature": "2026-01-10"},
                "financial_terms": {},
                "rental_terms": {"monthly_rent": 45000, "deposit": 45000}
            },
            "risk_flags": [
                {
                    "level": "high",
                    "category": "financial",
                    "description": "Deposit is not refundable under any circumstances",
                    "suggestion": "Negotiate refund terms"
                },
                {"level": "bogus", "category": "legal", "description": "", "suggestion": ""}
            ],
            "action_items": ["Check the deposit clause", "Ask for an inventory list"],
            "summary": "Residential lease for eleven months with a fixed monthly rent.",
            "confidence_score": 0.875
        }))
        .unwrap()
    }

    fn headers(report: &Report) -> Vec<String> {
        report
            .elements()
            .filter(|e| e.kind == ElementKind::SectionHeader)
            .map(|e| e.text.clone())
            .collect()
    }

    #[test]
    fn sections_in_order_and_empty_records_omitted() {
        let report = renderer().render_at(&lease(), &en(), generated());
        assert_eq!(
            headers(&report),
            vec![
                "Basic Information",
                "Rental Terms",
                "Risks (2)",
                "Recommendations",
                "Summary",
                "Confidence"
            ]
        );
        assert!(!report.contains_text("Financial Terms"));
    }

    #[test]
    fn values_are_formatted() {
        let report = renderer().render_at(&lease(), &en(), generated());
        assert!(report.contains_text("Amount: 540,000 RUB"));
        assert!(report.contains_text("Monthly rent: 45,000 RUB"));
        assert!(report.contains_text("Signature date: 01/10/2026"));
        assert!(report.contains_text("HIGH - financial"));
        assert!(report.contains_text("UNKNOWN - legal"));
        assert!(report.contains_text("1. Check the deposit clause"));
        assert!(report.contains_text("2. Ask for an inventory list"));
        assert!(report.contains_text("88%"));
        assert!(report.contains_text("Generated: 02/21/2026"));
    }

    #[test]
    fn default_currency_is_configurable() {
        let renderer = ReportRenderer::new(ReportConfig {
            default_currency: "EUR".into(),
            ..ReportConfig::default()
        });
        let report = renderer.render_at(&lease(), &en(), generated());
        assert!(report.contains_text("Amount: 540,000 EUR"));
    }

    #[test]
    fn missing_amount_and_parties() {
        let result = normalize(&json!({
            "document_type": "act",
            "risk_flags": [],
            "summary": "Acceptance act.",
            "confidence_score": 0.5
        }))
        .unwrap();
        let report = renderer().render_at(&result, &en(), generated());
        assert!(report.contains_text("Amount: Not specified"));
        assert!(report.contains_text("Parties: —"));
        assert!(report.contains_text("No risks found"));
        assert!(report.contains_text("Type: Act"));
        assert!(!headers(&report).contains(&"Recommendations".to_string()));
    }

    #[test]
    fn long_text_wraps_within_usable_width() {
        let mut result = lease();
        result.summary = "word ".repeat(1500);
        let report = renderer().render_at(&result, &en(), generated());
        let columns = report.geometry.columns();
        for el in report.elements().filter(|e| e.kind == ElementKind::Line) {
            assert!(el.text.chars().count() + el.indent <= columns || !el.text.contains(' '));
        }
        assert!(report.pages.len() > 1);
    }

    #[test]
    fn single_page_mode_keeps_one_page() {
        let mut result = lease();
        result.summary = "word ".repeat(1500);
        let renderer = ReportRenderer::new(ReportConfig {
            pagination: Pagination::SinglePage,
            ..ReportConfig::default()
        });
        let report = renderer.render_at(&result, &en(), generated());
        assert_eq!(report.pages.len(), 1);
    }

    #[test]
    fn every_page_has_a_footer() {
        let mut result = lease();
        result.summary = "word ".repeat(1500);
        let report = renderer().render_at(&result, &en(), generated());
        let total = report.pages.len();
        for (i, page) in report.pages.iter().enumerate() {
            let footer = page.elements.last().unwrap();
            assert_eq!(footer.kind, ElementKind::Footer);
            assert!(footer.text.ends_with(&format!("{}/{total}", i + 1)));
        }
    }
}
