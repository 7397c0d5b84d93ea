//! Terminal cards for analysis results, history and usage stats.
//!
//! Sections with nothing to show are skipped entirely. Risk colors use
//! ANSI escapes when `color` is set.

use docubot_core::{
    AnalysisResult, Locale, RiskColor, UsageStats, color_bucket, flag_heading, format_amount,
    format_confidence, format_date_str, level_color,
};
use docubot_session::{HistoryListing, HistoryRow};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

// ── Public API ──

pub fn print_result_card(
    result: &AnalysisResult,
    filename: &str,
    locale: &Locale,
    default_currency: &str,
    color: bool,
) {
    print!("{}", result_card(result, filename, locale, default_currency, color));
}

pub fn print_history(listing: &HistoryListing, locale: &Locale, color: bool) {
    print!("{}", history_table(listing, locale, color));
}

pub fn print_stats(stats: &UsageStats, locale: &Locale) {
    print!("{}", stats_card(stats, locale));
}

// ── Result card ──

fn result_card(
    result: &AnalysisResult,
    filename: &str,
    locale: &Locale,
    default_currency: &str,
    color: bool,
) -> String {
    let money = |amount: f64| {
        format_amount(amount, result.currency.as_deref(), default_currency, locale)
    };
    let mut out = String::new();

    push_line(&mut out, format!("=== {} ===", locale.t("resultsTitle")));
    push_line(&mut out, format!("{filename}\n"));

    let mut basic = vec![
        row(locale, "type", Some(locale.doc_type_label(&result.document_type))),
        row(locale, "subtype", result.document_subtype.clone()),
    ];
    if !result.parties.is_empty() {
        basic.push(row(locale, "parties", Some(result.parties.join(", "))));
    }
    basic.push(row(
        locale,
        "amount",
        Some(match result.total_amount {
            Some(a) => money(a),
            None => locale.t("notSpecified").to_string(),
        }),
    ));
    for (role, date) in result.dates.present() {
        let key = format!("date.{role}");
        let label = match locale.t(&key) {
            found if found != key => found.to_string(),
            _ => role.to_string(),
        };
        basic.push(Some((label, format_date_str(date, locale))));
    }
    section(&mut out, locale.t("basicInfo"), basic);

    if let Some(t) = result.financial() {
        section(
            &mut out,
            locale.t("financialTerms"),
            vec![
                row(locale, "interestRate", t.interest_rate.map(|r| format!("{r}%"))),
                row(locale, "loanTerm", t.loan_term.clone()),
                row(locale, "monthlyPayment", t.monthly_payment.map(money)),
                row(locale, "penalties", t.penalties.clone()),
                row(locale, "paymentSchedule", t.payment_schedule.clone()),
            ],
        );
    }

    if let Some(t) = result.rental() {
        section(
            &mut out,
            locale.t("rentalTerms"),
            vec![
                row(locale, "monthlyRent", t.monthly_rent.map(money)),
                row(locale, "deposit", t.deposit.map(money)),
                row(locale, "utilities", t.utilities.clone()),
                row(locale, "leaseDuration", t.lease_duration.clone()),
            ],
        );
    }

    if let Some(a) = result.applicant() {
        section(
            &mut out,
            locale.t("applicant"),
            vec![
                row(locale, "fullName", a.full_name.clone()),
                row(
                    locale,
                    "birthDate",
                    a.birth_date.as_deref().map(|d| format_date_str(d, locale)),
                ),
                row(locale, "passport", a.passport.clone()),
                row(locale, "taxId", a.tax_id.clone()),
                row(locale, "socialInsuranceId", a.social_insurance_id.clone()),
                row(locale, "phone", a.phone.clone()),
                row(locale, "email", a.email.clone()),
                row(locale, "monthlyIncome", a.monthly_income.map(money)),
                row(locale, "employment", a.employment.clone()),
                row(locale, "maritalStatus", a.marital_status.clone()),
                row(locale, "childrenCount", a.children_count.map(|n| n.to_string())),
            ],
        );
    }

    numbered(&mut out, locale.t("obligations"), &result.obligations);

    let risk_count = result.risk_flags.len();
    let risks = format!("{} ({risk_count})", locale.t("risks"));
    push_line(&mut out, paint(&risks, color_bucket(risk_count).color(), color));
    if result.risk_flags.is_empty() {
        push_line(&mut out, format!("  {}", locale.t("noRisks")));
    }
    for flag in &result.risk_flags {
        let heading = flag_heading(flag, locale);
        push_line(&mut out, format!("  {}", paint(&heading, level_color(flag.level), color)));
        if !flag.description.is_empty() {
            push_line(&mut out, format!("    {}", flag.description));
        }
        if !flag.suggestion.is_empty() {
            push_line(&mut out, format!("    {}: {}", locale.t("suggestion"), flag.suggestion));
        }
    }
    out.push('\n');

    numbered(&mut out, locale.t("recommendations"), &result.action_items);

    push_line(&mut out, locale.t("summary"));
    push_line(&mut out, format!("  {}\n", result.summary));
    let confidence = format_confidence(result.confidence_score);
    push_line(&mut out, format!("{} {confidence}", locale.t("confidence")));
    out
}

// ── History ──

fn history_table(listing: &HistoryListing, locale: &Locale, color: bool) -> String {
    let mut out = String::new();
    push_line(&mut out, format!("=== {} ===", locale.t("history")));
    match listing {
        HistoryListing::Empty => push_line(&mut out, format!("  {}", locale.t("historyEmpty"))),
        HistoryListing::Failed(message) => push_line(&mut out, format!("  {message}")),
        HistoryListing::Loaded(rows) => {
            for r in rows {
                push_line(&mut out, history_line(r, locale, color));
            }
        }
    }
    out
}

fn history_line(r: &HistoryRow, locale: &Locale, color: bool) -> String {
    let risks = paint(
        &format!("{}: {}", locale.t("riskCount"), r.risk_count),
        r.bucket.color(),
        color,
    );
    format!(
        "  #{:<5} {:<10} {:<32} {}  {:>4}  {risks}",
        r.id, r.title, r.filename, r.date, r.confidence
    )
}

// ── Stats ──

fn stats_card(stats: &UsageStats, locale: &Locale) -> String {
    let mut out = String::new();
    push_line(&mut out, format!("=== {} ===", locale.t("stats")));
    let figures = [
        (locale.t("totalDocuments"), stats.total_documents.to_string()),
        (locale.t("avgConfidence"), format_confidence(stats.avg_confidence)),
        (locale.t("totalRisks"), stats.total_risks.to_string()),
    ];
    for (label, value) in figures {
        push_line(&mut out, format!("  {label:<26} {value}"));
    }
    for (doc_type, count) in stats.by_type.iter().filter(|(_, n)| **n > 0) {
        push_line(&mut out, format!("    {:<24} {count}", locale.doc_type_label(doc_type)));
    }
    out
}

// ── Helpers ──

fn push_line(out: &mut String, line: impl AsRef<str>) {
    out.push_str(line.as_ref());
    out.push('\n');
}

fn row(locale: &Locale, key: &str, value: Option<String>) -> Option<(String, String)> {
    value.map(|v| (locale.t(key).to_string(), v))
}

fn section(out: &mut String, header: &str, rows: Vec<Option<(String, String)>>) {
    let rows: Vec<(String, String)> = rows.into_iter().flatten().collect();
    if rows.is_empty() {
        return;
    }
    push_line(out, header);
    for (label, value) in rows {
        push_line(out, format!("  {:<26} {value}", format!("{label}:")));
    }
    out.push('\n');
}

fn numbered(out: &mut String, header: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    push_line(out, header);
    for (i, item) in items.iter().enumerate() {
        push_line(out, format!("  {}. {item}", i + 1));
    }
    out.push('\n');
}

fn paint(text: &str, risk: RiskColor, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    let code = match risk {
        RiskColor::Green => "\x1b[32m",
        RiskColor::Amber => "\x1b[33m",
        RiskColor::Red => "\x1b[31m",
    };
    format!("{BOLD}{code}{text}{RESET}")
}
