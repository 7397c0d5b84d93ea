//! Display formatting for confidence, money and dates.

use chrono::{DateTime, NaiveDate, Utc};

use crate::locale::{Language, Locale};

/// Confidence as a whole percentage, rounding half up: 0.875 → "88%".
pub fn format_confidence(score: f64) -> String {
    let pct = (score.clamp(0.0, 1.0) * 100.0).round() as i64;
    format!("{pct}%")
}

/// Amount with locale thousands grouping and an explicit currency code.
///
/// Decimals are shown only when the amount has a fractional part.
/// `currency` falls back to `default_currency` when absent or blank.
pub fn format_amount(
    amount: f64,
    currency: Option<&str>,
    default_currency: &str,
    locale: &Locale,
) -> String {
    let (group_sep, decimal_sep) = match locale.language() {
        Language::Ru => (' ', ','),
        Language::En => (',', '.'),
    };

    let cents = (amount.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3 + 4);
    if amount < 0.0 && cents > 0 {
        grouped.push('-');
    }
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(group_sep);
        }
        grouped.push(c);
    }
    if frac > 0 {
        grouped.push(decimal_sep);
        grouped.push_str(&format!("{frac:02}"));
    }

    let code = currency
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(default_currency);
    format!("{grouped} {code}")
}

/// Calendar date in the session locale: `21.02.2026` or `02/21/2026`.
pub fn format_date(ts: &DateTime<Utc>, locale: &Locale) -> String {
    ts.format(date_pattern(locale)).to_string()
}

/// Format an ISO `YYYY-MM-DD` date string; anything else passes through.
pub fn format_date_str(raw: &str, locale: &Locale) -> String {
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => date.format(date_pattern(locale)).to_string(),
        Err(_) => raw.to_string(),
    }
}

fn date_pattern(locale: &Locale) -> &'static str {
    match locale.language() {
        Language::Ru => "%d.%m.%Y",
        Language::En => "%m/%d/%Y",
    }
}
