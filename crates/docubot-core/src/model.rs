//! Typed analysis result and the `normalize` boundary that builds it.
//!
//! The analysis service answers with loosely-structured JSON: most of the
//! extracted data sits under `extracted_data`, optional records may be
//! missing or partially filled, and numbers sometimes arrive as strings.
//! Everything past [`normalize`] works on [`AnalysisResult`] and never
//! touches raw JSON again.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

/// The payload is missing, or has a wrongly-typed, mandatory field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedResult {
    #[error("analysis payload is not a JSON object")]
    NotAnObject,
    #[error("response body is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("missing mandatory field `{0}`")]
    Missing(&'static str),
    #[error("field `{field}` should be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

/// Severity of a single risk flag.
///
/// Anything the service sends outside `low|medium|high` becomes `Unknown`,
/// which is displayed with an "unknown" label and classified like `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskLevel {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskFlag {
    pub level: RiskLevel,
    pub category: String,
    pub description: String,
    pub suggestion: String,
}

/// Named date roles found in the document. Roles outside the four known
/// ones (e.g. `deadline`) are kept in `other`, ordered by role name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dates {
    pub signature: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub payment_due: Option<String>,
    pub other: BTreeMap<String, String>,
}

impl Dates {
    pub fn is_empty(&self) -> bool {
        self.signature.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.payment_due.is_none()
            && self.other.is_empty()
    }

    /// Present roles in display order: known roles first, then the rest.
    pub fn present(&self) -> Vec<(&str, &str)> {
        let known = [
            ("signature", &self.signature),
            ("start", &self.start),
            ("end", &self.end),
            ("paymentDue", &self.payment_due),
        ];
        let mut out: Vec<(&str, &str)> = known
            .into_iter()
            .filter_map(|(role, value)| value.as_deref().map(|v| (role, v)))
            .collect();
        out.extend(self.other.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancialTerms {
    pub interest_rate: Option<f64>,
    pub loan_term: Option<String>,
    pub monthly_payment: Option<f64>,
    pub penalties: Option<String>,
    pub payment_schedule: Option<String>,
}

impl FinancialTerms {
    pub fn is_empty(&self) -> bool {
        self.interest_rate.is_none()
            && self.loan_term.is_none()
            && self.monthly_payment.is_none()
            && self.penalties.is_none()
            && self.payment_schedule.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RentalTerms {
    pub monthly_rent: Option<f64>,
    pub deposit: Option<f64>,
    pub utilities: Option<String>,
    pub lease_duration: Option<String>,
}

impl RentalTerms {
    pub fn is_empty(&self) -> bool {
        self.monthly_rent.is_none()
            && self.deposit.is_none()
            && self.utilities.is_none()
            && self.lease_duration.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApplicantInfo {
    pub full_name: Option<String>,
    pub birth_date: Option<String>,
    pub passport: Option<String>,
    pub tax_id: Option<String>,
    pub social_insurance_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub monthly_income: Option<f64>,
    pub employment: Option<String>,
    pub marital_status: Option<String>,
    pub children_count: Option<u32>,
}

impl ApplicantInfo {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.birth_date.is_none()
            && self.passport.is_none()
            && self.tax_id.is_none()
            && self.social_insurance_id.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.monthly_income.is_none()
            && self.employment.is_none()
            && self.marital_status.is_none()
            && self.children_count.is_none()
    }
}

/// One analysis outcome. Read-only once built; replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub document_type: String,
    pub document_subtype: Option<String>,
    pub parties: Vec<String>,
    pub total_amount: Option<f64>,
    pub currency: Option<String>,
    pub dates: Dates,
    pub obligations: Vec<String>,
    pub financial_terms: Option<FinancialTerms>,
    pub rental_terms: Option<RentalTerms>,
    pub applicant_info: Option<ApplicantInfo>,
    pub risk_flags: Vec<RiskFlag>,
    pub action_items: Vec<String>,
    pub summary: String,
    /// Always within `0.0..=1.0`.
    pub confidence_score: f64,
}

impl AnalysisResult {
    /// Financial terms, only when at least one field is present.
    pub fn financial(&self) -> Option<&FinancialTerms> {
        self.financial_terms.as_ref().filter(|t| !t.is_empty())
    }

    /// Rental terms, only when at least one field is present.
    pub fn rental(&self) -> Option<&RentalTerms> {
        self.rental_terms.as_ref().filter(|t| !t.is_empty())
    }

    /// Applicant record, only when at least one field is present.
    pub fn applicant(&self) -> Option<&ApplicantInfo> {
        self.applicant_info.as_ref().filter(|t| !t.is_empty())
    }
}

/// Build an [`AnalysisResult`] from the raw `result` object of an analyze
/// response.
///
/// Optional fields never fail: absent, null, blank or wrongly-typed values
/// all become `None` (or an empty collection). Only `document_type`,
/// `summary`, `confidence_score` and `risk_flags` are mandatory.
pub fn normalize(raw: &Value) -> Result<AnalysisResult, MalformedResult> {
    let root = raw.as_object().ok_or(MalformedResult::NotAnObject)?;
    let extracted = lookup(root, None, "extracted_data").and_then(Value::as_object);
    let field = |key: &str| lookup(root, extracted, key);

    let document_type = required_str(field("document_type"), "document_type")?;
    let summary = required_str(field("summary"), "summary")?;

    let confidence_score = match field("confidence_score") {
        None => return Err(MalformedResult::Missing("confidence_score")),
        Some(v) => v.as_f64().ok_or(MalformedResult::WrongType {
            field: "confidence_score",
            expected: "a number",
        })?,
    };
    let confidence_score = if (0.0..=1.0).contains(&confidence_score) {
        confidence_score
    } else {
        warn!(confidence_score, "confidence score out of range, clamping");
        confidence_score.clamp(0.0, 1.0)
    };

    let risk_flags = match field("risk_flags") {
        None => return Err(MalformedResult::Missing("risk_flags")),
        Some(Value::Array(items)) => items.iter().filter_map(risk_flag).collect(),
        Some(_) => {
            return Err(MalformedResult::WrongType {
                field: "risk_flags",
                expected: "an array",
            });
        }
    };

    let mut financial_terms = field("financial_terms")
        .and_then(Value::as_object)
        .map(financial_terms);
    if let Some(penalties) = text(field("penalties")) {
        let terms = financial_terms.get_or_insert_with(FinancialTerms::default);
        if terms.penalties.is_none() {
            terms.penalties = Some(penalties);
        }
    }

    Ok(AnalysisResult {
        document_type,
        document_subtype: text(field("document_subtype")),
        parties: string_list(field("parties")),
        total_amount: number(field("total_amount")),
        currency: text(field("currency")),
        dates: field("dates")
            .and_then(Value::as_object)
            .map(dates)
            .unwrap_or_default(),
        obligations: string_list(field("obligations")),
        financial_terms,
        rental_terms: field("rental_terms")
            .and_then(Value::as_object)
            .map(rental_terms),
        applicant_info: field("applicant_info")
            .and_then(Value::as_object)
            .map(applicant_info),
        risk_flags,
        action_items: string_list(field("action_items")),
        summary,
        confidence_score,
    })
}

// ── Record builders ──

fn risk_flag(value: &Value) -> Option<RiskFlag> {
    let Some(obj) = value.as_object() else {
        warn!(?value, "skipping risk flag that is not an object");
        return None;
    };
    let get = |key: &str| lookup(obj, None, key);
    Some(RiskFlag {
        level: get("level")
            .and_then(Value::as_str)
            .map(RiskLevel::parse)
            .unwrap_or(RiskLevel::Low),
        category: text(get("category")).unwrap_or_else(|| "other".to_string()),
        description: text(get("description")).unwrap_or_default(),
        suggestion: text(get("suggestion")).unwrap_or_default(),
    })
}

fn dates(obj: &Map<String, Value>) -> Dates {
    let mut out = Dates::default();
    for (role, value) in obj {
        let Some(value) = text(Some(value)) else {
            continue;
        };
        match role.as_str() {
            "signature" => out.signature = Some(value),
            "start" => out.start = Some(value),
            "end" => out.end = Some(value),
            "payment_due" | "paymentDue" => out.payment_due = Some(value),
            _ => {
                out.other.insert(role.clone(), value);
            }
        }
    }
    out
}

fn financial_terms(obj: &Map<String, Value>) -> FinancialTerms {
    let get = |key: &str| lookup(obj, None, key);
    FinancialTerms {
        interest_rate: number(get("interest_rate")),
        loan_term: text(get("loan_term")),
        monthly_payment: number(get("monthly_payment")),
        penalties: text(get("penalties")),
        payment_schedule: text(get("payment_schedule")),
    }
}

fn rental_terms(obj: &Map<String, Value>) -> RentalTerms {
    let get = |key: &str| lookup(obj, None, key);
    RentalTerms {
        monthly_rent: number(get("monthly_rent")),
        deposit: number(get("deposit")),
        utilities: text(get("utilities")),
        lease_duration: text(get("lease_duration")),
    }
}

fn applicant_info(obj: &Map<String, Value>) -> ApplicantInfo {
    let get = |key: &str| lookup(obj, None, key);
    ApplicantInfo {
        full_name: text(get("full_name")),
        birth_date: text(get("birth_date")),
        passport: text(get("passport")),
        tax_id: text(get("tax_id")),
        social_insurance_id: text(get("social_insurance_id")),
        phone: text(get("phone")),
        email: text(get("email")),
        monthly_income: number(get("monthly_income")),
        employment: text(get("employment")),
        marital_status: text(get("marital_status")),
        children_count: count(get("children_count")),
    }
}

// ── JSON extraction helpers ──

/// Find a non-null value by its snake_case key (or camelCase alias),
/// preferring `primary` over `fallback`.
fn lookup<'a>(
    fallback: &'a Map<String, Value>,
    primary: Option<&'a Map<String, Value>>,
    key: &str,
) -> Option<&'a Value> {
    let camel = camel_case(key);
    let find = |obj: &'a Map<String, Value>| {
        obj.get(key)
            .or_else(|| obj.get(&camel))
            .filter(|v| !v.is_null())
    };
    primary.and_then(find).or_else(|| find(fallback))
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn required_str(value: Option<&Value>, field: &'static str) -> Result<String, MalformedResult> {
    match value {
        None => Err(MalformedResult::Missing(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(MalformedResult::WrongType {
            field,
            expected: "a string",
        }),
    }
}

/// Non-blank string, or a number rendered as text.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A JSON number, or a string that parses as one.
fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(' ', "").parse().ok(),
        _ => None,
    };
    n.filter(|n: &f64| n.is_finite())
}

/// A non-negative integer.
fn count(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(|v| text(Some(v))).collect(),
        _ => Vec::new(),
    }
}
