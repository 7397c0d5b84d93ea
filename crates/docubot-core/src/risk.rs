//! Severity policy shared by the live result view and the history list.

use crate::locale::Locale;
use crate::model::{RiskFlag, RiskLevel};

/// Bucket for a number of risks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskBucket {
    None,
    Low,
    High,
}

/// Display color for a bucket or a single flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskColor {
    Green,
    Amber,
    Red,
}

impl RiskColor {
    /// RGB components in `0.0..=1.0`.
    pub fn rgb(&self) -> (f32, f32, f32) {
        match self {
            Self::Green => (0.0, 0.6, 0.35),
            Self::Amber => (0.9, 0.55, 0.0),
            Self::Red => (0.85, 0.15, 0.15),
        }
    }
}

impl RiskBucket {
    pub fn color(&self) -> RiskColor {
        match self {
            Self::None => RiskColor::Green,
            Self::Low => RiskColor::Amber,
            Self::High => RiskColor::Red,
        }
    }
}

/// `0 → None`, `1..=2 → Low`, `3.. → High`.
pub fn color_bucket(count: usize) -> RiskBucket {
    match count {
        0 => RiskBucket::None,
        1..=2 => RiskBucket::Low,
        _ => RiskBucket::High,
    }
}

/// Unknown levels are colored like `Low`.
pub fn level_color(level: RiskLevel) -> RiskColor {
    match level {
        RiskLevel::Low | RiskLevel::Unknown => RiskColor::Green,
        RiskLevel::Medium => RiskColor::Amber,
        RiskLevel::High => RiskColor::Red,
    }
}

/// Uppercase localized severity name.
pub fn level_label(level: RiskLevel, locale: &Locale) -> String {
    locale.level_name(level).to_uppercase()
}

/// Flag heading such as `HIGH - financial`.
pub fn flag_heading(flag: &RiskFlag, locale: &Locale) -> String {
    format!("{} - {}", level_label(flag.level, locale), flag.category)
}
