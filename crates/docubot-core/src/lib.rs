pub mod format;
pub mod history;
pub mod locale;
pub mod model;
pub mod risk;

pub use format::{format_amount, format_confidence, format_date, format_date_str};
pub use history::{HistoryEntry, UsageStats, parse_timestamp};
pub use locale::{Language, Locale};
pub use model::{
    AnalysisResult, ApplicantInfo, Dates, FinancialTerms, MalformedResult, RentalTerms, RiskFlag,
    RiskLevel, normalize,
};
pub use risk::{RiskBucket, RiskColor, color_bucket, flag_heading, level_color, level_label};
