use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("pdf encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("embedded font is unreadable: {0}")]
    Font(#[from] ttf_parser::FaceParsingError),

    #[error("pdf write failed: {0}")]
    Io(#[from] std::io::Error),
}
