use docubot_client::ClientError;
use docubot_core::Locale;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no file selected")]
    NoFileSelected,

    #[error("file is {size} bytes, limit is {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("export failed: {0}")]
    ExportFailure(String),
}

impl SessionError {
    /// The text shown to the user for this error.
    pub fn user_message(&self, locale: &Locale) -> String {
        match self {
            Self::NoFileSelected => locale.t("selectFile").to_string(),
            Self::FileTooLarge { size, limit } => format!(
                "{} ({} > {} MB)",
                locale.t("fileTooLarge"),
                megabytes(*size),
                megabytes(*limit)
            ),
            Self::Client(ClientError::Network(_)) => locale.t("networkError").to_string(),
            Self::Client(ClientError::Server { message, .. }) if !message.trim().is_empty() => {
                format!("{}: {}", locale.t("analysisError"), message.trim())
            }
            Self::Client(ClientError::Server { .. }) => locale.t("analysisError").to_string(),
            Self::Client(ClientError::Malformed(_)) => locale.t("malformedResult").to_string(),
            Self::Client(ClientError::Io { path, .. }) => {
                format!("{}: {}", locale.t("analysisError"), path.display())
            }
            Self::ExportFailure(detail) => format!("{}: {detail}", locale.t("exportError")),
        }
    }
}

fn megabytes(bytes: u64) -> String {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    if mb.fract() == 0.0 {
        format!("{mb:.0}")
    } else {
        format!("{mb:.1}")
    }
}
