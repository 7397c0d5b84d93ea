//! One user session: the upload/analyze/export state machine and the
//! history listing. Every failure below this layer ends up here as a
//! localized message.

mod controller;
mod error;
mod history;
#[cfg(test)]
mod testing;

pub use controller::{ExportKind, ExportState, UploadController, UploadState, UploadView};
pub use error::SessionError;
pub use history::{HistoryListing, HistoryRow, HistoryView};
