//! Report rendering: lays an analysis result out on pages with a vertical
//! cursor, then serializes the pages as PDF or plain text.

mod error;
mod font;
pub mod layout;
mod pdf;
pub mod render;
mod text;

pub use error::ReportError;
pub use layout::{Element, ElementKind, Page, PageGeometry, Pagination, Report, Tone, wrap_text};
pub use render::{ReportConfig, ReportRenderer};
