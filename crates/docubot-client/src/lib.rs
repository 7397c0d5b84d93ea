//! Client side of the analysis service: upload, history, stats and
//! server-rendered reports.

mod error;
pub mod http;
mod service;

pub use error::ClientError;
pub use http::{AnalysisClient, ClientConfig};
pub use service::{Analysis, AnalysisService, Upload};
