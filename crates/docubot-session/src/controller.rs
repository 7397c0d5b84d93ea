//! Upload → analyze → export state machine.
//!
//! The state is the only concurrency guard: while an analysis is
//! `Submitting` further analyze triggers are ignored, and while an export
//! is `Exporting` further export triggers are ignored. Calls are never
//! retried automatically; a failed step waits for the user to trigger it
//! again.

use std::sync::Arc;

use docubot_client::{Analysis, AnalysisService, ClientError, Upload};
use docubot_core::Locale;
use docubot_report::ReportRenderer;
use tracing::{debug, info, warn};

use crate::SessionError;

#[derive(Debug)]
pub enum UploadState {
    Idle,
    FileSelected {
        upload: Upload,
    },
    Submitting {
        upload: Upload,
    },
    Success {
        analysis: Arc<Analysis>,
        upload: Upload,
    },
    Failed {
        error: SessionError,
        /// Still selected, so the user can retry without picking it again.
        upload: Option<Upload>,
    },
}

#[derive(Debug, Default)]
pub enum ExportState {
    #[default]
    Idle,
    Exporting,
    Failed(SessionError),
}

/// Where a report comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Rendered locally as PDF.
    Pdf,
    /// Rendered locally as plain text.
    Text,
    /// Fetched from the server's report endpoint; needs an analysis id.
    Server,
}

/// What the presentation layer needs to draw the upload panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadView {
    pub selected_file: Option<String>,
    pub analyze_enabled: bool,
    pub analyze_label: String,
    pub export_enabled: bool,
    pub export_label: String,
    pub error_message: Option<String>,
}

pub struct UploadController {
    state: UploadState,
    export: ExportState,
    max_upload_bytes: u64,
}

impl UploadController {
    pub fn new(max_upload_bytes: u64) -> Self {
        Self {
            state: UploadState::Idle,
            export: ExportState::Idle,
            max_upload_bytes,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn export_state(&self) -> &ExportState {
        &self.export
    }

    /// The last successful analysis, if the session is in `Success`.
    pub fn analysis(&self) -> Option<&Arc<Analysis>> {
        match &self.state {
            UploadState::Success { analysis, .. } => Some(analysis),
            _ => None,
        }
    }

    pub fn select_file(&mut self, upload: Upload) {
        if self.is_submitting() {
            debug!(filename = %upload.filename, "file selection ignored while submitting");
            return;
        }
        self.export = ExportState::Idle;

        if upload.len() > self.max_upload_bytes {
            warn!(
                filename = %upload.filename,
                size = upload.len(),
                limit = self.max_upload_bytes,
                "file rejected: too large"
            );
            self.state = UploadState::Failed {
                error: SessionError::FileTooLarge {
                    size: upload.len(),
                    limit: self.max_upload_bytes,
                },
                upload: None,
            };
            return;
        }
        if !upload.looks_like_pdf() {
            warn!(filename = %upload.filename, "selected file does not look like a PDF");
        }
        self.state = UploadState::FileSelected { upload };
    }

    pub fn clear_file(&mut self) {
        if self.is_submitting() {
            debug!("clear ignored while submitting");
            return;
        }
        self.state = UploadState::Idle;
        self.export = ExportState::Idle;
    }

    /// Move to `Submitting` and hand out the upload to send.
    ///
    /// Returns `None` when a submission is already outstanding (the trigger
    /// is ignored) or when no file is selected (the state becomes
    /// `Failed(NoFileSelected)`).
    pub fn begin_analyze(&mut self) -> Option<Upload> {
        if self.is_submitting() {
            debug!("analyze ignored: a submission is in flight");
            return None;
        }
        let Some(upload) = self.current_upload().cloned() else {
            self.state = UploadState::Failed {
                error: SessionError::NoFileSelected,
                upload: None,
            };
            return None;
        };
        info!(filename = %upload.filename, size = upload.len(), "submitting document");
        self.export = ExportState::Idle;
        self.state = UploadState::Submitting {
            upload: upload.clone(),
        };
        Some(upload)
    }

    /// Record the outcome of the submission started by [`begin_analyze`].
    ///
    /// [`begin_analyze`]: Self::begin_analyze
    pub fn finish_analyze(&mut self, outcome: Result<Analysis, ClientError>) {
        let upload = match std::mem::replace(&mut self.state, UploadState::Idle) {
            UploadState::Submitting { upload } => upload,
            other => {
                debug!("analysis outcome ignored: nothing was submitting");
                self.state = other;
                return;
            }
        };
        self.state = match outcome {
            Ok(analysis) => {
                info!(
                    analysis_id = ?analysis.analysis_id,
                    risks = analysis.result.risk_flags.len(),
                    "analysis complete"
                );
                UploadState::Success {
                    analysis: Arc::new(analysis),
                    upload,
                }
            }
            Err(err) => {
                warn!(error = %err, "analysis failed");
                UploadState::Failed {
                    error: SessionError::Client(err),
                    upload: Some(upload),
                }
            }
        };
    }

    /// Submit the selected file and record the outcome.
    pub async fn analyze<S>(&mut self, service: &S) -> &UploadState
    where
        S: AnalysisService + ?Sized,
    {
        if let Some(upload) = self.begin_analyze() {
            let outcome = service.analyze(&upload).await;
            self.finish_analyze(outcome);
        }
        &self.state
    }

    /// Move to `Exporting` and hand out the analysis to export.
    ///
    /// Returns `None` while another export is in flight or when there is no
    /// successful analysis to export.
    pub fn begin_export(&mut self) -> Option<Arc<Analysis>> {
        if matches!(self.export, ExportState::Exporting) {
            debug!("export ignored: another export is in flight");
            return None;
        }
        let analysis = self.analysis().cloned();
        if analysis.is_none() {
            debug!("export ignored: no successful analysis");
            return None;
        }
        self.export = ExportState::Exporting;
        analysis
    }

    /// Record the outcome of the export started by [`begin_export`] and pass
    /// the document through on success.
    ///
    /// [`begin_export`]: Self::begin_export
    pub fn finish_export(&mut self, outcome: Result<Vec<u8>, SessionError>) -> Option<Vec<u8>> {
        if !matches!(self.export, ExportState::Exporting) {
            debug!("export outcome ignored: nothing was exporting");
            return None;
        }
        match outcome {
            Ok(bytes) => {
                info!(bytes = bytes.len(), "report ready");
                self.export = ExportState::Idle;
                Some(bytes)
            }
            Err(err) => {
                warn!(error = %err, "export failed");
                self.export = ExportState::Failed(err);
                None
            }
        }
    }

    /// Produce a report for the current analysis by the requested path.
    pub async fn export<S>(
        &mut self,
        kind: ExportKind,
        service: &S,
        renderer: &ReportRenderer,
        locale: &Locale,
    ) -> Option<Vec<u8>>
    where
        S: AnalysisService + ?Sized,
    {
        let analysis = self.begin_export()?;
        let outcome = match kind {
            ExportKind::Pdf => renderer
                .render(&analysis.result, locale)
                .to_pdf()
                .map_err(|e| SessionError::ExportFailure(e.to_string())),
            ExportKind::Text => Ok(renderer
                .render(&analysis.result, locale)
                .to_text()
                .into_bytes()),
            ExportKind::Server => match analysis.analysis_id {
                Some(id) => service
                    .fetch_report(id)
                    .await
                    .map_err(|e| SessionError::ExportFailure(e.to_string())),
                None => Err(SessionError::ExportFailure(
                    "analysis id unknown, server report unavailable".to_string(),
                )),
            },
        };
        self.finish_export(outcome)
    }

    pub fn view(&self, locale: &Locale) -> UploadView {
        let submitting = self.is_submitting();
        let exporting = matches!(self.export, ExportState::Exporting);

        let error_message = match (&self.state, &self.export) {
            (UploadState::Failed { error, .. }, _) => Some(error.user_message(locale)),
            (_, ExportState::Failed(error)) => Some(error.user_message(locale)),
            _ => None,
        };

        UploadView {
            selected_file: self.current_upload().map(|u| u.filename.clone()),
            analyze_enabled: !submitting && self.current_upload().is_some(),
            analyze_label: locale
                .t(if submitting { "analyzing" } else { "analyzeButton" })
                .to_string(),
            export_enabled: !exporting && self.analysis().is_some(),
            export_label: locale
                .t(if exporting { "exporting" } else { "downloadPDF" })
                .to_string(),
            error_message,
        }
    }

    fn is_submitting(&self) -> bool {
        matches!(self.state, UploadState::Submitting { .. })
    }

    fn current_upload(&self) -> Option<&Upload> {
        match &self.state {
            UploadState::FileSelected { upload }
            | UploadState::Submitting { upload }
            | UploadState::Success { upload, .. } => Some(upload),
            UploadState::Failed { upload, .. } => upload.as_ref(),
            UploadState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeService, pdf};
    use docubot_core::Language;
    use docubot_report::ReportConfig;

    const LIMIT: u64 = 10 * 1024 * 1024;

    fn en() -> Locale {
        Locale::new(Language::En)
    }

    #[test]
    fn analyze_without_file_fails_with_no_file_selected() {
        let mut c = UploadController::new(LIMIT);
        assert!(c.begin_analyze().is_none());
        assert!(matches!(
            c.state(),
            UploadState::Failed {
                error: SessionError::NoFileSelected,
                upload: None
            }
        ));
        assert_eq!(
            c.view(&en()).error_message.as_deref(),
            Some("Select a file to upload")
        );
    }

    #[test]
    fn second_trigger_is_ignored_while_submitting() {
        let mut c = UploadController::new(LIMIT);
        c.select_file(pdf("lease.pdf"));
        assert!(c.begin_analyze().is_some());
        assert!(c.begin_analyze().is_none());
        assert!(matches!(c.state(), UploadState::Submitting { .. }));

        let view = c.view(&en());
        assert!(!view.analyze_enabled);
        assert_eq!(view.analyze_label, "Analyzing...");
        assert_eq!(view.error_message, None);
    }

    #[test]
    fn selection_is_ignored_while_submitting() {
        let mut c = UploadController::new(LIMIT);
        c.select_file(pdf("lease.pdf"));
        c.begin_analyze();
        c.select_file(pdf("other.pdf"));
        c.clear_file();
        assert_eq!(c.view(&en()).selected_file.as_deref(), Some("lease.pdf"));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let mut c = UploadController::new(8);
        c.select_file(pdf("big.pdf"));
        assert!(matches!(
            c.state(),
            UploadState::Failed {
                error: SessionError::FileTooLarge { limit: 8, .. },
                upload: None
            }
        ));
        assert!(!c.view(&en()).analyze_enabled);
    }

    #[test]
    fn non_pdf_is_accepted() {
        let mut c = UploadController::new(LIMIT);
        c.select_file(Upload::new("scan.bin", vec![1, 2, 3]));
        assert!(matches!(c.state(), UploadState::FileSelected { .. }));
    }

    #[test]
    fn stale_outcome_is_ignored() {
        let mut c = UploadController::new(LIMIT);
        c.select_file(pdf("lease.pdf"));
        c.finish_analyze(Err(ClientError::Network("late".into())));
        assert!(matches!(c.state(), UploadState::FileSelected { .. }));
    }

    #[tokio::test]
    async fn success_then_failure_keeps_file_for_retry() {
        let service = FakeService::default();
        let mut c = UploadController::new(LIMIT);
        c.select_file(pdf("lease.pdf"));

        let state = c.analyze(&service).await;
        let UploadState::Success { analysis, .. } = state else {
            panic!("expected success, got {state:?}");
        };
        assert_eq!(analysis.analysis_id, Some(7));
        assert!(c.view(&en()).export_enabled);

        let failing = FakeService {
            fail_analyze: true,
            ..FakeService::default()
        };
        c.analyze(&failing).await;
        assert!(matches!(
            c.state(),
            UploadState::Failed {
                error: SessionError::Client(ClientError::Server { status: 500, .. }),
                upload: Some(_)
            }
        ));
        let view = c.view(&en());
        assert!(view.analyze_enabled);
        assert!(!view.export_enabled);
        assert_eq!(
            view.error_message.as_deref(),
            Some("Error analyzing document: model unavailable")
        );

        c.analyze(&service).await;
        assert!(matches!(c.state(), UploadState::Success { .. }));
        assert_eq!(service.analyze_calls(), 2);
    }

    #[test]
    fn export_needs_success_and_runs_one_at_a_time() {
        let mut c = UploadController::new(LIMIT);
        assert!(c.begin_export().is_none());

        c.select_file(pdf("lease.pdf"));
        c.begin_analyze();
        c.finish_analyze(Ok(crate::testing::analysis(Some(1))));

        assert!(c.begin_export().is_some());
        assert!(c.begin_export().is_none());
        let view = c.view(&en());
        assert!(!view.export_enabled);
        assert_eq!(view.export_label, "Generating report...");

        assert_eq!(c.finish_export(Ok(vec![1, 2])), Some(vec![1, 2]));
        assert!(matches!(c.export_state(), ExportState::Idle));
        assert!(c.view(&en()).export_enabled);
    }

    #[tokio::test]
    async fn local_and_server_exports() {
        let service = FakeService::default();
        let renderer = ReportRenderer::new(ReportConfig::default());
        let mut c = UploadController::new(LIMIT);
        c.select_file(pdf("lease.pdf"));
        c.analyze(&service).await;

        let local = c
            .export(ExportKind::Pdf, &service, &renderer, &en())
            .await
            .unwrap();
        assert!(local.starts_with(b"%PDF-"));

        let text = c
            .export(ExportKind::Text, &service, &renderer, &en())
            .await
            .unwrap();
        assert!(String::from_utf8(text).unwrap().contains("Document Analysis Report"));

        let server = c
            .export(ExportKind::Server, &service, &renderer, &en())
            .await
            .unwrap();
        assert_eq!(server, b"%PDF-1.4 server report 7".to_vec());
    }

    #[tokio::test]
    async fn server_export_without_id_fails_but_session_continues() {
        let service = FakeService {
            analysis_id: None,
            ..FakeService::default()
        };
        let renderer = ReportRenderer::new(ReportConfig::default());
        let mut c = UploadController::new(LIMIT);
        c.select_file(pdf("lease.pdf"));
        c.analyze(&service).await;

        assert!(
            c.export(ExportKind::Server, &service, &renderer, &en())
                .await
                .is_none()
        );
        assert!(matches!(
            c.export_state(),
            ExportState::Failed(SessionError::ExportFailure(_))
        ));
        let view = c.view(&en());
        assert!(view.export_enabled);
        assert!(
            view.error_message
                .unwrap()
                .starts_with("Could not generate the report")
        );

        // The local path still works.
        assert!(
            c.export(ExportKind::Pdf, &service, &renderer, &en())
                .await
                .is_some()
        );
        assert!(matches!(c.export_state(), ExportState::Idle));
    }
}
