mod display;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use docubot_client::{AnalysisClient, ClientConfig, Upload};
use docubot_core::{Language, Locale};
use docubot_report::{Pagination, ReportConfig, ReportRenderer};
use docubot_session::{ExportKind, HistoryListing, HistoryView, UploadController};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docubot", version, about = "Analyze contracts, invoices and acts with DocuBot")]
struct Cli {
    /// Base URL of the analysis service.
    #[arg(long, global = true, env = "DOCUBOT_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    /// Interface language (ru or en).
    #[arg(long, global = true, env = "DOCUBOT_LANG", default_value = "ru")]
    lang: Language,

    /// Currency code used when a result carries none.
    #[arg(long, global = true, env = "DOCUBOT_DEFAULT_CURRENCY", default_value = "RUB")]
    currency: String,

    /// Transport timeout; unlimited when unset.
    #[arg(long, global = true, env = "DOCUBOT_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Lay local reports out on a single page, however long.
    #[arg(long, global = true)]
    single_page: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a document and print the analysis.
    Analyze {
        file: PathBuf,
        /// Render a local report (.pdf, otherwise plain text).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Download the server-rendered PDF report.
        #[arg(long)]
        server_report: Option<PathBuf>,
        /// Print the normalized result as JSON instead of a card.
        #[arg(long)]
        json: bool,
    },
    /// List recent analyses, newest first.
    History {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Download the server-rendered report for a history entry.
    Report {
        id: i64,
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Show usage statistics.
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("docubot v{}", env!("CARGO_PKG_VERSION"));

    let locale = Locale::new(cli.lang);
    let client = AnalysisClient::with_config(ClientConfig {
        base_url: cli.api_url.clone(),
        timeout: cli.timeout_secs.map(Duration::from_secs),
        ..ClientConfig::default()
    })
    .context("building HTTP client")?;
    let renderer = ReportRenderer::new(ReportConfig {
        default_currency: cli.currency.clone(),
        pagination: if cli.single_page {
            Pagination::SinglePage
        } else {
            Pagination::Paged
        },
        ..ReportConfig::default()
    });
    let color = std::io::stdout().is_terminal();

    match cli.command {
        Command::Analyze {
            file,
            report,
            server_report,
            json,
        } => {
            let upload = Upload::from_path(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let filename = upload.filename.clone();

            let mut session = UploadController::new(client.config().max_upload_bytes);
            session.select_file(upload);
            session.analyze(&client).await;

            let Some(analysis) = session.analysis().cloned() else {
                let message = session
                    .view(&locale)
                    .error_message
                    .unwrap_or_else(|| locale.t("analysisError").to_string());
                bail!(message);
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&analysis.result)?);
            } else {
                display::print_result_card(
                    &analysis.result,
                    &filename,
                    &locale,
                    &cli.currency,
                    color,
                );
            }

            if let Some(path) = report {
                let kind = local_kind(&path);
                export_to(&mut session, kind, &client, &renderer, &locale, &path).await?;
            }
            if let Some(path) = server_report {
                let kind = ExportKind::Server;
                export_to(&mut session, kind, &client, &renderer, &locale, &path).await?;
            }
        }
        Command::History { limit } => {
            let listing = HistoryView::load(&client, Some(limit), &locale).await;
            if let HistoryListing::Failed(message) = &listing {
                bail!(message.clone());
            }
            display::print_history(&listing, &locale, color);
        }
        Command::Report { id, output } => {
            let bytes = client
                .fetch_report(id)
                .await
                .with_context(|| format!("fetching report {id}"))?;
            write_output(&output, &bytes)?;
            eprintln!("  Wrote {}", output.display());
        }
        Command::Stats => {
            let stats = client.fetch_stats().await.context("fetching stats")?;
            display::print_stats(&stats, &locale);
        }
    }

    Ok(())
}

async fn export_to(
    session: &mut UploadController,
    kind: ExportKind,
    client: &AnalysisClient,
    renderer: &ReportRenderer,
    locale: &Locale,
    path: &Path,
) -> anyhow::Result<()> {
    match session.export(kind, client, renderer, locale).await {
        Some(bytes) => {
            write_output(path, &bytes)?;
            eprintln!("  Wrote {}", path.display());
            Ok(())
        }
        None => {
            let message = session
                .view(locale)
                .error_message
                .unwrap_or_else(|| locale.t("exportError").to_string());
            bail!(message)
        }
    }
}

/// `.pdf` targets get the PDF rendering; anything else gets plain text.
fn local_kind(path: &Path) -> ExportKind {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => ExportKind::Pdf,
        _ => ExportKind::Text,
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}
