use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

mod config;
mod error;
mod export;
mod models;
mod notify;
mod report;
mod response;
mod session;
mod shell;
mod state;
mod transport;
mod view;

use config::ClientConfig;
use models::{AnalysisResult, SelectedFile};
use notify::{ConsoleNotifier, SystemClipboard};
use session::{AnalysisSession, SubmitOutcome};
use state::AnalysisRequestState;
use transport::HttpTransport;

#[derive(Parser)]
#[command(name = "analysis-client")]
#[command(about = "Submit data files to the analysis service and inspect the results", long_about = None)]
struct Cli {
    #[command(flatten)]
    service: ServiceArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ServiceArgs {
    /// Analyze endpoint of the service
    #[arg(long, global = true, env = "ANALYSIS_API_URL", default_value = config::DEFAULT_ENDPOINT)]
    endpoint: String,
    /// Request timeout in seconds, 0 to wait indefinitely
    #[arg(long, global = true, env = "ANALYSIS_TIMEOUT_SECS", default_value_t = config::DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a file and print the results
    Analyze {
        file: PathBuf,
        /// Copy the result to the clipboard as JSON
        #[arg(long)]
        copy: bool,
        /// Print the raw result as JSON instead of tables
        #[arg(long)]
        json: bool,
        /// Also write the per-record rows to a CSV file
        #[arg(long)]
        detail_csv: Option<PathBuf>,
        /// Show at most this many records
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Analyze a file and write a markdown report
    Report {
        file: PathBuf,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Check that the service is reachable
    Health,
    /// Interactive session: select, submit, copy
    Shell {
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,analysis_client=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_args(&cli.service.endpoint, cli.service.timeout_secs)?;
    let transport = HttpTransport::new(config).context("failed to build HTTP client")?;

    match cli.command {
        Commands::Health => {
            let message = transport
                .health()
                .await
                .context("analysis service is not reachable")?;
            println!("{message}");
        }
        Commands::Analyze {
            file,
            copy,
            json,
            detail_csv,
            limit,
        } => {
            let session = new_session(transport);
            let result = analyze(&session, &file).await?;

            if json {
                println!("{}", result.to_pretty_json()?);
            } else {
                print!("{}", report::render_terminal(&result, limit));
            }
            if let Some(path) = detail_csv {
                let written = export::export_detail_csv(&result, &path)?;
                println!("Wrote {written} records to {}.", path.display());
            }
            if copy {
                session.copy_result_to_clipboard();
            }
        }
        Commands::Report { file, out } => {
            let session = new_session(transport);
            let result = analyze(&session, &file).await?;
            let report = report::build_report(&result, chrono::Utc::now());
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Shell { limit } => {
            let session = new_session(transport);
            shell::run(&session, limit).await?;
        }
    }

    Ok(())
}

fn new_session(transport: HttpTransport) -> AnalysisSession<HttpTransport> {
    AnalysisSession::new(
        transport,
        Box::new(SystemClipboard),
        Box::new(ConsoleNotifier),
    )
}

async fn analyze(
    session: &AnalysisSession<HttpTransport>,
    path: &Path,
) -> anyhow::Result<AnalysisResult> {
    let file = SelectedFile::from_path(path)?;
    session.select_file(Some(file));

    match session.submit().await {
        SubmitOutcome::Resolved(AnalysisRequestState::Succeeded(result)) => Ok(result),
        SubmitOutcome::Resolved(AnalysisRequestState::Failed(message)) => {
            bail!("analysis of {} failed: {message}", path.display())
        }
        other => bail!("analysis of {} did not complete: {other:?}", path.display()),
    }
}
