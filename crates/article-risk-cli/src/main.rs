use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use article_risk_core::client::parse_timeout;
use article_risk_core::{
    render_report, AnalysisResponse, AnalysisSession, DisplayModel, HttpAnalysisClient,
    OutputFormat, ServiceSettings, SubmissionState,
};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use tokio::io::AsyncReadExt;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const USAGE_EXIT: u8 = 1;
const ANALYSIS_FAILED_EXIT: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "article-risk",
    author,
    version,
    about = "Submit news articles for risk analysis and render the assessment"
)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON) with a `[service]` table
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Analysis service origin, overriding config and environment
    #[arg(long = "base-url", value_name = "URL", global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send an article to the analysis service and print the assessment
    Analyze {
        /// Article title
        #[arg(long)]
        title: String,

        /// Article body; read from stdin when neither --body nor --body-file is given
        #[arg(long, conflicts_with = "body_file")]
        body: Option<String>,

        /// Read the article body from a file
        #[arg(long = "body-file", value_name = "PATH")]
        body_file: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Render a saved analysis response without contacting the service
    Render {
        /// JSON file containing a service response
        #[arg(value_name = "RESPONSE")]
        path: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct OutputArgs {
    /// Emit the display model as JSON instead of human-readable text
    #[arg(long)]
    json: bool,

    /// Disable terminal colours
    #[arg(long = "no-color")]
    no_color: bool,
}

impl OutputArgs {
    fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }

    fn use_color(&self) -> bool {
        !self.json
            && !self.no_color
            && std::env::var_os("NO_COLOR").is_none()
            && std::io::stdout().is_terminal()
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    service: ServiceSection,
}

#[derive(Debug, Default, Deserialize)]
struct ServiceSection {
    base_url: Option<String>,
    timeout: Option<String>,
    user_agent: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return Ok(if err.use_stderr() {
                ExitCode::from(USAGE_EXIT)
            } else {
                ExitCode::SUCCESS
            });
        }
    };
    match cli.command {
        Commands::Analyze {
            ref title,
            ref body,
            ref body_file,
            output,
        } => {
            let settings = load_settings(cli.config.as_deref(), cli.base_url.as_deref())?;
            let body = read_body(body.as_deref(), body_file.as_deref()).await?;
            analyze(settings, title, &body, output).await
        }
        Commands::Render { ref path, output } => {
            render_saved(path, output).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn analyze(
    settings: ServiceSettings,
    title: &str,
    body: &str,
    output: OutputArgs,
) -> Result<ExitCode> {
    let client = HttpAnalysisClient::new(&settings)?;
    debug!(url = client.url(), "submitting article");
    let mut session = AnalysisSession::new(Arc::new(client));

    match session.submit(title, body).await? {
        SubmissionState::Succeeded(response) => {
            print_response(response, output)?;
            Ok(ExitCode::SUCCESS)
        }
        SubmissionState::Failed(message) => {
            eprintln!("error: {message}");
            Ok(ExitCode::from(ANALYSIS_FAILED_EXIT))
        }
        other => bail!("analysis ended in unexpected state {other:?}"),
    }
}

async fn render_saved(path: &Path, output: OutputArgs) -> Result<()> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read response file {}", path.display()))?;
    let response: AnalysisResponse = serde_json::from_str(&raw)
        .with_context(|| format!("invalid analysis response in {}", path.display()))?;
    print_response(&response, output)
}

fn print_response(response: &AnalysisResponse, output: OutputArgs) -> Result<()> {
    let model = DisplayModel::from_response(response);
    let rendered = render_report(&model, output.format(), output.use_color())?;
    if rendered.ends_with('\n') {
        print!("{rendered}");
    } else {
        println!("{rendered}");
    }
    Ok(())
}

async fn read_body(body: Option<&str>, body_file: Option<&Path>) -> Result<String> {
    if let Some(body) = body {
        return Ok(body.to_string());
    }
    if let Some(path) = body_file {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read article body from {}", path.display()));
    }
    let mut buffer = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buffer)
        .await
        .context("failed to read article body from stdin")?;
    Ok(buffer)
}

/// Defaults, then the config file, then environment, then `--base-url`.
fn load_settings(config_path: Option<&Path>, base_url: Option<&str>) -> Result<ServiceSettings> {
    let mut settings = ServiceSettings::default();

    if let Some(path) = config_path {
        let file: FileConfig = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .with_context(|| format!("failed to load config from {}", path.display()))?;
        let service = file.service;
        if let Some(url) = service.base_url {
            settings.base_url = url;
        }
        if let Some(raw) = service.timeout {
            settings.timeout = parse_timeout(&raw)
                .with_context(|| format!("invalid service.timeout `{raw}` in {}", path.display()))?;
        }
        if service.user_agent.is_some() {
            settings.user_agent = service.user_agent;
        }
    }

    let mut settings = settings.with_env()?;
    if let Some(url) = base_url {
        settings.base_url = url.to_string();
    }
    Ok(settings)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
