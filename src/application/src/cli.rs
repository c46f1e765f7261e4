use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use extractor::{ConfigBundle, ExtractorConfig, JsonLinesSink, State, Watermark};

use crate::telemetry::{self, LogFormat};

#[derive(Parser, Debug)]
#[command(
    name = "applicant-extract",
    about = "Emit applicant data for customers whose KYC state changed since the last run",
    version
)]
pub(crate) struct Cli {
    /// JSON config bundle with database and provider settings
    #[arg(long, env = "EXTRACTOR_CONFIG")]
    config: PathBuf,
    /// File holding the STATE value written by the previous run
    #[arg(long)]
    state: Option<PathBuf>,
    /// Resume after this RFC 3339 timestamp; takes precedence over --state
    #[arg(long)]
    watermark: Option<Watermark>,
    /// Provider app token, used when the bundle has none
    #[arg(long, env = "SUMSUB_KEY", hide_env_values = true)]
    sumsub_key: Option<String>,
    /// Provider signing secret, used when the bundle has none
    #[arg(long, env = "SUMSUB_SECRET", hide_env_values = true)]
    sumsub_secret: Option<String>,
    /// Override the bundle's max_concurrent_fetches
    #[arg(long)]
    max_concurrent_fetches: Option<usize>,
    /// Also emit the applicant_documents stream
    #[arg(long)]
    include_documents: bool,
    /// Filter used when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

pub(crate) async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level, cli.log_format)?;

    let config = cli.extractor_config()?;
    let watermark = match cli.watermark {
        Some(watermark) => Some(watermark),
        None => match &cli.state {
            Some(path) => read_state(path)?,
            None => None,
        },
    };
    tracing::info!(
        host = %config.db.host,
        database = %config.db.dbname,
        table = %config.changelog.table,
        since = ?watermark.map(|w| w.to_string()),
        "starting extraction"
    );

    let sink = JsonLinesSink::new(std::io::stdout());
    let summary = extractor::run(&config, watermark, &sink).await?;
    tracing::info!(
        emitted = summary.emitted,
        failed = summary.failed,
        "extraction finished"
    );
    Ok(())
}

impl Cli {
    fn extractor_config(&self) -> anyhow::Result<ExtractorConfig> {
        let bundle = ConfigBundle::from_file(&self.config)?;
        Ok(ExtractorConfig::try_from(self.apply_overrides(bundle))?)
    }

    fn apply_overrides(&self, mut bundle: ConfigBundle) -> ConfigBundle {
        if bundle.provider_key.is_none() {
            bundle.provider_key = self.sumsub_key.clone();
        }
        if bundle.provider_secret.is_none() {
            bundle.provider_secret = self.sumsub_secret.clone();
        }
        if let Some(limit) = self.max_concurrent_fetches {
            bundle.max_concurrent_fetches = limit;
        }
        if self.include_documents {
            bundle.include_documents = true;
        }
        bundle
    }
}

fn read_state(path: &Path) -> anyhow::Result<Option<Watermark>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading state file {}", path.display()))?;
    parse_state(&raw).with_context(|| format!("parsing state file {}", path.display()))
}

/// An empty file counts as no previous state.
fn parse_state(raw: &str) -> anyhow::Result<Option<Watermark>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let state: State = serde_json::from_str(raw)?;
    Ok(state.watermark())
}
