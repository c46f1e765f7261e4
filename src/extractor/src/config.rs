use std::{path::Path, time::Duration};

use serde::Deserialize;

use changelog::{db::DEFAULT_PORT, ChangeLogConfig, DbConfig, SslMode};
use sumsub::SumsubConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required credential '{0}'")]
    MissingCredential(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings handed over by the orchestrator that triggers a run.
#[derive(Clone, Deserialize)]
pub struct ConfigBundle {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: String,
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_sslmode")]
    pub sslmode: String,
    #[serde(default)]
    pub provider_key: Option<String>,
    #[serde(default)]
    pub provider_secret: Option<String>,
    #[serde(default)]
    pub provider_base_url: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub changelog_table: Option<String>,
    #[serde(default)]
    pub event_types: Option<Vec<String>>,
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    #[serde(default)]
    pub include_documents: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_sslmode() -> String {
    SslMode::default().to_string()
}

fn default_max_concurrent_fetches() -> usize {
    1
}

impl ConfigBundle {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub db: DbConfig,
    pub changelog: ChangeLogConfig,
    pub sumsub: SumsubConfig,
    /// Provider calls allowed in flight at once; 1 keeps the run strictly sequential.
    pub max_concurrent_fetches: usize,
    pub include_documents: bool,
}

impl TryFrom<ConfigBundle> for ExtractorConfig {
    type Error = ConfigError;

    fn try_from(bundle: ConfigBundle) -> Result<Self, Self::Error> {
        let provider_key = required(bundle.provider_key, "provider_key")?;
        let provider_secret = required(bundle.provider_secret, "provider_secret")?;

        let sslmode = bundle
            .sslmode
            .parse::<SslMode>()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let db = DbConfig {
            host: bundle.host,
            port: bundle.port,
            user: bundle.user,
            password: bundle.password,
            dbname: bundle.database,
            sslmode,
        };

        let mut changelog = ChangeLogConfig::default();
        if let Some(table) = bundle.changelog_table {
            changelog.table = table;
        }
        if let Some(event_types) = bundle.event_types {
            changelog.event_types = event_types;
        }
        changelog
            .quoted_table()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if changelog.event_types.is_empty() {
            return Err(ConfigError::Invalid("event_types must not be empty".into()));
        }

        let mut sumsub = SumsubConfig::new(provider_key, provider_secret);
        if let Some(base_url) = bundle.provider_base_url {
            sumsub.base_url = base_url;
        }
        if let Some(secs) = bundle.request_timeout_secs {
            if secs == 0 {
                return Err(ConfigError::Invalid(
                    "request_timeout_secs must be positive".into(),
                ));
            }
            sumsub.timeout = Duration::from_secs(secs);
        }

        if bundle.max_concurrent_fetches == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_fetches must be at least 1".into(),
            ));
        }

        Ok(Self {
            db,
            changelog,
            sumsub,
            max_concurrent_fetches: bundle.max_concurrent_fetches,
            include_documents: bundle.include_documents,
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingCredential(name))
}
