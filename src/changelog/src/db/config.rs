use std::{fmt, str::FromStr};

use crate::ChangeLogError;

pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_TABLE: &str = "sumsub_callbacks";
pub const DEFAULT_EVENT_TYPES: [&str; 2] = ["applicantReviewed", "applicantPersonalInfoChanged"];

/// TLS negotiation mode for the change log connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SslMode {
    Disable,
    #[default]
    Prefer,
    Require,
}

impl FromStr for SslMode {
    type Err = ChangeLogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "disable" => Ok(Self::Disable),
            "prefer" => Ok(Self::Prefer),
            "require" => Ok(Self::Require),
            other => Err(ChangeLogError::Config(format!("unsupported sslmode '{other}'"))),
        }
    }
}

impl fmt::Display for SslMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disable => write!(f, "disable"),
            Self::Prefer => write!(f, "prefer"),
            Self::Require => write!(f, "require"),
        }
    }
}

impl From<SslMode> for tokio_postgres::config::SslMode {
    fn from(mode: SslMode) -> Self {
        match mode {
            SslMode::Disable => Self::Disable,
            SslMode::Prefer => Self::Prefer,
            SslMode::Require => Self::Require,
        }
    }
}

#[derive(Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub sslmode: SslMode,
}

impl DbConfig {
    pub fn pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .password(&self.password)
            .dbname(&self.dbname)
            .ssl_mode(self.sslmode.into());
        config
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: DEFAULT_PORT,
            user: "postgres".into(),
            password: String::new(),
            dbname: "postgres".into(),
            sslmode: SslMode::default(),
        }
    }
}

// Hand-written so the password never reaches the logs.
impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("dbname", &self.dbname)
            .field("sslmode", &self.sslmode)
            .finish_non_exhaustive()
    }
}

/// Where change events live and which of them count as a change.
#[derive(Debug, Clone)]
pub struct ChangeLogConfig {
    pub table: String,
    pub event_types: Vec<String>,
}

impl ChangeLogConfig {
    /// Quoted form of `table`, safe to splice into SQL.
    ///
    /// Accepts `table` or `schema.table` made of ASCII alphanumerics and
    /// underscores.
    pub fn quoted_table(&self) -> Result<String, ChangeLogError> {
        let parts = self.table.split('.').collect::<Vec<_>>();
        if parts.len() > 2 {
            return Err(ChangeLogError::Config(format!(
                "invalid change log table '{}'",
                self.table
            )));
        }
        for part in &parts {
            let valid = !part.is_empty()
                && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(ChangeLogError::Config(format!(
                    "invalid change log table '{}'",
                    self.table
                )));
            }
        }
        Ok(parts
            .iter()
            .map(|part| format!("\"{part}\""))
            .collect::<Vec<_>>()
            .join("."))
    }
}

impl Default for ChangeLogConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.into(),
            event_types: DEFAULT_EVENT_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}
