use changelog::ChangeLogError;
use sumsub::SumsubError;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("change log read failed: {0}")]
    ChangeLog(#[from] ChangeLogError),
    #[error("provider client setup failed: {0}")]
    Provider(#[from] SumsubError),
    #[error("record sink failed: {0:#}")]
    Sink(anyhow::Error),
}
