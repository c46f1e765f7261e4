use std::time::Duration;

pub const SUMSUB_BASE_URL: &str = "https://api.sumsub.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct SumsubConfig {
    pub sumsub_key: String,
    pub sumsub_secret: String,
    pub base_url: String,
    /// Upper bound for a single call, connection setup included.
    pub timeout: Duration,
}

impl SumsubConfig {
    pub fn new(sumsub_key: impl Into<String>, sumsub_secret: impl Into<String>) -> Self {
        Self {
            sumsub_key: sumsub_key.into(),
            sumsub_secret: sumsub_secret.into(),
            base_url: SUMSUB_BASE_URL.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for SumsubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SumsubConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
