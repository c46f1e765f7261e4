use reqwest::header::InvalidHeaderValue;

#[derive(Debug, thiserror::Error)]
pub enum SumsubError {
    #[error("missing provider credential: {0}")]
    MissingCredential(&'static str),
    #[error("timeout")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("provider returned {code}: {description}")]
    Api { code: u16, description: String },
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
    #[error("system clock is before the unix epoch")]
    Clock(#[from] std::time::SystemTimeError),
    #[error("invalid provider base url: {0}")]
    InvalidBaseUrl(String),
    #[error("could not build http client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl From<reqwest::Error> for SumsubError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(e)
        }
    }
}

