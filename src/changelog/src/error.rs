#[derive(Debug, thiserror::Error)]
pub enum ChangeLogError {
    #[error("invalid change log configuration: {0}")]
    Config(String),
    #[error("could not set up TLS for the change log: {0}")]
    Tls(#[source] rustls::Error),
    #[error("could not connect to change log: {0}")]
    Connect(#[source] tokio_postgres::Error),
    #[error("change log query failed: {0}")]
    Query(#[source] tokio_postgres::Error),
    #[error("malformed change log row: {0}")]
    Row(#[source] tokio_postgres::Error),
    #[error("change log connection is closed")]
    Closed,
}
