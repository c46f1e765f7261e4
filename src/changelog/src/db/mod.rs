use std::{future::Future, ops::Deref};

use tokio::task::JoinHandle;
use tokio_postgres::NoTls;

mod config;
mod model;
mod tls;

pub use config::{
    ChangeLogConfig, DbConfig, SslMode, DEFAULT_EVENT_TYPES, DEFAULT_PORT, DEFAULT_TABLE,
};
pub use model::{ChangeEvent, Watermark};

use crate::ChangeLogError;

/// A Postgres session scoped to a single run.
///
/// The connection task is aborted when the client is closed or dropped, so
/// the session is released on every exit path.
pub struct DbClient {
    client: tokio_postgres::Client,
    connection: Option<JoinHandle<()>>,
}

impl DbClient {
    /// `prefer` upgrades to TLS when the server offers it and `require`
    /// refuses to fall back to plaintext.
    pub async fn new(config: &DbConfig) -> Result<Self, ChangeLogError> {
        let pg_config = config.pg_config();
        let (client, connection) = match config.sslmode {
            SslMode::Disable => {
                let (client, connection) = pg_config
                    .connect(NoTls)
                    .await
                    .map_err(ChangeLogError::Connect)?;
                (client, spawn_connection(connection))
            }
            SslMode::Prefer | SslMode::Require => {
                let (client, connection) = pg_config
                    .connect(tls::connector()?)
                    .await
                    .map_err(ChangeLogError::Connect)?;
                (client, spawn_connection(connection))
            }
        };
        tracing::debug!(
            host = %config.host,
            dbname = %config.dbname,
            sslmode = %config.sslmode,
            "change log connected"
        );

        Ok(Self {
            client,
            connection: Some(connection),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.client.is_closed()
            || self
                .connection
                .as_ref()
                .map_or(true, |connection| connection.is_finished())
    }

    pub async fn close(mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };
        // Dropping the client terminates the session; the task then finishes.
        drop(self);
        if let Err(e) = connection.await {
            if !e.is_cancelled() {
                tracing::warn!(error = %e, "change log connection task failed");
            }
        }
        tracing::debug!("change log connection closed");
    }
}

fn spawn_connection<C>(connection: C) -> JoinHandle<()>
where
    C: Future<Output = Result<(), tokio_postgres::Error>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(error = %e, "change log connection terminated");
        }
    })
}

impl Deref for DbClient {
    type Target = tokio_postgres::Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl Drop for DbClient {
    fn drop(&mut self) {
        if let Some(connection) = &self.connection {
            connection.abort();
        }
    }
}
