use std::future::Future;

use futures::{stream::BoxStream, StreamExt, TryStreamExt};
use tokio_postgres::types::ToSql;

use crate::{
    db::{ChangeEvent, ChangeLogConfig, DbClient, DbConfig, Watermark},
    ChangeLogError,
};

/// Anything that can list the customers changed after a watermark.
pub trait ChangeSource {
    /// Changes strictly after `watermark`, or the whole log when `None`.
    ///
    /// The returned stream borrows the source and cannot outlive it.
    fn changes_since(
        &self,
        watermark: Option<Watermark>,
    ) -> impl Future<
        Output = Result<BoxStream<'_, Result<ChangeEvent, ChangeLogError>>, ChangeLogError>,
    > + Send;
}

/// Polls the provider callback table for customers whose applicant data changed.
pub struct ChangeLogReader {
    client: DbClient,
    config: ChangeLogConfig,
    query: String,
}

impl ChangeLogReader {
    pub async fn connect(
        db_config: &DbConfig,
        config: ChangeLogConfig,
    ) -> Result<Self, ChangeLogError> {
        let query = changes_since_sql(&config)?;
        let client = DbClient::new(db_config).await?;

        Ok(Self {
            client,
            config,
            query,
        })
    }

    pub async fn close(self) {
        self.client.close().await
    }
}

impl ChangeSource for ChangeLogReader {
    async fn changes_since(
        &self,
        watermark: Option<Watermark>,
    ) -> Result<BoxStream<'_, Result<ChangeEvent, ChangeLogError>>, ChangeLogError> {
        if self.client.is_closed() {
            return Err(ChangeLogError::Closed);
        }
        tracing::debug!(since = ?watermark.map(|w| w.to_string()), table = %self.config.table, "querying change log");

        let since = watermark.map(|w| w.as_datetime());
        let params: [&(dyn ToSql + Sync); 2] = [&since, &self.config.event_types];
        let rows = self
            .client
            .query_raw(self.query.as_str(), params)
            .await
            .map_err(ChangeLogError::Query)?;

        Ok(rows
            .map_err(ChangeLogError::Query)
            .and_then(|row| futures::future::ready(ChangeEvent::try_from(&row)))
            .boxed())
    }
}

// Ordered so the stream advances monotonically; the watermark itself is the
// maximum over the whole change set either way.
fn changes_since_sql(config: &ChangeLogConfig) -> Result<String, ChangeLogError> {
    if config.event_types.is_empty() {
        return Err(ChangeLogError::Config(
            "at least one change event type is required".into(),
        ));
    }
    Ok(format!(
        r#"
        SELECT customer_id::text AS customer_id, recorded_at
        FROM {table}
        WHERE ($1::timestamptz IS NULL OR recorded_at > $1)
        AND content->>'type' = ANY($2)
        ORDER BY recorded_at ASC
        "#,
        table = config.quoted_table()?,
    ))
}
