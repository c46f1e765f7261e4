pub use changelog::{ChangeEvent, ChangeLogError, ChangeSource, Watermark};

pub mod config;
mod documents;
mod error;
pub mod model;
pub mod producer;
pub mod provider;
pub mod sink;

pub use config::{ConfigBundle, ConfigError, ExtractorConfig};
pub use error::ExtractError;
pub use model::{DocumentContent, DocumentRecord, ExtractedRecord, RecordContent, RunSummary};
pub use producer::IncrementalStreamProducer;
pub use provider::KycProvider;
pub use sink::{JsonLinesSink, RecordSink, State};

use changelog::ChangeLogReader;
use sumsub::SumsubClient;

/// Runs one extraction against the live change log and provider.
///
/// The provider client is built before anything touches the network, and the
/// change log connection is closed whichever way the run ends.
#[tracing::instrument(name = "extractor.extract", skip_all, err)]
pub async fn run<S: RecordSink>(
    config: &ExtractorConfig,
    watermark: Option<Watermark>,
    sink: &S,
) -> Result<RunSummary, ExtractError> {
    let provider = SumsubClient::new(&config.sumsub)?;
    let reader = ChangeLogReader::connect(&config.db, config.changelog.clone()).await?;

    let producer = IncrementalStreamProducer::new(reader, provider)
        .with_max_concurrent_fetches(config.max_concurrent_fetches)
        .with_documents(config.include_documents);
    let result = producer.run(watermark, sink).await;

    let (reader, _provider) = producer.into_parts();
    reader.close().await;

    result
}
