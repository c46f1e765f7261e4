use futures::StreamExt;

use changelog::{ChangeEvent, ChangeLogError, ChangeSource, Watermark};

use crate::{
    documents,
    error::ExtractError,
    model::{DocumentRecord, ExtractedRecord, RecordContent, RunSummary},
    provider::KycProvider,
    sink::RecordSink,
};

struct Extraction {
    record: ExtractedRecord,
    documents: Vec<DocumentRecord>,
}

/// Joins the change log against the provider, one record per change event.
///
/// A failed fetch is written out as an error record instead of stopping the
/// run, so every change event is accounted for and the watermark always
/// reaches the newest change that was read. Only a change log or sink failure
/// aborts a run, and then no state is written.
pub struct IncrementalStreamProducer<C, P> {
    changes: C,
    provider: P,
    max_concurrent_fetches: usize,
    include_documents: bool,
}

impl<C, P> IncrementalStreamProducer<C, P>
where
    C: ChangeSource,
    P: KycProvider,
{
    pub fn new(changes: C, provider: P) -> Self {
        Self {
            changes,
            provider,
            max_concurrent_fetches: 1,
            include_documents: false,
        }
    }

    /// Records are still emitted in change log order whatever the limit.
    pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = limit.max(1);
        self
    }

    pub fn with_documents(mut self, include_documents: bool) -> Self {
        self.include_documents = include_documents;
        self
    }

    pub fn into_parts(self) -> (C, P) {
        (self.changes, self.provider)
    }

    #[tracing::instrument(
        name = "extractor.run",
        skip_all,
        fields(since = ?watermark.map(|w| w.to_string())),
        err
    )]
    pub async fn run<S: RecordSink>(
        &self,
        watermark: Option<Watermark>,
        sink: &S,
    ) -> Result<RunSummary, ExtractError> {
        tracing::debug!("reading changes");
        let changes = self.changes.changes_since(watermark).await?;

        tracing::debug!(max_concurrent_fetches = self.max_concurrent_fetches, "fetching applicants");
        let mut extractions = changes
            .map(|change| async move {
                let event = change?;
                Ok::<_, ChangeLogError>(self.extract(event).await)
            })
            .buffered(self.max_concurrent_fetches);

        let mut summary = RunSummary {
            watermark,
            ..Default::default()
        };
        while let Some(extraction) = extractions.next().await {
            let Extraction { record, documents } = extraction?;

            summary.watermark = Watermark::advance(summary.watermark, record.recorded_at);
            if record.content.is_error() {
                summary.failed += 1;
            }
            sink.write_record(&record).await.map_err(ExtractError::Sink)?;
            summary.emitted += 1;

            for document in &documents {
                sink.write_document(document)
                    .await
                    .map_err(ExtractError::Sink)?;
                summary.documents += 1;
            }
        }

        if let Some(watermark) = summary.watermark {
            sink.write_state(watermark)
                .await
                .map_err(ExtractError::Sink)?;
        }
        tracing::info!(
            emitted = summary.emitted,
            failed = summary.failed,
            documents = summary.documents,
            watermark = ?summary.watermark.map(|w| w.to_string()),
            "run complete"
        );

        Ok(summary)
    }

    async fn extract(&self, event: ChangeEvent) -> Extraction {
        let content = match self.provider.fetch_applicant(&event.customer_id).await {
            Ok(payload) => RecordContent::Payload(payload),
            Err(e) => {
                tracing::warn!(customer_id = %event.customer_id, error = %e, "applicant fetch failed");
                RecordContent::error(e)
            }
        };

        let documents = match &content {
            RecordContent::Payload(payload) if self.include_documents => {
                documents::collect(&self.provider, &event, payload).await
            }
            _ => Vec::new(),
        };

        Extraction {
            record: ExtractedRecord {
                customer_id: event.customer_id,
                recorded_at: event.changed_at,
                content,
            },
            documents,
        }
    }
}
