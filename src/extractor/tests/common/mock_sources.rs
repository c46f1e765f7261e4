use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use extractor::{ChangeEvent, ChangeLogError, ChangeSource, KycProvider, Watermark};
use futures::{stream::BoxStream, StreamExt};
use sumsub::SumsubError;

/// Serves a fixed change log, optionally breaking partway through.
#[derive(Default)]
pub struct MockChangeLog {
    pub events: Vec<ChangeEvent>,
    pub unavailable: bool,
    pub fail_after: Option<usize>,
}

impl MockChangeLog {
    pub fn new(events: Vec<ChangeEvent>) -> Self {
        Self {
            events,
            ..Default::default()
        }
    }
}

impl ChangeSource for MockChangeLog {
    async fn changes_since(
        &self,
        watermark: Option<Watermark>,
    ) -> Result<BoxStream<'_, Result<ChangeEvent, ChangeLogError>>, ChangeLogError> {
        if self.unavailable {
            return Err(ChangeLogError::Closed);
        }
        let mut items = self
            .events
            .iter()
            .filter(|e| watermark.map_or(true, |w| Watermark::new(e.changed_at) > w))
            .cloned()
            .map(Ok)
            .collect::<Vec<_>>();
        if let Some(n) = self.fail_after {
            items.truncate(n);
            items.push(Err(ChangeLogError::Closed));
        }
        Ok(futures::stream::iter(items).boxed())
    }
}

#[derive(Clone)]
pub enum Outcome {
    Body(String),
    Timeout,
    Api(u16, String),
}

impl Outcome {
    fn into_result(self) -> Result<String, SumsubError> {
        match self {
            Outcome::Body(body) => Ok(body),
            Outcome::Timeout => Err(SumsubError::Timeout),
            Outcome::Api(code, description) => Err(SumsubError::Api { code, description }),
        }
    }
}

/// Scripted provider; unknown customers answer with a small JSON body.
#[derive(Default)]
pub struct MockProvider {
    pub applicants: HashMap<String, Outcome>,
    pub delays: HashMap<String, Duration>,
    pub metadata: HashMap<String, Outcome>,
    pub images: HashMap<String, Option<String>>,
    pub calls: Arc<AtomicUsize>,
}

impl MockProvider {
    pub fn with(mut self, customer_id: &str, outcome: Outcome) -> Self {
        self.applicants.insert(customer_id.into(), outcome);
        self
    }

    pub fn with_delay(mut self, customer_id: &str, delay: Duration) -> Self {
        self.delays.insert(customer_id.into(), delay);
        self
    }
}

impl KycProvider for MockProvider {
    async fn fetch_applicant(&self, customer_id: &str) -> Result<String, SumsubError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(customer_id) {
            tokio::time::sleep(*delay).await;
        }
        self.applicants
            .get(customer_id)
            .cloned()
            .unwrap_or_else(|| Outcome::Body(format!(r#"{{"externalUserId":"{customer_id}"}}"#)))
            .into_result()
    }

    async fn document_metadata(&self, applicant_id: &str) -> Result<String, SumsubError> {
        self.metadata
            .get(applicant_id)
            .cloned()
            .unwrap_or_else(|| Outcome::Api(404, "no documents".into()))
            .into_result()
    }

    async fn document_image(
        &self,
        _inspection_id: &str,
        image_id: &str,
    ) -> Result<Option<String>, SumsubError> {
        match self.images.get(image_id) {
            Some(image) => Ok(image.clone()),
            None => Err(SumsubError::Timeout),
        }
    }
}

pub fn event(customer_id: &str, changed_at: DateTime<Utc>) -> ChangeEvent {
    ChangeEvent {
        customer_id: customer_id.into(),
        changed_at,
    }
}
