use std::{future::Future, io::Write, sync::Mutex};

use serde::{Deserialize, Serialize};

use changelog::Watermark;

use crate::model::{DocumentRecord, ExtractedRecord, APPLICANTS_STREAM, DOCUMENTS_STREAM};

/// Downstream consumer of a run's output.
pub trait RecordSink {
    fn write_record(
        &self,
        record: &ExtractedRecord,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn write_document(
        &self,
        record: &DocumentRecord,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Called once, after every record of the run has been written.
    fn write_state(&self, watermark: Watermark) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Replication state handed back to the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub bookmarks: Bookmarks,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmarks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicants: Option<Bookmark>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub recorded_at: Watermark,
}

impl State {
    pub fn at(watermark: Watermark) -> Self {
        Self {
            bookmarks: Bookmarks {
                applicants: Some(Bookmark {
                    recorded_at: watermark,
                }),
            },
        }
    }

    pub fn watermark(&self) -> Option<Watermark> {
        self.bookmarks.applicants.map(|b| b.recorded_at)
    }
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum RecordRef<'a> {
    Applicant(&'a ExtractedRecord),
    Document(&'a DocumentRecord),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputMessage<'a> {
    Record {
        stream: &'static str,
        record: RecordRef<'a>,
    },
    State {
        value: State,
    },
}

/// Writes one JSON message per line.
pub struct JsonLinesSink<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, message: &OutputMessage<'_>) -> anyhow::Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| anyhow::anyhow!("output writer poisoned"))?;
        serde_json::to_writer(&mut *out, message)?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> RecordSink for JsonLinesSink<W> {
    async fn write_record(&self, record: &ExtractedRecord) -> anyhow::Result<()> {
        self.emit(&OutputMessage::Record {
            stream: APPLICANTS_STREAM,
            record: RecordRef::Applicant(record),
        })
    }

    async fn write_document(&self, record: &DocumentRecord) -> anyhow::Result<()> {
        self.emit(&OutputMessage::Record {
            stream: DOCUMENTS_STREAM,
            record: RecordRef::Document(record),
        })
    }

    async fn write_state(&self, watermark: Watermark) -> anyhow::Result<()> {
        self.emit(&OutputMessage::State {
            value: State::at(watermark),
        })
    }
}
