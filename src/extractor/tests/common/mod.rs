pub mod mock_sources;

use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use extractor::{DocumentRecord, ExtractedRecord, RecordSink, Watermark};

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

/// Keeps everything a run writes; can be told to fail on the n-th record.
#[derive(Default)]
pub struct MemorySink {
    pub records: Mutex<Vec<ExtractedRecord>>,
    pub documents: Mutex<Vec<DocumentRecord>>,
    pub states: Mutex<Vec<Watermark>>,
    pub fail_on_record: Option<usize>,
}

impl MemorySink {
    pub fn records(&self) -> Vec<ExtractedRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn documents(&self) -> Vec<DocumentRecord> {
        self.documents.lock().unwrap().clone()
    }

    pub fn states(&self) -> Vec<Watermark> {
        self.states.lock().unwrap().clone()
    }
}

impl RecordSink for MemorySink {
    async fn write_record(&self, record: &ExtractedRecord) -> anyhow::Result<()> {
        let mut records = self.records.lock().unwrap();
        if self.fail_on_record == Some(records.len()) {
            anyhow::bail!("disk full");
        }
        records.push(record.clone());
        Ok(())
    }

    async fn write_document(&self, record: &DocumentRecord) -> anyhow::Result<()> {
        self.documents.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn write_state(&self, watermark: Watermark) -> anyhow::Result<()> {
        self.states.lock().unwrap().push(watermark);
        Ok(())
    }
}
