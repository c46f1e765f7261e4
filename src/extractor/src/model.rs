use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use changelog::Watermark;

pub const APPLICANTS_STREAM: &str = "applicants";
pub const DOCUMENTS_STREAM: &str = "applicant_documents";

/// What the provider returned for a customer, or why it could not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordContent {
    /// Response body exactly as received.
    Payload(String),
    Error { error: String },
}

impl RecordContent {
    pub fn error(error: impl ToString) -> Self {
        Self::Error {
            error: error.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Wire form: the raw payload, or `{"error":"..."}`.
    pub fn render(&self) -> String {
        match self {
            Self::Payload(payload) => payload.clone(),
            Self::Error { error } => error_marker(error),
        }
    }
}

impl Serialize for RecordContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Payload(payload) => serializer.serialize_str(payload),
            Self::Error { error } => serializer.serialize_str(&error_marker(error)),
        }
    }
}

fn error_marker(error: &str) -> String {
    serde_json::json!({ "error": error }).to_string()
}

/// One row of the applicants stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedRecord {
    pub customer_id: String,
    /// `changed_at` of the change event that triggered the fetch.
    pub recorded_at: DateTime<Utc>,
    pub content: RecordContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentContent {
    /// Base64-encoded image bytes.
    Image(String),
    /// The provider had nothing to serve for this image.
    Missing,
    Error(String),
}

impl DocumentContent {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl Serialize for DocumentContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Image(image) => serializer.serialize_str(image),
            Self::Missing => serializer.serialize_none(),
            Self::Error(error) => serializer.serialize_str(&error_marker(error)),
        }
    }
}

/// One row of the applicant documents stream.
///
/// `image_id` is `None` when the document listing itself failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRecord {
    pub customer_id: String,
    pub recorded_at: DateTime<Utc>,
    pub applicant_id: Option<String>,
    pub image_id: Option<String>,
    pub content: DocumentContent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub emitted: usize,
    pub failed: usize,
    pub documents: usize,
    /// Where the next run should resume from.
    pub watermark: Option<Watermark>,
}
