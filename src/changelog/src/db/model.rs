use std::{fmt, str::FromStr};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

use crate::ChangeLogError;

/// Replication position: the latest `changed_at` accounted for by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watermark(DateTime<Utc>);

impl Watermark {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Moves the watermark forward to `at`, never backwards.
    pub fn advance(current: Option<Self>, at: DateTime<Utc>) -> Option<Self> {
        Some(current.map_or(Self(at), |current| current.max(Self(at))))
    }
}

impl From<DateTime<Utc>> for Watermark {
    fn from(at: DateTime<Utc>) -> Self {
        Self(at)
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl FromStr for Watermark {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub customer_id: String,
    pub changed_at: DateTime<Utc>,
}

impl TryFrom<&Row> for ChangeEvent {
    type Error = ChangeLogError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        let customer_id = row.try_get("customer_id").map_err(ChangeLogError::Row)?;
        let changed_at = row.try_get("recorded_at").map_err(ChangeLogError::Row)?;

        Ok(Self {
            customer_id,
            changed_at,
        })
    }
}
