//! Records stored in the backing repository.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Envelope format written into every new state document.
pub const ENVELOPE_VERSION: u32 = 1;

/// Recorded as `meta.source` on documents saved by this service.
pub const SOURCE: &str = "calendar-api";

/// `meta.saved_by` when the client does not say who saved.
pub const DEFAULT_SAVED_BY: &str = "web";

/// Format a timestamp the way it is stored: RFC 3339, UTC, milliseconds, `Z` suffix.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// An immutable snapshot of calendar data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    pub version: u32,
    pub year: Value,
    pub days: Map<String, Value>,
    pub meta: StateMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMeta {
    pub saved_at: String,
    pub saved_by: String,
    pub source: String,
}

impl StateDocument {
    pub fn new(
        year: Value,
        days: Map<String, Value>,
        saved_by: Option<String>,
        saved_at: DateTime<Utc>,
    ) -> Self {
        let saved_by = saved_by
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SAVED_BY.to_string());

        StateDocument {
            version: ENVELOPE_VERSION,
            year,
            days,
            meta: StateMeta {
                saved_at: format_timestamp(saved_at),
                saved_by,
                source: SOURCE.to_string(),
            },
        }
    }
}

/// The singleton record naming the current version document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestPointer {
    pub current: String,
    #[serde(default)]
    pub updated_at: String,
}

impl LatestPointer {
    pub fn new(current: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        LatestPointer {
            current: current.into(),
            updated_at: format_timestamp(updated_at),
        }
    }
}
