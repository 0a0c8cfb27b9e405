//! Data models for schedule extraction and calendar generation
//!
//! This module contains the structures that flow through the pipeline:
//! upstream document entities, normalized shift records, and the calendar
//! events derived from them.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One annotated span produced by the document-understanding service.
///
/// Field names follow the service's JSON output. Both the camelCase form and
/// the snake_case form some client libraries emit are accepted, and every
/// field defaults when missing so partial rows still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentEntity {
    /// Entity label, e.g. `Work-shift` or `PageDateRange`
    #[serde(rename = "type", alias = "type_", alias = "kind")]
    pub kind: String,
    /// Recognized text, possibly spanning several layout lines
    #[serde(rename = "mentionText", alias = "mention_text", alias = "text")]
    pub text: String,
    /// Recognition confidence in `[0, 1]`; carried but never used for filtering
    pub confidence: f64,
    /// Nested fields, one per column of a schedule row
    pub properties: Vec<DocumentEntity>,
    /// Page reference, kept for diagnostics only
    #[serde(
        rename = "pageAnchor",
        alias = "page_anchor",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_anchor: Option<PageAnchor>,
    /// Upstream identifier, kept for diagnostics only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl DocumentEntity {
    /// Create an entity with a kind and text and nothing else
    #[must_use]
    pub fn new(kind: &str, text: &str) -> Self {
        Self {
            kind: kind.to_string(),
            text: text.to_string(),
            confidence: 1.0,
            ..Self::default()
        }
    }

    /// Attach a nested property
    #[must_use]
    pub fn with_property(mut self, kind: &str, text: &str) -> Self {
        self.properties.push(Self::new(kind, text));
        self
    }

    /// Page number of the first page reference, if the service supplied one
    #[must_use]
    pub fn page(&self) -> Option<u32> {
        self.page_anchor
            .as_ref()
            .and_then(|anchor| anchor.page_refs.first())
            .and_then(|page_ref| page_ref.page.as_ref())
            .and_then(PageNumber::as_u32)
    }
}

/// Page anchor attached to an entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageAnchor {
    /// Referenced pages
    #[serde(rename = "pageRefs", alias = "page_refs")]
    pub page_refs: Vec<PageRef>,
}

/// A single page reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRef {
    /// Zero-based page index; the service omits it for page 0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageNumber>,
}

/// Page numbers arrive as JSON numbers or as numeric strings (int64 fields)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageNumber {
    /// Plain JSON number
    Number(u32),
    /// Numeric string
    Text(String),
}

impl PageNumber {
    fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// A validated, deduplicated work shift
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRecord {
    /// Calendar date of the shift start
    pub date: NaiveDate,
    /// Start time as printed, e.g. `11:30 AM`
    pub start_time: String,
    /// End time as printed, e.g. `8:00 PM`
    pub end_time: String,
    /// Department label with the trailing ` Associate` removed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Store or work location code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_number: Option<String>,
    /// Printed shift length, descriptive only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_total: Option<String>,
    /// Printed meal break window, descriptive only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_window: Option<String>,
}

impl ShiftRecord {
    /// Create a record with only the required fields set
    #[must_use]
    pub fn new(date: NaiveDate, start_time: &str, end_time: &str) -> Self {
        Self {
            date,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            department: None,
            store_number: None,
            shift_total: None,
            meal_window: None,
        }
    }
}

/// One event in a generated calendar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    /// Wall-clock start
    pub start: NaiveDateTime,
    /// Wall-clock end, always after `start`
    pub end: NaiveDateTime,
    /// Short title
    pub summary: String,
    /// Multi-line human-readable details
    pub description: String,
    /// Stable identifier derived from the event's own fields
    pub uid: String,
}

/// How shift records are reduced to calendar events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReductionPolicy {
    /// One event per shift record
    #[default]
    PerRecord,
    /// One event per calendar day; the first record seen for a day wins
    OnePerDay,
}

impl ReductionPolicy {
    /// Configuration spelling of this policy
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PerRecord => "per-record",
            Self::OnePerDay => "one-per-day",
        }
    }
}

impl std::str::FromStr for ReductionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "per-record" | "per_record" => Ok(Self::PerRecord),
            "one-per-day" | "one_per_day" => Ok(Self::OnePerDay),
            other => Err(format!(
                "Unknown reduction policy: {other}. Must be one of: per-record, one-per-day"
            )),
        }
    }
}
