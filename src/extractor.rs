//! Shift extraction from document-understanding entities.
//!
//! The upstream service emits one `Work-shift` entity per visual row, with the
//! row's columns as nested properties. Rows are frequently partial (a date
//! with no times) or repeated across page boundaries; this module keeps only
//! complete, first-seen rows and never fails the batch because of one bad row.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ExtractionConfig;
use crate::datetime::{current_year, parse_shift_date, ScheduleParser};
use crate::error::Result;
use crate::fields::ShiftField;
use crate::metrics::PipelineMetrics;
use crate::models::{DocumentEntity, ShiftRecord};

/// Why a schedule row was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The row entity had no properties at all
    NoProperties,
    /// No date column, or the date text did not parse
    InvalidDate,
    /// Start or end time text was missing
    MissingTime,
    /// Same date and start time as an earlier row
    Duplicate,
}

impl SkipReason {
    /// Label used in logs and metrics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoProperties => "no_properties",
            Self::InvalidDate => "invalid_date",
            Self::MissingTime => "missing_time",
            Self::Duplicate => "duplicate",
        }
    }
}

/// Columns collected from one row before validation
#[derive(Debug, Default)]
struct RowFields {
    date: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    store_number: Option<String>,
    department: Option<String>,
    shift_total: Option<String>,
    meal_window: Option<String>,
}

impl RowFields {
    fn from_properties(properties: &[DocumentEntity]) -> Self {
        let mut row = Self::default();

        for prop in properties {
            let Some(field) = ShiftField::from_label(&prop.kind) else {
                debug!(label = %prop.kind, "Ignoring unrecognized row property");
                continue;
            };

            // Later duplicates of a column overwrite earlier ones
            let slot = match field {
                ShiftField::Date => &mut row.date,
                ShiftField::StartTime => &mut row.start_time,
                ShiftField::EndTime => &mut row.end_time,
                ShiftField::StoreNumber => &mut row.store_number,
                ShiftField::Department => &mut row.department,
                ShiftField::ShiftTotal => &mut row.shift_total,
                ShiftField::MealWindow => &mut row.meal_window,
            };
            *slot = Some(prop.text.trim().to_string());
        }

        row
    }
}

/// Converts entity lists into deduplicated shift records
#[derive(Debug, Clone)]
pub struct ShiftExtractor {
    config: ExtractionConfig,
    parser: ScheduleParser,
    fallback_year: Option<i32>,
    metrics: PipelineMetrics,
}

impl ShiftExtractor {
    /// Create an extractor with the given labels
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        Ok(Self {
            config,
            parser: ScheduleParser::new()?,
            fallback_year: None,
            metrics: PipelineMetrics::default(),
        })
    }

    /// Use a fixed year instead of the system clock when no year marker is found
    #[must_use]
    pub const fn with_fallback_year(mut self, year: i32) -> Self {
        self.fallback_year = Some(year);
        self
    }

    /// Share a metrics handle with other pipeline stages
    #[must_use]
    pub fn with_metrics(mut self, metrics: PipelineMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Extract shift records from an entity list.
    ///
    /// Rows come back in encounter order. Rows that are incomplete,
    /// unparseable, or repeat an earlier `(date, start time)` pair are dropped
    /// with a log entry.
    #[must_use]
    pub fn extract_shifts(&self, entities: &[DocumentEntity]) -> Vec<ShiftRecord> {
        let year = self.resolve_year(entities);
        let mut seen: HashSet<(NaiveDate, String)> = HashSet::new();
        let mut shifts = Vec::new();

        for entity in entities {
            if !entity.kind.eq_ignore_ascii_case(&self.config.shift_row_kind) {
                continue;
            }
            self.metrics.record_row_seen();

            info!(
                page = ?entity.page(),
                id = ?entity.id,
                "Processing schedule row entity"
            );

            match self.build_record(entity, year, &mut seen) {
                Ok(record) => {
                    debug!(?record, "INCLUDE: extracted shift");
                    shifts.push(record);
                }
                Err(reason) => self.metrics.record_row_skipped(reason),
            }
        }

        self.metrics.record_shifts_extracted(shifts.len());
        info!(shifts = shifts.len(), year, "Shift extraction complete");
        shifts
    }

    /// Extract shift records from raw upstream JSON.
    ///
    /// Accepts either an array of entities or a document object with an
    /// `entities` array. Anything else yields an empty list.
    #[must_use]
    pub fn extract_shifts_from_json(&self, value: &Value) -> Vec<ShiftRecord> {
        self.extract_shifts(&entities_from_value(value))
    }

    /// Year shared by every row of the batch
    fn resolve_year(&self, entities: &[DocumentEntity]) -> i32 {
        let found = entities
            .iter()
            .filter(|entity| {
                self.config
                    .year_marker_kinds
                    .iter()
                    .any(|kind| entity.kind.eq_ignore_ascii_case(kind))
            })
            .find_map(|entity| self.parser.find_year(&entity.text));

        match found {
            Some(year) => {
                debug!(year, "Resolved schedule year from document");
                year
            }
            None => {
                let year = self.fallback_year.unwrap_or_else(current_year);
                debug!(year, "No year marker found, using fallback year");
                year
            }
        }
    }

    fn build_record(
        &self,
        entity: &DocumentEntity,
        year: i32,
        seen: &mut HashSet<(NaiveDate, String)>,
    ) -> std::result::Result<ShiftRecord, SkipReason> {
        if entity.properties.is_empty() {
            debug!(id = ?entity.id, "SKIP: row has no properties");
            return Err(SkipReason::NoProperties);
        }

        let row = RowFields::from_properties(&entity.properties);

        let Some(date) = row
            .date
            .as_deref()
            .and_then(|text| parse_shift_date(text, year))
        else {
            info!(date = ?row.date, id = ?entity.id, "SKIP: no valid date for row");
            return Err(SkipReason::InvalidDate);
        };

        let (Some(start_time), Some(end_time)) = (
            non_empty(row.start_time),
            non_empty(row.end_time),
        ) else {
            info!(%date, id = ?entity.id, "SKIP: missing start or end time");
            return Err(SkipReason::MissingTime);
        };

        if !seen.insert((date, start_time.clone())) {
            info!(%date, start = %start_time, "SKIP: duplicate shift");
            return Err(SkipReason::Duplicate);
        }

        let department = non_empty(row.department).map(|dept| {
            dept.strip_suffix(self.config.department_suffix.as_str())
                .map_or(dept.clone(), |stripped| stripped.trim_end().to_string())
        });

        Ok(ShiftRecord {
            date,
            start_time,
            end_time,
            department: non_empty(department),
            store_number: non_empty(row.store_number),
            shift_total: non_empty(row.shift_total),
            meal_window: non_empty(row.meal_window),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Entity list from an array or a document object.
///
/// Any other shape yields an empty list; array elements that are not
/// entity-shaped are skipped.
#[must_use]
pub fn entities_from_value(value: &Value) -> Vec<DocumentEntity> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("entities") {
            Some(Value::Array(items)) => items,
            _ => {
                warn!("Document has no entities array; nothing to extract");
                return Vec::new();
            }
        },
        _ => {
            warn!("Entity input is neither an array nor a document; nothing to extract");
            return Vec::new();
        }
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            match serde_json::from_value::<DocumentEntity>(item.clone()) {
                Ok(entity) => Some(entity),
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed entity");
                    None
                }
            }
        })
        .collect()
}
