//! One-call conversion from upstream entities to a calendar.
//!
//! The service hands its results straight back to the caller. When a store is
//! attached, each conversion is also kept under its own job id.

use std::path::Path;

use tracing::{info, warn};

use crate::calendar::CalendarEncoder;
use crate::config::AppConfig;
use crate::error::{Result, ScheduleError};
use crate::extractor::{entities_from_value, ShiftExtractor};
use crate::logging::OperationTimer;
use crate::metrics::PipelineMetrics;
use crate::models::{DocumentEntity, ShiftRecord};
use crate::store::{ScheduleStore, StoredSchedule};
use crate::validation::InputValidator;

/// Parameters of one upload-to-calendar conversion
#[derive(Debug, Clone, Copy)]
pub struct ConversionRequest<'a> {
    /// Display name of the generated calendar
    pub calendar_name: &'a str,
    /// IANA timezone; falls back to the service default when unset
    pub timezone: Option<&'a str>,
    /// Uploader email, kept with a stored conversion
    pub owner_email: Option<&'a str>,
}

/// Result of one conversion, returned straight to the caller
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Extracted shift records, in document order
    pub shifts: Vec<ShiftRecord>,
    /// Generated calendar document
    pub calendar: Vec<u8>,
    /// Present when the service has a store attached
    pub job_id: Option<String>,
}

impl Conversion {
    /// True when no shifts were found; the calendar is still valid
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }
}

/// Runs extraction and encoding, optionally persisting the result
pub struct ScheduleService {
    extractor: ShiftExtractor,
    encoder: CalendarEncoder,
    store: Option<ScheduleStore>,
    default_timezone: Option<String>,
    metrics: PipelineMetrics,
}

impl ScheduleService {
    /// Wire the pipeline stages together with one shared metrics handle
    pub fn new(
        extractor: ShiftExtractor,
        encoder: CalendarEncoder,
        store: Option<ScheduleStore>,
    ) -> Self {
        let metrics = PipelineMetrics::default();
        Self {
            extractor: extractor.with_metrics(metrics.clone()),
            encoder: encoder.with_metrics(metrics.clone()),
            store,
            default_timezone: None,
            metrics,
        }
    }

    /// Timezone used when a request does not name one
    #[must_use]
    pub fn with_default_timezone(mut self, timezone: Option<String>) -> Self {
        self.default_timezone = timezone;
        self
    }

    /// Build the service described by `config`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let extractor = ShiftExtractor::new(config.extraction.clone())?;
        let encoder = CalendarEncoder::new(config.calendar.clone())?;
        let store = if config.storage.enabled {
            Some(ScheduleStore::open(Path::new(&config.storage.path))?)
        } else {
            None
        };
        Ok(Self::new(extractor, encoder, store).with_default_timezone(config.get_timezone()))
    }

    /// Counters shared by every stage of this service
    pub const fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Convert an entity list into shift records and a calendar
    pub fn convert(
        &self,
        entities: &[DocumentEntity],
        request: &ConversionRequest<'_>,
    ) -> Result<Conversion> {
        let timer = OperationTimer::new("convert_schedule");

        let calendar_name = InputValidator::sanitize_text(request.calendar_name);
        let timezone = request.timezone.or(self.default_timezone.as_deref());

        let shifts = self.extractor.extract_shifts(entities);
        if shifts.is_empty() {
            warn!("No schedule data found in document");
        }

        let calendar = self
            .encoder
            .build_calendar(&shifts, &calendar_name, timezone);

        let job_id = match &self.store {
            Some(store) => Some(store.create(
                &calendar_name,
                request.owner_email,
                &shifts,
                &calendar,
            )?),
            None => None,
        };

        self.metrics
            .record_conversion(timer.finish(), job_id.is_some());
        info!(shifts = shifts.len(), job_id = ?job_id, "Schedule converted");

        Ok(Conversion {
            shifts,
            calendar,
            job_id,
        })
    }

    /// Convert raw upstream JSON; unreadable input converts to an empty schedule
    pub fn convert_json(&self, json: &str, request: &ConversionRequest<'_>) -> Result<Conversion> {
        let entities: Vec<DocumentEntity> = match serde_json::from_str::<serde_json::Value>(json) {
            Ok(value) => entities_from_value(&value),
            Err(e) => {
                warn!(error = %e, "Entity input is not valid JSON");
                Vec::new()
            }
        };
        self.convert(&entities, request)
    }

    /// Fetch a previously stored conversion
    pub fn fetch(&self, job_id: &str) -> Result<StoredSchedule> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| ScheduleError::InvalidConfig("schedule storage is not enabled".to_string()))?;
        store.get(job_id)
    }
}
