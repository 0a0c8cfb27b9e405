//! Calendar generation from shift records.
//!
//! Produces an iCalendar document with one `VEVENT` per shift. Event UIDs are
//! a SHA-1 of the event's own fields, so re-importing a regenerated calendar
//! updates existing entries instead of duplicating them.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use sha1::{Digest, Sha1};
use tracing::{debug, error, info, warn};

use crate::config::CalendarConfig;
use crate::datetime::{combine, ScheduleParser};
use crate::error::Result;
use crate::ics::IcsWriter;
use crate::metrics::PipelineMetrics;
use crate::models::{CalendarEvent, ReductionPolicy, ShiftRecord};

/// MIME type for generated calendars
pub const CALENDAR_CONTENT_TYPE: &str = "text/calendar";
/// File extension for generated calendars
pub const CALENDAR_FILE_EXTENSION: &str = "ics";

const DEFAULT_SUMMARY: &str = "Work Shift";
const WALL_CLOCK_FORMAT: &str = "%Y%m%dT%H%M%S";
const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const UID_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Builds calendar documents from shift records
#[derive(Debug, Clone)]
pub struct CalendarEncoder {
    config: CalendarConfig,
    parser: ScheduleParser,
    generated_at: Option<DateTime<Utc>>,
    metrics: PipelineMetrics,
}

impl CalendarEncoder {
    /// Create an encoder with the given calendar settings
    pub fn new(config: CalendarConfig) -> Result<Self> {
        Ok(Self {
            config,
            parser: ScheduleParser::new()?,
            generated_at: None,
            metrics: PipelineMetrics::default(),
        })
    }

    /// Stamp events with a fixed instant instead of the current time
    #[must_use]
    pub const fn with_generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// Share a metrics handle with other pipeline stages
    #[must_use]
    pub fn with_metrics(mut self, metrics: PipelineMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Serialize `records` into a calendar document.
    ///
    /// An unknown `timezone` falls back to floating local time. Records that
    /// cannot be placed on the calendar are skipped; an empty input produces a
    /// valid calendar with no events.
    #[must_use]
    pub fn build_calendar(
        &self,
        records: &[ShiftRecord],
        calendar_name: &str,
        timezone: Option<&str>,
    ) -> Vec<u8> {
        let tz = resolve_timezone(timezone);
        let events = self.build_events(records, calendar_name, tz);
        let bytes = self.encode(&events, calendar_name, tz);

        self.metrics.record_calendar_built(events.len());
        info!(
            events = events.len(),
            records = records.len(),
            calendar = calendar_name,
            timezone = ?tz.map(|tz| tz.name()),
            "Calendar generated"
        );
        bytes
    }

    /// Turn records into chronologically ordered events
    #[must_use]
    pub fn build_events(
        &self,
        records: &[ShiftRecord],
        calendar_name: &str,
        tz: Option<Tz>,
    ) -> Vec<CalendarEvent> {
        let one_per_day = matches!(self.config.reduction, ReductionPolicy::OnePerDay);
        let mut days = HashSet::new();

        // A day is claimed by its first record that yields an event
        let mut events: Vec<CalendarEvent> = records
            .iter()
            .filter_map(|record| {
                if one_per_day && days.contains(&record.date) {
                    debug!(
                        date = %record.date,
                        start = %record.start_time,
                        "Dropping additional shift for day"
                    );
                    return None;
                }
                let event = self.build_event(record, calendar_name, tz)?;
                if one_per_day {
                    days.insert(record.date);
                }
                Some(event)
            })
            .collect();

        events.sort_by_key(|event| event.start);
        events
    }

    fn build_event(
        &self,
        record: &ShiftRecord,
        calendar_name: &str,
        tz: Option<Tz>,
    ) -> Option<CalendarEvent> {
        let start_time = self.resolve_time(&record.start_time)?;
        let end_time = self.resolve_time(&record.end_time)?;

        let start = combine(record.date, start_time);
        let mut end = combine(record.date, end_time);
        // Overnight shift
        if end < start {
            end += Duration::days(1);
        }

        if let Some(tz) = tz {
            for instant in [start, end] {
                if tz.from_local_datetime(&instant).earliest().is_none() {
                    warn!(
                        %instant,
                        timezone = tz.name(),
                        "SKIP: shift time does not exist in timezone"
                    );
                    self.metrics.record_record_dropped("nonexistent_local_time");
                    return None;
                }
            }
        }

        let summary = self
            .config
            .summary
            .clone()
            .or_else(|| record.department.clone())
            .unwrap_or_else(|| DEFAULT_SUMMARY.to_string());

        let uid_name = self
            .config
            .uid_includes_calendar_name
            .then_some(calendar_name);

        Some(CalendarEvent {
            start,
            end,
            summary,
            description: describe(record),
            uid: event_uid(
                start,
                end,
                record.department.as_deref(),
                record.store_number.as_deref(),
                uid_name,
            ),
        })
    }

    /// Parse a time token, applying the midnight fallback unless strict
    fn resolve_time(&self, token: &str) -> Option<NaiveTime> {
        if let Some(time) = self.parser.parse_time(token) {
            return Some(time);
        }

        if self.config.strict_times {
            warn!(token, "SKIP: unparseable shift time");
            self.metrics.record_record_dropped("invalid_time");
            None
        } else {
            error!(token, "Failed to parse time string, defaulting to midnight");
            NaiveTime::from_hms_opt(0, 0, 0)
        }
    }

    fn encode(&self, events: &[CalendarEvent], calendar_name: &str, tz: Option<Tz>) -> Vec<u8> {
        let stamp = self
            .generated_at
            .unwrap_or_else(Utc::now)
            .format(UTC_FORMAT)
            .to_string();

        let mut w = IcsWriter::new();
        w.begin("VCALENDAR");
        w.text_property("PRODID", &self.config.product_id);
        w.property("VERSION", "2.0");
        w.property("CALSCALE", "GREGORIAN");
        w.property("METHOD", "PUBLISH");
        w.text_property("X-WR-CALNAME", calendar_name);
        if let Some(tz) = tz {
            w.text_property("X-WR-TIMEZONE", tz.name());
        }

        for event in events {
            w.begin("VEVENT");
            w.property("UID", &event.uid);
            w.property("DTSTAMP", &stamp);
            write_timestamp(&mut w, "DTSTART", event.start, tz);
            write_timestamp(&mut w, "DTEND", event.end, tz);
            w.text_property("SUMMARY", &event.summary);
            w.text_property("DESCRIPTION", &event.description);
            w.property("LAST-MODIFIED", &stamp);
            w.end("VEVENT");
        }

        w.end("VCALENDAR");
        w.into_bytes()
    }
}

/// Write a date-time property.
///
/// Without a zone the wall-clock value is written as floating time. With a
/// zone it is resolved to an absolute instant and written in UTC.
fn write_timestamp(w: &mut IcsWriter, name: &str, at: NaiveDateTime, tz: Option<Tz>) {
    let utc = tz.and_then(|tz| tz.from_local_datetime(&at).earliest());
    let value = match utc {
        Some(instant) => instant.with_timezone(&Utc).format(UTC_FORMAT).to_string(),
        None => at.format(WALL_CLOCK_FORMAT).to_string(),
    };
    w.property(name, &value);
}

/// Resolve an IANA timezone name; unknown or blank names yield `None`
#[must_use]
pub fn resolve_timezone(name: Option<&str>) -> Option<Tz> {
    let name = name.map(str::trim).filter(|n| !n.is_empty())?;
    match name.parse::<Tz>() {
        Ok(tz) => Some(tz),
        Err(_) => {
            warn!(timezone = name, "Unknown timezone, using floating local time");
            None
        }
    }
}

/// Stable identifier for an event.
///
/// Lowercase hex SHA-1 of `start-end-department-store`, timestamps in
/// `YYYY-MM-DDTHH:MM:SS`, absent fields as empty strings. When a calendar
/// name is given it is appended as a final `-name` segment.
#[must_use]
pub fn event_uid(
    start: NaiveDateTime,
    end: NaiveDateTime,
    department: Option<&str>,
    store_number: Option<&str>,
    calendar_name: Option<&str>,
) -> String {
    let mut source = format!(
        "{}-{}-{}-{}",
        start.format(UID_TIMESTAMP_FORMAT),
        end.format(UID_TIMESTAMP_FORMAT),
        department.unwrap_or_default(),
        store_number.unwrap_or_default()
    );
    if let Some(name) = calendar_name {
        source.push('-');
        source.push_str(name);
    }

    let mut hasher = Sha1::new();
    hasher.update(source.as_bytes());
    hex::encode(hasher.finalize())
}

/// Human-readable event description, one detail per line
#[must_use]
pub fn describe(record: &ShiftRecord) -> String {
    let mut lines = vec![
        format!("{} - {}", record.start_time, record.end_time),
        record.date.format("%A, %b %d, %Y").to_string(),
    ];
    if let Some(department) = &record.department {
        lines.push(department.clone());
    }
    if let Some(store) = &record.store_number {
        lines.push(store.clone());
    }
    if let Some(total) = &record.shift_total {
        lines.push(format!("Shift Total: {total}"));
    }
    if let Some(meal) = &record.meal_window {
        lines.push(format!("Meal: {meal}"));
    }
    lines.join("\n")
}

/// Download file name for a calendar, e.g. `work-schedule.ics`
#[must_use]
pub fn suggested_file_name(calendar_name: &str) -> String {
    let stem: String = calendar_name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    let stem = stem.trim_matches('-');
    let stem = if stem.is_empty() { "schedule" } else { stem };
    format!("{stem}.{CALENDAR_FILE_EXTENSION}")
}
