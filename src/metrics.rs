use metrics::{counter, histogram};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::extractor::SkipReason;

/// Metric names emitted through the `metrics` facade
#[derive(Debug, Clone, Copy)]
pub struct MetricNames {
    /// Shift rows read from documents
    pub rows_seen_total: &'static str,
    /// Rows without a usable date
    pub rows_skipped_total: &'static str,
    /// Shift records produced
    pub shifts_extracted_total: &'static str,
    /// Events written to calendars
    pub events_encoded_total: &'static str,
    /// Records that produced no event
    pub records_dropped_total: &'static str,
    /// Calendar documents generated
    pub calendars_built_total: &'static str,
    /// Histogram of conversion time in seconds
    pub conversion_duration: &'static str,
}

impl Default for MetricNames {
    fn default() -> Self {
        Self {
            rows_seen_total: "myschedule_rows_seen_total",
            rows_skipped_total: "myschedule_rows_skipped_total",
            shifts_extracted_total: "myschedule_shifts_extracted_total",
            events_encoded_total: "myschedule_events_encoded_total",
            records_dropped_total: "myschedule_records_dropped_total",
            calendars_built_total: "myschedule_calendars_built_total",
            conversion_duration: "myschedule_conversion_duration_seconds",
        }
    }
}

#[derive(Debug, Default)]
struct Tallies {
    rows_seen: AtomicU64,
    rows_skipped: AtomicU64,
    shifts_extracted: AtomicU64,
    events_encoded: AtomicU64,
    records_dropped: AtomicU64,
    calendars_built: AtomicU64,
}

/// Point-in-time copy of the pipeline counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Rows read
    pub rows_seen: u64,
    /// Rows skipped
    pub rows_skipped: u64,
    /// Records extracted
    pub shifts_extracted: u64,
    /// Events encoded
    pub events_encoded: u64,
    /// Records dropped by the encoder
    pub records_dropped: u64,
    /// Calendars built
    pub calendars_built: u64,
}

/// Pipeline metrics: forwarded to the global recorder and tallied locally.
///
/// Clones share the same tallies.
#[derive(Debug, Clone, Default)]
pub struct PipelineMetrics {
    names: MetricNames,
    tallies: Arc<Tallies>,
}

impl PipelineMetrics {
    /// Metric names in use
    #[must_use]
    pub const fn names(&self) -> &MetricNames {
        &self.names
    }

    /// Record one schedule row entity examined
    pub fn record_row_seen(&self) {
        counter!(self.names.rows_seen_total).increment(1);
        self.tallies.rows_seen.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one schedule row dropped
    pub fn record_row_skipped(&self, reason: SkipReason) {
        counter!(self.names.rows_skipped_total, "reason" => reason.as_str()).increment(1);
        self.tallies.rows_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the size of one extraction result
    pub fn record_shifts_extracted(&self, count: usize) {
        counter!(self.names.shifts_extracted_total).increment(count as u64);
        self.tallies
            .shifts_extracted
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record one generated calendar and its event count
    pub fn record_calendar_built(&self, events: usize) {
        counter!(self.names.calendars_built_total).increment(1);
        counter!(self.names.events_encoded_total).increment(events as u64);
        self.tallies.calendars_built.fetch_add(1, Ordering::Relaxed);
        self.tallies
            .events_encoded
            .fetch_add(events as u64, Ordering::Relaxed);
    }

    /// Record one shift record the encoder could not place on the calendar
    pub fn record_record_dropped(&self, reason: &'static str) {
        counter!(self.names.records_dropped_total, "reason" => reason).increment(1);
        self.tallies.records_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record end-to-end conversion time
    pub fn record_conversion(&self, duration: Duration, stored: bool) {
        histogram!(
            self.names.conversion_duration,
            "stored" => if stored { "true" } else { "false" }
        )
        .record(duration.as_secs_f64());
    }

    /// Current counter values
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            rows_seen: self.tallies.rows_seen.load(Ordering::Relaxed),
            rows_skipped: self.tallies.rows_skipped.load(Ordering::Relaxed),
            shifts_extracted: self.tallies.shifts_extracted.load(Ordering::Relaxed),
            events_encoded: self.tallies.events_encoded.load(Ordering::Relaxed),
            records_dropped: self.tallies.records_dropped.load(Ordering::Relaxed),
            calendars_built: self.tallies.calendars_built.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        let metrics = PipelineMetrics::default();
        assert_eq!(metrics.names().rows_seen_total, "myschedule_rows_seen_total");
    }

    #[test]
    fn test_clones_share_tallies() {
        let metrics = PipelineMetrics::default();
        let clone = metrics.clone();
        clone.record_row_seen();
        clone.record_row_skipped(SkipReason::Duplicate);
        assert_eq!(metrics.snapshot().rows_seen, 1);
        assert_eq!(metrics.snapshot().rows_skipped, 1);
    }
}
