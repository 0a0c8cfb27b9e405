//! MySchedule - Work Schedule to Calendar Conversion
//!
//! Turns the entities a document-understanding service extracts from a
//! printed work schedule into shift records, and shift records into an
//! iCalendar document that calendar clients can import.
//!
//! # Features
//!
//! - Shift extraction from labelled table rows, tolerant of OCR noise
//! - Year inference from page headers and document titles
//! - RFC 5545 calendar output with stable per-shift identifiers
//! - Optional keyed storage of conversions for later download

/// Calendar event construction and encoding
pub mod calendar;
/// Configuration management
pub mod config;
/// Date and time parsing for schedule text
pub mod datetime;
/// Error types
pub mod error;
/// Shift extraction from document entities
pub mod extractor;
/// Column label normalization for shift rows
pub mod fields;
/// iCalendar content-line writer
pub mod ics;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Conversion service tying the pipeline together
pub mod service;
/// Persistent storage of converted schedules
pub mod store;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use calendar::CalendarEncoder;
pub use config::AppConfig;
pub use error::{Result, ScheduleError};
pub use extractor::ShiftExtractor;
pub use models::{CalendarEvent, DocumentEntity, ReductionPolicy, ShiftRecord};
pub use service::{Conversion, ConversionRequest, ScheduleService};
pub use store::{ScheduleStore, StoredSchedule};
