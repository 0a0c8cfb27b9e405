//! Property-based tests for parsing, deduplication, and event identity

use chrono::{NaiveDate, NaiveTime, Timelike};
use proptest::prelude::*;

use myschedule_rust::calendar::event_uid;
use myschedule_rust::config::{CalendarConfig, ExtractionConfig};
use myschedule_rust::datetime::ScheduleParser;
use myschedule_rust::{CalendarEncoder, DocumentEntity, ShiftExtractor, ShiftRecord};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn clock(hour: u32, minute: u32) -> String {
    let (display, meridiem) = match hour {
        0 => (12, "AM"),
        1..=11 => (hour, "AM"),
        12 => (12, "PM"),
        _ => (hour - 12, "PM"),
    };
    format!("{display}:{minute:02} {meridiem}")
}

fn row(month: usize, day: u32, start: &str, end: &str) -> DocumentEntity {
    DocumentEntity::new("Work-shift", "")
        .with_property("Shift-date", &format!("{} {day}", MONTHS[month]))
        .with_property("Start-start", start)
        .with_property("Shift-end", end)
}

proptest! {
    #[test]
    fn prop_clock_times_parse(hour in 0u32..24, minute in 0u32..60) {
        let parser = ScheduleParser::new().unwrap();
        let parsed = parser.parse_time(&clock(hour, minute));
        prop_assert_eq!(parsed, NaiveTime::from_hms_opt(hour, minute, 0));
    }

    #[test]
    fn prop_parse_time_never_panics(token in "\\PC{0,16}") {
        let parser = ScheduleParser::new().unwrap();
        if let Some(time) = parser.parse_time(&token) {
            prop_assert!(time.hour() < 24);
        }
    }

    #[test]
    fn prop_duplicate_rows_collapse(
        rows in prop::collection::vec((0usize..12, 1u32..29, 0u32..24, 0u32..24), 0..12)
    ) {
        let extractor = ShiftExtractor::new(ExtractionConfig::default())
            .unwrap()
            .with_fallback_year(2025);

        let entities: Vec<DocumentEntity> = rows
            .iter()
            .map(|&(month, day, start, end)| row(month, day, &clock(start, 0), &clock(end, 0)))
            .collect();
        let doubled: Vec<DocumentEntity> = entities.iter().chain(entities.iter()).cloned().collect();

        let once = extractor.extract_shifts(&entities);
        let twice = extractor.extract_shifts(&doubled);
        prop_assert_eq!(&once, &twice);

        let mut keys: Vec<(NaiveDate, &str)> =
            once.iter().map(|s| (s.date, s.start_time.as_str())).collect();
        keys.sort_unstable();
        keys.dedup();
        prop_assert_eq!(keys.len(), once.len());
    }

    #[test]
    fn prop_events_sorted_and_positive(
        shifts in prop::collection::vec((1u32..29, 0u32..24, 0u32..24), 0..12)
    ) {
        let records: Vec<ShiftRecord> = shifts
            .iter()
            .map(|&(day, start, end)| {
                ShiftRecord::new(
                    NaiveDate::from_ymd_opt(2025, 9, day).unwrap(),
                    &clock(start, 0),
                    &clock(end, 0),
                )
            })
            .collect();

        let encoder = CalendarEncoder::new(CalendarConfig::default()).unwrap();
        let events = encoder.build_events(&records, "work-schedule", None);

        prop_assert_eq!(events.len(), records.len());
        for pair in events.windows(2) {
            prop_assert!(pair[0].start <= pair[1].start);
        }
        for event in &events {
            prop_assert!(event.end >= event.start);
            prop_assert!(event.end - event.start < chrono::Duration::days(1));
        }
    }

    #[test]
    fn prop_uid_deterministic(
        day in 1u32..29,
        hour in 0u32..24,
        department in "[A-Za-z &]{0,20}",
        store in "[0-9]{4}",
    ) {
        let start = NaiveDate::from_ymd_opt(2025, 9, day).unwrap().and_hms_opt(hour, 0, 0).unwrap();
        let end = start + chrono::Duration::hours(8);

        let a = event_uid(start, end, Some(&department), Some(&store), None);
        let b = event_uid(start, end, Some(&department), Some(&store), None);
        prop_assert_eq!(&a, &b);

        let other_store = format!("{store}1");
        let c = event_uid(start, end, Some(&department), Some(&other_store), None);
        prop_assert_ne!(a, c);
    }
}
