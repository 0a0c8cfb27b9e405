//! Comprehensive unit tests for extractor.rs module

use chrono::{Datelike, Local, NaiveDate};
use serde_json::json;

use myschedule_rust::config::ExtractionConfig;
use myschedule_rust::{DocumentEntity, ShiftExtractor, ShiftRecord};

fn extractor() -> ShiftExtractor {
    ShiftExtractor::new(ExtractionConfig::default())
        .unwrap()
        .with_fallback_year(2025)
}

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).unwrap()
}

fn plumbing_row() -> DocumentEntity {
    DocumentEntity::new("Work-shift", "Sep 11 11:30 AM 8:00 PM")
        .with_property("Shift-date", "Sep 11")
        .with_property("Start-start", "11:30 AM")
        .with_property("Shift-end", "8:00 PM")
        .with_property("Department", "Plumbing & Bath Associate")
        .with_property("Store-number", "0660")
}

#[test]
fn test_empty_input() {
    assert!(extractor().extract_shifts(&[]).is_empty());
}

#[test]
fn test_full_row() {
    let shifts = extractor().extract_shifts(&[plumbing_row()]);

    let mut expected = ShiftRecord::new(date(9, 11), "11:30 AM", "8:00 PM");
    expected.department = Some("Plumbing & Bath".to_string());
    expected.store_number = Some("0660".to_string());
    assert_eq!(shifts, vec![expected]);
}

#[test]
fn test_unparseable_date_excluded() {
    let entity = DocumentEntity::new("Work-shift", "")
        .with_property("Shift-date", "Not-A-Month 99")
        .with_property("Start-shift", "9:00 AM")
        .with_property("Shift-end", "5:00 PM");

    assert!(extractor().extract_shifts(&[entity, DocumentEntity::default()]).is_empty());
}

#[test]
fn test_identical_rows_deduplicated() {
    let entities = vec![plumbing_row(), plumbing_row()];
    assert_eq!(extractor().extract_shifts(&entities).len(), 1);
}

#[test]
fn test_first_occurrence_wins() {
    let later = DocumentEntity::new("Work-shift", "")
        .with_property("Shift-date", "Sep 11")
        .with_property("Start-shift", "11:30 AM")
        .with_property("Shift-end", "9:00 PM")
        .with_property("Department", "Garden Associate");

    let shifts = extractor().extract_shifts(&[plumbing_row(), later]);
    assert_eq!(shifts.len(), 1);
    assert_eq!(shifts[0].end_time, "8:00 PM");
    assert_eq!(shifts[0].department.as_deref(), Some("Plumbing & Bath"));
}

#[test]
fn test_rows_keep_encounter_order() {
    let row = |day: &str| {
        DocumentEntity::new("Work-shift", "")
            .with_property("Shift-date", day)
            .with_property("Start-shift", "9:00 AM")
            .with_property("Shift-end", "5:00 PM")
    };
    let shifts = extractor().extract_shifts(&[row("Sep 14"), row("Sep 9"), row("Sep 12")]);

    let dates: Vec<NaiveDate> = shifts.iter().map(|s| s.date).collect();
    assert_eq!(dates, vec![date(9, 14), date(9, 9), date(9, 12)]);
}

#[test]
fn test_year_from_document_title() {
    let entities = vec![
        DocumentEntity::new("DocumentTitle", "Associate Schedule 2024"),
        plumbing_row(),
    ];
    let shifts = extractor().extract_shifts(&entities);
    assert_eq!(shifts[0].date, NaiveDate::from_ymd_opt(2024, 9, 11).unwrap());
}

#[test]
fn test_year_defaults_to_current_local_year() {
    let extractor = ShiftExtractor::new(ExtractionConfig::default()).unwrap();
    let shifts = extractor.extract_shifts(&[plumbing_row()]);

    assert_eq!(shifts.len(), 1);
    assert_eq!(shifts[0].date.year(), Local::now().year());
    assert_eq!((shifts[0].date.month(), shifts[0].date.day()), (9, 11));
}

#[test]
fn test_year_marker_ignored_on_other_kinds() {
    let entities = vec![
        DocumentEntity::new("Footer", "Printed 2019"),
        plumbing_row(),
    ];
    let shifts = extractor().extract_shifts(&entities);
    assert_eq!(shifts[0].date, date(9, 11));
}

#[test]
fn test_label_variants_and_case() {
    let entity = DocumentEntity::new("work-shift", "")
        .with_property("SHIFT-DATE", "Oct 2")
        .with_property("start-time", "6:00 AM")
        .with_property("End_Time", "2:30 PM")
        .with_property("dept", "Lumber Associate")
        .with_property("Store", "1234")
        .with_property("Total-hours", "8")
        .with_property("Meal", "10:00 AM - 10:30 AM");

    let shifts = extractor().extract_shifts(&[entity]);
    assert_eq!(shifts.len(), 1);

    let shift = &shifts[0];
    assert_eq!(shift.date, date(10, 2));
    assert_eq!(shift.start_time, "6:00 AM");
    assert_eq!(shift.end_time, "2:30 PM");
    assert_eq!(shift.department.as_deref(), Some("Lumber"));
    assert_eq!(shift.store_number.as_deref(), Some("1234"));
    assert_eq!(shift.shift_total.as_deref(), Some("8"));
    assert_eq!(shift.meal_window.as_deref(), Some("10:00 AM - 10:30 AM"));
}

#[test]
fn test_unknown_labels_ignored() {
    let entity = plumbing_row().with_property("Supervisor", "Pat");
    assert_eq!(extractor().extract_shifts(&[entity]).len(), 1);
}

#[test]
fn test_department_without_suffix_kept() {
    let entity = DocumentEntity::new("Work-shift", "")
        .with_property("Shift-date", "Sep 11")
        .with_property("Start-shift", "9:00 AM")
        .with_property("Shift-end", "5:00 PM")
        .with_property("Department", "Head Cashier");

    let shifts = extractor().extract_shifts(&[entity]);
    assert_eq!(shifts[0].department.as_deref(), Some("Head Cashier"));
}

#[test]
fn test_custom_department_suffix() {
    let config = ExtractionConfig {
        department_suffix: " Supervisor".to_string(),
        ..ExtractionConfig::default()
    };
    let extractor = ShiftExtractor::new(config).unwrap().with_fallback_year(2025);

    let entity = DocumentEntity::new("Work-shift", "")
        .with_property("Shift-date", "Sep 11")
        .with_property("Start-shift", "9:00 AM")
        .with_property("Shift-end", "5:00 PM")
        .with_property("Department", "Front End Supervisor");

    let shifts = extractor.extract_shifts(&[entity]);
    assert_eq!(shifts[0].department.as_deref(), Some("Front End"));
}

#[test]
fn test_extract_from_document_json() {
    let document = json!({
        "text": "ignored",
        "entities": [
            { "type": "PageDateRange", "mentionText": "Sep 8 - Sep 14, 2025" },
            {
                "type": "Work-shift",
                "mentionText": "Sep 11 ...",
                "confidence": 0.97,
                "pageAnchor": { "pageRefs": [{ "page": "1" }] },
                "properties": [
                    { "type": "Shift-date", "mentionText": "Sep\n11" },
                    { "type": "Start-start", "mentionText": "11:30 AM" },
                    { "type": "Shift-end", "mentionText": "8:00 PM" }
                ]
            },
            "not an entity"
        ]
    });

    let shifts = extractor().extract_shifts_from_json(&document);
    assert_eq!(shifts.len(), 1);
    assert_eq!(shifts[0].date, date(9, 11));
}

#[test]
fn test_extract_from_unexpected_json_shapes() {
    let extractor = extractor();
    assert!(extractor.extract_shifts_from_json(&json!(null)).is_empty());
    assert!(extractor.extract_shifts_from_json(&json!({ "pages": [] })).is_empty());
    assert!(extractor.extract_shifts_from_json(&json!("Work-shift")).is_empty());
}

#[test]
fn test_shift_record_serialization_shape() {
    let shifts = extractor().extract_shifts(&[plumbing_row()]);
    let value = serde_json::to_value(&shifts[0]).unwrap();

    assert_eq!(value["date"], "2025-09-11");
    assert_eq!(value["startTime"], "11:30 AM");
    assert_eq!(value["endTime"], "8:00 PM");
    assert_eq!(value["department"], "Plumbing & Bath");
    assert_eq!(value["storeNumber"], "0660");
    assert!(value.get("shiftTotal").is_none());
}
