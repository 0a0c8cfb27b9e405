//! Column labels emitted by the document-understanding processor.
//!
//! Processor versions do not agree on label spelling (`Start-start` vs
//! `Start-shift`), so every observed alias is mapped to one canonical field
//! here, case-insensitively, before any row logic runs.

/// Canonical schedule-row columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftField {
    /// Shift date, e.g. `Sep 11`
    Date,
    /// Start time
    StartTime,
    /// End time
    EndTime,
    /// Store or location code
    StoreNumber,
    /// Department label
    Department,
    /// Printed shift length
    ShiftTotal,
    /// Printed meal break
    MealWindow,
}

const FIELD_ALIASES: &[(&str, ShiftField)] = &[
    ("shift-date", ShiftField::Date),
    ("date", ShiftField::Date),
    ("start-shift", ShiftField::StartTime),
    ("start-start", ShiftField::StartTime),
    ("shift-start", ShiftField::StartTime),
    ("start-time", ShiftField::StartTime),
    ("start", ShiftField::StartTime),
    ("shift-end", ShiftField::EndTime),
    ("end-shift", ShiftField::EndTime),
    ("end-time", ShiftField::EndTime),
    ("end", ShiftField::EndTime),
    ("store-number", ShiftField::StoreNumber),
    ("store-num", ShiftField::StoreNumber),
    ("store", ShiftField::StoreNumber),
    ("role", ShiftField::StoreNumber),
    ("department", ShiftField::Department),
    ("dept", ShiftField::Department),
    ("shift-total", ShiftField::ShiftTotal),
    ("total-hours", ShiftField::ShiftTotal),
    ("total", ShiftField::ShiftTotal),
    ("meal-window", ShiftField::MealWindow),
    ("meal-break", ShiftField::MealWindow),
    ("meal", ShiftField::MealWindow),
];

impl ShiftField {
    /// Resolve an upstream property label to its canonical field.
    ///
    /// Underscores and spaces are treated as hyphens, so `Shift_Date` and
    /// `shift date` resolve the same as `shift-date`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .chars()
            .map(|c| match c {
                '_' | ' ' => '-',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        FIELD_ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, field)| *field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_time_variants() {
        assert_eq!(ShiftField::from_label("Start-start"), Some(ShiftField::StartTime));
        assert_eq!(ShiftField::from_label("start-shift"), Some(ShiftField::StartTime));
        assert_eq!(ShiftField::from_label("SHIFT_START"), Some(ShiftField::StartTime));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(ShiftField::from_label("Shift-date"), Some(ShiftField::Date));
        assert_eq!(ShiftField::from_label("STORE-NUMBER"), Some(ShiftField::StoreNumber));
        assert_eq!(ShiftField::from_label(" Department "), Some(ShiftField::Department));
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(ShiftField::from_label("Employee-name"), None);
        assert_eq!(ShiftField::from_label(""), None);
    }
}
