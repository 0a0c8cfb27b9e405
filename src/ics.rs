//! Minimal iCalendar (RFC 5545) content-line writer.
//!
//! Handles the three details calendar clients are strict about: TEXT value
//! escaping, CRLF line endings, and folding lines longer than 75 octets.

/// Maximum content-line length in octets, excluding the CRLF
const MAX_LINE_OCTETS: usize = 75;

/// Accumulates content lines into a calendar document
#[derive(Debug, Default)]
pub struct IcsWriter {
    buf: String,
}

impl IcsWriter {
    /// Create an empty writer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a component, e.g. `VCALENDAR`
    pub fn begin(&mut self, component: &str) {
        self.raw_line(&format!("BEGIN:{component}"));
    }

    /// Close a component
    pub fn end(&mut self, component: &str) {
        self.raw_line(&format!("END:{component}"));
    }

    /// Write a property whose value is already in wire form (dates, UIDs)
    pub fn property(&mut self, name: &str, value: &str) {
        self.raw_line(&format!("{name}:{value}"));
    }

    /// Write a TEXT property, escaping its value
    pub fn text_property(&mut self, name: &str, value: &str) {
        self.raw_line(&format!("{name}:{}", escape_text(value)));
    }

    /// Finish and return the document bytes
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.into_bytes()
    }

    fn raw_line(&mut self, line: &str) {
        fold_line(line, &mut self.buf);
    }
}

/// Escape a TEXT value: backslash, semicolon, comma, and newlines
#[must_use]
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\\n");
            }
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }

    out
}

/// Append `line` to `out`, folded at 75 octets and terminated with CRLF.
///
/// Continuation lines start with a single space, which counts toward their
/// length. Folds never split a UTF-8 sequence.
fn fold_line(line: &str, out: &mut String) {
    let mut used = 0;

    for c in line.chars() {
        let width = c.len_utf8();
        if used + width > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            used = 1;
        }
        out.push(c);
        used += width;
    }

    out.push_str("\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a,b;c\\d"), "a\\,b\\;c\\\\d");
        assert_eq!(escape_text("line1\nline2\r\nline3"), "line1\\nline2\\nline3");
        assert_eq!(escape_text("Plumbing & Bath"), "Plumbing & Bath");
    }

    #[test]
    fn test_short_line_not_folded() {
        let mut out = String::new();
        fold_line("SUMMARY:Work Shift", &mut out);
        assert_eq!(out, "SUMMARY:Work Shift\r\n");
    }

    #[test]
    fn test_long_line_folded_at_75_octets() {
        let mut out = String::new();
        let line = format!("DESCRIPTION:{}", "x".repeat(200));
        fold_line(&line, &mut out);

        for physical in out.split("\r\n").filter(|l| !l.is_empty()) {
            assert!(physical.len() <= MAX_LINE_OCTETS, "line too long: {}", physical.len());
        }
        let unfolded = out.trim_end_matches("\r\n").replace("\r\n ", "");
        assert_eq!(unfolded, line);
    }

    #[test]
    fn test_fold_respects_utf8_boundaries() {
        let mut out = String::new();
        let line = format!("SUMMARY:{}", "é".repeat(60));
        fold_line(&line, &mut out);

        for physical in out.split("\r\n").filter(|l| !l.is_empty()) {
            assert!(physical.len() <= MAX_LINE_OCTETS);
        }
        assert_eq!(out.trim_end_matches("\r\n").replace("\r\n ", ""), line);
    }

    #[test]
    fn test_writer_components() {
        let mut writer = IcsWriter::new();
        writer.begin("VCALENDAR");
        writer.property("VERSION", "2.0");
        writer.property("DTSTART", "20250911T153000Z");
        writer.text_property("X-WR-CALNAME", "Shifts, Sep");
        writer.end("VCALENDAR");

        let text = String::from_utf8(writer.into_bytes()).unwrap();
        assert_eq!(
            text,
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nDTSTART:20250911T153000Z\r\n\
             X-WR-CALNAME:Shifts\\, Sep\r\nEND:VCALENDAR\r\n"
        );
    }
}
