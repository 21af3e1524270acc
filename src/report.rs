//! Report finalization and document date-range detection.

use chrono::NaiveDateTime;
use log::{debug, info};
use regex::Regex;
use std::sync::LazyLock;

use crate::schema::{DateRange, ParsedReport, Section, NONE_TO_REPORT};
use crate::tables::DATETIME_RX;

static PERIOD_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)Period\s*:?[\s\n]*([0-9/]+\s+\d{1,2}:\d{2}\s*[AP]M)\s*[-–]\s*([0-9/]+\s+\d{1,2}:\d{2}\s*[AP]M)",
    )
    .unwrap()
});
static RANGE_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)Date\s*Range\s*:?[\s\n]*([0-9/]+\s+\d{1,2}:\d{2}\s*[AP]M)\s*[-–]\s*([0-9/]+\s+\d{1,2}:\d{2}\s*[AP]M)",
    )
    .unwrap()
});
static FILENAME_RANGE_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{2}\s*-\s*\d{2}\s*-\s*\d{2})\s*to\s*(\d{2}\s*-\s*\d{2}\s*-\s*\d{2})")
        .unwrap()
});
static ENTRY_TS_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2}/\d{2}/\d{2})\s+(\d{1,2}:\d{2}\s*[AP]M)").unwrap());

/// Timestamp of a finished entry line, used for chronological ordering.
/// Lines without a parseable leading timestamp sort to the end.
fn entry_timestamp(line: &str) -> NaiveDateTime {
    let Some(caps) = ENTRY_TS_RX.captures(line) else {
        return NaiveDateTime::MAX;
    };
    let token = format!("{} {}", &caps[1], &caps[2]);
    NaiveDateTime::parse_from_str(&token, "%m/%d/%y %I:%M %p").unwrap_or(NaiveDateTime::MAX)
}

/// Final pass over the assembled report.
///
/// Empty sections get the placeholder, the Transient Removal section is
/// collapsed into a single red 24-hour count line, and every populated
/// section is sorted oldest to newest by entry timestamp.
pub fn finalize(report: &mut ParsedReport, transient_count: usize) {
    for section in Section::ALL {
        if report.entries(section).is_empty() {
            report.push(section, NONE_TO_REPORT.to_string());
        }
    }

    if transient_count > 0 {
        info!("collapsing {} transient removals into summary line", transient_count);
        report.replace(
            Section::TransientRemoval,
            vec![format!(
                "<font color=\"red\">Within the last 24 hours (<b>{:02}</b>), transients were removed from the property.</font>",
                transient_count
            )],
        );
    } else {
        report.replace(Section::TransientRemoval, vec![NONE_TO_REPORT.to_string()]);
    }

    for section in Section::ALL {
        if report.has_events(section) {
            report.entries_mut(section).sort_by_key(|e| entry_timestamp(e));
        }
    }
}

/// Detect the document's reporting window.
///
/// Tries an explicit `Period` header, then a `Date Range` header, then falls
/// back to the earliest and latest timestamps anywhere in the document, and
/// finally to a `MM-DD-YY to MM-DD-YY` token in the source filename.
pub fn detect_date_range(lines: &[String], input_file: &str) -> DateRange {
    let raw_text = lines.join("\n");

    let header_caps = PERIOD_RX.captures(&raw_text).or_else(|| RANGE_RX.captures(&raw_text));
    if let Some(caps) = header_caps {
        let start = caps[1].trim().to_string();
        let end = caps[2].trim().to_string();
        let start_simple =
            start.split_whitespace().next().unwrap_or("").replace('/', "-");
        let end_simple = end.split_whitespace().next().unwrap_or("").replace('/', "-");
        return DateRange {
            header: format!("{} – {}", start, end),
            token: format!("{}_to_{}", start_simple, end_simple),
        };
    }

    let mut stamps: Vec<NaiveDateTime> = Vec::new();
    for caps in DATETIME_RX.captures_iter(&raw_text) {
        let token = format!("{} {}", &caps[1], caps[2].to_uppercase());
        if let Ok(dt) = NaiveDateTime::parse_from_str(&token, "%m/%d/%Y %I:%M %p") {
            stamps.push(dt);
        }
    }
    if let (Some(start), Some(end)) = (stamps.iter().min(), stamps.iter().max()) {
        debug!("date range derived from {} document timestamps", stamps.len());
        return DateRange {
            header: format!(
                "{} – {}",
                start.format("%m/%d/%Y %I:%M %p"),
                end.format("%m/%d/%Y %I:%M %p")
            ),
            token: format!("{}_to_{}", start.format("%m-%d-%Y"), end.format("%m-%d-%Y")),
        };
    }

    let file_name = std::path::Path::new(input_file)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if let Some(caps) = FILENAME_RANGE_RX.captures(&file_name) {
        let s = caps[1].replace(' ', "");
        let e = caps[2].replace(' ', "");
        return DateRange {
            header: format!("{} to {}", s, e),
            token: format!("{}_to_{}", s, e),
        };
    }

    DateRange::unknown()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_placeholders_and_sort() {
        let mut report = ParsedReport::new();
        report.push(
            Section::KeyService,
            "09/18/25 11:02 PM – <b>Officer Faiz Mohmand</b> – later entry".to_string(),
        );
        report.push(
            Section::KeyService,
            "09/18/25 8:18 AM – <b>Officer Getachew Tegegne</b> – earlier entry".to_string(),
        );
        finalize(&mut report, 0);

        let entries = report.entries(Section::KeyService);
        assert!(entries[0].starts_with("09/18/25 8:18 AM"));
        assert!(entries[1].starts_with("09/18/25 11:02 PM"));
        assert_eq!(report.entries(Section::Janitorial), &[NONE_TO_REPORT.to_string()]);
        assert_eq!(report.entries(Section::TransientRemoval), &[NONE_TO_REPORT.to_string()]);
    }

    #[test]
    fn test_finalize_collapses_transients() {
        let mut report = ParsedReport::new();
        report.push(Section::TransientRemoval, "09/18/25 1:00 AM – removal one".to_string());
        report.push(Section::TransientRemoval, "09/18/25 2:00 AM – removal two".to_string());
        finalize(&mut report, 2);

        let entries = report.entries(Section::TransientRemoval);
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0],
            "<font color=\"red\">Within the last 24 hours (<b>02</b>), transients were removed from the property.</font>"
        );
    }

    #[test]
    fn test_unparseable_entries_sort_last() {
        let mut report = ParsedReport::new();
        report.push(Section::WorkOrders, "no timestamp here".to_string());
        report.push(Section::WorkOrders, "09/20/25 10:00 AM – dated entry".to_string());
        finalize(&mut report, 0);
        let entries = report.entries(Section::WorkOrders);
        assert!(entries[0].starts_with("09/20/25"));
        assert_eq!(entries[1], "no timestamp here");
    }

    #[test]
    fn test_date_range_from_period_header() {
        let lines: Vec<String> = vec![
            "DAILY ACTIVITY REPORT".to_string(),
            "Period : 9/18/2025 6:00 AM - 9/19/2025 6:00 AM".to_string(),
        ];
        let range = detect_date_range(&lines, "logbook.pdf");
        assert_eq!(range.header, "9/18/2025 6:00 AM – 9/19/2025 6:00 AM");
        assert_eq!(range.token, "9-18-2025_to_9-19-2025");
    }

    #[test]
    fn test_date_range_from_timestamps() {
        let lines: Vec<String> = vec![
            "Start Date : 9/18/2025 8:18 AM".to_string(),
            "some text".to_string(),
            "Start Date : 9/18/2025 11:02 PM".to_string(),
        ];
        let range = detect_date_range(&lines, "logbook.pdf");
        assert_eq!(range.header, "09/18/2025 08:18 AM – 09/18/2025 11:02 PM");
        assert_eq!(range.token, "09-18-2025_to_09-18-2025");
    }

    #[test]
    fn test_date_range_from_filename() {
        let lines: Vec<String> = vec!["no timestamps at all".to_string()];
        let range = detect_date_range(&lines, "/tmp/DAR 09-18-25 to 09-19-25.pdf");
        assert_eq!(range.header, "09-18-25 to 09-19-25");
        assert_eq!(range.token, "09-18-25_to_09-19-25");
    }

    #[test]
    fn test_date_range_unknown() {
        let range = detect_date_range(&[], "logbook.pdf");
        assert_eq!(range, DateRange::unknown());
    }
}
