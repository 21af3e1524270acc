//! Named lookup tables driving the segmenter and classifier.
//!
//! These reproduce the grammar of the source logbook export: the marker
//! phrases that open a new field or segment, the category labels, the fixed
//! vendor list, and the classifier keyword sets. They are kept as data so
//! each table can be audited and unit-tested in isolation.

use regex::Regex;
use std::sync::LazyLock;

/// Lines beginning with any of these phrases start a new field/segment and
/// are never absorbed as continuations of the previous field.
pub const SEGMENT_MARKERS: &[&str] = &[
    "Start Date",
    "Officer",
    "- Officer :",
    "Date & Time",
    "Date/Time",
    "- Date :",
    "- Time :",
    "Details",
    "Call Details",
    "Location",
    "- Location :",
    "Company",
    "- Company",
    "Vendor",
    "Comments",
    "- Multi-line text field",
    "Geolocation",
    "Evidence",
    "NEW ACTIVITY",
    "TOUR",
    "Start Time",
    "End Time",
    "Report Details",
    "Posts included",
    "Activities included",
    "New Group",
    "Tags",
    "Duration",
    "Max. Tour Duration",
    "- Picture",
    "Picture",
    "Key Service",
    "Loading Dock Gate",
    "Fire Panel",
    "Janitorial",
    "Transient Removal",
    "Retail Issues",
    "Tenant Issues",
    "Fire Panel Bypass/Online",
    "Incident",
    "Totals Activities",
    "Total Activities",
    "Activity Duration",
    "Object Duration",
    "AES Phone Call",
    "Work Order",
    "Other/Miscellaneous",
    "Synopsis",
    "Follow up",
    "Escalation?",
    "- Upload picture",
];

/// Category labels captured into the buffer (and the label set) when they
/// appear anywhere in a line.
pub const CATEGORY_LABELS: &[&str] = &[
    "AES Phone Call",
    "Loading Dock Gate",
    "Key Service",
    "Work Order",
    "Janitorial",
    "Incident Report",
    "Alarm",
    "Fire Panel Bypass/Online",
    "Transient Removal",
    "Retail",
    "Tenant",
    "Other/Miscellaneous",
    "Elevator Entrapment",
    "Entrapment Incident",
    "Stuck in Elevator",
];

/// Site header lines emitted by the export on every page; they delimit
/// blocks but never carry event content.
pub const SITE_HEADER_LINES: &[&str] = &["300 Pine Street", "300 Pine Street Call Details"];

/// Vendors recognized inside work-order descriptions.
pub const VENDORS: &[&str] = &[
    "Cedar Grove",
    "ABM",
    "FedEx",
    "UPS",
    "SPS",
    "Ryder",
    "DHL",
    "Old Dominion",
    "USPS",
    "CORT",
    "Corti",
    "Canteen",
];

// ---------------------------------------------------------------------------
// Classifier keyword sets (ordered precedence lives in classify.rs)
// ---------------------------------------------------------------------------

pub const ELEVATOR_PHRASES: &[&str] = &[
    "elevator entrapment incident",
    "stuck in elevator",
    "elevator incident",
    "got stuck in cap",
    "doors stayed closed",
    "kone technician",
    "otis elevator",
];

pub const ELEVATOR_TERMS: &[&str] = &["elevator", "entrapment", "stuck in elevator", "kone", "otis"];

pub const TENANT_CONTEXT: &[&str] = &[
    "issue", "concern", "complaint", "problem", "request", "notify", "notified", "reported",
];

pub const DAMAGE_WORDS: &[&str] = &[
    "damage",
    "damaged",
    "bent",
    "broken",
    "crack",
    "dent",
    "unable to close",
    "hit",
    "struck",
    "collision",
    "impact",
];

pub const DAMAGE_NOUNS: &[&str] = &[
    "gate",
    "door",
    "frame",
    "lock",
    "glass",
    "loading dock",
    "dock gate",
];

pub const SPD_PHRASES: &[&str] = &[
    "spd presence/emergency response on site",
    "spd presence",
    "emergency response on site",
    "spd response",
    "sfd medics",
    "911 called",
    "police responded",
    "medical emergency on site",
    "officer contacted spd",
    "security called 911",
    "security called spd",
];

pub const FIRE_PANEL_WORDS: &[&str] =
    &["panel", "bypass", "trbl", "supv", "fire alarm", "alarm test", "hold"];

pub const IR_STRONG_WORDS: &[&str] = &["police", "911", "injury", "assault", "theft", "robbery"];

pub const JANITORIAL_WORDS: &[&str] = &[
    "janitorial",
    "abm notified",
    "upload picture",
    "abm",
    "clean",
    "trash",
    "garbage",
    "spill",
    "vacuum",
    "mop",
    "sweep",
    "ambassador",
    "mid call",
    "mid dispatch",
    "seattle ambassadors",
];

/// Words the location-inference routine must never treat as a destination
/// (vendor and technician names that follow movement verbs).
pub const NON_LOCATION_ENTITIES: &[&str] = &[
    "kone", "davis", "fedex", "usps", "abm", "cedar", "brunson", "engineer", "technician",
];

// ---------------------------------------------------------------------------
// Shared patterns
// ---------------------------------------------------------------------------

/// Full `M/D/YYYY H:MM AM|PM` token anywhere in a line.
pub static DATETIME_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2}/\d{1,2}/\d{4})\s+(\d{1,2}:\d{2}\s*[AP]M)\b").unwrap()
});

/// A line that is exactly one timestamp.
pub static BARE_TIMESTAMP_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\d{1,2}/\d{1,2}/\d{4}\s+\d{1,2}:\d{2}\s*[AP]M$").unwrap()
});

/// Footer timestamps printed by the export (no AM/PM requirement).
pub static FOOTER_TIMESTAMP_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}\s+\d{1,2}:\d{2}").unwrap());

/// Timestamp with a 2- or 4-digit year, as used by block boundaries in the
/// Additional Information scan.
pub static LOOSE_TIMESTAMP_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{2,4}\s+\d{1,2}:\d{2}").unwrap());

/// `<Name> (Officers)` declaration form.
pub static OFFICER_LINE_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*?)\s*\(Officers?\)\s*$").unwrap());

/// `<Name> (Site Supervisors)` declaration form.
pub static OFFICER_LINE_ALT_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*?)\s*\(Site\s+Supervisors?\)\s*$").unwrap());

/// A line that is a plausible two- or three-token person name, with an
/// optional role suffix.
pub static NAME_LINE_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[A-Z][A-Za-z]+(?:\s+[A-Z][A-Za-z]+){1,2}(?:\s*\((?:Officers?|Site\s+Supervisors?)\))?$",
    )
    .unwrap()
});

/// `- Multi-line text field : <text>` marker opening a free comment block.
pub static MULTILINE_FIELD_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^-\s*Multi-?line\s+text\s+field\s*:\s*(.*)$").unwrap());

/// Key-action pattern used by the Key Service classifier rule.
pub static KEY_ACTION_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bkey\s*(lock|unlock|service|issued|return|pickup|drop|set)?\b").unwrap()
});

/// Numbered incident-report reference (`IR #12`, `incident #7`).
pub static IR_NUMBER_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(ir|incident)\s*#\s*\d+").unwrap());

/// `Start Date : <timestamp>` capture.
pub static START_DATE_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)start\s*date\s*:\s*([0-9/]+\s+\d{1,2}:\d{2}\s*(?:[AP]M)?)").unwrap()
});

/// Footer/page noise that is skipped wherever continuation lines are
/// collected.
pub static FOOTER_NOISE_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)REPORT\s*-\s*LOGBOOK\s*PDF|Generated\s+on|^Page\s+\d+").unwrap());

pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_timestamp() {
        assert!(BARE_TIMESTAMP_RX.is_match("9/18/2025 8:18 AM"));
        assert!(BARE_TIMESTAMP_RX.is_match("12/01/2025 11:59 pm"));
        assert!(!BARE_TIMESTAMP_RX.is_match("9/18/2025 8:18 AM extra"));
        assert!(!BARE_TIMESTAMP_RX.is_match("8:18 AM"));
    }

    #[test]
    fn test_officer_line_forms() {
        let caps = OFFICER_LINE_RX.captures("ALI Kassim (Officers)").unwrap();
        assert_eq!(&caps[1], "ALI Kassim");
        let caps = OFFICER_LINE_ALT_RX
            .captures("TEGEGNE GETACHEW (Site Supervisors)")
            .unwrap();
        assert_eq!(&caps[1], "TEGEGNE GETACHEW");
        assert!(OFFICER_LINE_RX.captures("Start Date : 9/1/2025").is_none());
    }

    #[test]
    fn test_key_action_pattern() {
        assert!(KEY_ACTION_RX.is_match("key unlock for vendor"));
        assert!(KEY_ACTION_RX.is_match("issued a key"));
        assert!(!KEY_ACTION_RX.is_match("monkey business"));
    }

    #[test]
    fn test_ir_number_pattern() {
        assert!(IR_NUMBER_RX.is_match("see ir # 12"));
        assert!(IR_NUMBER_RX.is_match("incident #7 filed"));
        assert!(!IR_NUMBER_RX.is_match("an incident occurred"));
    }

    #[test]
    fn test_start_date_capture() {
        let caps = START_DATE_RX
            .captures("Start Date : 9/30/2025 3:47 AM")
            .unwrap();
        assert_eq!(&caps[1], "9/30/2025 3:47 AM");
    }
}
