//! Location inference from free-form narrative text.
//!
//! Incident-style blocks rarely fill the structured location field, so the
//! synthesizer falls back to scanning the narrative for prepositional
//! phrases, short facility codes, and floor references. Comment-style text
//! (Additional Information) uses a stricter variant that understands escort
//! phrasing and refuses to treat vendor names as destinations.

use regex::Regex;
use std::sync::LazyLock;

use crate::normalize::format_location_name;
use crate::tables::NON_LOCATION_ENTITIES;

static PREPOSITION_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:at|in|on|inside|near|around)\s+(?:the\s+)?([A-Za-z0-9][A-Za-z0-9\-\s]{1,40}?)(?:[.,;]|$)")
        .unwrap()
});

static SHORT_CODE_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([A-Z]{1,3}\d|L\d|P\d|dock|garage|lobby|roof|basement|entrance)\b").unwrap()
});

static FLOOR_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bon\s+the\s+([A-Za-z0-9\s]{1,20}?floor)\b").unwrap());

static ESCORT_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:escorted|walked|took|moved|headed|proceeded|responded)\s+(?:(?:him|her|them|it)\s+|the\s+\w+\s+)?(?:back\s+)?to\s+(?:the\s+)?([A-Za-z0-9][A-Za-z0-9\-\s]{1,40}?)(?:[.,;]|$)",
    )
    .unwrap()
});

static SECTION_STOP_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(Synopsis|All persons involved|Who Called|Vehicle Information|Evidence|numbers\))\b")
        .unwrap()
});

/// Truncates an inferred candidate at the first trailing section word that
/// leaked into the capture, then trims punctuation.
pub fn truncate_at_section(candidate: &str) -> String {
    let head = match SECTION_STOP_RX.find(candidate) {
        Some(m) => &candidate[..m.start()],
        None => candidate,
    };
    head.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ':' | '-' | '.'))
        .to_string()
}

/// Normalizes a raw candidate into display form. Short letter codes with an
/// optional digit stay uppercased, everything else is title-cased.
fn finish(candidate: &str) -> Option<String> {
    let cleaned = truncate_at_section(candidate);
    let compact = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if compact.is_empty() {
        return None;
    }
    static CODE_RX: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)^[A-Za-z]{1,3}\d?$").unwrap());
    if CODE_RX.is_match(&compact) {
        Some(compact.to_uppercase())
    } else {
        Some(format_location_name(&compact))
    }
}

fn candidate_is_entity(candidate: &str) -> bool {
    let lower = candidate.to_lowercase();
    NON_LOCATION_ENTITIES.iter().any(|e| lower.contains(e))
}

/// Pulls a location out of incident narrative text. Tries prepositional
/// phrases first, then bare facility codes, then floor references.
pub fn infer_location(text: &str) -> Option<String> {
    if let Some(caps) = PREPOSITION_RX.captures(text) {
        if let Some(loc) = finish(&caps[1]) {
            return Some(loc);
        }
    }
    if let Some(caps) = SHORT_CODE_RX.captures(text) {
        if let Some(loc) = finish(&caps[1]) {
            return Some(loc);
        }
    }
    if let Some(caps) = FLOOR_RX.captures(text) {
        if let Some(loc) = finish(&caps[1]) {
            return Some(loc);
        }
    }
    None
}

/// Stricter variant for comment text. Escort and movement phrasing wins over
/// plain prepositions, and vendor or technician names are never locations.
pub fn infer_location_from_comment(text: &str) -> Option<String> {
    if let Some(caps) = ESCORT_RX.captures(text) {
        let raw = &caps[1];
        if !candidate_is_entity(raw) {
            if let Some(loc) = finish(raw) {
                return Some(loc);
            }
        }
    }
    if let Some(caps) = PREPOSITION_RX.captures(text) {
        let raw = &caps[1];
        if !candidate_is_entity(raw) {
            if let Some(loc) = finish(raw) {
                return Some(loc);
            }
        }
    }
    if let Some(caps) = FLOOR_RX.captures(text) {
        if let Some(loc) = finish(&caps[1]) {
            return Some(loc);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preposition_phrase() {
        assert_eq!(
            infer_location("observed a subject sleeping in the west stairwell."),
            Some("West Stairwell".to_string())
        );
    }

    #[test]
    fn test_short_code_uppercased() {
        assert_eq!(infer_location("alarm went off at p1, reset panel"), Some("P1".to_string()));
    }

    #[test]
    fn test_floor_reference() {
        assert_eq!(
            infer_location("found standing water on the 4th floor, near the restrooms"),
            Some("4th Floor".to_string())
        );
    }

    #[test]
    fn test_section_word_truncated() {
        assert_eq!(
            infer_location("subject was detained at the lobby Synopsis"),
            Some("Lobby".to_string())
        );
    }

    #[test]
    fn test_no_location() {
        assert_eq!(infer_location("nothing further to report"), None);
    }

    #[test]
    fn test_escort_pattern() {
        assert_eq!(
            infer_location_from_comment("escorted them to the loading dock."),
            Some("Loading Dock".to_string())
        );
    }

    #[test]
    fn test_entity_not_a_location() {
        assert_eq!(infer_location_from_comment("headed to kone."), None);
    }
}
