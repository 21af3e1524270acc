//! Stateless text normalization helpers: past-tense conversion, officer-name
//! canonicalization, location title-casing, and clock-time cleanup.

use crate::markup::bold;
use regex::Regex;
use std::sync::LazyLock;

/// Leading-verb past-tense table. Irregulars and common typos are mapped
/// explicitly; anything else falls through to the `+ed`/`+d` suffix rule.
pub const VERB_MAP: &[(&str, &str)] = &[
    ("open", "opened"),
    ("unlock", "unlocked"),
    ("lock", "locked"),
    ("secure", "secured"),
    ("issue", "issued"),
    ("collect", "collected"),
    ("deliver", "delivered"),
    ("remove", "removed"),
    ("escort", "escorted"),
    ("close", "closed"),
    ("receive", "received"),
    ("call", "called"),
    ("handle", "handled"),
    ("extend", "extended"),
    ("bypass", "bypassed"),
    ("bring", "brought"),
    ("brought", "brought"),
    ("put", "put"),
    ("was", "was"),
    ("putted", "put"),
    ("puted", "put"),
    ("set", "set"),
    ("hit", "hit"),
    ("cut", "cut"),
    ("shut", "shut"),
    ("leave", "left"),
];

/// Convert the leading verb of an action clause to past tense.
///
/// Only the first word is touched; a word already ending in "ed" is left
/// alone, an e-ending verb gets "d", everything else gets "ed".
pub fn to_past_tense(text: &str) -> String {
    let mut words: Vec<String> = text.split_whitespace().map(str::to_string).collect();
    if words.is_empty() {
        return text.to_string();
    }
    let first = words[0].to_lowercase();
    if let Some((_, past)) = VERB_MAP.iter().find(|(v, _)| *v == first) {
        words[0] = (*past).to_string();
    } else if !first.ends_with("ed") {
        words[0] = if first.ends_with('e') {
            format!("{}d", first)
        } else {
            format!("{}ed", first)
        };
    }
    words.join(" ")
}

/// Capitalize one word: first letter upper, remainder lower.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

fn is_all_caps(word: &str) -> bool {
    word.len() > 1 && word.chars().all(|c| c.is_uppercase() || !c.is_alphabetic())
}

fn looks_like_given_name(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if c.is_uppercase() => chars.all(|c| c.is_lowercase()),
        _ => false,
    }
}

static ROLE_SUFFIX_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\((?:Officers?|Site\s+Supervisors?)\)\s*$").unwrap());
static PAREN_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*?\)").unwrap());
static OFFICER_PREFIX_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(Officer|S/O)\s+").unwrap());

/// Canonicalize an officer name captured from the logbook.
///
/// `LAST First` order (an all-caps surname followed by a given name) is
/// swapped to `First Last`; a three-token `LAST First Middle` keeps the two
/// trailing tokens; everything else is title-cased in place.
pub fn canonical_officer_name(raw: &str) -> String {
    let stripped = ROLE_SUFFIX_RX.replace(raw.trim(), "");
    let stripped = PAREN_RX.replace_all(&stripped, "");
    let parts: Vec<&str> = stripped.split_whitespace().collect();
    match parts.as_slice() {
        [last, first] if is_all_caps(last) && (looks_like_given_name(first) || is_all_caps(first)) => {
            format!("{} {}", capitalize(first), capitalize(last))
        }
        [last, first, middle] if is_all_caps(last) => {
            format!("{} {}", capitalize(first), capitalize(middle))
        }
        _ => parts
            .iter()
            .map(|p| capitalize(p))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Render an officer name as the bolded `Officer First Last` span used in
/// every event line. Empty input yields an empty string.
pub fn bold_officer(name: &str) -> String {
    let n = name.trim();
    if n.is_empty() {
        return String::new();
    }
    let n = OFFICER_PREFIX_RX.replace(n, "");
    let normalized = canonical_officer_name(&n);
    if normalized.is_empty() {
        return String::new();
    }
    bold(&format!("Officer {}", normalized))
}

/// Smart location capitalization: every main word capitalized, small
/// connective words kept lowercase (unless first), all-caps codes like
/// `FCC` or `UNIQLO` preserved.
pub fn format_location_name(loc: &str) -> String {
    const SKIP_WORDS: &[&str] = &["and", "or", "of", "the", "to", "from", "at", "in"];
    let loc = loc.trim();
    if loc.is_empty() {
        return String::new();
    }
    loc.split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            if is_all_caps(word) {
                word.to_string()
            } else {
                let lower = word.to_lowercase();
                if i > 0 && SKIP_WORDS.contains(&lower.as_str()) {
                    lower
                } else {
                    capitalize(word)
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

static COMPACT_24H_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{1,2})(\d{2})?$").unwrap());

/// Normalize a raw clock time (24-hour, compact, or `hrs`-suffixed) to the
/// `H:MM AM|PM` form. Unparsable input is passed through uppercased with
/// the `hrs` suffix removed.
pub fn normalize_clock_time(raw: &str) -> String {
    let cleaned = raw
        .trim()
        .to_lowercase()
        .replace("hrs", "")
        .replace(':', "")
        .replace(' ', "");
    if let Some(caps) = COMPACT_24H_RX.captures(&cleaned) {
        let mut hh: u32 = caps[1].parse().unwrap_or(0);
        let mm = caps.get(2).map(|m| m.as_str()).unwrap_or("00");
        let mut ampm = "AM";
        if hh >= 12 {
            ampm = "PM";
            if hh > 12 {
                hh -= 12;
            }
        } else if hh == 0 {
            hh = 12;
        }
        format!("{}:{} {}", hh, mm, ampm)
    } else {
        raw.trim().to_uppercase().replace("HRS", "").trim().to_string()
    }
}

static HOLD_TIME_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2}:\d{2}\s*[AP]M|\d{3,4}\s*[AP]M|\d{1,2}\s*[AP]M)").unwrap()
});
static COMPACT_AMPM_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{3,4}[AP]M$").unwrap());
static HOUR_AMPM_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,2}[AP]M$").unwrap());

/// Extract an explicit hold-until time from an action clause, normalizing
/// compact forms like `0200PM` or `2PM` to `HH:MM AM|PM`.
pub fn extract_hold_until(action: &str) -> Option<String> {
    let raw = HOLD_TIME_RX
        .captures(action)?
        .get(1)?
        .as_str()
        .to_uppercase()
        .replace(' ', "");
    if COMPACT_AMPM_RX.is_match(&raw) {
        let ampm = if raw.contains('A') { "AM" } else { "PM" };
        let mut digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() == 3 {
            digits.insert(0, '0');
        }
        Some(format!("{}:{} {}", &digits[..2], &digits[2..], ampm))
    } else if HOUR_AMPM_RX.is_match(&raw) {
        let ampm = &raw[raw.len() - 2..];
        let hh = &raw[..raw.len() - 2];
        Some(format!("{:0>2}:00 {}", hh, ampm))
    } else {
        Some(raw)
    }
}

static SHIFT_NOISE_RXS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(yes|no)\s*-\s*new\s*emails\s*received\s*during\s*shift\s*communicated\s*to\s*the\s*next\??\s*:?\s*(yes|no)?",
        r"(?i)\bnew\s*emails\s*received\s*during\s*shift\s*communicated\s*to\s*the\s*next\??\s*:?\s*(yes|no)?",
        r"(?i)\bnew\s*work\s*orders\s*communicated\s*to\s*the\s*next\s*shift\??\s*:?\s*(yes|no)?",
        r"(?i)\bimportant\s*info\s*passed\s*down\s*for\s*the\s*shift\s*:?\s*(yes|no)?",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});
static THE_YESNO_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bthe\s+(yes|no)\b").unwrap());
static STRAY_YESNO_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b(yes|no)[,.\s]+").unwrap());
static STRAY_THE_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bthe\s*[,.]\s*").unwrap());
static MULTISPACE_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());
static TRAILING_PUNCT_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*[-,:;]\s*$").unwrap());

/// Strip embedded shift-handover questionnaire noise ("new emails received
/// during shift communicated to the next? Yes") out of an action clause.
pub fn clean_shift_noise(text: &str) -> String {
    let mut t = text.replace('—', "-").replace('–', "-");
    t = MULTISPACE_RX.replace_all(t.trim(), " ").to_string();
    for rx in SHIFT_NOISE_RXS.iter() {
        t = rx.replace_all(&t, "").to_string();
    }
    t = THE_YESNO_RX.replace_all(&t, "the").to_string();
    t = STRAY_YESNO_RX.replace_all(&t, "").to_string();
    t = STRAY_THE_RX.replace_all(&t, "").to_string();
    t = MULTISPACE_RX.replace_all(&t, " ").to_string();
    t = TRAILING_PUNCT_RX.replace(&t, "").to_string();
    t.trim().to_string()
}

static MASHED_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").unwrap());

/// Re-insert the space lost at a wrapped line boundary ("AliAhmed" →
/// "Ali Ahmed").
pub fn split_mashed_words(text: &str) -> String {
    MASHED_RX.replace_all(text, "$1 $2").to_string()
}

/// Lowercase the leading letter of a narrative fragment so it reads
/// naturally after a "reported that" prefix. Acronyms and numbers are left
/// alone: only an uppercase letter followed by a lowercase one is touched.
pub fn decapitalize_narrative(text: &str) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    if chars.len() >= 2 && chars[0].is_uppercase() && chars[1].is_lowercase() {
        chars[0] = chars[0].to_lowercase().next().unwrap_or(chars[0]);
    }
    chars.into_iter().collect()
}
