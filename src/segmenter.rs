//! Line-stream segmentation.
//!
//! Walks the ordered text lines of a logbook export and cuts them into
//! [`FlushedEvent`]s. One event buffer is open at a time; marker lines open
//! fields, wrapped lines are absorbed into the last opened field, and flush
//! rules close the buffer at entry boundaries. TOUR blocks are swallowed
//! whole. SPD response, Seattle Ambassadors, and unsecure-door sub-blocks
//! have their own capture grammar and emit pre-filled buffers.

use log::debug;
use regex::Regex;
use std::sync::LazyLock;

use crate::normalize::{
    canonical_officer_name, capitalize, format_location_name, normalize_clock_time,
    split_mashed_words,
};
use crate::schema::{EventBuffer, Field, FlushedEvent};
use crate::tables::{
    BARE_TIMESTAMP_RX, CATEGORY_LABELS, FOOTER_TIMESTAMP_RX, MULTILINE_FIELD_RX, NAME_LINE_RX,
    OFFICER_LINE_ALT_RX, OFFICER_LINE_RX, SEGMENT_MARKERS, SITE_HEADER_LINES, START_DATE_RX,
};

static NUMBERS_TAIL_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*numbers\)\s*:\s*").unwrap());
static START_DATE_AMPM_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)start\s*date\s*:\s*([0-9/]+\s+\d{1,2}:\d{2}\s*[AP]M)").unwrap()
});
static START_DATE_SLOPPY_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Start\s*Date\s*:\s*([0-9/:\sAPMapm]+)").unwrap());
static WHO_CALLED_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(if\s*so,?\s*who\s*called|who\s*called\s*them)").unwrap());
static WHO_STOP_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(vehicle|synopsis|report|incident|description|time|location|escalation)\b")
        .unwrap()
});
static ALL_PERSONS_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)all\s*persons\s*involved").unwrap());
static PARTIES_STOP_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(-\s*description|description|vehicle|report|escalation|incident|synopsis)\b")
        .unwrap()
});
static PARTIES_LABEL_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^-?\s*(all\s*persons\s*involved|parties\s*involved).*?:").unwrap()
});
static PARTIES_HDR_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(-\s*)?parties\s+involved\b").unwrap());
static ELEV_PARTIES_STOP_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(-\s*)?(photos?|evidence|additional comments)\b").unwrap());
static DESC_STOP_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(-\s*)?(additional comments|photos?|evidence|incident info|geolocation)\b")
        .unwrap()
});
static PAGE_NOISE_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)report\s*-\s*logbook\s*pdf|\bpage\s*\d+/\d+").unwrap());
static LOOKBACK_NOISE_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(new activity|300 pine|close|start date|geolocation|page|report)").unwrap()
});
static DOCK_HEADER_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bLoading\s+Dock\s+Gate\b").unwrap());
static FIRE_HEADER_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bFire\s+Panel\s+Bypass/Online\b").unwrap());
static AES_HEADER_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bAES\s+Phone\s+Call\b").unwrap());
static DOCK_NAME_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z][A-Za-z]+\s+[A-Z][A-Za-z]+(?:\s*\((?:Officers?|Site\s+Supervisors?)\))?$")
        .unwrap()
});
static FWD_NAME_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Za-z]+\s+[A-Z][A-Za-z]+").unwrap());
static FWD_FULL_NAME_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z][A-Za-z]+)\s+([A-Z][A-Za-z]+)$").unwrap());
static ROLE_PAREN_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*?\)").unwrap());
static NONPERSON_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(Activities|Loading|Key|Door|Gate|Victrola|Uniqlo|Report|Duration|Object)\b")
        .unwrap()
});
static SPD_WHO_STOP_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^-*\s*(parties|images|upload picture|date|time|location)\b").unwrap()
});
static SPD_PARTIES_STOP_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^-*\s*(images|upload picture|date|time|location|who called)\b").unwrap()
});
static SPD_DESC_STOP_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^-+\s*(who called|parties|images|upload picture|date|time|location)\b").unwrap()
});
static INCIDENT_DATE_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Date\s*of\s*(?:the\s*)?Incident|Incident\s*Date)\s*:\s*([0-9/]+)").unwrap()
});
static INCIDENT_TIME_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Time\s*of\s*(?:the\s*)?Incident|Incident\s*Time)\s*:\s*([0-9:]+\s*(?:[AP]M)?)")
        .unwrap()
});
static WO_PLACED_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)-\s*work\s*order\s*placed\s*on\s*building\s*engines").unwrap()
});
static WO_DESC_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^-\s*description\s*:").unwrap());
static DATE_FIELD_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)-\s*date\s*:").unwrap());
static TIME_FIELD_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)-\s*time\s*:").unwrap());
static OFFICER_FIELD_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)-\s*officer\s*:").unwrap());
static LOCATION_FIELD_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)-\s*location\s*:").unwrap());
static START_DATE_ANY_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)start\s*date\s*:").unwrap());
static LOOSE_TS_CAPTURE_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([\d/]+\s+\d{1,2}:\d{2}\s*(?:[AP]M)?)").unwrap());
static DIGITS_SLASH_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([\d/]+)").unwrap());
static HHMM_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{1,2}):(\d{2})").unwrap());
static AMB_TS_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})\s+(\d{1,2}):(\d{2})(?:\s*([APap][Mm]))?").unwrap()
});
static UNTIL_BY_AT_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b(until|by|at)\b").unwrap());
static MULTISPACE_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());
static SECURITY_OFFICER_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsecurity\s+officer\b").unwrap());
static AND_WORD_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\band\b").unwrap());
static DOUBLE_REPORTED_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\breported that\s+reported that\b").unwrap());
static FIRST_WORD_SHORT_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z][a-z]?$").unwrap());

fn after_colon(ln: &str) -> String {
    match ln.split_once(':') {
        Some((_, rest)) => rest.trim().to_string(),
        None => ln.trim().to_string(),
    }
}

fn collapse_spaces(s: &str) -> String {
    MULTISPACE_RX.replace_all(s, " ").trim().to_string()
}

/// Join comma-separated names with a final ", and" unless one is already
/// present in the last chunk.
fn comma_and_join(combined: &str) -> String {
    if !combined.contains(',') {
        return combined.to_string();
    }
    let parts: Vec<&str> = combined
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    match parts.len() {
        0 => String::new(),
        1 => parts[0].to_string(),
        n => {
            let last = parts[n - 1];
            if AND_WORD_RX.is_match(last) {
                parts.join(", ")
            } else {
                format!("{}, and {}", parts[..n - 1].join(", "), last)
            }
        }
    }
}

/// Format `M/D/YYYY` plus an already-normalized time as the short event
/// timestamp `MM/DD/YY H:MM AM`.
fn compact_incident_timestamp(idate: &str, itime: &str) -> Option<String> {
    let nums: Vec<&str> = idate.split('/').collect();
    if nums.len() != 3 {
        return None;
    }
    let mm: u32 = nums[0].parse().ok()?;
    let dd: u32 = nums[1].parse().ok()?;
    let yyyy = nums[2];
    let yy = if yyyy.len() >= 2 { &yyyy[yyyy.len() - 2..] } else { yyyy };
    Some(format!("{:02}/{:02}/{} {}", mm, dd, yy, itime).trim().to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubBlock {
    None,
    Spd,
    Ambassadors,
}

pub struct Segmenter<'a> {
    lines: &'a [String],
    buffer: EventBuffer,
    labels: Vec<String>,
    last_field: Option<Field>,
    waiting_officer_nested: bool,
    transient_tag_seen: bool,
    in_tour: bool,
    sub: SubBlock,
    sub_buffer: EventBuffer,
    wo_upload_seen: bool,
    events: Vec<FlushedEvent>,
}

/// Scan the document lines into flushed events, in document order.
pub fn segment(lines: &[String]) -> Vec<FlushedEvent> {
    let mut scanner = Segmenter {
        lines,
        buffer: EventBuffer::default(),
        labels: Vec::new(),
        last_field: None,
        waiting_officer_nested: false,
        transient_tag_seen: false,
        in_tour: false,
        sub: SubBlock::None,
        sub_buffer: EventBuffer::default(),
        wo_upload_seen: false,
        events: Vec::new(),
    };
    for i in 0..lines.len() {
        let ln = lines[i].trim().to_string();
        scanner.step(i, &ln);
    }
    // Safety flush so the last entry on the final page is not lost.
    if scanner.buffer.date.is_some() {
        scanner.flush();
    }
    debug!("segmented {} events from {} lines", scanner.events.len(), lines.len());
    scanner.events
}

impl<'a> Segmenter<'a> {
    fn flush(&mut self) {
        self.wo_upload_seen = false;
        self.last_field = None;
        // Buffers with no action, narrative, or category never become events.
        if self.buffer.is_discardable() {
            self.buffer = EventBuffer::default();
            return;
        }
        let event = FlushedEvent {
            buffer: std::mem::take(&mut self.buffer),
            labels: std::mem::take(&mut self.labels),
            transient_tag_seen: self.transient_tag_seen,
        };
        debug!("flushed event, category={:?}", event.buffer.category);
        self.transient_tag_seen = false;
        self.events.push(event);
    }

    fn emit_sub_block(&mut self) {
        let event = FlushedEvent {
            buffer: std::mem::take(&mut self.sub_buffer),
            labels: Vec::new(),
            transient_tag_seen: false,
        };
        debug!("flushed sub-block event, category={:?}", event.buffer.category);
        self.events.push(event);
    }

    fn set_officer(&mut self, raw: &str) {
        let name = raw.trim_matches(|c: char| c.is_whitespace() || c == '-' || c == ':');
        if name.is_empty() {
            return;
        }
        if NONPERSON_RX.is_match(name) {
            self.buffer.officer = Some(name.to_string());
        } else {
            self.buffer.officer = Some(canonical_officer_name(name));
        }
    }

    fn is_new_block_line(&self, ln: &str) -> bool {
        if ln.is_empty() {
            return true;
        }
        if SEGMENT_MARKERS.iter().any(|s| ln.starts_with(s)) {
            return true;
        }
        if ln.contains("(Officers)") {
            return true;
        }
        if BARE_TIMESTAMP_RX.is_match(ln) {
            // Inside an incident report these are field values, not headers.
            return !self.buffer.category_lc().starts_with("incident report");
        }
        SITE_HEADER_LINES.contains(&ln)
    }

    /// Officer name a few lines above a Loading Dock Gate header. Two-token
    /// names are always in LAST First order here.
    fn lookback_dock_officer(&mut self, i: usize) {
        for back in (i.saturating_sub(5)..i).rev() {
            let prev = self.lines[back].trim();
            if DOCK_NAME_RX.is_match(prev) {
                self.set_dock_officer(prev);
                return;
            }
        }
        // Some pages print the name just below the header instead.
        let end = (i + 6).min(self.lines.len());
        for fwd in i + 1..end {
            let nxt = self.lines[fwd].trim();
            if nxt.is_empty() {
                continue;
            }
            if nxt.starts_with("NEW ACTIVITY")
                || nxt.starts_with("Start Date")
                || BARE_TIMESTAMP_RX.is_match(nxt)
            {
                break;
            }
            if DOCK_NAME_RX.is_match(nxt) && !NONPERSON_RX.is_match(nxt) {
                self.set_dock_officer(nxt);
                break;
            }
        }
    }

    fn set_dock_officer(&mut self, raw: &str) {
        let name = ROLE_PAREN_RX.replace_all(raw, "");
        let parts: Vec<&str> = name.split_whitespace().collect();
        self.buffer.officer = Some(match parts.as_slice() {
            [last, first] => format!("{} {}", capitalize(first), capitalize(last)),
            _ => parts.iter().map(|p| capitalize(p)).collect::<Vec<_>>().join(" "),
        });
    }

    /// Officer name above a Fire Panel or AES header, skipping page noise.
    fn lookback_named_officer(&mut self, i: usize) {
        for back in (i.saturating_sub(5)..i).rev() {
            let prev = self.lines[back].trim();
            if prev.is_empty() || LOOKBACK_NOISE_RX.is_match(prev) {
                continue;
            }
            if NAME_LINE_RX.is_match(prev) {
                self.buffer.officer = Some(canonical_officer_name(prev));
                break;
            }
        }
    }

    /// Officer on one of the lines following a NEW ACTIVITY header.
    fn lookahead_officer(&mut self, i: usize) {
        let end = (i + 7).min(self.lines.len());
        for cand in &self.lines[i + 1..end] {
            let cand = cand.trim();
            if FWD_NAME_RX.is_match(cand) {
                let stripped = ROLE_PAREN_RX.replace_all(cand, "");
                let stripped = stripped.trim();
                // Two-token names arrive in LAST First order here and get
                // swapped; anything longer is kept verbatim.
                let name = match FWD_FULL_NAME_RX.captures(stripped) {
                    Some(c) => format!("{} {}", capitalize(&c[2]), capitalize(&c[1])),
                    None => MULTISPACE_RX.replace_all(stripped, " ").trim().to_string(),
                };
                self.buffer.officer = Some(name);
                break;
            }
        }
    }

    fn collect_who_called(&mut self, i: usize, ln: &str) {
        let mut val = after_colon(ln);
        for nxt in &self.lines[i + 1..] {
            let s = nxt.trim();
            if WHO_STOP_RX.is_match(s) {
                break;
            }
            if !s.is_empty() {
                val.push(' ');
                val.push_str(s);
            }
        }
        let val = val.trim_start_matches(|c: char| !c.is_alphanumeric());
        let val = split_mashed_words(&collapse_spaces(val));
        let val = val.trim_end_matches(')').trim().to_string();
        if !val.is_empty() {
            self.buffer.who_called = Some(val);
        }
    }

    fn collect_all_persons(&mut self, i: usize, ln: &str) {
        let mut val_lines: Vec<String> = Vec::new();
        let mut seed = after_colon(ln);
        if seed.is_empty() || seed.eq_ignore_ascii_case(ln.trim()) {
            seed.clear();
        }
        if seed.is_empty() {
            if let Some(nxt) = self.lines.get(i + 1) {
                let nxt = nxt.trim();
                if !PARTIES_STOP_RX.is_match(nxt) {
                    seed = nxt.to_string();
                }
            }
        }
        if !seed.is_empty() {
            val_lines.push(seed.clone());
        }
        for nxt in &self.lines[i + 1..] {
            let s = nxt.trim();
            if PARTIES_STOP_RX.is_match(s) {
                break;
            }
            if s.is_empty()
                || PAGE_NOISE_RX.is_match(s)
                || FOOTER_TIMESTAMP_RX.is_match(s)
                || s == seed
            {
                continue;
            }
            val_lines.push(s.to_string());
        }
        let combined = val_lines.join(", ");
        let combined = PARTIES_LABEL_RX.replace(&combined, "");
        let combined = split_mashed_words(&collapse_spaces(&combined));
        let combined = combined
            .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | ',' | ':'))
            .to_string();
        let combined = comma_and_join(&combined);
        if !combined.is_empty() {
            self.buffer.parties_involved = Some(combined);
        }
    }

    /// Multi-line "Parties Involved" block outside incident descriptions.
    fn collect_parties_block(&mut self, i: usize, ln: &str) {
        let mut val_lines: Vec<String> = Vec::new();
        let first = after_colon(ln);
        if !first.is_empty() && !first.eq_ignore_ascii_case(ln.trim()) {
            val_lines.push(first);
        }
        for nxt in &self.lines[i + 1..] {
            let s = nxt.trim();
            if ELEV_PARTIES_STOP_RX.is_match(s) {
                break;
            }
            if s.is_empty() || PAGE_NOISE_RX.is_match(s) || FOOTER_TIMESTAMP_RX.is_match(s) {
                continue;
            }
            val_lines.push(s.trim_start_matches('-').trim().to_string());
        }
        let combined = val_lines.join(", ");
        let combined = PARTIES_LABEL_RX.replace(&combined, "");
        let combined = split_mashed_words(&collapse_spaces(&combined));
        let combined = combined
            .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | ',' | ':'))
            .to_string();
        let combined = comma_and_join(&combined);
        if !combined.is_empty() {
            self.buffer.parties_involved = Some(combined);
        }
        self.last_field = None;
    }

    fn step(&mut self, i: usize, ln: &str) {
        if ln.is_empty() {
            return;
        }

        // A wrapped "numbers) :" fragment belongs to the next field.
        if NUMBERS_TAIL_RX.is_match(ln) {
            self.last_field = None;
            return;
        }

        let cat = self.buffer.category_lc();
        let lower = ln.to_lowercase();

        // Inside incident-style blocks an inline Start Date begins the next
        // entry when the current one already holds a timestamp.
        if cat.contains("incident report") || cat.contains("elevator entrapment incident") {
            if let Some(caps) = START_DATE_AMPM_RX.captures(ln) {
                let start_val = caps[1].trim().to_string();
                if self.buffer.date.is_some() {
                    self.flush();
                }
                self.buffer.start_date = Some(start_val.clone());
                self.buffer.date = Some(start_val);
                self.last_field = Some(Field::Date);
                return;
            }
        }

        if WHO_CALLED_RX.is_match(ln) {
            self.collect_who_called(i, ln);
            return;
        }
        if ALL_PERSONS_RX.is_match(ln) {
            self.collect_all_persons(i, ln);
            return;
        }

        // Bare timestamps split consecutive entries of the same category.
        if cat.contains("key service") && BARE_TIMESTAMP_RX.is_match(ln) {
            if self.buffer.date.is_some() {
                self.flush();
            }
            self.buffer.date = Some(ln.to_string());
            self.last_field = Some(Field::Date);
            return;
        }
        if (cat.contains("loading dock") || cat.contains("dock gate"))
            && BARE_TIMESTAMP_RX.is_match(ln)
        {
            if self.buffer.date.is_some()
                && (self.buffer.action.is_some() || self.buffer.company.is_some())
            {
                self.flush();
            }
            self.buffer.date = Some(ln.to_string());
            self.last_field = Some(Field::Date);
            return;
        }
        if cat.contains("fire panel")
            && BARE_TIMESTAMP_RX.is_match(ln)
            && !UNTIL_BY_AT_RX.is_match(ln)
        {
            if self.buffer.date.is_some()
                && (self.buffer.action.is_some() || self.buffer.company.is_some())
            {
                self.flush();
            }
            self.buffer.date = Some(ln.to_string());
            self.last_field = Some(Field::Date);
            return;
        }

        // Headers whose officer is printed a few lines above them.
        if DOCK_HEADER_RX.is_match(ln) {
            self.lookback_dock_officer(i);
        }
        if FIRE_HEADER_RX.is_match(ln) || AES_HEADER_RX.is_match(ln) {
            self.lookback_named_officer(i);
        }
        if lower.starts_with("new activity") {
            self.lookahead_officer(i);
        }

        // SPD Presence / Emergency Response sub-block.
        if lower.contains("spd presence/emergency response on") {
            self.sub = SubBlock::Spd;
            self.sub_buffer = EventBuffer::default();
            self.sub_buffer.category = Some("SPD Presence/Emergency Response on Site".to_string());
            self.buffer.start_date = None;
            if let Some(off) = self.buffer.officer.clone() {
                self.sub_buffer.officer = Some(off);
            }
            let end = (i + 4).min(self.lines.len());
            for nxt in &self.lines[i..end] {
                if let Some(caps) = START_DATE_RX.captures(nxt) {
                    let v = caps[1].trim().to_string();
                    self.sub_buffer.start_date = Some(v.clone());
                    self.buffer.start_date = Some(v);
                    break;
                }
            }
            return;
        }
        if self.sub == SubBlock::Spd {
            self.spd_step(i, ln);
            return;
        }

        // Seattle Ambassadors sub-block.
        if lower == "seattle ambassadors" || lower.contains("seattle ambassadors start date") {
            self.buffer.start_date = None;
            self.sub = SubBlock::Ambassadors;
            self.sub_buffer = EventBuffer::default();
            self.sub_buffer.category = Some("Seattle Ambassadors".to_string());
            if let Some(caps) = START_DATE_RX.captures(ln) {
                let v = caps[1].trim().to_string();
                self.sub_buffer.start_date = Some(v.clone());
                self.sub_buffer.date = Some(v.clone());
                self.buffer.start_date = Some(v);
            }
            return;
        }
        if self.sub == SubBlock::Ambassadors {
            self.ambassador_step(i, ln);
            return;
        }

        // Unsecure-door blocks flush immediately as Retail Issues.
        if lower.contains("unsecure door") {
            self.capture_unsecure_door(i);
            return;
        }

        // TOUR blocks never contribute events.
        if lower.starts_with("tour") {
            self.in_tour = true;
            return;
        }
        if self.in_tour && (ln.starts_with("NEW ACTIVITY") || ln.starts_with("Start Date")) {
            self.in_tour = false;
        }
        if self.in_tour {
            return;
        }

        // Category labels.
        if CATEGORY_LABELS.iter().any(|k| ln.contains(k)) {
            if lower.contains("incident report") {
                let carry_officer = self.buffer.officer.clone();
                let carry_date = self.buffer.date.clone();
                self.flush();
                self.buffer.officer = carry_officer;
                self.buffer.date = carry_date;
            }
            if lower.contains("transient removal") && self.buffer.category_lc() == "transient removal"
            {
                self.flush();
            }
            if !self.labels.iter().any(|l| l == ln) {
                self.labels.push(ln.to_string());
            }
            self.buffer.category = Some(ln.to_string());
            if ln.contains("Transient Removal") {
                self.transient_tag_seen = true;
            }
        }

        // Officer lines.
        if ln == "Officer" {
            self.waiting_officer_nested = true;
            self.last_field = None;
            return;
        }
        if self.waiting_officer_nested && ln.starts_with("- Officer :") {
            let name = after_colon(ln);
            self.set_officer(&name);
            self.waiting_officer_nested = false;
            self.last_field = Some(Field::Officer);
            return;
        }
        if ln.starts_with("- Officer :") || ln.starts_with("Officer :") {
            let name = after_colon(ln);
            self.set_officer(&name);
            self.last_field = Some(Field::Officer);
            return;
        }
        if let Some(caps) = OFFICER_LINE_RX.captures(ln).or_else(|| OFFICER_LINE_ALT_RX.captures(ln))
        {
            let name = caps[1].to_string();
            self.set_officer(&name);
            self.last_field = Some(Field::Officer);
            return;
        }

        // NEW ACTIVITY closes an open incident report.
        if ln.starts_with("NEW ACTIVITY") && self.buffer.category_lc() == "incident report" {
            self.flush();
            return;
        }

        // Start Date begins a new event everywhere except inside an IR.
        if ln.starts_with("Start Date") {
            if self.buffer.category_lc() == "incident report" {
                self.buffer.date = Some(after_colon(ln));
                self.last_field = Some(Field::Date);
                return;
            }
            // A header-only buffer (category or officer, no content yet)
            // labels the entry that starts here rather than ending one.
            if self.buffer.date.is_none()
                && self.buffer.action.is_none()
                && self.buffer.incident_description.is_none()
                && self.buffer.incident_comments.is_none()
            {
                self.buffer.date = Some(after_colon(ln));
                self.last_field = Some(Field::Date);
                return;
            }
            self.flush();
            self.buffer.date = Some(after_colon(ln));
            self.last_field = Some(Field::Date);
            return;
        }

        // Break and UI noise.
        if ln.contains("Minute Break") || ln.contains("Lunch Break") || ln.contains("Break Details")
        {
            self.last_field = None;
            return;
        }
        if ["Totals Activities", "Total Activities", "Object Duration", "Activity Duration"]
            .iter()
            .any(|x| ln.contains(x))
        {
            self.last_field = None;
            return;
        }
        if lower == "close" {
            self.last_field = None;
            return;
        }
        if lower.starts_with("escalation?")
            || lower.starts_with("- was the police")
            || lower.starts_with("- (if so")
            || lower.starts_with("- call back number")
            || lower.starts_with("- all persons involved")
        {
            self.last_field = None;
            return;
        }
        if lower.starts_with("- upload picture") {
            if self.buffer.category_lc().contains("work order") {
                self.wo_upload_seen = true;
            }
            self.last_field = None;
            return;
        }

        // Content fields.
        if ln.contains("Security action") || ln.contains("What are you doing") || ln.contains("What did you do")
        {
            self.buffer.action = Some(after_colon(ln));
            self.last_field = Some(Field::Action);
            return;
        }
        if lower.starts_with("- description of what happened") {
            self.buffer.incident_description = Some(after_colon(ln));
            self.last_field = Some(Field::IncidentDescription);
            return;
        }
        if lower.starts_with("- operator name") {
            self.buffer.operator_name = Some(after_colon(ln));
            self.last_field = Some(Field::OperatorName);
            return;
        }
        if lower.starts_with("- operator #") || lower.starts_with("- operator number") {
            self.buffer.operator_number = Some(after_colon(ln));
            self.last_field = Some(Field::OperatorNumber);
            return;
        }
        if lower.starts_with("- comments") {
            self.buffer.incident_comments = Some(after_colon(ln));
            self.last_field = Some(Field::IncidentComments);
            return;
        }
        if BARE_TIMESTAMP_RX.is_match(ln) && self.buffer.category_lc() == "incident report" {
            if self.buffer.start_date.is_none() {
                self.buffer.start_date = Some(ln.to_string());
                self.buffer.date = Some(ln.to_string());
            }
            return;
        }
        if let Some(caps) = START_DATE_SLOPPY_RX.captures(ln) {
            let v = caps[1].trim().to_string();
            self.buffer.start_date = Some(v.clone());
            self.buffer.date = Some(v);
            self.last_field = Some(Field::Date);
            return;
        }
        if let Some(caps) = INCIDENT_DATE_RX.captures(ln) {
            self.buffer.incident_date = Some(caps[1].trim().to_string());
            self.last_field = Some(Field::IncidentDate);
            return;
        }
        if let Some(caps) = INCIDENT_TIME_RX.captures(ln) {
            self.buffer.incident_time = Some(caps[1].trim().to_string());
            self.last_field = Some(Field::IncidentTime);
            return;
        }
        if lower.starts_with("- incident location") {
            self.buffer.location = Some(after_colon(ln));
            self.last_field = Some(Field::Location);
            return;
        }
        if lower.starts_with("- long description of incident") {
            self.buffer.incident_description = Some(after_colon(ln));
            self.last_field = Some(Field::IncidentDescription);
            return;
        }

        // Long-description continuation with its own stop set.
        if self.last_field == Some(Field::IncidentDescription) {
            if PARTIES_HDR_RX.is_match(ln) {
                self.last_field = Some(Field::PartiesInvolved);
                return;
            }
            if DESC_STOP_RX.is_match(ln) {
                self.last_field = None;
                return;
            }
            if PAGE_NOISE_RX.is_match(ln) {
                return;
            }
            self.buffer.append(Field::IncidentDescription, ln);
            return;
        }

        if lower.starts_with("parties involved") {
            self.collect_parties_block(i, ln);
            return;
        }

        // Work-order description, captured between the upload marker and the
        // Building Engines line.
        if WO_PLACED_RX.is_match(ln) {
            if self.buffer.category_lc().contains("work order") {
                self.buffer.placed_on_building_engines = lower.contains("yes");
            }
            self.wo_upload_seen = false;
            self.last_field = None;
            return;
        }
        if WO_DESC_RX.is_match(ln)
            && self.wo_upload_seen
            && self.buffer.category_lc().contains("work order")
        {
            self.buffer.work_description = Some(after_colon(ln));
            self.last_field = Some(Field::WorkDescription);
            return;
        }
        if self.last_field == Some(Field::WorkDescription) {
            if PAGE_NOISE_RX.is_match(ln)
                || FOOTER_TIMESTAMP_RX.is_match(ln)
                || SITE_HEADER_LINES.contains(&ln)
            {
                return;
            }
            if self.is_new_block_line(ln) {
                self.last_field = None;
            } else {
                self.buffer.append(Field::WorkDescription, ln);
                return;
            }
        }

        // Vehicle fields.
        if lower.starts_with("- year") {
            self.buffer.vehicle_year = Some(after_colon(ln));
            return;
        }
        if lower.starts_with("- make") {
            self.buffer.vehicle_make = Some(after_colon(ln));
            return;
        }
        if lower.starts_with("- model") {
            self.buffer.vehicle_model = Some(after_colon(ln));
            return;
        }
        if lower.starts_with("- color") {
            self.buffer.vehicle_color = Some(after_colon(ln));
            return;
        }
        if lower.starts_with("- description") {
            self.buffer.vehicle_description = Some(after_colon(ln));
            return;
        }

        // Free comment block used by Other/Miscellaneous.
        if lower.starts_with("comments") {
            self.last_field = Some(Field::Comment);
            return;
        }
        if let Some(caps) = MULTILINE_FIELD_RX.captures(ln) {
            self.buffer.comment = Some(caps[1].trim().to_string());
            self.last_field = Some(Field::Comment);
            return;
        }

        if matches!(ln, "Details" | "Call Details" | "Date & Time" | "Date/Time") {
            self.last_field = None;
            return;
        }
        if ln.contains("Company") || ln.contains("Vendor") {
            self.buffer.company = Some(after_colon(ln));
            self.last_field = Some(Field::Company);
            return;
        }
        if ln.starts_with("Location") || ln.starts_with("- Location :") {
            if let Some((_, rest)) = ln.split_once(':') {
                self.buffer.location = Some(rest.trim().to_string());
                self.last_field = Some(Field::Location);
                return;
            }
        }
        if ln.starts_with("Geolocation") || ln.contains("LOGBOOK PDF") {
            self.last_field = None;
            return;
        }

        // Wrapped continuation lines.
        if let Some(field) = self.last_field {
            match field {
                Field::Action | Field::Company | Field::Location | Field::Comment
                | Field::IncidentComments => {
                    if !self.is_new_block_line(ln) {
                        self.buffer.append(field, ln);
                    }
                }
                _ => {}
            }
        }
    }

    fn spd_step(&mut self, i: usize, ln: &str) {
        let lower = ln.to_lowercase();
        if START_DATE_ANY_RX.is_match(ln) {
            let v = after_colon(ln);
            self.sub_buffer.start_date = Some(v.clone());
            self.buffer.start_date = Some(v);
        } else if OFFICER_FIELD_RX.is_match(ln) {
            self.sub_buffer.officer = Some(after_colon(ln));
        } else if lower.contains("date of incident") && ln.contains(':') {
            self.sub_buffer.incident_date = Some(after_colon(ln));
        } else if lower.contains("time of incident") && ln.contains(':') {
            self.sub_buffer.incident_time = Some(normalize_clock_time(&after_colon(ln)));
        } else if lower.starts_with("- location") {
            let loc = after_colon(ln);
            if !loc.contains('°') {
                self.sub_buffer.location = Some(format_location_name(&loc));
            }
        } else if lower.contains("who called spd") {
            let mut parts: Vec<String> = Vec::new();
            let val = after_colon(ln);
            if !val.is_empty() && !val.eq_ignore_ascii_case(ln.trim()) {
                parts.push(val);
            }
            for nxt in &self.lines[i + 1..] {
                let s = nxt.trim();
                if SPD_WHO_STOP_RX.is_match(s)
                    || s.is_empty()
                    || s.to_lowercase().starts_with("parties involved")
                {
                    break;
                }
                if PAGE_NOISE_RX.is_match(s) || FOOTER_TIMESTAMP_RX.is_match(s) {
                    continue;
                }
                parts.push(s.to_string());
            }
            let caller = parts.join(" ");
            let caller = SECURITY_OFFICER_RX.replace_all(&caller, "");
            let caller = collapse_spaces(&caller)
                .split_whitespace()
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(" ");
            self.sub_buffer.who_called = Some(caller);
        } else if lower.contains("parties involved") {
            let mut parts: Vec<String> = Vec::new();
            let val = after_colon(ln);
            if !val.is_empty() && !val.eq_ignore_ascii_case(ln.trim()) {
                parts.push(val);
            }
            for nxt in &self.lines[i + 1..] {
                let s = nxt.trim();
                if SPD_PARTIES_STOP_RX.is_match(s) {
                    break;
                }
                if s.is_empty() || PAGE_NOISE_RX.is_match(s) || FOOTER_TIMESTAMP_RX.is_match(s) {
                    continue;
                }
                parts.push(s.to_string());
            }
            let combined = parts.join(", ");
            let combined = PARTIES_LABEL_RX.replace(&combined, "");
            let combined = collapse_spaces(&combined)
                .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | ',' | ':'))
                .to_string();
            self.sub_buffer.parties_involved = Some(comma_and_join(&combined));
        } else if lower.contains("long description of incident") {
            let mut desc = after_colon(ln);
            for nxt in &self.lines[i + 1..] {
                let s = nxt.trim();
                if SPD_DESC_STOP_RX.is_match(s) {
                    break;
                }
                if !s.is_empty() {
                    desc.push(' ');
                    desc.push_str(s);
                }
            }
            let mut desc = fix_ocr_noise(&collapse_spaces(&desc));
            if !desc.is_empty() && !desc.ends_with('.') {
                desc.push('.');
            }
            let action = if desc.is_empty() {
                "reported that an incident occurred on site.".to_string()
            } else {
                let mut d = desc;
                if let Some(first) = d.split_whitespace().next() {
                    if FIRST_WORD_SHORT_RX.is_match(first) {
                        let lowered = first.to_lowercase();
                        d = format!("{}{}", lowered, &d[first.len()..]);
                    }
                }
                let with_prefix = format!("reported that {}", d);
                DOUBLE_REPORTED_RX
                    .replace_all(&with_prefix, "reported that")
                    .to_string()
            };
            self.sub_buffer.action = Some(action);
        } else if lower.starts_with("new activity") || lower == "close" {
            let idate = self.sub_buffer.incident_date.clone().unwrap_or_default();
            let itime = self.sub_buffer.incident_time.clone().unwrap_or_default();
            self.sub_buffer.date = compact_incident_timestamp(&idate, &itime)
                .or_else(|| self.sub_buffer.start_date.clone());
            self.sub = SubBlock::None;
            self.emit_sub_block();
        }
    }

    fn ambassador_step(&mut self, i: usize, ln: &str) {
        let lower = ln.to_lowercase();
        if lower == "close" {
            // A Close directly before the next ambassador block is UI noise.
            if let Some(nxt) = self.lines.get(i + 1) {
                if nxt.to_lowercase().contains("seattle ambassadors") {
                    return;
                }
            }
            self.sub = SubBlock::None;
            self.sub_buffer = EventBuffer::default();
            return;
        }
        if START_DATE_ANY_RX.is_match(ln) {
            let start_val = after_colon(ln);
            self.sub_buffer.start_date = Some(start_val.clone());
            self.buffer.start_date = Some(start_val.clone());
            if let Some(caps) = AMB_TS_RX.captures(&start_val) {
                let mm: u32 = caps[1].parse().unwrap_or(0);
                let dd: u32 = caps[2].parse().unwrap_or(0);
                let yyyy = &caps[3];
                let mut hh: u32 = caps[4].parse().unwrap_or(0);
                let mins = &caps[5];
                let ampm = match caps.get(6) {
                    Some(m) => m.as_str().to_uppercase(),
                    None => {
                        let mut a = "AM";
                        if hh >= 12 {
                            a = "PM";
                            if hh > 12 {
                                hh -= 12;
                            }
                        } else if hh == 0 {
                            hh = 12;
                        }
                        a.to_string()
                    }
                };
                let yy = &yyyy[yyyy.len() - 2..];
                self.sub_buffer.date =
                    Some(format!("{:02}/{:02}/{} {}:{} {}", mm, dd, yy, hh, mins, ampm));
            } else {
                self.sub_buffer.date = Some(start_val);
            }
            return;
        }
        if TIME_FIELD_RX.is_match(ln) {
            if let Some(caps) = HHMM_RX.captures(&after_colon(ln)) {
                let hh: u32 = caps[1].parse().unwrap_or(0);
                let mm: u32 = caps[2].parse().unwrap_or(0);
                self.sub_buffer.incident_time =
                    Some(normalize_clock_time(&format!("{}:{:02}", hh, mm)));
            }
            return;
        }
        if DATE_FIELD_RX.is_match(ln) {
            self.sub_buffer.incident_date = Some(after_colon(ln));
            return;
        }
        if lower.starts_with("- officer") || lower.contains("officer :") {
            self.sub_buffer.officer = Some(after_colon(ln));
        } else if lower.starts_with("- location") {
            self.sub_buffer.location = Some(after_colon(ln));
        } else if lower.starts_with("new activity") {
            self.finish_ambassador_block();
        }
    }

    fn finish_ambassador_block(&mut self) {
        if let (Some(idate), Some(itime)) = (
            self.sub_buffer.incident_date.clone(),
            self.sub_buffer.incident_time.clone(),
        ) {
            self.sub_buffer.date = Some(format!("{} {}", idate, itime));
        } else if self.sub_buffer.date.is_none() {
            self.sub_buffer.date = self.sub_buffer.start_date.clone();
        }
        if let Some(loc) = self.sub_buffer.location.clone() {
            self.sub_buffer.location = Some(format_location_name(&loc));
        }
        self.sub_buffer.action = Some(
            "placed a phone call to MID to dispatch the Seattle Ambassadors on site \
             to clean human waste, bodily fluids, and messy trash on the exterior."
                .to_string(),
        );
        self.sub = SubBlock::None;
        self.emit_sub_block();
    }

    fn capture_unsecure_door(&mut self, i: usize) {
        let end = (i + 15).min(self.lines.len());
        let mut u = EventBuffer::default();
        u.category = Some("Retail Issues".to_string());
        for sub in &self.lines[i..end] {
            let s = sub.trim();
            let s_lower = s.to_lowercase();
            if START_DATE_ANY_RX.is_match(s) {
                if let Some(caps) = LOOSE_TS_CAPTURE_RX.captures(s) {
                    u.start_date = Some(caps[1].trim().to_string());
                }
            }
            if DATE_FIELD_RX.is_match(s) {
                if let Some(caps) = DIGITS_SLASH_RX.captures(&after_colon(s)) {
                    u.incident_date = Some(caps[1].trim().to_string());
                }
            }
            if TIME_FIELD_RX.is_match(s) {
                if let Some(caps) = HHMM_RX.captures(&after_colon(s)) {
                    let hh: u32 = caps[1].parse().unwrap_or(0);
                    let mm: u32 = caps[2].parse().unwrap_or(0);
                    u.incident_time = Some(normalize_clock_time(&format!("{}:{:02}", hh, mm)));
                }
            }
            if s_lower.contains("pre-defined list") || OFFICER_FIELD_RX.is_match(s) {
                u.officer = Some(after_colon(s));
            }
            if LOCATION_FIELD_RX.is_match(s) {
                let loc = after_colon(s);
                if !loc.contains('°') {
                    u.location = Some(format_location_name(&loc));
                }
            }
        }
        let idate = u.incident_date.clone().unwrap_or_default();
        let itime = u.incident_time.clone().unwrap_or_default();
        u.date = if !idate.is_empty() && !itime.is_empty() {
            Some(
                compact_incident_timestamp(&idate, &itime)
                    .unwrap_or_else(|| format!("{} {}", idate, itime)),
            )
        } else if !itime.is_empty() {
            Some(itime)
        } else {
            u.start_date.clone()
        };
        let place = u.location.clone().unwrap_or_else(|| "the site".to_string());
        u.action = Some(format!(
            "reported that a door at {} was found unsecured and was properly secured upon discovery.",
            place
        ));
        self.sub_buffer = u;
        self.emit_sub_block();
    }
}

/// Common OCR artifacts in long descriptions.
fn fix_ocr_noise(text: &str) -> String {
    static FIVE_HE_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b5he\b").unwrap());
    static AED_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\baed\b").unwrap());
    static W_HE_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bw\s*he\b").unwrap());
    static N_ON_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bn on\b").unwrap());
    let t = FIVE_HE_RX.replace_all(text, "the");
    let t = AED_RX.replace_all(&t, "A");
    let t = W_HE_RX.replace_all(&t, "when he");
    let t = N_ON_RX.replace_all(&t, " on");
    let t = collapse_spaces(&t);
    match t.chars().next() {
        Some(c) if c.is_lowercase() => c.to_uppercase().collect::<String>() + &t[c.len_utf8()..],
        _ => t,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_key_service_block() {
        let doc = lines(&[
            "NEW ACTIVITY",
            "Start Date : 9/18/2025 8:18 AM",
            "TEGEGNE Getachew (Officers)",
            "Key Service",
            "Security action taken : unlock the doors for delivery",
            "Company : Victrola Coffee",
            "Close",
        ]);
        let events = segment(&doc);
        assert_eq!(events.len(), 1);
        let buf = &events[0].buffer;
        assert_eq!(buf.category.as_deref(), Some("Key Service"));
        assert_eq!(buf.officer.as_deref(), Some("Getachew Tegegne"));
        assert_eq!(buf.date.as_deref(), Some("9/18/2025 8:18 AM"));
        assert_eq!(buf.action.as_deref(), Some("unlock the doors for delivery"));
        assert_eq!(buf.company.as_deref(), Some("Victrola Coffee"));
    }

    #[test]
    fn test_action_continuation_absorbed() {
        let doc = lines(&[
            "Start Date : 9/18/2025 9:00 AM",
            "Loading Dock Gate",
            "Security action taken : unlocked the gate",
            "for the morning delivery window",
            "Close",
        ]);
        let events = segment(&doc);
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].buffer.action.as_deref(),
            Some("unlocked the gate for the morning delivery window")
        );
    }

    #[test]
    fn test_tour_block_swallowed() {
        let doc = lines(&[
            "TOUR",
            "Start Time : 9/18/2025 6:00 AM",
            "Posts included : Lobby",
            "NEW ACTIVITY",
            "Start Date : 9/18/2025 7:10 AM",
            "Transient Removal",
            "Security action taken : removed a transient from the garage",
        ]);
        let events = segment(&doc);
        assert_eq!(events.len(), 1);
        assert!(events[0].transient_tag_seen);
        assert_eq!(events[0].buffer.category.as_deref(), Some("Transient Removal"));
    }

    #[test]
    fn test_double_transient_label_splits_events() {
        let doc = lines(&[
            "Start Date : 9/18/2025 1:00 AM",
            "Transient Removal",
            "Security action taken : removed a transient from the alley",
            "Transient Removal",
            "Security action taken : removed a transient from the lobby",
            "Start Date : 9/18/2025 2:00 AM",
        ]);
        let events = segment(&doc);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.transient_tag_seen));
    }

    #[test]
    fn test_bare_timestamp_splits_key_service_entries() {
        let doc = lines(&[
            "Start Date : 9/18/2025 8:00 AM",
            "Key Service",
            "Security action taken : unlocked the doors",
            "9/18/2025 9:30 AM",
            "Security action taken : locked the doors",
        ]);
        let events = segment(&doc);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].buffer.date.as_deref(), Some("9/18/2025 8:00 AM"));
        assert_eq!(events[1].buffer.date.as_deref(), Some("9/18/2025 9:30 AM"));
        assert_eq!(events[1].buffer.action.as_deref(), Some("locked the doors"));
    }

    #[test]
    fn test_empty_buffer_dropped_on_flush() {
        let doc = lines(&[
            "Start Date : 9/18/2025 8:00 AM",
            "Start Date : 9/18/2025 9:00 AM",
            "Key Service",
            "Security action taken : issued a key",
        ]);
        let events = segment(&doc);
        // The first Start Date block carried no content and is discarded.
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].buffer.date.as_deref(), Some("9/18/2025 9:00 AM"));
    }

    #[test]
    fn test_ambassador_block() {
        let doc = lines(&[
            "Seattle Ambassadors",
            "Start Date : 9/29/2025 16:25",
            "- Officer : PAYMAN Ramazan",
            "- Location : pine street exterior",
            "NEW ACTIVITY",
        ]);
        let events = segment(&doc);
        assert_eq!(events.len(), 1);
        let buf = &events[0].buffer;
        assert_eq!(buf.category.as_deref(), Some("Seattle Ambassadors"));
        assert_eq!(buf.date.as_deref(), Some("09/29/25 4:25 PM"));
        assert_eq!(buf.location.as_deref(), Some("Pine Street Exterior"));
        assert!(buf.action.as_deref().unwrap().contains("Seattle Ambassadors"));
    }

    #[test]
    fn test_unsecure_door_block() {
        let doc = lines(&[
            "Unsecure door",
            "Start Date : 10/1/2025 3:10 AM",
            "- Date : 10/1/2025",
            "- Time : 02:55",
            "- Officer : ALI Kassim",
            "- Location : retail corridor",
        ]);
        let events = segment(&doc);
        assert_eq!(events.len(), 1);
        let buf = &events[0].buffer;
        assert_eq!(buf.category.as_deref(), Some("Retail Issues"));
        assert_eq!(buf.date.as_deref(), Some("10/01/25 2:55 AM"));
        assert!(buf
            .action
            .as_deref()
            .unwrap()
            .contains("a door at Retail Corridor was found unsecured"));
    }

    #[test]
    fn test_spd_block() {
        let doc = lines(&[
            "SPD Presence/Emergency Response on Site",
            "Start Date : 10/2/2025 4:30 AM",
            "- Date of Incident : 10/2/2025",
            "- Time of Incident : 04:17",
            "- Location : lobby",
            "- Who Called SPD : KING Jovonne",
            "- Parties Involved : N/A",
            "- Long Description of Incident : a subject collapsed near the entrance",
            "- Images :",
            "NEW ACTIVITY",
        ]);
        let events = segment(&doc);
        assert_eq!(events.len(), 1);
        let buf = &events[0].buffer;
        assert_eq!(
            buf.category.as_deref(),
            Some("SPD Presence/Emergency Response on Site")
        );
        assert_eq!(buf.date.as_deref(), Some("10/02/25 4:17 AM"));
        assert_eq!(buf.location.as_deref(), Some("Lobby"));
        assert_eq!(buf.who_called.as_deref(), Some("King Jovonne"));
        assert!(buf.action.as_deref().unwrap().starts_with("reported that"));
    }

    #[test]
    fn test_final_safety_flush() {
        let doc = lines(&[
            "Start Date : 9/18/2025 11:50 PM",
            "Fire Panel Bypass/Online",
            "Security action taken : put the panel on supervisory hold until 2:00 AM",
        ]);
        let events = segment(&doc);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].buffer.category.as_deref(), Some("Fire Panel Bypass/Online"));
    }
}
