//! Narrative synthesis.
//!
//! Turns a classified event buffer into one finished report entry. Every
//! entry shares the frame `MM/DD/YY H:MM AM – <b>Officer First Last</b>
//! action [for Company] – (Location)`, but each section rewrites the raw
//! action into its own professional phrasing: key service gets scenario
//! templates, fire panel and AES get hold-type wording, incident-style
//! sections get a "reported that ..." narrative with red metadata spans.

use log::debug;
use regex::Regex;
use std::sync::LazyLock;

use crate::locate;
use crate::markup::{bold, colored, labeled, Color};
use crate::normalize::{
    bold_officer, capitalize, clean_shift_noise, extract_hold_until, format_location_name,
    normalize_clock_time, to_past_tense,
};
use crate::schema::{EventBuffer, FlushedEvent, ParsedReport, Section};
use crate::tables::{contains_any, FOOTER_NOISE_RX, VENDORS};

static LINE_DATE_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2})/(\d{1,2})/(\d{4})\s+(\d{1,2}:\d{2}\s*[AP]M)").unwrap()
});
static CLOSE_WORD_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bClose\b").unwrap());
static MULTISPACE_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());
static YEAR4_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").unwrap());
static AMPM_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*([APap][Mm])").unwrap());
static EMBEDDED_DATE_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Incident Date[:\s]+([0-9/]+)\s*(?:at\s+([0-9:]+\s*[APap][Mm]))?").unwrap()
});
static EMBEDDED_LOC_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Location[:\s]+([A-Za-z0-9#\s\-]+)").unwrap());
static WHO_SWAP_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]{2,})\s+([A-Z][a-z]+)$").unwrap());
static WHO_PREFIXED_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]{2,})\s+([A-Z][a-z]+)").unwrap());
static PAREN_SPAN_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*?\)").unwrap());
static DESC_LABEL_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(long\s*)?description\s*of\s*incident\s*:?").unwrap()
});
static DESC_FRAGMENT_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)-\s*long description of incident.*").unwrap());
static DESC_PAREN_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)–\s*\(.*long description of incident.*\)").unwrap());
static TRAILING_PAREN_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)–\s*\(.*?\)$").unwrap());
static LOC_RESIDUE_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(-?\s*long\s*description\s*of\s*incident\s*:?.*)").unwrap()
});
static PARTIES_TAIL_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(photos?|evidence)\b.*").unwrap());
static REPORTED_THAT_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\breported that\b").unwrap());
static VENDOR_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)\b({})\b", VENDORS.join("|"))).unwrap());
static DOT_RUN_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\.\s*\.?").unwrap());
static LOCATION_TAG_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\(Location\s*:").unwrap());
static GAVE_ACCESS_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)gave\s+access\s+to\s+([A-Za-z\s]+?)(?:\s+for\s+([A-Za-z\s]+))?(?:\s|$)").unwrap()
});
static ITEM_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(key\d*|badge\d*|key|badge|keys|badges)\b").unwrap());
static ISSUE_VERB_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(issued|provided|handed)\b").unwrap());
static RETURN_VERB_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(returned|collected|retrieved|received back)\b").unwrap());
static FOR_RECIPIENT_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bfor\s+([A-Za-z\s\-\(\)]+)").unwrap());
static FROM_RECIPIENT_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bfrom\s+([A-Za-z\s\-\(\)]+)").unwrap());
static AUTHORIZED_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(authorized by\s*([A-Za-z\s]+)\)").unwrap());
static TRAILING_LOC_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([^)]+)\)$").unwrap());
static THE_THE_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bthe\s+the\b").unwrap());
static DOORS_DOORS_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdoors\s+doors\b").unwrap());
static TRAILING_THE_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bthe\s*$").unwrap());
static HAS_DIGIT_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").unwrap());
static LOWERED_VERBS: &[&str] = &[
    "secured", "locked", "unlocked", "granted", "provided", "issued", "returned", "escorted",
    "assisted", "facilitated", "supervised", "verified", "ensured", "conducted", "closed",
];

/// `M/D/YYYY H:MM AM` reformatted to the short `MM/DD/YY H:MM AM` frame used
/// by every entry. Anything else passes through unchanged.
fn fmt_short_date(date: &str) -> String {
    let date = date.trim();
    match LINE_DATE_RX.captures(date) {
        Some(caps) => {
            let mm: u32 = caps[1].parse().unwrap_or(0);
            let dd: u32 = caps[2].parse().unwrap_or(0);
            let yyyy = &caps[3];
            format!("{:02}/{:02}/{} {}", mm, dd, &yyyy[yyyy.len() - 2..], caps[4].to_uppercase())
        }
        None => date.to_string(),
    }
}

/// Shorten 4-digit years and uppercase the AM/PM marker without reordering
/// the rest of the timestamp.
fn shorten_start_date(s: &str) -> String {
    let s = YEAR4_RX.replace_all(s.trim(), |caps: &regex::Captures| caps[0][2..].to_string());
    AMPM_RX
        .replace_all(&s, |caps: &regex::Captures| format!(" {}", caps[1].to_uppercase()))
        .trim()
        .to_string()
}

/// The shared entry frame. Joins timestamp, bolded officer, past-tense
/// action (with "for Company" unless the company is already named), and the
/// parenthesized location with en dashes.
pub fn build_event_line(buf: &EventBuffer) -> String {
    let date = fmt_short_date(buf.date.as_deref().unwrap_or(""));
    let officer = bold_officer(buf.officer.as_deref().unwrap_or(""));
    let mut action = buf.action.as_deref().unwrap_or("").trim().to_string();
    if !action.is_empty() {
        action = to_past_tense(&action);
        action = CLOSE_WORD_RX.replace_all(&action, "").trim().to_string();
        action = MULTISPACE_RX.replace_all(&action, " ").to_string();
    }
    let mut company = buf.company.as_deref().unwrap_or("").trim().to_string();
    let location = buf.location.as_deref().unwrap_or("").trim().to_string();

    if !company.is_empty() && !action.is_empty()
        && action.to_lowercase().contains(&company.to_lowercase())
    {
        company.clear();
    }

    let mut parts: Vec<String> = Vec::new();
    if !date.is_empty() {
        parts.push(date);
    }
    if !officer.is_empty() {
        parts.push(officer);
    }
    if !action.is_empty() {
        if company.is_empty() {
            parts.push(action);
        } else {
            parts.push(format!("{} for {}", action, company));
        }
    }
    if !location.is_empty() {
        parts.push(format!("({})", location));
    }
    parts
        .join(" – ")
        .trim_matches(|c: char| c.is_whitespace() || c == '–')
        .to_string()
}

fn red(label: &str, value: &str) -> String {
    colored(Color::Red, &labeled(label, value))
}

fn black(label: &str, value: &str) -> String {
    colored(Color::Black, &labeled(label, value))
}

/// Synthesize the report entry for one classified event. Returns `None` when
/// the section rules decide the event has nothing reportable (empty key
/// service actions, shift-handover work orders, misc blocks handled by the
/// document scan).
pub fn synthesize(event: &FlushedEvent, section: Section) -> Option<String> {
    let category = event.buffer.category.as_deref().unwrap_or("");
    // Sub-block buffers arrive with a pre-built action that must not be
    // rewritten by the section templates.
    if category == "SPD Presence/Emergency Response on Site" {
        return spd_entry(&event.buffer);
    }
    if category == "Seattle Ambassadors" {
        return non_empty(build_event_line(&event.buffer));
    }
    match section {
        Section::IncidentReports => ir_entry(&event.buffer),
        Section::ElevatorEntrapment => elevator_entry(&event.buffer),
        Section::WorkOrders => work_order_entry(&event.buffer),
        Section::PropertyDamage => property_damage_entry(&event.buffer),
        Section::KeyService => key_service_entry(&event.buffer),
        Section::LoadingDock => loading_dock_entry(&event.buffer),
        Section::FirePanel => fire_panel_entry(&event.buffer),
        Section::AesPhoneCalls => aes_entry(&event.buffer),
        Section::Janitorial => janitorial_entry(&event.buffer),
        // Misc entries are produced by the whole-document scan instead.
        Section::AdditionalInformation => None,
        _ => non_empty(build_event_line(&event.buffer)),
    }
}

fn non_empty(evt: String) -> Option<String> {
    if evt.is_empty() {
        None
    } else {
        Some(evt)
    }
}

/// Fallback date assembled from the structured incident date/time fields.
fn incident_fallback_date(buf: &mut EventBuffer) {
    if buf.date.is_some() {
        return;
    }
    let Some(idate) = buf.incident_date.clone() else {
        return;
    };
    match buf.incident_time.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => buf.date = Some(format!("{} {}", idate, normalize_clock_time(t))),
        None => buf.date = Some(idate),
    }
}

fn ir_entry(buffer: &EventBuffer) -> Option<String> {
    let mut b = buffer.clone();
    if b.start_date.is_some() {
        b.date = b.start_date.clone();
    }

    let desc = b.incident_description.clone().unwrap_or_default().trim().to_string();
    let cmts = b.incident_comments.clone().unwrap_or_default().trim().to_string();
    let mut narrative_parts: Vec<String> = Vec::new();
    if !desc.is_empty() {
        narrative_parts.push(format!("{}.", desc.trim_end_matches('.')));
    }
    if !cmts.is_empty() {
        narrative_parts.push(format!("{}.", cmts.trim_end_matches('.')));
    }
    let mut narrative = narrative_parts.join(" ").trim().to_string();
    if let Some(v) = b.vehicle_summary() {
        narrative.push_str(&format!(" Vehicle described as {}.", v));
    }

    let incident_date = b.incident_date.clone().unwrap_or_default().trim().to_string();
    let incident_time = b.incident_time.clone().unwrap_or_default().trim().to_string();
    let mut incident_location = b.location.clone().unwrap_or_default().trim().to_string();

    if incident_location.is_empty() && (!desc.is_empty() || !cmts.is_empty()) {
        let source = format!("{} {}", desc, cmts).to_lowercase();
        if let Some(loc) = locate::infer_location(&source) {
            incident_location = loc;
        }
    }
    incident_location = locate::truncate_at_section(&incident_location);

    // Some exports bury the structured fields inside the narrative.
    if b.incident_date.is_none() {
        if let Some(caps) = EMBEDDED_DATE_RX.captures(&narrative) {
            b.incident_date = Some(caps[1].to_string());
            if let Some(t) = caps.get(2) {
                b.incident_time = Some(t.as_str().trim().to_string());
            }
        }
    }
    if b.location.is_none() {
        if let Some(caps) = EMBEDDED_LOC_RX.captures(&narrative) {
            b.location = Some(caps[1].trim().to_string());
        }
    }
    if let Some(loc) = b.location.clone() {
        let formatted = format_location_name(&loc);
        b.location = Some(formatted.clone());
        incident_location = formatted;
    }

    let mut extra_info: Vec<String> = Vec::new();
    if !incident_date.is_empty() {
        if incident_time.is_empty() {
            extra_info.push(red("Incident Date", &incident_date));
        } else {
            extra_info.push(colored(
                Color::Red,
                &format!(
                    "Incident Date: {} at {}",
                    bold(&incident_date),
                    bold(&normalize_clock_time(&incident_time))
                ),
            ));
        }
    }
    if incident_location.is_empty() {
        extra_info.push(red("Location", "N/A"));
    } else {
        extra_info.push(red("Location", &incident_location));
    }

    let mut who_called = b.who_called.clone().unwrap_or_default().trim().to_string();
    if who_called.is_empty() {
        if let Some(off) = b.officer.as_deref().map(str::trim).filter(|o| !o.is_empty()) {
            who_called = format!("Officer {}", off);
        }
    }
    if !who_called.is_empty() {
        who_called = MULTISPACE_RX.replace_all(&who_called, " ").trim().to_string();
        who_called = PAREN_SPAN_RX.replace_all(&who_called, "").trim().to_string();
        let swapped = WHO_SWAP_RX
            .captures(&who_called)
            .map(|caps| format!("{} {}", capitalize(&caps[2]), capitalize(&caps[1])));
        if let Some(s) = swapped {
            who_called = s;
        }
        if who_called.to_lowercase().starts_with("officer ") {
            let name_part = who_called[8..].trim().to_string();
            who_called = match WHO_PREFIXED_RX.captures(&name_part) {
                Some(caps) => format!("Officer {} {}", capitalize(&caps[2]), capitalize(&caps[1])),
                None => format!(
                    "Officer {}",
                    name_part.split_whitespace().map(capitalize).collect::<Vec<_>>().join(" ")
                ),
            };
        }
        extra_info.push(black("Who Called", &who_called));
    }
    if let Some(p) = b.parties_involved.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        let parties = MULTISPACE_RX.replace_all(p, " ").to_string();
        extra_info.push(black("Parties Involved", &parties));
    }
    let extra_text = format!(" ({})", extra_info.join(", "));

    let narrative = narrative.trim().to_string();
    b.action = if narrative.is_empty() {
        Some(format!("reported that an incident occurred on site.{}", extra_text))
    } else {
        Some(format!(
            "reported that {}{}",
            crate::normalize::decapitalize_narrative(&narrative),
            extra_text
        ))
    };

    // Location is already inside the extras; drop the trailing duplicate.
    b.location = None;
    incident_fallback_date(&mut b);
    non_empty(build_event_line(&b))
}

fn elevator_entry(buffer: &EventBuffer) -> Option<String> {
    let mut b = buffer.clone();
    // The entry timestamp for entrapments comes from the structured incident
    // fields, never from the surrounding activity timestamps.
    b.start_date = None;
    b.date = None;

    let desc = b.incident_description.clone().unwrap_or_default().trim().to_string();
    let action = b.action.clone().unwrap_or_default().trim().to_string();
    let mut location = b.location.clone().unwrap_or_default().trim().to_string();
    let incident_date = b.incident_date.clone().unwrap_or_default().trim().to_string();

    if location.is_empty() && (!desc.is_empty() || !action.is_empty()) {
        let source = if desc.is_empty() { action.to_lowercase() } else { desc.to_lowercase() };
        if let Some(loc) = locate::infer_location(&source) {
            location = loc;
        }
    }

    let narrative = if desc.is_empty() { action } else { desc };
    let narrative = DESC_LABEL_RX.replace_all(&narrative, "").trim().to_string();
    let narrative = DESC_FRAGMENT_RX.replace_all(&narrative, "").trim().to_string();
    let narrative = DESC_PAREN_RX.replace_all(&narrative, "").trim().to_string();

    b.action = if narrative.is_empty() {
        Some("reported that an incident occurred on site.".to_string())
    } else if REPORTED_THAT_RX.is_match(&narrative) {
        Some(narrative.trim_end_matches('.').to_string())
    } else {
        let first = narrative.chars().next();
        let clean = match first {
            Some(c) if narrative.chars().count() > 1 => {
                c.to_lowercase().collect::<String>() + &narrative[c.len_utf8()..]
            }
            _ => narrative.clone(),
        };
        Some(format!("reported that {}", clean))
    };

    incident_fallback_date(&mut b);

    let evt = build_event_line(&b);
    if evt.is_empty() {
        return None;
    }
    let evt = DESC_FRAGMENT_RX.replace_all(&evt, " ").trim().to_string();
    let evt = DESC_PAREN_RX.replace_all(&evt, "").trim().to_string();
    let evt = TRAILING_PAREN_RX.replace(&evt, "").trim().to_string();

    let location_clean = LOC_RESIDUE_RX.replace_all(&location, "").trim().to_string();
    let location_clean = if location_clean.is_empty() {
        location_clean
    } else {
        format_location_name(&location_clean)
    };
    let incident_time = b.incident_time.clone().unwrap_or_default().trim().to_string();
    let formatted_time =
        if incident_time.is_empty() { String::new() } else { normalize_clock_time(&incident_time) };

    let mut extra_info: Vec<String> = Vec::new();
    if !incident_date.is_empty() && !formatted_time.is_empty() {
        extra_info.push(colored(
            Color::Red,
            &format!("Incident Date: {} at {}", bold(&incident_date), bold(&formatted_time)),
        ));
    } else if !incident_date.is_empty() {
        extra_info.push(red("Incident Date", &incident_date));
    } else {
        extra_info.push(red("Incident Date", "N/A"));
    }
    let final_location = if location_clean.is_empty() { location } else { location_clean };
    if final_location.is_empty() {
        extra_info.push(red("Location", "N/A"));
    } else {
        extra_info.push(red("Location", &final_location));
    }
    if let Some(p) = b.parties_involved.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        let parties = PARTIES_TAIL_RX.replace_all(p, "").trim().to_string();
        let parties = MULTISPACE_RX.replace_all(&parties, " ").to_string();
        extra_info.push(black("Parties Involved", &parties));
    }

    Some(format!("{} ({})", evt.trim_end_matches('.'), extra_info.join(", ")))
}

fn work_order_entry(buffer: &EventBuffer) -> Option<String> {
    let mut b = buffer.clone();
    if let Some(start) = b.start_date.clone() {
        b.date = Some(shorten_start_date(&start));
    }

    let mut description = b.work_description.clone().unwrap_or_default();
    description = DOT_RUN_RX.replace_all(&description, ".").to_string();
    description = MULTISPACE_RX.replace_all(&description, " ").trim().to_string();

    let action_raw = b.action.clone().unwrap_or_default().to_lowercase();
    let mut location = b.location.clone().unwrap_or_default().trim().to_string();
    if location.is_empty() && !description.is_empty() {
        if let Some(loc) = locate::infer_location(&description.to_lowercase()) {
            location = loc;
        }
    }
    if !location.is_empty() {
        location = format_location_name(&location);
    }
    let placed = b.placed_on_building_engines;

    // Shift-handover summaries and empty generic clicks produce nothing.
    if contains_any(
        &action_raw,
        &["new emails received", "work orders communicated", "important info passed", "shift"],
    ) {
        debug!("skipping handover work order entry");
        return None;
    }
    let description = description.trim_matches(|c: char| c == '.' || c == ' ').to_string();
    if description.is_empty() && !placed {
        return None;
    }

    let vendor = VENDOR_RX.captures(&description).map(|c| c[1].to_string());

    let mut action_text = if description.is_empty() {
        "documented a work order request at the site".to_string()
    } else {
        let d = match description.chars().next() {
            Some(c) => c.to_lowercase().collect::<String>() + &description[c.len_utf8()..],
            None => description.clone(),
        };
        format!("documented a work order indicating that {}", d)
    };
    if let Some(v) = vendor {
        action_text.push_str(&format!(", and notified {} for service", v));
    }
    if placed {
        action_text.push_str(&format!(
            ". {}",
            colored(Color::Green, "Work order placed on Building Engines.")
        ));
    } else {
        action_text.push_str(&format!(
            ". {}",
            colored(Color::Red, "Pending submission to Building Engines.")
        ));
    }
    if !location.is_empty() && !LOCATION_TAG_RX.is_match(&action_text) {
        action_text.push_str(&format!(
            " – {}",
            colored(Color::Red, &format!("({})", labeled("Location", &location)))
        ));
    }

    b.action = Some(action_text.trim().to_string());
    b.company = None;
    b.location = None;
    non_empty(build_event_line(&b))
}

fn property_damage_entry(buffer: &EventBuffer) -> Option<String> {
    let mut b = buffer.clone();
    let action = b.action.clone().unwrap_or_default().trim().to_string();
    let location = b.location.clone().unwrap_or_default().trim().to_string();
    let company = b.company.clone().unwrap_or_default().trim().to_string();
    let lower = action.to_lowercase();
    let place = if location.is_empty() { "the site" } else { &location };

    b.action = Some(if contains_any(&lower, &["hit", "struck", "collided", "impact", "crash", "bump"]) {
        let involved = if company.is_empty() { "a vehicle" } else { &company };
        format!(
            "reported property damage at {} after impact involving {}, noting {}",
            place, involved, action
        )
    } else if contains_any(&lower, &["broken", "cracked", "shattered", "smashed", "glass", "window"]) {
        format!(
            "reported property damage involving glass or structural breakage at {}, with details indicating {}",
            place, action
        )
    } else if contains_any(&lower, &["bent", "dented", "warped", "lock", "frame", "gate", "door"]) {
        format!(
            "reported property damage at {}, describing physical issues such as {}",
            place, action
        )
    } else if contains_any(&lower, &["burn", "scorch", "fire", "heat"]) {
        format!(
            "reported property damage related to fire or heat exposure at {}, with details noting {}",
            place, action
        )
    } else if contains_any(&lower, &["leak", "flood", "water", "spill"]) {
        format!(
            "reported property damage associated with water intrusion at {}, with details noting {}",
            place, action
        )
    } else {
        format!("reported property damage at {}, with details noting {}", place, action)
    });

    non_empty(build_event_line(&b))
}

/// Article and plural handling for key/badge identifiers.
fn smart_item_phrase(item: &str) -> String {
    let item = item.trim();
    if item.is_empty() {
        return String::new();
    }
    let txt = item.to_lowercase();
    if txt.ends_with('s') && !HAS_DIGIT_RX.is_match(&txt) {
        return item.to_string();
    }
    if HAS_DIGIT_RX.is_match(&txt) {
        return format!("the {}", item);
    }
    format!("a {}", item)
}

fn item_list_phrase(action: &str) -> String {
    let mut items: Vec<String> = Vec::new();
    for caps in ITEM_RX.captures_iter(action) {
        let item = caps[1].to_lowercase();
        if !items.contains(&item) {
            items.push(item);
        }
    }
    if items.contains(&"key".to_string()) && items.contains(&"badge".to_string()) {
        return "a key and a badge".to_string();
    }
    if items.iter().any(|i| i.ends_with('s')) {
        return items.join(" and ");
    }
    let joined = items
        .iter()
        .map(|i| smart_item_phrase(i))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" and ");
    if joined.is_empty() {
        "a key".to_string()
    } else {
        joined
    }
}

fn key_service_entry(buffer: &EventBuffer) -> Option<String> {
    let mut b = buffer.clone();
    let raw_action = clean_shift_noise(b.action.as_deref().unwrap_or(""));
    let mut company = b.company.clone().unwrap_or_default().trim().to_string();
    let location = b.location.clone().unwrap_or_default();

    // Company defaults by storefront location.
    if company.is_empty() {
        let loc_lower = location.to_lowercase();
        if loc_lower.contains("pine") || loc_lower.contains("3rd") {
            company = "Victrola Coffee".to_string();
        } else if loc_lower.contains("4th") || loc_lower.contains("uniqlo") {
            company = "UNIQLO".to_string();
        }
    }

    if raw_action.trim().is_empty() {
        debug!("skipping key service entry with no action");
        return None;
    }

    let mut action = to_past_tense(raw_action.trim());
    if !company.is_empty() {
        let first_word = company.split_whitespace().next().unwrap_or("");
        let pattern = format!(
            r"(?i)(\bthe\s+)?\b({}|{})\b(\s+the\b)?(\s+doors?\b)?",
            regex::escape(&company),
            regex::escape(first_word)
        );
        if let Ok(rx) = Regex::new(&pattern) {
            action = rx.replace_all(&action, "").to_string();
        }
    }
    action = THE_THE_RX.replace_all(&action, "the").to_string();
    action = DOORS_DOORS_RX.replace_all(&action, "doors").to_string();
    action = TRAILING_THE_RX.replace_all(&action, "").to_string();
    action = MULTISPACE_RX.replace_all(&action, " ").trim().to_string();

    let first_word = action.split_whitespace().next().map(str::to_string);
    if let Some(first) = first_word {
        let mut chars = first.chars();
        let leading_title = matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
            && chars.all(|c| c.is_ascii_lowercase());
        if leading_title && LOWERED_VERBS.contains(&first.to_lowercase().as_str()) {
            action = first.to_lowercase() + &action[first.len()..];
        }
    }

    let lower = action.to_lowercase();
    let new_action = if lower.contains("unlock")
        || lower.contains("gave access")
        || lower.contains("give access")
    {
        let (recipient, requester) = match GAVE_ACCESS_RX.captures(&action) {
            Some(caps) => (
                caps[1].trim().to_string(),
                caps.get(2).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
            ),
            None => (String::new(), String::new()),
        };
        let company_or_area = if company.is_empty() { "designated area" } else { &company };
        if lower.contains("delivery") {
            format!(
                "conducted key service and unlocked the {} doors, granting access to delivery personnel for scheduled drop-off",
                company
            )
        } else if !recipient.is_empty() && !requester.is_empty() {
            format!(
                "conducted key service and granted access to {} for {} through the {} doors",
                recipient, requester, company_or_area
            )
        } else if !recipient.is_empty() {
            format!(
                "conducted key service and granted access to {} through the {} doors",
                recipient, company_or_area
            )
        } else if lower.contains("request") {
            let item = ["pastry", "supplies", "equipment", "package", "shipment", "delivery"]
                .iter()
                .find(|w| lower.contains(*w))
                .map(|w| format!(" {}", w))
                .unwrap_or_default();
            let requester_co = if company.is_empty() { "delivery personnel" } else { &company };
            format!(
                "conducted key service in response to a request from {} and unlocked the {} doors, granting secure access for the scheduled{} delivery",
                requester_co, company, item
            )
        } else if lower.contains("customer") {
            format!(
                "conducted key service and unlocked the {} doors, providing access to customers during business hours",
                company
            )
        } else if lower.contains("event") || lower.contains("contractor") {
            format!(
                "conducted key service and unlocked the {} doors, facilitating access for event staff or contractors",
                company_or_area
            )
        } else {
            format!(
                "conducted key service and unlocked the {} doors, ensuring authorized access for scheduled activity",
                company
            )
        }
    } else if contains_any(&lower, &["lock", "secure", "close", "closed", "closing"]) {
        if contains_any(&lower, &["close", "closed", "closing", "end of shift", "finished work"]) {
            format!(
                "conducted key service and {} the {} doors, securing the premises at the end of operations",
                action, company
            )
        } else if lower.contains("after") || lower.contains("finished") {
            format!(
                "conducted key service and {} the {} doors, securing the area after completion of scheduled work",
                action, company
            )
        } else {
            format!(
                "conducted key service and {} the {} doors, ensuring proper security of the location",
                action, company
            )
        }
    } else if ISSUE_VERB_RX.is_match(&action) {
        let items = item_list_phrase(&action);
        let recipient = FOR_RECIPIENT_RX
            .captures(&action)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default();
        let authorized = AUTHORIZED_RX
            .captures(&action)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default();
        let at_location = TRAILING_LOC_RX
            .captures(&action)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default();
        let mut parts = vec![format!("conducted key service and provided {}", items)];
        if !recipient.is_empty() {
            parts.push(format!("to {}", recipient));
        }
        if !authorized.is_empty() {
            parts.push(format!("(authorized by {})", authorized));
        }
        if !at_location.is_empty() {
            parts.push(format!("at {}", at_location));
        }
        parts.push("ensuring controlled access.".to_string());
        parts.join(" ")
    } else if RETURN_VERB_RX.is_match(&action) {
        let items = item_list_phrase(&action);
        let recipient = FROM_RECIPIENT_RX
            .captures(&action)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default();
        let authorized = AUTHORIZED_RX
            .captures(&action)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default();
        let at_location = TRAILING_LOC_RX
            .captures(&action)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default();
        let mut parts = vec![format!("conducted key service and processed the return of {}", items)];
        if !recipient.is_empty() {
            parts.push(format!("from {}", recipient));
        }
        if !authorized.is_empty() {
            parts.push(format!("(authorized by {})", authorized));
        }
        if !at_location.is_empty() {
            parts.push(format!("at {}", at_location));
        }
        parts.push("confirming full accountability and reinventory.".to_string());
        parts.join(" ")
    } else {
        let mut cleaned = action.trim().trim_end_matches('.').to_string();
        cleaned = TRAILING_THE_RX.replace_all(&cleaned, "").trim().to_string();
        let leading = cleaned.chars().next().filter(|c| c.is_ascii_uppercase());
        if let Some(c) = leading {
            cleaned = c.to_lowercase().collect::<String>() + &cleaned[c.len_utf8()..];
        }
        let cleaned_lower = cleaned.to_lowercase();
        if contains_any(
            &cleaned_lower,
            &["grant", "escort", "coordinate", "assist", "verify", "monitor", "support", "supervise", "respond"],
        ) {
            let tail = if contains_any(&cleaned_lower, &["ensure", "authorized", "access"]) {
                ""
            } else {
                " Ensured proper coordination and authorized access"
            };
            format!("conducted key service and {}.{}", to_past_tense(&cleaned), tail)
                .trim()
                .to_string()
        } else if contains_any(
            &cleaned_lower,
            &["access", "entry", "visit", "contractor", "vendor", "staff"],
        ) {
            let tail = if contains_any(&cleaned_lower, &["verify", "authorization", "security"]) {
                ""
            } else {
                " Verified authorization and maintained secure access control"
            };
            format!("conducted key service and {}.{}", to_past_tense(&cleaned), tail)
                .trim()
                .to_string()
        } else {
            format!(
                "conducted key service and {}. Ensured safety and authorized access during operation.",
                to_past_tense(&cleaned)
            )
        }
    };

    let new_action = THE_THE_RX.replace_all(&new_action, "the").to_string();
    let new_action = DOORS_DOORS_RX.replace_all(&new_action, "doors").to_string();
    b.action = Some(new_action);
    b.company = if company.is_empty() { None } else { Some(company) };

    if let Some(loc) = b.location.clone() {
        b.location = Some(labeled("Location", &format_location_name(&loc)));
    }

    let evt = build_event_line(&b);
    non_empty(clean_shift_noise(&evt))
}

fn loading_dock_entry(buffer: &EventBuffer) -> Option<String> {
    let mut b = buffer.clone();
    let action = b.action.clone().unwrap_or_default().trim().to_string();
    let company = b.company.clone().unwrap_or_default().trim().to_string();

    if !action.is_empty() {
        let action = to_past_tense(&action);
        let lower = action.to_lowercase();
        b.action = Some(if lower.contains("unlock") || lower.contains("open") {
            format!(
                "was dispatched to the loading dock in response to delivery needs and unlocked the gate for {}, granting authorized access and facilitating scheduled operations.",
                company
            )
        } else if contains_any(&lower, &["lock", "secure", "close"]) {
            format!(
                "was dispatched to the loading dock and secured the gate after {}'s delivery, maintaining site safety and compliance.",
                company
            )
        } else {
            format!("was dispatched to the loading dock and {} for {}", action, company)
        });
    }

    non_empty(build_event_line(&b))
}

fn fire_panel_entry(buffer: &EventBuffer) -> Option<String> {
    let mut b = buffer.clone();
    let action = b.action.clone().unwrap_or_default().trim().to_string();
    let company = b.company.clone().unwrap_or_default().trim().to_string();
    let lower = action.to_lowercase();
    let vendor = if company.is_empty() { "the vendor".to_string() } else { company };

    let mut hold_types: Vec<&str> = Vec::new();
    if lower.contains("full") {
        hold_types.push("full hold");
    }
    if lower.contains("supervisory") {
        hold_types.push("supervisory hold");
    }
    if lower.contains("trouble") {
        hold_types.push("trouble hold");
    }
    if hold_types.is_empty() && contains_any(&lower, &["hold", "extend", "bypass", "put"]) {
        hold_types.push("supervisory hold");
    }
    let hold_type = if lower.contains("supervisory") && lower.contains("trouble") {
        "supervisory and trouble hold".to_string()
    } else if hold_types.is_empty() {
        "system hold".to_string()
    } else {
        hold_types.join(" and ")
    };

    let hold_until = extract_hold_until(&action);
    let until_clause = match &hold_until {
        Some(t) => format!(" until {}", t),
        None => " until the scheduled time".to_string(),
    };

    b.action = Some(if lower.contains("extend") {
        format!(
            "conducted fire panel operations and extended the {}{} in coordination with {}",
            hold_type, until_clause, vendor
        )
    } else if contains_any(&lower, &["hold", "bypass", "put", "place"]) {
        format!(
            "conducted fire panel operations and put the system on {}{} in coordination with {}",
            hold_type, until_clause, vendor
        )
    } else if contains_any(
        &lower,
        &["restore", "restored", "back online", "bring online", "brought online", "online", "remove", "removed"],
    ) {
        let from = if lower.contains("full") {
            Some("full hold")
        } else if lower.contains("supervisory") && lower.contains("trouble") {
            Some("supervisory and trouble hold")
        } else if lower.contains("supervisory") {
            Some("supervisory hold")
        } else if lower.contains("trouble") {
            Some("trouble hold")
        } else {
            None
        };
        match from {
            Some(h) => format!(
                "conducted fire panel operations and restored the system from {} in coordination with {}",
                h, vendor
            ),
            None => format!(
                "conducted fire panel operations and restored the system online in coordination with {}",
                vendor
            ),
        }
    } else {
        format!(
            "conducted fire panel operations and extended the {}{} in coordination with {}",
            hold_type, until_clause, vendor
        )
    });

    non_empty(build_event_line(&b))
}

fn aes_entry(buffer: &EventBuffer) -> Option<String> {
    let mut b = buffer.clone();
    let action = match b.action.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
        Some(a) => a.to_string(),
        None => "handled AES phone call to put the fire system on test".to_string(),
    };
    let company = b.company.clone().unwrap_or_default().trim().to_string();
    let vendor = if company.is_empty() { "the vendor".to_string() } else { company };
    let operator_name = b.operator_name.clone().unwrap_or_else(|| "N/A".to_string());
    let operator_number = b.operator_number.clone().unwrap_or_else(|| "N/A".to_string());
    let lower = action.to_lowercase();

    let hold_type = if lower.contains("full") {
        "full hold"
    } else if lower.contains("supervisory") && lower.contains("trouble") {
        "supervisory and trouble hold"
    } else if lower.contains("supervisory") {
        "supervisory hold"
    } else if lower.contains("trouble") {
        "trouble hold"
    } else if contains_any(&lower, &["hold", "extend", "test"]) {
        "supervisory hold"
    } else {
        "system hold"
    };

    let until_clause = match extract_hold_until(&action) {
        Some(t) => format!(" until {}", t),
        None => String::new(),
    };
    let operator_span = colored(
        Color::Green,
        &format!(
            "(Operator Name: {}, Operator Number: {})",
            bold(operator_name.trim()),
            bold(operator_number.trim())
        ),
    );

    b.action = Some(if lower.contains("extend") {
        format!(
            "called the AES Alarm Monitoring and extended the {}{} in coordination with {} {}",
            hold_type, until_clause, vendor, operator_span
        )
    } else if contains_any(&lower, &["hold", "bypass", "test"]) {
        format!(
            "called the AES Alarm Monitoring and placed the system on {}{} in coordination with {} {}",
            hold_type, until_clause, vendor, operator_span
        )
    } else {
        let plain_span = colored(
            Color::Green,
            &format!(
                "(Operator Name: {}, Operator Number: {})",
                operator_name.trim(),
                operator_number.trim()
            ),
        );
        format!(
            "called the AES Alarm Monitoring and placed the system on {}{} in coordination with {} {}",
            hold_type, until_clause, vendor, plain_span
        )
    });

    non_empty(build_event_line(&b))
}

fn janitorial_entry(buffer: &EventBuffer) -> Option<String> {
    let mut b = buffer.clone();
    let action = b.action.clone().unwrap_or_default();
    let company = match b.company.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => c.to_string(),
        None => "ABM Janitorial".to_string(),
    };
    let lower = action.to_lowercase();

    b.action = Some(if contains_any(&lower, &["spill", "liquid", "water leak", "slip", "hazard"]) {
        format!(
            "coordinated janitorial response and notified {} to clean a reported spill/hazard to ensure safety and prevent accidents",
            company
        )
    } else if contains_any(&lower, &["trash", "garbage", "overflow", "waste", "dumpster"]) {
        format!(
            "reported janitorial concern of trash overflow and dispatched {} to clear the waste and maintain cleanliness",
            company
        )
    } else if contains_any(
        &lower,
        &["restroom", "toilet", "bathroom", "urinal", "supply", "paper towel", "soap"],
    ) {
        format!(
            "notified {} regarding restroom cleaning and supply replenishment to maintain sanitary conditions",
            company
        )
    } else if contains_any(&lower, &["vacuum", "sweep", "mop", "sanitize", "disinfect"]) {
        format!(
            "assigned {} to perform floor care and sanitization tasks, including vacuuming, mopping, or sweeping as required",
            company
        )
    } else if contains_any(&lower, &["odor", "smell", "stain", "debris", "dirty", "cleaning required"]) {
        format!(
            "requested {} to address reported odor, stains, or debris to restore a clean and professional environment",
            company
        )
    } else {
        format!(
            "coordinated janitorial services through {} to address reported cleaning needs on site",
            company
        )
    });

    if let Some(loc) = b.location.clone() {
        b.location = Some(format_location_name(&loc));
    }
    non_empty(build_event_line(&b))
}

/// SPD response entries keep the pre-built narrative and append the incident
/// metadata spans instead of rewriting the action.
fn spd_entry(buffer: &EventBuffer) -> Option<String> {
    let evt = build_event_line(buffer);
    if evt.is_empty() {
        return None;
    }
    let evt = TRAILING_PAREN_RX.replace(&evt, "").trim().to_string();

    let mut info: Vec<String> = Vec::new();
    if let Some(idate) = buffer.incident_date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        let mut span = format!("Incident Date: {}", bold(idate));
        if let Some(itime) = buffer.incident_time.as_deref().map(str::trim).filter(|t| !t.is_empty())
        {
            span.push_str(&format!(" at {}", bold(itime)));
        }
        info.push(colored(Color::Red, &span));
    }
    if let Some(loc) = buffer.location.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        info.push(red("Location", loc));
    }
    if let Some(caller) = buffer.who_called.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        info.push(labeled("Who Called", caller));
    }
    if let Some(parties) =
        buffer.parties_involved.as_deref().map(str::trim).filter(|p| !p.is_empty())
    {
        info.push(labeled("Parties Involved", parties));
    }

    if info.is_empty() {
        Some(evt)
    } else {
        Some(format!("{} ({})", evt, info.join(", ")))
    }
}

// ---------------------------------------------------------------------------
// Additional Information document scan
// ---------------------------------------------------------------------------

static MISC_HEADER_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bOther\s*/?\s*Miscellaneous\b").unwrap());
static MISC_END_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)END\s*OF\s*REPORT|DAILY\s*ACTIVITY|^Page\s+\d+").unwrap());
static MISC_LOOSE_TS_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{2,4}\s+\d{1,2}:\d{2}").unwrap());
static MISC_START_LINE_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Start\s*(?:Date|Time)\s*:").unwrap());
static UP_SKIP_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(geolocation|comment|start\s*date|end\s*date|report|multi-line|tour|actually|needed)")
        .unwrap()
});
static UP_NAME_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([A-Z][A-Za-z]+)\s+([A-Z][A-Za-z]+)(?:\s*\((?:Officers?|Site\s*Supervisors?)\))?$")
        .unwrap()
});
static DOWN_SKIP_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:NEW\s+ACTIVITY|COMMENTS?)").unwrap());
static DOWN_NAME_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][A-Za-z]+)\s+([A-Z][A-Za-z]+)(?:\s*\(Officers?\))?$").unwrap()
});
static BLOCK_END_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(End\s*of\s*Report|Daily\s*Activity|Summary\s*of|Work\s*Orders|Patrol\s*Check|Log\s*Summary)")
        .unwrap()
});
static BLOCK_START_TS_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^Start\s*(?:Date|Time)\s*:\s*\d{1,2}/\d{1,2}/\d{2,4}\s+\d{1,2}:\d{2}").unwrap()
});
static NEW_ACTIVITY_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*NEW\s+ACTIVITY\b").unwrap());
static MISC_HEADER_LINE_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*Other\s*/?\s*Miscellaneous\b").unwrap());
static COMMENTS_WORD_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)comments?").unwrap());
static MISC_START_CAPTURE_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Start\s*(?:Date|Time)\s*:\s*([0-9/]+\s+\d{1,2}:\d{2}\s*(?:AM|PM)?)").unwrap()
});
static ANY_TS_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9/]+\s+\d{1,2}:\d{2}\s*(?:AM|PM)?)").unwrap());
static MLF_MARK_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Multi-line\s*text\s*field\s*:").unwrap());
static MLF_LABEL_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^-?\s*Multi-line\s*text\s*field\s*:\s*").unwrap());
static COMMENT_STOP_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(NEW\s+ACTIVITY|TOUR\s|Other\s*/?\s*Miscellaneous)\b").unwrap()
});
static COMMENT_SKIP_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)REPORT\s*-\s*LOGBOOK|Generated\s+on|^Page\s+\d+|^\d{1,2}/\d{1,2}/\d{4}\s+\d{1,2}:\d{2}")
        .unwrap()
});
static ANY_CLOSE_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[Cc]lose\b").unwrap());
static PAREN_NOISE_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\(.*?\)").unwrap());

fn misc_officer(lines: &[String], i: usize) -> String {
    for j in (i.saturating_sub(7)..i).rev() {
        let t = lines[j].trim();
        if t.is_empty() || UP_SKIP_RX.is_match(t) {
            continue;
        }
        if let Some(caps) = UP_NAME_RX.captures(t) {
            let first_part = &caps[1];
            let second_part = &caps[2];
            let second_titled = second_part.chars().next().is_some_and(|c| c.is_uppercase())
                && second_part.chars().skip(1).all(|c| c.is_lowercase());
            let second_upper = second_part.chars().all(|c| c.is_uppercase());
            if first_part.chars().all(|c| c.is_uppercase()) && (second_titled || second_upper) {
                return format!("{} {}", capitalize(second_part), capitalize(first_part));
            }
            return format!("{} {}", capitalize(first_part), capitalize(second_part));
        }
    }
    for j in i + 1..(i + 10).min(lines.len()) {
        let t = lines[j].trim();
        if t.is_empty() || DOWN_SKIP_RX.is_match(t) {
            continue;
        }
        if let Some(caps) = DOWN_NAME_RX.captures(t) {
            return format!("{} {}", capitalize(&caps[1]), capitalize(&caps[2]));
        }
    }
    String::new()
}

/// One pass over the whole document collecting Other/Miscellaneous blocks
/// into Additional Information entries. Runs after the main pipeline, only
/// when at least one event classified as miscellaneous.
pub fn scan_additional_information(lines: &[String], report: &mut ParsedReport) {
    let n = lines.len();
    let mut i = 0usize;
    while i < n {
        let ln = lines[i].trim();
        let header_hit = MISC_HEADER_RX.is_match(ln);
        let trailing_hit = !report.entries(Section::AdditionalInformation).is_empty()
            && !MISC_END_RX.is_match(ln)
            && (MISC_LOOSE_TS_RX.is_match(ln) || MISC_START_LINE_RX.is_match(ln));
        if !(header_hit || trailing_hit) {
            i += 1;
            continue;
        }
        if FOOTER_NOISE_RX.is_match(ln) {
            i += 1;
            continue;
        }

        let officer = misc_officer(lines, i);

        // Gather the block until the next entry boundary.
        let mut block_lines: Vec<String> = Vec::new();
        let mut next_idx = n;
        for k in i..n {
            let line_k = lines[k].trim();
            if BLOCK_END_RX.is_match(line_k) {
                next_idx = k;
                break;
            }
            if FOOTER_NOISE_RX.is_match(line_k) {
                continue;
            }
            if k > i {
                if BLOCK_START_TS_RX.is_match(line_k)
                    || MISC_LOOSE_TS_RX.is_match(line_k)
                    || NEW_ACTIVITY_RX.is_match(line_k)
                    || (MISC_HEADER_LINE_RX.is_match(line_k) && k - i > 3)
                {
                    next_idx = k;
                    break;
                }
            }
            block_lines.push(line_k.to_string());
        }

        // Start date: the line right before "Comments" wins, then anywhere in
        // the block, then the nearest timestamp above.
        let mut start_date = String::new();
        for (idx, line) in block_lines.iter().enumerate() {
            if COMMENTS_WORD_RX.is_match(line) && idx > 0 {
                if let Some(caps) = MISC_START_CAPTURE_RX.captures(&block_lines[idx - 1]) {
                    start_date = caps[1].trim().to_string();
                    break;
                }
            }
        }
        if start_date.is_empty() {
            let joined = block_lines.join("\n");
            if let Some(caps) = MISC_START_CAPTURE_RX.captures(&joined) {
                start_date = caps[1].trim().to_string();
            }
        }
        if start_date.is_empty() {
            for j in (i.saturating_sub(5)..i).rev() {
                if let Some(caps) = ANY_TS_RX.captures(&lines[j]) {
                    start_date = caps[1].trim().to_string();
                    break;
                }
            }
        }

        // Multi-line comment body.
        let mut comment_lines: Vec<String> = Vec::new();
        if let Some(start) = block_lines.iter().position(|l| MLF_MARK_RX.is_match(l)) {
            for line_k in &block_lines[start..] {
                if COMMENT_STOP_RX.is_match(line_k) {
                    break;
                }
                if COMMENT_SKIP_RX.is_match(line_k) {
                    continue;
                }
                let stripped = MLF_LABEL_RX.replace(line_k, "").trim().to_string();
                if !stripped.is_empty() {
                    comment_lines.push(stripped);
                }
            }
        }
        let comment = comment_lines.join(" ");
        let comment = ANY_CLOSE_RX.replace_all(&comment, "").trim().trim_end_matches('.').to_string();
        let comment = PAREN_NOISE_RX.replace_all(&comment, "").trim().to_string();
        let mut comment = MULTISPACE_RX.replace_all(&comment, " ").trim().to_string();
        if !comment.is_empty() && !comment.ends_with('.') {
            comment.push('.');
        }
        if comment.is_empty() {
            i = next_idx.max(i + 1);
            continue;
        }

        let location = locate::infer_location_from_comment(&comment.to_lowercase())
            .unwrap_or_else(|| "N/A".to_string());

        let date_fmt = fmt_short_date(&start_date);
        if date_fmt.is_empty() {
            i += 1;
            continue;
        }

        let evt = format!(
            "{} – {} has reported {} ({})",
            date_fmt,
            bold_officer(&officer),
            comment,
            colored(Color::Red, &labeled("Location", &location))
        );
        debug!("additional information entry at line {}", i);
        report.push_unique(Section::AdditionalInformation, evt);

        i = if next_idx > i { next_idx } else { i + 1 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FlushedEvent;

    fn event(buffer: EventBuffer) -> FlushedEvent {
        FlushedEvent { buffer, labels: Vec::new(), transient_tag_seen: false }
    }

    #[test]
    fn test_build_event_line_frame() {
        let mut b = EventBuffer::default();
        b.date = Some("9/18/2025 8:18 AM".to_string());
        b.officer = Some("Getachew Tegegne".to_string());
        b.action = Some("secure the gate".to_string());
        b.company = Some("FedEx".to_string());
        b.location = Some("Dock".to_string());
        assert_eq!(
            build_event_line(&b),
            "09/18/25 8:18 AM – <b>Officer Getachew Tegegne</b> – secured the gate for FedEx – (Dock)"
        );
    }

    #[test]
    fn test_build_event_line_drops_duplicate_company() {
        let mut b = EventBuffer::default();
        b.date = Some("9/18/2025 8:18 AM".to_string());
        b.action = Some("unlocked the UNIQLO doors".to_string());
        b.company = Some("UNIQLO".to_string());
        let evt = build_event_line(&b);
        assert!(!evt.contains("for UNIQLO"));
    }

    #[test]
    fn test_key_service_delivery_unlock() {
        let mut b = EventBuffer::default();
        b.date = Some("9/18/2025 8:18 AM".to_string());
        b.officer = Some("Getachew Tegegne".to_string());
        b.category = Some("Key Service".to_string());
        b.action = Some("unlock the doors for delivery".to_string());
        b.company = Some("Victrola Coffee".to_string());
        let evt = synthesize(&event(b), Section::KeyService).unwrap();
        // clean_shift_noise runs over the whole line, so the separators
        // come out as plain hyphens for this section.
        assert!(evt.starts_with("09/18/25 8:18 AM - <b>Officer Getachew Tegegne</b>"));
        assert!(evt.contains(
            "conducted key service and unlocked the Victrola Coffee doors, granting access to delivery personnel"
        ));
    }

    #[test]
    fn test_key_service_empty_action_skipped() {
        let mut b = EventBuffer::default();
        b.date = Some("9/18/2025 8:18 AM".to_string());
        b.category = Some("Key Service".to_string());
        assert!(synthesize(&event(b), Section::KeyService).is_none());
    }

    #[test]
    fn test_fire_panel_hold() {
        let mut b = EventBuffer::default();
        b.date = Some("9/18/2025 11:50 PM".to_string());
        b.category = Some("Fire Panel Bypass/Online".to_string());
        b.action = Some("put the panel on supervisory hold until 2:00 AM".to_string());
        let evt = synthesize(&event(b), Section::FirePanel).unwrap();
        assert!(evt.contains("put the system on supervisory hold until 2:00AM"));
        assert!(evt.contains("in coordination with the vendor"));
    }

    #[test]
    fn test_aes_default_action() {
        let mut b = EventBuffer::default();
        b.date = Some("9/18/2025 1:00 AM".to_string());
        b.category = Some("AES Phone Call".to_string());
        b.operator_name = Some("Dana".to_string());
        b.operator_number = Some("482".to_string());
        let evt = synthesize(&event(b), Section::AesPhoneCalls).unwrap();
        assert!(evt.contains("called the AES Alarm Monitoring and placed the system on supervisory hold"));
        assert!(evt.contains("Operator Name: <b>Dana</b>"));
        assert!(evt.contains("Operator Number: <b>482</b>"));
    }

    #[test]
    fn test_incident_report_narrative() {
        let mut b = EventBuffer::default();
        b.category = Some("Incident Report".to_string());
        b.start_date = Some("9/30/2025 3:47 AM".to_string());
        b.officer = Some("Jovonne King".to_string());
        b.incident_description = Some("observed a theft at the lobby".to_string());
        b.incident_date = Some("9/30/2025".to_string());
        b.incident_time = Some("0330".to_string());
        let evt = synthesize(&event(b), Section::IncidentReports).unwrap();
        assert!(evt.starts_with("09/30/25 3:47 AM – <b>Officer Jovonne King</b>"));
        assert!(evt.contains("reported that observed a theft at the lobby."));
        assert!(evt.contains("Incident Date: <b>9/30/2025</b> at <b>3:30 AM</b>"));
        assert!(evt.contains("Location: <b>Lobby</b>"));
        assert!(evt.contains("Who Called: <b>Officer Jovonne King</b>"));
    }

    #[test]
    fn test_elevator_entrapment_narrative() {
        let mut b = EventBuffer::default();
        b.category = Some("Elevator Entrapment Incident".to_string());
        // Activity timestamps never drive the entry line for entrapments.
        b.start_date = Some("9/22/2025 4:00 AM".to_string());
        b.date = Some("9/22/2025 4:00 AM".to_string());
        b.officer = Some("Faiz Mohmand".to_string());
        b.incident_description =
            Some("a tenant got stuck in elevator 3, doors stayed closed".to_string());
        b.incident_date = Some("9/22/2025".to_string());
        b.incident_time = Some("0345".to_string());
        b.parties_involved = Some("Jane Doe".to_string());
        let evt = synthesize(&event(b), Section::ElevatorEntrapment).unwrap();
        assert!(evt.starts_with("09/22/25 3:45 AM – <b>Officer Faiz Mohmand</b>"));
        assert!(!evt.contains("4:00 AM"));
        assert!(evt.contains("reported that a tenant got stuck in elevator 3"));
        assert!(evt.contains("Incident Date: <b>9/22/2025</b> at <b>3:45 AM</b>"));
        assert!(evt.contains("Location: <b>Elevator 3</b>"));
        assert!(evt.contains("Parties Involved: <b>Jane Doe</b>"));
    }

    #[test]
    fn test_elevator_entrapment_label_scrub_and_na_location() {
        let mut b = EventBuffer::default();
        b.category = Some("Stuck in Elevator".to_string());
        b.officer = Some("Getachew Tegegne".to_string());
        b.incident_description =
            Some("Long Description of Incident : doors stayed closed between floors".to_string());
        b.incident_date = Some("9/23/2025".to_string());
        let evt = synthesize(&event(b), Section::ElevatorEntrapment).unwrap();
        assert!(evt.starts_with("9/23/2025 – <b>Officer Getachew Tegegne</b>"));
        assert!(evt.contains("reported that doors stayed closed between floors"));
        assert!(evt.contains("Incident Date: <b>9/23/2025</b>"));
        assert!(evt.contains("Location: <b>N/A</b>"));
    }

    #[test]
    fn test_work_order_placed() {
        let mut b = EventBuffer::default();
        b.category = Some("Work Order".to_string());
        b.start_date = Some("9/20/2025 10:00 AM".to_string());
        b.action = Some("documented work order".to_string());
        b.work_description = Some("broken light fixture on the 5th floor, notified ABM".to_string());
        b.placed_on_building_engines = true;
        let evt = synthesize(&event(b), Section::WorkOrders).unwrap();
        assert!(evt.starts_with("9/20/25 10:00 AM"));
        assert!(evt.contains("documented a work order indicating that broken light fixture"));
        assert!(evt.contains(", and notified ABM for service"));
        assert!(evt.contains("<font color='green'>Work order placed on Building Engines.</font>"));
        assert!(evt.contains("Location: <b>5th Floor</b>"));
    }

    #[test]
    fn test_work_order_handover_skipped() {
        let mut b = EventBuffer::default();
        b.category = Some("Work Order".to_string());
        b.date = Some("9/20/2025 6:00 AM".to_string());
        b.action = Some("new emails received during shift communicated to the next".to_string());
        assert!(synthesize(&event(b), Section::WorkOrders).is_none());
    }

    #[test]
    fn test_loading_dock_unlock() {
        let mut b = EventBuffer::default();
        b.date = Some("9/18/2025 9:00 AM".to_string());
        b.category = Some("Loading Dock Gate".to_string());
        b.action = Some("unlock the gate".to_string());
        b.company = Some("FedEx".to_string());
        let evt = synthesize(&event(b), Section::LoadingDock).unwrap();
        assert!(evt.contains("was dispatched to the loading dock in response to delivery needs"));
        assert!(evt.contains("unlocked the gate for FedEx"));
    }

    #[test]
    fn test_janitorial_spill() {
        let mut b = EventBuffer::default();
        b.date = Some("9/18/2025 4:00 PM".to_string());
        b.category = Some("Janitorial".to_string());
        b.action = Some("notified ABM about a spill near the lobby".to_string());
        let evt = synthesize(&event(b), Section::Janitorial).unwrap();
        assert!(evt.contains("coordinated janitorial response and notified ABM Janitorial"));
    }

    #[test]
    fn test_property_damage_impact() {
        let mut b = EventBuffer::default();
        b.date = Some("9/18/2025 2:00 PM".to_string());
        b.category = Some("Tenant".to_string());
        b.action = Some("truck hit the dock gate".to_string());
        b.location = Some("Loading Dock".to_string());
        let evt = synthesize(&event(b), Section::PropertyDamage).unwrap();
        assert!(evt.contains("reported property damage at Loading Dock after impact involving a vehicle"));
    }

    #[test]
    fn test_ambassador_action_preserved() {
        let mut b = EventBuffer::default();
        b.date = Some("09/29/25 4:25 PM".to_string());
        b.category = Some("Seattle Ambassadors".to_string());
        b.action = Some(
            "placed a phone call to MID to dispatch the Seattle Ambassadors on site to clean human waste, bodily fluids, and messy trash on the exterior."
                .to_string(),
        );
        let evt = synthesize(&event(b), Section::Janitorial).unwrap();
        assert!(evt.contains("placed a phone call to MID"));
        assert!(!evt.contains("coordinated janitorial"));
    }

    #[test]
    fn test_spd_entry_metadata() {
        let mut b = EventBuffer::default();
        b.date = Some("10/02/25 4:17 AM".to_string());
        b.category = Some("SPD Presence/Emergency Response on Site".to_string());
        b.officer = Some("Jovonne King".to_string());
        b.action = Some("reported that a subject collapsed near the entrance.".to_string());
        b.incident_date = Some("10/2/2025".to_string());
        b.incident_time = Some("4:17 AM".to_string());
        b.location = Some("Lobby".to_string());
        b.who_called = Some("King Jovonne".to_string());
        let evt = synthesize(&event(b), Section::SpdPresence).unwrap();
        assert!(evt.contains("Incident Date: <b>10/2/2025</b> at <b>4:17 AM</b>"));
        assert!(evt.contains("Who Called: <b>King Jovonne</b>"));
        assert!(!evt.ends_with("– (Lobby)"));
    }

    #[test]
    fn test_scan_additional_information() {
        let lines: Vec<String> = [
            "Start Date : 9/30/2025 2:15 AM",
            "GETACHEW Tegegne (Officers)",
            "Other/Miscellaneous",
            "Comments",
            "- Multi-line text field : escorted the visitor to the loading dock.",
            "NEW ACTIVITY",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let mut report = ParsedReport::new();
        scan_additional_information(&lines, &mut report);
        let entries = report.entries(Section::AdditionalInformation);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].starts_with("09/30/25 2:15 AM – <b>Officer Tegegne Getachew</b> has reported"));
        assert!(entries[0].contains("Location: <b>Loading Dock</b>"));
    }
}
