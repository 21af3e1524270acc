//! Event classification.
//!
//! Two layers, first match wins. Layer one trusts the explicit category
//! label carried in the buffer; layer two falls back to keyword heuristics
//! over the concatenated label lines and the buffer's narrative fields.
//! `None` means the event could not be placed and is dropped by the caller.

use crate::schema::{EventBuffer, FlushedEvent, Section};
use crate::tables::{
    contains_any, DAMAGE_NOUNS, DAMAGE_WORDS, ELEVATOR_PHRASES, ELEVATOR_TERMS, IR_NUMBER_RX,
    IR_STRONG_WORDS, JANITORIAL_WORDS, KEY_ACTION_RX, SPD_PHRASES, TENANT_CONTEXT,
};

pub fn classify(event: &FlushedEvent) -> Option<Section> {
    if let Some(section) = classify_by_category(&event.buffer) {
        return Some(section);
    }
    classify_by_text(&event.buffer, &event.labels)
}

/// Layer one: the explicit category label wins outright.
fn classify_by_category(buffer: &EventBuffer) -> Option<Section> {
    let cat = buffer.category.as_deref()?.to_lowercase();
    let action = buffer.action.as_deref().unwrap_or("").to_lowercase();

    if cat.contains("aes phone call") {
        return Some(Section::AesPhoneCalls);
    }
    if (cat.contains("loading dock") || cat.contains("dock gate")) && !action.contains("abm") {
        return Some(Section::LoadingDock);
    }
    if cat.contains("key service") || cat.contains("key") {
        return Some(Section::KeyService);
    }
    if cat.contains("bypass online")
        || cat.contains("fire panel")
        || cat.contains("fire system online")
        || cat.contains("until")
    {
        return Some(Section::FirePanel);
    }
    if cat.contains("transient") {
        return Some(Section::TransientRemoval);
    }
    if cat.contains("work order") {
        return Some(Section::WorkOrders);
    }
    if cat.contains("retail") {
        return Some(Section::RetailIssues);
    }
    if cat.contains("incident report") || cat.contains("alarm") {
        return Some(Section::IncidentReports);
    }
    if cat.contains("janitorial") {
        return Some(Section::Janitorial);
    }
    if cat.contains("other/miscellaneous") {
        return Some(Section::AdditionalInformation);
    }
    None
}

/// Layer two: keyword heuristics over labels plus the narrative fields.
fn classify_by_text(buffer: &EventBuffer, labels: &[String]) -> Option<Section> {
    let mut parts: Vec<&str> = labels.iter().map(|l| l.as_str()).collect();
    parts.extend([
        buffer.action.as_deref().unwrap_or(""),
        buffer.company.as_deref().unwrap_or(""),
        buffer.location.as_deref().unwrap_or(""),
        buffer.category.as_deref().unwrap_or(""),
    ]);
    let txt = parts.join(" ").to_lowercase();

    // Elevator entrapment outranks everything that could shadow it.
    if contains_any(&txt, ELEVATOR_PHRASES) {
        return Some(Section::ElevatorEntrapment);
    }

    if txt.contains("tenant")
        && contains_any(&txt, TENANT_CONTEXT)
        && !contains_any(&txt, ELEVATOR_TERMS)
    {
        return Some(Section::TenantIssues);
    }

    // Property damage before the generic loading dock and IR rules.
    if contains_any(&txt, DAMAGE_WORDS) && contains_any(&txt, DAMAGE_NOUNS) {
        return Some(Section::PropertyDamage);
    }

    if (txt.contains("elevator") || txt.contains("entrapment")) && !txt.contains("tenant") {
        return Some(Section::ElevatorEntrapment);
    }

    if contains_any(&txt, SPD_PHRASES) {
        return Some(Section::SpdPresence);
    }
    if (txt.contains("spd") && txt.contains("response")) || txt.contains("emergency response on site")
    {
        return Some(Section::SpdPresence);
    }

    // Tenant fallback for messy labels that still mention elevator vendors.
    if txt.contains("tenant")
        && contains_any(&txt, TENANT_CONTEXT)
        && !txt.contains("elevator")
        && !txt.contains("entrapment")
    {
        return Some(Section::TenantIssues);
    }

    if txt.contains("aes") || txt.contains("phone call") {
        return Some(Section::AesPhoneCalls);
    }

    if (txt.contains("loading dock") || txt.contains("dock gate"))
        && !txt.contains("abm notified")
        && !txt.contains("upload picture")
    {
        return Some(Section::LoadingDock);
    }

    if txt.contains("key service") || KEY_ACTION_RX.is_match(&txt) {
        return Some(Section::KeyService);
    }

    if contains_any(&txt, crate::tables::FIRE_PANEL_WORDS) {
        return Some(Section::FirePanel);
    }

    if txt.contains("transient")
        || txt.contains("trespass")
        || (txt.contains("removed") && txt.contains("person"))
    {
        return Some(Section::TransientRemoval);
    }

    if txt.contains("work order") || txt.contains("building engines") {
        return Some(Section::WorkOrders);
    }

    // The bare noun "incident" is not enough; require a strong IR signal.
    if txt.contains("incident report")
        || IR_NUMBER_RX.is_match(&txt)
        || contains_any(&txt, IR_STRONG_WORDS)
    {
        return Some(Section::IncidentReports);
    }

    let cat = buffer.category_lc();
    if cat == "janitorial" || cat == "seattle ambassadors" || contains_any(&txt, JANITORIAL_WORDS) {
        return Some(Section::Janitorial);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(category: Option<&str>, action: Option<&str>, labels: &[&str]) -> FlushedEvent {
        let mut buffer = EventBuffer::default();
        buffer.category = category.map(str::to_string);
        buffer.action = action.map(str::to_string);
        FlushedEvent {
            buffer,
            labels: labels.iter().map(|l| l.to_string()).collect(),
            transient_tag_seen: false,
        }
    }

    #[test]
    fn test_explicit_category_wins() {
        let e = event(Some("Key Service"), Some("damaged the dock gate"), &[]);
        assert_eq!(classify(&e), Some(Section::KeyService));
    }

    #[test]
    fn test_loading_dock_label_with_abm_action_defers() {
        // A janitorial task logged under the dock label falls through to the
        // heuristics, which route ABM work to Janitorial.
        let e = event(
            Some("Loading Dock Gate"),
            Some("ABM notified to clean the spill"),
            &[],
        );
        assert_eq!(classify(&e), Some(Section::Janitorial));
    }

    #[test]
    fn test_elevator_phrase_outranks_tenant() {
        let e = event(None, Some("tenant reported being stuck in elevator"), &[]);
        assert_eq!(classify(&e), Some(Section::ElevatorEntrapment));
    }

    #[test]
    fn test_tenant_issue_heuristic() {
        let e = event(None, Some("tenant called with a noise complaint"), &[]);
        assert_eq!(classify(&e), Some(Section::TenantIssues));
    }

    #[test]
    fn test_property_damage_before_loading_dock() {
        let e = event(None, Some("found the loading dock gate bent and damaged"), &[]);
        assert_eq!(classify(&e), Some(Section::PropertyDamage));
    }

    #[test]
    fn test_spd_phrase() {
        let e = event(None, Some("911 called for a medical emergency on site"), &[]);
        assert_eq!(classify(&e), Some(Section::SpdPresence));
    }

    #[test]
    fn test_bare_incident_word_is_not_ir() {
        let e = event(None, Some("minor incident noted during patrol"), &[]);
        assert_eq!(classify(&e), None);
    }

    #[test]
    fn test_ir_number_is_ir() {
        let e = event(None, Some("filed IR # 42 for the broken window"), &[]);
        // "broken" plus "glass"-free text: damage rule needs a noun too.
        assert_eq!(classify(&e), Some(Section::IncidentReports));
    }

    #[test]
    fn test_transient_heuristic() {
        let e = event(None, Some("removed a person camping by the entrance"), &[]);
        assert_eq!(classify(&e), Some(Section::TransientRemoval));
    }

    #[test]
    fn test_label_text_feeds_heuristics() {
        let e = event(None, Some("reset and placed on hold"), &["Fire Panel Bypass/Online"]);
        assert_eq!(classify(&e), Some(Section::FirePanel));
    }

    #[test]
    fn test_unclassifiable_is_none() {
        let e = event(None, Some("walked the perimeter"), &[]);
        assert_eq!(classify(&e), None);
    }
}
