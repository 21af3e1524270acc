use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder entry for a section with no events.
pub const NONE_TO_REPORT: &str = "None to Report";

/// The 14 fixed report sections, in display order.
///
/// Classification may also fail to place an event; that outcome is modeled
/// as `Option<Section>::None` rather than a variant here, so a rendered
/// entry always belongs to exactly one real section.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Section {
    IncidentReports,
    ElevatorEntrapment,
    SpdPresence,
    PropertyDamage,
    TenantIssues,
    RetailIssues,
    TransientRemoval,
    KeyService,
    LoadingDock,
    FirePanel,
    AesPhoneCalls,
    WorkOrders,
    Janitorial,
    AdditionalInformation,
}

impl Section {
    pub const ALL: [Section; 14] = [
        Section::IncidentReports,
        Section::ElevatorEntrapment,
        Section::SpdPresence,
        Section::PropertyDamage,
        Section::TenantIssues,
        Section::RetailIssues,
        Section::TransientRemoval,
        Section::KeyService,
        Section::LoadingDock,
        Section::FirePanel,
        Section::AesPhoneCalls,
        Section::WorkOrders,
        Section::Janitorial,
        Section::AdditionalInformation,
    ];

    /// The section heading exactly as it appears in the rendered report.
    pub fn title(&self) -> &'static str {
        match self {
            Section::IncidentReports => "Incident Reports (IR) / Alarms",
            Section::ElevatorEntrapment => "Elevator Entrapment Incidents",
            Section::SpdPresence => "SPD Presence/Emergency Response on Site",
            Section::PropertyDamage => "Property Damage",
            Section::TenantIssues => "Tenant Issues",
            Section::RetailIssues => "Retail Issues",
            Section::TransientRemoval => "Transient Removal",
            Section::KeyService => "Key Service (Lock & Unlock)",
            Section::LoadingDock => "Loading Dock Access (Lock & Unlock)",
            Section::FirePanel => "Fire Panel Bypass/Online",
            Section::AesPhoneCalls => "AES Phone Calls",
            Section::WorkOrders => "Work Orders",
            Section::Janitorial => "Janitorial",
            Section::AdditionalInformation => "Additional Information",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Field slots of the in-flight event buffer.
///
/// The vocabulary is fixed by the source logbook format; the segmenter keeps
/// a cursor onto the most recently opened field so that wrapped continuation
/// lines can be appended to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    StartDate,
    Officer,
    Action,
    Company,
    Location,
    Category,
    IncidentDate,
    IncidentTime,
    IncidentDescription,
    IncidentComments,
    PartiesInvolved,
    WhoCalled,
    OperatorName,
    OperatorNumber,
    VehicleYear,
    VehicleMake,
    VehicleModel,
    VehicleColor,
    VehicleDescription,
    Comment,
    WorkDescription,
}

impl Field {
    /// Continuation ceiling in characters: long narrative fields absorb up
    /// to 800, everything else stops at 200. Exceeding the ceiling silently
    /// stops absorption so unrelated trailing content is not swallowed.
    pub fn continuation_ceiling(&self) -> usize {
        match self {
            Field::IncidentDescription | Field::IncidentComments | Field::WorkDescription => 800,
            _ => 200,
        }
    }
}

/// The accumulating field map for one in-progress log entry.
///
/// Exactly one buffer is open at a time during the scan; once flushed it is
/// classified, synthesized, and discarded.
#[derive(Debug, Clone, Default)]
pub struct EventBuffer {
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub officer: Option<String>,
    pub action: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub incident_date: Option<String>,
    pub incident_time: Option<String>,
    pub incident_description: Option<String>,
    pub incident_comments: Option<String>,
    pub parties_involved: Option<String>,
    pub who_called: Option<String>,
    pub operator_name: Option<String>,
    pub operator_number: Option<String>,
    pub vehicle_year: Option<String>,
    pub vehicle_make: Option<String>,
    pub vehicle_model: Option<String>,
    pub vehicle_color: Option<String>,
    pub vehicle_description: Option<String>,
    pub comment: Option<String>,
    pub work_description: Option<String>,
    pub placed_on_building_engines: bool,
}

impl EventBuffer {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Date => &mut self.date,
            Field::StartDate => &mut self.start_date,
            Field::Officer => &mut self.officer,
            Field::Action => &mut self.action,
            Field::Company => &mut self.company,
            Field::Location => &mut self.location,
            Field::Category => &mut self.category,
            Field::IncidentDate => &mut self.incident_date,
            Field::IncidentTime => &mut self.incident_time,
            Field::IncidentDescription => &mut self.incident_description,
            Field::IncidentComments => &mut self.incident_comments,
            Field::PartiesInvolved => &mut self.parties_involved,
            Field::WhoCalled => &mut self.who_called,
            Field::OperatorName => &mut self.operator_name,
            Field::OperatorNumber => &mut self.operator_number,
            Field::VehicleYear => &mut self.vehicle_year,
            Field::VehicleMake => &mut self.vehicle_make,
            Field::VehicleModel => &mut self.vehicle_model,
            Field::VehicleColor => &mut self.vehicle_color,
            Field::VehicleDescription => &mut self.vehicle_description,
            Field::Comment => &mut self.comment,
            Field::WorkDescription => &mut self.work_description,
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        let slot = match field {
            Field::Date => &self.date,
            Field::StartDate => &self.start_date,
            Field::Officer => &self.officer,
            Field::Action => &self.action,
            Field::Company => &self.company,
            Field::Location => &self.location,
            Field::Category => &self.category,
            Field::IncidentDate => &self.incident_date,
            Field::IncidentTime => &self.incident_time,
            Field::IncidentDescription => &self.incident_description,
            Field::IncidentComments => &self.incident_comments,
            Field::PartiesInvolved => &self.parties_involved,
            Field::WhoCalled => &self.who_called,
            Field::OperatorName => &self.operator_name,
            Field::OperatorNumber => &self.operator_number,
            Field::VehicleYear => &self.vehicle_year,
            Field::VehicleMake => &self.vehicle_make,
            Field::VehicleModel => &self.vehicle_model,
            Field::VehicleColor => &self.vehicle_color,
            Field::VehicleDescription => &self.vehicle_description,
            Field::Comment => &self.comment,
            Field::WorkDescription => &self.work_description,
        };
        slot.as_deref()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.slot(field) = Some(value.into());
    }

    /// Append a continuation line to an open field, separated by one space,
    /// respecting the field's absorption ceiling.
    pub fn append(&mut self, field: Field, line: &str) {
        let ceiling = field.continuation_ceiling();
        let slot = self.slot(field);
        let prev = slot.take().unwrap_or_default();
        if prev.len() < ceiling {
            *slot = Some(format!("{} {}", prev, line).trim().to_string());
        } else {
            *slot = Some(prev);
        }
    }

    pub fn category_lc(&self) -> String {
        self.category.as_deref().unwrap_or("").to_lowercase()
    }

    /// Empty-buffer rule: a buffer with no action, incident description,
    /// incident comments, and no category never yields an entry.
    pub fn is_discardable(&self) -> bool {
        self.action.is_none()
            && self.incident_description.is_none()
            && self.incident_comments.is_none()
            && self.category.is_none()
    }

    /// Joined vehicle description used by the Incident Reports narrative.
    pub fn vehicle_summary(&self) -> Option<String> {
        let mut bits: Vec<String> = Vec::new();
        if let Some(d) = self.vehicle_description.as_deref() {
            if !d.trim().is_empty() {
                bits.push(d.trim().to_string());
            }
        }
        let make_model = [
            self.vehicle_color.as_deref().unwrap_or(""),
            self.vehicle_make.as_deref().unwrap_or(""),
            self.vehicle_model.as_deref().unwrap_or(""),
        ]
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
        if !make_model.is_empty() {
            bits.push(make_model);
        }
        if bits.is_empty() {
            None
        } else {
            Some(bits.join(", "))
        }
    }
}

/// One completed event handed from the segmenter to the classifier: the
/// finished buffer plus every raw label line seen while it was open.
#[derive(Debug, Clone)]
pub struct FlushedEvent {
    pub buffer: EventBuffer,
    pub labels: Vec<String>,
    /// Set when an explicit "Transient Removal" label was seen for this
    /// event, independent of the classification outcome.
    pub transient_tag_seen: bool,
}

/// Detected date range of the whole input document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Human-readable header, e.g. `09/18/2025 6:00 AM – 09/19/2025 6:00 AM`.
    pub header: String,
    /// Filename-safe token, e.g. `09-18-2025_to_09-19-2025`.
    pub token: String,
}

impl DateRange {
    pub fn unknown() -> Self {
        DateRange {
            header: "Unknown Date Range".to_string(),
            token: "unknown".to_string(),
        }
    }
}

/// The finished report: every section, in fixed display order, mapped to its
/// chronologically ordered narrative entries (or the placeholder).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedReport {
    sections: BTreeMap<Section, Vec<String>>,
}

impl ParsedReport {
    pub fn new() -> Self {
        let mut sections = BTreeMap::new();
        for s in Section::ALL {
            sections.insert(s, Vec::new());
        }
        ParsedReport { sections }
    }

    pub fn push(&mut self, section: Section, entry: String) {
        self.sections.entry(section).or_default().push(entry);
    }

    /// Append only if the identical line is not already present.
    pub fn push_unique(&mut self, section: Section, entry: String) {
        let entries = self.sections.entry(section).or_default();
        if !entries.iter().any(|e| e == &entry) {
            entries.push(entry);
        }
    }

    pub fn entries(&self, section: Section) -> &[String] {
        self.sections
            .get(&section)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn entries_mut(&mut self, section: Section) -> &mut Vec<String> {
        self.sections.entry(section).or_default()
    }

    pub fn replace(&mut self, section: Section, entries: Vec<String>) {
        self.sections.insert(section, entries);
    }

    /// Sections in fixed display order with their entries.
    pub fn iter(&self) -> impl Iterator<Item = (Section, &[String])> {
        Section::ALL
            .into_iter()
            .map(move |s| (s, self.entries(s)))
    }

    pub fn has_events(&self, section: Section) -> bool {
        let entries = self.entries(section);
        !entries.is_empty() && entries[0] != NONE_TO_REPORT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_order_matches_display_order() {
        let titles: Vec<&str> = Section::ALL.iter().map(|s| s.title()).collect();
        assert_eq!(titles[0], "Incident Reports (IR) / Alarms");
        assert_eq!(titles[6], "Transient Removal");
        assert_eq!(titles[13], "Additional Information");
        // BTreeMap ordering must agree with the declared display order.
        let report = ParsedReport::new();
        let iterated: Vec<Section> = report.iter().map(|(s, _)| s).collect();
        assert_eq!(iterated, Section::ALL.to_vec());
    }

    #[test]
    fn test_empty_buffer_rule() {
        let mut buf = EventBuffer::default();
        buf.date = Some("9/18/2025 8:00 AM".to_string());
        buf.officer = Some("Faiz Mohmand".to_string());
        assert!(buf.is_discardable());

        buf.action = Some("unlocked the gate".to_string());
        assert!(!buf.is_discardable());
    }

    #[test]
    fn test_continuation_ceiling() {
        let mut buf = EventBuffer::default();
        buf.set(Field::Action, "x".repeat(199));
        buf.append(Field::Action, "tail");
        assert!(buf.action.as_ref().unwrap().ends_with("tail"));

        buf.set(Field::Action, "x".repeat(201));
        buf.append(Field::Action, "tail");
        assert!(!buf.action.as_ref().unwrap().ends_with("tail"));
    }

    #[test]
    fn test_vehicle_summary() {
        let mut buf = EventBuffer::default();
        buf.vehicle_color = Some("Blue".to_string());
        buf.vehicle_make = Some("Ford".to_string());
        buf.vehicle_model = Some("Transit".to_string());
        assert_eq!(buf.vehicle_summary().unwrap(), "Blue Ford Transit");

        buf.vehicle_description = Some("white cargo van".to_string());
        assert_eq!(
            buf.vehicle_summary().unwrap(),
            "white cargo van, Blue Ford Transit"
        );
    }

    #[test]
    fn test_push_unique() {
        let mut report = ParsedReport::new();
        report.push_unique(Section::AdditionalInformation, "entry".to_string());
        report.push_unique(Section::AdditionalInformation, "entry".to_string());
        assert_eq!(report.entries(Section::AdditionalInformation).len(), 1);
    }
}
