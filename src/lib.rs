//! # DAR Report Builder
//!
//! A library for converting raw security logbook exports (ordered text lines)
//! into a normalized Daily Activity Report: fourteen fixed sections, each
//! holding chronologically ordered, professionally phrased narrative entries.
//!
//! ## Core Concepts
//!
//! - **Lines**: the trimmed text lines of the source export, in document order
//! - **Event**: one logbook activity, accumulated into an [`EventBuffer`] by
//!   the marker-driven segmenter
//! - **Section**: one of the 14 fixed report categories; classification is
//!   two-layered (explicit category label, then keyword heuristics) and may
//!   decline to place an event
//! - **Narrative entry**: a rendered line with a leading `MM/DD/YY H:MM AM`
//!   token, a bolded officer name, and inline emphasis spans for the
//!   downstream renderer
//! - **Finalization**: placeholders for empty sections, the transient-removal
//!   count collapse, and a per-section chronological sort
//!
//! ## Example
//!
//! ```rust,ignore
//! use dar_report_builder::*;
//!
//! let source = TextLines::from_file("logbook-export.txt")?;
//! let lines = source.lines()?;
//! let report = build_report(&lines);
//! let range = detect_date_range(&lines, "logbook-export.txt");
//!
//! for (section, entries) in report.iter() {
//!     println!("{}: {} entries", section, entries.len());
//! }
//! ```

pub mod classify;
pub mod error;
pub mod ingestion;
pub mod locate;
pub mod markup;
pub mod normalize;
pub mod report;
pub mod schema;
pub mod segmenter;
pub mod synthesize;
pub mod tables;

pub use classify::classify;
pub use error::{ReportError, Result};
pub use ingestion::{LineSource, TextLines};
pub use markup::{bold, colored, labeled, Color};
pub use report::{detect_date_range, finalize};
pub use schema::{
    DateRange, EventBuffer, Field, FlushedEvent, ParsedReport, Section, NONE_TO_REPORT,
};
pub use segmenter::segment;
pub use synthesize::{build_event_line, scan_additional_information, synthesize};

use log::{debug, info};

/// The full pipeline over an ordered line sequence.
pub struct ReportBuilder;

impl ReportBuilder {
    /// Segment, classify, synthesize, and finalize in one pass.
    ///
    /// Malformed input never fails the build; events that cannot be
    /// classified or yield no narrative are dropped, and an empty document
    /// produces a report of placeholders.
    pub fn build(lines: &[String]) -> ParsedReport {
        info!("building report from {} lines", lines.len());
        let mut parsed = ParsedReport::new();
        let mut transient_count = 0usize;
        let mut misc_seen = false;

        let events = segment(lines);
        debug!("segmenter produced {} events", events.len());

        for event in &events {
            let Some(section) = classify(event) else {
                debug!(
                    "dropping unclassified event (category: {:?})",
                    event.buffer.category
                );
                continue;
            };
            if section == Section::AdditionalInformation {
                misc_seen = true;
            }
            let Some(entry) = synthesize(event, section) else {
                continue;
            };
            if section == Section::TransientRemoval || event.transient_tag_seen {
                transient_count += 1;
            }
            parsed.push(section, entry);
        }

        // Miscellaneous blocks carry their narrative outside the field
        // vocabulary, so they are recovered by a second whole-document scan.
        if misc_seen {
            scan_additional_information(lines, &mut parsed);
        }

        finalize(&mut parsed, transient_count);
        parsed
    }
}

/// Build a finalized report from ordered document lines.
pub fn build_report(lines: &[String]) -> ParsedReport {
    ReportBuilder::build(lines)
}
