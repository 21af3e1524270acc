//! Inline emphasis markers embedded in narrative entries.
//!
//! The builder never renders anything itself; entries carry a small, fixed
//! marker vocabulary (`<b>` spans and `<font color=..>` spans) that the
//! downstream document renderer interprets. Red marks derived or critical
//! metadata (incident date, location), green marks confirmed/positive status,
//! black marks neutral supplemental metadata.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Black,
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Black => "black",
        }
    }
}

pub fn bold(text: &str) -> String {
    format!("<b>{}</b>", text)
}

pub fn colored(color: Color, text: &str) -> String {
    format!("<font color='{}'>{}</font>", color.as_str(), text)
}

/// A labeled, bold-valued metadata span, e.g. `Location: <b>Lobby</b>`.
pub fn labeled(label: &str, value: &str) -> String {
    format!("{}: {}", label, bold(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colored_span() {
        assert_eq!(
            colored(Color::Red, "Location: <b>Lobby</b>"),
            "<font color='red'>Location: <b>Lobby</b></font>"
        );
        assert_eq!(colored(Color::Green, "ok"), "<font color='green'>ok</font>");
    }

    #[test]
    fn test_labeled() {
        assert_eq!(labeled("Who Called", "Faiz Mohmand"), "Who Called: <b>Faiz Mohmand</b>");
    }
}
