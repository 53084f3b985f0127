//! Annotation records and the highlight color palette.
//!
//! An [`Annotation`] is one persisted or in-progress highlight: a stable id, a
//! [`RangeAnchor`] target, and an ordered body. At most one body entry carries
//! `purpose == "highlighting"`; its value selects a display color from the fixed palette by
//! tag. Entries with other purposes (free-text comments, tags) pass through the engine
//! opaquely.

use crate::anchor::RangeAnchor;
use serde::{Deserialize, Serialize};

/// Body entry type used for textual payloads (W3C Web Annotation `TextualBody`).
pub const TEXTUAL_BODY: &str = "TextualBody";

/// Body purpose that selects the highlight color.
pub const PURPOSE_HIGHLIGHTING: &str = "highlighting";

/// The fixed highlight color palette.
///
/// Tags are stable identifiers stored in annotation bodies; hex values are the rendered
/// colors. The first palette entry is the creation-time default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HighlightColor {
    /// `highlight-1` (#FF6D6D)
    Coral,
    /// `highlight-2` (#2196F3)
    Blue,
    /// `highlight-3` (#1DB954)
    Green,
    /// `highlight-4` (#5E35B1)
    Purple,
    /// `highlight-5` (#FF9800)
    Orange,
}

impl HighlightColor {
    /// All palette entries, in palette order.
    pub const ALL: [HighlightColor; 5] = [
        HighlightColor::Coral,
        HighlightColor::Blue,
        HighlightColor::Green,
        HighlightColor::Purple,
        HighlightColor::Orange,
    ];

    /// The default color applied when a body has no highlighting entry.
    pub const DEFAULT: HighlightColor = HighlightColor::Coral;

    /// The stable tag stored in annotation bodies.
    pub const fn tag(self) -> &'static str {
        match self {
            HighlightColor::Coral => "highlight-1",
            HighlightColor::Blue => "highlight-2",
            HighlightColor::Green => "highlight-3",
            HighlightColor::Purple => "highlight-4",
            HighlightColor::Orange => "highlight-5",
        }
    }

    /// The rendered CSS color value.
    pub const fn css_color(self) -> &'static str {
        match self {
            HighlightColor::Coral => "#FF6D6D",
            HighlightColor::Blue => "#2196F3",
            HighlightColor::Green => "#1DB954",
            HighlightColor::Purple => "#5E35B1",
            HighlightColor::Orange => "#FF9800",
        }
    }

    /// Look up a palette entry by tag.
    pub fn from_tag(tag: &str) -> Option<HighlightColor> {
        HighlightColor::ALL.into_iter().find(|c| c.tag() == tag)
    }
}

impl Default for HighlightColor {
    fn default() -> Self {
        HighlightColor::DEFAULT
    }
}

/// One `{type, purpose, value}` body entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyEntry {
    /// Entry type (usually [`TEXTUAL_BODY`]).
    #[serde(rename = "type")]
    pub kind: String,
    /// What the entry is for (`"highlighting"`, `"commenting"`, ...).
    pub purpose: String,
    /// The entry payload (a color tag for highlighting entries).
    pub value: String,
}

impl BodyEntry {
    /// Create a textual body entry with an arbitrary purpose.
    pub fn textual(purpose: &str, value: &str) -> Self {
        Self {
            kind: TEXTUAL_BODY.to_string(),
            purpose: purpose.to_string(),
            value: value.to_string(),
        }
    }

    /// Create the highlighting entry for a palette color.
    pub fn highlighting(color: HighlightColor) -> Self {
        Self::textual(PURPOSE_HIGHLIGHTING, color.tag())
    }

    /// Returns `true` if this entry selects the highlight color.
    pub fn is_highlighting(&self) -> bool {
        self.purpose == PURPOSE_HIGHLIGHTING
    }
}

/// One persisted or in-progress highlight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Stable string identifier; client-generated ids carry a leading `#` until a caller
    /// overrides them.
    pub id: String,
    /// The anchored text location.
    pub target: RangeAnchor,
    /// Ordered body entries.
    #[serde(default)]
    pub body: Vec<BodyEntry>,
    /// `true` only for a transient, not-yet-persisted selection.
    #[serde(rename = "isSelection", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_selection: bool,
    /// Per-annotation override of the global read-only flag.
    #[serde(rename = "readOnly", default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
}

impl Annotation {
    /// Create a persisted annotation with an empty body.
    pub fn new(id: &str, target: RangeAnchor) -> Self {
        Self {
            id: id.to_string(),
            target,
            body: Vec::new(),
            is_selection: false,
            read_only: false,
        }
    }

    /// Create a transient selection (not yet persisted).
    pub fn selection(id: &str, target: RangeAnchor) -> Self {
        Self {
            is_selection: true,
            ..Self::new(id, target)
        }
    }

    /// Replace the body (builder-style).
    pub fn with_body(mut self, body: Vec<BodyEntry>) -> Self {
        self.body = body;
        self
    }

    /// Mark the annotation read-only (builder-style).
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// The color tag from the first highlighting body entry, if present.
    pub fn highlight_tag(&self) -> Option<&str> {
        self.body
            .iter()
            .find(|b| b.is_highlighting())
            .map(|b| b.value.as_str())
    }

    /// The rendered highlight color: the tagged palette entry, or the palette default when
    /// the body has no (or an unknown) highlighting entry.
    pub fn highlight_color(&self) -> HighlightColor {
        self.highlight_tag()
            .and_then(HighlightColor::from_tag)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_tags_round_trip() {
        for color in HighlightColor::ALL {
            assert_eq!(HighlightColor::from_tag(color.tag()), Some(color));
        }
        assert_eq!(HighlightColor::from_tag("no-such-tag"), None);
    }

    #[test]
    fn test_highlight_color_resolution() {
        let anchor = RangeAnchor::new(0, 5);

        let green = Annotation::new("a1", anchor.clone())
            .with_body(vec![BodyEntry::highlighting(HighlightColor::Green)]);
        assert_eq!(green.highlight_color(), HighlightColor::Green);

        // No highlighting entry: palette default.
        let comment = Annotation::new("a2", anchor.clone())
            .with_body(vec![BodyEntry::textual("commenting", "note")]);
        assert_eq!(comment.highlight_color(), HighlightColor::DEFAULT);
        assert_eq!(comment.highlight_tag(), None);

        // Unknown tag: palette default.
        let unknown = Annotation::new("a3", anchor)
            .with_body(vec![BodyEntry::textual(PURPOSE_HIGHLIGHTING, "bogus")]);
        assert_eq!(unknown.highlight_color(), HighlightColor::DEFAULT);
    }

    #[test]
    fn test_opaque_body_entries_survive() {
        let annotation = Annotation::new("a1", RangeAnchor::new(0, 3)).with_body(vec![
            BodyEntry::highlighting(HighlightColor::Blue),
            BodyEntry::textual("commenting", "free text"),
        ]);

        let json = serde_json::to_string(&annotation).unwrap();
        let back: Annotation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, annotation);
        assert_eq!(back.body[1].value, "free text");
    }

    #[test]
    fn test_selection_flag() {
        let sel = Annotation::selection("#sel-1", RangeAnchor::new(1, 4));
        assert!(sel.is_selection);
        assert!(!Annotation::new("a1", RangeAnchor::new(1, 4)).is_selection);
    }
}
