//! W3C Web Annotation wire format.
//!
//! These types mirror the Web Annotation Data Model as persistence layers exchange it:
//! `target.selector` carries a `TextPositionSelector` (character offsets) and usually a
//! `TextQuoteSelector` (exact text) for robust anchoring. Unknown selector kinds are kept
//! verbatim so round-tripping a stored annotation never loses data.
//!
//! Reference: <https://www.w3.org/TR/annotation-model/>

use annotate_core::{Annotation, BodyEntry, RangeAnchor, TEXTUAL_BODY};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The JSON-LD context for Web Annotation payloads.
pub const ANNOTATION_CONTEXT: &str = "http://www.w3.org/ns/anno.jsonld";

/// Wire conversion failures.
#[derive(Debug, Error)]
pub enum WireError {
    /// The annotation target has no `TextPositionSelector`.
    #[error("annotation '{id}' has no TextPositionSelector")]
    MissingPositionSelector {
        /// The offending annotation id.
        id: String,
    },
}

/// Selector types for identifying text ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WireSelector {
    /// Exact quoted text, with optional surrounding context.
    #[serde(rename = "TextQuoteSelector")]
    TextQuote {
        /// The exact text that was highlighted.
        exact: String,
        /// Text before the selection.
        #[serde(skip_serializing_if = "Option::is_none")]
        prefix: Option<String>,
        /// Text after the selection.
        #[serde(skip_serializing_if = "Option::is_none")]
        suffix: Option<String>,
    },
    /// Character offsets into the annotated content.
    #[serde(rename = "TextPositionSelector")]
    TextPosition {
        /// Start character offset.
        start: usize,
        /// End character offset (exclusive).
        end: usize,
    },
    /// Any other selector kind (`XPathSelector`, `FragmentSelector`, ...), kept verbatim.
    ///
    /// The engine ignores these; they survive re-serialization untouched. Must stay the
    /// last variant so the tagged variants are tried first.
    #[serde(untagged)]
    Other(serde_json::Value),
}

/// The target of an annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireTarget {
    /// Selectors identifying the annotated range; multiple selectors provide fallbacks.
    pub selector: Vec<WireSelector>,
}

/// One `{type, purpose, value}` body entry.
///
/// Malformed entries (missing fields) deserialize to empty strings instead of failing the
/// whole payload; the engine falls back to its defaults for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireBody {
    /// Entry type, usually `TextualBody`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// What the entry is for.
    #[serde(default)]
    pub purpose: String,
    /// The entry payload.
    #[serde(default)]
    pub value: String,
}

/// A complete Web Annotation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireAnnotation {
    /// The JSON-LD context.
    #[serde(rename = "@context", default = "default_context")]
    pub context: String,
    /// Record type, always `"Annotation"`.
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    /// Stable identifier.
    pub id: String,
    /// Ordered body entries.
    #[serde(default)]
    pub body: Vec<WireBody>,
    /// The annotated target.
    pub target: WireTarget,
    /// Per-annotation read-only flag.
    #[serde(rename = "readOnly", default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
}

fn default_context() -> String {
    ANNOTATION_CONTEXT.to_string()
}

fn default_kind() -> String {
    "Annotation".to_string()
}

impl WireAnnotation {
    /// Convert a wire record into an engine annotation.
    ///
    /// The target must carry a `TextPositionSelector`; the quote (when present) comes from
    /// the `TextQuoteSelector`. Body entries pass through as-is.
    pub fn to_annotation(&self) -> Result<Annotation, WireError> {
        let (start, end) = self
            .target
            .selector
            .iter()
            .find_map(|s| match s {
                WireSelector::TextPosition { start, end } => Some((*start, *end)),
                _ => None,
            })
            .ok_or_else(|| WireError::MissingPositionSelector {
                id: self.id.clone(),
            })?;

        let quote = self
            .target
            .selector
            .iter()
            .find_map(|s| match s {
                WireSelector::TextQuote { exact, .. } => Some(exact.as_str()),
                _ => None,
            })
            .unwrap_or_default();

        let mut anchor = RangeAnchor::new(start, end);
        anchor.quote = quote.to_string();

        let body = self
            .body
            .iter()
            .map(|b| BodyEntry {
                kind: if b.kind.is_empty() {
                    TEXTUAL_BODY.to_string()
                } else {
                    b.kind.clone()
                },
                purpose: b.purpose.clone(),
                value: b.value.clone(),
            })
            .collect();

        Ok(Annotation::new(&self.id, anchor)
            .with_body(body)
            .with_read_only(self.read_only))
    }

    /// Convert an engine annotation into a wire record with both selectors.
    pub fn from_annotation(annotation: &Annotation) -> Self {
        let mut selector = vec![WireSelector::TextPosition {
            start: annotation.target.start,
            end: annotation.target.end,
        }];
        if !annotation.target.quote.is_empty() {
            selector.insert(
                0,
                WireSelector::TextQuote {
                    exact: annotation.target.quote.clone(),
                    prefix: None,
                    suffix: None,
                },
            );
        }

        Self {
            context: default_context(),
            kind: default_kind(),
            id: annotation.id.clone(),
            body: annotation
                .body
                .iter()
                .map(|b| WireBody {
                    kind: b.kind.clone(),
                    purpose: b.purpose.clone(),
                    value: b.value.clone(),
                })
                .collect(),
            target: WireTarget { selector },
            read_only: annotation.read_only,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annotate_core::{HighlightColor, PURPOSE_HIGHLIGHTING};

    #[test]
    fn test_parse_stored_record() {
        let json = r#"{
            "@context": "http://www.w3.org/ns/anno.jsonld",
            "type": "Annotation",
            "id": "anno-7",
            "body": [
                {"type": "TextualBody", "purpose": "highlighting", "value": "highlight-2"},
                {"type": "TextualBody", "purpose": "commenting", "value": "a note"}
            ],
            "target": {
                "selector": [
                    {"type": "TextQuoteSelector", "exact": "quick brown"},
                    {"type": "TextPositionSelector", "start": 4, "end": 15}
                ]
            }
        }"#;

        let wire: WireAnnotation = serde_json::from_str(json).unwrap();
        let annotation = wire.to_annotation().unwrap();

        assert_eq!(annotation.id, "anno-7");
        assert_eq!(annotation.target.start, 4);
        assert_eq!(annotation.target.end, 15);
        assert_eq!(annotation.target.quote, "quick brown");
        assert_eq!(annotation.highlight_color(), HighlightColor::Blue);
        assert_eq!(annotation.body[1].value, "a note");
    }

    #[test]
    fn test_missing_position_selector() {
        let json = r#"{
            "id": "anno-1",
            "target": {"selector": [{"type": "TextQuoteSelector", "exact": "lorem"}]}
        }"#;

        let wire: WireAnnotation = serde_json::from_str(json).unwrap();
        let err = wire.to_annotation().unwrap_err();
        assert!(matches!(
            err,
            WireError::MissingPositionSelector { ref id } if id == "anno-1"
        ));
    }

    #[test]
    fn test_malformed_body_defaults() {
        let json = r#"{
            "id": "anno-1",
            "body": [{}],
            "target": {"selector": [{"type": "TextPositionSelector", "start": 0, "end": 5}]}
        }"#;

        let wire: WireAnnotation = serde_json::from_str(json).unwrap();
        let annotation = wire.to_annotation().unwrap();
        assert_eq!(annotation.body[0].kind, TEXTUAL_BODY);
        // No highlighting entry: the engine renders the palette default.
        assert_eq!(annotation.highlight_color(), HighlightColor::DEFAULT);
    }

    #[test]
    fn test_unknown_selector_kind_is_kept_verbatim() {
        let json = r#"{
            "id": "anno-9",
            "target": {
                "selector": [
                    {"type": "XPathSelector", "value": "/html/body/p[2]"},
                    {"type": "TextPositionSelector", "start": 4, "end": 9}
                ]
            }
        }"#;

        let wire: WireAnnotation = serde_json::from_str(json).unwrap();
        let WireSelector::Other(extra) = &wire.target.selector[0] else {
            panic!("expected pass-through selector");
        };
        assert_eq!(extra["type"], "XPathSelector");

        // Conversion uses the position selector and ignores the unknown kind.
        let annotation = wire.to_annotation().unwrap();
        assert_eq!((annotation.target.start, annotation.target.end), (4, 9));

        // Re-serialization keeps the unknown selector untouched.
        let out = serde_json::to_value(&wire).unwrap();
        assert_eq!(out["target"]["selector"][0]["value"], "/html/body/p[2]");
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let json = r#"{
            "id": "anno-7",
            "readOnly": true,
            "body": [{"type": "TextualBody", "purpose": "highlighting", "value": "highlight-3"}],
            "target": {
                "selector": [
                    {"type": "TextQuoteSelector", "exact": "fox"},
                    {"type": "TextPositionSelector", "start": 16, "end": 19}
                ]
            }
        }"#;

        let wire: WireAnnotation = serde_json::from_str(json).unwrap();
        let annotation = wire.to_annotation().unwrap();
        assert!(annotation.read_only);
        assert_eq!(
            annotation.body[0].purpose,
            PURPOSE_HIGHLIGHTING.to_string()
        );

        let back = WireAnnotation::from_annotation(&annotation);
        assert_eq!(back.id, wire.id);
        assert_eq!(back.target, wire.target);
        assert_eq!(back.body, wire.body);
        assert!(back.read_only);
    }
}
