//! Render-independent text range anchors.
//!
//! # Overview
//!
//! A [`RangeAnchor`] describes a character range of the content text without referring to any
//! rendered structure, so it survives re-renders and span splitting/merging unchanged. It
//! records:
//!
//! - global character offsets `start..end` (half-open), and
//! - the exact quoted text at anchor time.
//!
//! Resolution trusts the offsets as long as the quote still matches at that position;
//! otherwise it re-locates the quote **by content** (the occurrence nearest to the recorded
//! start). Anchors with an empty quote are position-only and resolve iff in bounds.
//!
//! Anchors serialize losslessly: deserializing a serialized anchor yields an equal anchor.

use crate::document::Document;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A serializable description of a character range within the content root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeAnchor {
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
    /// The exact text covered by the range at anchor time.
    #[serde(default)]
    pub quote: String,
}

impl RangeAnchor {
    /// Create an anchor from raw offsets without a quote (position-only).
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            quote: String::new(),
        }
    }

    /// Create an anchor from a live range, capturing the quoted text.
    ///
    /// Offsets are clamped to the document.
    pub fn from_range(document: &Document, start: usize, end: usize) -> Self {
        let end = document.clamp(end);
        let start = start.min(end);
        Self {
            start,
            end,
            quote: document.slice(start, end),
        }
    }

    /// Length of the anchored range in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` for a collapsed anchor.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check whether two anchors overlap (by their recorded offsets).
    pub fn overlaps(&self, other: &RangeAnchor) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Resolve the anchor against the document, returning a live character range.
    ///
    /// Returns `None` when the anchored text is no longer present (e.g. the content was
    /// mutated externally); callers skip rendering in that case.
    pub fn resolve(&self, document: &Document) -> Option<Range<usize>> {
        if self.is_empty() {
            return None;
        }

        if self.quote.is_empty() {
            // Position-only anchor: trust the offsets when in bounds.
            return (self.end <= document.char_count()).then(|| self.start..self.end);
        }

        if self.end <= document.char_count() && document.slice(self.start, self.end) == self.quote
        {
            return Some(self.start..self.end);
        }

        // The recorded offsets drifted; re-locate the quote by content.
        let quote_len = self.quote.chars().count();
        document
            .find_nearest(&self.quote, self.start)
            .map(|start| start..start + quote_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_range_captures_quote() {
        let doc = Document::new("Hello brave world");
        let anchor = RangeAnchor::from_range(&doc, 6, 11);
        assert_eq!(anchor.quote, "brave");
        assert_eq!(anchor.resolve(&doc), Some(6..11));
    }

    #[test]
    fn test_resolve_relocates_by_content() {
        let doc = Document::new("Hello brave world");
        let anchor = RangeAnchor {
            start: 2,
            end: 7,
            quote: "brave".to_string(),
        };
        // Offsets are stale, the quote is found nearest to the recorded start.
        assert_eq!(anchor.resolve(&doc), Some(6..11));
    }

    #[test]
    fn test_resolve_missing_text() {
        let doc = Document::new("Hello world");
        let anchor = RangeAnchor {
            start: 0,
            end: 5,
            quote: "gone".to_string(),
        };
        assert_eq!(anchor.resolve(&doc), None);
    }

    #[test]
    fn test_position_only_anchor() {
        let doc = Document::new("Hello world");
        assert_eq!(RangeAnchor::new(0, 5).resolve(&doc), Some(0..5));
        assert_eq!(RangeAnchor::new(0, 50).resolve(&doc), None);
        assert_eq!(RangeAnchor::new(3, 3).resolve(&doc), None);
    }

    #[test]
    fn test_overlaps() {
        let a = RangeAnchor::new(0, 10);
        let b = RangeAnchor::new(5, 15);
        let c = RangeAnchor::new(10, 20);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_serde_round_trip() {
        let doc = Document::new("Hello brave world");
        let anchor = RangeAnchor::from_range(&doc, 6, 11);
        let json = serde_json::to_string(&anchor).unwrap();
        let back: RangeAnchor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, anchor);
        assert_eq!(back.resolve(&doc), anchor.resolve(&doc));
    }
}
