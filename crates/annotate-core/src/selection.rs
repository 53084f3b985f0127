//! Selection gesture state machine.
//!
//! # Overview
//!
//! The [`SelectionHandler`] observes completed user selection gestures (drag, click,
//! double-click word select) and emits normalized [`SelectionEvent`]s. It never mutates the
//! rendered document; it only reads the highlighter's projection to recognize clicks on
//! existing spans.
//!
//! States: `Idle` (no live selection) and `Active` (a selection or reselected annotation is
//! live). Every recognized transition emits exactly one event, synchronously with the
//! triggering gesture; repeated identical selections and repeated collapses are
//! deduplicated.
//!
//! Gates:
//!
//! - `enabled == false` ignores every gesture (used while an editor popup is open);
//! - `read_only == true` suppresses *new* selections but still emits existing-annotation
//!   events, so stored highlights stay viewable.

use crate::anchor::RangeAnchor;
use crate::annotation::Annotation;
use crate::highlighter::{Highlighter, Span};

/// Selection machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// No live selection.
    Idle,
    /// A selection (fresh or reselected) is live.
    Active,
}

/// A normalized selection event.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    /// A fresh text selection, wrapped as a transient annotation (`is_selection == true`).
    Selected(Annotation),
    /// The user clicked an already-rendered span (click-to-reselect).
    Reselected {
        /// The owning annotation.
        annotation: Annotation,
        /// The clicked span fragment.
        span: Span,
    },
    /// The live selection collapsed or left the content root (`selection: null`).
    Cleared,
}

/// Observes selection gestures and emits normalized selection events.
pub struct SelectionHandler {
    state: SelectionState,
    enabled: bool,
    read_only: bool,
    /// Anchor of the last emitted fresh selection, for dedupe.
    last_anchor: Option<RangeAnchor>,
    /// Counter for client-generated transient ids.
    next_id: u64,
}

impl SelectionHandler {
    /// Create an enabled handler.
    pub fn new(read_only: bool) -> Self {
        Self {
            state: SelectionState::Idle,
            enabled: true,
            read_only,
            last_anchor: None,
            next_id: 1,
        }
    }

    /// Current machine state.
    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// Whether gestures are observed at all.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable gesture observation.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether new selections are suppressed.
    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// Set the read-only gate.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// A drag gesture finished over the character range `start..end`.
    pub fn complete_selection(
        &mut self,
        highlighter: &Highlighter,
        start: usize,
        end: usize,
    ) -> Option<SelectionEvent> {
        if !self.enabled {
            return None;
        }
        if start >= end {
            // Collapsed drag behaves like a click.
            return self.click(highlighter, start);
        }
        if self.read_only {
            return None;
        }

        let anchor = RangeAnchor::from_range(highlighter.document(), start, end);
        if anchor.is_empty() {
            return None;
        }
        if self.state == SelectionState::Active && self.last_anchor.as_ref() == Some(&anchor) {
            return None;
        }

        let id = format!("#sel-{}", self.next_id);
        self.next_id += 1;
        self.state = SelectionState::Active;
        self.last_anchor = Some(anchor.clone());

        Some(SelectionEvent::Selected(Annotation::selection(&id, anchor)))
    }

    /// A collapsed click at `offset`.
    ///
    /// On top of a rendered span this emits [`SelectionEvent::Reselected`] (topmost
    /// annotation wins); on plain text it collapses the live selection, emitting
    /// [`SelectionEvent::Cleared`] once.
    pub fn click(&mut self, highlighter: &Highlighter, offset: usize) -> Option<SelectionEvent> {
        if !self.enabled {
            return None;
        }

        if let Some((annotation, span)) = highlighter.annotation_at(offset) {
            self.state = SelectionState::Active;
            self.last_anchor = Some(annotation.target.clone());
            return Some(SelectionEvent::Reselected {
                annotation: annotation.clone(),
                span: span.clone(),
            });
        }

        match self.state {
            SelectionState::Active => {
                self.state = SelectionState::Idle;
                self.last_anchor = None;
                Some(SelectionEvent::Cleared)
            }
            SelectionState::Idle => None,
        }
    }

    /// A double-click at `offset`: selects the containing word.
    pub fn double_click(
        &mut self,
        highlighter: &Highlighter,
        offset: usize,
    ) -> Option<SelectionEvent> {
        if !self.enabled {
            return None;
        }

        match highlighter.document().word_range_at(offset) {
            Some((start, end)) => self.complete_selection(highlighter, start, end),
            None => self.click(highlighter, offset),
        }
    }

    /// Reset to `Idle` without emitting (the orchestrator clears the native selection after
    /// commit/cancel).
    pub fn clear_selection(&mut self) {
        self.state = SelectionState::Idle;
        self.last_anchor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Annotation;
    use crate::document::Document;

    fn highlighter_with(annotations: Vec<Annotation>) -> Highlighter {
        let document = Document::new("The quick brown fox jumps over the lazy dog");
        let mut hl = Highlighter::new(document);
        hl.init(annotations);
        hl
    }

    fn stored(id: &str, hl: &Highlighter, start: usize, end: usize) -> Annotation {
        Annotation::new(id, RangeAnchor::from_range(hl.document(), start, end))
    }

    #[test]
    fn test_drag_emits_one_transient_selection() {
        let hl = highlighter_with(vec![]);
        let mut handler = SelectionHandler::new(false);

        let evt = handler.complete_selection(&hl, 10, 20).unwrap();
        let SelectionEvent::Selected(selection) = evt else {
            panic!("expected SelectionEvent::Selected");
        };
        assert!(selection.is_selection);
        assert_eq!(selection.target.start, 10);
        assert_eq!(selection.target.end, 20);
        assert!(selection.id.starts_with('#'));
        assert_eq!(handler.state(), SelectionState::Active);

        // Identical repeated gesture is deduplicated.
        assert!(handler.complete_selection(&hl, 10, 20).is_none());
    }

    #[test]
    fn test_collapse_emits_cleared_once() {
        let hl = highlighter_with(vec![]);
        let mut handler = SelectionHandler::new(false);

        handler.complete_selection(&hl, 10, 20).unwrap();
        assert_eq!(handler.click(&hl, 30), Some(SelectionEvent::Cleared));
        assert_eq!(handler.state(), SelectionState::Idle);
        // Already idle: repeated collapse emits nothing.
        assert_eq!(handler.click(&hl, 30), None);
    }

    #[test]
    fn test_click_reselects_topmost_annotation() {
        let mut hl = highlighter_with(vec![]);
        let a = stored("a", &hl, 0, 10);
        let b = stored("b", &hl, 5, 15);
        hl.init(vec![a, b]);

        let mut handler = SelectionHandler::new(false);
        let evt = handler.click(&hl, 7).unwrap();
        let SelectionEvent::Reselected { annotation, span } = evt else {
            panic!("expected SelectionEvent::Reselected");
        };
        assert_eq!(annotation.id, "b");
        assert_eq!(span.annotation_id, "b");
        assert!(!annotation.is_selection);
    }

    #[test]
    fn test_read_only_suppresses_new_selection() {
        let mut hl = highlighter_with(vec![]);
        let a = stored("a", &hl, 0, 10);
        hl.init(vec![a]);

        let mut handler = SelectionHandler::new(true);
        // Drag over plain text is ignored.
        assert!(handler.complete_selection(&hl, 16, 25).is_none());
        // Clicking an existing annotation still emits.
        let evt = handler.click(&hl, 3).unwrap();
        assert!(matches!(evt, SelectionEvent::Reselected { .. }));
    }

    #[test]
    fn test_disabled_ignores_everything() {
        let mut hl = highlighter_with(vec![]);
        let a = stored("a", &hl, 0, 10);
        hl.init(vec![a]);

        let mut handler = SelectionHandler::new(false);
        handler.set_enabled(false);
        assert!(handler.complete_selection(&hl, 12, 20).is_none());
        assert!(handler.click(&hl, 3).is_none());
        assert!(handler.double_click(&hl, 12).is_none());
    }

    #[test]
    fn test_double_click_selects_word() {
        let hl = highlighter_with(vec![]);
        let mut handler = SelectionHandler::new(false);

        // Offset 5 is inside "quick" (4..9).
        let evt = handler.double_click(&hl, 5).unwrap();
        let SelectionEvent::Selected(selection) = evt else {
            panic!("expected SelectionEvent::Selected");
        };
        assert_eq!((selection.target.start, selection.target.end), (4, 9));
        assert_eq!(selection.target.quote, "quick");
    }

    #[test]
    fn test_clear_selection_rearms_dedupe() {
        let hl = highlighter_with(vec![]);
        let mut handler = SelectionHandler::new(false);

        handler.complete_selection(&hl, 10, 20).unwrap();
        handler.clear_selection();
        // Same gesture after a clear is a fresh selection again.
        assert!(handler.complete_selection(&hl, 10, 20).is_some());
    }
}
