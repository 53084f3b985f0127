//! Orchestration state machine.
//!
//! # Overview
//!
//! [`AnnotatorStateManager`] is the single source of truth for "what is currently being
//! edited". It consumes selection gestures, drives the [`Highlighter`], and notifies
//! external collaborators through two channels:
//!
//! - **State changes**: the explicit state object `{focused, focused_span, read_only,
//!   editor_disabled}` plus a "render on state change" callback. Selecting always clears the
//!   previous focus before setting the new one (two notifications), forcing dependent views
//!   to fully remount instead of patching stale references.
//! - **Annotation events**: the typed [`AnnotationEvent`] channel (select / create / update /
//!   delete / cancel).
//!
//! # Concurrency model
//!
//! Single-threaded and cooperative: every method runs one discrete input event to
//! completion. Span mutations for an annotation id are fully applied before a method
//! returns. The delayed id override re-enters the machine as a fresh event via
//! [`apply_id_override`](AnnotatorStateManager::apply_id_override), arbitrarily long after
//! creation.
//!
//! # Example
//!
//! ```rust
//! use annotate_core::{AnnotatorOptions, AnnotatorStateManager, Document};
//!
//! let mut manager = AnnotatorStateManager::new(
//!     Document::new("The quick brown fox"),
//!     AnnotatorOptions::default(),
//! );
//!
//! manager.subscribe_state(|state| {
//!     println!("editor open: {}", state.editor_open());
//! });
//!
//! // A drag gesture over "quick" focuses a transient selection.
//! manager.complete_selection(4, 9);
//! assert!(manager.state().focused.is_some());
//! ```

use crate::annotation::{Annotation, BodyEntry, HighlightColor};
use crate::document::Document;
use crate::events::{AnnotationEvent, EventChannel, IdOverride, ListenerId};
use crate::highlighter::{Highlighter, Span};
use crate::selection::{SelectionEvent, SelectionHandler};
use std::collections::HashSet;

/// Auto-highlight behavior for fresh selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoHighlight {
    /// Commit fresh selections as highlights without opening an editor.
    pub enabled: bool,
    /// The color applied to auto-committed highlights.
    pub color: HighlightColor,
    /// Host-side timing hint; the engine itself commits synchronously.
    pub delay_ms: u64,
}

impl Default for AutoHighlight {
    fn default() -> Self {
        Self {
            enabled: false,
            color: HighlightColor::DEFAULT,
            delay_ms: 0,
        }
    }
}

/// Construction-time flags for the orchestrator.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotatorOptions {
    /// Global read-only flag.
    pub read_only: bool,
    /// Headless mode: focus transitions never open an editor.
    pub editor_disabled: bool,
    /// Ignore selection gestures entirely.
    pub disable_select: bool,
    /// Auto-highlight configuration.
    pub auto_highlight: AutoHighlight,
}

/// Snapshot of the orchestrator state.
#[derive(Debug, Clone)]
pub struct AnnotatorState {
    /// The annotation currently targeted by the external editor, if any.
    pub focused: Option<Annotation>,
    /// The span the focus came from, when focus came from a click.
    pub focused_span: Option<Span>,
    /// Global read-only flag.
    pub read_only: bool,
    /// Headless mode flag.
    pub editor_disabled: bool,
}

impl AnnotatorState {
    /// Derived predicate: an editor popup should be open.
    pub fn editor_open(&self) -> bool {
        self.focused.is_some() && !self.editor_disabled
    }

    /// Effective read-only flag for the focused annotation (global or per-annotation).
    pub fn focused_read_only(&self) -> bool {
        self.read_only || self.focused.as_ref().is_some_and(|a| a.read_only)
    }
}

/// State change callback type.
pub type StateChangeCallback = Box<dyn FnMut(&AnnotatorState) + Send>;

/// The top-level state machine reconciling selections, CRUD operations, and delayed id
/// overrides into a single source of truth.
pub struct AnnotatorStateManager {
    highlighter: Highlighter,
    selection: SelectionHandler,
    focused: Option<Annotation>,
    focused_span: Option<Span>,
    read_only: bool,
    editor_disabled: bool,
    disable_select: bool,
    auto_highlight: AutoHighlight,
    /// Original ids of created annotations whose override token has not been applied yet.
    pending_overrides: HashSet<String>,
    events: EventChannel,
    state_callbacks: Vec<StateChangeCallback>,
    state_version: u64,
    running: bool,
}

impl AnnotatorStateManager {
    /// Create a started manager over the given content.
    pub fn new(document: Document, options: AnnotatorOptions) -> Self {
        let mut selection = SelectionHandler::new(options.read_only);
        selection.set_enabled(!options.disable_select);

        Self {
            highlighter: Highlighter::new(document),
            selection,
            focused: None,
            focused_span: None,
            read_only: options.read_only,
            editor_disabled: options.editor_disabled,
            disable_select: options.disable_select,
            auto_highlight: options.auto_highlight,
            pending_overrides: HashSet::new(),
            events: EventChannel::new(),
            state_callbacks: Vec::new(),
            state_version: 0,
            running: true,
        }
    }

    /// The highlight index (read access).
    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    /// Current state snapshot.
    pub fn state(&self) -> AnnotatorState {
        AnnotatorState {
            focused: self.focused.clone(),
            focused_span: self.focused_span.clone(),
            read_only: self.read_only,
            editor_disabled: self.editor_disabled,
        }
    }

    /// State version, incremented on every notification.
    pub fn version(&self) -> u64 {
        self.state_version
    }

    /// Begin observing gestures (idempotent).
    pub fn start(&mut self) {
        self.running = true;
        self.selection.set_enabled(!self.disable_select);
    }

    /// Stop observing gestures. Focused state is left untouched.
    pub fn stop(&mut self) {
        self.running = false;
        self.selection.set_enabled(false);
    }

    /// Subscribe to annotation events; the id can be passed to [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&AnnotationEvent) + Send + 'static,
    {
        self.events.subscribe(callback)
    }

    /// Remove an event listener.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Subscribe to state change notifications (external "render on state change").
    pub fn subscribe_state<F>(&mut self, callback: F)
    where
        F: FnMut(&AnnotatorState) + Send + 'static,
    {
        self.state_callbacks.push(Box::new(callback));
    }

    /// A drag selection finished over `start..end`.
    pub fn complete_selection(&mut self, start: usize, end: usize) {
        if let Some(evt) = self
            .selection
            .complete_selection(&self.highlighter, start, end)
        {
            self.handle_select(evt);
        }
    }

    /// A collapsed click at `offset`.
    pub fn click(&mut self, offset: usize) {
        if let Some(evt) = self.selection.click(&self.highlighter, offset) {
            self.handle_select(evt);
        }
    }

    /// A double-click (word select) at `offset`.
    pub fn double_click(&mut self, offset: usize) {
        if let Some(evt) = self.selection.double_click(&self.highlighter, offset) {
            self.handle_select(evt);
        }
    }

    /// Escape key: the single cancellation path.
    ///
    /// Clears the focused state and the live selection, then notifies the cancel
    /// collaborator. Never touches committed highlighter entries.
    pub fn escape(&mut self) {
        let cancelled = self.focused.take().filter(|a| !a.is_selection);
        self.focused_span = None;
        self.selection.clear_selection();
        if self.running && !self.disable_select {
            self.selection.set_enabled(true);
        }
        self.notify_state();
        self.events
            .emit(&AnnotationEvent::CancelSelected { annotation: cancelled });
    }

    /// The external editor reported a first in-progress change: gate out reentrant
    /// selection gestures until the edit concludes.
    pub fn editor_changed(&mut self) {
        self.selection.set_enabled(false);
    }

    fn handle_select(&mut self, event: SelectionEvent) {
        match event {
            SelectionEvent::Selected(selection) => {
                // Clear first, then set: dependent views fully remount.
                self.set_focus(None, None);
                self.set_focus(Some(selection.clone()), None);

                if self.auto_highlight.enabled && !self.read_only {
                    let annotation =
                        selection.with_body(vec![BodyEntry::highlighting(self.auto_highlight.color)]);
                    self.create_or_update(annotation, None);
                }
            }
            SelectionEvent::Reselected { annotation, span } => {
                self.set_focus(None, None);
                self.set_focus(Some(annotation.clone()), Some(span.clone()));
                self.events.emit(&AnnotationEvent::SelectAnnotation {
                    annotation,
                    span: Some(span),
                });
            }
            SelectionEvent::Cleared => self.clear_state(),
        }
    }

    /// Commit a candidate annotation from the editor collaborator.
    ///
    /// The annotation is normalized (leading `#` stripped from the id; exactly one
    /// highlighting body entry, defaulting to the first palette color), rendered through the
    /// highlighter, then announced: `UpdateAnnotation` when `previous` is given, otherwise
    /// `CreateAnnotation` carrying an [`IdOverride`] token.
    pub fn create_or_update(&mut self, annotation: Annotation, previous: Option<Annotation>) {
        self.clear_state();
        self.selection.clear_selection();

        let normalized = Self::normalize(annotation);
        self.highlighter
            .add_or_update_annotation(normalized.clone(), previous.as_ref());

        match previous {
            Some(previous) => self.events.emit(&AnnotationEvent::UpdateAnnotation {
                annotation: normalized,
                previous,
            }),
            None => {
                self.pending_overrides.insert(normalized.id.clone());
                let override_id = IdOverride::new(&normalized.id);
                self.events.emit(&AnnotationEvent::CreateAnnotation {
                    annotation: normalized,
                    override_id,
                });
            }
        }
    }

    /// Apply a delayed id override.
    ///
    /// Processed as a fresh event: if the editor is currently open on the original id it is
    /// closed first (its annotation would otherwise be orphaned by the rename), then the
    /// highlighter relabels whatever content currently lives under the original id. Correct
    /// regardless of elapsed time and of intervening edits to the same annotation.
    pub fn apply_id_override(&mut self, token: &IdOverride, new_id: &str) {
        let original_id = token.original_id();

        if self
            .focused
            .as_ref()
            .is_some_and(|focused| focused.id == original_id)
        {
            self.clear_state();
        }

        if !self.pending_overrides.remove(original_id) {
            log::debug!("id override for '{original_id}' without a pending creation");
        }
        self.highlighter.override_id(original_id, new_id);
    }

    /// Delete an annotation on behalf of the editor collaborator and announce it.
    pub fn delete_annotation(&mut self, annotation: &Annotation) {
        self.clear_state();
        self.selection.clear_selection();
        self.highlighter.remove_annotation(&annotation.id);
        self.events.emit(&AnnotationEvent::DeleteAnnotation {
            annotation: annotation.clone(),
        });
    }

    /// Remove an annotation through the external API (no event).
    ///
    /// Closes the editor when it is open on the removed annotation.
    pub fn remove_annotation(&mut self, annotation: &Annotation) {
        self.highlighter.remove_annotation(&annotation.id);

        if self
            .focused
            .as_ref()
            .is_some_and(|focused| focused.id == annotation.id)
        {
            self.clear_state();
        }
    }

    /// Render an annotation supplied by the external API, as-is (no event).
    pub fn add_annotation(&mut self, annotation: Annotation) {
        self.highlighter.add_or_update_annotation(annotation, None);
    }

    /// Replace the full annotation set.
    pub fn set_annotations(&mut self, annotations: Vec<Annotation>) {
        self.highlighter.clear();
        self.highlighter.init(annotations);
    }

    /// The full current annotation set, as independent copies.
    pub fn get_annotations(&self) -> Vec<Annotation> {
        self.highlighter.get_all_annotations()
    }

    /// Programmatically focus an annotation by id. Returns the focused annotation, or
    /// `None` when the id has no rendered spans. Emits no events.
    pub fn select_annotation(&mut self, id: &str) -> Option<Annotation> {
        // De-select in any case.
        self.set_focus(None, None);

        let span = self.highlighter.find_annotation_spans(id).first()?.clone();
        let annotation = self.highlighter.get_annotation(id)?.clone();
        self.set_focus(Some(annotation.clone()), Some(span));
        Some(annotation)
    }

    /// Global read-only flag.
    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// Set the global read-only flag; also gates the selection handler.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
        self.selection.set_read_only(read_only);
        self.notify_state();
    }

    /// Headless mode flag.
    pub fn editor_disabled(&self) -> bool {
        self.editor_disabled
    }

    /// Enable or disable the editor (headless mode).
    pub fn set_editor_disabled(&mut self, disabled: bool) {
        self.editor_disabled = disabled;
        self.notify_state();
    }

    /// Whether selection gestures are ignored.
    pub fn disable_select(&self) -> bool {
        self.disable_select
    }

    /// Ignore or observe selection gestures.
    pub fn set_disable_select(&mut self, disable: bool) {
        self.disable_select = disable;
        self.selection.set_enabled(self.running && !disable);
    }

    fn set_focus(&mut self, focused: Option<Annotation>, span: Option<Span>) {
        self.focused = focused;
        self.focused_span = span;
        self.notify_state();
    }

    /// Clear focused state and re-arm the selection handler.
    fn clear_state(&mut self) {
        self.focused = None;
        self.focused_span = None;
        if self.running && !self.disable_select {
            self.selection.set_enabled(true);
        }
        self.notify_state();
    }

    fn notify_state(&mut self) {
        self.state_version += 1;
        let snapshot = AnnotatorState {
            focused: self.focused.clone(),
            focused_span: self.focused_span.clone(),
            read_only: self.read_only,
            editor_disabled: self.editor_disabled,
        };
        for callback in &mut self.state_callbacks {
            callback(&snapshot);
        }
    }

    fn normalize(mut annotation: Annotation) -> Annotation {
        if let Some(stripped) = annotation.id.strip_prefix('#') {
            annotation.id = stripped.to_string();
        }
        annotation.is_selection = false;

        // Exactly one highlighting entry: keep the first, drop duplicates, default when
        // absent. Other purposes pass through untouched.
        let mut seen_highlighting = false;
        annotation.body.retain(|entry| {
            if entry.is_highlighting() {
                if seen_highlighting {
                    return false;
                }
                seen_highlighting = true;
            }
            true
        });
        if !seen_highlighting {
            annotation
                .body
                .insert(0, BodyEntry::highlighting(HighlightColor::DEFAULT));
        }

        annotation
    }
}
