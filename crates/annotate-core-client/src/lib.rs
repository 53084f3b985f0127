#![warn(missing_docs)]
//! Annotate Core Client - Embedding Surface for the Annotation Engine
//!
//! # Overview
//!
//! `annotate-core-client` wraps the headless engine from `annotate-core` in the surface an
//! embedding application talks to: a configuration object, the W3C Web Annotation wire
//! format, and annotation loading over HTTP.
//!
//! The host still owns rendering and gesture capture; it forwards gestures to the
//! [`TextAnnotator`] and draws whatever the engine's span projection says.
//!
//! # Quick Start
//!
//! ```rust
//! use annotate_core_client::{Config, TextAnnotator};
//!
//! let mut annotator = TextAnnotator::new(Config::new(
//!     "The quick brown fox jumps over the lazy dog",
//! ));
//!
//! annotator.subscribe(|event| {
//!     println!("annotation event: {event:?}");
//! });
//!
//! // Forward a drag gesture; the engine focuses a transient selection.
//! annotator.complete_selection(4, 9);
//! assert!(annotator.state().focused.is_some());
//!
//! // Tearing down returns the original content for restoration.
//! let content = annotator.destroy();
//! assert!(content.starts_with("The quick"));
//! ```
//!
//! # Loading Stored Annotations
//!
//! ```rust,no_run
//! use annotate_core_client::{Config, RequestOptions, TextAnnotator};
//!
//! let mut annotator = TextAnnotator::new(Config::new("..."));
//! let loaded = annotator
//!     .load_annotations("https://example.com/annotations.json", &RequestOptions::default())
//!     .expect("fetch failed");
//! println!("loaded {} annotations", loaded.len());
//! ```

pub mod error;
pub mod wire;

pub use error::ClientError;
pub use wire::{WireAnnotation, WireBody, WireError, WireSelector, WireTarget, ANNOTATION_CONTEXT};

pub use annotate_core::{
    Annotation, AnnotationEvent, AnnotatorState, AutoHighlight, BodyEntry, Document,
    HighlightColor, IdOverride, ListenerId, RangeAnchor, Span,
};

use annotate_core::{AnnotatorOptions, AnnotatorStateManager};

/// Construction-time configuration for [`TextAnnotator`].
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// The annotated text content.
    pub content: String,
    /// Global read-only flag.
    pub read_only: bool,
    /// Headless mode: never open an editor on focus transitions.
    pub disable_editor: bool,
    /// Ignore selection gestures entirely.
    pub disable_select: bool,
    /// Auto-highlight behavior for fresh selections.
    pub auto_highlight: AutoHighlight,
    /// UI locale hint, passed through to editor collaborators.
    pub locale: String,
    /// Editor positioning hint, opaque to the engine.
    pub editor_auto_position: Option<String>,
}

impl Config {
    /// Configuration with defaults over the given content.
    pub fn new(content: &str) -> Self {
        Self {
            content: content.to_string(),
            locale: "en".to_string(),
            ..Self::default()
        }
    }
}

/// Options for annotation loading requests.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra request headers, e.g. authorization.
    pub headers: Vec<(String, String)>,
}

/// The embedding surface: one annotated content root with its engine state.
pub struct TextAnnotator {
    manager: AnnotatorStateManager,
    original_content: String,
    locale: String,
    editor_auto_position: Option<String>,
}

impl TextAnnotator {
    /// Create an annotator over the configured content. The engine starts observing
    /// gestures immediately.
    pub fn new(config: Config) -> Self {
        let manager = AnnotatorStateManager::new(
            Document::new(&config.content),
            AnnotatorOptions {
                read_only: config.read_only,
                editor_disabled: config.disable_editor,
                disable_select: config.disable_select,
                auto_highlight: config.auto_highlight,
            },
        );

        Self {
            manager,
            original_content: config.content,
            locale: config.locale,
            editor_auto_position: config.editor_auto_position,
        }
    }

    /// The underlying state manager.
    pub fn manager(&self) -> &AnnotatorStateManager {
        &self.manager
    }

    /// Mutable access to the underlying state manager, for editor collaborators committing
    /// annotations or applying id overrides.
    pub fn manager_mut(&mut self) -> &mut AnnotatorStateManager {
        &mut self.manager
    }

    /// Current engine state snapshot.
    pub fn state(&self) -> AnnotatorState {
        self.manager.state()
    }

    /// The configured UI locale.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// The editor positioning hint, if configured.
    pub fn editor_auto_position(&self) -> Option<&str> {
        self.editor_auto_position.as_deref()
    }

    /// Replace the full annotation set. An empty slice clears all annotations.
    ///
    /// All records are converted before any is applied, so a malformed record leaves the
    /// previous set untouched.
    pub fn set_annotations(&mut self, annotations: &[WireAnnotation]) -> Result<(), ClientError> {
        let converted = annotations
            .iter()
            .map(WireAnnotation::to_annotation)
            .collect::<Result<Vec<_>, _>>()?;
        self.manager.set_annotations(converted);
        Ok(())
    }

    /// Remove all annotations.
    pub fn clear_annotations(&mut self) {
        self.manager.set_annotations(Vec::new());
    }

    /// Add (or re-render) one annotation as-is. Emits no events.
    pub fn add_annotation(&mut self, annotation: &WireAnnotation) -> Result<(), ClientError> {
        let converted = annotation.to_annotation()?;
        self.manager.add_annotation(converted);
        Ok(())
    }

    /// Remove one annotation by record. Unknown ids are a no-op. Emits no events.
    pub fn remove_annotation(&mut self, annotation: &WireAnnotation) {
        self.remove_annotation_by_id(&annotation.id);
    }

    /// Remove one annotation by id. Unknown ids are a no-op. Emits no events.
    pub fn remove_annotation_by_id(&mut self, id: &str) {
        if let Some(stored) = self.manager.highlighter().get_annotation(id).cloned() {
            self.manager.remove_annotation(&stored);
        }
    }

    /// The full current annotation set as wire records.
    pub fn get_annotations(&self) -> Vec<WireAnnotation> {
        self.manager
            .get_annotations()
            .iter()
            .map(WireAnnotation::from_annotation)
            .collect()
    }

    /// Programmatically focus an annotation by record. Returns `None` when it has no
    /// rendered spans. Emits no events.
    pub fn select_annotation(&mut self, annotation: &WireAnnotation) -> Option<WireAnnotation> {
        self.select_annotation_by_id(&annotation.id)
    }

    /// Programmatically focus an annotation by id. Returns `None` when the id has no
    /// rendered spans. Emits no events.
    pub fn select_annotation_by_id(&mut self, id: &str) -> Option<WireAnnotation> {
        self.manager
            .select_annotation(id)
            .map(|a| WireAnnotation::from_annotation(&a))
    }

    /// Fetch a JSON annotation list, apply it via [`set_annotations`](Self::set_annotations),
    /// and return the raw parsed list.
    ///
    /// On any failure (network, parse, conversion) the previous annotation set stays
    /// applied.
    pub fn load_annotations(
        &mut self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<Vec<WireAnnotation>, ClientError> {
        let mut request = ureq::get(url);
        for (name, value) in &options.headers {
            request = request.set(name, value);
        }

        let body = request.call().map_err(Box::new)?.into_string()?;
        let annotations: Vec<WireAnnotation> = serde_json::from_str(&body)?;
        self.set_annotations(&annotations)?;

        log::info!("loaded {} annotations from {url}", annotations.len());
        Ok(annotations)
    }

    /// Forward a finished drag selection over `start..end`.
    pub fn complete_selection(&mut self, start: usize, end: usize) {
        self.manager.complete_selection(start, end);
    }

    /// Forward a collapsed click at `offset`.
    pub fn click(&mut self, offset: usize) {
        self.manager.click(offset);
    }

    /// Forward a double-click (word select) at `offset`.
    pub fn double_click(&mut self, offset: usize) {
        self.manager.double_click(offset);
    }

    /// Forward an Escape key press.
    pub fn escape(&mut self) {
        self.manager.escape();
    }

    /// Subscribe to annotation events.
    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&AnnotationEvent) + Send + 'static,
    {
        self.manager.subscribe(callback)
    }

    /// Remove an event listener.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.manager.unsubscribe(id)
    }

    /// Subscribe to state change notifications.
    pub fn subscribe_state<F>(&mut self, callback: F)
    where
        F: FnMut(&AnnotatorState) + Send + 'static,
    {
        self.manager.subscribe_state(callback)
    }

    /// Global read-only flag.
    pub fn read_only(&self) -> bool {
        self.manager.read_only()
    }

    /// Set the global read-only flag.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.manager.set_read_only(read_only);
    }

    /// Whether focus transitions are prevented from opening an editor.
    pub fn disable_editor(&self) -> bool {
        self.manager.editor_disabled()
    }

    /// Enable or disable the editor.
    pub fn set_disable_editor(&mut self, disable: bool) {
        self.manager.set_editor_disabled(disable);
    }

    /// Whether selection gestures are ignored.
    pub fn disable_select(&self) -> bool {
        self.manager.disable_select()
    }

    /// Ignore or observe selection gestures.
    pub fn set_disable_select(&mut self, disable: bool) {
        self.manager.set_disable_select(disable);
    }

    /// Tear down: stop observing gestures, drop all rendered state, and return the
    /// original content for restoration.
    pub fn destroy(mut self) -> String {
        self.manager.stop();
        self.manager.set_annotations(Vec::new());
        self.original_content
    }
}
