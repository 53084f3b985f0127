//! Typed annotation event channel.
//!
//! Events use an explicit enum with one payload shape per kind instead of string event
//! names, so a mistyped subscription cannot fail silently and payloads are checked at
//! compile time. Subscriptions are identified by [`ListenerId`] so they can be removed.

use crate::annotation::Annotation;
use crate::highlighter::Span;

/// A deferred command object allowing a caller to replace a client-generated annotation id
/// with a server-issued one at an arbitrary later time.
///
/// The token captures the id at creation time; applying it re-enters the orchestrator as a
/// fresh event (see `AnnotatorStateManager::apply_id_override`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdOverride {
    original_id: String,
}

impl IdOverride {
    pub(crate) fn new(original_id: &str) -> Self {
        Self {
            original_id: original_id.to_string(),
        }
    }

    /// The annotation id captured when the annotation was created.
    pub fn original_id(&self) -> &str {
        &self.original_id
    }
}

/// Events emitted by the orchestrator towards external collaborators.
#[derive(Debug, Clone)]
pub enum AnnotationEvent {
    /// An existing (stored) annotation was selected.
    SelectAnnotation {
        /// The selected annotation.
        annotation: Annotation,
        /// The clicked span fragment, when selection came from a gesture.
        span: Option<Span>,
    },
    /// A new annotation was created; the override token allows replacing its generated id.
    CreateAnnotation {
        /// The created (normalized) annotation.
        annotation: Annotation,
        /// Deferred id-override command for this annotation.
        override_id: IdOverride,
    },
    /// An annotation was updated.
    UpdateAnnotation {
        /// The new version.
        annotation: Annotation,
        /// The previous version.
        previous: Annotation,
    },
    /// An annotation was deleted.
    DeleteAnnotation {
        /// The deleted annotation.
        annotation: Annotation,
    },
    /// The current selection or editing session was cancelled.
    CancelSelected {
        /// The focused stored annotation, or `None` for a transient selection.
        annotation: Option<Annotation>,
    },
}

/// Identifies one subscription on an [`EventChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Event callback type.
pub type EventCallback = Box<dyn FnMut(&AnnotationEvent) + Send>;

/// Dispatches [`AnnotationEvent`]s to subscribed listeners in subscription order.
#[derive(Default)]
pub struct EventChannel {
    listeners: Vec<(ListenerId, EventCallback)>,
    next_id: u64,
}

impl EventChannel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a listener; the returned id can be used to unsubscribe.
    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&AnnotationEvent) + Send + 'static,
    {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, Box::new(callback)));
        id
    }

    /// Remove a listener. Returns `false` when the id is unknown.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Emit an event to all listeners.
    pub fn emit(&mut self, event: &AnnotationEvent) {
        for (_, callback) in &mut self.listeners {
            callback(event);
        }
    }
}
