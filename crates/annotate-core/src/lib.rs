#![warn(missing_docs)]
//! Annotate Core - Headless Annotation and Highlight Synchronization Engine
//!
//! # Overview
//!
//! `annotate-core` keeps a set of W3C Web Annotation style records and the highlighted
//! rendering of a text document in sync. It is headless: it does not render anything,
//! assuming the upper layer draws the colored span fragments the engine projects and routes
//! user gestures (drag, click, double-click, escape) back in.
//!
//! # Core Features
//!
//! - **Robust Anchoring**: character offsets plus an exact text quote, with quote-based
//!   relocation when offsets drift
//! - **Overlap-Safe Rendering**: rendered markup is a pure projection of the annotation
//!   set, recomputed after each mutation, so overlapping highlights split and merge cleanly
//! - **Selection State Machine**: normalized gesture events with dedupe, read-only and
//!   enable gates
//! - **Delayed Id Override**: a deferred command token lets a persistence layer swap
//!   client-generated ids for server ids at any later time
//! - **State Tracking**: explicit state object, version counter, and change notifications
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Orchestrator (AnnotatorStateManager)       │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Selection Handler (gesture machine)        │  ← Input Normalization
//! ├─────────────────────────────────────────────┤
//! │  Highlighter (span projection)              │  ← Rendering Data
//! ├─────────────────────────────────────────────┤
//! │  Range Anchors (offset + quote)             │  ← Text Location
//! ├─────────────────────────────────────────────┤
//! │  Document (rope text access)                │  ← Text Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use annotate_core::{
//!     Annotation, AnnotationEvent, AnnotatorOptions, AnnotatorStateManager, BodyEntry,
//!     Document, HighlightColor, RangeAnchor,
//! };
//!
//! let document = Document::new("The quick brown fox jumps over the lazy dog");
//! let mut manager = AnnotatorStateManager::new(document.clone(), AnnotatorOptions::default());
//!
//! // Subscribe to annotation events.
//! manager.subscribe(|event| {
//!     if let AnnotationEvent::CreateAnnotation { annotation, .. } = event {
//!         println!("created {}", annotation.id);
//!     }
//! });
//!
//! // Load a stored highlight and render it.
//! let stored = Annotation::new("a-1", RangeAnchor::from_range(&document, 4, 9))
//!     .with_body(vec![BodyEntry::highlighting(HighlightColor::Blue)]);
//! manager.set_annotations(vec![stored]);
//!
//! let spans = manager.highlighter().find_annotation_spans("a-1");
//! assert_eq!((spans[0].start, spans[0].end), (4, 9));
//! ```
//!
//! # Module Description
//!
//! - [`document`] - rope based text access and word/block queries
//! - [`anchor`] - offset + quote range anchors with relocation
//! - [`annotation`] - annotation records, bodies, and the color palette
//! - [`highlighter`] - the span projection (overlap splitting, id remapping)
//! - [`selection`] - the selection gesture state machine
//! - [`events`] - typed annotation events and the id override token
//! - [`state`] - the orchestrator and state notifications

pub mod anchor;
pub mod annotation;
pub mod document;
pub mod events;
pub mod highlighter;
pub mod selection;
pub mod state;

pub use anchor::RangeAnchor;
pub use annotation::{Annotation, BodyEntry, HighlightColor, PURPOSE_HIGHLIGHTING, TEXTUAL_BODY};
pub use document::Document;
pub use events::{AnnotationEvent, EventCallback, EventChannel, IdOverride, ListenerId};
pub use highlighter::{Highlighter, Span};
pub use selection::{SelectionEvent, SelectionHandler, SelectionState};
pub use state::{
    AnnotatorOptions, AnnotatorState, AnnotatorStateManager, AutoHighlight, StateChangeCallback,
};
