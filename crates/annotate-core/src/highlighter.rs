//! Highlight index and span projection.
//!
//! # Overview
//!
//! The [`Highlighter`] is the single source of truth mapping `id → Annotation` and
//! `Annotation → Vec<Span>`, plus the inverse `offset → topmost annotation`. The rendered
//! span markup is a **derived projection**: it is recomputed from the annotation set after
//! every mutation, so removing one annotation automatically restores its neighbours'
//! fragment boundaries without disturbing their anchors.
//!
//! # Overlap handling
//!
//! Fragment boundaries are the union of every resolved anchor endpoint and every block
//! (newline) boundary. Each annotation's spans are the sub-ranges of its resolved range
//! split at those boundaries, so overlapping annotations produce independently styleable
//! fragments. Every fragment carries a stacking depth: the annotation's position, in render
//! order, among the annotations covering that fragment. Later-rendered annotations stack on
//! top.
//!
//! Annotations whose anchors no longer resolve are skipped during render (logged at `warn`)
//! but stay in the index; only their visual projection is absent.

use crate::annotation::{Annotation, HighlightColor};
use crate::document::Document;
use std::collections::{BTreeSet, HashMap};
use std::ops::Bound::Excluded;
use std::ops::Range;

/// One rendered highlight fragment.
///
/// A span holds a weak back-reference to its annotation (by id); spans never own
/// annotations. One annotation may own several spans when its anchor crosses a block
/// boundary or overlaps another annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Id of the owning annotation.
    pub annotation_id: String,
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
    /// The rendered color of this fragment.
    pub color: HighlightColor,
    /// Stacking depth at this fragment (0 = bottom; larger renders on top).
    pub depth: usize,
}

impl Span {
    /// Returns `true` if the span covers `offset`.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// Owns the authoritative annotation set and its rendered span projection.
pub struct Highlighter {
    document: Document,
    /// Annotations in render (insertion) order; order determines stacking at overlaps.
    entries: Vec<Annotation>,
    /// Derived projection: annotation id → document-ordered span fragments.
    spans: HashMap<String, Vec<Span>>,
}

impl Highlighter {
    /// Create an empty highlighter over the given content.
    pub fn new(document: Document) -> Self {
        Self {
            document,
            entries: Vec::new(),
            spans: HashMap::new(),
        }
    }

    /// The content document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Number of indexed annotations (including unrendered ones).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no annotations are indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear existing state and render the given list in original order.
    ///
    /// Order matters: later entries stack on top at overlaps. All spans are mounted when
    /// this returns.
    pub fn init(&mut self, annotations: Vec<Annotation>) {
        self.entries = annotations;
        self.rebuild_projection();
    }

    /// Add a new annotation or update an existing one.
    ///
    /// When `previous` is supplied its spans are torn down first (by id), then `annotation`
    /// is rendered under its own id. Without `previous`, a known id is updated in place.
    /// After return exactly one span group is associated with `annotation.id` and no orphan
    /// spans remain from the previous version.
    pub fn add_or_update_annotation(&mut self, annotation: Annotation, previous: Option<&Annotation>) {
        if let Some(prev) = previous
            && prev.id != annotation.id
        {
            self.entries.retain(|a| a.id != prev.id);
        }

        match self.entries.iter().position(|a| a.id == annotation.id) {
            // Update in place: keeps the entry's stacking position deterministic.
            Some(idx) => self.entries[idx] = annotation,
            None => self.entries.push(annotation),
        }

        self.rebuild_projection();
    }

    /// Remove an annotation by id. Idempotent: an unknown id is a no-op, not an error.
    pub fn remove_annotation(&mut self, id: &str) {
        let before = self.entries.len();
        self.entries.retain(|a| a.id != id);
        if self.entries.len() != before {
            self.rebuild_projection();
        }
    }

    /// Remove all spans and reset the index to empty.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.spans.clear();
    }

    /// The full current annotation set, in stable insertion order, as independent copies.
    pub fn get_all_annotations(&self) -> Vec<Annotation> {
        self.entries.clone()
    }

    /// Look up an indexed annotation by id.
    pub fn get_annotation(&self, id: &str) -> Option<&Annotation> {
        self.entries.iter().find(|a| a.id == id)
    }

    /// The live spans of an annotation, ordered by document position.
    ///
    /// Empty when the id is absent or its anchor did not resolve.
    pub fn find_annotation_spans(&self, id: &str) -> &[Span] {
        self.spans.get(id).map_or(&[], Vec::as_slice)
    }

    /// The topmost annotation covering `offset`, with the covering span.
    pub fn annotation_at(&self, offset: usize) -> Option<(&Annotation, &Span)> {
        // Reverse render order: later entries stack on top.
        self.entries.iter().rev().find_map(|annotation| {
            self.spans
                .get(&annotation.id)
                .and_then(|spans| spans.iter().find(|s| s.contains(offset)))
                .map(|span| (annotation, span))
        })
    }

    /// Atomically rename an annotation and all its spans' back-references from `old_id` to
    /// `new_id` without re-rendering.
    ///
    /// Silent no-op when `old_id` is not indexed; the annotation may already have been
    /// removed or superseded.
    pub fn override_id(&mut self, old_id: &str, new_id: &str) {
        if old_id == new_id {
            return;
        }

        let Some(entry) = self.entries.iter_mut().find(|a| a.id == old_id) else {
            log::debug!("override_id: '{old_id}' is not indexed; ignoring");
            return;
        };
        entry.id = new_id.to_string();

        if let Some(mut spans) = self.spans.remove(old_id) {
            for span in &mut spans {
                span.annotation_id = new_id.to_string();
            }
            self.spans.insert(new_id.to_string(), spans);
        }
    }

    /// Recompute the span projection from the current annotation set.
    fn rebuild_projection(&mut self) {
        self.spans.clear();

        let resolved: Vec<Option<Range<usize>>> = self
            .entries
            .iter()
            .map(|annotation| {
                let range = annotation.target.resolve(&self.document);
                if range.is_none() {
                    log::warn!(
                        "annotation '{}' anchor did not resolve; skipping render",
                        annotation.id
                    );
                }
                range
            })
            .collect();

        // Fragment boundaries: all resolved endpoints plus block boundaries.
        let mut cuts: BTreeSet<usize> = BTreeSet::new();
        for range in resolved.iter().flatten() {
            cuts.insert(range.start);
            cuts.insert(range.end);
            for newline in self.document.block_boundaries(range.start, range.end) {
                cuts.insert(newline);
                cuts.insert(newline + 1);
            }
        }

        for (idx, annotation) in self.entries.iter().enumerate() {
            let Some(range) = resolved[idx].clone() else {
                continue;
            };
            let color = annotation.highlight_color();

            let mut points: Vec<usize> = Vec::with_capacity(4);
            points.push(range.start);
            points.extend(
                cuts.range((Excluded(range.start), Excluded(range.end)))
                    .copied(),
            );
            points.push(range.end);

            let mut fragments = Vec::new();
            for window in points.windows(2) {
                let (start, end) = (window[0], window[1]);
                if start >= end || self.document.slice(start, end) == "\n" {
                    continue;
                }

                // Depth: how many earlier-rendered annotations cover this fragment.
                let depth = resolved[..idx]
                    .iter()
                    .flatten()
                    .filter(|r| r.start <= start && end <= r.end)
                    .count();

                fragments.push(Span {
                    annotation_id: annotation.id.clone(),
                    start,
                    end,
                    color,
                    depth,
                });
            }

            self.spans.insert(annotation.id.clone(), fragments);
        }
    }
}
