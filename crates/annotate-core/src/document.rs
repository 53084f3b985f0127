//! Normalized content text model.
//!
//! The engine never touches live markup. Instead it holds a normalized copy of the content
//! root's text and treats every rendered structure (highlight spans, selections) as a derived
//! projection over **character offsets** into this text. Offsets are Unicode scalar values
//! (`char`), not bytes.
//!
//! Blocks are delimited by `'\n'`: a highlight whose anchor crosses a newline is rendered as
//! one span fragment per block.

use ropey::Rope;
use unicode_segmentation::UnicodeSegmentation;

/// The normalized text of the annotated content root.
///
/// Wraps a rope for O(log n) offset/line conversions. The text is immutable for the lifetime
/// of the document; annotations anchor into it by character offset.
#[derive(Debug, Clone)]
pub struct Document {
    text: Rope,
}

impl Document {
    /// Create a document from the content root's normalized text.
    pub fn new(text: &str) -> Self {
        Self {
            text: Rope::from_str(text),
        }
    }

    /// Total character count.
    pub fn char_count(&self) -> usize {
        self.text.len_chars()
    }

    /// Returns `true` if the document contains no text.
    pub fn is_empty(&self) -> bool {
        self.text.len_chars() == 0
    }

    /// The full text as an owned string.
    pub fn text(&self) -> String {
        self.text.to_string()
    }

    /// Clamp a character offset into the valid range.
    pub fn clamp(&self, offset: usize) -> usize {
        offset.min(self.text.len_chars())
    }

    /// The text of the half-open character range `start..end`, clamped to the document.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = self.clamp(end);
        let start = start.min(end);
        self.text.slice(start..end).to_string()
    }

    /// Character offsets of every `'\n'` within `start..end` (clamped).
    ///
    /// These are the block boundaries a span fragment may not cross.
    pub fn block_boundaries(&self, start: usize, end: usize) -> Vec<usize> {
        let end = self.clamp(end);
        let start = start.min(end);
        self.text
            .slice(start..end)
            .chars()
            .enumerate()
            .filter(|(_, ch)| *ch == '\n')
            .map(|(i, _)| start + i)
            .collect()
    }

    /// The word containing `offset`, as a half-open character range.
    ///
    /// Word boundaries follow Unicode word segmentation of the containing block. Returns
    /// `None` when `offset` is out of bounds or falls on whitespace/newline.
    pub fn word_range_at(&self, offset: usize) -> Option<(usize, usize)> {
        if offset >= self.text.len_chars() {
            return None;
        }

        let line_idx = self.text.char_to_line(offset);
        let line_start = self.text.line_to_char(line_idx);
        let line: String = self.text.line(line_idx).to_string();
        let target = offset - line_start;

        let mut cursor = 0usize;
        for segment in line.split_word_bounds() {
            let seg_len = segment.chars().count();
            if target < cursor + seg_len {
                if segment.trim().is_empty() {
                    return None;
                }
                return Some((line_start + cursor, line_start + cursor + seg_len));
            }
            cursor += seg_len;
        }

        None
    }

    /// Character offset of the occurrence of `needle` nearest to `near`, if any.
    ///
    /// Used to re-resolve anchors by content when the recorded offsets no longer match.
    pub fn find_nearest(&self, needle: &str, near: usize) -> Option<usize> {
        if needle.is_empty() {
            return None;
        }

        let text = self.text.to_string();
        let mut best: Option<usize> = None;
        let mut char_idx = 0usize;
        let mut last_byte = 0usize;

        for (byte_idx, _) in text.match_indices(needle) {
            char_idx += text[last_byte..byte_idx].chars().count();
            last_byte = byte_idx;

            match best {
                Some(prev) if prev.abs_diff(near) <= char_idx.abs_diff(near) => {}
                _ => best = Some(char_idx),
            }
        }

        best
    }
}
