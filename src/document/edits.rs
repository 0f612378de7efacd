//! Applying LSP content changes to document text.
//!
//! The LSP protocol supports two text synchronization modes:
//! - **Incremental**: Client sends only the changed ranges
//! - **Full**: Client sends the entire document content
//!
//! Both are resolved to a [`ChangeSpan`] in byte offsets of the pre-edit
//! text, which is what range tracking works with.

use tower_lsp_server::ls_types::TextDocumentContentChangeEvent;

use crate::text::{PositionMapper, count_line_breaks};

/// A content change resolved against the text it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeSpan {
    /// Byte offset where the replaced region starts
    pub start: usize,
    /// Byte offset where the replaced region ends, in pre-edit text
    pub old_end: usize,
    /// Byte offset where the inserted text ends, in post-edit text
    pub new_end: usize,
    /// Line breaks inserted minus line breaks removed
    pub line_delta: i32,
}

impl ChangeSpan {
    /// Length in bytes of the replaced region
    pub fn old_len(&self) -> usize {
        self.old_end - self.start
    }

    /// Length in bytes of the inserted text
    pub fn new_len(&self) -> usize {
        self.new_end - self.start
    }

    /// Net change in document length
    pub fn byte_delta(&self) -> isize {
        self.new_end as isize - self.old_end as isize
    }
}

/// Resolve a change to byte offsets `[start, end)` in `text`.
///
/// Positions past the end of the document clamp to its end, and an inverted
/// range collapses to its start. A change without a range covers everything.
pub fn resolve_change(text: &str, change: &TextDocumentContentChangeEvent) -> (usize, usize) {
    match change.range {
        Some(range) => {
            let mapper = PositionMapper::new(text);
            let start = mapper.position_to_byte(range.start).unwrap_or(text.len());
            let end = mapper.position_to_byte(range.end).unwrap_or(text.len());
            (start, end.max(start))
        }
        None => (0, text.len()),
    }
}

/// Apply one content change to `old_text`.
///
/// Returns the updated text and the span describing what was replaced.
pub fn apply_content_change(
    old_text: &str,
    change: &TextDocumentContentChangeEvent,
) -> (String, ChangeSpan) {
    let (start, old_end) = resolve_change(old_text, change);
    let removed = &old_text[start..old_end];

    let span = ChangeSpan {
        start,
        old_end,
        new_end: start + change.text.len(),
        line_delta: count_line_breaks(&change.text) as i32 - count_line_breaks(removed) as i32,
    };

    let mut text = String::with_capacity(old_text.len() - removed.len() + change.text.len());
    text.push_str(&old_text[..start]);
    text.push_str(&change.text);
    text.push_str(&old_text[old_end..]);

    (text, span)
}

/// Apply content changes in order, each against the result of the previous.
pub fn apply_content_changes(
    old_text: &str,
    content_changes: &[TextDocumentContentChangeEvent],
) -> String {
    let mut text = old_text.to_string();
    for change in content_changes {
        text = apply_content_change(&text, change).0;
    }
    text
}
