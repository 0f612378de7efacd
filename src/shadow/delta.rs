//! Edit descriptions flowing in and out of the shadow document.

use serde::{Deserialize, Serialize};
use tower_lsp_server::ls_types::{Range, TextDocumentContentChangeEvent};

/// One replacement applied to the shadow buffer.
///
/// `range` is in 0-based lines and UTF-16 characters of the buffer *before*
/// the edit, exactly as an incremental `didChange` expects. `range_offset`
/// and `range_length` are the same region in UTF-8 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditDelta {
    pub range: Range,
    pub range_offset: usize,
    pub range_length: usize,
    pub text: String,
    #[serde(skip)]
    replaced_utf16_len: u32,
}

impl EditDelta {
    pub(crate) fn new(range: Range, range_offset: usize, replaced: &str, text: String) -> Self {
        Self {
            range,
            range_offset,
            range_length: replaced.len(),
            text,
            replaced_utf16_len: replaced.encode_utf16().count() as u32,
        }
    }

    /// Whether this delta only inserts text.
    pub fn is_insert(&self) -> bool {
        self.range_length == 0
    }

    /// The protocol form of this delta.
    pub fn to_content_change(&self) -> TextDocumentContentChangeEvent {
        self.clone().into()
    }
}

impl From<EditDelta> for TextDocumentContentChangeEvent {
    fn from(delta: EditDelta) -> Self {
        TextDocumentContentChangeEvent {
            range: Some(delta.range),
            range_length: Some(delta.replaced_utf16_len),
            text: delta.text,
        }
    }
}

/// A 1-based range as reported by the cell editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorRange {
    pub start_line_number: u32,
    pub start_column: u32,
    pub end_line_number: u32,
    pub end_column: u32,
}

impl EditorRange {
    /// An empty range at a 1-based line and column.
    pub fn caret(line_number: u32, column: u32) -> Self {
        Self {
            start_line_number: line_number,
            start_column: column,
            end_line_number: line_number,
            end_column: column,
        }
    }
}

/// One change made in a cell editor, relative to that editor's content.
///
/// Extra fields the editor sends (`rangeOffset`, `rangeLength`) are ignored:
/// the range is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EditorChange {
    pub range: EditorRange,
    pub text: String,
}

impl EditorChange {
    pub fn new(range: EditorRange, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    /// Insert `text` at a 1-based line and column.
    pub fn insert(line_number: u32, column: u32, text: impl Into<String>) -> Self {
        Self::new(EditorRange::caret(line_number, column), text)
    }
}
