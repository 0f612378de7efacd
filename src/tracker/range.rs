//! Tracked ranges of executed code.

use std::path::PathBuf;

use serde::Serialize;

use crate::document::ChangeSpan;
use crate::text::{PositionMapper, cell_hash, count_line_breaks};

/// Where a previously executed cell currently lives in its source file.
///
/// Offsets are UTF-8 byte offsets into the current document text; lines are
/// 0-based. `end_offset` sits at the end of `end_line` including its line
/// break, so `source_text` always covers whole lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedRange {
    hash: String,
    line: u32,
    end_line: u32,
    start_offset: usize,
    end_offset: usize,
    execution_count: u32,
    #[serde(skip)]
    code: String,
    #[serde(skip)]
    source_text: String,
    #[serde(skip)]
    deleted: bool,
}

impl TrackedRange {
    /// Locate `code` at `start_line` of `document_text`.
    ///
    /// Lines past the end of the document clamp to its last line.
    pub(crate) fn locate(
        document_text: &str,
        start_line: u32,
        code: &str,
        execution_count: u32,
    ) -> Self {
        let mapper = PositionMapper::new(document_text);
        let last_line = mapper.line_count() - 1;
        let line = (start_line as usize).min(last_line);
        let end_line = (line + count_line_breaks(code)).min(last_line);

        let start_offset = mapper.line_start(line).unwrap_or(document_text.len());
        let end_offset = mapper
            .line_end_including_break(end_line)
            .unwrap_or(document_text.len());

        Self {
            hash: cell_hash(code),
            line: line as u32,
            end_line: end_line as u32,
            start_offset,
            end_offset,
            execution_count,
            code: code.to_string(),
            source_text: document_text[start_offset..end_offset].to_string(),
            deleted: false,
        }
    }

    /// Content fingerprint of the submitted code
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// First line of the range (0-based)
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Last line of the range (0-based, inclusive)
    pub fn end_line(&self) -> u32 {
        self.end_line
    }

    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    pub fn execution_count(&self) -> u32 {
        self.execution_count
    }

    /// The code as submitted for execution
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The document text the range covered when it was recorded
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Adjust for one edit. `applied_text` is the document after the edit.
    ///
    /// Returns true when a deleted range came back, which may break the
    /// line ordering of the list holding it.
    pub(crate) fn apply_change(&mut self, span: &ChangeSpan, applied_text: &str) -> bool {
        if self.deleted {
            return self.try_resurrect(applied_text);
        }

        if self.end_offset < span.start {
            // Entirely before the change
        } else if self.start_offset >= span.old_end {
            self.line = self.line.saturating_add_signed(span.line_delta);
            self.end_line = self.end_line.saturating_add_signed(span.line_delta);
            self.start_offset = self.start_offset.saturating_add_signed(span.byte_delta());
            self.end_offset = self.end_offset.saturating_add_signed(span.byte_delta());
        } else {
            log::trace!(
                target: "celltrack::tracker",
                "Cell {} (lines {}-{}) invalidated by edit at {}..{}",
                self.hash,
                self.line,
                self.end_line,
                span.start,
                span.old_end
            );
            self.deleted = true;
        }
        false
    }

    /// First textual occurrence wins when the text appears more than once.
    fn try_resurrect(&mut self, applied_text: &str) -> bool {
        if self.source_text.is_empty() {
            return false;
        }
        let Some(index) = applied_text.find(&self.source_text) else {
            return false;
        };

        let line_span = self.end_line - self.line;
        self.deleted = false;
        self.start_offset = index;
        self.end_offset = index + self.source_text.len();
        self.line = count_line_breaks(&applied_text[..index]) as u32;
        self.end_line = self.line.saturating_add(line_span);

        log::debug!(
            target: "celltrack::tracker",
            "Cell {} reappeared at line {}",
            self.hash,
            self.line
        );
        true
    }
}

/// Live ranges of one file, as handed to the debugger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileHashes {
    pub file: PathBuf,
    pub hashes: Vec<TrackedRange>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::apply_content_change;
    use tower_lsp_server::ls_types::{Position, Range, TextDocumentContentChangeEvent};

    const DOC: &str = "import os\nx = 1\nprint('bar')\ny = 2\n";

    fn edit(
        text: &str,
        start: (u32, u32),
        end: (u32, u32),
        new_text: &str,
    ) -> (String, ChangeSpan) {
        let change = TextDocumentContentChangeEvent {
            range: Some(Range {
                start: Position {
                    line: start.0,
                    character: start.1,
                },
                end: Position {
                    line: end.0,
                    character: end.1,
                },
            }),
            range_length: None,
            text: new_text.to_string(),
        };
        apply_content_change(text, &change)
    }

    #[test]
    fn test_locate_single_line() {
        let range = TrackedRange::locate(DOC, 2, "print('bar')", 1);

        assert_eq!(range.line(), 2);
        assert_eq!(range.end_line(), 2);
        assert_eq!(range.start_offset(), 16);
        assert_eq!(range.end_offset(), 29);
        assert_eq!(range.source_text(), "print('bar')\n");
        assert_eq!(range.hash(), cell_hash("print('bar')"));
        assert!(!range.is_deleted());
    }

    #[test]
    fn test_locate_clamps_past_end() {
        let range = TrackedRange::locate("a\nb", 10, "b\nc\nd", 1);

        assert_eq!(range.line(), 1);
        assert_eq!(range.end_line(), 1);
        assert_eq!(range.source_text(), "b");
    }

    #[test]
    fn test_edit_before_shifts() {
        let mut range = TrackedRange::locate(DOC, 2, "print('bar')", 1);
        let (text, span) = edit(DOC, (0, 0), (0, 0), "# header\n\n");

        assert!(!range.apply_change(&span, &text));
        assert_eq!(range.line(), 4);
        assert_eq!(range.end_line(), 4);
        assert_eq!(range.start_offset(), 26);
        assert_eq!(&text[range.start_offset()..range.end_offset()], "print('bar')\n");
    }

    #[test]
    fn test_edit_after_leaves_range() {
        let mut range = TrackedRange::locate(DOC, 2, "print('bar')", 1);
        let before = range.clone();
        let (text, span) = edit(DOC, (3, 4), (3, 5), "3");

        range.apply_change(&span, &text);
        assert_eq!(range, before);
    }

    #[test]
    fn test_edit_at_start_of_next_line_counts_as_overlap() {
        // end_offset includes the trailing line break, so the next line's
        // first character is not "entirely after" the range
        let mut range = TrackedRange::locate(DOC, 2, "print('bar')", 1);
        let (text, span) = edit(DOC, (3, 0), (3, 0), "z");

        range.apply_change(&span, &text);
        assert!(range.is_deleted());
    }

    #[test]
    fn test_overlapping_edit_deletes() {
        let mut range = TrackedRange::locate(DOC, 2, "print('bar')", 1);
        let (text, span) = edit(DOC, (2, 6), (2, 11), "'baz'");

        range.apply_change(&span, &text);
        assert!(range.is_deleted());
    }

    #[test]
    fn test_resurrect_keeps_line_span_and_count() {
        let doc = "a\nb\nc\n";
        let mut range = TrackedRange::locate(doc, 1, "b\nc", 7);
        let (text, span) = edit(doc, (1, 0), (1, 1), "B");
        range.apply_change(&span, &text);
        assert!(range.is_deleted());

        let (text, span) = edit(&text, (0, 0), (0, 0), "b\nc\n");
        assert!(range.apply_change(&span, &text));
        assert!(!range.is_deleted());
        assert_eq!(range.line(), 0);
        assert_eq!(range.end_line(), 1);
        assert_eq!(range.start_offset(), 0);
        assert_eq!(range.end_offset(), 4);
        assert_eq!(range.execution_count(), 7);
    }

    #[test]
    fn test_serialized_shape() {
        let range = TrackedRange::locate(DOC, 2, "print('bar')", 3);
        let value = serde_json::to_value(&range).unwrap();

        assert_eq!(value["line"], 2);
        assert_eq!(value["endLine"], 2);
        assert_eq!(value["executionCount"], 3);
        assert!(value.get("sourceText").is_none());
        assert!(value.get("deleted").is_none());
    }
}
