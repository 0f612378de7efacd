//! Source ranges of executed cells, kept current under edits.
//!
//! The tracker answers "which lines of `foo.py` hold the code that ran as
//! execution N" right before a debug session starts. It mirrors the open
//! documents so it can resolve each editor change against the text it was
//! made to, and walks the file's range list once per change:
//!
//! - ranges entirely before the change stay put
//! - ranges entirely after it shift by the line and byte delta
//! - any overlap marks the range deleted (partial overlaps are not merged)
//! - deleted ranges come back when their original text reappears verbatim

mod range;

pub use range::{FileHashes, TrackedRange};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tower_lsp_server::ls_types::TextDocumentContentChangeEvent;

use crate::document::DocumentStore;
use crate::error::{CellTrackError, CellTrackResult};

/// Per-file lists of executed cell ranges.
///
/// Every public operation is infallible from the caller's point of view:
/// events for files that are not open are ignored.
#[derive(Debug, Default)]
pub struct CellRangeTracker {
    documents: DocumentStore,
    ranges: HashMap<PathBuf, Vec<TrackedRange>>,
}

impl CellRangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start mirroring a document the editor opened.
    pub fn did_open(&mut self, file: impl Into<PathBuf>, text: impl Into<String>) {
        self.documents.open(file.into(), text.into());
    }

    /// Stop mirroring a document. Its ranges are kept.
    pub fn did_close(&mut self, file: &Path) {
        self.documents.close(file);
    }

    /// The mirrored documents.
    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    /// Record that `code`, starting at `start_line` of `file`, was executed.
    ///
    /// The new range goes before the first range that starts on a later line.
    /// Recording the same code twice yields two ranges.
    pub fn record_fragment(
        &mut self,
        file: &Path,
        start_line: u32,
        code: &str,
        execution_count: u32,
    ) {
        if let Err(err) = self.try_record_fragment(file, start_line, code, execution_count) {
            log::debug!(
                target: "celltrack::tracker",
                "Not tracking cell {}: {}",
                execution_count,
                err
            );
        }
    }

    fn try_record_fragment(
        &mut self,
        file: &Path,
        start_line: u32,
        code: &str,
        execution_count: u32,
    ) -> CellTrackResult<()> {
        let document = self
            .documents
            .get(file)
            .ok_or_else(|| CellTrackError::document_not_found(file.display().to_string()))?;

        let range = TrackedRange::locate(document.text(), start_line, code, execution_count);
        let list = self.ranges.entry(file.to_path_buf()).or_default();
        let index = list
            .iter()
            .position(|existing| existing.line() > range.line())
            .unwrap_or(list.len());

        log::debug!(
            target: "celltrack::tracker",
            "Tracking cell {} ({}) at lines {}-{} of {}",
            execution_count,
            range.hash(),
            range.line(),
            range.end_line(),
            file.display()
        );
        list.insert(index, range);
        Ok(())
    }

    /// Apply one editor change to `file`, adjusting its ranges.
    ///
    /// Changes must arrive in the order the editor made them.
    pub fn on_document_changed(&mut self, file: &Path, change: &TextDocumentContentChangeEvent) {
        let Some(document) = self.documents.get_mut(file) else {
            log::trace!(
                target: "celltrack::tracker",
                "Ignoring change to unopened document {}",
                file.display()
            );
            return;
        };

        let span = document.apply_change(change);

        if let Some(list) = self.ranges.get_mut(file) {
            let mut resurrected = false;
            for range in list.iter_mut() {
                resurrected |= range.apply_change(&span, document.text());
            }
            if resurrected {
                list.sort_by_key(TrackedRange::line);
            }
        }
    }

    /// Apply a batch of editor changes in order.
    pub fn on_document_changes(&mut self, file: &Path, changes: &[TextDocumentContentChangeEvent]) {
        for change in changes {
            self.on_document_changed(file, change);
        }
    }

    /// Live ranges of `file`, ascending by line.
    pub fn tracked_ranges(&self, file: &Path) -> Vec<&TrackedRange> {
        self.ranges
            .get(file)
            .map(|list| list.iter().filter(|range| !range.is_deleted()).collect())
            .unwrap_or_default()
    }

    /// Live ranges of every file that has at least one, sorted by file.
    pub fn file_hashes(&self) -> Vec<FileHashes> {
        let mut hashes: Vec<FileHashes> = self
            .ranges
            .iter()
            .map(|(file, list)| FileHashes {
                file: file.clone(),
                hashes: list.iter().filter(|r| !r.is_deleted()).cloned().collect(),
            })
            .filter(|entry| !entry.hashes.is_empty())
            .collect();
        hashes.sort_by(|a, b| a.file.cmp(&b.file));
        hashes
    }

    /// Forget every range recorded for `file`.
    pub fn reset(&mut self, file: &Path) {
        self.ranges.remove(file);
    }

    /// Forget every range of every file.
    pub fn reset_all(&mut self) {
        self.ranges.clear();
    }
}
