//! Synthetic document assembled from interactive cells.
//!
//! A language server only understands files, so the interactive window feeds
//! it one synthetic buffer: every committed cell in submission order, each
//! after the first separated by a single `\n`, followed by the free-input
//! zone where the user is currently typing.
//!
//! ```text
//! import sys            <- fragment "1"   [0, 10)
//! \nimport os           <- fragment "2"   [10, 20), separator included
//! \nsys.pa              <- free input, separator inserted on first edit
//! ```
//!
//! Every mutation returns the [`EditDelta`]s that turn the previous buffer
//! into the new one, so a consumer can stay in sync incrementally.

mod delta;
mod sync;

pub use delta::{EditDelta, EditorChange, EditorRange};
pub use sync::{ShadowNotification, ShadowSync};

use std::path::Path;
use std::str::FromStr;

use tower_lsp_server::ls_types::{Position, TextDocumentItem, Uri, VersionedTextDocumentIdentifier};
use url::Url;

use crate::error::{CellTrackError, CellTrackResult};
use crate::text::{PositionMapper, compute_line_starts, normalize_line_endings};

/// Default id of the free-input zone (the interactive window's edit cell).
pub const FREE_INPUT_ID: &str = "3D3AB152-ADC1-4501-B813-4B83B49B0C10";

/// Language id announced for the shadow document.
pub const DEFAULT_LANGUAGE_ID: &str = "python";

/// A committed cell's span in the shadow buffer.
///
/// The span includes the leading separator of every fragment but the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowFragment {
    id: String,
    start: usize,
    end: usize,
}

impl ShadowFragment {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    fn shift(&mut self, delta: isize) {
        self.start = self.start.saturating_add_signed(delta);
        self.end = self.end.saturating_add_signed(delta);
    }
}

/// The shadow buffer and its fragment bookkeeping.
#[derive(Debug, Clone)]
pub struct ShadowDocument {
    uri: Uri,
    language_id: String,
    free_input_id: String,
    version: i32,
    text: String,
    line_starts: Vec<usize>,
    fragments: Vec<ShadowFragment>,
    free_input_separated: bool,
}

/// Where a cell editor's coordinates land in the buffer.
#[derive(Debug, Clone, Copy)]
enum Zone {
    Fragment(usize),
    FreeInput,
}

impl ShadowDocument {
    pub fn new(uri: Uri) -> Self {
        Self {
            uri,
            language_id: DEFAULT_LANGUAGE_ID.to_string(),
            free_input_id: FREE_INPUT_ID.to_string(),
            version: 0,
            text: String::new(),
            line_starts: compute_line_starts(""),
            fragments: Vec::new(),
            free_input_separated: false,
        }
    }

    /// Create a shadow document named after an absolute file path.
    pub fn from_path(path: &Path) -> CellTrackResult<Self> {
        let url = Url::from_file_path(path).map_err(|()| {
            CellTrackError::config(format!(
                "shadow document path must be absolute: {}",
                path.display()
            ))
        })?;
        let uri = Uri::from_str(url.as_str())
            .map_err(|err| CellTrackError::config(format!("invalid document URI {url}: {err}")))?;
        Ok(Self::new(uri))
    }

    pub fn with_language_id(mut self, language_id: impl Into<String>) -> Self {
        self.language_id = language_id.into();
        self
    }

    pub fn with_free_input_id(mut self, id: impl Into<String>) -> Self {
        self.free_input_id = id.into();
        self
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    pub fn free_input_id(&self) -> &str {
        &self.free_input_id
    }

    /// Incremented once per mutating call.
    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn fragments(&self) -> &[ShadowFragment] {
        &self.fragments
    }

    /// The text typed into the free-input zone, without its separator.
    pub fn free_input_text(&self) -> &str {
        &self.text[self.free_input_start().min(self.text.len())..]
    }

    /// Offset where the free-input zone's content starts.
    pub fn free_input_start(&self) -> usize {
        self.committed_end() + usize::from(self.free_input_separated)
    }

    fn committed_end(&self) -> usize {
        self.fragments.last().map_or(0, |fragment| fragment.end)
    }

    fn mapper(&self) -> PositionMapper<'_> {
        PositionMapper::with_line_starts(&self.text, &self.line_starts)
    }

    /// Byte offset of a buffer position; positions past the end clamp to it.
    pub fn offset_at(&self, position: Position) -> usize {
        self.mapper()
            .position_to_byte(position)
            .unwrap_or(self.text.len())
    }

    /// Buffer position of a byte offset; offsets past the end clamp to it.
    pub fn position_at(&self, offset: usize) -> Position {
        let mapper = self.mapper();
        mapper
            .byte_to_position(offset.min(self.text.len()))
            .unwrap_or_default()
    }

    /// Add a cell, or replace it when `id` was added before.
    ///
    /// New cells go after the last committed cell and before the free-input
    /// zone.
    pub fn add_fragment(&mut self, text: &str, id: &str) -> EditDelta {
        self.version += 1;
        let normalized = normalize_line_endings(text);

        match self.fragments.iter().position(|fragment| fragment.id == id) {
            Some(index) => self.replace_fragment(index, &normalized),
            None => self.append_fragment(&normalized, id),
        }
    }

    fn append_fragment(&mut self, text: &str, id: &str) -> EditDelta {
        let at = self.committed_end();
        let new_text = if self.fragments.is_empty() {
            text.to_string()
        } else {
            format!("\n{text}")
        };
        let len = new_text.len();

        let delta = self.replace_span(at, at, new_text);
        self.fragments.push(ShadowFragment {
            id: id.to_string(),
            start: at,
            end: at + len,
        });

        log::trace!(
            target: "celltrack::shadow",
            "Added cell {} at {}..{}",
            id,
            at,
            at + len
        );
        delta
    }

    fn replace_fragment(&mut self, index: usize, text: &str) -> EditDelta {
        let ShadowFragment { start, end, .. } = self.fragments[index];
        let new_text = if index == 0 {
            text.to_string()
        } else {
            format!("\n{text}")
        };
        let diff = new_text.len() as isize - (end - start) as isize;
        let new_end = start + new_text.len();

        let delta = self.replace_span(start, end, new_text);
        self.fragments[index].end = new_end;
        for fragment in &mut self.fragments[index + 1..] {
            fragment.shift(diff);
        }
        delta
    }

    /// Apply cell-editor changes addressed to `id`.
    ///
    /// `id` names either a committed cell or the free-input zone; changes for
    /// any other id are dropped. Coordinates are 1-based and relative to the
    /// addressed zone. The first change ever made to the free-input zone also
    /// inserts the `\n` that separates it from the committed cells.
    pub fn edit_free_input(&mut self, changes: &[EditorChange], id: &str) -> Vec<EditDelta> {
        if changes.is_empty() {
            return Vec::new();
        }
        let zone = match self.zone(id) {
            Ok(zone) => zone,
            Err(err) => {
                log::debug!(target: "celltrack::shadow", "Dropping edit: {}", err);
                return Vec::new();
            }
        };

        self.version += 1;
        changes
            .iter()
            .map(|change| {
                let text = normalize_line_endings(&change.text).into_owned();
                match zone {
                    Zone::Fragment(index) => self.edit_fragment(index, change.range, text),
                    Zone::FreeInput => self.edit_free_zone(change.range, text),
                }
            })
            .collect()
    }

    fn zone(&self, id: &str) -> CellTrackResult<Zone> {
        if let Some(index) = self.fragments.iter().position(|fragment| fragment.id == id) {
            Ok(Zone::Fragment(index))
        } else if id == self.free_input_id {
            Ok(Zone::FreeInput)
        } else {
            Err(CellTrackError::unknown_cell(id))
        }
    }

    /// Offset where a zone's content starts, after any separator.
    fn zone_start(&self, zone: Zone) -> usize {
        match zone {
            Zone::Fragment(index) => {
                let fragment = &self.fragments[index];
                fragment.start + usize::from(index > 0)
            }
            Zone::FreeInput => self.free_input_start(),
        }
    }

    fn edit_free_zone(&mut self, range: EditorRange, text: String) -> EditDelta {
        let zone_start = self.free_input_start();
        let from = self
            .resolve(zone_start, range.start_line_number, range.start_column)
            .max(zone_start);
        let to = self
            .resolve(zone_start, range.end_line_number, range.end_column)
            .max(from);

        if self.free_input_separated {
            self.replace_span(from, to, text)
        } else {
            // Nothing has been typed yet, so from == to == committed end
            self.free_input_separated = true;
            self.replace_span(from, to, format!("\n{text}"))
        }
    }

    fn edit_fragment(&mut self, index: usize, range: EditorRange, text: String) -> EditDelta {
        let zone_start = self.zone_start(Zone::Fragment(index));
        let zone_end = self.fragments[index].end;
        let from = self
            .resolve(zone_start, range.start_line_number, range.start_column)
            .clamp(zone_start, zone_end);
        let to = self
            .resolve(zone_start, range.end_line_number, range.end_column)
            .clamp(from, zone_end);
        let diff = text.len() as isize - (to - from) as isize;

        let delta = self.replace_span(from, to, text);
        let fragment = &mut self.fragments[index];
        fragment.end = fragment.end.saturating_add_signed(diff);
        for fragment in &mut self.fragments[index + 1..] {
            fragment.shift(diff);
        }
        delta
    }

    /// Translate 1-based zone-relative coordinates to a buffer offset.
    fn resolve(&self, zone_start: usize, line_number: u32, column: u32) -> usize {
        let position = self.zone_position(zone_start, line_number, column);
        self.offset_at(position)
    }

    fn zone_position(&self, zone_start: usize, line_number: u32, column: u32) -> Position {
        let origin = self.position_at(zone_start);
        let line_delta = line_number.saturating_sub(1);
        let character = if line_delta == 0 {
            origin.character.saturating_add(column.saturating_sub(1))
        } else {
            column.saturating_sub(1)
        };
        Position {
            line: origin.line.saturating_add(line_delta),
            character,
        }
    }

    /// Map 1-based free-input coordinates to a 0-based buffer position.
    pub fn position_from_free_input_relative(&self, line_number: u32, column: u32) -> Position {
        self.zone_position(self.free_input_start(), line_number, column)
    }

    /// Map 1-based coordinates in the editor for `id` to a buffer position.
    ///
    /// Unknown ids only lose their 1-based offset.
    pub fn to_document_position(&self, id: &str, line_number: u32, column: u32) -> Position {
        match self.zone(id) {
            Ok(zone) => self.zone_position(self.zone_start(zone), line_number, column),
            Err(_) => Position {
                line: line_number.saturating_sub(1),
                character: column.saturating_sub(1),
            },
        }
    }

    /// Replace `[start, end)` and return the delta describing it.
    ///
    /// Line starts are recomputed from scratch; buffers are notebook sized.
    fn replace_span(&mut self, start: usize, end: usize, text: String) -> EditDelta {
        let range = self
            .mapper()
            .byte_range_to_range(start, end)
            .unwrap_or_default();
        let delta = EditDelta::new(range, start, &self.text[start..end], text);

        self.text.replace_range(start..end, &delta.text);
        self.line_starts = compute_line_starts(&self.text);
        delta
    }

    /// The `didOpen` payload for the current buffer.
    pub fn text_document_item(&self) -> TextDocumentItem {
        TextDocumentItem {
            uri: self.uri.clone(),
            language_id: self.language_id.clone(),
            version: self.version,
            text: self.text.clone(),
        }
    }

    pub fn versioned_identifier(&self) -> VersionedTextDocumentIdentifier {
        VersionedTextDocumentIdentifier {
            uri: self.uri.clone(),
            version: self.version,
        }
    }
}
