//! One interactive window's view of executed code.
//!
//! The session routes host events to the range tracker and the shadow
//! document and owns the execution counter both of them key off.

mod message;

pub use message::{HostEvent, InteractiveMessage, SysInfoReason};

use std::path::Path;

use crate::cells::CellMatcher;
use crate::config::Settings;
use crate::shadow::{ShadowDocument, ShadowNotification, ShadowSync};
use crate::tracker::{CellRangeTracker, FileHashes};

/// File name the interactive window uses for code typed directly into it.
pub const EMPTY_FILE_NAME: &str = "2DB9B899-6519-4E1B-88B0-FA728A274115";

#[derive(Debug)]
pub struct InteractiveSession {
    matcher: CellMatcher,
    tracker: CellRangeTracker,
    shadow: ShadowSync,
    execution_count: u32,
}

impl InteractiveSession {
    pub fn new(shadow: ShadowDocument) -> Self {
        Self::with_matcher(shadow, CellMatcher::default())
    }

    pub fn with_matcher(shadow: ShadowDocument, matcher: CellMatcher) -> Self {
        Self {
            matcher,
            tracker: CellRangeTracker::new(),
            shadow: ShadowSync::new(shadow),
            execution_count: 0,
        }
    }

    /// Build a session configured by `settings`.
    pub fn from_settings(shadow: ShadowDocument, settings: &Settings) -> Self {
        let mut shadow = shadow;
        if let Some(language_id) = &settings.shadow.language_id {
            shadow = shadow.with_language_id(language_id.clone());
        }
        if let Some(free_input_id) = &settings.shadow.free_input_id {
            shadow = shadow.with_free_input_id(free_input_id.clone());
        }
        Self::with_matcher(shadow, CellMatcher::from_settings(&settings.cells))
    }

    pub fn tracker(&self) -> &CellRangeTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut CellRangeTracker {
        &mut self.tracker
    }

    pub fn shadow(&self) -> &ShadowDocument {
        self.shadow.document()
    }

    /// Number of code cells executed so far. Kernel restarts do not reset it.
    pub fn execution_count(&self) -> u32 {
        self.execution_count
    }

    /// Live ranges of every file, for the debugger.
    pub fn file_hashes(&self) -> Vec<FileHashes> {
        self.tracker.file_hashes()
    }

    /// Handle one host event. Returns the notification for the language
    /// server, if the event changed the shadow document.
    pub fn dispatch(&mut self, event: HostEvent) -> Option<ShadowNotification> {
        match event {
            HostEvent::Open { file, text } => {
                self.tracker.did_open(file, text);
                None
            }
            HostEvent::Change { file, changes } => {
                self.tracker.on_document_changes(&file, &changes);
                None
            }
            HostEvent::Close { file } => {
                self.tracker.did_close(&file);
                None
            }
            HostEvent::Message(message) => self.handle(message),
        }
    }

    /// Handle one interactive window message.
    pub fn handle(&mut self, message: InteractiveMessage) -> Option<ShadowNotification> {
        match message {
            InteractiveMessage::RemoteAddCode {
                code, file, line, ..
            } => {
                self.about_to_add_code(&code, &file, line);
                None
            }
            InteractiveMessage::AddCell { text, id, .. } => self.shadow.add_fragment(&text, &id),
            InteractiveMessage::EditCell { changes, id } => self.shadow.edit(&changes, &id),
            InteractiveMessage::RestartKernel => {
                log::debug!(target: "celltrack::session", "Kernel restarted, clearing hashes");
                self.tracker.reset_all();
                None
            }
            InteractiveMessage::AddedSysInfo { kind } => {
                if kind != SysInfoReason::Interrupt {
                    log::debug!(
                        target: "celltrack::session",
                        "Kernel {:?}, clearing hashes",
                        kind
                    );
                    self.tracker.reset_all();
                }
                None
            }
        }
    }

    fn about_to_add_code(&mut self, code: &str, file: &Path, line: u32) {
        if code.is_empty() || file.as_os_str().is_empty() {
            return;
        }
        // Markdown cells never execute; only the first code cell counts
        let Some(cell) = self.matcher.first_code_cell(code, line) else {
            return;
        };

        self.execution_count += 1;
        if file != Path::new(EMPTY_FILE_NAME) {
            self.tracker
                .record_fragment(file, cell.line, &cell.source, self.execution_count);
        }
    }
}
