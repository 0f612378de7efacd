//! Messages a host forwards to an [`InteractiveSession`](super::InteractiveSession).
//!
//! Both enums are adjacently tagged JSON so a host can pass its own messages
//! through unchanged:
//!
//! ```json
//! {"message": "remoteAddCode", "payload": {"code": "x = 1", "file": "/w/foo.py", "line": 2, "id": "c1"}}
//! {"event": "change", "data": {"file": "/w/foo.py", "changes": [...]}}
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tower_lsp_server::ls_types::TextDocumentContentChangeEvent;

use crate::shadow::EditorChange;

/// Why the kernel reported its system info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SysInfoReason {
    Start,
    Restart,
    Interrupt,
    New,
    Connect,
}

/// Messages from the interactive window.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "message", content = "payload", rename_all = "camelCase")]
pub enum InteractiveMessage {
    /// Code is about to run. `line` is where it starts in `file`.
    RemoteAddCode {
        code: String,
        file: PathBuf,
        line: u32,
        id: String,
    },
    /// A cell was committed to the interactive window.
    AddCell {
        text: String,
        file: PathBuf,
        id: String,
    },
    /// The user typed in the input box or a committed cell.
    EditCell {
        changes: Vec<EditorChange>,
        id: String,
    },
    RestartKernel,
    AddedSysInfo {
        #[serde(rename = "type")]
        kind: SysInfoReason,
    },
}

/// Everything a host reports: editor document events and window messages.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum HostEvent {
    Open {
        file: PathBuf,
        text: String,
    },
    Change {
        file: PathBuf,
        changes: Vec<TextDocumentContentChangeEvent>,
    },
    Close {
        file: PathBuf,
    },
    Message(InteractiveMessage),
}
