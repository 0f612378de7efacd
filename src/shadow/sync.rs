//! Turning shadow-document deltas into LSP notifications.

use serde::Serialize;
use serde_json::{Value, json};
use tower_lsp_server::ls_types::{
    DidChangeTextDocumentParams, DidOpenTextDocumentParams, TextDocumentContentChangeEvent,
};

use super::{EditDelta, EditorChange, ShadowDocument};

/// A notification to forward to the language server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ShadowNotification {
    DidOpen(DidOpenTextDocumentParams),
    DidChange(DidChangeTextDocumentParams),
}

impl ShadowNotification {
    /// The LSP method name.
    pub fn method(&self) -> &'static str {
        match self {
            ShadowNotification::DidOpen(_) => "textDocument/didOpen",
            ShadowNotification::DidChange(_) => "textDocument/didChange",
        }
    }

    /// The full JSON-RPC notification.
    pub fn into_message(self) -> Value {
        json!({
            "jsonrpc": "2.0",
            "method": self.method(),
            "params": self,
        })
    }
}

/// A shadow document plus whether the server has seen it yet.
///
/// The server learns about the document lazily: the first mutation that
/// produces any delta opens it with the full text, every later one sends the
/// deltas as an incremental change.
#[derive(Debug, Clone)]
pub struct ShadowSync {
    document: ShadowDocument,
    opened: bool,
}

impl ShadowSync {
    pub fn new(document: ShadowDocument) -> Self {
        Self {
            document,
            opened: false,
        }
    }

    pub fn document(&self) -> &ShadowDocument {
        &self.document
    }

    /// Whether `didOpen` has been produced.
    pub fn is_opened(&self) -> bool {
        self.opened
    }

    pub fn add_fragment(&mut self, text: &str, id: &str) -> Option<ShadowNotification> {
        let delta = self.document.add_fragment(text, id);
        self.notify(vec![delta])
    }

    pub fn edit(&mut self, changes: &[EditorChange], id: &str) -> Option<ShadowNotification> {
        let deltas = self.document.edit_free_input(changes, id);
        self.notify(deltas)
    }

    fn notify(&mut self, deltas: Vec<EditDelta>) -> Option<ShadowNotification> {
        if deltas.is_empty() {
            return None;
        }

        if !self.opened {
            self.opened = true;
            log::debug!(
                target: "celltrack::shadow",
                "Opening {} at version {}",
                self.document.uri().as_str(),
                self.document.version()
            );
            return Some(ShadowNotification::DidOpen(DidOpenTextDocumentParams {
                text_document: self.document.text_document_item(),
            }));
        }

        let content_changes: Vec<TextDocumentContentChangeEvent> =
            deltas.into_iter().map(Into::into).collect();
        Some(ShadowNotification::DidChange(DidChangeTextDocumentParams {
            text_document: self.document.versioned_identifier(),
            content_changes,
        }))
    }
}
