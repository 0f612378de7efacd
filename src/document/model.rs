use tower_lsp_server::ls_types::TextDocumentContentChangeEvent;

use crate::document::{ChangeSpan, apply_content_change};

/// A host document as the editor last reported it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    text: String,
}

impl Document {
    pub fn new(text: String) -> Self {
        Self { text }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Apply one editor change, returning what it replaced.
    pub fn apply_change(&mut self, change: &TextDocumentContentChangeEvent) -> ChangeSpan {
        let (text, span) = apply_content_change(&self.text, change);
        self.text = text;
        span
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
