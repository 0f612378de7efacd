use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::document::Document;

// Open documents keyed by file path. Owned by a single tracker, so no
// interior locking.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<PathBuf, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `file`, replacing any document already open under that path.
    pub fn open(&mut self, file: PathBuf, text: String) {
        self.documents.insert(file, Document::new(text));
    }

    pub fn get(&self, file: &Path) -> Option<&Document> {
        self.documents.get(file)
    }

    pub fn get_mut(&mut self, file: &Path) -> Option<&mut Document> {
        self.documents.get_mut(file)
    }

    pub fn close(&mut self, file: &Path) -> Option<Document> {
        self.documents.remove(file)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_get_document() {
        let mut store = DocumentStore::new();
        let file = PathBuf::from("/work/foo.py");
        store.open(file.clone(), "hello world".to_string());

        let doc = store.get(&file).unwrap();
        assert_eq!(doc.text(), "hello world");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reopen_replaces_existing() {
        let mut store = DocumentStore::new();
        let file = PathBuf::from("/work/foo.py");
        store.open(file.clone(), "a".to_string());
        store.open(file.clone(), "b".to_string());

        assert_eq!(store.get(&file).map(Document::text), Some("b"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_close() {
        let mut store = DocumentStore::new();
        let file = PathBuf::from("/work/foo.py");
        store.open(file.clone(), "x".to_string());

        assert!(store.close(&file).is_some());
        assert!(store.get(&file).is_none());
        assert!(store.is_empty());
    }
}
