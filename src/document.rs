//! Mirror of the host editor's open documents.
//!
//! The tracker needs the text of a file both before and after each edit, so it
//! keeps its own copy of every open document and applies the same content
//! changes the editor reports.

pub mod edits;
pub(crate) mod model;
pub mod store;

// Re-export main types
pub use edits::{ChangeSpan, apply_content_change, apply_content_changes, resolve_change};
pub use model::Document;
pub use store::DocumentStore;
