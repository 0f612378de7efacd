//! Text manipulation utilities.
//!
//! This module provides utilities for working with text content:
//! - Position mapping between LSP (UTF-16) and byte offsets
//! - Content hashing for executed cells

mod hash;
pub mod position;

pub use hash::{CELL_HASH_LEN, cell_hash};
pub use position::{
    PositionMapper, compute_line_starts, convert_byte_to_utf16_in_line,
    convert_utf16_to_byte_in_line, count_line_breaks, normalize_line_endings,
};
