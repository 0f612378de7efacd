//! Content fingerprints for executed cells.
//!
//! The debugger integration identifies a cell by a short SHA-1 prefix of the
//! code that was sent to the kernel, so the same digest has to be produced on
//! both sides of that boundary.

use sha1::{Digest, Sha1};

/// Number of hex characters kept from the SHA-1 digest.
pub const CELL_HASH_LEN: usize = 12;

/// Compute the fingerprint of a cell's code.
///
/// # Example
///
/// ```
/// use celltrack::text::cell_hash;
///
/// assert_eq!(cell_hash("abc"), "a9993e364706");
/// assert_eq!(cell_hash("abc").len(), 12);
/// ```
pub fn cell_hash(code: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(code.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..CELL_HASH_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_hash_deterministic() {
        let code = "print('bar')";
        assert_eq!(cell_hash(code), cell_hash(code));
    }

    #[test]
    fn test_cell_hash_different_inputs() {
        assert_ne!(cell_hash("import sys"), cell_hash("import os"));
    }

    #[test]
    fn test_cell_hash_empty_string() {
        // SHA-1 of the empty string is da39a3ee5e6b4b0d3255bfef95601890afd80709
        assert_eq!(cell_hash(""), "da39a3ee5e6b");
    }

    #[test]
    fn test_cell_hash_known_value() {
        // SHA-1("hello world") = 2aae6c35c94fcfb415dbe95f408b9ce91ee846ed
        assert_eq!(cell_hash("hello world"), "2aae6c35c94f");
    }

    #[test]
    fn test_cell_hash_is_lowercase_hex() {
        let hash = cell_hash("日本語");
        assert_eq!(hash.len(), CELL_HASH_LEN);
        assert!(
            hash.chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }
}
