//! Mapping between LSP positions and byte offsets.
//!
//! Buffers in this crate are Rust strings, so every stored offset is a UTF-8
//! byte offset. LSP positions count characters in UTF-16 code units; the
//! conversion happens here and nowhere else.

use std::borrow::Cow;

use tower_lsp_server::ls_types::{Position, Range};

/// Position mapper over one snapshot of text.
///
/// Line starts are either computed on construction or borrowed from a caller
/// that keeps them up to date itself (see `ShadowDocument`).
pub struct PositionMapper<'a> {
    text: &'a str,
    line_starts: Cow<'a, [usize]>,
}

impl<'a> PositionMapper<'a> {
    /// Create a mapper, computing line starts from scratch.
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            line_starts: Cow::Owned(compute_line_starts(text)),
        }
    }

    /// Create a mapper over line starts that are already known to match `text`.
    pub fn with_line_starts(text: &'a str, line_starts: &'a [usize]) -> Self {
        Self {
            text,
            line_starts: Cow::Borrowed(line_starts),
        }
    }

    /// Number of lines. A trailing line break opens a final empty line.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset where `line` starts.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Byte offset where `line` ends, excluding its line break.
    pub fn line_end(&self, line: usize) -> Option<usize> {
        self.line_start(line)?;
        Some(match self.line_starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.text.len(),
        })
    }

    /// Byte offset where `line` ends, including its line break when it has one.
    pub fn line_end_including_break(&self, line: usize) -> Option<usize> {
        self.line_start(line)?;
        Some(
            self.line_starts
                .get(line + 1)
                .copied()
                .unwrap_or(self.text.len()),
        )
    }

    /// Line containing the byte `offset`. Offsets past the end map to the last line.
    pub fn line_of_offset(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        }
    }

    /// Convert an LSP position to a byte offset.
    ///
    /// Returns `None` when the line does not exist. A character past the end
    /// of its line is clamped to the line end.
    pub fn position_to_byte(&self, position: Position) -> Option<usize> {
        let line = position.line as usize;
        let line_start = self.line_start(line)?;
        let line_end = self.line_end(line)?;
        let line_text = &self.text[line_start..line_end];

        match convert_utf16_to_byte_in_line(line_text, position.character as usize) {
            Some(byte_offset) => Some(line_start + byte_offset),
            None => Some(line_end),
        }
    }

    /// Convert a byte offset to an LSP position.
    ///
    /// Offsets inside a multi-byte character snap back to the character start.
    pub fn byte_to_position(&self, offset: usize) -> Option<Position> {
        if offset > self.text.len() {
            return None;
        }

        let line = self.line_of_offset(offset);
        let line_start = self.line_start(line)?;
        let line_end = self.line_end(line)?;
        let line_text = &self.text[line_start..line_end];
        let line_offset = offset - line_start;

        let character = match convert_byte_to_utf16_in_line(line_text, line_offset) {
            Some(utf16_offset) => utf16_offset,
            None => {
                let mut valid_offset = line_offset.min(line_text.len());
                loop {
                    if let Some(utf16) = convert_byte_to_utf16_in_line(line_text, valid_offset) {
                        break utf16;
                    }
                    if valid_offset == 0 {
                        break 0;
                    }
                    valid_offset -= 1;
                }
            }
        };

        Some(Position {
            line: line as u32,
            character: character as u32,
        })
    }

    /// Convert a byte range to an LSP range.
    pub fn byte_range_to_range(&self, start: usize, end: usize) -> Option<Range> {
        Some(Range {
            start: self.byte_to_position(start)?,
            end: self.byte_to_position(end)?,
        })
    }
}

/// Compute line start offsets for efficient position mapping
pub fn compute_line_starts(text: &str) -> Vec<usize> {
    let mut line_starts = vec![0];
    line_starts.extend(text.match_indices('\n').map(|(index, _)| index + 1));
    line_starts
}

/// Number of `\n` characters in `text`.
#[inline]
pub fn count_line_breaks(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}

/// Drop carriage returns so every buffer uses `\n` line endings.
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace('\r', ""))
    } else {
        Cow::Borrowed(text)
    }
}

/// Convert UTF-16 position to byte position within a line
/// Returns None if the UTF-16 position is invalid
#[inline(always)]
pub fn convert_utf16_to_byte_in_line(line_text: &str, utf16_pos: usize) -> Option<usize> {
    let mut byte_offset = 0;
    let mut utf16_offset = 0;

    for ch in line_text.chars() {
        if utf16_offset >= utf16_pos {
            return Some(byte_offset);
        }
        utf16_offset += ch.len_utf16();
        byte_offset += ch.len_utf8();
    }

    if utf16_offset == utf16_pos {
        Some(byte_offset)
    } else {
        // Position is beyond the end of the line
        None
    }
}

/// Convert byte position to UTF-16 position within a line
/// Returns None if the byte position is invalid (e.g., in the middle of a multi-byte character)
#[inline(always)]
pub fn convert_byte_to_utf16_in_line(line_text: &str, byte_pos: usize) -> Option<usize> {
    let mut utf16_offset = 0;
    let mut byte_count = 0;

    for ch in line_text.chars() {
        if byte_count == byte_pos {
            return Some(utf16_offset);
        }
        let ch_bytes = ch.len_utf8();
        if byte_count + ch_bytes > byte_pos {
            return None;
        }
        byte_count += ch_bytes;
        utf16_offset += ch.len_utf16();
    }

    if byte_count == byte_pos {
        Some(utf16_offset)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn pos(line: u32, character: u32) -> Position {
        Position { line, character }
    }

    #[test]
    fn test_compute_line_starts() {
        assert_eq!(compute_line_starts(""), vec![0]);
        assert_eq!(compute_line_starts("a\nbc\n"), vec![0, 2, 5]);
    }

    #[test]
    fn test_line_bounds() {
        let mapper = PositionMapper::new("ab\ncd\nef");
        assert_eq!(mapper.line_count(), 3);
        assert_eq!(mapper.line_end(0), Some(2));
        assert_eq!(mapper.line_end_including_break(0), Some(3));
        assert_eq!(mapper.line_end(2), Some(8));
        assert_eq!(mapper.line_end_including_break(2), Some(8));
        assert_eq!(mapper.line_end(3), None);
    }

    #[rstest]
    #[case::start_of_text(pos(0, 0), Some(0))]
    #[case::second_line(pos(1, 1), Some(4))]
    #[case::past_line_end_clamps(pos(0, 99), Some(2))]
    #[case::missing_line(pos(7, 0), None)]
    fn test_position_to_byte(#[case] position: Position, #[case] expected: Option<usize>) {
        let mapper = PositionMapper::new("ab\ncd\nef");
        assert_eq!(mapper.position_to_byte(position), expected);
    }

    #[test]
    fn test_position_round_trip_with_surrogate_pairs() {
        // "😀" is 4 bytes in UTF-8 and 2 code units in UTF-16
        let text = "x = '😀'\ny";
        let mapper = PositionMapper::new(text);
        let byte = mapper.position_to_byte(pos(0, 7)).unwrap();
        assert_eq!(&text[byte..byte + 1], "'");
        assert_eq!(mapper.byte_to_position(byte), Some(pos(0, 7)));
    }

    #[test]
    fn test_byte_to_position_inside_multibyte_char_snaps_back() {
        let mapper = PositionMapper::new("é!");
        assert_eq!(mapper.byte_to_position(1), Some(pos(0, 0)));
        assert_eq!(mapper.byte_to_position(2), Some(pos(0, 1)));
    }

    #[test]
    fn test_byte_to_position_past_end_is_none() {
        let mapper = PositionMapper::new("abc");
        assert_eq!(mapper.byte_to_position(3), Some(pos(0, 3)));
        assert_eq!(mapper.byte_to_position(4), None);
    }

    #[test]
    fn test_with_line_starts_borrows() {
        let text = "a\nb";
        let starts = compute_line_starts(text);
        let mapper = PositionMapper::with_line_starts(text, &starts);
        assert_eq!(mapper.byte_range_to_range(0, 3).unwrap().end, pos(1, 1));
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb"), "a\nb");
        assert!(matches!(normalize_line_endings("a\nb"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_count_line_breaks() {
        assert_eq!(count_line_breaks("no breaks"), 0);
        assert_eq!(count_line_breaks("a\nb\n"), 2);
    }
}
