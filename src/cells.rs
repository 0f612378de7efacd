//! Splitting submitted code into cells.
//!
//! A submission may hold several cells separated by marker comments such as
//! `# %%` or `# In[3]`. Markdown markers are checked before code markers
//! because `# %% [markdown]` also matches the generic code marker.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::config::CellSettings;
use crate::error::CellTrackResult;

pub const DEFAULT_CODE_MARKER: &str = r"^(#\s*%%|#\s*<codecell>|#\s*In\[\d*?\]|#\s*In\[ \])";
pub const DEFAULT_MARKDOWN_MARKER: &str = r"^(#\s*%%\s*\[markdown\]|#\s*<markdowncell>)";

static DEFAULT_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_CODE_MARKER).expect("default code marker is valid"));
static DEFAULT_MARKDOWN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(DEFAULT_MARKDOWN_MARKER).expect("default markdown marker is valid")
});

/// Strips the comment prefix off markdown cell lines.
static MARKDOWN_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s?").expect("markdown comment pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Code,
    Markdown,
}

/// One cell of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub kind: CellKind,
    /// Line of the cell's first line in the source file (0-based)
    pub line: u32,
    pub source: String,
}

/// Recognizes cell marker lines.
#[derive(Debug, Clone)]
pub struct CellMatcher {
    code: Regex,
    markdown: Regex,
}

impl Default for CellMatcher {
    fn default() -> Self {
        Self {
            code: DEFAULT_CODE_REGEX.clone(),
            markdown: DEFAULT_MARKDOWN_REGEX.clone(),
        }
    }
}

impl CellMatcher {
    /// Compile custom markers. `None` keeps the default for that marker.
    pub fn new(code: Option<&str>, markdown: Option<&str>) -> CellTrackResult<Self> {
        let code = match code {
            Some(pattern) => Regex::new(pattern)?,
            None => DEFAULT_CODE_REGEX.clone(),
        };
        let markdown = match markdown {
            Some(pattern) => Regex::new(pattern)?,
            None => DEFAULT_MARKDOWN_REGEX.clone(),
        };
        Ok(Self { code, markdown })
    }

    /// Build from settings, falling back to the defaults on a bad pattern.
    pub fn from_settings(settings: &CellSettings) -> Self {
        match Self::new(
            settings.code_regex.as_deref(),
            settings.markdown_regex.as_deref(),
        ) {
            Ok(matcher) => matcher,
            Err(err) => {
                log::warn!(
                    target: "celltrack::cells",
                    "Using default cell markers: {}",
                    err
                );
                Self::default()
            }
        }
    }

    /// Kind of cell a marker line starts, if it is a marker at all.
    pub fn marker_kind(&self, line: &str) -> Option<CellKind> {
        let line = line.trim_start();
        if self.markdown.is_match(line) {
            Some(CellKind::Markdown)
        } else if self.code.is_match(line) {
            Some(CellKind::Code)
        } else {
            None
        }
    }

    pub fn is_cell(&self, line: &str) -> bool {
        self.marker_kind(line).is_some()
    }

    /// Split `code`, whose first line is `start_line` of its file.
    ///
    /// Text before the first marker forms a code cell of its own. Code cells
    /// keep their marker line; markdown cells drop it along with the comment
    /// prefix of each line.
    pub fn split_cells(&self, code: &str, start_line: u32) -> Vec<Cell> {
        let mut cells: Vec<(CellKind, u32, Vec<&str>)> = Vec::new();

        for (index, line) in code.lines().enumerate() {
            let line_number = start_line.saturating_add(index as u32);
            match self.marker_kind(line) {
                Some(kind) => cells.push((kind, line_number, vec![line])),
                None => match cells.last_mut() {
                    Some((_, _, lines)) => lines.push(line),
                    None => cells.push((CellKind::Code, line_number, vec![line])),
                },
            }
        }

        cells
            .into_iter()
            .map(|(kind, line, lines)| Cell {
                kind,
                line,
                source: match kind {
                    CellKind::Code => lines.join("\n"),
                    CellKind::Markdown => lines[1..]
                        .iter()
                        .map(|line| MARKDOWN_COMMENT.replace(line, ""))
                        .collect::<Vec<_>>()
                        .join("\n"),
                }
                .trim_end_matches(['\r', '\n'])
                .to_string(),
            })
            .collect()
    }

    /// The first code cell of a submission, which is what gets executed.
    pub fn first_code_cell(&self, code: &str, start_line: u32) -> Option<Cell> {
        self.split_cells(code, start_line)
            .into_iter()
            .find(|cell| cell.kind == CellKind::Code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("# %%", Some(CellKind::Code))]
    #[case("#%% load data", Some(CellKind::Code))]
    #[case("# <codecell>", Some(CellKind::Code))]
    #[case("# In[12]", Some(CellKind::Code))]
    #[case("# In[ ]", Some(CellKind::Code))]
    #[case("# %% [markdown]", Some(CellKind::Markdown))]
    #[case("# <markdowncell>", Some(CellKind::Markdown))]
    #[case("    # %%", Some(CellKind::Code))]
    #[case("# a comment", None)]
    #[case("x = 1  # %%", None)]
    fn test_marker_kind(#[case] line: &str, #[case] expected: Option<CellKind>) {
        assert_eq!(CellMatcher::default().marker_kind(line), expected);
    }

    #[test]
    fn test_split_without_markers() {
        let cells = CellMatcher::default().split_cells("import os\nx = 1\n", 4);

        assert_eq!(
            cells,
            vec![Cell {
                kind: CellKind::Code,
                line: 4,
                source: "import os\nx = 1".to_string(),
            }]
        );
    }

    #[test]
    fn test_split_mixed_cells() {
        let code = "# %% [markdown]\n# # Title\n# text\n# %%\nprint(1)\n\n# %%\nprint(2)\n";
        let cells = CellMatcher::default().split_cells(code, 10);

        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0].kind, CellKind::Markdown);
        assert_eq!(cells[0].source, "# Title\ntext");
        assert_eq!((cells[1].kind, cells[1].line), (CellKind::Code, 13));
        assert_eq!(cells[1].source, "# %%\nprint(1)");
        assert_eq!(cells[2].line, 16);
    }

    #[test]
    fn test_line_numbers_saturate_at_max() {
        let cells = CellMatcher::default().split_cells("# %%\na\n# %%\nb", u32::MAX);

        assert_eq!(cells.len(), 2);
        assert!(cells.iter().all(|cell| cell.line == u32::MAX));
    }

    #[test]
    fn test_first_code_cell_skips_markdown() {
        let code = "# <markdowncell>\n# notes\n# <codecell>\nx = 1";
        let cell = CellMatcher::default().first_code_cell(code, 0).unwrap();

        assert_eq!(cell.line, 2);
        assert_eq!(cell.source, "# <codecell>\nx = 1");
    }

    #[test]
    fn test_markdown_only_submission_has_no_code_cell() {
        let matcher = CellMatcher::default();
        assert!(matcher.first_code_cell("# %% [markdown]\n# hi", 0).is_none());
    }

    #[test]
    fn test_custom_markers() {
        let matcher = CellMatcher::new(Some(r"^##\s*cell"), None).unwrap();
        assert_eq!(matcher.marker_kind("## cell"), Some(CellKind::Code));
        assert_eq!(matcher.marker_kind("# %%"), None);
    }

    #[test]
    fn test_bad_pattern_falls_back_to_defaults() {
        let settings = CellSettings {
            code_regex: Some("(".to_string()),
            markdown_regex: None,
        };
        let matcher = CellMatcher::from_settings(&settings);
        assert_eq!(matcher.marker_kind("# %%"), Some(CellKind::Code));
        assert!(CellMatcher::new(Some("("), None).is_err());
    }
}
