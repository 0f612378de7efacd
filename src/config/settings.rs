use serde::{Deserialize, Serialize};

/// Cell marker patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellSettings {
    pub code_regex: Option<String>,
    pub markdown_regex: Option<String>,
}

/// How the shadow document presents itself to the language server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShadowSettings {
    pub language_id: Option<String>,
    pub free_input_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub cells: CellSettings,
    pub shadow: ShadowSettings,
}

/// Merge two optional settings, preferring values from `primary`.
pub fn merge_settings(fallback: Option<Settings>, primary: Option<Settings>) -> Option<Settings> {
    match (fallback, primary) {
        (None, None) => None,
        (Some(settings), None) => Some(settings),
        (None, Some(settings)) => Some(settings),
        (Some(fallback), Some(primary)) => Some(Settings {
            cells: CellSettings {
                code_regex: primary.cells.code_regex.or(fallback.cells.code_regex),
                markdown_regex: primary.cells.markdown_regex.or(fallback.cells.markdown_regex),
            },
            shadow: ShadowSettings {
                language_id: primary.shadow.language_id.or(fallback.shadow.language_id),
                free_input_id: primary.shadow.free_input_id.or(fallback.shadow.free_input_id),
            },
        }),
    }
}

/// Merge layers in order; later layers take precedence.
pub fn merge_all(layers: &[Option<Settings>]) -> Option<Settings> {
    layers
        .iter()
        .cloned()
        .fold(None, |merged, layer| merge_settings(merged, layer))
}
