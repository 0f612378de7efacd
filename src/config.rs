//! Layered configuration: user file < project file < host overrides.

mod settings;
pub mod user;

pub use settings::{CellSettings, Settings, ShadowSettings, merge_all, merge_settings};
pub use user::{load_user_config, user_config_path};

use serde_json::Value;
use std::fs;
use std::path::Path;

/// Name of the project config file, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "celltrack.toml";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsEventKind {
    Info,
    Warning,
}

/// Something worth reporting about how settings were loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsEvent {
    pub kind: SettingsEventKind,
    pub message: String,
}

impl SettingsEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: SettingsEventKind::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: SettingsEventKind::Warning,
            message: message.into(),
        }
    }

    /// Forward to the `log` facade.
    pub fn log(&self) {
        match self.kind {
            SettingsEventKind::Info => log::info!(target: "celltrack::config", "{}", self.message),
            SettingsEventKind::Warning => {
                log::warn!(target: "celltrack::config", "{}", self.message)
            }
        }
    }
}

#[derive(Default, Debug)]
pub struct SettingsLoadOutcome {
    pub settings: Settings,
    pub events: Vec<SettingsEvent>,
}

/// Load and merge every configuration layer.
///
/// Unreadable or malformed layers are skipped with a warning event, so this
/// always produces usable settings.
pub fn load_settings(root_path: Option<&Path>, override_settings: Option<Value>) -> SettingsLoadOutcome {
    let mut events = Vec::new();

    let user_config = match load_user_config() {
        Ok(Some(settings)) => {
            events.push(SettingsEvent::info("Loaded user config"));
            Some(settings)
        }
        Ok(None) => None,
        Err(err) => {
            events.push(SettingsEvent::warning(format!(
                "Failed to load user config: {}",
                err
            )));
            None
        }
    };

    let project_settings =
        root_path.and_then(|root| load_toml_settings(&root.join(PROJECT_CONFIG_FILE), &mut events));

    let override_settings = override_settings.and_then(|value| {
        match serde_json::from_value::<Settings>(value) {
            Ok(settings) => Some(settings),
            Err(err) => {
                events.push(SettingsEvent::warning(format!(
                    "Failed to parse settings override: {}",
                    err
                )));
                None
            }
        }
    });

    let settings = merge_all(&[user_config, project_settings, override_settings]).unwrap_or_default();
    SettingsLoadOutcome { settings, events }
}

/// Load one TOML settings file, recording what happened in `events`.
pub fn load_toml_settings(config_path: &Path, events: &mut Vec<SettingsEvent>) -> Option<Settings> {
    if !config_path.exists() {
        return None;
    }

    match fs::read_to_string(config_path) {
        Ok(contents) => match toml::from_str::<Settings>(&contents) {
            Ok(settings) => {
                events.push(SettingsEvent::info(format!(
                    "Loaded {}",
                    config_path.display()
                )));
                Some(settings)
            }
            Err(err) => {
                events.push(SettingsEvent::warning(format!(
                    "Failed to parse {}: {}",
                    config_path.display(),
                    err
                )));
                None
            }
        },
        Err(err) => {
            events.push(SettingsEvent::warning(format!(
                "Failed to read {}: {}",
                config_path.display(),
                err
            )));
            None
        }
    }
}
