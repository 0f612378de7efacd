//! User configuration loading for celltrack.
//!
//! User config location: $XDG_CONFIG_HOME/celltrack/celltrack.toml
//! Fallback: the platform config directory (~/.config on Linux)

use std::fs;
use std::path::PathBuf;

use super::Settings;
use crate::error::CellTrackResult;

/// Returns the path to the user configuration file.
///
/// The path is determined by:
/// 1. If $XDG_CONFIG_HOME is set: $XDG_CONFIG_HOME/celltrack/celltrack.toml
/// 2. Otherwise: `dirs::config_dir()`/celltrack/celltrack.toml
///
/// Returns None if no config directory can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg_config) if !xdg_config.is_empty() => PathBuf::from(xdg_config),
        _ => dirs::config_dir()?,
    };
    Some(base.join("celltrack").join("celltrack.toml"))
}

/// Load the user config. A missing file is not an error.
pub fn load_user_config() -> CellTrackResult<Option<Settings>> {
    let Some(path) = user_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&path)?;
    Ok(Some(toml::from_str(&contents)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;

    fn with_xdg_config_home<T>(value: &std::path::Path, f: impl FnOnce() -> T) -> T {
        let original = env::var("XDG_CONFIG_HOME").ok();

        // SAFETY: env-mutating tests are serialized on xdg_env
        unsafe {
            env::set_var("XDG_CONFIG_HOME", value);
        }

        let result = f();

        // SAFETY: Same as above - restoring original env state
        unsafe {
            match original {
                Some(val) => env::set_var("XDG_CONFIG_HOME", val),
                None => env::remove_var("XDG_CONFIG_HOME"),
            }
        }
        result
    }

    #[test]
    #[serial(xdg_env)]
    fn user_config_path_uses_xdg_config_home_when_set() {
        let path = with_xdg_config_home(std::path::Path::new("/custom/config"), user_config_path);

        assert_eq!(
            path,
            Some(PathBuf::from("/custom/config/celltrack/celltrack.toml")),
            "should use XDG_CONFIG_HOME/celltrack/celltrack.toml"
        );
    }

    #[test]
    #[serial(xdg_env)]
    fn load_user_config_returns_none_without_file() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let loaded = with_xdg_config_home(dir.path(), load_user_config);

        assert!(matches!(loaded, Ok(None)));
    }

    #[test]
    #[serial(xdg_env)]
    fn load_user_config_parses_toml() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let config_dir = dir.path().join("celltrack");
        fs::create_dir_all(&config_dir).expect("failed to create config dir");
        fs::write(
            config_dir.join("celltrack.toml"),
            "[cells]\ncodeRegex = \"^# cell\"\n",
        )
        .expect("failed to write config");

        let loaded = with_xdg_config_home(dir.path(), load_user_config)
            .expect("config should parse")
            .expect("config should exist");

        assert_eq!(loaded.cells.code_regex.as_deref(), Some("^# cell"));
    }

    #[test]
    #[serial(xdg_env)]
    fn load_user_config_reports_parse_errors() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let config_dir = dir.path().join("celltrack");
        fs::create_dir_all(&config_dir).expect("failed to create config dir");
        fs::write(config_dir.join("celltrack.toml"), "[cells\n").expect("failed to write config");

        let loaded = with_xdg_config_home(dir.path(), load_user_config);
        assert!(loaded.is_err());
    }
}
