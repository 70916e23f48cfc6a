use std::path::{Path, PathBuf};

use super::config::EngineConfig;

const SETTINGS_DIR: &str = ".zview";
const SETTINGS_FILE: &str = "setting.json";

pub fn get_settings_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
}

/// Writes the default settings to `path` unless the file already exists.
pub fn ensure_settings_file(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    if !path.exists() {
        let content = serde_json::to_string_pretty(&EngineConfig::default())
            .unwrap_or_else(|_| "{}".to_string());
        std::fs::write(path, content)?;
    }
    Ok(())
}

pub fn load_settings(path: &Path) -> std::io::Result<EngineConfig> {
    let data = std::fs::read_to_string(path)?;
    EngineConfig::from_json_str(&data)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// Loads `path`, writing the defaults there first when it is missing.
pub fn load_or_create_settings(path: &Path) -> std::io::Result<EngineConfig> {
    ensure_settings_file(path)?;
    load_settings(path)
}

/// Settings from the default location, created on first use. Falls back to
/// defaults when the file cannot be written or parsed.
pub fn load_default_settings() -> EngineConfig {
    let Some(path) = get_settings_path() else {
        return EngineConfig::default();
    };
    match load_or_create_settings(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "load settings failed");
            EngineConfig::default()
        }
    }
}

fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        return std::env::var("APPDATA").ok().map(PathBuf::from);
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg));
        }
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config"))
    }
}
