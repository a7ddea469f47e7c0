//! User configuration (`<config dir>/multichord/config.toml`)

use std::path::{Path, PathBuf};

use multichord_core::DEFAULT_VOICES;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    /// Parameter state loaded before rendering, if present
    #[serde(default)]
    pub state_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Chord voices per pitch class
    pub voices: usize,
    /// Samples per processing block
    pub block_size: u32,
    /// Program loaded at startup when the session names none
    pub program: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            voices: DEFAULT_VOICES,
            block_size: 256,
            program: "Default".to_string(),
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("multichord")
        .join("config.toml")
}

/// Read the config, falling back to defaults when it is missing or invalid
pub fn load_config(path: &Path) -> AppConfig {
    let Ok(text) = std::fs::read_to_string(path) else {
        return AppConfig::default();
    };
    match toml::from_str(&text) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring invalid config");
            AppConfig::default()
        }
    }
}

pub fn save_config(path: &Path, config: &AppConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(config)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: AppConfig = toml::from_str("[engine]\nvoices = 6\n").unwrap();
        assert_eq!(config.engine.voices, 6);
        assert_eq!(config.engine.block_size, 256);
        assert_eq!(config.engine.program, "Default");
        assert_eq!(config.state_path, None);
    }

    #[test]
    fn test_missing_or_broken_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_config(&dir.path().join("absent.toml")), AppConfig::default());

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "engine = [").unwrap();
        assert_eq!(load_config(&broken), AppConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = AppConfig {
            engine: EngineConfig { voices: 3, block_size: 64, program: "Minor triad".into() },
            state_path: Some(PathBuf::from("/tmp/state.json")),
        };
        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path), config);
    }
}
