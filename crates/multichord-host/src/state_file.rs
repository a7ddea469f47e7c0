//! Persisted parameter state (JSON)

use std::path::Path;

use anyhow::Context;
use multichord_core::{MultiChord, ParameterSnapshot};
use tracing::info;

pub fn load_state(path: &Path, plugin: &MultiChord) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading state {}", path.display()))?;
    let snapshot: ParameterSnapshot = serde_json::from_str(&text)
        .with_context(|| format!("parsing state {}", path.display()))?;
    plugin
        .restore_state(&snapshot)
        .with_context(|| format!("restoring state {}", path.display()))?;
    Ok(())
}

pub fn save_state(path: &Path, plugin: &MultiChord) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(&plugin.save_state())?;
    std::fs::write(path, text).with_context(|| format!("writing state {}", path.display()))?;
    info!(path = %path.display(), "Parameter state saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use multichord_core::Preset;

    use super::*;

    #[test]
    fn test_state_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let plugin = MultiChord::default();
        plugin.load_preset(Preset::MajorTriad);
        plugin.set_parameter(60, 0.5);
        save_state(&path, &plugin).unwrap();

        let restored = MultiChord::default();
        load_state(&path, &restored).unwrap();
        assert_eq!(restored.parameter(1), 4.0);
        assert_eq!(restored.parameter(60), 0.5);
    }

    #[test]
    fn test_voice_mismatch_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        save_state(&path, &MultiChord::new(2)).unwrap();

        let err = load_state(&path, &MultiChord::default()).unwrap_err();
        assert!(format!("{err:#}").contains("2 voices"));
    }
}
