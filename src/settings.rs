use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;

/// Settings key for the selected synthesis voice.
pub const VOICE_KEY: &str = "voice_id";

/// Flat JSON key-value store for small persisted state (voice selection).
///
/// Every `set` is a read-modify-write of the whole file, so concurrent
/// writers are not supported - matching the single event-loop writer.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Self {
        SettingsStore { path }
    }

    fn load(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let contents = fs::read_to_string(&self.path).context("Failed to read settings file")?;
        let map: Map<String, Value> =
            serde_json::from_str(&contents).context("Failed to parse settings file")?;
        Ok(map)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.load()?;
        Ok(map.get(key).and_then(Value::as_str).map(str::to_string))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.load()?;
        map.insert(key.to_string(), Value::String(value.to_string()));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create settings directory")?;
        }
        let json = serde_json::to_string_pretty(&Value::Object(map))
            .context("Failed to serialize settings")?;
        fs::write(&self.path, json).context("Failed to write settings file")?;
        Ok(())
    }
}
