use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "clipring";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Keep the history across restarts.
    pub persistent: bool,
    /// Maximum number of entries retained.
    pub history_length: u32,
    /// Fuzzy rather than word-prefix matching for queries.
    pub fuzzy: bool,
    pub data_dir: PathBuf,
    pub poll_interval_ms: u64,
    /// Clipboard texts larger than this are not recorded. 0 = no limit.
    pub max_entry_size_kib: u32,
    /// Run after setting the clipboard to paste, e.g. `["xdotool", "key", "ctrl+v"]`.
    pub paste_command: Vec<String>,
    pub snippets_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(APP_NAME);

        Self {
            persistent: false,
            history_length: 100,
            fuzzy: false,
            data_dir,
            poll_interval_ms: 500,
            max_entry_size_kib: 0,
            paste_command: Vec::new(),
            snippets_dir: None,
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_default()
            .join(APP_NAME)
            .join("config.toml")
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Reads the config at `path`, writing the defaults there first if the
    /// file does not exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config: Self = toml::from_str(&content)
                .with_context(|| format!("Invalid config {}", path.display()))?;
            Ok(config.normalized())
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn history_file(&self) -> PathBuf {
        self.data_dir.join(crate::persist::HISTORY_FILE_NAME)
    }

    pub fn max_entry_bytes(&self) -> usize {
        self.max_entry_size_kib as usize * 1024
    }

    fn normalized(mut self) -> Self {
        self.history_length = self.history_length.max(1);
        self
    }
}
