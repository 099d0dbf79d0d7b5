use crate::config::Config;
use crate::history::HistoryStore;
use crate::matcher::MatchConfig;
use crate::persist;
use anyhow::Result;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Owns the history together with the settings that govern it.
///
/// Setters apply the new value immediately and write it back to the config
/// file when one is attached. A failing write is logged, the in-memory value
/// still changes.
pub struct ClipboardManager {
    store: Arc<HistoryStore>,
    config: Mutex<Config>,
    config_path: Option<PathBuf>,
    store_history: AtomicBool,
    fuzzy: AtomicBool,
}

impl ClipboardManager {
    /// Builds the manager, restoring the stored history when persistence is
    /// enabled. Never fails: an unreadable history file means an empty one.
    pub fn new(config: Config, config_path: Option<PathBuf>) -> Self {
        let capacity = config.history_length.max(1) as usize;

        let store = if config.persistent {
            let entries = persist::load(&config.history_file());
            info!("Restored {} clipboard entries", entries.len());
            HistoryStore::with_entries(capacity, entries)
        } else {
            HistoryStore::new(capacity)
        };

        Self {
            store: Arc::new(store),
            store_history: AtomicBool::new(config.persistent),
            fuzzy: AtomicBool::new(config.fuzzy),
            config: Mutex::new(config),
            config_path,
        }
    }

    pub fn store(&self) -> &Arc<HistoryStore> {
        &self.store
    }

    pub fn config(&self) -> Config {
        self.config.lock().clone()
    }

    pub fn history_limit(&self) -> usize {
        self.store.capacity()
    }

    /// Zero is ignored; the history never goes below one entry.
    pub fn set_history_limit(&self, limit: u32) {
        if limit == 0 || limit as usize == self.store.capacity() {
            return;
        }

        self.store.resize(limit as usize);
        self.update_config(|c| c.history_length = limit);
    }

    pub fn store_history(&self) -> bool {
        self.store_history.load(Ordering::Acquire)
    }

    pub fn set_store_history(&self, enabled: bool) {
        if self.store_history.swap(enabled, Ordering::AcqRel) != enabled {
            self.update_config(|c| c.persistent = enabled);
        }
    }

    pub fn fuzzy_matching(&self) -> bool {
        self.fuzzy.load(Ordering::Acquire)
    }

    pub fn set_fuzzy_matching(&self, enabled: bool) {
        if self.fuzzy.swap(enabled, Ordering::AcqRel) != enabled {
            self.update_config(|c| c.fuzzy = enabled);
        }
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            fuzzy: self.fuzzy_matching(),
        }
    }

    pub fn history_file(&self) -> PathBuf {
        self.config.lock().history_file()
    }

    /// Writes the history file if persistence is on. Returns whether a
    /// file was written.
    pub fn save_history(&self) -> Result<bool> {
        if !self.store_history() {
            return Ok(false);
        }

        // copy out first, the lock is never held during I/O
        let entries = self.store.snapshot();
        persist::save(&self.history_file(), &entries)?;
        Ok(true)
    }

    /// Final persistence on teardown. Failures only cost the stored history.
    pub fn shutdown(&self) {
        match self.save_history() {
            Ok(true) => info!("Saved {} clipboard entries", self.store.len()),
            Ok(false) => debug!("History persistence disabled, discarding history"),
            Err(e) => warn!("Clipboard history not saved: {:#}", e),
        }
    }

    fn update_config(&self, apply: impl FnOnce(&mut Config)) {
        let mut config = self.config.lock();
        apply(&mut config);

        if let Some(path) = &self.config_path {
            if let Err(e) = config.save_to(path) {
                warn!("Failed to persist settings: {:#}", e);
            }
        }
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}
