use crate::history::HistoryStore;
use anyhow::{Context, Result};
use arboard::Clipboard;
use log::debug;
use parking_lot::Mutex;
use std::process::Command;

/// Where clipboard text comes from.
pub trait ClipboardSource: Send + Sync {
    /// Current clipboard text, `None` when it holds no text (images etc).
    fn text(&self) -> Option<String>;
}

/// Where copy actions put text.
pub trait ClipboardSink: Send + Sync {
    fn set_text(&self, text: &str) -> Result<()>;

    /// Whether [`ClipboardSink::set_text_and_paste`] does more than copy.
    fn supports_paste(&self) -> bool {
        false
    }

    fn set_text_and_paste(&self, text: &str) -> Result<()> {
        self.set_text(text)
    }
}

/// The system clipboard through arboard.
///
/// Pasting is simulated by running `paste_command` (for example
/// `xdotool key ctrl+v`) right after the text is set; an empty command
/// means the platform has no paste support.
pub struct SystemClipboard {
    clipboard: Mutex<Clipboard>,
    paste_command: Vec<String>,
}

impl SystemClipboard {
    pub fn new(paste_command: Vec<String>) -> Result<Self> {
        let clipboard = Clipboard::new().context("Failed to initialize clipboard")?;
        Ok(Self {
            clipboard: Mutex::new(clipboard),
            paste_command,
        })
    }
}

impl ClipboardSource for SystemClipboard {
    fn text(&self) -> Option<String> {
        // another thread is writing; the next poll will catch up
        let mut clipboard = self.clipboard.try_lock()?;
        clipboard.get_text().ok()
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        self.clipboard
            .lock()
            .set_text(text.to_string())
            .context("Failed to set clipboard text")
    }

    fn supports_paste(&self) -> bool {
        !self.paste_command.is_empty()
    }

    fn set_text_and_paste(&self, text: &str) -> Result<()> {
        self.set_text(text)?;

        let Some((program, args)) = self.paste_command.split_first() else {
            return Ok(());
        };
        let status = Command::new(program)
            .args(args)
            .status()
            .with_context(|| format!("Failed to run paste command {}", program))?;
        if !status.success() {
            anyhow::bail!("Paste command {} exited with {}", program, status);
        }
        Ok(())
    }
}

/// Feeds clipboard changes into the history.
///
/// Text is recorded only when it differs from what the previous check saw,
/// so removing the current clipboard text from the history sticks until
/// the user copies something else.
pub struct ClipboardWatcher {
    last_text: Option<String>,
    max_entry_bytes: usize,
}

impl ClipboardWatcher {
    /// `max_entry_bytes` of zero disables the size limit.
    pub fn new(max_entry_bytes: usize) -> Self {
        Self {
            last_text: None,
            max_entry_bytes,
        }
    }

    /// Returns whether a new entry was recorded.
    pub fn check(&mut self, source: &dyn ClipboardSource, store: &HistoryStore) -> bool {
        let Some(text) = source.text() else {
            return false;
        };

        if text.trim().is_empty() || self.last_text.as_deref() == Some(text.as_str()) {
            return false;
        }

        if self.max_entry_bytes > 0 && text.len() > self.max_entry_bytes {
            debug!("Skipping clipboard text of {} bytes", text.len());
            self.last_text = Some(text);
            return false;
        }

        let inserted = store.insert(&text);
        self.last_text = Some(text);
        inserted
    }
}
