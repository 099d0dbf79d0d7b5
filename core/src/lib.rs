//! Bounded, deduplicated clipboard text history with word-prefix and fuzzy
//! queries.
//!
//! [`HistoryStore`] is the shared state: most recent entry first, unique
//! texts, never longer than its capacity. [`query::items`] matches a
//! snapshot of it and attaches copy/remove/snippet actions to each hit.
//! [`ClipboardManager`] adds settings and on-disk persistence, and
//! [`Daemon`] drives it all from the system clipboard and a unix socket.

pub mod clipboard;
pub mod config;
pub mod daemon;
pub mod history;
pub mod ipc;
pub mod manager;
pub mod matcher;
pub mod persist;
pub mod query;
pub mod snippets;

pub use clipboard::{ClipboardSink, ClipboardSource, ClipboardWatcher, SystemClipboard};
pub use config::Config;
pub use daemon::Daemon;
pub use history::{Entry, HistoryStore};
pub use ipc::{Request, Response};
pub use manager::ClipboardManager;
pub use matcher::{MatchConfig, Matcher};
pub use query::{Action, Item, QueryContext};
pub use snippets::{SnippetDir, SnippetSink};
