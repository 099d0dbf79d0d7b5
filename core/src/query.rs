//! Turns a history snapshot into query results.
//!
//! Results keep the history order and carry their rank (position in the
//! whole history, starting at 1) in the subtitle. Nothing happens while
//! matching; side effects only run when an [`Action`] is invoked.

use crate::clipboard::ClipboardSink;
use crate::history::{Entry, HistoryStore};
use crate::matcher::{MatchConfig, Matcher};
use crate::snippets::SnippetSink;
use chrono::{DateTime, Local};
use log::{debug, warn};
use std::fmt;
use std::sync::{Arc, Weak};

pub const HANDLER_ID: &str = "clipboard";

pub const ACTION_COPY_PASTE: &str = "c";
pub const ACTION_COPY: &str = "cp";
pub const ACTION_REMOVE: &str = "r";
pub const ACTION_SNIPPET: &str = "s";

const DATETIME_FORMAT: &str = "%A, %-d %B %Y %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Icon {
    Grapheme(&'static str),
}

pub struct Action {
    pub id: &'static str,
    pub text: &'static str,
    run: Box<dyn Fn() + Send + Sync>,
}

impl Action {
    fn new(id: &'static str, text: &'static str, run: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            id,
            text,
            run: Box::new(run),
        }
    }

    pub fn run(&self) {
        debug!("Running action {}", self.id);
        (self.run)();
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.id)
            .field("text", &self.text)
            .finish()
    }
}

#[derive(Debug)]
pub struct Item {
    pub id: &'static str,
    pub text: String,
    pub subtitle: String,
    pub icon: Icon,
    pub rank: usize,
    pub score: f64,
    pub actions: Vec<Action>,
}

impl Item {
    pub fn action(&self, id: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.id == id)
    }
}

/// Collaborators the result actions call into.
#[derive(Clone)]
pub struct QueryContext {
    pub store: Arc<HistoryStore>,
    pub clipboard: Arc<dyn ClipboardSink>,
    /// Optional; may disappear between building results and running them.
    pub snippets: Option<Weak<dyn SnippetSink>>,
}

/// Matches `query` against a fresh snapshot of the context's store.
pub fn items(query: &str, config: MatchConfig, ctx: &QueryContext) -> Vec<Item> {
    let snapshot = ctx.store.snapshot();
    items_from(&Matcher::new(query, config), &snapshot, ctx)
}

pub fn items_from(matcher: &Matcher, snapshot: &[Entry], ctx: &QueryContext) -> Vec<Item> {
    snapshot
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let m = matcher.match_text(&entry.text)?;
            Some(Item {
                id: HANDLER_ID,
                text: entry.text.clone(),
                subtitle: format!("#{} {}", i + 1, format_datetime(entry.timestamp)),
                icon: Icon::Grapheme("📋"),
                rank: i + 1,
                score: m.score,
                actions: build_actions(&entry.text, ctx),
            })
        })
        .collect()
}

fn build_actions(text: &str, ctx: &QueryContext) -> Vec<Action> {
    let mut actions = Vec::with_capacity(4);

    if ctx.clipboard.supports_paste() {
        let clipboard = Arc::clone(&ctx.clipboard);
        let t = text.to_string();
        actions.push(Action::new(ACTION_COPY_PASTE, "Copy and paste", move || {
            if let Err(e) = clipboard.set_text_and_paste(&t) {
                warn!("Copy and paste failed: {:#}", e);
            }
        }));
    }

    let clipboard = Arc::clone(&ctx.clipboard);
    let t = text.to_string();
    actions.push(Action::new(ACTION_COPY, "Copy", move || {
        if let Err(e) = clipboard.set_text(&t) {
            warn!("Copy failed: {:#}", e);
        }
    }));

    let store = Arc::clone(&ctx.store);
    let t = text.to_string();
    actions.push(Action::new(ACTION_REMOVE, "Remove", move || {
        store.remove(&t);
    }));

    if let Some(snippets) = ctx.snippets.as_ref().filter(|w| w.strong_count() > 0) {
        let snippets = Weak::clone(snippets);
        let t = text.to_string();
        actions.push(Action::new(ACTION_SNIPPET, "Save as snippet", move || {
            let Some(sink) = snippets.upgrade() else {
                debug!("Snippet sink went away, nothing saved");
                return;
            };
            if let Err(e) = sink.add_snippet(&t) {
                warn!("Saving snippet failed: {:#}", e);
            }
        }));
    }

    actions
}

/// Long, local-time rendering of a record timestamp.
pub fn format_datetime(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(dt) => dt.with_timezone(&Local).format(DATETIME_FORMAT).to_string(),
        None => timestamp.to_string(),
    }
}
