use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

const MAX_NAME_CHARS: usize = 40;

/// Accepts text to keep as a reusable snippet.
pub trait SnippetSink: Send + Sync {
    fn add_snippet(&self, text: &str) -> Result<()>;
}

/// Stores each snippet as a `.txt` file in one directory, named after its
/// first line.
pub struct SnippetDir {
    dir: PathBuf,
}

impl SnippetDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn free_path(&self, stem: &str) -> PathBuf {
        let mut path = self.dir.join(format!("{}.txt", stem));
        let mut n = 1;
        while path.exists() {
            n += 1;
            path = self.dir.join(format!("{} {}.txt", stem, n));
        }
        path
    }
}

impl SnippetSink for SnippetDir {
    fn add_snippet(&self, text: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create snippet dir {}", self.dir.display()))?;

        let path = self.free_path(&snippet_name(text));
        fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Saved snippet {}", path.display());
        Ok(())
    }
}

fn snippet_name(text: &str) -> String {
    let first_line = text.trim().lines().next().unwrap_or_default();
    let name: String = first_line
        .chars()
        .map(|c| if c.is_alphanumeric() || c == ' ' || c == '-' { c } else { '_' })
        .take(MAX_NAME_CHARS)
        .collect();
    let name = name.trim();

    if name.is_empty() {
        "snippet".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn names_come_from_first_line() {
        assert_eq!(snippet_name("hello world\nsecond"), "hello world");
        assert_eq!(snippet_name("a/b:c"), "a_b_c");
        assert_eq!(snippet_name("   "), "snippet");
    }

    #[test]
    fn same_name_does_not_overwrite() {
        let dir = tempdir().unwrap();
        let sink = SnippetDir::new(dir.path().join("snippets"));

        sink.add_snippet("note\none").unwrap();
        sink.add_snippet("note\ntwo").unwrap();

        let first = fs::read_to_string(sink.dir().join("note.txt")).unwrap();
        let second = fs::read_to_string(sink.dir().join("note 2.txt")).unwrap();
        assert_eq!(first, "note\none");
        assert_eq!(second, "note\ntwo");
    }
}
