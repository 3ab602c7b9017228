//! Markdown file on disk with its derived outline and task index

use anyhow::{Context, Result};
use ropey::Rope;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::tasks;
use crate::toc::{self, Heading};

/// A document loaded from disk
#[derive(Clone, Debug)]
pub struct Document {
    pub path: PathBuf,
    pub rope: Rope,
    pub headings: Vec<Heading>,
    /// Source line of every task item, in document order
    pub task_lines: Vec<usize>,
    pub loaded_mtime: Option<SystemTime>,
    pub rev: u64,
}

impl Document {
    /// Load a document from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let abs_path = path
            .canonicalize()
            .with_context(|| format!("Failed to canonicalize path: {}", path.display()))?;

        let content = fs::read_to_string(&abs_path)
            .with_context(|| format!("Failed to read file: {}", abs_path.display()))?;

        let mut doc = Self {
            path: abs_path,
            rope: Rope::new(),
            headings: Vec::new(),
            task_lines: Vec::new(),
            loaded_mtime: None,
            rev: 0,
        };
        doc.replace_content(&content);
        doc.loaded_mtime = doc.disk_mtime();
        Ok(doc)
    }

    /// Reload the document from disk
    pub fn reload(&mut self) -> Result<()> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to reload file: {}", self.path.display()))?;

        self.replace_content(&content);
        self.loaded_mtime = self.disk_mtime();
        Ok(())
    }

    /// Write new text to disk and refresh the derived indexes
    pub fn save_text(&mut self, text: &str) -> Result<()> {
        fs::write(&self.path, text)
            .with_context(|| format!("Failed to write file: {}", self.path.display()))?;

        self.replace_content(text);
        self.loaded_mtime = self.disk_mtime();
        log::debug!("Saved {} (rev {})", self.path.display(), self.rev);
        Ok(())
    }

    /// True when the file on disk is newer than the loaded copy
    pub fn changed_on_disk(&self) -> bool {
        match (self.loaded_mtime, self.disk_mtime()) {
            (Some(loaded), Some(disk)) => disk > loaded,
            _ => false,
        }
    }

    /// Full document text
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Number of characters, the unit selections are measured in
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Sidecar file holding image payloads referenced by this document
    pub fn image_store_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".images.toml");
        self.path.with_file_name(name)
    }

    fn replace_content(&mut self, content: &str) {
        self.rope = Rope::from_str(content);
        self.headings = toc::extract_headings(content);
        self.task_lines = tasks::task_lines(content);
        self.rev += 1;
    }

    fn disk_mtime(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }
}
