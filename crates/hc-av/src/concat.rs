//! ffmpeg concat demuxer descriptor.

use std::path::{Path, PathBuf};

/// Ordered list of files for `ffmpeg -f concat`.
///
/// Entries are rendered as `file '<absolute path>'`, one per line, in the
/// order they were pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConcatList {
    entries: Vec<PathBuf>,
}

impl ConcatList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file, making it absolute against the current directory.
    pub fn push(&mut self, path: &Path) -> std::io::Result<()> {
        self.entries.push(std::path::absolute(path)?);
        Ok(())
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the descriptor text.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|p| format!("file '{}'\n", quote(p)))
            .collect()
    }

    /// Write the descriptor to `path`.
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.render())?;
        tracing::debug!("wrote concat list {} ({} entries)", path.display(), self.len());
        Ok(())
    }
}

/// Forward slashes, and `'` closed, escaped and reopened.
fn quote(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .replace('\'', r"'\''")
}
