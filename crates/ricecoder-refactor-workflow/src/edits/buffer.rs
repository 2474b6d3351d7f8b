//! Text buffer contract and implementations
//!
//! The edit applier only needs to read and write ranges of live file
//! content. Positions are 0-based lines and character (not byte) offsets.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::error::{RefactorError, RefactorResult};
use crate::types::{Position, Range};

/// Live file contents the edit applier works against
///
/// A [`RefactorCoordinator`](crate::RefactorCoordinator) calls these methods
/// while it holds its state lock, on a runtime worker thread. Implementations
/// must not call back into the coordinator (the lock is not reentrant) and
/// should return quickly: `dispatch` and `state` on other threads wait for
/// the whole application. A panic fails only the edit being read or written.
pub trait TextBuffer: Send + Sync {
    /// Text currently at `range` in `file`
    fn read_range(&self, file: &Path, range: Range) -> RefactorResult<String>;

    /// Replace `range` in `file` with `text`
    fn write_range(&self, file: &Path, range: Range, text: &str) -> RefactorResult<()>;
}

/// Byte offset of `position` in `text`
///
/// The character may point one past the last character of the line (end of
/// line). Returns `None` for positions outside the text.
pub fn offset_at(text: &str, position: Position) -> Option<usize> {
    let mut line_start = 0;
    for _ in 0..position.line {
        let newline = text[line_start..].find('\n')?;
        line_start += newline + 1;
    }

    let rest = &text[line_start..];
    let line = match rest.find('\n') {
        Some(end) => &rest[..end],
        None => rest,
    };

    let character = position.character as usize;
    if character == line.chars().count() {
        return Some(line_start + line.len());
    }
    line.char_indices()
        .nth(character)
        .map(|(index, _)| line_start + index)
}

/// Byte span of `range` in `text`
pub fn span_of(text: &str, range: Range) -> Option<std::ops::Range<usize>> {
    let start = offset_at(text, range.start)?;
    let end = offset_at(text, range.end)?;
    (start <= end).then_some(start..end)
}

fn out_of_bounds(file: &Path, range: Range) -> RefactorError {
    RefactorError::buffer(format!(
        "range {} is outside the contents of {}",
        range,
        file.display()
    ))
}

fn not_open(file: &Path) -> RefactorError {
    RefactorError::buffer(format!("no open buffer for {}", file.display()))
}

fn splice(file: &Path, content: &mut String, range: Range, text: &str) -> RefactorResult<()> {
    let span = span_of(content, range).ok_or_else(|| out_of_bounds(file, range))?;
    content.replace_range(span, text);
    Ok(())
}

/// In-memory buffers keyed by path
#[derive(Debug, Default)]
pub struct InMemoryBuffers {
    buffers: RwLock<HashMap<PathBuf, String>>,
}

impl InMemoryBuffers {
    /// Create an empty set of buffers
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (or replace) a buffer
    pub fn open(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.buffers.write().insert(path.into(), text.into());
    }

    /// Close a buffer
    pub fn close(&self, path: &Path) -> Option<String> {
        self.buffers.write().remove(path)
    }

    /// Full text of a buffer
    pub fn text(&self, path: &Path) -> Option<String> {
        self.buffers.read().get(path).cloned()
    }
}

impl TextBuffer for InMemoryBuffers {
    fn read_range(&self, file: &Path, range: Range) -> RefactorResult<String> {
        let buffers = self.buffers.read();
        let content = buffers.get(file).ok_or_else(|| not_open(file))?;
        let span = span_of(content, range).ok_or_else(|| out_of_bounds(file, range))?;
        Ok(content[span].to_string())
    }

    fn write_range(&self, file: &Path, range: Range, text: &str) -> RefactorResult<()> {
        let mut buffers = self.buffers.write();
        let content = buffers.get_mut(file).ok_or_else(|| not_open(file))?;
        splice(file, content, range, text)
    }
}

/// Buffers backed directly by files on disk
///
/// Reads and writes go through blocking `std::fs` calls, one whole-file
/// round trip per edit.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystemBuffers;

impl FileSystemBuffers {
    /// Create file-system backed buffers
    pub fn new() -> Self {
        Self
    }
}

impl TextBuffer for FileSystemBuffers {
    fn read_range(&self, file: &Path, range: Range) -> RefactorResult<String> {
        let content = std::fs::read_to_string(file)?;
        let span = span_of(&content, range).ok_or_else(|| out_of_bounds(file, range))?;
        Ok(content[span].to_string())
    }

    fn write_range(&self, file: &Path, range: Range, text: &str) -> RefactorResult<()> {
        let mut content = std::fs::read_to_string(file)?;
        splice(file, &mut content, range, text)?;
        std::fs::write(file, content)?;
        Ok(())
    }
}
