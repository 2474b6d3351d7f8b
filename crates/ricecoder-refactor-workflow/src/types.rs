//! Value types shared by providers, the workflow and the edit applier

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Position in a document (0-based line and character)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line number (0-based)
    pub line: u32,
    /// Character offset within the line (0-based)
    pub character: u32,
}

impl Position {
    /// Create a new position
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Half-open range in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// Start position
    pub start: Position,
    /// End position
    pub end: Position,
}

impl Range {
    /// Create a new range
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Empty range at a single position
    pub fn point(position: Position) -> Self {
        Self::new(position, position)
    }

    /// Whether this range ends after `other` starts
    pub fn overlaps_start_of(&self, other: &Range) -> bool {
        self.end > other.start
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{}]-[{},{}]",
            self.start.line, self.start.character, self.end.line, self.end.character
        )
    }
}

/// A replacement guarded by the text it expects to replace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    /// Range the edit replaces
    pub old_range: Range,
    /// Text that must currently occupy `old_range`
    pub old_text: String,
    /// Replacement text
    pub new_text: String,
}

impl TextEdit {
    /// Create a new text edit
    pub fn new(old_range: Range, old_text: impl Into<String>, new_text: impl Into<String>) -> Self {
        Self {
            old_range,
            old_text: old_text.into(),
            new_text: new_text.into(),
        }
    }
}

/// Edits keyed by file, each list in document order
pub type EditMap = BTreeMap<PathBuf, Vec<TextEdit>>;

/// The editor a workflow operates on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorContext {
    /// File backing the editor, `None` for unsaved buffers
    pub path: Option<PathBuf>,
    /// Grammar scope of the buffer (e.g. `source.rust`)
    pub grammar: String,
    /// Current selection or cursor
    pub selection: Range,
}

impl EditorContext {
    /// Create a context for a saved file
    pub fn new(path: impl Into<PathBuf>, grammar: impl Into<String>, selection: Range) -> Self {
        Self {
            path: Some(path.into()),
            grammar: grammar.into(),
            selection,
        }
    }
}

/// Value of a freeform refactoring argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentValue {
    Boolean(bool),
    Text(String),
}

impl fmt::Display for ArgumentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentValue::Boolean(value) => write!(f, "{}", value),
            ArgumentValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for ArgumentValue {
    fn from(value: &str) -> Self {
        ArgumentValue::Text(value.to_string())
    }
}

impl From<bool> for ArgumentValue {
    fn from(value: bool) -> Self {
        ArgumentValue::Boolean(value)
    }
}

/// Kind of value a freeform argument accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ArgumentKind {
    String,
    Boolean,
    Enum { options: Vec<String> },
}

/// Provider-declared parameter of a freeform refactoring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    /// Argument name, the key in [`FreeformRequest::arguments`]
    pub name: String,
    /// Human readable description
    pub description: String,
    /// Accepted value kind
    #[serde(flatten)]
    pub kind: ArgumentKind,
    /// Value pre-filled in the UI
    #[serde(default)]
    pub default: Option<ArgumentValue>,
}

/// A refactoring offered by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AvailableRefactoring {
    /// Simple rename of the symbol at `symbol_range`
    Rename { symbol_range: Range },
    /// Provider-defined refactoring with arguments
    Freeform {
        id: String,
        name: String,
        description: String,
        range: Range,
        arguments: Vec<ArgumentSpec>,
    },
}

/// Fully specified rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRequest {
    pub editor: EditorContext,
    pub position: Position,
    pub new_name: String,
}

/// Fully specified freeform refactoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeformRequest {
    pub editor: EditorContext,
    pub id: String,
    pub range: Range,
    pub original_range: Range,
    pub arguments: BTreeMap<String, ArgumentValue>,
}

/// Input to a provider's execute step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefactorRequest {
    Rename(RenameRequest),
    Freeform(FreeformRequest),
}

/// One emission of a provider's execute step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefactorResponse {
    /// Computed edits; the first one ends the execution
    Edit { edits: EditMap },
    /// Progress report, skipped by the coordinator
    Progress { message: String, value: u32, max: u32 },
}
