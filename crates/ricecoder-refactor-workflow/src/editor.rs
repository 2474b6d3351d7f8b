//! Active editor lookup
//!
//! The coordinator asks an [`EditorSource`] which editor a freshly opened
//! workflow should operate on. Hosts implement it over their own editor
//! model; [`ActiveEditor`] is a simple settable holder.

use parking_lot::RwLock;

use crate::types::EditorContext;

/// Source of the editor a workflow operates on
pub trait EditorSource: Send + Sync {
    /// The currently focused editor, if any
    fn active_editor(&self) -> Option<EditorContext>;
}

/// Settable active-editor holder
#[derive(Debug, Default)]
pub struct ActiveEditor {
    current: RwLock<Option<EditorContext>>,
}

impl ActiveEditor {
    /// Create a holder with no active editor
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a holder with the given editor focused
    pub fn with_editor(editor: EditorContext) -> Self {
        Self {
            current: RwLock::new(Some(editor)),
        }
    }

    /// Focus an editor
    pub fn set(&self, editor: EditorContext) {
        *self.current.write() = Some(editor);
    }

    /// Clear the focused editor
    pub fn clear(&self) {
        *self.current.write() = None;
    }
}

impl EditorSource for ActiveEditor {
    fn active_editor(&self) -> Option<EditorContext> {
        self.current.read().clone()
    }
}
