//! Actions: the only inbound API of the coordinator

use std::sync::Arc;

use super::state::RefactorTarget;
use crate::edits::ApplyReport;
use crate::error::RefactorError;
use crate::providers::ProviderHandle;
use crate::types::{AvailableRefactoring, EditorContext, Position, RefactorRequest};

/// A dispatched workflow action
#[derive(Debug, Clone)]
pub enum Action {
    /// Start a workflow from `ui_kind`
    Open { ui_kind: String },
    /// Enumeration finished; `target` is `None` when no editor or provider was found
    GotRefactorings {
        target: Option<RefactorTarget>,
        refactorings: Vec<AvailableRefactoring>,
    },
    /// The user chose a refactoring from the pick list
    PickedRefactor(AvailableRefactoring),
    /// Open the rename dialog directly
    DisplayRename {
        editor: EditorContext,
        provider: ProviderHandle,
        selected_text: String,
        mount_point: Position,
        symbol_position: Position,
    },
    /// Run a fully specified refactoring
    Execute {
        provider: ProviderHandle,
        request: RefactorRequest,
    },
    /// The computed edits were applied
    GotEdits(ApplyReport),
    /// Abandon the workflow
    Close,
    /// A provider failed
    ErrorOccurred(Arc<RefactorError>),
}

impl Action {
    pub fn open(ui_kind: impl Into<String>) -> Self {
        Action::Open {
            ui_kind: ui_kind.into(),
        }
    }

    pub fn got_refactorings(
        target: Option<RefactorTarget>,
        refactorings: Vec<AvailableRefactoring>,
    ) -> Self {
        Action::GotRefactorings {
            target,
            refactorings,
        }
    }

    pub fn picked_refactor(choice: AvailableRefactoring) -> Self {
        Action::PickedRefactor(choice)
    }

    pub fn display_rename(
        editor: EditorContext,
        provider: ProviderHandle,
        selected_text: impl Into<String>,
        mount_point: Position,
        symbol_position: Position,
    ) -> Self {
        Action::DisplayRename {
            editor,
            provider,
            selected_text: selected_text.into(),
            mount_point,
            symbol_position,
        }
    }

    pub fn execute(provider: ProviderHandle, request: RefactorRequest) -> Self {
        Action::Execute { provider, request }
    }

    pub fn got_edits(report: ApplyReport) -> Self {
        Action::GotEdits(report)
    }

    pub fn close() -> Self {
        Action::Close
    }

    pub fn error_occurred(err: RefactorError) -> Self {
        Action::ErrorOccurred(Arc::new(err))
    }

    /// Action name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Action::Open { .. } => "open",
            Action::GotRefactorings { .. } => "got-refactorings",
            Action::PickedRefactor(_) => "picked-refactor",
            Action::DisplayRename { .. } => "display-rename",
            Action::Execute { .. } => "execute",
            Action::GotEdits(_) => "got-edits",
            Action::Close => "close",
            Action::ErrorOccurred(_) => "error",
        }
    }
}
