//! Workflow state model

use std::fmt;

use crate::providers::ProviderHandle;
use crate::types::{AvailableRefactoring, EditorContext, Position, RefactorRequest};

/// UI kind used when a rename dialog is opened directly
pub const GENERIC_UI: &str = "generic";

/// State of the refactor workflow
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkflowState {
    /// No active refactor
    #[default]
    Closed,
    /// An active workflow requested by `ui_kind`
    Open { ui_kind: String, phase: Phase },
}

impl WorkflowState {
    /// Whether no workflow is active
    pub fn is_closed(&self) -> bool {
        matches!(self, WorkflowState::Closed)
    }

    /// Current phase of an open workflow
    pub fn phase(&self) -> Option<&Phase> {
        match self {
            WorkflowState::Open { phase, .. } => Some(phase),
            WorkflowState::Closed => None,
        }
    }

    /// Kind of the current phase
    pub fn phase_kind(&self) -> Option<PhaseKind> {
        self.phase().map(Phase::kind)
    }

    /// UI surface that opened the workflow
    pub fn ui_kind(&self) -> Option<&str> {
        match self {
            WorkflowState::Open { ui_kind, .. } => Some(ui_kind),
            WorkflowState::Closed => None,
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::Closed => f.write_str("closed"),
            WorkflowState::Open { ui_kind, phase } => {
                write!(f, "open({}, {})", ui_kind, phase.kind())
            }
        }
    }
}

/// Editor and provider a workflow was opened against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefactorTarget {
    pub editor: EditorContext,
    pub provider: ProviderHandle,
}

/// What an open workflow is waiting for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the provider to list refactorings
    GetRefactorings,
    /// The user chooses one of several refactorings
    Pick {
        target: RefactorTarget,
        candidates: Vec<AvailableRefactoring>,
    },
    /// Collecting a new name
    Rename {
        editor: EditorContext,
        provider: ProviderHandle,
        position: Position,
        selected_text: Option<String>,
        mount_point: Option<Position>,
    },
    /// Collecting provider-defined arguments
    Freeform {
        editor: EditorContext,
        provider: ProviderHandle,
        refactoring: AvailableRefactoring,
    },
    /// The provider is computing edits
    Execute {
        provider: ProviderHandle,
        request: RefactorRequest,
    },
}

impl Phase {
    /// Discriminant of the phase
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::GetRefactorings => PhaseKind::GetRefactorings,
            Phase::Pick { .. } => PhaseKind::Pick,
            Phase::Rename { .. } => PhaseKind::Rename,
            Phase::Freeform { .. } => PhaseKind::Freeform,
            Phase::Execute { .. } => PhaseKind::Execute,
        }
    }
}

/// Phase discriminant, for logs and matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    GetRefactorings,
    Pick,
    Rename,
    Freeform,
    Execute,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhaseKind::GetRefactorings => "get-refactorings",
            PhaseKind::Pick => "pick",
            PhaseKind::Rename => "rename",
            PhaseKind::Freeform => "freeform",
            PhaseKind::Execute => "execute",
        };
        f.write_str(name)
    }
}
