//! Pure state transitions
//!
//! `reduce` never performs I/O and never fails. Combinations of state and
//! action that have no transition return the input state unchanged; the
//! coordinator decides whether that is worth a warning.

use super::actions::Action;
use super::state::{Phase, RefactorTarget, WorkflowState, GENERIC_UI};
use crate::types::AvailableRefactoring;

/// Compute the state following `action`
pub fn reduce(state: &WorkflowState, action: &Action) -> WorkflowState {
    match (state, action) {
        (WorkflowState::Closed, Action::Open { ui_kind }) => WorkflowState::Open {
            ui_kind: ui_kind.clone(),
            phase: Phase::GetRefactorings,
        },

        (
            WorkflowState::Open {
                ui_kind,
                phase: Phase::GetRefactorings,
            },
            Action::GotRefactorings {
                target,
                refactorings,
            },
        ) => match (target, refactorings.as_slice()) {
            (None, _) | (_, []) => WorkflowState::Closed,
            (Some(target), [only]) => WorkflowState::Open {
                ui_kind: ui_kind.clone(),
                phase: phase_for_choice(target, only),
            },
            (Some(target), _) => WorkflowState::Open {
                ui_kind: ui_kind.clone(),
                phase: Phase::Pick {
                    target: target.clone(),
                    candidates: refactorings.clone(),
                },
            },
        },

        (
            WorkflowState::Open {
                ui_kind,
                phase: Phase::Pick { target, .. },
            },
            Action::PickedRefactor(choice),
        ) => WorkflowState::Open {
            ui_kind: ui_kind.clone(),
            phase: phase_for_choice(target, choice),
        },

        (
            _,
            Action::DisplayRename {
                editor,
                provider,
                selected_text,
                mount_point,
                symbol_position,
            },
        ) => WorkflowState::Open {
            ui_kind: GENERIC_UI.to_string(),
            phase: Phase::Rename {
                editor: editor.clone(),
                provider: provider.clone(),
                position: *symbol_position,
                selected_text: Some(selected_text.clone()),
                mount_point: Some(*mount_point),
            },
        },

        (
            WorkflowState::Open {
                ui_kind,
                phase: Phase::Rename { .. } | Phase::Freeform { .. },
            },
            Action::Execute { provider, request },
        ) => WorkflowState::Open {
            ui_kind: ui_kind.clone(),
            phase: Phase::Execute {
                provider: provider.clone(),
                request: request.clone(),
            },
        },

        (
            WorkflowState::Open {
                phase: Phase::Execute { .. },
                ..
            },
            Action::GotEdits(_),
        ) => WorkflowState::Closed,

        (_, Action::Close) => WorkflowState::Closed,

        (WorkflowState::Open { .. }, Action::ErrorOccurred(_)) => WorkflowState::Closed,

        _ => state.clone(),
    }
}

fn phase_for_choice(target: &RefactorTarget, choice: &AvailableRefactoring) -> Phase {
    match choice {
        AvailableRefactoring::Rename { .. } => Phase::Rename {
            editor: target.editor.clone(),
            provider: target.provider.clone(),
            position: target.editor.selection.start,
            selected_text: None,
            mount_point: None,
        },
        AvailableRefactoring::Freeform { .. } => Phase::Freeform {
            editor: target.editor.clone(),
            provider: target.provider.clone(),
            refactoring: choice.clone(),
        },
    }
}
