//! Property-based tests for the workflow reducer
//!
//! Property: for any sequence of actions, the workflow is always in one of
//! the modelled states, `close` always lands in `Closed`, and `open` from
//! `Closed` always starts enumeration.

use std::collections::BTreeMap;

use async_trait::async_trait;
use futures::stream;
use proptest::prelude::*;
use ricecoder_refactor_workflow::{
    reduce, Action, ApplyReport, AvailableRefactoring, EditMap, EditorContext, FreeformRequest,
    Phase, Position, ProviderHandle, Range, RefactorError, RefactorProvider, RefactorRequest,
    RefactorResult, RefactorTarget, RenameRequest, ResponseStream, WorkflowState,
};

struct NullProvider {
    scopes: Vec<String>,
}

#[async_trait]
impl RefactorProvider for NullProvider {
    fn name(&self) -> &str {
        "null"
    }

    fn grammar_scopes(&self) -> &[String] {
        &self.scopes
    }

    fn priority(&self) -> i32 {
        0
    }

    async fn refactorings(
        &self,
        _editor: &EditorContext,
        _range: Range,
    ) -> RefactorResult<Vec<AvailableRefactoring>> {
        Ok(Vec::new())
    }

    async fn rename(
        &self,
        _editor: &EditorContext,
        _position: Position,
        _new_name: &str,
    ) -> RefactorResult<Option<EditMap>> {
        Ok(None)
    }

    fn refactor(&self, _request: FreeformRequest) -> ResponseStream {
        Box::pin(stream::empty())
    }
}

fn provider() -> ProviderHandle {
    ProviderHandle::from_provider(NullProvider {
        scopes: vec!["text.plain".to_string()],
    })
}

fn editor() -> EditorContext {
    EditorContext::new("/workspace/a.txt", "text.plain", Range::point(Position::new(1, 2)))
}

fn refactoring_strategy() -> impl Strategy<Value = AvailableRefactoring> {
    prop_oneof![
        (0u32..10).prop_map(|line| AvailableRefactoring::Rename {
            symbol_range: Range::new(Position::new(line, 0), Position::new(line, 3)),
        }),
        "[a-z]{1,8}".prop_map(|id| AvailableRefactoring::Freeform {
            name: id.clone(),
            id,
            description: String::new(),
            range: Range::point(Position::new(0, 0)),
            arguments: Vec::new(),
        }),
    ]
}

fn request_strategy() -> impl Strategy<Value = RefactorRequest> {
    prop_oneof![
        "[a-z]{1,8}".prop_map(|new_name| RefactorRequest::Rename(RenameRequest {
            editor: editor(),
            position: Position::new(1, 2),
            new_name,
        })),
        "[a-z]{1,8}".prop_map(|id| RefactorRequest::Freeform(FreeformRequest {
            editor: editor(),
            id,
            range: Range::point(Position::new(0, 0)),
            original_range: Range::point(Position::new(1, 2)),
            arguments: BTreeMap::new(),
        })),
    ]
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        prop_oneof![Just("generic"), Just("context-menu"), Just("keyboard")].prop_map(Action::open),
        (any::<bool>(), prop::collection::vec(refactoring_strategy(), 0..4)).prop_map(
            |(found, refactorings)| {
                let target = found.then(|| RefactorTarget {
                    editor: editor(),
                    provider: provider(),
                });
                Action::got_refactorings(target, refactorings)
            }
        ),
        refactoring_strategy().prop_map(Action::picked_refactor),
        "[a-z]{1,8}".prop_map(|selected| Action::display_rename(
            editor(),
            provider(),
            selected,
            Position::new(3, 4),
            Position::new(1, 2),
        )),
        request_strategy().prop_map(|request| Action::execute(provider(), request)),
        Just(Action::got_edits(ApplyReport::default())),
        Just(Action::close()),
        "[a-z ]{1,16}".prop_map(|message| Action::error_occurred(RefactorError::provider(message))),
    ]
}

fn assert_well_formed(state: &WorkflowState) {
    match state {
        WorkflowState::Closed => {}
        WorkflowState::Open { ui_kind, phase } => {
            assert!(!ui_kind.is_empty());
            match phase {
                Phase::Pick { candidates, .. } => assert!(candidates.len() >= 2),
                Phase::Rename {
                    selected_text,
                    mount_point,
                    ..
                } => assert_eq!(selected_text.is_some(), mount_point.is_some()),
                Phase::Freeform { refactoring, .. } => {
                    assert!(matches!(refactoring, AvailableRefactoring::Freeform { .. }))
                }
                Phase::GetRefactorings | Phase::Execute { .. } => {}
            }
        }
    }
}

proptest! {
    #[test]
    fn prop_states_stay_well_formed(actions in prop::collection::vec(action_strategy(), 0..40)) {
        let mut state = WorkflowState::Closed;
        for action in &actions {
            state = reduce(&state, action);
            assert_well_formed(&state);
        }
    }

    #[test]
    fn prop_close_always_closes(actions in prop::collection::vec(action_strategy(), 0..20)) {
        let mut state = WorkflowState::Closed;
        for action in &actions {
            state = reduce(&state, action);
        }
        prop_assert_eq!(reduce(&state, &Action::close()), WorkflowState::Closed);
    }

    #[test]
    fn prop_open_from_closed_starts_enumeration(ui_kind in "[a-z-]{1,12}") {
        let state = reduce(&WorkflowState::Closed, &Action::open(ui_kind.clone()));
        prop_assert_eq!(state.ui_kind(), Some(ui_kind.as_str()));
        prop_assert!(matches!(state.phase(), Some(Phase::GetRefactorings)));
    }

    #[test]
    fn prop_open_while_open_is_ignored(actions in prop::collection::vec(action_strategy(), 0..20)) {
        let mut state = WorkflowState::Closed;
        for action in &actions {
            state = reduce(&state, action);
        }
        if !state.is_closed() {
            prop_assert_eq!(reduce(&state, &Action::open("again")), state);
        }
    }

    #[test]
    fn prop_reduce_is_deterministic(actions in prop::collection::vec(action_strategy(), 0..20)) {
        let mut first = WorkflowState::Closed;
        let mut second = WorkflowState::Closed;
        for action in &actions {
            first = reduce(&first, action);
            second = reduce(&second, action);
        }
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_closed_only_leaves_on_open_or_rename(action in action_strategy()) {
        let next = reduce(&WorkflowState::Closed, &action);
        match action {
            Action::Open { .. } | Action::DisplayRename { .. } => prop_assert!(!next.is_closed()),
            _ => prop_assert!(next.is_closed()),
        }
    }
}
