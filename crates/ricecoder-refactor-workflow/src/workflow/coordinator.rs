//! Refactor workflow coordinator
//!
//! The coordinator owns the single [`WorkflowState`] cell. Every dispatched
//! action goes through [`reduce`]; the new state is published before any side
//! effect it triggers starts. Side effects (provider enumeration, provider
//! execution, edit application) run on the tokio runtime and report back by
//! dispatching further actions.
//!
//! # Cancellation
//!
//! The coordinator keeps an epoch counter. It advances whenever a transition
//! closes the workflow or starts a new one (`open`, `display_rename`). Each
//! side effect captures the epoch it was started in; its result is dropped
//! without any state change or error if the epoch has moved on by then. The
//! check and the transition happen under the same lock, so a result can never
//! slip in after a `close()` has been observed. Provider work itself is not
//! interrupted.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::StreamExt;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::actions::Action;
use super::feed::{ErrorFeed, StateFeed};
use super::reducer::reduce;
use super::state::{Phase, RefactorTarget, WorkflowState};
use crate::config::WorkflowConfig;
use crate::edits::{ApplyReport, EditApplier, TextBuffer};
use crate::editor::EditorSource;
use crate::error::{panic_message, RefactorError, RefactorResult};
use crate::providers::{ProviderAdapter, ProviderHandle, ProviderSelector};
use crate::types::{EditMap, RefactorRequest, RefactorResponse};

/// Side effect required by a freshly entered phase
enum Effect {
    Enumerate,
    Execute {
        provider: ProviderHandle,
        request: RefactorRequest,
    },
}

struct Core {
    state: WorkflowState,
    epoch: u64,
    last_report: Option<ApplyReport>,
}

struct Shared {
    core: Mutex<Core>,
    states: broadcast::Sender<WorkflowState>,
    errors: broadcast::Sender<Arc<RefactorError>>,
    editors: Arc<dyn EditorSource>,
    selector: Arc<dyn ProviderSelector>,
    applier: EditApplier,
    runtime: Handle,
}

/// Drives one refactor workflow
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct RefactorCoordinator {
    shared: Arc<Shared>,
}

impl RefactorCoordinator {
    /// Create a coordinator; must be called from within a tokio runtime
    pub fn new(
        config: &WorkflowConfig,
        editors: Arc<dyn EditorSource>,
        selector: Arc<dyn ProviderSelector>,
        buffers: Arc<dyn TextBuffer>,
    ) -> RefactorResult<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| RefactorError::NoRuntime)?;
        let (states, _) = broadcast::channel(config.state_feed_capacity);
        let (errors, _) = broadcast::channel(config.error_feed_capacity);
        let applier = EditApplier::new(buffers).reject_overlapping(config.reject_overlapping_edits);

        Ok(Self {
            shared: Arc::new(Shared {
                core: Mutex::new(Core {
                    state: WorkflowState::Closed,
                    epoch: 0,
                    last_report: None,
                }),
                states,
                errors,
                editors,
                selector,
                applier,
                runtime,
            }),
        })
    }

    /// Current state
    pub fn state(&self) -> WorkflowState {
        self.shared.core.lock().state.clone()
    }

    /// Current epoch
    pub fn epoch(&self) -> u64 {
        self.shared.core.lock().epoch
    }

    /// Outcome of the most recent edit application
    pub fn last_apply_report(&self) -> Option<ApplyReport> {
        self.shared.core.lock().last_report.clone()
    }

    /// Subscribe to states, starting with the current one
    pub fn subscribe(&self) -> StateFeed {
        let core = self.shared.core.lock();
        StateFeed::new(core.state.clone(), self.shared.states.subscribe())
    }

    /// Subscribe to workflow failures
    pub fn errors(&self) -> ErrorFeed {
        ErrorFeed::new(self.shared.errors.subscribe())
    }

    /// Dispatch an action
    pub fn dispatch(&self, action: Action) {
        let effect = {
            let mut core = self.shared.core.lock();
            self.transition(&mut core, action)
        };
        if let Some((effect, epoch)) = effect {
            self.spawn_effect(effect, epoch);
        }
    }

    /// Dispatch on behalf of a side effect started in `epoch`
    fn dispatch_in(&self, epoch: u64, action: Action) {
        let effect = {
            let mut core = self.shared.core.lock();
            if !Self::still_current(&core, epoch, action.name()) {
                return;
            }
            self.transition(&mut core, action)
        };
        if let Some((effect, epoch)) = effect {
            self.spawn_effect(effect, epoch);
        }
    }

    fn still_current(core: &Core, epoch: u64, what: &str) -> bool {
        if core.epoch == epoch {
            return true;
        }
        debug!(
            "Dropping stale {} from epoch {} (current epoch {})",
            what, epoch, core.epoch
        );
        false
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.shared.core.lock().epoch == epoch
    }

    /// Apply `action` to the state cell and publish the result
    ///
    /// Returns the side effect the new state requires, tagged with the epoch
    /// it belongs to.
    fn transition(&self, core: &mut Core, action: Action) -> Option<(Effect, u64)> {
        let next = reduce(&core.state, &action);
        if next == core.state {
            match action {
                Action::Close => debug!("close() while {}: nothing to do", core.state),
                _ => warn!("Ignoring {} action in state {}", action.name(), core.state),
            }
            return None;
        }

        let starts_workflow = matches!(action, Action::Open { .. } | Action::DisplayRename { .. });
        if next.is_closed() || starts_workflow {
            core.epoch += 1;
        }
        debug!(
            "Refactor workflow {} -> {} on {} (epoch {})",
            core.state,
            next,
            action.name(),
            core.epoch
        );
        core.state = next;

        match action {
            Action::ErrorOccurred(err) => {
                // no subscribers is fine
                let _ = self.shared.errors.send(err);
            }
            Action::GotEdits(report) => core.last_report = Some(report),
            _ => {}
        }
        let _ = self.shared.states.send(core.state.clone());

        match core.state.phase() {
            Some(Phase::GetRefactorings) => Some((Effect::Enumerate, core.epoch)),
            Some(Phase::Execute { provider, request }) => Some((
                Effect::Execute {
                    provider: provider.clone(),
                    request: request.clone(),
                },
                core.epoch,
            )),
            _ => None,
        }
    }

    fn spawn_effect(&self, effect: Effect, epoch: u64) {
        let coordinator = self.clone();
        match effect {
            Effect::Enumerate => {
                self.shared
                    .runtime
                    .spawn(async move { coordinator.enumerate(epoch).await });
            }
            Effect::Execute { provider, request } => {
                self.shared
                    .runtime
                    .spawn(async move { coordinator.execute(epoch, provider, request).await });
            }
        }
    }

    async fn enumerate(self, epoch: u64) {
        let editor = match guard("editor source", || self.shared.editors.active_editor()) {
            Ok(Some(editor)) if editor.path.is_some() => editor,
            Ok(_) => {
                debug!("No saved editor is active; nothing to refactor");
                self.dispatch_in(epoch, Action::got_refactorings(None, Vec::new()));
                return;
            }
            Err(err) => return self.fail(epoch, err),
        };

        let provider = match guard("provider selector", || self.shared.selector.select(&editor)) {
            Ok(Some(provider)) => provider,
            Ok(None) => {
                debug!("{}", RefactorError::NoProviderAvailable(editor.grammar.clone()));
                self.dispatch_in(epoch, Action::got_refactorings(None, Vec::new()));
                return;
            }
            Err(err) => return self.fail(epoch, err),
        };

        let range = editor.selection;
        match ProviderAdapter::new(provider.clone())
            .enumerate(&editor, range)
            .await
        {
            Ok(refactorings) => {
                let target = RefactorTarget { editor, provider };
                self.dispatch_in(epoch, Action::got_refactorings(Some(target), refactorings));
            }
            Err(err) => self.fail(epoch, err),
        }
    }

    async fn execute(self, epoch: u64, provider: ProviderHandle, request: RefactorRequest) {
        let mut responses = ProviderAdapter::new(provider).execute(request);

        while let Some(response) = responses.next().await {
            if !self.is_current(epoch) {
                debug!("Refactor from epoch {} was abandoned; dropping its responses", epoch);
                return;
            }
            match response {
                Ok(RefactorResponse::Edit { edits }) => {
                    self.finish_execution(epoch, &edits);
                    return;
                }
                Ok(RefactorResponse::Progress {
                    message,
                    value,
                    max,
                }) => debug!("Refactor progress {}/{}: {}", value, max, message),
                Err(err) => {
                    self.fail(epoch, err);
                    return;
                }
            }
        }

        debug!("Refactor finished without edits");
        self.dispatch_in(epoch, Action::close());
    }

    /// Apply the first computed edits and close
    fn finish_execution(&self, epoch: u64, edits: &EditMap) {
        let mut core = self.shared.core.lock();
        if !Self::still_current(&core, epoch, "edits") {
            return;
        }

        // applied under the state lock: a close() dispatched before this
        // point means the edits are never written
        match guard("edit applier", || self.shared.applier.apply(edits)) {
            Ok(report) => {
                self.transition(&mut core, Action::got_edits(report));
                self.transition(&mut core, Action::close());
            }
            Err(err) => self.close_with_error(&mut core, err),
        }
    }

    /// Surface a failure and close
    fn fail(&self, epoch: u64, err: RefactorError) {
        let mut core = self.shared.core.lock();
        if !Self::still_current(&core, epoch, "error") {
            return;
        }
        self.close_with_error(&mut core, err);
    }

    fn close_with_error(&self, core: &mut Core, err: RefactorError) {
        warn!("Refactor workflow failed: {}", err);
        self.transition(core, Action::error_occurred(err));
        self.transition(core, Action::close());
    }
}

/// Run a host collaborator call, turning a panic into an error
fn guard<T>(collaborator: &str, call: impl FnOnce() -> T) -> RefactorResult<T> {
    panic::catch_unwind(AssertUnwindSafe(call)).map_err(|payload| {
        RefactorError::collaborator(collaborator, panic_message(payload.as_ref()))
    })
}
