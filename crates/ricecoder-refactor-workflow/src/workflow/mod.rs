//! Refactor workflow state machine and coordinator

pub mod actions;
pub mod coordinator;
pub mod feed;
pub mod reducer;
pub mod state;

pub use actions::Action;
pub use coordinator::RefactorCoordinator;
pub use feed::{ErrorFeed, StateFeed};
pub use reducer::reduce;
pub use state::{Phase, PhaseKind, RefactorTarget, WorkflowState, GENERIC_UI};
