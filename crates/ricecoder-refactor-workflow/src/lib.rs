//! Ricecoder Refactor Workflow
//!
//! Coordinates an interactive refactor from the moment the user asks for one
//! until the provider's edits land in the buffers, or the user walks away.
//!
//! # Architecture
//!
//! - **Single State Cell**: [`RefactorCoordinator`] owns one [`WorkflowState`];
//!   every change goes through the pure [`reduce`] function
//! - **Pluggable Providers**: language support comes from [`RefactorProvider`]
//!   implementations picked by a [`ProviderSelector`] (grammar scope, then priority)
//! - **Contained Failures**: provider errors and panics surface once on the
//!   [`ErrorFeed`] and close the workflow; the coordinator keeps running
//! - **Race Safety**: results that arrive after the workflow was closed or
//!   restarted are dropped without touching state
//! - **Conflict-Aware Edits**: [`EditApplier`] checks each edit's expected text
//!   against the live buffer and skips mismatches
//!
//! # Workflow
//!
//! ```text
//! closed --open--> get-refactorings --1 result--> rename | freeform
//!                                  \--n results--> pick --picked--/
//!
//! rename | freeform --execute--> execute --edits--> closed
//! ```
//!
//! Any state goes to `closed` on `close`; open states also close on provider failure.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ricecoder_refactor_workflow::{
//!     Action, ActiveEditor, FileSystemBuffers, ProviderRegistry, RefactorCoordinator,
//!     WorkflowConfig,
//! };
//!
//! let registry = Arc::new(ProviderRegistry::new());
//! registry.register(my_provider);
//!
//! let coordinator = RefactorCoordinator::new(
//!     &WorkflowConfig::default(),
//!     Arc::new(ActiveEditor::with_editor(editor)),
//!     registry,
//!     Arc::new(FileSystemBuffers::new()),
//! )?;
//!
//! let mut states = coordinator.subscribe();
//! coordinator.dispatch(Action::open("context-menu"));
//! ```

pub mod config;
pub mod editor;
pub mod edits;
pub mod error;
pub mod providers;
pub mod types;
pub mod workflow;

// Re-export commonly used types
pub use config::{ConfigLoader, WorkflowConfig};
pub use editor::{ActiveEditor, EditorSource};
pub use edits::{
    ApplyReport, ConflictReason, EditApplier, EditConflict, FileOutcome, FileSystemBuffers,
    InMemoryBuffers, TextBuffer,
};
pub use error::{RefactorError, RefactorResult};
pub use providers::{
    ProviderAdapter, ProviderHandle, ProviderRegistry, ProviderSelector, RefactorProvider,
    ResponseStream,
};
pub use types::{
    ArgumentKind, ArgumentSpec, ArgumentValue, AvailableRefactoring, EditMap, EditorContext,
    FreeformRequest, Position, Range, RefactorRequest, RefactorResponse, RenameRequest, TextEdit,
};
pub use workflow::{
    reduce, Action, ErrorFeed, Phase, PhaseKind, RefactorCoordinator, RefactorTarget, StateFeed,
    WorkflowState,
};
