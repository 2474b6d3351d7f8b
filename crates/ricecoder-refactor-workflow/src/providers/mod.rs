//! Refactor provider capability contract
//!
//! A provider offers refactorings for a class of documents (identified by
//! grammar scope) and computes the edits for a chosen one. Providers are
//! third-party code: the [`ProviderAdapter`] isolates their failures before
//! anything reaches the workflow.

pub mod adapter;
pub mod registry;

pub use adapter::ProviderAdapter;
pub use registry::{ProviderRegistry, ProviderSelector};

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::RefactorResult;
use crate::types::{
    AvailableRefactoring, EditMap, EditorContext, FreeformRequest, Position, Range,
    RefactorResponse,
};

/// Stream of responses produced by a freeform execution
pub type ResponseStream = BoxStream<'static, RefactorResult<RefactorResponse>>;

/// Capabilities a refactor provider implements
#[async_trait]
pub trait RefactorProvider: Send + Sync {
    /// Provider name used in logs and errors
    fn name(&self) -> &str;

    /// Grammar scopes this provider handles
    fn grammar_scopes(&self) -> &[String];

    /// Selection priority; higher wins
    fn priority(&self) -> i32;

    /// List the refactorings available for `range` in `editor`
    async fn refactorings(
        &self,
        editor: &EditorContext,
        range: Range,
    ) -> RefactorResult<Vec<AvailableRefactoring>>;

    /// Compute the edits renaming the symbol at `position`
    async fn rename(
        &self,
        editor: &EditorContext,
        position: Position,
        new_name: &str,
    ) -> RefactorResult<Option<EditMap>>;

    /// Execute a freeform refactoring, emitting zero or more responses
    fn refactor(&self, request: FreeformRequest) -> ResponseStream;
}

/// Shared handle to a provider
///
/// Equality is identity: two handles are equal when they point at the same
/// provider instance.
#[derive(Clone)]
pub struct ProviderHandle(Arc<dyn RefactorProvider>);

impl ProviderHandle {
    /// Wrap a provider
    pub fn new(provider: Arc<dyn RefactorProvider>) -> Self {
        Self(provider)
    }

    /// Wrap an owned provider
    pub fn from_provider<P: RefactorProvider + 'static>(provider: P) -> Self {
        Self(Arc::new(provider))
    }
}

impl Deref for ProviderHandle {
    type Target = dyn RefactorProvider;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl PartialEq for ProviderHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ProviderHandle {}

impl fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("name", &self.name())
            .field("priority", &self.priority())
            .finish()
    }
}

impl From<Arc<dyn RefactorProvider>> for ProviderHandle {
    fn from(provider: Arc<dyn RefactorProvider>) -> Self {
        Self(provider)
    }
}
