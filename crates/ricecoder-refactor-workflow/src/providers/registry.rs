//! Provider selection
//!
//! The coordinator only needs "given an editor, zero or one provider".
//! [`ProviderRegistry`] is the stock implementation: providers are matched on
//! grammar scope and the highest priority wins, earlier registrations
//! winning ties.

use parking_lot::RwLock;
use tracing::debug;

use super::ProviderHandle;
use crate::types::EditorContext;

/// Chooses the provider for an editor
pub trait ProviderSelector: Send + Sync {
    /// Select a provider, `None` when nothing handles the editor
    fn select(&self, editor: &EditorContext) -> Option<ProviderHandle>;
}

/// Registry of providers ordered by priority
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: RwLock<Vec<ProviderHandle>>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider
    pub fn register(&self, provider: ProviderHandle) {
        debug!(
            "Registering refactor provider '{}' (priority {})",
            provider.name(),
            provider.priority()
        );
        self.providers.write().push(provider);
    }

    /// Remove a provider; returns whether it was registered
    pub fn unregister(&self, provider: &ProviderHandle) -> bool {
        let mut providers = self.providers.write();
        let before = providers.len();
        providers.retain(|registered| registered != provider);
        providers.len() != before
    }

    /// Number of registered providers
    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    /// Whether no provider is registered
    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }

    /// Providers handling `grammar`, best first
    pub fn providers_for(&self, grammar: &str) -> Vec<ProviderHandle> {
        let mut matching: Vec<ProviderHandle> = self
            .providers
            .read()
            .iter()
            .filter(|provider| provider.grammar_scopes().iter().any(|scope| scope == grammar))
            .cloned()
            .collect();
        // stable sort keeps registration order among equal priorities
        matching.sort_by_key(|provider| std::cmp::Reverse(provider.priority()));
        matching
    }
}

impl ProviderSelector for ProviderRegistry {
    fn select(&self, editor: &EditorContext) -> Option<ProviderHandle> {
        self.providers_for(&editor.grammar).into_iter().next()
    }
}
