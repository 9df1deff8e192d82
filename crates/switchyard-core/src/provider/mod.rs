//! Provider adapters
//!
//! Concrete backends (HTTP clients, local runtimes, ...) live outside this
//! crate and plug in through [`ProviderAdapter`]. The executor only ever
//! talks to them through this trait, looked up by provider name in an
//! [`AdapterRegistry`].

mod types;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

pub use types::{ExecutionResult, ProviderError, Usage};

use crate::error::{Error, Result};
use crate::routing::{CapabilityId, Task};

/// A backend that can execute tasks on one or more models
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable provider name, matching `Capability::provider`
    fn name(&self) -> &str;

    /// Execute a task on a specific model
    async fn execute(
        &self,
        task: &Task,
        model: &str,
    ) -> std::result::Result<ExecutionResult, ProviderError>;

    /// Model identifiers this adapter serves
    fn supported_models(&self) -> Vec<String>;

    /// Whether this adapter serves a model
    fn supports_model(&self, model: &str) -> bool {
        self.supported_models().iter().any(|m| m == model)
    }
}

/// Adapters keyed by provider name
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn ProviderAdapter>>,
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.adapters.keys().collect();
        names.sort();
        f.debug_struct("AdapterRegistry")
            .field("providers", &names)
            .finish()
    }
}

impl AdapterRegistry {
    /// Create an empty adapter registry
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Register an adapter under its own name
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) -> Result<()> {
        let name = adapter.name().to_string();
        if self.adapters.contains_key(&name) {
            return Err(Error::InvalidInput(format!(
                "an adapter for provider '{}' is already registered",
                name
            )));
        }

        debug!(provider = %name, models = ?adapter.supported_models(), "Registered provider adapter");
        self.adapters.insert(name, adapter);
        Ok(())
    }

    /// Get the adapter for a provider
    pub fn get(&self, provider: &str) -> Option<&Arc<dyn ProviderAdapter>> {
        self.adapters.get(provider)
    }

    /// Find the adapter that serves a capability
    pub fn resolve(
        &self,
        capability: &CapabilityId,
    ) -> std::result::Result<Arc<dyn ProviderAdapter>, ProviderError> {
        match self.adapters.get(&capability.provider) {
            Some(adapter) if adapter.supports_model(&capability.model) => Ok(Arc::clone(adapter)),
            _ => Err(ProviderError::UnsupportedModel {
                provider: capability.provider.clone(),
                model: capability.model.clone(),
            }),
        }
    }

    /// Registered provider names, sorted
    pub fn providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.adapters.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered adapters
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Whether no adapters are registered
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
