//! Executor - runs a task on the best capability, falling back once
//!
//! The executor is the single entry point for callers:
//! - Ranks candidates through the [`Router`]
//! - Invokes the top candidate's provider adapter
//! - On failure, re-ranks without the failed capability and tries exactly
//!   one alternate
//! - Records every attempt in the performance store, success or not
//!
//! There is no built-in timeout; a task's `max_latency_ms` only affects
//! scoring. Adapters (or a supervising layer) own cancellation.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AttemptFailure, Error, Result};
use crate::provider::{AdapterRegistry, ExecutionResult, ProviderAdapter};
use crate::routing::{
    Capability, CapabilityId, CapabilityRegistry, PerformanceRecord, PerformanceStore, Router,
    ScoringConfig, Task, duration_ms,
};

/// Task executor with single fallback
///
/// Cheap to clone; clones share the registry, performance store, and
/// adapters, so one executor can serve many concurrent callers.
#[derive(Debug, Clone)]
pub struct Executor {
    router: Router,
    adapters: Arc<AdapterRegistry>,
}

impl Executor {
    /// Create an executor from a router and adapters
    pub fn new(router: Router, adapters: AdapterRegistry) -> Self {
        Self {
            router,
            adapters: Arc::new(adapters),
        }
    }

    /// Create a new builder
    pub fn builder() -> ExecutorBuilder {
        ExecutorBuilder::new()
    }

    /// Create an executor from configuration
    pub fn from_config(config: &Config, adapters: AdapterRegistry) -> Result<Self> {
        let registry = CapabilityRegistry::from_config(config)?;
        Ok(ExecutorBuilder::new()
            .registry(registry)
            .scoring(config.scoring.clone())
            .adapters(adapters)
            .build())
    }

    /// Create an executor from the configuration file in the default location
    pub fn load(adapters: AdapterRegistry) -> Result<Self> {
        let config = Config::load().map_err(|e| Error::ConfigError(format!("{:#}", e)))?;
        Self::from_config(&config, adapters)
    }

    /// Create an executor from a specific configuration file
    ///
    /// Read and parse failures surface as `ConfigError`.
    pub fn load_from(path: &Path, adapters: AdapterRegistry) -> Result<Self> {
        let config = Config::load_from(path).map_err(|e| Error::ConfigError(format!("{:#}", e)))?;
        Self::from_config(&config, adapters)
    }

    /// Execute a task
    ///
    /// Returns the result of the first successful attempt. When the primary
    /// candidate fails, exactly one fallback is tried if another candidate
    /// exists; if that fails too (or none exists) the caller receives
    /// `ExecutionExhausted` carrying both failures.
    pub async fn execute(&self, task: Task) -> Result<ExecutionResult> {
        let task_id = task
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let primary = self
            .router
            .rank(&task)?
            .into_iter()
            .next()
            .ok_or(Error::NoCapabilityForCategory(task.category))?;

        let primary_failure = match self.attempt(&task, &task_id, &primary.capability).await {
            Ok(result) => return Ok(result),
            Err(Error::ProviderExecutionFailed(failure)) => failure,
            Err(other) => return Err(other),
        };

        warn!(
            task_id = %task_id,
            capability = %primary_failure.capability,
            error = %primary_failure.error,
            "Primary attempt failed, looking for a fallback"
        );

        let fallback = self
            .router
            .rank_excluding(&task, std::slice::from_ref(&primary_failure.capability))?
            .into_iter()
            .next();

        let Some(fallback) = fallback else {
            warn!(task_id = %task_id, "No fallback candidate available");
            return Err(Error::ExecutionExhausted {
                last: primary_failure.clone(),
                primary: primary_failure,
                attempts: 1,
            });
        };

        match self.attempt(&task, &task_id, &fallback.capability).await {
            Ok(result) => Ok(result),
            Err(Error::ProviderExecutionFailed(last)) => {
                warn!(
                    task_id = %task_id,
                    primary = %primary_failure.capability,
                    fallback = %last.capability,
                    "Fallback attempt failed, giving up"
                );
                Err(Error::ExecutionExhausted {
                    primary: primary_failure,
                    last,
                    attempts: 2,
                })
            }
            Err(other) => Err(other),
        }
    }

    /// Run one attempt against one capability and record its outcome
    ///
    /// A failed call surfaces as `ProviderExecutionFailed`.
    async fn attempt(
        &self,
        task: &Task,
        task_id: &str,
        capability: &Capability,
    ) -> Result<ExecutionResult> {
        let id = capability.id();
        debug!(task_id = %task_id, capability = %id, "Attempting execution");

        let started = Instant::now();
        let outcome = match self.adapters.resolve(&id) {
            Ok(adapter) => adapter.execute(task, &capability.model).await,
            Err(e) => Err(e),
        };
        let elapsed = started.elapsed();

        self.router.record_outcome(&id, elapsed, outcome.is_ok());

        match outcome {
            Ok(mut result) => {
                result.task_id = task_id.to_string();
                result.model = capability.model.clone();
                result.provider = capability.provider.clone();
                result.latency_ms = duration_ms(elapsed);
                result.cost = capability.cost_for(result.usage.total_units);

                if let (Some(wanted), Some(got)) = (task.constraints.min_confidence, result.confidence) {
                    if got < wanted {
                        debug!(
                            task_id = %task_id,
                            capability = %id,
                            confidence = got,
                            min_confidence = wanted,
                            "Result confidence below the task's minimum"
                        );
                    }
                }

                info!(
                    task_id = %task_id,
                    capability = %id,
                    latency_ms = result.latency_ms,
                    units = result.usage.total_units,
                    cost = result.cost,
                    "Task executed"
                );
                Ok(result)
            }
            Err(error) => Err(Error::ProviderExecutionFailed(AttemptFailure {
                capability: id,
                latency_ms: duration_ms(elapsed),
                error,
            })),
        }
    }

    /// Get the router
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Get the adapters
    pub fn adapters(&self) -> &AdapterRegistry {
        &self.adapters
    }

    /// Copy of all performance records, for monitoring
    pub fn performance_snapshot(&self) -> HashMap<CapabilityId, PerformanceRecord> {
        self.router.snapshot()
    }
}

/// Builder for Executor
pub struct ExecutorBuilder {
    registry: Option<CapabilityRegistry>,
    performance: Option<Arc<PerformanceStore>>,
    scoring: ScoringConfig,
    adapters: AdapterRegistry,
}

impl Default for ExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutorBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            registry: None,
            performance: None,
            scoring: ScoringConfig::default(),
            adapters: AdapterRegistry::new(),
        }
    }

    /// Set capability registry
    pub fn registry(mut self, registry: CapabilityRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Share an existing performance store
    pub fn performance(mut self, store: Arc<PerformanceStore>) -> Self {
        self.performance = Some(store);
        self
    }

    /// Set scoring weights
    pub fn scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    /// Set all adapters at once
    pub fn adapters(mut self, adapters: AdapterRegistry) -> Self {
        self.adapters = adapters;
        self
    }

    /// Add one adapter
    pub fn adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Result<Self> {
        self.adapters.register(adapter)?;
        Ok(self)
    }

    /// Build the executor
    pub fn build(self) -> Executor {
        let registry = Arc::new(
            self.registry
                .unwrap_or_else(CapabilityRegistry::with_defaults),
        );
        let performance = self
            .performance
            .unwrap_or_else(|| Arc::new(PerformanceStore::new()));

        Executor::new(
            Router::with_store(registry, performance).with_scoring(self.scoring),
            self.adapters,
        )
    }
}
