//! Router - ranks registered capabilities for a task
//!
//! Combines the read-only capability registry, the scorer, and the live
//! performance store. The router never mutates routing state itself; the
//! executor reports outcomes through [`Router::record_outcome`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::performance::{PerformanceRecord, PerformanceStore};
use super::registry::CapabilityRegistry;
use super::scorer::{ScoredCandidate, Scorer, ScoringConfig};
use super::types::{Capability, CapabilityId, Task};
use crate::error::{Error, Result};

/// Capability router
///
/// Cheap to clone; clones share the same registry and performance store.
#[derive(Debug, Clone)]
pub struct Router {
    registry: Arc<CapabilityRegistry>,
    performance: Arc<PerformanceStore>,
    scorer: Scorer,
}

impl Router {
    /// Create a router over a registry with a fresh performance store
    pub fn new(registry: CapabilityRegistry) -> Self {
        Self::with_store(Arc::new(registry), Arc::new(PerformanceStore::new()))
    }

    /// Create a router over shared state
    pub fn with_store(registry: Arc<CapabilityRegistry>, performance: Arc<PerformanceStore>) -> Self {
        Self {
            registry,
            performance,
            scorer: Scorer::default(),
        }
    }

    /// Use custom scoring weights
    pub fn with_scoring(mut self, config: ScoringConfig) -> Self {
        self.scorer = Scorer::new(config);
        self
    }

    /// Rank every eligible capability for a task, best first
    ///
    /// Fails with `NoCapabilityForCategory` when nothing serves the task.
    pub fn rank(&self, task: &Task) -> Result<Vec<ScoredCandidate>> {
        self.rank_excluding(task, &[])
    }

    /// Rank eligible capabilities, leaving out the excluded ones
    ///
    /// Still fails with `NoCapabilityForCategory` when the category has no
    /// candidates at all; an empty list means every candidate was excluded.
    pub fn rank_excluding(
        &self,
        task: &Task,
        excluded: &[CapabilityId],
    ) -> Result<Vec<ScoredCandidate>> {
        let candidates: Vec<Arc<Capability>> = self
            .candidates(task)?
            .into_iter()
            .filter(|c| !excluded.contains(&c.id()))
            .collect();

        let ids: Vec<CapabilityId> = candidates.iter().map(|c| c.id()).collect();
        let records = self.performance.snapshot_for(ids.iter());
        let ranked = self.scorer.rank(task, candidates, &records);

        debug!(
            category = %task.category,
            excluded = excluded.len(),
            ranking = ?ranked
                .iter()
                .map(|c| format!("{}={:.2}", c.capability.id(), c.score))
                .collect::<Vec<_>>(),
            "Ranked candidates for task"
        );

        Ok(ranked)
    }

    /// Capabilities that may serve a task, in registration order
    fn candidates(&self, task: &Task) -> Result<Vec<Arc<Capability>>> {
        let mut candidates = self.registry.candidates_for(task.category);

        if let Some(provider) = &task.constraints.required_provider {
            candidates.retain(|c| &c.provider == provider);
        }

        if candidates.is_empty() {
            return Err(Error::NoCapabilityForCategory(task.category));
        }

        Ok(candidates)
    }

    /// Record the outcome of one attempt
    pub fn record_outcome(&self, capability: &CapabilityId, latency: Duration, success: bool) {
        self.performance.record(capability, latency, success);
    }

    /// Copy of all performance records
    pub fn snapshot(&self) -> HashMap<CapabilityId, PerformanceRecord> {
        self.performance.snapshot()
    }

    /// Get the capability registry
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Get the performance store
    pub fn performance(&self) -> &Arc<PerformanceStore> {
        &self.performance
    }

    /// Get the scoring weights
    pub fn scoring(&self) -> &ScoringConfig {
        self.scorer.config()
    }
}
