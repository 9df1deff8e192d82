//! Candidate scoring
//!
//! A pure ranking of candidate capabilities for a task. Scores start from a
//! flat base and move with the task's latency, cost, and size constraints,
//! the capability's observed success rate, and whether it serves the task's
//! category directly.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::performance::{DEFAULT_SUCCESS_RATE, PerformanceRecord};
use super::types::{Capability, CapabilityId, Task};

/// Weights used by the scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Starting score of every candidate
    pub base_score: f64,
    /// Subtracted when effective latency exceeds the task's ceiling
    pub latency_penalty: f64,
    /// Latency headroom (ms) is divided by this to form the bonus
    pub latency_headroom_divisor: f64,
    /// Subtracted when declared cost exceeds the task's ceiling
    pub cost_penalty: f64,
    /// Subtracted when the estimated input exceeds the capability's limit
    pub input_size_penalty: f64,
    /// Multiplied by the success rate
    pub success_weight: f64,
    /// Added when a strength names the task's category
    pub direct_match_bonus: f64,
    /// Success rate assumed for capabilities with no history
    pub default_success_rate: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_score: 100.0,
            latency_penalty: 50.0,
            latency_headroom_divisor: 100.0,
            cost_penalty: 30.0,
            input_size_penalty: 40.0,
            success_weight: 20.0,
            direct_match_bonus: 30.0,
            default_success_rate: DEFAULT_SUCCESS_RATE,
        }
    }
}

/// A candidate together with its score
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    /// The capability
    pub capability: Arc<Capability>,
    /// Total score, higher is better
    pub score: f64,
    /// Whether a strength names the task's category
    pub direct_match: bool,
}

impl ScoredCandidate {
    /// Identity of the scored capability
    pub fn id(&self) -> CapabilityId {
        self.capability.id()
    }
}

/// Ranks candidates for a task
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    config: ScoringConfig,
}

impl Scorer {
    /// Create a scorer with the given weights
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Get the weights in use
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one capability for a task
    pub fn score(
        &self,
        task: &Task,
        capability: &Capability,
        record: Option<&PerformanceRecord>,
    ) -> f64 {
        let weights = &self.config;
        let constraints = &task.constraints;
        let mut score = weights.base_score;

        if let Some(max_latency) = constraints.max_latency_ms {
            let max_latency = max_latency as f64;
            let effective = record
                .and_then(PerformanceRecord::average_latency_ms)
                .unwrap_or(capability.avg_latency_ms as f64);

            if effective > max_latency {
                score -= weights.latency_penalty;
            } else {
                score += (max_latency - effective) / weights.latency_headroom_divisor;
            }
        }

        if let Some(max_cost) = constraints.max_cost {
            if capability.cost_per_unit > max_cost {
                score -= weights.cost_penalty;
            }
            score += max_cost - capability.cost_per_unit;
        }

        if let Some(estimated) = task.estimated_units {
            if capability.max_input_units < estimated {
                score -= weights.input_size_penalty;
            }
        }

        let success_rate = record
            .map(|r| r.success_rate_or(weights.default_success_rate))
            .unwrap_or(weights.default_success_rate);
        score += success_rate * weights.success_weight;

        if capability.directly_serves(task.category) {
            score += weights.direct_match_bonus;
        }

        score
    }

    /// Rank candidates, best first
    ///
    /// Ties keep the order the candidates were given in, which is
    /// registration order when they come from the registry.
    pub fn rank(
        &self,
        task: &Task,
        candidates: Vec<Arc<Capability>>,
        records: &HashMap<CapabilityId, PerformanceRecord>,
    ) -> Vec<ScoredCandidate> {
        let mut scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .map(|capability| {
                let record = records.get(&capability.id());
                ScoredCandidate {
                    score: self.score(task, &capability, record),
                    direct_match: capability.directly_serves(task.category),
                    capability,
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored
    }
}
