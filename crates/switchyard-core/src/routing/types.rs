//! Types for capability-aware task routing
//!
//! This module defines the units the router works with: the task a caller
//! submits, the constraints it declares, and the (provider, model)
//! capabilities it can be routed to.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Recognized kinds of work a task can represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    /// Long-form or stylistic content creation
    CreativeGeneration,
    /// Reading and interpreting existing content
    ContentAnalysis,
    /// Spotting movements across a series of observations
    TrendDetection,
    /// Condensing content
    Summarization,
    /// Assigning labels from a known set
    Classification,
    /// Multi-step reasoning and planning
    Reasoning,
    /// Writing or transforming source code
    CodeGeneration,
    /// Pulling structured fields out of unstructured input
    DataExtraction,
    /// Short interactive turns
    Conversation,
}

impl TaskCategory {
    /// Every category, in declaration order
    pub const ALL: [TaskCategory; 9] = [
        Self::CreativeGeneration,
        Self::ContentAnalysis,
        Self::TrendDetection,
        Self::Summarization,
        Self::Classification,
        Self::Reasoning,
        Self::CodeGeneration,
        Self::DataExtraction,
        Self::Conversation,
    ];

    /// The strength tag that directly matches this category
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreativeGeneration => "creative_generation",
            Self::ContentAnalysis => "content_analysis",
            Self::TrendDetection => "trend_detection",
            Self::Summarization => "summarization",
            Self::Classification => "classification",
            Self::Reasoning => "reasoning",
            Self::CodeGeneration => "code_generation",
            Self::DataExtraction => "data_extraction",
            Self::Conversation => "conversation",
        }
    }
}

impl std::fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| format!("Unknown task category: {}", s))
    }
}

/// Identity of a capability: one (provider, model) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CapabilityId {
    /// Provider identifier (e.g., "anthropic")
    pub provider: String,
    /// Model identifier (e.g., "claude-3-5-haiku")
    pub model: String,
}

impl CapabilityId {
    /// Create a new capability id
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }
}

impl std::fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

/// A deployable (provider, model) pair and what it declares about itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capability {
    /// Model identifier
    pub model: String,
    /// Provider identifier
    pub provider: String,
    /// Strength tags this capability declares
    pub strengths: Vec<String>,
    /// Cost per thousand units of work
    pub cost_per_unit: f64,
    /// Declared average latency in milliseconds
    pub avg_latency_ms: u64,
    /// Largest single input accepted, in units
    pub max_input_units: usize,
    /// Largest total context accepted, in units
    pub max_context_units: usize,
}

impl Capability {
    /// Create a new capability with neutral defaults
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            provider: provider.into(),
            strengths: Vec::new(),
            cost_per_unit: 1.0,
            avg_latency_ms: 1000,
            max_input_units: 32_000,
            max_context_units: 128_000,
        }
    }

    /// Set declared strengths
    pub fn with_strengths<I, S>(mut self, strengths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strengths = strengths.into_iter().map(Into::into).collect();
        self
    }

    /// Set cost per thousand units
    pub fn with_cost(mut self, cost_per_unit: f64) -> Self {
        self.cost_per_unit = cost_per_unit;
        self
    }

    /// Set declared latency
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.avg_latency_ms = latency_ms;
        self
    }

    /// Set input and context limits
    pub fn with_limits(mut self, max_input_units: usize, max_context_units: usize) -> Self {
        self.max_input_units = max_input_units;
        self.max_context_units = max_context_units;
        self
    }

    /// Identity of this capability
    pub fn id(&self) -> CapabilityId {
        CapabilityId::new(self.provider.clone(), self.model.clone())
    }

    /// Whether a strength tag equals the category itself
    pub fn directly_serves(&self, category: TaskCategory) -> bool {
        self.strengths.iter().any(|s| s == category.as_str())
    }

    /// Cost of a piece of work of the given size
    pub fn cost_for(&self, units: u64) -> f64 {
        self.cost_per_unit * units as f64 / 1000.0
    }
}

impl Default for Capability {
    fn default() -> Self {
        Self::new("", "")
    }
}

/// Per-call constraints a task may declare
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskConstraints {
    /// Maximum acceptable latency in milliseconds
    pub max_latency_ms: Option<u64>,
    /// Maximum acceptable cost per thousand units
    pub max_cost: Option<f64>,
    /// Minimum confidence the caller hopes for
    pub min_confidence: Option<f64>,
    /// Only route to this provider
    pub required_provider: Option<String>,
}

/// A unit of work submitted by a caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Caller-supplied identifier
    pub id: Option<String>,
    /// What kind of work this is
    pub category: TaskCategory,
    /// The payload, opaque to the router
    pub payload: String,
    /// Prior context
    pub context: Option<String>,
    /// System instruction for the provider
    pub system_instruction: Option<String>,
    /// Estimated payload size in units
    pub estimated_units: Option<usize>,
    /// Routing constraints
    #[serde(default)]
    pub constraints: TaskConstraints,
    /// Free-form metadata, interpreted by providers
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Task {
    /// Create a new task
    pub fn new(category: TaskCategory, payload: impl Into<String>) -> Self {
        Self {
            id: None,
            category,
            payload: payload.into(),
            context: None,
            system_instruction: None,
            estimated_units: None,
            constraints: TaskConstraints::default(),
            metadata: HashMap::new(),
        }
    }

    /// Set the caller-supplied identifier
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set prior context
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Set the system instruction
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Set the estimated payload size
    pub fn with_estimated_units(mut self, units: usize) -> Self {
        self.estimated_units = Some(units);
        self
    }

    /// Set maximum latency constraint
    pub fn with_max_latency_ms(mut self, max_latency_ms: u64) -> Self {
        self.constraints.max_latency_ms = Some(max_latency_ms);
        self
    }

    /// Set maximum cost constraint
    pub fn with_max_cost(mut self, max_cost: f64) -> Self {
        self.constraints.max_cost = Some(max_cost);
        self
    }

    /// Set minimum confidence
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.constraints.min_confidence = Some(min_confidence.clamp(0.0, 1.0));
        self
    }

    /// Restrict routing to one provider
    pub fn with_required_provider(mut self, provider: impl Into<String>) -> Self {
        self.constraints.required_provider = Some(provider.into());
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Whether the payload carries non-text content, per metadata
    pub fn has_non_text_content(&self) -> bool {
        self.metadata
            .get("has_non_text_content")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}
