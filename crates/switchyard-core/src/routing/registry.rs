//! Capability registry
//!
//! The catalog of (provider, model) capabilities. It is built once at
//! startup, then shared read-only (behind an `Arc`) by every router, so
//! lookups take no locks.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use super::types::{Capability, CapabilityId, TaskCategory};
use crate::config::Config;
use crate::error::{Error, Result};

/// Categories a strength tag serves in addition to its own name.
///
/// A tag that is itself a category name serves that category directly;
/// this table only lists the indirect ("compatible") mappings.
pub fn compatible_categories(strength: &str) -> &'static [TaskCategory] {
    use TaskCategory::*;

    match strength {
        "pattern_recognition" => &[TrendDetection, ContentAnalysis, Classification],
        "fast_iteration" => &[Conversation, Classification, Summarization],
        "long_context" => &[Summarization, DataExtraction, ContentAnalysis],
        "structured_output" => &[DataExtraction, Classification],
        "deep_reasoning" => &[Reasoning, CodeGeneration, ContentAnalysis],
        "storytelling" => &[CreativeGeneration, Conversation],
        "multimodal" => &[ContentAnalysis, DataExtraction],
        "instruction_following" => &[CodeGeneration, DataExtraction, Conversation],
        _ => &[],
    }
}

/// Whether a capability serves a category, directly or through the compatibility map
pub fn serves(capability: &Capability, category: TaskCategory) -> bool {
    capability.directly_serves(category)
        || capability
            .strengths
            .iter()
            .any(|s| compatible_categories(s).contains(&category))
}

/// Registry of available capabilities, in registration order
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    capabilities: Vec<Arc<Capability>>,
    ids: HashSet<CapabilityId>,
}

impl CapabilityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            capabilities: Vec::new(),
            ids: HashSet::new(),
        }
    }

    /// Create a registry with the built-in catalog
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        for capability in default_catalog() {
            // The built-in catalog has unique pairs; a clash would be a typo above.
            if let Err(e) = registry.register(capability) {
                warn!(error = %e, "Skipping built-in capability");
            }
        }

        registry
    }

    /// Build a registry from a list of capabilities, preserving order
    pub fn from_capabilities(capabilities: impl IntoIterator<Item = Capability>) -> Result<Self> {
        let mut registry = Self::new();
        for capability in capabilities {
            registry.register(capability)?;
        }
        Ok(registry)
    }

    /// Build a registry from the configured capability table
    ///
    /// An empty table falls back to the built-in catalog.
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.capabilities.is_empty() {
            debug!("No capabilities configured, using built-in catalog");
            return Ok(Self::with_defaults());
        }
        Self::from_capabilities(config.capabilities.iter().cloned())
    }

    /// Register a capability
    ///
    /// Fails with `DuplicateCapability` when the (provider, model) pair is
    /// already present; existing entries are left untouched.
    pub fn register(&mut self, capability: Capability) -> Result<()> {
        let id = capability.id();

        if self.ids.contains(&id) {
            warn!(capability = %id, "Rejected duplicate capability registration");
            return Err(Error::DuplicateCapability {
                provider: id.provider,
                model: id.model,
            });
        }

        debug!(capability = %id, strengths = ?capability.strengths, "Registered capability");
        self.ids.insert(id);
        self.capabilities.push(Arc::new(capability));
        Ok(())
    }

    /// All capabilities that serve a category, in registration order.
    ///
    /// Returns an empty list when nothing matches.
    pub fn candidates_for(&self, category: TaskCategory) -> Vec<Arc<Capability>> {
        self.capabilities
            .iter()
            .filter(|c| serves(c, category))
            .cloned()
            .collect()
    }

    /// Get a capability by id
    pub fn get(&self, id: &CapabilityId) -> Option<&Arc<Capability>> {
        if !self.ids.contains(id) {
            return None;
        }
        self.capabilities
            .iter()
            .find(|c| c.provider == id.provider && c.model == id.model)
    }

    /// Get all capabilities in registration order
    pub fn all(&self) -> impl Iterator<Item = &Arc<Capability>> {
        self.capabilities.iter()
    }

    /// Number of registered capabilities
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

fn default_catalog() -> Vec<Capability> {
    vec![
        Capability::new("anthropic", "claude-sonnet-4")
            .with_strengths([
                "creative_generation",
                "deep_reasoning",
                "long_context",
                "code_generation",
            ])
            .with_cost(3.0)
            .with_latency_ms(2500)
            .with_limits(180_000, 200_000),
        Capability::new("anthropic", "claude-3-5-haiku")
            .with_strengths(["fast_iteration", "summarization", "structured_output"])
            .with_cost(0.8)
            .with_latency_ms(700)
            .with_limits(180_000, 200_000),
        Capability::new("openai", "gpt-4o")
            .with_strengths(["content_analysis", "multimodal", "instruction_following"])
            .with_cost(2.5)
            .with_latency_ms(1800)
            .with_limits(100_000, 128_000),
        Capability::new("openai", "gpt-4o-mini")
            .with_strengths(["fast_iteration", "classification", "structured_output"])
            .with_cost(0.15)
            .with_latency_ms(600)
            .with_limits(100_000, 128_000),
        Capability::new("google", "gemini-1.5-pro")
            .with_strengths(["long_context", "pattern_recognition", "trend_detection"])
            .with_cost(1.25)
            .with_latency_ms(2200)
            .with_limits(1_000_000, 2_000_000),
        Capability::new("groq", "llama-3.1-8b-instant")
            .with_strengths(["conversation", "fast_iteration"])
            .with_cost(0.05)
            .with_latency_ms(250)
            .with_limits(6_000, 8_192),
        Capability::new("groq", "llama-3.1-70b-versatile")
            .with_strengths(["storytelling", "reasoning"])
            .with_cost(0.6)
            .with_latency_ms(900)
            .with_limits(24_000, 32_768),
    ]
}
