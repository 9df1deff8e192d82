//! Provider-facing result and error types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Error returned by a provider adapter for a single call
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("provider rejected the call ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("model '{model}' is not served by provider '{provider}'")]
    UnsupportedModel { provider: String, model: String },

    #[error("timed out after {0}ms")]
    Timeout(u64),

    #[error("{0}")]
    Other(String),
}

/// Units of work consumed by one execution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Units read
    pub input_units: u64,
    /// Units produced
    pub output_units: u64,
    /// Input plus output
    pub total_units: u64,
}

impl Usage {
    /// Create a new usage record
    pub fn new(input_units: u64, output_units: u64) -> Self {
        Self {
            input_units,
            output_units,
            total_units: input_units + output_units,
        }
    }
}

/// Outcome of a successful execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Identifier of the task this answers
    pub task_id: String,
    /// Model that produced the output
    pub model: String,
    /// Provider that served the model
    pub provider: String,
    /// Output payload
    pub output: String,
    /// Units consumed
    pub usage: Usage,
    /// Wall-clock latency of the attempt in milliseconds
    pub latency_ms: f64,
    /// Cost of the attempt
    pub cost: f64,
    /// Provider's confidence in the output (0.0 to 1.0)
    pub confidence: Option<f64>,
    /// Additional metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ExecutionResult {
    /// Create a result carrying only output; the executor fills in identity,
    /// latency, and cost before handing it to the caller
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            task_id: String::new(),
            model: String::new(),
            provider: String::new(),
            output: output.into(),
            usage: Usage::default(),
            latency_ms: 0.0,
            cost: 0.0,
            confidence: None,
            metadata: HashMap::new(),
        }
    }

    /// Set usage
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    /// Set confidence
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}
