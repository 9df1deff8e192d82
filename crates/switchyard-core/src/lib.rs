//! Switchyard Core Library
//!
//! Capability-aware task routing across model providers:
//! - Capability registry with strength tags and a category compatibility map
//! - Scoring against task constraints and live performance feedback
//! - Execution with a single fallback to the next-best capability
//! - Provider adapters behind one async trait
//! - TOML configuration for weights and the capability table

pub mod config;
pub mod error;
pub mod executor;
pub mod provider;
pub mod routing;

pub use error::{Error, Result};
pub use executor::{Executor, ExecutorBuilder};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{AttemptFailure, Error, Result};
    pub use crate::executor::{Executor, ExecutorBuilder};
    pub use crate::provider::{
        AdapterRegistry, ExecutionResult, ProviderAdapter, ProviderError, Usage,
    };
    pub use crate::routing::{
        Capability, CapabilityId, CapabilityRegistry, Router, Task, TaskCategory,
    };
}
