//! Capability-aware task routing
//!
//! The key components are:
//!
//! - **Capability Registry**: catalog of (provider, model) pairs with their
//!   declared strengths, cost, latency, and size limits.
//!
//! - **Scorer**: ranks candidates from declared metrics plus live feedback.
//!
//! - **Performance Store**: rolling per-capability success rate and latency.
//!
//! - **Router**: ties the three together for one task at a time.
//!
//! ## How It Works
//!
//! 1. The registry yields every capability whose strengths serve the task's
//!    category, directly or through the compatibility map
//! 2. The scorer ranks them against the task's constraints and each
//!    capability's observed record
//! 3. The executor tries the best one, falling back once on failure
//! 4. Every attempt is recorded, so failing capabilities sink over time
//!
//! ## Example
//!
//! ```rust,ignore
//! use switchyard_core::routing::{CapabilityRegistry, Router, Task, TaskCategory};
//!
//! let router = Router::new(CapabilityRegistry::with_defaults());
//!
//! let task = Task::new(TaskCategory::Summarization, "...").with_max_latency_ms(800);
//! let ranked = router.rank(&task)?;
//! println!("best: {}", ranked[0].capability.id());
//! ```

mod performance;
mod registry;
mod router;
mod scorer;
mod types;

pub use performance::{DEFAULT_SUCCESS_RATE, PerformanceRecord, PerformanceStore};
pub(crate) use performance::duration_ms;
pub use registry::{CapabilityRegistry, compatible_categories, serves};
pub use router::Router;
pub use scorer::{ScoredCandidate, Scorer, ScoringConfig};
pub use types::{Capability, CapabilityId, Task, TaskCategory, TaskConstraints};
