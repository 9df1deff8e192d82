//! Switchyard Core Integration Tests

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use switchyard_core::{
    Error, Executor,
    config::Config,
    provider::{AdapterRegistry, ExecutionResult, ProviderAdapter, ProviderError, Usage},
    routing::{Capability, CapabilityId, CapabilityRegistry, Router, Task, TaskCategory},
};

/// Adapter that fails on a fixed set of models and counts every call
struct ScriptedAdapter {
    name: &'static str,
    models: Vec<String>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl ScriptedAdapter {
    fn new(name: &'static str, models: &[&str], failing: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            name,
            models: models.iter().map(|m| m.to_string()).collect(),
            failing: failing.iter().map(|m| m.to_string()).collect(),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    fn name(&self) -> &str {
        self.name
    }

    async fn execute(&self, task: &Task, model: &str) -> Result<ExecutionResult, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(1)).await;

        if self.failing.contains(model) {
            return Err(ProviderError::Request(format!("{} unreachable", model)));
        }
        Ok(ExecutionResult::new(task.payload.to_uppercase()).with_usage(Usage::new(800, 200)))
    }

    fn supported_models(&self) -> Vec<String> {
        self.models.clone()
    }
}

/// A: fast and expensive, B: slow and cheap
fn fast_and_cheap() -> CapabilityRegistry {
    CapabilityRegistry::from_capabilities([
        Capability::new("lab", "a")
            .with_strengths(["classification"])
            .with_latency_ms(100)
            .with_cost(1.0),
        Capability::new("lab", "b")
            .with_strengths(["classification"])
            .with_latency_ms(2000)
            .with_cost(0.1),
    ])
    .unwrap()
}

fn top_model(router: &Router, task: &Task) -> String {
    router.rank(task).unwrap()[0].capability.model.clone()
}

#[test]
fn test_latency_ceiling_prefers_fast_capability() {
    let router = Router::new(fast_and_cheap());
    let task = Task::new(TaskCategory::Classification, "label me").with_max_latency_ms(500);

    assert_eq!(top_model(&router, &task), "a");
}

#[test]
fn test_cost_ceiling_prefers_cheap_capability() {
    let router = Router::new(fast_and_cheap());
    let task = Task::new(TaskCategory::Classification, "label me").with_max_cost(0.05);

    let ranked = router.rank(&task).unwrap();
    assert_eq!(ranked[0].capability.model, "b");
    assert!(ranked[0].score > ranked[1].score);
}

#[test]
fn test_repeated_failures_sink_capability() {
    let router = Router::new(fast_and_cheap());
    let task = Task::new(TaskCategory::Classification, "label me");
    let a = CapabilityId::new("lab", "a");

    for _ in 0..3 {
        router.record_outcome(&a, Duration::from_millis(100), false);
    }

    let record = router.performance().get(&a).unwrap();
    assert_eq!(record.success_rate(), 0.0);
    assert_eq!(record.total_calls, 3);

    let ranked = router.rank(&task).unwrap();
    assert_eq!(ranked[0].capability.model, "b");
    assert!(ranked[0].score > ranked[1].score);
    assert!(router.performance().get(&CapabilityId::new("lab", "b")).is_none());
}

#[test]
fn test_performance_accumulation_is_exact() {
    let router = Router::new(fast_and_cheap());
    let a = CapabilityId::new("lab", "a");

    router.record_outcome(&a, Duration::from_millis(10), true);
    router.record_outcome(&a, Duration::from_millis(20), false);
    router.record_outcome(&a, Duration::from_millis(35), true);

    let record = router.performance().get(&a).unwrap();
    assert_eq!(record.success_rate(), 2.0 / 3.0);
    assert_eq!(record.average_latency_ms(), Some(65.0 / 3.0));
}

#[test]
fn test_every_category_is_served_by_defaults() {
    let router = Router::new(CapabilityRegistry::with_defaults());

    for category in TaskCategory::ALL {
        let task = Task::new(category, "anything");
        assert!(!router.rank(&task).unwrap().is_empty());
    }
}

fn executor_with(adapter: Arc<ScriptedAdapter>) -> Executor {
    Executor::builder()
        .registry(fast_and_cheap())
        .adapter(adapter)
        .unwrap()
        .build()
}

#[tokio::test]
async fn test_fallback_happens_exactly_once() {
    let adapter = ScriptedAdapter::new("lab", &["a", "b"], &["a"]);
    let executor = executor_with(Arc::clone(&adapter));
    let task = Task::new(TaskCategory::Classification, "label me")
        .with_id("task-42")
        .with_max_latency_ms(500);

    let result = executor.execute(task).await.unwrap();

    assert_eq!(adapter.calls(), 2);
    assert_eq!(result.task_id, "task-42");
    assert_eq!(result.model, "b");
    assert_eq!(result.output, "LABEL ME");
    assert!(result.latency_ms >= 1.0);
    // 0.1 per thousand units * 1000 units
    assert!((result.cost - 0.1).abs() < 1e-9);

    let snapshot = executor.performance_snapshot();
    assert_eq!(snapshot[&CapabilityId::new("lab", "a")].successful_calls, 0);
    assert_eq!(snapshot[&CapabilityId::new("lab", "b")].successful_calls, 1);
}

#[tokio::test]
async fn test_both_attempts_fail() {
    let adapter = ScriptedAdapter::new("lab", &["a", "b"], &["a", "b"]);
    let executor = executor_with(Arc::clone(&adapter));

    let err = executor
        .execute(Task::new(TaskCategory::Classification, "label me"))
        .await
        .unwrap_err();

    assert_eq!(adapter.calls(), 2);
    assert_eq!(err.code(), "E1202");
    assert!(err.is_terminal());
    let failures = err.attempt_failures();
    assert_eq!(failures.len(), 2);
    assert_ne!(failures[0].capability, failures[1].capability);
}

#[tokio::test]
async fn test_single_candidate_exhaustion() {
    let adapter = ScriptedAdapter::new("lab", &["solo"], &["solo"]);
    let registry = CapabilityRegistry::from_capabilities([
        Capability::new("lab", "solo").with_strengths(["reasoning"]),
    ])
    .unwrap();
    let executor = Executor::builder()
        .registry(registry)
        .adapter(Arc::clone(&adapter) as Arc<dyn ProviderAdapter>)
        .unwrap()
        .build();

    let err = executor
        .execute(Task::new(TaskCategory::Reasoning, "why?"))
        .await
        .unwrap_err();

    match err {
        Error::ExecutionExhausted {
            primary,
            last,
            attempts,
        } => {
            assert_eq!(attempts, 1);
            assert_eq!(primary, last);
        }
        other => panic!("expected ExecutionExhausted, got {:?}", other),
    }
    assert_eq!(adapter.calls(), 1);
    assert_eq!(executor.performance_snapshot().len(), 1);
}

#[tokio::test]
async fn test_concurrent_executions_share_feedback() {
    let adapter = ScriptedAdapter::new("lab", &["a", "b"], &[]);
    let executor = executor_with(Arc::clone(&adapter));

    let mut handles = Vec::new();
    for i in 0..32 {
        let executor = executor.clone();
        handles.push(tokio::spawn(async move {
            let task = Task::new(TaskCategory::Classification, format!("item {}", i));
            executor.execute(task).await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    let total: u64 = executor
        .performance_snapshot()
        .values()
        .map(|r| r.total_calls)
        .sum();
    assert_eq!(total, 32);
    assert_eq!(adapter.calls(), 32);
}

#[tokio::test]
async fn test_executor_from_config() {
    let config = Config::from_toml_str(
        r#"
        [scoring]
        default_success_rate = 0.5

        [[capabilities]]
        provider = "lab"
        model = "b"
        strengths = ["summarization"]
        cost_per_unit = 0.1
        "#,
    )
    .unwrap();

    let mut adapters = AdapterRegistry::new();
    adapters
        .register(ScriptedAdapter::new("lab", &["b"], &[]))
        .unwrap();
    let executor = Executor::from_config(&config, adapters).unwrap();

    assert_eq!(executor.router().scoring().default_success_rate, 0.5);
    let result = executor
        .execute(Task::new(TaskCategory::Summarization, "abc"))
        .await
        .unwrap();
    assert_eq!(result.provider, "lab");
}
