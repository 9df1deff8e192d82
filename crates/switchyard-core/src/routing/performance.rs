//! Rolling per-capability performance statistics
//!
//! Every execution attempt, successful or not, lands here. The scorer reads
//! the derived success rate and average latency back out when ranking.
//!
//! Each capability's record sits behind its own mutex, so writers to
//! different capabilities never contend; the outer map lock is held only
//! long enough to find or insert an entry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::CapabilityId;

/// Success rate reported for a capability with no observations
pub const DEFAULT_SUCCESS_RATE: f64 = 1.0;

/// Statistics for one capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    /// Total number of attempts
    pub total_calls: u64,
    /// Number of successful attempts
    pub successful_calls: u64,
    /// Sum of observed latencies in milliseconds
    pub total_latency_ms: f64,
    /// When the record last changed
    pub last_updated: DateTime<Utc>,
}

impl PerformanceRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self {
            total_calls: 0,
            successful_calls: 0,
            total_latency_ms: 0.0,
            last_updated: Utc::now(),
        }
    }

    /// Fold one observation into the record
    pub fn observe(&mut self, latency: Duration, success: bool) {
        self.total_calls += 1;
        if success {
            self.successful_calls += 1;
        }
        self.total_latency_ms += duration_ms(latency);
        self.last_updated = Utc::now();
    }

    /// Number of failed attempts
    pub fn failed_calls(&self) -> u64 {
        self.total_calls - self.successful_calls
    }

    /// Successful / total, or `DEFAULT_SUCCESS_RATE` with no observations
    pub fn success_rate(&self) -> f64 {
        self.success_rate_or(DEFAULT_SUCCESS_RATE)
    }

    /// Successful / total, or `default` with no observations
    pub fn success_rate_or(&self, default: f64) -> f64 {
        if self.total_calls == 0 {
            return default;
        }
        self.successful_calls as f64 / self.total_calls as f64
    }

    /// Mean observed latency, if anything has been observed
    pub fn average_latency_ms(&self) -> Option<f64> {
        if self.total_calls == 0 {
            return None;
        }
        Some(self.total_latency_ms / self.total_calls as f64)
    }
}

/// Milliseconds as a float, exact for whole-millisecond durations
pub(crate) fn duration_ms(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}

impl Default for PerformanceRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared store of performance records, keyed by capability
#[derive(Debug, Default)]
pub struct PerformanceStore {
    records: RwLock<HashMap<CapabilityId, Arc<Mutex<PerformanceRecord>>>>,
}

impl PerformanceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Record one attempt against a capability
    ///
    /// The record is created on first use. The update is atomic per
    /// capability: concurrent callers for the same key are serialized.
    pub fn record(&self, capability: &CapabilityId, latency: Duration, success: bool) {
        let entry = self.entry(capability);
        let mut record = entry.lock().unwrap_or_else(PoisonError::into_inner);
        record.observe(latency, success);
    }

    /// Copy of one capability's record
    pub fn get(&self, capability: &CapabilityId) -> Option<PerformanceRecord> {
        let entry = {
            let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
            records.get(capability).cloned()
        }?;
        let record = entry.lock().unwrap_or_else(PoisonError::into_inner);
        Some(record.clone())
    }

    /// Copies of the records for the given capabilities that have any
    pub fn snapshot_for<'a>(
        &self,
        capabilities: impl IntoIterator<Item = &'a CapabilityId>,
    ) -> HashMap<CapabilityId, PerformanceRecord> {
        capabilities
            .into_iter()
            .filter_map(|id| self.get(id).map(|record| (id.clone(), record)))
            .collect()
    }

    /// Copies of every record
    ///
    /// Each record is internally consistent; records for different
    /// capabilities may be read at slightly different moments.
    pub fn snapshot(&self) -> HashMap<CapabilityId, PerformanceRecord> {
        let entries: Vec<(CapabilityId, Arc<Mutex<PerformanceRecord>>)> = {
            let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
            records
                .iter()
                .map(|(id, entry)| (id.clone(), Arc::clone(entry)))
                .collect()
        };

        entries
            .into_iter()
            .map(|(id, entry)| {
                let record = entry.lock().unwrap_or_else(PoisonError::into_inner);
                (id, record.clone())
            })
            .collect()
    }

    /// Number of capabilities with a record
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all records (useful for testing)
    pub fn reset(&self) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn entry(&self, capability: &CapabilityId) -> Arc<Mutex<PerformanceRecord>> {
        {
            let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = records.get(capability) {
                return Arc::clone(entry);
            }
        }

        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            records
                .entry(capability.clone())
                .or_insert_with(|| Arc::new(Mutex::new(PerformanceRecord::new()))),
        )
    }
}
