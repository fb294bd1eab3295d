//! Usage Tracking
//!
//! Per-user, per-coupon application counts. Counts only ever grow; a count is recorded
//! only after a successful application.

use rustc_hash::FxHashMap;

/// Storage for coupon usage counts.
pub trait UsageStore {
    /// How many times `user_id` has applied `code`. Zero if never.
    fn usage_count(&self, user_id: &str, code: &str) -> u32;

    /// Record one more application of `code` by `user_id` and return the new count.
    fn record_usage(&mut self, user_id: &str, code: &str) -> u32;
}

/// In-memory usage tracker keyed by user id, then coupon code.
#[derive(Debug, Clone, Default)]
pub struct UsageTracker {
    counts: FxHashMap<String, FxHashMap<String, u32>>,
}

impl UsageTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all recorded usage.
    pub fn reset(&mut self) {
        self.counts.clear();
    }

    /// Number of users with at least one recorded application.
    pub fn user_count(&self) -> usize {
        self.counts.len()
    }
}

impl UsageStore for UsageTracker {
    fn usage_count(&self, user_id: &str, code: &str) -> u32 {
        self.counts
            .get(user_id)
            .and_then(|codes| codes.get(code))
            .copied()
            .unwrap_or(0)
    }

    fn record_usage(&mut self, user_id: &str, code: &str) -> u32 {
        let count = self
            .counts
            .entry(user_id.to_string())
            .or_default()
            .entry(code.to_string())
            .or_insert(0);

        *count = count.saturating_add(1);

        *count
    }
}
