//! Per-operation limiter table.
//!
//! Limits are keyed by operation name (e.g. `"notes.create"`) and read once
//! at startup. Each name owns exactly one [`RateLimiter`] for the life of
//! the process; callers of the same operation share its window regardless
//! of who they are.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use super::clock::{Clock, SystemClock};
use super::limiter::{GuardConfig, RateLimiter, WindowAnchor};

/// Limiter settings for every guarded operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateLimitTable {
    /// Settings for operations without their own entry.
    #[serde(default)]
    pub defaults: GuardConfig,
    #[serde(default)]
    pub anchor: WindowAnchor,
    #[serde(default)]
    pub operations: HashMap<String, GuardConfig>,
}

impl RateLimitTable {
    /// Settings that apply to `operation`.
    #[must_use]
    pub fn config_for(&self, operation: &str) -> GuardConfig {
        self.operations
            .get(operation)
            .copied()
            .unwrap_or(self.defaults)
    }

    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>, config: GuardConfig) -> Self {
        self.operations.insert(operation.into(), config);
        self
    }
}

/// The process-wide set of limiters, one per operation name.
pub struct RateLimits {
    table: RateLimitTable,
    clock: Arc<dyn Clock>,
    limiters: DashMap<String, Arc<RateLimiter>>,
}

impl RateLimits {
    /// Build limiters for every configured operation using the wall clock.
    pub fn new(table: RateLimitTable) -> Self {
        Self::with_clock(table, Arc::new(SystemClock))
    }

    pub fn with_clock(table: RateLimitTable, clock: Arc<dyn Clock>) -> Self {
        let limiters = DashMap::new();
        for (name, config) in &table.operations {
            tracing::debug!(
                operation = %name,
                limit = config.limit,
                window_millis = config.window_millis,
                "configured rate limit"
            );
            limiters.insert(
                name.clone(),
                Arc::new(RateLimiter::new(name.clone(), *config, table.anchor, clock.clone())),
            );
        }
        Self {
            table,
            clock,
            limiters,
        }
    }

    /// The limiter for `operation`, created with the table defaults on first use.
    pub fn limiter(&self, operation: &str) -> Arc<RateLimiter> {
        if let Some(existing) = self.limiters.get(operation) {
            return existing.clone();
        }
        self.limiters
            .entry(operation.to_string())
            .or_insert_with(|| {
                Arc::new(RateLimiter::new(
                    operation,
                    self.table.config_for(operation),
                    self.table.anchor,
                    self.clock.clone(),
                ))
            })
            .clone()
    }

    #[must_use]
    pub fn table(&self) -> &RateLimitTable {
        &self.table
    }

    /// Number of limiters created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.limiters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.limiters.is_empty()
    }
}

impl std::fmt::Debug for RateLimits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimits")
            .field("table", &self.table)
            .field("limiters", &self.limiters.len())
            .finish()
    }
}
