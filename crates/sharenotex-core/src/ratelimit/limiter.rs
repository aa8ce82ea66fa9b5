//! Fixed-window request counter.
//!
//! A [`RateLimiter`] admits at most `limit` calls per `window_millis` window
//! across every caller in the process. Windows are reset lazily: the call
//! that observes `now - last_window_start >= window_millis` starts a new
//! window, is always granted, and sets the count to 1.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use crate::error::{CoreError, CoreResult};

pub const DEFAULT_LIMIT: u32 = 5;
pub const DEFAULT_WINDOW_MILLIS: u64 = 5000;

/// Per-operation limiter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Maximum grants per window.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Window length in milliseconds.
    #[serde(default = "default_window_millis")]
    pub window_millis: u64,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_window_millis() -> u64 {
    DEFAULT_WINDOW_MILLIS
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            window_millis: DEFAULT_WINDOW_MILLIS,
        }
    }
}

impl GuardConfig {
    #[must_use]
    pub fn new(limit: u32, window_millis: u64) -> Self {
        Self {
            limit,
            window_millis,
        }
    }
}

/// When `last_window_start` moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowAnchor {
    /// Every attempt, granted or denied, stamps `last_window_start`.
    ///
    /// Calls arriving closer together than `window_millis` keep pushing the
    /// window start forward, so a saturated window never expires under
    /// sustained load.
    #[default]
    EveryCall,
    /// Only the attempt that opens a new window stamps `last_window_start`.
    WindowStart,
}

/// Whether the current window still has grants left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPhase {
    Open,
    Saturated,
}

#[derive(Debug)]
struct WindowState {
    last_window_start: u64,
    count: u64,
}

/// A process-wide fixed-window limiter for one guarded operation.
pub struct RateLimiter {
    name: String,
    config: GuardConfig,
    anchor: WindowAnchor,
    clock: Arc<dyn Clock>,
    state: Mutex<WindowState>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("anchor", &self.anchor)
            .finish_non_exhaustive()
    }
}

impl RateLimiter {
    pub fn new(
        name: impl Into<String>,
        config: GuardConfig,
        anchor: WindowAnchor,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            anchor,
            clock,
            state: Mutex::new(WindowState {
                last_window_start: 0,
                count: 0,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> GuardConfig {
        self.config
    }

    #[must_use]
    pub fn anchor(&self) -> WindowAnchor {
        self.anchor
    }

    /// Attempt to take one grant from the current window.
    ///
    /// Never blocks on anything but the internal mutex; a denial is final for
    /// this attempt.
    pub fn try_acquire(&self) -> bool {
        let now = self.clock.now_millis();
        let mut state = self.state.lock();

        let previous = match self.anchor {
            WindowAnchor::EveryCall => std::mem::replace(&mut state.last_window_start, now),
            WindowAnchor::WindowStart => state.last_window_start,
        };

        if now.saturating_sub(previous) >= self.config.window_millis {
            state.last_window_start = now;
            state.count = 1;
            tracing::trace!(operation = %self.name, now, "rate limit window reset");
            return true;
        }

        let observed = state.count;
        state.count = observed.saturating_add(1);
        observed < u64::from(self.config.limit)
    }

    /// Like [`try_acquire`](Self::try_acquire), but reports a denial as
    /// [`CoreError::RateLimitExceeded`].
    pub fn check(&self) -> CoreResult<()> {
        if self.try_acquire() {
            tracing::trace!(operation = %self.name, "rate limit granted");
            Ok(())
        } else {
            tracing::warn!(
                operation = %self.name,
                limit = self.config.limit,
                window_millis = self.config.window_millis,
                "rate limit exceeded"
            );
            Err(CoreError::RateLimitExceeded)
        }
    }

    /// Run `operation` only if a grant is available.
    ///
    /// The operation's own result (or error) is passed through untouched.
    pub async fn run<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<CoreError>,
    {
        self.check()?;
        operation().await
    }

    /// Current phase of the window, as last observed. Does not reset.
    #[must_use]
    pub fn phase(&self) -> WindowPhase {
        let state = self.state.lock();
        if state.count >= u64::from(self.config.limit) {
            WindowPhase::Saturated
        } else {
            WindowPhase::Open
        }
    }
}
