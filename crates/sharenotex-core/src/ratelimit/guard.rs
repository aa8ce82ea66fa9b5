//! Wrapping an operation with a rate limiter.

use std::future::Future;
use std::sync::Arc;

use super::limiter::RateLimiter;
use crate::error::CoreError;

/// An operation that only runs when its limiter grants the call.
pub struct Guarded<F> {
    operation: F,
    limiter: Arc<RateLimiter>,
}

/// Wrap `operation` so every call first takes a grant from `limiter`.
///
/// Denied calls fail with [`CoreError::RateLimitExceeded`] (converted into
/// the operation's error type) and never reach `operation`.
pub fn guarded<F>(operation: F, limiter: Arc<RateLimiter>) -> Guarded<F> {
    Guarded { operation, limiter }
}

impl<F> Guarded<F> {
    pub async fn call<A, Fut, T, E>(&self, arg: A) -> Result<T, E>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<CoreError>,
    {
        self.limiter.run(|| (self.operation)(arg)).await
    }

    #[must_use]
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }
}
