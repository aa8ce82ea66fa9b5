//! Fixed-window rate limiting for guarded operations.
//!
//! - [`limiter`]: the counter itself ([`RateLimiter`]) and its settings.
//! - [`registry`]: one limiter per operation name ([`RateLimits`]).
//! - [`guard`]: wrapping an async operation with a limiter ([`guarded`]).
//! - [`clock`]: millisecond time sources.

pub mod clock;
pub mod guard;
pub mod limiter;
pub mod registry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use guard::{guarded, Guarded};
pub use limiter::{GuardConfig, RateLimiter, WindowAnchor, WindowPhase};
pub use registry::{RateLimitTable, RateLimits};
