//! ShareNotex core library, the transport-agnostic note service logic.
//!
//! `sharenotex-core` holds everything the HTTP frontend (`sharenotex-web`)
//! builds on, without depending on any web framework.
//!
//! # Modules
//!
//! - [`ratelimit`]: fixed-window rate limiting per guarded operation, see [`RateLimiter`], [`RateLimits`], [`guarded`].
//! - [`notes`]: notes and share records, the [`NoteStore`] boundary and [`NoteService`].
//! - [`identity`]: the [`IdentityProvider`] boundary and [`AuthService`].
//! - [`messages`]: user-facing response messages.
//! - [`error`]: unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod error;
pub mod identity;
pub mod messages;
pub mod notes;
pub mod ratelimit;

pub use error::{CoreError, CoreResult};
pub use identity::{
    AuthService, CreateUserOutcome, Credentials, IdentityProvider, NewUser, TokenGrant,
    UserProfile,
};
pub use notes::{InMemoryNoteStore, Note, NoteDraft, NoteService, NoteStore, SharedNote};
pub use ratelimit::{
    guarded, Clock, GuardConfig, Guarded, ManualClock, RateLimitTable, RateLimiter, RateLimits,
    SystemClock, WindowAnchor, WindowPhase,
};
