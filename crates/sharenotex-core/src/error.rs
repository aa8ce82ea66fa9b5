//! Error types for `sharenotex-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`.
//!
//! Every variant carries a *field tag* (see [`CoreError::field`]) naming the
//! input or resource the failure is about. The HTTP layer renders the tag and
//! the display message together.

/// Unified error type for all core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A guarded operation was denied by its rate limiter.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// A note, user or realm does not exist (or is not visible to the caller).
    #[error("{message}")]
    NotFound { field: String, message: String },

    /// A user with the same identity already exists.
    #[error("{message}")]
    AlreadyExists { field: String, message: String },

    /// The identity provider failed while creating a user.
    #[error("{message}")]
    UserCreationFailed { field: String, message: String },

    /// The identity provider could not be reached or answered unexpectedly.
    #[error("identity provider error: {0}")]
    IdentityProvider(String),

    /// The note store failed.
    #[error("store error: {0}")]
    Store(String),
}

impl CoreError {
    pub fn not_found(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn already_exists(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AlreadyExists {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn user_creation_failed(message: impl Into<String>) -> Self {
        Self::UserCreationFailed {
            field: "user".to_string(),
            message: message.into(),
        }
    }

    /// The field tag reported alongside the message.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::RateLimitExceeded => "rate",
            Self::NotFound { field, .. }
            | Self::AlreadyExists { field, .. }
            | Self::UserCreationFailed { field, .. } => field,
            Self::IdentityProvider(_) => "identity",
            Self::Store(_) => "store",
        }
    }
}

/// Convenience alias used throughout `sharenotex-core`.
pub type CoreResult<T> = Result<T, CoreError>;
