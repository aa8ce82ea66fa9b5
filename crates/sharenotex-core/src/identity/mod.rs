//! Identity-provider boundary.
//!
//! User accounts and tokens live in an external identity provider. The core
//! only describes what it needs from one ([`IdentityProvider`]) and how the
//! provider's answers map onto [`CoreError`](crate::CoreError)s
//! ([`AuthService`]).

mod service;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;

pub use service::AuthService;

/// A sign-up request. The email doubles as the username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Username/password pair exchanged for a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// A user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Bearer token triple returned on login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub refresh_expires_in: u64,
}

/// What happened when the provider was asked to create a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateUserOutcome {
    Created { id: String },
    /// A user with the same username or email exists.
    Conflict,
    /// The configured realm does not exist.
    RealmNotFound,
    /// Any other non-success status.
    Rejected { status: u16 },
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an enabled user with the default role.
    ///
    /// Transport-level failures are reported as
    /// [`CoreError::UserCreationFailed`](crate::CoreError::UserCreationFailed).
    async fn create_user(&self, user: &NewUser) -> CoreResult<CreateUserOutcome>;

    /// Look up a user by id; unknown ids are `NotFound`.
    async fn find_user(&self, user_id: &str) -> CoreResult<UserProfile>;

    async fn issue_token(&self, credentials: &Credentials) -> CoreResult<TokenGrant>;
}
