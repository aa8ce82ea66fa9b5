use std::sync::Arc;

use super::{CreateUserOutcome, Credentials, IdentityProvider, NewUser, TokenGrant};
use crate::error::{CoreError, CoreResult};
use crate::messages;

/// Registration and login on top of an [`IdentityProvider`].
#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
}

impl AuthService {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Returns `Ok(true)` when the user was created and `Ok(false)` when the
    /// provider declined for a reason other than a conflict or missing realm.
    pub async fn register(&self, user: &NewUser) -> CoreResult<bool> {
        match self.provider.create_user(user).await? {
            CreateUserOutcome::Created { id } => {
                tracing::info!(email = %user.email, user_id = %id, "user created");
                Ok(true)
            }
            CreateUserOutcome::Conflict => Err(CoreError::already_exists(
                "email",
                messages::EMAIL_ALREADY_EXISTS,
            )),
            CreateUserOutcome::RealmNotFound => {
                Err(CoreError::not_found("realm", messages::REALM_NOT_FOUND))
            }
            CreateUserOutcome::Rejected { status } => {
                tracing::warn!(email = %user.email, status, "identity provider rejected user");
                Ok(false)
            }
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> CoreResult<TokenGrant> {
        tracing::debug!(username = %credentials.username, "issuing token");
        self.provider.issue_token(credentials).await
    }
}
