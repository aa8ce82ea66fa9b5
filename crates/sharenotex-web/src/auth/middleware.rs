use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Identity-provider user id.
    pub sub: String,
    pub username: Option<String>,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already verified by `require_auth`
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

        let claims = state.verifier.verify(token).await.map_err(|e| {
            tracing::debug!("token rejected: {e:#}");
            AppError::Auth("Invalid or expired token".to_string())
        })?;

        Ok(AuthUser {
            sub: claims.sub,
            username: claims.preferred_username.or(claims.email),
        })
    }
}

/// Reject unauthenticated requests before any later layer runs.
pub async fn require_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();
    let user = AuthUser::from_request_parts(&mut parts, &state).await?;
    tracing::debug!(user = %user.sub, username = ?user.username, "authenticated request");
    parts.extensions.insert(user);
    Ok(next.run(Request::from_parts(parts, body)).await)
}
