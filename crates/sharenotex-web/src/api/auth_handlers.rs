use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use sharenotex_core::{messages, Credentials, TokenGrant};

use super::ops;
use crate::dto::{LoginRequest, MessageResponse, SignupRequest};
use crate::error::AppError;
use crate::state::AppState;
use crate::validation::ValidatedJson;

pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    if state.auth.register(&body.into()).await? {
        Ok((StatusCode::OK, Json(MessageResponse::new(messages::USER_REGISTERED))))
    } else {
        Ok((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse::new(messages::USER_REGISTRATION_FAILED)),
        ))
    }
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenGrant>, AppError> {
    let auth = &state.auth;
    let grant = state
        .guard(ops::LOGIN, move |credentials: Credentials| async move {
            auth.login(&credentials).await
        })
        .call(Credentials::from(body))
        .await?;
    Ok(Json(grant))
}
