use axum::extract::{Path, State};
use axum::Json;
use sharenotex_core::{messages, NoteDraft};

use super::ops;
use crate::auth::middleware::AuthUser;
use crate::dto::{
    MessageResponse, NoteRequest, NoteResponse, SearchQuery, ShareNoteRequest, SharedNoteResponse,
};
use crate::error::AppError;
use crate::state::AppState;
use crate::validation::{ValidatedJson, ValidatedQuery};

// Extractors reject malformed requests before a handler runs, so only
// well-formed calls draw from an operation's limiter.

pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<NoteRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let (notes, owner) = (&state.notes, user.sub.as_str());
    state
        .guard(ops::NOTES_CREATE, move |draft: NoteDraft| async move {
            notes.create(owner, draft).await
        })
        .call(NoteDraft::from(body))
        .await?;
    Ok(Json(MessageResponse::new(messages::NOTE_ADDED)))
}

pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<NoteResponse>>, AppError> {
    let notes = state
        .limits
        .limiter(ops::NOTES_LIST)
        .run(|| state.notes.find_all(&user.sub))
        .await?;
    Ok(Json(notes.into_iter().map(NoteResponse::from).collect()))
}

pub async fn get(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NoteResponse>, AppError> {
    let (notes, owner) = (&state.notes, user.sub.as_str());
    let note = state
        .guard(ops::NOTES_GET, move |id: i64| async move {
            notes.find(owner, id).await
        })
        .call(id)
        .await?;
    Ok(Json(note.into()))
}

pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(body): ValidatedJson<NoteRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let (notes, owner) = (&state.notes, user.sub.as_str());
    state
        .guard(
            ops::NOTES_UPDATE,
            move |(id, draft): (i64, NoteDraft)| async move {
                notes.update(owner, id, draft).await
            },
        )
        .call((id, NoteDraft::from(body)))
        .await?;
    Ok(Json(MessageResponse::new(messages::NOTE_UPDATED)))
}

pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let (notes, owner) = (&state.notes, user.sub.as_str());
    state
        .guard(ops::NOTES_DELETE, move |id: i64| async move {
            notes.delete(owner, id).await
        })
        .call(id)
        .await?;
    Ok(Json(MessageResponse::new(messages::NOTE_DELETED)))
}

pub async fn share(
    user: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<ShareNoteRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let (notes, owner) = (&state.notes, user.sub.as_str());
    state
        .guard(
            ops::NOTES_SHARE,
            move |(note_id, recipient): (i64, String)| async move {
                notes.share(owner, note_id, &recipient).await
            },
        )
        .call((body.note_id, body.shared_to))
        .await?;
    Ok(Json(MessageResponse::new(messages::NOTE_SHARED)))
}

pub async fn search(
    user: AuthUser,
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<SearchQuery>,
) -> Result<Json<Vec<NoteResponse>>, AppError> {
    let (notes, owner) = (&state.notes, user.sub.as_str());
    let hits = state
        .guard(ops::NOTES_SEARCH, move |query: String| async move {
            notes.search(owner, &query).await
        })
        .call(query.query)
        .await?;
    Ok(Json(hits.into_iter().map(NoteResponse::from).collect()))
}

pub async fn shared(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SharedNoteResponse>>, AppError> {
    let shared = state
        .limits
        .limiter(ops::NOTES_SHARED)
        .run(|| state.notes.shared_with(&user.sub))
        .await?;
    Ok(Json(shared.into_iter().map(SharedNoteResponse::from).collect()))
}
