mod auth_handlers;
mod notes;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::auth::middleware::require_auth;
use crate::state::AppState;

/// Names of rate-limited operations, as used in `[rate_limit.operations]`.
///
/// Handlers take the grant after their extractors succeed.
pub mod ops {
    pub const LOGIN: &str = "auth.login";
    pub const NOTES_CREATE: &str = "notes.create";
    pub const NOTES_LIST: &str = "notes.list";
    pub const NOTES_GET: &str = "notes.get";
    pub const NOTES_UPDATE: &str = "notes.update";
    pub const NOTES_DELETE: &str = "notes.delete";
    pub const NOTES_SHARE: &str = "notes.share";
    pub const NOTES_SEARCH: &str = "notes.search";
    pub const NOTES_SHARED: &str = "notes.shared";
}

pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(auth_handlers::signup))
        .route("/auth/login", post(auth_handlers::login))
}

pub fn protected_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/notes", post(notes::create).get(notes::list))
        .route("/notes/share", post(notes::share))
        .route("/notes/search", get(notes::search))
        .route("/notes/shared", get(notes::shared))
        .route(
            "/notes/{id}",
            get(notes::get).put(notes::update).delete(notes::delete),
        )
        // Rejected callers never reach a handler, so never draw from a limiter
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

/// Every `/api` route, bound to `state`. Cross-cutting layers are added by the caller.
pub fn router(state: AppState) -> Router {
    let api = auth_router()
        .merge(protected_router(&state))
        .route("/health", get(health));

    Router::new().nest("/api", api).with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use sharenotex_core::{
        messages, CoreError, CoreResult, CreateUserOutcome, Credentials, GuardConfig,
        IdentityProvider, InMemoryNoteStore, ManualClock, NewUser, RateLimitTable, TokenGrant,
        UserProfile,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::auth::jwt::tests::{token_for, SECRET};
    use crate::auth::jwt::TokenVerifier;
    use crate::config::ServerConfig;

    struct FakeIdentity;

    const KNOWN_USERS: &[&str] = &["alice", "bob"];

    #[async_trait]
    impl IdentityProvider for FakeIdentity {
        async fn create_user(&self, user: &NewUser) -> CoreResult<CreateUserOutcome> {
            Ok(match user.email.as_str() {
                "taken@example.com" => CreateUserOutcome::Conflict,
                "rejected@example.com" => CreateUserOutcome::Rejected { status: 403 },
                _ => CreateUserOutcome::Created { id: "new-user".into() },
            })
        }

        async fn find_user(&self, user_id: &str) -> CoreResult<UserProfile> {
            if KNOWN_USERS.iter().any(|u| *u == user_id) {
                Ok(UserProfile {
                    id: user_id.to_string(),
                    first_name: None,
                    last_name: None,
                    email: None,
                })
            } else {
                Err(CoreError::not_found("id", messages::NOT_FOUND))
            }
        }

        async fn issue_token(&self, credentials: &Credentials) -> CoreResult<TokenGrant> {
            if credentials.password == "pw" {
                Ok(TokenGrant {
                    access_token: "access".into(),
                    expires_in: 300,
                    refresh_token: "refresh".into(),
                    refresh_expires_in: 1800,
                })
            } else {
                Err(CoreError::not_found("resource", messages::INVALID_CREDENTIALS))
            }
        }
    }

    fn generous() -> RateLimitTable {
        RateLimitTable {
            defaults: GuardConfig::new(1_000, 5_000),
            ..RateLimitTable::default()
        }
    }

    fn app(table: RateLimitTable) -> (Router, Arc<ManualClock>) {
        let config = ServerConfig {
            rate_limit: table,
            ..ServerConfig::default()
        };
        let clock = Arc::new(ManualClock::new(1_000_000));
        let state = AppState::new(
            config,
            Arc::new(InMemoryNoteStore::new()),
            Arc::new(FakeIdentity),
            TokenVerifier::from_secret(SECRET, None),
            clock.clone(),
        );
        (router(state), clock)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            req = req.header(
                header::AUTHORIZATION,
                format!("Bearer {}", token_for(SECRET, user, 300)),
            );
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };

        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn note(title: &str, content: &str) -> Option<Value> {
        Some(json!({ "title": title, "content": content }))
    }

    #[tokio::test]
    async fn health_is_public() {
        let (app, _) = app(generous());
        let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn notes_require_a_token() {
        let (app, _) = app(generous());
        let (status, body) = send(&app, Method::GET, "/api/notes", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["fieldName"], "auth");
    }

    #[tokio::test]
    async fn note_lifecycle() {
        let (app, _) = app(generous());

        let (status, body) =
            send(&app, Method::POST, "/api/notes", Some("alice"), note("t", "c")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], messages::NOTE_ADDED);

        let (status, body) = send(&app, Method::GET, "/api/notes", Some("alice"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        let id = body[0]["id"].as_i64().unwrap();
        assert!(body[0].get("createdAt").is_some());

        let uri = format!("/api/notes/{id}");
        let (status, body) =
            send(&app, Method::PUT, &uri, Some("alice"), note("t2", "c2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], messages::NOTE_UPDATED);

        let (_, body) = send(&app, Method::GET, &uri, Some("alice"), None).await;
        assert_eq!(body["title"], "t2");

        let (status, body) = send(&app, Method::DELETE, &uri, Some("alice"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], messages::NOTE_DELETED);

        let (status, body) = send(&app, Method::GET, &uri, Some("alice"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], messages::NOTE_NOT_FOUND);
    }

    #[tokio::test]
    async fn notes_are_private_to_their_owner() {
        let (app, _) = app(generous());
        send(&app, Method::POST, "/api/notes", Some("alice"), note("t", "c")).await;

        let (status, body) = send(&app, Method::GET, "/api/notes/1", Some("bob"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["fieldName"], "id");

        let (status, _) =
            send(&app, Method::PUT, "/api/notes/1", Some("bob"), note("x", "y")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = send(&app, Method::GET, "/api/notes", Some("bob"), None).await;
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_fields_are_reported_per_field() {
        let (app, _) = app(generous());
        let (status, body) =
            send(&app, Method::POST, "/api/notes", Some("alice"), note(" ", "")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["title"], "Title cannot be empty");
        assert_eq!(body["content"], "Content cannot be empty");
    }

    #[tokio::test]
    async fn malformed_json_is_a_body_error() {
        let (app, _) = app(generous());
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/notes")
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", token_for(SECRET, "alice", 300)),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["fieldName"], "body");
    }

    #[tokio::test]
    async fn share_and_read_inbox() {
        let (app, _) = app(generous());
        send(&app, Method::POST, "/api/notes", Some("alice"), note("t", "c")).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/notes/share",
            Some("alice"),
            Some(json!({ "noteId": 1, "sharedTo": "bob" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], messages::NOTE_SHARED);

        let (status, body) =
            send(&app, Method::GET, "/api/notes/shared", Some("bob"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["sharedBy"], "alice");
        assert_eq!(body[0]["note"]["title"], "t");
    }

    #[tokio::test]
    async fn share_to_unknown_user_is_not_found() {
        let (app, _) = app(generous());
        send(&app, Method::POST, "/api/notes", Some("alice"), note("t", "c")).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/notes/share",
            Some("alice"),
            Some(json!({ "noteId": 1, "sharedTo": "mallory" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["fieldName"], "id");
        assert_eq!(body["message"], messages::NOT_FOUND);
    }

    #[tokio::test]
    async fn search_matches_content() {
        let (app, _) = app(generous());
        send(&app, Method::POST, "/api/notes", Some("alice"), note("a", "Rust ownership")).await;
        send(&app, Method::POST, "/api/notes", Some("alice"), note("b", "gardening")).await;

        let (status, body) =
            send(&app, Method::GET, "/api/notes/search?query=rust", Some("alice"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["title"], "a");

        let (status, body) =
            send(&app, Method::GET, "/api/notes/search", Some("alice"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["query"], "Query cannot be empty");
    }

    #[tokio::test]
    async fn signup_outcomes() {
        let (app, _) = app(generous());
        let user = |email: &str| {
            Some(json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": email,
                "password": "pw",
            }))
        };

        let (status, body) =
            send(&app, Method::POST, "/api/auth/signup", None, user("ada@example.com")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], messages::USER_REGISTERED);

        let (status, body) =
            send(&app, Method::POST, "/api/auth/signup", None, user("taken@example.com")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["fieldName"], "email");

        let (status, body) =
            send(&app, Method::POST, "/api/auth/signup", None, user("rejected@example.com"))
                .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], messages::USER_REGISTRATION_FAILED);
    }

    #[tokio::test]
    async fn login_returns_token_grant() {
        let (app, _) = app(generous());
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "userName": "ada@example.com", "password": "pw" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["access_token"], "access");
        assert_eq!(body["refresh_expires_in"], 1800);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "userName": "ada@example.com", "password": "wrong" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], messages::INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn create_is_limited_per_window() {
        let (app, clock) = app(generous().with_operation(ops::NOTES_CREATE, GuardConfig::new(2, 5_000)));

        for _ in 0..2 {
            let (status, _) =
                send(&app, Method::POST, "/api/notes", Some("alice"), note("t", "c")).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, body) =
            send(&app, Method::POST, "/api/notes", Some("bob"), note("t", "c")).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["fieldName"], "rate");
        assert_eq!(body["message"], "Rate limit exceeded");

        // Other operations keep their own windows
        let (status, body) = send(&app, Method::GET, "/api/notes", Some("alice"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        clock.advance(5_000);
        let (status, _) =
            send(&app, Method::POST, "/api/notes", Some("alice"), note("t", "c")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_bodies_do_not_consume_grants() {
        let (app, _) = app(generous().with_operation(ops::NOTES_CREATE, GuardConfig::new(1, 5_000)));

        let (status, _) =
            send(&app, Method::POST, "/api/notes", Some("alice"), note("", "")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send(&app, Method::POST, "/api/notes", Some("alice"), note("t", "c")).await;
        assert_eq!(status, StatusCode::OK);

        // A full window still reports validation failures as such
        let (status, body) =
            send(&app, Method::POST, "/api/notes", Some("alice"), note(" ", "c")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["title"], "Title cannot be empty");

        let (status, _) =
            send(&app, Method::POST, "/api/notes", Some("alice"), note("t", "c")).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn bad_path_and_blank_query_do_not_consume_grants() {
        let (app, _) = app(
            generous()
                .with_operation(ops::NOTES_GET, GuardConfig::new(1, 5_000))
                .with_operation(ops::NOTES_SEARCH, GuardConfig::new(1, 5_000)),
        );
        send(&app, Method::POST, "/api/notes", Some("alice"), note("t", "c")).await;

        let (status, _) = send(&app, Method::GET, "/api/notes/abc", Some("alice"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, Method::GET, "/api/notes/1", Some("alice"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) =
            send(&app, Method::GET, "/api/notes/search", Some("alice"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) =
            send(&app, Method::GET, "/api/notes/search?query=c", Some("alice"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn share_without_note_id_is_a_field_error() {
        let (app, _) = app(generous().with_operation(ops::NOTES_SHARE, GuardConfig::new(1, 5_000)));
        send(&app, Method::POST, "/api/notes", Some("alice"), note("t", "c")).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/notes/share",
            Some("alice"),
            Some(json!({ "sharedTo": "bob" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.as_object().unwrap().len(), 1);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/notes/share",
            Some("alice"),
            Some(json!({ "noteId": 1, "sharedTo": "bob" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unauthenticated_calls_do_not_consume_grants() {
        let (app, _) = app(generous().with_operation(ops::NOTES_LIST, GuardConfig::new(1, 5_000)));

        for _ in 0..3 {
            let (status, _) = send(&app, Method::GET, "/api/notes", None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }
        let (status, _) = send(&app, Method::GET, "/api/notes", Some("alice"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn methods_on_one_path_have_separate_limits() {
        let (app, _) = app(generous().with_operation(ops::NOTES_GET, GuardConfig::new(1, 5_000)));
        send(&app, Method::POST, "/api/notes", Some("alice"), note("t", "c")).await;

        let (status, _) = send(&app, Method::GET, "/api/notes/1", Some("alice"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::GET, "/api/notes/1", Some("alice"), None).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

        let (status, _) =
            send(&app, Method::PUT, "/api/notes/1", Some("alice"), note("t2", "c2")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn login_is_limited_but_signup_is_not() {
        let (app, _) = app(RateLimitTable {
            defaults: GuardConfig::new(1, 5_000),
            ..RateLimitTable::default()
        });
        let creds = || Some(json!({ "userName": "ada@example.com", "password": "pw" }));

        let (status, _) = send(&app, Method::POST, "/api/auth/login", None, creds()).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::POST, "/api/auth/login", None, creds()).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

        for i in 0..3 {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/auth/signup",
                None,
                Some(json!({
                    "firstName": "A",
                    "lastName": "B",
                    "email": format!("user{i}@example.com"),
                    "password": "pw",
                })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
    }
}
