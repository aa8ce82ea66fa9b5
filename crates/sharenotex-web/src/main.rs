mod api;
mod auth;
mod config;
mod dto;
mod error;
mod identity;
mod middleware;
mod state;
mod validation;

use std::sync::Arc;

use axum::http::{header, Method};
use axum::middleware::from_fn_with_state;
use sharenotex_core::{InMemoryNoteStore, SystemClock};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::auth::jwt::TokenVerifier;
use crate::config::ServerConfig;
use crate::identity::KeycloakClient;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "sharenotex_web=debug,sharenotex_core=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::load()?;

    let issuer = config.auth.issuer.as_deref();
    let verifier = match &config.auth.jwt_secret {
        Some(secret) => TokenVerifier::from_secret(secret, issuer),
        None => {
            let jwks_url = config.jwks_url();
            tracing::info!("Verifying bearer tokens against {jwks_url}");
            TokenVerifier::from_jwks_url(jwks_url, issuer)?
        }
    };

    let keycloak = KeycloakClient::new(config.keycloak.clone())?;
    tracing::info!(
        "Using Keycloak realm {} at {}",
        config.keycloak.realm,
        config.keycloak.base_url()
    );

    let state = AppState::new(
        config,
        Arc::new(InMemoryNoteStore::new()),
        Arc::new(keycloak),
        verifier,
        Arc::new(SystemClock),
    );
    tracing::info!(
        "Rate limits: default {} per {} ms, {} operation override(s), anchor {:?}",
        state.limits.table().defaults.limit,
        state.limits.table().defaults.window_millis,
        state.limits.table().operations.len(),
        state.limits.table().anchor,
    );

    let bind_addr = state.config.bind_addr;
    let body_limit = state.config.max_body_kb * 1024;
    let tls_config = state.config.tls.clone();
    let tls_enabled = tls_config.cert_path.is_some() && tls_config.key_path.is_some();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let app = api::router(state)
        .layer(from_fn_with_state(
            tls_enabled,
            middleware::security_headers::security_headers,
        ))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    if let (Some(cert), Some(key)) = (&tls_config.cert_path, &tls_config.key_path) {
        use axum_server::tls_rustls::RustlsConfig;
        let rustls_config = RustlsConfig::from_pem_file(cert, key).await?;
        tracing::info!("sharenotex-web listening on https://{}", bind_addr);
        axum_server::bind_rustls(bind_addr, rustls_config)
            .serve(app.into_make_service())
            .await?;
    } else {
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;
        tracing::info!("sharenotex-web listening on http://{}", bind_addr);
        axum::serve(listener, app).await?;
    }

    Ok(())
}
