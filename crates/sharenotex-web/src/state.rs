use std::sync::Arc;

use sharenotex_core::{
    guarded, AuthService, Clock, Guarded, IdentityProvider, NoteService, NoteStore, RateLimits,
};

use crate::auth::jwt::TokenVerifier;
use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub notes: NoteService,
    pub auth: AuthService,
    pub verifier: Arc<TokenVerifier>,
    /// One limiter per guarded operation, shared by every caller.
    pub limits: Arc<RateLimits>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn NoteStore>,
        identity: Arc<dyn IdentityProvider>,
        verifier: TokenVerifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let limits = RateLimits::with_clock(config.rate_limit.clone(), clock);
        Self {
            notes: NoteService::new(store, identity.clone()),
            auth: AuthService::new(identity),
            verifier: Arc::new(verifier),
            limits: Arc::new(limits),
            config: Arc::new(config),
        }
    }

    /// Put `operation` behind the limiter registered for `name`.
    pub fn guard<F>(&self, name: &str, operation: F) -> Guarded<F> {
        guarded(operation, self.limits.limiter(name))
    }
}
