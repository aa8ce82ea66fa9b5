use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;
use sharenotex_core::RateLimitTable;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    #[serde(default = "default_max_body_kb")]
    pub max_body_kb: usize,
    #[serde(default)]
    pub keycloak: KeycloakConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limit: RateLimitTable,
    #[serde(default)]
    pub tls: TlsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeycloakConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Realm holding application users.
    #[serde(default = "default_realm")]
    pub realm: String,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Realm the admin account lives in.
    #[serde(default = "default_master_realm")]
    pub master_realm: String,
    #[serde(default = "default_admin_client_id")]
    pub admin_client_id: String,
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    #[serde(default)]
    pub admin_password: String,
    /// Realm role granted to every new user.
    #[serde(default = "default_user_role")]
    pub user_role: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// JWKS endpoint used to verify bearer tokens. Derived from the Keycloak
    /// realm when unset.
    #[serde(default)]
    pub jwks_url: Option<String>,
    /// Shared HS256 secret. When set, tokens are verified with it instead of
    /// the JWKS endpoint.
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TlsConfig {
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

impl Default for KeycloakConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            realm: default_realm(),
            client_id: default_client_id(),
            client_secret: String::new(),
            master_realm: default_master_realm(),
            admin_client_id: default_admin_client_id(),
            admin_username: default_admin_username(),
            admin_password: String::new(),
            user_role: default_user_role(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_body_kb: default_max_body_kb(),
            keycloak: KeycloakConfig::default(),
            auth: AuthConfig::default(),
            rate_limit: RateLimitTable::default(),
            tls: TlsConfig::default(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8081))
}

fn default_max_body_kb() -> usize { 64 }
fn default_server_url() -> String { "http://localhost:8080".to_string() }
fn default_realm() -> String { "Security".to_string() }
fn default_client_id() -> String { "sharenotex".to_string() }
fn default_master_realm() -> String { "master".to_string() }
fn default_admin_client_id() -> String { "admin-cli".to_string() }
fn default_admin_username() -> String { "admin".to_string() }
fn default_user_role() -> String { "USER".to_string() }
fn default_request_timeout_secs() -> u64 { 10 }

const WEAK_SECRETS: &[&str] = &[
    "change-me-to-a-random-secret",
    "secret",
    "password",
    "jwt-secret",
];

impl KeycloakConfig {
    pub fn base_url(&self) -> &str {
        self.server_url.trim_end_matches('/')
    }
}

impl ServerConfig {
    /// JWKS endpoint for the configured realm.
    pub fn jwks_url(&self) -> String {
        self.auth.jwks_url.clone().unwrap_or_else(|| {
            format!(
                "{}/realms/{}/protocol/openid-connect/certs",
                self.keycloak.base_url(),
                self.keycloak.realm
            )
        })
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("SHARENOTEX_CONFIG").map(PathBuf::from).ok();

        let mut config = if let Some(path) = config_path {
            let contents = std::fs::read_to_string(&path)?;
            Self::from_toml_str(&contents)?
        } else {
            ServerConfig::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SHARENOTEX_*` overrides from `lookup`.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<()> {
        if let Some(addr) = lookup("SHARENOTEX_BIND_ADDR") {
            self.bind_addr = addr.parse()?;
        }
        if let Some(url) = lookup("SHARENOTEX_KEYCLOAK_URL") {
            self.keycloak.server_url = url;
        }
        if let Some(realm) = lookup("SHARENOTEX_KEYCLOAK_REALM") {
            self.keycloak.realm = realm;
        }
        if let Some(id) = lookup("SHARENOTEX_CLIENT_ID") {
            self.keycloak.client_id = id;
        }
        if let Some(secret) = lookup("SHARENOTEX_CLIENT_SECRET") {
            self.keycloak.client_secret = secret;
        }
        if let Some(user) = lookup("SHARENOTEX_ADMIN_USERNAME") {
            self.keycloak.admin_username = user;
        }
        if let Some(password) = lookup("SHARENOTEX_ADMIN_PASSWORD") {
            self.keycloak.admin_password = password;
        }
        if let Some(secret) = lookup("SHARENOTEX_JWT_SECRET") {
            self.auth.jwt_secret = Some(secret);
        }
        if let Some(cert) = lookup("SHARENOTEX_TLS_CERT") {
            self.tls.cert_path = Some(cert);
        }
        if let Some(key) = lookup("SHARENOTEX_TLS_KEY") {
            self.tls.key_path = Some(key);
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        url::Url::parse(&self.keycloak.server_url)
            .map_err(|e| anyhow::anyhow!("invalid keycloak.server_url: {e}"))?;

        if let Some(secret) = &self.auth.jwt_secret {
            if WEAK_SECRETS.iter().any(|&w| secret == w) {
                anyhow::bail!(
                    "JWT secret matches a known weak/placeholder value. \
                     Set a strong random secret via SHARENOTEX_JWT_SECRET."
                );
            }
            if secret.len() < 32 {
                tracing::warn!("JWT secret is shorter than 32 characters.");
            }
            tracing::warn!("Verifying bearer tokens with a shared secret instead of JWKS.");
        }

        if self.keycloak.client_secret.is_empty() {
            tracing::warn!("No Keycloak client secret configured; logins will fail.");
        }
        if self.keycloak.admin_password.is_empty() {
            tracing::warn!("No Keycloak admin password configured; sign-up and sharing will fail.");
        }

        for (operation, limit) in &self.rate_limit.operations {
            if limit.window_millis == 0 {
                anyhow::bail!("rate_limit.operations.\"{operation}\".window_millis must be positive");
            }
        }
        if self.rate_limit.defaults.window_millis == 0 {
            anyhow::bail!("rate_limit.defaults.window_millis must be positive");
        }

        Ok(())
    }
}
