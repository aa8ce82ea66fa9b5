use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Identity-provider user id; owns the caller's notes.
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

enum KeySource {
    Secret(DecodingKey),
    Jwks {
        url: String,
        client: reqwest::Client,
        keys: RwLock<JwkSet>,
    },
}

/// Verifies bearer tokens issued by the identity provider.
///
/// Keys come either from the realm's JWKS endpoint (fetched on first use and
/// refetched when a token names an unknown `kid`) or from a shared HS256
/// secret.
pub struct TokenVerifier {
    keys: KeySource,
    validation: Validation,
}

impl TokenVerifier {
    pub fn from_secret(secret: &str, issuer: Option<&str>) -> Self {
        Self {
            keys: KeySource::Secret(DecodingKey::from_secret(secret.as_bytes())),
            validation: validation(Algorithm::HS256, issuer),
        }
    }

    pub fn from_jwks_url(url: impl Into<String>, issuer: Option<&str>) -> anyhow::Result<Self> {
        let url = url.into();
        url::Url::parse(&url).map_err(|e| anyhow::anyhow!("invalid JWKS url {url}: {e}"))?;
        Ok(Self {
            keys: KeySource::Jwks {
                url,
                client: reqwest::Client::new(),
                keys: RwLock::new(JwkSet { keys: Vec::new() }),
            },
            validation: validation(Algorithm::RS256, issuer),
        })
    }

    pub async fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let key = match &self.keys {
            KeySource::Secret(key) => key.clone(),
            KeySource::Jwks { url, client, keys } => {
                let kid = decode_header(token)?
                    .kid
                    .ok_or_else(|| anyhow::anyhow!("token header has no kid"))?;
                jwks_key(url, client, keys, &kid).await?
            }
        };

        let data = decode::<Claims>(token, &key, &self.validation)?;
        Ok(data.claims)
    }
}

fn validation(algorithm: Algorithm, issuer: Option<&str>) -> Validation {
    let mut validation = Validation::new(algorithm);
    validation.validate_exp = true;
    // Keycloak access tokens carry `aud: account`, not the client id.
    validation.validate_aud = false;
    if let Some(issuer) = issuer {
        validation.set_issuer(&[issuer]);
    }
    validation
}

async fn jwks_key(
    url: &str,
    client: &reqwest::Client,
    keys: &RwLock<JwkSet>,
    kid: &str,
) -> anyhow::Result<DecodingKey> {
    if let Some(jwk) = keys.read().await.find(kid) {
        return Ok(DecodingKey::from_jwk(jwk)?);
    }

    tracing::debug!(kid, "unknown signing key, refreshing JWKS");
    let fresh: JwkSet = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let mut guard = keys.write().await;
    *guard = fresh;
    let jwk = guard
        .find(kid)
        .ok_or_else(|| anyhow::anyhow!("no JWKS key with kid {kid}"))?;
    Ok(DecodingKey::from_jwk(jwk)?)
}
