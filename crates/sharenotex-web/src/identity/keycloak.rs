use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use sharenotex_core::messages;
use sharenotex_core::{
    CoreError, CoreResult, CreateUserOutcome, Credentials, IdentityProvider, NewUser, TokenGrant,
    UserProfile,
};

use crate::config::KeycloakConfig;

/// Keycloak admin and token endpoints behind [`IdentityProvider`].
pub struct KeycloakClient {
    http: reqwest::Client,
    config: KeycloakConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserRepresentation<'a> {
    username: &'a str,
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    enabled: bool,
    email_verified: bool,
    credentials: [CredentialRepresentation<'a>; 1],
}

#[derive(Serialize)]
struct CredentialRepresentation<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
    temporary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RoleRepresentation {
    #[serde(default)]
    id: Option<String>,
    name: String,
}

#[derive(Deserialize)]
struct AdminToken {
    access_token: String,
}

impl KeycloakClient {
    pub fn new(config: KeycloakConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    fn token_url(&self, realm: &str) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.config.base_url(),
            realm
        )
    }

    fn admin_url(&self, path: &str) -> String {
        format!(
            "{}/admin/realms/{}{}",
            self.config.base_url(),
            self.config.realm,
            path
        )
    }

    async fn admin_token(&self) -> CoreResult<String> {
        let res = self
            .http
            .post(self.token_url(&self.config.master_realm))
            .form(&[
                ("client_id", self.config.admin_client_id.as_str()),
                ("grant_type", "password"),
                ("username", self.config.admin_username.as_str()),
                ("password", self.config.admin_password.as_str()),
            ])
            .send()
            .await
            .map_err(upstream)?;

        if !res.status().is_success() {
            return Err(CoreError::IdentityProvider(format!(
                "admin login returned {}",
                res.status()
            )));
        }
        let token: AdminToken = res.json().await.map_err(upstream)?;
        Ok(token.access_token)
    }

    async fn assign_default_role(&self, admin_token: &str, user_id: &str) -> CoreResult<()> {
        let role: RoleRepresentation = self
            .http
            .get(self.admin_url(&format!("/roles/{}", self.config.user_role)))
            .bearer_auth(admin_token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(upstream)?
            .json()
            .await
            .map_err(upstream)?;

        self.http
            .post(self.admin_url(&format!("/users/{user_id}/role-mappings/realm")))
            .bearer_auth(admin_token)
            .json(&[role])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(upstream)?;
        Ok(())
    }

    async fn create_user_inner(&self, user: &NewUser) -> CoreResult<CreateUserOutcome> {
        let admin_token = self.admin_token().await?;
        let body = UserRepresentation {
            username: &user.email,
            email: &user.email,
            first_name: &user.first_name,
            last_name: &user.last_name,
            enabled: true,
            email_verified: true,
            credentials: [CredentialRepresentation {
                kind: "password",
                value: &user.password,
                temporary: false,
            }],
        };

        let res = self
            .http
            .post(self.admin_url("/users"))
            .bearer_auth(&admin_token)
            .json(&body)
            .send()
            .await
            .map_err(upstream)?;

        let location = res
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let outcome = creation_outcome(res.status(), location.as_deref());

        if let CreateUserOutcome::Created { id } = &outcome {
            self.assign_default_role(&admin_token, id).await?;
        }
        Ok(outcome)
    }
}

#[async_trait]
impl IdentityProvider for KeycloakClient {
    async fn create_user(&self, user: &NewUser) -> CoreResult<CreateUserOutcome> {
        tracing::info!(email = %user.email, realm = %self.config.realm, "creating keycloak user");
        self.create_user_inner(user).await.map_err(|e| {
            tracing::error!(email = %user.email, "keycloak user creation failed: {e}");
            CoreError::user_creation_failed(e.to_string())
        })
    }

    async fn find_user(&self, user_id: &str) -> CoreResult<UserProfile> {
        let admin_token = self.admin_token().await?;
        let res = self
            .http
            .get(self.admin_url(&format!("/users/{user_id}")))
            .bearer_auth(&admin_token)
            .send()
            .await
            .map_err(upstream)?;

        match res.status() {
            s if s.is_success() => res.json().await.map_err(upstream),
            StatusCode::NOT_FOUND => Err(CoreError::not_found("id", messages::NOT_FOUND)),
            other => Err(CoreError::IdentityProvider(format!(
                "user lookup returned {other}"
            ))),
        }
    }

    async fn issue_token(&self, credentials: &Credentials) -> CoreResult<TokenGrant> {
        let res = self
            .http
            .post(self.token_url(&self.config.realm))
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("grant_type", "password"),
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(upstream)?;

        let status = res.status();
        if status.is_success() {
            return res.json().await.map_err(upstream);
        }
        tracing::warn!(username = %credentials.username, %status, "token request refused");
        Err(token_error(status))
    }
}

fn upstream(e: reqwest::Error) -> CoreError {
    CoreError::IdentityProvider(e.to_string())
}

/// Interpret the admin API's answer to a user-creation request.
fn creation_outcome(status: StatusCode, location: Option<&str>) -> CreateUserOutcome {
    match status {
        StatusCode::CREATED => match location.and_then(created_id) {
            Some(id) => CreateUserOutcome::Created { id },
            None => CreateUserOutcome::Rejected {
                status: status.as_u16(),
            },
        },
        StatusCode::CONFLICT => CreateUserOutcome::Conflict,
        StatusCode::NOT_FOUND => CreateUserOutcome::RealmNotFound,
        other => CreateUserOutcome::Rejected {
            status: other.as_u16(),
        },
    }
}

/// Last path segment of the `Location` header.
fn created_id(location: &str) -> Option<String> {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn token_error(status: StatusCode) -> CoreError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
            CoreError::not_found("resource", messages::INVALID_CREDENTIALS)
        }
        StatusCode::NOT_FOUND => CoreError::not_found("resource", messages::NOT_FOUND),
        other => CoreError::IdentityProvider(format!("token endpoint returned {other}")),
    }
}
