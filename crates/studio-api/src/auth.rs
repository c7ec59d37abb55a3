//! Bearer-token authentication against Supabase Auth.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// The caller behind a validated access token
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthenticatedUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Validates access tokens
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// `Ok(None)` for a token the provider rejects; `Err` only when the
    /// provider itself could not be reached.
    async fn authenticate(&self, token: &str) -> anyhow::Result<Option<AuthenticatedUser>>;
}

pub struct SupabaseAuthenticator {
    http_client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuthenticator {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder().timeout(AUTH_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        })
    }
}

#[async_trait]
impl Authenticator for SupabaseAuthenticator {
    async fn authenticate(&self, token: &str) -> anyhow::Result<Option<AuthenticatedUser>> {
        let response = self
            .http_client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.json::<AuthenticatedUser>().await?)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status => {
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("Auth API error ({}): {}", status, body)
            }
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthorized)?;

        match state.authenticator.authenticate(token).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(ApiError::Unauthorized),
            Err(e) => Err(ApiError::AuthProvider(e.to_string())),
        }
    }
}
