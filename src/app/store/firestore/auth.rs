//! OAuth2 access tokens for the Firestore REST API.
//!
//! A service-account key signs a short-lived JWT assertion which the token
//! endpoint exchanges for a bearer token. Tokens are cached until shortly
//! before they expire and shared by every worker.

use std::sync::Mutex;

use awc::Client;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::app::store::StoreError;

pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The subset of a Google service-account JSON file the store needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: Option<String>,
    pub private_key: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    String::from(DEFAULT_TOKEN_URI)
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    value: String,
    expires_at: i64,
}

pub struct ServiceAccountTokens {
    client_email: String,
    token_uri: String,
    key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokens {
    pub fn new(account: &ServiceAccountKey) -> Result<Self, String> {
        let client_email = account
            .client_email
            .clone()
            .ok_or_else(|| String::from("client_email is missing"))?;
        let private_key = account
            .private_key
            .as_deref()
            .ok_or_else(|| String::from("private_key is missing"))?;
        let key = EncodingKey::from_rsa_pem(private_key.as_bytes()).map_err(|e| format!("private_key: {}", e))?;

        Ok(ServiceAccountTokens {
            client_email,
            token_uri: account.token_uri.clone(),
            key,
            cached: Mutex::new(None),
        })
    }

    fn cached(&self, now: i64) -> Option<String> {
        let cached = self.cached.lock().ok()?;

        cached
            .as_ref()
            .filter(|token| token.expires_at - EXPIRY_MARGIN_SECS > now)
            .map(|token| token.value.clone())
    }

    pub fn assertion(&self, now: i64) -> Result<String, StoreError> {
        let claims = Claims {
            iss: &self.client_email,
            scope: DATASTORE_SCOPE,
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.key).map_err(|e| StoreError::Auth(e.to_string()))
    }

    pub async fn token(&self, client: &Client) -> Result<String, StoreError> {
        let now = Utc::now().timestamp();
        if let Some(token) = self.cached(now) {
            return Ok(token);
        }

        let assertion = self.assertion(now)?;
        let mut response = client
            .post(self.token_uri.as_str())
            .send_form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .await
            .map_err(|e| StoreError::Auth(e.to_string()))?;

        let body = response.body().await.map_err(|e| StoreError::Auth(e.to_string()))?;
        if !response.status().is_success() {
            return Err(StoreError::Auth(format!(
                "token endpoint answered {}: {}",
                response.status(),
                String::from_utf8_lossy(&body)
            )));
        }

        let minted: TokenResponse = serde_json::from_slice(&body).map_err(|e| StoreError::Auth(e.to_string()))?;
        debug!("Minted access token for {}, valid {}s", self.client_email, minted.expires_in);

        if let Ok(mut cached) = self.cached.lock() {
            *cached = Some(CachedToken {
                value: minted.access_token.clone(),
                expires_at: now + minted.expires_in,
            });
        }

        Ok(minted.access_token)
    }
}

/// Bearer token attached to every store request.
pub enum TokenSource {
    /// Emulator or manually supplied token.
    Static(String),
    ServiceAccount(ServiceAccountTokens),
}

impl TokenSource {
    pub async fn bearer(&self, client: &Client) -> Result<String, StoreError> {
        match self {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::ServiceAccount(tokens) => tokens.token(client).await,
        }
    }
}
