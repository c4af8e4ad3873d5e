//! Service account authentication with domain-wide delegation.
//!
//! A signed JWT assertion (RS256) naming the impersonated admin as `sub` is
//! exchanged for an OAuth access token at the key's token URI. The token is
//! reused until shortly before it expires.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use driveaudit_core::AuditError;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;

/// Read-only Drive scopes requested for the audit.
pub const DRIVE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive.readonly",
    "https://www.googleapis.com/auth/drive.metadata.readonly",
];

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the reported expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Source of bearer tokens for API calls
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, AuditError>;
}

/// Fixed token, for tests and pre-issued credentials
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, AuditError> {
        Ok(self.0.clone())
    }
}

/// The fields of a service account JSON key that we use
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, AuditError> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .map_err(|e| AuditError::auth("failed to read service account file", e))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, AuditError> {
        serde_json::from_str(raw)
            .map_err(|e| AuditError::auth("failed to parse service account key", e))
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    sub: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Exchanges service account assertions for access tokens
pub struct Authenticator {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    subject: String,
    scopes: Vec<String>,
    http: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("client_email", &self.key.client_email)
            .field("subject", &self.subject)
            .field("token_uri", &self.key.token_uri)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    /// Build an authenticator from a key file, impersonating `admin_email`.
    pub fn new(service_account_file: &str, admin_email: &str) -> Result<Self, AuditError> {
        if service_account_file.is_empty() {
            return Err(AuditError::Auth(
                "service account file path is required".to_string(),
            ));
        }
        let key = ServiceAccountKey::from_file(Path::new(service_account_file))?;
        Self::from_key(key, admin_email)
    }

    pub fn from_key(key: ServiceAccountKey, admin_email: &str) -> Result<Self, AuditError> {
        if admin_email.is_empty() {
            return Err(AuditError::Auth(
                "admin email is required for domain-wide delegation".to_string(),
            ));
        }

        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| AuditError::auth("invalid service account private key", e))?;

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AuditError::auth("failed to create HTTP client", e))?;

        Ok(Self {
            key,
            encoding_key,
            subject: admin_email.to_string(),
            scopes: DRIVE_SCOPES.iter().map(|s| s.to_string()).collect(),
            http,
            cached: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String, AuditError> {
        let claims = Claims {
            iss: &self.key.client_email,
            sub: &self.subject,
            scope: self.scopes.join(" "),
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| AuditError::auth("failed to sign token assertion", e))
    }

    async fn exchange(&self) -> Result<CachedToken, AuditError> {
        let now = Utc::now();
        let assertion = self.assertion(now)?;

        tracing::debug!(
            client_email = %self.key.client_email,
            subject = %self.subject,
            "Exchanging service account assertion for access token"
        );

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await
            .map_err(|e| AuditError::auth("token request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(desc) => format!("{}: {}", err.error, desc),
                    None => err.error,
                },
                Err(_) => body,
            };
            return Err(AuditError::Auth(format!(
                "token endpoint returned {}: {}",
                status, detail
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuditError::auth("failed to parse token response", e))?;

        Ok(CachedToken {
            value: token.access_token,
            expires_at: token_expiry(now, token.expires_in),
        })
    }
}

/// Expiry for a token issued at `now`. Missing, non-positive or
/// unrepresentable lifetimes fall back to the assertion lifetime.
fn token_expiry(now: DateTime<Utc>, expires_in: Option<i64>) -> DateTime<Utc> {
    let fallback = Duration::seconds(ASSERTION_LIFETIME_SECS);
    let lifetime = expires_in
        .filter(|secs| *secs > 0)
        .and_then(Duration::try_seconds)
        .unwrap_or(fallback);

    now.checked_add_signed(lifetime)
        .or_else(|| now.checked_add_signed(fallback))
        .unwrap_or(now)
}

#[async_trait]
impl TokenSource for Authenticator {
    async fn access_token(&self) -> Result<String, AuditError> {
        let mut cached = self.cached.lock().await;
        let margin = Duration::seconds(EXPIRY_MARGIN_SECS);

        if let Some(token) = cached.as_ref() {
            if token.expires_at - margin > Utc::now() {
                return Ok(token.value.clone());
            }
            tracing::debug!("Access token near expiry, refreshing");
        }

        let fresh = self.exchange().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }
}
