//! Service-account OAuth: sign a JWT assertion and exchange it for a bearer
//! token.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::SinkError;

pub(crate) const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// The fields of a Google service-account JSON key that the token flow needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"[redacted]")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Claims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Read a service-account key file.
///
/// # Errors
///
/// Returns [`SinkError::Io`] if the file cannot be read, or
/// [`SinkError::Credentials`] if it is not a service-account key.
pub fn load_service_account_key(path: &Path) -> Result<ServiceAccountKey, SinkError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|e| SinkError::Credentials {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

pub(crate) fn build_claims(key: &ServiceAccountKey, now: DateTime<Utc>) -> Claims {
    Claims {
        iss: key.client_email.clone(),
        scope: SHEETS_SCOPE.to_string(),
        aud: key.token_uri.clone(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(1)).timestamp(),
    }
}

/// Exchange a signed assertion for a Sheets access token.
///
/// # Errors
///
/// - [`SinkError::Jwt`] if the private key is not a valid RSA PEM.
/// - [`SinkError::Authentication`] / [`SinkError::UnexpectedStatus`] on a
///   non-2xx response from `token_uri`.
/// - [`SinkError::MissingField`] if the response has no `access_token`.
pub async fn fetch_sheets_token(
    client: &Client,
    key: &ServiceAccountKey,
    now: DateTime<Utc>,
) -> Result<String, SinkError> {
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    let assertion = encode(
        &Header::new(Algorithm::RS256),
        &build_claims(key, now),
        &encoding_key,
    )?;

    let response = client
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await?;

    let status = response.status();
    if status == StatusCode::BAD_REQUEST
        || status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
    {
        return Err(SinkError::Authentication {
            status: status.as_u16(),
            endpoint: key.token_uri.clone(),
        });
    }
    if !status.is_success() {
        return Err(SinkError::UnexpectedStatus {
            status: status.as_u16(),
            endpoint: key.token_uri.clone(),
        });
    }

    let body = response.text().await?;
    let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| SinkError::Malformed {
        context: "service account token".to_string(),
        reason: e.to_string(),
    })?;
    let token = parsed.access_token.ok_or(SinkError::MissingField {
        context: "service account token".to_string(),
        field: "access_token",
    })?;
    tracing::debug!(client_email = %key.client_email, "acquired Sheets token");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn claims_request_sheets_scope_for_one_hour() {
        let key = ServiceAccountKey {
            client_email: "bot@project.iam.gserviceaccount.com".to_string(),
            private_key: String::new(),
            token_uri: default_token_uri(),
        };
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let claims = build_claims(&key, now);
        assert_eq!(claims.iss, key.client_email);
        assert_eq!(claims.scope, SHEETS_SCOPE);
        assert_eq!(claims.aud, "https://oauth2.googleapis.com/token");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn key_file_without_token_uri_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sa.json");
        std::fs::write(
            &path,
            r#"{"type":"service_account","client_email":"a@b","private_key":"pem"}"#,
        )
        .unwrap();
        let key = load_service_account_key(&path).unwrap();
        assert_eq!(key.token_uri, default_token_uri());
        assert!(!format!("{key:?}").contains("pem"));
    }

    #[test]
    fn key_file_missing_fields_is_credentials_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sa.json");
        std::fs::write(&path, r#"{"type":"service_account"}"#).unwrap();
        let err = load_service_account_key(&path).unwrap_err();
        assert!(matches!(err, SinkError::Credentials { .. }), "got: {err:?}");
    }

    #[test]
    fn missing_key_file_is_io_error() {
        let err = load_service_account_key(Path::new("/nonexistent/sa.json")).unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn invalid_private_key_is_jwt_error() {
        let key = ServiceAccountKey {
            client_email: "a@b".to_string(),
            private_key: "not a pem".to_string(),
            token_uri: "http://127.0.0.1:1/token".to_string(),
        };
        let err = fetch_sheets_token(&Client::new(), &key, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::Jwt(_)), "got: {err:?}");
    }
}
