//! Login and token refresh endpoints.
//!
//! These calls go straight to the backend. They never pass through the
//! bearer interceptor or the refresh coordinator, so a 401 from the refresh
//! endpoint is a plain failure and can never trigger another refresh.

use std::fmt;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::request::check_response;
use super::ApiError;

const LOGIN_PATH: &str = "login/";
const REFRESH_PATH: &str = "refresh/";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

/// Tokens issued on login
#[derive(Clone, Deserialize)]
pub struct TokenPair {
    #[serde(alias = "access_token")]
    pub access: String,
    #[serde(alias = "refresh_token")]
    pub refresh: String,
}

/// Tokens issued on refresh; `refresh` is only present when the backend
/// rotates refresh tokens
#[derive(Clone, Deserialize)]
pub struct RefreshedTokens {
    #[serde(alias = "access_token")]
    pub access: String,
    #[serde(default, alias = "refresh_token")]
    pub refresh: Option<String>,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair").finish_non_exhaustive()
    }
}

impl fmt::Debug for RefreshedTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshedTokens")
            .field("rotated", &self.refresh.is_some())
            .finish_non_exhaustive()
    }
}

/// Client for the authentication backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct AuthEndpoints {
    client: Client,
    base_url: Url,
}

impl AuthEndpoints {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidRequest(format!("Bad path {}: {}", path, e)))
    }

    /// Exchange username and password for an access/refresh pair
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        debug!(username = username, "Sending login request");

        let response = self
            .client
            .post(self.url(LOGIN_PATH)?)
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let response = check_response(response).await?;
        let text = response.text().await?;
        let tokens: TokenPair = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse login response: {}", e)))?;

        if tokens.access.is_empty() || tokens.refresh.is_empty() {
            return Err(ApiError::InvalidResponse(
                "Login response is missing a token".to_string(),
            ));
        }

        info!(username = username, "Login accepted");
        Ok(tokens)
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, ApiError> {
        debug!("Sending token refresh request");

        let response = self
            .client
            .post(self.url(REFRESH_PATH)?)
            .json(&RefreshRequest {
                refresh: refresh_token,
            })
            .send()
            .await?;

        let response = check_response(response).await?;
        let text = response.text().await?;
        let tokens: RefreshedTokens = serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse refresh response: {}", e))
        })?;

        if tokens.access.is_empty() {
            return Err(ApiError::InvalidResponse(
                "Refresh response does not contain an access token".to_string(),
            ));
        }

        info!(rotated = tokens.refresh.is_some(), "Access token refreshed");
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_pair_accepts_both_key_styles() {
        let short: TokenPair = serde_json::from_str(r#"{"access":"a","refresh":"r"}"#).unwrap();
        assert_eq!(short.access, "a");
        assert_eq!(short.refresh, "r");

        let long: TokenPair =
            serde_json::from_str(r#"{"access_token":"a","refresh_token":"r"}"#).unwrap();
        assert_eq!(long.access, "a");
        assert_eq!(long.refresh, "r");
    }

    #[test]
    fn test_refresh_without_rotation() {
        let tokens: RefreshedTokens = serde_json::from_str(r#"{"access":"a2"}"#).unwrap();
        assert_eq!(tokens.access, "a2");
        assert!(tokens.refresh.is_none());
    }

    #[test]
    fn test_debug_never_prints_tokens() {
        let pair = TokenPair {
            access: "secret-access".to_string(),
            refresh: "secret-refresh".to_string(),
        };
        let printed = format!("{:?}", pair);
        assert!(!printed.contains("secret"));
    }

    #[test]
    fn test_refresh_request_wire_format() {
        let body = serde_json::to_value(RefreshRequest { refresh: "r1" }).unwrap();
        assert_eq!(body, serde_json::json!({"refresh": "r1"}));
    }
}
