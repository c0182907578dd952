//! Request pipeline with refresh-and-retry on 401.
//!
//! Per request:
//!
//! ```text
//! Initial -> AwaitingResponse -> (non-401 or already retried) -> returned as-is
//!                             -> Unauthorized -> Refreshing -> Retried -> returned as-is
//!                                             |             -> Failed (tokens cleared, redirect)
//!                                             -> Failed (no refresh token, no network call)
//! ```
//!
//! Refreshes are serialized. A request that waited behind another refresh
//! reuses the token that refresh stored instead of issuing its own.

use std::sync::Arc;

use reqwest::{Client, Response, StatusCode, Url};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::auth::{CredentialStore, StoreError, TokenKind};
use crate::navigation::{Navigation, Navigator, Route};

use super::auth::AuthEndpoints;
use super::request::{BearerInterceptor, PendingRequest};
use super::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initial,
    AwaitingResponse,
    Unauthorized,
    Refreshing,
    Retried,
    Failed,
}

pub struct RefreshCoordinator {
    client: Client,
    base_url: Url,
    interceptor: BearerInterceptor,
    store: Arc<CredentialStore>,
    auth: AuthEndpoints,
    navigator: Arc<dyn Navigator>,
    refresh_gate: Mutex<()>,
}

impl RefreshCoordinator {
    pub fn new(
        client: Client,
        base_url: Url,
        store: Arc<CredentialStore>,
        auth: AuthEndpoints,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            client,
            base_url,
            interceptor: BearerInterceptor::new(store.clone()),
            store,
            auth,
            navigator,
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    pub fn auth(&self) -> &AuthEndpoints {
        &self.auth
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Run a request through the pipeline.
    ///
    /// Any response other than a first 401 is returned unchanged, including
    /// error statuses. Transport errors are returned unchanged and never retried.
    pub async fn execute(&self, mut request: PendingRequest) -> Result<Response, ApiError> {
        let (response, sent_with) = self.dispatch(&request, Phase::Initial).await?;

        if response.status() != StatusCode::UNAUTHORIZED || request.is_retried() {
            return Ok(response);
        }

        request.mark_retried();
        self.log_phase(&request, Phase::Unauthorized);

        self.renew(&request, sent_with.as_deref()).await?;

        let (response, _) = self.dispatch(&request, Phase::Retried).await?;
        debug!(
            method = %request.method(),
            path = request.path(),
            status = %response.status(),
            "Retried request completed"
        );
        Ok(response)
    }

    async fn dispatch(
        &self,
        request: &PendingRequest,
        phase: Phase,
    ) -> Result<(Response, Option<String>), ApiError> {
        let builder = request.builder(&self.client, &self.base_url)?;
        let (builder, token) = match self.interceptor.intercept(builder) {
            Ok(intercepted) => intercepted,
            Err(e) => return Err(self.storage_failure(e)),
        };

        self.log_phase(request, phase);
        self.log_phase(request, Phase::AwaitingResponse);

        let response = builder.send().await?;
        Ok((response, token))
    }

    /// Make sure a usable access token is stored, refreshing if needed
    async fn renew(&self, request: &PendingRequest, sent_with: Option<&str>) -> Result<(), ApiError> {
        let _gate = self.refresh_gate.lock().await;

        let current = self.read(TokenKind::Access)?;
        match (current.as_deref(), sent_with) {
            (Some(current), sent) if Some(current) != sent => {
                debug!(path = request.path(), "Access token already renewed, reusing it");
                return Ok(());
            }
            (None, Some(_)) => {
                // Cleared while this request waited: the session already ended
                debug!(path = request.path(), "Session ended by an earlier refresh");
                self.log_phase(request, Phase::Failed);
                return Err(ApiError::SessionExpired);
            }
            _ => {}
        }

        let refresh_token = match self.read(TokenKind::Refresh)? {
            Some(token) => token,
            None => {
                self.log_phase(request, Phase::Failed);
                self.force_logout("no refresh token stored");
                return Err(ApiError::SessionExpired);
            }
        };

        self.log_phase(request, Phase::Refreshing);
        let tokens = match self.auth.refresh(&refresh_token).await {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                self.log_phase(request, Phase::Failed);
                self.force_logout("refresh rejected");
                return Err(ApiError::SessionExpired);
            }
        };

        let stored = match tokens.refresh.as_deref() {
            Some(rotated) => self.store.set_pair(&tokens.access, rotated),
            None => self.store.set(TokenKind::Access, &tokens.access),
        };
        stored.map_err(|e| self.storage_failure(e))
    }

    fn read(&self, kind: TokenKind) -> Result<Option<String>, ApiError> {
        self.store.get(kind).map_err(|e| self.storage_failure(e))
    }

    fn storage_failure(&self, e: StoreError) -> ApiError {
        error!(error = %e, "Credential store failed, ending session");
        self.force_logout("credential store failure");
        ApiError::Credentials(e)
    }

    /// Clear both tokens and send the user to the login view
    fn force_logout(&self, reason: &str) {
        warn!(reason = reason, "Forcing logout");
        if let Err(e) = self.store.clear() {
            error!(error = %e, "Failed to clear tokens during forced logout");
        }
        self.navigator.navigate(Navigation::replace(Route::Login));
    }

    fn log_phase(&self, request: &PendingRequest, phase: Phase) {
        debug!(method = %request.method(), path = request.path(), phase = ?phase, "Request phase");
    }
}
