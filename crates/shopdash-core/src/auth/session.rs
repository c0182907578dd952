//! Session context shared with the front-end.
//!
//! `SessionContext` answers two questions for the route guard, "are we still
//! starting up?" and "is there a session?", and performs login and logout.
//! It holds no token of its own: `is_authenticated` reads the credential
//! store every time, so a refresh failure that clears the store is seen on
//! the very next check.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::api::{ApiError, AuthEndpoints};
use crate::navigation::{Navigation, Navigator, Route};

use super::credentials::{CredentialStore, StoreError, TokenKind};

/// Snapshot of the session flags, as read by the route guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    pub loading: bool,
    pub authenticated: bool,
}

#[derive(Error, Debug)]
pub enum LoginError {
    #[error("Username and password are required")]
    MissingCredentials,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Could not save session: {0}")]
    Storage(#[from] StoreError),
}

pub struct SessionContext {
    store: Arc<CredentialStore>,
    auth: AuthEndpoints,
    navigator: Arc<dyn Navigator>,
    loading: AtomicBool,
}

impl SessionContext {
    pub fn new(
        store: Arc<CredentialStore>,
        auth: AuthEndpoints,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            store,
            auth,
            navigator,
            loading: AtomicBool::new(true),
        }
    }

    /// Initial stored-credential check. Ends the loading phase.
    ///
    /// An unreadable store is cleared and treated as signed out.
    pub fn restore(&self) -> SessionState {
        match self.store.has(TokenKind::Access) {
            Ok(true) => info!("Restored stored session"),
            Ok(false) => debug!("No stored session"),
            Err(e) => {
                warn!(error = %e, "Stored session unreadable, discarding it");
                if let Err(e) = self.store.clear() {
                    error!(error = %e, "Failed to clear unreadable session");
                }
            }
        }
        self.finish_loading();
        self.state()
    }

    fn finish_loading(&self) {
        if self.loading.swap(false, Ordering::SeqCst) {
            debug!("Session loading finished");
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// True iff an access token is stored. Always false while loading.
    pub fn is_authenticated(&self) -> bool {
        if self.is_loading() {
            return false;
        }
        match self.store.has(TokenKind::Access) {
            Ok(has) => has,
            Err(e) => {
                error!(error = %e, "Session store unreadable, discarding it");
                if let Err(e) = self.store.clear() {
                    error!(error = %e, "Failed to clear unreadable session");
                }
                false
            }
        }
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            loading: self.is_loading(),
            authenticated: self.is_authenticated(),
        }
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// Log in and open the landing view. Storage is left untouched unless
    /// the backend accepts the credentials.
    pub async fn try_login(&self, username: &str, password: &str) -> Result<(), LoginError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(LoginError::MissingCredentials);
        }

        let tokens = match self.auth.login(username, password).await {
            Ok(tokens) => tokens,
            Err(ApiError::Unauthorized) | Err(ApiError::BadRequest(_)) => {
                warn!(username = username, "Login rejected");
                return Err(LoginError::InvalidCredentials);
            }
            Err(e) => {
                warn!(username = username, error = %e, "Login failed");
                return Err(LoginError::Api(e));
            }
        };

        if let Err(e) = self.store.set_pair(&tokens.access, &tokens.refresh) {
            error!(error = %e, "Failed to persist session");
            if let Err(e) = self.store.clear() {
                error!(error = %e, "Failed to clear partial session");
            }
            return Err(LoginError::Storage(e));
        }

        self.finish_loading();
        info!(username = username, "Logged in");
        self.navigator.navigate(Navigation::push(Route::LANDING));
        Ok(())
    }

    /// `try_login` for callers that only need success or failure
    pub async fn login(&self, username: &str, password: &str) -> bool {
        self.try_login(username, password).await.is_ok()
    }

    /// Clear both tokens and go to the login view. Navigation happens even
    /// if clearing fails; the error is still returned.
    pub fn logout(&self) -> Result<(), StoreError> {
        let cleared = self.store.clear();
        match &cleared {
            Ok(()) => info!("Logged out"),
            Err(e) => error!(error = %e, "Failed to clear tokens on logout"),
        }
        self.navigator.navigate(Navigation::replace(Route::Login));
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::backend::{MemoryBackend, TokenBackend};
    use crate::navigation::ChannelNavigator;
    use reqwest::{Client, Url};

    struct BrokenBackend;

    impl TokenBackend for BrokenBackend {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn read(&self, _kind: TokenKind) -> Result<Option<String>, StoreError> {
            Err(StoreError::Corrupt("bad json".to_string()))
        }

        fn write(&self, _tokens: &[(TokenKind, &str)]) -> Result<(), StoreError> {
            Err(StoreError::Poisoned)
        }

        fn clear(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn context(
        store: CredentialStore,
    ) -> (
        SessionContext,
        tokio::sync::mpsc::UnboundedReceiver<Navigation>,
    ) {
        let (navigator, rx) = ChannelNavigator::new();
        // Nothing listens here; tests below never reach the network
        let auth = AuthEndpoints::new(Client::new(), Url::parse("http://127.0.0.1:9/api/").unwrap());
        (
            SessionContext::new(Arc::new(store), auth, Arc::new(navigator)),
            rx,
        )
    }

    #[test]
    fn test_loading_until_restore() {
        let store = CredentialStore::new(MemoryBackend::new());
        store.set_pair("a", "r").unwrap();
        let (session, _rx) = context(store);

        assert!(session.is_loading());
        assert!(!session.is_authenticated());
        assert_eq!(
            session.state(),
            SessionState {
                loading: true,
                authenticated: false
            }
        );

        let state = session.restore();
        assert_eq!(
            state,
            SessionState {
                loading: false,
                authenticated: true
            }
        );
        assert!(!session.is_loading());
    }

    #[test]
    fn test_is_authenticated_reads_through() {
        let (session, _rx) = context(CredentialStore::new(MemoryBackend::new()));
        session.restore();
        assert!(!session.is_authenticated());

        session.store().set(TokenKind::Access, "fresh").unwrap();
        assert!(session.is_authenticated());

        session.store().clear().unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_restore_with_broken_store_is_signed_out() {
        let (session, _rx) = context(CredentialStore::new(BrokenBackend));
        let state = session.restore();
        assert!(!state.loading);
        assert!(!state.authenticated);
    }

    #[test]
    fn test_restore_clears_corrupt_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let backend = crate::auth::FileBackend::new(dir.path());
        std::fs::write(backend.session_path(), "{not json").unwrap();
        let path = backend.session_path();

        let (session, _rx) = context(CredentialStore::new(backend));
        assert!(matches!(
            session.store().get(TokenKind::Access),
            Err(StoreError::Corrupt(_))
        ));

        let state = session.restore();
        assert!(!state.loading);
        assert!(!state.authenticated);
        assert!(!path.exists());
        assert_eq!(session.store().get(TokenKind::Access).unwrap(), None);
    }

    #[test]
    fn test_unreadable_store_after_restore_is_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let backend = crate::auth::FileBackend::new(dir.path());
        let path = backend.session_path();
        let (session, _rx) = context(CredentialStore::new(backend));
        session.restore();

        // Corrupted behind our back after startup
        std::fs::write(&path, "{not json").unwrap();
        assert!(!session.is_authenticated());
        assert!(!path.exists());
        assert_eq!(session.store().get(TokenKind::Access).unwrap(), None);
    }

    #[test]
    fn test_logout_clears_and_replaces_with_login() {
        let store = CredentialStore::new(MemoryBackend::new());
        store.set_pair("a", "r").unwrap();
        let (session, mut rx) = context(store);
        session.restore();

        session.logout().unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(session.store().get(TokenKind::Refresh).unwrap(), None);
        assert_eq!(rx.try_recv().unwrap(), Navigation::replace(Route::Login));
    }

    #[test]
    fn test_logout_when_already_signed_out() {
        let (session, mut rx) = context(CredentialStore::new(MemoryBackend::new()));
        session.restore();
        session.logout().unwrap();
        assert_eq!(rx.try_recv().unwrap(), Navigation::replace(Route::Login));
    }

    #[tokio::test]
    async fn test_empty_credentials_rejected_locally() {
        let (session, mut rx) = context(CredentialStore::new(MemoryBackend::new()));
        assert!(matches!(
            session.try_login("", "secret").await,
            Err(LoginError::MissingCredentials)
        ));
        assert!(matches!(
            session.try_login("admin", "").await,
            Err(LoginError::MissingCredentials)
        ));
        assert!(!session.login("   ", "x").await);
        assert!(rx.try_recv().is_err());
    }
}
