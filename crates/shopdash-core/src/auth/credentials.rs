use std::fmt;

use thiserror::Error;
use tracing::{debug, error};

use super::backend::TokenBackend;

/// The two tokens a session consists of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub const ALL: [TokenKind; 2] = [TokenKind::Access, TokenKind::Refresh];

    /// Fixed storage key for this token
    pub fn key(&self) -> &'static str {
        match self {
            TokenKind::Access => "access_token",
            TokenKind::Refresh => "refresh_token",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session storage is corrupt: {0}")]
    Corrupt(String),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Session storage lock poisoned")]
    Poisoned,
}

/// Process-wide owner of the session tokens.
///
/// Every read goes to the backend, so callers always see the most recently
/// stored token. Failures are returned, never swallowed: a caller that cannot
/// read or write the store must treat the session as gone.
pub struct CredentialStore {
    backend: Box<dyn TokenBackend>,
}

impl CredentialStore {
    pub fn new(backend: impl TokenBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Name of the backend in use (for status output)
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn get(&self, kind: TokenKind) -> Result<Option<String>, StoreError> {
        self.backend.read(kind).map_err(|e| {
            error!(token = %kind, error = %e, "Failed to read token");
            e
        })
    }

    pub fn set(&self, kind: TokenKind, token: &str) -> Result<(), StoreError> {
        debug!(token = %kind, backend = self.backend.name(), "Storing token");
        self.backend.write(&[(kind, token)]).map_err(|e| {
            error!(token = %kind, error = %e, "Failed to store token");
            e
        })
    }

    /// Store a freshly issued access/refresh pair in one backend write
    pub fn set_pair(&self, access: &str, refresh: &str) -> Result<(), StoreError> {
        debug!(backend = self.backend.name(), "Storing token pair");
        self.backend
            .write(&[(TokenKind::Access, access), (TokenKind::Refresh, refresh)])
            .map_err(|e| {
                error!(error = %e, "Failed to store token pair");
                e
            })
    }

    /// Remove both tokens together
    pub fn clear(&self) -> Result<(), StoreError> {
        debug!(backend = self.backend.name(), "Clearing tokens");
        self.backend.clear().map_err(|e| {
            error!(error = %e, "Failed to clear tokens");
            e
        })
    }

    pub fn has(&self, kind: TokenKind) -> Result<bool, StoreError> {
        Ok(self.get(kind)?.is_some())
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("backend", &self.backend.name())
            .finish()
    }
}
