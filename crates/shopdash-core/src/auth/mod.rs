//! Authentication module for managing tokens and the user session.
//!
//! This module provides:
//! - `CredentialStore`: the single owner of the access/refresh token pair
//! - `TokenBackend` implementations: session file, OS keychain, memory
//! - `SessionContext`: login/logout and the `is_authenticated`/`is_loading`
//!   state read by the route guard
//!
//! Tokens are opaque strings. Expiry is never checked locally; the backend
//! reports it with a 401 and the request pipeline takes over.

pub mod backend;
pub mod credentials;
pub mod session;

pub use backend::{FileBackend, KeyringBackend, MemoryBackend, TokenBackend};
pub use credentials::{CredentialStore, StoreError, TokenKind};
pub use session::{LoginError, SessionContext, SessionState};
