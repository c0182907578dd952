//! Durable storage for the token pair.
//!
//! Each backend is scoped to one API origin, so sessions for different
//! servers never overwrite each other.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::credentials::{StoreError, TokenKind};

/// Session file name in the per-origin session directory
const SESSION_FILE: &str = "session.json";

/// Written first, then renamed over the session file
const SESSION_TMP_FILE: &str = "session.json.tmp";

/// Keychain service name
const SERVICE_NAME: &str = "shopdash";

pub trait TokenBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn read(&self, kind: TokenKind) -> Result<Option<String>, StoreError>;

    /// Write all given tokens; tokens not listed keep their current value
    fn write(&self, tokens: &[(TokenKind, &str)]) -> Result<(), StoreError>;

    /// Remove both tokens
    fn clear(&self) -> Result<(), StoreError>;
}

// ============================================================================
// Session file
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionFile {
    access_token: Option<String>,
    refresh_token: Option<String>,
    saved_at: Option<DateTime<Utc>>,
}

impl SessionFile {
    fn slot(&mut self, kind: TokenKind) -> &mut Option<String> {
        match kind {
            TokenKind::Access => &mut self.access_token,
            TokenKind::Refresh => &mut self.refresh_token,
        }
    }

    fn get(&self, kind: TokenKind) -> Option<&String> {
        match kind {
            TokenKind::Access => self.access_token.as_ref(),
            TokenKind::Refresh => self.refresh_token.as_ref(),
        }
    }
}

/// Tokens in a JSON file, one directory per API origin.
pub struct FileBackend {
    dir: PathBuf,
    // Serializes read-modify-write cycles on the file
    lock: Mutex<()>,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    fn load(path: &Path) -> Result<SessionFile, StoreError> {
        if !path.exists() {
            return Ok(SessionFile::default());
        }
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))
    }

    /// Write the session file owner-only from the moment it exists. The
    /// data goes to a fresh temp file that is renamed into place, so readers
    /// never see a half-written file.
    fn save(&self, data: &SessionFile) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let contents = serde_json::to_string_pretty(data)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let tmp = self.dir.join(SESSION_TMP_FILE);
        // A leftover temp file may carry other permissions
        match std::fs::remove_file(&tmp) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&tmp)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        drop(file);

        std::fs::rename(&tmp, self.session_path())?;
        Ok(())
    }
}

impl TokenBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    fn read(&self, kind: TokenKind) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let data = Self::load(&self.session_path())?;
        Ok(data.get(kind).cloned())
    }

    fn write(&self, tokens: &[(TokenKind, &str)]) -> Result<(), StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut data = Self::load(&self.session_path())?;
        for (kind, token) in tokens {
            *data.slot(*kind) = Some(token.to_string());
        }
        data.saved_at = Some(Utc::now());
        self.save(&data)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(&path)?;
            debug!(path = %path.display(), "Session file removed");
        }
        Ok(())
    }
}

// ============================================================================
// OS keychain
// ============================================================================

/// Tokens in the OS keychain, one entry per token kind.
pub struct KeyringBackend {
    origin: String,
}

impl KeyringBackend {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
        }
    }

    fn entry(&self, kind: TokenKind) -> Result<Entry, StoreError> {
        Ok(Entry::new(SERVICE_NAME, &format!("{}/{}", self.origin, kind.key()))?)
    }
}

impl TokenBackend for KeyringBackend {
    fn name(&self) -> &'static str {
        "keyring"
    }

    fn read(&self, kind: TokenKind) -> Result<Option<String>, StoreError> {
        match self.entry(kind)?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, tokens: &[(TokenKind, &str)]) -> Result<(), StoreError> {
        for (kind, token) in tokens {
            self.entry(*kind)?.set_password(token)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        for kind in TokenKind::ALL {
            match self.entry(kind)?.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

// ============================================================================
// Memory
// ============================================================================

/// Process-local tokens; gone when the process exits.
#[derive(Default)]
pub struct MemoryBackend {
    tokens: RwLock<HashMap<TokenKind, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn read(&self, kind: TokenKind) -> Result<Option<String>, StoreError> {
        let tokens = self.tokens.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tokens.get(&kind).cloned())
    }

    fn write(&self, tokens: &[(TokenKind, &str)]) -> Result<(), StoreError> {
        let mut stored = self.tokens.write().map_err(|_| StoreError::Poisoned)?;
        for (kind, token) in tokens {
            stored.insert(*kind, token.to_string());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.tokens.write().map_err(|_| StoreError::Poisoned)?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_backend_survives_fresh_instance() {
        let dir = tempfile::tempdir().unwrap();

        let first = FileBackend::new(dir.path());
        first
            .write(&[(TokenKind::Access, "access-1"), (TokenKind::Refresh, "refresh-1")])
            .unwrap();

        // Simulated reload: a brand new backend over the same directory
        let second = FileBackend::new(dir.path());
        assert_eq!(second.read(TokenKind::Access).unwrap().as_deref(), Some("access-1"));
        assert_eq!(second.read(TokenKind::Refresh).unwrap().as_deref(), Some("refresh-1"));
    }

    #[test]
    fn test_file_backend_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("not-created-yet"));
        assert_eq!(backend.read(TokenKind::Access).unwrap(), None);
        // Clearing a session that never existed is fine
        backend.clear().unwrap();
    }

    #[test]
    fn test_file_backend_corrupt_file_fails_loudly() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "{not json").unwrap();

        let backend = FileBackend::new(dir.path());
        let err = backend.read(TokenKind::Access).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));

        // Clearing still works so the caller can force a logout
        backend.clear().unwrap();
        assert_eq!(backend.read(TokenKind::Access).unwrap(), None);
    }

    #[test]
    fn test_file_backend_partial_write_keeps_other_token() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        backend
            .write(&[(TokenKind::Access, "a1"), (TokenKind::Refresh, "r1")])
            .unwrap();
        backend.write(&[(TokenKind::Access, "a2")]).unwrap();

        assert_eq!(backend.read(TokenKind::Access).unwrap().as_deref(), Some("a2"));
        assert_eq!(backend.read(TokenKind::Refresh).unwrap().as_deref(), Some("r1"));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_backend_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        backend.write(&[(TokenKind::Access, "a")]).unwrap();

        let mode = std::fs::metadata(backend.session_path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_backend_replaces_readable_session_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SESSION_FILE);
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        // Stale temp file from an interrupted write
        let tmp = dir.path().join(SESSION_TMP_FILE);
        std::fs::write(&tmp, "stale").unwrap();
        std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o666)).unwrap();

        let backend = FileBackend::new(dir.path());
        backend.write(&[(TokenKind::Access, "a1")]).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!tmp.exists());
        assert_eq!(backend.read(TokenKind::Access).unwrap().as_deref(), Some("a1"));
    }

    #[test]
    fn test_memory_backend_clear() {
        let backend = MemoryBackend::new();
        backend.write(&[(TokenKind::Access, "a")]).unwrap();
        backend.clear().unwrap();
        assert_eq!(backend.read(TokenKind::Access).unwrap(), None);
    }
}
