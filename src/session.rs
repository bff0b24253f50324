//! Session Tokens
//!
//! The bearer credential is owned by an external token store. The view
//! layer only ever reads it; writing happens at login time through the
//! concrete stores below.

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Read-only source of the current bearer token
pub trait TokenStore: Send + Sync {
    /// Current token, if the user is logged in
    fn token(&self) -> Option<String>;
}

/// Token kept in a file on disk (the CLI's persistent client storage).
///
/// The file is read once when the store is opened; requests only touch the
/// cached copy. `store` and `clear` update both.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    cached: RwLock<Option<String>>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cached = RwLock::new(read_token(&path));
        Self { path, cached }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a token readable only by the owner, creating parent
    /// directories as needed
    pub fn store(&self, token: &str) -> Result<(), SessionError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        write_private(&self.path, token)?;
        *self.cached.write() = Some(token.to_string());
        tracing::info!(path = ?self.path, "Stored session token");
        Ok(())
    }

    /// Remove the stored token; a missing file is not an error
    pub fn clear(&self) -> Result<(), SessionError> {
        *self.cached.write() = None;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Option<String> {
        self.cached.read().clone()
    }
}

fn read_token(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let token = content.trim();
            (!token.is_empty()).then(|| token.to_string())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!(path = ?path, "Failed to read session token: {}", e);
            None
        }
    }
}

#[cfg(unix)]
fn write_private(path: &Path, token: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(token.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, token: &str) -> std::io::Result<()> {
    std::fs::write(path, token)
}

/// In-memory token, used by tests and embedders that manage login themselves
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token),
        }
    }

    pub fn set(&self, token: Option<String>) {
        *self.token.write() = token;
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.token.read().clone()
    }
}

/// Extract the token the OAuth2 success handler appends to its redirect
/// (`...?token=<jwt>`).
pub fn token_from_redirect(redirect: &str) -> Result<String, SessionError> {
    let url = reqwest::Url::parse(redirect)
        .map_err(|e| SessionError::InvalidRedirect(e.to_string()))?;

    url.query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(SessionError::MissingRedirectToken)
}

/// Session store errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token must not be empty")]
    EmptyToken,

    #[error("Invalid redirect URL: {0}")]
    InvalidRedirect(String),

    #[error("Redirect URL carries no token parameter")]
    MissingRedirectToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("token"));

        assert_eq!(store.token(), None);

        store.store("  abc.def.ghi\n").unwrap();
        assert_eq!(store.token().as_deref(), Some("abc.def.ghi"));

        store.clear().unwrap();
        assert_eq!(store.token(), None);
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_rejects_empty_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("token"));

        assert!(matches!(store.store("   "), Err(SessionError::EmptyToken)));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_blank_file_means_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "\n").unwrap();

        assert_eq!(FileTokenStore::new(path).token(), None);
    }

    #[test]
    fn test_file_store_reads_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "first").unwrap();

        let store = FileTokenStore::new(&path);
        std::fs::write(&path, "second").unwrap();
        assert_eq!(store.token().as_deref(), Some("first"));

        assert_eq!(FileTokenStore::new(&path).token().as_deref(), Some("second"));
    }

    #[cfg(unix)]
    #[test]
    fn test_stored_token_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        FileTokenStore::new(&path).store("new-token").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new-token");
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::default();
        assert_eq!(store.token(), None);

        store.set(Some("t1".to_string()));
        assert_eq!(store.token().as_deref(), Some("t1"));
    }

    #[test]
    fn test_token_from_redirect() {
        let token =
            token_from_redirect("http://localhost:8084/dashboard.html?token=eyJ.abc%3D").unwrap();
        assert_eq!(token, "eyJ.abc=");

        assert!(matches!(
            token_from_redirect("http://localhost:8084/dashboard.html"),
            Err(SessionError::MissingRedirectToken)
        ));
        assert!(matches!(
            token_from_redirect("not a url"),
            Err(SessionError::InvalidRedirect(_))
        ));
    }
}
