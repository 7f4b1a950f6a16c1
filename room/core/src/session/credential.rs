//! Access Credential Handling
//!
//! The room receives its bearer token one of two ways:
//!
//! - in the room URL, as a query parameter (deep links from the web app)
//! - from the cookie-exchange endpoint, which answers with a `Set-Cookie`
//!   carrying the token
//!
//! Whatever was resolved is kept in a [`TokenStore`]: in memory for header
//! injection, and on disk so a restarted room can reuse it.
//!
//! # Storage
//!
//! - Stored as plain text at `$XDG_DATA_HOME/telehealth-room/access-token`
//! - File has 0o600 permissions (owner read/write only), directory 0o700
//! - A missing or empty file means "no stored token", not an error

use std::fmt;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use reqwest::Url;
use thiserror::Error;

/// Errors related to access credentials
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Failed to read the token file
    #[error("failed to read token file {path}: {source}")]
    ReadFailed {
        /// File that was read
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Failed to write the token file
    #[error("failed to write token file {path}: {source}")]
    WriteFailed {
        /// File that was written
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The cookie-exchange request failed
    #[error("cookie exchange failed: {0}")]
    ExchangeFailed(#[from] reqwest::Error),

    /// The cookie-exchange endpoint answered with an error status
    #[error("cookie exchange returned HTTP {0}")]
    ExchangeStatus(u16),

    /// The exchange response did not set the expected cookie
    #[error("cookie {0:?} not set by exchange response")]
    CookieMissing(String),
}

/// A bearer token for the session API
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a token, rejecting empty or whitespace-only values
    #[must_use]
    pub fn new(value: impl AsRef<str>) -> Option<Self> {
        let value = value.as_ref().trim();
        if value.is_empty() {
            None
        } else {
            Some(Self(value.to_string()))
        }
    }

    /// The raw token value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken([REDACTED])")
    }
}

/// Where the session's token came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialSource {
    /// Query parameter of the room URL
    QueryParam,
    /// Cookie-exchange endpoint
    CookieExchange,
    /// Token file from an earlier run
    Stored,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueryParam => write!(f, "query parameter"),
            Self::CookieExchange => write!(f, "cookie exchange"),
            Self::Stored => write!(f, "token file"),
        }
    }
}

/// Extract the access token from a room URL's query string
#[must_use]
pub fn token_from_url(url: &Url, param: &str) -> Option<AccessToken> {
    url.query_pairs()
        .find(|(name, _)| name == param)
        .and_then(|(_, value)| AccessToken::new(value))
}

/// Find a cookie by name in a response's `Set-Cookie` headers
#[must_use]
pub fn token_from_response(response: &reqwest::Response, cookie_name: &str) -> Option<AccessToken> {
    response
        .cookies()
        .find(|cookie| cookie.name() == cookie_name)
        .and_then(|cookie| AccessToken::new(cookie.value()))
}

/// In-memory token plus its on-disk copy
#[derive(Debug)]
pub struct TokenStore {
    /// File backing the store (`None` = memory only)
    path: Option<PathBuf>,
    /// Token attached to outgoing requests
    current: RwLock<Option<AccessToken>>,
}

impl TokenStore {
    /// Create a store backed by a file
    #[must_use]
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            current: RwLock::new(None),
        }
    }

    /// Create a store that never touches the disk
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(None)
    }

    /// File backing the store
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Token currently attached to requests
    #[must_use]
    pub fn current(&self) -> Option<AccessToken> {
        self.current.read().clone()
    }

    /// Replace the in-memory token without persisting it
    pub fn set(&self, token: Option<AccessToken>) {
        *self.current.write() = token;
    }

    /// Load the token file into memory
    ///
    /// Returns `Ok(None)` when there is no file or it is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub async fn load(&self) -> Result<Option<AccessToken>, CredentialError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(self.current());
        };

        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CredentialError::ReadFailed {
                    path: path.clone(),
                    source,
                })
            }
        };

        let token = AccessToken::new(contents);
        if token.is_some() {
            self.set(token.clone());
            tracing::debug!(path = %path.display(), "Access token loaded from file");
        }
        Ok(token)
    }

    /// Set the token and write it to the token file
    ///
    /// The in-memory token is updated even if writing fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub async fn save(&self, token: AccessToken) -> Result<(), CredentialError> {
        let contents = format!("{}\n", token.as_str());
        self.set(Some(token));

        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        let write_err = |source| CredentialError::WriteFailed {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !tokio::fs::try_exists(parent).await.unwrap_or(false) {
                tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
                #[cfg(unix)]
                set_mode(parent, 0o700).await.map_err(write_err)?;
            }
        }

        tokio::fs::write(path, contents).await.map_err(write_err)?;
        #[cfg(unix)]
        set_mode(path, 0o600).await.map_err(write_err)?;

        tracing::debug!(path = %path.display(), "Access token written to file");
        Ok(())
    }

    /// Forget the token in memory and on disk
    ///
    /// # Errors
    ///
    /// Returns an error if the token file exists but cannot be removed.
    pub async fn clear(&self) -> Result<(), CredentialError> {
        self.set(None);
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CredentialError::WriteFailed {
                path: path.clone(),
                source,
            }),
        }
    }
}

#[cfg(unix)]
async fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(mode);
    tokio::fs::set_permissions(path, perms).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_token_rejected() {
        assert!(AccessToken::new("").is_none());
        assert!(AccessToken::new("   \n").is_none());
        assert_eq!(AccessToken::new(" abc \n").unwrap().as_str(), "abc");
    }

    #[test]
    fn test_debug_redacts() {
        let token = AccessToken::new("secret-value").unwrap();
        assert!(!format!("{token:?}").contains("secret"));
    }

    #[test]
    fn test_token_from_url() {
        let url = Url::parse("http://localhost/room/abc/doctor?access-token=tok123&x=1").unwrap();
        assert_eq!(
            token_from_url(&url, "access-token").map(|t| t.as_str().to_string()),
            Some("tok123".to_string())
        );
        assert!(token_from_url(&url, "token").is_none());

        let empty = Url::parse("http://localhost/room/abc?access-token=").unwrap();
        assert!(token_from_url(&empty, "access-token").is_none());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(Some(dir.path().join("access-token")));
        assert!(store.load().await.unwrap().is_none());
        assert!(store.current().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("access-token");

        let store = TokenStore::new(Some(path.clone()));
        store.save(AccessToken::new("tok-1").unwrap()).await.unwrap();
        assert_eq!(store.current().unwrap().as_str(), "tok-1");

        let reopened = TokenStore::new(Some(path));
        let loaded = reopened.load().await.unwrap().unwrap();
        assert_eq!(loaded.as_str(), "tok-1");
        assert_eq!(reopened.current(), Some(loaded));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_saved_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("access-token");
        let store = TokenStore::new(Some(path.clone()));
        store.save(AccessToken::new("tok").unwrap()).await.unwrap();

        let mode = tokio::fs::metadata(&path).await.unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_clear() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("access-token");
        let store = TokenStore::new(Some(path.clone()));
        store.save(AccessToken::new("tok").unwrap()).await.unwrap();

        store.clear().await.unwrap();
        assert!(store.current().is_none());
        assert!(!path.exists());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = TokenStore::in_memory();
        store.save(AccessToken::new("tok").unwrap()).await.unwrap();
        assert_eq!(store.load().await.unwrap().unwrap().as_str(), "tok");
    }
}
