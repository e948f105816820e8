//! Shared session state: the bearer token and the cached auth user.
//!
//! The store is an explicit context object handed to every request
//! executor. Updates go through a `tokio::sync::watch` channel so that
//! interested parties can observe login/refresh/logout without polling;
//! readers only ever see a complete [`SessionState`] (last write wins).
//!
//! Disk persistence lives in [`SessionFile`]. The store itself never
//! touches the filesystem; the CLI decides when to load and save.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use vidra_types::{TokenResponse, User};

/// Session file name under the vidra home directory.
const SESSION_FILE: &str = "session.json";

fn now_millis_u64() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| u64::try_from(d.as_millis()).ok())
        .unwrap_or(u64::MAX)
}

/// A live authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Current bearer token.
    pub token: String,
    /// Expiry timestamp in milliseconds since epoch, when known.
    pub expires_at_ms: Option<u64>,
    /// Authenticated user, once fetched. Cleared together with the token.
    pub auth_user: Option<User>,
}

/// Process-wide token store.
///
/// Cheap to clone; all clones share the same underlying channel. Writers
/// are the reauthentication interceptor and completed auth results, never
/// presentation code.
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Option<SessionState>>>,
}

impl SessionStore {
    /// Creates an empty (logged-out) store.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Creates a store seeded with a token (expiry unknown).
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set_token(token.into());
        store
    }

    /// Creates a store restored from a persisted session.
    pub fn restore(token: impl Into<String>, expires_at_ms: Option<u64>) -> Self {
        let store = Self::new();
        store.install(token.into(), expires_at_ms);
        store
    }

    /// Current bearer token, if logged in.
    pub fn token(&self) -> Option<String> {
        self.tx.borrow().as_ref().map(|s| s.token.clone())
    }

    /// Snapshot of the full session state.
    pub fn state(&self) -> Option<SessionState> {
        self.tx.borrow().clone()
    }

    /// Cached authenticated user, if fetched.
    pub fn auth_user(&self) -> Option<User> {
        self.tx.borrow().as_ref().and_then(|s| s.auth_user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Installs a new token with unknown expiry, keeping any cached auth
    /// user.
    pub fn set_token(&self, token: impl Into<String>) {
        self.install(token.into(), None);
    }

    /// Installs the token from a login/refresh response, deriving its
    /// expiry from `expires_in`.
    pub fn token_received(&self, response: &TokenResponse) {
        let expires_at_ms = now_millis_u64().saturating_add(response.expires_in * 1000);
        self.install(response.access_token.clone(), Some(expires_at_ms));
    }

    fn install(&self, token: String, expires_at_ms: Option<u64>) {
        self.tx.send_modify(|state| match state {
            Some(existing) => {
                existing.token = token;
                existing.expires_at_ms = expires_at_ms;
            }
            None => {
                *state = Some(SessionState {
                    token,
                    expires_at_ms,
                    auth_user: None,
                });
            }
        });
    }

    /// Records the authenticated user alongside the token.
    ///
    /// No-op when logged out; the user belongs to a session.
    pub fn set_auth_user(&self, user: User) {
        self.tx.send_modify(|state| {
            if let Some(existing) = state {
                existing.auth_user = Some(user);
            }
        });
    }

    /// Erases the session: token and cached auth user.
    ///
    /// Called on logout and on failed refresh.
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    /// Subscribes to session changes (login, refresh, logout).
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionState>> {
        self.tx.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Persisted session, stored as `<home>/session.json` with 0600 perms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFile {
    /// The bearer token as last received.
    pub access_token: String,
    /// Expiry timestamp in milliseconds since epoch, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at_ms: Option<u64>,
}

impl SessionFile {
    pub fn path_in(home: &Path) -> PathBuf {
        home.join(SESSION_FILE)
    }

    /// Loads the persisted session. `Ok(None)` if none was saved.
    pub fn load(home: &Path) -> Result<Option<Self>> {
        let path = Self::path_in(home);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session from {}", path.display()))?;
        let session = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {}", path.display()))?;
        Ok(Some(session))
    }

    /// Saves the session with restricted permissions (0600).
    pub fn save(&self, home: &Path) -> Result<()> {
        let path = Self::path_in(home);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize session")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&path)
                .with_context(|| format!("Failed to open {} for writing", path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&path, contents)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        Ok(())
    }

    /// Deletes the persisted session, if present.
    pub fn remove(home: &Path) -> Result<()> {
        let path = Self::path_in(home);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::tempdir;

    use super::*;

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Test: a fresh store is logged out.
    #[test]
    fn test_new_store_is_empty() {
        let store = SessionStore::new();
        assert!(!store.is_authenticated());
        assert_eq!(store.token(), None);
    }

    /// Test: set_token then clear round-trips to logged out.
    #[test]
    fn test_set_and_clear_token() {
        let store = SessionStore::new();
        store.set_token("tok-1");
        assert_eq!(store.token().as_deref(), Some("tok-1"));

        store.clear();
        assert_eq!(store.token(), None);
        assert_eq!(store.auth_user(), None);
    }

    /// Test: refresh replaces the token but keeps the cached auth user.
    #[test]
    fn test_refresh_keeps_auth_user() {
        let store = SessionStore::new();
        store.set_token("tok-1");
        store.set_auth_user(user("u1"));

        store.set_token("tok-2");
        assert_eq!(store.token().as_deref(), Some("tok-2"));
        assert_eq!(store.auth_user().unwrap().id, "u1");
    }

    /// Test: a login/refresh response carries its expiry into the state.
    #[test]
    fn test_token_received_derives_expiry() {
        let store = SessionStore::new();
        store.token_received(&TokenResponse {
            access_token: "tok-1".to_string(),
            expires_in: 900,
            token_type: "Bearer".to_string(),
        });

        let state = store.state().unwrap();
        assert_eq!(state.token, "tok-1");
        assert!(state.expires_at_ms.is_some());
    }

    /// Test: setting an auth user while logged out is a no-op.
    #[test]
    fn test_auth_user_requires_session() {
        let store = SessionStore::new();
        store.set_auth_user(user("u1"));
        assert_eq!(store.auth_user(), None);
    }

    /// Test: clones observe writes made through other clones.
    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::new();
        let clone = store.clone();
        clone.set_token("tok-1");
        assert_eq!(store.token().as_deref(), Some("tok-1"));
    }

    /// Test: subscribers see the logout transition.
    #[tokio::test]
    async fn test_subscribe_observes_clear() {
        let store = SessionStore::new();
        store.set_token("tok-1");

        let mut rx = store.subscribe();
        store.clear();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }

    /// Test: session file save/load/remove round-trip with 0600 perms.
    #[test]
    fn test_session_file_roundtrip() {
        let temp = tempdir().unwrap();
        let session = SessionFile {
            access_token: "tok-abc".to_string(),
            expires_at_ms: Some(1_234_567),
        };
        session.save(temp.path()).unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let meta = fs::metadata(SessionFile::path_in(temp.path())).unwrap();
            assert_eq!(meta.permissions().mode() & 0o777, 0o600);
        }

        let loaded = SessionFile::load(temp.path()).unwrap().unwrap();
        assert_eq!(loaded.access_token, "tok-abc");

        SessionFile::remove(temp.path()).unwrap();
        assert!(SessionFile::load(temp.path()).unwrap().is_none());
    }
}
