/// Session state: bearer token storage and unverified claim decoding.
///
/// The token store is a narrow seam (get/save/clear) so the HTTP client can
/// be exercised against a fake in tests, independent of where the real
/// credential lives on disk.
use base64::Engine;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

pub trait TokenStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn save(&self, token: &str);
    fn clear(&self);
}

/// Process-local token storage, for tests and embedding.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.token.lock().ok().and_then(|t| t.clone())
    }

    fn save(&self, token: &str) {
        if let Ok(mut slot) = self.token.lock() {
            *slot = Some(token.to_string());
        }
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.token.lock() {
            *slot = None;
        }
    }
}

/// Token persisted under the platform config dir, one file, plain text.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Default location: ~/.config/pipeboard/token (or platform equivalent).
    pub fn new() -> Self {
        let path = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pipeboard")
            .join("token");
        Self { path }
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Default for FileTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        let token = fs::read_to_string(&self.path).ok()?;
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    fn save(&self, token: &str) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("[session] Failed to create {}: {}", parent.display(), e);
                return;
            }
        }
        if let Err(e) = fs::write(&self.path, token) {
            log::warn!("[session] Failed to save token to {}: {}", self.path.display(), e);
        }
    }

    fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("[session] Failed to clear token {}: {}", self.path.display(), e),
        }
    }
}

/// Claims the presentation layer cares about. Decoded without signature
/// verification; the remote store is the authority, this only drives UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionClaims {
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Decode the payload segment of a JWT. Any malformed token yields the
/// anonymous default rather than an error.
pub fn decode_claims(token: &str) -> SessionClaims {
    let Some(payload) = token.split('.').nth(1) else {
        return SessionClaims::default();
    };
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| base64::engine::general_purpose::STANDARD.decode(payload));
    bytes
        .ok()
        .and_then(|b| serde_json::from_slice(&b).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_token(payload: &str) -> String {
        let body = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(payload);
        format!("header.{}.signature", body)
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get(), None);
        store.save("abc");
        assert_eq!(store.get(), Some("abc".to_string()));
        store.clear();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::at(dir.path().join("nested").join("token"));
        assert_eq!(store.get(), None);
        store.save("abc");
        assert_eq!(store.get(), Some("abc".to_string()));
        store.clear();
        assert_eq!(store.get(), None);
        // Clearing twice is fine.
        store.clear();
    }

    #[test]
    fn test_decode_claims() {
        let token = make_token(r#"{"is_admin": true, "user_id": 42}"#);
        assert_eq!(
            decode_claims(&token),
            SessionClaims { is_admin: true, user_id: Some(42) }
        );
    }

    #[test]
    fn test_decode_claims_malformed_is_anonymous() {
        assert_eq!(decode_claims("not-a-jwt"), SessionClaims::default());
        assert_eq!(decode_claims("a.%%%.c"), SessionClaims::default());
        let token = make_token("not json");
        assert_eq!(decode_claims(&token), SessionClaims::default());
    }
}
