//! In-memory bearer-token storage shared by every request.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

/// Token pair returned by `POST /auth/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access-token lifetime in seconds.
    pub expires_in: i64,
}

/// Cloneable handle to the current token pair.
///
/// An empty store is valid: requests then go out without an `Authorization`
/// header instead of failing locally.
#[derive(Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<AuthTokens>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current access token, if any.
    pub fn access_token(&self) -> Option<String> {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|t| t.access_token.clone()))
    }

    /// Current refresh token, if any.
    pub fn refresh_token(&self) -> Option<String> {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|t| t.refresh_token.clone()))
    }

    /// Replace the stored pair.
    pub fn set(&self, tokens: AuthTokens) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(tokens);
        }
    }

    /// Drop the stored pair (logout).
    pub fn clear(&self) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = None;
        }
    }
}
