//! The signed-in user and their bearer token.
//!
//! A [`Session`] is an explicitly owned value: the CLI loads it at start,
//! passes it by `&mut` to whatever needs it, and every change is written
//! through to the store immediately.

use std::sync::Arc;

use unishop_core::AccessToken;

use crate::models::UserProfile;
use crate::models::session::keys;
use crate::store::{self, KeyValueStore, StoreError};

/// Literal some clients store when they serialize a missing user.
const UNDEFINED: &str = "undefined";

/// User and token persisted under [`keys::USER`] and [`keys::TOKEN`].
///
/// Authenticated iff both are present.
pub struct Session {
    store: Arc<dyn KeyValueStore>,
    user: Option<UserProfile>,
    token: Option<AccessToken>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Restore the session from `store`.
    ///
    /// A stored user that is corrupt or the literal `undefined` is removed
    /// together with the token, and the session starts signed out.
    #[must_use]
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let token = read_token(store.as_ref());
        let raw_user = match store.get(keys::USER) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored user, starting signed out");
                None
            }
        };

        let user = match raw_user {
            None => None,
            Some(raw) => match parse_user(&raw) {
                Some(user) => Some(user),
                None => {
                    tracing::warn!("Discarding corrupt stored user and token");
                    for key in [keys::USER, keys::TOKEN] {
                        if let Err(e) = store.remove(key) {
                            tracing::warn!(key, error = %e, "Failed to remove corrupt session key");
                        }
                    }
                    return Self {
                        store,
                        user: None,
                        token: None,
                    };
                }
            },
        };

        Self { store, user, token }
    }

    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    #[must_use]
    pub const fn token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    /// User and token together, only when authenticated.
    #[must_use]
    pub fn credentials(&self) -> Option<(&UserProfile, &AccessToken)> {
        self.user.as_ref().zip(self.token.as_ref())
    }

    /// Sign in: remember `user` and `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if either value cannot be persisted. The in-memory
    /// session is updated regardless.
    pub fn establish(&mut self, user: UserProfile, token: AccessToken) -> Result<(), StoreError> {
        tracing::info!(user_id = %user.id, "Session established");
        self.user = Some(user);
        self.token = Some(token);
        self.persist_user()?;
        store::write_json(self.store.as_ref(), keys::TOKEN, &self.token)
    }

    /// Replace the stored profile, keeping the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be persisted.
    pub fn update_user(&mut self, user: UserProfile) -> Result<(), StoreError> {
        self.user = Some(user);
        self.persist_user()
    }

    /// Sign out: forget user and token.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored keys cannot be removed. The in-memory
    /// session is cleared regardless.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.user = None;
        self.token = None;
        self.store.remove(keys::USER)?;
        self.store.remove(keys::TOKEN)
    }

    fn persist_user(&self) -> Result<(), StoreError> {
        store::write_json(self.store.as_ref(), keys::USER, &self.user)
    }
}

fn parse_user(raw: &str) -> Option<UserProfile> {
    let raw = raw.trim();
    if raw == UNDEFINED {
        return None;
    }
    serde_json::from_str(raw).ok()
}

/// Tokens are stored JSON-encoded, but a bare string is accepted too.
fn read_token(store: &dyn KeyValueStore) -> Option<AccessToken> {
    let raw = match store.get(keys::TOKEN) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read stored token");
            return None;
        }
    };
    let token = serde_json::from_str::<Option<AccessToken>>(&raw)
        .unwrap_or_else(|_| Some(AccessToken::new(raw.trim().to_string())))?;
    (!token.is_empty() && token.expose() != UNDEFINED).then_some(token)
}
