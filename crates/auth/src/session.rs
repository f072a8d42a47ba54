//! Session layer: opaque token minting and resolution.
//!
//! The platform authenticates through an external identity front; this layer
//! only deals in opaque session tokens and their mapping back to accounts.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coalition_core::AccountId;

/// An opaque session token, carried in a cookie by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn from_string(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session minting/resolution contract.
pub trait SessionService: Send + Sync {
    /// Mint a fresh token bound to `account_id`.
    fn mint(&self, account_id: AccountId) -> SessionToken;

    /// Resolve a token back to its account, if the session is live.
    fn resolve(&self, token: &SessionToken) -> Option<AccountId>;

    /// Invalidate a token. Unknown tokens are ignored.
    fn revoke(&self, token: &SessionToken);
}

/// In-memory session table for tests/dev.
#[derive(Debug, Default)]
pub struct InMemorySessions {
    sessions: RwLock<HashMap<String, AccountId>>,
}

impl InMemorySessions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionService for InMemorySessions {
    fn mint(&self, account_id: AccountId) -> SessionToken {
        let token = SessionToken(Uuid::now_v7().to_string());
        self.sessions
            .write()
            .unwrap()
            .insert(token.0.clone(), account_id);
        token
    }

    fn resolve(&self, token: &SessionToken) -> Option<AccountId> {
        self.sessions.read().unwrap().get(&token.0).copied()
    }

    fn revoke(&self, token: &SessionToken) {
        self.sessions.write().unwrap().remove(&token.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_resolve_revoke_round_trip() {
        let sessions = InMemorySessions::new();
        let account = AccountId::new();

        let token = sessions.mint(account);
        assert_eq!(sessions.resolve(&token), Some(account));

        sessions.revoke(&token);
        assert_eq!(sessions.resolve(&token), None);
    }
}
