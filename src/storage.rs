//! Keystore and session-grant storage capabilities.
//!
//! The pipeline never reaches into ambient storage; the host injects these
//! capabilities and decides what actually backs them (secure enclave,
//! encrypted disk, a network API).

use crate::{
    signers::SignerIdentity,
    types::{SessionGrant, SessionReader},
};
use alloy::primitives::Address;
use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

/// Keystore capability mapping accounts to their registered signer.
pub trait SignerStore: std::fmt::Debug + Send + Sync {
    /// The registered identity for an account, if any.
    fn get(&self, account: Address) -> Option<SignerIdentity>;

    /// Registers (or replaces) the identity for an account.
    fn put(&self, account: Address, identity: SignerIdentity);
}

/// [`SignerStore`] held in process memory.
#[derive(Debug, Default)]
pub struct InMemorySignerStore(RwLock<HashMap<Address, SignerIdentity>>);

impl SignerStore for InMemorySignerStore {
    fn get(&self, account: Address) -> Option<SignerIdentity> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).get(&account).cloned()
    }

    fn put(&self, account: Address, identity: SignerIdentity) {
        self.0.write().unwrap_or_else(PoisonError::into_inner).insert(account, identity);
    }
}

/// [`SessionReader`] held in process memory, keyed by session key address.
#[derive(Debug, Default)]
pub struct InMemorySessions(RwLock<HashMap<Address, SessionGrant>>);

impl InMemorySessions {
    /// Stores (or replaces) a grant under its session key.
    pub fn insert(&self, grant: SessionGrant) {
        self.0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(grant.session_key, grant);
    }

    /// Marks the grant for a session key as revoked, if one exists.
    pub fn revoke(&self, session_key: Address) {
        if let Some(grant) =
            self.0.write().unwrap_or_else(PoisonError::into_inner).get_mut(&session_key)
        {
            grant.revoked = true;
        }
    }
}

#[async_trait::async_trait]
impl SessionReader for InMemorySessions {
    async fn get_session(&self, session_key: Address) -> eyre::Result<Option<SessionGrant>> {
        Ok(self.0.read().unwrap_or_else(PoisonError::into_inner).get(&session_key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, b256};

    #[test]
    fn identity_registration_replaces() {
        let store = InMemorySignerStore::default();
        let account = address!("1111111111111111111111111111111111111111");
        assert!(store.get(account).is_none());

        let first = SignerIdentity::Ecdsa {
            key: b256!("0101010101010101010101010101010101010101010101010101010101010101"),
        };
        let second = SignerIdentity::SessionKey {
            key: b256!("0202020202020202020202020202020202020202020202020202020202020202"),
        };
        store.put(account, first);
        store.put(account, second.clone());
        assert_eq!(store.get(account), Some(second));
    }

    #[tokio::test]
    async fn revocation_is_visible_to_readers() {
        let sessions = InMemorySessions::default();
        let key = address!("2222222222222222222222222222222222222222");
        sessions.insert(SessionGrant::new(key, []));

        sessions.revoke(key);
        let grant = sessions.get_session(key).await.unwrap().unwrap();
        assert!(grant.revoked);
    }
}
