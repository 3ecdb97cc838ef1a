//! Session-key grants and the owner calls that manage them.

use super::U48;
use alloy::{
    primitives::{Address, Bytes},
    sol,
    sol_types::SolCall,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

sol! {
    /// Owner-side session management on the session-key module. The signing
    /// core only ever reads grants; these calls are how owners create and
    /// mutate them.
    interface ISessionKeyModule {
        /// Authorizes a session key for the given destinations and window.
        function addSessionKey(address sessionKey, uint48 validAfter, uint48 validUntil, address[] calldata destinations) external;
        /// Adds a destination to an existing session key's whitelist.
        function addWhitelistDestination(address sessionKey, address destination) external;
        /// Removes a destination from a session key's whitelist.
        function removeWhitelistDestination(address sessionKey, address destination) external;
        /// Revokes a session key entirely.
        function revokeSessionKey(address sessionKey) external;
    }
}

/// A delegated, scope-limited signer grant.
///
/// Created by an owner transaction and mutated only by owner transactions;
/// the signing core treats a grant as an immutable snapshot for the duration
/// of one request. Bounds of zero mean "no bound".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
    /// The delegated session key address.
    pub session_key: Address,
    /// Start of the validity window in unix seconds (0 = no bound).
    #[serde(default)]
    pub valid_after: u64,
    /// End of the validity window in unix seconds (0 = no bound).
    #[serde(default)]
    pub valid_until: u64,
    /// Destinations the session key may touch.
    pub whitelisted_destinations: BTreeSet<Address>,
    /// Whether the grant was revoked.
    #[serde(default)]
    pub revoked: bool,
}

impl SessionGrant {
    /// A fresh unrevoked grant with an unbounded window.
    pub fn new(session_key: Address, destinations: impl IntoIterator<Item = Address>) -> Self {
        Self {
            session_key,
            valid_after: 0,
            valid_until: 0,
            whitelisted_destinations: destinations.into_iter().collect(),
            revoked: false,
        }
    }

    /// Bounds the grant's validity window.
    pub fn with_window(mut self, valid_after: u64, valid_until: u64) -> Self {
        self.valid_after = valid_after;
        self.valid_until = valid_until;
        self
    }

    /// Whether the destination is whitelisted.
    pub fn is_whitelisted(&self, destination: &Address) -> bool {
        self.whitelisted_destinations.contains(destination)
    }

    /// Calldata for the owner transaction creating this grant.
    pub fn add_session_key_call(&self) -> Bytes {
        ISessionKeyModule::addSessionKeyCall {
            sessionKey: self.session_key,
            validAfter: U48::from(self.valid_after),
            validUntil: U48::from(self.valid_until),
            destinations: self.whitelisted_destinations.iter().copied().collect(),
        }
        .abi_encode()
        .into()
    }

    /// Calldata whitelisting an additional destination.
    pub fn add_destination_call(&self, destination: Address) -> Bytes {
        ISessionKeyModule::addWhitelistDestinationCall {
            sessionKey: self.session_key,
            destination,
        }
        .abi_encode()
        .into()
    }

    /// Calldata removing a destination from the whitelist.
    pub fn remove_destination_call(&self, destination: Address) -> Bytes {
        ISessionKeyModule::removeWhitelistDestinationCall {
            sessionKey: self.session_key,
            destination,
        }
        .abi_encode()
        .into()
    }

    /// Calldata revoking the session key.
    pub fn revoke_call(&self) -> Bytes {
        ISessionKeyModule::revokeSessionKeyCall { sessionKey: self.session_key }
            .abi_encode()
            .into()
    }
}

/// Read access to session grants, typically backed by a network fetch or an
/// on-chain read in the host application.
#[async_trait::async_trait]
pub trait SessionReader: std::fmt::Debug + Send + Sync {
    /// Looks up the grant for a session key, if one exists.
    async fn get_session(&self, session_key: Address) -> eyre::Result<Option<SessionGrant>>;
}
