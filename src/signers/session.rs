//! Session-key signing: a delegated ECDSA key gated by session policy.

use super::{EcdsaSigner, OperationSigner};
use crate::{
    error::{AuthorizationError, SignerError},
    policy::SessionPolicyGuard,
    types::{SessionGrant, SignatureContribution},
};
use alloy::primitives::{Address, B256};

/// A session-key signer.
///
/// Deliberately not an [`OperationSigner`]: the only signing entry point is
/// [`Self::sign_user_op`], which runs the policy guard before touching the
/// key, so no call path can produce an unchecked session signature.
#[derive(Clone, Debug)]
pub struct SessionKeySigner {
    inner: EcdsaSigner,
}

impl SessionKeySigner {
    /// Loads a signer from a raw 32-byte session private key.
    pub fn from_key(key: &B256) -> Result<Self, SignerError> {
        Ok(Self { inner: EcdsaSigner::from_key(key)? })
    }

    /// The session key address grants are keyed by.
    pub fn address(&self) -> Address {
        self.inner.address()
    }

    /// Checks the grant against the operation's calls, then signs the
    /// payload hash.
    pub async fn sign_user_op(
        &self,
        call_data: &[u8],
        grant: &SessionGrant,
        now: u64,
        payload_hash: B256,
    ) -> Result<SignatureContribution, AuthorizationError> {
        SessionPolicyGuard::check_at(call_data, grant, now)?;
        Ok(self.inner.sign_payload_hash(payload_hash).await?)
    }

    /// A deterministic placeholder contribution for gas estimation.
    pub fn stub_signature(&self) -> SignatureContribution {
        self.inner.stub_signature()
    }
}
