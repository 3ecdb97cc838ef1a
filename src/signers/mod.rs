//! Operation signers.

mod ecdsa;
pub use ecdsa::EcdsaSigner;

mod passkey;
pub use passkey::{
    PasskeySigner, SoftwareAssertionProvider, WebAuthnAssertion, WebAuthnAssertionProvider,
};

mod session;
pub use session::SessionKeySigner;

use crate::{error::SignerError, types::SignatureContribution};
use alloy::primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

/// Trait for a payload-hash signer producing one signature contribution.
#[async_trait::async_trait]
pub trait OperationSigner: std::fmt::Debug + Send + Sync {
    /// The address the on-chain verifier attributes contributions to.
    fn address(&self) -> Address;

    /// Signs the EIP-712 payload hash.
    async fn sign_payload_hash(
        &self,
        payload_hash: B256,
    ) -> Result<SignatureContribution, SignerError>;

    /// A deterministic placeholder of the correct byte length, used for gas
    /// estimation and never submitted as final.
    fn stub_signature(&self) -> SignatureContribution;
}

/// The signer registered for an account.
///
/// A closed union: the tag decides which adapter handles the request, and
/// dispatch is exhaustive. Rotation replaces the identity, it never mutates
/// one in place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SignerIdentity {
    /// A secp256k1 private key.
    Ecdsa {
        /// The raw private key.
        key: B256,
    },
    /// A WebAuthn platform credential.
    Passkey {
        /// The credential id handed to the authenticator.
        credential_id: Bytes,
        /// The on-chain signer contract address for this credential.
        signer_address: Address,
        /// P-256 public key x coordinate.
        public_key_x: B256,
        /// P-256 public key y coordinate.
        public_key_y: B256,
    },
    /// A delegated session key (secp256k1), policy-gated.
    SessionKey {
        /// The raw session private key.
        key: B256,
    },
}

impl SignerIdentity {
    /// The identity's tag, for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Ecdsa { .. } => "ecdsa",
            Self::Passkey { .. } => "passkey",
            Self::SessionKey { .. } => "sessionKey",
        }
    }
}
