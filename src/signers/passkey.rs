//! WebAuthn passkey signing (secp256r1).

use super::OperationSigner;
use crate::{
    error::SignerError,
    types::{SignatureContribution, WebAuthnSignature},
};
use alloy::primitives::{b256, hex, Address, Bytes, B256, U256};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use p256::{
    ecdsa::{signature::hazmat::PrehashSigner, Signature as P256Signature, SigningKey},
    elliptic_curve::sec1::ToEncodedPoint,
};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::{fmt, sync::Arc};

/// The JSON key whose byte offset the on-chain verifier needs.
const CHALLENGE_FIELD: &str = "\"challenge\":";

/// An assertion produced by a WebAuthn ceremony.
#[derive(Clone, Debug)]
pub struct WebAuthnAssertion {
    /// Raw authenticator data (rpIdHash, flags, sign counter, extensions).
    pub authenticator_data: Bytes,
    /// The UTF-8 client data JSON, untouched. Re-serializing it would break
    /// the signature.
    pub client_data_json: String,
    /// The DER-encoded secp256r1 signature.
    pub signature_der: Bytes,
}

/// Capability producing WebAuthn assertions.
///
/// In production this wraps the platform authenticator and may block
/// indefinitely on user interaction; cancellation is the caller's
/// responsibility.
#[async_trait::async_trait]
pub trait WebAuthnAssertionProvider: fmt::Debug + Send + Sync {
    /// Requests an assertion over the 32-byte challenge.
    async fn request_assertion(
        &self,
        credential_id: &Bytes,
        challenge: B256,
    ) -> Result<WebAuthnAssertion, SignerError>;
}

/// A passkey signer: requests assertions from a provider and packs them into
/// the ABI tuple the on-chain P-256 verifier consumes.
#[derive(Clone, Debug)]
pub struct PasskeySigner {
    credential_id: Bytes,
    signer_address: Address,
    provider: Arc<dyn WebAuthnAssertionProvider>,
}

impl PasskeySigner {
    /// A signer for the given credential, verified on-chain at
    /// `signer_address`.
    pub fn new(
        credential_id: Bytes,
        signer_address: Address,
        provider: Arc<dyn WebAuthnAssertionProvider>,
    ) -> Self {
        Self { credential_id, signer_address, provider }
    }

    /// Packs an assertion into the verifier tuple: DER to `(r, s)` with the
    /// high `s` normalized to the low half-order, plus the byte offset of
    /// the challenge field inside the client data.
    pub fn encode_assertion(assertion: &WebAuthnAssertion) -> Result<Bytes, SignerError> {
        let signature = P256Signature::from_der(&assertion.signature_der)
            .map_err(|_| SignerError::InvalidDerEncoding)?;
        let signature = signature.normalize_s().unwrap_or(signature);

        let challenge_offset = assertion
            .client_data_json
            .find(CHALLENGE_FIELD)
            .ok_or(SignerError::MissingChallengeField)?;

        let (r, s) = signature.split_bytes();
        Ok(WebAuthnSignature {
            authenticatorData: assertion.authenticator_data.clone(),
            clientDataJSON: assertion.client_data_json.clone().into_bytes().into(),
            challengeOffset: U256::from(challenge_offset),
            rs: [U256::from_be_slice(r.as_slice()), U256::from_be_slice(s.as_slice())],
        }
        .encode())
    }
}

#[async_trait::async_trait]
impl OperationSigner for PasskeySigner {
    fn address(&self) -> Address {
        self.signer_address
    }

    async fn sign_payload_hash(
        &self,
        payload_hash: B256,
    ) -> Result<SignatureContribution, SignerError> {
        let assertion =
            self.provider.request_assertion(&self.credential_id, payload_hash).await?;
        let data = Self::encode_assertion(&assertion)?;
        Ok(SignatureContribution::dynamic(self.signer_address, data))
    }

    fn stub_signature(&self) -> SignatureContribution {
        SignatureContribution::dynamic(self.signer_address, stub_assertion_bytes())
    }
}

/// Largest valid-looking scalars below the curve order; a stub this shape
/// exercises the verifier's worst-case gas without ever verifying.
const STUB_R: B256 = b256!("ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632550");
const STUB_S: B256 = b256!("7fffffff800000007fffffffffffffffde737d56d38bcf4279dce5617e3192a8");

/// rpIdHash placeholder, user-present flag set, zero sign counter.
const STUB_AUTHENTICATOR_DATA: [u8; 37] =
    hex!("4242424242424242424242424242424242424242424242424242424242424242" "01" "00000000");

fn stub_assertion_bytes() -> Bytes {
    let client_data_json = format!(
        r#"{{"type":"webauthn.get","challenge":"{}","origin":"https://safe.global","crossOrigin":false}}"#,
        "A".repeat(43)
    );
    WebAuthnSignature {
        authenticatorData: STUB_AUTHENTICATOR_DATA.to_vec().into(),
        challengeOffset: U256::from(
            client_data_json.find(CHALLENGE_FIELD).unwrap_or_default(),
        ),
        clientDataJSON: client_data_json.into_bytes().into(),
        rs: [U256::from_be_bytes(STUB_R.0), U256::from_be_bytes(STUB_S.0)],
    }
    .encode()
}

/// [`WebAuthnAssertionProvider`] backed by a local P-256 key.
///
/// Produces real, verifiable assertions without an authenticator; used in
/// tests and wherever a software passkey is acceptable.
#[derive(Clone)]
pub struct SoftwareAssertionProvider(Arc<SigningKey>);

impl fmt::Debug for SoftwareAssertionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftwareAssertionProvider").finish_non_exhaustive()
    }
}

impl SoftwareAssertionProvider {
    /// Loads a provider from a raw 32-byte P-256 private key.
    pub fn load(key: &B256) -> Result<Self, SignerError> {
        SigningKey::from_slice(key.as_slice())
            .map(|key| Self(Arc::new(key)))
            .map_err(|err| SignerError::InvalidKeyMaterial(err.to_string()))
    }

    /// The uncompressed public key coordinates `(x, y)`.
    pub fn public_key(&self) -> (B256, B256) {
        let point = self.0.verifying_key().to_encoded_point(false);
        let bytes = point.as_bytes();
        (B256::from_slice(&bytes[1..33]), B256::from_slice(&bytes[33..65]))
    }
}

#[async_trait::async_trait]
impl WebAuthnAssertionProvider for SoftwareAssertionProvider {
    async fn request_assertion(
        &self,
        _credential_id: &Bytes,
        challenge: B256,
    ) -> Result<WebAuthnAssertion, SignerError> {
        let authenticator_data = STUB_AUTHENTICATOR_DATA.to_vec();
        let client_data = json!({
            "type": "webauthn.get",
            "challenge": URL_SAFE_NO_PAD.encode(challenge),
            "origin": "https://safe.global",
            "crossOrigin": false,
        });
        let client_data_json = serde_json::to_string(&client_data)
            .map_err(|err| SignerError::Unavailable(err.to_string()))?;

        // WebAuthn signs sha256(authenticatorData || sha256(clientDataJSON)).
        let mut hasher = Sha256::new();
        hasher.update(&authenticator_data);
        hasher.update(Sha256::digest(client_data_json.as_bytes()));
        let digest = hasher.finalize();

        let signature: P256Signature = self
            .0
            .sign_prehash(&digest)
            .map_err(|err| SignerError::Unavailable(err.to_string()))?;

        Ok(WebAuthnAssertion {
            authenticator_data: authenticator_data.into(),
            client_data_json,
            signature_der: Bytes::copy_from_slice(signature.to_der().as_bytes()),
        })
    }
}
