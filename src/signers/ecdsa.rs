//! secp256k1 signing over a local private key.

use super::OperationSigner;
use crate::{error::SignerError, types::SignatureContribution};
use alloy::{
    primitives::{eip191_hash_message, Address, Bytes, B256},
    signers::{local::PrivateKeySigner, Signer},
};
use std::{fmt, sync::Arc};

/// Normalizes a typed-data recovery id to `{27, 28}`.
///
/// Backends emit either the raw parity bit or an Electrum-style id; anything
/// else means the signature bytes are corrupt.
pub(crate) fn normalize_v_typed_data(v: u8) -> Result<u8, SignerError> {
    match v {
        0 | 1 => Ok(v + 27),
        27 | 28 => Ok(v),
        other => Err(SignerError::InvalidRecoveryId(other)),
    }
}

/// Normalizes an `eth_sign` recovery id to `{31, 32}`.
///
/// The Safe distinguishes EIP-191 personal-message signatures from
/// typed-data ones by adding 4 to the recovery id. The offset applies only
/// on this path.
pub(crate) fn normalize_v_personal(v: u8) -> Result<u8, SignerError> {
    Ok(normalize_v_typed_data(v)? + 4)
}

/// An owner signer over a local secp256k1 key.
#[derive(Clone)]
pub struct EcdsaSigner(Arc<PrivateKeySigner>);

impl fmt::Debug for EcdsaSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EcdsaSigner").field(&self.0.address()).finish()
    }
}

impl EcdsaSigner {
    /// Loads a signer from a raw 32-byte private key.
    pub fn from_key(key: &B256) -> Result<Self, SignerError> {
        PrivateKeySigner::from_bytes(key)
            .map(|signer| Self(Arc::new(signer)))
            .map_err(|err| SignerError::InvalidKeyMaterial(err.to_string()))
    }

    /// Signs a prehashed digest and normalizes the recovery id.
    async fn sign_hash_with(
        &self,
        hash: B256,
        normalize: fn(u8) -> Result<u8, SignerError>,
    ) -> Result<Bytes, SignerError> {
        let signature = self
            .0
            .sign_hash(&hash)
            .await
            .map_err(|err| SignerError::Unavailable(err.to_string()))?;
        let mut raw = signature.as_bytes();
        raw[64] = normalize(raw[64])?;
        Ok(raw.to_vec().into())
    }

    /// Signs an arbitrary message with the EIP-191 personal prefix, marking
    /// the result as an `eth_sign` signature (`v ∈ {31, 32}`).
    pub async fn sign_personal(&self, message: &[u8]) -> Result<Bytes, SignerError> {
        self.sign_hash_with(eip191_hash_message(message), normalize_v_personal).await
    }
}

#[async_trait::async_trait]
impl OperationSigner for EcdsaSigner {
    fn address(&self) -> Address {
        self.0.address()
    }

    async fn sign_payload_hash(
        &self,
        payload_hash: B256,
    ) -> Result<SignatureContribution, SignerError> {
        let data = self.sign_hash_with(payload_hash, normalize_v_typed_data).await?;
        Ok(SignatureContribution::ecdsa(self.address(), data))
    }

    fn stub_signature(&self) -> SignatureContribution {
        // Approved-hash shape: r carries the owner address, v = 1. The
        // verifier-side length matches a real signature; validation would
        // fail, which is exactly what an estimation stub wants.
        let mut data = vec![0u8; 65];
        data[12..32].copy_from_slice(self.address().as_slice());
        data[64] = 0x01;
        SignatureContribution::ecdsa(self.address(), data.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{b256, PrimitiveSignature};

    const KEY: B256 = b256!("4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318");

    #[test]
    fn typed_data_recovery_ids_land_on_27_28() {
        assert_eq!(normalize_v_typed_data(0x00).unwrap(), 0x1b);
        assert_eq!(normalize_v_typed_data(0x01).unwrap(), 0x1c);
        assert_eq!(normalize_v_typed_data(0x1b).unwrap(), 0x1b);
        assert_eq!(normalize_v_typed_data(0x1c).unwrap(), 0x1c);
        assert!(matches!(
            normalize_v_typed_data(0x02),
            Err(SignerError::InvalidRecoveryId(0x02))
        ));
    }

    #[test]
    fn personal_recovery_ids_land_on_31_32() {
        assert_eq!(normalize_v_personal(0x00).unwrap(), 0x1f);
        assert_eq!(normalize_v_personal(0x01).unwrap(), 0x20);
        assert_eq!(normalize_v_personal(0x1b).unwrap(), 0x1f);
        assert!(matches!(normalize_v_personal(0x1d), Err(SignerError::InvalidRecoveryId(0x1d))));
    }

    #[tokio::test]
    async fn payload_signature_recovers_the_signer() {
        let signer = EcdsaSigner::from_key(&KEY).unwrap();
        let hash = b256!("1111111111111111111111111111111111111111111111111111111111111111");

        let contribution = signer.sign_payload_hash(hash).await.unwrap();
        assert!(!contribution.dynamic);
        assert_eq!(contribution.data.len(), 65);
        assert!(matches!(contribution.data[64], 0x1b | 0x1c));

        let recovered = PrimitiveSignature::try_from(contribution.data.as_ref())
            .unwrap()
            .recover_address_from_prehash(&hash)
            .unwrap();
        assert_eq!(recovered, signer.address());
    }

    #[tokio::test]
    async fn signing_is_deterministic() {
        let signer = EcdsaSigner::from_key(&KEY).unwrap();
        let hash = b256!("2222222222222222222222222222222222222222222222222222222222222222");
        let first = signer.sign_payload_hash(hash).await.unwrap();
        let second = signer.sign_payload_hash(hash).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn personal_signature_is_marked_eth_sign() {
        let signer = EcdsaSigner::from_key(&KEY).unwrap();
        let signature = signer.sign_personal(b"hello world").await.unwrap();
        assert_eq!(signature.len(), 65);
        assert!(matches!(signature[64], 0x1f | 0x20));
    }

    #[test]
    fn stub_embeds_the_owner_address() {
        let signer = EcdsaSigner::from_key(&KEY).unwrap();
        let stub = signer.stub_signature();
        assert_eq!(stub.data.len(), 65);
        assert_eq!(&stub.data[12..32], signer.address().as_slice());
        assert_eq!(stub.data[64], 0x01);
        assert_eq!(stub, signer.stub_signature());
    }

    #[test]
    fn garbage_key_material_is_rejected() {
        assert!(matches!(
            EcdsaSigner::from_key(&B256::ZERO),
            Err(SignerError::InvalidKeyMaterial(_))
        ));
    }
}
