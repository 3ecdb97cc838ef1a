//! Byte layouts for the on-chain signature verifier.
//!
//! Two wire formats live here: the static+dynamic multi-signature container
//! and the `{validAfter, validUntil}` validity-window prefix. Both must be
//! reproduced byte-for-byte; the verifier re-derives offsets rather than
//! parsing anything.

use crate::error::EncodingError;
use alloy::primitives::{Address, Bytes, Uint, B256, U256};
use serde::{Deserialize, Serialize};

/// A 48 bit integer.
pub type U48 = Uint<48, 1>;

/// Length of a static `{r, s, v}` signature slot.
pub const STATIC_SIGNATURE_LENGTH: usize = 65;

/// Length of the packed `{validAfter, validUntil}` prefix.
pub const VALIDITY_WINDOW_LENGTH: usize = 12;

/// One signer's contribution to a packed signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureContribution {
    /// The address the on-chain verifier attributes this signature to.
    pub signer: Address,
    /// The raw signature bytes.
    pub data: Bytes,
    /// Whether the payload is appended out-of-line with a length prefix
    /// (WebAuthn and other contract-style signatures).
    pub dynamic: bool,
}

impl SignatureContribution {
    /// A static 65-byte `{r, s, v}` contribution.
    pub const fn ecdsa(signer: Address, data: Bytes) -> Self {
        Self { signer, data, dynamic: false }
    }

    /// A dynamic contribution whose payload is length-prefixed out-of-line.
    pub const fn dynamic(signer: Address, data: Bytes) -> Self {
        Self { signer, data, dynamic: true }
    }
}

/// A decoded entry of the multi-signature container.
///
/// Static slots carry no signer address on the wire (the verifier recovers
/// it from the digest), so decoding cannot restore it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedSignature {
    /// A 65-byte `{r, s, v}` slot.
    Static {
        /// The raw signature bytes.
        data: Bytes,
    },
    /// An out-of-line signature addressed by a `{signer, offset, 0x00}` slot.
    Dynamic {
        /// The signer address from the slot's first word.
        signer: Address,
        /// The out-of-line payload, without its length prefix.
        data: Bytes,
    },
}

/// Encodes signer contributions into the multi-signature container.
///
/// Contributions are sorted ascending by signer address first; the on-chain
/// verifier requires this order, not insertion order. Each contribution
/// occupies a 65-byte static slot. Dynamic contributions write a
/// `{signer:32}{offset:32}{0x00}` slot, with the offset computed against the
/// *final* static-part size (`N * 65 + dynamic bytes written so far`), and
/// append `{length:32}{payload}` to the dynamic tail.
///
/// An empty contribution list encodes to empty bytes.
pub fn encode_multi_signature(
    contributions: &[SignatureContribution],
) -> Result<Bytes, EncodingError> {
    let mut sorted: Vec<&SignatureContribution> = contributions.iter().collect();
    sorted.sort_by_key(|contribution| contribution.signer);

    let static_len = sorted.len() * STATIC_SIGNATURE_LENGTH;
    let mut static_part = Vec::with_capacity(static_len);
    let mut dynamic_part = Vec::new();

    for contribution in sorted {
        if contribution.dynamic {
            let offset = static_len + dynamic_part.len();
            static_part
                .extend_from_slice(B256::left_padding_from(contribution.signer.as_slice()).as_slice());
            static_part.extend_from_slice(&U256::from(offset).to_be_bytes::<32>());
            static_part.push(0x00);
            dynamic_part.extend_from_slice(&U256::from(contribution.data.len()).to_be_bytes::<32>());
            dynamic_part.extend_from_slice(&contribution.data);
        } else {
            if contribution.data.len() != STATIC_SIGNATURE_LENGTH {
                return Err(EncodingError::InvalidStaticSignatureLength(contribution.data.len()));
            }
            static_part.extend_from_slice(&contribution.data);
        }
    }

    static_part.extend_from_slice(&dynamic_part);
    Ok(static_part.into())
}

/// Decodes a multi-signature container back into its entries.
///
/// Only needed for verification and testing; the production path never
/// decodes its own output.
pub fn decode_multi_signature(encoded: &[u8]) -> Result<Vec<DecodedSignature>, EncodingError> {
    let len = encoded.len();
    let mut entries = Vec::new();
    // The static region ends at the lowest dynamic offset seen so far.
    let mut static_end = len;
    let mut cursor = 0;

    while cursor < static_end {
        let slot = encoded
            .get(cursor..cursor + STATIC_SIGNATURE_LENGTH)
            .ok_or(EncodingError::TruncatedSignature)?;

        match slot[64] {
            0x00 => {
                let signer = Address::from_slice(&slot[12..32]);
                // Offset and length words are untrusted; all arithmetic on
                // them is checked.
                let offset = usize::try_from(U256::from_be_slice(&slot[32..64]))
                    .map_err(|_| EncodingError::InvalidDynamicOffset { offset: usize::MAX, len })?;
                let data_start = offset
                    .checked_add(32)
                    .ok_or(EncodingError::InvalidDynamicOffset { offset, len })?;
                let length_word = encoded
                    .get(offset..data_start)
                    .ok_or(EncodingError::InvalidDynamicOffset { offset, len })?;
                let data_len = usize::try_from(U256::from_be_slice(length_word))
                    .map_err(|_| EncodingError::InvalidDynamicOffset { offset, len })?;
                let data = data_start
                    .checked_add(data_len)
                    .and_then(|data_end| encoded.get(data_start..data_end))
                    .ok_or(EncodingError::TruncatedSignature)?;

                static_end = static_end.min(offset);
                entries.push(DecodedSignature::Dynamic {
                    signer,
                    data: Bytes::copy_from_slice(data),
                });
            }
            // eth_signTypedData, approved-hash, and eth_sign markers.
            0x01 | 0x1b | 0x1c | 0x1f | 0x20 => {
                entries.push(DecodedSignature::Static { data: Bytes::copy_from_slice(slot) });
            }
            other => return Err(EncodingError::UnknownRecoveryByte(other)),
        }

        cursor += STATIC_SIGNATURE_LENGTH;
    }

    Ok(entries)
}

/// The `{validAfter, validUntil}` pair prefixed to 4337 signatures.
///
/// Both bounds are uint48 seconds; zero means "no bound", not the epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityWindow {
    /// The signature is invalid before this timestamp (0 = no bound).
    pub valid_after: U48,
    /// The signature is invalid after this timestamp (0 = no bound).
    pub valid_until: U48,
}

impl ValidityWindow {
    /// The unrestricted window, valid at any time.
    pub const ZERO: Self = Self { valid_after: U48::ZERO, valid_until: U48::ZERO };

    /// A window bounded on both sides, in unix seconds.
    pub fn new(valid_after: u64, valid_until: u64) -> Self {
        Self { valid_after: U48::from(valid_after), valid_until: U48::from(valid_until) }
    }

    /// The 12-byte big-endian `{validAfter:6}{validUntil:6}` prefix.
    pub fn prefix(&self) -> [u8; VALIDITY_WINDOW_LENGTH] {
        let mut prefix = [0u8; VALIDITY_WINDOW_LENGTH];
        prefix[..6].copy_from_slice(&self.valid_after.to_be_bytes::<6>());
        prefix[6..].copy_from_slice(&self.valid_until.to_be_bytes::<6>());
        prefix
    }

    /// Prepends the window to a packed signature.
    pub fn prepend_to(&self, signature: &[u8]) -> Bytes {
        let mut out = Vec::with_capacity(VALIDITY_WINDOW_LENGTH + signature.len());
        out.extend_from_slice(&self.prefix());
        out.extend_from_slice(signature);
        out.into()
    }
}
