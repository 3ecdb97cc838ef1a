use alloy::primitives::Address;
use thiserror::Error;

/// Errors raised by the signature byte codecs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    /// A static contribution is not exactly 65 bytes.
    #[error("static signature must be 65 bytes, got {0}")]
    InvalidStaticSignatureLength(usize),
    /// Two contributions share the same signer address.
    #[error("duplicate contribution for signer {0}")]
    DuplicateSigner(Address),
    /// No contributions were supplied to the assembler.
    #[error("no signature contributions to assemble")]
    NoContributions,
    /// A dynamic signature header points outside the signature blob.
    #[error("dynamic signature offset {offset} is out of bounds for {len} bytes")]
    InvalidDynamicOffset {
        /// The offset read from the static part.
        offset: usize,
        /// Total length of the encoded signature.
        len: usize,
    },
    /// A static slot's final byte is not a known recovery id marker.
    #[error("unknown recovery byte {0:#04x} in static signature slot")]
    UnknownRecoveryByte(u8),
    /// The encoded signature blob ends mid-structure.
    #[error("truncated multi-signature encoding")]
    TruncatedSignature,
    /// A packed multisend batch ends mid-call.
    #[error("truncated multisend batch at byte {0}")]
    TruncatedMultiSend(usize),
}
