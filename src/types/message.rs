//! Safe message wrapping for off-chain signatures (EIP-1271 flows).

use alloy::{
    dyn_abi::TypedData,
    primitives::{eip191_hash_message, Bytes, B256},
    sol,
};

sol! {
    /// The EIP-712 wrapper the Safe verifies for arbitrary messages
    /// ("SafeMessage"). `message` is the 32-byte hash of the wrapped
    /// payload, not the payload itself.
    #[derive(Debug, PartialEq, Eq, serde::Serialize)]
    struct SafeMessage {
        /// Hash of the wrapped payload.
        bytes message;
    }
}

/// The payload being wrapped as a SafeMessage.
///
/// Raw bytes and already-typed data hash differently (EIP-191 vs EIP-712);
/// conflating the two is a classic source of unverifiable signatures, so the
/// caller states which one it has.
#[derive(Clone, Debug)]
pub enum MessagePayload {
    /// A raw string/bytes payload, hashed per EIP-191.
    Raw(Bytes),
    /// A nested EIP-712 typed-data structure, hashed per its own domain.
    Typed(Box<TypedData>),
}

impl MessagePayload {
    /// A raw payload from anything byte-like.
    pub fn raw(data: impl Into<Bytes>) -> Self {
        Self::Raw(data.into())
    }

    /// A nested typed-data payload.
    pub fn typed(data: TypedData) -> Self {
        Self::Typed(Box::new(data))
    }

    /// The 32-byte hash that becomes the `SafeMessage.message` field.
    pub fn message_hash(&self) -> Result<B256, alloy::dyn_abi::Error> {
        match self {
            Self::Raw(data) => Ok(eip191_hash_message(data)),
            Self::Typed(typed) => typed.eip712_signing_hash(),
        }
    }

    /// Wraps the payload as a [`SafeMessage`].
    pub fn as_safe_message(&self) -> Result<SafeMessage, alloy::dyn_abi::Error> {
        Ok(SafeMessage { message: self.message_hash()?.as_slice().to_vec().into() })
    }
}
