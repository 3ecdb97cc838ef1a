//! WebAuthn P-256 signature tuple.

use alloy::{sol, sol_types::SolValue};

sol! {
    /// The ABI tuple the on-chain P-256 verifier consumes, encoded per
    /// standard ABI rules: two dynamic byte offsets, the challenge offset,
    /// the `[r, s]` pair, then the length-prefixed dynamic blobs padded to
    /// 32-byte boundaries.
    #[derive(Debug, PartialEq, Eq)]
    struct WebAuthnSignature {
        /// The WebAuthn authenticator data.
        /// See: <https://www.w3.org/TR/webauthn-2/#dom-authenticatorassertionresponse-authenticatordata>.
        bytes authenticatorData;
        /// The WebAuthn client data JSON.
        /// See: <https://www.w3.org/TR/webauthn-2/#dom-authenticatorresponse-clientdatajson>.
        bytes clientDataJSON;
        /// Byte offset of `"challenge":"..."` inside `clientDataJSON`.
        ///
        /// The verifier re-derives the challenge from this offset instead of
        /// parsing JSON on-chain.
        uint256 challengeOffset;
        /// The secp256r1 signature scalars `[r, s]`.
        uint256[2] rs;
    }
}

impl WebAuthnSignature {
    /// ABI-encodes the tuple into the dynamic signature payload.
    pub fn encode(&self) -> alloy::primitives::Bytes {
        self.abi_encode().into()
    }

    /// Decodes an ABI-encoded tuple. Only needed for verification/testing.
    pub fn decode(data: &[u8]) -> Result<Self, alloy::sol_types::Error> {
        Self::abi_decode(data, false)
    }
}
