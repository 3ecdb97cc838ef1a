//! Signature construction and user-operation authorization for Safe
//! (ERC-4337) smart accounts.
//!
//! The crate turns a pending user operation, multisig transaction, or
//! off-chain message into the exact signature bytes the Safe's on-chain
//! verifiers accept: EIP-712 payloads for SafeOp, SafeTx and SafeMessage,
//! three signer kinds (local ECDSA, WebAuthn passkey, delegated session
//! key), client-side session policy enforcement, and the sorted
//! static+dynamic multi-signature container.

pub mod assembler;
pub mod authorizer;
pub mod context;
pub mod eip712;
pub mod error;
pub mod policy;
pub mod signers;
pub mod storage;
pub mod types;
