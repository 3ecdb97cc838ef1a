//! Signing context and clock capabilities.

use crate::error::PayloadError;
use alloy::{
    dyn_abi::Eip712Domain,
    primitives::{Address, ChainId, U256},
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, time::SystemTime};

/// The contract whose EIP-712 domain verifies a signature.
///
/// The verifying contract for a user operation is not always the smart
/// account itself: ECDSA and passkey signatures are checked by the 4337
/// module, session-key signatures by the session-key module or the
/// smart-sessions validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerifierRole {
    /// The Safe ERC-4337 module.
    Erc4337Module,
    /// The session-key module.
    SessionKeyModule,
    /// The ERC-7579 smart-sessions validator.
    SmartSessionValidator,
}

impl fmt::Display for VerifierRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Erc4337Module => f.write_str("erc4337 module"),
            Self::SessionKeyModule => f.write_str("session-key module"),
            Self::SmartSessionValidator => f.write_str("smart-sessions validator"),
        }
    }
}

/// Everything the pipeline needs to know about the target chain, resolved
/// once at construction instead of threaded through every layer.
#[derive(Clone, Debug)]
pub struct SigningContext {
    chain_id: ChainId,
    entry_point: Address,
    verifiers: HashMap<VerifierRole, Address>,
}

impl SigningContext {
    /// Creates a new context. The chain id must be non-zero.
    pub fn new(chain_id: ChainId, entry_point: Address) -> Result<Self, PayloadError> {
        if chain_id == 0 {
            return Err(PayloadError::MissingChainId);
        }
        Ok(Self { chain_id, entry_point, verifiers: HashMap::new() })
    }

    /// Registers the verifying contract for a role.
    pub fn with_verifier(mut self, role: VerifierRole, address: Address) -> Self {
        self.verifiers.insert(role, address);
        self
    }

    /// The chain id signatures are domain-separated to.
    pub const fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// The ERC-4337 entry point address.
    pub const fn entry_point(&self) -> Address {
        self.entry_point
    }

    /// Resolves the verifying contract for a role.
    pub fn verifier(&self, role: VerifierRole) -> Result<Address, PayloadError> {
        self.verifiers
            .get(&role)
            .copied()
            .ok_or(PayloadError::MissingVerifyingContract(role))
    }

    /// Builds the EIP-712 domain `{chainId, verifyingContract}` for the given
    /// verifying contract.
    pub fn domain(&self, verifying_contract: Address) -> Eip712Domain {
        Eip712Domain::new(
            None,
            None,
            Some(U256::from(self.chain_id)),
            Some(verifying_contract),
            None,
        )
    }
}

/// A clock capability, injected so session-window checks are testable.
pub trait Clock: fmt::Debug + Send + Sync {
    /// The current unix timestamp in seconds.
    fn now(&self) -> u64;
}

/// [`Clock`] backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}
