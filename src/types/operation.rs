//! ERC-4337 pending operation for a Safe account.

use super::{ValidityWindow, U48};
use crate::error::PayloadError;
use alloy::{
    primitives::{Address, Bytes, U256},
    sol,
};
use serde::{Deserialize, Serialize};

sol! {
    /// The EIP-712 struct the 4337 module verifies ("SafeOp").
    ///
    /// The domain's verifying contract is the module (or session validator)
    /// checking the signature, not the account itself.
    #[derive(Debug, Default, PartialEq, Eq, serde::Serialize)]
    struct SafeOp {
        /// The Safe account sending the operation.
        address safe;
        /// Anti-replay nonce, monotonically increasing per account.
        uint256 nonce;
        /// Factory address and calldata, concatenated; empty post-deployment.
        bytes initCode;
        /// The batched calls to execute.
        bytes callData;
        /// Gas for signature and paymaster verification.
        uint256 verificationGasLimit;
        /// Gas for the execution phase.
        uint256 callGasLimit;
        /// Gas paid to the bundler ahead of execution.
        uint256 preVerificationGas;
        /// EIP-1559 priority fee cap.
        uint256 maxPriorityFeePerGas;
        /// EIP-1559 total fee cap.
        uint256 maxFeePerGas;
        /// Packed paymaster address, gas limits and data; empty if unsponsored.
        bytes paymasterAndData;
        /// The signature is invalid before this timestamp (0 = no bound).
        uint48 validAfter;
        /// The signature is invalid after this timestamp (0 = no bound).
        uint48 validUntil;
        /// The ERC-4337 entry point the operation is submitted to.
        address entryPoint;
    }
}

/// A user operation awaiting authorization.
///
/// Constructed by the account layer; this core only ever writes the
/// `signature` field. Pre-deployment ops carry exactly one of `init_code`
/// or the `factory`/`factory_data` pair.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeUserOperation {
    /// The Safe account address.
    pub sender: Address,
    /// Anti-replay nonce.
    pub nonce: U256,
    /// Pre-concatenated init code (entry point v0.6 style).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_code: Option<Bytes>,
    /// Account factory address (entry point v0.7 style).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory: Option<Address>,
    /// Calldata for the factory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory_data: Option<Bytes>,
    /// The batched calls to execute.
    pub call_data: Bytes,
    /// Gas for the execution phase.
    pub call_gas_limit: U256,
    /// Gas for signature and paymaster verification.
    pub verification_gas_limit: U256,
    /// Gas paid to the bundler ahead of execution.
    pub pre_verification_gas: U256,
    /// EIP-1559 total fee cap.
    pub max_fee_per_gas: U256,
    /// EIP-1559 priority fee cap.
    pub max_priority_fee_per_gas: U256,
    /// Sponsoring paymaster, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster: Option<Address>,
    /// Gas limit for paymaster verification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_verification_gas_limit: Option<u128>,
    /// Gas limit for the paymaster post-op call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_post_op_gas_limit: Option<u128>,
    /// Extra calldata for the paymaster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_data: Option<Bytes>,
    /// The packed signature; starts empty, populated by this core.
    #[serde(default)]
    pub signature: Bytes,
}

impl SafeUserOperation {
    /// The `initCode` field as signed: `factory ++ factoryData` when the
    /// v0.7 pair is present, the raw `init_code` when the v0.6 form is, and
    /// empty bytes post-deployment.
    pub fn init_code(&self) -> Result<Bytes, PayloadError> {
        match (&self.init_code, &self.factory) {
            (Some(_), Some(_)) => Err(PayloadError::AmbiguousInitCode),
            (Some(code), None) => {
                if self.factory_data.is_some() {
                    return Err(PayloadError::AmbiguousInitCode);
                }
                Ok(code.clone())
            }
            (None, Some(factory)) => {
                let data = self.factory_data.as_deref().unwrap_or_default();
                let mut out = Vec::with_capacity(20 + data.len());
                out.extend_from_slice(factory.as_slice());
                out.extend_from_slice(data);
                Ok(out.into())
            }
            (None, None) => {
                if self.factory_data.is_some() {
                    return Err(PayloadError::DanglingFactoryData);
                }
                Ok(Bytes::new())
            }
        }
    }

    /// The packed `paymasterAndData` field:
    /// `{paymaster:20}{verificationGasLimit:16}{postOpGasLimit:16}{data}`,
    /// or empty bytes when the operation is unsponsored.
    pub fn paymaster_and_data(&self) -> Bytes {
        let Some(paymaster) = self.paymaster else {
            return Bytes::new();
        };
        let data = self.paymaster_data.as_deref().unwrap_or_default();
        let mut out = Vec::with_capacity(20 + 16 + 16 + data.len());
        out.extend_from_slice(paymaster.as_slice());
        out.extend_from_slice(&self.paymaster_verification_gas_limit.unwrap_or_default().to_be_bytes());
        out.extend_from_slice(&self.paymaster_post_op_gas_limit.unwrap_or_default().to_be_bytes());
        out.extend_from_slice(data);
        out.into()
    }

    /// Converts into the [`SafeOp`] EIP-712 struct for signing.
    pub fn as_safe_op(
        &self,
        entry_point: Address,
        window: ValidityWindow,
    ) -> Result<SafeOp, PayloadError> {
        Ok(SafeOp {
            safe: self.sender,
            nonce: self.nonce,
            initCode: self.init_code()?,
            callData: self.call_data.clone(),
            verificationGasLimit: self.verification_gas_limit,
            callGasLimit: self.call_gas_limit,
            preVerificationGas: self.pre_verification_gas,
            maxPriorityFeePerGas: self.max_priority_fee_per_gas,
            maxFeePerGas: self.max_fee_per_gas,
            paymasterAndData: self.paymaster_and_data(),
            validAfter: window.valid_after,
            validUntil: window.valid_until,
            entryPoint: entry_point,
        })
    }
}
