//! Legacy Safe multisig transaction.

use alloy::{
    primitives::{Address, Bytes, U256},
    sol,
};
use serde::{Deserialize, Serialize};

sol! {
    /// The EIP-712 struct the Safe itself verifies ("SafeTx").
    #[derive(Debug, Default, PartialEq, Eq, serde::Serialize)]
    struct SafeTx {
        /// The call target.
        address to;
        /// Native value to send.
        uint256 value;
        /// The calldata bytes.
        bytes data;
        /// 0 = call, 1 = delegatecall.
        uint8 operation;
        /// Gas forwarded to the inner call.
        uint256 safeTxGas;
        /// Gas overhead refunded independent of the inner call.
        uint256 baseGas;
        /// Gas price used for the refund calculation.
        uint256 gasPrice;
        /// Token used for the refund; zero address = native.
        address gasToken;
        /// Refund recipient; zero address = tx.origin.
        address refundReceiver;
        /// The Safe's multisig nonce.
        uint256 nonce;
    }
}

/// A Safe multisig transaction awaiting signatures.
///
/// Optional refund fields default to the zero address when converted for
/// hashing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeTransaction {
    /// The call target.
    pub to: Address,
    /// Native value to send.
    pub value: U256,
    /// The calldata bytes.
    pub data: Bytes,
    /// 0 = call, 1 = delegatecall.
    #[serde(default)]
    pub operation: u8,
    /// Gas forwarded to the inner call.
    #[serde(default)]
    pub safe_tx_gas: U256,
    /// Gas overhead refunded independent of the inner call.
    #[serde(default)]
    pub base_gas: U256,
    /// Gas price used for the refund calculation.
    #[serde(default)]
    pub gas_price: U256,
    /// Token used for the refund.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_token: Option<Address>,
    /// Refund recipient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_receiver: Option<Address>,
    /// The Safe's multisig nonce.
    pub nonce: U256,
}

impl SafeTransaction {
    /// Converts into the [`SafeTx`] EIP-712 struct for signing.
    pub fn as_safe_tx(&self) -> SafeTx {
        SafeTx {
            to: self.to,
            value: self.value,
            data: self.data.clone(),
            operation: self.operation,
            safeTxGas: self.safe_tx_gas,
            baseGas: self.base_gas,
            gasPrice: self.gas_price,
            gasToken: self.gas_token.unwrap_or_default(),
            refundReceiver: self.refund_receiver.unwrap_or_default(),
            nonce: self.nonce,
        }
    }
}
