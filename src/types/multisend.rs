//! Decoding of the calls batched inside a user operation's `callData`.

use crate::error::{AuthorizationError, EncodingError, PayloadError};
use alloy::{
    primitives::{Address, Bytes, FixedBytes, U256},
    sol,
    sol_types::SolCall,
};

sol! {
    /// Execution entry points whose calldata this core can decode.
    interface IModuleExecution {
        /// Executes a single call through the 4337 module.
        function executeUserOp(address to, uint256 value, bytes calldata data, uint8 operation) external;
        /// Same as `executeUserOp`, propagating the revert string.
        function executeUserOpWithErrorString(address to, uint256 value, bytes calldata data, uint8 operation) external;
        /// Executes a packed batch of calls atomically.
        function multiSend(bytes calldata transactions) external payable;
    }
}

/// One call extracted from a `multiSend` batch (or a single-call wrapper).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiSendCall {
    /// 0 = call, 1 = delegatecall.
    pub operation: u8,
    /// The call destination.
    pub to: Address,
    /// Native value to send.
    pub value: U256,
    /// The calldata bytes.
    pub data: Bytes,
}

/// Decodes a packed `multiSend` batch.
///
/// The packed layout repeats `{operation:1}{to:20}{value:32}{dataLength:32}{data:N}`
/// with no padding between calls.
pub fn decode_batch(transactions: &[u8]) -> Result<Vec<MultiSendCall>, EncodingError> {
    let mut calls = Vec::new();
    let mut cursor = 0;

    while cursor < transactions.len() {
        let header = transactions
            .get(cursor..cursor + 85)
            .ok_or(EncodingError::TruncatedMultiSend(cursor))?;
        // The length word is attacker-shaped; bound it against the bytes
        // actually remaining before any offset arithmetic.
        let data_len = usize::try_from(U256::from_be_slice(&header[53..85]))
            .ok()
            .filter(|data_len| *data_len <= transactions.len() - cursor - 85)
            .ok_or(EncodingError::TruncatedMultiSend(cursor))?;
        let data = &transactions[cursor + 85..cursor + 85 + data_len];

        calls.push(MultiSendCall {
            operation: header[0],
            to: Address::from_slice(&header[1..21]),
            value: U256::from_be_slice(&header[21..53]),
            data: Bytes::copy_from_slice(data),
        });
        cursor += 85 + data_len;
    }

    Ok(calls)
}

/// Encodes calls into the packed `multiSend` layout. The inverse of
/// [`decode_batch`]; used to build batch calldata and in tests.
pub fn encode_batch(calls: &[MultiSendCall]) -> Bytes {
    let mut out = Vec::new();
    for call in calls {
        out.push(call.operation);
        out.extend_from_slice(call.to.as_slice());
        out.extend_from_slice(&call.value.to_be_bytes::<32>());
        out.extend_from_slice(&U256::from(call.data.len()).to_be_bytes::<32>());
        out.extend_from_slice(&call.data);
    }
    out.into()
}

/// Extracts the individual calls from a user operation's `callData`,
/// handling both the single-call wrappers and `multiSend` batches (including
/// a batch delegatecalled through the single-call wrapper).
///
/// Calldata that matches none of the known execution shapes is an error;
/// the policy guard must never approve what it cannot decode.
pub fn decode_calls(call_data: &[u8]) -> Result<Vec<MultiSendCall>, AuthorizationError> {
    let selector = call_data
        .get(..4)
        .map(FixedBytes::<4>::from_slice)
        .ok_or(PayloadError::UnsupportedCallData(FixedBytes::ZERO))?;

    match selector.0 {
        IModuleExecution::executeUserOpCall::SELECTOR => {
            let call = IModuleExecution::executeUserOpCall::abi_decode(call_data, false)?;
            unwrap_single(call.to, call.value, call.data, call.operation)
        }
        IModuleExecution::executeUserOpWithErrorStringCall::SELECTOR => {
            let call =
                IModuleExecution::executeUserOpWithErrorStringCall::abi_decode(call_data, false)?;
            unwrap_single(call.to, call.value, call.data, call.operation)
        }
        IModuleExecution::multiSendCall::SELECTOR => {
            let call = IModuleExecution::multiSendCall::abi_decode(call_data, false)?;
            Ok(decode_batch(&call.transactions)?)
        }
        _ => Err(PayloadError::UnsupportedCallData(selector).into()),
    }
}

/// A single wrapped call is either a plain call or a delegatecall into the
/// multisend library carrying the real batch.
fn unwrap_single(
    to: Address,
    value: U256,
    data: Bytes,
    operation: u8,
) -> Result<Vec<MultiSendCall>, AuthorizationError> {
    if operation == 1 && data.starts_with(&IModuleExecution::multiSendCall::SELECTOR) {
        let inner = IModuleExecution::multiSendCall::abi_decode(&data, false)?;
        return Ok(decode_batch(&inner.transactions)?);
    }
    Ok(vec![MultiSendCall { operation, to, value, data }])
}
