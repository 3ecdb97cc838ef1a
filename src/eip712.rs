//! EIP-712 payload construction.
//!
//! Every signing flow goes through one of these functions; each returns both
//! the 32-byte digest the signer consumes and the full [`TypedData`] a
//! wallet UI can display for review.

use crate::{
    context::SigningContext,
    error::AuthorizationError,
    types::{MessagePayload, SafeTransaction, SafeUserOperation, ValidityWindow},
};
use alloy::{
    dyn_abi::TypedData,
    primitives::{Address, B256},
    sol_types::SolStruct,
};

/// The digest a signer must sign to authorize a user operation.
///
/// The domain's verifying contract is the module checking the signature,
/// never the account itself; callers resolve it by role from the
/// [`SigningContext`]. The validity window is part of the signed payload,
/// so a relayer cannot widen it after the fact.
pub fn safe_op_signing_payload(
    op: &SafeUserOperation,
    context: &SigningContext,
    verifying_contract: Address,
    window: ValidityWindow,
) -> Result<(B256, TypedData), AuthorizationError> {
    let payload = op.as_safe_op(context.entry_point(), window)?;
    let domain = context.domain(verifying_contract);
    let digest = payload.eip712_signing_hash(&domain);
    let typed_data = TypedData::from_struct(&payload, Some(domain));
    debug_assert_eq!(Ok(digest), typed_data.eip712_signing_hash());
    Ok((digest, typed_data))
}

/// The digest for a legacy Safe multisig transaction. Here the verifying
/// contract is the Safe itself.
pub fn safe_tx_signing_payload(
    tx: &SafeTransaction,
    context: &SigningContext,
    safe: Address,
) -> (B256, TypedData) {
    let payload = tx.as_safe_tx();
    let domain = context.domain(safe);
    let digest = payload.eip712_signing_hash(&domain);
    let typed_data = TypedData::from_struct(&payload, Some(domain));
    debug_assert_eq!(Ok(digest), typed_data.eip712_signing_hash());
    (digest, typed_data)
}

/// The digest for an off-chain message wrapped as a SafeMessage, verified
/// by the Safe via EIP-1271.
pub fn safe_message_signing_payload(
    message: &MessagePayload,
    context: &SigningContext,
    safe: Address,
) -> Result<(B256, TypedData), AuthorizationError> {
    let payload = message.as_safe_message()?;
    let domain = context.domain(safe);
    let digest = payload.eip712_signing_hash(&domain);
    let typed_data = TypedData::from_struct(&payload, Some(domain));
    debug_assert_eq!(Ok(digest), typed_data.eip712_signing_hash());
    Ok((digest, typed_data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::{
        hex,
        primitives::{address, U256},
    };

    const ENTRY_POINT: Address = address!("5FF137D4b0FDCD49DcA30c7CF57E578a026d2789");
    const MODULE: Address = address!("a581c4A4DB7175302464fF3C06380BC3270b4037");
    const SESSION_MODULE: Address = address!("0000000000000000000000000000000000005e55");
    const SAFE: Address = address!("c0ffee254729296a45a3885639AC7E10F9d54979");

    fn context() -> SigningContext {
        SigningContext::new(8453, ENTRY_POINT).unwrap()
    }

    fn op() -> SafeUserOperation {
        SafeUserOperation {
            sender: SAFE,
            nonce: U256::from(7),
            call_data: hex!("deadbeef").into(),
            call_gas_limit: U256::from(100_000),
            verification_gas_limit: U256::from(300_000),
            pre_verification_gas: U256::from(50_000),
            max_fee_per_gas: U256::from(2_000_000_000u64),
            max_priority_fee_per_gas: U256::from(1_000_000_000u64),
            ..Default::default()
        }
    }

    #[test]
    fn digest_matches_the_displayable_typed_data() {
        let (digest, typed_data) =
            safe_op_signing_payload(&op(), &context(), MODULE, ValidityWindow::ZERO).unwrap();
        assert_eq!(typed_data.eip712_signing_hash().unwrap(), digest);
        assert_eq!(typed_data.domain.verifying_contract, Some(MODULE));
    }

    #[test]
    fn verifier_separates_domains() {
        let ctx = context();
        let (for_module, _) =
            safe_op_signing_payload(&op(), &ctx, MODULE, ValidityWindow::ZERO).unwrap();
        let (for_session, _) =
            safe_op_signing_payload(&op(), &ctx, SESSION_MODULE, ValidityWindow::ZERO).unwrap();
        assert_ne!(for_module, for_session);
    }

    #[test]
    fn validity_window_is_part_of_the_digest() {
        let ctx = context();
        let (unbounded, _) =
            safe_op_signing_payload(&op(), &ctx, MODULE, ValidityWindow::ZERO).unwrap();
        let (bounded, _) =
            safe_op_signing_payload(&op(), &ctx, MODULE, ValidityWindow::new(100, 200)).unwrap();
        assert_ne!(unbounded, bounded);
    }

    #[test]
    fn chain_id_separates_safe_tx_digests() {
        let tx = SafeTransaction {
            to: address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"),
            value: U256::from(1),
            data: hex!("cafe").into(),
            nonce: U256::from(3),
            ..Default::default()
        };
        let (mainnet, _) =
            safe_tx_signing_payload(&tx, &SigningContext::new(1, ENTRY_POINT).unwrap(), SAFE);
        let (base, _) =
            safe_tx_signing_payload(&tx, &SigningContext::new(8453, ENTRY_POINT).unwrap(), SAFE);
        assert_ne!(mainnet, base);
    }

    #[test]
    fn message_digest_depends_on_the_wrapped_payload() {
        let ctx = context();
        let (a, _) =
            safe_message_signing_payload(&MessagePayload::raw(b"hello".to_vec()), &ctx, SAFE)
                .unwrap();
        let (b, _) =
            safe_message_signing_payload(&MessagePayload::raw(b"world".to_vec()), &ctx, SAFE)
                .unwrap();
        assert_ne!(a, b);
    }
}
