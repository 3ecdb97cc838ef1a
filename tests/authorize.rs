//! End-to-end authorization flows over in-memory capabilities.

use std::sync::Arc;

use alloy::{
    hex,
    primitives::{address, b256, Address, Bytes, PrimitiveSignature, B256, U256},
    sol_types::SolCall,
};
use safe_signing::{
    assembler::DuplicatePolicy,
    authorizer::UserOperationAuthorizer,
    context::{Clock, SigningContext, VerifierRole},
    eip712,
    error::{AuthorizationError, SessionError},
    signers::{SignerIdentity, SoftwareAssertionProvider},
    storage::{InMemorySessions, InMemorySignerStore, SignerStore},
    types::{
        decode_multi_signature, DecodedSignature, IModuleExecution, MessagePayload, SafeTransaction,
        SafeUserOperation, SessionGrant, ValidityWindow, WebAuthnSignature,
    },
};

const ENTRY_POINT: Address = address!("5FF137D4b0FDCD49DcA30c7CF57E578a026d2789");
const MODULE: Address = address!("a581c4A4DB7175302464fF3C06380BC3270b4037");
const SESSION_MODULE: Address = address!("0000000000000000000000000000000000005e55");
const SAFE: Address = address!("c0ffee254729296a45a3885639AC7E10F9d54979");
const TARGET: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");

const OWNER_KEY: B256 =
    b256!("4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318");
const SESSION_KEY: B256 =
    b256!("59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d");
const P256_KEY: B256 = b256!("3030303030303030303030303030303030303030303030303030303030303030");

#[derive(Debug)]
struct FixedClock(u64);

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

struct Harness {
    authorizer: UserOperationAuthorizer,
    signers: Arc<InMemorySignerStore>,
    sessions: Arc<InMemorySessions>,
}

fn harness(now: u64) -> Harness {
    let context = SigningContext::new(8453, ENTRY_POINT)
        .unwrap()
        .with_verifier(VerifierRole::Erc4337Module, MODULE)
        .with_verifier(VerifierRole::SessionKeyModule, SESSION_MODULE);
    let signers = Arc::new(InMemorySignerStore::default());
    let sessions = Arc::new(InMemorySessions::default());
    let assertions = Arc::new(SoftwareAssertionProvider::load(&P256_KEY).unwrap());
    let authorizer =
        UserOperationAuthorizer::new(context, signers.clone(), sessions.clone(), assertions)
            .with_clock(Arc::new(FixedClock(now)));
    Harness { authorizer, signers, sessions }
}

fn pending_op(to: Address) -> SafeUserOperation {
    SafeUserOperation {
        sender: SAFE,
        nonce: U256::from(7),
        call_data: IModuleExecution::executeUserOpCall {
            to,
            value: U256::ZERO,
            data: hex!("deadbeef").into(),
            operation: 0,
        }
        .abi_encode()
        .into(),
        call_gas_limit: U256::from(100_000),
        verification_gas_limit: U256::from(300_000),
        pre_verification_gas: U256::from(50_000),
        max_fee_per_gas: U256::from(2_000_000_000u64),
        max_priority_fee_per_gas: U256::from(1_000_000_000u64),
        ..Default::default()
    }
}

#[tokio::test]
async fn ecdsa_owner_signs_with_zero_window_prefix() {
    let h = harness(1_000);
    h.signers.put(SAFE, SignerIdentity::Ecdsa { key: OWNER_KEY });

    let signature = h
        .authorizer
        .authorize_user_op(SAFE, &pending_op(TARGET), ValidityWindow::ZERO)
        .await
        .unwrap();

    // 12-byte window prefix, then one 65-byte static slot.
    assert_eq!(signature.len(), 12 + 65);
    assert_eq!(&signature[..12], &[0u8; 12]);
    assert!(matches!(signature[12 + 64], 0x1b | 0x1c));
}

#[tokio::test]
async fn bounded_window_is_prefixed_and_signed() {
    let h = harness(1_000);
    h.signers.put(SAFE, SignerIdentity::Ecdsa { key: OWNER_KEY });
    let op = pending_op(TARGET);

    let bounded = h
        .authorizer
        .authorize_user_op(SAFE, &op, ValidityWindow::new(0x0100, 0x0200))
        .await
        .unwrap();
    let unbounded =
        h.authorizer.authorize_user_op(SAFE, &op, ValidityWindow::ZERO).await.unwrap();

    assert_eq!(&bounded[..12], &hex!("000000000100" "000000000200"));
    // The window is part of the signed payload, not just the prefix.
    assert_ne!(&bounded[12..], &unbounded[12..]);
}

#[tokio::test]
async fn passkey_owner_produces_a_dynamic_signature() {
    let h = harness(1_000);
    let passkey_signer = address!("cccccccccccccccccccccccccccccccccccccccc");
    h.signers.put(
        SAFE,
        SignerIdentity::Passkey {
            credential_id: Bytes::from_static(b"credential-1"),
            signer_address: passkey_signer,
            public_key_x: B256::ZERO,
            public_key_y: B256::ZERO,
        },
    );

    let signature = h
        .authorizer
        .authorize_user_op(SAFE, &pending_op(TARGET), ValidityWindow::ZERO)
        .await
        .unwrap();

    let entries = decode_multi_signature(&signature[12..]).unwrap();
    let [DecodedSignature::Dynamic { signer, data }] = entries.as_slice() else {
        panic!("expected one dynamic entry, got {entries:?}");
    };
    assert_eq!(*signer, passkey_signer);
    WebAuthnSignature::decode(data).unwrap();
}

#[tokio::test]
async fn session_key_signs_whitelisted_operation_with_zero_envelope() {
    let h = harness(1_000);
    h.signers.put(SAFE, SignerIdentity::SessionKey { key: SESSION_KEY });
    let session_address =
        alloy::signers::local::PrivateKeySigner::from_bytes(&SESSION_KEY).unwrap().address();
    h.sessions.insert(SessionGrant::new(session_address, [TARGET]).with_window(500, 2_000));

    // Even though the caller asks for a bounded envelope, the session path
    // pins it to zero; the grant window lives in the module.
    let signature = h
        .authorizer
        .authorize_user_op(SAFE, &pending_op(TARGET), ValidityWindow::new(600, 700))
        .await
        .unwrap();

    assert_eq!(&signature[..12], &[0u8; 12]);
    assert_eq!(signature.len(), 12 + 65);
}

#[tokio::test]
async fn session_key_rejects_non_whitelisted_destination() {
    let h = harness(1_000);
    h.signers.put(SAFE, SignerIdentity::SessionKey { key: SESSION_KEY });
    let session_address =
        alloy::signers::local::PrivateKeySigner::from_bytes(&SESSION_KEY).unwrap().address();
    h.sessions.insert(SessionGrant::new(session_address, [TARGET]));

    let other = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
    let err = h
        .authorizer
        .authorize_user_op(SAFE, &pending_op(other), ValidityWindow::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthorizationError::Session(SessionError::NotWhitelisted(to)) if to == other
    ));
}

#[tokio::test]
async fn expired_session_is_refused() {
    let h = harness(5_000);
    h.signers.put(SAFE, SignerIdentity::SessionKey { key: SESSION_KEY });
    let session_address =
        alloy::signers::local::PrivateKeySigner::from_bytes(&SESSION_KEY).unwrap().address();
    h.sessions.insert(SessionGrant::new(session_address, [TARGET]).with_window(100, 2_000));

    let err = h
        .authorizer
        .authorize_user_op(SAFE, &pending_op(TARGET), ValidityWindow::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthorizationError::Session(SessionError::Expired { .. })));
}

#[tokio::test]
async fn unregistered_account_is_a_typed_error() {
    let h = harness(1_000);
    let err = h
        .authorizer
        .authorize_user_op(SAFE, &pending_op(TARGET), ValidityWindow::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthorizationError::Payload(_)));
}

#[tokio::test]
async fn threshold_two_safe_tx_is_sorted_by_recovered_owner() {
    let h = harness(1_000);
    let tx = SafeTransaction {
        to: TARGET,
        value: U256::from(1),
        data: hex!("cafe").into(),
        nonce: U256::from(3),
        ..Default::default()
    };
    let owner_a = SignerIdentity::Ecdsa { key: OWNER_KEY };
    let owner_b = SignerIdentity::Ecdsa {
        key: b256!("8f2a559490f1c1b2a52e2e6dc0a2b117ff510d021d52d3d6e6b6e6b6e6b6e6b6"),
    };

    let packed = h
        .authorizer
        .authorize_safe_tx(SAFE, &tx, &[owner_a, owner_b], DuplicatePolicy::RejectDuplicates)
        .await
        .unwrap();
    assert_eq!(packed.len(), 130);

    // Recover both signers from the digest and check ascending order.
    let context = SigningContext::new(8453, ENTRY_POINT).unwrap();
    let (digest, _) = eip712::safe_tx_signing_payload(&tx, &context, SAFE);
    let recover = |slot: &[u8]| {
        PrimitiveSignature::try_from(slot).unwrap().recover_address_from_prehash(&digest).unwrap()
    };
    let first = recover(&packed[..65]);
    let second = recover(&packed[65..]);
    assert!(first < second);
}

#[tokio::test]
async fn duplicate_owner_fails_a_threshold_signature() {
    let h = harness(1_000);
    let tx = SafeTransaction { to: TARGET, nonce: U256::from(3), ..Default::default() };
    let owner = SignerIdentity::Ecdsa { key: OWNER_KEY };

    let err = h
        .authorizer
        .authorize_safe_tx(
            SAFE,
            &tx,
            &[owner.clone(), owner],
            DuplicatePolicy::RejectDuplicates,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuthorizationError::Encoding(_)));
}

#[tokio::test]
async fn message_signature_recovers_the_owner() {
    let h = harness(1_000);
    h.signers.put(SAFE, SignerIdentity::Ecdsa { key: OWNER_KEY });
    let message = MessagePayload::raw(b"gm".to_vec());

    let signature = h.authorizer.authorize_message(SAFE, &message).await.unwrap();
    assert_eq!(signature.len(), 65);

    let context = SigningContext::new(8453, ENTRY_POINT).unwrap();
    let (digest, _) =
        eip712::safe_message_signing_payload(&message, &context, SAFE).unwrap();
    let owner =
        alloy::signers::local::PrivateKeySigner::from_bytes(&OWNER_KEY).unwrap().address();
    let recovered = PrimitiveSignature::try_from(signature.as_ref())
        .unwrap()
        .recover_address_from_prehash(&digest)
        .unwrap();
    assert_eq!(recovered, owner);
}

#[tokio::test]
async fn stub_signature_matches_real_signature_length() {
    let h = harness(1_000);
    h.signers.put(SAFE, SignerIdentity::Ecdsa { key: OWNER_KEY });

    let stub = h.authorizer.stub_user_op_signature(SAFE).unwrap();
    let real = h
        .authorizer
        .authorize_user_op(SAFE, &pending_op(TARGET), ValidityWindow::ZERO)
        .await
        .unwrap();
    assert_eq!(stub.len(), real.len());
    assert_eq!(stub, h.authorizer.stub_user_op_signature(SAFE).unwrap());
    assert_ne!(stub, real);
}
