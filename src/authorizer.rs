//! The authorization pipeline.
//!
//! Each request runs a linear pipeline: policy check (session keys only),
//! typed-data hashing, signing, packing. Requests are stateless and
//! independent; every side effect lives behind an injected capability, so
//! two concurrent requests can never observe each other.

use crate::{
    assembler::{DuplicatePolicy, MultiSignatureAssembler},
    context::{Clock, SigningContext, SystemClock, VerifierRole},
    eip712,
    error::{AuthorizationError, PayloadError, SignerError},
    policy::SessionPolicyGuard,
    signers::{
        EcdsaSigner, OperationSigner, PasskeySigner, SessionKeySigner, SignerIdentity,
        WebAuthnAssertionProvider,
    },
    storage::SignerStore,
    types::{
        encode_multi_signature, MessagePayload, SafeTransaction, SafeUserOperation,
        SessionReader, ValidityWindow,
    },
};
use alloy::primitives::{Address, Bytes, B256};
use std::sync::Arc;
use tracing::debug;

/// Authorizes pending operations for Safe accounts.
///
/// Holds the chain context and the injected capabilities; construction is
/// cheap and the authorizer is freely shareable across tasks.
#[derive(Debug)]
pub struct UserOperationAuthorizer {
    context: SigningContext,
    signers: Arc<dyn SignerStore>,
    sessions: Arc<dyn SessionReader>,
    assertions: Arc<dyn WebAuthnAssertionProvider>,
    clock: Arc<dyn Clock>,
}

impl UserOperationAuthorizer {
    /// A new authorizer over the given capabilities, reading the system
    /// clock.
    pub fn new(
        context: SigningContext,
        signers: Arc<dyn SignerStore>,
        sessions: Arc<dyn SessionReader>,
        assertions: Arc<dyn WebAuthnAssertionProvider>,
    ) -> Self {
        Self { context, signers, sessions, assertions, clock: Arc::new(SystemClock) }
    }

    /// Replaces the clock, for deterministic window checks in tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn identity(&self, account: Address) -> Result<SignerIdentity, AuthorizationError> {
        self.signers.get(account).ok_or_else(|| PayloadError::MissingSigner(account).into())
    }

    /// The module whose domain session signatures bind to. Accounts using
    /// the ERC-7579 smart-sessions validator register that role instead of
    /// the session-key module.
    fn session_verifier(&self) -> Result<Address, PayloadError> {
        self.context
            .verifier(VerifierRole::SessionKeyModule)
            .or_else(|_| self.context.verifier(VerifierRole::SmartSessionValidator))
    }

    /// Signs a user operation with the account's registered signer,
    /// returning the packed `signature` field bytes (validity-window prefix
    /// included).
    pub async fn authorize_user_op(
        &self,
        account: Address,
        op: &SafeUserOperation,
        window: ValidityWindow,
    ) -> Result<Bytes, AuthorizationError> {
        match self.identity(account)? {
            SignerIdentity::SessionKey { key } => {
                let signer = SessionKeySigner::from_key(&key)?;
                let grant = self
                    .sessions
                    .get_session(signer.address())
                    .await?
                    .ok_or_else(|| SignerError::UnknownSession(signer.address()))?;
                let now = self.clock.now();
                SessionPolicyGuard::check_at(&op.call_data, &grant, now)?;

                // Session signatures always carry a zero envelope window;
                // the grant's own bounds are enforced by the module.
                let window = ValidityWindow::ZERO;
                let verifier = self.session_verifier()?;
                let (digest, _) =
                    eip712::safe_op_signing_payload(op, &self.context, verifier, window)?;
                debug!(%account, nonce = %op.nonce, signer = "sessionKey", "signing user operation");
                let contribution =
                    signer.sign_user_op(&op.call_data, &grant, now, digest).await?;
                Ok(window.prepend_to(&encode_multi_signature(&[contribution])?))
            }
            identity => {
                let verifier = self.context.verifier(VerifierRole::Erc4337Module)?;
                let (digest, _) =
                    eip712::safe_op_signing_payload(op, &self.context, verifier, window)?;
                debug!(%account, nonce = %op.nonce, signer = identity.kind(), "signing user operation");
                let contribution = self.sign_digest_with(&identity, digest).await?;
                Ok(window.prepend_to(&encode_multi_signature(&[contribution])?))
            }
        }
    }

    /// Signs a legacy Safe multisig transaction with each of the given
    /// owner identities and packs the sorted threshold signature. No
    /// validity-window prefix applies on this path.
    pub async fn authorize_safe_tx(
        &self,
        safe: Address,
        tx: &SafeTransaction,
        owners: &[SignerIdentity],
        policy: DuplicatePolicy,
    ) -> Result<Bytes, AuthorizationError> {
        let (digest, _) = eip712::safe_tx_signing_payload(tx, &self.context, safe);
        let mut assembler = MultiSignatureAssembler::new(policy);
        for owner in owners {
            debug!(%safe, nonce = %tx.nonce, signer = owner.kind(), "signing safe transaction");
            assembler.add(self.sign_digest_with(owner, digest).await?)?;
        }
        Ok(assembler.assemble()?)
    }

    /// Signs an off-chain message wrapped as a SafeMessage with the
    /// account's registered signer, for EIP-1271 verification.
    pub async fn authorize_message(
        &self,
        safe: Address,
        message: &MessagePayload,
    ) -> Result<Bytes, AuthorizationError> {
        let identity = self.identity(safe)?;
        let (digest, _) = eip712::safe_message_signing_payload(message, &self.context, safe)?;
        debug!(%safe, signer = identity.kind(), "signing message");
        let contribution = self.sign_digest_with(&identity, digest).await?;
        Ok(encode_multi_signature(&[contribution])?)
    }

    /// A packed placeholder signature for the account's registered signer:
    /// deterministic, the right byte length for gas estimation, never
    /// valid.
    pub fn stub_user_op_signature(&self, account: Address) -> Result<Bytes, AuthorizationError> {
        let contribution = match self.identity(account)? {
            SignerIdentity::Ecdsa { key } => EcdsaSigner::from_key(&key)?.stub_signature(),
            SignerIdentity::SessionKey { key } => {
                SessionKeySigner::from_key(&key)?.stub_signature()
            }
            SignerIdentity::Passkey { credential_id, signer_address, .. } => {
                PasskeySigner::new(credential_id, signer_address, self.assertions.clone())
                    .stub_signature()
            }
        };
        Ok(ValidityWindow::ZERO.prepend_to(&encode_multi_signature(&[contribution])?))
    }

    async fn sign_digest_with(
        &self,
        identity: &SignerIdentity,
        digest: B256,
    ) -> Result<crate::types::SignatureContribution, AuthorizationError> {
        match identity {
            SignerIdentity::Ecdsa { key } => {
                Ok(EcdsaSigner::from_key(key)?.sign_payload_hash(digest).await?)
            }
            SignerIdentity::Passkey { credential_id, signer_address, .. } => {
                let signer = PasskeySigner::new(
                    credential_id.clone(),
                    *signer_address,
                    self.assertions.clone(),
                );
                Ok(signer.sign_payload_hash(digest).await?)
            }
            SignerIdentity::SessionKey { .. } => Err(SignerError::Unavailable(
                "session keys only sign user operations".into(),
            )
            .into()),
        }
    }
}
