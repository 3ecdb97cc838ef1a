//! Multi-signature assembly for threshold accounts.

use crate::{
    error::EncodingError,
    types::{encode_multi_signature, SignatureContribution},
};
use alloy::primitives::Bytes;

/// What to do when two contributions arrive from the same signer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Refuse the second contribution. The default: a duplicate usually
    /// means two flows signed independently, and silently picking one hides
    /// the bug.
    #[default]
    RejectDuplicates,
    /// Keep only the most recent contribution, for re-signing flows.
    LastWriteWins,
}

/// Collects contributions from the account's signers and packs them into
/// the sorted container the verifier expects.
#[derive(Debug, Default)]
pub struct MultiSignatureAssembler {
    policy: DuplicatePolicy,
    contributions: Vec<SignatureContribution>,
}

impl MultiSignatureAssembler {
    /// An empty assembler with the given duplicate policy.
    pub const fn new(policy: DuplicatePolicy) -> Self {
        Self { policy, contributions: Vec::new() }
    }

    /// Adds one signer's contribution.
    pub fn add(&mut self, contribution: SignatureContribution) -> Result<(), EncodingError> {
        if let Some(existing) =
            self.contributions.iter_mut().find(|c| c.signer == contribution.signer)
        {
            return match self.policy {
                DuplicatePolicy::RejectDuplicates => {
                    Err(EncodingError::DuplicateSigner(contribution.signer))
                }
                DuplicatePolicy::LastWriteWins => {
                    *existing = contribution;
                    Ok(())
                }
            };
        }
        self.contributions.push(contribution);
        Ok(())
    }

    /// Number of distinct signers collected so far.
    pub fn len(&self) -> usize {
        self.contributions.len()
    }

    /// Whether nothing has been collected yet.
    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }

    /// Packs the collected contributions, sorted by signer address.
    ///
    /// Assembling nothing is an error: an empty signature field would be a
    /// submittable-but-unverifiable operation.
    pub fn assemble(&self) -> Result<Bytes, EncodingError> {
        if self.contributions.is_empty() {
            return Err(EncodingError::NoContributions);
        }
        encode_multi_signature(&self.contributions)
    }
}
