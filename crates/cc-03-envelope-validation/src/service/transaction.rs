//! # Transaction Validator
//!
//! The ordered check pipeline for transaction envelopes, ending in the
//! single-signature or joint-signature branch.

use super::EnvelopeValidationService;
use crate::domain::joint::{cosigner_hash, joint_shape_errors, SignerSet};
use crate::domain::pow::{meets_difficulty, pow_digest};
use crate::ports::inbound::EnvelopeOrigin;
use shared_types::{
    AccountSignature, GossipPresentationPolicy, HashBits, PublishedSignature,
    TransactionEnvelope, TransactionKind, ValidationError, ValidationFatal, ValidationOutcome,
    ValidationResult,
};
use shared_crypto::width_hash;
use tracing::debug;

impl EnvelopeValidationService {
    pub(crate) async fn validate_transaction_impl(
        &self,
        envelope: &TransactionEnvelope,
        origin: EnvelopeOrigin,
        now_millis: u64,
    ) -> Result<ValidationResult, ValidationFatal> {
        if now_millis >= envelope.expiration_millis {
            return Ok(ValidationResult::invalid(ValidationError::EnvelopeExpired));
        }

        if envelope.id.is_placeholder() {
            return Ok(ValidationResult::invalid(
                ValidationError::EmptyTransactionId,
            ));
        }

        let is_presentation = matches!(envelope.kind, TransactionKind::Presentation)
            || envelope.signature.is_presentation();
        if is_presentation
            && origin == EnvelopeOrigin::Gossip
            && self.config.gossip_presentation == GossipPresentationPolicy::Deny
        {
            return Ok(ValidationResult::invalid(
                ValidationError::GossipPresentationDisallowed,
            ));
        }

        // The id carries its creation time; anything from the future is
        // fabricated, and anything predating the chain cannot exist.
        if envelope.id.timestamp_millis >= now_millis {
            return Ok(ValidationResult::invalid(ValidationError::FutureTimestamp));
        }
        if envelope.id.timestamp_millis < self.oracle.chain_inception_millis().await? {
            return Ok(ValidationResult::invalid(
                ValidationError::ImpossibleBlockDeclaration,
            ));
        }

        let canonical = width_hash(&envelope.canonical_bytes(), HashBits::B512);
        if canonical.as_slice() != envelope.declared_hash.as_slice() {
            debug!(id = %envelope.id, "transaction hash mismatch");
            return Ok(ValidationResult::invalid(ValidationError::HashInvalid));
        }

        if is_presentation {
            let AccountSignature::Presentation { pow_nonce, .. } = &envelope.signature else {
                return Ok(ValidationResult::invalid(ValidationError::KeyTypeMismatch));
            };
            let digest = pow_digest(&envelope.declared_hash, *pow_nonce);
            if !meets_difficulty(&digest, self.config.pow.difficulty_bits) {
                return Ok(ValidationResult::invalid(ValidationError::PowInvalid));
            }
        }

        match &envelope.signature {
            AccountSignature::Joint { signatures } => {
                self.validate_joint(envelope, signatures, &canonical).await
            }
            AccountSignature::Presentation { .. } => Ok(self.signatures.verify_account_signature(
                &canonical,
                HashBits::B512,
                &envelope.signature,
                None,
            )),
            single => {
                let Some(address) = single.primary_address().cloned() else {
                    return Ok(ValidationResult::invalid(ValidationError::InvalidKeyType));
                };
                let embedded = match single {
                    AccountSignature::Published(sig) => sig.embedded_key.as_ref(),
                    _ => None,
                };
                self.resolve_and_verify_single(
                    &canonical,
                    HashBits::B512,
                    single,
                    &address,
                    embedded,
                )
                .await
            }
        }
    }

    /// Joint branch: shape and membership first, then each signer against a
    /// per-signer hash. Non-emitters sign a hash binding their own key-use
    /// index.
    async fn validate_joint(
        &self,
        envelope: &TransactionEnvelope,
        signatures: &[PublishedSignature],
        base_hash: &[u8],
    ) -> Result<ValidationResult, ValidationFatal> {
        if signatures.is_empty() {
            return Ok(ValidationResult::invalid(
                ValidationError::JointSignerCountInvalid,
            ));
        }

        let signer_set = match self.joint_directory.members(envelope.id.account).await? {
            Some(members) => SignerSet::from_members(&members),
            // Unpublished joint account: the signature set defines itself.
            None => SignerSet::from_signatures(signatures),
        };

        let shape = joint_shape_errors(&envelope.kind, signatures, &signer_set);
        if !shape.is_empty() {
            return Ok(ValidationResult::invalid_all(shape));
        }

        let emitter = envelope.id.account;
        let mut provisional = false;
        for signature in signatures {
            let signer_hash = if signature.address.account == emitter {
                base_hash.to_vec()
            } else {
                cosigner_hash(base_hash, signature)
            };
            let as_single = AccountSignature::Published(signature.clone());
            let result = self
                .resolve_and_verify_single(
                    &signer_hash,
                    HashBits::B512,
                    &as_single,
                    &signature.address,
                    signature.embedded_key.as_ref(),
                )
                .await?;
            match result.outcome {
                ValidationOutcome::Valid => {}
                ValidationOutcome::EmbeddedKeyValid => provisional = true,
                _ => return Ok(result),
            }
        }

        Ok(if provisional {
            ValidationResult::embedded_key_valid()
        } else {
            ValidationResult::valid()
        })
    }
}
