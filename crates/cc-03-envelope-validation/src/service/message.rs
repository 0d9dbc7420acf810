//! # Message Validator
//!
//! Structurally the transaction single-signature path, restricted to the
//! message-key ordinal and the message hash width.

use super::EnvelopeValidationService;
use shared_crypto::width_hash;
use shared_types::{
    AccountSignature, HashBits, KeyOrdinal, MessageEnvelope, ValidationError, ValidationFatal,
    ValidationResult,
};

impl EnvelopeValidationService {
    pub(crate) async fn validate_message_impl(
        &self,
        envelope: &MessageEnvelope,
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

        if envelope.id.timestamp_millis >= now_millis {
            return Ok(ValidationResult::invalid(ValidationError::FutureTimestamp));
        }

        let canonical = width_hash(&envelope.canonical_bytes(), HashBits::B256);
        if canonical.as_slice() != envelope.declared_hash.as_slice() {
            return Ok(ValidationResult::invalid(ValidationError::HashInvalid));
        }

        // Messages are signed with the message key, nothing else.
        let AccountSignature::Published(signature) = &envelope.signature else {
            return Ok(ValidationResult::invalid(ValidationError::KeyTypeMismatch));
        };
        if signature.address.ordinal != KeyOrdinal::Message {
            return Ok(ValidationResult::invalid(ValidationError::KeyTypeMismatch));
        }

        self.resolve_and_verify_single(
            &canonical,
            HashBits::B256,
            &envelope.signature,
            &signature.address,
            signature.embedded_key.as_ref(),
        )
        .await
    }
}
