//! # Validation Results
//!
//! The per-envelope outcome type every validator produces. An envelope being
//! bad is data, not an error: validators return `ValidationResult` and reserve
//! `Err` for conditions that make the node's own state unsafe to proceed
//! (see `errors.rs`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal outcome of validating one envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationOutcome {
    /// Every check passed against authoritative chain state.
    Valid,
    /// At least one check failed; see the error codes.
    Invalid,
    /// Provisional pass: the signature verified against the key embedded in
    /// the envelope because the node is desynced and cannot resolve the real
    /// key. Good enough to relay gossip, never a terminal trust decision.
    EmbeddedKeyValid,
    /// The node lacks the chain state needed to decide either way.
    CantValidate,
}

/// Specific reason an envelope failed a check.
///
/// Closed set; codes are ordered by check category (structural, signature,
/// policy, digest) to keep reporting stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationError {
    // Structural
    InvalidBytes,
    HashInvalid,
    EnvelopeExpired,
    FutureTimestamp,
    EmptyTransactionId,

    // Signature
    SignatureFailed,
    KeyTypeMismatch,
    BitSizeMismatch,
    PromiseMismatch,
    InvalidKeyType,
    EnvelopeEmbeddedPublicKeyInvalid,

    // Policy
    KeyNotYetSynced,
    KeyIndexAlreadyConsumed,
    ImpossibleBlockDeclaration,
    PreviousBlockUnavailable,
    GossipPresentationDisallowed,
    MobileCannotValidate,
    PowInvalid,
    JointSignerCountInvalid,
    JointSignerNotPermitted,
    JointRequiredSignerMissing,

    // Digest
    InvalidDigestDescriptorHash,
    InvalidDigestHash,
    InvalidDigestKeyRole,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::InvalidBytes => "envelope bytes did not rehydrate",
            Self::HashInvalid => "declared hash does not match recomputed hash",
            Self::EnvelopeExpired => "envelope expiration has elapsed",
            Self::FutureTimestamp => "envelope is dated in the future",
            Self::EmptyTransactionId => "transaction id is a placeholder",
            Self::SignatureFailed => "signature did not verify",
            Self::KeyTypeMismatch => "signature shape does not match key variant",
            Self::BitSizeMismatch => "declared hash width does not match key parameters",
            Self::PromiseMismatch => "revealed key does not match its commitment",
            Self::InvalidKeyType => "unknown key/signature combination",
            Self::EnvelopeEmbeddedPublicKeyInvalid => {
                "embedded public key differs from the on-record key"
            }
            Self::KeyNotYetSynced => "key announcement height is beyond this node's horizon",
            Self::KeyIndexAlreadyConsumed => {
                "key use index was already consumed by a confirmed transaction"
            }
            Self::ImpossibleBlockDeclaration => "declared block id cannot exist",
            Self::PreviousBlockUnavailable => "previous block is not available at this height",
            Self::GossipPresentationDisallowed => {
                "presentation envelopes are not accepted from gossip"
            }
            Self::MobileCannotValidate => "reduced profile cannot validate this envelope",
            Self::PowInvalid => "proof of work does not meet the difficulty target",
            Self::JointSignerCountInvalid => "joint signature has the wrong number of signers",
            Self::JointSignerNotPermitted => "joint signature includes a non-member signer",
            Self::JointRequiredSignerMissing => "joint signature is missing a required signer",
            Self::InvalidDigestDescriptorHash => "digest descriptor node hash mismatch",
            Self::InvalidDigestHash => "digest hash does not match its recomputed value",
            Self::InvalidDigestKeyRole => "digest signing key is not an allowed moderator role",
        };
        f.write_str(text)
    }
}

/// Outcome plus the ordered list of error codes that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub outcome: ValidationOutcome,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            outcome: ValidationOutcome::Valid,
            errors: Vec::new(),
        }
    }

    pub fn invalid(error: ValidationError) -> Self {
        Self {
            outcome: ValidationOutcome::Invalid,
            errors: vec![error],
        }
    }

    pub fn invalid_all(errors: Vec<ValidationError>) -> Self {
        Self {
            outcome: ValidationOutcome::Invalid,
            errors,
        }
    }

    pub fn embedded_key_valid() -> Self {
        Self {
            outcome: ValidationOutcome::EmbeddedKeyValid,
            errors: Vec::new(),
        }
    }

    pub fn cant_validate(error: ValidationError) -> Self {
        Self {
            outcome: ValidationOutcome::CantValidate,
            errors: vec![error],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.outcome == ValidationOutcome::Valid
    }

    /// Valid or the provisional embedded-key pass; what gossip relay accepts.
    pub fn is_relayable(&self) -> bool {
        matches!(
            self.outcome,
            ValidationOutcome::Valid | ValidationOutcome::EmbeddedKeyValid
        )
    }

    pub fn first_error(&self) -> Option<ValidationError> {
        self.errors.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_result_has_no_errors() {
        let result = ValidationResult::valid();
        assert!(result.is_valid());
        assert!(result.is_relayable());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn invalid_result_carries_code() {
        let result = ValidationResult::invalid(ValidationError::HashInvalid);
        assert!(!result.is_valid());
        assert_eq!(result.first_error(), Some(ValidationError::HashInvalid));
    }

    #[test]
    fn embedded_key_valid_is_relayable_but_not_valid() {
        let result = ValidationResult::embedded_key_valid();
        assert!(!result.is_valid());
        assert!(result.is_relayable());
    }

    #[test]
    fn cant_validate_is_not_relayable() {
        let result = ValidationResult::cant_validate(ValidationError::KeyNotYetSynced);
        assert!(!result.is_relayable());
        assert_eq!(result.outcome, ValidationOutcome::CantValidate);
    }

    #[test]
    fn error_codes_have_distinct_display() {
        let a = ValidationError::SignatureFailed.to_string();
        let b = ValidationError::EnvelopeEmbeddedPublicKeyInvalid.to_string();
        assert_ne!(a, b);
    }
}
