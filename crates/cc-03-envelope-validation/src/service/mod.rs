//! # Envelope Validation Service
//!
//! The orchestrator: holds the ports, the configuration, and the common
//! key-resolution flow. Envelope-kind validators live in sibling modules
//! (`transaction`, `message`, `block`).

mod block;
mod message;
mod transaction;

use crate::domain::fast_key::{in_desync_window, reconcile_fast_key, FastResolution};
use crate::domain::height_lock::HeightLock;
use crate::domain::pow::PowConfig;
use crate::ports::inbound::{EnvelopeOrigin, EnvelopeValidationApi};
use crate::ports::outbound::{
    ChainStateOracle, FastKeyIndex, JointAccountDirectory, KeyResolver, ReferenceHashFetch,
    RehydrationFactory,
};
use async_trait::async_trait;
use cc_01_signature_verification::SignatureVerificationApi;
use cc_02_key_lifecycle::KeyGateRegistry;
use shared_types::{
    AccountSignature, BlockEnvelope, CryptographicKey, GossipPresentationPolicy, HashBits,
    KeyAddress, KeyOrdinal, MessageEnvelope, TransactionEnvelope, ValidationError,
    ValidationFatal, ValidationResult,
};
use std::collections::HashSet;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::debug;

/// Validator configuration, passed at construction. No ambient flags.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    pub gossip_presentation: GossipPresentationPolicy,
    /// Ordinals the fast-key index may answer for; empty disables the path.
    pub fast_key_ordinals: HashSet<KeyOrdinal>,
    /// Reduced profile: gossip relay only, block validation unavailable.
    pub reduced_profile: bool,
    /// Skip the optional external reference-hash checks.
    pub skip_reference_checks: bool,
    pub pow: PowConfig,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            gossip_presentation: GossipPresentationPolicy::Allow,
            fast_key_ordinals: [KeyOrdinal::Transaction, KeyOrdinal::Message]
                .into_iter()
                .collect(),
            reduced_profile: false,
            skip_reference_checks: false,
            pow: PowConfig::default(),
        }
    }
}

pub struct EnvelopeValidationService {
    pub(crate) signatures: Arc<dyn SignatureVerificationApi>,
    pub(crate) oracle: Arc<dyn ChainStateOracle>,
    pub(crate) fast_index: Arc<dyn FastKeyIndex>,
    pub(crate) resolver: Arc<dyn KeyResolver>,
    pub(crate) reference: Arc<dyn ReferenceHashFetch>,
    pub(crate) joint_directory: Arc<dyn JointAccountDirectory>,
    pub(crate) rehydrator: Arc<dyn RehydrationFactory>,
    /// Read-only consult of confirmed key consumptions, when wired.
    pub(crate) gates: Option<Arc<KeyGateRegistry>>,
    pub(crate) height_lock: HeightLock,
    pub(crate) config: ValidationConfig,
}

impl EnvelopeValidationService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        signatures: Arc<dyn SignatureVerificationApi>,
        oracle: Arc<dyn ChainStateOracle>,
        fast_index: Arc<dyn FastKeyIndex>,
        resolver: Arc<dyn KeyResolver>,
        reference: Arc<dyn ReferenceHashFetch>,
        joint_directory: Arc<dyn JointAccountDirectory>,
        rehydrator: Arc<dyn RehydrationFactory>,
        gates: Option<Arc<KeyGateRegistry>>,
        config: ValidationConfig,
    ) -> Self {
        Self {
            signatures,
            oracle,
            fast_index,
            resolver,
            reference,
            joint_directory,
            rehydrator,
            gates,
            height_lock: HeightLock::new(),
            config,
        }
    }

    /// Resolve the signer's key (fast path first, else full load) and
    /// dispatch the signature, honoring the desync fallback and the
    /// beyond-horizon rejection.
    pub(crate) async fn resolve_and_verify_single(
        &self,
        message_hash: &[u8],
        hash_bits: HashBits,
        signature: &AccountSignature,
        address: &KeyAddress,
        embedded: Option<&CryptographicKey>,
    ) -> Result<ValidationResult, ValidationFatal> {
        let sync = self.oracle.sync_status().await?;

        // A key announced beyond public knowledge cannot exist anywhere.
        if address.announcement_height > sync.public_height {
            return Ok(ValidationResult::cant_validate(
                ValidationError::KeyNotYetSynced,
            ));
        }

        if let Some(gates) = &self.gates {
            if gates.is_consumed(address.account, address.ordinal, address.index_set) {
                return Ok(ValidationResult::invalid(
                    ValidationError::KeyIndexAlreadyConsumed,
                ));
            }
        }

        let fast_enabled = self.config.fast_key_ordinals.contains(&address.ordinal);
        let indexed = if fast_enabled {
            self.fast_index
                .load_key_bytes(address.account, address.ordinal)
                .await?
        } else {
            None
        };

        match reconcile_fast_key(
            fast_enabled,
            indexed.as_deref(),
            embedded,
            address.announcement_height,
            &sync,
        ) {
            FastResolution::EmbeddedMismatch => Ok(ValidationResult::invalid(
                ValidationError::EnvelopeEmbeddedPublicKeyInvalid,
            )),
            FastResolution::DesyncFallback => {
                Ok(self.verify_embedded_provisional(message_hash, hash_bits, signature, embedded))
            }
            FastResolution::Resolved(key) => Ok(self.signatures.verify_account_signature(
                message_hash,
                hash_bits,
                signature,
                Some(&key),
            )),
            FastResolution::NoResult => {
                self.resolve_full(message_hash, hash_bits, signature, address, embedded, &sync)
                    .await
            }
        }
    }

    async fn resolve_full(
        &self,
        message_hash: &[u8],
        hash_bits: HashBits,
        signature: &AccountSignature,
        address: &KeyAddress,
        embedded: Option<&CryptographicKey>,
        sync: &shared_types::NodeSyncStatus,
    ) -> Result<ValidationResult, ValidationFatal> {
        match self.resolver.resolve_key(address).await? {
            Some(key) => {
                if let Some(embedded) = embedded {
                    if !keys_equal(embedded, &key) {
                        return Ok(ValidationResult::invalid(
                            ValidationError::EnvelopeEmbeddedPublicKeyInvalid,
                        ));
                    }
                }
                Ok(self.signatures.verify_account_signature(
                    message_hash,
                    hash_bits,
                    signature,
                    Some(&key),
                ))
            }
            None => {
                if embedded.is_some() && in_desync_window(address.announcement_height, sync) {
                    return Ok(self.verify_embedded_provisional(
                        message_hash,
                        hash_bits,
                        signature,
                        embedded,
                    ));
                }
                if address.announcement_height > sync.disk_height {
                    debug!(account = %address.account, "key announced past our disk height");
                    return Ok(ValidationResult::cant_validate(
                        ValidationError::KeyNotYetSynced,
                    ));
                }
                Ok(ValidationResult::invalid(ValidationError::InvalidKeyType))
            }
        }
    }

    /// Verify against the embedded key and weaken a pass to the provisional
    /// outcome. Never a terminal trust decision.
    fn verify_embedded_provisional(
        &self,
        message_hash: &[u8],
        hash_bits: HashBits,
        signature: &AccountSignature,
        embedded: Option<&CryptographicKey>,
    ) -> ValidationResult {
        let result =
            self.signatures
                .verify_account_signature(message_hash, hash_bits, signature, embedded);
        if result.is_valid() {
            ValidationResult::embedded_key_valid()
        } else {
            result
        }
    }
}

/// Constant-time equality of two keys' canonical encodings.
pub(crate) fn keys_equal(a: &CryptographicKey, b: &CryptographicKey) -> bool {
    match (bincode::serialize(a), bincode::serialize(b)) {
        (Ok(a), Ok(b)) => a.len() == b.len() && a.ct_eq(&b).unwrap_u8() == 1,
        _ => false,
    }
}

#[async_trait]
impl EnvelopeValidationApi for EnvelopeValidationService {
    async fn validate_transaction_bytes(
        &self,
        bytes: &[u8],
        origin: EnvelopeOrigin,
        now_millis: u64,
    ) -> Result<ValidationResult, ValidationFatal> {
        let envelope = match self.rehydrator.transaction(bytes) {
            Ok(envelope) => envelope,
            Err(error) if error.must_propagate() => return Err(error.into()),
            Err(error) => {
                debug!(%error, "transaction bytes failed to rehydrate");
                return Ok(ValidationResult::invalid(ValidationError::InvalidBytes));
            }
        };
        self.validate_transaction_impl(&envelope, origin, now_millis)
            .await
    }

    async fn validate_transaction(
        &self,
        envelope: &TransactionEnvelope,
        origin: EnvelopeOrigin,
        now_millis: u64,
    ) -> Result<ValidationResult, ValidationFatal> {
        self.validate_transaction_impl(envelope, origin, now_millis)
            .await
    }

    async fn validate_transactions(
        &self,
        envelopes: &[TransactionEnvelope],
        origin: EnvelopeOrigin,
        now_millis: u64,
    ) -> Result<Vec<ValidationResult>, ValidationFatal> {
        // Envelopes are independent; validate them concurrently.
        let futures = envelopes
            .iter()
            .map(|envelope| self.validate_transaction_impl(envelope, origin, now_millis));
        futures::future::join_all(futures)
            .await
            .into_iter()
            .collect()
    }

    async fn validate_message(
        &self,
        envelope: &MessageEnvelope,
        now_millis: u64,
    ) -> Result<ValidationResult, ValidationFatal> {
        self.validate_message_impl(envelope, now_millis).await
    }

    async fn validate_block(
        &self,
        envelope: &BlockEnvelope,
        now_millis: u64,
    ) -> Result<ValidationResult, ValidationFatal> {
        self.validate_block_impl(envelope, now_millis).await
    }
}
