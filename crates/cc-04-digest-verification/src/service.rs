//! # Digest Validation Service
//!
//! Order of checks: the signing key's role must be allow-listed before the
//! signature is even considered, then the hash tree, then the optional
//! online reference, then the signature itself.

use crate::domain::descriptor::DigestEnvelope;
use crate::domain::tree::{signing_hash, verify_tree, DigestNode};
use crate::ports::inbound::DigestValidationApi;
use crate::ports::outbound::{DigestReferenceFetch, ModeratorKeyDirectory};
use async_trait::async_trait;
use cc_01_signature_verification::SignatureVerificationApi;
use shared_types::{
    HashBits, KeyOrdinal, ValidationError, ValidationFatal, ValidationResult,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct DigestValidationConfig {
    /// Key roles allowed to sign digests.
    pub allowed_roles: HashSet<KeyOrdinal>,
    /// Recompute file hashes from their parts, or trust the stored file
    /// hashes.
    pub reverify_files: bool,
    /// Skip the online reference-hash comparison.
    pub skip_reference_checks: bool,
}

impl Default for DigestValidationConfig {
    fn default() -> Self {
        Self {
            allowed_roles: [KeyOrdinal::Moderator, KeyOrdinal::Super].into_iter().collect(),
            reverify_files: true,
            skip_reference_checks: false,
        }
    }
}

pub struct DigestValidationService {
    signatures: Arc<dyn SignatureVerificationApi>,
    keys: Arc<dyn ModeratorKeyDirectory>,
    reference: Arc<dyn DigestReferenceFetch>,
    config: DigestValidationConfig,
}

impl DigestValidationService {
    pub fn new(
        signatures: Arc<dyn SignatureVerificationApi>,
        keys: Arc<dyn ModeratorKeyDirectory>,
        reference: Arc<dyn DigestReferenceFetch>,
        config: DigestValidationConfig,
    ) -> Self {
        Self {
            signatures,
            keys,
            reference,
            config,
        }
    }
}

#[async_trait]
impl DigestValidationApi for DigestValidationService {
    async fn validate_digest(
        &self,
        envelope: &DigestEnvelope,
    ) -> Result<ValidationResult, ValidationFatal> {
        let address = &envelope.signature.address;

        // Role gate first: a digest signed by a non-moderator key is not
        // worth hashing.
        if !address.account.is_moderator() || !self.config.allowed_roles.contains(&address.ordinal)
        {
            debug!(account = %address.account, ordinal = %address.ordinal, "digest key role rejected");
            return Ok(ValidationResult::invalid(
                ValidationError::InvalidDigestKeyRole,
            ));
        }

        if let Err(node) = verify_tree(&envelope.descriptor, self.config.reverify_files) {
            warn!(digest = envelope.descriptor.id, ?node, "digest hash tree mismatch");
            let code = if node.is_root() {
                ValidationError::InvalidDigestHash
            } else {
                ValidationError::InvalidDigestDescriptorHash
            };
            return Ok(ValidationResult::invalid(code));
        }

        if !self.config.skip_reference_checks {
            if let Some(published) = self.reference.digest_hash(envelope.descriptor.id).await? {
                if published != envelope.descriptor.hash {
                    warn!(digest = envelope.descriptor.id, "digest hash differs from the published reference");
                    return Ok(ValidationResult::invalid(ValidationError::InvalidDigestHash));
                }
            }
        }

        let key = self
            .keys
            .moderator_key(address.ordinal, address.index_set.sequence)
            .await?;
        let Some(key) = key else {
            return Ok(ValidationResult::cant_validate(
                ValidationError::KeyNotYetSynced,
            ));
        };

        let message = signing_hash(&envelope.descriptor.hash);
        Ok(self.signatures.verify_bare_signature(
            &message,
            HashBits::B512,
            &envelope.signature.bytes,
            &key,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::descriptor::{
        ChannelDescriptor, DigestDescriptor, FileDescriptor, FilePartDescriptor, IndexDescriptor,
    };
    use crate::domain::tree::rebuild_hashes;
    use async_trait::async_trait;
    use cc_01_signature_verification::test_utils::{key_address, TreeSigner};
    use cc_01_signature_verification::{SignatureVerificationService, StaticSchemeRegistry};
    use parking_lot::RwLock;
    use shared_crypto::sha2_512;
    use shared_types::{
        AccountId, CryptographicKey, DualHash, PublishedSignature, ThreadParallelism,
        ValidationOutcome,
    };
    use std::collections::HashMap;

    #[derive(Default)]
    struct TestKeys {
        keys: RwLock<HashMap<(KeyOrdinal, u32), CryptographicKey>>,
    }

    #[async_trait]
    impl ModeratorKeyDirectory for TestKeys {
        async fn moderator_key(
            &self,
            ordinal: KeyOrdinal,
            key_sequence: u32,
        ) -> Result<Option<CryptographicKey>, ValidationFatal> {
            Ok(self.keys.read().get(&(ordinal, key_sequence)).cloned())
        }
    }

    #[derive(Default)]
    struct TestReference {
        hash: RwLock<Option<DualHash>>,
    }

    #[async_trait]
    impl DigestReferenceFetch for TestReference {
        async fn digest_hash(&self, _digest_id: u32) -> Result<Option<DualHash>, ValidationFatal> {
            Ok(*self.hash.read())
        }
    }

    fn sample_descriptor() -> DigestDescriptor {
        let parts = (0..3u32)
            .map(|part| FilePartDescriptor {
                ordinal: part,
                hash: sha2_512(&part.to_be_bytes()),
            })
            .collect();
        rebuild_hashes(
            DigestDescriptor {
                id: 3,
                hash: DualHash::ZERO,
                channels: vec![ChannelDescriptor {
                    ordinal: 0,
                    hash: [0u8; 64],
                    indices: vec![IndexDescriptor {
                        ordinal: 0,
                        hash: [0u8; 64],
                        files: vec![FileDescriptor {
                            ordinal: 0,
                            hash: [0u8; 64],
                            parts,
                        }],
                    }],
                }],
            },
            true,
        )
    }

    struct Fixture {
        service: DigestValidationService,
        keys: Arc<TestKeys>,
        reference: Arc<TestReference>,
    }

    fn fixture(config: DigestValidationConfig) -> Fixture {
        let keys = Arc::new(TestKeys::default());
        let reference = Arc::new(TestReference::default());
        let signatures = Arc::new(SignatureVerificationService::with_parallelism(
            StaticSchemeRegistry::reference(),
            ThreadParallelism::Single,
        ));
        let service = DigestValidationService::new(
            signatures,
            keys.clone(),
            reference.clone(),
            config,
        );
        Fixture {
            service,
            keys,
            reference,
        }
    }

    fn signed_digest(label: &str) -> (DigestEnvelope, TreeSigner) {
        let descriptor = sample_descriptor();
        let mut signer = TreeSigner::new(label, 2, shared_types::HashBits::B512);
        let message = signing_hash(&descriptor.hash);
        let address = key_address(AccountId::moderator(1), KeyOrdinal::Moderator, 1, 0);
        let bytes = signer.sign(&message);
        (
            DigestEnvelope {
                descriptor,
                signature: PublishedSignature {
                    address,
                    embedded_key: None,
                    bytes,
                },
            },
            signer,
        )
    }

    #[tokio::test]
    async fn valid_digest_passes() {
        let f = fixture(DigestValidationConfig::default());
        let (envelope, signer) = signed_digest("digest-ok");
        f.keys
            .keys
            .write()
            .insert((KeyOrdinal::Moderator, 1), signer.xmss_key());

        let result = f.service.validate_digest(&envelope).await.unwrap();
        assert!(result.is_valid(), "unexpected: {:?}", result);
    }

    #[tokio::test]
    async fn non_moderator_role_is_rejected_before_hashing() {
        let f = fixture(DigestValidationConfig::default());
        let (mut envelope, _) = signed_digest("digest-role");
        envelope.signature.address = key_address(
            AccountId::standard(9),
            KeyOrdinal::Transaction,
            1,
            0,
        );

        let result = f.service.validate_digest(&envelope).await.unwrap();
        assert_eq!(
            result.first_error(),
            Some(ValidationError::InvalidDigestKeyRole)
        );
    }

    #[tokio::test]
    async fn descriptor_tamper_is_a_descriptor_failure() {
        let f = fixture(DigestValidationConfig::default());
        let (mut envelope, signer) = signed_digest("digest-tamper");
        f.keys
            .keys
            .write()
            .insert((KeyOrdinal::Moderator, 1), signer.xmss_key());
        envelope.descriptor.channels[0].indices[0].files[0].parts[0].hash =
            sha2_512(b"substituted");

        let result = f.service.validate_digest(&envelope).await.unwrap();
        assert_eq!(
            result.first_error(),
            Some(ValidationError::InvalidDigestDescriptorHash)
        );
    }

    #[tokio::test]
    async fn reference_divergence_rejects() {
        let f = fixture(DigestValidationConfig::default());
        let (envelope, signer) = signed_digest("digest-reference");
        f.keys
            .keys
            .write()
            .insert((KeyOrdinal::Moderator, 1), signer.xmss_key());
        let mut wrong = envelope.descriptor.hash;
        wrong.sha2[0] ^= 1;
        *f.reference.hash.write() = Some(wrong);

        let result = f.service.validate_digest(&envelope).await.unwrap();
        assert_eq!(
            result.first_error(),
            Some(ValidationError::InvalidDigestHash)
        );
    }

    #[tokio::test]
    async fn missing_moderator_key_cant_validate() {
        let f = fixture(DigestValidationConfig::default());
        let (envelope, _) = signed_digest("digest-nokey");

        let result = f.service.validate_digest(&envelope).await.unwrap();
        assert_eq!(result.outcome, ValidationOutcome::CantValidate);
    }

    #[tokio::test]
    async fn tampered_signature_fails() {
        let f = fixture(DigestValidationConfig::default());
        let (mut envelope, signer) = signed_digest("digest-badsig");
        f.keys
            .keys
            .write()
            .insert((KeyOrdinal::Moderator, 1), signer.xmss_key());
        envelope.signature.bytes.clear();

        let result = f.service.validate_digest(&envelope).await.unwrap();
        assert_eq!(result.first_error(), Some(ValidationError::SignatureFailed));
    }
}
