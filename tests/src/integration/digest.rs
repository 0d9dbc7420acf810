//! A digest signed through the lifecycle manager with a moderator key,
//! then judged by the digest validator: the full path a published snapshot
//! takes through the trust core.

use super::small_specs;
use async_trait::async_trait;
use cc_01_signature_verification::{
    SignatureVerificationService, StaticSchemeRegistry,
};
use cc_02_key_lifecycle::adapters::memory::{
    InMemoryWalletStore, RecordingRotationWorkflow, StaticIndexOracle,
};
use cc_02_key_lifecycle::{KeyLifecycleApi, KeyLifecycleService, SignOptions};
use cc_04_digest_verification::{
    rebuild_hashes, signing_hash, ChannelDescriptor, DigestDescriptor, DigestEnvelope,
    DigestReferenceFetch, DigestValidationApi, DigestValidationConfig, DigestValidationService,
    FileDescriptor, FilePartDescriptor, IndexDescriptor, ModeratorKeyDirectory,
};
use parking_lot::RwLock;
use shared_crypto::sha2_512;
use shared_types::{
    AccountId, CryptographicKey, DualHash, KeyAddress, KeyOrdinal, TransactionId,
    ThreadParallelism, ValidationError, ValidationFatal,
};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct KeyDirectory {
    keys: RwLock<HashMap<(KeyOrdinal, u32), CryptographicKey>>,
}

#[async_trait]
impl ModeratorKeyDirectory for KeyDirectory {
    async fn moderator_key(
        &self,
        ordinal: KeyOrdinal,
        key_sequence: u32,
    ) -> Result<Option<CryptographicKey>, ValidationFatal> {
        Ok(self.keys.read().get(&(ordinal, key_sequence)).cloned())
    }
}

struct NoReference;

#[async_trait]
impl DigestReferenceFetch for NoReference {
    async fn digest_hash(&self, _digest_id: u32) -> Result<Option<DualHash>, ValidationFatal> {
        Ok(None)
    }
}

fn sample_digest(id: u32) -> DigestDescriptor {
    let parts = (0..4u32)
        .map(|part| FilePartDescriptor {
            ordinal: part,
            hash: sha2_512(format!("{id}/{part}").as_bytes()),
        })
        .collect();
    rebuild_hashes(
        DigestDescriptor {
            id,
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

#[tokio::test]
async fn lifecycle_signed_digest_validates() -> anyhow::Result<()> {
    crate::init_tracing();
    let lifecycle = KeyLifecycleService::new(
        InMemoryWalletStore::new(),
        StaticIndexOracle::new(),
        RecordingRotationWorkflow::new(),
        StaticSchemeRegistry::reference(),
        small_specs(),
    );
    let moderator = AccountId::moderator(1);
    let public = lifecycle
        .generate_key(moderator, KeyOrdinal::Moderator)
        .await?;

    let descriptor = sample_digest(5);
    let message = signing_hash(&descriptor.hash);
    let product = lifecycle
        .sign(moderator, KeyOrdinal::Moderator, &message, SignOptions::default())
        .await?;

    let directory = Arc::new(KeyDirectory::default());
    directory
        .keys
        .write()
        .insert((KeyOrdinal::Moderator, product.index_set.sequence), public);
    let signatures = Arc::new(SignatureVerificationService::with_parallelism(
        StaticSchemeRegistry::reference(),
        ThreadParallelism::Single,
    ));
    let service = DigestValidationService::new(
        signatures,
        directory.clone(),
        Arc::new(NoReference),
        DigestValidationConfig::default(),
    );

    let envelope = DigestEnvelope {
        descriptor,
        signature: shared_types::PublishedSignature {
            address: KeyAddress {
                account: moderator,
                ordinal: KeyOrdinal::Moderator,
                announcement_height: 1,
                declaration_tx: TransactionId::new(moderator, 1_000),
                index_set: product.index_set,
            },
            embedded_key: None,
            bytes: product.signature,
        },
    };

    let result = service.validate_digest(&envelope).await?;
    assert!(result.is_valid(), "unexpected: {:?}", result);

    // The same envelope with one archived slice substituted must name the
    // descriptor, not the signature.
    let mut tampered = envelope.clone();
    tampered.descriptor.channels[0].indices[0].files[0].parts[0].hash = sha2_512(b"swapped");
    let result = service.validate_digest(&tampered).await?;
    assert_eq!(
        result.first_error(),
        Some(ValidationError::InvalidDigestDescriptorHash)
    );
    Ok(())
}
