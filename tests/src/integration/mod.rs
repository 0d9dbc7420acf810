//! Cross-subsystem scenarios. The harness wires a real lifecycle manager,
//! the signature dispatcher, and the envelope validators over in-memory
//! adapters, sharing one gate registry the way a node does.

mod digest;
mod flows;
mod rotation;

use cc_01_signature_verification::{SignatureVerificationService, StaticSchemeRegistry};
use cc_02_key_lifecycle::adapters::memory::{
    InMemoryWalletStore, RecordingRotationWorkflow, StaticIndexOracle,
};
use cc_02_key_lifecycle::{KeyGenerationSpec, KeyLifecycleConfig, KeyLifecycleService};
use cc_03_envelope_validation::adapters::memory::{
    InMemoryFastKeyIndex, StaticChainOracle, StaticJointDirectory, StaticKeyResolver,
    StaticReferenceHashes,
};
use cc_03_envelope_validation::adapters::rehydration::BincodeRehydrator;
use cc_03_envelope_validation::{EnvelopeValidationService, ValidationConfig};
use shared_crypto::width_hash;
use shared_types::{
    AccountId, AccountSignature, HashBits, KeyAddress, KeyOrdinal, KeyUseIndexSet,
    NodeSyncStatus, PublishedSignature, ThreadParallelism, TransactionEnvelope, TransactionId,
    TransactionKind,
};
use std::sync::Arc;

pub const NOW: u64 = 1_700_000_000_000;

pub type TestLifecycle = KeyLifecycleService<
    InMemoryWalletStore,
    StaticIndexOracle,
    RecordingRotationWorkflow,
    StaticSchemeRegistry,
>;

pub struct Stack {
    pub lifecycle: TestLifecycle,
    pub validation: EnvelopeValidationService,
    pub resolver: Arc<StaticKeyResolver>,
    pub fast_index: Arc<InMemoryFastKeyIndex>,
    pub oracle: Arc<StaticChainOracle>,
}

/// Small trees so exhaustion and rotation are reachable in a test run.
pub fn small_specs() -> KeyLifecycleConfig {
    let mut config = KeyLifecycleConfig::default();
    let spec = KeyGenerationSpec {
        tree_height: 3,
        tree_layers: 1,
        hash_bits: HashBits::B512,
        backup_hash_bits: HashBits::B256,
        seed_bytes: 64,
    };
    for ordinal in [
        KeyOrdinal::Transaction,
        KeyOrdinal::Message,
        KeyOrdinal::Change,
        KeyOrdinal::Super,
        KeyOrdinal::Validator,
        KeyOrdinal::Moderator,
    ] {
        config.spec_overrides.insert(ordinal, spec);
    }
    config
}

pub fn stack() -> Stack {
    crate::init_tracing();

    let lifecycle = KeyLifecycleService::new(
        InMemoryWalletStore::new(),
        StaticIndexOracle::new(),
        RecordingRotationWorkflow::new(),
        StaticSchemeRegistry::reference(),
        small_specs(),
    );

    let oracle = Arc::new(StaticChainOracle::new());
    oracle.set_status(NodeSyncStatus {
        disk_height: 100,
        public_height: 100,
        desynced: false,
        syncless_profile: false,
    });
    let resolver = Arc::new(StaticKeyResolver::new());
    let fast_index = Arc::new(InMemoryFastKeyIndex::new());
    let signatures = Arc::new(SignatureVerificationService::with_parallelism(
        StaticSchemeRegistry::reference(),
        ThreadParallelism::Single,
    ));

    let validation = EnvelopeValidationService::new(
        signatures,
        oracle.clone(),
        fast_index.clone(),
        resolver.clone(),
        Arc::new(StaticReferenceHashes::new()),
        Arc::new(StaticJointDirectory::new()),
        Arc::new(BincodeRehydrator::new()),
        Some(lifecycle.gates_handle()),
        ValidationConfig::default(),
    );

    Stack {
        lifecycle,
        validation,
        resolver,
        fast_index,
        oracle,
    }
}

/// An unsigned transaction envelope and its canonical hash.
pub fn unsigned_transaction(account: AccountId, payload: Vec<u8>) -> (TransactionEnvelope, Vec<u8>) {
    let mut envelope = TransactionEnvelope {
        id: TransactionId::new(account, NOW - 60_000),
        kind: TransactionKind::Standard,
        declared_hash: [0u8; 64],
        expiration_millis: NOW + 600_000,
        signature: AccountSignature::Joint { signatures: vec![] },
        payload,
    };
    let canonical = width_hash(&envelope.canonical_bytes(), HashBits::B512);
    envelope.declared_hash.copy_from_slice(&canonical);
    (envelope, canonical)
}

/// Attach a lifecycle-produced signature to the envelope.
pub fn attach_signature(
    envelope: &mut TransactionEnvelope,
    account: AccountId,
    index_set: KeyUseIndexSet,
    signature: Vec<u8>,
) {
    envelope.signature = AccountSignature::Published(PublishedSignature {
        address: KeyAddress {
            account,
            ordinal: KeyOrdinal::Transaction,
            announcement_height: 10,
            declaration_tx: TransactionId::new(account, 1_000),
            index_set,
        },
        embedded_key: None,
        bytes: signature,
    });
}
