//! Rotation and swap flows: threshold crossings feeding the rotation
//! workflow, and a staged key taking over without ever reusing an index.

use super::{attach_signature, small_specs, stack, unsigned_transaction, NOW};
use cc_01_signature_verification::StaticSchemeRegistry;
use cc_02_key_lifecycle::adapters::memory::{
    ChannelRotationWorkflow, InMemoryWalletStore, StaticIndexOracle,
};
use cc_02_key_lifecycle::{
    KeyLifecycleApi, KeyLifecycleService, RotationUrgency, SignOptions,
};
use cc_03_envelope_validation::{EnvelopeOrigin, EnvelopeValidationApi};
use shared_crypto::sha3_512;
use shared_types::{AccountId, KeyOrdinal};

#[tokio::test]
async fn threshold_crossings_reach_the_rotation_worker() -> anyhow::Result<()> {
    crate::init_tracing();
    let (workflow, mut receiver) = ChannelRotationWorkflow::new();
    let lifecycle = KeyLifecycleService::new(
        InMemoryWalletStore::new(),
        StaticIndexOracle::new(),
        workflow,
        StaticSchemeRegistry::reference(),
        small_specs(),
    );
    let account = AccountId::standard(10);
    lifecycle
        .generate_key(account, KeyOrdinal::Transaction)
        .await?;

    // 8 leaves: warning at 5, change at 7.
    let options = SignOptions {
        allow_past_change: true,
    };
    for round in 0..8u8 {
        lifecycle
            .sign(account, KeyOrdinal::Transaction, &sha3_512(&[round]), options)
            .await?;
    }

    let mut advisories = 0;
    let mut urgents = 0;
    while let Ok(request) = receiver.try_recv() {
        assert_eq!(request.account, account);
        match request.urgency {
            RotationUrgency::Advisory => advisories += 1,
            RotationUrgency::Urgent => urgents += 1,
        }
    }
    assert!(advisories > 0, "warning crossing must request rotation");
    assert!(urgents > 0, "change crossing must request urgent rotation");
    Ok(())
}

#[tokio::test]
async fn swapped_key_signs_under_a_new_sequence_and_validates() -> anyhow::Result<()> {
    let stack = stack();
    let account = AccountId::standard(11);

    let first_public = stack
        .lifecycle
        .generate_key(account, KeyOrdinal::Transaction)
        .await?;
    stack
        .resolver
        .insert(account, KeyOrdinal::Transaction, first_public);

    // Consume one leaf under sequence 1.
    let (_, canonical) = unsigned_transaction(account, vec![1]);
    let first = stack
        .lifecycle
        .sign(account, KeyOrdinal::Transaction, &canonical, SignOptions::default())
        .await?;
    assert_eq!(first.index_set.sequence, 1);
    stack
        .lifecycle
        .record_confirmed(account, KeyOrdinal::Transaction, first.index_set)?;

    // Stage and promote the replacement.
    let next_public = stack
        .lifecycle
        .stage_next_key(account, KeyOrdinal::Transaction)
        .await?;
    stack
        .lifecycle
        .swap_next_key(account, KeyOrdinal::Transaction)
        .await?;
    stack
        .resolver
        .insert(account, KeyOrdinal::Transaction, next_public);

    // The promoted key starts a fresh sequence at index zero, which is
    // strictly above everything the old sequence consumed.
    let (mut envelope, canonical) = unsigned_transaction(account, vec![2]);
    let second = stack
        .lifecycle
        .sign(account, KeyOrdinal::Transaction, &canonical, SignOptions::default())
        .await?;
    assert_eq!(second.index_set.sequence, 2);
    assert_eq!(second.index_set.index, 0);
    assert!(second.index_set > first.index_set);

    attach_signature(&mut envelope, account, second.index_set, second.signature);
    let result = stack
        .validation
        .validate_transaction(&envelope, EnvelopeOrigin::Gossip, NOW)
        .await?;
    assert!(result.is_valid(), "unexpected: {:?}", result);
    Ok(())
}
