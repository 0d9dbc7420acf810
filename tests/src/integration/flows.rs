//! The main loop of the trust core: the lifecycle manager signs, the
//! validators judge, the gate keeps both sides from ever reusing a leaf.

use super::{attach_signature, stack, unsigned_transaction, NOW};
use cc_02_key_lifecycle::{KeyLifecycleApi, SignOptions};
use cc_03_envelope_validation::{EnvelopeOrigin, EnvelopeValidationApi};
use shared_types::{AccountId, KeyOrdinal, LifecycleError, ValidationError};

#[tokio::test]
async fn signed_envelope_validates_and_gates_block_replay() -> anyhow::Result<()> {
    let stack = stack();
    let account = AccountId::standard(1);

    let public = stack
        .lifecycle
        .generate_key(account, KeyOrdinal::Transaction)
        .await?;
    stack
        .resolver
        .insert(account, KeyOrdinal::Transaction, public.clone());
    stack
        .fast_index
        .index_key(account, KeyOrdinal::Transaction, &public);

    // Sign through the lifecycle manager and wrap the result.
    let (mut envelope, canonical) = unsigned_transaction(account, vec![1, 2, 3]);
    let product = stack
        .lifecycle
        .sign(account, KeyOrdinal::Transaction, &canonical, SignOptions::default())
        .await?;
    attach_signature(&mut envelope, account, product.index_set, product.signature);

    let result = stack
        .validation
        .validate_transaction(&envelope, EnvelopeOrigin::Gossip, NOW)
        .await?;
    assert!(result.is_valid(), "unexpected: {:?}", result);

    // A block confirms the transaction; the gate records the consumption.
    stack
        .lifecycle
        .record_confirmed(account, KeyOrdinal::Transaction, product.index_set)?;

    // The same envelope arriving again is a replay of a consumed index.
    let replay = stack
        .validation
        .validate_transaction(&envelope, EnvelopeOrigin::Gossip, NOW)
        .await?;
    assert_eq!(
        replay.first_error(),
        Some(ValidationError::KeyIndexAlreadyConsumed)
    );

    // And the lifecycle manager will never sign that index again either.
    let double_record =
        stack
            .lifecycle
            .record_confirmed(account, KeyOrdinal::Transaction, product.index_set);
    assert!(matches!(
        double_record,
        Err(LifecycleError::GateReplay { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn successive_signatures_use_fresh_indices() -> anyhow::Result<()> {
    let stack = stack();
    let account = AccountId::standard(2);

    let public = stack
        .lifecycle
        .generate_key(account, KeyOrdinal::Transaction)
        .await?;
    stack
        .resolver
        .insert(account, KeyOrdinal::Transaction, public);

    let mut last_index = None;
    for round in 0..3u8 {
        let (mut envelope, canonical) =
            unsigned_transaction(account, vec![round, round, round]);
        let product = stack
            .lifecycle
            .sign(account, KeyOrdinal::Transaction, &canonical, SignOptions::default())
            .await?;
        if let Some(previous) = last_index {
            assert!(product.index_set > previous);
        }
        last_index = Some(product.index_set);

        attach_signature(&mut envelope, account, product.index_set, product.signature);
        let result = stack
            .validation
            .validate_transaction(&envelope, EnvelopeOrigin::Gossip, NOW)
            .await?;
        assert!(result.is_valid(), "round {round}: {:?}", result);

        stack
            .lifecycle
            .record_confirmed(account, KeyOrdinal::Transaction, product.index_set)?;
    }
    Ok(())
}

#[tokio::test]
async fn reclaim_reopens_a_gated_account() -> anyhow::Result<()> {
    let stack = stack();
    let account = AccountId::standard(3);

    stack
        .lifecycle
        .generate_key(account, KeyOrdinal::Transaction)
        .await?;
    let (_, canonical) = unsigned_transaction(account, vec![7]);
    let product = stack
        .lifecycle
        .sign(account, KeyOrdinal::Transaction, &canonical, SignOptions::default())
        .await?;
    stack
        .lifecycle
        .record_confirmed(account, KeyOrdinal::Transaction, product.index_set)?;
    assert!(stack
        .lifecycle
        .gates()
        .highest(account, KeyOrdinal::Transaction)
        .is_some());

    // Explicit account reclaim is the only clearing path.
    stack.lifecycle.reclaim_account(account);
    assert!(stack
        .lifecycle
        .gates()
        .highest(account, KeyOrdinal::Transaction)
        .is_none());
    Ok(())
}
