//! # Inbound Ports (Driving Ports / API)
//!
//! The lifecycle API the rest of the node drives: transactional signing,
//! key generation, staging and swap, and gate maintenance.

use crate::domain::entities::{SignOptions, SignedProduct};
use crate::domain::gate::KeyGateRegistry;
use async_trait::async_trait;
use shared_types::{AccountId, CryptographicKey, KeyOrdinal, KeyUseIndexSet, LifecycleError};

/// Primary key lifecycle API.
#[async_trait]
pub trait KeyLifecycleApi: Send + Sync {
    /// Run one atomic signing transaction: preflight checks, sign, persist
    /// the advanced state, commit. Exactly one transaction per (account,
    /// ordinal) may be in flight.
    async fn sign(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
        message_hash: &[u8],
        options: SignOptions,
    ) -> Result<SignedProduct, LifecycleError>;

    /// Generate and persist a fresh key for the slot.
    async fn generate_key(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
    ) -> Result<CryptographicKey, LifecycleError>;

    /// Generate and stage the replacement key for a later swap.
    async fn stage_next_key(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
    ) -> Result<CryptographicKey, LifecycleError>;

    /// Atomically promote the staged key: archive the outgoing key, bump the
    /// key sequence, and re-validate the new key's index against the chain.
    async fn swap_next_key(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
    ) -> Result<(), LifecycleError>;

    /// Record a chain-confirmed key consumption into the gate registry.
    fn record_confirmed(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
        index: KeyUseIndexSet,
    ) -> Result<(), LifecycleError>;

    /// Explicit account reclaim: the only way gates are cleared.
    fn reclaim_account(&self, account: AccountId);

    /// Read access to the gate registry for validators.
    fn gates(&self) -> &KeyGateRegistry;
}
