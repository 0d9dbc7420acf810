//! # Outbound Ports (Driven Ports)
//!
//! The collaborators the lifecycle manager drives: durable wallet storage,
//! the chain's view of confirmed key indices, and the rotation workflow
//! queue.

use crate::domain::entities::{KeyHistoryEntry, StagedKey, WalletKey};
use async_trait::async_trait;
use shared_types::{AccountId, KeyOrdinal, KeyUseIndexSet, LifecycleError};

/// Durable wallet storage.
///
/// Keys move: `take_key` transfers ownership out of the store, and exactly
/// one of `return_key` (rollback) or `commit_key` (advanced state) brings it
/// back. The in-flight marker is durable — a marker found on load after a
/// crash means a signing transaction died mid-way and the wallet must not be
/// trusted until an operator intervenes.
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Move the key out of the store for a signing transaction.
    async fn take_key(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
    ) -> Result<WalletKey, LifecycleError>;

    /// Rollback path: put an untouched key back.
    async fn return_key(&self, key: WalletKey) -> Result<(), LifecycleError>;

    /// Commit path: durably persist the advanced key.
    async fn commit_key(&self, key: WalletKey) -> Result<(), LifecycleError>;

    /// Durable in-flight marker for the slot.
    async fn set_in_flight(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
        in_flight: bool,
    ) -> Result<(), LifecycleError>;

    async fn is_in_flight(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
    ) -> Result<bool, LifecycleError>;

    /// Stage a replacement key for a later swap.
    async fn stage_next_key(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
        staged: StagedKey,
    ) -> Result<(), LifecycleError>;

    /// Take the staged key, if one exists.
    async fn take_staged_key(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
    ) -> Result<Option<StagedKey>, LifecycleError>;

    /// Append a retired key to the history archive.
    async fn append_history(&self, entry: KeyHistoryEntry) -> Result<(), LifecycleError>;
}

/// Read-only view of the chain's confirmed key usage.
#[async_trait]
pub trait ChainIndexOracle: Send + Sync {
    /// The last index a confirmed chain event used for this slot.
    async fn confirmed_index(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
    ) -> Result<Option<KeyUseIndexSet>, LifecycleError>;
}

/// Urgency of a rotation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationUrgency {
    /// Warning threshold crossed; rotate when convenient.
    Advisory,
    /// Change threshold crossed; rotate now.
    Urgent,
}

/// A fire-and-forget request for the key-rotation workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationRequest {
    pub account: AccountId,
    pub ordinal: KeyOrdinal,
    pub use_index: u64,
    pub urgency: RotationUrgency,
}

/// Submission side of the rotation workflow. Infallible by design: a lost
/// rotation request degrades to a later, more urgent one.
#[async_trait]
pub trait RotationWorkflow: Send + Sync {
    async fn submit(&self, request: RotationRequest);
}
