//! # Outbound Ports (Driven Ports)
//!
//! The collaborators envelope validation consults. All are abstract: the
//! sync layer, the wallet, and the network own the real implementations.

use async_trait::async_trait;
use shared_types::{
    AccountId, BlockEnvelope, BlockHeight, CryptographicKey, Hash512, KeyAddress, KeyOrdinal,
    MessageEnvelope, NodeSyncStatus, RehydrationError, TransactionEnvelope, ValidationFatal,
};

/// One block as the oracle remembers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSummary {
    pub height: BlockHeight,
    pub hash: Hash512,
    pub timestamp_millis: u64,
}

/// The chain-state oracle: heights, desync flag, inception time, moderator
/// keys, last-block lookups.
#[async_trait]
pub trait ChainStateOracle: Send + Sync {
    async fn sync_status(&self) -> Result<NodeSyncStatus, ValidationFatal>;

    async fn chain_inception_millis(&self) -> Result<u64, ValidationFatal>;

    async fn block_at(&self, height: BlockHeight)
        -> Result<Option<BlockSummary>, ValidationFatal>;

    /// The cached moderator key for an ordinal and key sequence.
    async fn moderator_key(
        &self,
        ordinal: KeyOrdinal,
        key_sequence: u32,
    ) -> Result<Option<CryptographicKey>, ValidationFatal>;

    /// Rebuild a secret-sequential moderator key from the latest saved
    /// block. Called only when the cached key is empty.
    async fn rebuild_sequential_key(
        &self,
        key_sequence: u32,
    ) -> Result<Option<CryptographicKey>, ValidationFatal>;
}

/// Flat (account, ordinal) → canonical key bytes index.
#[async_trait]
pub trait FastKeyIndex: Send + Sync {
    async fn load_key_bytes(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
    ) -> Result<Option<Vec<u8>>, ValidationFatal>;
}

/// Full historical key resolution, used when the fast path yields nothing.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    async fn resolve_key(
        &self,
        address: &KeyAddress,
    ) -> Result<Option<CryptographicKey>, ValidationFatal>;
}

/// Optional externally published reference hashes.
#[async_trait]
pub trait ReferenceHashFetch: Send + Sync {
    async fn genesis_hash(&self) -> Result<Option<Hash512>, ValidationFatal>;

    async fn superkey_confirmation_id(&self) -> Result<Option<u64>, ValidationFatal>;
}

/// Member lists of joint accounts; `None` while unpublished.
#[async_trait]
pub trait JointAccountDirectory: Send + Sync {
    async fn members(
        &self,
        account: AccountId,
    ) -> Result<Option<Vec<AccountId>>, ValidationFatal>;
}

/// Turns raw bytes into typed envelopes. `Corrupt` maps to a per-envelope
/// rejection; `Unrecognized` propagates — it may be a future protocol
/// version, not an attack.
pub trait RehydrationFactory: Send + Sync {
    fn transaction(&self, bytes: &[u8]) -> Result<TransactionEnvelope, RehydrationError>;

    fn message(&self, bytes: &[u8]) -> Result<MessageEnvelope, RehydrationError>;

    fn block(&self, bytes: &[u8]) -> Result<BlockEnvelope, RehydrationError>;
}
