//! # In-Memory Port Adapters
//!
//! Settable single-process implementations of the outbound ports, used by
//! the test suites and by nodes running with everything local.

use crate::ports::outbound::{
    BlockSummary, ChainStateOracle, FastKeyIndex, JointAccountDirectory, KeyResolver,
    ReferenceHashFetch,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{
    AccountId, BlockHeight, CryptographicKey, Hash512, KeyAddress, KeyOrdinal, NodeSyncStatus,
    ValidationFatal,
};
use std::collections::HashMap;

/// Chain oracle with directly settable state.
#[derive(Default)]
pub struct StaticChainOracle {
    status: RwLock<NodeSyncStatus>,
    inception_millis: RwLock<u64>,
    blocks: RwLock<HashMap<BlockHeight, BlockSummary>>,
    moderator_keys: RwLock<HashMap<(KeyOrdinal, u32), CryptographicKey>>,
    sequential_rebuilds: RwLock<HashMap<u32, CryptographicKey>>,
}

impl StaticChainOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, status: NodeSyncStatus) {
        *self.status.write() = status;
    }

    pub fn set_inception(&self, millis: u64) {
        *self.inception_millis.write() = millis;
    }

    pub fn insert_block(&self, summary: BlockSummary) {
        self.blocks.write().insert(summary.height, summary);
    }

    pub fn insert_moderator_key(
        &self,
        ordinal: KeyOrdinal,
        key_sequence: u32,
        key: CryptographicKey,
    ) {
        self.moderator_keys
            .write()
            .insert((ordinal, key_sequence), key);
    }

    pub fn insert_sequential_rebuild(&self, key_sequence: u32, key: CryptographicKey) {
        self.sequential_rebuilds.write().insert(key_sequence, key);
    }
}

#[async_trait]
impl ChainStateOracle for StaticChainOracle {
    async fn sync_status(&self) -> Result<NodeSyncStatus, ValidationFatal> {
        Ok(*self.status.read())
    }

    async fn chain_inception_millis(&self) -> Result<u64, ValidationFatal> {
        Ok(*self.inception_millis.read())
    }

    async fn block_at(
        &self,
        height: BlockHeight,
    ) -> Result<Option<BlockSummary>, ValidationFatal> {
        Ok(self.blocks.read().get(&height).cloned())
    }

    async fn moderator_key(
        &self,
        ordinal: KeyOrdinal,
        key_sequence: u32,
    ) -> Result<Option<CryptographicKey>, ValidationFatal> {
        Ok(self
            .moderator_keys
            .read()
            .get(&(ordinal, key_sequence))
            .cloned())
    }

    async fn rebuild_sequential_key(
        &self,
        key_sequence: u32,
    ) -> Result<Option<CryptographicKey>, ValidationFatal> {
        Ok(self.sequential_rebuilds.read().get(&key_sequence).cloned())
    }
}

/// Flat key index held in memory. Stores the canonical (bincode) encoding,
/// as the production index does.
#[derive(Default)]
pub struct InMemoryFastKeyIndex {
    keys: RwLock<HashMap<(AccountId, KeyOrdinal), Vec<u8>>>,
}

impl InMemoryFastKeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index_key(&self, account: AccountId, ordinal: KeyOrdinal, key: &CryptographicKey) {
        if let Ok(bytes) = bincode::serialize(key) {
            self.keys.write().insert((account, ordinal), bytes);
        }
    }

    /// Plant raw bytes, e.g. to simulate corruption.
    pub fn index_raw(&self, account: AccountId, ordinal: KeyOrdinal, bytes: Vec<u8>) {
        self.keys.write().insert((account, ordinal), bytes);
    }

    pub fn remove(&self, account: AccountId, ordinal: KeyOrdinal) {
        self.keys.write().remove(&(account, ordinal));
    }
}

#[async_trait]
impl FastKeyIndex for InMemoryFastKeyIndex {
    async fn load_key_bytes(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
    ) -> Result<Option<Vec<u8>>, ValidationFatal> {
        Ok(self.keys.read().get(&(account, ordinal)).cloned())
    }
}

/// Full resolver backed by a map; stands in for history replay.
#[derive(Default)]
pub struct StaticKeyResolver {
    keys: RwLock<HashMap<(AccountId, KeyOrdinal), CryptographicKey>>,
}

impl StaticKeyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, account: AccountId, ordinal: KeyOrdinal, key: CryptographicKey) {
        self.keys.write().insert((account, ordinal), key);
    }
}

#[async_trait]
impl KeyResolver for StaticKeyResolver {
    async fn resolve_key(
        &self,
        address: &KeyAddress,
    ) -> Result<Option<CryptographicKey>, ValidationFatal> {
        Ok(self
            .keys
            .read()
            .get(&(address.account, address.ordinal))
            .cloned())
    }
}

/// Reference hashes with settable answers; `None` models "service skipped".
#[derive(Default)]
pub struct StaticReferenceHashes {
    genesis: RwLock<Option<Hash512>>,
    confirmation_id: RwLock<Option<u64>>,
}

impl StaticReferenceHashes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_genesis_hash(&self, hash: Hash512) {
        *self.genesis.write() = Some(hash);
    }

    pub fn set_confirmation_id(&self, id: u64) {
        *self.confirmation_id.write() = Some(id);
    }
}

#[async_trait]
impl ReferenceHashFetch for StaticReferenceHashes {
    async fn genesis_hash(&self) -> Result<Option<Hash512>, ValidationFatal> {
        Ok(*self.genesis.read())
    }

    async fn superkey_confirmation_id(&self) -> Result<Option<u64>, ValidationFatal> {
        Ok(*self.confirmation_id.read())
    }
}

/// Joint account member lists.
#[derive(Default)]
pub struct StaticJointDirectory {
    members: RwLock<HashMap<AccountId, Vec<AccountId>>>,
}

impl StaticJointDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, account: AccountId, members: Vec<AccountId>) {
        self.members.write().insert(account, members);
    }
}

#[async_trait]
impl JointAccountDirectory for StaticJointDirectory {
    async fn members(
        &self,
        account: AccountId,
    ) -> Result<Option<Vec<AccountId>>, ValidationFatal> {
        Ok(self.members.read().get(&account).cloned())
    }
}
