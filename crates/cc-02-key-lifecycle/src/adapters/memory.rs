//! # In-Memory Adapters
//!
//! Single-process implementations of the outbound ports: a wallet store, a
//! chain index oracle with settable answers, and two rotation workflows
//! (recording for tests, channel-backed for wiring a real worker).

use crate::domain::entities::{KeyHistoryEntry, StagedKey, WalletKey};
use crate::ports::outbound::{
    ChainIndexOracle, RotationRequest, RotationWorkflow, WalletStore,
};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_types::{AccountId, KeyOrdinal, KeyUseIndexSet, LifecycleError};
use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc;
use tracing::warn;

type Slot = (AccountId, KeyOrdinal);

/// Wallet store held in process memory. Keys genuinely move in and out of
/// the maps, mirroring the ownership discipline a durable store must keep.
#[derive(Default)]
pub struct InMemoryWalletStore {
    keys: Mutex<HashMap<Slot, WalletKey>>,
    staged: Mutex<HashMap<Slot, StagedKey>>,
    in_flight: Mutex<HashSet<Slot>>,
    history: Mutex<Vec<KeyHistoryEntry>>,
}

impl InMemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_key(&self, account: AccountId, ordinal: KeyOrdinal) -> bool {
        self.keys.lock().contains_key(&(account, ordinal))
    }

    pub fn history_snapshot(&self) -> Vec<KeyHistoryEntry> {
        self.history.lock().clone()
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn take_key(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
    ) -> Result<WalletKey, LifecycleError> {
        self.keys
            .lock()
            .remove(&(account, ordinal))
            .ok_or(LifecycleError::KeyNotFound { account, ordinal })
    }

    async fn return_key(&self, key: WalletKey) -> Result<(), LifecycleError> {
        self.keys.lock().insert((key.account, key.ordinal), key);
        Ok(())
    }

    async fn commit_key(&self, key: WalletKey) -> Result<(), LifecycleError> {
        self.keys.lock().insert((key.account, key.ordinal), key);
        Ok(())
    }

    async fn set_in_flight(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
        in_flight: bool,
    ) -> Result<(), LifecycleError> {
        let mut markers = self.in_flight.lock();
        if in_flight {
            markers.insert((account, ordinal));
        } else {
            markers.remove(&(account, ordinal));
        }
        Ok(())
    }

    async fn is_in_flight(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
    ) -> Result<bool, LifecycleError> {
        Ok(self.in_flight.lock().contains(&(account, ordinal)))
    }

    async fn stage_next_key(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
        staged: StagedKey,
    ) -> Result<(), LifecycleError> {
        self.staged.lock().insert((account, ordinal), staged);
        Ok(())
    }

    async fn take_staged_key(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
    ) -> Result<Option<StagedKey>, LifecycleError> {
        Ok(self.staged.lock().remove(&(account, ordinal)))
    }

    async fn append_history(&self, entry: KeyHistoryEntry) -> Result<(), LifecycleError> {
        self.history.lock().push(entry);
        Ok(())
    }
}

/// Chain index oracle with answers set by the test or the sync layer.
#[derive(Default)]
pub struct StaticIndexOracle {
    confirmed: RwLock<HashMap<Slot, KeyUseIndexSet>>,
}

impl StaticIndexOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_confirmed(&self, account: AccountId, ordinal: KeyOrdinal, index: KeyUseIndexSet) {
        self.confirmed.write().insert((account, ordinal), index);
    }
}

#[async_trait]
impl ChainIndexOracle for StaticIndexOracle {
    async fn confirmed_index(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
    ) -> Result<Option<KeyUseIndexSet>, LifecycleError> {
        Ok(self.confirmed.read().get(&(account, ordinal)).copied())
    }
}

/// Rotation workflow that records every submission.
#[derive(Default)]
pub struct RecordingRotationWorkflow {
    requests: Mutex<Vec<RotationRequest>>,
}

impl RecordingRotationWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<RotationRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl RotationWorkflow for RecordingRotationWorkflow {
    async fn submit(&self, request: RotationRequest) {
        self.requests.lock().push(request);
    }
}

/// Rotation workflow backed by an unbounded channel; the receiving side is
/// the actual rotation worker.
pub struct ChannelRotationWorkflow {
    sender: mpsc::UnboundedSender<RotationRequest>,
}

impl ChannelRotationWorkflow {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RotationRequest>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl RotationWorkflow for ChannelRotationWorkflow {
    async fn submit(&self, request: RotationRequest) {
        if self.sender.send(request).is_err() {
            warn!("rotation worker is gone; request dropped");
        }
    }
}
