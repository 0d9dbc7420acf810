//! # Wallet Key Entities
//!
//! The wallet-held side of a key: private material plus the thresholds that
//! drive rotation. `WalletKey` is deliberately not `Clone` — the material
//! inside is a one-time resource and there is never a second copy.

use shared_crypto::PrivateMaterial;
use shared_types::{
    AccountId, BlockHeight, CryptographicKey, HashBits, KeyOrdinal, KeyUseIndexSet,
    WalletKeyStatus,
};
use std::collections::HashMap;

/// A key owned by this node's wallet.
///
/// The threshold fields are use-index thresholds: `warning_height` and
/// `change_height` trigger rotation requests, `maximum_height` is the leaf
/// count — at that index the key is exhausted and signing fails hard.
#[derive(Debug)]
pub struct WalletKey {
    pub account: AccountId,
    pub ordinal: KeyOrdinal,
    pub status: WalletKeyStatus,
    pub material: PrivateMaterial,
    pub public: CryptographicKey,
    /// Height at which the key's announcement was confirmed; zero for keys
    /// not yet announced.
    pub announcement_height: BlockHeight,
    /// Bumped on every key swap; the `sequence` of every index set this key
    /// produces.
    pub key_sequence: u32,
    pub warning_height: u64,
    pub change_height: u64,
    pub maximum_height: u64,
}

impl WalletKey {
    /// The index set the next signature will consume.
    pub fn index_set(&self) -> KeyUseIndexSet {
        KeyUseIndexSet::new(self.key_sequence, self.material.use_index(), self.ordinal)
    }

    pub fn past_warning(&self) -> bool {
        self.material.use_index() >= self.warning_height
    }

    pub fn past_change(&self) -> bool {
        self.material.use_index() >= self.change_height
    }

    pub fn is_exhausted(&self) -> bool {
        self.material.use_index() >= self.maximum_height
    }
}

/// A generated replacement key waiting to be promoted.
#[derive(Debug)]
pub struct StagedKey {
    pub material: PrivateMaterial,
    pub public: CryptographicKey,
}

/// Archive record of a retired key.
#[derive(Debug, Clone)]
pub struct KeyHistoryEntry {
    pub account: AccountId,
    pub ordinal: KeyOrdinal,
    pub key_sequence: u32,
    /// Use index the key had when it was retired.
    pub final_index: u64,
    pub public: CryptographicKey,
}

/// Generation parameters for one key role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyGenerationSpec {
    pub tree_height: u8,
    pub tree_layers: u8,
    pub hash_bits: HashBits,
    /// Width of the backup hash kept alongside the key.
    pub backup_hash_bits: HashBits,
    pub seed_bytes: usize,
}

impl KeyGenerationSpec {
    /// Per-role defaults. Message keys sign the narrower message hash;
    /// validator keys use the layered variant.
    pub fn for_ordinal(ordinal: KeyOrdinal) -> Self {
        match ordinal {
            KeyOrdinal::Message => Self {
                tree_height: 10,
                tree_layers: 1,
                hash_bits: HashBits::B256,
                backup_hash_bits: HashBits::B256,
                seed_bytes: 64,
            },
            KeyOrdinal::Validator => Self {
                tree_height: 5,
                tree_layers: 2,
                hash_bits: HashBits::B512,
                backup_hash_bits: HashBits::B256,
                seed_bytes: 64,
            },
            KeyOrdinal::Transaction
            | KeyOrdinal::Change
            | KeyOrdinal::Super
            | KeyOrdinal::Moderator => Self {
                tree_height: 10,
                tree_layers: 1,
                hash_bits: HashBits::B512,
                backup_hash_bits: HashBits::B256,
                seed_bytes: 64,
            },
        }
    }

    pub fn leaf_count(&self) -> u64 {
        1u64 << (self.tree_height as u32 * self.tree_layers as u32)
    }
}

/// Lifecycle configuration, threaded through the service constructor.
#[derive(Debug, Clone, Default)]
pub struct KeyLifecycleConfig {
    /// Percent of leaves consumed before an advisory rotation request.
    pub warning_percent: Option<u8>,
    /// Percent of leaves consumed before rotation becomes urgent.
    pub change_percent: Option<u8>,
    /// Role-specific overrides of the default generation parameters.
    pub spec_overrides: HashMap<KeyOrdinal, KeyGenerationSpec>,
}

impl KeyLifecycleConfig {
    pub fn warning_percent(&self) -> u64 {
        self.warning_percent.unwrap_or(70) as u64
    }

    pub fn change_percent(&self) -> u64 {
        self.change_percent.unwrap_or(90) as u64
    }

    pub fn spec_for(&self, ordinal: KeyOrdinal) -> KeyGenerationSpec {
        self.spec_overrides
            .get(&ordinal)
            .copied()
            .unwrap_or_else(|| KeyGenerationSpec::for_ordinal(ordinal))
    }
}

/// Options for one signing request.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignOptions {
    /// Permit signing past the change threshold; asserted only by the
    /// key-change transaction flow itself.
    pub allow_past_change: bool,
}

/// The output of a committed signing transaction.
#[derive(Debug, Clone)]
pub struct SignedProduct {
    pub account: AccountId,
    pub ordinal: KeyOrdinal,
    pub signature: Vec<u8>,
    /// The index set this signature consumed.
    pub index_set: KeyUseIndexSet,
}
