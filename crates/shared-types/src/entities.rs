//! # Core Domain Entities
//!
//! Identity and chain-position types used by every subsystem.
//!
//! ## Clusters
//!
//! - **Accounts**: `AccountId`, `AccountClass`
//! - **Keys in chain history**: `KeyOrdinal`, `KeyUseIndexSet`, `KeyAddress`
//! - **Chain position**: `BlockHeight`, `TransactionId`, `NodeSyncStatus`

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// A 32-byte hash (SHA-256 or SHA3-256).
pub type Hash256 = [u8; 32];

/// A 64-byte hash (SHA-512 or SHA3-512).
pub type Hash512 = [u8; 64];

/// Block height in the chain.
pub type BlockHeight = u64;

/// A pair of independently computed 512-bit hashes over the same input.
///
/// Both components must match for the pair to be considered equal to a
/// recomputed value; an attacker must therefore break both hash functions
/// at once.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualHash {
    /// SHA2-512 component.
    #[serde_as(as = "Bytes")]
    pub sha2: Hash512,
    /// SHA3-512 component.
    #[serde_as(as = "Bytes")]
    pub sha3: Hash512,
}

impl DualHash {
    /// The all-zero dual hash, used as a placeholder before computation.
    pub const ZERO: DualHash = DualHash {
        sha2: [0u8; 64],
        sha3: [0u8; 64],
    };
}

impl fmt::Debug for DualHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DualHash({:02x}{:02x}../{:02x}{:02x}..)",
            self.sha2[0], self.sha2[1], self.sha3[0], self.sha3[1]
        )
    }
}

/// The class of an account, encoded in its identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountClass {
    /// A regular user account.
    Standard,
    /// A multi-party account whose transactions carry joint signatures.
    Joint,
    /// A network-operator account holding block/digest signing keys.
    Moderator,
}

/// Opaque identifier of an account.
///
/// The zero sequence is reserved as a placeholder and never assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId {
    pub class: AccountClass,
    pub sequence: u64,
}

impl AccountId {
    pub const fn standard(sequence: u64) -> Self {
        Self {
            class: AccountClass::Standard,
            sequence,
        }
    }

    pub const fn joint(sequence: u64) -> Self {
        Self {
            class: AccountClass::Joint,
            sequence,
        }
    }

    pub const fn moderator(sequence: u64) -> Self {
        Self {
            class: AccountClass::Moderator,
            sequence,
        }
    }

    pub fn is_moderator(&self) -> bool {
        self.class == AccountClass::Moderator
    }

    /// Placeholder ids are never valid signers.
    pub fn is_placeholder(&self) -> bool {
        self.sequence == 0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.class {
            AccountClass::Standard => 'S',
            AccountClass::Joint => 'J',
            AccountClass::Moderator => 'M',
        };
        write!(f, "{}{}", prefix, self.sequence)
    }
}

/// The key slot an account key occupies.
///
/// Each account owns one active key per ordinal; the ordinal determines the
/// key's role and its generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum KeyOrdinal {
    Transaction = 1,
    Message = 2,
    Change = 3,
    Super = 4,
    Validator = 5,
    Moderator = 6,
}

impl KeyOrdinal {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Transaction),
            2 => Some(Self::Message),
            3 => Some(Self::Change),
            4 => Some(Self::Super),
            5 => Some(Self::Validator),
            6 => Some(Self::Moderator),
            _ => None,
        }
    }
}

impl fmt::Display for KeyOrdinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transaction => "transaction",
            Self::Message => "message",
            Self::Change => "change",
            Self::Super => "super",
            Self::Validator => "validator",
            Self::Moderator => "moderator",
        };
        f.write_str(name)
    }
}

/// Identifies exactly one signature opportunity of a one-time key.
///
/// Comparison is lexicographic on (sequence, index): the sequence advances on
/// key swap, the index on every signature. The ordinal is part of identity
/// only; two sets for different ordinals of the same account are never
/// compared in practice, so it serves as a deterministic tiebreak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct KeyUseIndexSet {
    /// Key generation counter; bumped when a key is swapped.
    pub sequence: u32,
    /// Leaf index within the current key; bumped on every signature.
    pub index: u64,
    /// The ordinal code of the key this set belongs to.
    pub ordinal: u8,
}

impl KeyUseIndexSet {
    pub const fn new(sequence: u32, index: u64, ordinal: KeyOrdinal) -> Self {
        Self {
            sequence,
            index,
            ordinal: ordinal.code(),
        }
    }

    /// The next signature opportunity of the same key.
    #[must_use]
    pub fn incremented(self) -> Self {
        Self {
            index: self.index + 1,
            ..self
        }
    }
}

impl PartialOrd for KeyUseIndexSet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KeyUseIndexSet {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sequence
            .cmp(&other.sequence)
            .then(self.index.cmp(&other.index))
            .then(self.ordinal.cmp(&other.ordinal))
    }
}

impl fmt::Display for KeyUseIndexSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{}", self.sequence, self.index, self.ordinal)
    }
}

/// Unique identifier of a transaction.
///
/// The creation timestamp is embedded in the id, so envelope-level timing
/// checks need no side lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId {
    /// The emitting account.
    pub account: AccountId,
    /// Milliseconds since the UNIX epoch at creation time.
    pub timestamp_millis: u64,
    /// Disambiguates transactions created in the same millisecond.
    pub scope: Uuid,
}

impl TransactionId {
    pub fn new(account: AccountId, timestamp_millis: u64) -> Self {
        Self {
            account,
            timestamp_millis,
            scope: Uuid::new_v4(),
        }
    }

    /// Placeholder ids (zero account and zero timestamp) are rejected by
    /// every envelope validator.
    pub fn is_placeholder(&self) -> bool {
        self.account.is_placeholder() && self.timestamp_millis == 0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self {
            account: AccountId::standard(0),
            timestamp_millis: 0,
            scope: Uuid::nil(),
        }
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.account, self.timestamp_millis)
    }
}

/// Identifies a specific public key instance in chain history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAddress {
    /// The account the key belongs to.
    pub account: AccountId,
    /// The key slot.
    pub ordinal: KeyOrdinal,
    /// Height at which the key's public material became visible on chain.
    pub announcement_height: BlockHeight,
    /// The transaction that declared the key.
    pub declaration_tx: TransactionId,
    /// The signature opportunity this address locks.
    pub index_set: KeyUseIndexSet,
}

/// Snapshot of the node's position relative to the public chain.
///
/// Returned by the chain-state oracle; validators consult it when deciding
/// whether a key announcement height is plausible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NodeSyncStatus {
    /// Highest block durably stored on this node.
    pub disk_height: BlockHeight,
    /// Highest block known to exist publicly.
    pub public_height: BlockHeight,
    /// True while the node is catching up.
    pub desynced: bool,
    /// True when running the reduced profile that never fully syncs.
    pub syncless_profile: bool,
}

impl NodeSyncStatus {
    /// Whether the embedded-key fallback is permitted at all.
    pub fn allows_embedded_fallback(&self) -> bool {
        self.desynced || self.syncless_profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_set_ordering_is_lexicographic() {
        let a = KeyUseIndexSet::new(1, 5, KeyOrdinal::Transaction);
        let b = KeyUseIndexSet::new(1, 6, KeyOrdinal::Transaction);
        let c = KeyUseIndexSet::new(2, 0, KeyOrdinal::Transaction);

        assert!(a < b);
        assert!(b < c);
        assert!(a < c);
    }

    #[test]
    fn index_set_sequence_dominates_index() {
        let low_seq_high_index = KeyUseIndexSet::new(1, u64::MAX, KeyOrdinal::Transaction);
        let high_seq_low_index = KeyUseIndexSet::new(2, 0, KeyOrdinal::Transaction);

        assert!(low_seq_high_index < high_seq_low_index);
    }

    #[test]
    fn incremented_bumps_index_only() {
        let set = KeyUseIndexSet::new(3, 7, KeyOrdinal::Message);
        let next = set.incremented();

        assert_eq!(next.sequence, 3);
        assert_eq!(next.index, 8);
        assert_eq!(next.ordinal, KeyOrdinal::Message.code());
    }

    #[test]
    fn placeholder_transaction_id_detected() {
        assert!(TransactionId::default().is_placeholder());

        let real = TransactionId::new(AccountId::standard(42), 1_700_000_000_000);
        assert!(!real.is_placeholder());
    }

    #[test]
    fn ordinal_codes_round_trip() {
        for ordinal in [
            KeyOrdinal::Transaction,
            KeyOrdinal::Message,
            KeyOrdinal::Change,
            KeyOrdinal::Super,
            KeyOrdinal::Validator,
            KeyOrdinal::Moderator,
        ] {
            assert_eq!(KeyOrdinal::from_code(ordinal.code()), Some(ordinal));
        }
        assert_eq!(KeyOrdinal::from_code(0), None);
        assert_eq!(KeyOrdinal::from_code(7), None);
    }

    #[test]
    fn embedded_fallback_requires_desync_or_syncless() {
        let synced = NodeSyncStatus {
            disk_height: 100,
            public_height: 100,
            desynced: false,
            syncless_profile: false,
        };
        assert!(!synced.allows_embedded_fallback());

        let desynced = NodeSyncStatus {
            desynced: true,
            ..synced
        };
        assert!(desynced.allows_embedded_fallback());

        let syncless = NodeSyncStatus {
            syncless_profile: true,
            ..synced
        };
        assert!(syncless.allows_embedded_fallback());
    }
}
