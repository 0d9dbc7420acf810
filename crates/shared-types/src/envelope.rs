//! # Envelopes and Signature Variants
//!
//! The four envelope kinds the trust core validates, and the closed set of
//! signature shapes they may carry.
//!
//! Envelopes expose `canonical_bytes()` — the deterministic, field-ordered
//! byte string their declared hash commits to. Hashing itself lives in
//! `shared-crypto`; keeping the byte layout here and the hash functions there
//! means there is exactly one definition of each.

use crate::entities::{AccountId, BlockHeight, Hash256, Hash512, KeyAddress, TransactionId};
use crate::keys::{CategoryKey, CryptographicKey, SecurityCategory};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

/// A signature referring to a key already published in chain history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedSignature {
    /// Which key instance, and which use-index, produced this signature.
    pub address: KeyAddress,
    /// Optional inline copy of the public key, for nodes that cannot resolve
    /// the address yet. Must match the on-record key byte for byte.
    pub embedded_key: Option<CryptographicKey>,
    /// Raw signature bytes for the key's scheme.
    pub bytes: Vec<u8>,
}

/// Commitment to a not-yet-revealed next key.
///
/// When a secret-family key signs, it reveals its public material and
/// promises the next one: the commitment must equal the dual hash of the
/// revealed key bytes and both nonces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextKeyPromise {
    pub commitment: crate::entities::DualHash,
    pub nonce1: u64,
    pub nonce2: u64,
}

/// One component of a secret-family signature: the revealed public key and
/// the signature bytes produced under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretComponentSignature {
    pub revealed_key: CategoryKey,
    pub bytes: Vec<u8>,
}

/// The closed set of signature shapes an envelope may carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountSignature {
    /// Single signature from a published key.
    Published(PublishedSignature),
    /// Secret-family key revealing itself at signing time, one component.
    SecretSingle {
        address: KeyAddress,
        promise: NextKeyPromise,
        component: SecretComponentSignature,
    },
    /// Secret-family composite key, all components must verify.
    SecretCombo {
        address: KeyAddress,
        promise: NextKeyPromise,
        components: Vec<SecretComponentSignature>,
    },
    /// Five-component composite, all components must verify.
    SecretPenta {
        address: KeyAddress,
        promise: NextKeyPromise,
        components: Vec<SecretComponentSignature>,
    },
    /// First-use, self-contained signature: no prior chain record exists, the
    /// public key travels inline and a proof-of-work nonce gates gossip.
    Presentation {
        account: AccountId,
        declared_category: SecurityCategory,
        public_key: Vec<u8>,
        bytes: Vec<u8>,
        pow_nonce: u64,
    },
    /// Ordered co-signatures from multiple accounts.
    Joint { signatures: Vec<PublishedSignature> },
}

impl AccountSignature {
    /// The address of the primary signer, when one exists. Presentation
    /// signatures are self-referential; joint signatures use their first
    /// entry as the emitter.
    pub fn primary_address(&self) -> Option<&KeyAddress> {
        match self {
            Self::Published(sig) => Some(&sig.address),
            Self::SecretSingle { address, .. }
            | Self::SecretCombo { address, .. }
            | Self::SecretPenta { address, .. } => Some(address),
            Self::Presentation { .. } => None,
            Self::Joint { signatures } => signatures.first().map(|s| &s.address),
        }
    }

    pub fn is_presentation(&self) -> bool {
        matches!(self, Self::Presentation { .. })
    }

    pub fn is_joint(&self) -> bool {
        matches!(self, Self::Joint { .. })
    }
}

/// Transaction shape, constraining which signature variants are acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Ordinary single-signer transfer or operation.
    Standard,
    /// Account presentation: the first appearance of an account on chain.
    Presentation,
    /// Rotates one of the emitter's keys; exempt from change-height gating.
    KeyChange,
    /// Joint transaction requiring exactly three signers, one of which must
    /// be the target account.
    ThreeWayGated { target: AccountId },
    /// Joint transaction governed by the joint account's member list.
    JointStandard,
}

/// A transaction as received from gossip or sync, before validation.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEnvelope {
    pub id: TransactionId,
    pub kind: TransactionKind,
    /// Hash the emitter claims the content has; recomputed during validation.
    #[serde_as(as = "Bytes")]
    pub declared_hash: Hash512,
    /// Envelope is garbage after this wall-clock time.
    pub expiration_millis: u64,
    pub signature: AccountSignature,
    /// Rehydrated content bytes, opaque to the validator.
    pub payload: Vec<u8>,
}

impl TransactionEnvelope {
    /// Deterministic byte string the declared hash commits to.
    ///
    /// Field order is fixed; the signature is excluded (it signs this hash).
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64 + self.payload.len());
        out.extend_from_slice(&self.id.account.sequence.to_be_bytes());
        out.push(match self.id.account.class {
            crate::entities::AccountClass::Standard => 0,
            crate::entities::AccountClass::Joint => 1,
            crate::entities::AccountClass::Moderator => 2,
        });
        out.extend_from_slice(&self.id.timestamp_millis.to_be_bytes());
        out.extend_from_slice(self.id.scope.as_bytes());
        out.push(self.kind_tag());
        out.extend_from_slice(&self.expiration_millis.to_be_bytes());
        out.extend_from_slice(&(self.payload.len() as u64).to_be_bytes());
        out.extend_from_slice(&self.payload);
        out
    }

    fn kind_tag(&self) -> u8 {
        match self.kind {
            TransactionKind::Standard => 0,
            TransactionKind::Presentation => 1,
            TransactionKind::KeyChange => 2,
            TransactionKind::ThreeWayGated { .. } => 3,
            TransactionKind::JointStandard => 4,
        }
    }
}

/// A gossip message envelope. Signed with the message-ordinal key over the
/// 256-bit message hash.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub id: TransactionId,
    #[serde_as(as = "Bytes")]
    pub declared_hash: Hash256,
    pub expiration_millis: u64,
    pub signature: AccountSignature,
    pub payload: Vec<u8>,
}

impl MessageEnvelope {
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(48 + self.payload.len());
        out.extend_from_slice(&self.id.account.sequence.to_be_bytes());
        out.extend_from_slice(&self.id.timestamp_millis.to_be_bytes());
        out.extend_from_slice(self.id.scope.as_bytes());
        out.extend_from_slice(&self.expiration_millis.to_be_bytes());
        out.extend_from_slice(&(self.payload.len() as u64).to_be_bytes());
        out.extend_from_slice(&self.payload);
        out
    }
}

/// How a block is signed, by moderator key class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeratorBlockSignature {
    /// Plain hash-tree moderator key, resolvable from chain state.
    Tree(PublishedSignature),
    /// Secret sequential key: the verifying key may need to be reconstructed
    /// on demand from the latest saved block when the cached copy is empty.
    SecretSequential {
        key_sequence: u32,
        bytes: Vec<u8>,
    },
    /// Super-secret key; an externally fetched confirmation id must match.
    SuperSecret {
        confirmation_id: u64,
        signature: PublishedSignature,
    },
    /// Genesis blocks embed their own key and are optionally cross-checked
    /// against an externally published reference hash.
    Genesis {
        embedded_key: CryptographicKey,
        bytes: Vec<u8>,
    },
}

/// A block as received from gossip or sync.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEnvelope {
    pub height: BlockHeight,
    #[serde_as(as = "Bytes")]
    pub declared_hash: Hash512,
    /// Hash of the parent block; participates in this block's hash.
    #[serde_as(as = "Bytes")]
    pub previous_hash: Hash512,
    pub timestamp_millis: u64,
    pub signature: ModeratorBlockSignature,
    pub payload: Vec<u8>,
}

impl BlockEnvelope {
    pub fn is_genesis(&self) -> bool {
        self.height == 0 || matches!(self.signature, ModeratorBlockSignature::Genesis { .. })
    }

    /// Byte string the block hash commits to: contents plus the parent hash,
    /// so a block cannot be re-parented without changing its hash.
    pub fn canonical_bytes(&self, previous_hash: &Hash512) -> Vec<u8> {
        let mut out = Vec::with_capacity(96 + self.payload.len());
        out.extend_from_slice(&self.height.to_be_bytes());
        out.extend_from_slice(&self.timestamp_millis.to_be_bytes());
        out.extend_from_slice(previous_hash);
        out.extend_from_slice(&(self.payload.len() as u64).to_be_bytes());
        out.extend_from_slice(&self.payload);
        out
    }
}
