//! # SHA-2 / SHA-3 Hashing
//!
//! One-shot helpers at both supported widths, the dual hash used by digests,
//! and the count-prefixed node fold used by hash trees.

use sha2::{Digest, Sha256, Sha512};
use sha3::{Sha3_256, Sha3_512};
use shared_types::{DualHash, Hash256, Hash512, HashBits};

/// SHA2-256 one-shot.
pub fn sha2_256(data: &[u8]) -> Hash256 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA2-512 one-shot.
pub fn sha2_512(data: &[u8]) -> Hash512 {
    let mut hasher = Sha512::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA3-256 one-shot.
pub fn sha3_256(data: &[u8]) -> Hash256 {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA3-512 one-shot.
pub fn sha3_512(data: &[u8]) -> Hash512 {
    let mut hasher = Sha3_512::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-3 at the requested width. Canonical envelope hashing uses SHA-3; the
/// width is the key role's declared hash width.
pub fn width_hash(data: &[u8], bits: HashBits) -> Vec<u8> {
    match bits {
        HashBits::B256 => sha3_256(data).to_vec(),
        HashBits::B512 => sha3_512(data).to_vec(),
    }
}

/// Two independent 512-bit hashes over the same input.
pub fn dual_hash(data: &[u8]) -> DualHash {
    DualHash {
        sha2: sha2_512(data),
        sha3: sha3_512(data),
    }
}

/// Interior hash-tree node: hash of the concatenated children.
pub fn node_hash(left: &[u8], right: &[u8]) -> Hash512 {
    let mut hasher = Sha512::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Ordered, count-prefixed fold over a node list.
///
/// The list length is hashed before the elements, and each element is
/// length-prefixed, so `["ab","c"]` and `["a","bc"]` hash differently: the
/// structure is bound, not just the content.
pub fn hash_counted<T: AsRef<[u8]>>(nodes: &[T]) -> Hash512 {
    let mut hasher = Sha512::new();
    hasher.update((nodes.len() as u64).to_be_bytes());
    for node in nodes {
        let bytes = node.as_ref();
        hasher.update((bytes.len() as u64).to_be_bytes());
        hasher.update(bytes);
    }
    hasher.finalize().into()
}
