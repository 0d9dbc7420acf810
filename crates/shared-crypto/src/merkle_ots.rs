//! # Merkle One-Time Scheme (reference backend)
//!
//! A genuine stateful hash-based signature scheme: Lamport one-time leaves
//! under a Merkle tree, with HMAC-SHA512 leaf derivation from a single seed.
//! Each leaf may sign exactly once; the public key is the tree root; a
//! signature carries the revealed secret chunks, the complementary chunk
//! hashes, and the authentication path to the root.
//!
//! This is the in-workspace backend behind the `SignatureScheme` contract.
//! Production XMSS/XMSS^MT/QTesla/NTRU/McEliece backends replace it without
//! touching the dispatcher or the lifecycle manager.
//!
//! Signing recomputes the full tree from the seed; acceptable at the tree
//! heights the trust core uses for tests and reference wiring.

use crate::errors::CryptoError;
use crate::hashing::{node_hash, sha2_512};
use crate::signatures::{DeclaredParams, PrivateMaterial, SignOutput, SignatureScheme};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use shared_types::Hash512;

type HmacSha512 = Hmac<Sha512>;

/// Revealed secret chunks are truncated HMAC output.
const CHUNK_SECRET_LEN: usize = 32;

/// Wire form of a signature. Bincode-encoded into the envelope's signature
/// bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OtsSignature {
    leaf_index: u64,
    /// One revealed 32-byte secret per message-hash bit.
    reveals: Vec<Vec<u8>>,
    /// The 64-byte public hash of the chunk that was NOT revealed, per bit.
    complements: Vec<Vec<u8>>,
    /// Sibling hashes from the leaf to the root.
    auth_path: Vec<Vec<u8>>,
}

/// The reference scheme. Stateless; all state lives in `PrivateMaterial`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MerkleOtsScheme;

impl MerkleOtsScheme {
    pub fn new() -> Self {
        Self
    }
}

fn chunk_secret(seed: &[u8], leaf: u64, bit_pos: u32, bit_val: u8) -> Vec<u8> {
    let mut mac = HmacSha512::new_from_slice(seed).expect("HMAC accepts any key length");
    mac.update(&leaf.to_be_bytes());
    mac.update(&bit_pos.to_be_bytes());
    mac.update(&[bit_val]);
    mac.finalize().into_bytes()[..CHUNK_SECRET_LEN].to_vec()
}

fn chunk_public(secret: &[u8]) -> Hash512 {
    sha2_512(secret)
}

/// Leaf public key: hash over all chunk publics in (bit position, bit value)
/// order.
fn leaf_public(seed: &[u8], leaf: u64, n_bits: u32) -> Hash512 {
    use sha2::Digest;
    let mut hasher = Sha512::new();
    for bit_pos in 0..n_bits {
        for bit_val in 0..2u8 {
            let secret = chunk_secret(seed, leaf, bit_pos, bit_val);
            hasher.update(chunk_public(&secret));
        }
    }
    hasher.finalize().into()
}

/// All tree levels, leaves first. `levels[0]` has `2^height` entries,
/// `levels[height]` is the single root.
fn build_levels(seed: &[u8], height: u8, n_bits: u32) -> Vec<Vec<Hash512>> {
    let leaf_count = 1usize << height;
    let mut levels: Vec<Vec<Hash512>> = Vec::with_capacity(height as usize + 1);

    let leaves: Vec<Hash512> = (0..leaf_count)
        .map(|leaf| leaf_public(seed, leaf as u64, n_bits))
        .collect();
    levels.push(leaves);

    for _ in 0..height {
        let below = levels.last().expect("levels is never empty");
        let above: Vec<Hash512> = below
            .chunks(2)
            .map(|pair| node_hash(&pair[0], &pair[1]))
            .collect();
        levels.push(above);
    }
    levels
}

fn message_bit(message_hash: &[u8], bit_pos: u32) -> u8 {
    let byte = message_hash[(bit_pos / 8) as usize];
    (byte >> (7 - bit_pos % 8)) & 1
}

impl SignatureScheme for MerkleOtsScheme {
    fn verify(
        &self,
        message_hash: &[u8],
        signature: &[u8],
        public_key: &[u8],
        declared: &DeclaredParams,
    ) -> Result<bool, CryptoError> {
        let expected_len = declared.hash_bits.byte_len();
        if message_hash.len() != expected_len {
            return Err(CryptoError::WrongHashLength {
                expected: expected_len,
                actual: message_hash.len(),
            });
        }
        if public_key.len() != 64 {
            return Err(CryptoError::ParameterMismatch {
                declared: "64-byte tree root".into(),
                material: format!("{}-byte public key", public_key.len()),
            });
        }

        let sig: OtsSignature = match bincode::deserialize(signature) {
            Ok(sig) => sig,
            Err(_) => return Ok(false),
        };

        if let Some(height) = declared.tree_height {
            // Layered keys fold their layers into one flat index space.
            let layers = declared.tree_layers.unwrap_or(1).max(1);
            let effective = height as usize * layers as usize;
            if sig.auth_path.len() != effective {
                return Err(CryptoError::ParameterMismatch {
                    declared: format!("tree height {height} x{layers}"),
                    material: format!("auth path of {}", sig.auth_path.len()),
                });
            }
            if sig.leaf_index >= 1u64 << (effective as u32) {
                return Ok(false);
            }
        }

        let n_bits = (expected_len * 8) as u32;
        if sig.reveals.len() != n_bits as usize || sig.complements.len() != n_bits as usize {
            return Ok(false);
        }

        // Rebuild the leaf public key from the revealed and complementary
        // chunks, in the same order key generation used.
        use sha2::Digest;
        let mut hasher = Sha512::new();
        for bit_pos in 0..n_bits {
            let revealed = &sig.reveals[bit_pos as usize];
            let complement = &sig.complements[bit_pos as usize];
            if revealed.len() != CHUNK_SECRET_LEN || complement.len() != 64 {
                return Ok(false);
            }
            let revealed_public = chunk_public(revealed);
            if message_bit(message_hash, bit_pos) == 0 {
                hasher.update(revealed_public);
                hasher.update(complement);
            } else {
                hasher.update(complement);
                hasher.update(revealed_public);
            }
        }
        let mut current: Hash512 = hasher.finalize().into();

        // Fold the authentication path up to the root.
        let mut index = sig.leaf_index;
        for sibling in &sig.auth_path {
            if sibling.len() != 64 {
                return Ok(false);
            }
            current = if index & 1 == 0 {
                node_hash(&current, sibling)
            } else {
                node_hash(sibling, &current)
            };
            index >>= 1;
        }

        Ok(current.as_slice() == public_key)
    }

    fn sign(
        &self,
        message_hash: &[u8],
        material: PrivateMaterial,
    ) -> Result<SignOutput, CryptoError> {
        let expected_len = material.hash_bits().byte_len();
        if message_hash.len() != expected_len {
            return Err(CryptoError::WrongHashLength {
                expected: expected_len,
                actual: message_hash.len(),
            });
        }
        if material.is_exhausted() {
            return Err(CryptoError::LeafExhausted {
                index: material.use_index(),
                maximum: material.leaf_count(),
            });
        }

        let leaf = material.use_index();
        let height = material.tree_height();
        let n_bits = (expected_len * 8) as u32;

        let mut reveals = Vec::with_capacity(n_bits as usize);
        let mut complements = Vec::with_capacity(n_bits as usize);
        for bit_pos in 0..n_bits {
            let bit = message_bit(message_hash, bit_pos);
            let revealed = chunk_secret(material.seed(), leaf, bit_pos, bit);
            let hidden = chunk_secret(material.seed(), leaf, bit_pos, 1 - bit);
            reveals.push(revealed);
            complements.push(chunk_public(&hidden).to_vec());
        }

        let levels = build_levels(material.seed(), height, n_bits);
        let mut auth_path = Vec::with_capacity(height as usize);
        let mut index = leaf;
        for level in levels.iter().take(height as usize) {
            let sibling = index ^ 1;
            auth_path.push(level[sibling as usize].to_vec());
            index >>= 1;
        }

        let signature = OtsSignature {
            leaf_index: leaf,
            reveals,
            complements,
            auth_path,
        };
        let bytes = bincode::serialize(&signature)
            .map_err(|e| CryptoError::Backend(format!("signature encoding failed: {e}")))?;

        Ok(SignOutput {
            signature: bytes,
            advanced: material.advanced(),
        })
    }

    fn public_key(&self, material: &PrivateMaterial) -> Result<Vec<u8>, CryptoError> {
        if material.seed().is_empty() {
            return Err(CryptoError::MalformedMaterial("empty seed".into()));
        }
        let n_bits = (material.hash_bits().byte_len() * 8) as u32;
        let levels = build_levels(material.seed(), material.tree_height(), n_bits);
        let root = levels
            .last()
            .and_then(|level| level.first())
            .ok_or_else(|| CryptoError::Backend("empty tree".into()))?;
        Ok(root.to_vec())
    }
}
