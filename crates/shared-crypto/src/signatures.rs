//! # Signature Scheme Capability Contract
//!
//! The trust core never names a concrete post-quantum implementation; it
//! depends on this trait. Verification is pure; signing consumes one leaf of
//! the private material, which is a one-time, non-reversible resource.
//!
//! `PrivateMaterial` is deliberately move-only: `sign` takes it by value and
//! returns the advanced state, so signing twice from the same pre-advancement
//! state is a compile error, not a runtime bug.

use crate::errors::CryptoError;
use shared_types::{HashBits, SecurityCategory};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Parameters a key declares about itself, checked against the material on
/// every operation. A disagreement fails the operation; it never panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredParams {
    pub hash_bits: HashBits,
    pub tree_height: Option<u8>,
    pub tree_layers: Option<u8>,
    pub category: Option<SecurityCategory>,
}

impl DeclaredParams {
    pub fn tree(height: u8, layers: u8, hash_bits: HashBits) -> Self {
        Self {
            hash_bits,
            tree_height: Some(height),
            tree_layers: Some(layers),
            category: None,
        }
    }

    pub fn category(category: SecurityCategory, hash_bits: HashBits) -> Self {
        Self {
            hash_bits,
            tree_height: None,
            tree_layers: None,
            category: Some(category),
        }
    }
}

/// Private key material for a stateful scheme. Move-only and zeroized on
/// drop; the `use_index` is the scheme state.
///
/// No `Clone`: the only way to obtain a usable successor state is through
/// [`SignatureScheme::sign`], which consumes this one.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateMaterial {
    seed: Vec<u8>,
    #[zeroize(skip)]
    tree_height: u8,
    #[zeroize(skip)]
    hash_bits: HashBits,
    #[zeroize(skip)]
    use_index: u64,
}

impl std::fmt::Debug for PrivateMaterial {
    /// The seed never appears in logs or panics.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateMaterial")
            .field("seed", &"<redacted>")
            .field("tree_height", &self.tree_height)
            .field("hash_bits", &self.hash_bits)
            .field("use_index", &self.use_index)
            .finish()
    }
}

impl PrivateMaterial {
    pub fn new(seed: Vec<u8>, tree_height: u8, hash_bits: HashBits) -> Self {
        Self {
            seed,
            tree_height,
            hash_bits,
            use_index: 0,
        }
    }

    /// Restore material at a specific index, e.g. when loading a wallet.
    pub fn at_index(seed: Vec<u8>, tree_height: u8, hash_bits: HashBits, use_index: u64) -> Self {
        Self {
            seed,
            tree_height,
            hash_bits,
            use_index,
        }
    }

    pub fn seed(&self) -> &[u8] {
        &self.seed
    }

    pub fn tree_height(&self) -> u8 {
        self.tree_height
    }

    pub fn hash_bits(&self) -> HashBits {
        self.hash_bits
    }

    /// The leaf the next signature will consume.
    pub fn use_index(&self) -> u64 {
        self.use_index
    }

    /// Total leaves this material can ever sign with.
    pub fn leaf_count(&self) -> u64 {
        1u64 << self.tree_height as u32
    }

    pub fn is_exhausted(&self) -> bool {
        self.use_index >= self.leaf_count()
    }

    /// Successor state after one signature. Crate-internal: only scheme
    /// implementations advance material.
    pub(crate) fn advanced(mut self) -> Self {
        let seed = std::mem::take(&mut self.seed);
        Self {
            seed,
            tree_height: self.tree_height,
            hash_bits: self.hash_bits,
            use_index: self.use_index + 1,
        }
    }
}

/// A produced signature together with the advanced private state.
///
/// The caller owns both; persisting `advanced` before releasing `signature`
/// is the lifecycle manager's job.
#[derive(Debug)]
pub struct SignOutput {
    pub signature: Vec<u8>,
    pub advanced: PrivateMaterial,
}

/// The verify/sign capability every scheme backend provides.
pub trait SignatureScheme: Send + Sync {
    /// Pure verification. `Ok(false)` is a failed signature; `Err` means the
    /// declared parameters and the material disagree, or the inputs could
    /// not be processed.
    fn verify(
        &self,
        message_hash: &[u8],
        signature: &[u8],
        public_key: &[u8],
        declared: &DeclaredParams,
    ) -> Result<bool, CryptoError>;

    /// Consumes one leaf. The input material is moved; the output carries
    /// the only valid successor state.
    fn sign(
        &self,
        message_hash: &[u8],
        material: PrivateMaterial,
    ) -> Result<SignOutput, CryptoError>;

    /// Derive the public key for the given material.
    fn public_key(&self, material: &PrivateMaterial) -> Result<Vec<u8>, CryptoError>;
}
