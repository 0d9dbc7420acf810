//! # Cryptographic Key Variants
//!
//! The closed set of key families the trust core dispatches over, with the
//! parameter sets each family declares. Dispatch is an exhaustive `match`
//! over this enum so that adding a family forces every dispatcher to be
//! revisited.
//!
//! Private material never appears here; it is owned by the key lifecycle
//! subsystem. These types carry public material and declared parameters only.

use crate::entities::DualHash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output width of the hash function a key signs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashBits {
    B256,
    B512,
}

impl HashBits {
    pub const fn byte_len(self) -> usize {
        match self {
            Self::B256 => 32,
            Self::B512 => 64,
        }
    }

    pub const fn bits(self) -> u16 {
        match self {
            Self::B256 => 256,
            Self::B512 => 512,
        }
    }
}

impl fmt::Display for HashBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// NIST-style security category declared by a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityCategory {
    Category1,
    Category3,
    Category5,
}

/// Identifies the algorithm family of a key, independent of its parameters.
///
/// Used as the lookup key into the scheme backend registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyFamily {
    Xmss,
    XmssMt,
    QTesla,
    NtruPrime,
    McEliece,
}

impl fmt::Display for KeyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Xmss => "xmss",
            Self::XmssMt => "xmss-mt",
            Self::QTesla => "qtesla",
            Self::NtruPrime => "ntru-prime",
            Self::McEliece => "mceliece",
        };
        f.write_str(name)
    }
}

/// Public side of a stateful hash-tree key (XMSS family).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeKey {
    /// Tree height: the key holds `2^height` one-time leaves.
    pub height: u8,
    /// Number of stacked subtrees; 1 for plain XMSS.
    pub layers: u8,
    /// Width of the message hash the key signs.
    pub hash_bits: HashBits,
    /// Root / public key bytes.
    pub public: Vec<u8>,
}

impl TreeKey {
    /// Total number of one-time leaves this key can ever sign with.
    pub fn leaf_count(&self) -> u64 {
        1u64 << (self.height as u32 * self.layers as u32)
    }
}

/// Public side of a category-parameterized key (lattice / code based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryKey {
    pub category: SecurityCategory,
    pub public: Vec<u8>,
}

/// A secret-family key as recorded on chain: the public material is not
/// published, only a commitment to it. The signature reveals the component
/// public keys and the nonces that open the commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedKey {
    /// Declared category per component; one entry for single-component keys.
    pub component_categories: Vec<SecurityCategory>,
    /// Dual hash over the concatenated component public keys and the two
    /// opening nonces.
    pub commitment: DualHash,
}

impl CommittedKey {
    pub fn component_count(&self) -> usize {
        self.component_categories.len()
    }
}

/// A public key instance as recorded in chain history.
///
/// The closed set of key variants; every dispatcher matches exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CryptographicKey {
    Xmss(TreeKey),
    XmssMt(TreeKey),
    QTesla(CommittedKey),
    SecretDouble(CommittedKey),
    SecretCombo(CommittedKey),
    SecretPenta(CommittedKey),
    NtruPrime(CategoryKey),
    McEliece(CategoryKey),
}

impl CryptographicKey {
    /// The backend family this key verifies under. Composite secret keys
    /// resolve their components through the QTesla family.
    pub fn family(&self) -> KeyFamily {
        match self {
            Self::Xmss(_) => KeyFamily::Xmss,
            Self::XmssMt(_) => KeyFamily::XmssMt,
            Self::QTesla(_) | Self::SecretDouble(_) | Self::SecretCombo(_)
            | Self::SecretPenta(_) => KeyFamily::QTesla,
            Self::NtruPrime(_) => KeyFamily::NtruPrime,
            Self::McEliece(_) => KeyFamily::McEliece,
        }
    }

    /// Public material bytes, when the variant carries them directly.
    /// Secret-family keys publish only a commitment, so they return `None`.
    pub fn public_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Xmss(k) | Self::XmssMt(k) => Some(&k.public),
            Self::NtruPrime(k) | Self::McEliece(k) => Some(&k.public),
            Self::QTesla(_) | Self::SecretDouble(_) | Self::SecretCombo(_)
            | Self::SecretPenta(_) => None,
        }
    }

    /// Number of component signatures a signature over this key must carry.
    pub fn expected_components(&self) -> usize {
        match self {
            Self::QTesla(k) | Self::SecretDouble(k) | Self::SecretCombo(k)
            | Self::SecretPenta(k) => k.component_count(),
            _ => 1,
        }
    }
}

/// Lifecycle status of a wallet-held key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletKeyStatus {
    /// Generated but never announced on chain.
    New,
    /// Announced and usable for signing.
    Ready,
    /// A replacement key has been staged; the key is winding down.
    Changing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_key_leaf_count() {
        let key = TreeKey {
            height: 10,
            layers: 1,
            hash_bits: HashBits::B512,
            public: vec![0u8; 64],
        };
        assert_eq!(key.leaf_count(), 1024);

        let layered = TreeKey {
            height: 5,
            layers: 2,
            hash_bits: HashBits::B512,
            public: vec![0u8; 64],
        };
        assert_eq!(layered.leaf_count(), 1024);
    }

    #[test]
    fn secret_variants_hide_public_material() {
        let combo = CryptographicKey::SecretCombo(CommittedKey {
            component_categories: vec![
                SecurityCategory::Category1,
                SecurityCategory::Category3,
                SecurityCategory::Category5,
            ],
            commitment: DualHash::ZERO,
        });

        assert!(combo.public_bytes().is_none());
        assert_eq!(combo.expected_components(), 3);
        assert_eq!(combo.family(), KeyFamily::QTesla);

        let single = CryptographicKey::QTesla(CommittedKey {
            component_categories: vec![SecurityCategory::Category3],
            commitment: DualHash::ZERO,
        });
        assert!(single.public_bytes().is_none());
        assert_eq!(single.expected_components(), 1);
    }

    #[test]
    fn hash_bits_widths() {
        assert_eq!(HashBits::B256.byte_len(), 32);
        assert_eq!(HashBits::B512.byte_len(), 64);
        assert_eq!(HashBits::B512.bits(), 512);
    }
}
