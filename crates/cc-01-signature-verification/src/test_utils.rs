//! Deterministic fixtures for exercising the dispatcher with real
//! signatures from the reference scheme. Used by this crate's tests, the
//! envelope validators' tests, and the workspace test suite.

use shared_crypto::{sha2_512, MerkleOtsScheme, PrivateMaterial, SignatureScheme};
use shared_types::{
    AccountId, AccountSignature, CategoryKey, CommittedKey, CryptographicKey, DualHash, HashBits,
    KeyAddress, KeyOrdinal, KeyUseIndexSet, NextKeyPromise, PublishedSignature,
    SecretComponentSignature, SecurityCategory, TransactionId, TreeKey,
};

/// Expand a label into a reproducible seed.
pub fn deterministic_seed(label: &str) -> Vec<u8> {
    sha2_512(label.as_bytes()).to_vec()
}

/// A stateful signer over the reference scheme. Holds the private material
/// across signatures the same way a wallet would.
pub struct TreeSigner {
    material: Option<PrivateMaterial>,
    public: Vec<u8>,
    height: u8,
    hash_bits: HashBits,
}

impl TreeSigner {
    pub fn new(label: &str, height: u8, hash_bits: HashBits) -> Self {
        let scheme = MerkleOtsScheme::new();
        let material = PrivateMaterial::new(deterministic_seed(label), height, hash_bits);
        let public = scheme
            .public_key(&material)
            .expect("reference scheme derives a public key");
        Self {
            material: Some(material),
            public,
            height,
            hash_bits,
        }
    }

    /// Sign and advance to the next leaf.
    pub fn sign(&mut self, message_hash: &[u8]) -> Vec<u8> {
        let scheme = MerkleOtsScheme::new();
        let material = self.material.take().expect("signer still has material");
        let output = scheme
            .sign(message_hash, material)
            .expect("reference scheme signs");
        self.material = Some(output.advanced);
        output.signature
    }

    pub fn public_bytes(&self) -> &[u8] {
        &self.public
    }

    pub fn use_index(&self) -> u64 {
        self.material
            .as_ref()
            .map(|m| m.use_index())
            .unwrap_or_default()
    }

    pub fn tree_key(&self) -> TreeKey {
        TreeKey {
            height: self.height,
            layers: 1,
            hash_bits: self.hash_bits,
            public: self.public.clone(),
        }
    }

    pub fn xmss_key(&self) -> CryptographicKey {
        CryptographicKey::Xmss(self.tree_key())
    }

    /// Take the material out, e.g. to hand it to a lifecycle manager.
    pub fn into_material(mut self) -> PrivateMaterial {
        self.material.take().expect("signer still has material")
    }
}

/// A key address for tests; the index set reflects the given use index.
pub fn key_address(
    account: AccountId,
    ordinal: KeyOrdinal,
    announcement_height: u64,
    use_index: u64,
) -> KeyAddress {
    KeyAddress {
        account,
        ordinal,
        announcement_height,
        declaration_tx: TransactionId::new(account, 1_000 + announcement_height),
        index_set: KeyUseIndexSet::new(1, use_index, ordinal),
    }
}

/// A published signature over `message_hash`, embedding no key.
pub fn published_signature(
    signer: &mut TreeSigner,
    address: KeyAddress,
    message_hash: &[u8],
) -> AccountSignature {
    AccountSignature::Published(PublishedSignature {
        address,
        embedded_key: None,
        bytes: signer.sign(message_hash),
    })
}

/// A secret-single key record and a signature that opens it.
///
/// Returns (on-record key, signature) where the commitment is the dual hash
/// of the revealed component public key and the two nonces.
pub fn secret_single_fixture(
    label: &str,
    address: KeyAddress,
    message_hash: &[u8],
    hash_bits: HashBits,
) -> (CryptographicKey, AccountSignature) {
    let mut signer = TreeSigner::new(label, 2, hash_bits);
    let bytes = signer.sign(message_hash);
    let component = SecretComponentSignature {
        revealed_key: CategoryKey {
            category: SecurityCategory::Category3,
            public: signer.public_bytes().to_vec(),
        },
        bytes,
    };

    let (nonce1, nonce2) = (41, 42);
    let commitment = crate::domain::promise::commitment_opening(&[&component], nonce1, nonce2);
    let key = CryptographicKey::QTesla(CommittedKey {
        component_categories: vec![SecurityCategory::Category3],
        commitment,
    });
    let signature = AccountSignature::SecretSingle {
        address,
        promise: NextKeyPromise {
            commitment: DualHash::ZERO,
            nonce1,
            nonce2,
        },
        component,
    };
    (key, signature)
}

/// A composite secret key record with `count` components and its signature.
pub fn secret_multi_fixture(
    label: &str,
    address: KeyAddress,
    message_hash: &[u8],
    hash_bits: HashBits,
    count: usize,
) -> (CryptographicKey, AccountSignature) {
    let mut components = Vec::with_capacity(count);
    for i in 0..count {
        let mut signer = TreeSigner::new(&format!("{label}-component-{i}"), 2, hash_bits);
        let bytes = signer.sign(message_hash);
        components.push(SecretComponentSignature {
            revealed_key: CategoryKey {
                category: SecurityCategory::Category3,
                public: signer.public_bytes().to_vec(),
            },
            bytes,
        });
    }

    let (nonce1, nonce2) = (7, 11);
    let refs: Vec<&SecretComponentSignature> = components.iter().collect();
    let commitment = crate::domain::promise::commitment_opening(&refs, nonce1, nonce2);
    let committed = CommittedKey {
        component_categories: vec![SecurityCategory::Category3; count],
        commitment,
    };
    let promise = NextKeyPromise {
        commitment: DualHash::ZERO,
        nonce1,
        nonce2,
    };

    let (key, signature) = match count {
        2 => (
            CryptographicKey::SecretDouble(committed),
            AccountSignature::SecretCombo {
                address,
                promise,
                components,
            },
        ),
        5 => (
            CryptographicKey::SecretPenta(committed),
            AccountSignature::SecretPenta {
                address,
                promise,
                components,
            },
        ),
        _ => (
            CryptographicKey::SecretCombo(committed),
            AccountSignature::SecretCombo {
                address,
                promise,
                components,
            },
        ),
    };
    (key, signature)
}

/// A presentation signature carrying its own public key.
pub fn presentation_fixture(
    label: &str,
    account: AccountId,
    message_hash: &[u8],
    hash_bits: HashBits,
) -> AccountSignature {
    let mut signer = TreeSigner::new(label, 2, hash_bits);
    let bytes = signer.sign(message_hash);
    AccountSignature::Presentation {
        account,
        declared_category: SecurityCategory::Category3,
        public_key: signer.public_bytes().to_vec(),
        bytes,
        pow_nonce: 0,
    }
}
