//! # Shared Crypto Crate
//!
//! Hashing primitives and the signature-scheme capability contract for the
//! trust core.
//!
//! Concrete production schemes (XMSS, XMSS^MT, QTesla, NTRU-Prime, McEliece)
//! live outside this workspace and plug in through the [`SignatureScheme`]
//! trait. This crate ships one genuine implementation — `merkle_ots`, a
//! Lamport-under-Merkle one-time scheme — so the dispatcher, lifecycle
//! manager, and test suite exercise real stateful signatures end to end.

pub mod errors;
pub mod hashing;
pub mod merkle_ots;
pub mod signatures;

pub use errors::CryptoError;
pub use hashing::{
    dual_hash, hash_counted, node_hash, sha2_256, sha2_512, sha3_256, sha3_512, width_hash,
};
pub use merkle_ots::MerkleOtsScheme;
pub use signatures::{DeclaredParams, PrivateMaterial, SignOutput, SignatureScheme};
