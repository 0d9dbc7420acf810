//! # Inbound Ports (Driving Ports / API)
//!
//! The public API of the signature verification subsystem.

use crate::domain::dispatch::SignatureCheck;
use shared_types::{AccountSignature, CryptographicKey, HashBits, ValidationResult};

/// Primary signature verification API.
///
/// Implementations must be thread-safe (`Send + Sync`); envelope validators
/// call them from a worker pool.
pub trait SignatureVerificationApi: Send + Sync {
    /// Verify one account signature against its resolved key.
    ///
    /// `key` is `None` only for presentation signatures, which carry their
    /// own public key. `hash_bits` is the width the signing role requires;
    /// a hash of any other length is a `BitSizeMismatch`.
    fn verify_account_signature(
        &self,
        message_hash: &[u8],
        hash_bits: HashBits,
        signature: &AccountSignature,
        key: Option<&CryptographicKey>,
    ) -> ValidationResult;

    /// Verify raw signature bytes against a directly-known key, e.g. a
    /// moderator block key or an embedded genesis key.
    fn verify_bare_signature(
        &self,
        message_hash: &[u8],
        hash_bits: HashBits,
        signature_bytes: &[u8],
        key: &CryptographicKey,
    ) -> ValidationResult;

    /// Verify many independent checks in parallel.
    ///
    /// Order of results matches the order of requests.
    fn batch_verify(&self, checks: &[SignatureCheck]) -> Vec<ValidationResult>;
}
