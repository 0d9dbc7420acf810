//! # Commitment Opening
//!
//! Secret-family keys are published as a commitment: a dual hash over the
//! component public keys and two nonces. At signing time the signature
//! reveals the keys and the nonces; the recomputed dual hash must equal the
//! on-record commitment before any component signature is even looked at.

use shared_crypto::dual_hash;
use shared_types::{CommittedKey, DualHash, NextKeyPromise, SecretComponentSignature};

/// Recompute the commitment a set of revealed components opens.
pub fn commitment_opening(
    components: &[&SecretComponentSignature],
    nonce1: u64,
    nonce2: u64,
) -> DualHash {
    let mut buf = Vec::new();
    for component in components {
        buf.extend_from_slice(&component.revealed_key.public);
    }
    buf.extend_from_slice(&nonce1.to_be_bytes());
    buf.extend_from_slice(&nonce2.to_be_bytes());
    dual_hash(&buf)
}

/// Whether the revealed components and the signature's nonces open the
/// key's published commitment.
pub fn promise_holds(
    key: &CommittedKey,
    components: &[&SecretComponentSignature],
    promise: &NextKeyPromise,
) -> bool {
    commitment_opening(components, promise.nonce1, promise.nonce2) == key.commitment
}
