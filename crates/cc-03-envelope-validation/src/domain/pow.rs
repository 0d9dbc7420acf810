//! # Presentation Proof-of-Work
//!
//! Presentation envelopes have no prior chain record to rate-limit them, so
//! gossip acceptance is gated by a small proof-of-work: the hash of
//! (envelope hash, nonce) must clear a leading-zero-bit target. The search
//! loop is interruptible and runs outside the validation pool.

use shared_crypto::sha2_512;
use shared_types::Hash512;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowConfig {
    /// Required leading zero bits.
    pub difficulty_bits: u8,
    /// How many nonces to try between cancellation checks.
    pub check_interval: u64,
}

impl Default for PowConfig {
    fn default() -> Self {
        Self {
            difficulty_bits: 16,
            check_interval: 4096,
        }
    }
}

/// The hash the difficulty target applies to.
pub fn pow_digest(base_hash: &[u8], nonce: u64) -> Hash512 {
    let mut data = Vec::with_capacity(base_hash.len() + 8);
    data.extend_from_slice(base_hash);
    data.extend_from_slice(&nonce.to_be_bytes());
    sha2_512(&data)
}

/// Whether a digest clears the leading-zero-bit target.
pub fn meets_difficulty(digest: &[u8], difficulty_bits: u8) -> bool {
    let full_bytes = (difficulty_bits / 8) as usize;
    let rem_bits = difficulty_bits % 8;
    if digest.len() < full_bytes + usize::from(rem_bits > 0) {
        return false;
    }
    if digest[..full_bytes].iter().any(|&b| b != 0) {
        return false;
    }
    if rem_bits > 0 {
        let mask = 0xFFu8 << (8 - rem_bits);
        if digest[full_bytes] & mask != 0 {
            return false;
        }
    }
    true
}

/// Search for a nonce clearing the target. Checks the cancel flag every
/// `check_interval` nonces; returns `None` when cancelled or the nonce
/// space is exhausted.
pub fn search_nonce(base_hash: &[u8], config: PowConfig, cancel: &AtomicBool) -> Option<u64> {
    let interval = config.check_interval.max(1);
    let mut nonce: u64 = 0;
    loop {
        if meets_difficulty(&pow_digest(base_hash, nonce), config.difficulty_bits) {
            return Some(nonce);
        }
        nonce = nonce.checked_add(1)?;
        if nonce % interval == 0 && cancel.load(Ordering::Relaxed) {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::sha3_512;

    fn easy() -> PowConfig {
        PowConfig {
            difficulty_bits: 8,
            check_interval: 64,
        }
    }

    #[test]
    fn search_finds_verifiable_nonce() {
        let base = sha3_512(b"presentation envelope");
        let cancel = AtomicBool::new(false);
        let nonce = search_nonce(&base, easy(), &cancel).expect("8 bits is quickly found");

        assert!(meets_difficulty(&pow_digest(&base, nonce), 8));
    }

    #[test]
    fn wrong_nonce_fails_target() {
        let base = sha3_512(b"presentation envelope");
        let cancel = AtomicBool::new(false);
        let nonce = search_nonce(&base, easy(), &cancel).unwrap();

        // Some neighbor nonce will fail; check a few.
        let failing = (1..16)
            .map(|delta| nonce.wrapping_add(delta))
            .find(|&n| !meets_difficulty(&pow_digest(&base, n), 8));
        assert!(failing.is_some());
    }

    #[test]
    fn cancel_stops_the_search() {
        let base = sha3_512(b"never found");
        let cancel = AtomicBool::new(true);
        let config = PowConfig {
            difficulty_bits: 64, // practically unreachable
            check_interval: 8,
        };

        assert_eq!(search_nonce(&base, config, &cancel), None);
    }

    #[test]
    fn difficulty_handles_partial_bytes() {
        let digest = [0x07u8; 64]; // 5 leading zero bits
        assert!(meets_difficulty(&digest, 5));
        assert!(!meets_difficulty(&digest, 6));

        let zero = [0u8; 64];
        assert!(meets_difficulty(&zero, 64));
    }
}
