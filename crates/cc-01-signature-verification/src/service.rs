//! # Signature Verification Service
//!
//! Implements the `SignatureVerificationApi` inbound port over a scheme
//! registry. Batch verification runs on a dedicated rayon pool sized by the
//! configured parallelism level, so CPU-heavy tree schemes do not saturate
//! the process.

use crate::domain::dispatch::{verify_account_signature, SignatureCheck};
use crate::ports::inbound::SignatureVerificationApi;
use crate::ports::outbound::SchemeRegistry;
use rayon::prelude::*;
use shared_types::{
    AccountSignature, CryptographicKey, HashBits, ThreadParallelism, ValidationResult,
};
use tracing::warn;

pub struct SignatureVerificationService<R: SchemeRegistry> {
    registry: R,
    pool: Option<rayon::ThreadPool>,
}

impl<R: SchemeRegistry> SignatureVerificationService<R> {
    /// Build with the default (full) parallelism.
    pub fn new(registry: R) -> Self {
        Self::with_parallelism(registry, ThreadParallelism::Full)
    }

    pub fn with_parallelism(registry: R, parallelism: ThreadParallelism) -> Self {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let threads = parallelism.thread_count(cores);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("sig-verify-{i}"))
            .build()
            .map_err(|e| {
                warn!(%e, "falling back to the global rayon pool");
                e
            })
            .ok();
        Self { registry, pool }
    }
}

impl<R: SchemeRegistry> SignatureVerificationApi for SignatureVerificationService<R> {
    fn verify_account_signature(
        &self,
        message_hash: &[u8],
        hash_bits: HashBits,
        signature: &AccountSignature,
        key: Option<&CryptographicKey>,
    ) -> ValidationResult {
        verify_account_signature(&self.registry, message_hash, hash_bits, signature, key)
    }

    fn verify_bare_signature(
        &self,
        message_hash: &[u8],
        hash_bits: HashBits,
        signature_bytes: &[u8],
        key: &CryptographicKey,
    ) -> ValidationResult {
        crate::domain::dispatch::verify_bare_signature(
            &self.registry,
            message_hash,
            hash_bits,
            signature_bytes,
            key,
        )
    }

    fn batch_verify(&self, checks: &[SignatureCheck]) -> Vec<ValidationResult> {
        let run = || {
            checks
                .par_iter()
                .map(|check| {
                    verify_account_signature(
                        &self.registry,
                        &check.message_hash,
                        check.hash_bits,
                        &check.signature,
                        check.key.as_ref(),
                    )
                })
                .collect()
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}
