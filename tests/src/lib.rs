//! # Citadel-Chain Test Suite
//!
//! Cross-subsystem integration scenarios: the lifecycle manager signing
//! envelopes that the validators then judge, rotation and swap flows, and
//! the gate keeping the two sides honest.

#[cfg(test)]
pub mod integration;

/// Install a test subscriber once; later calls are no-ops.
#[cfg(test)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_test_writer()
        .try_init();
}
