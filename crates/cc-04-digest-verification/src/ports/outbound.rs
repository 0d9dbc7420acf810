//! # Outbound Ports (Driven Ports)

use async_trait::async_trait;
use shared_types::{CryptographicKey, DualHash, KeyOrdinal, ValidationFatal};

/// Externally published digest hashes, used as an optional extra
/// verification layer.
#[async_trait]
pub trait DigestReferenceFetch: Send + Sync {
    async fn digest_hash(&self, digest_id: u32) -> Result<Option<DualHash>, ValidationFatal>;
}

/// Lookup of moderator public keys by ordinal and key sequence.
#[async_trait]
pub trait ModeratorKeyDirectory: Send + Sync {
    async fn moderator_key(
        &self,
        ordinal: KeyOrdinal,
        key_sequence: u32,
    ) -> Result<Option<CryptographicKey>, ValidationFatal>;
}
