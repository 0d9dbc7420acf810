//! # Inbound Ports (Driving Ports / API)

use crate::domain::descriptor::DigestEnvelope;
use async_trait::async_trait;
use shared_types::{ValidationFatal, ValidationResult};

/// Digest validation API.
#[async_trait]
pub trait DigestValidationApi: Send + Sync {
    /// Validate a published digest: key-role gate, hash-tree recomputation,
    /// optional online reference check, then the signature.
    async fn validate_digest(
        &self,
        envelope: &DigestEnvelope,
    ) -> Result<ValidationResult, ValidationFatal>;
}
