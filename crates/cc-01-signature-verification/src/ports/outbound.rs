//! # Outbound Ports (Driven Ports)
//!
//! The scheme backend registry: how the dispatcher reaches concrete
//! post-quantum implementations without naming any of them.

use shared_crypto::SignatureScheme;
use shared_types::KeyFamily;
use std::sync::Arc;

/// Resolves a key family to its scheme backend.
///
/// Implementations must be thread-safe; the dispatcher calls this from a
/// rayon pool during batch verification.
pub trait SchemeRegistry: Send + Sync {
    /// The backend for a family, or `None` when the family has no backend
    /// installed — which the dispatcher reports as `InvalidKeyType`.
    fn scheme(&self, family: KeyFamily) -> Option<Arc<dyn SignatureScheme>>;
}
