//! # Fast-Key Reconciliation
//!
//! The decision core of the fast-key path: given what the flat index knows,
//! what the envelope embeds, and where the node stands relative to the
//! public chain, decide how key resolution proceeds. Pure logic — the
//! service supplies the port lookups.

use shared_types::{BlockHeight, CryptographicKey, NodeSyncStatus};
use subtle::ConstantTimeEq;
use tracing::warn;

/// Outcome of consulting the fast-key index for one address.
#[derive(Debug, PartialEq, Eq)]
pub enum FastResolution {
    /// Index disabled, empty, or unreadable: fall back to full resolution.
    NoResult,
    /// The embedded key differs byte-for-byte from the indexed key. This is
    /// corruption or substitution, semantically distinct from a signature
    /// that fails to verify.
    EmbeddedMismatch,
    /// The node cannot resolve the key authoritatively but the desync
    /// window permits trusting the embedded key, provisionally.
    DesyncFallback,
    /// The index produced the concrete key for full dispatch.
    Resolved(CryptographicKey),
}

/// Whether the announcement height sits in the window where the embedded
/// key may be trusted: ahead of what this node has on disk, but at or below
/// what is publicly known to exist.
pub fn in_desync_window(announcement_height: BlockHeight, sync: &NodeSyncStatus) -> bool {
    announcement_height > sync.disk_height
        && announcement_height <= sync.public_height
        && sync.allows_embedded_fallback()
}

/// Reconcile the indexed key bytes with any embedded key.
///
/// `indexed` is the canonical encoding of the on-record key as stored by the
/// fast-key index; comparison with the embedded key's encoding is
/// constant-time.
pub fn reconcile_fast_key(
    enabled: bool,
    indexed: Option<&[u8]>,
    embedded: Option<&CryptographicKey>,
    announcement_height: BlockHeight,
    sync: &NodeSyncStatus,
) -> FastResolution {
    if !enabled {
        return FastResolution::NoResult;
    }

    let Some(indexed) = indexed.filter(|bytes| !bytes.is_empty()) else {
        if embedded.is_some() && in_desync_window(announcement_height, sync) {
            return FastResolution::DesyncFallback;
        }
        return FastResolution::NoResult;
    };

    if let Some(embedded) = embedded {
        match bincode::serialize(embedded) {
            Ok(embedded_bytes) => {
                if embedded_bytes.ct_eq(indexed).unwrap_u8() == 0 {
                    return FastResolution::EmbeddedMismatch;
                }
            }
            Err(e) => {
                warn!(error = %e, "embedded key failed to encode for comparison");
                return FastResolution::EmbeddedMismatch;
            }
        }
    }

    match bincode::deserialize::<CryptographicKey>(indexed) {
        Ok(key) => FastResolution::Resolved(key),
        Err(e) => {
            // A corrupt index entry must not poison validation; the full
            // path re-derives the key from history.
            warn!(error = %e, "fast-key index entry failed to decode");
            FastResolution::NoResult
        }
    }
}
