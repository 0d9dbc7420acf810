//! # Digest Verification Subsystem (CC-04)
//!
//! Validates compacted historical snapshots: a bottom-up recomputation of
//! the digest's hash hierarchy (file parts → files → indices → channels →
//! digest), a dual-hash root comparison, a moderator key-role gate, and the
//! digest signature itself.
//!
//! Every interior node's hash is an ordered, count-prefixed fold of its
//! children, so the structure is bound, not just the content. A mismatch is
//! attributed to the most specific node that failed.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::descriptor::{
    ChannelDescriptor, DigestDescriptor, DigestEnvelope, FileDescriptor, FilePartDescriptor,
    IndexDescriptor,
};
pub use domain::tree::{rebuild_hashes, signing_hash, verify_tree, DigestNode};
pub use ports::inbound::DigestValidationApi;
pub use ports::outbound::{DigestReferenceFetch, ModeratorKeyDirectory};
pub use service::{DigestValidationConfig, DigestValidationService};
