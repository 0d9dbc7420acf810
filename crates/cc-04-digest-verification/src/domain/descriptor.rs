//! # Digest Descriptor Hierarchy
//!
//! Digest → Channel → Index → File → FilePart. Every node stores the hash
//! its children must fold to; the digest root stores a dual hash.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_types::{DualHash, Hash512, PublishedSignature};

/// Leaf: one slice of one archived file.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePartDescriptor {
    pub ordinal: u32,
    #[serde_as(as = "Bytes")]
    pub hash: Hash512,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub ordinal: u32,
    #[serde_as(as = "Bytes")]
    pub hash: Hash512,
    pub parts: Vec<FilePartDescriptor>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub ordinal: u32,
    #[serde_as(as = "Bytes")]
    pub hash: Hash512,
    pub files: Vec<FileDescriptor>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    pub ordinal: u32,
    #[serde_as(as = "Bytes")]
    pub hash: Hash512,
    pub indices: Vec<IndexDescriptor>,
}

/// The digest root. Its own hash is a dual hash: two independent functions
/// over the same recomputed body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestDescriptor {
    pub id: u32,
    pub hash: DualHash,
    pub channels: Vec<ChannelDescriptor>,
}

/// A digest with its moderator signature, as published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestEnvelope {
    pub descriptor: DigestDescriptor,
    pub signature: PublishedSignature,
}
