//! # Hash-Tree Recomputation
//!
//! Bottom-up fold over the descriptor hierarchy. Children are ordered by
//! their ordinal and folded with a count-prefixed hash, so neither
//! reordering nor regrouping survives recomputation.

use crate::domain::descriptor::{
    ChannelDescriptor, DigestDescriptor, FileDescriptor, IndexDescriptor,
};
use shared_crypto::{dual_hash, hash_counted, node_hash};
use shared_types::{DualHash, Hash512};

/// The most specific node a mismatch was attributed to. Ordinals identify
/// the path from the channel down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestNode {
    File {
        channel: u32,
        index: u32,
        file: u32,
    },
    Index {
        channel: u32,
        index: u32,
    },
    Channel {
        channel: u32,
    },
    Digest,
}

impl DigestNode {
    /// The root node failing means the digest hash itself is wrong; any
    /// deeper node is a descriptor mismatch.
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Digest)
    }
}

fn ordered<'a, T>(items: &'a [T], ordinal: impl Fn(&T) -> u32) -> Vec<&'a T> {
    let mut refs: Vec<&T> = items.iter().collect();
    refs.sort_by_key(|item| ordinal(item));
    refs
}

fn file_hash(file: &FileDescriptor, reverify_parts: bool) -> Hash512 {
    if !reverify_parts || file.parts.is_empty() {
        // File re-verification skipped: trust the stored hash.
        return file.hash;
    }
    let parts = ordered(&file.parts, |p| p.ordinal);
    let hashes: Vec<&[u8]> = parts.iter().map(|p| p.hash.as_slice()).collect();
    hash_counted(&hashes)
}

fn index_hash(index: &IndexDescriptor, reverify_parts: bool) -> Result<Hash512, DigestNode> {
    let files = ordered(&index.files, |f| f.ordinal);
    let mut hashes: Vec<Hash512> = Vec::with_capacity(files.len());
    for file in files {
        let recomputed = file_hash(file, reverify_parts);
        if recomputed != file.hash {
            return Err(DigestNode::File {
                channel: 0, // filled by the caller
                index: index.ordinal,
                file: file.ordinal,
            });
        }
        hashes.push(recomputed);
    }
    Ok(hash_counted(&hashes))
}

fn channel_hash(channel: &ChannelDescriptor, reverify_parts: bool) -> Result<Hash512, DigestNode> {
    let indices = ordered(&channel.indices, |i| i.ordinal);
    let mut hashes: Vec<Hash512> = Vec::with_capacity(indices.len());
    for index in indices {
        let recomputed = index_hash(index, reverify_parts).map_err(|node| match node {
            DigestNode::File { index, file, .. } => DigestNode::File {
                channel: channel.ordinal,
                index,
                file,
            },
            other => other,
        })?;
        if recomputed != index.hash {
            return Err(DigestNode::Index {
                channel: channel.ordinal,
                index: index.ordinal,
            });
        }
        hashes.push(recomputed);
    }
    Ok(hash_counted(&hashes))
}

/// The digest body the dual root hash commits to: the id and the folded
/// channel hashes.
fn body_hash(descriptor: &DigestDescriptor, reverify_parts: bool) -> Result<Hash512, DigestNode> {
    let channels = ordered(&descriptor.channels, |c| c.ordinal);
    let mut hashes: Vec<Hash512> = Vec::with_capacity(channels.len() + 1);
    let mut id_node = [0u8; 64];
    id_node[..4].copy_from_slice(&descriptor.id.to_be_bytes());
    hashes.push(id_node);
    for channel in channels {
        let recomputed = channel_hash(channel, reverify_parts)?;
        if recomputed != channel.hash {
            return Err(DigestNode::Channel {
                channel: channel.ordinal,
            });
        }
        hashes.push(recomputed);
    }
    Ok(hash_counted(&hashes))
}

/// Recompute the whole hierarchy and compare it to the stored hashes.
/// `Ok(())` means every node matched; `Err` names the most specific failing
/// node.
pub fn verify_tree(descriptor: &DigestDescriptor, reverify_parts: bool) -> Result<(), DigestNode> {
    let body = body_hash(descriptor, reverify_parts)?;
    if dual_hash(&body) != descriptor.hash {
        return Err(DigestNode::Digest);
    }
    Ok(())
}

/// Recompute every hash from the leaves up, returning a descriptor whose
/// stored hashes all match. Used when building a digest for publication.
pub fn rebuild_hashes(mut descriptor: DigestDescriptor, reverify_parts: bool) -> DigestDescriptor {
    for channel in &mut descriptor.channels {
        for index in &mut channel.indices {
            for file in &mut index.files {
                file.hash = file_hash(file, reverify_parts);
            }
            let files = ordered(&index.files, |f| f.ordinal);
            let hashes: Vec<Hash512> = files.iter().map(|f| f.hash).collect();
            index.hash = hash_counted(&hashes);
        }
        let indices = ordered(&channel.indices, |i| i.ordinal);
        let hashes: Vec<Hash512> = indices.iter().map(|i| i.hash).collect();
        channel.hash = hash_counted(&hashes);
    }
    // Body and dual root over the now-consistent tree.
    let body = body_hash(&descriptor, reverify_parts).unwrap_or([0u8; 64]);
    descriptor.hash = dual_hash(&body);
    descriptor
}

/// The 64-byte message the digest signature covers: the two root-hash
/// components folded together.
pub fn signing_hash(root: &DualHash) -> Hash512 {
    node_hash(&root.sha2, &root.sha3)
}
