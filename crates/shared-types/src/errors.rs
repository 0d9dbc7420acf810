//! # Error Types
//!
//! Fatal, cross-subsystem error types. Everything here means "our own state
//! may be unsafe" — callers are expected to halt, not to map these onto a
//! per-envelope `ValidationResult`.

use crate::entities::{AccountId, KeyOrdinal, KeyUseIndexSet};
use thiserror::Error;

/// Rehydration of raw bytes into a typed structure failed.
///
/// The two variants are deliberately distinct: `Corrupt` means "recognized
/// element, bad bytes" and maps to a per-envelope rejection; `Unrecognized`
/// may be a future protocol version and must propagate so the caller does not
/// blacklist a peer for speaking a newer dialect.
#[derive(Debug, Clone, Error)]
pub enum RehydrationError {
    /// The element tag is known but the bytes are malformed.
    #[error("corrupt bytes for element {element}: {detail}")]
    Corrupt { element: String, detail: String },

    /// The element tag or version is unknown to this node.
    #[error("unrecognized protocol element {element} (version {version})")]
    Unrecognized { element: String, version: u16 },
}

impl RehydrationError {
    /// Whether this failure must propagate instead of invalidating the
    /// envelope.
    pub fn must_propagate(&self) -> bool {
        matches!(self, Self::Unrecognized { .. })
    }
}

/// Fatal key-lifecycle conditions. These are user-visible: each carries the
/// account and ordinal so an operator can diagnose a stale or corrupted
/// wallet.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// The key has consumed its final leaf; signing must fail hard.
    #[error("key exhausted for account {account} ordinal {ordinal}: index {index} reached maximum {maximum}")]
    KeyExhausted {
        account: AccountId,
        ordinal: KeyOrdinal,
        index: u64,
        maximum: u64,
    },

    /// The wallet's local index is behind what the chain has confirmed.
    /// The wallet is stale or corrupted; signing would reuse a leaf.
    #[error("key index regression for account {account} ordinal {ordinal}: local {local} is behind chain-confirmed {confirmed}")]
    IndexRegression {
        account: AccountId,
        ordinal: KeyOrdinal,
        local: KeyUseIndexSet,
        confirmed: KeyUseIndexSet,
    },

    /// The requested index was already consumed by a confirmed transaction.
    #[error("key gate replay for account {account} ordinal {ordinal}: index {index} already consumed")]
    GateReplay {
        account: AccountId,
        ordinal: KeyOrdinal,
        index: KeyUseIndexSet,
    },

    /// The key is past its change threshold and the caller did not assert
    /// the key-change override.
    #[error("key past change height for account {account} ordinal {ordinal}: index {index} reached change threshold {change_height}")]
    KeyPastChangeHeight {
        account: AccountId,
        ordinal: KeyOrdinal,
        index: u64,
        change_height: u64,
    },

    /// A signing transaction was interrupted before commit. It cannot be
    /// known whether the one-time leaf was exposed; never resume silently.
    #[error("interrupted signing transaction found for account {account} ordinal {ordinal}; manual intervention required")]
    InterruptedSigning {
        account: AccountId,
        ordinal: KeyOrdinal,
    },

    /// A second signing transaction was requested while one is in flight.
    #[error("signing already in flight for account {account} ordinal {ordinal}")]
    SigningInFlight {
        account: AccountId,
        ordinal: KeyOrdinal,
    },

    /// No wallet key exists for the requested slot.
    #[error("no wallet key for account {account} ordinal {ordinal}")]
    KeyNotFound {
        account: AccountId,
        ordinal: KeyOrdinal,
    },

    /// Swap requested but no next key was staged.
    #[error("no staged next key for account {account} ordinal {ordinal}")]
    NoStagedKey {
        account: AccountId,
        ordinal: KeyOrdinal,
    },

    /// The wallet store rejected or failed an operation.
    #[error("wallet store failure: {0}")]
    Store(String),

    /// The underlying scheme backend failed while signing.
    #[error("scheme failure: {0}")]
    Scheme(String),
}

/// Fatal conditions raised by envelope validators themselves, as opposed to
/// per-envelope rejections.
#[derive(Debug, Clone, Error)]
pub enum ValidationFatal {
    /// Bytes that may belong to a future protocol version.
    #[error(transparent)]
    Unrecognized(#[from] RehydrationError),

    /// The chain-state oracle could not answer; validation cannot proceed
    /// safely without it.
    #[error("chain state unavailable: {0}")]
    ChainStateUnavailable(String),

    /// An outbound port failed in a way that is not an envelope property.
    #[error("collaborator failure: {0}")]
    Collaborator(String),
}
