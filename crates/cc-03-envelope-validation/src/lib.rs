//! # Envelope Validation Subsystem (CC-03)
//!
//! Orchestrates rehydration, structural checks, key resolution, and
//! signature verification for transaction, message, and block envelopes.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): fast-key reconciliation, joint-signature
//!   rules, the height-scoped critical section, proof-of-work
//! - **Ports Layer** (`ports/`): chain-state oracle, fast-key index, key
//!   resolver, rehydration factory, reference-hash fetch, joint directory
//! - **Service Layer** (`service/`): one validator per envelope kind
//!
//! ## Outcome Discipline
//!
//! "This envelope is bad" is a `ValidationResult`, returned `Ok`. `Err` is
//! reserved for conditions where the node's own state is unsafe: bytes that
//! may belong to a future protocol version, or a collaborator that cannot
//! answer.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use domain::fast_key::{reconcile_fast_key, FastResolution};
pub use domain::height_lock::HeightLock;
pub use domain::joint::{cosigner_hash, joint_shape_errors};
pub use domain::pow::{meets_difficulty, pow_digest, search_nonce, PowConfig};
pub use ports::inbound::{EnvelopeOrigin, EnvelopeValidationApi};
pub use ports::outbound::{
    BlockSummary, ChainStateOracle, FastKeyIndex, JointAccountDirectory, KeyResolver,
    ReferenceHashFetch, RehydrationFactory,
};
pub use service::{EnvelopeValidationService, ValidationConfig};
