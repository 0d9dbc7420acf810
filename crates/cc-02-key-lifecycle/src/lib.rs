//! # Key Lifecycle Subsystem (CC-02)
//!
//! Owns private key material and guarantees the one-time-use discipline of
//! stateful signature keys: monotonic key-use indices, replay gates, rotation
//! triggers, next-key staging and swap.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): wallet keys, the typestate signing
//!   session, the key gate registry
//! - **Ports Layer** (`ports/`): wallet store, chain index oracle, rotation
//!   workflow, lifecycle API
//! - **Service Layer** (`service.rs`): the transactional signing flow
//!
//! ## The One Rule
//!
//! A leaf signs at most once. Everything in this crate exists to make
//! violating that rule either a compile error (private material is move-only,
//! sessions consume themselves) or a fatal, user-visible halt (index
//! regression, interrupted transaction, gate replay).

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use domain::entities::{
    KeyGenerationSpec, KeyHistoryEntry, KeyLifecycleConfig, SignOptions, SignedProduct, StagedKey,
    WalletKey,
};
pub use domain::gate::KeyGateRegistry;
pub use domain::typestate::{Begun, Signed, SigningSession};
pub use ports::inbound::KeyLifecycleApi;
pub use ports::outbound::{
    ChainIndexOracle, RotationRequest, RotationUrgency, RotationWorkflow, WalletStore,
};
pub use service::KeyLifecycleService;
