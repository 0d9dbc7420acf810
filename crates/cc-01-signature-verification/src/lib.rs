//! # Signature Verification Subsystem (CC-01)
//!
//! Routes a (signature variant, key variant) pair to the correct scheme
//! backend and assembles the final pass/fail outcome.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Pure dispatch and commitment logic, no I/O
//! - **Ports Layer** (`ports/`): Trait definitions for inbound/outbound interfaces
//! - **Service Layer** (`service.rs`): Wires domain logic to ports
//!
//! ## Dispatch Guarantees
//!
//! - Matching over key and signature variants is exhaustive; an unknown
//!   pairing is `Invalid(InvalidKeyType)`, never silently accepted.
//! - Secret-family signatures open their commitment before any component
//!   signature is checked; composite variants require every component to
//!   verify.
//! - Parameter disagreements (hash width, tree height) surface as
//!   `BitSizeMismatch`, distinct from a failed signature.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod test_utils;

pub use adapters::registry::StaticSchemeRegistry;
pub use domain::dispatch::{verify_account_signature, verify_bare_signature, SignatureCheck};
pub use domain::promise::{commitment_opening, promise_holds};
pub use ports::inbound::SignatureVerificationApi;
pub use ports::outbound::SchemeRegistry;
pub use service::SignatureVerificationService;
