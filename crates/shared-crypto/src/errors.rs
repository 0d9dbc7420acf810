//! # Crypto Errors
//!
//! Error type for scheme backends. A failed verification is `Ok(false)`, not
//! an error; errors mean the inputs could not be processed at all or the
//! declared parameters disagree with the material.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Declared parameters do not match the key material.
    #[error("parameter mismatch: declared {declared}, material {material}")]
    ParameterMismatch { declared: String, material: String },

    /// Message hash length does not match the declared width.
    #[error("wrong hash length: expected {expected} bytes, got {actual}")]
    WrongHashLength { expected: usize, actual: usize },

    /// The one-time key has no leaves left.
    #[error("leaf exhausted: index {index} of maximum {maximum}")]
    LeafExhausted { index: u64, maximum: u64 },

    /// Private material is malformed for this scheme.
    #[error("malformed private material: {0}")]
    MalformedMaterial(String),

    /// The backend itself failed.
    #[error("scheme backend failure: {0}")]
    Backend(String),
}
