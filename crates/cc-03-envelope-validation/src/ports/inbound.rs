//! # Inbound Ports (Driving Ports / API)
//!
//! The validation API the networking and sync layers drive.

use async_trait::async_trait;
use shared_types::{
    BlockEnvelope, MessageEnvelope, TransactionEnvelope, ValidationFatal, ValidationResult,
};

/// Where an envelope arrived from. Policy checks differ: gossip may refuse
/// presentation envelopes, sync and local envelopes are pre-trusted origins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeOrigin {
    Gossip,
    Sync,
    Local,
}

/// Primary envelope validation API.
#[async_trait]
pub trait EnvelopeValidationApi: Send + Sync {
    /// Rehydrate and validate transaction bytes. Corrupt bytes are an
    /// envelope rejection; unrecognized elements propagate.
    async fn validate_transaction_bytes(
        &self,
        bytes: &[u8],
        origin: EnvelopeOrigin,
        now_millis: u64,
    ) -> Result<ValidationResult, ValidationFatal>;

    async fn validate_transaction(
        &self,
        envelope: &TransactionEnvelope,
        origin: EnvelopeOrigin,
        now_millis: u64,
    ) -> Result<ValidationResult, ValidationFatal>;

    /// Validate many independent transactions concurrently. Result order
    /// matches input order.
    async fn validate_transactions(
        &self,
        envelopes: &[TransactionEnvelope],
        origin: EnvelopeOrigin,
        now_millis: u64,
    ) -> Result<Vec<ValidationResult>, ValidationFatal>;

    async fn validate_message(
        &self,
        envelope: &MessageEnvelope,
        now_millis: u64,
    ) -> Result<ValidationResult, ValidationFatal>;

    async fn validate_block(
        &self,
        envelope: &BlockEnvelope,
        now_millis: u64,
    ) -> Result<ValidationResult, ValidationFatal>;
}
