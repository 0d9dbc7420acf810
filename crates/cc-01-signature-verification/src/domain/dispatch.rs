//! # Signature Dispatch
//!
//! The exhaustive (key variant × signature variant) routing table. Every
//! reachable pairing is named; the fallback arm is a rejection, so a new
//! variant added to either enum forces this match to be revisited before the
//! crate compiles again.

use crate::domain::promise::promise_holds;
use crate::ports::outbound::SchemeRegistry;
use shared_crypto::{CryptoError, DeclaredParams};
use shared_types::{
    AccountSignature, CategoryKey, CryptographicKey, HashBits, KeyFamily, SecretComponentSignature,
    TreeKey, ValidationError, ValidationResult,
};
use tracing::debug;

/// One verification request, owned so batches can cross threads.
#[derive(Debug, Clone)]
pub struct SignatureCheck {
    pub message_hash: Vec<u8>,
    pub hash_bits: HashBits,
    pub signature: AccountSignature,
    /// `None` only for presentation signatures.
    pub key: Option<CryptographicKey>,
}

/// Route one signature to its backend and assemble the outcome.
///
/// Joint signatures are not dispatched here: the envelope validator
/// decomposes them into per-signer published signatures first. A joint
/// signature reaching this function directly is an unknown combination.
pub fn verify_account_signature(
    registry: &dyn SchemeRegistry,
    message_hash: &[u8],
    hash_bits: HashBits,
    signature: &AccountSignature,
    key: Option<&CryptographicKey>,
) -> ValidationResult {
    if message_hash.len() != hash_bits.byte_len() {
        return ValidationResult::invalid(ValidationError::BitSizeMismatch);
    }

    match (signature, key) {
        // First use: the public key travels inline, no prior record exists.
        (
            AccountSignature::Presentation {
                declared_category,
                public_key,
                bytes,
                ..
            },
            None,
        ) => {
            let declared = DeclaredParams::category(*declared_category, hash_bits);
            verify_with_backend(
                registry,
                KeyFamily::QTesla,
                message_hash,
                bytes,
                public_key,
                &declared,
            )
        }
        // A presentation signature with a resolved key record contradicts
        // itself: first use means no record.
        (AccountSignature::Presentation { .. }, Some(_)) => {
            ValidationResult::invalid(ValidationError::InvalidKeyType)
        }

        (AccountSignature::Published(sig), Some(resolved)) => match resolved {
            CryptographicKey::Xmss(tree) | CryptographicKey::XmssMt(tree) => {
                verify_tree_signature(registry, resolved.family(), message_hash, hash_bits, &sig.bytes, tree)
            }
            CryptographicKey::NtruPrime(cat) | CryptographicKey::McEliece(cat) => {
                verify_category_signature(
                    registry,
                    resolved.family(),
                    message_hash,
                    hash_bits,
                    &sig.bytes,
                    cat,
                )
            }
            // Secret-family keys never verify a bare published signature;
            // they must open their commitment.
            CryptographicKey::QTesla(_)
            | CryptographicKey::SecretDouble(_)
            | CryptographicKey::SecretCombo(_)
            | CryptographicKey::SecretPenta(_) => {
                ValidationResult::invalid(ValidationError::KeyTypeMismatch)
            }
        },

        (
            AccountSignature::SecretSingle {
                promise, component, ..
            },
            Some(CryptographicKey::QTesla(committed)),
        ) => verify_secret_components(
            registry,
            message_hash,
            hash_bits,
            committed,
            &[component],
            promise,
        ),

        (
            AccountSignature::SecretCombo {
                promise,
                components,
                ..
            },
            Some(CryptographicKey::SecretDouble(committed)),
        )
        | (
            AccountSignature::SecretCombo {
                promise,
                components,
                ..
            },
            Some(CryptographicKey::SecretCombo(committed)),
        ) => {
            let refs: Vec<&SecretComponentSignature> = components.iter().collect();
            verify_secret_components(registry, message_hash, hash_bits, committed, &refs, promise)
        }

        (
            AccountSignature::SecretPenta {
                promise,
                components,
                ..
            },
            Some(CryptographicKey::SecretPenta(committed)),
        ) => {
            let refs: Vec<&SecretComponentSignature> = components.iter().collect();
            verify_secret_components(registry, message_hash, hash_bits, committed, &refs, promise)
        }

        // Every remaining pairing is unknown: joint signatures arriving
        // whole, secret signatures against the wrong key variant, published
        // signatures with no key.
        _ => {
            debug!("rejecting unknown key/signature combination");
            ValidationResult::invalid(ValidationError::InvalidKeyType)
        }
    }
}

/// Verify raw signature bytes against a directly-known key, outside the
/// account-signature envelope shapes. Block moderator keys and digest keys
/// are resolved as bare keys; secret-family keys cannot be used this way
/// because nothing opens their commitment.
pub fn verify_bare_signature(
    registry: &dyn SchemeRegistry,
    message_hash: &[u8],
    hash_bits: HashBits,
    signature: &[u8],
    key: &CryptographicKey,
) -> ValidationResult {
    if message_hash.len() != hash_bits.byte_len() {
        return ValidationResult::invalid(ValidationError::BitSizeMismatch);
    }
    match key {
        CryptographicKey::Xmss(tree) | CryptographicKey::XmssMt(tree) => {
            verify_tree_signature(registry, key.family(), message_hash, hash_bits, signature, tree)
        }
        CryptographicKey::NtruPrime(cat) | CryptographicKey::McEliece(cat) => {
            verify_category_signature(registry, key.family(), message_hash, hash_bits, signature, cat)
        }
        CryptographicKey::QTesla(_)
        | CryptographicKey::SecretDouble(_)
        | CryptographicKey::SecretCombo(_)
        | CryptographicKey::SecretPenta(_) => {
            ValidationResult::invalid(ValidationError::KeyTypeMismatch)
        }
    }
}

fn verify_tree_signature(
    registry: &dyn SchemeRegistry,
    family: KeyFamily,
    message_hash: &[u8],
    hash_bits: HashBits,
    signature: &[u8],
    tree: &TreeKey,
) -> ValidationResult {
    if tree.hash_bits != hash_bits {
        return ValidationResult::invalid(ValidationError::BitSizeMismatch);
    }
    let declared = DeclaredParams::tree(tree.height, tree.layers, tree.hash_bits);
    verify_with_backend(
        registry,
        family,
        message_hash,
        signature,
        &tree.public,
        &declared,
    )
}

fn verify_category_signature(
    registry: &dyn SchemeRegistry,
    family: KeyFamily,
    message_hash: &[u8],
    hash_bits: HashBits,
    signature: &[u8],
    key: &CategoryKey,
) -> ValidationResult {
    let declared = DeclaredParams::category(key.category, hash_bits);
    verify_with_backend(
        registry,
        family,
        message_hash,
        signature,
        &key.public,
        &declared,
    )
}

/// Open the commitment, then verify every component under its own declared
/// category. All components must pass.
fn verify_secret_components(
    registry: &dyn SchemeRegistry,
    message_hash: &[u8],
    hash_bits: HashBits,
    committed: &shared_types::CommittedKey,
    components: &[&SecretComponentSignature],
    promise: &shared_types::NextKeyPromise,
) -> ValidationResult {
    if components.len() != committed.component_count() {
        return ValidationResult::invalid(ValidationError::KeyTypeMismatch);
    }
    for (component, declared_category) in components.iter().zip(&committed.component_categories) {
        if component.revealed_key.category != *declared_category {
            return ValidationResult::invalid(ValidationError::KeyTypeMismatch);
        }
    }

    if !promise_holds(committed, components, promise) {
        return ValidationResult::invalid(ValidationError::PromiseMismatch);
    }

    for component in components {
        let declared = DeclaredParams::category(component.revealed_key.category, hash_bits);
        let result = verify_with_backend(
            registry,
            KeyFamily::QTesla,
            message_hash,
            &component.bytes,
            &component.revealed_key.public,
            &declared,
        );
        if !result.is_valid() {
            return result;
        }
    }
    ValidationResult::valid()
}

fn verify_with_backend(
    registry: &dyn SchemeRegistry,
    family: KeyFamily,
    message_hash: &[u8],
    signature: &[u8],
    public_key: &[u8],
    declared: &DeclaredParams,
) -> ValidationResult {
    let Some(scheme) = registry.scheme(family) else {
        debug!(%family, "no backend installed for key family");
        return ValidationResult::invalid(ValidationError::InvalidKeyType);
    };

    match scheme.verify(message_hash, signature, public_key, declared) {
        Ok(true) => ValidationResult::valid(),
        Ok(false) => ValidationResult::invalid(ValidationError::SignatureFailed),
        Err(CryptoError::ParameterMismatch { .. }) | Err(CryptoError::WrongHashLength { .. }) => {
            ValidationResult::invalid(ValidationError::BitSizeMismatch)
        }
        Err(error) => {
            debug!(%family, %error, "scheme backend error during verification");
            ValidationResult::invalid(ValidationError::SignatureFailed)
        }
    }
}
