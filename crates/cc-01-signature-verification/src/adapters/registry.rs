//! # Static Scheme Registry
//!
//! A fixed family → backend table built at construction time. Production
//! wiring installs the real XMSS/XMSS^MT/QTesla/NTRU/McEliece backends here;
//! `reference()` wires the in-workspace Merkle one-time scheme for every
//! family, which is what the test suite runs against.

use crate::ports::outbound::SchemeRegistry;
use shared_crypto::{MerkleOtsScheme, SignatureScheme};
use shared_types::KeyFamily;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct StaticSchemeRegistry {
    schemes: HashMap<KeyFamily, Arc<dyn SignatureScheme>>,
}

impl StaticSchemeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All families backed by the reference Merkle one-time scheme.
    pub fn reference() -> Self {
        let scheme: Arc<dyn SignatureScheme> = Arc::new(MerkleOtsScheme::new());
        let mut registry = Self::new();
        for family in [
            KeyFamily::Xmss,
            KeyFamily::XmssMt,
            KeyFamily::QTesla,
            KeyFamily::NtruPrime,
            KeyFamily::McEliece,
        ] {
            registry.install(family, Arc::clone(&scheme));
        }
        registry
    }

    /// Install or replace the backend for one family.
    pub fn install(&mut self, family: KeyFamily, scheme: Arc<dyn SignatureScheme>) {
        self.schemes.insert(family, scheme);
    }
}

impl SchemeRegistry for StaticSchemeRegistry {
    fn scheme(&self, family: KeyFamily) -> Option<Arc<dyn SignatureScheme>> {
        self.schemes.get(&family).map(Arc::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_registry_covers_all_families() {
        let registry = StaticSchemeRegistry::reference();
        for family in [
            KeyFamily::Xmss,
            KeyFamily::XmssMt,
            KeyFamily::QTesla,
            KeyFamily::NtruPrime,
            KeyFamily::McEliece,
        ] {
            assert!(registry.scheme(family).is_some(), "missing {family}");
        }
    }

    #[test]
    fn empty_registry_resolves_nothing() {
        let registry = StaticSchemeRegistry::new();
        assert!(registry.scheme(KeyFamily::Xmss).is_none());
    }
}
