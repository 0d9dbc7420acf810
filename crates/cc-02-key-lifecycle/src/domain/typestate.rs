//! # Type-State Signing Session
//!
//! Compile-time enforcement of the signing transaction: begin → sign →
//! commit. Each transition consumes `self`, so a session cannot sign twice
//! and a signed session cannot be aborted — the leaf has been exposed, the
//! only way forward is commit.
//!
//! ```text
//! [Begun] ──sign──→ [Signed] ──commit──→ (advanced wallet, signature)
//!    │
//!    └── abort ──→ (wallet returned untouched)
//! ```
//!
//! The private material inside the wallet is move-only, so even reaching
//! around the session types and calling the scheme directly cannot reuse a
//! pre-advancement state: that value no longer exists after `sign`.

use crate::domain::entities::WalletKey;
use shared_crypto::SignatureScheme;
use shared_types::{KeyUseIndexSet, LifecycleError};
use std::marker::PhantomData;

/// Marker: session opened, nothing signed yet.
#[derive(Debug, Clone, Copy)]
pub struct Begun;

/// Marker: one leaf consumed, advanced state held, awaiting commit.
#[derive(Debug, Clone, Copy)]
pub struct Signed;

/// A signing transaction with compile-time enforced state.
#[derive(Debug)]
pub struct SigningSession<S> {
    wallet: WalletKey,
    state_data: SessionData,
    _state: PhantomData<S>,
}

#[derive(Debug)]
enum SessionData {
    Begun,
    Signed {
        signature: Vec<u8>,
        used_index: KeyUseIndexSet,
    },
}

impl SigningSession<Begun> {
    /// Open a session over a wallet key. Callers run their preflight checks
    /// (gates, regression, exhaustion) before this point.
    pub fn begin(wallet: WalletKey) -> Self {
        Self {
            wallet,
            state_data: SessionData::Begun,
            _state: PhantomData,
        }
    }

    /// The index set a signature from this session would consume.
    pub fn pending_index(&self) -> KeyUseIndexSet {
        self.wallet.index_set()
    }

    /// Abandon before signing. The wallet key is returned untouched.
    #[must_use = "the wallet key must go back to the store"]
    pub fn abort(self) -> WalletKey {
        self.wallet
    }

    /// Consume one leaf. On success the session holds the advanced material
    /// and the signature; the pre-advancement state no longer exists.
    ///
    /// On a scheme error the material has already been moved into the
    /// backend and is gone — the caller must treat the transaction as
    /// interrupted, not retry it.
    pub fn sign(
        self,
        scheme: &dyn SignatureScheme,
        message_hash: &[u8],
    ) -> Result<SigningSession<Signed>, LifecycleError> {
        let used_index = self.wallet.index_set();
        let WalletKey {
            account,
            ordinal,
            status,
            material,
            public,
            announcement_height,
            key_sequence,
            warning_height,
            change_height,
            maximum_height,
        } = self.wallet;

        let output = scheme.sign(message_hash, material).map_err(|e| {
            tracing::error!(%account, %ordinal, error = %e, "scheme failed mid-signing; leaf state unknown");
            LifecycleError::Scheme(e.to_string())
        })?;

        let wallet = WalletKey {
            account,
            ordinal,
            status,
            material: output.advanced,
            public,
            announcement_height,
            key_sequence,
            warning_height,
            change_height,
            maximum_height,
        };

        Ok(SigningSession {
            wallet,
            state_data: SessionData::Signed {
                signature: output.signature,
                used_index,
            },
            _state: PhantomData,
        })
    }
}

impl SigningSession<Signed> {
    pub fn signature(&self) -> &[u8] {
        match &self.state_data {
            SessionData::Signed { signature, .. } => signature,
            SessionData::Begun => unreachable!("type state guarantees Signed"),
        }
    }

    pub fn used_index(&self) -> KeyUseIndexSet {
        match &self.state_data {
            SessionData::Signed { used_index, .. } => *used_index,
            SessionData::Begun => unreachable!("type state guarantees Signed"),
        }
    }

    /// Finish the transaction: hand back the advanced wallet key, the
    /// signature, and the index it consumed. The caller persists the wallet
    /// before releasing the signature to anyone.
    #[must_use = "the advanced wallet key must be persisted before the signature is used"]
    pub fn commit(self) -> (WalletKey, Vec<u8>, KeyUseIndexSet) {
        match self.state_data {
            SessionData::Signed {
                signature,
                used_index,
            } => (self.wallet, signature, used_index),
            SessionData::Begun => unreachable!("type state guarantees Signed"),
        }
    }
}

// A Signed session has no `abort`: once the leaf is exposed the transaction
// may only move forward.
//
// ```compile_fail
// let session: SigningSession<Begun> = SigningSession::begin(wallet);
// let signed = session.sign(&scheme, &hash)?;
// session.sign(&scheme, &hash);  // ERROR: use of moved value
// ```
//
// ```compile_fail
// let signed: SigningSession<Signed> = ...;
// signed.abort();  // ERROR: no `abort` method on SigningSession<Signed>
// ```

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::WalletKey;
    use shared_crypto::{sha3_512, MerkleOtsScheme, PrivateMaterial, SignatureScheme};
    use shared_types::{
        AccountId, CryptographicKey, HashBits, KeyOrdinal, TreeKey, WalletKeyStatus,
    };

    fn test_wallet(height: u8) -> WalletKey {
        let scheme = MerkleOtsScheme::new();
        let material = PrivateMaterial::new(vec![0x11; 64], height, HashBits::B512);
        let public = scheme.public_key(&material).unwrap();
        WalletKey {
            account: AccountId::standard(1),
            ordinal: KeyOrdinal::Transaction,
            status: WalletKeyStatus::Ready,
            material,
            public: CryptographicKey::Xmss(TreeKey {
                height,
                layers: 1,
                hash_bits: HashBits::B512,
                public,
            }),
            announcement_height: 1,
            key_sequence: 1,
            warning_height: 3,
            change_height: 3,
            maximum_height: 1 << height,
        }
    }

    #[test]
    fn sign_advances_exactly_one_index() {
        let scheme = MerkleOtsScheme::new();
        let wallet = test_wallet(2);
        let session = SigningSession::begin(wallet);
        let before = session.pending_index();

        let signed = session.sign(&scheme, &sha3_512(b"payload")).unwrap();
        assert_eq!(signed.used_index(), before);

        let (wallet, signature, used) = signed.commit();
        assert!(!signature.is_empty());
        assert_eq!(wallet.index_set(), used.incremented());
    }

    #[test]
    fn abort_returns_wallet_untouched() {
        let wallet = test_wallet(2);
        let before = wallet.index_set();
        let session = SigningSession::begin(wallet);

        let wallet = session.abort();
        assert_eq!(wallet.index_set(), before);
    }

    #[test]
    fn signature_verifies_under_wallet_public_key() {
        let scheme = MerkleOtsScheme::new();
        let wallet = test_wallet(2);
        let hash = sha3_512(b"verify me");
        let session = SigningSession::begin(wallet);
        let signed = session.sign(&scheme, &hash).unwrap();
        let (wallet, signature, _) = signed.commit();

        let CryptographicKey::Xmss(tree) = &wallet.public else {
            panic!("test wallet holds a tree key");
        };
        let declared =
            shared_crypto::DeclaredParams::tree(tree.height, tree.layers, tree.hash_bits);
        assert!(scheme
            .verify(&hash, &signature, &tree.public, &declared)
            .unwrap());
    }

    #[test]
    fn scheme_failure_consumes_the_session() {
        let scheme = MerkleOtsScheme::new();
        let wallet = test_wallet(2);
        let session = SigningSession::begin(wallet);

        // Wrong hash width: the scheme refuses, the material is gone, and
        // the error is the lifecycle's interrupted-transaction signal.
        let err = session.sign(&scheme, b"short").unwrap_err();
        assert!(matches!(err, LifecycleError::Scheme(_)));
    }
}
