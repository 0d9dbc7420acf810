//! # Key Lifecycle Service
//!
//! The transactional signing flow: begin → sign → persist advanced state →
//! commit, with rollback on any failure before signing and a durable
//! in-flight marker that turns a mid-transaction crash into a fatal,
//! operator-visible condition instead of a silent leaf reuse.

use crate::domain::entities::{
    KeyGenerationSpec, KeyHistoryEntry, KeyLifecycleConfig, SignOptions, SignedProduct, StagedKey,
    WalletKey,
};
use crate::domain::gate::KeyGateRegistry;
use crate::domain::typestate::SigningSession;
use crate::ports::inbound::KeyLifecycleApi;
use crate::ports::outbound::{
    ChainIndexOracle, RotationRequest, RotationUrgency, RotationWorkflow, WalletStore,
};
use async_trait::async_trait;
use cc_01_signature_verification::SchemeRegistry;
use parking_lot::Mutex;
use rand::RngCore;
use shared_crypto::PrivateMaterial;
use shared_types::{
    AccountId, CryptographicKey, KeyFamily, KeyOrdinal, KeyUseIndexSet, LifecycleError, TreeKey,
    WalletKeyStatus,
};
use std::collections::HashSet;
use tracing::{error, info, warn};

pub struct KeyLifecycleService<S, O, W, R>
where
    S: WalletStore,
    O: ChainIndexOracle,
    W: RotationWorkflow,
    R: SchemeRegistry,
{
    store: S,
    oracle: O,
    rotation: W,
    registry: R,
    gates: std::sync::Arc<KeyGateRegistry>,
    config: KeyLifecycleConfig,
    /// Process-local serialization of signing transactions per slot. The
    /// durable marker in the store covers crashes; this covers concurrency.
    in_flight: Mutex<HashSet<(AccountId, KeyOrdinal)>>,
}

/// Releases the process-local in-flight slot when the transaction ends,
/// whichever way it ends.
struct InFlightToken<'a> {
    set: &'a Mutex<HashSet<(AccountId, KeyOrdinal)>>,
    slot: (AccountId, KeyOrdinal),
}

impl Drop for InFlightToken<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.slot);
    }
}

impl<S, O, W, R> KeyLifecycleService<S, O, W, R>
where
    S: WalletStore,
    O: ChainIndexOracle,
    W: RotationWorkflow,
    R: SchemeRegistry,
{
    pub fn new(store: S, oracle: O, rotation: W, registry: R, config: KeyLifecycleConfig) -> Self {
        Self {
            store,
            oracle,
            rotation,
            registry,
            gates: std::sync::Arc::new(KeyGateRegistry::new()),
            config,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Shared handle to the gate registry, for validators that consult it
    /// read-only.
    pub fn gates_handle(&self) -> std::sync::Arc<KeyGateRegistry> {
        std::sync::Arc::clone(&self.gates)
    }

    fn acquire(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
    ) -> Result<InFlightToken<'_>, LifecycleError> {
        let slot = (account, ordinal);
        let mut set = self.in_flight.lock();
        if !set.insert(slot) {
            return Err(LifecycleError::SigningInFlight { account, ordinal });
        }
        Ok(InFlightToken {
            set: &self.in_flight,
            slot,
        })
    }

    /// Checks that must hold before a leaf may be consumed. The wallet is
    /// untouched; any failure here rolls back cleanly.
    async fn preflight(
        &self,
        wallet: &WalletKey,
        options: SignOptions,
    ) -> Result<(), LifecycleError> {
        let account = wallet.account;
        let ordinal = wallet.ordinal;
        let local = wallet.index_set();

        if wallet.is_exhausted() {
            return Err(LifecycleError::KeyExhausted {
                account,
                ordinal,
                index: wallet.material.use_index(),
                maximum: wallet.maximum_height,
            });
        }

        if wallet.past_change() && !options.allow_past_change {
            return Err(LifecycleError::KeyPastChangeHeight {
                account,
                ordinal,
                index: wallet.material.use_index(),
                change_height: wallet.change_height,
            });
        }

        if self.gates.is_consumed(account, ordinal, local) {
            return Err(LifecycleError::GateReplay {
                account,
                ordinal,
                index: local,
            });
        }

        if let Some(confirmed) = self.oracle.confirmed_index(account, ordinal).await? {
            if local < confirmed {
                error!(
                    %account, %ordinal, %local, %confirmed,
                    "wallet key index is behind the chain; wallet is stale or corrupted"
                );
                return Err(LifecycleError::IndexRegression {
                    account,
                    ordinal,
                    local,
                    confirmed,
                });
            }
            if local == confirmed {
                return Err(LifecycleError::GateReplay {
                    account,
                    ordinal,
                    index: local,
                });
            }
        }

        Ok(())
    }

    /// Fire-and-forget rotation triggers. Crossing the change threshold is
    /// urgent; crossing the warning threshold is advisory.
    async fn request_rotation_if_needed(&self, wallet: &WalletKey) {
        let request = RotationRequest {
            account: wallet.account,
            ordinal: wallet.ordinal,
            use_index: wallet.material.use_index(),
            urgency: RotationUrgency::Advisory,
        };
        if wallet.past_change() {
            warn!(
                account = %wallet.account, ordinal = %wallet.ordinal,
                index = wallet.material.use_index(),
                "key passed its change threshold; requesting urgent rotation"
            );
            self.rotation
                .submit(RotationRequest {
                    urgency: RotationUrgency::Urgent,
                    ..request
                })
                .await;
        } else if wallet.past_warning() {
            info!(
                account = %wallet.account, ordinal = %wallet.ordinal,
                index = wallet.material.use_index(),
                "key passed its warning threshold; requesting rotation"
            );
            self.rotation.submit(request).await;
        }
    }

    /// Generate fresh material and its wallet wrapper for the slot.
    fn build_key(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
        spec: &KeyGenerationSpec,
        key_sequence: u32,
    ) -> Result<WalletKey, LifecycleError> {
        let mut seed = vec![0u8; spec.seed_bytes];
        rand::rngs::OsRng.fill_bytes(&mut seed);

        // The reference material tracks one flat index space; layered keys
        // fold their layers into the effective height.
        let effective_height = spec.tree_height * spec.tree_layers.max(1);
        let material = PrivateMaterial::new(seed, effective_height, spec.hash_bits);

        let family = if ordinal == KeyOrdinal::Validator {
            KeyFamily::XmssMt
        } else {
            KeyFamily::Xmss
        };
        let scheme = self
            .registry
            .scheme(family)
            .ok_or_else(|| LifecycleError::Scheme(format!("no backend for family {family}")))?;
        let public_bytes = scheme
            .public_key(&material)
            .map_err(|e| LifecycleError::Scheme(e.to_string()))?;

        let tree = TreeKey {
            height: spec.tree_height,
            layers: spec.tree_layers,
            hash_bits: spec.hash_bits,
            public: public_bytes,
        };
        let public = match family {
            KeyFamily::XmssMt => CryptographicKey::XmssMt(tree),
            _ => CryptographicKey::Xmss(tree),
        };

        let leaves = spec.leaf_count();
        Ok(WalletKey {
            account,
            ordinal,
            status: WalletKeyStatus::New,
            material,
            public,
            announcement_height: 0,
            key_sequence,
            warning_height: leaves * self.config.warning_percent() / 100,
            change_height: leaves * self.config.change_percent() / 100,
            maximum_height: leaves,
        })
    }
}

#[async_trait]
impl<S, O, W, R> KeyLifecycleApi for KeyLifecycleService<S, O, W, R>
where
    S: WalletStore,
    O: ChainIndexOracle,
    W: RotationWorkflow,
    R: SchemeRegistry,
{
    async fn sign(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
        message_hash: &[u8],
        options: SignOptions,
    ) -> Result<SignedProduct, LifecycleError> {
        let _token = self.acquire(account, ordinal)?;

        // A durable marker means a previous transaction died after signing.
        // It cannot be known whether that leaf was exposed; halt.
        if self.store.is_in_flight(account, ordinal).await? {
            error!(%account, %ordinal, "durable in-flight marker found; refusing to sign");
            return Err(LifecycleError::InterruptedSigning { account, ordinal });
        }

        let wallet = self.store.take_key(account, ordinal).await?;
        self.request_rotation_if_needed(&wallet).await;

        if let Err(check) = self.preflight(&wallet, options).await {
            self.store.return_key(wallet).await?;
            return Err(check);
        }

        let Some(scheme) = self.registry.scheme(wallet.public.family()) else {
            let family = wallet.public.family();
            self.store.return_key(wallet).await?;
            return Err(LifecycleError::Scheme(format!(
                "no backend for family {family}"
            )));
        };

        if let Err(store_err) = self.store.set_in_flight(account, ordinal, true).await {
            self.store.return_key(wallet).await?;
            return Err(store_err);
        }

        // Point of no return: from here a failure leaves the durable marker
        // set, and the next transaction reports it as fatal.
        let session = SigningSession::begin(wallet);
        let signed = session.sign(scheme.as_ref(), message_hash)?;

        let (advanced, signature, used_index) = signed.commit();
        self.store.commit_key(advanced).await?;
        self.store.set_in_flight(account, ordinal, false).await?;

        info!(%account, %ordinal, index = %used_index, "signing transaction committed");
        Ok(SignedProduct {
            account,
            ordinal,
            signature,
            index_set: used_index,
        })
    }

    async fn generate_key(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
    ) -> Result<CryptographicKey, LifecycleError> {
        let spec = self.config.spec_for(ordinal);
        let wallet = self.build_key(account, ordinal, &spec, 1)?;
        let public = wallet.public.clone();
        self.store.commit_key(wallet).await?;
        info!(%account, %ordinal, "generated wallet key");
        Ok(public)
    }

    async fn stage_next_key(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
    ) -> Result<CryptographicKey, LifecycleError> {
        let _token = self.acquire(account, ordinal)?;

        let spec = self.config.spec_for(ordinal);
        // Sequence is assigned at swap time; the staged key is just material.
        let generated = self.build_key(account, ordinal, &spec, 0)?;
        let public = generated.public.clone();
        self.store
            .stage_next_key(
                account,
                ordinal,
                StagedKey {
                    material: generated.material,
                    public: generated.public,
                },
            )
            .await?;

        // The active key is now winding down.
        let mut wallet = self.store.take_key(account, ordinal).await?;
        wallet.status = WalletKeyStatus::Changing;
        self.store.commit_key(wallet).await?;

        info!(%account, %ordinal, "staged next key");
        Ok(public)
    }

    async fn swap_next_key(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
    ) -> Result<(), LifecycleError> {
        let _token = self.acquire(account, ordinal)?;

        let staged = self
            .store
            .take_staged_key(account, ordinal)
            .await?
            .ok_or(LifecycleError::NoStagedKey { account, ordinal })?;
        let outgoing = self.store.take_key(account, ordinal).await?;

        let new_sequence = outgoing.key_sequence + 1;
        let new_set = KeyUseIndexSet::new(new_sequence, 0, ordinal);

        // The promoted key must not be behind what the chain has confirmed.
        if let Some(confirmed) = self.oracle.confirmed_index(account, ordinal).await? {
            if new_set < confirmed {
                self.store.return_key(outgoing).await?;
                self.store.stage_next_key(account, ordinal, staged).await?;
                error!(%account, %ordinal, %new_set, %confirmed, "staged key is behind the chain");
                return Err(LifecycleError::IndexRegression {
                    account,
                    ordinal,
                    local: new_set,
                    confirmed,
                });
            }
        }

        let leaves = staged.material.leaf_count();
        self.store
            .append_history(KeyHistoryEntry {
                account,
                ordinal,
                key_sequence: outgoing.key_sequence,
                final_index: outgoing.material.use_index(),
                public: outgoing.public.clone(),
            })
            .await?;

        let promoted = WalletKey {
            account,
            ordinal,
            status: WalletKeyStatus::Ready,
            material: staged.material,
            public: staged.public,
            announcement_height: 0,
            key_sequence: new_sequence,
            warning_height: leaves * self.config.warning_percent() / 100,
            change_height: leaves * self.config.change_percent() / 100,
            maximum_height: leaves,
        };
        self.store.commit_key(promoted).await?;
        // The outgoing key's material is dropped (and zeroized) here.
        info!(%account, %ordinal, sequence = new_sequence, "next key promoted");
        Ok(())
    }

    fn record_confirmed(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
        index: KeyUseIndexSet,
    ) -> Result<(), LifecycleError> {
        self.gates.record(account, ordinal, index)
    }

    fn reclaim_account(&self, account: AccountId) {
        self.gates.reclaim(account);
    }

    fn gates(&self) -> &KeyGateRegistry {
        &self.gates
    }
}
