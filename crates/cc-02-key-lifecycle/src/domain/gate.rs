//! # Key Gate Registry
//!
//! Per-(account, ordinal) replay guard. When a confirmed transaction
//! consumes a key-use index — including every co-signer of a joint
//! transaction — the gate records it. The lifecycle manager consults the
//! gate before issuing a local signature; two divergent transactions can
//! therefore never be built on the same one-time leaf.
//!
//! Entries are cleared only by an explicit account reclaim, never by
//! timeout.

use parking_lot::RwLock;
use shared_types::{AccountId, KeyOrdinal, KeyUseIndexSet, LifecycleError};
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct KeyGateRegistry {
    gates: RwLock<HashMap<(AccountId, KeyOrdinal), KeyUseIndexSet>>,
}

impl KeyGateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a confirmed consumption. Rejects an index at or below the
    /// highest already recorded: no two confirmed transactions may consume
    /// the same (account, ordinal, index).
    pub fn record(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
        index: KeyUseIndexSet,
    ) -> Result<(), LifecycleError> {
        let mut gates = self.gates.write();
        match gates.get(&(account, ordinal)) {
            Some(existing) if index <= *existing => Err(LifecycleError::GateReplay {
                account,
                ordinal,
                index,
            }),
            _ => {
                debug!(%account, %ordinal, %index, "key gate set");
                gates.insert((account, ordinal), index);
                Ok(())
            }
        }
    }

    /// Highest confirmed index for the slot, if any.
    pub fn highest(&self, account: AccountId, ordinal: KeyOrdinal) -> Option<KeyUseIndexSet> {
        self.gates.read().get(&(account, ordinal)).copied()
    }

    /// Whether the given index has already been consumed.
    pub fn is_consumed(
        &self,
        account: AccountId,
        ordinal: KeyOrdinal,
        index: KeyUseIndexSet,
    ) -> bool {
        self.highest(account, ordinal)
            .map(|highest| index <= highest)
            .unwrap_or(false)
    }

    /// Account reclaim: drop every gate for the account. The only clearing
    /// path.
    pub fn reclaim(&self, account: AccountId) {
        let mut gates = self.gates.write();
        let before = gates.len();
        gates.retain(|(gated_account, _), _| *gated_account != account);
        info!(%account, cleared = before - gates.len(), "key gates reclaimed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(sequence: u32, index: u64) -> KeyUseIndexSet {
        KeyUseIndexSet::new(sequence, index, KeyOrdinal::Transaction)
    }

    #[test]
    fn records_and_reads_back() {
        let gates = KeyGateRegistry::new();
        let account = AccountId::standard(1);
        gates
            .record(account, KeyOrdinal::Transaction, set(1, 4))
            .unwrap();

        assert_eq!(gates.highest(account, KeyOrdinal::Transaction), Some(set(1, 4)));
        assert!(gates.is_consumed(account, KeyOrdinal::Transaction, set(1, 4)));
        assert!(gates.is_consumed(account, KeyOrdinal::Transaction, set(1, 3)));
        assert!(!gates.is_consumed(account, KeyOrdinal::Transaction, set(1, 5)));
    }

    #[test]
    fn double_consumption_is_rejected() {
        let gates = KeyGateRegistry::new();
        let account = AccountId::standard(1);
        gates
            .record(account, KeyOrdinal::Transaction, set(1, 4))
            .unwrap();

        let replay = gates.record(account, KeyOrdinal::Transaction, set(1, 4));
        assert!(matches!(replay, Err(LifecycleError::GateReplay { .. })));

        let older = gates.record(account, KeyOrdinal::Transaction, set(1, 2));
        assert!(older.is_err());
    }

    #[test]
    fn new_sequence_supersedes_old() {
        let gates = KeyGateRegistry::new();
        let account = AccountId::standard(1);
        gates
            .record(account, KeyOrdinal::Transaction, set(1, 900))
            .unwrap();
        gates
            .record(account, KeyOrdinal::Transaction, set(2, 0))
            .unwrap();

        assert_eq!(gates.highest(account, KeyOrdinal::Transaction), Some(set(2, 0)));
    }

    #[test]
    fn ordinals_are_independent() {
        let gates = KeyGateRegistry::new();
        let account = AccountId::standard(1);
        gates
            .record(account, KeyOrdinal::Transaction, set(1, 4))
            .unwrap();

        assert!(gates.highest(account, KeyOrdinal::Message).is_none());
    }

    #[test]
    fn reclaim_clears_only_that_account() {
        let gates = KeyGateRegistry::new();
        let a = AccountId::standard(1);
        let b = AccountId::standard(2);
        gates.record(a, KeyOrdinal::Transaction, set(1, 1)).unwrap();
        gates.record(b, KeyOrdinal::Transaction, set(1, 1)).unwrap();

        gates.reclaim(a);

        assert!(gates.highest(a, KeyOrdinal::Transaction).is_none());
        assert!(gates.highest(b, KeyOrdinal::Transaction).is_some());

        // After reclaim the account may start over from index zero.
        gates.record(a, KeyOrdinal::Transaction, set(1, 0)).unwrap();
    }
}
