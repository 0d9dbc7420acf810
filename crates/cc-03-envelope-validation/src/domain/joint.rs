//! # Joint-Signature Rules
//!
//! Membership and shape checks for multi-party signatures, plus the
//! per-signer hash binding. Pure logic over the signer set; key resolution
//! and dispatch stay in the service.

use shared_crypto::sha3_512;
use shared_types::{
    AccountId, PublishedSignature, TransactionKind, ValidationError,
};
use std::collections::HashSet;

/// Signers a joint transaction must and may carry.
#[derive(Debug, Clone)]
pub struct SignerSet {
    pub permitted: HashSet<AccountId>,
    pub required: HashSet<AccountId>,
}

impl SignerSet {
    /// The member list is published: every member is permitted and, for the
    /// fixed N-of-N schemes this chain uses, required.
    pub fn from_members(members: &[AccountId]) -> Self {
        let set: HashSet<AccountId> = members.iter().copied().collect();
        Self {
            permitted: set.clone(),
            required: set,
        }
    }

    /// The member list is not yet published: the signature set defines
    /// itself. Membership checks then reduce to the shape rules.
    pub fn from_signatures(signatures: &[PublishedSignature]) -> Self {
        let set: HashSet<AccountId> = signatures.iter().map(|s| s.address.account).collect();
        Self {
            permitted: set.clone(),
            required: set,
        }
    }
}

/// Every shape and membership violation of a joint signature, in check
/// order. Empty means the set is well-formed.
pub fn joint_shape_errors(
    kind: &TransactionKind,
    signatures: &[PublishedSignature],
    signers: &SignerSet,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let present: HashSet<AccountId> = signatures.iter().map(|s| s.address.account).collect();

    // Duplicate signers collapse in the set; the count rule catches them.
    if present.len() != signatures.len() {
        errors.push(ValidationError::JointSignerCountInvalid);
    }

    if let TransactionKind::ThreeWayGated { target } = kind {
        if signatures.len() != 3 {
            errors.push(ValidationError::JointSignerCountInvalid);
        }
        if !present.contains(target) {
            errors.push(ValidationError::JointRequiredSignerMissing);
        }
    }

    for signer in &present {
        if !signers.permitted.contains(signer) {
            errors.push(ValidationError::JointSignerNotPermitted);
            break;
        }
    }

    for required in &signers.required {
        if !present.contains(required) {
            errors.push(ValidationError::JointRequiredSignerMissing);
            break;
        }
    }

    errors
}

/// The hash a non-emitter co-signer signs: the transaction's canonical hash
/// bound to the co-signer's own account and key-use index, so a co-signature
/// cannot be replayed under another index.
pub fn cosigner_hash(base_hash: &[u8], signature: &PublishedSignature) -> Vec<u8> {
    let mut data = Vec::with_capacity(base_hash.len() + 32);
    data.extend_from_slice(base_hash);
    data.extend_from_slice(&signature.address.account.sequence.to_be_bytes());
    data.push(signature.address.ordinal.code());
    data.extend_from_slice(&signature.address.index_set.sequence.to_be_bytes());
    data.extend_from_slice(&signature.address.index_set.index.to_be_bytes());
    sha3_512(&data).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{KeyAddress, KeyOrdinal, KeyUseIndexSet, TransactionId};

    fn signature(account: AccountId, index: u64) -> PublishedSignature {
        PublishedSignature {
            address: KeyAddress {
                account,
                ordinal: KeyOrdinal::Transaction,
                announcement_height: 5,
                declaration_tx: TransactionId::new(account, 1_000),
                index_set: KeyUseIndexSet::new(1, index, KeyOrdinal::Transaction),
            },
            embedded_key: None,
            bytes: vec![],
        }
    }

    #[test]
    fn published_members_must_all_sign() {
        let members = [AccountId::standard(1), AccountId::standard(2)];
        let signers = SignerSet::from_members(&members);
        let signatures = vec![signature(AccountId::standard(1), 0)];

        let errors = joint_shape_errors(&TransactionKind::JointStandard, &signatures, &signers);
        assert!(errors.contains(&ValidationError::JointRequiredSignerMissing));
    }

    #[test]
    fn outsider_is_not_permitted() {
        let members = [AccountId::standard(1), AccountId::standard(2)];
        let signers = SignerSet::from_members(&members);
        let signatures = vec![
            signature(AccountId::standard(1), 0),
            signature(AccountId::standard(2), 0),
            signature(AccountId::standard(9), 0),
        ];

        let errors = joint_shape_errors(&TransactionKind::JointStandard, &signatures, &signers);
        assert!(errors.contains(&ValidationError::JointSignerNotPermitted));
    }

    #[test]
    fn exact_member_set_is_clean() {
        let members = [AccountId::standard(1), AccountId::standard(2)];
        let signers = SignerSet::from_members(&members);
        let signatures = vec![
            signature(AccountId::standard(1), 0),
            signature(AccountId::standard(2), 0),
        ];

        assert!(joint_shape_errors(&TransactionKind::JointStandard, &signatures, &signers)
            .is_empty());
    }

    #[test]
    fn three_way_gate_demands_three_signers_with_target() {
        let target = AccountId::standard(3);
        let kind = TransactionKind::ThreeWayGated { target };
        let accounts = [
            AccountId::standard(1),
            AccountId::standard(2),
            target,
        ];
        let signatures: Vec<_> = accounts.iter().map(|a| signature(*a, 0)).collect();
        let signers = SignerSet::from_signatures(&signatures);

        assert!(joint_shape_errors(&kind, &signatures, &signers).is_empty());

        let missing_target: Vec<_> = [
            AccountId::standard(1),
            AccountId::standard(2),
            AccountId::standard(4),
        ]
        .iter()
        .map(|a| signature(*a, 0))
        .collect();
        let signers = SignerSet::from_signatures(&missing_target);
        let errors = joint_shape_errors(&kind, &missing_target, &signers);
        assert!(errors.contains(&ValidationError::JointRequiredSignerMissing));

        let two_only: Vec<_> = [AccountId::standard(1), target]
            .iter()
            .map(|a| signature(*a, 0))
            .collect();
        let signers = SignerSet::from_signatures(&two_only);
        let errors = joint_shape_errors(&kind, &two_only, &signers);
        assert!(errors.contains(&ValidationError::JointSignerCountInvalid));
    }

    #[test]
    fn duplicate_signer_is_a_count_violation() {
        let account = AccountId::standard(1);
        let signatures = vec![signature(account, 0), signature(account, 1)];
        let signers = SignerSet::from_signatures(&signatures);

        let errors = joint_shape_errors(&TransactionKind::JointStandard, &signatures, &signers);
        assert!(errors.contains(&ValidationError::JointSignerCountInvalid));
    }

    #[test]
    fn cosigner_hash_binds_the_index() {
        let base = sha3_512(b"joint body");
        let a = signature(AccountId::standard(1), 4);
        let mut b = signature(AccountId::standard(1), 4);
        b.address.index_set.index = 5;

        assert_ne!(cosigner_hash(&base, &a), cosigner_hash(&base, &b));
        assert_eq!(cosigner_hash(&base, &a), cosigner_hash(&base, &a));
    }
}
