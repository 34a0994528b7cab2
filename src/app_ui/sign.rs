use alloc::format;
use alloc::string::String;

use super::format::{base58, contract_to_string, protocol_hash_to_string};
use super::{Prompt, PromptKind};
use crate::types::{Contract, ManagerAction, OperationGroup, OperationKind, Vote};
use crate::utils::{microtez_to_string, number_to_string};

const SIGN: &str = "Sign operation";

fn tez(mutez: u64) -> String {
    format!("{} XTZ", microtez_to_string(mutez))
}

fn delegate_or_none(delegate: &Option<Contract>) -> String {
    match delegate {
        Some(d) => contract_to_string(d),
        None => "None".into(),
    }
}

/// Review of a decoded operation group, or `None` when it has no detailed review and must be
/// signed blind.
pub fn operation_prompt(ops: &OperationGroup) -> Option<Prompt> {
    let op = &ops.operation;
    let fee = tez(ops.total_fee);
    let storage = number_to_string(ops.total_storage_limit);

    let prompt = match &op.kind {
        OperationKind::Transaction {
            amount,
            destination,
            manager: None,
        } => Prompt::new(PromptKind::Operation, "Confirm Transaction", SIGN)
            .field("Amount", tez(*amount))
            .field("Fee", fee)
            .field("Source", contract_to_string(&op.source))
            .field("Destination", contract_to_string(destination))
            .field("Storage", storage),

        // A manager call acts on behalf of the contract it is sent to.
        OperationKind::Transaction {
            destination: kt1,
            manager: Some(action),
            ..
        } => match action {
            ManagerAction::Transfer {
                destination,
                amount,
            } => Prompt::new(PromptKind::Operation, "Confirm Transaction", SIGN)
                .field("Amount", tez(*amount))
                .field("Fee", fee)
                .field("Source", contract_to_string(kt1))
                .field("Destination", contract_to_string(destination))
                .field("Storage", storage),
            ManagerAction::SetDelegate(delegate) => delegation_prompt(kt1, delegate, fee, storage),
        },

        OperationKind::Delegation { delegate } => {
            delegation_prompt(&op.source, delegate, fee, storage)
        }

        OperationKind::Origination {
            spendable: false, ..
        } => return None,

        OperationKind::Origination {
            manager,
            balance,
            delegatable,
            delegate,
            ..
        } => {
            let prompt = Prompt::new(PromptKind::Operation, "Confirm Origination", SIGN)
                .field("Amount", tez(*balance))
                .field("Fee", fee)
                .field("Source", contract_to_string(&op.source))
                .field("Manager", contract_to_string(manager));
            let prompt = match (delegatable, delegate) {
                (true, Some(d)) => prompt.field("Delegate", contract_to_string(d)),
                (true, None) => prompt.field("Delegate", "Any".into()),
                (false, Some(d)) => prompt.field("Fixed Delegate", contract_to_string(d)),
                (false, None) => prompt.field("Delegation", "Disabled".into()),
            };
            prompt.field("Storage", storage)
        }

        OperationKind::Proposal {
            period,
            protocol_hash,
        } => Prompt::new(PromptKind::Operation, "Confirm Proposal", SIGN)
            .field("Source", contract_to_string(&op.source))
            .field("Period", format!("{}", period))
            .field("Protocol", protocol_hash_to_string(protocol_hash)),

        OperationKind::Ballot {
            period,
            proposal,
            vote,
        } => {
            let vote = match vote {
                Vote::Yea => "Yea",
                Vote::Nay => "Nay",
                Vote::Pass => "Pass",
            };
            Prompt::new(PromptKind::Operation, "Confirm Vote", "Sign vote")
                .field("Vote", vote.into())
                .field("Source", contract_to_string(&op.source))
                .field("Protocol", protocol_hash_to_string(proposal))
                .field("Period", format!("{}", period))
        }
    };
    Some(prompt)
}

fn delegation_prompt(
    source: &Contract,
    delegate: &Option<Contract>,
    fee: String,
    storage: String,
) -> Prompt {
    let title = match delegate {
        Some(_) => "Confirm Delegation",
        None => "Withdraw Delegation",
    };
    Prompt::new(PromptKind::Operation, title, SIGN)
        .field("Fee", fee)
        .field("Source", contract_to_string(source))
        .field("Delegate", delegate_or_none(delegate))
        .field("Storage", storage)
}

/// Review of content that could not be decoded: only its hash is shown.
pub fn blind_prompt(hash: &[u8]) -> Prompt {
    Prompt::new(PromptKind::Operation, "Unrecognized operation", "Sign hash")
        .field("Sign Hash", base58(hash))
}

/// Review of a raw message signed as is.
pub fn prehashed_prompt(data: &[u8]) -> Prompt {
    Prompt::new(PromptKind::Operation, "Pre-hashed operation", "Sign hash")
        .field("Sign Hash", base58(data))
}

/// Review of the baker registering its own key as delegate.
pub fn register_delegate_prompt(ops: &OperationGroup) -> Prompt {
    Prompt::new(PromptKind::Operation, "Register as delegate?", "Register")
        .field("Address", contract_to_string(&ops.signing))
        .field("Fee", tez(ops.total_fee))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{tag, Operation, SignatureType};

    fn group(source: Contract, kind: OperationKind) -> OperationGroup {
        OperationGroup {
            signing: source,
            total_fee: 1_420,
            total_storage_limit: 277,
            has_reveal: false,
            operation: Operation {
                tag: tag::BABYLON_TRANSACTION,
                source,
                kind,
            },
        }
    }

    fn review(ops: OperationGroup) -> Prompt {
        operation_prompt(&ops).expect("detailed review")
    }

    fn me() -> Contract {
        Contract::Implicit {
            signature_type: SignatureType::Ed25519,
            hash: [0; 20],
        }
    }

    #[test]
    fn test_transaction_prompt() {
        let p = review(group(
            me(),
            OperationKind::Transaction {
                amount: 1_500_000,
                destination: Contract::Originated { hash: [1; 20] },
                manager: None,
            },
        ));
        assert_eq!(p.title, "Confirm Transaction");
        assert_eq!(p.value("Amount"), Some("1.5 XTZ"));
        assert_eq!(p.value("Fee"), Some("0.00142 XTZ"));
        assert_eq!(p.value("Source"), Some("tz1Ke2h7sDdakHJQh8WX4Z372du1KChsksyU"));
        assert!(p.value("Destination").unwrap().starts_with("KT1"));
        assert_eq!(p.value("Storage"), Some("277"));
    }

    #[test]
    fn test_manager_transfer_shows_contract_as_source() {
        let kt1 = Contract::Originated { hash: [1; 20] };
        let p = review(group(
            me(),
            OperationKind::Transaction {
                amount: 0,
                destination: kt1,
                manager: Some(ManagerAction::Transfer {
                    destination: me(),
                    amount: 42,
                }),
            },
        ));
        assert_eq!(p.value("Source"), Some(contract_to_string(&kt1).as_str()));
        assert_eq!(p.value("Amount"), Some("0.000042 XTZ"));
    }

    #[test]
    fn test_withdraw_delegation() {
        let p = review(group(me(), OperationKind::Delegation { delegate: None }));
        assert_eq!(p.title, "Withdraw Delegation");
        assert_eq!(p.value("Delegate"), Some("None"));
    }

    #[test]
    fn test_origination_delegate_variants() {
        let origination = |delegatable, delegate| {
            review(group(
                me(),
                OperationKind::Origination {
                    manager: me(),
                    balance: 1,
                    spendable: true,
                    delegatable,
                    delegate,
                },
            ))
        };
        assert_eq!(origination(true, None).value("Delegate"), Some("Any"));
        assert_eq!(origination(false, None).value("Delegation"), Some("Disabled"));
        assert!(origination(false, Some(me())).value("Fixed Delegate").is_some());
    }

    #[test]
    fn test_only_spendable_originations_are_detailed() {
        let origination = |spendable| {
            operation_prompt(&group(
                me(),
                OperationKind::Origination {
                    manager: me(),
                    balance: 2_000_000,
                    spendable,
                    delegatable: true,
                    delegate: None,
                },
            ))
        };
        let p = origination(true).expect("detailed review");
        assert_eq!(p.title, "Confirm Origination");
        assert_eq!(p.value("Amount"), Some("2 XTZ"));
        assert_eq!(origination(false), None);
    }

    #[test]
    fn test_ballot_prompt() {
        let p = review(group(
            me(),
            OperationKind::Ballot {
                period: 31,
                proposal: [0; 32],
                vote: Vote::Nay,
            },
        ));
        assert_eq!(p.title, "Confirm Vote");
        assert_eq!(p.value("Vote"), Some("Nay"));
        assert_eq!(p.value("Period"), Some("31"));
    }

    #[test]
    fn test_blind_prompt_shows_base58_hash() {
        let p = blind_prompt(&[0u8; 32]);
        assert_eq!(p.value("Sign Hash"), Some("11111111111111111111111111111111"));
    }
}
