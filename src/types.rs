use crate::crypto::PKH_SIZE;
use crate::utils::Curve;
use crate::AppSW;

pub const PROTOCOL_HASH_SIZE: usize = 32;

/// Signature type tag carried by implicit accounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SignatureType {
    Ed25519 = 0,
    Secp256k1 = 1,
    P256 = 2,
}

impl TryFrom<u8> for SignatureType {
    type Error = AppSW;

    fn try_from(b: u8) -> Result<Self, Self::Error> {
        match b {
            0 => Ok(SignatureType::Ed25519),
            1 => Ok(SignatureType::Secp256k1),
            2 => Ok(SignatureType::P256),
            _ => Err(AppSW::ParseError),
        }
    }
}

impl From<Curve> for SignatureType {
    fn from(curve: Curve) -> Self {
        match curve {
            Curve::Ed25519 => SignatureType::Ed25519,
            Curve::Secp256k1 => SignatureType::Secp256k1,
            Curve::Secp256r1 => SignatureType::P256,
        }
    }
}

/// Account reference found in operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contract {
    Implicit {
        signature_type: SignatureType,
        hash: [u8; PKH_SIZE],
    },
    Originated {
        hash: [u8; PKH_SIZE],
    },
}

impl Contract {
    pub fn is_originated(&self) -> bool {
        matches!(self, Contract::Originated { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Vote {
    Yea,
    Nay,
    Pass,
}

/// Operation tags understood by the parser.
pub mod tag {
    pub const PROPOSAL: u8 = 5;
    pub const BALLOT: u8 = 6;
    pub const ATHENS_REVEAL: u8 = 7;
    pub const ATHENS_TRANSACTION: u8 = 8;
    pub const ATHENS_ORIGINATION: u8 = 9;
    pub const ATHENS_DELEGATION: u8 = 10;
    pub const BABYLON_REVEAL: u8 = 107;
    pub const BABYLON_TRANSACTION: u8 = 108;
    pub const BABYLON_ORIGINATION: u8 = 109;
    pub const BABYLON_DELEGATION: u8 = 110;
}

/// Kinds of operation a caller may accept, independent of protocol era.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationType {
    Reveal,
    Transaction,
    Origination,
    Delegation,
    Proposal,
    Ballot,
}

impl OperationType {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            tag::PROPOSAL => Some(OperationType::Proposal),
            tag::BALLOT => Some(OperationType::Ballot),
            tag::ATHENS_REVEAL | tag::BABYLON_REVEAL => Some(OperationType::Reveal),
            tag::ATHENS_TRANSACTION | tag::BABYLON_TRANSACTION => Some(OperationType::Transaction),
            tag::ATHENS_ORIGINATION | tag::BABYLON_ORIGINATION => Some(OperationType::Origination),
            tag::ATHENS_DELEGATION | tag::BABYLON_DELEGATION => Some(OperationType::Delegation),
            _ => None,
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of operation types a parse is allowed to contain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllowedOperations(u8);

impl AllowedOperations {
    pub const fn none() -> Self {
        Self(0)
    }

    pub const fn with(self, op: OperationType) -> Self {
        Self(self.0 | op.bit())
    }

    pub const fn all() -> Self {
        Self::none()
            .with(OperationType::Reveal)
            .with(OperationType::Transaction)
            .with(OperationType::Origination)
            .with(OperationType::Delegation)
            .with(OperationType::Proposal)
            .with(OperationType::Ballot)
    }

    pub const fn contains(self, op: OperationType) -> bool {
        self.0 & op.bit() != 0
    }
}

/// Action encoded by one of the recognised manager contract scripts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ManagerAction {
    /// `None` clears the delegate.
    SetDelegate(Option<Contract>),
    Transfer { destination: Contract, amount: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    Transaction {
        amount: u64,
        destination: Contract,
        /// Present when the transaction calls `do` on a manager contract.
        manager: Option<ManagerAction>,
    },
    Origination {
        manager: Contract,
        balance: u64,
        spendable: bool,
        delegatable: bool,
        delegate: Option<Contract>,
    },
    /// `None` withdraws the delegate.
    Delegation { delegate: Option<Contract> },
    Proposal {
        period: i32,
        protocol_hash: [u8; PROTOCOL_HASH_SIZE],
    },
    Ballot {
        period: i32,
        proposal: [u8; PROTOCOL_HASH_SIZE],
        vote: Vote,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Operation {
    pub tag: u8,
    pub source: Contract,
    pub kind: OperationKind,
}

/// A decoded operation group with exactly one non-reveal operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationGroup {
    /// Account of the key the group is being signed with.
    pub signing: Contract,
    pub total_fee: u64,
    pub total_storage_limit: u64,
    pub has_reveal: bool,
    pub operation: Operation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_operations() {
        let baking = AllowedOperations::none()
            .with(OperationType::Reveal)
            .with(OperationType::Delegation);
        assert!(baking.contains(OperationType::Delegation));
        assert!(!baking.contains(OperationType::Transaction));
        assert!(AllowedOperations::all().contains(OperationType::Ballot));
    }

    #[test]
    fn test_tags_map_to_types_across_eras() {
        assert_eq!(OperationType::from_tag(8), Some(OperationType::Transaction));
        assert_eq!(OperationType::from_tag(108), Some(OperationType::Transaction));
        assert_eq!(OperationType::from_tag(0), None);
        assert_eq!(OperationType::from_tag(11), None);
    }
}
