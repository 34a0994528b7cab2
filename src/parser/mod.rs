//! Operation group decoding.
//!
//! A group is `0x03 || branch[32]` followed by operations. Reveals of the signing key may
//! appear any number of times; exactly one other operation must follow them and end the
//! buffer.

use crate::crypto::secure::constant_time_eq;
use crate::crypto::PublicKey;
use crate::types::{
    tag, AllowedOperations, Contract, Operation, OperationGroup, OperationKind, OperationType,
    SignatureType, Vote,
};
use crate::AppSW;

pub mod michelson;
pub mod reader;

pub use reader::Reader;

pub const MAGIC_OPERATION: u8 = 0x03;
pub const BRANCH_SIZE: usize = 32;

const PARAMS_NONE: u8 = 0x00;
const PARAMS_SOME: u8 = 0xFF;

/// `signature_type || hash[20]`
pub(crate) fn read_implicit(r: &mut Reader<'_>) -> Result<Contract, AppSW> {
    let signature_type = SignatureType::try_from(r.byte()?)?;
    Ok(Contract::Implicit {
        signature_type,
        hash: r.array()?,
    })
}

/// `0x00 || implicit` or `0x01 || hash[20] || padding`
fn read_contract(r: &mut Reader<'_>) -> Result<Contract, AppSW> {
    match r.byte()? {
        0 => read_implicit(r),
        _ => {
            let hash = r.array()?;
            r.byte()?;
            Ok(Contract::Originated { hash })
        }
    }
}

fn read_optional_implicit(r: &mut Reader<'_>) -> Result<Option<Contract>, AppSW> {
    match r.byte()? {
        0 => Ok(None),
        _ => read_implicit(r).map(Some),
    }
}

/// Decodes an operation group to be signed with `key`.
///
/// Fails with [`AppSW::ParseError`] on any malformed, truncated, oversized or disallowed
/// content.
pub fn parse_operations(
    data: &[u8],
    key: &PublicKey,
    allowed: AllowedOperations,
) -> Result<OperationGroup, AppSW> {
    let mut r = Reader::new(data);

    if r.byte()? != MAGIC_OPERATION {
        return Err(AppSW::ParseError);
    }
    r.take(BRANCH_SIZE)?;

    let signing_type = SignatureType::from(key.curve());
    let signing = Contract::Implicit {
        signature_type: signing_type,
        hash: key.hash(),
    };
    let (key_bytes, key_len) = key.compressed();

    let mut total_fee: u64 = 0;
    let mut total_storage_limit: u64 = 0;
    let mut has_reveal = false;

    while !r.is_empty() {
        let op_tag = r.byte()?;
        let op_type = OperationType::from_tag(op_tag)
            .filter(|t| allowed.contains(*t))
            .ok_or(AppSW::ParseError)?;

        let source = match op_tag {
            tag::ATHENS_REVEAL
            | tag::ATHENS_TRANSACTION
            | tag::ATHENS_ORIGINATION
            | tag::ATHENS_DELEGATION => read_contract(&mut r)?,
            _ => read_implicit(&mut r)?,
        };

        if !matches!(op_type, OperationType::Proposal | OperationType::Ballot) {
            total_fee = total_fee.wrapping_add(r.z()?);
            r.z()?; // counter
            r.z()?; // gas limit
            total_storage_limit = total_storage_limit.wrapping_add(r.z()?);
        }

        if op_type == OperationType::Reveal {
            if SignatureType::try_from(r.byte()?)? != signing_type {
                return Err(AppSW::ParseError);
            }
            if !constant_time_eq(r.take(key_len)?, &key_bytes[..key_len]) {
                return Err(AppSW::ParseError);
            }
            has_reveal = true;
            continue;
        }

        if matches!(source, Contract::Implicit { .. }) && source != signing {
            return Err(AppSW::ParseError);
        }

        let kind = match op_type {
            OperationType::Transaction => parse_transaction(&mut r, op_tag)?,
            OperationType::Origination => parse_origination(&mut r)?,
            OperationType::Delegation => OperationKind::Delegation {
                delegate: read_optional_implicit(&mut r)?,
            },
            OperationType::Proposal => parse_proposal(&mut r)?,
            OperationType::Ballot => parse_ballot(&mut r)?,
            OperationType::Reveal => return Err(AppSW::ParseError),
        };

        r.finish()?;
        return Ok(OperationGroup {
            signing,
            total_fee,
            total_storage_limit,
            has_reveal,
            operation: Operation {
                tag: op_tag,
                source,
                kind,
            },
        });
    }

    log::debug!("operation group without a signable operation");
    Err(AppSW::ParseError)
}

fn parse_transaction(r: &mut Reader<'_>, op_tag: u8) -> Result<OperationKind, AppSW> {
    let amount = r.z()?;
    let destination = read_contract(r)?;
    let manager = match r.byte()? {
        PARAMS_NONE => None,
        PARAMS_SOME => {
            // Manager scripts only exist behind the entrypoint encoding and never move funds
            // from the calling account.
            if op_tag != tag::BABYLON_TRANSACTION || amount != 0 || !destination.is_originated() {
                return Err(AppSW::ParseError);
            }
            Some(michelson::parse_manager_call(r)?)
        }
        _ => return Err(AppSW::ParseError),
    };
    Ok(OperationKind::Transaction {
        amount,
        destination,
        manager,
    })
}

fn parse_origination(r: &mut Reader<'_>) -> Result<OperationKind, AppSW> {
    let manager = read_implicit(r)?;
    let balance = r.z()?;
    let spendable = r.byte()? != 0;
    let delegatable = r.byte()? != 0;
    let delegate = read_optional_implicit(r)?;
    if r.byte()? != 0 {
        // Scripted originations are not signed.
        return Err(AppSW::ParseError);
    }
    Ok(OperationKind::Origination {
        manager,
        balance,
        spendable,
        delegatable,
        delegate,
    })
}

fn parse_proposal(r: &mut Reader<'_>) -> Result<OperationKind, AppSW> {
    let period = r.i32_be()?;
    if r.u32_be()? as usize != crate::types::PROTOCOL_HASH_SIZE {
        return Err(AppSW::ParseError);
    }
    Ok(OperationKind::Proposal {
        period,
        protocol_hash: r.array()?,
    })
}

fn parse_ballot(r: &mut Reader<'_>) -> Result<OperationKind, AppSW> {
    let period = r.i32_be()?;
    let proposal = r.array()?;
    let vote = match r.byte()? as i8 {
        0 => Vote::Yea,
        1 => Vote::Nay,
        2 => Vote::Pass,
        _ => return Err(AppSW::ParseError),
    };
    Ok(OperationKind::Ballot {
        period,
        proposal,
        vote,
    })
}
