//! Recognition of the manager contract `do` entrypoint scripts.
//!
//! Only three literal scripts are accepted: set or clear the delegate, transfer to an implicit
//! account, and transfer to an originated contract on its default entrypoint. Everything else
//! is rejected.

use super::reader::Reader;
use super::read_implicit;
use crate::crypto::PKH_SIZE;
use crate::types::{Contract, ManagerAction};
use crate::AppSW;

pub const ENTRYPOINT_DO: u8 = 0x02;

pub const SEQUENCE: u8 = 0x02;
pub const BYTES: u8 = 0x0a;
pub const INT: u8 = 0x00;

pub const DROP: u16 = 0x0320;
pub const NIL: u16 = 0x053d;
pub const OPERATION: u16 = 0x036d;
pub const PUSH: u16 = 0x0743;
pub const KEY_HASH: u16 = 0x035d;
pub const SOME: u16 = 0x0346;
pub const NONE: u16 = 0x053e;
pub const SET_DELEGATE: u16 = 0x034e;
pub const IMPLICIT_ACCOUNT: u16 = 0x031e;
pub const MUTEZ: u16 = 0x036a;
pub const UNIT: u16 = 0x034f;
pub const TRANSFER_TOKENS: u16 = 0x034d;
pub const CONS: u16 = 0x031b;
pub const ADDRESS: u16 = 0x036e;
pub const CONTRACT: u16 = 0x0555;
pub const UNIT_TYPE: u16 = 0x036c;

/// `{ IF_NONE { { UNIT ; FAILWITH } } {} }`
pub const IF_NONE_FAIL: [u8; 26] = [
    0x02, 0x00, 0x00, 0x00, 0x15, 0x07, 0x2f, 0x02, 0x00, 0x00, 0x00, 0x09, 0x02, 0x00, 0x00,
    0x00, 0x04, 0x03, 0x4f, 0x03, 0x27, 0x02, 0x00, 0x00, 0x00, 0x00,
];

const KEY_HASH_SIZE: usize = 1 + PKH_SIZE;
const ADDRESS_SIZE: usize = 2 + PKH_SIZE;

/// Parses transaction parameters: entrypoint, length-prefixed script, script body.
pub fn parse_manager_call(r: &mut Reader<'_>) -> Result<ManagerAction, AppSW> {
    if r.byte()? != ENTRYPOINT_DO {
        return Err(AppSW::ParseError);
    }
    let len = r.u32_be()? as usize;
    let mut script = Reader::new(r.take(len)?);
    let action = parse_script(&mut script)?;
    script.finish()?;
    Ok(action)
}

fn parse_script(m: &mut Reader<'_>) -> Result<ManagerAction, AppSW> {
    let body_len = sequence(m)?;
    let start = m.position();

    prim(m, DROP)?;
    prim(m, NIL)?;
    prim(m, OPERATION)?;

    let action = match m.u16_be()? {
        PUSH => match m.u16_be()? {
            KEY_HASH => {
                let key_hash = key_hash_literal(m)?;
                match m.u16_be()? {
                    SOME => {
                        prim(m, SET_DELEGATE)?;
                        ManagerAction::SetDelegate(Some(key_hash))
                    }
                    IMPLICIT_ACCOUNT => ManagerAction::Transfer {
                        destination: key_hash,
                        amount: transfer_tail(m)?,
                    },
                    _ => return Err(AppSW::ParseError),
                }
            }
            ADDRESS => {
                let destination = originated_literal(m)?;
                prim(m, CONTRACT)?;
                prim(m, UNIT_TYPE)?;
                literal(m, &IF_NONE_FAIL)?;
                ManagerAction::Transfer {
                    destination,
                    amount: transfer_tail(m)?,
                }
            }
            _ => return Err(AppSW::ParseError),
        },
        NONE => {
            prim(m, KEY_HASH)?;
            prim(m, SET_DELEGATE)?;
            ManagerAction::SetDelegate(None)
        }
        _ => return Err(AppSW::ParseError),
    };

    prim(m, CONS)?;
    if m.position() - start != body_len {
        return Err(AppSW::ParseError);
    }
    Ok(action)
}

/// `PUSH mutez <n> ; UNIT ; TRANSFER_TOKENS`
fn transfer_tail(m: &mut Reader<'_>) -> Result<u64, AppSW> {
    prim(m, PUSH)?;
    prim(m, MUTEZ)?;
    let amount = int_literal(m)?;
    prim(m, UNIT)?;
    prim(m, TRANSFER_TOKENS)?;
    Ok(amount)
}

fn sequence(m: &mut Reader<'_>) -> Result<usize, AppSW> {
    if m.byte()? != SEQUENCE {
        return Err(AppSW::ParseError);
    }
    Ok(m.u32_be()? as usize)
}

fn prim(m: &mut Reader<'_>, expected: u16) -> Result<(), AppSW> {
    if m.u16_be()? != expected {
        return Err(AppSW::ParseError);
    }
    Ok(())
}

fn literal(m: &mut Reader<'_>, expected: &[u8]) -> Result<(), AppSW> {
    if m.take(expected.len())? != expected {
        return Err(AppSW::ParseError);
    }
    Ok(())
}

fn bytes_literal<'a>(m: &mut Reader<'a>, size: usize) -> Result<&'a [u8], AppSW> {
    if m.byte()? != BYTES || m.u32_be()? as usize != size {
        return Err(AppSW::ParseError);
    }
    m.take(size)
}

fn key_hash_literal(m: &mut Reader<'_>) -> Result<Contract, AppSW> {
    let mut r = Reader::new(bytes_literal(m, KEY_HASH_SIZE)?);
    read_implicit(&mut r)
}

fn originated_literal(m: &mut Reader<'_>) -> Result<Contract, AppSW> {
    let raw = bytes_literal(m, ADDRESS_SIZE)?;
    if raw[0] != 0x01 || raw[ADDRESS_SIZE - 1] != 0x00 {
        return Err(AppSW::ParseError);
    }
    let mut hash = [0u8; PKH_SIZE];
    hash.copy_from_slice(&raw[1..1 + PKH_SIZE]);
    Ok(Contract::Originated { hash })
}

/// Non-negative Micheline integer that fits in 64 bits.
fn int_literal(m: &mut Reader<'_>) -> Result<u64, AppSW> {
    if m.byte()? != INT {
        return Err(AppSW::ParseError);
    }
    let first = m.byte()?;
    if first & 0x40 != 0 {
        return Err(AppSW::ParseError);
    }
    let mut acc = u64::from(first & 0x3F);
    let mut shift = 6u32;
    let mut b = first;
    while b & 0x80 != 0 {
        b = m.byte()?;
        let group = u64::from(b & 0x7F);
        if shift >= 64 || (group << shift) >> shift != group {
            return Err(AppSW::ParseError);
        }
        acc |= group << shift;
        shift += 7;
    }
    Ok(acc)
}
