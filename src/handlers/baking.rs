//! Commands that read or change the persisted baking state.

use alloc::vec::Vec;

use super::get_public_key::public_key_hash_string;
use super::{Pending, Step};
use crate::app_ui::address::{reset_prompt, setup_prompt};
use crate::baking::{is_valid_level, BakingKey, Storage};
use crate::crypto::KeyProvider;
use crate::utils::{read_u32_be, Bip32Path, Curve};
use crate::AppSW;

/// `chain_id || main level || test level` ahead of the path.
const SETUP_HEADER_SIZE: usize = 12;

pub fn handler_reset(data: &[u8]) -> Result<Step, AppSW> {
    if data.len() != 4 {
        return Err(AppSW::WrongLengthForInstruction);
    }
    let level = read_u32_be(data, 0).ok_or(AppSW::WrongLengthForInstruction)?;
    if !is_valid_level(level) {
        return Err(AppSW::ParseError);
    }
    Ok(Step::Confirm(reset_prompt(level), Pending::Reset(level)))
}

/// Overwrites both marks, whatever they were.
pub fn commit_reset<S: Storage>(storage: &mut S, level: u32) -> Result<(), AppSW> {
    let mut state = storage.load().checked();
    state.reset_levels(level);
    storage.store(&state)?;
    log::info!("high-water marks reset to {}", level);
    Ok(())
}

pub fn handler_setup<K: KeyProvider>(
    keys: &mut K,
    p1: u8,
    p2: u8,
    data: &[u8],
) -> Result<Step, AppSW> {
    if p1 != 0 {
        return Err(AppSW::WrongParam);
    }
    if data.len() < SETUP_HEADER_SIZE + 1 {
        return Err(AppSW::WrongLengthForInstruction);
    }
    let curve = Curve::try_from(p2)?;

    let header = |offset| read_u32_be(data, offset).ok_or(AppSW::WrongLengthForInstruction);
    let main_chain_id = header(0)?;
    let main_level = header(4)?;
    let test_level = header(8)?;

    let (path, consumed) = Bip32Path::read(&data[SETUP_HEADER_SIZE..])?;
    if SETUP_HEADER_SIZE + consumed != data.len() {
        return Err(AppSW::WrongLength);
    }

    let public_key = keys.public_key(curve, &path)?;
    Ok(Step::Confirm(
        setup_prompt(
            public_key_hash_string(&public_key),
            main_chain_id,
            main_level,
            test_level,
        ),
        Pending::Setup {
            key: BakingKey { curve, path },
            public_key,
            main_chain_id,
            main_level,
            test_level,
        },
    ))
}

/// Key, chain id and both marks are replaced in a single write.
pub fn commit_setup<S: Storage>(
    storage: &mut S,
    key: BakingKey,
    main_chain_id: u32,
    main_level: u32,
    test_level: u32,
) -> Result<(), AppSW> {
    let mut state = storage.load().checked();
    state.setup(key, main_chain_id, main_level, test_level);
    storage.store(&state)?;
    log::info!("baking set up with chain {:08x}", main_chain_id);
    Ok(())
}

pub fn commit_authorization<S: Storage>(storage: &mut S, key: BakingKey) -> Result<(), AppSW> {
    let mut state = storage.load().checked();
    state.baking_key = Some(key);
    storage.store(&state)?;
    log::info!("baking key authorized");
    Ok(())
}

pub fn handler_deauthorize<S: Storage>(storage: &mut S, p1: u8, data: &[u8]) -> Result<Step, AppSW> {
    if p1 != 0 {
        return Err(AppSW::WrongParam);
    }
    if !data.is_empty() {
        return Err(AppSW::ParseError);
    }
    let mut state = storage.load().checked();
    state.baking_key = None;
    storage.store(&state)?;
    log::info!("baking key removed");
    Ok(Step::Reply(Vec::new()))
}

fn push_path(out: &mut Vec<u8>, key: Option<BakingKey>) {
    match key {
        Some(key) => key.path.to_wire(out),
        None => out.push(0),
    }
}

/// `len || components`, empty when no key is authorized.
pub fn handler_query_auth_key<S: Storage>(storage: &S) -> Result<Step, AppSW> {
    let mut out = Vec::new();
    push_path(&mut out, storage.load().checked().baking_key);
    Ok(Step::Reply(out))
}

/// `curve || len || components`
pub fn handler_query_auth_key_with_curve<S: Storage>(storage: &S) -> Result<Step, AppSW> {
    let key = storage.load().checked().baking_key;
    let mut out = Vec::new();
    out.push(key.map(|k| k.curve).unwrap_or_default().code());
    push_path(&mut out, key);
    Ok(Step::Reply(out))
}

pub fn handler_query_main_hwm<S: Storage>(storage: &S) -> Result<Step, AppSW> {
    let state = storage.load().checked();
    Ok(Step::Reply(state.main.highest_level.to_be_bytes().to_vec()))
}

/// `main level || test level || main chain id`
pub fn handler_query_all_hwm<S: Storage>(storage: &S) -> Result<Step, AppSW> {
    let state = storage.load().checked();
    let mut out = Vec::with_capacity(12);
    out.extend_from_slice(&state.main.highest_level.to_be_bytes());
    out.extend_from_slice(&state.test.highest_level.to_be_bytes());
    out.extend_from_slice(&state.main_chain_id.to_be_bytes());
    Ok(Step::Reply(out))
}
