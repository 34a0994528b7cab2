use alloc::string::String;
use alloc::vec::Vec;

use crate::types::{Contract, SignatureType};

const TZ1: [u8; 3] = [6, 161, 159];
const TZ2: [u8; 3] = [6, 161, 161];
const TZ3: [u8; 3] = [6, 161, 164];
const KT1: [u8; 3] = [2, 90, 121];
const NET: [u8; 3] = [87, 82, 0];
const PROTO: [u8; 2] = [2, 170];

pub const MAINNET_CHAIN_ID: u32 = 0x7A06_A770;

/// Base58 with a double SHA-256 checksum over `prefix || payload`.
pub fn base58check(prefix: &[u8], payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(prefix.len() + payload.len());
    data.extend_from_slice(prefix);
    data.extend_from_slice(payload);
    bs58::encode(data).with_check().into_string()
}

/// Plain base58, used for raw hashes.
pub fn base58(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

pub fn contract_to_string(contract: &Contract) -> String {
    match contract {
        Contract::Implicit {
            signature_type,
            hash,
        } => {
            let prefix = match signature_type {
                SignatureType::Ed25519 => &TZ1,
                SignatureType::Secp256k1 => &TZ2,
                SignatureType::P256 => &TZ3,
            };
            base58check(prefix, hash)
        }
        Contract::Originated { hash } => base58check(&KT1, hash),
    }
}

pub fn chain_id_to_string(chain_id: u32) -> String {
    match chain_id {
        0 => "any".into(),
        MAINNET_CHAIN_ID => "mainnet".into(),
        id => base58check(&NET, &id.to_be_bytes()),
    }
}

pub fn protocol_hash_to_string(hash: &[u8]) -> String {
    base58check(&PROTO, hash)
}
