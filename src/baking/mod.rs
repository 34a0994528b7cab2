//! High-water-mark guard for consensus signing.
//!
//! A block or endorsement is only signed when its level is above the last level signed on the
//! same chain, or equal to it for the first endorsement at that level. The new mark is stored
//! before the signature is produced.

use crate::utils::{read_u32_be, Bip32Path, Curve};
use crate::AppSW;

pub mod nvram;

pub use nvram::{BakingKey, HighWatermark, NvramData, NvramRecord, Storage};

pub const MAGIC_BLOCK: u8 = 0x01;
pub const MAGIC_ENDORSEMENT: u8 = 0x02;

/// `magic, chain_id u32, level u32, proto u8`, anything after is not inspected.
const BLOCK_MIN_SIZE: usize = 10;
/// `magic, chain_id u32, branch[32], kind u8, level u32`
const ENDORSEMENT_SIZE: usize = 42;
const ENDORSEMENT_KIND: u8 = 0x00;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Chain {
    Main,
    Test,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConsensusData {
    pub chain_id: u32,
    pub level: u32,
    pub is_endorsement: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageClass {
    Block(ConsensusData),
    Endorsement(ConsensusData),
    Generic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Authorization {
    Accept,
    Reject,
}

/// Recognises consensus messages by their fixed-shape headers.
pub fn classify(data: &[u8]) -> MessageClass {
    match data.first() {
        Some(&MAGIC_BLOCK) if data.len() >= BLOCK_MIN_SIZE => {
            match (read_u32_be(data, 1), read_u32_be(data, 5)) {
                (Some(chain_id), Some(level)) => MessageClass::Block(ConsensusData {
                    chain_id,
                    level,
                    is_endorsement: false,
                }),
                _ => MessageClass::Generic,
            }
        }
        Some(&MAGIC_ENDORSEMENT)
            if data.len() == ENDORSEMENT_SIZE && data[37] == ENDORSEMENT_KIND =>
        {
            match (read_u32_be(data, 1), read_u32_be(data, 38)) {
                (Some(chain_id), Some(level)) => MessageClass::Endorsement(ConsensusData {
                    chain_id,
                    level,
                    is_endorsement: true,
                }),
                _ => MessageClass::Generic,
            }
        }
        _ => MessageClass::Generic,
    }
}

/// Levels with either of the two top bits set are negative or overflowed on the wire.
pub const fn is_valid_level(level: u32) -> bool {
    level & 0xC000_0000 == 0
}

impl NvramData {
    pub fn chain_for(&self, chain_id: u32) -> Chain {
        if chain_id == self.main_chain_id || self.main_chain_id == 0 {
            Chain::Main
        } else {
            Chain::Test
        }
    }

    pub fn hwm(&self, chain: Chain) -> &HighWatermark {
        match chain {
            Chain::Main => &self.main,
            Chain::Test => &self.test,
        }
    }

    fn hwm_mut(&mut self, chain: Chain) -> &mut HighWatermark {
        match chain {
            Chain::Main => &mut self.main,
            Chain::Test => &mut self.test,
        }
    }

    /// Whether `curve`/`path` is the authorized baking key.
    pub fn is_path_authorized(&self, curve: Curve, path: &Bip32Path) -> bool {
        match &self.baking_key {
            Some(key) => !path.is_empty() && key.curve == curve && key.path == *path,
            None => false,
        }
    }

    /// Records a signed consensus message.
    pub fn write_high_watermark(&mut self, data: &ConsensusData) -> Result<(), AppSW> {
        if !is_valid_level(data.level) {
            return Err(AppSW::WrongValues);
        }
        let chain = self.chain_for(data.chain_id);
        let hwm = self.hwm_mut(chain);
        hwm.highest_level = hwm.highest_level.max(data.level);
        hwm.had_endorsement = data.is_endorsement;
        Ok(())
    }

    /// Overwrites both chains' marks, without comparing with the current ones.
    pub fn reset_levels(&mut self, level: u32) {
        for hwm in [&mut self.main, &mut self.test] {
            hwm.highest_level = level;
            hwm.had_endorsement = false;
        }
    }

    /// Installs a new baking key with its chain id and starting marks.
    pub fn setup(&mut self, key: BakingKey, main_chain_id: u32, main_level: u32, test_level: u32) {
        self.baking_key = Some(key);
        self.main_chain_id = main_chain_id;
        self.main = HighWatermark {
            highest_level: main_level,
            had_endorsement: false,
        };
        self.test = HighWatermark {
            highest_level: test_level,
            had_endorsement: false,
        };
    }
}

/// The double signing rule.
pub fn authorize(state: &NvramData, chain: Chain, level: u32, is_endorsement: bool) -> Authorization {
    let hwm = state.hwm(chain);
    if !is_valid_level(level) {
        return Authorization::Reject;
    }
    if level > hwm.highest_level
        || (level == hwm.highest_level && is_endorsement && !hwm.had_endorsement)
    {
        Authorization::Accept
    } else {
        Authorization::Reject
    }
}

/// Checks that `curve`/`path` may sign `data` and commits the new mark.
///
/// The key check fails with [`AppSW::Security`], the level check with
/// [`AppSW::WrongValues`]. Nothing is written unless both pass.
pub fn authorize_and_commit<S: Storage>(
    storage: &mut S,
    curve: Curve,
    path: &Bip32Path,
    data: &ConsensusData,
) -> Result<(), AppSW> {
    let mut state = storage.load().checked();

    if !state.is_path_authorized(curve, path) {
        log::warn!("consensus signing request for a key other than the baking key");
        return Err(AppSW::Security);
    }

    let chain = state.chain_for(data.chain_id);
    if authorize(&state, chain, data.level, data.is_endorsement) == Authorization::Reject {
        log::warn!(
            "refusing level {} on {:?} chain, high-water mark is {:?}",
            data.level,
            chain,
            state.hwm(chain)
        );
        return Err(AppSW::WrongValues);
    }

    state.write_high_watermark(data)?;
    storage.store(&state)?;
    log::info!("high-water mark on {:?} chain now {}", chain, data.level);
    Ok(())
}
