use crate::config::MAX_BIP32_LEN;
use crate::utils::{Bip32Path, Curve};
use crate::AppSW;

/// Layout revision of [`NvramData`]. Records carrying another value are discarded on load.
pub const NVRAM_VERSION: u8 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HighWatermark {
    pub highest_level: u32,
    /// Set when the endorsement for `highest_level` has been signed.
    pub had_endorsement: bool,
}

/// The one key allowed to sign consensus operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BakingKey {
    pub curve: Curve,
    pub path: Bip32Path,
}

/// Persisted baking state, always replaced as a whole.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NvramData {
    pub version: u8,
    /// Chain id treated as main chain; 0 matches any chain.
    pub main_chain_id: u32,
    pub main: HighWatermark,
    pub test: HighWatermark,
    pub baking_key: Option<BakingKey>,
}

impl NvramData {
    pub const fn new() -> Self {
        Self {
            version: NVRAM_VERSION,
            main_chain_id: 0,
            main: HighWatermark {
                highest_level: 0,
                had_endorsement: false,
            },
            test: HighWatermark {
                highest_level: 0,
                had_endorsement: false,
            },
            baking_key: None,
        }
    }

    /// Returns the record, or a fresh one if it was written by another layout.
    pub fn checked(self) -> Self {
        if self.version == NVRAM_VERSION {
            self
        } else {
            log::warn!("discarding baking state with version {}", self.version);
            Self::new()
        }
    }
}

impl Default for NvramData {
    fn default() -> Self {
        Self::new()
    }
}

const CHAIN_AT: usize = 1;
const MAIN_AT: usize = 5;
const TEST_AT: usize = 10;
const KEY_AT: usize = 15;
const PATH_AT: usize = KEY_AT + 3;

pub const RECORD_SIZE: usize = PATH_AT + 4 * MAX_BIP32_LEN;

/// Flash image of [`NvramData`].
///
/// `version || chain_id[4] || main[5] || test[5] || has_key || curve || path_len || path[40]`,
/// integers big-endian, each watermark being `level[4] || endorsed`. Any content read back is
/// a valid value; whether it is a valid record is decided by decoding it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C)]
pub struct NvramRecord(pub [u8; RECORD_SIZE]);

impl NvramRecord {
    /// Encoding of [`NvramData::new`].
    pub const EMPTY: Self = {
        let mut bytes = [0u8; RECORD_SIZE];
        bytes[0] = NVRAM_VERSION;
        Self(bytes)
    };

    fn put_u32(&mut self, at: usize, value: u32) {
        self.0[at..at + 4].copy_from_slice(&value.to_be_bytes());
    }

    fn u32_at(&self, at: usize) -> u32 {
        u32::from_be_bytes([self.0[at], self.0[at + 1], self.0[at + 2], self.0[at + 3]])
    }

    fn flag_at(&self, at: usize) -> Result<bool, AppSW> {
        match self.0[at] {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(AppSW::WrongValues),
        }
    }

    fn put_watermark(&mut self, at: usize, hwm: &HighWatermark) {
        self.put_u32(at, hwm.highest_level);
        self.0[at + 4] = hwm.had_endorsement as u8;
    }

    fn watermark_at(&self, at: usize) -> Result<HighWatermark, AppSW> {
        Ok(HighWatermark {
            highest_level: self.u32_at(at),
            had_endorsement: self.flag_at(at + 4)?,
        })
    }
}

impl From<&NvramData> for NvramRecord {
    fn from(data: &NvramData) -> Self {
        let mut record = NvramRecord([0u8; RECORD_SIZE]);
        record.0[0] = data.version;
        record.put_u32(CHAIN_AT, data.main_chain_id);
        record.put_watermark(MAIN_AT, &data.main);
        record.put_watermark(TEST_AT, &data.test);
        if let Some(key) = &data.baking_key {
            let components = key.path.as_ref();
            record.0[KEY_AT] = 1;
            record.0[KEY_AT + 1] = key.curve.code();
            record.0[KEY_AT + 2] = components.len() as u8;
            for (i, c) in components.iter().enumerate() {
                record.put_u32(PATH_AT + 4 * i, *c);
            }
        }
        record
    }
}

impl TryFrom<&NvramRecord> for NvramData {
    type Error = AppSW;

    fn try_from(record: &NvramRecord) -> Result<Self, Self::Error> {
        if record.0[0] != NVRAM_VERSION {
            return Err(AppSW::WrongValues);
        }
        let baking_key = if record.flag_at(KEY_AT)? {
            let curve = Curve::try_from(record.0[KEY_AT + 1]).map_err(|_| AppSW::WrongValues)?;
            let mut components = [0u32; MAX_BIP32_LEN];
            for (i, c) in components.iter_mut().enumerate() {
                *c = record.u32_at(PATH_AT + 4 * i);
            }
            let len = record.0[KEY_AT + 2] as usize;
            let path = Bip32Path::new(components.get(..len).ok_or(AppSW::WrongValues)?)?;
            Some(BakingKey { curve, path })
        } else {
            None
        };
        Ok(NvramData {
            version: NVRAM_VERSION,
            main_chain_id: record.u32_at(CHAIN_AT),
            main: record.watermark_at(MAIN_AT)?,
            test: record.watermark_at(TEST_AT)?,
            baking_key,
        })
    }
}

/// Durable home of the [`NvramData`] record.
pub trait Storage {
    fn load(&self) -> NvramData;

    /// Replaces the stored record. Either the whole new record is visible afterwards or the
    /// old one still is.
    fn store(&mut self, data: &NvramData) -> Result<(), AppSW>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_version_is_discarded() {
        let mut data = NvramData::new();
        data.main.highest_level = 10;
        assert_eq!(data.checked().main.highest_level, 10);

        data.version = NVRAM_VERSION + 1;
        assert_eq!(data.checked(), NvramData::new());
    }

    fn baker() -> NvramData {
        let mut data = NvramData::new();
        data.main_chain_id = 0x7A06_A770;
        data.main = HighWatermark {
            highest_level: 1_000_000,
            had_endorsement: true,
        };
        data.test.highest_level = 12;
        data.baking_key = Some(BakingKey {
            curve: Curve::Secp256r1,
            path: Bip32Path::new(&[0x8000_002C, 0x8000_06C1, 0x8000_0000, 0x8000_0000]).unwrap(),
        });
        data
    }

    #[test]
    fn test_record_layout() {
        let record = NvramRecord::from(&baker());
        assert_eq!(record.0[0], NVRAM_VERSION);
        assert_eq!(&record.0[CHAIN_AT..MAIN_AT], &[0x7A, 0x06, 0xA7, 0x70]);
        assert_eq!(&record.0[MAIN_AT..TEST_AT], &[0x00, 0x0F, 0x42, 0x40, 1]);
        assert_eq!(&record.0[KEY_AT..PATH_AT], &[1, 2, 4]);
        assert_eq!(&record.0[PATH_AT..PATH_AT + 4], &[0x80, 0x00, 0x00, 0x2C]);
        assert!(record.0[PATH_AT + 16..].iter().all(|b| *b == 0));

        assert_eq!(NvramData::try_from(&record), Ok(baker()));
        assert_eq!(NvramData::try_from(&NvramRecord::EMPTY), Ok(NvramData::new()));
        assert_eq!(NvramRecord::from(&NvramData::new()), NvramRecord::EMPTY);
    }

    #[test]
    fn test_unreadable_records_are_refused() {
        let good = NvramRecord::from(&baker());
        let corrupt = |at: usize, value: u8| {
            let mut record = good;
            record.0[at] = value;
            NvramData::try_from(&record)
        };
        assert_eq!(corrupt(0, NVRAM_VERSION + 1), Err(AppSW::WrongValues));
        assert_eq!(corrupt(0, 0xFF), Err(AppSW::WrongValues));
        assert_eq!(corrupt(MAIN_AT + 4, 2), Err(AppSW::WrongValues));
        assert_eq!(corrupt(KEY_AT, 7), Err(AppSW::WrongValues));
        assert_eq!(corrupt(KEY_AT + 1, 3), Err(AppSW::WrongValues));
        assert_eq!(corrupt(KEY_AT + 2, 0), Err(AppSW::WrongValues));
        assert_eq!(corrupt(KEY_AT + 2, MAX_BIP32_LEN as u8 + 1), Err(AppSW::WrongValues));
        assert!(corrupt(KEY_AT + 2, MAX_BIP32_LEN as u8).is_ok());
        assert_eq!(NvramData::try_from(&NvramRecord([0xFF; RECORD_SIZE])), Err(AppSW::WrongValues));
    }
}
