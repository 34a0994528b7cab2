use ledger_device_sdk::nvm::*;
use ledger_device_sdk::NVMData;

use ledger_tezos::baking::{NvramData, NvramRecord, Storage};
use ledger_tezos::AppSW;

#[link_section = ".nvm_data"]
static mut N_BAKING: NVMData<AtomicStorage<NvramRecord>> =
    NVMData::new(AtomicStorage::new(&NvramRecord::EMPTY));

/// Baking state in flash, replaced through the SDK's double-buffered storage.
pub struct NvmStorage;

impl Storage for NvmStorage {
    fn load(&self) -> NvramData {
        let data = &raw const N_BAKING;
        let record = unsafe { *(*data).get_ref().get_ref() };
        NvramData::try_from(&record).unwrap_or_else(|_| {
            log::warn!("discarding unreadable baking state");
            NvramData::new()
        })
    }

    fn store(&mut self, value: &NvramData) -> Result<(), AppSW> {
        let data = &raw mut N_BAKING;
        unsafe { (*data).get_mut().update(&NvramRecord::from(value)) };
        Ok(())
    }
}
