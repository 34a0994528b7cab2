use alloc::string::String;
use core::fmt::Write;

use log::{LevelFilter, Log, Metadata, Record};

/// Prints records on the Speculos console.
struct DebugPrintLogger;

impl Log for DebugPrintLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let mut buf = String::new();
        if writeln!(&mut buf, "[{}] {}", record.level(), record.args()).is_ok() {
            ledger_device_sdk::testing::debug_print(&buf);
        }
    }

    fn flush(&self) {}
}

static LOGGER: DebugPrintLogger = DebugPrintLogger;

pub fn init() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}
