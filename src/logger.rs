use core::fmt::Write;
use log::{LevelFilter, Log, Metadata, Record};

use crate::serial::SERIAL;

// The global logger instance used for the `log` crate.
static LOGGER: KernelLogger = KernelLogger;

// Sends every record to the serial port. It must never take the terminal lock: the panic handler
// logs while that lock may be held.
pub struct KernelLogger;

impl Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut serial = SERIAL.lock();
        // There is nowhere left to report a failed serial write.
        let _ = writeln!(serial, "{:5}: {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

// The maximum level is picked at build time with the no_logs, log_info and log_trace features.
pub const fn max_level() -> LevelFilter {
    if cfg!(feature = "no_logs") {
        LevelFilter::Off
    } else if cfg!(feature = "log_trace") {
        LevelFilter::Trace
    } else if cfg!(feature = "log_info") {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    }
}

// Installs the serial logger. A second call leaves the first logger in place.
pub fn init_logger() {
    match log::set_logger(&LOGGER) {
        Ok(()) => {
            log::set_max_level(max_level());
            log::info!("serial logger ready (max level {})", max_level());
        }
        Err(_) => log::warn!("logger already set"),
    }
}

#[test_case]
fn test_logger_levels() {
    init_logger();
    // A second installation must be harmless.
    init_logger();

    assert_eq!(log::max_level(), max_level());
    log::info!("Testing the serial logger");
    log::trace!("Testing a trace record");
}
