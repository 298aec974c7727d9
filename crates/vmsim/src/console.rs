//! Defines the console logger that writes simulator diagnostics to stderr.

use std::io::{self, Write};

use log::LevelFilter;
use spin::{Mutex, Once};

pub struct Console {
    stderr: Mutex<io::Stderr>,
}

static DEFAULT: Once<Console> = Once::new();

impl Console {
    pub fn init(level: LevelFilter) -> &'static Self {
        let console = Self::default();
        console.install(level);
        console
    }

    pub fn default() -> &'static Self {
        DEFAULT.call_once(|| Console {
            stderr: Mutex::new(io::stderr()),
        })
    }

    pub fn install(&'static self, level: LevelFilter) {
        // A logger may already be installed when running under a test harness.
        if log::set_logger(self).is_ok() {
            log::set_max_level(level);
        }
    }
}

impl log::Log for Console {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = self.stderr.lock();
        let _ = write_log_entry_to(&mut *stderr, record);
    }

    fn flush(&self) {
        let _ = self.stderr.lock().flush();
    }
}

fn write_log_entry_to(writer: &mut impl Write, record: &log::Record) -> io::Result<()> {
    #[cfg(any(debug_assertions, feature = "detailed-logging"))]
    return writeln!(
        writer,
        "[{} {}:{} {}] {}",
        record.level(),
        record.file().unwrap_or("unknown"),
        record.line().unwrap_or(0),
        record.target(),
        record.args()
    );
    #[cfg(not(any(debug_assertions, feature = "detailed-logging")))]
    return writeln!(writer, "[{:5}] {}", record.level(), record.args());
}

/// Maps the number of `-v` flags onto a log level.
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
