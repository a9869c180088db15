//! Category/level logging for the emulator core.
//!
//! The core's hot path must never block or allocate for disabled logging,
//! so messages are built lazily through closures and the configuration is
//! held in atomics. File output, when enabled, goes through a channel to a
//! background writer thread so emulation never waits on disk.
//!
//! # Usage
//!
//! ```rust
//! use emu_2a03::logging::{log, LogCategory, LogLevel};
//!
//! log(LogCategory::Cpu, LogLevel::Debug, || {
//!     format!("reserved opcode at PC={:04X}", 0x1234)
//! });
//! ```

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::{channel, Sender};
use std::sync::Mutex;
use std::thread;

/// Log level, ordered from quietest to noisiest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    /// Parse a log level from a string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" | "0" => Some(LogLevel::Off),
            "error" | "err" | "1" => Some(LogLevel::Error),
            "warn" | "warning" | "2" => Some(LogLevel::Warn),
            "info" | "3" => Some(LogLevel::Info),
            "debug" | "4" => Some(LogLevel::Debug),
            "trace" | "5" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::Off,
        }
    }
}

/// Source component of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// CPU execution: dispatch traces, reserved opcodes.
    Cpu,
    /// Bus routing: unmapped accesses.
    Bus,
    /// Clock scheduling.
    Clock,
}

const CATEGORY_COUNT: usize = 3;

impl LogCategory {
    fn index(self) -> usize {
        match self {
            LogCategory::Cpu => 0,
            LogCategory::Bus => 1,
            LogCategory::Clock => 2,
        }
    }
}

/// Global logging configuration.
///
/// Per-category levels override the global level when set; a category
/// left at `Off` falls back to the global level.
pub struct LogConfig {
    global_level: AtomicU8,
    category_levels: [AtomicU8; CATEGORY_COUNT],
    log_sender: Mutex<Option<Sender<String>>>,
    file_logging_enabled: AtomicBool,
}

impl LogConfig {
    fn new() -> Self {
        Self {
            global_level: AtomicU8::new(LogLevel::Off as u8),
            category_levels: [
                AtomicU8::new(LogLevel::Off as u8),
                AtomicU8::new(LogLevel::Off as u8),
                AtomicU8::new(LogLevel::Off as u8),
            ],
            log_sender: Mutex::new(None),
            file_logging_enabled: AtomicBool::new(false),
        }
    }

    /// The global singleton instance.
    pub fn global() -> &'static Self {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<LogConfig> = OnceLock::new();
        INSTANCE.get_or_init(LogConfig::new)
    }

    pub fn set_global_level(&self, level: LogLevel) {
        self.global_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn get_global_level(&self) -> LogLevel {
        LogLevel::from_u8(self.global_level.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, category: LogCategory, level: LogLevel) {
        self.category_levels[category.index()].store(level as u8, Ordering::Relaxed);
    }

    pub fn get_level(&self, category: LogCategory) -> LogLevel {
        LogLevel::from_u8(self.category_levels[category.index()].load(Ordering::Relaxed))
    }

    /// Whether a message at `level` for `category` would be emitted.
    pub fn should_log(&self, category: LogCategory, level: LogLevel) -> bool {
        let category_level = self.get_level(category);
        if category_level != LogLevel::Off {
            level <= category_level
        } else {
            level <= self.get_global_level()
        }
    }

    /// Reset all levels to Off.
    pub fn reset(&self) {
        self.set_global_level(LogLevel::Off);
        for atomic in &self.category_levels {
            atomic.store(LogLevel::Off as u8, Ordering::Relaxed);
        }
    }

    /// Route log output to a file via a background writer thread.
    pub fn set_log_file(&self, path: PathBuf) -> std::io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let (sender, receiver) = channel::<String>();

        thread::Builder::new()
            .name("log-writer".to_string())
            .spawn(move || {
                let mut file = file;
                while let Ok(message) = receiver.recv() {
                    // Logging must never take the emulator down with it.
                    let _ = writeln!(file, "{message}");
                    let _ = file.flush();
                }
                let _ = file.flush();
            })?;

        let mut log_sender = self.log_sender.lock().unwrap();
        *log_sender = Some(sender);
        self.file_logging_enabled.store(true, Ordering::Relaxed);
        Ok(())
    }

    /// Stop logging to file; the writer thread exits when its sender drops.
    pub fn clear_log_file(&self) {
        let mut log_sender = self.log_sender.lock().unwrap();
        *log_sender = None;
        self.file_logging_enabled.store(false, Ordering::Relaxed);
    }

    fn write_message(&self, message: &str) {
        if self.file_logging_enabled.load(Ordering::Relaxed) {
            let log_sender = self.log_sender.lock().unwrap();
            if let Some(ref sender) = *log_sender {
                if sender.send(message.to_string()).is_err() {
                    eprintln!("{message}");
                }
                return;
            }
        }
        eprintln!("{message}");
    }
}

/// Log a lazily-built message for `category` at `level`.
///
/// The closure is only invoked when the message would actually be
/// emitted, so callers can format freely in hot paths.
pub fn log<F>(category: LogCategory, level: LogLevel, message_fn: F)
where
    F: FnOnce() -> String,
{
    let config = LogConfig::global();
    if config.should_log(category, level) {
        let message = message_fn();
        config.write_message(&format!("[{category:?}] {message}"));
    }
}
