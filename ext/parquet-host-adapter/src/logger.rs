// Logger bridge for the parquet-native shim
// Forwards shim diagnostics to a host-registered callback

use std::os::raw::c_void;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock};

use crate::handle::{HostHandle, ReleaseHandleFn};

/// Severity levels shared with the host (ABI values 0..=3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => return Err(format!("Invalid log level: {}", s)),
        })
    }
}

/// Receives one log record; never fails, never reenters the shim.
pub type LogFn =
    unsafe extern "C" fn(handle: *mut c_void, level: i32, message: *const u8, message_len: u64);

/// A wrapper around a host logger callback
pub struct HostLogger {
    sink: Option<(HostHandle, LogFn)>,
    level: LogLevel,
}

impl HostLogger {
    fn from_env() -> Self {
        let level = std::env::var("PARQUET_NATIVE_LOG_LEVEL")
            .unwrap_or_else(|_| "warn".to_string())
            .parse::<LogLevel>()
            .unwrap_or(LogLevel::Warn);
        Self { sink: None, level }
    }

    /// Log a message at the given level
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.level {
            return;
        }
        match &self.sink {
            Some((handle, log)) => unsafe {
                log(
                    handle.raw(),
                    level as i32,
                    message.as_ptr(),
                    message.len() as u64,
                )
            },
            None => eprintln!("{}", message),
        }
    }
}

fn cell() -> &'static RwLock<HostLogger> {
    static LOGGER: OnceLock<RwLock<HostLogger>> = OnceLock::new();
    LOGGER.get_or_init(|| RwLock::new(HostLogger::from_env()))
}

/// Install a host logger sink; `level` filters records below it.
///
/// # Safety
///
/// `handle` and `log` follow the bridge contract: valid until released,
/// callable from any thread.
pub unsafe fn install(handle: *mut c_void, release: ReleaseHandleFn, log: LogFn, level: i32) {
    let level = match level {
        0 => LogLevel::Debug,
        1 => LogLevel::Info,
        3 => LogLevel::Error,
        _ => LogLevel::Warn,
    };
    let mut guard = cell().write().unwrap_or_else(|e| e.into_inner());
    *guard = HostLogger {
        sink: Some((HostHandle::new(handle, release), log)),
        level,
    };
}

/// Drop the host sink and fall back to stderr with the env level.
pub fn clear() {
    let mut guard = cell().write().unwrap_or_else(|e| e.into_inner());
    *guard = HostLogger::from_env();
}

/// Log a warning; the message closure only runs when the level passes.
pub fn warn<F, S>(message_fn: F)
where
    F: FnOnce() -> S,
    S: AsRef<str>,
{
    let guard = cell().read().unwrap_or_else(|e| e.into_inner());
    if guard.level <= LogLevel::Warn {
        guard.log(LogLevel::Warn, message_fn().as_ref());
    }
}

/// Log a debug message
pub fn debug<F, S>(message_fn: F)
where
    F: FnOnce() -> S,
    S: AsRef<str>,
{
    let guard = cell().read().unwrap_or_else(|e| e.into_inner());
    if guard.level <= LogLevel::Debug {
        guard.log(LogLevel::Debug, message_fn().as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("error".parse::<LogLevel>().unwrap(), LogLevel::Error);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warn < LogLevel::Error);
    }
}
