//! Diagnostic output for xamlint. Lines go to stderr so that reports on
//! stdout stay machine-readable; nothing is retained after printing.

use chrono::Local;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;

static THRESHOLD: Lazy<Mutex<LogLevel>> = Lazy::new(|| Mutex::new(LogLevel::Warning));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    fn label(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }
}

/// Set the lowest level that is printed. `--debug` and `--verbose` lower it.
pub fn set_log_level(level: LogLevel) {
    if let Ok(mut threshold) = THRESHOLD.lock() {
        *threshold = level;
    }
}

pub fn enabled(level: LogLevel) -> bool {
    match THRESHOLD.lock() {
        Ok(threshold) => level >= *threshold,
        Err(_) => level >= LogLevel::Warning,
    }
}

fn write_line<W: Write>(out: &mut W, level: LogLevel, message: &str) -> io::Result<()> {
    writeln!(
        out,
        "[{}] {}: {}",
        Local::now().format("%H:%M:%S"),
        level.label(),
        message
    )
}

pub fn log(level: LogLevel, message: &str) {
    if !enabled(level) {
        return;
    }
    let _ = write_line(&mut io::stderr().lock(), level, message);
}

pub fn debug(message: &str) {
    log(LogLevel::Debug, message);
}

pub fn info(message: &str) {
    log(LogLevel::Info, message);
}

pub fn error(message: &str) {
    log(LogLevel::Error, message);
}
