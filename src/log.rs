// src/log.rs
//
// Process logger behind the `log` facade.
// Lines look like `[00:01:12.345][WARN] message` (elapsed since start),
// go to stderr, and optionally to an append-only file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

static START: OnceLock<Instant> = OnceLock::new();

fn start() -> Instant {
    *START.get_or_init(Instant::now)
}

fn fmt_elapsed(ms: u128) -> String {
    let total_ms = ms as u64;
    let h = total_ms / 3_600_000;
    let m = (total_ms % 3_600_000) / 60_000;
    let s = (total_ms % 60_000) / 1_000;
    let ms = total_ms % 1_000;
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

struct StageLogger {
    level: LevelFilter,
    file: Option<Mutex<File>>,
}

impl Log for StageLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let elapsed = fmt_elapsed(start().elapsed().as_millis());
        let line = format!("[{elapsed}][{}] {}\n", record.level(), record.args());

        let _ = std::io::stderr().write_all(line.as_bytes());
        if let Some(file) = &self.file {
            if let Ok(mut f) = file.lock() {
                let _ = f.write_all(line.as_bytes());
            }
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut f) = file.lock() {
                let _ = f.flush();
            }
        }
    }
}

/// Install the process logger. Call once, from a binary's `main`.
pub fn init(level: LevelFilter, log_file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    start();

    let file = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    crate::file::ensure_directory(parent)?;
                }
            }
            let f = OpenOptions::new().create(true).append(true).open(path)?;
            Some(Mutex::new(f))
        }
        None => None,
    };

    log::set_boxed_logger(Box::new(StageLogger { level, file }))?;
    log::set_max_level(level);
    Ok(())
}
