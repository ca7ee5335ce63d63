/// File persistence for log output
///
/// Lines are appended to `logs/yieldwatch.log` through a buffered writer held
/// behind a global mutex. Write failures are reported once to stderr and then
/// ignored so logging can never take the service down.
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

const LOG_DIR: &str = "logs";
const LOG_FILE_NAME: &str = "yieldwatch.log";

static LOG_WRITER: Lazy<Mutex<Option<BufWriter<fs::File>>>> = Lazy::new(|| Mutex::new(None));
static WRITE_ERROR_REPORTED: AtomicBool = AtomicBool::new(false);

pub fn log_file_path() -> PathBuf {
    PathBuf::from(LOG_DIR).join(LOG_FILE_NAME)
}

/// Open (or create) the log file for appending
pub fn init_file_logging() {
    if let Err(e) = fs::create_dir_all(LOG_DIR) {
        eprintln!("Failed to create log directory '{}': {}", LOG_DIR, e);
        return;
    }

    match OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path())
    {
        Ok(file) => {
            *LOG_WRITER.lock() = Some(BufWriter::new(file));
        }
        Err(e) => {
            eprintln!(
                "Failed to open log file '{}': {}",
                log_file_path().display(),
                e
            );
        }
    }
}

/// Append one line to the log file (no-op if file logging is not initialized)
pub fn write_to_file(line: &str) {
    let mut guard = LOG_WRITER.lock();
    if let Some(writer) = guard.as_mut() {
        if let Err(e) = writeln!(writer, "{}", line) {
            if !WRITE_ERROR_REPORTED.swap(true, Ordering::Relaxed) {
                eprintln!("Logger file write error: {}", e);
            }
        }
    }
}

pub fn flush_file_logging() {
    if let Some(writer) = LOG_WRITER.lock().as_mut() {
        let _ = writer.flush();
    }
}
