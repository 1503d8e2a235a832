//! Logging bootstrap. Off unless `NOTE_SORT_LOG` asks for it; with
//! `NOTE_SORT_LOG_DIR` set the output goes to rotating files. The
//! interactive screen owns the terminal, so browsing never logs to stderr.

use crate::config::Config;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use std::path::Path;
use std::sync::OnceLock;

const LOG_FILE_BASENAME: &str = "note_sort";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

#[derive(Debug, PartialEq, Eq)]
pub enum LogTarget<'a> {
    Off,
    Stderr,
    Files(&'a Path),
}

/// Where log records go. `interactive` is true while the terminal is in
/// raw mode on the alternate screen.
pub fn log_target(config: &Config, interactive: bool) -> LogTarget<'_> {
    if config.log_spec.trim() == "off" {
        return LogTarget::Off;
    }
    match &config.log_dir {
        Some(dir) => LogTarget::Files(dir),
        None if interactive => LogTarget::Off,
        None => LogTarget::Stderr,
    }
}

/// Start the logger once per process. Later calls are no-ops.
pub fn init_logging(config: &Config, interactive: bool) -> Result<(), String> {
    if LOGGER.get().is_some() {
        return Ok(());
    }

    let target = log_target(config, interactive);
    if target == LogTarget::Off {
        return Ok(());
    }

    let logger = Logger::try_with_str(&config.log_spec)
        .map_err(|err| format!("invalid log spec `{}`: {err}", config.log_spec))?;

    let logger = match target {
        LogTarget::Files(dir) => {
            std::fs::create_dir_all(dir).map_err(|err| {
                format!("failed to create log directory `{}`: {err}", dir.display())
            })?;
            logger
                .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
                .rotate(
                    Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(MAX_LOG_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
        }
        LogTarget::Stderr | LogTarget::Off => logger.log_to_stderr(),
    };

    let handle = logger.start().map_err(|err| format!("failed to start logger: {err}"))?;
    let _ = LOGGER.set(handle);
    info!(
        "note_sort {} started for {}",
        env!("CARGO_PKG_VERSION"),
        config.dir.display()
    );
    Ok(())
}
