//! File-logging bootstrap.
//!
//! Initializes rolling file logs exactly once per process; repeated
//! calls are no-ops. The engine itself only uses the `log` facade, so
//! embedders may install any logger they prefer instead.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use once_cell::sync::OnceCell;
use std::path::Path;

const LOG_FILE_BASENAME: &str = "daylog";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

static LOGGER: OnceCell<LoggerHandle> = OnceCell::new();

/// Initialize rolling file logs under `log_dir`.
///
/// Idempotent for the lifetime of the process; the first call wins.
///
/// # Errors
/// Returns a human-readable error when the level is unsupported, the
/// directory cannot be created, or the logger backend fails to start.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), String> {
    LOGGER.get_or_try_init(|| {
        std::fs::create_dir_all(log_dir).map_err(|err| {
            format!(
                "failed to create log directory `{}`: {err}",
                log_dir.display()
            )
        })?;

        Logger::try_with_str(level)
            .map_err(|err| format!("invalid log level `{level}`: {err}"))?
            .log_to_file(
                FileSpec::default()
                    .directory(log_dir)
                    .basename(LOG_FILE_BASENAME),
            )
            .rotate(
                Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(MAX_LOG_FILES),
            )
            .write_mode(WriteMode::BufferAndFlush)
            .append()
            .start()
            .map_err(|err| format!("failed to start logger: {err}"))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::init_logging;

    #[test]
    fn init_is_idempotent_and_rejects_bad_levels_first() {
        let dir = tempfile::tempdir().unwrap();

        // A bad level before any successful init is reported.
        assert!(init_logging("chatty", dir.path()).is_err());

        init_logging("warn", dir.path()).expect("first init should succeed");
        init_logging("warn", dir.path()).expect("second init is a no-op");
    }
}
