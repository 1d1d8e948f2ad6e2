//! Structured logging setup, shared by both binaries.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, Naming};

/// Logs to stderr at `info` (or `RUST_LOG`, if set) and, when `directory` is
/// given, additionally rotates to files there.
pub fn init_logging(directory: Option<&str>) -> Result<(), flexi_logger::FlexiLoggerError> {
    let mut logger = Logger::try_with_env_or_str("info")?.format(flexi_logger::colored_default_format);

    if let Some(directory) = directory {
        logger = logger
            .log_to_file(FileSpec::default().directory(directory))
            .duplicate_to_stderr(flexi_logger::Duplicate::Info)
            .rotate(Criterion::Size(10 * 1024 * 1024), Naming::Numbers, Cleanup::KeepLogFiles(5));
    }

    logger.start()?;
    Ok(())
}
