//! Logger setup.

use std::str::FromStr;

use ge3d_core::config::LogConfig;
use log::LevelFilter;

use crate::error::{EngineError, Result};

/// Installs the global logger described by `config`.
///
/// Lines look like `[2024-01-01 12:00:00 INFO ge3d_client::game] message`. Unknown level
/// names fall back to `info`.
pub fn init(config: &LogConfig) -> Result<()> {
    let level = LevelFilter::from_str(&config.level).unwrap_or(LevelFilter::Info);

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout());

    if let Some(path) = &config.file {
        let file = fern::log_file(path).map_err(|e| EngineError::load(path, e))?;
        dispatch = dispatch.chain(file);
    }

    dispatch.apply()?;
    Ok(())
}
