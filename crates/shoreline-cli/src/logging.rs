//! Logger setup for the binary.

use anyhow::{anyhow, Result};
use log::LevelFilter;
use shoreline_etl::config::LoggingConfig;
use twyg::{LogLevel, OptsBuilder};

/// Install the global logger.
pub fn setup(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let level = match effective_level(config, verbose) {
        LevelFilter::Trace => LogLevel::Trace,
        LevelFilter::Debug => LogLevel::Debug,
        LevelFilter::Info => LogLevel::Info,
        LevelFilter::Warn => LogLevel::Warn,
        LevelFilter::Error | LevelFilter::Off => LogLevel::Error,
    };

    let opts = OptsBuilder::new()
        .coloured(config.coloured)
        .level(level)
        .build()
        .map_err(|e| anyhow!("Invalid logging options: {:?}", e))?;
    twyg::setup(opts).map_err(|e| anyhow!("Failed to set up logging: {:?}", e))?;

    Ok(())
}

/// The configured level, raised to debug by `--verbose`.
///
/// Unrecognised level names fall back to info.
fn effective_level(config: &LoggingConfig, verbose: bool) -> LevelFilter {
    let configured = config.level.parse().unwrap_or(LevelFilter::Info);
    if verbose {
        configured.max(LevelFilter::Debug)
    } else {
        configured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logging(level: &str) -> LoggingConfig {
        LoggingConfig {
            level: level.to_string(),
            coloured: false,
        }
    }

    #[test]
    fn test_effective_level() {
        assert_eq!(effective_level(&logging("warn"), false), LevelFilter::Warn);
        assert_eq!(effective_level(&logging("WARN"), false), LevelFilter::Warn);
        assert_eq!(effective_level(&logging("warn"), true), LevelFilter::Debug);
        assert_eq!(effective_level(&logging("trace"), true), LevelFilter::Trace);
        assert_eq!(effective_level(&logging("loud"), false), LevelFilter::Info);
    }
}
