//! Logger setup for programs and bindings built on the library.
//!
//! The library itself only emits records through the `log` facade; nothing is
//! printed until a caller installs a logger, either its own or the `fern`
//! dispatcher configured here.
use anyhow::{bail, Context, Result};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{LevelFilter, Record};
use std::env;
use std::fmt::{Arguments, Display};
use std::io::IsTerminal;
use std::sync::OnceLock;

/// Set once the dispatcher is installed
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Environment variable overriding the level passed to [`init`]
pub const LOG_LEVEL_ENV: &str = "RSQCMAPS_LOG_LEVEL";

const DEFAULT_LOG_LEVEL: &str = "info";

pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// Install a colored `fern` logger writing to stderr
///
/// The level comes from `RSQCMAPS_LOG_LEVEL` when set, then from `log_level`,
/// then defaults to `info`. Accepted values are `off`, `error`, `warn`,
/// `info`, `debug` and `trace`. Calling it again once installed is a no-op.
pub fn init(log_level: Option<&str>) -> Result<()> {
    if is_logger_initialised() {
        return Ok(());
    }

    let log_level = env::var(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| log_level.unwrap_or(DEFAULT_LOG_LEVEL).to_string());
    let log_level = parse_level(&log_level)?;

    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);
    let use_colour = std::io::stderr().is_terminal();

    Dispatch::new()
        .format(move |out, message, record| {
            if use_colour {
                write_log(out, colours.color(record.level()), record, message);
            } else {
                write_log(out, record.level(), record, message);
            }
        })
        .level(log_level)
        .chain(std::io::stderr())
        .apply()
        .context("Another logger is already installed")?;

    let _ = LOGGER_INIT.set(());
    Ok(())
}

fn parse_level(level: &str) -> Result<LevelFilter> {
    Ok(match level.trim().to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        unknown => bail!("Unknown log level: {}", unknown),
    })
}

fn write_log<T: Display>(out: FormatCallback, level: T, record: &Record, message: &Arguments) {
    let timestamp = Local::now().format("%H:%M:%S");
    out.finish(format_args!(
        "[{} {} {}] {}",
        timestamp,
        level,
        record.target(),
        message
    ));
}
