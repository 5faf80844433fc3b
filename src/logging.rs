//! Initialization of the `tracing` subscriber
//!
//! The library only emits events through the `tracing` macros. Binaries
//! call [`init_logging`] once at startup. Log lines go to `stderr`, so the
//! result preview on `stdout` can be piped.
//!
//! `RUST_LOG` takes precedence over the level that is passed in:
//!
//! ```text
//! RUST_LOG=goenrich::parser=trace goenrich run --engine topgo
//! ```

use core::fmt::Display;
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{GoError, GoResult};

/// Verbosity of the log output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Very detailed output, e.g. every HTTP request
    Trace,
    /// Progress of the individual stages
    Debug,
    /// One line per stage
    #[default]
    Info,
    /// Only problems, such as unmapped identifiers
    Warn,
    /// Only failures
    Error,
}

impl LogLevel {
    /// Returns [`LogLevel::Debug`] if `verbose` is set, the default otherwise
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            LogLevel::Debug
        } else {
            LogLevel::default()
        }
    }

    fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = GoError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(GoError::Config(format!("invalid log level `{s}`"))),
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_tracing_level())
    }
}

fn build_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.to_tracing_level().into())
        .from_env_lossy()
}

/// Installs the global subscriber
///
/// # Errors
///
/// [`GoError::Config`] if a global subscriber is already installed
pub fn init_logging(level: LogLevel) -> GoResult<()> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    tracing_subscriber::registry()
        .with(build_filter(level))
        .with(fmt_layer)
        .try_init()
        .map_err(|err| GoError::Config(format!("cannot initialize logging: {err}")))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_level() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn verbose_flag() {
        assert_eq!(LogLevel::from_verbose(true), LogLevel::Debug);
        assert_eq!(LogLevel::from_verbose(false), LogLevel::Info);
        assert_eq!(LogLevel::Warn.to_string(), "WARN");
    }
}
