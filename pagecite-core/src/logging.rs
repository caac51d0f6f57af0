//! Structured logging via `tracing`.
//!
//! Library code only emits events. Hosts call [`init_logging`] once at
//! startup to install a subscriber.
//!
//! Questions and excerpts can contain confidential document text, so they
//! are logged by length only unless [`LogConfig::log_content`] is enabled.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::Level;
use tracing_subscriber::{
    fmt::{self as tfmt, MakeWriter},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

static LOG_CONTENT: AtomicBool = AtomicBool::new(false);

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
    /// Log question and excerpt text verbatim
    pub log_content: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::default(),
            with_ansi: true,
            with_target: false,
            log_content: false,
        }
    }
}

impl LogConfig {
    /// 0 = info, 1 = debug, 2+ = trace
    #[must_use]
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_log_content(mut self, enable: bool) -> Self {
        self.log_content = enable;
        self
    }
}

/// Install the global subscriber, writing to stderr.
///
/// Fails instead of panicking if a subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), TryInitError> {
    init_logging_with_writer(config, std::io::stderr)
}

/// Install the global subscriber with a custom writer
pub fn init_logging_with_writer<W>(config: &LogConfig, writer: W) -> Result<(), TryInitError>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str().to_ascii_lowercase()));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Json => registry
            .with(tfmt::layer().json().with_writer(writer).with_target(config.with_target))
            .try_init(),
        LogFormat::Compact => registry
            .with(
                tfmt::layer()
                    .compact()
                    .with_writer(writer)
                    .with_ansi(config.with_ansi)
                    .with_target(config.with_target),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tfmt::layer()
                    .with_writer(writer)
                    .with_ansi(config.with_ansi)
                    .with_target(config.with_target),
            )
            .try_init(),
    };

    // Redaction follows the subscriber that is actually installed
    installed?;
    LOG_CONTENT.store(config.log_content, Ordering::Release);
    Ok(())
}

/// Document-derived text as it should appear in logs
pub struct Loggable<'a>(&'a str);

/// Wrap `text` so it is redacted unless content logging is on
pub fn loggable(text: &str) -> Loggable<'_> {
    Loggable(text)
}

impl fmt::Display for Loggable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if LOG_CONTENT.load(Ordering::Acquire) {
            write!(f, "{:?}", self.0)
        } else {
            write!(f, "[{} chars]", self.0.chars().count())
        }
    }
}
