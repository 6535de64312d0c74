//! Subscriber setup for the CLI.

use std::fs::OpenOptions;
use std::io::{self, IsTerminal};

use gdmarshal::{LogFormat, LoggingConfig};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber described by `config`. `RUST_LOG` is not
/// consulted.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_new(&config.level).map_err(|e| LoggingError::InvalidFilter(e.to_string()))?;

    let (writer, ansi) = match config.output.as_str() {
        "stdout" => (BoxMakeWriter::new(io::stdout), config.color && io::stdout().is_terminal()),
        "stderr" => (BoxMakeWriter::new(io::stderr), config.color && io::stderr().is_terminal()),
        path => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| LoggingError::FileOpen(path.to_string(), e))?;
            (BoxMakeWriter::new(file), false)
        }
    };

    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(config.target)
        .with_span_events(FmtSpan::NONE);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match (config.format, config.timestamps) {
        (LogFormat::Text, true) => registry.with(layer.with_ansi(ansi)).try_init(),
        (LogFormat::Text, false) => registry.with(layer.with_ansi(ansi).without_time()).try_init(),
        (LogFormat::Json, true) => registry.with(layer.json()).try_init(),
        (LogFormat::Json, false) => registry.with(layer.json().without_time()).try_init(),
    };
    installed.map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}

/// Logging initialization error.
#[derive(Debug)]
pub enum LoggingError {
    InvalidFilter(String),
    FileOpen(String, io::Error),
    AlreadyInitialized(String),
}

impl std::fmt::Display for LoggingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoggingError::InvalidFilter(e) => write!(f, "Invalid log filter: {}", e),
            LoggingError::FileOpen(path, e) => write!(f, "Failed to open log file '{}': {}", path, e),
            LoggingError::AlreadyInitialized(e) => write!(f, "Logging already initialized: {}", e),
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoggingError::FileOpen(_, e) => Some(e),
            _ => None,
        }
    }
}
