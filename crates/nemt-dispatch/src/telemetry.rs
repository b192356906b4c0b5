use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::{LevelFilter, ParseError};
use tracing_subscriber::EnvFilter;

/// Targets that follow `APP_LOG_LEVEL`. Everything else (hyper, tower) stays at `warn` or quieter.
const SERVICE_TARGETS: [&str; 2] = ["nemt_dispatch", "nemt_dispatch_api"];

#[derive(Debug)]
pub enum TelemetryError {
    InvalidLevel { value: String },
    EnvFilter { directives: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidLevel { value } => write!(
                f,
                "APP_LOG_LEVEL '{value}' is not one of off, error, warn, info, debug, trace"
            ),
            TelemetryError::EnvFilter { directives, .. } => {
                write!(f, "unable to build log filter from '{directives}'")
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::InvalidLevel { .. } => None,
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Install the global fmt subscriber. `RUST_LOG` wins over the configured level.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => service_filter(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

/// Filter applying `level` to the service crates and capping dependencies at `warn`.
pub fn service_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    let directives = service_directives(level)?;
    EnvFilter::try_new(&directives).map_err(|source| TelemetryError::EnvFilter {
        directives,
        source,
    })
}

fn service_directives(level: &str) -> Result<String, TelemetryError> {
    let level = level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| TelemetryError::InvalidLevel {
            value: level.to_string(),
        })?;

    let mut directives = vec![LevelFilter::WARN.min(level).to_string()];
    directives.extend(
        SERVICE_TARGETS
            .iter()
            .map(|target| format!("{target}={level}")),
    );
    Ok(directives.join(",").to_ascii_lowercase())
}
