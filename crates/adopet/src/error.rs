use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::adoption::AdoptionError;

/// Process-level failures surfaced by the binaries.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("workflow error: {0}")]
    Workflow(#[from] AdoptionError),
}
