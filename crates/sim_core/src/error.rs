use thiserror::Error;

/// Failures of the record store and telemetry exporter.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("record/playback storage is not configured")]
    Disabled,
    #[error("a recording is already open")]
    AlreadyRecording,
    #[error("no recording is open")]
    NotRecording,
    #[error("telemetry export is already open")]
    AlreadyExporting,
    #[error("no telemetry export is open")]
    NotExporting,
    #[error("storage: {0:#}")]
    Storage(#[from] anyhow::Error),
    #[error("decode session: {0}")]
    Decode(#[from] serde_json::Error),
}
