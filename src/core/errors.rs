use super::types::StationId;
use thiserror::Error;

/// Scenario rejected before any simulation state is built
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("scenario has no stations")]
    NoStations,
    #[error("process time of station S{station} must be finite and positive, got {value}")]
    InvalidProcessTime { station: usize, value: f64 },
    #[error("simulation horizon must be positive")]
    ZeroHorizon,
    #[error("supply target level must be positive")]
    ZeroSupplyTarget,
    #[error("initial buffer level {initial_level} exceeds buffer capacity {capacity}")]
    InitialLevelAboveCapacity { initial_level: u64, capacity: u64 },
    #[error("invalid service time distribution: {0}")]
    Distribution(String),
}

/// Event log that cannot be analysed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionError {
    #[error("event log declares a line without stations")]
    NoStations,
    #[error("event {index} references station {station} on a line of {station_count} stations")]
    UnknownStation {
        index: usize,
        station: StationId,
        station_count: usize,
    },
    #[error("event {index} has malformed event type '{value}'")]
    MalformedEventType { index: usize, value: String },
    #[error("event {index} has job index 0, job indices are 1-based")]
    ZeroJobIndex { index: usize },
    #[error("event {index} has invalid time {time}")]
    InvalidTime { index: usize, time: f64 },
}

/// Top-level error of a run
#[derive(Debug, Error)]
pub enum FlowlineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Detection(#[from] DetectionError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
