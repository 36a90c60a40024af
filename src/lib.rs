pub mod analysis;
pub mod core;

// Re-export commonly used types
pub use crate::analysis::{detect_bottlenecks, BottleneckDetector, BottleneckTable, EventStatus};
pub use crate::core::config::Scenario;
pub use crate::core::errors::{ConfigError, DetectionError, FlowlineError};
pub use crate::core::event_log::{EventLog, EventRecord, EventType};
pub use crate::core::line::Line;
pub use crate::core::simulation_engine::{
    simulate, BufferLevelSeries, SimulationEngine, SimulationObserver, SimulationOutput,
};
pub use crate::core::station::StationState;
pub use crate::core::types::{BufferId, SimTime, StationId};
pub use crate::core::execution::{replicate, ConcurrencyMode, ExecutionConfig};
