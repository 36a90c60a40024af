pub mod buffer;
pub mod config;
pub mod errors;
pub mod event_log;
pub mod event_scheduler;
pub mod execution;
pub mod line;
pub mod observers;
pub mod simulation_engine;
pub mod station;
pub mod types;
