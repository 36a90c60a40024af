pub mod config;
pub mod replication;

// Re-export commonly used types
pub use config::{ConcurrencyMode, ExecutionConfig};
pub use replication::{replicate, Replication};
