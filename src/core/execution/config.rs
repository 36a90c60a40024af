/// Configuration for batch execution
///
/// A single line is always simulated on one thread so its event log is
/// reproducible. These settings only decide how independent replications of
/// a scenario are spread over threads.

/// Enumeration of supported concurrency modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyMode {
    /// Replications run one after another on the calling thread
    #[default]
    Sequential,
    /// Replications run on a Rayon thread pool
    Rayon,
}

/// Configuration for batch execution
#[derive(Debug, Clone, Default)]
pub struct ExecutionConfig {
    /// The concurrency mode to use for execution
    pub concurrency_mode: ConcurrencyMode,
    /// The size of the thread pool for parallel execution
    /// Only relevant when concurrency_mode is Rayon
    pub thread_pool_size: Option<usize>,
}

impl ExecutionConfig {
    /// Create a sequential configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency mode
    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }

    /// Set the thread pool size for parallel execution
    ///
    /// # Note
    /// This setting only affects execution when concurrency_mode is Rayon
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }
}
