use super::simulation_engine::{SimulationObserver, TickSnapshot};
use super::station::StationState;
use log::{debug, log_enabled, Level};

/// Logs line state at every tick boundary
#[derive(Debug, Default)]
pub struct LoggingObserver {
    /// Only log every n-th tick; 0 or 1 logs all
    every: u64,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self { every: 1 }
    }

    pub fn every(every: u64) -> Self {
        Self { every }
    }

    fn should_log(&self, tick: u64) -> bool {
        self.every <= 1 || tick % self.every == 0
    }
}

impl SimulationObserver for LoggingObserver {
    fn on_tick_advance(&mut self, _old_tick: u64, _new_tick: u64) {}

    fn on_tick_complete(&mut self, snapshot: &TickSnapshot<'_>) {
        if !self.should_log(snapshot.tick) || !log_enabled!(Level::Debug) {
            return;
        }
        let states: Vec<String> = snapshot
            .station_states
            .iter()
            .map(StationState::to_string)
            .collect();
        debug!(
            "tick {}: buffers {:?}, stations [{}]",
            snapshot.tick,
            snapshot.buffer_levels,
            states.join(", ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampling_interval() {
        assert!(LoggingObserver::new().should_log(3));
        assert!(LoggingObserver::every(0).should_log(7));
        let sparse = LoggingObserver::every(10);
        assert!(sparse.should_log(20));
        assert!(!sparse.should_log(21));
    }
}
