use super::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Immutable description of a line to simulate
///
/// Construct with [`Scenario::new`] and the `with_*` setters, or load from
/// JSON. Missing JSON fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Mean process time per station; its length is the station count
    pub process_times: Vec<f64>,
    /// Number of ticks to simulate
    pub horizon: u64,
    /// Capacity shared by all interior buffers
    pub buffer_capacity: u64,
    /// Starting level of all interior buffers
    pub initial_level: u64,
    /// Level the supply buffer is topped up to every tick
    pub supply_target: u64,
    /// Seed of the service time random stream
    pub seed: u64,
}

impl Scenario {
    pub const DEFAULT_HORIZON: u64 = 1000;
    pub const DEFAULT_CAPACITY: u64 = 10;
    pub const DEFAULT_SUPPLY_TARGET: u64 = 100;

    /// Create a scenario with default settings for the given process times
    pub fn new(process_times: Vec<f64>) -> Self {
        Self {
            process_times,
            horizon: Self::DEFAULT_HORIZON,
            buffer_capacity: Self::DEFAULT_CAPACITY,
            initial_level: 0,
            supply_target: Self::DEFAULT_SUPPLY_TARGET,
            seed: 0,
        }
    }

    pub fn with_horizon(mut self, horizon: u64) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_buffer_capacity(mut self, capacity: u64) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    pub fn with_initial_level(mut self, level: u64) -> Self {
        self.initial_level = level;
        self
    }

    pub fn with_supply_target(mut self, target: u64) -> Self {
        self.supply_target = target;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn station_count(&self) -> usize {
        self.process_times.len()
    }

    pub fn buffer_count(&self) -> usize {
        self.process_times.len() + 1
    }

    /// Reject scenarios that cannot be simulated
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.process_times.is_empty() {
            return Err(ConfigError::NoStations);
        }
        if let Some((station, &value)) = self
            .process_times
            .iter()
            .enumerate()
            .find(|(_, pt)| !pt.is_finite() || **pt <= 0.0)
        {
            return Err(ConfigError::InvalidProcessTime { station, value });
        }
        if self.horizon == 0 {
            return Err(ConfigError::ZeroHorizon);
        }
        if self.supply_target == 0 {
            return Err(ConfigError::ZeroSupplyTarget);
        }
        // A zero-capacity buffer is a pure hand-off and holds nothing
        if self.initial_level > self.buffer_capacity {
            return Err(ConfigError::InitialLevelAboveCapacity {
                initial_level: self.initial_level,
                capacity: self.buffer_capacity,
            });
        }
        Ok(())
    }

    /// Load a scenario from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, crate::FlowlineError> {
        let text = std::fs::read_to_string(path)?;
        let scenario: Scenario = serde_json::from_str(&text)?;
        Ok(scenario)
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let scenario = Scenario::new(vec![2.0, 2.25, 2.0]);
        assert_eq!(scenario.station_count(), 3);
        assert_eq!(scenario.buffer_count(), 4);
        assert_eq!(scenario.horizon, 1000);
        assert_eq!(scenario.buffer_capacity, 10);
        assert_eq!(scenario.initial_level, 0);
        assert_eq!(scenario.supply_target, 100);
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let scenario = Scenario::new(vec![1.0])
            .with_horizon(5)
            .with_buffer_capacity(1)
            .with_initial_level(1)
            .with_supply_target(3)
            .with_seed(42);
        assert_eq!(scenario.horizon, 5);
        assert_eq!(scenario.buffer_capacity, 1);
        assert_eq!(scenario.initial_level, 1);
        assert_eq!(scenario.supply_target, 3);
        assert_eq!(scenario.seed, 42);
    }

    #[test]
    fn test_rejects_empty_line() {
        assert_eq!(Scenario::new(vec![]).validate(), Err(ConfigError::NoStations));
    }

    #[test]
    fn test_rejects_bad_process_times() {
        let err = Scenario::new(vec![1.0, 0.0]).validate().unwrap_err();
        assert_eq!(err, ConfigError::InvalidProcessTime { station: 1, value: 0.0 });
        assert!(Scenario::new(vec![-1.0]).validate().is_err());
        assert!(Scenario::new(vec![f64::INFINITY]).validate().is_err());
        assert!(Scenario::new(vec![f64::NAN]).validate().is_err());
    }

    #[test]
    fn test_rejects_zero_horizon_and_supply() {
        assert_eq!(
            Scenario::new(vec![1.0]).with_horizon(0).validate(),
            Err(ConfigError::ZeroHorizon)
        );
        assert_eq!(
            Scenario::new(vec![1.0]).with_supply_target(0).validate(),
            Err(ConfigError::ZeroSupplyTarget)
        );
    }

    #[test]
    fn test_initial_level_must_fit() {
        let too_full = Scenario::new(vec![1.0, 1.0])
            .with_buffer_capacity(2)
            .with_initial_level(3);
        assert!(matches!(
            too_full.validate(),
            Err(ConfigError::InitialLevelAboveCapacity { .. })
        ));

        let hand_off = Scenario::new(vec![1.0, 1.0]).with_buffer_capacity(0);
        assert!(hand_off.validate().is_ok());
        assert!(hand_off.with_initial_level(1).validate().is_err());
    }

    #[test]
    fn test_json_uses_defaults_for_missing_fields() {
        let scenario: Scenario =
            serde_json::from_str(r#"{"process_times": [2.0, 2.25], "horizon": 50}"#).unwrap();
        assert_eq!(scenario.process_times, vec![2.0, 2.25]);
        assert_eq!(scenario.horizon, 50);
        assert_eq!(scenario.buffer_capacity, Scenario::DEFAULT_CAPACITY);
        assert_eq!(scenario.supply_target, Scenario::DEFAULT_SUPPLY_TARGET);
    }
}
