use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Ordinal position of a station on the line (0..N-1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(pub(crate) usize);

impl StationId {
    /// Create a station identifier from its ordinal
    pub fn new(ordinal: usize) -> Self {
        Self(ordinal)
    }

    /// Get the raw ordinal
    pub fn ordinal(&self) -> usize {
        self.0
    }

    /// Buffer the station takes material from
    pub fn upstream(&self) -> BufferId {
        BufferId(self.0)
    }

    /// Buffer the station deposits finished units into
    pub fn downstream(&self) -> BufferId {
        BufferId(self.0 + 1)
    }
}

impl std::fmt::Display for StationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// Ordinal position of a buffer on the line (0..N)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BufferId(pub(crate) usize);

impl BufferId {
    /// Create a buffer identifier from its ordinal
    pub fn new(ordinal: usize) -> Self {
        Self(ordinal)
    }

    /// Get the raw ordinal
    pub fn ordinal(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for BufferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "B{}", self.0)
    }
}

/// Point on the simulated time axis.
///
/// Wraps `f64` so it can key the scheduler's heap. Ordering is the IEEE total
/// order; the line never produces NaN times.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimTime(f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    pub fn new(value: f64) -> Self {
        debug_assert!(!value.is_nan(), "simulated time must not be NaN");
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Time after a delay of `duration`
    pub fn after(&self, duration: f64) -> Self {
        Self::new(self.0 + duration)
    }

    /// Round to the three decimal places used by the event log
    pub fn rounded(&self) -> f64 {
        round_time(self.0)
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<u64> for SimTime {
    fn from(tick: u64) -> Self {
        Self(tick as f64)
    }
}

/// Round a time value to millisecond-of-tick precision
pub fn round_time(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_buffer_wiring() {
        let station = StationId::new(3);
        assert_eq!(station.upstream(), BufferId::new(3));
        assert_eq!(station.downstream(), BufferId::new(4));
        assert_eq!(station.to_string(), "S3");
        assert_eq!(BufferId::new(0).to_string(), "B0");
    }

    #[test]
    fn test_sim_time_ordering() {
        let a = SimTime::new(1.5);
        let b = SimTime::new(2.0);
        assert!(a < b);
        assert_eq!(a.after(0.5), b);
        assert_eq!(SimTime::from(2u64), b);
    }

    #[test]
    fn test_round_time() {
        assert_eq!(round_time(1.23456), 1.235);
        assert_eq!(round_time(2.0), 2.0);
        assert_eq!(SimTime::new(0.0004).rounded(), 0.0);
    }
}
