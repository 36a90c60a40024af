use super::types::{round_time, SimTime, StationId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of a logged station event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "job start")]
    JobStart,
    #[serde(rename = "job finish")]
    JobFinish,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::JobStart => "job start",
            EventType::JobFinish => "job finish",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "job start" => Ok(EventType::JobStart),
            "job finish" => Ok(EventType::JobFinish),
            other => Err(format!("unknown event type '{}'", other)),
        }
    }
}

/// One row of the event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Simulated time, rounded to three decimals
    pub time: f64,
    pub station: StationId,
    /// 1-based job sequence number of the station
    pub job: u64,
    pub event_type: EventType,
}

impl EventRecord {
    pub fn new(time: f64, station: StationId, job: u64, event_type: EventType) -> Self {
        Self {
            time: round_time(time),
            station,
            job,
            event_type,
        }
    }
}

/// Append-only record of job starts and finishes of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    station_count: usize,
    /// Number of ticks the producing run covered, if known
    horizon: Option<u64>,
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Create an empty log for a line of `station_count` stations
    pub fn new(station_count: usize) -> Self {
        Self {
            station_count,
            horizon: None,
            records: Vec::new(),
        }
    }

    /// Create a log from existing rows, e.g. one read back from disk
    pub fn from_records(station_count: usize, records: Vec<EventRecord>) -> Self {
        Self {
            station_count,
            horizon: None,
            records,
        }
    }

    pub fn with_horizon(mut self, horizon: u64) -> Self {
        self.horizon = Some(horizon);
        self
    }

    pub(crate) fn set_horizon(&mut self, horizon: u64) {
        self.horizon = Some(horizon);
    }

    /// Append an event at `time`
    pub fn record(&mut self, time: SimTime, station: StationId, job: u64, event_type: EventType) {
        debug_assert!(
            self.records.last().map_or(true, |last| last.time <= time.rounded()),
            "event log must be appended in time order"
        );
        self.records.push(EventRecord::new(time.value(), station, job, event_type));
    }

    pub fn station_count(&self) -> usize {
        self.station_count
    }

    pub fn horizon(&self) -> Option<u64> {
        self.horizon
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Events of one station, in log order
    pub fn station_events(&self, station: StationId) -> impl Iterator<Item = &EventRecord> + '_ {
        self.records.iter().filter(move |r| r.station == station)
    }

    /// Latest event time, 0 for an empty log
    pub fn max_time(&self) -> f64 {
        self.records.iter().map(|r| r.time).fold(0.0, f64::max)
    }
}
