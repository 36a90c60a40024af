use crate::core::errors::DetectionError;
use crate::core::event_log::{EventLog, EventRecord, EventType};
use crate::core::types::StationId;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Derived status of a logged event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Start of a station's first job
    Init,
    /// No idle gap around this event
    Active,
    /// The station went idle after this event
    Passive,
}

impl EventStatus {
    /// Whether the event restarts a station's active period
    pub fn resets(&self) -> bool {
        matches!(self, EventStatus::Init | EventStatus::Passive)
    }
}

/// Check every record against the line and derive its status.
///
/// A job start is `Init` for job 1 and `Active` otherwise. A job finish is
/// `Active` only when the same station starts its next job at the identical
/// timestamp.
pub fn classify(log: &EventLog) -> Result<Vec<EventStatus>, DetectionError> {
    validate(log)?;

    let next_starts: HashMap<(StationId, u64), f64> = log
        .records()
        .iter()
        .filter(|r| r.event_type == EventType::JobStart)
        .map(|r| ((r.station, r.job), r.time))
        .collect();

    let statuses = log
        .records()
        .iter()
        .map(|r| match r.event_type {
            EventType::JobStart if r.job == 1 => EventStatus::Init,
            EventType::JobStart => EventStatus::Active,
            EventType::JobFinish => match next_starts.get(&(r.station, r.job + 1)) {
                Some(&start) if start == r.time => EventStatus::Active,
                _ => EventStatus::Passive,
            },
        })
        .collect();

    Ok(statuses)
}

fn validate(log: &EventLog) -> Result<(), DetectionError> {
    if log.station_count() == 0 {
        return Err(DetectionError::NoStations);
    }
    for (index, record) in log.records().iter().enumerate() {
        if record.station.ordinal() >= log.station_count() {
            return Err(DetectionError::UnknownStation {
                index,
                station: record.station,
                station_count: log.station_count(),
            });
        }
        if record.job == 0 {
            return Err(DetectionError::ZeroJobIndex { index });
        }
        if !record.time.is_finite() || record.time < 0.0 {
            return Err(DetectionError::InvalidTime {
                index,
                time: record.time,
            });
        }
    }
    Ok(())
}

/// Event log row as stored by external tooling, event type still untyped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEventRow {
    pub time: f64,
    pub station: usize,
    pub job: u64,
    pub event_type: String,
}

/// Build a typed event log from raw rows, rejecting unknown event types
pub fn parse_rows(station_count: usize, rows: &[RawEventRow]) -> Result<EventLog, DetectionError> {
    let records = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let event_type =
                row.event_type
                    .parse::<EventType>()
                    .map_err(|_| DetectionError::MalformedEventType {
                        index,
                        value: row.event_type.clone(),
                    })?;
            Ok(EventRecord {
                time: row.time,
                station: StationId::new(row.station),
                job: row.job,
                event_type,
            })
        })
        .collect::<Result<Vec<_>, DetectionError>>()?;
    Ok(EventLog::from_records(station_count, records))
}

/// Active periods and elected bottleneck at one time step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckRow {
    pub step: u64,
    /// Active period per station, in station order
    pub active_periods: Vec<f64>,
    #[serde(with = "station_name")]
    pub bottleneck: StationId,
}

mod station_name {
    use crate::core::types::StationId;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(id: &StationId, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<StationId, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.strip_prefix('S')
            .and_then(|n| n.parse().ok())
            .map(StationId::new)
            .ok_or_else(|| D::Error::custom(format!("invalid station name '{}'", name)))
    }
}

/// Per-step active periods of every station with the bottleneck label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckTable {
    station_count: usize,
    rows: Vec<BottleneckRow>,
}

impl BottleneckTable {
    pub fn station_count(&self) -> usize {
        self.station_count
    }

    /// Column names, `S0..S{N-1}`
    pub fn station_names(&self) -> Vec<String> {
        (0..self.station_count)
            .map(|i| StationId::new(i).to_string())
            .collect()
    }

    pub fn rows(&self) -> &[BottleneckRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Active period history of one station, `None` if it is not on the line
    pub fn column(&self, station: StationId) -> Option<Vec<f64>> {
        if station.ordinal() >= self.station_count {
            return None;
        }
        Some(
            self.rows
                .iter()
                .map(|row| row.active_periods[station.ordinal()])
                .collect(),
        )
    }

    /// Rows with `start <= step < end`
    pub fn window(&self, start: u64, end: u64) -> BottleneckTable {
        BottleneckTable {
            station_count: self.station_count,
            rows: self
                .rows
                .iter()
                .filter(|row| row.step >= start && row.step < end)
                .cloned()
                .collect(),
        }
    }

    /// Number of steps each station was the bottleneck
    pub fn bottleneck_frequency(&self) -> Vec<u64> {
        let mut counts = vec![0; self.station_count];
        for row in &self.rows {
            counts[row.bottleneck.ordinal()] += 1;
        }
        counts
    }

    /// Share of steps each station was the bottleneck
    pub fn bottleneck_shares(&self) -> Vec<f64> {
        let total = self.rows.len() as f64;
        self.bottleneck_frequency()
            .into_iter()
            .map(|count| if total > 0.0 { count as f64 / total } else { 0.0 })
            .collect()
    }
}

/// Reconstructs active periods from a finished run's event log.
///
/// The active period of a station at step `t` is the time since the most
/// recent `Init` or `Passive` event at or before `t`. A station without such
/// an event (reset point 0) counts up by one per step from 0 at step 0.
pub struct BottleneckDetector<'a> {
    log: &'a EventLog,
    statuses: Vec<EventStatus>,
    steps: u64,
}

impl<'a> BottleneckDetector<'a> {
    /// Classify the log; fails on records that do not fit the line
    pub fn new(log: &'a EventLog) -> Result<Self, DetectionError> {
        let statuses = classify(log)?;
        let steps = log.horizon().unwrap_or_else(|| log.max_time().ceil() as u64);
        Ok(Self {
            log,
            statuses,
            steps,
        })
    }

    /// Number of rows the table will have
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn statuses(&self) -> &[EventStatus] {
        &self.statuses
    }

    /// Per-station `(time, status)` lists ordered by time
    fn station_timelines(&self) -> Vec<Vec<(f64, EventStatus)>> {
        let mut timelines = vec![Vec::new(); self.log.station_count()];
        for (record, status) in self.log.records().iter().zip(&self.statuses) {
            timelines[record.station.ordinal()].push((record.time, *status));
        }
        for timeline in &mut timelines {
            timeline.sort_by(|a, b| a.0.total_cmp(&b.0));
        }
        timelines
    }

    /// Single forward pass with one reset pointer per station
    pub fn detect(&self) -> BottleneckTable {
        info!(
            "Calculating the active periods for all {} stations",
            self.log.station_count()
        );
        let timelines = self.station_timelines();
        let mut cursors = vec![0usize; timelines.len()];
        let mut resets = vec![0.0f64; timelines.len()];
        let mut previous: Vec<f64> = vec![0.0; timelines.len()];
        let mut rows = Vec::with_capacity(self.steps as usize);

        for step in 0..self.steps {
            let t = step as f64;
            let mut periods = Vec::with_capacity(timelines.len());
            for (s, timeline) in timelines.iter().enumerate() {
                while let Some(&(time, status)) = timeline.get(cursors[s]) {
                    if time > t {
                        break;
                    }
                    if status.resets() {
                        resets[s] = time;
                    }
                    cursors[s] += 1;
                }
                periods.push(active_period(step, resets[s], previous[s]));
            }
            previous.clone_from(&periods);
            rows.push(row(step, periods));
        }

        debug!("Computed {} active period rows", rows.len());
        self.table(rows)
    }

    /// Recompute every cell with a fresh backward scan.
    ///
    /// Quadratic in the number of steps; produces the same table as
    /// [`BottleneckDetector::detect`].
    pub fn detect_by_rescan(&self) -> BottleneckTable {
        let timelines = self.station_timelines();
        let mut previous: Vec<f64> = vec![0.0; timelines.len()];
        let mut rows = Vec::with_capacity(self.steps as usize);

        for step in 0..self.steps {
            let t = step as f64;
            let periods: Vec<f64> = timelines
                .iter()
                .enumerate()
                .map(|(s, timeline)| {
                    let reset = timeline
                        .iter()
                        .rev()
                        .filter(|(time, _)| *time <= t)
                        .find(|(_, status)| status.resets())
                        .map_or(0.0, |(time, _)| *time);
                    active_period(step, reset, previous[s])
                })
                .collect();
            previous.clone_from(&periods);
            rows.push(row(step, periods));
        }

        self.table(rows)
    }

    fn table(&self, rows: Vec<BottleneckRow>) -> BottleneckTable {
        BottleneckTable {
            station_count: self.log.station_count(),
            rows,
        }
    }
}

/// Active period at `step` given the reset point and the previous step's value
fn active_period(step: u64, reset: f64, previous: f64) -> f64 {
    if reset != 0.0 {
        step as f64 - reset
    } else if step == 0 {
        0.0
    } else {
        previous + 1.0
    }
}

fn row(step: u64, active_periods: Vec<f64>) -> BottleneckRow {
    let bottleneck = StationId::new(argmax_first(&active_periods));
    BottleneckRow {
        step,
        active_periods,
        bottleneck,
    }
}

/// Index of the largest value, the first one on ties
fn argmax_first(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &value) in values.iter().enumerate().skip(1) {
        if value > values[best] {
            best = i;
        }
    }
    best
}

/// Classify and detect in one go
pub fn detect_bottlenecks(log: &EventLog) -> Result<BottleneckTable, DetectionError> {
    Ok(BottleneckDetector::new(log)?.detect())
}
