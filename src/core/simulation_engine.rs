use super::config::Scenario;
use super::errors::ConfigError;
use super::event_log::EventLog;
use super::line::Line;
use super::station::StationState;
use super::types::SimTime;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Line state as seen at a tick boundary
#[derive(Debug, Clone, Copy)]
pub struct TickSnapshot<'a> {
    pub tick: u64,
    pub buffer_levels: &'a [u64],
    pub station_states: &'a [StationState],
}

/// Observer trait for simulation progress
pub trait SimulationObserver {
    /// Called before the line is driven from `old_tick` to `new_tick`
    fn on_tick_advance(&mut self, old_tick: u64, new_tick: u64);

    /// Called once every action up to the tick boundary has completed, before
    /// the supply buffer is restocked
    fn on_tick_complete(&mut self, snapshot: &TickSnapshot<'_>);
}

/// Buffer levels recorded at one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferLevelRow {
    pub time: u64,
    pub levels: Vec<u64>,
}

/// Per-tick buffer levels of a run, supply buffer first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BufferLevelSeries {
    pub rows: Vec<BufferLevelRow>,
}

impl BufferLevelSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Level history of a single buffer, `None` if a row lacks that buffer
    pub fn buffer(&self, ordinal: usize) -> Option<Vec<u64>> {
        self.rows
            .iter()
            .map(|row| row.levels.get(ordinal).copied())
            .collect()
    }
}

/// Artifacts of a completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub events: EventLog,
    pub buffer_levels: BufferLevelSeries,
}

/// Tick-by-tick driver of a [`Line`].
///
/// Each step drives the line to the next integer tick, records the buffer
/// levels, then restocks the supply buffer.
pub struct SimulationEngine {
    line: Line,
    current_tick: u64,
    max_ticks: u64,
    buffer_levels: BufferLevelSeries,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl SimulationEngine {
    /// Validate `scenario` and assemble its line
    pub fn new(scenario: &Scenario) -> Result<Self, ConfigError> {
        let line = Line::new(scenario)?;
        Ok(Self {
            line,
            current_tick: 0,
            max_ticks: scenario.horizon,
            buffer_levels: BufferLevelSeries::default(),
            observers: Vec::new(),
        })
    }

    /// Add an observer to the simulation
    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    fn notify_tick_advance(&mut self, old_tick: u64, new_tick: u64) {
        for observer in &mut self.observers {
            observer.on_tick_advance(old_tick, new_tick);
        }
    }

    fn notify_tick_complete(&mut self, levels: &[u64], states: &[StationState]) {
        let snapshot = TickSnapshot {
            tick: self.current_tick,
            buffer_levels: levels,
            station_states: states,
        };
        for observer in &mut self.observers {
            observer.on_tick_complete(&snapshot);
        }
    }

    /// Process one tick, returns true if ticks remain
    pub fn step(&mut self) -> bool {
        if self.current_tick >= self.max_ticks {
            return false;
        }

        let old_tick = self.current_tick;
        let new_tick = old_tick + 1;
        self.notify_tick_advance(old_tick, new_tick);

        self.line.run_until(SimTime::from(new_tick));
        self.current_tick = new_tick;

        let levels = self.line.buffer_levels();
        let states = self.line.station_states();
        debug!("=== Tick {} === buffers {:?}", new_tick, levels);
        self.notify_tick_complete(&levels, &states);
        self.buffer_levels.rows.push(BufferLevelRow {
            time: new_tick,
            levels,
        });

        self.line.restock();

        self.current_tick < self.max_ticks
    }

    /// Run the remaining ticks and hand back the recorded artifacts
    pub fn run(mut self) -> SimulationOutput {
        info!(
            "Running simulation with {} stations for {} ticks",
            self.line.stations().len(),
            self.max_ticks
        );

        while self.step() {}

        let mut events = self.line.into_event_log();
        events.set_horizon(self.max_ticks);
        info!("Simulation finished with {} events", events.len());

        SimulationOutput {
            events,
            buffer_levels: self.buffer_levels,
        }
    }

    /// Get current simulation tick
    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    pub fn line(&self) -> &Line {
        &self.line
    }

    pub fn buffer_levels(&self) -> &BufferLevelSeries {
        &self.buffer_levels
    }
}

/// Convenience wrapper: assemble, run to the horizon, return the artifacts
pub fn simulate(scenario: &Scenario) -> Result<SimulationOutput, ConfigError> {
    Ok(SimulationEngine::new(scenario)?.run())
}
