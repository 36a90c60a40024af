use super::buffer::{Buffer, Capacity};
use super::config::Scenario;
use super::errors::ConfigError;
use super::event_log::EventLog;
use super::event_scheduler::EventScheduler;
use super::station::{Station, StationContext, StationState, Suspension};
use super::types::{BufferId, SimTime, StationId};
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A serial production line: N stations chained by N+1 buffers.
///
/// Buffer 0 is the unbounded supply boundary, buffer N the unbounded demand
/// sink, everything in between shares the scenario's capacity and initial
/// level. The line owns the clock and interleaves the stations on a single
/// thread, so a given scenario and seed always yields the same event log.
pub struct Line {
    scenario: Scenario,
    now: SimTime,
    scheduler: EventScheduler,
    stations: Vec<Station>,
    buffers: Vec<Buffer>,
    log: EventLog,
    rng: StdRng,
}

impl Line {
    /// Assemble the line described by `scenario`
    pub fn new(scenario: &Scenario) -> Result<Self, ConfigError> {
        scenario.validate()?;

        let station_count = scenario.station_count();
        let stations = scenario
            .process_times
            .iter()
            .enumerate()
            .map(|(i, &pt)| Station::new(StationId::new(i), pt))
            .collect::<Result<Vec<_>, _>>()?;

        let buffers = (0..=station_count)
            .map(|i| {
                let id = BufferId::new(i);
                if i == 0 {
                    Buffer::new(id, Capacity::Unbounded, scenario.supply_target)
                } else if i == station_count {
                    Buffer::new(id, Capacity::Unbounded, 0)
                } else {
                    Buffer::new(
                        id,
                        Capacity::Finite(scenario.buffer_capacity),
                        scenario.initial_level,
                    )
                }
            })
            .collect();

        // Every station starts its cycle at time zero
        let mut scheduler = EventScheduler::new();
        for station in &stations {
            scheduler.schedule(station.id(), SimTime::ZERO);
        }

        debug!(
            "Assembled line with {} stations and {} buffers",
            station_count,
            station_count + 1
        );

        Ok(Self {
            scenario: scenario.clone(),
            now: SimTime::ZERO,
            scheduler,
            stations,
            buffers,
            log: EventLog::new(station_count),
            rng: StdRng::seed_from_u64(scenario.seed),
        })
    }

    /// Drive every pending station action with a time at or before `until`,
    /// then move the clock to `until`.
    pub fn run_until(&mut self, until: SimTime) {
        while let Some(wakeup) = self.scheduler.pop_due(until) {
            assert!(
                wakeup.time >= self.now,
                "wakeup of {} at {:?} lies before the clock at {:?}",
                wakeup.station,
                wakeup.time,
                self.now
            );
            self.now = wakeup.time;
            self.resume_station(wakeup.station);
        }
        if until > self.now {
            self.now = until;
        }
    }

    fn resume_station(&mut self, id: StationId) {
        let i = id.ordinal();
        let (upstream, downstream) = self.buffers.split_at_mut(i + 1);
        let mut ctx = StationContext {
            now: self.now,
            upstream: &mut upstream[i],
            downstream: &mut downstream[0],
            log: &mut self.log,
            rng: &mut self.rng,
        };

        let mut woken = Vec::new();
        let suspension = self.stations[i].resume(&mut ctx, &mut woken);
        trace!("{} suspended: {:?}", id, suspension);

        if let Suspension::Processing { until } = suspension {
            self.scheduler.schedule(id, until);
        }
        for other in woken {
            self.scheduler.schedule(other, self.now);
        }
    }

    /// Top the supply buffer back up to the scenario's target level
    pub fn restock(&mut self) {
        let target = self.scenario.supply_target;
        if let Some(station) = self.buffers[0].restock(target) {
            self.scheduler.schedule(station, self.now);
        }
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Current level of every buffer, supply first
    pub fn buffer_levels(&self) -> Vec<u64> {
        self.buffers.iter().map(|b| b.level()).collect()
    }

    /// Current state of every station
    pub fn station_states(&self) -> Vec<StationState> {
        self.stations.iter().map(|s| s.state()).collect()
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn buffers(&self) -> &[Buffer] {
        &self.buffers
    }

    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    pub fn into_event_log(self) -> EventLog {
        self.log
    }
}
