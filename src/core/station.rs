use super::buffer::{Buffer, Transfer};
use super::errors::ConfigError;
use super::event_log::{EventLog, EventType};
use super::types::{SimTime, StationId};
use log::trace;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Exp};
use serde::{Deserialize, Serialize};

/// Operational state of a station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationState {
    /// Waiting for upstream material
    Starved,
    /// Processing a held unit
    Active,
    /// Waiting to deposit a finished unit downstream
    Blocked,
    /// Reserved for failure modelling, never entered by the base cycle
    Breakdown,
}

impl std::fmt::Display for StationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StationState::Starved => "starved",
            StationState::Active => "active",
            StationState::Blocked => "blocked",
            StationState::Breakdown => "breakdown",
        };
        f.write_str(name)
    }
}

/// Where in its cycle a station picks up when resumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// About to request a unit from upstream
    Acquire,
    /// Parked on the upstream buffer; resumed once a unit was granted
    AwaitMaterial,
    /// Holding a unit until the service timer fires
    Processing,
    /// Parked on the downstream buffer; resumed once the unit was deposited
    AwaitSpace,
}

/// How a station left `resume`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Suspension {
    /// Parked on an empty upstream buffer
    Starved,
    /// Busy until the given time
    Processing { until: SimTime },
    /// Parked on a full downstream buffer
    Blocked,
}

/// Everything a station touches while it runs
pub struct StationContext<'a> {
    pub now: SimTime,
    pub upstream: &'a mut Buffer,
    pub downstream: &'a mut Buffer,
    pub log: &'a mut EventLog,
    pub rng: &'a mut StdRng,
}

/// A processing step of the line.
///
/// Cycles starved -> active -> blocked -> starved indefinitely, one unit per
/// cycle. Each call to [`Station::resume`] runs the cycle forward until the
/// station has to wait for material, for its service timer or for space.
#[derive(Debug, Clone)]
pub struct Station {
    id: StationId,
    process_time: f64,
    service: Exp<f64>,
    finished_jobs: u64,
    state: StationState,
    phase: Phase,
}

impl Station {
    /// Create a station with mean process time `process_time`
    pub fn new(id: StationId, process_time: f64) -> Result<Self, ConfigError> {
        if !process_time.is_finite() || process_time <= 0.0 {
            return Err(ConfigError::InvalidProcessTime {
                station: id.ordinal(),
                value: process_time,
            });
        }
        let service =
            Exp::new(1.0 / process_time).map_err(|e| ConfigError::Distribution(e.to_string()))?;
        Ok(Self {
            id,
            process_time,
            service,
            finished_jobs: 0,
            state: StationState::Starved,
            phase: Phase::Acquire,
        })
    }

    pub fn id(&self) -> StationId {
        self.id
    }

    pub fn process_time(&self) -> f64 {
        self.process_time
    }

    pub fn finished_jobs(&self) -> u64 {
        self.finished_jobs
    }

    pub fn state(&self) -> StationState {
        self.state
    }

    /// Draw a service duration: exponential with location and scale equal to
    /// the process time, so never shorter than the process time.
    pub fn sample_service_time(&self, rng: &mut StdRng) -> f64 {
        (self.process_time + self.service.sample(rng)).max(self.process_time)
    }

    /// Run the cycle from wherever it was suspended.
    ///
    /// Stations on the other side of a buffer whose pending request got
    /// completed along the way are pushed to `woken`.
    pub fn resume(&mut self, ctx: &mut StationContext<'_>, woken: &mut Vec<StationId>) -> Suspension {
        loop {
            match self.phase {
                Phase::Acquire => {
                    self.set_state(StationState::Starved, ctx.now);
                    match ctx.upstream.get(self.id) {
                        Transfer::Completed { woken: other } => {
                            woken.extend(other);
                            return self.start_job(ctx);
                        }
                        Transfer::Suspended => {
                            self.phase = Phase::AwaitMaterial;
                            return Suspension::Starved;
                        }
                    }
                }
                Phase::AwaitMaterial => return self.start_job(ctx),
                Phase::Processing => {
                    ctx.log
                        .record(ctx.now, self.id, self.finished_jobs + 1, EventType::JobFinish);
                    self.finished_jobs += 1;
                    self.set_state(StationState::Blocked, ctx.now);
                    match ctx.downstream.put(self.id) {
                        Transfer::Completed { woken: other } => {
                            woken.extend(other);
                            self.phase = Phase::Acquire;
                        }
                        Transfer::Suspended => {
                            self.phase = Phase::AwaitSpace;
                            return Suspension::Blocked;
                        }
                    }
                }
                Phase::AwaitSpace => self.phase = Phase::Acquire,
            }
        }
    }

    fn start_job(&mut self, ctx: &mut StationContext<'_>) -> Suspension {
        self.set_state(StationState::Active, ctx.now);
        ctx.log
            .record(ctx.now, self.id, self.finished_jobs + 1, EventType::JobStart);
        let duration = self.sample_service_time(ctx.rng);
        self.phase = Phase::Processing;
        Suspension::Processing {
            until: ctx.now.after(duration),
        }
    }

    fn set_state(&mut self, state: StationState, now: SimTime) {
        if self.state != state {
            trace!("{} {} -> {} at {:.3}", self.id, self.state, state, now.value());
        }
        self.state = state;
    }
}
