use super::types::{SimTime, StationId};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A station resumption pending at a point in simulated time
#[derive(Debug, Clone, Copy)]
pub struct ScheduledWakeup {
    pub time: SimTime,
    pub station: StationId,
    pub sequence_num: u64,
}

impl PartialEq for ScheduledWakeup {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledWakeup {}

impl PartialOrd for ScheduledWakeup {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledWakeup {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default).
        // Equal times resolve to the lowest station ordinal.
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.station.cmp(&self.station))
            .then_with(|| other.sequence_num.cmp(&self.sequence_num))
    }
}

/// Time-ordered queue of station wakeups.
///
/// Pops wakeups by `(time, station ordinal, insertion order)`, which makes the
/// interleaving of stations fully deterministic.
#[derive(Debug, Default)]
pub struct EventScheduler {
    event_queue: BinaryHeap<ScheduledWakeup>,
    sequence_counter: u64,
}

impl EventScheduler {
    /// Create a new EventScheduler
    pub fn new() -> Self {
        Self {
            event_queue: BinaryHeap::new(),
            sequence_counter: 0,
        }
    }

    /// Schedule a station to resume at `time`
    pub fn schedule(&mut self, station: StationId, time: SimTime) {
        self.event_queue.push(ScheduledWakeup {
            time,
            station,
            sequence_num: self.sequence_counter,
        });
        self.sequence_counter += 1;
    }

    /// Pop the next wakeup if it is due at or before `until`
    pub fn pop_due(&mut self, until: SimTime) -> Option<ScheduledWakeup> {
        match self.event_queue.peek() {
            Some(next) if next.time <= until => self.event_queue.pop(),
            _ => None,
        }
    }

    /// Check if there are any wakeups remaining in the queue
    pub fn has_events(&self) -> bool {
        !self.event_queue.is_empty()
    }

    /// Get the time of the next wakeup without removing it
    pub fn peek_next_time(&self) -> Option<SimTime> {
        self.event_queue.peek().map(|wakeup| wakeup.time)
    }

    pub fn len(&self) -> usize {
        self.event_queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_queue.is_empty()
    }
}
