use super::types::{BufferId, StationId};
use serde::{Deserialize, Serialize};

/// Upper bound on a buffer's level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capacity {
    Finite(u64),
    Unbounded,
}

impl Capacity {
    /// Whether `level` units fit
    pub fn admits(&self, level: u64) -> bool {
        match self {
            Capacity::Finite(max) => level <= *max,
            Capacity::Unbounded => true,
        }
    }
}

/// Outcome of a put or get issued against a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// The unit moved. `woken` is a station on the other side whose pending
    /// request was completed as part of this transfer.
    Completed { woken: Option<StationId> },
    /// The caller is parked on the buffer until the opposite side acts
    Suspended,
}

/// Bounded counting resource between two stations.
///
/// At most one station gets from a buffer and at most one puts into it, so a
/// single parking slot per side is enough. A zero-capacity buffer never holds
/// a unit; it passes one straight through when both sides meet.
#[derive(Debug, Clone)]
pub struct Buffer {
    id: BufferId,
    level: u64,
    capacity: Capacity,
    waiting_getter: Option<StationId>,
    waiting_putter: Option<StationId>,
}

impl Buffer {
    /// Create a buffer with a fixed capacity and starting level
    pub fn new(id: BufferId, capacity: Capacity, initial_level: u64) -> Self {
        assert!(
            capacity.admits(initial_level),
            "{} initial level {} exceeds capacity {:?}",
            id,
            initial_level,
            capacity
        );
        Self {
            id,
            level: initial_level,
            capacity,
            waiting_getter: None,
            waiting_putter: None,
        }
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn level(&self) -> u64 {
        self.level
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Check if the buffer is full
    pub fn is_full(&self) -> bool {
        !self.capacity.admits(self.level + 1)
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.level == 0
    }

    /// Get available space in the buffer, `None` when unbounded
    pub fn available_space(&self) -> Option<u64> {
        match self.capacity {
            Capacity::Finite(max) => Some(max.saturating_sub(self.level)),
            Capacity::Unbounded => None,
        }
    }

    pub fn waiting_getter(&self) -> Option<StationId> {
        self.waiting_getter
    }

    pub fn waiting_putter(&self) -> Option<StationId> {
        self.waiting_putter
    }

    /// Take one unit on behalf of `station`, parking it if none is available
    pub fn get(&mut self, station: StationId) -> Transfer {
        debug_assert!(self.waiting_getter.is_none(), "{} already has a parked getter", self.id);

        let transfer = if self.level >= 1 {
            self.level -= 1;
            // The freed slot goes to the parked putter, if any
            let woken = match self.waiting_putter {
                Some(_) if !self.is_full() => {
                    self.level += 1;
                    self.waiting_putter.take()
                }
                _ => None,
            };
            Transfer::Completed { woken }
        } else if self.waiting_putter.is_some() {
            // Zero-capacity hand-off
            Transfer::Completed {
                woken: self.waiting_putter.take(),
            }
        } else {
            self.waiting_getter = Some(station);
            Transfer::Suspended
        };

        self.check_invariant();
        transfer
    }

    /// Deposit one unit on behalf of `station`, parking it if there is no room
    pub fn put(&mut self, station: StationId) -> Transfer {
        debug_assert!(self.waiting_putter.is_none(), "{} already has a parked putter", self.id);

        let transfer = if !self.is_full() {
            self.level += 1;
            Transfer::Completed {
                woken: self.serve_waiting_getter(),
            }
        } else if self.waiting_getter.is_some() {
            // Zero-capacity hand-off
            Transfer::Completed {
                woken: self.waiting_getter.take(),
            }
        } else {
            self.waiting_putter = Some(station);
            Transfer::Suspended
        };

        self.check_invariant();
        transfer
    }

    /// Top the level back up to `target` from outside the line.
    ///
    /// Returns the parked getter if the refill released it.
    pub fn restock(&mut self, target: u64) -> Option<StationId> {
        if self.level >= target {
            return None;
        }
        assert!(
            self.capacity.admits(target),
            "{} cannot be restocked to {} with capacity {:?}",
            self.id,
            target,
            self.capacity
        );
        self.level = target;
        let woken = self.serve_waiting_getter();
        self.check_invariant();
        woken
    }

    fn serve_waiting_getter(&mut self) -> Option<StationId> {
        if self.waiting_getter.is_some() && self.level >= 1 {
            self.level -= 1;
            self.waiting_getter.take()
        } else {
            None
        }
    }

    fn check_invariant(&self) {
        assert!(
            self.capacity.admits(self.level),
            "{} level {} exceeds capacity {:?}",
            self.id,
            self.level,
            self.capacity
        );
        assert!(
            self.waiting_getter.is_none() || self.waiting_putter.is_none(),
            "{} has parked stations on both sides",
            self.id
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(capacity: Capacity, level: u64) -> Buffer {
        Buffer::new(BufferId::new(1), capacity, level)
    }

    #[test]
    fn test_get_from_stocked_buffer() {
        let mut b = buffer(Capacity::Finite(2), 2);
        assert_eq!(b.get(StationId::new(1)), Transfer::Completed { woken: None });
        assert_eq!(b.level(), 1);
        assert_eq!(b.available_space(), Some(1));
    }

    #[test]
    fn test_get_from_empty_buffer_parks_getter() {
        let mut b = buffer(Capacity::Finite(1), 0);
        assert_eq!(b.get(StationId::new(1)), Transfer::Suspended);
        assert_eq!(b.waiting_getter(), Some(StationId::new(1)));

        // The next put goes straight to the parked getter
        assert_eq!(
            b.put(StationId::new(0)),
            Transfer::Completed {
                woken: Some(StationId::new(1))
            }
        );
        assert_eq!(b.level(), 0);
        assert_eq!(b.waiting_getter(), None);
    }

    #[test]
    fn test_put_into_full_buffer_parks_putter() {
        let mut b = buffer(Capacity::Finite(1), 1);
        assert!(b.is_full());
        assert_eq!(b.put(StationId::new(0)), Transfer::Suspended);
        assert_eq!(b.waiting_putter(), Some(StationId::new(0)));

        // Taking a unit frees the slot and completes the parked put
        assert_eq!(
            b.get(StationId::new(1)),
            Transfer::Completed {
                woken: Some(StationId::new(0))
            }
        );
        assert_eq!(b.level(), 1);
        assert_eq!(b.waiting_putter(), None);
    }

    #[test]
    fn test_zero_capacity_hand_off() {
        let mut b = buffer(Capacity::Finite(0), 0);
        assert_eq!(b.put(StationId::new(0)), Transfer::Suspended);
        assert_eq!(
            b.get(StationId::new(1)),
            Transfer::Completed {
                woken: Some(StationId::new(0))
            }
        );
        assert_eq!(b.level(), 0);

        assert_eq!(b.get(StationId::new(1)), Transfer::Suspended);
        assert_eq!(
            b.put(StationId::new(0)),
            Transfer::Completed {
                woken: Some(StationId::new(1))
            }
        );
        assert_eq!(b.level(), 0);
    }

    #[test]
    fn test_unbounded_never_full() {
        let mut b = buffer(Capacity::Unbounded, 0);
        for _ in 0..1000 {
            assert_eq!(b.put(StationId::new(0)), Transfer::Completed { woken: None });
        }
        assert_eq!(b.level(), 1000);
        assert!(!b.is_full());
        assert_eq!(b.available_space(), None);
    }

    #[test]
    fn test_restock_releases_parked_getter() {
        let mut b = Buffer::new(BufferId::new(0), Capacity::Unbounded, 0);
        assert_eq!(b.get(StationId::new(0)), Transfer::Suspended);
        assert_eq!(b.restock(5), Some(StationId::new(0)));
        assert_eq!(b.level(), 4);
        assert_eq!(b.restock(3), None);
        assert_eq!(b.level(), 4);
    }

    #[test]
    #[should_panic]
    fn test_initial_level_above_capacity_panics() {
        buffer(Capacity::Finite(1), 2);
    }
}
