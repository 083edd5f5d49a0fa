//! Simulation events and the timestamp-ordered queue.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// What happened (or is scheduled to happen) at an event's timestamp.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// An order entered the system.
    OrderReceived {
        /// The order's id.
        order_id: String,
    },
    /// An order finished preparation.
    OrderReady {
        /// The order's id.
        order_id: String,
    },
    /// The optimizer should run after this timestamp's events are drained.
    DecisionTick,
    /// A vehicle leaves the depot.
    VehicleDepart {
        /// The departing vehicle.
        vehicle_id: usize,
    },
    /// A vehicle reaches one of its route's drop-offs.
    ExpectedDelivery {
        /// The carrying vehicle.
        vehicle_id: usize,
        /// The order being handed over.
        order_id: String,
    },
    /// A vehicle is back at the depot.
    VehicleReturn {
        /// The returning vehicle.
        vehicle_id: usize,
    },
}

/// A timestamped event with a monotone insertion number.
///
/// Ordering is by `(time, seq)`: the insertion counter breaks timestamp ties
/// deterministically, independent of heap internals.
#[derive(Debug, Clone)]
pub struct Event {
    /// Absolute simulation minute.
    pub time: f64,
    /// Insertion counter, unique within one queue.
    pub seq: u64,
    /// Payload.
    pub kind: EventKind,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq && self.time.to_bits() == other.time.to_bits()
    }
}

impl Eq for Event {}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap of events keyed by `(time, seq)`.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<std::cmp::Reverse<Event>>,
    counter: u64,
}

impl EventQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules an event, stamping it with the next insertion number.
    pub fn push(&mut self, time: f64, kind: EventKind) {
        let seq = self.counter;
        self.counter += 1;
        self.heap.push(std::cmp::Reverse(Event { time, seq, kind }));
    }

    /// Pops the earliest event if its time is at or before `now`.
    pub fn pop_due(&mut self, now: f64) -> Option<Event> {
        if self.heap.peek().is_some_and(|e| e.0.time <= now) {
            self.heap.pop().map(|r| r.0)
        } else {
            None
        }
    }

    /// Time of the earliest scheduled event.
    pub fn next_time(&self) -> Option<f64> {
        self.heap.peek().map(|e| e.0.time)
    }

    /// Number of scheduled events.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns `true` if nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_by_time() {
        let mut q = EventQueue::new();
        q.push(5.0, EventKind::DecisionTick);
        q.push(1.0, EventKind::VehicleReturn { vehicle_id: 1 });
        q.push(3.0, EventKind::VehicleDepart { vehicle_id: 1 });

        assert_eq!(q.next_time(), Some(1.0));
        assert_eq!(q.pop_due(10.0).expect("due").time, 1.0);
        assert_eq!(q.pop_due(10.0).expect("due").time, 3.0);
        assert_eq!(q.pop_due(10.0).expect("due").time, 5.0);
        assert!(q.pop_due(10.0).is_none());
    }

    #[test]
    fn test_ties_break_by_insertion_order() {
        let mut q = EventQueue::new();
        q.push(
            2.0,
            EventKind::OrderReady {
                order_id: "first".into(),
            },
        );
        q.push(
            2.0,
            EventKind::OrderReady {
                order_id: "second".into(),
            },
        );

        let a = q.pop_due(2.0).expect("due");
        let b = q.pop_due(2.0).expect("due");
        assert!(a.seq < b.seq);
        assert_eq!(
            a.kind,
            EventKind::OrderReady {
                order_id: "first".into()
            }
        );
    }

    #[test]
    fn test_pop_due_respects_now() {
        let mut q = EventQueue::new();
        q.push(10.0, EventKind::DecisionTick);
        assert!(q.pop_due(9.0).is_none());
        assert_eq!(q.len(), 1);
        assert!(q.pop_due(10.0).is_some());
        assert!(q.is_empty());
    }

    #[test]
    fn test_dequeued_times_non_decreasing() {
        let mut q = EventQueue::new();
        for &t in &[7.0, 2.0, 9.0, 2.0, 4.0, 7.0] {
            q.push(t, EventKind::DecisionTick);
        }
        let mut last = f64::NEG_INFINITY;
        while let Some(e) = q.pop_due(100.0) {
            assert!(e.time >= last);
            last = e.time;
        }
    }
}
