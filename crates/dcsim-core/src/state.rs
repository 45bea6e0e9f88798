use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use rand::distributions::uniform::{SampleRange, SampleUniform};
use rand::prelude::*;
use rand_pcg::Pcg64;

use crate::event::{Event, EventData, EventId};
use crate::Id;

// Reverses the (time, id) order so that the earliest pending event sits on
// top of the max-heap.
struct QueuedEvent(Event);

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for QueuedEvent {}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .time
            .total_cmp(&self.0.time)
            .then_with(|| other.0.id.cmp(&self.0.id))
    }
}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct SimulationState {
    clock: f64,
    rand: Pcg64,
    events: BinaryHeap<QueuedEvent>,
    canceled_events: HashSet<EventId>,
    event_count: u64,
}

impl SimulationState {
    pub fn new(seed: u64) -> Self {
        Self {
            clock: 0.0,
            rand: Pcg64::seed_from_u64(seed),
            events: BinaryHeap::new(),
            canceled_events: HashSet::new(),
            event_count: 0,
        }
    }

    pub fn time(&self) -> f64 {
        self.clock
    }

    // Moves the clock forward without processing events (the clock never
    // goes backwards).
    pub fn advance_time(&mut self, time: f64) {
        if time > self.clock {
            self.clock = time;
        }
    }

    pub fn rand(&mut self) -> f64 {
        self.rand.gen_range(0.0..1.0)
    }

    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: SampleUniform,
        R: SampleRange<T>,
    {
        self.rand.gen_range(range)
    }

    pub fn rand_u128(&mut self) -> u128 {
        self.rand.gen::<u128>()
    }

    pub fn add_event<T>(&mut self, data: T, src: Id, dest: Id, delay: f64) -> EventId
    where
        T: EventData,
    {
        debug_assert!(delay >= 0.0, "event delay must be non-negative");
        let event_id = self.event_count;
        let event = Event {
            id: event_id,
            time: self.clock + delay,
            src,
            dest,
            data: Box::new(data),
        };
        self.events.push(QueuedEvent(event));
        self.event_count += 1;
        event_id
    }

    pub fn next_event(&mut self) -> Option<Event> {
        loop {
            if let Some(QueuedEvent(event)) = self.events.pop() {
                if !self.canceled_events.remove(&event.id) {
                    self.clock = event.time;
                    return Some(event);
                }
            } else {
                return None;
            }
        }
    }

    pub fn peek_event(&mut self) -> Option<&Event> {
        // drop canceled events from the top so that the caller sees the
        // actual next event
        while let Some(queued) = self.events.peek() {
            if self.canceled_events.contains(&queued.0.id) {
                let id = self.events.pop().unwrap().0.id;
                self.canceled_events.remove(&id);
            } else {
                break;
            }
        }
        self.events.peek().map(|queued| &queued.0)
    }

    pub fn cancel_event(&mut self, id: EventId) {
        self.canceled_events.insert(id);
    }

    pub fn cancel_events<F>(&mut self, pred: F)
    where
        F: Fn(&Event) -> bool,
    {
        let canceled: Vec<EventId> = self
            .events
            .iter()
            .filter(|queued| pred(&queued.0))
            .map(|queued| queued.0.id)
            .collect();
        self.canceled_events.extend(canceled);
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }
}
