use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use dcsim_core::{dispatch, Event, EventHandler, Simulation};

#[derive(Clone, Serialize)]
pub struct Tick {
    pub seq: u32,
}

pub struct Receiver {
    received: Vec<(f64, u32)>,
}

impl Receiver {
    fn new() -> Self {
        Self { received: Vec::new() }
    }
}

impl EventHandler for Receiver {
    fn on(&mut self, event: Event) {
        let time = event.time;
        dispatch!(match event {
            Tick { seq } => {
                self.received.push((time, seq));
            }
        })
    }
}

#[test]
fn test_events_are_delivered_in_time_order() {
    let mut sim = Simulation::new(123);
    let receiver = Rc::new(RefCell::new(Receiver::new()));
    let receiver_id = sim.add_handler("receiver", receiver.clone());
    let ctx = sim.create_context("sender");

    ctx.emit(Tick { seq: 2 }, receiver_id, 5.0);
    ctx.emit(Tick { seq: 0 }, receiver_id, 1.0);
    ctx.emit(Tick { seq: 1 }, receiver_id, 2.5);
    sim.step_until_no_events();

    assert_eq!(receiver.borrow().received, vec![(1.0, 0), (2.5, 1), (5.0, 2)]);
    assert_eq!(sim.time(), 5.0);
}

#[test]
fn test_same_time_events_are_delivered_in_creation_order() {
    let mut sim = Simulation::new(123);
    let receiver = Rc::new(RefCell::new(Receiver::new()));
    let receiver_id = sim.add_handler("receiver", receiver.clone());
    let ctx = sim.create_context("sender");

    for seq in 0..5 {
        ctx.emit(Tick { seq }, receiver_id, 1.0);
    }
    sim.step_until_no_events();

    let seqs: Vec<u32> = receiver.borrow().received.iter().map(|(_, seq)| *seq).collect();
    assert_eq!(seqs, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_canceled_event_is_not_delivered() {
    let mut sim = Simulation::new(123);
    let receiver = Rc::new(RefCell::new(Receiver::new()));
    let receiver_id = sim.add_handler("receiver", receiver.clone());
    let ctx = sim.create_context("sender");

    let canceled = ctx.emit(Tick { seq: 0 }, receiver_id, 1.0);
    ctx.emit(Tick { seq: 1 }, receiver_id, 2.0);
    ctx.cancel_event(canceled);
    sim.step_until_no_events();

    assert_eq!(receiver.borrow().received, vec![(2.0, 1)]);
}

#[test]
fn test_cancel_events_by_predicate() {
    let mut sim = Simulation::new(123);
    let receiver = Rc::new(RefCell::new(Receiver::new()));
    let receiver_id = sim.add_handler("receiver", receiver.clone());
    let ctx = sim.create_context("sender");

    for seq in 0..4 {
        ctx.emit(Tick { seq }, receiver_id, seq as f64);
    }
    sim.cancel_events(|event| event.id >= 2);
    sim.step_until_no_events();

    let seqs: Vec<u32> = receiver.borrow().received.iter().map(|(_, seq)| *seq).collect();
    assert_eq!(seqs, vec![0, 1]);
}

#[test]
fn test_step_until_time_advances_clock() {
    let mut sim = Simulation::new(123);
    let receiver = Rc::new(RefCell::new(Receiver::new()));
    let receiver_id = sim.add_handler("receiver", receiver.clone());
    let ctx = sim.create_context("sender");

    ctx.emit(Tick { seq: 0 }, receiver_id, 10.0);
    ctx.emit(Tick { seq: 1 }, receiver_id, 30.0);

    // no events in [0, 5], clock still advances
    assert!(sim.step_until_time(5.0));
    assert_eq!(sim.time(), 5.0);
    assert!(receiver.borrow().received.is_empty());

    // the event at exactly t=10 is processed
    assert!(sim.step_until_time(10.0));
    assert_eq!(sim.time(), 10.0);
    assert_eq!(receiver.borrow().received, vec![(10.0, 0)]);

    assert!(!sim.step_until_time(40.0));
    assert_eq!(sim.time(), 40.0);
    assert_eq!(receiver.borrow().received.len(), 2);
}

#[test]
fn test_seeded_random_stream_is_reproducible() {
    let mut sim1 = Simulation::new(42);
    let mut sim2 = Simulation::new(42);
    let ctx1 = sim1.create_context("comp");
    let ctx2 = sim2.create_context("comp");

    let uids1: Vec<u128> = (0..10).map(|_| ctx1.rand_u128()).collect();
    let uids2: Vec<u128> = (0..10).map(|_| ctx2.rand_u128()).collect();
    assert_eq!(uids1, uids2);

    let mut sim3 = Simulation::new(43);
    let ctx3 = sim3.create_context("comp");
    let uids3: Vec<u128> = (0..10).map(|_| ctx3.rand_u128()).collect();
    assert_ne!(uids1, uids3);
}
