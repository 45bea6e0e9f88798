//! Simulation events.

use downcast_rs::{impl_downcast, Downcast};
use dyn_clone::{clone_trait_object, DynClone};
use serde::ser::Serialize;

use crate::Id;

/// Event identifier, assigned sequentially starting from 0.
pub type EventId = u64;

/// Trait implemented by event payloads.
///
/// Payloads must be serializable (for event tracing), cloneable (so that the
/// same payload can be fanned out to several destinations) and downcastable
/// (so that handlers can match on the concrete type via `dispatch!`). Any
/// `Clone + Serialize` type qualifies automatically.
pub trait EventData: Downcast + DynClone + erased_serde::Serialize {}

impl_downcast!(EventData);

clone_trait_object!(EventData);

erased_serde::serialize_trait_object!(EventData);

impl<T: Serialize + DynClone + 'static> EventData for T {}

/// An event scheduled for delivery at some point of simulation time.
///
/// Events are plain data: the delivery order (by time, with ties broken by
/// id) is a concern of the simulation state, not of the event itself.
#[derive(Clone)]
pub struct Event {
    /// Unique event identifier.
    pub id: EventId,
    /// Time of event occurrence.
    pub time: f64,
    /// Identifier of the event source.
    pub src: Id,
    /// Identifier of the event destination.
    pub dest: Id,
    /// Event payload.
    pub data: Box<dyn EventData>,
}
