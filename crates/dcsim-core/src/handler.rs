//! Event handling.

use crate::event::Event;

/// Trait for consuming events in simulation components.
pub trait EventHandler {
    /// Processes an event destined for this component.
    fn on(&mut self, event: Event);
}

/// Dispatches an event to one of the listed payload types, downcasting the
/// boxed payload and destructuring its fields into the arm body.
///
/// Arms need not cover every payload type: an event matching none of them
/// is logged as unhandled under the `ERROR` level.
///
/// ```ignore
/// dispatch!(match event {
///     SomeEvent { some_field } => {
///         self.on_some_event(some_field);
///     }
/// })
/// ```
#[macro_export]
macro_rules! dispatch {
    ( match $event:ident { $( $type:ident { $($fields:tt)* } => $body:block )+ } ) => {
        $(
            if $event.data.is::<$type>() {
                if let Ok(data) = $event.data.downcast::<$type>() {
                    let $type { $($fields)* } = *data;
                    $body
                }
            } else
        )+
        {
            $crate::log::log_unhandled_event($event);
        }
    };
}
