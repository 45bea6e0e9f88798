//! Logging facilities.

use atty::Stream;
use colored::{Color, ColoredString, Colorize};
use log::{error, trace, Level};
use serde_json::json;
use serde_type_name::type_name;

use crate::event::Event;

/// Applies the color to the string if stderr (log) goes to a console.
pub fn get_colored(s: &str, color: Color) -> ColoredString {
    if atty::is(Stream::Stderr) {
        s.color(color)
    } else {
        s.normal()
    }
}

/// Returns the colored, width-padded tag for a log level.
pub fn colored_level(level: Level) -> ColoredString {
    let color = match level {
        Level::Error => Color::Red,
        Level::Warn => Color::Yellow,
        Level::Info => Color::Green,
        Level::Debug => Color::Blue,
        Level::Trace => Color::Cyan,
    };
    get_colored(&format!("{:<5}", level), color)
}

/// Logs a message at the given level, prefixed with the current simulation
/// time and the component name taken from the context.
///
/// The level is an ordinary [`log::Level`] expression, so the same macro
/// serves every severity:
///
/// `sim_log!(log::Level::Debug, self.ctx, "vm {} started", vm_id);`
#[macro_export]
macro_rules! sim_log {
    ($level:expr, $ctx:expr, $($arg:tt)+) => (
        log::log!(
            target: $ctx.name(),
            $level,
            "[{:.3} {} {}] {}",
            $ctx.time(),
            $crate::log::colored_level($level),
            $ctx.name(),
            format_args!($($arg)+)
        )
    );
}

fn event_json(event: &Event) -> serde_json::Value {
    json!({
        "type": type_name(&event.data).unwrap(),
        "data": event.data,
        "src": event.src,
        "dest": event.dest,
    })
}

// Per-delivery trace emitted by Simulation::step when trace logging is on.
pub(crate) fn trace_event(event: &Event, src_name: &str, dest_name: &str) {
    trace!(
        target: dest_name,
        "[{:.3} {} {}] {}",
        event.time,
        get_colored("EVENT", Color::BrightBlack),
        dest_name,
        json!({"type": type_name(&event.data).unwrap(), "data": event.data, "src": src_name})
    );
}

fn log_dropped_event(event: Event, reason: &str) {
    error!(
        target: "simulation",
        "[{:.3} {} simulation] {} event: {}",
        event.time,
        get_colored("ERROR", Color::Red),
        reason,
        event_json(&event)
    );
}

/// Logs an event which matched no arm of a `dispatch!` invocation.
pub fn log_unhandled_event(event: Event) {
    log_dropped_event(event, "unhandled");
}

/// Logs an event whose destination has no registered handler.
pub(crate) fn log_undelivered_event(event: Event) {
    log_dropped_event(event, "undelivered");
}
