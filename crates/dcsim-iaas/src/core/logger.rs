//! Logging facilities to record service activity during simulation.

use std::fs::File;

use log::Level;
use serde::Serialize;

use dcsim_core::sim_log;
use dcsim_core::SimulationContext;

/// Tracer injected into the provisioning service.
pub trait Logger {
    fn log_error(&mut self, ctx: &SimulationContext, log: String);

    fn log_warn(&mut self, ctx: &SimulationContext, log: String);

    fn log_info(&mut self, ctx: &SimulationContext, log: String);

    fn log_debug(&mut self, ctx: &SimulationContext, log: String);

    fn log_trace(&mut self, ctx: &SimulationContext, log: String);

    fn save_log(&self, _path: &str) -> Result<(), std::io::Error> {
        Ok(())
    }
}

/// Forwards everything to the standard log facade.
#[derive(Default)]
pub struct StdoutLogger {}

impl StdoutLogger {
    pub fn new() -> Self {
        Self {}
    }

    fn log_internal(&self, ctx: &SimulationContext, message: String, level: Level) {
        sim_log!(level, ctx, "{}", message);
    }
}

impl Logger for StdoutLogger {
    fn log_error(&mut self, ctx: &SimulationContext, log: String) {
        self.log_internal(ctx, log, Level::Error);
    }

    fn log_warn(&mut self, ctx: &SimulationContext, log: String) {
        self.log_internal(ctx, log, Level::Warn);
    }

    fn log_info(&mut self, ctx: &SimulationContext, log: String) {
        self.log_internal(ctx, log, Level::Info);
    }

    fn log_debug(&mut self, ctx: &SimulationContext, log: String) {
        self.log_internal(ctx, log, Level::Debug);
    }

    fn log_trace(&mut self, ctx: &SimulationContext, log: String) {
        self.log_internal(ctx, log, Level::Trace);
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct LogEntry {
    pub timestamp: f64,
    pub component: String,
    pub level: String,
    pub message: String,
}

/// Collects log entries in memory, optionally saving them as JSON.
#[derive(Default)]
pub struct MemoryLogger {
    entries: Vec<LogEntry>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    fn log_internal(&mut self, ctx: &SimulationContext, message: String, level: &str) {
        self.entries.push(LogEntry {
            timestamp: ctx.time(),
            component: ctx.name().to_string(),
            level: level.to_string(),
            message,
        });
    }
}

impl Logger for MemoryLogger {
    fn log_error(&mut self, ctx: &SimulationContext, log: String) {
        self.log_internal(ctx, log, "ERROR");
    }

    fn log_warn(&mut self, ctx: &SimulationContext, log: String) {
        self.log_internal(ctx, log, "WARN");
    }

    fn log_info(&mut self, ctx: &SimulationContext, log: String) {
        self.log_internal(ctx, log, "INFO");
    }

    fn log_debug(&mut self, ctx: &SimulationContext, log: String) {
        self.log_internal(ctx, log, "DEBUG");
    }

    fn log_trace(&mut self, ctx: &SimulationContext, log: String) {
        self.log_internal(ctx, log, "TRACE");
    }

    fn save_log(&self, path: &str) -> Result<(), std::io::Error> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, &self.entries)?;
        Ok(())
    }
}
