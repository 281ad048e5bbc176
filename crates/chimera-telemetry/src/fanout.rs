//! Broadcast every telemetry call to several sinks.

use chimera_contracts::{error::ChimeraResult, telemetry::TelemetryEvent};
use chimera_core::traits::TelemetrySink;

/// Forwards each call to every inner sink, in order.
///
/// One failing sink does not starve the others: every sink is called, and the
/// first error seen is returned afterwards.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn TelemetrySink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Box<dyn TelemetrySink>) -> Self {
        self.sinks.push(sink);
        self
    }

    fn each(&self, f: impl Fn(&dyn TelemetrySink) -> ChimeraResult<()>) -> ChimeraResult<()> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = f(sink.as_ref()) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl TelemetrySink for FanoutSink {
    fn open(&self) -> ChimeraResult<()> {
        self.each(|s| s.open())
    }

    fn emit(&self, event: &TelemetryEvent) -> ChimeraResult<()> {
        self.each(|s| s.emit(event))
    }

    fn flush(&self) -> ChimeraResult<()> {
        self.each(|s| s.flush())
    }

    fn close(&self) -> ChimeraResult<()> {
        self.each(|s| s.close())
    }
}
