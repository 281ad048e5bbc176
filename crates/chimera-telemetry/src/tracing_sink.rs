//! A `TelemetrySink` that forwards every event to `tracing`.

use tracing::info;

use chimera_contracts::{error::ChimeraResult, telemetry::TelemetryEvent};
use chimera_core::traits::TelemetrySink;

/// Logs each event at `INFO` under the `chimera::telemetry` target.
///
/// Stateless; every lifecycle call succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn open(&self) -> ChimeraResult<()> {
        Ok(())
    }

    fn emit(&self, event: &TelemetryEvent) -> ChimeraResult<()> {
        let task_id = event.task_id.as_ref().map(|t| t.0.as_str()).unwrap_or("-");
        let worker = event.worker_id.as_ref().map(|w| w.0.as_str()).unwrap_or("-");
        info!(
            target: "chimera::telemetry",
            kind = ?event.kind,
            campaign_id = %event.campaign_id,
            task_id,
            worker,
            detail = %event.detail,
            "event"
        );
        Ok(())
    }

    fn flush(&self) -> ChimeraResult<()> {
        Ok(())
    }

    fn close(&self) -> ChimeraResult<()> {
        Ok(())
    }
}
