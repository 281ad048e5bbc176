//! In-memory, hash-chained implementation of `TelemetrySink`.
//!
//! `JournalSink` keeps every event in a `Vec` behind `Arc<Mutex<_>>`. Clone
//! the sink before handing it to the orchestrator and keep the clone as a
//! read handle: both see the same journal.
//!
//! The sink has an explicit lifecycle. Events are accepted only between
//! `open()` and `close()`; anything emitted outside that window is refused
//! with a `Telemetry` error, which the orchestrator logs and ignores.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info};

use chimera_contracts::{
    error::{ChimeraError, ChimeraResult},
    telemetry::TelemetryEvent,
};
use chimera_core::traits::TelemetrySink;

use crate::{
    chain::{hash_entry, verify_journal},
    entry::{JournalEntry, TelemetryJournal},
};

// ── Internal mutable state ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Created,
    Open,
    Closed,
}

pub(crate) struct JournalState {
    pub(crate) entries: Vec<JournalEntry>,
    pub(crate) last_hash: String,
    pub(crate) phase: Phase,
    pub(crate) flushes: u64,
}

// ── Public sink ───────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct JournalSink {
    stream: String,
    pub(crate) state: Arc<Mutex<JournalState>>,
}

impl JournalSink {
    pub fn new(stream: impl Into<String>) -> Self {
        let state = JournalState {
            entries: Vec::new(),
            last_hash: JournalEntry::GENESIS_HASH.to_string(),
            phase: Phase::Created,
            flushes: 0,
        };
        Self {
            stream: stream.into(),
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// The recorded events, in emission order.
    pub fn events(&self) -> ChimeraResult<Vec<TelemetryEvent>> {
        Ok(self.lock()?.entries.iter().map(|e| e.event.clone()).collect())
    }

    pub fn len(&self) -> ChimeraResult<usize> {
        Ok(self.lock()?.entries.len())
    }

    pub fn is_empty(&self) -> ChimeraResult<bool> {
        Ok(self.lock()?.entries.is_empty())
    }

    pub fn is_open(&self) -> ChimeraResult<bool> {
        Ok(self.lock()?.phase == Phase::Open)
    }

    /// Number of successful `flush()` calls.
    pub fn flush_count(&self) -> ChimeraResult<u64> {
        Ok(self.lock()?.flushes)
    }

    /// Snapshot the journal for downstream review.
    pub fn export(&self) -> ChimeraResult<TelemetryJournal> {
        let state = self.lock()?;
        let terminal_hash = state
            .entries
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();
        Ok(TelemetryJournal {
            stream: self.stream.clone(),
            entries: state.entries.clone(),
            exported_at: Utc::now(),
            terminal_hash,
            sealed: state.phase == Phase::Closed,
        })
    }

    /// Recompute the chain and confirm nothing was altered in memory.
    pub fn verify_integrity(&self) -> ChimeraResult<bool> {
        Ok(verify_journal(&self.lock()?.entries))
    }

    fn lock(&self) -> ChimeraResult<MutexGuard<'_, JournalState>> {
        self.state.lock().map_err(|e| ChimeraError::Telemetry {
            reason: format!("journal lock poisoned: {e}"),
        })
    }

    fn refuse(&self, operation: &str, phase: Phase) -> ChimeraError {
        ChimeraError::Telemetry {
            reason: format!("journal '{}' cannot {operation} while {phase:?}", self.stream),
        }
    }
}

// ── TelemetrySink impl ────────────────────────────────────────────────────────

impl TelemetrySink for JournalSink {
    fn open(&self) -> ChimeraResult<()> {
        let mut state = self.lock()?;
        if state.phase != Phase::Created {
            return Err(self.refuse("open", state.phase));
        }
        state.phase = Phase::Open;
        debug!(stream = %self.stream, "telemetry journal opened");
        Ok(())
    }

    fn emit(&self, event: &TelemetryEvent) -> ChimeraResult<()> {
        let mut state = self.lock()?;
        if state.phase != Phase::Open {
            return Err(self.refuse("record events", state.phase));
        }

        let sequence = state.entries.len() as u64;
        let prev_hash = state.last_hash.clone();
        let this_hash = hash_entry(&self.stream, sequence, event, &prev_hash)?;

        state.entries.push(JournalEntry {
            sequence,
            stream: self.stream.clone(),
            event: event.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.last_hash = this_hash;
        Ok(())
    }

    /// Nothing is buffered outside the journal itself, so a flush only
    /// records that one happened.
    fn flush(&self) -> ChimeraResult<()> {
        let mut state = self.lock()?;
        if state.phase != Phase::Open {
            return Err(self.refuse("flush", state.phase));
        }
        state.flushes += 1;
        Ok(())
    }

    fn close(&self) -> ChimeraResult<()> {
        let mut state = self.lock()?;
        if state.phase != Phase::Open {
            return Err(self.refuse("close", state.phase));
        }
        state.phase = Phase::Closed;
        info!(
            stream = %self.stream,
            event_count = state.entries.len(),
            terminal_hash = %state.last_hash,
            "telemetry journal sealed"
        );
        Ok(())
    }
}
