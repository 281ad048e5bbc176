//! Journal entry and exported journal types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chimera_contracts::telemetry::TelemetryEvent;

/// One telemetry event, numbered and linked to its predecessor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Position in the stream, starting at 0.
    pub sequence: u64,
    pub stream: String,
    pub event: TelemetryEvent,
    /// `this_hash` of the previous entry, or `GENESIS_HASH` for the first.
    pub prev_hash: String,
    pub this_hash: String,
}

impl JournalEntry {
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// A snapshot of a journal, as handed to downstream review tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryJournal {
    pub stream: String,
    pub entries: Vec<JournalEntry>,
    pub exported_at: DateTime<Utc>,
    /// `this_hash` of the last entry. Empty when nothing was recorded.
    pub terminal_hash: String,
    /// True once the sink was closed; later emissions were refused.
    pub sealed: bool,
}
