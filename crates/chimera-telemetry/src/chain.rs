//! Hash-chain primitives for the telemetry journal.
//!
//! Hash input layout (bytes, in order):
//!   1. stream name as UTF-8 bytes
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. compact JSON of the event

use sha2::{Digest, Sha256};

use chimera_contracts::{
    error::{ChimeraError, ChimeraResult},
    telemetry::TelemetryEvent,
};

use crate::entry::JournalEntry;

/// SHA-256 over one journal entry's position, link and event.
///
/// Returns a lowercase 64-character hex string.
pub fn hash_entry(
    stream: &str,
    sequence: u64,
    event: &TelemetryEvent,
    prev_hash: &str,
) -> ChimeraResult<String> {
    let event_json = serde_json::to_vec(event).map_err(|e| ChimeraError::Telemetry {
        reason: format!("event {sequence} could not be serialized: {e}"),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(stream.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&event_json);

    Ok(hex::encode(hasher.finalize()))
}

/// True when every entry links to its predecessor and its stored hash
/// matches the recomputed one. An empty journal is valid.
pub fn verify_journal(entries: &[JournalEntry]) -> bool {
    let mut expected_prev = JournalEntry::GENESIS_HASH.to_string();

    for (position, entry) in entries.iter().enumerate() {
        if entry.sequence != position as u64 || entry.prev_hash != expected_prev {
            return false;
        }
        match hash_entry(&entry.stream, entry.sequence, &entry.event, &entry.prev_hash) {
            Ok(recomputed) if recomputed == entry.this_hash => {}
            _ => return false,
        }
        expected_prev = entry.this_hash.clone();
    }

    true
}
