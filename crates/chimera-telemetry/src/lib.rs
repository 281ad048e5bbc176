//! # chimera-telemetry
//!
//! Telemetry sinks for the Chimera orchestrator.
//!
//! The orchestrator emits one `TelemetryEvent` per lifecycle transition to
//! whatever `TelemetrySink` it was started with. This crate provides:
//!
//! - [`JournalSink`]: append-only, SHA-256 hash-chained, in memory, with an
//!   explicit open/close lifecycle. Tampering with a stored event breaks the
//!   chain and is detected by [`verify_journal`].
//! - [`TracingSink`]: forwards events to `tracing`.
//! - [`FanoutSink`]: sends every event to several sinks.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chimera_telemetry::JournalSink;
//!
//! let journal = JournalSink::new("camp-summer-26");
//! let orchestrator = Orchestrator::start(graph, validator, Box::new(journal.clone()), policy, clock)?;
//! // ... run workers ...
//! orchestrator.shutdown()?;
//! assert!(journal.verify_integrity()?);
//! ```

pub mod chain;
pub mod entry;
pub mod fanout;
pub mod journal;
pub mod tracing_sink;

pub use chain::{hash_entry, verify_journal};
pub use entry::{JournalEntry, TelemetryJournal};
pub use fanout::FanoutSink;
pub use journal::JournalSink;
pub use tracing_sink::TracingSink;

// ── Tests ─────────────────────────────────────────────────────────────────────
