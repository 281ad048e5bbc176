//! # chimera-ref-campaign
//!
//! Reference campaign runtime for the Chimera planner and orchestrator.
//!
//! Demonstrates five lifecycle scenarios using mock skills:
//!
//! 1. **Trend-Jacked Post**: the default fetch → generate → publish chain.
//! 2. **Reviewed Launch**: fan-out trend fetches, a brand-safety review gate,
//!    and parallel publishing across platforms.
//! 3. **Failure Recovery**: a failed fetch aborts the campaign; a failed
//!    publish is contained to its own branch.
//! 4. **Escalation**: a low-confidence draft waits for a reviewer override.
//! 5. **Timeout**: a stalled worker's task times out and the campaign is
//!    re-planned with fresh task ids.
//!
//! All data is hardcoded and fictional. No external API calls are made.

pub mod mock_data;
pub mod runtime;
pub mod scenarios;
pub mod skills;
pub mod strategies;

pub use runtime::ScenarioOutcome;
pub use skills::MockSkillGateway;
pub use strategies::{ReviewedLaunchStrategy, REVIEWED_LAUNCH_INTENT};
