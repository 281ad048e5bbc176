//! Reference campaign scenarios.
//!
//! Each scenario plans a campaign with the real planner and schema
//! validator, drives it through an orchestrator with a pool of workers over
//! `MockSkillGateway`, and shows one lifecycle pattern end to end.

pub mod escalation;
pub mod failure_recovery;
pub mod reviewed_launch;
pub mod timeout;
pub mod trend_jacked;
