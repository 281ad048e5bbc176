//! # chimera-core
//!
//! Campaign decomposition and task orchestration for the Chimera agent swarm.
//!
//! This crate provides:
//! - The seams the runtime is built around (`ContractValidator`,
//!   `DecompositionStrategy`, `TelemetrySink`, `RecoveryPolicy`,
//!   `SkillGateway`, `Clock`)
//! - `CampaignPlanner`, which turns a campaign into a validated task batch
//! - `TaskGraph`, the dependency DAG over a batch
//! - `Orchestrator`, which drives every task to a terminal state
//! - `Worker`, a claim/execute/report loop over a `SkillGateway`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chimera_core::{CampaignPlanner, Orchestrator, Worker};
//! ```

pub mod graph;
pub mod orchestrator;
pub mod planner;
pub mod strategy;
pub mod traits;
pub mod worker;

pub use graph::TaskGraph;
pub use orchestrator::{Orchestrator, SubmissionOutcome, Transition};
pub use planner::{CampaignPlanner, DEFAULT_PLANNER_ID};
pub use strategy::{TrendJackedStrategy, TREND_JACKED_INTENT};
pub use worker::Worker;
