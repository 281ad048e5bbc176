//! Scenario 1: Trend-Jacked Post
//!
//! The default decomposition on the happy path:
//!
//!   analytics_fetch → content_generation → social_publish
//!
//! Three workers race for tasks, but the chain only ever has one READY task,
//! so they execute strictly in dependency order.

use std::sync::Arc;

use chimera_contracts::error::ChimeraResult;
use chimera_core::traits::SystemClock;
use chimera_telemetry::JournalSink;

use crate::{
    runtime::{self, ScenarioOutcome},
    skills::MockSkillGateway,
};

const CAMPAIGN: &str = r#"{
    "campaign_id": "camp-summer-drop",
    "name": "Summer Drop",
    "goal": "Summer Drop",
    "budget_limit_usd": 500.0,
    "target_audience": { "regions": ["US"], "demographics": ["GenZ"] },
    "constraints": { "platforms": ["instagram"] },
    "category": "fashion"
}"#;

pub fn run_scenario() -> ChimeraResult<ScenarioOutcome> {
    println!("=== Scenario 1: Trend-Jacked Post ===");
    println!();

    let campaign = runtime::campaign(CAMPAIGN)?;
    let graph = runtime::planner(Box::new(SystemClock))?.plan_graph(&campaign)?;
    println!("  Campaign:   camp-summer-drop (intent: trend_jacked)");
    println!("  Planned:    {} task(s), {} edge(s)", graph.len(), graph.edge_count());

    let journal = JournalSink::new("camp-summer-drop");
    let orchestrator = runtime::orchestrator(graph, &journal, Box::new(SystemClock))?;
    let executed = runtime::run_workers(&orchestrator, Arc::new(MockSkillGateway::new()), 3)?;
    println!("  Executed:   {executed} task(s) across 3 workers");

    let outcome = ScenarioOutcome::collect("trend-jacked", &orchestrator, &journal)?;
    outcome.print();
    println!();
    Ok(outcome)
}
