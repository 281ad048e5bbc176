//! Scenario 4: Low-Confidence Escalation
//!
//! The generator reports confidence 0.55, below the worker's 0.7 threshold,
//! so the post is escalated instead of published. Escalations are held for
//! review: the publish task stays PENDING and the workers go idle.
//!
//! A reviewer then approves the draft with `override_escalation`. The
//! generation task becomes SUCCEEDED, the publish task is unlocked, and a
//! second round of workers finishes the campaign.

use std::sync::Arc;

use chimera_contracts::{
    error::{ChimeraError, ChimeraResult},
    task::TaskType,
};
use chimera_core::traits::{SkillGateway, SystemClock};
use chimera_telemetry::JournalSink;

use crate::{
    runtime::{self, ScenarioOutcome},
    skills::MockSkillGateway,
};

const CAMPAIGN: &str = r#"{
    "campaign_id": "camp-game-night",
    "goal": "Game Night",
    "target_audience": { "regions": ["US"] },
    "constraints": { "platforms": ["reddit"] },
    "category": "entertainment"
}"#;

const REVIEWER: &str = "brand-lead";

pub fn run_scenario() -> ChimeraResult<ScenarioOutcome> {
    println!("=== Scenario 4: Low-Confidence Escalation ===");
    println!();

    let campaign = runtime::campaign(CAMPAIGN)?;
    let graph = runtime::planner(Box::new(SystemClock))?.plan_graph(&campaign)?;
    let journal = JournalSink::new("camp-game-night");
    let orchestrator = runtime::orchestrator(graph, &journal, Box::new(SystemClock))?;

    let gateway: Arc<dyn SkillGateway> =
        Arc::new(MockSkillGateway::new().with_confidence(TaskType::ContentGeneration, 0.55));

    runtime::run_workers(&orchestrator, Arc::clone(&gateway), 2)?;

    let generation = orchestrator
        .graph()
        .manifests()
        .find(|m| m.task_type == TaskType::ContentGeneration)
        .map(|m| m.task_id.clone())
        .ok_or_else(|| ChimeraError::InvalidCampaign {
            reason: "trend-jacked batch has no generation task".to_string(),
        })?;
    println!("  Round 1:    content_generation ESCALATED (confidence 0.55 < 0.70)");
    println!("  Held:       social_publish stays PENDING; workers idle");
    println!();
    println!("  [Simulating {REVIEWER} approval...]");

    // Fails with InvalidTransition unless the task really escalated.
    let transition = orchestrator.override_escalation(&generation, REVIEWER)?;
    println!(
        "  Override:   {} → {}, {} task(s) unlocked",
        generation,
        transition.state,
        transition.unlocked.len()
    );

    runtime::run_workers(&orchestrator, gateway, 2)?;
    println!("  Round 2:    remaining work executed");

    let outcome = ScenarioOutcome::collect("escalation", &orchestrator, &journal)?;
    outcome.print();
    println!();
    Ok(outcome)
}
