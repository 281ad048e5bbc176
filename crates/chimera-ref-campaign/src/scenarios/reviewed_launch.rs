//! Scenario 2: Reviewed Multi-Platform Launch
//!
//! Fan-out/fan-in on the happy path. Three trend fetches run in parallel,
//! one generation task merges them, a brand-safety review gates the post,
//! and three publishes go out in parallel.

use std::sync::Arc;

use chimera_contracts::{error::ChimeraResult, lifecycle::TaskState, task::TaskType};
use chimera_core::traits::SystemClock;
use chimera_telemetry::JournalSink;

use crate::{
    runtime::{self, ScenarioOutcome},
    skills::MockSkillGateway,
};

const CAMPAIGN: &str = r#"{
    "campaign_id": "camp-autumn-capsule",
    "name": "Autumn Capsule",
    "goal": "Autumn Capsule launch",
    "budget_limit_usd": 2000.0,
    "target_audience": { "regions": ["EU", "US"], "demographics": ["Millennials"] },
    "constraints": { "platforms": ["twitter", "instagram", "tiktok"] },
    "intent": "reviewed_launch",
    "category": "fashion"
}"#;

pub fn run_scenario() -> ChimeraResult<ScenarioOutcome> {
    println!("=== Scenario 2: Reviewed Multi-Platform Launch ===");
    println!();

    let campaign = runtime::campaign(CAMPAIGN)?;
    let graph = runtime::planner(Box::new(SystemClock))?.plan_graph(&campaign)?;
    println!("  Campaign:   camp-autumn-capsule (intent: reviewed_launch)");
    println!("  Platforms:  twitter, instagram, tiktok");
    println!("  Planned:    {} task(s), {} edge(s)", graph.len(), graph.edge_count());

    let journal = JournalSink::new("camp-autumn-capsule");
    let orchestrator = runtime::orchestrator(graph, &journal, Box::new(SystemClock))?;
    println!(
        "  Ready at start: {} fetch(es)",
        orchestrator.ready_tasks()?.len()
    );

    let executed = runtime::run_workers(&orchestrator, Arc::new(MockSkillGateway::new()), 4)?;
    println!("  Executed:   {executed} task(s) across 4 workers");

    let outcome = ScenarioOutcome::collect("reviewed-launch", &orchestrator, &journal)?;
    outcome.print();
    println!(
        "  Published:  {}/3",
        outcome
            .states_of(TaskType::SocialPublish)
            .iter()
            .filter(|s| **s == TaskState::Succeeded)
            .count()
    );
    println!();
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use chimera_contracts::{lifecycle::TaskState, task::TaskType};

    #[test]
    fn every_platform_is_published_after_review() {
        let outcome = super::run_scenario().unwrap();
        assert_eq!(outcome.tasks.len(), 8);
        assert_eq!(outcome.count(TaskState::Succeeded), 8);
        assert_eq!(outcome.states_of(TaskType::SocialPublish).len(), 3);

        // Topological order puts the review ahead of every publish.
        let review_at = outcome
            .tasks
            .iter()
            .position(|(_, t, _)| *t == TaskType::ContentReview)
            .unwrap();
        let first_publish = outcome
            .tasks
            .iter()
            .position(|(_, t, _)| *t == TaskType::SocialPublish)
            .unwrap();
        assert!(review_at < first_publish);
        assert!(outcome.journal_verified);
    }
}
