//! Scenario 3: Failure Recovery
//!
//! Shows how the recovery policy turns one failed task into a campaign
//! decision.
//!
//! Sub-case A: the trend fetch fails. The policy aborts the campaign, and
//!             generation and publishing are cancelled without ever running.
//! Sub-case B: TikTok's API is down during a reviewed launch. No rule matches
//!             a failed publish, so the policy blocks. The failure is
//!             contained to that branch and the other platforms still publish.

use std::sync::Arc;

use chimera_contracts::{error::ChimeraResult, lifecycle::TaskState, task::TaskType};
use chimera_core::traits::SystemClock;
use chimera_telemetry::JournalSink;

use crate::{
    runtime::{self, ScenarioOutcome},
    skills::MockSkillGateway,
};

const FETCH_CAMPAIGN: &str = r#"{
    "campaign_id": "camp-flash-sale",
    "goal": "Flash Sale",
    "target_audience": { "regions": ["US"] },
    "constraints": { "platforms": ["twitter"] },
    "category": "business"
}"#;

const LAUNCH_CAMPAIGN: &str = r#"{
    "campaign_id": "camp-sneaker-launch",
    "goal": "Sneaker launch",
    "target_audience": { "regions": ["US"] },
    "constraints": { "platforms": ["twitter", "instagram", "tiktok"] },
    "intent": "reviewed_launch",
    "category": "sports"
}"#;

/// Sub-case A: a failed fetch aborts the campaign.
pub fn run_fetch_failure() -> ChimeraResult<ScenarioOutcome> {
    println!("  ── Sub-case A: trend fetch fails → abort ──");
    println!();

    let campaign = runtime::campaign(FETCH_CAMPAIGN)?;
    let graph = runtime::planner(Box::new(SystemClock))?.plan_graph(&campaign)?;
    let journal = JournalSink::new("camp-flash-sale");
    let orchestrator = runtime::orchestrator(graph, &journal, Box::new(SystemClock))?;

    let gateway = MockSkillGateway::new().failing(TaskType::AnalyticsFetch);
    runtime::run_workers(&orchestrator, Arc::new(gateway), 2)?;

    let outcome = ScenarioOutcome::collect("failure-recovery/fetch", &orchestrator, &journal)?;
    outcome.print();
    println!(
        "  Result:     campaign aborted, {} task(s) cancelled",
        outcome.count(TaskState::Cancelled)
    );
    println!();
    Ok(outcome)
}

/// Sub-case B: a failed publish blocks only its own branch.
pub fn run_platform_outage() -> ChimeraResult<ScenarioOutcome> {
    println!("  ── Sub-case B: TikTok publish fails → block ──");
    println!();

    let campaign = runtime::campaign(LAUNCH_CAMPAIGN)?;
    let graph = runtime::planner(Box::new(SystemClock))?.plan_graph(&campaign)?;
    let journal = JournalSink::new("camp-sneaker-launch");
    let orchestrator = runtime::orchestrator(graph, &journal, Box::new(SystemClock))?;

    let gateway = MockSkillGateway::new().platform_offline("tiktok");
    runtime::run_workers(&orchestrator, Arc::new(gateway), 3)?;

    let outcome = ScenarioOutcome::collect("failure-recovery/publish", &orchestrator, &journal)?;
    outcome.print();
    println!(
        "  Result:     {} succeeded, {} failed; siblings unaffected",
        outcome.count(TaskState::Succeeded),
        outcome.count(TaskState::Failed)
    );
    println!();
    Ok(outcome)
}

pub fn run_scenario() -> ChimeraResult<ScenarioOutcome> {
    println!("=== Scenario 3: Failure Recovery ===");
    println!();
    let fetch = run_fetch_failure()?;
    let outage = run_platform_outage()?;
    Ok(ScenarioOutcome {
        name: "failure-recovery",
        ..fetch.then(outage)
    })
}

#[cfg(test)]
mod tests {
    use chimera_contracts::{
        lifecycle::TaskState,
        task::TaskType,
        telemetry::TelemetryEventKind,
    };

    #[test]
    fn failed_fetch_aborts_everything_downstream() {
        let outcome = super::run_fetch_failure().unwrap();
        assert_eq!(outcome.states_of(TaskType::AnalyticsFetch), vec![TaskState::Failed]);
        assert_eq!(
            outcome.states_of(TaskType::ContentGeneration),
            vec![TaskState::Cancelled]
        );
        assert_eq!(outcome.states_of(TaskType::SocialPublish), vec![TaskState::Cancelled]);
        assert!(outcome
            .events
            .iter()
            .any(|e| e.kind == TelemetryEventKind::CampaignAborted));
        // Cancelled tasks were never claimed.
        let claims = outcome
            .events
            .iter()
            .filter(|e| e.kind == TelemetryEventKind::TaskClaimed)
            .count();
        assert_eq!(claims, 1);
        assert!(outcome.journal_verified);
    }

    #[test]
    fn platform_outage_is_contained_to_its_branch() {
        let outcome = super::run_platform_outage().unwrap();
        let publishes = outcome.states_of(TaskType::SocialPublish);
        assert_eq!(publishes.len(), 3);
        assert_eq!(
            publishes.iter().filter(|s| **s == TaskState::Succeeded).count(),
            2
        );
        assert_eq!(
            publishes.iter().filter(|s| **s == TaskState::Failed).count(),
            1
        );
        assert_eq!(outcome.count(TaskState::Cancelled), 0);
        assert!(!outcome
            .events
            .iter()
            .any(|e| e.kind == TelemetryEventKind::CampaignAborted));
    }
}
