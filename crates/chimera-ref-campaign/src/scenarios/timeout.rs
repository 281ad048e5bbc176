//! Scenario 5: Stalled Worker and Re-plan
//!
//! A worker claims the trend fetch and never reports back. After the fetch's
//! 300 second timeout the orchestrator marks it TIMED_OUT, exactly once, and
//! the recovery policy answers `replan`: generation and publishing are
//! cancelled. The stalled worker's late result is refused.
//!
//! The campaign is then decomposed again. The new batch carries fresh task
//! ids and runs to completion on a healthy worker pool.
//!
//! Time is driven by a `SteppedClock`, so the scenario never actually waits.

use std::sync::Arc;

use chrono::{Duration, Utc};

use chimera_contracts::{
    error::{ChimeraError, ChimeraResult},
    recovery::RecoveryAction,
    result::AgentTaskResult,
    task::WorkerId,
};
use chimera_core::traits::{Clock, SkillGateway};
use chimera_telemetry::JournalSink;

use crate::{
    runtime::{self, ScenarioOutcome, SteppedClock},
    skills::MockSkillGateway,
};

const CAMPAIGN: &str = r#"{
    "campaign_id": "camp-trend-watch",
    "goal": "Trend Watch",
    "target_audience": { "regions": ["US"] },
    "constraints": { "platforms": ["twitter"] },
    "category": "tech"
}"#;

pub fn run_scenario() -> ChimeraResult<ScenarioOutcome> {
    println!("=== Scenario 5: Stalled Worker and Re-plan ===");
    println!();

    let clock = SteppedClock::new(Utc::now());
    let gateway: Arc<dyn SkillGateway> = Arc::new(MockSkillGateway::new());
    let campaign = runtime::campaign(CAMPAIGN)?;
    let planner = runtime::planner(Box::new(clock.clone()))?;

    // ── Attempt 1: the fetch stalls ───────────────────────────────────────────

    let graph = planner.plan_graph(&campaign)?;
    let journal = JournalSink::new("camp-trend-watch/attempt-1");
    let orchestrator = runtime::orchestrator(graph, &journal, Box::new(clock.clone()))?;

    let stalled = WorkerId("worker-stalled".to_string());
    let fetch = orchestrator
        .claim(&stalled)?
        .ok_or_else(|| ChimeraError::InvalidCampaign {
            reason: "no task was ready at start".to_string(),
        })?;
    println!("  Attempt 1:  {} claimed {} and went silent", stalled, fetch.task_type);

    clock.advance(Duration::seconds(i64::from(fetch.timeout_seconds)));
    println!(
        "  t+{}s:      timed out? {}",
        fetch.timeout_seconds,
        !orchestrator.check_timeouts()?.is_empty()
    );

    clock.advance(Duration::seconds(1));
    let transitions = orchestrator.check_timeouts()?;
    for transition in &transitions {
        println!(
            "  t+{}s:      {} {}; recovery {:?}; {} cancelled",
            fetch.timeout_seconds + 1,
            transition.task_id,
            transition.state,
            transition.recovery,
            transition.cancelled.len()
        );
    }
    println!(
        "  Re-check:   {} further timeout(s)",
        orchestrator.check_timeouts()?.len()
    );

    let late = gateway.invoke(&fetch)?;
    let late = AgentTaskResult::success(
        fetch.task_id.clone(),
        stalled,
        clock.now(),
        late.confidence,
        late.output,
    )?;
    match orchestrator.submit(&late) {
        Err(e) => println!("  Late result refused: {e}"),
        Ok(outcome) => println!("  UNEXPECTED late result accepted: {:?}", outcome),
    }

    let replan = transitions
        .iter()
        .any(|t| matches!(t.recovery, Some(RecoveryAction::Replan { .. })));
    let first = ScenarioOutcome::collect("timeout", &orchestrator, &journal)?;
    first.print();
    println!();
    if !replan {
        return Ok(first);
    }

    // ── Attempt 2: fresh batch ────────────────────────────────────────────────

    let graph = planner.plan_graph(&campaign)?;
    let journal = JournalSink::new("camp-trend-watch/attempt-2");
    let orchestrator = runtime::orchestrator(graph, &journal, Box::new(clock.clone()))?;
    let executed = runtime::run_workers(&orchestrator, gateway, 2)?;
    println!("  Attempt 2:  re-planned; {executed} task(s) executed");

    let second = ScenarioOutcome::collect("timeout", &orchestrator, &journal)?;
    second.print();
    println!();
    Ok(first.then(second))
}
