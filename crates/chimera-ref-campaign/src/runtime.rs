//! Wiring shared by the scenarios: planner, orchestrator, worker pool and a
//! controllable clock.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use chimera_contracts::{
    campaign::CampaignManifest,
    error::{ChimeraError, ChimeraResult},
    lifecycle::TaskState,
    task::{PlannerId, TaskId, TaskType, WorkerId},
    telemetry::TelemetryEvent,
};
use chimera_core::{
    traits::{Clock, SkillGateway},
    CampaignPlanner, Orchestrator, TaskGraph, Worker, DEFAULT_PLANNER_ID,
};
use chimera_policy::TomlRecoveryPolicy;
use chimera_telemetry::{FanoutSink, JournalSink, TracingSink};
use chimera_verify::SchemaValidator;

use crate::strategies::{ReviewedLaunchStrategy, REVIEWED_LAUNCH_INTENT};

const RECOVERY_POLICY: &str = include_str!("../policies/recovery.toml");

// ── Clock ─────────────────────────────────────────────────────────────────────

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct SteppedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl SteppedClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = match self.now.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *now += by;
    }
}

impl Clock for SteppedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

// ── Wiring ────────────────────────────────────────────────────────────────────

/// Parse one of the scenario campaigns.
pub fn campaign(json: &str) -> ChimeraResult<CampaignManifest> {
    CampaignManifest::from_json(json)
}

/// A schema-validating planner serving `trend_jacked` and `reviewed_launch`.
pub fn planner(clock: Box<dyn Clock>) -> ChimeraResult<CampaignPlanner> {
    let mut planner = CampaignPlanner::new(
        PlannerId(DEFAULT_PLANNER_ID.to_string()),
        Box::new(SchemaValidator::new()?),
    )
    .with_clock(clock);
    planner.register(
        REVIEWED_LAUNCH_INTENT,
        Box::new(ReviewedLaunchStrategy::default()),
    );
    Ok(planner)
}

/// Start an orchestrator over `graph` that journals into `journal`, mirrors
/// events to `tracing`, and recovers according to the bundled policy.
pub fn orchestrator(
    graph: TaskGraph,
    journal: &JournalSink,
    clock: Box<dyn Clock>,
) -> ChimeraResult<Orchestrator> {
    let sink = FanoutSink::new()
        .with(Box::new(journal.clone()))
        .with(Box::new(TracingSink));
    Orchestrator::start(
        graph,
        Box::new(SchemaValidator::new()?),
        Box::new(sink),
        Box::new(TomlRecoveryPolicy::from_toml_str(RECOVERY_POLICY)?),
        clock,
    )
}

/// Run `count` workers on their own threads until the campaign settles.
/// Returns the number of tasks executed across all of them.
pub fn run_workers(
    orchestrator: &Orchestrator,
    gateway: Arc<dyn SkillGateway>,
    count: usize,
) -> ChimeraResult<usize> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..count)
            .map(|i| {
                let worker = Worker::new(WorkerId(format!("worker-{i:02}")), Arc::clone(&gateway));
                scope.spawn(move || worker.run(orchestrator))
            })
            .collect();

        let mut executed = 0;
        for handle in handles {
            executed += handle.join().map_err(|_| ChimeraError::StateUnavailable {
                reason: "worker thread panicked".to_string(),
            })??;
        }
        Ok(executed)
    })
}

// ── Outcome ───────────────────────────────────────────────────────────────────

/// What a scenario left behind, for printing and assertions.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub name: &'static str,
    /// Every task with its final state, in topological order.
    pub tasks: Vec<(TaskId, TaskType, TaskState)>,
    pub events: Vec<TelemetryEvent>,
    /// Whether every journal the scenario wrote verified intact.
    pub journal_verified: bool,
}

impl ScenarioOutcome {
    /// Shut `orchestrator` down and collect its final picture.
    pub fn collect(
        name: &'static str,
        orchestrator: &Orchestrator,
        journal: &JournalSink,
    ) -> ChimeraResult<Self> {
        orchestrator.shutdown()?;
        let graph = orchestrator.graph();
        let tasks = orchestrator
            .snapshot()?
            .into_iter()
            .filter_map(|(id, state)| {
                graph
                    .manifest(&id)
                    .map(|m| (id.clone(), m.task_type, state))
            })
            .collect();
        Ok(Self {
            name,
            tasks,
            events: journal.events()?,
            journal_verified: journal.verify_integrity()?,
        })
    }

    /// Append a later attempt at the same campaign.
    pub fn then(mut self, next: ScenarioOutcome) -> Self {
        self.tasks.extend(next.tasks);
        self.events.extend(next.events);
        self.journal_verified &= next.journal_verified;
        self
    }

    pub fn count(&self, state: TaskState) -> usize {
        self.tasks.iter().filter(|(_, _, s)| *s == state).count()
    }

    /// States of every task of `task_type`, in order.
    pub fn states_of(&self, task_type: TaskType) -> Vec<TaskState> {
        self.tasks
            .iter()
            .filter(|(_, t, _)| *t == task_type)
            .map(|(_, _, s)| *s)
            .collect()
    }

    pub fn print(&self) {
        for (id, task_type, state) in &self.tasks {
            println!("    {:<20} {:<11} {}", task_type.as_str(), state.to_string(), id);
        }
        println!(
            "  Telemetry:  {} event(s), journal {}",
            self.events.len(),
            if self.journal_verified { "VERIFIED" } else { "FAILED" }
        );
    }
}
