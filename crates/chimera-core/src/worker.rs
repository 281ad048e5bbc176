//! A worker agent: claims ready tasks, runs the matching skill, reports back.
//!
//! Workers hold no state between tasks. Each iteration is
//!
//!   claim → SkillGateway::invoke → build result → Orchestrator::submit
//!
//! A skill error becomes a FAILED result, and a confident-enough output becomes
//! SUCCESS. Anything below the escalation threshold is reported as ESCALATED
//! for the judging stage to pick up. A task that timed out or was cancelled
//! while the skill ran has its late result discarded, and the loop moves on.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use chimera_contracts::{
    error::{ChimeraError, ChimeraResult},
    result::{AgentTaskResult, TaskError},
    task::{AgentTaskManifest, WorkerId},
};

use crate::{
    orchestrator::{Orchestrator, SubmissionOutcome},
    traits::SkillGateway,
};

/// Outputs with confidence below this are escalated instead of accepted.
pub const DEFAULT_ESCALATION_THRESHOLD: f64 = 0.7;

pub struct Worker {
    id: WorkerId,
    gateway: Arc<dyn SkillGateway>,
    escalation_threshold: f64,
    poll_interval: Duration,
}

impl Worker {
    pub fn new(id: WorkerId, gateway: Arc<dyn SkillGateway>) -> Self {
        Self {
            id,
            gateway,
            escalation_threshold: DEFAULT_ESCALATION_THRESHOLD,
            poll_interval: Duration::from_millis(25),
        }
    }

    pub fn with_escalation_threshold(mut self, threshold: f64) -> Self {
        self.escalation_threshold = threshold;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn id(&self) -> &WorkerId {
        &self.id
    }

    /// Claim and execute at most one task. Returns `None` when nothing is ready.
    ///
    /// A result that arrives after the task was timed out or cancelled is
    /// dropped and reported as [`SubmissionOutcome::Discarded`].
    pub fn run_once(&self, orchestrator: &Orchestrator) -> ChimeraResult<Option<SubmissionOutcome>> {
        let Some(task) = orchestrator.claim(&self.id)? else {
            return Ok(None);
        };
        let built = self.execute(&task, orchestrator);
        self.finish(&task, built, orchestrator).map(Some)
    }

    /// Report the outcome of a claimed task. Every path ends in a submission
    /// so the task never stays DISPATCHED because of this worker.
    fn finish(
        &self,
        task: &AgentTaskManifest,
        built: ChimeraResult<AgentTaskResult>,
        orchestrator: &Orchestrator,
    ) -> ChimeraResult<SubmissionOutcome> {
        let result = match built {
            Ok(result) => result,
            Err(e) => {
                warn!(worker = %self.id, task_id = %task.task_id, error = %e, "could not build result");
                AgentTaskResult::failed(
                    task.task_id.clone(),
                    self.id.clone(),
                    orchestrator.now(),
                    0.0,
                    TaskError::new("execution_error", e.to_string()),
                )
            }
        };

        let submitted = match orchestrator.submit(&result) {
            Err(ChimeraError::Validation { errors }) => {
                // The skill produced something the contract rejects; report
                // that as a failure rather than leaving the task dispatched.
                warn!(
                    worker = %self.id,
                    task_id = %task.task_id,
                    errors = ?errors,
                    "skill output violates the result contract"
                );
                let failed = AgentTaskResult::failed(
                    task.task_id.clone(),
                    self.id.clone(),
                    orchestrator.now(),
                    0.0,
                    TaskError::new("contract_violation", errors.join("; ")),
                );
                orchestrator.submit(&failed)
            }
            other => other,
        };

        match submitted {
            Err(ChimeraError::DuplicateResult { recorded, .. }) => {
                let state = orchestrator.state(&task.task_id)?.ok_or_else(|| {
                    ChimeraError::UnknownTask {
                        task_id: task.task_id.0.clone(),
                    }
                })?;
                warn!(
                    worker = %self.id,
                    task_id = %task.task_id,
                    recorded = %recorded,
                    "task settled before its result arrived; result discarded"
                );
                Ok(SubmissionOutcome::Discarded {
                    task_id: task.task_id.clone(),
                    state,
                })
            }
            other => other,
        }
    }

    /// Keep working until the campaign settles. Returns the number of tasks
    /// this worker executed.
    pub fn run(&self, orchestrator: &Orchestrator) -> ChimeraResult<usize> {
        let mut executed = 0;
        loop {
            if self.run_once(orchestrator)?.is_some() {
                executed += 1;
                continue;
            }
            if orchestrator.is_settled()? {
                break;
            }
            // Another worker holds the remaining tasks.
            orchestrator.check_timeouts()?;
            std::thread::sleep(self.poll_interval);
        }
        info!(worker = %self.id, executed, "worker idle; campaign settled");
        Ok(executed)
    }

    fn execute(
        &self,
        task: &AgentTaskManifest,
        orchestrator: &Orchestrator,
    ) -> ChimeraResult<AgentTaskResult> {
        debug!(worker = %self.id, task_id = %task.task_id, task_type = %task.task_type, "executing");

        let outcome = match self.gateway.invoke(task) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(worker = %self.id, task_id = %task.task_id, error = %e, "skill failed");
                return Ok(AgentTaskResult::failed(
                    task.task_id.clone(),
                    self.id.clone(),
                    orchestrator.now(),
                    0.0,
                    TaskError::new("skill_error", e.to_string()),
                ));
            }
        };

        let confidence = outcome.confidence;
        let result = if confidence < self.escalation_threshold {
            info!(
                worker = %self.id,
                task_id = %task.task_id,
                confidence,
                threshold = self.escalation_threshold,
                "low confidence; escalating"
            );
            AgentTaskResult::escalated(
                task.task_id.clone(),
                self.id.clone(),
                orchestrator.now(),
                confidence,
                outcome.output,
                TaskError::new(
                    "low_confidence",
                    format!(
                        "confidence {confidence:.2} below threshold {:.2}",
                        self.escalation_threshold
                    ),
                ),
            )?
        } else {
            AgentTaskResult::success(
                task.task_id.clone(),
                self.id.clone(),
                orchestrator.now(),
                confidence,
                outcome.output,
            )?
        };

        Ok(match outcome.proof {
            Some(proof) => result.with_proof(proof),
            None => result,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, Duration, TimeZone, Utc};
    use serde_json::{Map, Value};

    use chimera_contracts::{
        campaign::CampaignId,
        error::{ChimeraError, ChimeraResult},
        lifecycle::TaskState,
        payload::{TaskOutput, TaskPayload},
        recovery::{RecoveryAction, RecoveryContext},
        result::{ResultStatus, SkillOutcome},
        task::{AgentTaskManifest, PlannerId, TaskType, WorkerId},
        telemetry::TelemetryEvent,
        validation::ValidationReport,
    };

    use crate::graph::TaskGraph;
    use crate::orchestrator::{Orchestrator, SubmissionOutcome};
    use crate::traits::{
        Clock, ContractValidator, RecoveryPolicy, SkillGateway, SystemClock, TelemetrySink,
    };

    use super::Worker;

    struct AcceptAll;

    impl ContractValidator for AcceptAll {
        fn validate_manifest(&self, _manifest: &Value) -> ValidationReport {
            ValidationReport::from_errors(vec![])
        }

        fn validate_result(&self, result: &Value) -> ValidationReport {
            // Reject outputs flagged as malformed by the gateway below.
            if result["output"].get("malformed").is_some() {
                ValidationReport::from_errors(vec!["output: malformed".to_string()])
            } else {
                ValidationReport::from_errors(vec![])
            }
        }
    }

    struct NullSink;

    impl TelemetrySink for NullSink {
        fn open(&self) -> ChimeraResult<()> {
            Ok(())
        }
        fn emit(&self, _event: &TelemetryEvent) -> ChimeraResult<()> {
            Ok(())
        }
        fn flush(&self) -> ChimeraResult<()> {
            Ok(())
        }
        fn close(&self) -> ChimeraResult<()> {
            Ok(())
        }
    }

    struct Block;

    impl RecoveryPolicy for Block {
        fn decide(&self, _ctx: &RecoveryContext) -> ChimeraResult<RecoveryAction> {
            Ok(RecoveryAction::Block)
        }
    }

    /// Returns a fixed confidence for every task, or fails a given task type.
    struct ScriptedGateway {
        confidence: f64,
        fail_on: Option<TaskType>,
        malformed: bool,
        invoked: Arc<Mutex<Vec<TaskType>>>,
    }

    impl ScriptedGateway {
        fn confident() -> Self {
            Self {
                confidence: 0.9,
                fail_on: None,
                malformed: false,
                invoked: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl SkillGateway for ScriptedGateway {
        fn invoke(&self, task: &AgentTaskManifest) -> ChimeraResult<SkillOutcome> {
            self.invoked.lock().unwrap().push(task.task_type);
            if self.fail_on == Some(task.task_type) {
                return Err(ChimeraError::Skill {
                    skill: task.task_type.to_string(),
                    reason: "rate limited".to_string(),
                });
            }
            let mut output = Map::new();
            if self.malformed {
                output.insert("malformed".to_string(), Value::Bool(true));
            }
            Ok(SkillOutcome::new(TaskOutput::Opaque(output), self.confidence))
        }
    }

    fn orchestrator() -> Orchestrator {
        let created = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let task = |task_type| {
            AgentTaskManifest::new(
                CampaignId("camp-1".to_string()),
                PlannerId("planner-001".to_string()),
                created,
                TaskPayload::Opaque {
                    task_type,
                    body: Map::new(),
                },
            )
            .unwrap()
        };
        let fetch = task(TaskType::AnalyticsFetch);
        let generate = task(TaskType::ContentGeneration).depends_on(&fetch.task_id);
        let publish = task(TaskType::SocialPublish).depends_on(&generate.task_id);

        let clock: Box<dyn Clock> = Box::new(SystemClock);
        Orchestrator::start(
            TaskGraph::build(vec![fetch, generate, publish]).unwrap(),
            Box::new(AcceptAll),
            Box::new(NullSink),
            Box::new(Block),
            clock,
        )
        .unwrap()
    }

    /// A clock the tests move by hand, shared with the gateway below.
    struct SharedClock(Arc<Mutex<DateTime<Utc>>>);

    impl Clock for SharedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    /// Takes longer than any task timeout: every invocation moves the clock
    /// past the deadline and runs a timeout sweep before answering.
    struct StallingGateway {
        clock: Arc<Mutex<DateTime<Utc>>>,
        orchestrator: Arc<Orchestrator>,
    }

    impl SkillGateway for StallingGateway {
        fn invoke(&self, _task: &AgentTaskManifest) -> ChimeraResult<SkillOutcome> {
            *self.clock.lock().unwrap() += Duration::seconds(400);
            self.orchestrator.check_timeouts()?;
            Ok(SkillOutcome::new(TaskOutput::Opaque(Map::new()), 0.9))
        }
    }

    fn states(orchestrator: &Orchestrator) -> Vec<TaskState> {
        orchestrator
            .snapshot()
            .unwrap()
            .into_iter()
            .map(|(_, s)| s)
            .collect()
    }

    #[test]
    fn confident_worker_completes_the_chain() {
        let orchestrator = orchestrator();
        let gateway = Arc::new(ScriptedGateway::confident());
        let invoked = gateway.invoked.clone();
        let worker = Worker::new(WorkerId("w-1".to_string()), gateway);

        assert_eq!(worker.run(&orchestrator).unwrap(), 3);
        assert_eq!(states(&orchestrator), vec![TaskState::Succeeded; 3]);
        assert_eq!(
            *invoked.lock().unwrap(),
            vec![
                TaskType::AnalyticsFetch,
                TaskType::ContentGeneration,
                TaskType::SocialPublish
            ]
        );
    }

    #[test]
    fn skill_error_is_reported_as_failure() {
        let orchestrator = orchestrator();
        let gateway = ScriptedGateway {
            fail_on: Some(TaskType::ContentGeneration),
            ..ScriptedGateway::confident()
        };
        let worker = Worker::new(WorkerId("w-1".to_string()), Arc::new(gateway));

        assert_eq!(worker.run(&orchestrator).unwrap(), 2);
        assert_eq!(
            states(&orchestrator),
            vec![TaskState::Succeeded, TaskState::Failed, TaskState::Pending]
        );

        let generate = orchestrator.snapshot().unwrap()[1].0.clone();
        let result = orchestrator.result(&generate).unwrap().unwrap();
        assert_eq!(result.status, ResultStatus::Failed);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.error.unwrap().code, "skill_error");
    }

    #[test]
    fn low_confidence_is_escalated() {
        let orchestrator = orchestrator();
        let gateway = ScriptedGateway {
            confidence: 0.5,
            ..ScriptedGateway::confident()
        };
        let worker = Worker::new(WorkerId("w-1".to_string()), Arc::new(gateway));

        let outcome = worker.run_once(&orchestrator).unwrap().unwrap();
        let SubmissionOutcome::Applied(transition) = outcome else {
            panic!("expected an applied transition");
        };
        assert_eq!(transition.state, TaskState::Escalated);
        assert!(worker.run_once(&orchestrator).unwrap().is_none());

        let fetch = transition.task_id;
        let result = orchestrator.result(&fetch).unwrap().unwrap();
        assert_eq!(result.error.unwrap().code, "low_confidence");
    }

    #[test]
    fn threshold_is_configurable() {
        let orchestrator = orchestrator();
        let gateway = ScriptedGateway {
            confidence: 0.5,
            ..ScriptedGateway::confident()
        };
        let worker = Worker::new(WorkerId("w-1".to_string()), Arc::new(gateway))
            .with_escalation_threshold(0.4);

        assert_eq!(worker.run(&orchestrator).unwrap(), 3);
        assert_eq!(states(&orchestrator), vec![TaskState::Succeeded; 3]);
    }

    #[test]
    fn contract_violation_fails_the_task_instead_of_hanging() {
        let orchestrator = orchestrator();
        let gateway = ScriptedGateway {
            malformed: true,
            ..ScriptedGateway::confident()
        };
        let worker = Worker::new(WorkerId("w-1".to_string()), Arc::new(gateway));

        worker.run_once(&orchestrator).unwrap();
        let fetch = orchestrator.snapshot().unwrap()[0].0.clone();
        let result = orchestrator.result(&fetch).unwrap().unwrap();
        assert_eq!(result.status, ResultStatus::Failed);
        assert_eq!(result.error.unwrap().code, "contract_violation");
    }

    #[test]
    fn late_result_after_timeout_is_discarded_and_workers_keep_going() {
        let created = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let fetch = |region: &str| {
            let mut body = Map::new();
            body.insert("region".to_string(), Value::String(region.to_string()));
            AgentTaskManifest::new(
                CampaignId("camp-1".to_string()),
                PlannerId("planner-001".to_string()),
                created,
                TaskPayload::Opaque {
                    task_type: TaskType::AnalyticsFetch,
                    body,
                },
            )
            .unwrap()
            .with_timeout(300)
        };

        let clock = Arc::new(Mutex::new(created));
        let orchestrator = Arc::new(
            Orchestrator::start(
                TaskGraph::build(vec![fetch("US"), fetch("EU")]).unwrap(),
                Box::new(AcceptAll),
                Box::new(NullSink),
                Box::new(Block),
                Box::new(SharedClock(clock.clone())),
            )
            .unwrap(),
        );
        let gateway = Arc::new(StallingGateway {
            clock,
            orchestrator: orchestrator.clone(),
        });
        let first = Worker::new(WorkerId("w-1".to_string()), gateway.clone())
            .with_poll_interval(std::time::Duration::from_millis(1));
        let second = Worker::new(WorkerId("w-2".to_string()), gateway)
            .with_poll_interval(std::time::Duration::from_millis(1));

        let (a, b) = std::thread::scope(|scope| {
            let a = scope.spawn(|| first.run(&orchestrator));
            let b = scope.spawn(|| second.run(&orchestrator));
            (a.join().unwrap(), b.join().unwrap())
        });

        assert_eq!(a.unwrap() + b.unwrap(), 2);
        assert_eq!(states(&orchestrator), vec![TaskState::TimedOut; 2]);
        for (task_id, _) in orchestrator.snapshot().unwrap() {
            assert!(orchestrator.result(&task_id).unwrap().is_none());
        }
    }

    #[test]
    fn run_once_reports_a_discarded_result() {
        let created = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let only = AgentTaskManifest::new(
            CampaignId("camp-1".to_string()),
            PlannerId("planner-001".to_string()),
            created,
            TaskPayload::Opaque {
                task_type: TaskType::AnalyticsFetch,
                body: Map::new(),
            },
        )
        .unwrap()
        .with_timeout(300);
        let task_id = only.task_id.clone();

        let clock = Arc::new(Mutex::new(created));
        let orchestrator = Arc::new(
            Orchestrator::start(
                TaskGraph::build(vec![only]).unwrap(),
                Box::new(AcceptAll),
                Box::new(NullSink),
                Box::new(Block),
                Box::new(SharedClock(clock.clone())),
            )
            .unwrap(),
        );
        let worker = Worker::new(
            WorkerId("w-1".to_string()),
            Arc::new(StallingGateway {
                clock,
                orchestrator: orchestrator.clone(),
            }),
        );

        let outcome = worker.run_once(&orchestrator).unwrap().unwrap();
        assert_eq!(
            outcome,
            SubmissionOutcome::Discarded {
                task_id,
                state: TaskState::TimedOut,
            }
        );
        assert!(orchestrator.is_settled().unwrap());
    }

    #[test]
    fn result_that_cannot_be_built_fails_the_task() {
        let orchestrator = orchestrator();
        let worker = Worker::new(
            WorkerId("w-1".to_string()),
            Arc::new(ScriptedGateway::confident()),
        );
        let task = orchestrator.claim(worker.id()).unwrap().unwrap();

        let built = Err(ChimeraError::MalformedInput {
            reason: "could not encode payload".to_string(),
        });
        let outcome = worker.finish(&task, built, &orchestrator).unwrap();
        let SubmissionOutcome::Applied(transition) = outcome else {
            panic!("expected an applied transition");
        };
        assert_eq!(transition.state, TaskState::Failed);

        let result = orchestrator.result(&task.task_id).unwrap().unwrap();
        assert_eq!(result.status, ResultStatus::Failed);
        assert_eq!(result.worker_id, WorkerId("w-1".to_string()));
        assert_eq!(result.error.unwrap().code, "execution_error");
    }
}
