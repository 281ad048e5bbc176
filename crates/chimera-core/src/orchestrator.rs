//! The orchestrator: lifecycle driver for one campaign's task graph.
//!
//! Every node moves through
//!
//!   PENDING → READY → DISPATCHED → {SUCCEEDED, FAILED, ESCALATED, TIMED_OUT}
//!
//! with CANCELLED reachable from any non-terminal state by abort or replan.
//!
//! All transitions happen under one mutex, so a claim and a result for the
//! same task are totally ordered and no two workers can ever claim the same
//! task. Results pass the contract validator before the lock is taken;
//! invalid results never touch state. Telemetry is emitted after the lock is
//! released, and a failing sink is logged and ignored.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use chimera_contracts::{
    campaign::CampaignId,
    error::{ChimeraError, ChimeraResult},
    lifecycle::TaskState,
    recovery::{FailureOutcome, RecoveryAction, RecoveryContext},
    result::{AgentTaskResult, ResultStatus},
    task::{AgentTaskManifest, TaskId, WorkerId},
    telemetry::{TelemetryEvent, TelemetryEventKind},
};

use crate::{
    graph::TaskGraph,
    traits::{Clock, ContractValidator, RecoveryPolicy, TelemetrySink},
};

/// What one applied transition did to the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub task_id: TaskId,
    /// The terminal state the task moved into.
    pub state: TaskState,
    /// Dependents that became READY because of this transition.
    pub unlocked: Vec<TaskId>,
    /// The policy decision, present only for blocking outcomes.
    pub recovery: Option<RecoveryAction>,
    /// Tasks cancelled as a consequence of `recovery`.
    pub cancelled: Vec<TaskId>,
}

/// Result of submitting a task result.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// The result was accepted and moved the task into a terminal state.
    Applied(Transition),
    /// The task was already terminal with the same status; nothing changed.
    Replayed { task_id: TaskId, state: TaskState },
    /// The task was settled elsewhere (timed out or cancelled) before this
    /// result arrived; the result was dropped. Produced by workers, never by
    /// [`Orchestrator::submit_result`].
    Discarded { task_id: TaskId, state: TaskState },
}

// ── Ledger ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct NodeRecord {
    state: TaskState,
    worker: Option<WorkerId>,
    dispatched_at: Option<DateTime<Utc>>,
    result: Option<AgentTaskResult>,
}

/// Mutable lifecycle state of every node, guarded by the orchestrator's mutex.
#[derive(Debug)]
struct Ledger {
    nodes: HashMap<TaskId, NodeRecord>,
}

impl Ledger {
    fn new(graph: &TaskGraph) -> Self {
        let nodes = graph
            .manifests()
            .map(|m| {
                let state = if m.dependencies.is_empty() {
                    TaskState::Ready
                } else {
                    TaskState::Pending
                };
                let record = NodeRecord {
                    state,
                    worker: None,
                    dispatched_at: None,
                    result: None,
                };
                (m.task_id.clone(), record)
            })
            .collect();
        Self { nodes }
    }

    fn state(&self, task_id: &TaskId) -> Option<TaskState> {
        self.nodes.get(task_id).map(|n| n.state)
    }

    fn ids_in(&self, state: TaskState) -> HashSet<TaskId> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.state == state)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Everything that is neither READY nor PENDING.
    fn unavailable(&self) -> HashSet<TaskId> {
        self.nodes
            .iter()
            .filter(|(_, n)| !matches!(n.state, TaskState::Ready | TaskState::Pending))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Promote PENDING dependents of `task_id` whose dependencies all succeeded.
    fn unlock_dependents(&mut self, graph: &TaskGraph, task_id: &TaskId) -> Vec<TaskId> {
        let mut unlocked = Vec::new();
        for dependent in graph.dependents(task_id) {
            if self.state(dependent) != Some(TaskState::Pending) {
                continue;
            }
            let satisfied = graph
                .dependencies(dependent)
                .into_iter()
                .all(|dep| self.state(dep) == Some(TaskState::Succeeded));
            if satisfied {
                if let Some(node) = self.nodes.get_mut(dependent) {
                    node.state = TaskState::Ready;
                    unlocked.push(dependent.clone());
                }
            }
        }
        unlocked
    }

    /// Cancel every non-terminal task in `ids`; terminal ones are untouched.
    fn cancel<'a>(&mut self, ids: impl IntoIterator<Item = &'a TaskId>) -> Vec<TaskId> {
        let mut cancelled = Vec::new();
        for id in ids {
            if let Some(node) = self.nodes.get_mut(id) {
                if !node.state.is_terminal() {
                    node.state = TaskState::Cancelled;
                    cancelled.push(id.clone());
                }
            }
        }
        cancelled
    }
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

/// Drives one campaign's task graph from dispatch to terminal states.
///
/// Share it between worker threads by reference or `Arc`; every method
/// takes `&self`.
pub struct Orchestrator {
    graph: TaskGraph,
    campaign_id: CampaignId,
    validator: Box<dyn ContractValidator>,
    sink: Box<dyn TelemetrySink>,
    policy: Box<dyn RecoveryPolicy>,
    clock: Box<dyn Clock>,
    ledger: Mutex<Ledger>,
}

impl Orchestrator {
    /// Take ownership of `graph`, open the telemetry sink, and mark every
    /// task without dependencies READY.
    ///
    /// # Errors
    ///
    /// `InvalidCampaign` if the graph is empty or spans more than one campaign.
    pub fn start(
        graph: TaskGraph,
        validator: Box<dyn ContractValidator>,
        sink: Box<dyn TelemetrySink>,
        policy: Box<dyn RecoveryPolicy>,
        clock: Box<dyn Clock>,
    ) -> ChimeraResult<Self> {
        if graph.is_empty() {
            return Err(ChimeraError::InvalidCampaign {
                reason: "cannot orchestrate an empty batch".to_string(),
            });
        }
        let campaign_id = {
            let ids = graph.campaign_ids();
            if ids.len() != 1 {
                return Err(ChimeraError::InvalidCampaign {
                    reason: format!(
                        "an orchestrator drives exactly one campaign; batch spans {}",
                        ids.len()
                    ),
                });
            }
            ids.into_iter()
                .next()
                .cloned()
                .ok_or_else(|| ChimeraError::InvalidCampaign {
                    reason: "batch carries no campaign id".to_string(),
                })?
        };

        let ledger = Mutex::new(Ledger::new(&graph));
        let orchestrator = Self {
            graph,
            campaign_id,
            validator,
            sink,
            policy,
            clock,
            ledger,
        };

        if let Err(e) = orchestrator.sink.open() {
            warn!(campaign_id = %orchestrator.campaign_id, error = %e, "telemetry sink failed to open");
        }
        info!(
            campaign_id = %orchestrator.campaign_id,
            tasks = orchestrator.graph.len(),
            "orchestrator started"
        );
        orchestrator.publish(vec![TelemetryEvent::campaign(
            TelemetryEventKind::OrchestratorStarted,
            orchestrator.campaign_id.clone(),
            orchestrator.clock.now(),
        )
        .with_detail(json!({ "tasks": orchestrator.graph.len() }))]);

        Ok(orchestrator)
    }

    pub fn campaign_id(&self) -> &CampaignId {
        &self.campaign_id
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    /// The orchestrator's notion of the current time.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    /// Claim the next READY task for `worker`, or `None` if nothing is ready.
    ///
    /// The highest-priority, earliest-created ready task is chosen.
    pub fn claim(&self, worker: &WorkerId) -> ChimeraResult<Option<AgentTaskManifest>> {
        let now = self.clock.now();
        let claimed = {
            let mut ledger = self.ledger()?;
            let next = self.ready_in(&ledger).into_iter().next();
            match next {
                Some(task_id) => {
                    Self::dispatch(&mut ledger, &task_id, worker, now);
                    Some(task_id)
                }
                None => None,
            }
        };

        match claimed {
            Some(task_id) => self.after_claim(&task_id, worker, now).map(Some),
            None => Ok(None),
        }
    }

    /// Claim a specific task for `worker`. The task must be READY.
    pub fn claim_task(
        &self,
        worker: &WorkerId,
        task_id: &TaskId,
    ) -> ChimeraResult<AgentTaskManifest> {
        let now = self.clock.now();
        {
            let mut ledger = self.ledger()?;
            match ledger.state(task_id) {
                None => {
                    return Err(ChimeraError::UnknownTask {
                        task_id: task_id.0.clone(),
                    })
                }
                Some(TaskState::Ready) => Self::dispatch(&mut ledger, task_id, worker, now),
                Some(other) => {
                    return Err(ChimeraError::InvalidTransition {
                        task_id: task_id.0.clone(),
                        from: other.to_string(),
                        to: TaskState::Dispatched.to_string(),
                    })
                }
            }
        }
        self.after_claim(task_id, worker, now)
    }

    // ── Results ───────────────────────────────────────────────────────────────

    /// Validate and apply a typed result.
    pub fn submit(&self, result: &AgentTaskResult) -> ChimeraResult<SubmissionOutcome> {
        self.submit_result(&result.to_value()?)
    }

    /// Validate and apply a result received as JSON.
    ///
    /// # Errors
    ///
    /// - `Validation` if the result violates its contract (state untouched)
    /// - `UnknownTask` if the task is not in this graph
    /// - `DuplicateResult` if the task is terminal with a different status
    /// - `InvalidTransition` if the task was never dispatched, or was
    ///   dispatched to a different worker
    pub fn submit_result(&self, raw: &Value) -> ChimeraResult<SubmissionOutcome> {
        let report = self.validator.validate_result(raw);
        if !report.valid {
            warn!(
                campaign_id = %self.campaign_id,
                errors = ?report.errors,
                "result rejected by contract validation"
            );
            return Err(ChimeraError::Validation {
                errors: report.errors,
            });
        }

        let result: AgentTaskResult =
            serde_json::from_value(raw.clone()).map_err(|e| ChimeraError::Validation {
                errors: vec![format!("result does not decode: {e}")],
            })?;
        let task_id = result.task_id.clone();
        let next = TaskState::from_status(result.status);
        let now = self.clock.now();

        let mut events = Vec::new();
        let transition = {
            let mut ledger = self.ledger()?;
            let node = ledger
                .nodes
                .get_mut(&task_id)
                .ok_or_else(|| ChimeraError::UnknownTask {
                    task_id: task_id.0.clone(),
                })?;

            let claimed_by = node
                .worker
                .as_ref()
                .map(|w| w.0.clone())
                .unwrap_or_default();
            let foreign = node.worker.as_ref() != Some(&result.worker_id);

            if node.state.is_terminal() {
                // Only the claiming worker may replay or contest a settled task.
                if foreign {
                    warn!(
                        task_id = %task_id,
                        claimed_by = %claimed_by,
                        submitted_by = %result.worker_id,
                        "result for terminal task from a worker that never held it"
                    );
                    return Err(ChimeraError::InvalidTransition {
                        task_id: task_id.0,
                        from: format!("{} by '{claimed_by}'", node.state),
                        to: format!("{next} by '{}'", result.worker_id),
                    });
                }
                if node.state == next {
                    debug!(task_id = %task_id, state = %next, "duplicate result replayed");
                    return Ok(SubmissionOutcome::Replayed {
                        task_id,
                        state: next,
                    });
                }
                warn!(
                    task_id = %task_id,
                    recorded = %node.state,
                    submitted = %result.status,
                    "conflicting result for terminal task"
                );
                return Err(ChimeraError::DuplicateResult {
                    task_id: task_id.0,
                    recorded: node.state.to_string(),
                    submitted: result.status.to_string(),
                });
            }

            if node.state != TaskState::Dispatched {
                return Err(ChimeraError::InvalidTransition {
                    task_id: task_id.0,
                    from: node.state.to_string(),
                    to: next.to_string(),
                });
            }
            if foreign {
                return Err(ChimeraError::InvalidTransition {
                    task_id: task_id.0,
                    from: format!("DISPATCHED to '{claimed_by}'"),
                    to: format!("{next} by '{}'", result.worker_id),
                });
            }

            node.state = next;
            events.push(self.result_event(&result, now));
            node.result = Some(result);

            self.settle(&mut ledger, &task_id, next, now, &mut events)
        };

        info!(
            campaign_id = %self.campaign_id,
            task_id = %task_id,
            state = %transition.state,
            unlocked = transition.unlocked.len(),
            "result applied"
        );
        self.publish(events);
        Ok(SubmissionOutcome::Applied(transition))
    }

    // ── Timeouts, abort, override ─────────────────────────────────────────────

    /// Move every DISPATCHED task whose timeout has elapsed to TIMED_OUT.
    ///
    /// Only DISPATCHED tasks are considered, so repeated calls never time a
    /// task out twice.
    pub fn check_timeouts(&self) -> ChimeraResult<Vec<Transition>> {
        let now = self.clock.now();
        let mut events = Vec::new();
        let mut transitions = Vec::new();
        {
            let mut ledger = self.ledger()?;
            let expired: Vec<TaskId> = self
                .graph
                .topological_order()
                .into_iter()
                .filter(|m| {
                    ledger.nodes.get(&m.task_id).is_some_and(|node| {
                        node.state == TaskState::Dispatched
                            && node.dispatched_at.is_some_and(|at| {
                                now - at > Duration::seconds(i64::from(m.timeout_seconds))
                            })
                    })
                })
                .map(|m| m.task_id.clone())
                .collect();

            for task_id in expired {
                // An abort triggered earlier in this sweep may have cancelled it.
                let Some(node) = ledger.nodes.get_mut(&task_id) else {
                    continue;
                };
                if node.state != TaskState::Dispatched {
                    continue;
                }
                node.state = TaskState::TimedOut;
                warn!(campaign_id = %self.campaign_id, task_id = %task_id, "task timed out");

                let mut event = TelemetryEvent::task(
                    TelemetryEventKind::TaskTimedOut,
                    self.campaign_id.clone(),
                    task_id.clone(),
                    now,
                );
                if let Some(worker) = node.worker.clone() {
                    event = event.with_worker(worker);
                }
                events.push(event);

                let transition =
                    self.settle(&mut ledger, &task_id, TaskState::TimedOut, now, &mut events);
                transitions.push(transition);
            }
        }
        self.publish(events);
        Ok(transitions)
    }

    /// Cancel every non-terminal task of the campaign. Terminal tasks keep
    /// their state.
    pub fn abort(&self, reason: &str) -> ChimeraResult<Vec<TaskId>> {
        let now = self.clock.now();
        let mut events = Vec::new();
        let cancelled = {
            let mut ledger = self.ledger()?;
            self.abort_in(&mut ledger, reason, now, &mut events)
        };
        self.publish(events);
        Ok(cancelled)
    }

    /// Record a human/judge decision that an ESCALATED task is acceptable.
    ///
    /// The task becomes SUCCEEDED and its dependents are re-evaluated. Only
    /// an explicit call does this; escalations are never resolved
    /// automatically.
    pub fn override_escalation(&self, task_id: &TaskId, reviewer: &str) -> ChimeraResult<Transition> {
        let now = self.clock.now();
        let transition = {
            let mut ledger = self.ledger()?;
            let node = ledger
                .nodes
                .get_mut(task_id)
                .ok_or_else(|| ChimeraError::UnknownTask {
                    task_id: task_id.0.clone(),
                })?;
            if node.state != TaskState::Escalated {
                return Err(ChimeraError::InvalidTransition {
                    task_id: task_id.0.clone(),
                    from: node.state.to_string(),
                    to: TaskState::Succeeded.to_string(),
                });
            }
            node.state = TaskState::Succeeded;
            let unlocked = ledger.unlock_dependents(&self.graph, task_id);
            Transition {
                task_id: task_id.clone(),
                state: TaskState::Succeeded,
                unlocked,
                recovery: None,
                cancelled: Vec::new(),
            }
        };

        info!(task_id = %task_id, reviewer, "escalation overridden");
        self.publish(vec![TelemetryEvent::task(
            TelemetryEventKind::TaskCompleted,
            self.campaign_id.clone(),
            task_id.clone(),
            now,
        )
        .with_detail(json!({ "override_by": reviewer, "previous_state": "ESCALATED" }))]);
        Ok(transition)
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    /// READY tasks in dispatch order.
    pub fn ready_tasks(&self) -> ChimeraResult<Vec<TaskId>> {
        let ledger = self.ledger()?;
        Ok(self.ready_in(&ledger))
    }

    pub fn state(&self, task_id: &TaskId) -> ChimeraResult<Option<TaskState>> {
        Ok(self.ledger()?.state(task_id))
    }

    /// The accepted result for `task_id`, if any.
    pub fn result(&self, task_id: &TaskId) -> ChimeraResult<Option<AgentTaskResult>> {
        Ok(self
            .ledger()?
            .nodes
            .get(task_id)
            .and_then(|n| n.result.clone()))
    }

    /// Every task with its state, in topological order.
    pub fn snapshot(&self) -> ChimeraResult<Vec<(TaskId, TaskState)>> {
        let ledger = self.ledger()?;
        Ok(self
            .graph
            .topological_order()
            .into_iter()
            .filter_map(|m| ledger.state(&m.task_id).map(|s| (m.task_id.clone(), s)))
            .collect())
    }

    /// True when no task is READY or DISPATCHED: nothing can make progress
    /// without outside intervention.
    pub fn is_settled(&self) -> ChimeraResult<bool> {
        let ledger = self.ledger()?;
        Ok(!ledger
            .nodes
            .values()
            .any(|n| matches!(n.state, TaskState::Ready | TaskState::Dispatched)))
    }

    /// Emit the final event, then flush and close the telemetry sink.
    pub fn shutdown(&self) -> ChimeraResult<()> {
        let summary = {
            let ledger = self.ledger()?;
            let mut counts: HashMap<String, usize> = HashMap::new();
            for node in ledger.nodes.values() {
                *counts.entry(node.state.to_string()).or_default() += 1;
            }
            counts
        };
        self.publish(vec![TelemetryEvent::campaign(
            TelemetryEventKind::OrchestratorStopped,
            self.campaign_id.clone(),
            self.clock.now(),
        )
        .with_detail(json!(summary))]);

        if let Err(e) = self.sink.flush() {
            warn!(campaign_id = %self.campaign_id, error = %e, "telemetry flush failed");
        }
        if let Err(e) = self.sink.close() {
            warn!(campaign_id = %self.campaign_id, error = %e, "telemetry close failed");
        }
        info!(campaign_id = %self.campaign_id, "orchestrator stopped");
        Ok(())
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn ledger(&self) -> ChimeraResult<MutexGuard<'_, Ledger>> {
        self.ledger.lock().map_err(|e| ChimeraError::StateUnavailable {
            reason: format!("task ledger lock poisoned: {e}"),
        })
    }

    fn ready_in(&self, ledger: &Ledger) -> Vec<TaskId> {
        let succeeded = ledger.ids_in(TaskState::Succeeded);
        self.graph
            .ready_tasks_excluding(&succeeded, &ledger.unavailable())
    }

    fn dispatch(ledger: &mut Ledger, task_id: &TaskId, worker: &WorkerId, now: DateTime<Utc>) {
        if let Some(node) = ledger.nodes.get_mut(task_id) {
            node.state = TaskState::Dispatched;
            node.worker = Some(worker.clone());
            node.dispatched_at = Some(now);
        }
    }

    fn after_claim(
        &self,
        task_id: &TaskId,
        worker: &WorkerId,
        now: DateTime<Utc>,
    ) -> ChimeraResult<AgentTaskManifest> {
        let manifest = self
            .graph
            .manifest(task_id)
            .cloned()
            .ok_or_else(|| ChimeraError::UnknownTask {
                task_id: task_id.0.clone(),
            })?;

        debug!(task_id = %task_id, worker = %worker, task_type = %manifest.task_type, "task claimed");
        self.publish(vec![TelemetryEvent::task(
            TelemetryEventKind::TaskClaimed,
            self.campaign_id.clone(),
            task_id.clone(),
            now,
        )
        .with_worker(worker.clone())
        .with_detail(json!({
            "task_type": manifest.task_type,
            "priority": manifest.priority,
            "timeout_seconds": manifest.timeout_seconds,
        }))]);
        Ok(manifest)
    }

    fn result_event(&self, result: &AgentTaskResult, now: DateTime<Utc>) -> TelemetryEvent {
        let kind = match result.status {
            ResultStatus::Success => TelemetryEventKind::TaskCompleted,
            ResultStatus::Failed => TelemetryEventKind::TaskFailed,
            ResultStatus::Escalated => TelemetryEventKind::TaskEscalated,
        };
        let error_code = result.error.as_ref().map(|e| e.code.clone());
        TelemetryEvent::task(kind, self.campaign_id.clone(), result.task_id.clone(), now)
            .with_worker(result.worker_id.clone())
            .with_detail(json!({
                "confidence": result.confidence,
                "error_code": error_code,
            }))
    }

    /// Apply the downstream consequences of `task_id` reaching `state`.
    fn settle(
        &self,
        ledger: &mut Ledger,
        task_id: &TaskId,
        state: TaskState,
        now: DateTime<Utc>,
        events: &mut Vec<TelemetryEvent>,
    ) -> Transition {
        let outcome = match state {
            TaskState::Failed => FailureOutcome::Failed,
            TaskState::TimedOut => FailureOutcome::TimedOut,
            TaskState::Escalated => FailureOutcome::Escalated,
            _ => {
                let unlocked = ledger.unlock_dependents(&self.graph, task_id);
                return Transition {
                    task_id: task_id.clone(),
                    state,
                    unlocked,
                    recovery: None,
                    cancelled: Vec::new(),
                };
            }
        };

        let action = self.decide(task_id, outcome);
        let cancelled = match &action {
            RecoveryAction::Block => Vec::new(),
            RecoveryAction::Abort { reason } => self.abort_in(ledger, reason, now, events),
            RecoveryAction::Replan { reason } => {
                let branch = ledger.cancel(self.graph.descendants(task_id));
                info!(task_id = %task_id, reason = %reason, cancelled = branch.len(), "branch released for re-planning");
                for id in &branch {
                    events.push(self.cancel_event(id, reason, now));
                }
                branch
            }
        };

        Transition {
            task_id: task_id.clone(),
            state,
            unlocked: Vec::new(),
            recovery: Some(action),
            cancelled,
        }
    }

    fn decide(&self, task_id: &TaskId, outcome: FailureOutcome) -> RecoveryAction {
        let Some(manifest) = self.graph.manifest(task_id) else {
            return RecoveryAction::Block;
        };
        let ctx = RecoveryContext {
            campaign_id: self.campaign_id.clone(),
            task_id: task_id.clone(),
            task_type: manifest.task_type,
            outcome,
            dependent_count: self.graph.dependents(task_id).len(),
        };
        match self.policy.decide(&ctx) {
            Ok(action) => {
                debug!(task_id = %task_id, %outcome, ?action, "recovery decided");
                action
            }
            Err(e) => {
                warn!(task_id = %task_id, error = %e, "recovery policy failed; blocking dependents");
                RecoveryAction::Block
            }
        }
    }

    fn abort_in(
        &self,
        ledger: &mut Ledger,
        reason: &str,
        now: DateTime<Utc>,
        events: &mut Vec<TelemetryEvent>,
    ) -> Vec<TaskId> {
        let order: Vec<&TaskId> = self
            .graph
            .topological_order()
            .into_iter()
            .map(|m| &m.task_id)
            .collect();
        let cancelled = ledger.cancel(order);

        warn!(
            campaign_id = %self.campaign_id,
            reason,
            cancelled = cancelled.len(),
            "campaign aborted"
        );
        for id in &cancelled {
            events.push(self.cancel_event(id, reason, now));
        }
        events.push(
            TelemetryEvent::campaign(
                TelemetryEventKind::CampaignAborted,
                self.campaign_id.clone(),
                now,
            )
            .with_detail(json!({ "reason": reason, "cancelled": cancelled.len() })),
        );
        cancelled
    }

    fn cancel_event(&self, task_id: &TaskId, reason: &str, now: DateTime<Utc>) -> TelemetryEvent {
        TelemetryEvent::task(
            TelemetryEventKind::TaskCancelled,
            self.campaign_id.clone(),
            task_id.clone(),
            now,
        )
        .with_detail(json!({ "reason": reason }))
    }

    fn publish(&self, events: Vec<TelemetryEvent>) {
        for event in events {
            if let Err(e) = self.sink.emit(&event) {
                warn!(
                    campaign_id = %self.campaign_id,
                    kind = ?event.kind,
                    error = %e,
                    "telemetry emission failed; transition kept"
                );
            }
        }
    }
}
