//! The campaign decomposition engine.
//!
//! `CampaignPlanner` turns a campaign into a batch of task manifests:
//!
//!   Campaign → structural check → strategy (by intent) → validate every
//!   manifest → graph check → publish batch
//!
//! Publication is all-or-nothing. If any manifest fails validation, carries
//! the wrong campaign id, or the batch does not form a DAG, the caller gets a
//! single `Decomposition` error listing every offence and no tasks at all.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use chimera_contracts::{
    campaign::CampaignManifest,
    error::{ChimeraError, ChimeraResult},
    task::{AgentTaskManifest, PlannerId},
};

use crate::{
    graph::TaskGraph,
    strategy::{TrendJackedStrategy, TREND_JACKED_INTENT},
    traits::{Clock, ContractValidator, DecompositionStrategy, PlanningContext, SystemClock},
};

/// Planner identity used when the hosting application does not supply one.
pub const DEFAULT_PLANNER_ID: &str = "planner-001";

/// Decomposes campaigns into validated task batches.
///
/// Planning only reads the campaign and returns a fresh batch, so a single
/// planner can serve concurrent callers without locking.
pub struct CampaignPlanner {
    planner_id: PlannerId,
    default_intent: String,
    strategies: HashMap<String, Box<dyn DecompositionStrategy>>,
    validator: Box<dyn ContractValidator>,
    clock: Box<dyn Clock>,
}

impl CampaignPlanner {
    /// Create a planner with the trend-jacked strategy registered as default.
    pub fn new(planner_id: PlannerId, validator: Box<dyn ContractValidator>) -> Self {
        let mut strategies: HashMap<String, Box<dyn DecompositionStrategy>> = HashMap::new();
        strategies.insert(
            TREND_JACKED_INTENT.to_string(),
            Box::new(TrendJackedStrategy::default()),
        );
        Self {
            planner_id,
            default_intent: TREND_JACKED_INTENT.to_string(),
            strategies,
            validator,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_planner_id(mut self, planner_id: PlannerId) -> Self {
        self.planner_id = planner_id;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Intent used for campaigns that do not name one.
    pub fn with_default_intent(mut self, intent: impl Into<String>) -> Self {
        self.default_intent = intent.into();
        self
    }

    /// Register `strategy` under `intent`, replacing any previous one.
    pub fn register(&mut self, intent: impl Into<String>, strategy: Box<dyn DecompositionStrategy>) {
        self.strategies.insert(intent.into(), strategy);
    }

    pub fn planner_id(&self) -> &PlannerId {
        &self.planner_id
    }

    /// Registered intent keys, sorted.
    pub fn intents(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Decompose `campaign` into an ordered batch of task manifests.
    ///
    /// # Errors
    ///
    /// - `InvalidCampaign` when `campaign_id`, `constraints.platforms` or
    ///   `target_audience.regions` is missing, or no strategy serves the intent
    /// - `Decomposition` when the batch fails any contract or graph check
    pub fn plan_campaign(
        &self,
        campaign: &CampaignManifest,
    ) -> ChimeraResult<Vec<AgentTaskManifest>> {
        let campaign_id = campaign.require_structure()?;
        let intent = campaign
            .intent
            .as_deref()
            .unwrap_or(self.default_intent.as_str());

        let strategy = self
            .strategies
            .get(intent)
            .ok_or_else(|| ChimeraError::InvalidCampaign {
                reason: format!("no decomposition strategy registered for intent '{intent}'"),
            })?;

        let ctx = PlanningContext {
            campaign_id,
            planner_id: &self.planner_id,
            now: self.clock.now(),
        };

        debug!(campaign_id = %campaign_id, intent, "decomposing campaign");
        let batch = strategy.decompose(campaign, &ctx)?;

        let mut failures = Vec::new();
        if batch.is_empty() {
            failures.push(format!("strategy '{intent}' produced no tasks"));
        }

        for manifest in &batch {
            if &manifest.campaign_id != campaign_id {
                failures.push(format!(
                    "task {} ({}): campaign_id '{}' does not match campaign '{}'",
                    manifest.task_id, manifest.task_type, manifest.campaign_id, campaign_id
                ));
            }
            let report = self.validator.validate_manifest(&manifest.to_value()?);
            for error in report.errors {
                failures.push(format!(
                    "task {} ({}): {}",
                    manifest.task_id, manifest.task_type, error
                ));
            }
        }

        if failures.is_empty() {
            if let Err(e) = TaskGraph::build(batch.clone()) {
                failures.push(format!("dependency graph: {e}"));
            }
        }

        if !failures.is_empty() {
            warn!(
                campaign_id = %campaign_id,
                intent,
                failure_count = failures.len(),
                "decomposition rejected; no tasks published"
            );
            return Err(ChimeraError::Decomposition { failures });
        }

        info!(
            campaign_id = %campaign_id,
            intent,
            tasks = batch.len(),
            "campaign decomposed"
        );
        Ok(batch)
    }

    /// Decompose `campaign` and build its dependency graph in one step.
    pub fn plan_graph(&self, campaign: &CampaignManifest) -> ChimeraResult<TaskGraph> {
        TaskGraph::build(self.plan_campaign(campaign)?)
    }
}
