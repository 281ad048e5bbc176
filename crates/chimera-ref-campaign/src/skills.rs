//! Reference `SkillGateway` backed by the mock data module.
//!
//! Each task type maps to one skill:
//!
//! | task type             | skill              | output           |
//! |-----------------------|--------------------|------------------|
//! | `analytics_fetch`     | fetch_trends       | `TrendReport`    |
//! | `content_generation`  | generate_content   | `GeneratedContent` |
//! | `content_review`      | validate_content   | `ReviewVerdict`  |
//! | `social_publish`      | publish_post       | `PublishReceipt` |
//! | `transaction_execute` | wallet             | `WalletBalance`  |
//!
//! Skills that consume upstream work (generation reads the fetched trends,
//! review and publish read the generated post) look it up in the gateway's
//! artifact store by the task ids their payload references. Every skill
//! checks its input and fails with `ChimeraError::Skill` on a bad payload.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use chimera_contracts::{
    error::{ChimeraError, ChimeraResult},
    payload::{
        AnalyticsFetchPayload, ContentGenerationPayload, ContentReviewPayload, GeneratedContent,
        SocialPublishPayload, TaskOutput, TaskPayload, TransactionPayload, TrendReport,
    },
    result::SkillOutcome,
    task::{AgentTaskManifest, TaskId, TaskType},
};
use chimera_core::traits::SkillGateway;

use crate::mock_data::{
    draft_content, publish_receipt, review_against_guidelines, trending_topics, wallet_after,
    CATEGORIES, CONTENT_TYPES, PLATFORMS, WALLET_BALANCE_USD,
};

const TRENDS_PER_FETCH: usize = 5;

/// In-process skill gateway with fault injection for demos and tests.
pub struct MockSkillGateway {
    artifacts: Mutex<HashMap<TaskId, TaskOutput>>,
    failing: HashSet<TaskType>,
    offline_platforms: HashSet<String>,
    confidence: HashMap<TaskType, f64>,
}

impl Default for MockSkillGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSkillGateway {
    pub fn new() -> Self {
        Self {
            artifacts: Mutex::new(HashMap::new()),
            failing: HashSet::new(),
            offline_platforms: HashSet::new(),
            confidence: HashMap::new(),
        }
    }

    /// Every invocation of `task_type` fails with a skill error.
    pub fn failing(mut self, task_type: TaskType) -> Self {
        self.failing.insert(task_type);
        self
    }

    /// Publishing to `platform` fails; other platforms are unaffected.
    pub fn platform_offline(mut self, platform: impl Into<String>) -> Self {
        self.offline_platforms.insert(platform.into());
        self
    }

    /// Report `confidence` for every `task_type` output instead of the
    /// skill's own figure.
    pub fn with_confidence(mut self, task_type: TaskType, confidence: f64) -> Self {
        self.confidence.insert(task_type, confidence);
        self
    }

    /// Output previously produced for `task_id`, if any.
    pub fn artifact(&self, task_id: &TaskId) -> ChimeraResult<Option<TaskOutput>> {
        Ok(self.store("artifacts")?.get(task_id).cloned())
    }

    // ── Skills ────────────────────────────────────────────────────────────────

    fn fetch_trends(&self, p: &AnalyticsFetchPayload) -> ChimeraResult<SkillOutcome> {
        let platform = p.platform.to_lowercase();
        if !PLATFORMS.contains(&platform.as_str()) {
            return Err(skill_error(
                "fetch_trends",
                format!("unsupported platform '{}'", p.platform),
            ));
        }
        let category = p.category.to_lowercase();
        if !CATEGORIES.contains(&category.as_str()) {
            return Err(skill_error(
                "fetch_trends",
                format!("unknown category '{}'", p.category),
            ));
        }
        let report = trending_topics(&platform, &category, TRENDS_PER_FETCH);
        Ok(SkillOutcome::new(TaskOutput::Trends(report), 0.9))
    }

    fn generate_content(&self, p: &ContentGenerationPayload) -> ChimeraResult<SkillOutcome> {
        if p.prompt.trim().is_empty() {
            return Err(skill_error("generate_content", "prompt is empty"));
        }
        if !CONTENT_TYPES.contains(&p.content_type.as_str()) {
            return Err(skill_error(
                "generate_content",
                format!("unsupported content_type '{}'", p.content_type),
            ));
        }

        let reports: Vec<TrendReport> = {
            let store = self.store("generate_content")?;
            p.context_ids
                .iter()
                .filter_map(|id| match store.get(id) {
                    Some(TaskOutput::Trends(report)) => Some(report.clone()),
                    _ => None,
                })
                .collect()
        };
        if reports.len() != p.context_ids.len() {
            return Err(skill_error(
                "generate_content",
                "context references trends that were never fetched",
            ));
        }

        let draft = draft_content(&p.prompt, &reports);
        let confidence = draft.confidence;
        Ok(SkillOutcome::new(TaskOutput::GeneratedContent(draft), confidence))
    }

    fn validate_content(&self, p: &ContentReviewPayload) -> ChimeraResult<SkillOutcome> {
        let draft = self.generated(&p.content_task_id, "validate_content")?;
        let verdict = review_against_guidelines(&draft.content, &p.guidelines);
        let confidence = verdict.confidence;
        if !verdict.is_valid {
            return Err(skill_error(
                "validate_content",
                format!("content rejected: {}", verdict.violations.join(", ")),
            ));
        }
        Ok(SkillOutcome::new(TaskOutput::ReviewVerdict(verdict), confidence))
    }

    fn publish_post(&self, p: &SocialPublishPayload) -> ChimeraResult<SkillOutcome> {
        if self.offline_platforms.contains(&p.platform) {
            return Err(skill_error(
                "publish_post",
                format!("{} API unavailable", p.platform),
            ));
        }
        if !PLATFORMS.contains(&p.platform.as_str()) {
            return Err(skill_error(
                "publish_post",
                format!("unsupported platform '{}'", p.platform),
            ));
        }
        // Publishing needs the actual post body.
        self.generated(&p.provenance.generator_task_id, "publish_post")?;
        let receipt = publish_receipt(&p.platform);
        Ok(SkillOutcome::new(TaskOutput::PublishReceipt(receipt), 1.0))
    }

    fn execute_transaction(&self, p: &TransactionPayload) -> ChimeraResult<SkillOutcome> {
        if p.amount_usd <= 0.0 {
            return Err(skill_error("wallet", "amount must be positive"));
        }
        if p.amount_usd > WALLET_BALANCE_USD {
            return Err(skill_error(
                "wallet",
                format!(
                    "insufficient funds: {:.2} requested, {:.2} available",
                    p.amount_usd, WALLET_BALANCE_USD
                ),
            ));
        }
        let balance = wallet_after(p.amount_usd);
        Ok(SkillOutcome::new(TaskOutput::WalletBalance(balance), 1.0))
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn store(&self, skill: &str) -> ChimeraResult<MutexGuard<'_, HashMap<TaskId, TaskOutput>>> {
        self.artifacts
            .lock()
            .map_err(|e| skill_error(skill, format!("artifact store poisoned: {e}")))
    }

    fn generated(&self, task_id: &TaskId, skill: &str) -> ChimeraResult<GeneratedContent> {
        match self.store(skill)?.get(task_id) {
            Some(TaskOutput::GeneratedContent(draft)) => Ok(draft.clone()),
            _ => Err(skill_error(
                skill,
                format!("no generated content recorded for task '{task_id}'"),
            )),
        }
    }
}

impl SkillGateway for MockSkillGateway {
    fn invoke(&self, task: &AgentTaskManifest) -> ChimeraResult<SkillOutcome> {
        if self.failing.contains(&task.task_type) {
            return Err(skill_error(
                task.task_type.as_str(),
                "upstream service unavailable",
            ));
        }

        let mut outcome = match task.typed_payload() {
            TaskPayload::AnalyticsFetch(p) => self.fetch_trends(&p)?,
            TaskPayload::ContentGeneration(p) => self.generate_content(&p)?,
            TaskPayload::ContentReview(p) => self.validate_content(&p)?,
            TaskPayload::SocialPublish(p) => self.publish_post(&p)?,
            TaskPayload::TransactionExecute(p) => self.execute_transaction(&p)?,
            TaskPayload::Opaque { task_type, .. } => {
                return Err(skill_error(
                    task_type.as_str(),
                    "payload does not match the task type's input shape",
                ))
            }
        };

        if let Some(confidence) = self.confidence.get(&task.task_type) {
            outcome.confidence = *confidence;
        }

        self.store(task.task_type.as_str())?
            .insert(task.task_id.clone(), outcome.output.clone());
        debug!(task_id = %task.task_id, task_type = %task.task_type, confidence = outcome.confidence, "skill completed");
        Ok(outcome)
    }
}

fn skill_error(skill: &str, reason: impl Into<String>) -> ChimeraError {
    ChimeraError::Skill {
        skill: skill.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Map};

    use chimera_contracts::{
        campaign::CampaignId,
        error::ChimeraError,
        payload::{
            AnalyticsFetchPayload, ContentGenerationPayload, ContentReviewPayload, Provenance,
            SocialPublishPayload, TaskOutput, TaskPayload, TransactionPayload,
        },
        task::{AgentTaskManifest, PlannerId, TaskType},
    };
    use chimera_core::traits::SkillGateway;

    use super::MockSkillGateway;

    fn manifest(payload: TaskPayload) -> AgentTaskManifest {
        AgentTaskManifest::new(
            CampaignId("camp-1".to_string()),
            PlannerId("planner-001".to_string()),
            Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap(),
            payload,
        )
        .unwrap()
    }

    fn fetch(platform: &str) -> AgentTaskManifest {
        manifest(TaskPayload::AnalyticsFetch(AnalyticsFetchPayload {
            platform: platform.to_string(),
            category: "fashion".to_string(),
            region: "US".to_string(),
        }))
    }

    fn generate(context: &AgentTaskManifest) -> AgentTaskManifest {
        manifest(TaskPayload::ContentGeneration(ContentGenerationPayload {
            prompt: "Create content for Summer Drop".to_string(),
            content_type: "post".to_string(),
            context_ids: vec![context.task_id.clone()],
        }))
    }

    #[test]
    fn fetch_returns_ranked_trends() {
        let gateway = MockSkillGateway::new();
        let outcome = gateway.invoke(&fetch("twitter")).unwrap();
        let TaskOutput::Trends(report) = outcome.output else {
            panic!("expected trends");
        };
        assert_eq!(report.platform, "twitter");
        assert_eq!(report.trends.len(), 5);
        assert_eq!(report.trends[0].topic, "#twitterFashion0");
        assert!(report.trends[0].volume > report.trends[4].volume);
    }

    #[test]
    fn fetch_rejects_unknown_platform() {
        let err = MockSkillGateway::new().invoke(&fetch("myspace")).unwrap_err();
        assert!(matches!(err, ChimeraError::Skill { ref skill, .. } if skill == "fetch_trends"));
    }

    #[test]
    fn generation_reads_fetched_trends() {
        let gateway = MockSkillGateway::new();
        let f = fetch("instagram");
        gateway.invoke(&f).unwrap();

        let outcome = gateway.invoke(&generate(&f)).unwrap();
        assert_eq!(outcome.confidence, 0.85);
        let TaskOutput::GeneratedContent(draft) = outcome.output else {
            panic!("expected generated content");
        };
        assert!(draft.content.starts_with("Generated content for prompt: Create content for Summer Drop"));
        assert_eq!(draft.citations, vec!["#instagramFashion0".to_string()]);
    }

    #[test]
    fn generation_without_fetched_context_fails() {
        let gateway = MockSkillGateway::new();
        let never_run = fetch("twitter");
        assert!(gateway.invoke(&generate(&never_run)).is_err());
    }

    #[test]
    fn review_and_publish_use_the_generated_post() {
        let gateway = MockSkillGateway::new();
        let f = fetch("twitter");
        let g = generate(&f);
        gateway.invoke(&f).unwrap();
        gateway.invoke(&g).unwrap();

        let mut guidelines = Map::new();
        guidelines.insert("banned_terms".to_string(), json!(["miracle"]));
        let review = manifest(TaskPayload::ContentReview(ContentReviewPayload {
            content_task_id: g.task_id.clone(),
            guidelines,
        }));
        let verdict = gateway.invoke(&review).unwrap();
        assert_eq!(verdict.confidence, 0.95);

        let publish = manifest(TaskPayload::SocialPublish(SocialPublishPayload {
            platform: "twitter".to_string(),
            provenance: Provenance {
                campaign_id: "camp-1".to_string(),
                generator_task_id: g.task_id.clone(),
            },
        }));
        let TaskOutput::PublishReceipt(receipt) = gateway.invoke(&publish).unwrap().output else {
            panic!("expected a receipt");
        };
        assert!(receipt.post_id.starts_with("twitter:"));
        assert!(receipt.receipt_id.starts_with("receipt:"));
        assert!(gateway.artifact(&publish.task_id).unwrap().is_some());
    }

    #[test]
    fn review_rejects_banned_terms() {
        let gateway = MockSkillGateway::new();
        let f = fetch("twitter");
        let g = generate(&f);
        gateway.invoke(&f).unwrap();
        gateway.invoke(&g).unwrap();

        let mut guidelines = Map::new();
        guidelines.insert("banned_terms".to_string(), json!(["SUMMER"]));
        let review = manifest(TaskPayload::ContentReview(ContentReviewPayload {
            content_task_id: g.task_id.clone(),
            guidelines,
        }));
        let err = gateway.invoke(&review).unwrap_err();
        assert!(err.to_string().contains("banned term"));
    }

    #[test]
    fn offline_platform_and_failing_type_are_injected() {
        let gateway = MockSkillGateway::new()
            .failing(TaskType::AnalyticsFetch)
            .platform_offline("tiktok");
        assert!(gateway.invoke(&fetch("twitter")).is_err());

        let publish = manifest(TaskPayload::SocialPublish(SocialPublishPayload {
            platform: "tiktok".to_string(),
            provenance: Provenance {
                campaign_id: "camp-1".to_string(),
                generator_task_id: fetch("twitter").task_id,
            },
        }));
        let err = gateway.invoke(&publish).unwrap_err();
        assert!(err.to_string().contains("tiktok API unavailable"));
    }

    #[test]
    fn confidence_override_applies() {
        let gateway = MockSkillGateway::new().with_confidence(TaskType::AnalyticsFetch, 0.3);
        assert_eq!(gateway.invoke(&fetch("reddit")).unwrap().confidence, 0.3);
    }

    #[test]
    fn wallet_checks_funds() {
        let gateway = MockSkillGateway::new();
        let spend = |amount_usd| {
            manifest(TaskPayload::TransactionExecute(TransactionPayload {
                amount_usd,
                memo: "boost post".to_string(),
            }))
        };
        let TaskOutput::WalletBalance(balance) = gateway.invoke(&spend(40.0)).unwrap().output
        else {
            panic!("expected a balance");
        };
        assert_eq!(balance.balance, 60.0);
        assert_eq!(balance.currency, "USD");
        assert!(gateway.invoke(&spend(250.0)).is_err());
    }

    #[test]
    fn opaque_payload_is_refused() {
        let task = manifest(TaskPayload::Opaque {
            task_type: TaskType::SocialPublish,
            body: Map::new(),
        });
        assert!(MockSkillGateway::new().invoke(&task).is_err());
    }
}
