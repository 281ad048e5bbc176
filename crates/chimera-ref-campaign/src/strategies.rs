//! Reviewed launch: a fan-out/fan-in decomposition for multi-platform campaigns.
//!
//!   fetch(p1) ─┐                      ┌─ publish(p1)
//!   fetch(p2) ─┼─ generate ─ review ──┼─ publish(p2)
//!   fetch(pN) ─┘                      └─ publish(pN)
//!
//! One trend fetch per target platform feeds a single generation task, which
//! a brand-safety review must pass before anything is published. Each
//! platform then gets its own publish task, so an outage on one platform
//! leaves the others free to finish.

use serde_json::{json, Map, Value};
use tracing::debug;

use chimera_contracts::{
    campaign::CampaignManifest,
    error::{ChimeraError, ChimeraResult},
    payload::{
        AnalyticsFetchPayload, ContentGenerationPayload, ContentReviewPayload, Provenance,
        SocialPublishPayload, TaskPayload,
    },
    task::{AgentTaskManifest, Priority},
};
use chimera_core::traits::{DecompositionStrategy, PlanningContext};

pub const REVIEWED_LAUNCH_INTENT: &str = "reviewed_launch";

#[derive(Debug, Clone)]
pub struct ReviewedLaunchStrategy {
    pub default_category: String,
    /// Terms the review step rejects, matched case-insensitively.
    pub banned_terms: Vec<String>,
}

impl Default for ReviewedLaunchStrategy {
    fn default() -> Self {
        Self {
            default_category: "fashion".to_string(),
            banned_terms: vec!["guaranteed".to_string(), "miracle".to_string()],
        }
    }
}

impl ReviewedLaunchStrategy {
    fn guidelines(&self, platforms: &[String]) -> Map<String, Value> {
        let mut guidelines = Map::new();
        guidelines.insert("banned_terms".to_string(), json!(self.banned_terms));
        guidelines.insert("platforms".to_string(), json!(platforms));
        guidelines
    }
}

impl DecompositionStrategy for ReviewedLaunchStrategy {
    fn decompose(
        &self,
        campaign: &CampaignManifest,
        ctx: &PlanningContext<'_>,
    ) -> ChimeraResult<Vec<AgentTaskManifest>> {
        let platforms = &campaign.constraints.platforms;
        let region = campaign
            .primary_region()
            .ok_or_else(|| ChimeraError::InvalidCampaign {
                reason: "target_audience.regions is empty".to_string(),
            })?;
        let category = campaign
            .category
            .clone()
            .unwrap_or_else(|| self.default_category.clone());

        let task = |payload: TaskPayload| {
            AgentTaskManifest::new(
                ctx.campaign_id.clone(),
                ctx.planner_id.clone(),
                ctx.now,
                payload,
            )
        };

        let fetches = platforms
            .iter()
            .map(|platform| -> ChimeraResult<AgentTaskManifest> {
                Ok(task(TaskPayload::AnalyticsFetch(AnalyticsFetchPayload {
                    platform: platform.clone(),
                    category: category.clone(),
                    region: region.to_string(),
                }))?
                .with_priority(Priority::High)
                .with_timeout(300))
            })
            .collect::<ChimeraResult<Vec<_>>>()?;

        let mut generate = task(TaskPayload::ContentGeneration(ContentGenerationPayload {
            prompt: format!("Create content for {}", campaign.goal),
            content_type: "post".to_string(),
            context_ids: fetches.iter().map(|f| f.task_id.clone()).collect(),
        }))?
        .with_timeout(600);
        for fetch in &fetches {
            generate = generate.depends_on(&fetch.task_id);
        }

        let review = task(TaskPayload::ContentReview(ContentReviewPayload {
            content_task_id: generate.task_id.clone(),
            guidelines: self.guidelines(platforms),
        }))?
        .with_timeout(300)
        .depends_on(&generate.task_id);

        let publishes = platforms
            .iter()
            .map(|platform| -> ChimeraResult<AgentTaskManifest> {
                Ok(task(TaskPayload::SocialPublish(SocialPublishPayload {
                    platform: platform.clone(),
                    provenance: Provenance {
                        campaign_id: ctx.campaign_id.0.clone(),
                        generator_task_id: generate.task_id.clone(),
                    },
                }))?
                .with_timeout(300)
                .depends_on(&review.task_id))
            })
            .collect::<ChimeraResult<Vec<_>>>()?;

        debug!(
            campaign_id = %ctx.campaign_id,
            platforms = platforms.len(),
            generate = %generate.task_id,
            review = %review.task_id,
            "reviewed-launch batch assembled"
        );

        let mut batch = fetches;
        batch.push(generate);
        batch.push(review);
        batch.extend(publishes);
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use chimera_contracts::{
        campaign::CampaignManifest,
        payload::TaskPayload,
        task::{PlannerId, Priority, TaskType},
    };
    use chimera_core::{CampaignPlanner, DEFAULT_PLANNER_ID};
    use chimera_verify::SchemaValidator;

    use super::{ReviewedLaunchStrategy, REVIEWED_LAUNCH_INTENT};

    fn campaign(platforms: &[&str]) -> CampaignManifest {
        let text = serde_json::json!({
            "campaign_id": "camp-launch",
            "goal": "Autumn Capsule",
            "intent": REVIEWED_LAUNCH_INTENT,
            "target_audience": { "regions": ["EU", "US"] },
            "constraints": { "platforms": platforms }
        })
        .to_string();
        CampaignManifest::from_json(&text).unwrap()
    }

    fn planner() -> CampaignPlanner {
        let mut planner = CampaignPlanner::new(
            PlannerId(DEFAULT_PLANNER_ID.to_string()),
            Box::new(SchemaValidator::new().unwrap()),
        );
        planner.register(REVIEWED_LAUNCH_INTENT, Box::new(ReviewedLaunchStrategy::default()));
        planner
    }

    #[test]
    fn fans_out_per_platform_and_back_in_at_review() {
        let graph = planner()
            .plan_graph(&campaign(&["twitter", "instagram", "tiktok"]))
            .unwrap();
        assert_eq!(graph.len(), 8);

        let by_type = |t: TaskType| graph.manifests().filter(|m| m.task_type == t).count();
        assert_eq!(by_type(TaskType::AnalyticsFetch), 3);
        assert_eq!(by_type(TaskType::ContentGeneration), 1);
        assert_eq!(by_type(TaskType::ContentReview), 1);
        assert_eq!(by_type(TaskType::SocialPublish), 3);

        let generate = graph
            .manifests()
            .find(|m| m.task_type == TaskType::ContentGeneration)
            .unwrap();
        assert_eq!(generate.dependencies.len(), 3);
        assert_eq!(generate.timeout_seconds, 600);
        let TaskPayload::ContentGeneration(payload) = generate.typed_payload() else {
            panic!("expected a generation payload");
        };
        assert_eq!(payload.context_ids, generate.dependencies);

        let review = graph
            .manifests()
            .find(|m| m.task_type == TaskType::ContentReview)
            .unwrap();
        assert_eq!(review.dependencies, vec![generate.task_id.clone()]);

        for publish in graph.manifests().filter(|m| m.task_type == TaskType::SocialPublish) {
            assert_eq!(publish.dependencies, vec![review.task_id.clone()]);
            let TaskPayload::SocialPublish(p) = publish.typed_payload() else {
                panic!("expected a publish payload");
            };
            assert_eq!(p.provenance.generator_task_id, generate.task_id);
            assert_eq!(p.provenance.campaign_id, "camp-launch");
        }
    }

    #[test]
    fn fetches_are_high_priority_in_the_primary_region() {
        let graph = planner().plan_graph(&campaign(&["reddit", "twitter"])).unwrap();
        let fetches: Vec<_> = graph
            .manifests()
            .filter(|m| m.task_type == TaskType::AnalyticsFetch)
            .collect();
        assert_eq!(fetches.len(), 2);
        for fetch in fetches {
            assert_eq!(fetch.priority, Priority::High);
            assert!(fetch.dependencies.is_empty());
            let TaskPayload::AnalyticsFetch(p) = fetch.typed_payload() else {
                panic!("expected a fetch payload");
            };
            assert_eq!(p.region, "EU");
            assert_eq!(p.category, "fashion");
        }
    }

    #[test]
    fn review_carries_brand_guidelines() {
        let graph = planner().plan_graph(&campaign(&["instagram"])).unwrap();
        let review = graph
            .manifests()
            .find(|m| m.task_type == TaskType::ContentReview)
            .unwrap();
        let TaskPayload::ContentReview(p) = review.typed_payload() else {
            panic!("expected a review payload");
        };
        assert_eq!(p.guidelines["banned_terms"], serde_json::json!(["guaranteed", "miracle"]));
        assert_eq!(p.guidelines["platforms"], serde_json::json!(["instagram"]));
    }
}
