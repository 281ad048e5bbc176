//! Built-in decomposition strategies.

use tracing::debug;

use chimera_contracts::{
    campaign::CampaignManifest,
    error::{ChimeraError, ChimeraResult},
    payload::{
        AnalyticsFetchPayload, ContentGenerationPayload, Provenance, SocialPublishPayload,
        TaskPayload,
    },
    task::{AgentTaskManifest, Priority},
};

use crate::traits::{DecompositionStrategy, PlanningContext};

/// Intent key of the trend-jacked content pipeline.
pub const TREND_JACKED_INTENT: &str = "trend_jacked";

/// Trend-jacked content: fetch trends, generate content from them, publish.
///
/// Emits a three-node chain per campaign:
///
/// 1. `analytics_fetch` on the primary platform and region, `HIGH`, 300s
/// 2. `content_generation` prompted by the goal, reading the fetch output, 600s
/// 3. `social_publish` on the primary platform with provenance, 300s
#[derive(Debug, Clone)]
pub struct TrendJackedStrategy {
    /// Trend category used when the campaign does not name one.
    pub default_category: String,
}

impl Default for TrendJackedStrategy {
    fn default() -> Self {
        Self {
            default_category: "fashion".to_string(),
        }
    }
}

impl DecompositionStrategy for TrendJackedStrategy {
    fn decompose(
        &self,
        campaign: &CampaignManifest,
        ctx: &PlanningContext<'_>,
    ) -> ChimeraResult<Vec<AgentTaskManifest>> {
        let (platform, region) = primary_targets(campaign)?;
        let category = campaign
            .category
            .clone()
            .unwrap_or_else(|| self.default_category.clone());

        let fetch = AgentTaskManifest::new(
            ctx.campaign_id.clone(),
            ctx.planner_id.clone(),
            ctx.now,
            TaskPayload::AnalyticsFetch(AnalyticsFetchPayload {
                platform: platform.clone(),
                category,
                region,
            }),
        )?
        .with_priority(Priority::High)
        .with_timeout(300);

        let generate = AgentTaskManifest::new(
            ctx.campaign_id.clone(),
            ctx.planner_id.clone(),
            ctx.now,
            TaskPayload::ContentGeneration(ContentGenerationPayload {
                prompt: format!("Create content for {}", campaign.goal),
                content_type: "post".to_string(),
                context_ids: vec![fetch.task_id.clone()],
            }),
        )?
        .with_timeout(600)
        .depends_on(&fetch.task_id);

        let publish = AgentTaskManifest::new(
            ctx.campaign_id.clone(),
            ctx.planner_id.clone(),
            ctx.now,
            TaskPayload::SocialPublish(SocialPublishPayload {
                platform,
                provenance: Provenance {
                    campaign_id: ctx.campaign_id.0.clone(),
                    generator_task_id: generate.task_id.clone(),
                },
            }),
        )?
        .with_timeout(300)
        .depends_on(&generate.task_id);

        debug!(
            campaign_id = %ctx.campaign_id,
            fetch = %fetch.task_id,
            generate = %generate.task_id,
            publish = %publish.task_id,
            "trend-jacked batch assembled"
        );

        Ok(vec![fetch, generate, publish])
    }
}

/// The campaign's first platform and first region.
///
/// Shared by every strategy that targets a primary audience.
pub fn primary_targets(campaign: &CampaignManifest) -> ChimeraResult<(String, String)> {
    let platform = campaign
        .primary_platform()
        .ok_or_else(|| ChimeraError::InvalidCampaign {
            reason: "constraints.platforms is empty".to_string(),
        })?;
    let region = campaign
        .primary_region()
        .ok_or_else(|| ChimeraError::InvalidCampaign {
            reason: "target_audience.regions is empty".to_string(),
        })?;
    Ok((platform.to_string(), region.to_string()))
}
