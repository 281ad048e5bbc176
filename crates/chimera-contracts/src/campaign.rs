//! Campaign manifest: the operator-supplied input to the planner.
//!
//! Nested sections default to empty so that a manifest missing them still
//! deserializes; the planner then rejects it with `InvalidCampaign`, which
//! keeps structural preconditions out of serde error messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ChimeraError, ChimeraResult};

/// Stable identifier of a campaign, referenced by every task it decomposes into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampaignId(pub String);

impl std::fmt::Display for CampaignId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who the campaign is aimed at.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetAudience {
    /// Ordered region codes (e.g. "US", "EU"). The first entry drives trend lookups.
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub demographics: Vec<String>,
}

/// Where and how the campaign may run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignConstraints {
    /// Ordered platform names. The first entry is the primary platform.
    #[serde(default)]
    pub platforms: Vec<String>,
}

/// A high-level marketing objective. Read-only once planning begins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignManifest {
    #[serde(default)]
    pub campaign_id: Option<CampaignId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub budget_limit_usd: f64,
    #[serde(default)]
    pub target_audience: TargetAudience,
    #[serde(default)]
    pub constraints: CampaignConstraints,
    /// Key selecting the decomposition strategy. `None` means the planner default.
    #[serde(default)]
    pub intent: Option<String>,
    /// Trend category hint for analytics fetches.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

impl CampaignManifest {
    /// Parse a manifest from JSON text at the intake boundary.
    ///
    /// Text that is not a JSON object fails hard with `MalformedInput`.
    pub fn from_json(text: &str) -> ChimeraResult<Self> {
        serde_json::from_str(text).map_err(|e| ChimeraError::MalformedInput {
            reason: format!("campaign manifest is not a valid JSON object: {e}"),
        })
    }

    /// Check the structural preconditions every decomposition relies on.
    ///
    /// Returns the campaign id on success so callers do not re-unwrap it.
    pub fn require_structure(&self) -> ChimeraResult<&CampaignId> {
        let campaign_id = match &self.campaign_id {
            Some(id) if !id.0.trim().is_empty() => id,
            _ => {
                return Err(ChimeraError::InvalidCampaign {
                    reason: "campaign_id is required".to_string(),
                })
            }
        };
        if self.goal.trim().is_empty() {
            return Err(ChimeraError::InvalidCampaign {
                reason: format!("campaign '{campaign_id}' has no goal"),
            });
        }
        if self.constraints.platforms.is_empty() {
            return Err(ChimeraError::InvalidCampaign {
                reason: format!("campaign '{campaign_id}' has no constraints.platforms"),
            });
        }
        if self.target_audience.regions.is_empty() {
            return Err(ChimeraError::InvalidCampaign {
                reason: format!("campaign '{campaign_id}' has no target_audience.regions"),
            });
        }
        Ok(campaign_id)
    }

    /// The first platform in the constraint list, if any.
    pub fn primary_platform(&self) -> Option<&str> {
        self.constraints.platforms.first().map(String::as_str)
    }

    /// The first region in the audience descriptor, if any.
    pub fn primary_region(&self) -> Option<&str> {
        self.target_audience.regions.first().map(String::as_str)
    }
}
