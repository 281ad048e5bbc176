//! # chimera-contracts
//!
//! Shared campaign, task and result contracts for the Chimera agent swarm.
//!
//! Planner, workers and the judging stage interoperate only through the types
//! in this crate. No business logic lives here: only data definitions,
//! constructors and the error taxonomy.

pub mod campaign;
pub mod error;
pub mod lifecycle;
pub mod payload;
pub mod recovery;
pub mod result;
pub mod task;
pub mod telemetry;
pub mod validation;

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use campaign::{CampaignId, CampaignManifest};
    use error::ChimeraError;
    use lifecycle::TaskState;
    use payload::{
        AnalyticsFetchPayload, ContentGenerationPayload, GeneratedContent, TaskOutput,
        TaskPayload,
    };
    use result::{AgentTaskResult, ResultStatus, TaskError};
    use task::{AgentTaskManifest, PlannerId, Priority, TaskId, TaskType, WorkerId};

    fn fetch_payload() -> TaskPayload {
        TaskPayload::AnalyticsFetch(AnalyticsFetchPayload {
            platform: "instagram".to_string(),
            category: "fashion".to_string(),
            region: "US".to_string(),
        })
    }

    // ── CampaignManifest ─────────────────────────────────────────────────────

    #[test]
    fn campaign_from_json_parses_nested_sections() {
        let campaign = CampaignManifest::from_json(
            r#"{
                "campaign_id": "camp-1",
                "goal": "Promote summer collection",
                "budget_limit_usd": 1000.0,
                "target_audience": { "regions": ["US", "EU"], "demographics": ["GenZ"] },
                "constraints": { "platforms": ["instagram", "tiktok"] }
            }"#,
        )
        .unwrap();

        assert_eq!(campaign.require_structure().unwrap().0, "camp-1");
        assert_eq!(campaign.primary_platform(), Some("instagram"));
        assert_eq!(campaign.primary_region(), Some("US"));
        assert!(campaign.intent.is_none());
    }

    #[test]
    fn campaign_from_json_rejects_non_json() {
        match CampaignManifest::from_json("not json at all") {
            Err(ChimeraError::MalformedInput { reason }) => {
                assert!(reason.contains("campaign manifest"));
            }
            other => panic!("expected MalformedInput, got {:?}", other),
        }
    }

    #[test]
    fn campaign_missing_platforms_is_invalid() {
        let campaign = CampaignManifest::from_json(
            r#"{ "campaign_id": "camp-2", "goal": "x", "target_audience": { "regions": ["US"] } }"#,
        )
        .unwrap();

        match campaign.require_structure() {
            Err(ChimeraError::InvalidCampaign { reason }) => {
                assert!(reason.contains("constraints.platforms"), "got: {reason}");
            }
            other => panic!("expected InvalidCampaign, got {:?}", other),
        }
    }

    #[test]
    fn campaign_without_goal_is_invalid() {
        for raw in [
            r#"{ "campaign_id": "camp-3", "constraints": { "platforms": ["twitter"] },
                 "target_audience": { "regions": ["US"] } }"#,
            r#"{ "campaign_id": "camp-3", "goal": "   ", "constraints": { "platforms": ["twitter"] },
                 "target_audience": { "regions": ["US"] } }"#,
        ] {
            let campaign = CampaignManifest::from_json(raw).unwrap();
            match campaign.require_structure() {
                Err(ChimeraError::InvalidCampaign { reason }) => {
                    assert!(reason.contains("goal"), "got: {reason}");
                }
                other => panic!("expected InvalidCampaign, got {:?}", other),
            }
        }
    }

    #[test]
    fn campaign_blank_id_is_invalid() {
        let campaign = CampaignManifest::from_json(
            r#"{ "campaign_id": "  ", "constraints": { "platforms": ["x"] },
                 "target_audience": { "regions": ["US"] } }"#,
        )
        .unwrap();
        assert!(matches!(
            campaign.require_structure(),
            Err(ChimeraError::InvalidCampaign { .. })
        ));
    }

    // ── AgentTaskManifest ────────────────────────────────────────────────────

    #[test]
    fn manifest_wire_form_uses_contract_field_names() {
        let manifest = AgentTaskManifest::new(
            CampaignId("camp-1".to_string()),
            PlannerId("planner-001".to_string()),
            Utc::now(),
            fetch_payload(),
        )
        .unwrap()
        .with_priority(Priority::High);

        let value = manifest.to_value().unwrap();
        assert_eq!(value["task_type"], json!("analytics_fetch"));
        assert_eq!(value["priority"], json!("HIGH"));
        assert_eq!(value["planner_soul_id"], json!("planner-001"));
        assert_eq!(value["payload"]["platform"], json!("instagram"));
        assert_eq!(value["dependencies"], json!([]));
    }

    #[test]
    fn manifest_depends_on_ignores_repeats() {
        let upstream = TaskId::generate();
        let manifest = AgentTaskManifest::new(
            CampaignId("camp-1".to_string()),
            PlannerId("p".to_string()),
            Utc::now(),
            fetch_payload(),
        )
        .unwrap()
        .depends_on(&upstream)
        .depends_on(&upstream);

        assert_eq!(manifest.dependencies, vec![upstream]);
    }

    #[test]
    fn typed_payload_falls_back_to_opaque() {
        let mut manifest = AgentTaskManifest::new(
            CampaignId("camp-1".to_string()),
            PlannerId("p".to_string()),
            Utc::now(),
            fetch_payload(),
        )
        .unwrap();
        assert!(matches!(manifest.typed_payload(), TaskPayload::AnalyticsFetch(_)));

        manifest.payload = json!({ "experimental": true }).as_object().unwrap().clone();
        match manifest.typed_payload() {
            TaskPayload::Opaque { task_type, body } => {
                assert_eq!(task_type, TaskType::AnalyticsFetch);
                assert_eq!(body["experimental"], json!(true));
            }
            other => panic!("expected Opaque, got {:?}", other),
        }
    }

    #[test]
    fn generation_payload_keeps_context_ids() {
        let fetch_id = TaskId::generate();
        let payload = TaskPayload::ContentGeneration(ContentGenerationPayload {
            prompt: "Create content".to_string(),
            content_type: "post".to_string(),
            context_ids: vec![fetch_id.clone()],
        });
        let body = payload.into_object().unwrap();
        assert_eq!(body["context_ids"], json!([fetch_id.0]));
    }

    // ── AgentTaskResult ──────────────────────────────────────────────────────

    #[test]
    fn failed_result_carries_error_and_confidence() {
        let result = AgentTaskResult::failed(
            TaskId::generate(),
            WorkerId("worker-1".to_string()),
            Utc::now(),
            0.0,
            TaskError::new("skill_error", "upstream unavailable"),
        );
        let value = result.to_value().unwrap();
        assert_eq!(value["status"], json!("FAILED"));
        assert_eq!(value["confidence"], json!(0.0));
        assert_eq!(value["error"]["code"], json!("skill_error"));
        assert!(value.get("proof").is_none());
    }

    #[test]
    fn success_output_decodes_back_to_typed_variant() {
        let result = AgentTaskResult::success(
            TaskId::generate(),
            WorkerId("worker-1".to_string()),
            Utc::now(),
            0.85,
            TaskOutput::GeneratedContent(GeneratedContent {
                content: "hello".to_string(),
                confidence: 0.85,
                citations: vec![],
            }),
        )
        .unwrap();

        assert_eq!(result.status, ResultStatus::Success);
        assert!(matches!(
            TaskOutput::decode(TaskType::ContentGeneration, &result.output),
            TaskOutput::GeneratedContent(_)
        ));
    }

    // ── TaskState ────────────────────────────────────────────────────────────

    #[test]
    fn only_non_success_terminals_block_dependents() {
        assert!(!TaskState::Succeeded.blocks_dependents());
        assert!(!TaskState::Dispatched.blocks_dependents());
        assert!(TaskState::Failed.blocks_dependents());
        assert!(TaskState::TimedOut.blocks_dependents());
        assert!(TaskState::Escalated.blocks_dependents());
        assert!(TaskState::Cancelled.blocks_dependents());
        assert_eq!(TaskState::TimedOut.to_string(), "TIMED_OUT");
    }

    // ── ChimeraError display messages ────────────────────────────────────────

    #[test]
    fn validation_error_lists_every_field() {
        let err = ChimeraError::Validation {
            errors: vec!["\"task_type\" is a required property".to_string(), "bad".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("task_type"));
        assert!(msg.contains("bad"));
    }

    #[test]
    fn duplicate_result_display_names_both_statuses() {
        let err = ChimeraError::DuplicateResult {
            task_id: "t-1".to_string(),
            recorded: "SUCCEEDED".to_string(),
            submitted: "FAILED".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("SUCCEEDED"));
        assert!(msg.contains("FAILED"));
    }
}
