//! # chimera-policy
//!
//! A TOML-driven, block-by-default recovery policy for the Chimera
//! orchestrator.
//!
//! When a task ends FAILED, TIMED_OUT or ESCALATED, the orchestrator asks its
//! `RecoveryPolicy` what to do with the rest of the campaign.
//! [`TomlRecoveryPolicy`] answers from an ordered rule list; the first
//! matching rule wins, and when none match the dependents simply stay
//! blocked.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use chimera_policy::TomlRecoveryPolicy;
//!
//! let policy = TomlRecoveryPolicy::from_file(Path::new("policies/recovery.toml"))?;
//! // Pass `policy` to `chimera_core::Orchestrator::start(...)`.
//! ```

pub mod engine;
pub mod rule;

pub use engine::TomlRecoveryPolicy;
pub use rule::{RecoveryConfig, RecoveryRule, RuleAction};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chimera_contracts::{
        campaign::CampaignId,
        error::ChimeraError,
        recovery::{FailureOutcome, RecoveryAction, RecoveryContext},
        task::{TaskId, TaskType},
    };
    use chimera_core::traits::RecoveryPolicy;

    use crate::TomlRecoveryPolicy;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn ctx(task_type: TaskType, outcome: FailureOutcome, dependents: usize) -> RecoveryContext {
        RecoveryContext {
            campaign_id: CampaignId("camp-1".to_string()),
            task_id: TaskId("task-1".to_string()),
            task_type,
            outcome,
            dependent_count: dependents,
        }
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[test]
    fn empty_policy_blocks() {
        let policy = TomlRecoveryPolicy::from_toml_str("rules = []").unwrap();
        let action = policy
            .decide(&ctx(TaskType::AnalyticsFetch, FailureOutcome::Failed, 1))
            .unwrap();
        assert_eq!(action, RecoveryAction::Block);
    }

    #[test]
    fn matching_rule_aborts_with_its_reason() {
        let policy = TomlRecoveryPolicy::from_toml_str(
            r#"
            [[rules]]
            id = "abort-on-failed-fetch"
            description = "No trend data, no campaign"
            task_type = "analytics_fetch"
            outcome = "failed"
            action = "abort"
            reason = "trend data unavailable"
            "#,
        )
        .unwrap();

        let action = policy
            .decide(&ctx(TaskType::AnalyticsFetch, FailureOutcome::Failed, 1))
            .unwrap();
        assert_eq!(
            action,
            RecoveryAction::Abort {
                reason: "trend data unavailable".to_string()
            }
        );

        // Same task type, different outcome: falls through to block.
        let action = policy
            .decide(&ctx(TaskType::AnalyticsFetch, FailureOutcome::TimedOut, 1))
            .unwrap();
        assert_eq!(action, RecoveryAction::Block);
    }

    #[test]
    fn wildcards_and_first_match() {
        let policy = TomlRecoveryPolicy::from_toml_str(
            r#"
            [[rules]]
            id = "hold-escalations"
            task_type = "*"
            outcome = "escalated"
            action = "block"

            [[rules]]
            id = "replan-anything-else"
            task_type = "*"
            outcome = "*"
            action = "replan"
            "#,
        )
        .unwrap();
        assert_eq!(policy.rule_count(), 2);

        assert_eq!(
            policy
                .decide(&ctx(TaskType::ContentGeneration, FailureOutcome::Escalated, 1))
                .unwrap(),
            RecoveryAction::Block
        );
        match policy
            .decide(&ctx(TaskType::SocialPublish, FailureOutcome::TimedOut, 0))
            .unwrap()
        {
            RecoveryAction::Replan { reason } => {
                assert!(reason.contains("social_publish timed-out"), "{reason}");
                assert!(reason.contains("replan-anything-else"), "{reason}");
            }
            other => panic!("expected Replan, got {other:?}"),
        }
    }

    #[test]
    fn min_dependents_narrows_a_rule() {
        let policy = TomlRecoveryPolicy::from_toml_str(
            r#"
            [[rules]]
            id = "replan-wide-branches"
            task_type = "content_generation"
            outcome = "failed"
            min_dependents = 2
            action = "replan"
            reason = "regenerate for every platform"
            "#,
        )
        .unwrap();

        assert_eq!(
            policy
                .decide(&ctx(TaskType::ContentGeneration, FailureOutcome::Failed, 1))
                .unwrap(),
            RecoveryAction::Block
        );
        assert!(matches!(
            policy
                .decide(&ctx(TaskType::ContentGeneration, FailureOutcome::Failed, 3))
                .unwrap(),
            RecoveryAction::Replan { .. }
        ));
    }

    #[test]
    fn unknown_outcome_is_a_config_error() {
        let result = TomlRecoveryPolicy::from_toml_str(
            r#"
            [[rules]]
            id = "typo"
            task_type = "*"
            outcome = "timeout"
            action = "abort"
            "#,
        );
        match result {
            Err(ChimeraError::ConfigError { reason }) => {
                assert!(reason.contains("timeout"), "{reason}");
            }
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let result = TomlRecoveryPolicy::from_toml_str("this is not valid toml ][[[");
        match result {
            Err(ChimeraError::ConfigError { reason }) => {
                assert!(reason.contains("failed to parse recovery policy TOML"));
            }
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let result = TomlRecoveryPolicy::from_file(std::path::Path::new(
            "/nonexistent/recovery.toml",
        ));
        assert!(matches!(result, Err(ChimeraError::ConfigError { .. })));
    }
}
