//! Contract validator for task manifests and task results.
//!
//! `SchemaValidator` implements the `ContractValidator` trait from
//! `chimera-core`. Validation runs in two phases:
//!
//! 1. **Structural**: the document is checked against the bundled JSON
//!    Schema with the `jsonschema` crate. Every violation is collected and
//!    the list is ordered by kind: missing required fields, then type
//!    errors, then enum violations, then numeric ranges.
//! 2. **Contract**: rules a schema cannot express (timestamp syntax,
//!    self-dependency, the `error` object on non-success results) run on
//!    whatever fields passed phase 1.
//!
//! The validator never panics or returns `Err` for a well-formed JSON value;
//! malformed input is rejected at the parsing boundary before it gets here.

use std::collections::HashSet;

use chrono::DateTime;
use jsonschema::Validator;
use serde_json::Value;
use tracing::{debug, warn};

use chimera_contracts::{
    error::{ChimeraError, ChimeraResult},
    validation::ValidationReport,
};
use chimera_core::traits::ContractValidator;

const MANIFEST_SCHEMA: &str = include_str!("../schemas/task_manifest.json");
const RESULT_SCHEMA: &str = include_str!("../schemas/task_result.json");

/// Validates manifests and results against the task contracts.
///
/// Both schemas are compiled once at construction; the validator holds no
/// mutable state and can be shared across threads freely.
pub struct SchemaValidator {
    manifest: Validator,
    result: Validator,
}

impl SchemaValidator {
    /// Compile the bundled manifest and result schemas.
    ///
    /// # Errors
    ///
    /// `ConfigError` if either schema document fails to parse or compile.
    pub fn new() -> ChimeraResult<Self> {
        Ok(Self {
            manifest: compile("task manifest", MANIFEST_SCHEMA)?,
            result: compile("task result", RESULT_SCHEMA)?,
        })
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    /// Run the schema and return its errors in reporting order.
    fn structural_errors(validator: &Validator, instance: &Value) -> Vec<String> {
        let mut ranked: Vec<(u8, String)> = validator
            .iter_errors(instance)
            .map(|error| {
                let schema_path = error.schema_path.to_string();
                let keyword = schema_path.rsplit('/').next().unwrap_or_default();
                let field = error.instance_path.to_string();
                let message = if field.is_empty() {
                    error.to_string()
                } else {
                    format!("{}: {}", field.trim_start_matches('/'), error)
                };
                (phase(keyword), message)
            })
            .collect();
        // Stable, so the schema's own order is kept within a phase.
        ranked.sort_by_key(|(rank, _)| *rank);
        ranked.into_iter().map(|(_, message)| message).collect()
    }

    fn manifest_rules(manifest: &Value, errors: &mut Vec<String>) {
        check_timestamp(manifest, "created_at", errors);

        let Some(dependencies) = manifest.get("dependencies").and_then(Value::as_array) else {
            return;
        };
        let own_id = manifest.get("task_id").and_then(Value::as_str);
        let mut seen = HashSet::new();
        for dep in dependencies.iter().filter_map(Value::as_str) {
            if Some(dep) == own_id {
                errors.push(format!("dependencies: task '{dep}' cannot depend on itself"));
            }
            if !seen.insert(dep) {
                errors.push(format!("dependencies: '{dep}' is listed more than once"));
            }
        }
    }

    fn result_rules(result: &Value, errors: &mut Vec<String>) {
        check_timestamp(result, "completed_at", errors);

        let status = result.get("status").and_then(Value::as_str);
        if let Some(status @ ("FAILED" | "ESCALATED")) = status {
            if !result.get("error").is_some_and(Value::is_object) {
                errors.push(format!("error: an error object is required when status is {status}"));
            }
        }
    }
}

impl ContractValidator for SchemaValidator {
    fn validate_manifest(&self, manifest: &Value) -> ValidationReport {
        let mut errors = Self::structural_errors(&self.manifest, manifest);
        Self::manifest_rules(manifest, &mut errors);
        report("manifest", manifest, errors)
    }

    fn validate_result(&self, result: &Value) -> ValidationReport {
        let mut errors = Self::structural_errors(&self.result, result);
        Self::result_rules(result, &mut errors);
        report("result", result, errors)
    }
}

fn compile(name: &str, source: &str) -> ChimeraResult<Validator> {
    let schema: Value = serde_json::from_str(source).map_err(|e| ChimeraError::ConfigError {
        reason: format!("{name} schema is not valid JSON: {e}"),
    })?;
    jsonschema::validator_for(&schema).map_err(|e| ChimeraError::ConfigError {
        reason: format!("{name} schema does not compile: {e}"),
    })
}

/// Reporting order of a failed schema keyword.
fn phase(keyword: &str) -> u8 {
    match keyword {
        "required" => 0,
        "type" => 1,
        "enum" => 2,
        "minimum" | "maximum" | "exclusiveMinimum" | "exclusiveMaximum" => 3,
        _ => 4,
    }
}

/// Flag `field` when it is a string that does not parse as RFC 3339.
/// Absent or non-string values were already reported by the schema.
fn check_timestamp(document: &Value, field: &str, errors: &mut Vec<String>) {
    if let Some(text) = document.get(field).and_then(Value::as_str) {
        if DateTime::parse_from_rfc3339(text).is_err() {
            errors.push(format!("{field}: '{text}' is not an RFC 3339 timestamp"));
        }
    }
}

fn report(kind: &str, document: &Value, errors: Vec<String>) -> ValidationReport {
    let task_id = document
        .get("task_id")
        .and_then(Value::as_str)
        .unwrap_or("<missing>");
    if errors.is_empty() {
        debug!(task_id, kind, "contract validation passed");
    } else {
        warn!(task_id, kind, error_count = errors.len(), "contract validation failed");
    }
    ValidationReport::from_errors(errors)
}
