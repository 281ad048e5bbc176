//! Validation report returned by the schema validator.

use serde::{Deserialize, Serialize};

/// Outcome of validating one manifest or result.
///
/// `errors` is ordered: missing required fields first, then type errors,
/// enum violations, range violations, and finally contract rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// True when any error message mentions `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.errors.iter().any(|e| e.contains(needle))
    }
}
