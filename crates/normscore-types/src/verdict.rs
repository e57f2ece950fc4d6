// ─────────────────────────────────────────────────────────────────────
// Normscore — Structural Verdict
// ─────────────────────────────────────────────────────────────────────

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// First structural rule a trace broke.
///
/// Recoverable: the run keeps scoring and the report carries this value.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuralViolation {
    #[error("initial marking already covers forbidden set {places:?}")]
    ForbiddenInitialMarking { places: Vec<String> },

    #[error("event {event_index}: transition '{transition}' is not declared in the net")]
    UnknownTransition { transition: String, event_index: usize },

    #[error("event {event_index}: transition '{transition}' not enabled (empty input places {missing:?})")]
    NotEnabled {
        transition: String,
        event_index: usize,
        missing: Vec<String>,
    },

    #[error("event {event_index}: firing '{transition}' reached forbidden marking {places:?}")]
    ForbiddenState {
        transition: String,
        event_index: usize,
        places: Vec<String>,
    },

    #[error("mandatory surgits never fired: {missing:?}")]
    MissingMandatory { missing: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationStatus {
    Valid,
    Invalid,
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("VALID"),
            Self::Invalid => f.write_str("INVALID"),
        }
    }
}

/// Outcome of structural validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub status: ValidationStatus,
    pub message: String,
    pub violation: Option<StructuralViolation>,
    /// Transitions fired before the verdict was reached, in order.
    pub fired: Vec<String>,
}

impl ValidationVerdict {
    pub fn valid(fired: Vec<String>) -> Self {
        Self {
            status: ValidationStatus::Valid,
            message: "Structure Valid".to_string(),
            violation: None,
            fired,
        }
    }

    pub fn invalid(violation: StructuralViolation, fired: Vec<String>) -> Self {
        Self {
            status: ValidationStatus::Invalid,
            message: violation.to_string(),
            violation: Some(violation),
            fired,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status == ValidationStatus::Valid
    }
}
