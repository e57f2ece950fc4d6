// ─────────────────────────────────────────────────────────────────────
// Normscore — Simulation Report
// ─────────────────────────────────────────────────────────────────────
//! Final output of one orchestrated run.
//!
//! [`SimulationReport`] wraps a [`ReportContents`] and only hands out
//! shared references to it, so a report cannot change after assembly.

use std::collections::BTreeMap;
use std::ops::Deref;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{NormscoreError, NormscoreResult};
use crate::trace::PostoperativeOutcome;
use crate::verdict::ValidationVerdict;

/// Global figures of the actual (fully noisy) pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalMetrics {
    /// `Score = α·ρ_SIM + β·S_q(SIM)`.
    pub score: f64,
    /// `S_q(SIM)`, q-sum of step entropies.
    pub entropy: f64,
    /// `ρ_SIM = Σ w_t·Δ_t`.
    pub rho: f64,
    /// Clinical burden after the last event.
    pub final_burden: f64,
    /// Product of outcome-scope mitigation factors (1.0 when none).
    pub outcome_mitigation: f64,
}

/// Step table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepMetric {
    pub step_id: String,
    /// Number of processed events that belong to this step.
    pub m_t: usize,
    pub pi_t: f64,
    pub delta_t: f64,
    pub s_q_t: f64,
    /// `w_t·Δ_t`.
    pub rho_t: f64,
    pub w_t: f64,
}

/// Noise table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseMetric {
    pub surgit_id: String,
    pub n_t: f64,
    pub e_t: f64,
    /// Complexity weight looked up from the template (pauses: None).
    pub complexity_weight: Option<f64>,
    /// Pause length in minutes (pauses only).
    pub pause_duration: Option<f64>,
}

/// Change-event table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEventMetric {
    pub surgit_id: String,
    pub ce_type: String,
    pub timestamp: DateTime<Utc>,
}

/// Outcome bridge row: predicted complication probability.
///
/// `p_k` is the calibrated logistic risk; `p_k_mitigated` applies the
/// trace's outcome-scope mitigation on top of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeMetric {
    pub complication_type: String,
    pub eta_k: f64,
    pub p_k: f64,
    pub p_k_mitigated: f64,
}

/// Expanded-state snapshot after one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceabilityEntry {
    pub event_index: usize,
    pub surgit_id: String,
    pub is_pause: bool,
    pub delta_final: f64,
    pub clinical_burden: f64,
    pub provenance_vector: Vec<f64>,
}

/// Additive breakdown of the actual score by noise source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    /// Score with every noise factor forced to 1.
    pub score_ideal: f64,
    /// Kept at 0.0: intrinsic deviation is already the ideal baseline.
    pub phi_intrinsic: f64,
    pub phi_patient: f64,
    pub phi_external: f64,
    /// Interaction of both noise sources plus unmodelled residual.
    pub phi_decision: f64,
}

impl Decomposition {
    pub fn from_scores(ideal: f64, patient_only: f64, external_only: f64, actual: f64) -> Self {
        let phi_patient = patient_only - ideal;
        let phi_external = external_only - ideal;
        let phi_decision = actual - (ideal + phi_patient + phi_external);
        Self {
            score_ideal: ideal,
            phi_intrinsic: 0.0,
            phi_patient,
            phi_external,
            phi_decision,
        }
    }

    /// `Score_ideal + Φ_intrinsic + Φ_patient + Φ_external + Φ_decision`.
    pub fn reconstructed(&self) -> f64 {
        self.score_ideal + self.phi_intrinsic + self.phi_patient + self.phi_external + self.phi_decision
    }

    /// Fail when the decomposition does not reproduce `actual`.
    pub fn check_identity(&self, actual: f64, tolerance: f64) -> NormscoreResult<()> {
        let residual = (actual - self.reconstructed()).abs();
        if !residual.is_finite() || residual > tolerance {
            return Err(NormscoreError::AttributionInconsistency {
                residual,
                tolerance,
            });
        }
        Ok(())
    }
}

/// Everything a report carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportContents {
    pub trace_id: String,
    pub patient_id: String,
    pub procedure_type: String,
    pub template_version: String,
    pub global: GlobalMetrics,
    pub steps: Vec<StepMetric>,
    pub noise: Vec<NoiseMetric>,
    pub change_events: Vec<ChangeEventMetric>,
    pub outcome_predictions: Vec<OutcomeMetric>,
    pub traceability: Vec<TraceabilityEntry>,
    pub decomposition: Decomposition,
    /// Symmetric Shapley split of `Score_actual − Score_ideal`.
    pub noise_shapley: BTreeMap<String, f64>,
    pub validation: ValidationVerdict,
    pub recorded_outcomes: Vec<PostoperativeOutcome>,
}

/// Immutable simulation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimulationReport {
    contents: ReportContents,
}

impl SimulationReport {
    pub fn new(contents: ReportContents) -> Self {
        Self { contents }
    }

    pub fn score(&self) -> f64 {
        self.contents.global.score
    }

    pub fn is_valid(&self) -> bool {
        self.contents.validation.is_valid()
    }

    pub fn to_json(&self) -> NormscoreResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| NormscoreError::Numerical(format!("report serialization failed: {e}")))
    }

    pub fn into_contents(self) -> ReportContents {
        self.contents
    }
}

impl Deref for SimulationReport {
    type Target = ReportContents;

    fn deref(&self) -> &ReportContents {
        &self.contents
    }
}
