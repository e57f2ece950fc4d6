// ─────────────────────────────────────────────────────────────────────
// Normscore — Simulation Orchestrator
// ─────────────────────────────────────────────────────────────────────
//! One orchestrated run:
//!   1. Fetch the trace (fatal `TraceNotFound` when absent)
//!   2. Structural validation → verdict (never aborts the run)
//!   3. Reject malformed noise factors up front
//!   4. Four counterfactual passes (ideal / patient / external / actual)
//!   5. Decomposition + identity check, noise Shapley values
//!   6. Outcome bridge on the actual pass aggregates
//!   7. Step, noise, change-event and traceability tables
//!   8. Freeze into a `SimulationReport`

use std::sync::Arc;

use normscore_attribution::{run_passes, OutcomeBridge, PassSet};
use normscore_core::{check_noise_factors, ScoringPass};
use normscore_structure::StructuralValidator;
use normscore_types::{
    ChangeEventMetric, EngineConfig, GlobalMetrics, NoiseMetric, NormativeTemplate, NormscoreError,
    NormscoreResult, ReportContents, SimulationReport, StepMetric, SurgicalTrace, TraceabilityEntry,
};

use crate::store::TraceStore;

/// Characteristic function name recognised for Shapley attribution.
const DEFAULT_CONVENTION: &str = "default";

/// Orchestrates validation, scoring and attribution of stored traces.
pub struct SimulationEngine {
    config: EngineConfig,
    store: Arc<dyn TraceStore>,
}

impl SimulationEngine {
    pub fn new(config: EngineConfig, store: Arc<dyn TraceStore>) -> NormscoreResult<Self> {
        config.validate()?;
        Ok(Self { config, store })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn TraceStore> {
        &self.store
    }

    /// Load `trace_id` from the store and score it against `template`.
    pub fn run(&self, trace_id: &str, template: &NormativeTemplate) -> NormscoreResult<SimulationReport> {
        let trace = self
            .store
            .fetch(trace_id)
            .ok_or_else(|| NormscoreError::TraceNotFound {
                trace_id: trace_id.to_string(),
            })?;
        self.score_trace(&trace, template)
    }

    /// Score an already loaded trace.
    ///
    /// Structural failures are reported in the verdict and scoring goes
    /// on with the raw trace. Malformed input (noise < 1, surgit ids the
    /// template does not define) aborts before a report exists.
    pub fn score_trace(
        &self,
        trace: &SurgicalTrace,
        template: &NormativeTemplate,
    ) -> NormscoreResult<SimulationReport> {
        log::info!(
            "Simulation start: trace '{}' against '{}' v{} ({} events)",
            trace.procedure_id,
            template.procedure_type(),
            template.version(),
            trace.events.len()
        );

        let validation = StructuralValidator::new(template).validate(trace);
        if !validation.is_valid() {
            log::warn!(
                "Trace '{}' structurally invalid, scoring anyway: {}",
                trace.procedure_id,
                validation.message
            );
        }

        check_noise_factors(trace)?;

        if template.shapley_convention() != DEFAULT_CONVENTION {
            log::warn!(
                "Unrecognised Shapley convention '{}', using the score function",
                template.shapley_convention()
            );
        }

        let pass = ScoringPass::new(template, self.config.default_decay_rate).with_snapshots(true);
        let passes = run_passes(&pass, trace, self.config.parallel_passes)?;
        let actual_score = passes.actual.score();
        if !actual_score.is_finite() {
            return Err(NormscoreError::Numerical(format!(
                "non-finite score {actual_score} for trace '{}'",
                trace.procedure_id
            )));
        }

        let decomposition = passes.decomposition();
        if let Err(err) = decomposition.check_identity(actual_score, self.config.attribution_tolerance) {
            log::error!("Trace '{}': {err}", trace.procedure_id);
        }
        let noise_shapley = passes.noise_shapley(self.config.max_shapley_players)?;

        let aggregate = &passes.actual.aggregate;
        let outcome_predictions = OutcomeBridge::from_config(&self.config).predict(
            template,
            aggregate.rho,
            aggregate.entropy,
            passes.actual.outcome_mitigation,
        );

        let contents = ReportContents {
            trace_id: trace.procedure_id.clone(),
            patient_id: trace.patient_id.clone(),
            procedure_type: template.procedure_type().to_string(),
            template_version: template.version().to_string(),
            global: GlobalMetrics {
                score: actual_score,
                entropy: aggregate.entropy,
                rho: aggregate.rho,
                final_burden: passes.actual.state.burden(),
                outcome_mitigation: passes.actual.outcome_mitigation,
            },
            steps: step_table(&passes),
            noise: noise_table(trace, template),
            change_events: change_event_table(trace),
            outcome_predictions,
            traceability: traceability_log(&passes),
            decomposition,
            noise_shapley,
            validation,
            recorded_outcomes: trace.outcomes.clone(),
        };

        log::info!(
            "Simulation done: trace '{}' score={:.6} ideal={:.6} status={}",
            trace.procedure_id,
            actual_score,
            decomposition.score_ideal,
            contents.validation.status
        );
        Ok(SimulationReport::new(contents))
    }
}

fn step_table(passes: &PassSet) -> Vec<StepMetric> {
    passes
        .actual
        .aggregate
        .steps
        .iter()
        .map(|s| StepMetric {
            step_id: s.step_id.clone(),
            m_t: s.m_t,
            pi_t: s.pi_t,
            delta_t: s.delta_t,
            s_q_t: s.s_q_t,
            rho_t: s.rho_t,
            w_t: s.w_t,
        })
        .collect()
}

fn noise_table(trace: &SurgicalTrace, template: &NormativeTemplate) -> Vec<NoiseMetric> {
    trace
        .events
        .iter()
        .map(|event| NoiseMetric {
            surgit_id: event.surgit_id.clone(),
            n_t: event.noise_patient,
            e_t: event.noise_external,
            complexity_weight: if event.is_pause {
                None
            } else {
                template.surgit(&event.surgit_id).map(|s| s.complexity_weight())
            },
            pause_duration: event.is_pause.then(|| event.duration_minutes()),
        })
        .collect()
}

fn change_event_table(trace: &SurgicalTrace) -> Vec<ChangeEventMetric> {
    trace
        .scored_events()
        .filter(|(_, event)| event.surgit_type.is_change_event())
        .map(|(_, event)| ChangeEventMetric {
            surgit_id: event.surgit_id.clone(),
            ce_type: event.surgit_type.as_str().to_string(),
            timestamp: event.timestamp_start,
        })
        .collect()
}

fn traceability_log(passes: &PassSet) -> Vec<TraceabilityEntry> {
    passes
        .actual
        .events
        .iter()
        .map(|record| TraceabilityEntry {
            event_index: record.event_index,
            surgit_id: record.surgit_id.clone(),
            is_pause: record.is_pause,
            delta_final: record.delta_final(),
            clinical_burden: record.burden,
            provenance_vector: record.provenance.clone().unwrap_or_default(),
        })
        .collect()
}
