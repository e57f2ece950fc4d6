// ─────────────────────────────────────────────────────────────────────
// Normscore — Noise-Masked Scoring Pass
// ─────────────────────────────────────────────────────────────────────
//! One full run of deviation → dynamics → aggregation over a trace.
//!
//! A [`NoiseMask`] decides which recorded noise sources are active;
//! masked factors are replaced by 1. The attribution layer runs the same
//! pass under the four masks and differences the scores.

use serde::{Deserialize, Serialize};

use normscore_types::{NormativeTemplate, NormscoreError, NormscoreResult, SurgicalTrace, SurgitEvent};

use crate::deviation::{check_noise, event_deviation, EventDeviation, MitigationCascade};
use crate::dynamics::ExpandedGlobalState;
use crate::entropy::ScoreAggregate;

/// Which noise sources are active in a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoiseMask {
    pub patient: bool,
    pub external: bool,
}

impl NoiseMask {
    pub const IDEAL: Self = Self {
        patient: false,
        external: false,
    };
    pub const PATIENT_ONLY: Self = Self {
        patient: true,
        external: false,
    };
    pub const EXTERNAL_ONLY: Self = Self {
        patient: false,
        external: true,
    };
    pub const ACTUAL: Self = Self {
        patient: true,
        external: true,
    };

    /// `(n_t, e_t)` seen by the pass.
    pub fn apply(self, event: &SurgitEvent) -> (f64, f64) {
        let n_t = if self.patient { event.noise_patient } else { 1.0 };
        let e_t = if self.external { event.noise_external } else { 1.0 };
        (n_t, e_t)
    }

    pub fn label(self) -> &'static str {
        match (self.patient, self.external) {
            (false, false) => "ideal",
            (true, false) => "patient",
            (false, true) => "external",
            (true, true) => "actual",
        }
    }
}

/// What the pass did with one trace event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_index: usize,
    pub surgit_id: String,
    pub is_pause: bool,
    /// Position of the owning step in `template.steps()` (None for pauses).
    pub step_index: Option<usize>,
    pub n_t: f64,
    pub e_t: f64,
    pub deviation: Option<EventDeviation>,
    pub burden: f64,
    /// Provenance after the event; only filled when snapshots are on.
    pub provenance: Option<Vec<f64>>,
}

impl EventRecord {
    pub fn delta_final(&self) -> f64 {
        self.deviation.map_or(0.0, |d| d.delta_final)
    }
}

/// Result of one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PassOutcome {
    pub mask: NoiseMask,
    pub events: Vec<EventRecord>,
    pub aggregate: ScoreAggregate,
    pub state: ExpandedGlobalState,
    /// Product of outcome-scope σ factors.
    pub outcome_mitigation: f64,
}

impl PassOutcome {
    pub fn score(&self) -> f64 {
        self.aggregate.score
    }
}

/// Reusable pass runner bound to one template.
#[derive(Debug, Clone, Copy)]
pub struct ScoringPass<'a> {
    template: &'a NormativeTemplate,
    default_decay: f64,
    snapshots: bool,
}

impl<'a> ScoringPass<'a> {
    /// `default_decay` applies when the template declares no decay rate.
    pub fn new(template: &'a NormativeTemplate, default_decay: f64) -> Self {
        Self {
            template,
            default_decay,
            snapshots: false,
        }
    }

    /// Record the provenance vector after every event.
    pub fn with_snapshots(mut self, snapshots: bool) -> Self {
        self.snapshots = snapshots;
        self
    }

    pub fn template(&self) -> &'a NormativeTemplate {
        self.template
    }

    /// Score `trace` with the given noise sources active.
    ///
    /// Fails with `UnknownSurgit` when an event cannot be resolved and with
    /// `InvalidNoiseFactor` on malformed recorded noise.
    pub fn run(&self, trace: &SurgicalTrace, mask: NoiseMask) -> NormscoreResult<PassOutcome> {
        let dynamics = self.template.dynamics();
        let decay = dynamics.decay_rate(self.default_decay);
        let pause_decay = dynamics.pause_decay_rate(self.default_decay);

        let mut state = ExpandedGlobalState::new();
        let mut cascade = MitigationCascade::new();
        let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); self.template.steps().len()];
        let mut events = Vec::with_capacity(trace.events.len());

        for (event_index, event) in trace.events.iter().enumerate() {
            if event.is_pause {
                state.elapse(pause_decay);
                events.push(EventRecord {
                    event_index,
                    surgit_id: event.surgit_id.clone(),
                    is_pause: true,
                    step_index: None,
                    n_t: 1.0,
                    e_t: 1.0,
                    deviation: None,
                    burden: state.burden(),
                    provenance: self.snapshot(&state),
                });
                continue;
            }

            let (step_index, surgit) = self
                .template
                .locate(&event.surgit_id)
                .ok_or_else(|| NormscoreError::UnknownSurgit(event.surgit_id.clone()))?;
            let (n_t, e_t) = mask.apply(event);
            let deviation = event_deviation(surgit, n_t, e_t, &mut cascade)?;
            state.advance(deviation.delta_final, n_t, e_t, decay);
            buckets[step_index].push(deviation.delta_final);

            events.push(EventRecord {
                event_index,
                surgit_id: event.surgit_id.clone(),
                is_pause: false,
                step_index: Some(step_index),
                n_t,
                e_t,
                deviation: Some(deviation),
                burden: state.burden(),
                provenance: self.snapshot(&state),
            });
        }

        let aggregate = ScoreAggregate::from_buckets(self.template, &buckets);
        log::debug!(
            "{} pass over '{}': score={:.6} rho={:.6} entropy={:.6} burden={:.6}",
            mask.label(),
            trace.procedure_id,
            aggregate.score,
            aggregate.rho,
            aggregate.entropy,
            state.burden()
        );

        Ok(PassOutcome {
            mask,
            events,
            aggregate,
            state,
            outcome_mitigation: cascade.outcome(),
        })
    }

    fn snapshot(&self, state: &ExpandedGlobalState) -> Option<Vec<f64>> {
        self.snapshots.then(|| state.provenance().to_vec())
    }
}

/// Reject the trace if any scored event carries a noise factor below 1.
pub fn check_noise_factors(trace: &SurgicalTrace) -> NormscoreResult<()> {
    for (index, event) in trace.scored_events() {
        if let Err(err) = check_noise(event.noise_patient, event.noise_external) {
            log::warn!(
                "Trace '{}' event #{index} ({}): {err}",
                trace.procedure_id,
                event.surgit_id
            );
            return Err(err);
        }
    }
    Ok(())
}
