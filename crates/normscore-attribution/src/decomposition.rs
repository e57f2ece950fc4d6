// ─────────────────────────────────────────────────────────────────────
// Normscore — Four-Pass Decomposition
// ─────────────────────────────────────────────────────────────────────
//! Runs the ideal, patient-only, external-only and actual passes and
//! derives the additive decomposition and the noise Shapley values.
//!
//! With `parallel` the passes run on scoped threads. Each pass owns its
//! own state and the results are always combined in the fixed order
//! ideal → patient → external → actual. Only the actual pass keeps
//! provenance snapshots.

use std::collections::BTreeMap;
use std::thread;

use normscore_core::{NoiseMask, PassOutcome, ScoringPass};
use normscore_types::{Decomposition, NormscoreError, NormscoreResult, SurgicalTrace};

use crate::shapley::shapley_values;

pub const PATIENT_PLAYER: &str = "patient";
pub const EXTERNAL_PLAYER: &str = "external";

const MASKS: [NoiseMask; 4] = [
    NoiseMask::IDEAL,
    NoiseMask::PATIENT_ONLY,
    NoiseMask::EXTERNAL_ONLY,
    NoiseMask::ACTUAL,
];

/// The four counterfactual passes over one trace.
#[derive(Debug, Clone, PartialEq)]
pub struct PassSet {
    pub ideal: PassOutcome,
    pub patient: PassOutcome,
    pub external: PassOutcome,
    pub actual: PassOutcome,
}

impl PassSet {
    fn from_results(results: Vec<NormscoreResult<PassOutcome>>) -> NormscoreResult<Self> {
        let mut outcomes = results
            .into_iter()
            .collect::<NormscoreResult<Vec<_>>>()?
            .into_iter();
        let mut next = || {
            outcomes
                .next()
                .ok_or_else(|| NormscoreError::Concurrency("scoring pass result missing".to_string()))
        };
        Ok(Self {
            ideal: next()?,
            patient: next()?,
            external: next()?,
            actual: next()?,
        })
    }

    /// Score of the pass with the given noise sources active.
    pub fn score_for(&self, mask: NoiseMask) -> f64 {
        match (mask.patient, mask.external) {
            (false, false) => self.ideal.score(),
            (true, false) => self.patient.score(),
            (false, true) => self.external.score(),
            (true, true) => self.actual.score(),
        }
    }

    /// Ordered decomposition: Φ_patient, Φ_external against the ideal
    /// baseline, Φ_decision as the remaining interaction.
    pub fn decomposition(&self) -> Decomposition {
        Decomposition::from_scores(
            self.ideal.score(),
            self.patient.score(),
            self.external.score(),
            self.actual.score(),
        )
    }

    /// Symmetric alternative: Shapley values of the two noise sources
    /// with the pass score as characteristic function.
    pub fn noise_shapley(&self, max_players: usize) -> NormscoreResult<BTreeMap<String, f64>> {
        shapley_values(&[PATIENT_PLAYER, EXTERNAL_PLAYER], max_players, |coalition| {
            self.score_for(NoiseMask {
                patient: coalition.contains(&PATIENT_PLAYER),
                external: coalition.contains(&EXTERNAL_PLAYER),
            })
        })
    }
}

fn pass_for<'a>(pass: &ScoringPass<'a>, mask: NoiseMask) -> ScoringPass<'a> {
    if mask == NoiseMask::ACTUAL {
        *pass
    } else {
        pass.with_snapshots(false)
    }
}

/// Run all four passes of `pass` over `trace`.
pub fn run_passes(pass: &ScoringPass<'_>, trace: &SurgicalTrace, parallel: bool) -> NormscoreResult<PassSet> {
    let results = if parallel {
        thread::scope(|scope| {
            let handles: Vec<_> = MASKS
                .iter()
                .map(|&mask| {
                    let pass = pass_for(pass, mask);
                    scope.spawn(move || pass.run(trace, mask))
                })
                .collect();
            handles
                .into_iter()
                .zip(MASKS)
                .map(|(handle, mask)| {
                    handle.join().unwrap_or_else(|_| {
                        Err(NormscoreError::Concurrency(format!(
                            "{} pass panicked",
                            mask.label()
                        )))
                    })
                })
                .collect::<Vec<_>>()
        })
    } else {
        MASKS
            .iter()
            .map(|&mask| pass_for(pass, mask).run(trace, mask))
            .collect()
    };
    PassSet::from_results(results)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use normscore_types::{DynamicsConfig, MitigationScope, NormativeTemplate, Step, Surgit, SurgitEvent};

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
    }

    fn template() -> NormativeTemplate {
        NormativeTemplate::builder("demo", "1")
            .step(
                Step::new("T1", "Preparation")
                    .with_surgit(Surgit::new("S1", "Prophylaxis").with_mitigation(0.7, MitigationScope::Residual))
                    .with_surgit(Surgit::new("S2", "Drape").with_intrinsic_deviation(0.05)),
            )
            .step(
                Step::new("T2", "Resection")
                    .with_weight(2.0)
                    .with_surgit(Surgit::new("S3", "Dissect").with_intrinsic_deviation(0.15))
                    .with_surgit(Surgit::new("S4", "Ligate").with_intrinsic_deviation(0.1)),
            )
            .q(1.5)
            .weights(1.0, 0.5)
            .dynamics(DynamicsConfig::with_decay(0.9))
            .build()
            .unwrap()
    }

    fn trace() -> SurgicalTrace {
        let ev = |id: &str, minute: i64, n: f64, e: f64| {
            let start = t0() + Duration::minutes(minute);
            SurgitEvent::new(id, start, start + Duration::minutes(3)).with_noise(n, e)
        };
        SurgicalTrace::new(
            "P1",
            "pat",
            vec![
                ev("S1", 0, 1.0, 1.0),
                ev("S2", 5, 1.3, 1.0),
                ev("S3", 10, 1.6, 1.4),
                ev("S4", 20, 1.0, 1.8),
            ],
        )
    }

    #[test]
    fn test_decomposition_identity() {
        let tpl = template();
        let passes = run_passes(&ScoringPass::new(&tpl, 1.0), &trace(), false).unwrap();
        let decomposition = passes.decomposition();
        assert_eq!(decomposition.phi_intrinsic, 0.0);
        assert!((decomposition.reconstructed() - passes.actual.score()).abs() < 1e-9);
        assert!(decomposition.check_identity(passes.actual.score(), 1e-9).is_ok());
        assert!(decomposition.phi_patient > 0.0);
        assert!(decomposition.phi_external > 0.0);
    }

    #[test]
    fn test_noise_free_trace_has_no_contributions() {
        let tpl = template();
        let mut quiet = trace();
        for event in &mut quiet.events {
            event.noise_patient = 1.0;
            event.noise_external = 1.0;
        }
        let passes = run_passes(&ScoringPass::new(&tpl, 1.0), &quiet, false).unwrap();
        let d = passes.decomposition();
        assert_eq!(d.phi_patient, 0.0);
        assert_eq!(d.phi_external, 0.0);
        assert_eq!(d.phi_decision, 0.0);
        assert_eq!(d.score_ideal, passes.actual.score());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let tpl = template();
        let pass = ScoringPass::new(&tpl, 1.0);
        let sequential = run_passes(&pass, &trace(), false).unwrap();
        let parallel = run_passes(&pass, &trace(), true).unwrap();
        assert_eq!(sequential, parallel);
        assert_eq!(sequential.decomposition(), parallel.decomposition());
    }

    #[test]
    fn test_pass_order() {
        let tpl = template();
        let passes = run_passes(&ScoringPass::new(&tpl, 1.0), &trace(), true).unwrap();
        assert_eq!(passes.ideal.mask, NoiseMask::IDEAL);
        assert_eq!(passes.patient.mask, NoiseMask::PATIENT_ONLY);
        assert_eq!(passes.external.mask, NoiseMask::EXTERNAL_ONLY);
        assert_eq!(passes.actual.mask, NoiseMask::ACTUAL);
    }

    #[test]
    fn test_only_actual_pass_snapshots() {
        let tpl = template();
        let pass = ScoringPass::new(&tpl, 1.0).with_snapshots(true);
        let passes = run_passes(&pass, &trace(), false).unwrap();
        assert!(passes.actual.events.iter().all(|e| e.provenance.is_some()));
        assert!(passes.ideal.events.iter().all(|e| e.provenance.is_none()));
    }

    #[test]
    fn test_noise_shapley_efficiency() {
        let tpl = template();
        let passes = run_passes(&ScoringPass::new(&tpl, 1.0), &trace(), false).unwrap();
        let phi = passes.noise_shapley(10).unwrap();
        let total = phi[PATIENT_PLAYER] + phi[EXTERNAL_PLAYER];
        assert!((total - (passes.actual.score() - passes.ideal.score())).abs() < 1e-9);

        let d = passes.decomposition();
        let expected = d.phi_patient + 0.5 * d.phi_decision;
        assert!((phi[PATIENT_PLAYER] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_surgit_aborts_all_passes() {
        let tpl = template();
        let mut bad = trace();
        bad.events.push(SurgitEvent::new("S9", t0(), t0()));
        for parallel in [false, true] {
            let err = run_passes(&ScoringPass::new(&tpl, 1.0), &bad, parallel).unwrap_err();
            assert!(matches!(err, NormscoreError::UnknownSurgit(_)));
        }
    }
}
