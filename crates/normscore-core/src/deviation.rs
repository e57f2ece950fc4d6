// ─────────────────────────────────────────────────────────────────────
// Normscore — Deviation Calculus
// ─────────────────────────────────────────────────────────────────────
//! Noise amplification and scoped mitigation of per-event deviation.
//!
//!   δ_tot   = 1 − (1 − δ_intr)^(n_t · e_t)
//!   δ_final = σ_eff · δ_tot
//!
//! σ_eff starts from the residual accumulator σ_res. Immediate scope
//! multiplies σ into this event only; residual scope also folds it into
//! σ_res for every later event; outcome scope leaves δ untouched and
//! accumulates into the outcome product.

use serde::{Deserialize, Serialize};

use normscore_types::score::clamp_probability;
use normscore_types::{MitigationScope, NormscoreError, NormscoreResult, Surgit};

/// Fails unless both factors are finite and ≥ 1.
pub fn check_noise(n_t: f64, e_t: f64) -> NormscoreResult<()> {
    // NaN fails both comparisons.
    if !(n_t >= 1.0 && e_t >= 1.0) || !n_t.is_finite() || !e_t.is_finite() {
        return Err(NormscoreError::InvalidNoiseFactor { n_t, e_t });
    }
    Ok(())
}

/// Total deviation after patient and external noise amplification.
///
/// Monotone non-decreasing in both factors; `amplify(δ, 1, 1) == δ`.
pub fn amplify(delta_intr: f64, n_t: f64, e_t: f64) -> NormscoreResult<f64> {
    check_noise(n_t, e_t)?;
    let exponent = n_t * e_t;
    if exponent == 1.0 {
        return Ok(delta_intr);
    }
    Ok(clamp_probability(1.0 - (1.0 - delta_intr).powf(exponent)))
}

/// Patient-only amplification: `1 − (1 − δ_intr)^n_t`.
pub fn patient_amplification(delta_intr: f64, n_t: f64) -> NormscoreResult<f64> {
    amplify(delta_intr, n_t, 1.0)
}

/// `δ_final = σ · δ_tot`.
#[inline]
pub fn apply_mitigation(delta_total: f64, sigma: f64) -> f64 {
    sigma * delta_total
}

/// Running mitigation state for one pass over one trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MitigationCascade {
    residual: f64,
    outcome: f64,
}

impl Default for MitigationCascade {
    fn default() -> Self {
        Self {
            residual: 1.0,
            outcome: 1.0,
        }
    }
}

impl MitigationCascade {
    pub fn new() -> Self {
        Self::default()
    }

    /// σ_eff for an event executing `surgit`, updating the accumulators.
    pub fn effective(&mut self, surgit: &Surgit) -> f64 {
        let sigma = surgit.mitigation();
        let mut sigma_eff = self.residual;
        match surgit.scope() {
            MitigationScope::Immediate => sigma_eff *= sigma,
            MitigationScope::Residual => {
                sigma_eff *= sigma;
                self.residual *= sigma;
            }
            MitigationScope::Outcome => self.outcome *= sigma,
        }
        sigma_eff
    }

    /// σ_res: product of every residual-scope σ seen so far.
    pub fn residual(&self) -> f64 {
        self.residual
    }

    /// Product of every outcome-scope σ seen so far.
    pub fn outcome(&self) -> f64 {
        self.outcome
    }
}

/// Per-event result of the deviation chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventDeviation {
    pub delta_total: f64,
    pub sigma_effective: f64,
    pub delta_final: f64,
}

/// Run the full chain for one event with (already masked) noise.
pub fn event_deviation(
    surgit: &Surgit,
    n_t: f64,
    e_t: f64,
    cascade: &mut MitigationCascade,
) -> NormscoreResult<EventDeviation> {
    let delta_total = amplify(surgit.intrinsic_deviation(), n_t, e_t)?;
    let sigma_effective = cascade.effective(surgit);
    Ok(EventDeviation {
        delta_total,
        sigma_effective,
        delta_final: apply_mitigation(delta_total, sigma_effective),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amplify_identity_without_noise() {
        for delta in [0.0, 0.05, 0.2, 0.5, 0.99, 1.0] {
            assert_eq!(amplify(delta, 1.0, 1.0).unwrap(), delta);
        }
    }

    #[test]
    fn test_amplify_never_below_intrinsic() {
        for delta in [0.0, 0.01, 0.1, 0.3, 0.7, 1.0] {
            for n in [1.0, 1.1, 1.5, 3.0] {
                for e in [1.0, 1.2, 2.0] {
                    let amplified = amplify(delta, n, e).unwrap();
                    assert!(amplified >= delta - 1e-15, "δ={delta} n={n} e={e}");
                    assert!(amplified <= 1.0);
                }
            }
        }
    }

    #[test]
    fn test_amplify_monotone_in_noise() {
        let low = amplify(0.1, 1.2, 1.0).unwrap();
        let high = amplify(0.1, 1.5, 1.0).unwrap();
        let both = amplify(0.1, 1.5, 1.3).unwrap();
        assert!(high > low);
        assert!(both > high);
    }

    #[test]
    fn test_amplify_known_value() {
        // 1 − 0.9^2 = 0.19
        assert!((amplify(0.1, 2.0, 1.0).unwrap() - 0.19).abs() < 1e-12);
        assert!((patient_amplification(0.1, 2.0).unwrap() - 0.19).abs() < 1e-12);
    }

    #[test]
    fn test_amplify_rejects_dampening_noise() {
        assert!(matches!(
            amplify(0.1, 0.9, 1.0),
            Err(NormscoreError::InvalidNoiseFactor { .. })
        ));
        assert!(amplify(0.1, 1.0, 0.5).is_err());
        assert!(amplify(0.1, f64::NAN, 1.0).is_err());
        assert!(amplify(0.1, f64::INFINITY, 1.0).is_err());
    }

    #[test]
    fn test_residual_then_immediate() {
        let guard = Surgit::new("S1", "Prophylaxis")
            .with_intrinsic_deviation(0.0)
            .with_mitigation(0.5, MitigationScope::Residual);
        let risk = Surgit::new("S2", "Incision").with_intrinsic_deviation(0.2);
        let mut cascade = MitigationCascade::new();

        let first = event_deviation(&guard, 1.0, 1.0, &mut cascade).unwrap();
        assert_eq!(first.delta_final, 0.0);
        assert_eq!(cascade.residual(), 0.5);

        let second = event_deviation(&risk, 1.0, 1.0, &mut cascade).unwrap();
        assert!((second.sigma_effective - 0.5).abs() < 1e-12);
        assert!((second.delta_final - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_residual_after_risk_does_not_discount_it() {
        let guard = Surgit::new("S1", "Prophylaxis").with_mitigation(0.5, MitigationScope::Residual);
        let risk = Surgit::new("S2", "Incision").with_intrinsic_deviation(0.2);
        let mut cascade = MitigationCascade::new();
        let before = event_deviation(&risk, 1.0, 1.0, &mut cascade).unwrap();
        event_deviation(&guard, 1.0, 1.0, &mut cascade).unwrap();
        assert!((before.delta_final - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_immediate_does_not_persist() {
        let local = Surgit::new("S1", "Local")
            .with_intrinsic_deviation(0.4)
            .with_mitigation(0.5, MitigationScope::Immediate);
        let next = Surgit::new("S2", "Next").with_intrinsic_deviation(0.2);
        let mut cascade = MitigationCascade::new();
        let a = event_deviation(&local, 1.0, 1.0, &mut cascade).unwrap();
        let b = event_deviation(&next, 1.0, 1.0, &mut cascade).unwrap();
        assert!((a.delta_final - 0.2).abs() < 1e-12);
        assert!((b.delta_final - 0.2).abs() < 1e-12);
        assert_eq!(cascade.residual(), 1.0);
    }

    #[test]
    fn test_residual_compounds() {
        let guard = Surgit::new("G", "Guard").with_mitigation(0.5, MitigationScope::Residual);
        let mut cascade = MitigationCascade::new();
        cascade.effective(&guard);
        let second = cascade.effective(&guard);
        assert!((second - 0.25).abs() < 1e-12);
        assert!((cascade.residual() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_outcome_scope_leaves_event_alone() {
        let bundle = Surgit::new("B", "Care bundle")
            .with_intrinsic_deviation(0.3)
            .with_mitigation(0.8, MitigationScope::Outcome);
        let mut cascade = MitigationCascade::new();
        let dev = event_deviation(&bundle, 1.0, 1.0, &mut cascade).unwrap();
        assert!((dev.delta_final - 0.3).abs() < 1e-12);
        assert!((cascade.outcome() - 0.8).abs() < 1e-12);
        assert_eq!(cascade.residual(), 1.0);
    }
}
