// ─────────────────────────────────────────────────────────────────────
// Normscore — Outcome Bridge
// ─────────────────────────────────────────────────────────────────────
//! Logistic link from simulation aggregates to complication risk.
//!
//!   η_k = α_k + β_Δ·ρ_SIM + β_S·S_q(SIM)
//!   p_k = sigmoid(η_k)
//!   p_k_mitigated = σ_outcome · p_k
//!
//! σ_outcome is the product of outcome-scope mitigation factors seen in
//! the trace (1.0 when there are none). It never alters `p_k`.

use normscore_types::score::clamp_probability;
use normscore_types::{EngineConfig, NormativeTemplate, OutcomeCalibration, OutcomeMetric};

/// `ln(p / (1 − p))` with `p` clamped to `[ε, 1 − ε]`.
pub fn logit(p: f64, epsilon: f64) -> f64 {
    let p = p.clamp(epsilon, 1.0 - epsilon);
    (p / (1.0 - p)).ln()
}

/// `1 / (1 + e^−η)` with `η` clamped to `±limit`.
pub fn sigmoid(eta: f64, limit: f64) -> f64 {
    let eta = eta.clamp(-limit, limit);
    1.0 / (1.0 + (-eta).exp())
}

#[inline]
pub fn linear_predictor(calibration: &OutcomeCalibration, rho: f64, entropy: f64) -> f64 {
    calibration.alpha_k + calibration.beta_delta * rho + calibration.beta_s * entropy
}

/// Clamp settings for the bridge, taken from [`EngineConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeBridge {
    logit_epsilon: f64,
    sigmoid_clamp: f64,
}

impl Default for OutcomeBridge {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl OutcomeBridge {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            logit_epsilon: config.logit_epsilon,
            sigmoid_clamp: config.sigmoid_clamp,
        }
    }

    pub fn logit(&self, p: f64) -> f64 {
        logit(p, self.logit_epsilon)
    }

    pub fn sigmoid(&self, eta: f64) -> f64 {
        sigmoid(eta, self.sigmoid_clamp)
    }

    /// Intercept α_k that reproduces a baseline risk when ρ = S = 0.
    pub fn baseline_intercept(&self, baseline_risk: f64) -> f64 {
        self.logit(baseline_risk)
    }

    /// One row per calibration entry, in declaration order.
    pub fn predict(
        &self,
        template: &NormativeTemplate,
        rho: f64,
        entropy: f64,
        outcome_mitigation: f64,
    ) -> Vec<OutcomeMetric> {
        let calibrated = template.calibration();
        for kind in template.complication_set() {
            if !calibrated.iter().any(|c| c.complication_type == *kind) {
                log::debug!("Complication '{kind}' has no calibration; no prediction emitted");
            }
        }
        calibrated
            .iter()
            .map(|calibration| {
                let eta_k = linear_predictor(calibration, rho, entropy);
                let p_k = self.sigmoid(eta_k);
                OutcomeMetric {
                    complication_type: calibration.complication_type.clone(),
                    eta_k,
                    p_k,
                    p_k_mitigated: clamp_probability(outcome_mitigation * p_k),
                }
            })
            .collect()
    }
}
