// ─────────────────────────────────────────────────────────────────────
// Normscore — q-Entropy Aggregation
// ─────────────────────────────────────────────────────────────────────
//! Step linearity, Shannon/Tsallis step entropy and the q-sum fold.
//!
//!   π_t   = Π(1 − δ_s)            Δ_t = 1 − π_t
//!   S_1   = −(π ln π + Δ ln Δ)     S_q = (1 − π^q − Δ^q) / (q − 1)
//!   x ⊕_q y = x + y + (1 − q)·x·y
//!   Score = α·ρ_SIM + β·S_q(SIM),  ρ_SIM = Σ w_t·Δ_t

use serde::{Deserialize, Serialize};

use normscore_types::score::clamp_probability;
use normscore_types::{GlobalParameters, NormativeTemplate};

/// |q − 1| below this selects the Shannon form.
const SHANNON_EPS: f64 = 1e-12;

/// Probability that every sub-action of the step was deviation-free.
pub fn step_linearity(deltas: &[f64]) -> f64 {
    clamp_probability(deltas.iter().map(|d| 1.0 - d).product())
}

#[inline]
pub fn step_deviation(pi_t: f64) -> f64 {
    1.0 - pi_t
}

/// Two-state entropy of a step with linearity `pi_t`.
pub fn step_entropy(pi_t: f64, q: f64) -> f64 {
    let delta_t = step_deviation(pi_t);
    if (q - 1.0).abs() < SHANNON_EPS {
        if pi_t <= 0.0 || delta_t <= 0.0 {
            return 0.0;
        }
        -(pi_t * pi_t.ln() + delta_t * delta_t.ln())
    } else {
        (1.0 - pi_t.powf(q) - delta_t.powf(q)) / (q - 1.0)
    }
}

/// Non-extensive q-sum.
#[inline]
pub fn q_add(x: f64, y: f64, q: f64) -> f64 {
    x + y + (1.0 - q) * x * y
}

/// Left fold of step entropies in step order, starting from 0.
pub fn global_entropy(step_entropies: &[f64], q: f64) -> f64 {
    step_entropies.iter().fold(0.0, |acc, &s| q_add(acc, s, q))
}

#[inline]
pub fn global_score(rho: f64, entropy: f64, parameters: GlobalParameters) -> f64 {
    parameters.alpha * rho + parameters.beta * entropy
}

/// Figures for one step that saw at least one scored event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepAggregate {
    pub step_id: String,
    pub m_t: usize,
    pub pi_t: f64,
    pub delta_t: f64,
    pub s_q_t: f64,
    pub w_t: f64,
    pub rho_t: f64,
}

impl StepAggregate {
    pub fn from_deltas(step_id: impl Into<String>, weight: f64, deltas: &[f64], q: f64) -> Self {
        let pi_t = step_linearity(deltas);
        let delta_t = step_deviation(pi_t);
        Self {
            step_id: step_id.into(),
            m_t: deltas.len(),
            pi_t,
            delta_t,
            s_q_t: step_entropy(pi_t, q),
            w_t: weight,
            rho_t: weight * delta_t,
        }
    }
}

/// Whole-trace aggregate of one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreAggregate {
    pub steps: Vec<StepAggregate>,
    pub rho: f64,
    pub entropy: f64,
    pub score: f64,
}

impl ScoreAggregate {
    /// Aggregate per-step `δ_final` buckets, indexed like `template.steps()`.
    ///
    /// Steps with an empty bucket are skipped entirely.
    pub fn from_buckets(template: &NormativeTemplate, buckets: &[Vec<f64>]) -> Self {
        let parameters = template.parameters();
        let steps: Vec<StepAggregate> = template
            .steps()
            .iter()
            .zip(buckets)
            .filter(|(_, deltas)| !deltas.is_empty())
            .map(|(step, deltas)| StepAggregate::from_deltas(step.id(), step.weight(), deltas, parameters.q))
            .collect();

        let rho = steps.iter().map(|s| s.rho_t).sum();
        let entropies: Vec<f64> = steps.iter().map(|s| s.s_q_t).collect();
        let entropy = global_entropy(&entropies, parameters.q);
        Self {
            score: global_score(rho, entropy, parameters),
            steps,
            rho,
            entropy,
        }
    }
}
