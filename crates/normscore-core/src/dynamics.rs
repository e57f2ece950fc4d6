// ─────────────────────────────────────────────────────────────────────
// Normscore — Expanded Global State
// ─────────────────────────────────────────────────────────────────────
//! Transition kernel `Z_t → Z_{t+1}`.
//!
//! The state holds named clinical-burden accumulators and a provenance
//! vector with one entry per processed non-pause event. Every step first
//! decays existing provenance entries linearly by the decay rate, then
//! appends the new `δ_final` and adds `δ_final · n_t · e_t` to the
//! burden. Pauses only decay.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Accumulator key for the single burden tracked by the kernel.
pub const GENERAL_BURDEN: &str = "general";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedGlobalState {
    clinical_state: BTreeMap<String, f64>,
    provenance: Vec<f64>,
}

impl Default for ExpandedGlobalState {
    fn default() -> Self {
        let mut clinical_state = BTreeMap::new();
        clinical_state.insert(GENERAL_BURDEN.to_string(), 0.0);
        Self {
            clinical_state,
            provenance: Vec::new(),
        }
    }
}

impl ExpandedGlobalState {
    pub fn new() -> Self {
        Self::default()
    }

    fn decay(&mut self, decay_rate: f64) {
        for h in &mut self.provenance {
            *h *= decay_rate;
        }
    }

    /// Apply one scored event.
    pub fn advance(&mut self, delta_final: f64, n_t: f64, e_t: f64, decay_rate: f64) {
        self.decay(decay_rate);
        self.provenance.push(delta_final);
        *self
            .clinical_state
            .entry(GENERAL_BURDEN.to_string())
            .or_insert(0.0) += delta_final * n_t * e_t;
    }

    /// Apply a pause: time passes, burden does not accrue.
    pub fn elapse(&mut self, decay_rate: f64) {
        self.decay(decay_rate);
    }

    pub fn burden(&self) -> f64 {
        self.clinical_state.get(GENERAL_BURDEN).copied().unwrap_or(0.0)
    }

    pub fn clinical_state(&self) -> &BTreeMap<String, f64> {
        &self.clinical_state
    }

    pub fn provenance(&self) -> &[f64] {
        &self.provenance
    }
}
