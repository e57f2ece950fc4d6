// ─────────────────────────────────────────────────────────────────────
// Normscore — Attribution Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Counterfactual attribution of a trace score to its noise sources.
//!
//! The scoring pass is re-run under four noise masks:
//!
//! | pass     | n_t      | e_t      |
//! |----------|----------|----------|
//! | ideal    | 1        | 1        |
//! | patient  | recorded | 1        |
//! | external | 1        | recorded |
//! | actual   | recorded | recorded |
//!
//! and the scores are differenced into Φ_patient, Φ_external and the
//! interaction term Φ_decision, which closes the identity
//! `Score_actual = Score_ideal + Φ_patient + Φ_external + Φ_decision`.
//! Exact Shapley values over the same passes are offered alongside, and
//! the logistic bridge maps (ρ_SIM, S_q) to complication probabilities.

pub mod bridge;
pub mod decomposition;
pub mod shapley;

pub use bridge::{linear_predictor, logit, sigmoid, OutcomeBridge};
pub use decomposition::{run_passes, PassSet, EXTERNAL_PLAYER, PATIENT_PLAYER};
pub use shapley::{shapley_values, try_shapley_values};
