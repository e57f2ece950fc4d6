// ─────────────────────────────────────────────────────────────────────
// Normscore — Scoring Core
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Per-event deviation calculus, expanded-state dynamics and q-entropy
//! aggregation, composed into one noise-masked scoring pass.
//!
//! # Pipeline
//!
//! ```text
//! event ─► amplify(δ_intr, n_t, e_t) ─► mitigation cascade ─► δ_final
//!            │                                                  │
//!            └────────── ExpandedGlobalState (burden, H) ◄──────┤
//!                                                               ▼
//!                        step π_t, Δ_t, S_q(t) ─► ρ_SIM, S_q(SIM), Score
//! ```
//!
//! Every pass owns a fresh [`ExpandedGlobalState`] and
//! [`MitigationCascade`]; the template and trace are only read, so
//! passes can run concurrently.

pub mod deviation;
pub mod dynamics;
pub mod entropy;
pub mod pass;

pub use deviation::{
    amplify, apply_mitigation, check_noise, event_deviation, patient_amplification, EventDeviation,
    MitigationCascade,
};
pub use dynamics::{ExpandedGlobalState, GENERAL_BURDEN};
pub use entropy::{
    global_entropy, global_score, q_add, step_deviation, step_entropy, step_linearity,
    ScoreAggregate, StepAggregate,
};
pub use pass::{check_noise_factors, EventRecord, NoiseMask, PassOutcome, ScoringPass};
