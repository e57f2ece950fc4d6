// ─────────────────────────────────────────────────────────────────────
// Normscore — Structural Conformance
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Token-marking state machine that replays a trace against the
//! template's process net.
//!
//! # Invariants
//!
//! 1. **Fresh marking per call**: [`validate`] builds its own
//!    [`Marking`] from the template's initial marking; nothing is
//!    cached or shared between traces.
//!
//! 2. **Chronological firing**: transitions fire strictly in trace
//!    order. Pause events never reach the net.
//!
//! 3. **First failure wins**: the verdict names the first rule broken,
//!    in the order initial marking → unknown transition → enablement →
//!    forbidden marking → mandatory coverage.

pub mod net;
pub mod validator;

pub use net::{Marking, TokenNet, Transition};
pub use validator::{validate, StructuralValidator};
