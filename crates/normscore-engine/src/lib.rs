// ─────────────────────────────────────────────────────────────────────
// Normscore — Simulation Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Orchestration layer: trace storage, template loading and the
//! end-to-end run that turns a stored trace into an immutable
//! [`SimulationReport`](normscore_types::SimulationReport).
//!
//! ```text
//! TraceStore ──► SimulationEngine::run ──► StructuralValidator
//!                        │                        │ verdict
//!                        ▼                        ▼
//!              four ScoringPasses ──► decomposition, Shapley, bridge
//!                        │
//!                        ▼
//!                 SimulationReport
//! ```

pub mod engine;
pub mod provider;
pub mod store;

pub use engine::SimulationEngine;
pub use provider::{load_template_file, load_template_json, TemplateDefinition};
pub use store::{ExternalTraceStore, InMemoryTraceStore, TraceStore};
