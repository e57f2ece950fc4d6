// ─────────────────────────────────────────────────────────────────────
// Normscore — Conformance Kernel Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, and error hierarchy for the
//! normative conformance and risk scoring kernel.
//!
//! The template is a build-once value: every field is private and the
//! only way to obtain one is [`TemplateBuilder::build`], which validates
//! the definition and precomputes the flat surgit index. Traces are
//! plain records; reports are assembled once and exposed read-only.

pub mod config;
pub mod error;
pub mod report;
pub mod score;
pub mod template;
pub mod trace;
pub mod verdict;

pub use config::EngineConfig;
pub use error::{NormscoreError, NormscoreResult};
pub use report::{
    ChangeEventMetric, Decomposition, GlobalMetrics, NoiseMetric, OutcomeMetric, ReportContents,
    SimulationReport, StepMetric, TraceabilityEntry,
};
pub use score::clamp_score;
pub use template::{
    DynamicsConfig, GlobalParameters, MitigationScope, NetDefinition, NormativeTemplate,
    OutcomeCalibration, Step, Surgit, TemplateBuilder, TransitionDefinition,
};
pub use trace::{DeviationCause, PostoperativeOutcome, SurgicalTrace, SurgitEvent, SurgitType};
pub use verdict::{StructuralViolation, ValidationStatus, ValidationVerdict};
