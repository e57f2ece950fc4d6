// ─────────────────────────────────────────────────────────────────────
// Normscore — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all fatal kernel failures.
///
/// Structural non-conformance is deliberately absent: it is a verdict
/// attached to the report (see [`crate::StructuralViolation`]), not a
/// failure of the run.
#[derive(Error, Debug)]
pub enum NormscoreError {
    /// No stored trace under the requested id.
    #[error("trace not found: {trace_id}")]
    TraceNotFound { trace_id: String },

    /// A noise factor below 1.0 (or non-finite) was recorded.
    #[error("invalid noise factor: n_t={n_t}, e_t={e_t} (both must be >= 1)")]
    InvalidNoiseFactor { n_t: f64, e_t: f64 },

    /// An event references a surgit id the template does not define.
    #[error("unknown surgit: {0}")]
    UnknownSurgit(String),

    /// Template definition is inconsistent.
    #[error("template error: {0}")]
    Template(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// The additive decomposition does not reconstruct the actual score.
    #[error("attribution inconsistency: residual {residual:e} exceeds tolerance {tolerance:e}")]
    AttributionInconsistency { residual: f64, tolerance: f64 },

    /// Numerical error (NaN/Inf in computation).
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Trace store backend failed.
    #[error("trace store error: {0}")]
    Store(String),

    /// A parallel scoring pass did not complete.
    #[error("concurrency error: {0}")]
    Concurrency(String),
}

pub type NormscoreResult<T> = Result<T, NormscoreError>;
