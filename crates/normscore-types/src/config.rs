// ─────────────────────────────────────────────────────────────────────
// Normscore — Engine Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{NormscoreError, NormscoreResult};

/// Runtime configuration for the scoring engine.
///
/// Procedure-specific parameters (entropy order `q`, score weights,
/// calibration) belong to the template. This struct only holds knobs
/// that govern how the engine computes, not what it computes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum tolerated residual of the decomposition identity
    /// `Score_actual = Score_ideal + Φ_patient + Φ_external + Φ_decision`.
    /// Default: 1e-9.
    pub attribution_tolerance: f64,

    /// Run the four counterfactual passes on scoped threads.
    /// Default: false.
    pub parallel_passes: bool,

    /// Clamp distance from 0 and 1 applied by `logit`.
    /// Default: 1e-12.
    pub logit_epsilon: f64,

    /// Linear predictors are clamped to ±this before the sigmoid.
    /// Default: 60.0.
    pub sigmoid_clamp: f64,

    /// Provenance decay used when the template declares none.
    /// Default: 1.0 (full memory).
    pub default_decay_rate: f64,

    /// Largest player set accepted by exact Shapley enumeration.
    /// Default: 10.
    pub max_shapley_players: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            attribution_tolerance: 1e-9,
            parallel_passes: false,
            logit_epsilon: 1e-12,
            sigmoid_clamp: 60.0,
            default_decay_rate: 1.0,
            max_shapley_players: 10,
        }
    }
}

impl EngineConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> NormscoreResult<()> {
        if !(self.attribution_tolerance.is_finite() && self.attribution_tolerance > 0.0) {
            return Err(NormscoreError::Config(format!(
                "attribution_tolerance must be finite and > 0, got {}",
                self.attribution_tolerance
            )));
        }
        if !(self.logit_epsilon > 0.0 && self.logit_epsilon < 0.5) {
            return Err(NormscoreError::Config(format!(
                "logit_epsilon must be in (0, 0.5), got {}",
                self.logit_epsilon
            )));
        }
        if !(self.sigmoid_clamp.is_finite() && self.sigmoid_clamp > 0.0) {
            return Err(NormscoreError::Config(format!(
                "sigmoid_clamp must be finite and > 0, got {}",
                self.sigmoid_clamp
            )));
        }
        if !(0.0..=1.0).contains(&self.default_decay_rate) {
            return Err(NormscoreError::Config(format!(
                "default_decay_rate must be in [0, 1], got {}",
                self.default_decay_rate
            )));
        }
        if self.max_shapley_players < 1 {
            return Err(NormscoreError::Config(
                "max_shapley_players must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> NormscoreResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| NormscoreError::Config(format!("JSON parse error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_tolerance() {
        let config = EngineConfig {
            attribution_tolerance: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(NormscoreError::Config(_))));
    }

    #[test]
    fn test_rejects_decay_above_one() {
        let config = EngineConfig {
            default_decay_rate: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(r#"{"parallel_passes": true}"#).unwrap();
        assert!(config.parallel_passes);
        assert_eq!(config.max_shapley_players, 10);
        assert!((config.attribution_tolerance - 1e-9).abs() < 1e-18);
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(EngineConfig::from_json("{not json").is_err());
    }
}
