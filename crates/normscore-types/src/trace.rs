// ─────────────────────────────────────────────────────────────────────
// Normscore — Surgical Trace Records
// ─────────────────────────────────────────────────────────────────────
//! Observed execution records. Read-only during scoring: the engine
//! derives values from events but never writes back to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether an event follows the template or is a change event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurgitType {
    #[default]
    Normative,
    /// Executed in place of a template surgit.
    CeSubstitution,
    /// Executed in addition to the template surgits.
    CeAddition,
}

impl SurgitType {
    pub fn is_change_event(self) -> bool {
        !matches!(self, Self::Normative)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normative => "normative",
            Self::CeSubstitution => "substitution",
            Self::CeAddition => "addition",
        }
    }
}

/// Recorded cause of a deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationCause {
    #[serde(alias = "intr")]
    Intrinsic,
    #[serde(alias = "pat")]
    Patient,
    #[serde(alias = "ext")]
    External,
    #[serde(alias = "dec")]
    Decision,
}

fn unit_noise() -> f64 {
    1.0
}

/// One observed execution of a surgit (or a pause).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurgitEvent {
    pub surgit_id: String,
    pub timestamp_start: DateTime<Utc>,
    pub timestamp_end: DateTime<Utc>,
    /// Patient-related noise factor n_t ≥ 1.
    #[serde(default = "unit_noise", alias = "n_t")]
    pub noise_patient: f64,
    /// External noise factor e_t ≥ 1.
    #[serde(default = "unit_noise", alias = "e_t")]
    pub noise_external: f64,
    #[serde(default)]
    pub is_deviation: bool,
    #[serde(default)]
    pub deviation_cause: Option<DeviationCause>,
    #[serde(default)]
    pub surgit_type: SurgitType,
    #[serde(default)]
    pub risk_tags: Vec<String>,
    /// Pauses are metadata: never fired, never scored, only decay memory.
    #[serde(default)]
    pub is_pause: bool,
}

impl SurgitEvent {
    /// Noise-free normative event.
    pub fn new(
        surgit_id: impl Into<String>,
        timestamp_start: DateTime<Utc>,
        timestamp_end: DateTime<Utc>,
    ) -> Self {
        Self {
            surgit_id: surgit_id.into(),
            timestamp_start,
            timestamp_end,
            noise_patient: 1.0,
            noise_external: 1.0,
            is_deviation: false,
            deviation_cause: None,
            surgit_type: SurgitType::Normative,
            risk_tags: Vec::new(),
            is_pause: false,
        }
    }

    /// External pause marker.
    pub fn pause(
        label: impl Into<String>,
        timestamp_start: DateTime<Utc>,
        timestamp_end: DateTime<Utc>,
    ) -> Self {
        Self {
            is_pause: true,
            ..Self::new(label, timestamp_start, timestamp_end)
        }
    }

    pub fn with_noise(mut self, n_t: f64, e_t: f64) -> Self {
        self.noise_patient = n_t;
        self.noise_external = e_t;
        self
    }

    pub fn with_deviation(mut self, cause: DeviationCause) -> Self {
        self.is_deviation = true;
        self.deviation_cause = Some(cause);
        self
    }

    pub fn with_type(mut self, surgit_type: SurgitType) -> Self {
        self.surgit_type = surgit_type;
        self
    }

    pub fn with_risk_tag(mut self, tag: impl Into<String>) -> Self {
        self.risk_tags.push(tag.into());
        self
    }

    /// Wall-clock duration in minutes (negative spans clamp to 0).
    pub fn duration_minutes(&self) -> f64 {
        let span = self.timestamp_end - self.timestamp_start;
        (span.num_milliseconds() as f64 / 60_000.0).max(0.0)
    }
}

/// Postoperative complication recorded against a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostoperativeOutcome {
    pub complication_type: String,
    pub time_window: String,
    #[serde(default)]
    pub severity_grade: Option<String>,
}

/// Full event log of one performed procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurgicalTrace {
    pub procedure_id: String,
    pub patient_id: String,
    #[serde(default)]
    pub events: Vec<SurgitEvent>,
    #[serde(default)]
    pub outcomes: Vec<PostoperativeOutcome>,
}

impl SurgicalTrace {
    pub fn new(
        procedure_id: impl Into<String>,
        patient_id: impl Into<String>,
        events: Vec<SurgitEvent>,
    ) -> Self {
        Self {
            procedure_id: procedure_id.into(),
            patient_id: patient_id.into(),
            events,
            outcomes: Vec::new(),
        }
    }

    pub fn with_outcome(mut self, outcome: PostoperativeOutcome) -> Self {
        self.outcomes.push(outcome);
        self
    }

    /// Non-pause events with their position in `events`.
    pub fn scored_events(&self) -> impl Iterator<Item = (usize, &SurgitEvent)> {
        self.events.iter().enumerate().filter(|(_, e)| !e.is_pause)
    }
}
