// ─────────────────────────────────────────────────────────────────────
// Normscore — Normative Template
// ─────────────────────────────────────────────────────────────────────
//! Frozen procedure definition: steps, surgits, token-net structure,
//! forbidden markings, dynamics, global parameters and calibration.
//!
//! Nothing here exposes `&mut`. `Surgit` and `Step` are assembled with
//! consuming `with_*` calls before being handed to [`TemplateBuilder`];
//! once `build()` returns, the template can only be read.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{NormscoreError, NormscoreResult};

/// How far a surgit's mitigation factor reaches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MitigationScope {
    /// Discounts only the event that executes the surgit.
    #[default]
    #[serde(alias = "imm")]
    Immediate,
    /// Discounts this event and every later event in the trace.
    #[serde(alias = "res")]
    Residual,
    /// Leaves per-event deviation alone; discounts predicted outcomes.
    Outcome,
}

impl MitigationScope {
    /// Parse the serialized short or long form (`imm`, `residual`, ...).
    pub fn parse(value: &str) -> NormscoreResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "imm" | "immediate" => Ok(Self::Immediate),
            "res" | "residual" => Ok(Self::Residual),
            "outcome" => Ok(Self::Outcome),
            other => Err(NormscoreError::Template(format!(
                "unknown mitigation scope '{other}'"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Residual => "residual",
            Self::Outcome => "outcome",
        }
    }
}

impl fmt::Display for MitigationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic unit of procedural work; a transition in the token net.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Surgit {
    id: String,
    name: String,
    description: Option<String>,
    mandatory: bool,
    safety: bool,
    intrinsic_deviation: f64,
    mitigation: f64,
    scope: MitigationScope,
    complexity_weight: f64,
}

impl Surgit {
    /// Mandatory, non-safety, deviation-free, unmitigated surgit.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            mandatory: true,
            safety: false,
            intrinsic_deviation: 0.0,
            mitigation: 1.0,
            scope: MitigationScope::Immediate,
            complexity_weight: 1.0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = mandatory;
        self
    }

    pub fn with_safety(mut self, safety: bool) -> Self {
        self.safety = safety;
        self
    }

    pub fn with_intrinsic_deviation(mut self, delta: f64) -> Self {
        self.intrinsic_deviation = delta;
        self
    }

    /// Mitigation factor σ and the scope it applies to.
    pub fn with_mitigation(mut self, sigma: f64, scope: MitigationScope) -> Self {
        self.mitigation = sigma;
        self.scope = scope;
        self
    }

    pub fn with_complexity_weight(mut self, weight: f64) -> Self {
        self.complexity_weight = weight;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn is_safety(&self) -> bool {
        self.safety
    }

    /// δ_intr ∈ [0, 1].
    pub fn intrinsic_deviation(&self) -> f64 {
        self.intrinsic_deviation
    }

    /// σ ∈ [0, 1]; 1.0 means no mitigation.
    pub fn mitigation(&self) -> f64 {
        self.mitigation
    }

    pub fn scope(&self) -> MitigationScope {
        self.scope
    }

    pub fn complexity_weight(&self) -> f64 {
        self.complexity_weight
    }

    fn check(&self) -> NormscoreResult<()> {
        if !(0.0..=1.0).contains(&self.intrinsic_deviation) {
            return Err(NormscoreError::Template(format!(
                "surgit '{}': intrinsic deviation must be in [0, 1], got {}",
                self.id, self.intrinsic_deviation
            )));
        }
        if !(0.0..=1.0).contains(&self.mitigation) {
            return Err(NormscoreError::Template(format!(
                "surgit '{}': mitigation factor must be in [0, 1], got {}",
                self.id, self.mitigation
            )));
        }
        if !(self.complexity_weight.is_finite() && self.complexity_weight >= 0.0) {
            return Err(NormscoreError::Template(format!(
                "surgit '{}': complexity weight must be >= 0, got {}",
                self.id, self.complexity_weight
            )));
        }
        Ok(())
    }
}

/// Named grouping of surgits with its own criticality weight `w_t`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    id: String,
    name: String,
    description: Option<String>,
    weight: f64,
    surgits: Vec<Surgit>,
}

impl Step {
    /// Step with weight 1.0 and no surgits.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            weight: 1.0,
            surgits: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Append a surgit. Duplicate ids are rejected at template build time.
    pub fn with_surgit(mut self, surgit: Surgit) -> Self {
        self.surgits.push(surgit);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Criticality weight w_t ≥ 0.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Surgits in declaration order.
    pub fn surgits(&self) -> &[Surgit] {
        &self.surgits
    }

    pub fn surgit(&self, id: &str) -> Option<&Surgit> {
        self.surgits.iter().find(|s| s.id == id)
    }
}

/// One transition of the token net.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDefinition {
    pub id: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
}

impl TransitionDefinition {
    pub fn new(id: impl Into<String>, inputs: &[&str], outputs: &[&str]) -> Self {
        Self {
            id: id.into(),
            inputs: inputs.iter().map(|p| p.to_string()).collect(),
            outputs: outputs.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Places, transitions and initial marking of the structural model.
///
/// Each entry of `initial_marking` puts one token in the named place;
/// repeating a place puts several.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetDefinition {
    #[serde(default)]
    pub places: Vec<String>,
    #[serde(default)]
    pub transitions: Vec<TransitionDefinition>,
    #[serde(default)]
    pub initial_marking: Vec<String>,
}

impl NetDefinition {
    pub fn new(places: &[&str], initial_marking: &[&str]) -> Self {
        Self {
            places: places.iter().map(|p| p.to_string()).collect(),
            transitions: Vec::new(),
            initial_marking: initial_marking.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn with_transition(mut self, transition: TransitionDefinition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Linear chain `p0 -[t0]-> p1 -[t1]-> ... -> pn`, token in `p0`.
    ///
    /// Places are named `p0..=pn` after the transition ids' positions.
    pub fn sequential(transition_ids: &[&str]) -> Self {
        let places: Vec<String> = (0..=transition_ids.len()).map(|i| format!("p{i}")).collect();
        let transitions = transition_ids
            .iter()
            .enumerate()
            .map(|(i, id)| TransitionDefinition {
                id: id.to_string(),
                inputs: vec![places[i].clone()],
                outputs: vec![places[i + 1].clone()],
            })
            .collect();
        Self {
            initial_marking: vec![places[0].clone()],
            places,
            transitions,
        }
    }
}

/// Provenance decay configuration for the state dynamics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicsConfig {
    /// Per-event multiplicative decay of past provenance entries.
    pub provenance_decay: Option<f64>,
    /// Decay applied by pause events; falls back to `provenance_decay`.
    pub pause_decay: Option<f64>,
}

impl DynamicsConfig {
    pub fn with_decay(decay: f64) -> Self {
        Self {
            provenance_decay: Some(decay),
            pause_decay: None,
        }
    }

    pub fn decay_rate(&self, fallback: f64) -> f64 {
        self.provenance_decay.unwrap_or(fallback)
    }

    pub fn pause_decay_rate(&self, fallback: f64) -> f64 {
        self.pause_decay.unwrap_or_else(|| self.decay_rate(fallback))
    }
}

/// Entropy order and score weights: `Score = α·ρ_SIM + β·S_q(SIM)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalParameters {
    pub q: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self {
            q: 1.0,
            alpha: 1.0,
            beta: 1.0,
        }
    }
}

/// Logistic bridge coefficients for one complication type:
/// `η_k = α_k + β_Δ·ρ_SIM + β_S·S_q(SIM)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeCalibration {
    pub complication_type: String,
    pub alpha_k: f64,
    pub beta_delta: f64,
    pub beta_s: f64,
}

impl OutcomeCalibration {
    pub fn new(complication_type: impl Into<String>, alpha_k: f64, beta_delta: f64, beta_s: f64) -> Self {
        Self {
            complication_type: complication_type.into(),
            alpha_k,
            beta_delta,
            beta_s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SurgitLocation {
    step: usize,
    surgit: usize,
}

/// The frozen normative definition a trace is scored against.
#[derive(Debug, Clone, Serialize)]
pub struct NormativeTemplate {
    procedure_type: String,
    version: String,
    steps: Vec<Step>,
    net: NetDefinition,
    forbidden_markings: Vec<Vec<String>>,
    dynamics: DynamicsConfig,
    parameters: GlobalParameters,
    complication_set: Vec<String>,
    calibration: Vec<OutcomeCalibration>,
    shapley_convention: String,
    #[serde(skip)]
    index: HashMap<String, SurgitLocation>,
}

impl NormativeTemplate {
    pub fn builder(procedure_type: impl Into<String>, version: impl Into<String>) -> TemplateBuilder {
        TemplateBuilder::new(procedure_type, version)
    }

    pub fn procedure_type(&self) -> &str {
        &self.procedure_type
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Steps in declaration order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn net(&self) -> &NetDefinition {
        &self.net
    }

    /// Place sets that must never all hold a token at once.
    pub fn forbidden_markings(&self) -> &[Vec<String>] {
        &self.forbidden_markings
    }

    pub fn dynamics(&self) -> &DynamicsConfig {
        &self.dynamics
    }

    pub fn parameters(&self) -> GlobalParameters {
        self.parameters
    }

    pub fn complication_set(&self) -> &[String] {
        &self.complication_set
    }

    /// Calibration rows in declared order.
    pub fn calibration(&self) -> &[OutcomeCalibration] {
        &self.calibration
    }

    pub fn shapley_convention(&self) -> &str {
        &self.shapley_convention
    }

    /// O(1) lookup through the flat index built at construction.
    pub fn surgit(&self, id: &str) -> Option<&Surgit> {
        self.index
            .get(id)
            .map(|loc| &self.steps[loc.step].surgits[loc.surgit])
    }

    /// Step position (in `steps()`) and surgit for an id.
    pub fn locate(&self, id: &str) -> Option<(usize, &Surgit)> {
        self.index
            .get(id)
            .map(|loc| (loc.step, &self.steps[loc.step].surgits[loc.surgit]))
    }

    pub fn step_of(&self, surgit_id: &str) -> Option<&Step> {
        self.index.get(surgit_id).map(|loc| &self.steps[loc.step])
    }

    /// Ids of every mandatory surgit across all steps.
    pub fn mandatory_surgits(&self) -> BTreeSet<&str> {
        self.steps
            .iter()
            .flat_map(|step| step.surgits.iter())
            .filter(|s| s.mandatory)
            .map(|s| s.id.as_str())
            .collect()
    }

    pub fn surgit_count(&self) -> usize {
        self.index.len()
    }
}

/// Assembles and validates a [`NormativeTemplate`].
#[derive(Debug, Clone)]
pub struct TemplateBuilder {
    procedure_type: String,
    version: String,
    steps: Vec<Step>,
    net: NetDefinition,
    forbidden_markings: Vec<Vec<String>>,
    dynamics: DynamicsConfig,
    parameters: GlobalParameters,
    complication_set: Vec<String>,
    calibration: Vec<OutcomeCalibration>,
    shapley_convention: String,
}

impl TemplateBuilder {
    pub fn new(procedure_type: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            procedure_type: procedure_type.into(),
            version: version.into(),
            steps: Vec::new(),
            net: NetDefinition::default(),
            forbidden_markings: Vec::new(),
            dynamics: DynamicsConfig::default(),
            parameters: GlobalParameters::default(),
            complication_set: Vec::new(),
            calibration: Vec::new(),
            shapley_convention: "default".to_string(),
        }
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn net(mut self, net: NetDefinition) -> Self {
        self.net = net;
        self
    }

    pub fn forbidden_marking(mut self, places: &[&str]) -> Self {
        self.forbidden_markings
            .push(places.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn forbidden_markings(mut self, sets: Vec<Vec<String>>) -> Self {
        self.forbidden_markings.extend(sets);
        self
    }

    pub fn dynamics(mut self, dynamics: DynamicsConfig) -> Self {
        self.dynamics = dynamics;
        self
    }

    pub fn parameters(mut self, parameters: GlobalParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn q(mut self, q: f64) -> Self {
        self.parameters.q = q;
        self
    }

    pub fn weights(mut self, alpha: f64, beta: f64) -> Self {
        self.parameters.alpha = alpha;
        self.parameters.beta = beta;
        self
    }

    pub fn complication(mut self, complication_type: impl Into<String>) -> Self {
        self.complication_set.push(complication_type.into());
        self
    }

    /// Add calibration coefficients; the complication type joins the
    /// complication set if it is not already declared.
    pub fn calibration(mut self, calibration: OutcomeCalibration) -> Self {
        if !self
            .complication_set
            .iter()
            .any(|k| *k == calibration.complication_type)
        {
            self.complication_set
                .push(calibration.complication_type.clone());
        }
        self.calibration.push(calibration);
        self
    }

    pub fn shapley_convention(mut self, convention: impl Into<String>) -> Self {
        self.shapley_convention = convention.into();
        self
    }

    /// Validate the definition and freeze it.
    pub fn build(self) -> NormscoreResult<NormativeTemplate> {
        let mut index = HashMap::new();
        let mut step_ids = HashSet::new();

        for (step_pos, step) in self.steps.iter().enumerate() {
            if !step_ids.insert(step.id.as_str()) {
                return Err(NormscoreError::Template(format!(
                    "duplicate step id '{}'",
                    step.id
                )));
            }
            if !(step.weight.is_finite() && step.weight >= 0.0) {
                return Err(NormscoreError::Template(format!(
                    "step '{}': weight must be >= 0, got {}",
                    step.id, step.weight
                )));
            }
            for (surgit_pos, surgit) in step.surgits.iter().enumerate() {
                surgit.check()?;
                let location = SurgitLocation {
                    step: step_pos,
                    surgit: surgit_pos,
                };
                if index.insert(surgit.id.clone(), location).is_some() {
                    return Err(NormscoreError::Template(format!(
                        "duplicate surgit id '{}'",
                        surgit.id
                    )));
                }
            }
        }

        let places: HashSet<&str> = self.net.places.iter().map(String::as_str).collect();
        let undeclared = |place: &String| !places.contains(place.as_str());

        if let Some(place) = self.net.initial_marking.iter().find(|p| undeclared(*p)) {
            return Err(NormscoreError::Template(format!(
                "initial marking references undeclared place '{place}'"
            )));
        }
        let mut transition_ids = HashSet::new();
        for transition in &self.net.transitions {
            if !transition_ids.insert(transition.id.as_str()) {
                return Err(NormscoreError::Template(format!(
                    "duplicate transition id '{}'",
                    transition.id
                )));
            }
            if let Some(place) = transition
                .inputs
                .iter()
                .chain(transition.outputs.iter())
                .find(|p| undeclared(*p))
            {
                return Err(NormscoreError::Template(format!(
                    "transition '{}' references undeclared place '{place}'",
                    transition.id
                )));
            }
        }
        for set in &self.forbidden_markings {
            if set.is_empty() {
                return Err(NormscoreError::Template(
                    "forbidden marking sets must not be empty".to_string(),
                ));
            }
            if let Some(place) = set.iter().find(|p| undeclared(*p)) {
                return Err(NormscoreError::Template(format!(
                    "forbidden marking references undeclared place '{place}'"
                )));
            }
        }

        for (name, rate) in [
            ("provenance_decay", self.dynamics.provenance_decay),
            ("pause_decay", self.dynamics.pause_decay),
        ] {
            if let Some(rate) = rate {
                if !(0.0..=1.0).contains(&rate) {
                    return Err(NormscoreError::Template(format!(
                        "{name} must be in [0, 1], got {rate}"
                    )));
                }
            }
        }

        let GlobalParameters { q, alpha, beta } = self.parameters;
        if !(q.is_finite() && alpha.is_finite() && beta.is_finite()) {
            return Err(NormscoreError::Template(format!(
                "global parameters must be finite, got q={q}, alpha={alpha}, beta={beta}"
            )));
        }

        for calibration in &self.calibration {
            let coefficients = [calibration.alpha_k, calibration.beta_delta, calibration.beta_s];
            if coefficients.iter().any(|c| !c.is_finite()) {
                return Err(NormscoreError::Template(format!(
                    "calibration for '{}' has non-finite coefficients",
                    calibration.complication_type
                )));
            }
        }

        log::debug!(
            "Template '{}' v{} frozen: {} steps, {} surgits, {} transitions",
            self.procedure_type,
            self.version,
            self.steps.len(),
            index.len(),
            self.net.transitions.len()
        );

        Ok(NormativeTemplate {
            procedure_type: self.procedure_type,
            version: self.version,
            steps: self.steps,
            net: self.net,
            forbidden_markings: self.forbidden_markings,
            dynamics: self.dynamics,
            parameters: self.parameters,
            complication_set: self.complication_set,
            calibration: self.calibration,
            shapley_convention: self.shapley_convention,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_step_template() -> NormativeTemplate {
        NormativeTemplate::builder("Appendectomy", "1.0")
            .step(
                Step::new("P1", "Access")
                    .with_weight(2.0)
                    .with_surgit(Surgit::new("S1", "Incision").with_intrinsic_deviation(0.1))
                    .with_surgit(Surgit::new("S2", "Port placement").with_mandatory(false)),
            )
            .step(Step::new("P2", "Resection").with_surgit(Surgit::new("S3", "Ligation")))
            .net(NetDefinition::sequential(&["S1", "S2", "S3"]))
            .build()
            .unwrap()
    }

    #[test]
    fn test_flat_index_lookup() {
        let template = two_step_template();
        assert_eq!(template.surgit_count(), 3);
        assert_eq!(template.surgit("S3").unwrap().name(), "Ligation");
        assert_eq!(template.step_of("S2").unwrap().id(), "P1");
        let (step, surgit) = template.locate("S3").unwrap();
        assert_eq!(step, 1);
        assert_eq!(surgit.id(), "S3");
        assert!(template.surgit("S9").is_none());
    }

    #[test]
    fn test_mandatory_set() {
        let template = two_step_template();
        let mandatory: Vec<&str> = template.mandatory_surgits().into_iter().collect();
        assert_eq!(mandatory, vec!["S1", "S3"]);
    }

    #[test]
    fn test_duplicate_surgit_across_steps_rejected() {
        let result = NormativeTemplate::builder("Dup", "1.0")
            .step(Step::new("P1", "A").with_surgit(Surgit::new("S1", "x")))
            .step(Step::new("P2", "B").with_surgit(Surgit::new("S1", "y")))
            .build();
        assert!(matches!(result, Err(NormscoreError::Template(_))));
    }

    #[test]
    fn test_out_of_range_deviation_rejected() {
        let result = NormativeTemplate::builder("Bad", "1.0")
            .step(Step::new("P1", "A").with_surgit(Surgit::new("S1", "x").with_intrinsic_deviation(1.2)))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_out_of_range_mitigation_rejected() {
        let result = NormativeTemplate::builder("Bad", "1.0")
            .step(Step::new("P1", "A").with_surgit(
                Surgit::new("S1", "x").with_mitigation(-0.1, MitigationScope::Residual),
            ))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_step_weight_rejected() {
        let result = NormativeTemplate::builder("Bad", "1.0")
            .step(Step::new("P1", "A").with_weight(-1.0))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_undeclared_forbidden_place_rejected() {
        let result = NormativeTemplate::builder("Bad", "1.0")
            .net(NetDefinition::new(&["a"], &["a"]))
            .forbidden_marking(&["a", "ghost"])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_undeclared_transition_place_rejected() {
        let net = NetDefinition::new(&["a"], &["a"])
            .with_transition(TransitionDefinition::new("S1", &["a"], &["b"]));
        let result = NormativeTemplate::builder("Bad", "1.0").net(net).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_calibration_registers_complication() {
        let template = NormativeTemplate::builder("Cal", "1.0")
            .complication("SSI")
            .calibration(OutcomeCalibration::new("SSI", -2.0, 1.0, 2.0))
            .calibration(OutcomeCalibration::new("Leak", -3.0, 0.5, 0.5))
            .build()
            .unwrap();
        assert_eq!(template.complication_set(), &["SSI".to_string(), "Leak".to_string()]);
        assert_eq!(template.calibration().len(), 2);
    }

    #[test]
    fn test_scope_parse() {
        assert_eq!(MitigationScope::parse("imm").unwrap(), MitigationScope::Immediate);
        assert_eq!(MitigationScope::parse("RES").unwrap(), MitigationScope::Residual);
        assert_eq!(MitigationScope::parse("outcome").unwrap(), MitigationScope::Outcome);
        assert!(MitigationScope::parse("forever").is_err());
    }

    #[test]
    fn test_pause_decay_fallback() {
        let dynamics = DynamicsConfig::with_decay(0.5);
        assert_eq!(dynamics.pause_decay_rate(1.0), 0.5);
        let dynamics = DynamicsConfig {
            provenance_decay: None,
            pause_decay: Some(0.9),
        };
        assert_eq!(dynamics.decay_rate(1.0), 1.0);
        assert_eq!(dynamics.pause_decay_rate(1.0), 0.9);
    }

    #[test]
    fn test_sequential_net_shape() {
        let net = NetDefinition::sequential(&["A", "B"]);
        assert_eq!(net.places, vec!["p0", "p1", "p2"]);
        assert_eq!(net.initial_marking, vec!["p0"]);
        assert_eq!(net.transitions[1].inputs, vec!["p1"]);
        assert_eq!(net.transitions[1].outputs, vec!["p2"]);
    }
}
