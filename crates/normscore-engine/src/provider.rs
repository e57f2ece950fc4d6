// ─────────────────────────────────────────────────────────────────────
// Normscore — Template Provider
// ─────────────────────────────────────────────────────────────────────
//! Serialized template definitions and their conversion into a frozen
//! [`NormativeTemplate`].
//!
//! The JSON form keeps the field names of the legacy procedure files
//! (`weight_wt`, `mitigation_factor`, `security_scope`, `tsallis_q`, ...)
//! and accepts the legacy `base_probability` in place of
//! `intrinsic_deviation` (`δ_intr = 1 − p_base`). Steps and surgits may be
//! written as arrays or as objects keyed by id; keyed objects keep their
//! document order.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use normscore_types::{
    DynamicsConfig, GlobalParameters, MitigationScope, NetDefinition, NormativeTemplate, NormscoreError,
    NormscoreResult, OutcomeCalibration, Step, Surgit, TransitionDefinition,
};

fn one() -> f64 {
    1.0
}

fn default_complexity() -> f64 {
    0.1
}

fn yes() -> bool {
    true
}

fn default_convention() -> String {
    "default".to_string()
}

/// A place list written either as a single name or as an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlaceList {
    One(String),
    Many(Vec<String>),
}

impl Default for PlaceList {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl PlaceList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(place) => vec![place],
            Self::Many(places) => places,
        }
    }
}

/// Definitions that carry their own id.
pub trait Identified {
    fn id_mut(&mut self) -> &mut String;
}

/// `{"id": {...}, ...}` in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedEntries<T>(pub Vec<(String, T)>);

impl<T: Serialize> Serialize for KeyedEntries<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for KeyedEntries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = KeyedEntries<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object keyed by id")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, T>()? {
                    entries.push((key, value));
                }
                Ok(KeyedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// Step or surgit collection written either as an array or keyed by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entries<T> {
    List(Vec<T>),
    Keyed(KeyedEntries<T>),
}

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl<T: Identified> Entries<T> {
    /// Flatten to a list; keyed entries take their id from the key.
    pub fn into_vec(self) -> NormscoreResult<Vec<T>> {
        let mut items = match self {
            Self::List(items) => items,
            Self::Keyed(KeyedEntries(entries)) => {
                let mut items = Vec::with_capacity(entries.len());
                for (key, mut item) in entries {
                    let id = item.id_mut();
                    if id.is_empty() {
                        *id = key;
                    } else if *id != key {
                        return Err(NormscoreError::Template(format!(
                            "entry keyed '{key}' declares id '{id}'"
                        )));
                    }
                    items.push(item);
                }
                items
            }
        };
        if items.iter_mut().any(|item| item.id_mut().is_empty()) {
            return Err(NormscoreError::Template("definition entry without id".to_string()));
        }
        Ok(items)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionEntry {
    pub id: String,
    #[serde(default, alias = "input")]
    pub inputs: PlaceList,
    #[serde(default, alias = "output")]
    pub outputs: PlaceList,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureDefinition {
    #[serde(default)]
    pub places: Vec<String>,
    #[serde(default)]
    pub transitions: Vec<TransitionEntry>,
    #[serde(default)]
    pub initial_marking: PlaceList,
}

impl StructureDefinition {
    fn into_net(self) -> NetDefinition {
        NetDefinition {
            places: self.places,
            transitions: self
                .transitions
                .into_iter()
                .map(|t| TransitionDefinition {
                    id: t.id,
                    inputs: t.inputs.into_vec(),
                    outputs: t.outputs.into_vec(),
                })
                .collect(),
            initial_marking: self.initial_marking.into_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurgitDefinition {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub intrinsic_deviation: Option<f64>,
    /// Legacy success probability; used only without `intrinsic_deviation`.
    #[serde(default)]
    pub base_probability: Option<f64>,
    #[serde(default = "one", alias = "mitigation")]
    pub mitigation_factor: f64,
    #[serde(default, alias = "scope")]
    pub security_scope: Option<String>,
    #[serde(default = "default_complexity")]
    pub complexity_weight: f64,
    #[serde(default = "yes")]
    pub is_mandatory: bool,
    #[serde(default)]
    pub is_safety: bool,
}

impl Identified for SurgitDefinition {
    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }
}

impl SurgitDefinition {
    /// `intrinsic_deviation`, else `1 − base_probability` (default 1).
    pub fn resolved_deviation(&self) -> f64 {
        self.intrinsic_deviation
            .unwrap_or_else(|| 1.0 - self.base_probability.unwrap_or(1.0))
    }

    fn into_surgit(self) -> NormscoreResult<Surgit> {
        let scope = match self.security_scope.as_deref() {
            Some(raw) => MitigationScope::parse(raw)?,
            None => MitigationScope::default(),
        };
        let delta = self.resolved_deviation();
        let mut surgit = Surgit::new(self.id, self.name)
            .with_intrinsic_deviation(delta)
            .with_mitigation(self.mitigation_factor, scope)
            .with_complexity_weight(self.complexity_weight)
            .with_mandatory(self.is_mandatory)
            .with_safety(self.is_safety);
        if let Some(description) = self.description {
            surgit = surgit.with_description(description);
        }
        Ok(surgit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "one", alias = "weight")]
    pub weight_wt: f64,
    #[serde(default)]
    pub surgits: Entries<SurgitDefinition>,
}

impl Identified for StepDefinition {
    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationDefinition {
    #[serde(default)]
    pub alpha_k: f64,
    #[serde(default)]
    pub beta_delta: f64,
    #[serde(default)]
    pub beta_s: f64,
}

/// Serialized form of a procedure template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    pub procedure_type: String,
    pub version: String,
    #[serde(default)]
    pub steps: Entries<StepDefinition>,
    #[serde(alias = "net")]
    pub structure_definition: StructureDefinition,
    #[serde(default, alias = "forbidden_markings")]
    pub forbidden_states: Vec<Vec<String>>,
    #[serde(default, alias = "dynamics")]
    pub dynamics_definition: DynamicsConfig,
    #[serde(default, alias = "complication_set")]
    pub complication_set_k: Vec<String>,
    #[serde(default)]
    pub calibration_coefficients: BTreeMap<String, CalibrationDefinition>,
    #[serde(default = "default_convention")]
    pub shapley_convention: String,
    #[serde(default = "one", alias = "q")]
    pub tsallis_q: f64,
    #[serde(default = "one", alias = "alpha")]
    pub weight_alpha: f64,
    #[serde(default = "one", alias = "beta")]
    pub weight_beta: f64,
}

impl TemplateDefinition {
    /// Validate and freeze.
    ///
    /// Calibration rows follow `complication_set_k` order; coefficients
    /// for undeclared complications are appended in name order.
    pub fn into_template(self) -> NormscoreResult<NormativeTemplate> {
        let mut builder = NormativeTemplate::builder(self.procedure_type, self.version)
            .net(self.structure_definition.into_net())
            .forbidden_markings(self.forbidden_states)
            .dynamics(self.dynamics_definition)
            .parameters(GlobalParameters {
                q: self.tsallis_q,
                alpha: self.weight_alpha,
                beta: self.weight_beta,
            })
            .shapley_convention(self.shapley_convention);

        for def in self.steps.into_vec()? {
            let mut step = Step::new(def.id, def.name).with_weight(def.weight_wt);
            if let Some(description) = def.description {
                step = step.with_description(description);
            }
            for surgit in def.surgits.into_vec()? {
                step = step.with_surgit(surgit.into_surgit()?);
            }
            builder = builder.step(step);
        }

        let mut coefficients = self.calibration_coefficients;
        for kind in &self.complication_set_k {
            builder = builder.complication(kind.clone());
        }
        for kind in &self.complication_set_k {
            if let Some(c) = coefficients.remove(kind) {
                builder = builder.calibration(OutcomeCalibration::new(kind.clone(), c.alpha_k, c.beta_delta, c.beta_s));
            }
        }
        for (kind, c) in coefficients {
            builder = builder.calibration(OutcomeCalibration::new(kind, c.alpha_k, c.beta_delta, c.beta_s));
        }

        builder.build()
    }
}

/// Parse a JSON template definition and freeze it.
pub fn load_template_json(json: &str) -> NormscoreResult<NormativeTemplate> {
    let definition: TemplateDefinition = serde_json::from_str(json)
        .map_err(|e| NormscoreError::Template(format!("invalid template JSON: {e}")))?;
    let template = definition.into_template()?;
    log::info!(
        "Loaded template '{}' v{} ({} surgits)",
        template.procedure_type(),
        template.version(),
        template.surgit_count()
    );
    Ok(template)
}

/// Read and parse a JSON template file.
pub fn load_template_file(path: impl AsRef<Path>) -> NormscoreResult<NormativeTemplate> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .map_err(|e| NormscoreError::Template(format!("cannot read template {}: {e}", path.display())))?;
    load_template_json(&json)
}
