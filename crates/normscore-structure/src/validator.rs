// ─────────────────────────────────────────────────────────────────────
// Normscore — Structural Validator
// ─────────────────────────────────────────────────────────────────────
//! Replays a trace through the template's token net.
//!
//! Four checks, first failure wins:
//!   1. Initial marking must not cover a forbidden set
//!   2. Each non-pause event must name a declared, enabled transition
//!   3. No firing may reach a forbidden marking
//!   4. Every mandatory surgit must have fired

use std::collections::BTreeSet;

use normscore_types::{
    NormativeTemplate, StructuralViolation, SurgicalTrace, ValidationVerdict,
};

use crate::net::{Marking, TokenNet};

/// Validator bound to one template.
///
/// Holds only the immutable net; each [`validate`](Self::validate) call
/// works on its own marking.
pub struct StructuralValidator<'a> {
    template: &'a NormativeTemplate,
    net: TokenNet,
}

impl<'a> StructuralValidator<'a> {
    pub fn new(template: &'a NormativeTemplate) -> Self {
        Self {
            template,
            net: TokenNet::from_template(template),
        }
    }

    pub fn net(&self) -> &TokenNet {
        &self.net
    }

    /// Replay `trace` and return the verdict.
    pub fn validate(&self, trace: &SurgicalTrace) -> ValidationVerdict {
        let mut marking = self.net.initial_marking();
        let mut fired: Vec<String> = Vec::new();

        if let Some(places) = self.net.forbidden_match(&marking) {
            return self.reject(
                StructuralViolation::ForbiddenInitialMarking {
                    places: places.to_vec(),
                },
                fired,
            );
        }

        for (event_index, event) in trace.scored_events() {
            let transition = match self.net.transition(&event.surgit_id) {
                Some(t) => t,
                None => {
                    return self.reject(
                        StructuralViolation::UnknownTransition {
                            transition: event.surgit_id.clone(),
                            event_index,
                        },
                        fired,
                    );
                }
            };

            let missing = transition.missing_inputs(&marking);
            if !missing.is_empty() {
                return self.reject(
                    StructuralViolation::NotEnabled {
                        transition: transition.id.clone(),
                        event_index,
                        missing,
                    },
                    fired,
                );
            }

            self.net.fire(&mut marking, transition);
            fired.push(transition.id.clone());
            log::debug!(
                "Fired '{}' at event {event_index}: {:?}",
                transition.id,
                marking.snapshot()
            );

            if let Some(places) = self.net.forbidden_match(&marking) {
                return self.reject(
                    StructuralViolation::ForbiddenState {
                        transition: transition.id.clone(),
                        event_index,
                        places: places.to_vec(),
                    },
                    fired,
                );
            }
        }

        let fired_set: BTreeSet<&str> = fired.iter().map(String::as_str).collect();
        let missing: Vec<String> = self
            .template
            .mandatory_surgits()
            .into_iter()
            .filter(|id| !fired_set.contains(id))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return self.reject(StructuralViolation::MissingMandatory { missing }, fired);
        }

        log::info!(
            "Trace '{}' structurally valid ({} transitions fired)",
            trace.procedure_id,
            fired.len()
        );
        ValidationVerdict::valid(fired)
    }

    /// Final marking after replaying every firable event, ignoring
    /// violations. Useful for diagnostics on rejected traces.
    pub fn replay_marking(&self, trace: &SurgicalTrace) -> Marking {
        let mut marking = self.net.initial_marking();
        for (_, event) in trace.scored_events() {
            if let Some(transition) = self.net.transition(&event.surgit_id) {
                if transition.is_enabled(&marking) {
                    self.net.fire(&mut marking, transition);
                }
            }
        }
        marking
    }

    fn reject(&self, violation: StructuralViolation, fired: Vec<String>) -> ValidationVerdict {
        log::warn!("Structural validation failed: {violation}");
        ValidationVerdict::invalid(violation, fired)
    }
}

/// Validate `trace` against `template` with a freshly built net.
pub fn validate(trace: &SurgicalTrace, template: &NormativeTemplate) -> ValidationVerdict {
    StructuralValidator::new(template).validate(trace)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use normscore_types::{
        NetDefinition, Step, Surgit, SurgitEvent, TransitionDefinition, ValidationStatus,
    };

    use super::*;

    fn event(id: &str) -> SurgitEvent {
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        SurgitEvent::new(id, t, t)
    }

    fn trace(ids: &[&str]) -> SurgicalTrace {
        SurgicalTrace::new("T1", "PAT-1", ids.iter().map(|id| event(id)).collect())
    }

    fn sequential_template() -> NormativeTemplate {
        NormativeTemplate::builder("PN Test", "1.0")
            .step(
                Step::new("Step1", "Step 1")
                    .with_surgit(Surgit::new("S1", "Step 1"))
                    .with_surgit(Surgit::new("S2", "Step 2")),
            )
            .net(NetDefinition::sequential(&["S1", "S2"]))
            .build()
            .unwrap()
    }

    #[test]
    fn test_valid_sequence() {
        let verdict = validate(&trace(&["S1", "S2"]), &sequential_template());
        assert!(verdict.is_valid());
        assert_eq!(verdict.status, ValidationStatus::Valid);
        assert_eq!(verdict.fired, vec!["S1", "S2"]);
    }

    #[test]
    fn test_out_of_order_not_enabled() {
        let verdict = validate(&trace(&["S2", "S1"]), &sequential_template());
        match verdict.violation {
            Some(StructuralViolation::NotEnabled {
                transition,
                event_index,
                missing,
            }) => {
                assert_eq!(transition, "S2");
                assert_eq!(event_index, 0);
                assert_eq!(missing, vec!["p1"]);
            }
            other => panic!("expected NotEnabled, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_mandatory_after_valid_firings() {
        let verdict = validate(&trace(&["S1"]), &sequential_template());
        assert_eq!(
            verdict.violation,
            Some(StructuralViolation::MissingMandatory {
                missing: vec!["S2".to_string()]
            })
        );
        assert_eq!(verdict.fired, vec!["S1"]);
    }

    #[test]
    fn test_optional_surgit_may_be_skipped() {
        let template = NormativeTemplate::builder("Optional", "1.0")
            .step(
                Step::new("Step1", "Step 1")
                    .with_surgit(Surgit::new("S1", "a"))
                    .with_surgit(Surgit::new("S2", "b").with_mandatory(false)),
            )
            .net(NetDefinition::sequential(&["S1", "S2"]))
            .build()
            .unwrap();
        assert!(validate(&trace(&["S1"]), &template).is_valid());
    }

    #[test]
    fn test_unknown_transition() {
        let verdict = validate(&trace(&["S_INVALID"]), &sequential_template());
        assert!(matches!(
            verdict.violation,
            Some(StructuralViolation::UnknownTransition { ref transition, event_index: 0 })
                if transition == "S_INVALID"
        ));
    }

    #[test]
    fn test_pauses_are_not_fired() {
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let trace = SurgicalTrace::new(
            "T1",
            "PAT-1",
            vec![event("S1"), SurgitEvent::pause("PAUSE", t, t), event("S2")],
        );
        let verdict = validate(&trace, &sequential_template());
        assert!(verdict.is_valid(), "{}", verdict.message);
    }

    #[test]
    fn test_forbidden_state_after_firing() {
        let net = NetDefinition::new(&["open", "closed", "drain"], &["open"])
            .with_transition(TransitionDefinition::new("S1", &[], &["drain"]))
            .with_transition(TransitionDefinition::new("S2", &[], &["closed"]));
        let template = NormativeTemplate::builder("Forbidden", "1.0")
            .step(
                Step::new("Step1", "Step 1")
                    .with_surgit(Surgit::new("S1", "Drain"))
                    .with_surgit(Surgit::new("S2", "Close")),
            )
            .net(net)
            .forbidden_marking(&["open", "closed"])
            .build()
            .unwrap();
        let verdict = validate(&trace(&["S1", "S2"]), &template);
        assert!(matches!(
            verdict.violation,
            Some(StructuralViolation::ForbiddenState { ref transition, event_index: 1, .. })
                if transition == "S2"
        ));
    }

    #[test]
    fn test_forbidden_initial_marking() {
        let template = NormativeTemplate::builder("Forbidden", "1.0")
            .net(NetDefinition::new(&["a", "b"], &["a", "b"]))
            .forbidden_marking(&["a", "b"])
            .build()
            .unwrap();
        let verdict = validate(&trace(&[]), &template);
        assert!(matches!(
            verdict.violation,
            Some(StructuralViolation::ForbiddenInitialMarking { .. })
        ));
    }

    #[test]
    fn test_marking_not_reused_across_traces() {
        let template = sequential_template();
        let validator = StructuralValidator::new(&template);
        assert!(validator.validate(&trace(&["S1", "S2"])).is_valid());
        // A second identical trace must start again from p0.
        assert!(validator.validate(&trace(&["S1", "S2"])).is_valid());
    }

    #[test]
    fn test_replay_marking_skips_disabled() {
        let template = sequential_template();
        let validator = StructuralValidator::new(&template);
        let marking = validator.replay_marking(&trace(&["S2", "S1"]));
        assert_eq!(marking.tokens("p1"), 1);
    }
}
