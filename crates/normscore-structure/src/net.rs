// ─────────────────────────────────────────────────────────────────────
// Normscore — Token Net
// ─────────────────────────────────────────────────────────────────────
//! Places hold token counts; a transition is enabled when each input
//! place holds at least as many tokens as it appears in the input list.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use normscore_types::NormativeTemplate;

/// Multiset of tokens over places.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marking {
    tokens: BTreeMap<String, u32>,
}

impl Marking {
    /// One token per listed place (repeats accumulate).
    pub fn from_places<'a>(places: impl IntoIterator<Item = &'a String>) -> Self {
        let mut marking = Self::default();
        for place in places {
            marking.produce(place);
        }
        marking
    }

    pub fn tokens(&self, place: &str) -> u32 {
        self.tokens.get(place).copied().unwrap_or(0)
    }

    /// True when every place in `places` holds at least one token.
    pub fn covers(&self, places: &[String]) -> bool {
        places.iter().all(|p| self.tokens(p) > 0)
    }

    pub fn total(&self) -> u32 {
        self.tokens.values().sum()
    }

    /// Non-empty places and their counts.
    pub fn snapshot(&self) -> BTreeMap<String, u32> {
        self.tokens.clone()
    }

    fn produce(&mut self, place: &str) {
        *self.tokens.entry(place.to_string()).or_insert(0) += 1;
    }

    fn consume(&mut self, place: &str) {
        if let Some(count) = self.tokens.get_mut(place) {
            *count -= 1;
            if *count == 0 {
                self.tokens.remove(place);
            }
        }
    }
}

/// Runtime transition: input and output places.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub id: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    demand: BTreeMap<String, u32>,
}

impl Transition {
    fn new(id: &str, inputs: &[String], outputs: &[String]) -> Self {
        let mut demand = BTreeMap::new();
        for place in inputs {
            *demand.entry(place.clone()).or_insert(0) += 1;
        }
        Self {
            id: id.to_string(),
            inputs: inputs.to_vec(),
            outputs: outputs.to_vec(),
            demand,
        }
    }

    /// Input places lacking tokens in `marking` (empty when enabled).
    pub fn missing_inputs(&self, marking: &Marking) -> Vec<String> {
        self.demand
            .iter()
            .filter(|(place, need)| marking.tokens(place) < **need)
            .map(|(place, _)| place.clone())
            .collect()
    }

    pub fn is_enabled(&self, marking: &Marking) -> bool {
        self.demand
            .iter()
            .all(|(place, need)| marking.tokens(place) >= *need)
    }
}

/// Process net built from a template's structural definition.
#[derive(Debug, Clone)]
pub struct TokenNet {
    transitions: HashMap<String, Transition>,
    initial: Marking,
    forbidden: Vec<Vec<String>>,
}

impl TokenNet {
    pub fn from_template(template: &NormativeTemplate) -> Self {
        let definition = template.net();
        let transitions = definition
            .transitions
            .iter()
            .map(|t| (t.id.clone(), Transition::new(&t.id, &t.inputs, &t.outputs)))
            .collect();
        Self {
            transitions,
            initial: Marking::from_places(&definition.initial_marking),
            forbidden: template.forbidden_markings().to_vec(),
        }
    }

    /// A fresh copy of the declared initial marking.
    pub fn initial_marking(&self) -> Marking {
        self.initial.clone()
    }

    pub fn transition(&self, id: &str) -> Option<&Transition> {
        self.transitions.get(id)
    }

    /// Consume one token per input occurrence, produce one per output.
    ///
    /// Callers check enablement first; firing a disabled transition
    /// leaves underflowing places at zero.
    pub fn fire(&self, marking: &mut Marking, transition: &Transition) {
        for place in &transition.inputs {
            marking.consume(place);
        }
        for place in &transition.outputs {
            marking.produce(place);
        }
    }

    /// First forbidden set fully covered by `marking`, if any.
    pub fn forbidden_match(&self, marking: &Marking) -> Option<&[String]> {
        self.forbidden
            .iter()
            .find(|set| marking.covers(set))
            .map(Vec::as_slice)
    }

    /// Breadth-first search for `target` from `start`.
    ///
    /// Markings that match a forbidden set are neither expanded nor
    /// accepted as the target; a forbidden `start` reaches nothing.
    /// Exploration stops after `max_markings` distinct markings, returning
    /// false.
    pub fn is_reachable(&self, start: &Marking, target: &Marking, max_markings: usize) -> bool {
        if self.forbidden_match(start).is_some() {
            return false;
        }
        if start == target {
            return true;
        }
        let mut ids: Vec<&String> = self.transitions.keys().collect();
        ids.sort();

        let mut seen: HashSet<Marking> = HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(start.clone());
        queue.push_back(start.clone());

        while let Some(marking) = queue.pop_front() {
            for id in &ids {
                let transition = &self.transitions[*id];
                if !transition.is_enabled(&marking) {
                    continue;
                }
                let mut next = marking.clone();
                self.fire(&mut next, transition);
                if self.forbidden_match(&next).is_some() {
                    continue;
                }
                if &next == target {
                    return true;
                }
                if seen.contains(&next) {
                    continue;
                }
                if seen.len() >= max_markings {
                    log::warn!("Reachability search truncated at {max_markings} markings");
                    return false;
                }
                seen.insert(next.clone());
                queue.push_back(next);
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use normscore_types::{NetDefinition, TransitionDefinition};

    use super::*;

    fn net_with(definition: NetDefinition, forbidden: &[&[&str]]) -> TokenNet {
        let mut builder = NormativeTemplate::builder("Net", "1.0").net(definition);
        for set in forbidden {
            builder = builder.forbidden_marking(set);
        }
        TokenNet::from_template(&builder.build().unwrap())
    }

    #[test]
    fn test_fire_moves_token() {
        let net = net_with(NetDefinition::sequential(&["A", "B"]), &[]);
        let mut marking = net.initial_marking();
        assert_eq!(marking.tokens("p0"), 1);
        let a = net.transition("A").unwrap();
        assert!(a.is_enabled(&marking));
        net.fire(&mut marking, a);
        assert_eq!(marking.tokens("p0"), 0);
        assert_eq!(marking.tokens("p1"), 1);
        assert_eq!(marking.total(), 1);
    }

    #[test]
    fn test_missing_inputs_reported() {
        let net = net_with(NetDefinition::sequential(&["A", "B"]), &[]);
        let marking = net.initial_marking();
        let b = net.transition("B").unwrap();
        assert_eq!(b.missing_inputs(&marking), vec!["p1".to_string()]);
    }

    #[test]
    fn test_repeated_input_needs_two_tokens() {
        let definition = NetDefinition::new(&["a", "b"], &["a"])
            .with_transition(TransitionDefinition::new("join", &["a", "a"], &["b"]));
        let net = net_with(definition, &[]);
        let join = net.transition("join").unwrap();
        assert!(!join.is_enabled(&net.initial_marking()));
        let doubled = Marking::from_places(&["a".to_string(), "a".to_string()]);
        assert!(join.is_enabled(&doubled));
    }

    #[test]
    fn test_source_transition_always_enabled() {
        let definition = NetDefinition::new(&["a"], &[])
            .with_transition(TransitionDefinition::new("spawn", &[], &["a"]));
        let net = net_with(definition, &[]);
        assert!(net.transition("spawn").unwrap().is_enabled(&Marking::default()));
    }

    #[test]
    fn test_forbidden_match() {
        let definition = NetDefinition::new(&["open", "closed"], &["open"])
            .with_transition(TransitionDefinition::new("close", &[], &["closed"]));
        let net = net_with(definition, &[&["open", "closed"]]);
        let mut marking = net.initial_marking();
        assert!(net.forbidden_match(&marking).is_none());
        net.fire(&mut marking, net.transition("close").unwrap());
        assert_eq!(
            net.forbidden_match(&marking),
            Some(&["open".to_string(), "closed".to_string()][..])
        );
    }

    #[test]
    fn test_reachability() {
        let net = net_with(NetDefinition::sequential(&["A", "B", "C"]), &[]);
        let start = net.initial_marking();
        let end = Marking::from_places(&["p3".to_string()]);
        assert!(net.is_reachable(&start, &end, 100));
        assert!(!net.is_reachable(&end, &start, 100));
    }

    #[test]
    fn test_reachability_blocked_by_forbidden() {
        let net = net_with(NetDefinition::sequential(&["A", "B"]), &[&["p1"]]);
        let end = Marking::from_places(&["p2".to_string()]);
        assert!(!net.is_reachable(&net.initial_marking(), &end, 100));
    }

    #[test]
    fn test_forbidden_target_unreachable() {
        let net = net_with(NetDefinition::sequential(&["A"]), &[&["p1"]]);
        let forbidden = Marking::from_places(&["p1".to_string()]);
        assert!(!net.is_reachable(&net.initial_marking(), &forbidden, 100));
        assert!(!net.is_reachable(&forbidden, &forbidden, 100));
        assert!(!net.is_reachable(&forbidden, &net.initial_marking(), 100));
    }
}
