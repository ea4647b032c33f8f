#![allow(missing_docs)]
use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::{algorithms, convert, Error, Map, OrderedSet, Result, Set};

use super::{Input, Output, StateId, EPSILON};

/// A transducer that emits an output symbol on every transition.
///
/// The transition relation maps a `(from, input)` pair to a list of
/// [`MealyEdge`]s; more than one edge on the same pair means the machine is
/// nondeterministic. State, input and output lists keep insertion order,
/// which is the canonical iteration order everywhere in this crate.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Mealy {
    states: OrderedSet<StateId>,
    inputs: OrderedSet<Input>,
    outputs: OrderedSet<Output>,
    initial: StateId,
    transitions: Map<StateId, Map<Input, Vec<MealyEdge>>>,
}

/// Destination of a Mealy transition: the successor state together with the
/// output emitted while taking the edge.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct MealyEdge {
    pub target: StateId,
    pub output: Output,
}

impl Mealy {
    /// Creates an empty machine that will treat `initial` as its initial
    /// state once transitions mentioning it are added.
    pub fn new(initial: impl Into<StateId>) -> Self {
        Self {
            initial: initial.into(),
            ..Self::default()
        }
    }

    /// Builds a machine from `(from, input, to, output)` tuples, mostly
    /// useful in tests and small examples.
    pub fn from_transitions<I, S>(initial: S, transitions: I) -> Self
    where
        S: Into<StateId>,
        I: IntoIterator<Item = (S, S, S, S)>,
    {
        let mut machine = Self::new(initial);
        for (from, input, to, output) in transitions {
            machine.add_transition(from, input, to, output);
        }
        machine
    }

    pub fn states(&self) -> &OrderedSet<StateId> {
        &self.states
    }

    pub fn inputs(&self) -> &OrderedSet<Input> {
        &self.inputs
    }

    pub fn outputs(&self) -> &OrderedSet<Output> {
        &self.outputs
    }

    pub fn initial(&self) -> &StateId {
        &self.initial
    }

    pub fn set_initial(&mut self, initial: impl Into<StateId>) {
        self.initial = initial.into();
    }

    /// Records an edge. Both endpoints are appended to the state list if
    /// new, a non-ε input is appended to the input alphabet and the output
    /// to the output alphabet. Adding the same edge twice is a no-op.
    pub fn add_transition(
        &mut self,
        from: impl Into<StateId>,
        input: impl Into<Input>,
        to: impl Into<StateId>,
        output: impl Into<Output>,
    ) {
        let (from, input, to, output) = (from.into(), input.into(), to.into(), output.into());

        let edges = self
            .transitions
            .entry(from.clone())
            .or_default()
            .entry(input.clone())
            .or_default();
        let edge = MealyEdge {
            target: to.clone(),
            output: output.clone(),
        };
        if !edges.contains(&edge) {
            edges.push(edge);
        }

        self.states.insert(from);
        self.states.insert(to);
        if input != EPSILON {
            self.inputs.insert(input);
        }
        self.outputs.insert(output);
    }

    /// All edges leaving `from` on `input`, in insertion order.
    pub fn transitions(&self, from: &str, input: &str) -> &[MealyEdge] {
        self.transitions
            .get(from)
            .and_then(|by_input| by_input.get(input))
            .map_or(&[], Vec::as_slice)
    }

    pub fn has_transition(&self, from: &str, input: &str) -> bool {
        !self.transitions(from, input).is_empty()
    }

    /// The unique edge leaving `from` on `input`. Fails when there is none
    /// or when the point is nondeterministic.
    pub fn transition(&self, from: &str, input: &str) -> Result<&MealyEdge> {
        match self.transitions(from, input) {
            [] => Err(Error::NoTransition {
                state: from.to_string(),
                input: input.to_string(),
            }),
            [edge] => Ok(edge),
            _ => Err(Error::AmbiguousTransition {
                state: from.to_string(),
                input: input.to_string(),
            }),
        }
    }

    pub fn next_state(&self, from: &str, input: &str) -> Result<StateId> {
        Ok(self.transition(from, input)?.target.clone())
    }

    pub fn transition_output(&self, from: &str, input: &str) -> Result<Output> {
        Ok(self.transition(from, input)?.output.clone())
    }

    /// True iff the machine has no ε-edges and no `(from, input)` pair with
    /// more than one outgoing edge.
    pub fn is_deterministic(&self) -> bool {
        self.transitions.values().all(|by_input| {
            !by_input.get(EPSILON).is_some_and(|edges| !edges.is_empty())
                && by_input.values().all(|edges| edges.len() <= 1)
        })
    }

    /// The smallest superset of `states` closed under ε-edges.
    ///
    /// All ε-edges reachable from any member must agree on their output; a
    /// state with two ε-edges carrying different outputs cannot be folded
    /// into a single deterministic step.
    fn epsilon_closure(&self, states: &Set<StateId>) -> Result<Set<StateId>> {
        let mut closure = states.clone();
        let mut queue: VecDeque<StateId> = states.iter().cloned().collect();

        while let Some(state) = queue.pop_front() {
            let edges = self.transitions(&state, EPSILON);
            let mut output: Option<&Output> = None;
            for edge in edges {
                match output {
                    None => output = Some(&edge.output),
                    Some(seen) if *seen != edge.output => {
                        return Err(Error::NonDeterminizable(format!(
                            "output mismatch on epsilon transitions from state `{state}`"
                        )));
                    }
                    Some(_) => {}
                }
                if closure.insert(edge.target.clone()) {
                    queue.push_back(edge.target.clone());
                }
            }
        }
        Ok(closure)
    }

    /// Classical subset construction. The result is deterministic, ε-free
    /// and has states named `S0, S1, …` in discovery order.
    ///
    /// Beyond the textbook algorithm there is an output-consistency
    /// constraint: within one frontier subset, every edge taken on the same
    /// input must carry the same output, and ε-edges folded by the closure
    /// must agree as well. Either conflict fails with
    /// [`Error::NonDeterminizable`].
    pub fn determinize(&self) -> Result<Mealy> {
        if self.states.is_empty() {
            return Ok(Mealy::default());
        }

        let mut result = Mealy::default();
        let mut known: Map<Set<StateId>, StateId> = Map::new();
        let mut queue: VecDeque<Set<StateId>> = VecDeque::new();
        let mut counter = 0usize;

        let initial_closure = self.epsilon_closure(&Set::from([self.initial.clone()]))?;
        let initial_name = format!("S{counter}");
        counter += 1;

        result.initial = initial_name.clone();
        result.states.insert(initial_name.clone());
        known.insert(initial_closure.clone(), initial_name);
        queue.push_back(initial_closure);

        while let Some(subset) = queue.pop_front() {
            let from_name = known[&subset].clone();

            for input in self.inputs.iter() {
                let mut targets: Set<StateId> = Set::new();
                let mut output: Option<Output> = None;

                for state in &subset {
                    for edge in self.transitions(state, input) {
                        match &output {
                            None => output = Some(edge.output.clone()),
                            Some(seen) if *seen != edge.output => {
                                return Err(Error::NonDeterminizable(format!(
                                    "output mismatch on input `{input}` from subset `{from_name}`"
                                )));
                            }
                            Some(_) => {}
                        }
                        targets.insert(edge.target.clone());
                    }
                }

                let Some(output) = output else { continue };
                let closure = self.epsilon_closure(&targets)?;
                if closure.is_empty() {
                    continue;
                }

                let to_name = match known.get(&closure) {
                    Some(name) => name.clone(),
                    None => {
                        let name = format!("S{counter}");
                        counter += 1;
                        trace!(subset = ?closure, %name, "discovered subset state");
                        known.insert(closure.clone(), name.clone());
                        queue.push_back(closure);
                        result.states.insert(name.clone());
                        name
                    }
                };

                result.add_transition(from_name.clone(), input.clone(), to_name, output);
            }
        }

        result.inputs = self.inputs.clone();
        result.outputs = collect_edge_outputs(&result);
        debug!(
            states = result.states.len(),
            from = self.states.len(),
            "mealy subset construction finished"
        );
        Ok(result)
    }

    /// Drops every state that is not reachable from the initial state via
    /// ε- or input-transitions, along with the transitions touching it.
    /// This is the one mutating algorithm; the public entry points all copy
    /// first and hand back a fresh machine.
    pub(crate) fn remove_unreachable(&mut self) {
        if self.initial.is_empty() || self.states.is_empty() {
            self.states.clear();
            self.inputs.clear();
            self.outputs.clear();
            self.transitions.clear();
            return;
        }

        let mut reachable: Set<StateId> = Set::from([self.initial.clone()]);
        let mut queue: VecDeque<StateId> = VecDeque::from([self.initial.clone()]);

        while let Some(state) = queue.pop_front() {
            let Some(by_input) = self.transitions.get(&state) else {
                continue;
            };
            for edges in by_input.values() {
                for edge in edges {
                    if reachable.insert(edge.target.clone()) {
                        queue.push_back(edge.target.clone());
                    }
                }
            }
        }

        let dropped = self.states.len() - reachable.len();
        if dropped > 0 {
            debug!(dropped, "pruned unreachable mealy states");
        }

        self.states.retain(|state| reachable.contains(state));
        self.transitions.retain(|from, _| reachable.contains(from));
        for by_input in self.transitions.values_mut() {
            for edges in by_input.values_mut() {
                edges.retain(|edge| reachable.contains(&edge.target));
            }
        }
    }

    /// Returns the unique minimal machine with the same input/output
    /// behavior.
    ///
    /// A nondeterministic machine is determinized first. Unreachable states
    /// are pruned, the seed partition groups states by their outgoing-output
    /// signature over the input alphabet (empty-string sentinel for missing
    /// edges), and the partition is refined to its coarsest stable form.
    /// The rebuilt machine takes one representative edge set per block and
    /// names its states `S0, S1, …` in block order.
    pub fn minimize(&self) -> Result<Mealy> {
        let mut machine = if self.is_deterministic() {
            self.clone()
        } else {
            self.determinize()?
        };
        machine.remove_unreachable();
        if machine.states.is_empty() {
            return Ok(Mealy::default());
        }

        let mut groups: Map<Vec<Output>, Vec<StateId>> = Map::new();
        for state in machine.states.iter() {
            let signature: Vec<Output> = machine
                .inputs
                .iter()
                .map(|input| {
                    machine
                        .transitions(state, input)
                        .first()
                        .map_or_else(Output::new, |edge| edge.output.clone())
                })
                .collect();
            groups.entry(signature).or_default().push(state.clone());
        }

        let partition = algorithms::refine(
            groups.into_values().collect(),
            machine.inputs.as_slice(),
            |state, input| machine.transitions(state, input).first().map(|e| e.target.clone()),
        );
        debug!(blocks = partition.len(), "mealy minimization settled");

        let mut minimized = Mealy::default();
        let mut rename: Map<StateId, StateId> = Map::new();
        for (index, block) in partition.iter().enumerate() {
            let name = format!("S{index}");
            minimized.states.insert(name.clone());
            for old in block {
                rename.insert(old.clone(), name.clone());
            }
            if block.contains(&machine.initial) {
                minimized.initial = name;
            }
        }

        for block in &partition {
            let representative = &block[0];
            let from = rename[representative].clone();
            for input in machine.inputs.iter() {
                let Some(edge) = machine.transitions(representative, input).first() else {
                    continue;
                };
                minimized.add_transition(
                    from.clone(),
                    input.clone(),
                    rename[&edge.target].clone(),
                    edge.output.clone(),
                );
            }
        }

        minimized.inputs = machine.inputs.clone();
        minimized.outputs = collect_edge_outputs(&minimized);
        Ok(minimized)
    }
}

/// The set of outputs actually appearing on edges, in sorted order.
fn collect_edge_outputs(machine: &Mealy) -> OrderedSet<Output> {
    machine
        .transitions
        .values()
        .flat_map(|by_input| by_input.values())
        .flatten()
        .map(|edge| edge.output.clone())
        .collect::<Set<_>>()
        .into_iter()
        .collect()
}

impl std::fmt::Debug for Mealy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", convert::fmt::mealy_table(self))
    }
}

#[cfg(test)]
mod tests {
    use super::Mealy;
    use crate::{automaton::EPSILON, Error};
    use pretty_assertions::assert_eq;

    #[test]
    fn add_transition_extends_lists_in_insertion_order() {
        let mut machine = Mealy::new("S0");
        machine.add_transition("S0", "b", "S1", "y");
        machine.add_transition("S1", "a", "S0", "x");
        machine.add_transition("S0", "b", "S1", "y");

        assert_eq!(machine.states().as_slice(), &["S0", "S1"]);
        assert_eq!(machine.inputs().as_slice(), &["b", "a"]);
        assert_eq!(machine.outputs().as_slice(), &["y", "x"]);
        assert_eq!(machine.transitions("S0", "b").len(), 1);
    }

    #[test]
    fn epsilon_is_not_part_of_the_input_alphabet() {
        let mut machine = Mealy::new("S0");
        machine.add_transition("S0", EPSILON, "S1", "x");
        assert!(machine.inputs().is_empty());
        assert!(!machine.is_deterministic());
    }

    #[test]
    fn deterministic_reads() {
        let machine = Mealy::from_transitions("S0", [("S0", "a", "S1", "x")]);
        assert_eq!(machine.next_state("S0", "a").unwrap(), "S1");
        assert_eq!(machine.transition_output("S0", "a").unwrap(), "x");
        assert_eq!(
            machine.next_state("S1", "a"),
            Err(Error::NoTransition {
                state: "S1".into(),
                input: "a".into()
            })
        );

        let machine = Mealy::from_transitions(
            "S0",
            [("S0", "a", "S1", "x"), ("S0", "a", "S2", "x")],
        );
        assert_eq!(
            machine.next_state("S0", "a"),
            Err(Error::AmbiguousTransition {
                state: "S0".into(),
                input: "a".into()
            })
        );
    }

    #[test]
    fn determinize_rejects_output_conflict() {
        // spec scenario: (S0, a) -> (S1, x) and (S0, a) -> (S2, y)
        let machine = Mealy::from_transitions(
            "S0",
            [("S0", "a", "S1", "x"), ("S0", "a", "S2", "y")],
        );
        assert!(matches!(
            machine.determinize(),
            Err(Error::NonDeterminizable(_))
        ));
    }

    #[test]
    fn determinize_rejects_epsilon_output_conflict() {
        let mut machine = Mealy::new("S0");
        machine.add_transition("S0", EPSILON, "S1", "x");
        machine.add_transition("S0", EPSILON, "S2", "y");
        assert!(matches!(
            machine.determinize(),
            Err(Error::NonDeterminizable(_))
        ));
    }

    #[test]
    fn determinize_merges_agreeing_edges() {
        let machine = Mealy::from_transitions(
            "P",
            [
                ("P", "a", "Q", "x"),
                ("P", "a", "R", "x"),
                ("Q", "b", "Q", "z"),
                ("R", "b", "Q", "z"),
            ],
        );
        let dfa = machine.determinize().unwrap();

        assert!(dfa.is_deterministic());
        // {P} -> {Q,R} -> {Q}
        assert_eq!(dfa.states().as_slice(), &["S0", "S1", "S2"]);
        assert_eq!(dfa.initial(), "S0");
        assert_eq!(dfa.transition_output("S0", "a").unwrap(), "x");
        assert_eq!(dfa.next_state("S1", "b").unwrap(), "S2");
        assert_eq!(dfa.next_state("S2", "b").unwrap(), "S2");
    }

    #[test]
    fn determinize_renames_even_when_already_deterministic() {
        let machine = Mealy::from_transitions("A", [("A", "a", "B", "x"), ("B", "a", "A", "y")]);
        let dfa = machine.determinize().unwrap();
        assert_eq!(dfa.states().as_slice(), &["S0", "S1"]);
    }

    #[test]
    fn minimize_collapses_equivalent_states() {
        // B and C emit the same outputs and step to the same class.
        let machine = Mealy::from_transitions(
            "A",
            [
                ("A", "0", "B", "x"),
                ("A", "1", "C", "x"),
                ("B", "0", "D", "y"),
                ("B", "1", "D", "y"),
                ("C", "0", "D", "y"),
                ("C", "1", "D", "y"),
                ("D", "0", "D", "z"),
                ("D", "1", "D", "z"),
            ],
        );
        let minimized = machine.minimize().unwrap();

        assert_eq!(minimized.states().len(), 3);
        assert!(minimized.is_deterministic());
        let b = minimized.next_state(minimized.initial(), "0").unwrap();
        let c = minimized.next_state(minimized.initial(), "1").unwrap();
        assert_eq!(b, c);
    }

    #[test]
    fn minimize_prunes_unreachable_states() {
        let machine = Mealy::from_transitions(
            "A",
            [("A", "a", "A", "x"), ("Z", "a", "Z", "q")],
        );
        let minimized = machine.minimize().unwrap();
        assert_eq!(minimized.states().as_slice(), &["S0"]);
        assert_eq!(minimized.outputs().as_slice(), &["x"]);
    }

    #[test]
    fn minimize_is_idempotent() {
        let machine = Mealy::from_transitions(
            "A",
            [
                ("A", "a", "B", "x"),
                ("B", "a", "A", "x"),
                ("A", "b", "A", "y"),
                ("B", "b", "B", "y"),
            ],
        );
        let once = machine.minimize().unwrap();
        let twice = once.minimize().unwrap();
        assert_eq!(once, twice);
    }
}
