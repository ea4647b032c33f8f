use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::{algorithms, convert, Error, Map, OrderedSet, Result, Set};

use super::{Input, Output, StateId, EPSILON};

/// A transducer whose outputs live on states rather than transitions.
///
/// Every state carries exactly one output symbol once construction is
/// complete; the transition relation maps a `(from, input)` pair to a list
/// of successor states, with two or more successors expressing
/// nondeterminism. As with [`Mealy`](super::Mealy), state and alphabet
/// lists keep insertion order.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Moore {
    states: OrderedSet<StateId>,
    inputs: OrderedSet<Input>,
    outputs: OrderedSet<Output>,
    initial: StateId,
    state_outputs: Map<StateId, Output>,
    transitions: Map<StateId, Map<Input, Vec<StateId>>>,
}

impl Moore {
    /// Creates an empty machine that will treat `initial` as its initial
    /// state once it is populated.
    pub fn new(initial: impl Into<StateId>) -> Self {
        Self {
            initial: initial.into(),
            ..Self::default()
        }
    }

    /// Accessor for the canonical state list.
    pub fn states(&self) -> &OrderedSet<StateId> {
        &self.states
    }

    /// Accessor for the input alphabet (never contains ε).
    pub fn inputs(&self) -> &OrderedSet<Input> {
        &self.inputs
    }

    /// Accessor for the output alphabet.
    pub fn outputs(&self) -> &OrderedSet<Output> {
        &self.outputs
    }

    /// The designated initial state.
    pub fn initial(&self) -> &StateId {
        &self.initial
    }

    /// Replaces the designated initial state.
    pub fn set_initial(&mut self, initial: impl Into<StateId>) {
        self.initial = initial.into();
    }

    /// Records (or overwrites) the output of `state`, appending the state
    /// and the output to the canonical lists if they are new.
    pub fn add_state_output(&mut self, state: impl Into<StateId>, output: impl Into<Output>) {
        let (state, output) = (state.into(), output.into());
        self.state_outputs.insert(state.clone(), output.clone());
        self.states.insert(state);
        self.outputs.insert(output);
    }

    /// Records an edge. The successor list per `(from, input)` is kept
    /// duplicate-free, so adding the same edge twice is a no-op.
    pub fn add_transition(
        &mut self,
        from: impl Into<StateId>,
        input: impl Into<Input>,
        to: impl Into<StateId>,
    ) {
        let (from, input, to) = (from.into(), input.into(), to.into());

        let successors = self
            .transitions
            .entry(from.clone())
            .or_default()
            .entry(input.clone())
            .or_default();
        if !successors.contains(&to) {
            successors.push(to.clone());
        }

        self.states.insert(from);
        self.states.insert(to);
        if input != EPSILON {
            self.inputs.insert(input);
        }
    }

    /// The output recorded for `state`.
    pub fn output_for(&self, state: &str) -> Result<&Output> {
        self.state_outputs
            .get(state)
            .ok_or_else(|| Error::MissingStateOutput(state.to_string()))
    }

    /// All successors of `from` on `input`, in insertion order.
    pub fn next_states(&self, from: &str, input: &str) -> &[StateId] {
        self.transitions
            .get(from)
            .and_then(|by_input| by_input.get(input))
            .map_or(&[], Vec::as_slice)
    }

    /// Whether at least one edge leaves `from` on `input`.
    pub fn has_transition(&self, from: &str, input: &str) -> bool {
        !self.next_states(from, input).is_empty()
    }

    /// The unique successor of `from` on `input`. Fails when there is none
    /// or when the point is nondeterministic.
    pub fn next_state(&self, from: &str, input: &str) -> Result<StateId> {
        match self.next_states(from, input) {
            [] => Err(Error::NoTransition {
                state: from.to_string(),
                input: input.to_string(),
            }),
            [next] => Ok(next.clone()),
            _ => Err(Error::AmbiguousTransition {
                state: from.to_string(),
                input: input.to_string(),
            }),
        }
    }

    /// True iff there are no ε-edges and every `(from, input)` pair has at
    /// most one successor.
    pub fn is_deterministic(&self) -> bool {
        self.transitions.values().all(|by_input| {
            !by_input
                .get(EPSILON)
                .is_some_and(|successors| !successors.is_empty())
                && by_input.values().all(|successors| successors.len() <= 1)
        })
    }

    /// The smallest superset of `states` closed under ε-edges.
    fn epsilon_closure(&self, states: &Set<StateId>) -> Set<StateId> {
        let mut closure = states.clone();
        let mut queue: VecDeque<StateId> = states.iter().cloned().collect();

        while let Some(state) = queue.pop_front() {
            for next in self.next_states(&state, EPSILON) {
                if closure.insert(next.clone()) {
                    queue.push_back(next.clone());
                }
            }
        }
        closure
    }

    /// The single output shared by every member of `states`, if one exists.
    ///
    /// One disagreement is resolved rather than rejected: a subset whose
    /// members carry exactly the outputs `"0"` and `"1"` merges to `"1"`.
    /// Accepting-dominates-rejecting is a deliberate contract choice, not
    /// leniency — the grammar and regex pipelines compile acceptance into
    /// exactly these two outputs and rely on the union of an accepting and
    /// a rejecting state staying accepting. Any other mix yields `None`.
    fn consistent_output(&self, states: &Set<StateId>) -> Result<Option<Output>> {
        let mut merged: Option<Output> = None;
        for state in states {
            let output = self.output_for(state)?;
            match &merged {
                None => merged = Some(output.clone()),
                Some(seen) if seen == output => {}
                Some(seen) => {
                    let zero_one = (seen == "0" && output == "1") || (seen == "1" && output == "0");
                    if !zero_one {
                        return Ok(None);
                    }
                    merged = Some("1".to_string());
                }
            }
        }
        Ok(merged)
    }

    /// NFA→DFA subset construction for Moore machines. The result is
    /// deterministic, ε-free and named `S0, S1, …` in discovery order;
    /// every composite state takes the consistent output of its member
    /// subset (see [`Self::consistent_output`] for the 0/1 merge rule).
    pub fn determinize(&self) -> Result<Moore> {
        if self.states.is_empty() {
            return Ok(Moore::default());
        }

        let mut result = Moore::default();
        let mut known: Map<Set<StateId>, StateId> = Map::new();
        let mut queue: VecDeque<Set<StateId>> = VecDeque::new();
        let mut counter = 0usize;

        let initial_set = self.epsilon_closure(&Set::from([self.initial.clone()]));
        let initial_output = self.consistent_output(&initial_set)?.ok_or_else(|| {
            Error::NonDeterminizable(
                "output conflict in the initial state's epsilon closure".to_string(),
            )
        })?;

        let initial_name = format!("S{counter}");
        counter += 1;
        result.add_state_output(initial_name.clone(), initial_output);
        result.initial = initial_name.clone();
        known.insert(initial_set.clone(), initial_name);
        queue.push_back(initial_set);

        while let Some(subset) = queue.pop_front() {
            let from_name = known[&subset].clone();

            for input in self.inputs.iter() {
                let mut targets: Set<StateId> = Set::new();
                for state in &subset {
                    targets.extend(self.next_states(state, input).iter().cloned());
                }
                if targets.is_empty() {
                    continue;
                }

                let closure = self.epsilon_closure(&targets);
                let to_name = match known.get(&closure) {
                    Some(name) => name.clone(),
                    None => {
                        let output = self.consistent_output(&closure)?.ok_or_else(|| {
                            Error::NonDeterminizable(format!(
                                "output conflict in subset reached on input `{input}`"
                            ))
                        })?;
                        let name = format!("S{counter}");
                        counter += 1;
                        trace!(subset = ?closure, %name, "discovered subset state");
                        result.add_state_output(name.clone(), output);
                        known.insert(closure.clone(), name.clone());
                        queue.push_back(closure);
                        name
                    }
                };

                result.add_transition(from_name.clone(), input.clone(), to_name);
            }
        }

        result.inputs = self.inputs.clone();
        result.outputs = result
            .state_outputs
            .values()
            .cloned()
            .collect::<Set<_>>()
            .into_iter()
            .collect();
        debug!(
            states = result.states.len(),
            from = self.states.len(),
            "moore subset construction finished"
        );
        Ok(result)
    }

    /// Drops every state not reachable from the initial state via ε- or
    /// input-transitions, together with its transitions and its entry in
    /// the state-output map.
    pub(crate) fn remove_unreachable(&mut self) {
        if self.initial.is_empty() || self.states.is_empty() {
            self.states.clear();
            self.inputs.clear();
            self.outputs.clear();
            self.state_outputs.clear();
            self.transitions.clear();
            return;
        }

        let mut reachable = self.epsilon_closure(&Set::from([self.initial.clone()]));
        let mut queue: VecDeque<StateId> = reachable.iter().cloned().collect();

        while let Some(state) = queue.pop_front() {
            let Some(by_input) = self.transitions.get(&state) else {
                continue;
            };
            for successors in by_input.values() {
                for next in successors {
                    if reachable.insert(next.clone()) {
                        queue.push_back(next.clone());
                    }
                }
            }
        }

        let dropped = self.states.len() - reachable.len();
        if dropped > 0 {
            debug!(dropped, "pruned unreachable moore states");
        }

        self.states.retain(|state| reachable.contains(state));
        self.state_outputs.retain(|state, _| reachable.contains(state));
        self.transitions.retain(|from, _| reachable.contains(from));
        for by_input in self.transitions.values_mut() {
            for successors in by_input.values_mut() {
                successors.retain(|next| reachable.contains(next));
            }
        }
    }

    /// Returns the unique minimal deterministic machine with the same
    /// state-output behavior.
    ///
    /// Unlike the Mealy variant this refuses nondeterministic input
    /// outright; determinize first. Unreachable states are pruned, the seed
    /// partition groups states by their output, and refinement proceeds as
    /// for Mealy. States of the result are named `S0, S1, …` in block
    /// order.
    pub fn minimize(&self) -> Result<Moore> {
        if !self.is_deterministic() {
            return Err(Error::CannotMinimize);
        }

        let mut machine = self.clone();
        machine.remove_unreachable();
        if machine.states.is_empty() {
            return Ok(Moore::default());
        }

        let mut groups: Map<Output, Vec<StateId>> = Map::new();
        for state in machine.states.iter() {
            let output = machine.output_for(state)?.clone();
            groups.entry(output).or_default().push(state.clone());
        }

        let partition = algorithms::refine(
            groups.into_values().collect(),
            machine.inputs.as_slice(),
            |state, input| machine.next_states(state, input).first().cloned(),
        );
        debug!(blocks = partition.len(), "moore minimization settled");

        let mut minimized = Moore::default();
        let mut rename: Map<StateId, StateId> = Map::new();
        for (index, block) in partition.iter().enumerate() {
            let name = format!("S{index}");
            let representative = &block[0];
            minimized.add_state_output(name.clone(), machine.output_for(representative)?.clone());
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
                let Some(next) = machine.next_states(representative, input).first() else {
                    continue;
                };
                minimized.add_transition(from.clone(), input.clone(), rename[next].clone());
            }
        }

        minimized.inputs = machine.inputs.clone();
        minimized.outputs = machine.outputs.clone();
        Ok(minimized)
    }
}

impl std::fmt::Debug for Moore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", convert::fmt::moore_table(self))
    }
}
