//! Pure conversions between the two machine kinds.
//!
//! Both directions read the source machine by shared reference and build a
//! fresh machine; deterministic reads are used throughout, so converting a
//! nondeterministic machine fails with the usual read errors.

use std::collections::VecDeque;

use tracing::debug;

use crate::{Map, Result, Set};

use super::{Mealy, Moore, Output, StateId};

/// Output reserved for the initial composite state when splitting a Mealy
/// machine: the initial state has no incoming transition to take an output
/// from.
const INITIAL_OUTPUT: &str = "eps";

/// Converts a Moore machine into a Mealy machine by lifting each target
/// state's output onto the incoming edge.
///
/// Walks the Moore machine breadth-first from its initial state; for every
/// edge `(s, a) → t` the result receives `(s, a) → (t, output-of(t))`. The
/// initial state carries over unchanged.
pub fn moore_to_mealy(moore: &Moore) -> Result<Mealy> {
    let mut initial = moore.initial().clone();
    if initial.is_empty() {
        match moore.states().first() {
            Some(first) => initial = first.clone(),
            None => return Ok(Mealy::default()),
        }
    }

    let mut mealy = Mealy::new(initial.clone());
    let mut visited: Set<StateId> = Set::from([initial.clone()]);
    let mut queue: VecDeque<StateId> = VecDeque::from([initial]);

    while let Some(from) = queue.pop_front() {
        for input in moore.inputs().iter() {
            if !moore.has_transition(&from, input) {
                continue;
            }
            let to = moore.next_state(&from, input)?;
            let output = moore.output_for(&to)?.clone();
            mealy.add_transition(from.clone(), input.clone(), to.clone(), output);

            if visited.insert(to.clone()) {
                queue.push_back(to);
            }
        }
    }

    debug!(states = mealy.states().len(), "moore converted to mealy");
    Ok(mealy)
}

/// Converts a Mealy machine into a Moore machine by splitting every Mealy
/// state on the output of its incoming transitions.
///
/// A composite state is identified by the pair `(mealy state, incoming
/// output)`. The initial composite keeps the original initial state's name
/// and is assigned the reserved output `"eps"`; composites discovered later
/// are named `{state}_{counter}` with a zero-based counter in breadth-first
/// discovery order. Every edge `(s, a) → (t, y)` becomes an edge from the
/// current composite to the composite `(t, y)`, whose state output is `y`.
pub fn mealy_to_moore(mealy: &Mealy) -> Result<Moore> {
    let initial = mealy.initial().clone();
    if initial.is_empty() {
        return Ok(Moore::default());
    }

    let mut moore = Moore::new(initial.clone());
    let mut composites: Map<(StateId, Output), StateId> = Map::new();
    let mut queue: VecDeque<(StateId, Output)> = VecDeque::new();
    let mut counter = 0usize;

    moore.add_state_output(initial.clone(), INITIAL_OUTPUT);
    composites.insert((initial.clone(), INITIAL_OUTPUT.to_string()), initial.clone());
    queue.push_back((initial, INITIAL_OUTPUT.to_string()));

    while let Some(key) = queue.pop_front() {
        let from = composites[&key].clone();
        let (mealy_state, _) = key;

        for input in mealy.inputs().iter() {
            if !mealy.has_transition(&mealy_state, input) {
                continue;
            }
            let next = mealy.next_state(&mealy_state, input)?;
            let output = mealy.transition_output(&mealy_state, input)?;

            let next_key = (next.clone(), output.clone());
            let to = match composites.get(&next_key) {
                Some(existing) => existing.clone(),
                None => {
                    let name = format!("{next}_{counter}");
                    counter += 1;
                    composites.insert(next_key.clone(), name.clone());
                    moore.add_state_output(name.clone(), output);
                    queue.push_back(next_key);
                    name
                }
            };

            moore.add_transition(from.clone(), input.clone(), to);
        }
    }

    debug!(states = moore.states().len(), "mealy converted to moore");
    Ok(moore)
}
