//! Invariants that must hold for every machine any operation hands back.

use machines::prelude::*;

/// Every transition endpoint and the initial state are members of the
/// state list, and the result is deterministic with contiguous `S0, S1, …`
/// names.
fn assert_well_formed_mealy(machine: &Mealy) {
    if machine.states().is_empty() {
        return;
    }
    assert!(machine.states().contains(machine.initial()));
    assert!(machine.is_deterministic());
    for (index, state) in machine.states().iter().enumerate() {
        assert_eq!(state, &format!("S{index}"));
        for input in machine.inputs().iter() {
            for edge in machine.transitions(state, input) {
                assert!(machine.states().contains(&edge.target));
                assert!(machine.outputs().contains(&edge.output));
            }
        }
    }
}

fn assert_well_formed_moore(machine: &Moore) {
    if machine.states().is_empty() {
        return;
    }
    assert!(machine.states().contains(machine.initial()));
    assert!(machine.is_deterministic());
    for (index, state) in machine.states().iter().enumerate() {
        assert_eq!(state, &format!("S{index}"));
        assert!(machine.output_for(state).is_ok());
        for input in machine.inputs().iter() {
            for target in machine.next_states(state, input) {
                assert!(machine.states().contains(target));
            }
        }
    }
}

fn sample_mealy_nfa() -> Mealy {
    let mut machine = Mealy::from_transitions(
        "A",
        [
            ("A", "a", "B", "x"),
            ("A", "a", "C", "x"),
            ("B", "b", "C", "y"),
            ("C", "b", "C", "y"),
        ],
    );
    machine.add_transition("C", EPSILON, "B", "z");
    machine
}

fn sample_moore_nfa() -> Moore {
    let mut machine = Moore::new("P");
    machine.add_state_output("P", "0");
    machine.add_state_output("Q", "0");
    machine.add_state_output("R", "1");
    machine.add_transition("P", "a", "P");
    machine.add_transition("P", "a", "Q");
    machine.add_transition("Q", "b", "R");
    machine.add_transition("P", EPSILON, "Q");
    machine
}

#[test]
fn determinize_outputs_are_well_formed() {
    assert_well_formed_mealy(&sample_mealy_nfa().determinize().unwrap());
    assert_well_formed_moore(&sample_moore_nfa().determinize().unwrap());
}

#[test]
fn minimize_outputs_are_well_formed() {
    assert_well_formed_mealy(&sample_mealy_nfa().minimize().unwrap());
    assert_well_formed_moore(
        &sample_moore_nfa().determinize().unwrap().minimize().unwrap(),
    );
}

#[test]
fn minimization_reaches_every_state() {
    // reachability: walking the minimized machine from its initial state
    // visits the whole state list
    let machine = sample_moore_nfa().determinize().unwrap().minimize().unwrap();

    let mut seen = vec![machine.initial().clone()];
    let mut frontier = vec![machine.initial().clone()];
    while let Some(state) = frontier.pop() {
        for input in machine.inputs().iter() {
            for target in machine.next_states(&state, input) {
                if !seen.contains(target) {
                    seen.push(target.clone());
                    frontier.push(target.clone());
                }
            }
        }
    }

    assert_eq!(seen.len(), machine.states().len());
}

#[test]
fn conversions_preserve_the_state_list_invariant() {
    let mealy = sample_mealy_nfa().determinize().unwrap();
    let moore = mealy_to_moore(&mealy).unwrap();

    assert!(moore.states().contains(moore.initial()));
    for state in moore.states().iter() {
        assert!(moore.output_for(state).is_ok());
    }

    let back = moore_to_mealy(&moore).unwrap();
    assert!(back.states().contains(back.initial()));
}
