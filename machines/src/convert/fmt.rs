//! Transition-table rendering backing the `Debug` impls of both machine
//! kinds.

use itertools::Itertools;

use crate::automaton::{Mealy, Moore};

fn decorate(state: &str, initial: &str) -> String {
    if state == initial {
        format!("-> {state}")
    } else {
        state.to_string()
    }
}

pub(crate) fn mealy_table(machine: &Mealy) -> String {
    let mut builder = tabled::builder::Builder::default();
    builder.push_record(
        std::iter::once("state".to_string()).chain(machine.inputs().iter().cloned()),
    );
    for state in machine.states().iter() {
        let mut row = vec![decorate(state, machine.initial())];
        for input in machine.inputs().iter() {
            let cell = machine
                .transitions(state, input)
                .iter()
                .map(|edge| format!("{}/{}", edge.target, edge.output))
                .join(", ");
            row.push(if cell.is_empty() { "-".to_string() } else { cell });
        }
        builder.push_record(row);
    }
    builder
        .build()
        .with(tabled::settings::Style::rounded())
        .to_string()
}

pub(crate) fn moore_table(machine: &Moore) -> String {
    let mut builder = tabled::builder::Builder::default();
    builder.push_record(
        ["state".to_string(), "output".to_string()]
            .into_iter()
            .chain(machine.inputs().iter().cloned()),
    );
    for state in machine.states().iter() {
        let output = machine
            .output_for(state)
            .map_or_else(|_| "-".to_string(), Clone::clone);
        let mut row = vec![decorate(state, machine.initial()), output];
        for input in machine.inputs().iter() {
            let cell = machine.next_states(state, input).iter().join(", ");
            row.push(if cell.is_empty() { "-".to_string() } else { cell });
        }
        builder.push_record(row);
    }
    builder
        .build()
        .with(tabled::settings::Style::rounded())
        .to_string()
}
