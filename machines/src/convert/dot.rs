use regex::Regex;
use tracing::trace;

use crate::automaton::{Mealy, Moore, StateId, EPSILON};
use crate::Result;

/// Rendering a machine as graph-description text.
pub trait ToDot {
    /// Produces the complete `digraph … { … }` text for this machine.
    fn to_dot(&self) -> String;
}

impl ToDot for Mealy {
    /// Mealy nodes are bare identifiers (the initial state is annotated
    /// with `shape=doublecircle`); edges carry `input/output` labels with ε
    /// rendered as `E`.
    fn to_dot(&self) -> String {
        let mut lines = vec![
            "digraph MealyMachine {".to_string(),
            "    rankdir=LR;".to_string(),
            "    size=\"8,5\"".to_string(),
            String::new(),
        ];

        for state in self.states().iter() {
            if state == self.initial() {
                lines.push(format!("    {state} [shape=doublecircle];"));
            } else {
                lines.push(format!("    {state};"));
            }
        }
        lines.push(String::new());

        for state in self.states().iter() {
            for input in std::iter::once(EPSILON).chain(self.inputs().iter().map(String::as_str)) {
                for edge in self.transitions(state, input) {
                    let label = if input == EPSILON { "E" } else { input };
                    lines.push(format!(
                        "    {state} -> {} [label=\"{label}/{}\"];",
                        edge.target, edge.output
                    ));
                }
            }
        }

        lines.push("}".to_string());
        lines.join("\n") + "\n"
    }
}

impl ToDot for Moore {
    /// Moore nodes carry `label="<state>\n<output>"`; edges carry the bare
    /// input with ε rendered as `e`.
    fn to_dot(&self) -> String {
        let mut lines = vec![
            "digraph MooreMachine {".to_string(),
            "    rankdir=LR;".to_string(),
            "    size=\"8,5\"".to_string(),
            String::new(),
        ];

        for state in self.states().iter() {
            let output = self
                .output_for(state)
                .map_or_else(|_| "none".to_string(), Clone::clone);
            let shape = if state == self.initial() {
                "doublecircle"
            } else {
                "circle"
            };
            lines.push(format!(
                "    {state} [label=\"{state}\\n{output}\", shape={shape}];"
            ));
        }
        lines.push(String::new());

        for state in self.states().iter() {
            for input in std::iter::once(EPSILON).chain(self.inputs().iter().map(String::as_str)) {
                for target in self.next_states(state, input) {
                    let label = if input == EPSILON { "e" } else { input };
                    lines.push(format!("    {state} -> {target} [label=\"{label}\"];"));
                }
            }
        }

        lines.push("}".to_string());
        lines.join("\n") + "\n"
    }
}

/// Patterns shared by both parsers. The parsers are deliberately lenient:
/// they look at one line at a time, try a fixed list of patterns in
/// priority order and silently skip anything they do not recognize.
struct Patterns {
    digraph: Regex,
    initial_marker: Regex,
}

impl Patterns {
    fn new() -> Self {
        Self {
            digraph: Regex::new(r"digraph\s+\w+\s*\{").expect("static pattern"),
            initial_marker: Regex::new(r"(\w+)\s*\[[^\]]*shape\s*=\s*doublecircle")
                .expect("static pattern"),
        }
    }
}

/// Reads a Mealy machine from graph-description text.
///
/// Edge labels are split on the first `/`; an empty or `E` input decodes to
/// ε so that emitted machines read back unchanged. The initial state comes
/// from a `shape=doublecircle` node line (canonical) or, as tolerated
/// legacy, from the source of an edge line carrying the marker inline;
/// without any marker the first state in insertion order is used.
pub fn parse_mealy(text: &str) -> Result<Mealy> {
    let patterns = Patterns::new();
    let edge = Regex::new(r#"(\w+)\s*->\s*(\w+)\s*\[label\s*=\s*"([^/"]*)/([^"]*)"[^\]]*\]\s*;?"#)
        .expect("static pattern");

    let mut machine = Mealy::default();
    let mut initial: Option<StateId> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") || patterns.digraph.is_match(line) {
            continue;
        }

        if let Some(caps) = edge.captures(line) {
            let from = caps[1].to_string();
            let input = decode_mealy_input(caps[3].trim());
            machine.add_transition(from.clone(), input, &caps[2], caps[4].trim());
            if line.contains("doublecircle") {
                initial = Some(from);
            }
            continue;
        }

        if let Some(caps) = patterns.initial_marker.captures(line) {
            initial = Some(caps[1].to_string());
        }
    }

    if let Some(initial) = initial.or_else(|| machine.states().first().cloned()) {
        machine.set_initial(initial);
    }
    trace!(states = machine.states().len(), "parsed mealy dot text");
    Ok(machine)
}

/// Reads a Moore machine from graph-description text.
///
/// Per line, in priority order: a state-output annotation
/// `X [output="Y"];`, a label-encoded output `X [label="X/Y" …]` (the
/// separator may also be the emitted `\n`), an edge `X -> Y [label="L"];`
/// with `e` decoding to ε, the initial marker and finally a bare
/// `[shape=circle]`/`[shape=doublecircle]` node line, which records the
/// output `default` for states that have none.
pub fn parse_moore(text: &str) -> Result<Moore> {
    let patterns = Patterns::new();
    let state_output =
        Regex::new(r#"(\w+)\s*\[output\s*=\s*"([^"]+)"\]\s*;?"#).expect("static pattern");
    let label_output = Regex::new(r#"(\w+)\s*\[label\s*=\s*"(\w+)\s*(?:/|\\n)\s*([^"]+)""#)
        .expect("static pattern");
    let edge = Regex::new(r#"(\w+)\s*->\s*(\w+)\s*\[label\s*=\s*"([^"]*)"[^\]]*\]\s*;?"#)
        .expect("static pattern");

    let mut machine = Moore::default();
    let mut initial: Option<StateId> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") || patterns.digraph.is_match(line) {
            continue;
        }

        if let Some(caps) = state_output.captures(line) {
            machine.add_state_output(&caps[1], &caps[2]);
            if line.contains("doublecircle") {
                initial = Some(caps[1].to_string());
            }
            continue;
        }

        if let Some(caps) = label_output.captures(line) {
            machine.add_state_output(&caps[1], caps[3].trim());
            if line.contains("doublecircle") {
                initial = Some(caps[1].to_string());
            }
            continue;
        }

        if let Some(caps) = edge.captures(line) {
            let from = caps[1].to_string();
            let input = decode_moore_input(caps[3].trim());
            machine.add_transition(from.clone(), input, &caps[2]);
            if line.contains("doublecircle") {
                initial = Some(from);
            }
            continue;
        }

        if let Some(caps) = patterns.initial_marker.captures(line) {
            let state = caps[1].to_string();
            if machine.output_for(&state).is_err() {
                machine.add_state_output(state.clone(), "default");
            }
            initial = Some(state);
            continue;
        }

        if line.contains("[shape=circle]") || line.contains("[shape=doublecircle]") {
            if let Some(bracket) = line.find('[') {
                let state = line[..bracket].trim().to_string();
                if !state.is_empty() && machine.output_for(&state).is_err() {
                    machine.add_state_output(state, "default");
                }
            }
        }
    }

    if let Some(initial) = initial.or_else(|| machine.states().first().cloned()) {
        machine.set_initial(initial);
    }
    trace!(states = machine.states().len(), "parsed moore dot text");
    Ok(machine)
}

fn decode_mealy_input(raw: &str) -> &str {
    if raw.is_empty() || raw == "E" {
        EPSILON
    } else {
        raw
    }
}

fn decode_moore_input(raw: &str) -> &str {
    if raw.is_empty() || raw == "e" {
        EPSILON
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_mealy, parse_moore, ToDot};
    use crate::automaton::{Mealy, Moore, EPSILON};
    use crate::Set;
    use pretty_assertions::assert_eq;

    #[test]
    fn mealy_round_trip() {
        let mut machine = Mealy::from_transitions(
            "A",
            [("A", "a", "B", "x"), ("B", "b", "A", "y")],
        );
        machine.add_transition("B", EPSILON, "A", "z");

        let parsed = parse_mealy(&machine.to_dot()).unwrap();

        assert_eq!(parsed.initial(), "A");
        assert_eq!(parsed.states().as_slice(), machine.states().as_slice());
        assert_eq!(parsed.transitions("A", "a"), machine.transitions("A", "a"));
        assert_eq!(
            parsed.transitions("B", EPSILON),
            machine.transitions("B", EPSILON)
        );
        let parsed_inputs: Set<_> = parsed.inputs().iter().cloned().collect();
        let inputs: Set<_> = machine.inputs().iter().cloned().collect();
        assert_eq!(parsed_inputs, inputs);
    }

    #[test]
    fn moore_round_trip() {
        let mut machine = Moore::new("A");
        machine.add_state_output("A", "0");
        machine.add_state_output("B", "1");
        machine.add_transition("A", "a", "B");
        machine.add_transition("B", EPSILON, "A");

        let parsed = parse_moore(&machine.to_dot()).unwrap();

        assert_eq!(parsed.initial(), "A");
        assert_eq!(parsed.states().as_slice(), machine.states().as_slice());
        assert_eq!(parsed.output_for("A").unwrap(), "0");
        assert_eq!(parsed.output_for("B").unwrap(), "1");
        assert_eq!(parsed.next_states("A", "a"), machine.next_states("A", "a"));
        assert_eq!(
            parsed.next_states("B", EPSILON),
            machine.next_states("B", EPSILON)
        );
    }

    #[test]
    fn mealy_edge_labels_split_on_the_first_slash() {
        let text = r#"
digraph M {
    A -> B [label="a/x/y"];
}
"#;
        let parsed = parse_mealy(text).unwrap();
        let edge = &parsed.transitions("A", "a")[0];
        assert_eq!(edge.output, "x/y");
    }

    #[test]
    fn initial_marker_on_a_node_line_wins_over_first_state() {
        let text = r#"
digraph M {
    A -> B [label="a/x"];
    B [shape=doublecircle];
}
"#;
        let parsed = parse_mealy(text).unwrap();
        assert_eq!(parsed.initial(), "B");
    }

    #[test]
    fn legacy_inline_initial_marker_is_tolerated() {
        let text = r#"
digraph M {
    A -> B [label="a/x" shape=doublecircle];
}
"#;
        let parsed = parse_mealy(text).unwrap();
        assert_eq!(parsed.initial(), "A");
    }

    #[test]
    fn first_state_is_initial_when_no_marker_is_present() {
        let text = r#"
digraph M {
    // a comment to skip
    X -> Y [label="a/1"];
}
"#;
        let parsed = parse_mealy(text).unwrap();
        assert_eq!(parsed.initial(), "X");
    }

    #[test]
    fn moore_accepts_output_annotations_and_slash_labels() {
        let text = r#"
digraph M {
    P [output="0"];
    Q [label="Q/1", shape=circle];
    P -> Q [label="a"];
    P -> P [label="e"];
    P [shape=doublecircle];
}
"#;
        let parsed = parse_moore(text).unwrap();
        assert_eq!(parsed.initial(), "P");
        assert_eq!(parsed.output_for("P").unwrap(), "0");
        assert_eq!(parsed.output_for("Q").unwrap(), "1");
        assert_eq!(parsed.next_states("P", EPSILON), &["P"]);
    }

    #[test]
    fn bare_shape_lines_get_a_default_output() {
        let text = r#"
digraph M {
    R [shape=circle]
    R -> R [label="a"];
}
"#;
        let parsed = parse_moore(text).unwrap();
        assert_eq!(parsed.output_for("R").unwrap(), "default");
    }
}
