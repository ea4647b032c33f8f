//! Regular-grammar parsing and compilation.
//!
//! A grammar file is a sequence of lines: exactly one `START : <nt>` line,
//! any number of rules `LHS -> RHS` (RHS is two symbols, one symbol or
//! empty), `//` comments and blank lines. Non-terminals are exactly the
//! symbols that appear as a left-hand side. The two-symbol rules fix the
//! orientation (left- vs right-linear); the compiled NFA is determinized
//! before it is returned.

use machines::automaton::{Moore, EPSILON};
use machines::Set;
// `::regex` disambiguates the crate from this crate's `regex` module.
use ::regex::Regex;
use tracing::debug;

use crate::{Error, Result};

/// Accept state reserved by the right-linear construction.
const ACCEPT: &str = "F";
/// Initial state reserved by the left-linear construction.
const START: &str = "S_START";

/// Which side of a two-symbol right-hand side holds the non-terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Linearity {
    /// Rules look like `A -> a B`.
    Right,
    /// Rules look like `A -> B a`.
    Left,
}

/// One production. `rhs` holds zero, one or two symbols.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    lhs: String,
    rhs: Vec<String>,
}

impl Rule {
    fn display(&self) -> String {
        format!("{} -> {}", self.lhs, self.rhs.join(" "))
    }
}

/// A parsed grammar: the start symbol, the productions in file order and
/// the set of non-terminals.
#[derive(Clone, Debug)]
pub struct Grammar {
    start: String,
    rules: Vec<Rule>,
    nonterminals: Set<String>,
}

impl Grammar {
    /// Parses grammar text. Fails when the `START` line is missing or
    /// duplicated, or when a line is neither a rule, a comment nor blank.
    pub fn parse(text: &str) -> Result<Self> {
        let start_line = Regex::new(r"^START\s*:\s*(\w+)\s*$").expect("static pattern");
        let rule_line = Regex::new(r"^(\w+)\s*->\s*(.*)$").expect("static pattern");

        let mut start: Option<String> = None;
        let mut rules = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            if let Some(caps) = start_line.captures(line) {
                if start.is_some() {
                    return Err(Error::Parse("more than one START line".to_string()));
                }
                start = Some(caps[1].to_string());
                continue;
            }

            if let Some(caps) = rule_line.captures(line) {
                let rhs: Vec<String> = caps[2].split_whitespace().map(str::to_string).collect();
                let rule = Rule {
                    lhs: caps[1].to_string(),
                    rhs,
                };
                if rule.rhs.len() > 2 {
                    return Err(Error::NotRegular(rule.display()));
                }
                rules.push(rule);
                continue;
            }

            return Err(Error::Parse(format!("unrecognized line `{line}`")));
        }

        let start = start.ok_or_else(|| Error::Parse("missing START line".to_string()))?;
        let nonterminals: Set<String> = rules.iter().map(|rule| rule.lhs.clone()).collect();
        Ok(Self {
            start,
            rules,
            nonterminals,
        })
    }

    /// The start symbol named on the `START` line.
    pub fn start(&self) -> &str {
        &self.start
    }

    fn is_nonterminal(&self, symbol: &str) -> bool {
        self.nonterminals.contains(symbol)
    }

    /// Determines the orientation from the two-symbol rules.
    ///
    /// A rule `X Y` with terminal `X` and non-terminal `Y` votes
    /// right-linear, the mirror votes left-linear; two terminals or two
    /// non-terminals make the rule non-regular, and opposing votes make the
    /// grammar mixed. With no two-symbol rule at all the orientation
    /// defaults to right-linear.
    pub fn linearity(&self) -> Result<Linearity> {
        let mut detected: Option<Linearity> = None;

        for rule in &self.rules {
            let [first, second] = match rule.rhs.as_slice() {
                [first, second] => [first, second],
                _ => continue,
            };
            let vote = match (self.is_nonterminal(first), self.is_nonterminal(second)) {
                (false, true) => Linearity::Right,
                (true, false) => Linearity::Left,
                _ => return Err(Error::NotRegular(rule.display())),
            };
            match detected {
                None => detected = Some(vote),
                Some(seen) if seen != vote => return Err(Error::MixedLinearity),
                Some(_) => {}
            }
        }

        Ok(detected.unwrap_or(Linearity::Right))
    }

    /// Compiles the grammar into a deterministic Moore machine whose state
    /// outputs mark acceptance (`"1"`) and rejection (`"0"`).
    pub fn compile(&self) -> Result<Moore> {
        let linearity = self.linearity()?;
        let nfa = match linearity {
            Linearity::Right => self.build_right_linear(),
            Linearity::Left => self.build_left_linear(),
        }?;
        debug!(
            ?linearity,
            states = nfa.states().len(),
            "grammar compiled to nfa"
        );
        Ok(nfa.determinize()?)
    }

    /// Right-linear construction: states are the non-terminals plus the
    /// reserved accept state `F` (output `"1"`); `A -> a B` becomes
    /// `(A, a) → B`, `A -> a` goes to `F`, a lone non-terminal becomes an
    /// ε-edge and an empty right-hand side an ε-edge to `F`. The start
    /// symbol is also accepting when it has an empty rule.
    fn build_right_linear(&self) -> Result<Moore> {
        let mut nfa = Moore::new(self.start.clone());

        let start_accepts = self
            .rules
            .iter()
            .any(|rule| rule.lhs == self.start && rule.rhs.is_empty());
        nfa.add_state_output(
            self.start.clone(),
            if start_accepts { "1" } else { "0" },
        );
        for rule in &self.rules {
            if rule.lhs != self.start {
                nfa.add_state_output(rule.lhs.clone(), "0");
            }
        }
        nfa.add_state_output(ACCEPT, "1");

        for rule in &self.rules {
            match rule.rhs.as_slice() {
                [terminal, nonterminal] => {
                    nfa.add_transition(rule.lhs.clone(), terminal.clone(), nonterminal.clone());
                }
                [symbol] if self.is_nonterminal(symbol) => {
                    nfa.add_transition(rule.lhs.clone(), EPSILON, symbol.clone());
                }
                [terminal] => {
                    nfa.add_transition(rule.lhs.clone(), terminal.clone(), ACCEPT);
                }
                [] => {
                    nfa.add_transition(rule.lhs.clone(), EPSILON, ACCEPT);
                }
                _ => return Err(Error::NotRegular(rule.display())),
            }
        }

        Ok(nfa)
    }

    /// Left-linear construction, the mirror image: a reserved initial state
    /// `S_START` (output `"0"`), the start symbol accepting, `A -> B a`
    /// becomes `(B, a) → A`, a lone terminal starts from `S_START` and ε
    /// flows forward from `S_START` or the inner non-terminal.
    fn build_left_linear(&self) -> Result<Moore> {
        let mut nfa = Moore::new(START);

        nfa.add_state_output(START, "0");
        nfa.add_state_output(self.start.clone(), "1");
        for rule in &self.rules {
            if rule.lhs != self.start {
                nfa.add_state_output(rule.lhs.clone(), "0");
            }
        }

        for rule in &self.rules {
            match rule.rhs.as_slice() {
                [nonterminal, terminal] => {
                    nfa.add_transition(nonterminal.clone(), terminal.clone(), rule.lhs.clone());
                }
                [symbol] if self.is_nonterminal(symbol) => {
                    nfa.add_transition(symbol.clone(), EPSILON, rule.lhs.clone());
                }
                [terminal] => {
                    nfa.add_transition(START, terminal.clone(), rule.lhs.clone());
                }
                [] => {
                    nfa.add_transition(START, EPSILON, rule.lhs.clone());
                }
                _ => return Err(Error::NotRegular(rule.display())),
            }
        }

        Ok(nfa)
    }
}

/// Parses and compiles grammar text in one step.
pub fn compile(text: &str) -> Result<Moore> {
    Grammar::parse(text)?.compile()
}

#[cfg(test)]
mod tests {
    use super::{compile, Grammar, Linearity};
    use crate::Error;
    use machines::automaton::Moore;
    use pretty_assertions::assert_eq;

    /// Follows `word` through a deterministic Moore machine and reports
    /// whether the reached state is accepting.
    fn accepts(machine: &Moore, word: &str) -> bool {
        let mut state = machine.initial().clone();
        for symbol in word.chars() {
            match machine.next_state(&state, &symbol.to_string()) {
                Ok(next) => state = next,
                Err(_) => return false,
            }
        }
        machine.output_for(&state).map(|o| o == "1").unwrap_or(false)
    }

    #[test]
    fn right_linear_grammar_accepts_a_star_b() {
        // spec scenario 3
        let machine = compile(
            "START: S\n\
             S -> a S\n\
             S -> b A\n\
             A -> \n",
        )
        .unwrap()
        .minimize()
        .unwrap();

        for word in ["b", "ab", "aab", "aaab"] {
            assert!(accepts(&machine, word), "expected `{word}` accepted");
        }
        for word in ["", "a", "ba", "bb", "abab"] {
            assert!(!accepts(&machine, word), "expected `{word}` rejected");
        }
    }

    #[test]
    fn left_linear_grammar_accepts_b_a_star() {
        // spec scenario 4
        let machine = compile(
            "START: S\n\
             S -> S a\n\
             S -> b\n",
        )
        .unwrap()
        .minimize()
        .unwrap();

        for word in ["b", "ba", "baa"] {
            assert!(accepts(&machine, word), "expected `{word}` accepted");
        }
        for word in ["", "a", "ab", "bab"] {
            assert!(!accepts(&machine, word), "expected `{word}` rejected");
        }
    }

    #[test]
    fn orientation_defaults_to_right_linear() {
        let grammar = Grammar::parse(
            "START: S\n\
             S -> a\n",
        )
        .unwrap();
        assert_eq!(grammar.linearity().unwrap(), Linearity::Right);
    }

    #[test]
    fn accepting_start_symbol_accepts_the_empty_word() {
        let machine = compile(
            "START: S\n\
             S -> a S\n\
             S -> \n",
        )
        .unwrap();
        assert!(accepts(&machine, ""));
        assert!(accepts(&machine, "aa"));
    }

    #[test]
    fn two_nonterminals_are_not_regular() {
        let grammar = Grammar::parse(
            "START: S\n\
             S -> S S\n",
        )
        .unwrap();
        assert!(matches!(grammar.linearity(), Err(Error::NotRegular(_))));
    }

    #[test]
    fn two_terminals_are_not_regular() {
        let grammar = Grammar::parse(
            "START: S\n\
             S -> a b\n",
        )
        .unwrap();
        assert!(matches!(grammar.linearity(), Err(Error::NotRegular(_))));
    }

    #[test]
    fn mixed_orientations_are_rejected() {
        let grammar = Grammar::parse(
            "START: S\n\
             S -> a A\n\
             A -> S b\n",
        )
        .unwrap();
        assert_eq!(grammar.linearity(), Err(Error::MixedLinearity));
    }

    #[test]
    fn start_line_must_appear_exactly_once() {
        assert!(matches!(
            Grammar::parse("S -> a\n"),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            Grammar::parse("START: S\nSTART: A\nS -> a\n"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let grammar = Grammar::parse(
            "// the start symbol\n\
             START: S\n\
             \n\
             S -> a\n",
        )
        .unwrap();
        assert_eq!(grammar.start(), "S");
    }
}
