//! Regular-expression compilation via Thompson's construction.
//!
//! The accepted syntax is alternation `|`, Kleene star `*` (postfix),
//! parentheses and implicit concatenation; any other non-whitespace
//! character is a literal input symbol, and whitespace between tokens is
//! ignored. The compiler returns the raw ε-NFA in Moore form — callers
//! decide whether to determinize and minimize it.

use chumsky::prelude::*;
use itertools::Itertools;
use machines::automaton::{Moore, StateId, EPSILON};
use tracing::debug;

use crate::{Error, Result};

/// Syntax tree of the supported regex dialect.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Ast {
    Literal(char),
    Concat(Box<Ast>, Box<Ast>),
    Union(Box<Ast>, Box<Ast>),
    Star(Box<Ast>),
}

fn parser() -> impl Parser<char, Ast, Error = Simple<char>> {
    recursive(|expr| {
        let atom = filter(|c: &char| !"|*()".contains(*c) && !c.is_whitespace())
            .map(Ast::Literal)
            .or(expr.delimited_by(just('('), just(')')))
            .padded();

        let starred = atom.then(just('*').padded().repeated()).map(|(inner, stars)| {
            stars
                .into_iter()
                .fold(inner, |ast, _| Ast::Star(Box::new(ast)))
        });

        let concat = starred.repeated().at_least(1).map(|factors| {
            factors
                .into_iter()
                .reduce(|lhs, rhs| Ast::Concat(Box::new(lhs), Box::new(rhs)))
                .expect("at least one factor")
        });

        concat
            .separated_by(just('|').padded())
            .at_least(1)
            .map(|branches| {
                branches
                    .into_iter()
                    .reduce(|lhs, rhs| Ast::Union(Box::new(lhs), Box::new(rhs)))
                    .expect("at least one branch")
            })
    })
    .then_ignore(end())
}

fn parse(pattern: &str) -> Result<Ast> {
    parser().parse(pattern).map_err(|errors| {
        let message = errors
            .into_iter()
            .map(|error| format!("{error} at {:?}", error.span()))
            .join("; ");
        Error::Parse(message)
    })
}

/// A partially built NFA fragment: where runs enter and where they leave.
struct Fragment {
    start: StateId,
    accept: StateId,
}

/// Accumulates fresh states and edges while the syntax tree is lowered.
/// States are named `S0, S1, …` in creation order.
#[derive(Default)]
struct Thompson {
    counter: usize,
    edges: Vec<(StateId, String, StateId)>,
}

impl Thompson {
    fn fresh(&mut self) -> StateId {
        let name = format!("S{}", self.counter);
        self.counter += 1;
        name
    }

    /// Lowers `ast` into a fragment. Every atom contributes a two-state
    /// fragment; the combinators only add ε-wiring around the fragments of
    /// their operands.
    fn build(&mut self, ast: &Ast) -> Fragment {
        match ast {
            Ast::Literal(symbol) => {
                let start = self.fresh();
                let accept = self.fresh();
                self.edges
                    .push((start.clone(), symbol.to_string(), accept.clone()));
                Fragment { start, accept }
            }
            Ast::Concat(lhs, rhs) => {
                let lhs = self.build(lhs);
                let rhs = self.build(rhs);
                self.epsilon(&lhs.accept, &rhs.start);
                Fragment {
                    start: lhs.start,
                    accept: rhs.accept,
                }
            }
            Ast::Union(lhs, rhs) => {
                let start = self.fresh();
                let lhs = self.build(lhs);
                let rhs = self.build(rhs);
                let accept = self.fresh();
                self.epsilon(&start, &lhs.start);
                self.epsilon(&start, &rhs.start);
                self.epsilon(&lhs.accept, &accept);
                self.epsilon(&rhs.accept, &accept);
                Fragment { start, accept }
            }
            Ast::Star(inner) => {
                let start = self.fresh();
                let inner = self.build(inner);
                let accept = self.fresh();
                self.epsilon(&start, &inner.start);
                self.epsilon(&start, &accept);
                self.epsilon(&inner.accept, &inner.start);
                self.epsilon(&inner.accept, &accept);
                Fragment { start, accept }
            }
        }
    }

    fn epsilon(&mut self, from: &str, to: &str) {
        self.edges
            .push((from.to_string(), EPSILON.to_string(), to.to_string()));
    }

    /// Assembles the machine: the overall accept state gets output `"1"`,
    /// every other state `"0"`. Outputs are assigned only here — the accept
    /// marks of inner fragments are superseded as soon as a combinator
    /// wires past them.
    fn into_moore(self, fragment: Fragment) -> Moore {
        let mut nfa = Moore::new(fragment.start);
        for index in 0..self.counter {
            let state = format!("S{index}");
            let output = if state == fragment.accept { "1" } else { "0" };
            nfa.add_state_output(state, output);
        }
        for (from, input, to) in self.edges {
            nfa.add_transition(from, input, to);
        }
        nfa
    }
}

/// Compiles `pattern` into an ε-NFA in Moore form.
pub fn compile(pattern: &str) -> Result<Moore> {
    let ast = parse(pattern)?;
    let mut thompson = Thompson::default();
    let fragment = thompson.build(&ast);
    let nfa = thompson.into_moore(fragment);
    debug!(states = nfa.states().len(), pattern, "regex compiled to nfa");
    Ok(nfa)
}
