use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about = "Finite-state transducer toolkit", long_about = None)]
#[command(propagate_version = true)]
pub struct Fsmt {
    /// Enable verbose logging
    #[arg(short, long, global = true, conflicts_with = "debug")]
    pub verbose: bool,

    /// Turn on debugging information
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Minimizes a Mealy machine read from a DOT file")]
    MealyMinimize {
        /// Input DOT file; stdin when omitted
        input: Option<String>,
        /// Output DOT file; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },
    #[command(about = "Minimizes a deterministic Moore machine read from a DOT file")]
    MooreMinimize {
        /// Input DOT file; stdin when omitted
        input: Option<String>,
        /// Output DOT file; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },
    #[command(about = "Determinizes a Moore machine (NFA to DFA)")]
    MooreDeterminize {
        /// Input DOT file; stdin when omitted
        input: Option<String>,
        /// Output DOT file; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
        /// Also minimize the determinized machine
        #[arg(short, long)]
        minimize: bool,
    },
    #[command(about = "Converts a Mealy machine into a Moore machine")]
    MealyToMoore {
        /// Input DOT file; stdin when omitted
        input: Option<String>,
        /// Output DOT file; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },
    #[command(about = "Converts a Moore machine into a Mealy machine")]
    MooreToMealy {
        /// Input DOT file; stdin when omitted
        input: Option<String>,
        /// Output DOT file; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },
    #[command(about = "Compiles a regular grammar into a deterministic Moore machine")]
    Grammar {
        /// Input grammar file; stdin when omitted
        input: Option<String>,
        /// Output DOT file; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },
    #[command(about = "Compiles a regular expression into a Moore machine")]
    Regex {
        /// The pattern to compile
        pattern: String,
        /// Output DOT file; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
        /// Emit the raw Thompson NFA instead of the minimized DFA
        #[arg(long)]
        nfa: bool,
    },
}
