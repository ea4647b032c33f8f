mod cli;
mod io;

use clap::Parser;
use machines::prelude::*;
use owo_colors::OwoColorize;
use tracing::{debug, Level};

use crate::cli::{Commands, Fsmt};

fn main() {
    let args = Fsmt::parse();

    let level = if args.verbose {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("{}", "could not install the log subscriber".yellow());
    }

    if let Err(error) = run(args.command) {
        eprintln!("{}", format!("{error:#}").red());
        std::process::exit(1);
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::MealyMinimize { input, output } => {
            let machine = parse_mealy(&io::from_file_or_stdin(input.as_ref())?)?;
            debug!(states = machine.states().len(), "read mealy machine");
            io::to_file_or_stdout(output.as_ref(), &machine.minimize()?.to_dot())
        }
        Commands::MooreMinimize { input, output } => {
            let machine = parse_moore(&io::from_file_or_stdin(input.as_ref())?)?;
            debug!(states = machine.states().len(), "read moore machine");
            io::to_file_or_stdout(output.as_ref(), &machine.minimize()?.to_dot())
        }
        Commands::MooreDeterminize {
            input,
            output,
            minimize,
        } => {
            let machine = parse_moore(&io::from_file_or_stdin(input.as_ref())?)?;
            let mut result = machine.determinize()?;
            if minimize {
                result = result.minimize()?;
            }
            io::to_file_or_stdout(output.as_ref(), &result.to_dot())
        }
        Commands::MealyToMoore { input, output } => {
            let machine = parse_mealy(&io::from_file_or_stdin(input.as_ref())?)?;
            io::to_file_or_stdout(output.as_ref(), &mealy_to_moore(&machine)?.to_dot())
        }
        Commands::MooreToMealy { input, output } => {
            let machine = parse_moore(&io::from_file_or_stdin(input.as_ref())?)?;
            io::to_file_or_stdout(output.as_ref(), &moore_to_mealy(&machine)?.to_dot())
        }
        Commands::Grammar { input, output } => {
            let machine = regular::grammar::compile(&io::from_file_or_stdin(input.as_ref())?)?;
            io::to_file_or_stdout(output.as_ref(), &machine.to_dot())
        }
        Commands::Regex {
            pattern,
            output,
            nfa,
        } => {
            let machine = regular::regex::compile(&pattern)?;
            let machine = if nfa {
                machine
            } else {
                machine.determinize()?.minimize()?
            };
            io::to_file_or_stdout(output.as_ref(), &machine.to_dot())
        }
    }
}
