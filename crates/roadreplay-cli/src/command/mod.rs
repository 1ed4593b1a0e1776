use clap::{Parser, Subcommand};

use self::{evaluate::EvaluateArg, select_seeds::SelectSeedsArg};

mod evaluate;
mod select_seeds;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evaluate a recorded episode and write a step-by-step report
    Evaluate(#[clap(flatten)] EvaluateArg),
    /// Print the scenario indices the selector would play
    SelectSeeds(#[clap(flatten)] SelectSeedsArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
        Mode::SelectSeeds(arg) => select_seeds::run(&arg)?,
    }
    Ok(())
}
