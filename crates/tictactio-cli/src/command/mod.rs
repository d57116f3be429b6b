use clap::{Parser, Subcommand};

use self::{check::CheckArg, play::PlayArg, train::TrainArg};

mod check;
mod play;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve networks by self-play and export the fittest one
    Train(#[clap(flatten)] TrainArg),
    /// Play against a trained network in the terminal
    Play(#[clap(flatten)] PlayArg),
    /// Validate a trained network file
    Check(#[clap(flatten)] CheckArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Check(arg) => check::run(&arg)?,
    }
    Ok(())
}
