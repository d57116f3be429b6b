use std::path::PathBuf;

use anyhow::Context;
use tictactio_ai::Layer;
use tictactio_engine::{Board, Marker};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CheckArg {
    /// Network file to validate
    pub(crate) model: PathBuf,
}

pub(crate) fn run(arg: &CheckArg) -> anyhow::Result<()> {
    let network = tictactio_ai::load_trained(&arg.model)
        .with_context(|| format!("Invalid network file: {}", arg.model.display()))?;

    println!("{}: ok", arg.model.display());
    for layer in Layer::ALL {
        println!(
            "  {:<6} {} neurons x {} inputs",
            layer.to_string(),
            network.layer(layer).len(),
            layer.input_arity()
        );
    }
    let board = Board::new();
    println!(
        "  Opening move as x: {}",
        network.get_move(Marker::X, &board)
    );
    Ok(())
}
