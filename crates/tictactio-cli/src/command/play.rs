use std::{
    io::{self, BufReader, Write as _},
    path::PathBuf,
};

use anyhow::Context;
use tictactio_ai::{LineMoveSource, Player, PlayerError};
use tictactio_engine::{Board, Marker, Winner};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Trained network file
    pub(crate) model: PathBuf,
    /// Marker you play; x moves first
    #[arg(long, default_value = "x")]
    pub(crate) human_marker: Marker,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let network = tictactio_ai::load_trained(&arg.model)
        .with_context(|| format!("Failed to load network: {}", arg.model.display()))?;
    let human_marker = arg.human_marker;

    let mut human = Player::Human(Box::new(LineMoveSource::new(BufReader::new(io::stdin()))));
    let mut computer = Player::Scripted(network);
    let mut board = Board::new();
    let mut turn = Marker::X;

    println!("You play {human_marker}. Enter a cell number (1-9) or col,row.");
    loop {
        match board.winner() {
            Winner::None => {}
            Winner::Tie => {
                println!("{board}");
                println!("Tie game.");
                break;
            }
            winner @ (Winner::X | Winner::O) => {
                println!("{board}");
                let human_won = matches!(
                    (winner, human_marker),
                    (Winner::X, Marker::X) | (Winner::O, Marker::O)
                );
                if human_won {
                    println!("You win!");
                } else {
                    println!("The network wins.");
                }
                break;
            }
        }

        if turn == human_marker {
            println!("{board}");
            print!("Your move ({turn}): ");
            io::stdout().flush().context("Failed to flush stdout")?;
            let cell = match human.decide_move(turn, &board) {
                Ok(cell) => cell,
                Err(PlayerError::InvalidInput { input }) => {
                    println!("Not a cell: {:?}", input.trim());
                    continue;
                }
                Err(PlayerError::Closed) => {
                    println!();
                    return Ok(());
                }
                Err(e) => return Err(e).context("Failed to read move"),
            };
            if let Err(e) = board.place(cell, turn) {
                println!("{e}");
                continue;
            }
        } else {
            let mut cell = computer.decide_move(turn, &board)?;
            if board.is_occupied(cell) {
                // a trained network can still pick an occupied cell
                cell = board
                    .empty_cells()
                    .next()
                    .context("no empty cell on an undecided board")?;
            }
            board.place(cell, turn)?;
            println!("The network plays {cell}.");
        }
        turn = turn.opponent();
    }
    Ok(())
}
