//! Feed-forward networks that play tic-tac-toe.
//!
//! A [`Network`] has three dense layers of sigmoid [`Neuron`]s:
//!
//! ```text
//! input  (10 neurons × 10 inputs)   <- turn marker + 9 cells
//!     ↓
//! hidden ( 9 neurons × 10 inputs)
//!     ↓
//! output ( 9 neurons ×  9 inputs)   -> argmax = chosen cell
//! ```
//!
//! Topology is fixed; only weights, biases and the fitness score change. The
//! genetic operators ([`Network::mutate`], [`Network::breed`]) live here, while
//! the population lifecycle lives in `tictactio-training`.
//!
//! Trained networks are persisted in a line-oriented text format (see
//! [`Network::to_export_string`]) and loaded back with [`load_trained`], which
//! together with [`Network::get_move`] is all a front end needs to use a
//! trained network as an opponent.

use std::path::Path;

use tictactio_engine::{Board, Cell, Marker};

pub use self::{layer::*, network::*, neuron::*, persist::*, player::*};

mod layer;
mod network;
mod neuron;
mod persist;
mod player;

/// Something that picks a cell to play given whose turn it is and the board.
///
/// This is the seam match evaluation plays through. The move is not required to
/// be legal: an occupied cell is scored as an overlap by the evaluator.
pub trait Mover {
    fn get_move(&self, turn: Marker, board: &Board) -> Cell;
}

impl Mover for Network {
    fn get_move(&self, turn: Marker, board: &Board) -> Cell {
        Network::get_move(self, turn, board)
    }
}

impl<M> Mover for &M
where
    M: Mover + ?Sized,
{
    fn get_move(&self, turn: Marker, board: &Board) -> Cell {
        (**self).get_move(turn, board)
    }
}

/// Loads a trained network for use as a non-training opponent.
pub fn load_trained<P>(path: P) -> Result<Network, NetworkFileError>
where
    P: AsRef<Path>,
{
    Network::load(path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("expected {expected} inputs, got {actual}")]
pub struct DimensionMismatchError {
    pub expected: usize,
    pub actual: usize,
}
