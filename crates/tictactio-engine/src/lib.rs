//! Tic-tac-toe board used by the training core and the terminal front end.
//!
//! The board uses a 1-based grid numbering:
//!
//! ```text
//! 1 | 2 | 3
//! 4 | 5 | 6
//! 7 | 8 | 9
//! ```
//!
//! Coordinates in the `(col, row)` form are also 1-based, so `(3, 1)` is cell 3.
//!
//! - [`Board`] - 3×3 grid of [`Marker`]s plus a move counter
//! - [`Cell`] - A validated cell index
//! - [`Winner`] - Game status derived from the grid
//!
//! # Example
//!
//! ```
//! use tictactio_engine::{Board, Cell, Marker, Winner};
//!
//! let mut board = Board::new();
//! for n in [1, 2, 3] {
//!     board.place(Cell::new(n).unwrap(), Marker::X).unwrap();
//! }
//! assert_eq!(board.winner(), Winner::X);
//! ```

pub use self::{board::*, cell::*, marker::*};

mod board;
mod cell;
mod marker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InvalidCellError {
    #[display("cell index {_0} is outside 1..=9")]
    OutOfRange(#[error(not(source))] usize),
    #[display("({col}, {row}) is outside the 3x3 grid")]
    OutOfGrid { col: usize, row: usize },
    #[display("cell {_0} is already occupied")]
    Occupied(#[error(not(source))] Cell),
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid board row {row}: {reason}")]
pub struct ParseBoardError {
    pub row: usize,
    #[error(not(source))]
    pub reason: String,
}
