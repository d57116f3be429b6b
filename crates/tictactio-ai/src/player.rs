use std::{
    fmt,
    io::{self, BufRead},
};

use tictactio_engine::{Board, Cell, Marker};

use crate::Network;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum PlayerError {
    #[display("move source closed")]
    Closed,
    #[display("cannot read a move from {input:?}")]
    InvalidInput {
        #[error(not(source))]
        input: String,
    },
    #[display("failed to read move: {_0}")]
    #[from]
    Io(io::Error),
}

/// Supplies moves from outside the process: a person at a terminal, or a relay.
pub trait MoveSource: Send {
    fn next_move(&mut self, marker: Marker, board: &Board) -> Result<Cell, PlayerError>;
}

/// A participant in a game.
///
/// Training only ever builds [`Player::Scripted`].
pub enum Player {
    Human(Box<dyn MoveSource>),
    Scripted(Network),
    Remote(Box<dyn MoveSource>),
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Human(_) => f.write_str("Human"),
            Self::Scripted(network) => f
                .debug_tuple("Scripted")
                .field(&network.fitness())
                .finish(),
            Self::Remote(_) => f.write_str("Remote"),
        }
    }
}

impl Player {
    /// Asks the player for its next move.
    ///
    /// A scripted player always answers, possibly with an occupied cell.
    pub fn decide_move(&mut self, marker: Marker, board: &Board) -> Result<Cell, PlayerError> {
        match self {
            Self::Human(source) | Self::Remote(source) => source.next_move(marker, board),
            Self::Scripted(network) => Ok(network.get_move(marker, board)),
        }
    }

    #[must_use]
    pub fn network(&self) -> Option<&Network> {
        match self {
            Self::Scripted(network) => Some(network),
            Self::Human(_) | Self::Remote(_) => None,
        }
    }
}

/// Parses a move typed as a cell number (`5`) or as `col,row` (`3,1`).
pub fn parse_move(input: &str) -> Result<Cell, PlayerError> {
    let invalid = || PlayerError::InvalidInput {
        input: input.to_owned(),
    };
    let text = input.trim();
    let cell = match text.split_once(',') {
        Some((col, row)) => {
            let col = col.trim().parse().map_err(|_| invalid())?;
            let row = row.trim().parse().map_err(|_| invalid())?;
            Cell::from_col_row(col, row)
        }
        None => Cell::new(text.parse().map_err(|_| invalid())?),
    };
    cell.map_err(|_| invalid())
}

/// Reads one move per line from a buffered reader.
#[derive(Debug)]
pub struct LineMoveSource<R> {
    reader: R,
    line: String,
}

impl<R> LineMoveSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }
}

impl<R> MoveSource for LineMoveSource<R>
where
    R: BufRead + Send,
{
    fn next_move(&mut self, _marker: Marker, _board: &Board) -> Result<Cell, PlayerError> {
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Err(PlayerError::Closed);
        }
        parse_move(&self.line)
    }
}
