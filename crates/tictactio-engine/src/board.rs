use std::fmt;

use arrayvec::ArrayVec;

use crate::{Cell, EMPTY_INPUT_VALUE, InvalidCellError, Marker, ParseBoardError};

/// Number of values produced by [`Board::encode`]: the turn slot followed by one slot per cell.
pub const ENCODED_LEN: usize = Cell::COUNT + 1;

/// Every line of three, as 0-based cell indices.
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Game status derived from the current grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Winner {
    None,
    X,
    O,
    Tie,
}

impl Winner {
    fn from_marker(marker: Marker) -> Self {
        match marker {
            Marker::X => Self::X,
            Marker::O => Self::O,
        }
    }
}

/// A 3×3 tic-tac-toe grid with a move counter.
///
/// Each cell goes from empty to occupied at most once per game; [`Board::place`]
/// refuses to overwrite an occupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Board {
    cells: [Option<Marker>; Cell::COUNT],
    moves: usize,
}

impl Board {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cells: [None; Cell::COUNT],
            moves: 0,
        }
    }

    /// Builds a board from three text rows.
    ///
    /// `x` and `o` (either case) are markers; a space, `.` or `-` is an empty cell.
    ///
    /// ```
    /// use tictactio_engine::{Board, Cell, Marker};
    ///
    /// let board = Board::from_rows(["xx ", "oo ", "   "]).unwrap();
    /// assert_eq!(board.get(Cell::new(1).unwrap()), Some(Marker::X));
    /// assert_eq!(board.moves(), 4);
    /// ```
    pub fn from_rows(rows: [&str; 3]) -> Result<Self, ParseBoardError> {
        let mut board = Self::new();
        for (row_index, row) in rows.iter().enumerate() {
            let chars = row.chars().collect::<Vec<_>>();
            if chars.len() != 3 {
                return Err(ParseBoardError {
                    row: row_index + 1,
                    reason: format!("expected 3 cells, found {}", chars.len()),
                });
            }
            for (col_index, ch) in chars.into_iter().enumerate() {
                let marker = match ch {
                    'x' | 'X' => Some(Marker::X),
                    'o' | 'O' => Some(Marker::O),
                    ' ' | '.' | '-' => None,
                    other => {
                        return Err(ParseBoardError {
                            row: row_index + 1,
                            reason: format!("unexpected character {other:?}"),
                        });
                    }
                };
                if marker.is_some() {
                    board.moves += 1;
                }
                board.cells[row_index * 3 + col_index] = marker;
            }
        }
        Ok(board)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[must_use]
    pub fn moves(&self) -> usize {
        self.moves
    }

    #[must_use]
    pub fn get(&self, cell: Cell) -> Option<Marker> {
        self.cells[cell.index()]
    }

    #[must_use]
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.get(cell).is_some()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        Cell::all().filter(|cell| !self.is_occupied(*cell))
    }

    /// Places `marker` on `cell` and counts the move.
    pub fn place(&mut self, cell: Cell, marker: Marker) -> Result<(), InvalidCellError> {
        let slot = &mut self.cells[cell.index()];
        if slot.is_some() {
            return Err(InvalidCellError::Occupied(cell));
        }
        *slot = Some(marker);
        self.moves += 1;
        Ok(())
    }

    /// Returns the current game status.
    ///
    /// A completed line takes precedence over a full grid.
    #[must_use]
    pub fn winner(&self) -> Winner {
        for line in LINES {
            if let [Some(a), Some(b), Some(c)] = line.map(|i| self.cells[i])
                && a == b
                && b == c
            {
                return Winner::from_marker(a);
            }
        }
        if self.is_full() {
            Winner::Tie
        } else {
            Winner::None
        }
    }

    /// Returns `true` if a line through `cell` has `marker` on both of its other cells.
    ///
    /// Called before placing, this tells whether the move wins; called after
    /// placing, whether it did.
    #[must_use]
    pub fn completes_line(&self, cell: Cell, marker: Marker) -> bool {
        self.lines_through(cell)
            .iter()
            .any(|others| others.iter().all(|&i| self.cells[i] == Some(marker)))
    }

    /// Returns `true` if `cell` is the missing third of a line the opponent of
    /// `marker` holds the other two cells of.
    #[must_use]
    pub fn blocks_opponent(&self, cell: Cell, marker: Marker) -> bool {
        self.completes_line(cell, marker.opponent())
    }

    /// Encodes the board as network input: the turn marker first, then the nine cells.
    #[must_use]
    pub fn encode(&self, turn: Marker) -> [f32; ENCODED_LEN] {
        let mut input = [EMPTY_INPUT_VALUE; ENCODED_LEN];
        input[0] = turn.input_value();
        for (slot, cell) in input[1..].iter_mut().zip(self.cells) {
            *slot = cell.map_or(EMPTY_INPUT_VALUE, Marker::input_value);
        }
        input
    }

    /// The other two cells of each line passing through `cell`.
    fn lines_through(&self, cell: Cell) -> ArrayVec<[usize; 2], 4> {
        let index = cell.index();
        LINES
            .iter()
            .filter(|line| line.contains(&index))
            .map(|line| {
                let mut others = line.iter().copied().filter(|&i| i != index);
                [others.next().unwrap_or(index), others.next().unwrap_or(index)]
            })
            .collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row_index, row) in self.cells.chunks(3).enumerate() {
            if row_index > 0 {
                writeln!(f, "---+---+---")?;
            }
            let [a, b, c] = [row[0], row[1], row[2]].map(|m| m.map_or(' ', Marker::to_char));
            writeln!(f, " {a} | {b} | {c}")?;
        }
        Ok(())
    }
}
