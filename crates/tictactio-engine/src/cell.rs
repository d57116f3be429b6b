use std::fmt;

use crate::InvalidCellError;

/// A cell on the board, numbered `1..=9` row by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cell(u8);

impl Cell {
    pub const COUNT: usize = 9;
    pub const CENTER: Self = Self(5);

    pub fn new(number: usize) -> Result<Self, InvalidCellError> {
        match u8::try_from(number) {
            Ok(n @ 1..=9) => Ok(Self(n)),
            _ => Err(InvalidCellError::OutOfRange(number)),
        }
    }

    /// Builds a cell from 1-based `(col, row)` coordinates.
    pub fn from_col_row(col: usize, row: usize) -> Result<Self, InvalidCellError> {
        if !(1..=3).contains(&col) || !(1..=3).contains(&row) {
            return Err(InvalidCellError::OutOfGrid { col, row });
        }
        Self::new((row - 1) * 3 + col)
    }

    /// Builds a cell from a 0-based index into the grid.
    pub fn from_index(index: usize) -> Result<Self, InvalidCellError> {
        Self::new(index + 1)
    }

    #[must_use]
    pub fn number(self) -> usize {
        usize::from(self.0)
    }

    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0) - 1
    }

    #[must_use]
    pub fn col(self) -> usize {
        self.index() % 3 + 1
    }

    #[must_use]
    pub fn row(self) -> usize {
        self.index() / 3 + 1
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (1..=9).map(Self)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_row_roundtrip() {
        for cell in Cell::all() {
            assert_eq!(Cell::from_col_row(cell.col(), cell.row()).unwrap(), cell);
        }
        assert_eq!(Cell::from_col_row(3, 1).unwrap().number(), 3);
        assert_eq!(Cell::from_col_row(1, 3).unwrap().number(), 7);
        assert_eq!(Cell::from_col_row(2, 2).unwrap(), Cell::CENTER);
    }

    #[test]
    fn test_out_of_range() {
        assert!(Cell::new(0).is_err());
        assert!(Cell::new(10).is_err());
        assert!(Cell::from_col_row(4, 1).is_err());
        assert!(Cell::from_col_row(1, 0).is_err());
    }
}
