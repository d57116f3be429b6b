/// A player's piece on the board.
///
/// `x` always moves first in a fresh game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::FromStr)]
pub enum Marker {
    #[display("x")]
    X,
    #[display("o")]
    O,
}

impl Marker {
    /// Network input value for a cell holding this marker (or for whose turn it is).
    ///
    /// Both values are non-zero and distinct so that neither collapses onto the
    /// empty-cell signal.
    #[must_use]
    pub const fn input_value(self) -> f32 {
        match self {
            Self::X => 0.001,
            Self::O => 0.01,
        }
    }

    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }

    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Self::X => 'x',
            Self::O => 'o',
        }
    }
}

/// Network input value for an empty cell.
pub const EMPTY_INPUT_VALUE: f32 = 0.0;
