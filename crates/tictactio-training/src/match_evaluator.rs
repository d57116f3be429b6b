use serde::{Deserialize, Serialize};
use tictactio_ai::Mover;
use tictactio_engine::{Board, Cell, Marker, Winner};

/// Fitness changes awarded during a match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rewards {
    /// Awarded to the side completing a line.
    pub win: f32,
    /// Awarded to the other side when a line is completed.
    pub loss: f32,
    /// Awarded to both sides when the grid fills without a line.
    pub tie: f32,
    /// Awarded for taking the last free cell of a line the opponent holds two cells of.
    pub block: f32,
    /// Awarded for taking the center cell.
    pub center: f32,
    /// Awarded for choosing an occupied cell.
    pub overlap: f32,
    /// Awarded for every accepted move.
    pub move_cost: f32,
}

impl Default for Rewards {
    fn default() -> Self {
        Self {
            win: 30.0,
            loss: -30.0,
            tie: 15.0,
            block: 10.0,
            center: 5.0,
            overlap: -40.0,
            move_cost: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum MatchOutcome {
    #[display("a wins")]
    AWins,
    #[display("b wins")]
    BWins,
    #[display("tie")]
    Tie,
    /// Too many consecutive invalid moves by one side, or the turn cap was hit.
    #[display("aborted")]
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    pub delta_a: f32,
    pub delta_b: f32,
    pub outcome: MatchOutcome,
}

/// Plays one game between two movers and scores it.
///
/// Side `a` plays `x`, side `b` plays `o`. Each turn the side to move picks a
/// cell:
///
/// - An occupied cell costs [`Rewards::overlap`], places nothing and keeps the
///   turn. After `invalid_move_limit` such picks in a row by the same side the
///   match is aborted.
/// - Otherwise the marker is placed and the mover collects, in order, the
///   center bonus, the block bonus, the win (with the loss for the opponent)
///   or the tie (for both), and the move cost.
///
/// Every pick, accepted or not, counts against `max_turns`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchEvaluator {
    pub rewards: Rewards,
    pub invalid_move_limit: usize,
    pub max_turns: usize,
}

impl Default for MatchEvaluator {
    fn default() -> Self {
        Self {
            rewards: Rewards::default(),
            invalid_move_limit: 2,
            max_turns: 32,
        }
    }
}

const fn side(marker: Marker) -> usize {
    match marker {
        Marker::X => 0,
        Marker::O => 1,
    }
}

impl MatchEvaluator {
    /// Plays a fresh game, `a` moving first.
    pub fn evaluate<A, B>(&self, a: &A, b: &B) -> MatchResult
    where
        A: Mover + ?Sized,
        B: Mover + ?Sized,
    {
        self.evaluate_from(Board::new(), Marker::X, a, b)
    }

    /// Plays on from `board` with `first` to move.
    ///
    /// A board that is already decided yields its outcome with zero deltas.
    pub fn evaluate_from<A, B>(
        &self,
        mut board: Board,
        first: Marker,
        a: &A,
        b: &B,
    ) -> MatchResult
    where
        A: Mover + ?Sized,
        B: Mover + ?Sized,
    {
        let rewards = &self.rewards;
        let mut deltas = [0.0_f32; 2];
        let mut invalid = [0_usize; 2];
        let result = |deltas: [f32; 2], outcome| MatchResult {
            delta_a: deltas[0],
            delta_b: deltas[1],
            outcome,
        };

        match board.winner() {
            Winner::X => return result(deltas, MatchOutcome::AWins),
            Winner::O => return result(deltas, MatchOutcome::BWins),
            Winner::Tie => return result(deltas, MatchOutcome::Tie),
            Winner::None => {}
        }

        let mut turn = first;
        for _ in 0..self.max_turns {
            let me = side(turn);
            let other = side(turn.opponent());
            let cell = match turn {
                Marker::X => a.get_move(turn, &board),
                Marker::O => b.get_move(turn, &board),
            };

            let blocks = board.blocks_opponent(cell, turn);
            if board.place(cell, turn).is_err() {
                deltas[me] += rewards.overlap;
                invalid[me] += 1;
                if invalid[me] >= self.invalid_move_limit {
                    tracing::trace!(%turn, %cell, "match aborted after repeated invalid moves");
                    return result(deltas, MatchOutcome::Aborted);
                }
                continue;
            }
            invalid[me] = 0;

            if cell == Cell::CENTER {
                deltas[me] += rewards.center;
            }
            if blocks {
                deltas[me] += rewards.block;
            }
            let outcome = match board.winner() {
                Winner::X | Winner::O => {
                    deltas[me] += rewards.win;
                    deltas[other] += rewards.loss;
                    Some(match turn {
                        Marker::X => MatchOutcome::AWins,
                        Marker::O => MatchOutcome::BWins,
                    })
                }
                Winner::Tie => {
                    deltas[me] += rewards.tie;
                    deltas[other] += rewards.tie;
                    Some(MatchOutcome::Tie)
                }
                Winner::None => None,
            };
            deltas[me] += rewards.move_cost;
            if let Some(outcome) = outcome {
                return result(deltas, outcome);
            }

            turn = turn.opponent();
        }

        tracing::trace!(max_turns = self.max_turns, "match aborted at turn cap");
        result(deltas, MatchOutcome::Aborted)
    }
}
