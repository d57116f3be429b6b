//! Genetic training of tic-tac-toe networks by self-play.
//!
//! Two populations of [`Network`](tictactio_ai::Network)s are evolved side by
//! side. Every generation each network of one population plays one game against
//! every network of the other, and the score of those games is the network's
//! fitness for that generation.
//!
//! # How Training Works
//!
//! 1. **Shuffle** - Both populations are shuffled so pairings by index vary
//! 2. **Evaluate** - All `N × N` pairings are played by a worker pool ([`scheduler`])
//! 3. **Accumulate** - The coordinator applies the returned fitness deltas
//! 4. **Advance** - Each [`Population`] ranks, culls, breeds and mutates
//! 5. **Check** - Training stops when the best fitness plateaus or the generation cap is hit
//!
//! # Architecture
//!
//! ```text
//! Trainer
//!     ↓ dispatches pairings to
//! scheduler (worker pool)
//!     ↓ plays each pairing with
//! MatchEvaluator
//!     ↓ returns deltas to
//! Trainer
//!     ↓ advances
//! Population × 2
//! ```
//!
//! Workers never touch the coordinator's networks: they borrow them immutably
//! and hand back value results, so accumulation happens on one thread in
//! pairing order.
//!
//! # Example
//!
//! ```
//! use tictactio_training::{Trainer, TrainerConfig};
//!
//! let config = TrainerConfig {
//!     population_size: 4,
//!     gen_stop: 3,
//!     seed: Some(1),
//!     ..TrainerConfig::default()
//! };
//! let result = Trainer::new(config).unwrap().train();
//! assert!(result.generations <= 3);
//! ```

pub use self::{match_evaluator::*, population::*, stats::*, trainer::*};

mod match_evaluator;
mod population;
pub mod scheduler;
mod stats;
mod trainer;
