//! Parallel evaluation of all pairings of one generation.
//!
//! A fixed pool of scoped worker threads drains a shared job queue of
//! [`Pairing`]s. Workers only read the networks; each sends back a
//! [`PairingResult`] holding the fitness deltas, and the coordinator applies
//! them with [`apply_results`] once every worker has been joined. Results are
//! sorted by pairing id first, so the accumulated fitness does not depend on
//! which worker finished first.
//!
//! A pairing whose match panics is logged and scored as zero for both sides;
//! the rest of the generation proceeds.

use std::{
    any::Any,
    num::NonZero,
    panic::{self, AssertUnwindSafe},
    thread,
};

use tictactio_ai::{Mover, Network};

use crate::{MatchEvaluator, MatchOutcome};

/// One match to play: `a[index_a]` (as `x`) against `b[index_b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing {
    pub pairing_id: usize,
    pub index_a: usize,
    pub index_b: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairingResult {
    pub pairing_id: usize,
    pub index_a: usize,
    pub index_b: usize,
    pub delta_a: f32,
    pub delta_b: f32,
    /// `None` if the match panicked.
    pub outcome: Option<MatchOutcome>,
}

/// Number of workers to use when none is configured.
#[must_use]
pub fn default_workers() -> usize {
    thread::available_parallelism().map_or(1, NonZero::get)
}

/// Every `(index_a, index_b)` combination, numbered row by row.
pub fn pairings(len_a: usize, len_b: usize) -> impl Iterator<Item = Pairing> {
    (0..len_a).flat_map(move |index_a| {
        (0..len_b).map(move |index_b| Pairing {
            pairing_id: index_a * len_b + index_b,
            index_a,
            index_b,
        })
    })
}

/// Plays every member of `a` against every member of `b` on `workers` threads.
///
/// Returns one result per pairing, sorted by pairing id.
pub fn evaluate_pairings<A, B>(
    evaluator: &MatchEvaluator,
    a: &[A],
    b: &[B],
    workers: usize,
) -> Vec<PairingResult>
where
    A: Mover + Sync,
    B: Mover + Sync,
{
    let workers = workers.max(1);
    let (jobs_tx, jobs_rx) = crossbeam_channel::unbounded();
    let (results_tx, results_rx) = crossbeam_channel::unbounded();

    for pairing in pairings(a.len(), b.len()) {
        jobs_tx
            .send(pairing)
            .expect("job receiver is held until the pool is joined");
    }
    // workers stop once the queue is drained
    drop(jobs_tx);

    tracing::debug!(pairings = a.len() * b.len(), workers, "evaluation started");
    thread::scope(|s| {
        for worker in 0..workers {
            let jobs_rx = jobs_rx.clone();
            let results_tx = results_tx.clone();
            s.spawn(move || {
                let mut played = 0_usize;
                for pairing in jobs_rx {
                    let result = play(evaluator, a, b, pairing);
                    if results_tx.send(result).is_err() {
                        break;
                    }
                    played += 1;
                }
                tracing::trace!(worker, played, "worker finished");
            });
        }
    });
    drop(results_tx);

    let mut results = results_rx.iter().collect::<Vec<_>>();
    results.sort_by_key(|r| r.pairing_id);
    tracing::debug!(results = results.len(), "evaluation finished");
    results
}

fn play<A, B>(evaluator: &MatchEvaluator, a: &[A], b: &[B], pairing: Pairing) -> PairingResult
where
    A: Mover,
    B: Mover,
{
    let Pairing {
        pairing_id,
        index_a,
        index_b,
    } = pairing;
    let played =
        panic::catch_unwind(AssertUnwindSafe(|| evaluator.evaluate(&a[index_a], &b[index_b])));
    match played {
        Ok(result) => PairingResult {
            pairing_id,
            index_a,
            index_b,
            delta_a: result.delta_a,
            delta_b: result.delta_b,
            outcome: Some(result.outcome),
        },
        Err(payload) => {
            tracing::warn!(
                pairing_id,
                index_a,
                index_b,
                reason = panic_message(payload.as_ref()),
                "match failed, scoring it as zero"
            );
            PairingResult {
                pairing_id,
                index_a,
                index_b,
                delta_a: 0.0,
                delta_b: 0.0,
                outcome: None,
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic"
    }
}

/// Adds each result's deltas to the networks it names, in the given order.
pub fn apply_results(results: &[PairingResult], a: &mut [Network], b: &mut [Network]) {
    for result in results {
        a[result.index_a].add_fitness(result.delta_a);
        b[result.index_b].add_fitness(result.delta_b);
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;
    use tictactio_engine::{Board, Cell, Marker};

    use super::*;

    enum TestMover {
        FirstEmpty,
        Panics,
    }

    impl Mover for TestMover {
        fn get_move(&self, _turn: Marker, board: &Board) -> Cell {
            match self {
                Self::FirstEmpty => board.empty_cells().next().unwrap(),
                Self::Panics => panic!("mover exploded"),
            }
        }
    }

    fn networks(count: usize, rng: &mut Pcg32) -> Vec<Network> {
        (0..count).map(|_| Network::random(rng)).collect()
    }

    #[test]
    fn test_pairings_cover_bipartite_set() {
        let all = pairings(3, 4).collect::<Vec<_>>();
        assert_eq!(all.len(), 12);
        for (i, pairing) in all.iter().enumerate() {
            assert_eq!(pairing.pairing_id, i);
            assert_eq!(pairing.index_a * 4 + pairing.index_b, i);
        }
        assert_eq!(pairings(0, 5).count(), 0);
    }

    #[test]
    fn test_results_sorted_and_complete() {
        let mut rng = Pcg32::seed_from_u64(9);
        let a = networks(5, &mut rng);
        let b = networks(6, &mut rng);
        let results = evaluate_pairings(&MatchEvaluator::default(), &a, &b, 3);
        assert_eq!(results.len(), 30);
        assert!(results.iter().enumerate().all(|(i, r)| r.pairing_id == i));
        assert!(results.iter().all(|r| r.outcome.is_some()));
    }

    #[test]
    fn test_worker_count_does_not_change_results() {
        let mut rng = Pcg32::seed_from_u64(10);
        let a = networks(6, &mut rng);
        let b = networks(6, &mut rng);
        let evaluator = MatchEvaluator::default();
        let serial = evaluate_pairings(&evaluator, &a, &b, 1);
        for workers in [2, 4, 7] {
            assert_eq!(evaluate_pairings(&evaluator, &a, &b, workers), serial);
        }
        // zero is treated as one
        assert_eq!(evaluate_pairings(&evaluator, &a, &b, 0), serial);
    }

    #[test]
    fn test_panicking_match_scores_zero() {
        let a = [TestMover::FirstEmpty, TestMover::Panics];
        let b = [TestMover::FirstEmpty, TestMover::FirstEmpty];
        let results = evaluate_pairings(&MatchEvaluator::default(), &a, &b, 2);
        assert_eq!(results.len(), 4);
        for result in &results {
            if result.index_a == 1 {
                assert_eq!(result.outcome, None);
                assert_eq!((result.delta_a, result.delta_b), (0.0, 0.0));
            } else {
                assert_eq!(result.outcome, Some(MatchOutcome::AWins));
                assert_eq!((result.delta_a, result.delta_b), (35.0, -30.0));
            }
        }
    }

    #[test]
    fn test_apply_results_accumulates() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut a = networks(2, &mut rng);
        let mut b = networks(2, &mut rng);
        let results = [
            PairingResult {
                pairing_id: 0,
                index_a: 0,
                index_b: 1,
                delta_a: 30.0,
                delta_b: -30.0,
                outcome: Some(MatchOutcome::AWins),
            },
            PairingResult {
                pairing_id: 1,
                index_a: 0,
                index_b: 0,
                delta_a: -40.0,
                delta_b: 5.0,
                outcome: Some(MatchOutcome::Aborted),
            },
        ];
        apply_results(&results, &mut a, &mut b);
        assert_eq!(a[0].fitness(), -10.0);
        assert_eq!(a[1].fitness(), 0.0);
        assert_eq!(b[0].fitness(), 5.0);
        assert_eq!(b[1].fitness(), -30.0);
    }
}
