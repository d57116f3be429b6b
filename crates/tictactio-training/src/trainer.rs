use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use tictactio_ai::Network;

use crate::{
    FitnessStats, MatchEvaluator, Population, PopulationRates, Rewards,
    scheduler::{self, apply_results, evaluate_pairings},
};

/// Best fitness assumed before the first generation.
const INITIAL_PREVIOUS_BEST: f32 = -500.0;

/// Everything a training run needs, passed in explicitly.
///
/// Deserializes from a partial JSON object; missing fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Initial size of each of the two populations.
    pub population_size: usize,
    /// Generations the best fitness may stay unchanged before training converges.
    pub gen_same_max: usize,
    /// Hard cap on the number of generations.
    pub gen_stop: usize,
    /// Worker threads per generation; defaults to the available parallelism.
    pub workers: Option<usize>,
    pub rates: PopulationRates,
    pub rewards: Rewards,
    pub invalid_move_limit: usize,
    pub max_turns: usize,
    /// Seed for all randomness of the run; random if unset.
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        let evaluator = MatchEvaluator::default();
        Self {
            population_size: 100,
            gen_same_max: 200,
            gen_stop: 250,
            workers: None,
            rates: PopulationRates::default(),
            rewards: evaluator.rewards,
            invalid_move_limit: evaluator.invalid_move_limit,
            max_turns: evaluator.max_turns,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[display("{field} must be within [0, 1], got {value}")]
    RateOutOfRange { field: &'static str, value: f64 },
    #[display("breeding rate must not be negative, got {value}")]
    NegativeBreedingRate { value: f64 },
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("population_size", self.population_size),
            ("gen_same_max", self.gen_same_max),
            ("gen_stop", self.gen_stop),
            ("invalid_move_limit", self.invalid_move_limit),
            ("max_turns", self.max_turns),
            ("workers", self.workers.unwrap_or(1)),
        ];
        if let Some((field, _)) = counts.into_iter().find(|(_, n)| *n == 0) {
            return Err(ConfigError::Zero { field });
        }

        let rates = [
            ("mutation_rate", self.rates.mutation_rate),
            ("killing_rate", self.rates.killing_rate),
            ("diminish_rate", self.rates.diminish_rate),
        ];
        if let Some((field, value)) = rates
            .into_iter()
            .find(|(_, rate)| !(0.0..=1.0).contains(rate))
        {
            return Err(ConfigError::RateOutOfRange { field, value });
        }

        let value = self.rates.breeding_rate();
        if value < 0.0 {
            return Err(ConfigError::NegativeBreedingRate { value });
        }
        Ok(())
    }

    #[must_use]
    pub fn evaluator(&self) -> MatchEvaluator {
        MatchEvaluator {
            rewards: self.rewards,
            invalid_move_limit: self.invalid_move_limit,
            max_turns: self.max_turns,
        }
    }
}

/// Requests cancellation of a training run from another thread.
///
/// The trainer only looks at the flag between generations.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "lowercase")]
pub enum TrainingOutcome {
    /// The best fitness stayed unchanged for `gen_same_max` generations.
    #[display("converged")]
    Converged,
    /// `gen_stop` generations were run.
    #[display("exhausted")]
    Exhausted,
    #[display("cancelled")]
    Cancelled,
}

/// Summary of one completed generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationReport {
    /// 1-based number of the generation.
    pub generation: usize,
    /// Fitness of the better of the two populations' fittest networks.
    pub best_fitness: f32,
    /// Consecutive generations the best fitness has been unchanged.
    pub plateau: usize,
    pub stats: [FitnessStats; 2],
    /// Population sizes after advancing.
    pub sizes: [usize; 2],
}

#[derive(Debug, Clone)]
pub struct TrainingResult {
    pub fittest: Network,
    pub outcome: TrainingOutcome,
    pub generations: usize,
}

/// Evolves two populations against each other.
#[derive(Debug)]
pub struct Trainer {
    config: TrainerConfig,
    evaluator: MatchEvaluator,
    workers: usize,
    populations: [Population; 2],
    rng: Pcg32,
    generation: usize,
    plateau: usize,
    previous_best: f32,
    fittest: Option<Network>,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = Pcg32::seed_from_u64(config.seed.unwrap_or_else(|| rand::rng().random()));
        let populations = [(); 2]
            .map(|()| Population::random(config.population_size, config.rates, &mut rng));
        Ok(Self {
            evaluator: config.evaluator(),
            workers: config.workers.unwrap_or_else(scheduler::default_workers),
            config,
            populations,
            rng,
            generation: 0,
            plateau: 0,
            previous_best: INITIAL_PREVIOUS_BEST,
            fittest: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Number of completed generations.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    #[must_use]
    pub fn populations(&self) -> &[Population; 2] {
        &self.populations
    }

    /// Runs one generation: shuffle, evaluate every pairing, apply the
    /// deltas, advance both populations and update the plateau counter.
    pub fn step(&mut self) -> GenerationReport {
        let [pop_a, pop_b] = &mut self.populations;
        pop_a.shuffle(&mut self.rng);
        pop_b.shuffle(&mut self.rng);

        let results = evaluate_pairings(
            &self.evaluator,
            pop_a.networks(),
            pop_b.networks(),
            self.workers,
        );
        apply_results(&results, pop_a.networks_mut(), pop_b.networks_mut());

        let stats = [&*pop_a, &*pop_b].map(|population| {
            FitnessStats::new(population.networks().iter().map(Network::fitness))
                .expect("population is never empty")
        });

        let fittest_a = pop_a.advance_generation(&mut self.rng);
        let fittest_b = pop_b.advance_generation(&mut self.rng);
        let highest = if fittest_a.fitness() > fittest_b.fitness() {
            fittest_a
        } else {
            fittest_b
        };

        #[expect(clippy::float_cmp)]
        let unchanged = highest.fitness() == self.previous_best;
        if unchanged {
            self.plateau += 1;
        } else {
            tracing::debug!(
                from = self.previous_best,
                to = highest.fitness(),
                "best fitness changed"
            );
            self.plateau = 0;
        }
        self.previous_best = highest.fitness();
        self.generation += 1;

        let report = GenerationReport {
            generation: self.generation,
            best_fitness: highest.fitness(),
            plateau: self.plateau,
            stats,
            sizes: [pop_a.len(), pop_b.len()],
        };
        tracing::info!(
            generation = report.generation,
            best = report.best_fitness,
            plateau = report.plateau,
            mean_a = report.stats[0].mean,
            mean_b = report.stats[1].mean,
            size_a = report.sizes[0],
            size_b = report.sizes[1],
            "generation complete"
        );
        self.fittest = Some(highest);
        report
    }

    /// Stop condition after the last completed generation, if any applies.
    #[must_use]
    pub fn status(&self) -> Option<TrainingOutcome> {
        if self.generation == 0 {
            None
        } else if self.plateau >= self.config.gen_same_max {
            Some(TrainingOutcome::Converged)
        } else if self.generation >= self.config.gen_stop {
            Some(TrainingOutcome::Exhausted)
        } else {
            None
        }
    }

    /// Trains until converged or exhausted.
    pub fn train(self) -> TrainingResult {
        self.train_with(&StopFlag::new(), |_| {})
    }

    /// Trains until converged, exhausted or `stop` is raised, calling
    /// `on_generation` after every generation.
    ///
    /// The returned network is the fittest of the last completed generation,
    /// or the first member of population A if none completed.
    pub fn train_with<F>(mut self, stop: &StopFlag, mut on_generation: F) -> TrainingResult
    where
        F: FnMut(&GenerationReport),
    {
        tracing::info!(
            population = self.config.population_size,
            workers = self.workers,
            gen_same_max = self.config.gen_same_max,
            gen_stop = self.config.gen_stop,
            "training started"
        );
        let outcome = loop {
            if let Some(outcome) = self.status() {
                break outcome;
            }
            if stop.is_stopped() {
                break TrainingOutcome::Cancelled;
            }
            let report = self.step();
            on_generation(&report);
        };
        tracing::info!(%outcome, generations = self.generation, "training finished");

        let fittest = self
            .fittest
            .unwrap_or_else(|| self.populations[0].networks()[0].clone());
        TrainingResult {
            fittest,
            outcome,
            generations: self.generation,
        }
    }
}
