use rand::{Rng, seq::SliceRandom as _};
use serde::{Deserialize, Serialize};
use tictactio_ai::Network;

/// Rates controlling how a [`Population`] turns over each generation.
///
/// Counts are `floor(len * rate)` of the population's length at the start of
/// the generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationRates {
    /// Fraction of networks mutated once after breeding.
    pub mutation_rate: f64,
    /// Nominal fraction of networks culled; see [`PopulationRates::breeding_rate`].
    pub killing_rate: f64,
    /// Amount subtracted from half the killing rate.
    pub diminish_rate: f64,
}

impl Default for PopulationRates {
    fn default() -> Self {
        Self {
            mutation_rate: 0.20,
            killing_rate: 0.30,
            diminish_rate: 0.01,
        }
    }
}

impl PopulationRates {
    /// Fraction of networks culled and then replaced by children.
    ///
    /// `killing_rate / 2 - diminish_rate`. Children come in pairs, so an odd
    /// cull count leaves one slot unfilled and the population shrinks slowly
    /// over many generations. This is intended.
    #[must_use]
    pub fn breeding_rate(&self) -> f64 {
        self.killing_rate / 2.0 - self.diminish_rate
    }

    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn count(len: usize, rate: f64) -> usize {
        (len as f64 * rate).floor().max(0.0) as usize
    }

    /// Number of networks culled from a population of `len`.
    #[must_use]
    pub fn cull_count(&self, len: usize) -> usize {
        Self::count(len, self.breeding_rate()).min(len)
    }

    /// Number of networks mutated in a population of `len`.
    #[must_use]
    pub fn mutation_count(&self, len: usize) -> usize {
        Self::count(len, self.mutation_rate).min(len)
    }

    /// Population length after one generation starting from `len`.
    #[must_use]
    pub fn next_len(&self, len: usize) -> usize {
        let culled = self.cull_count(len);
        len - culled + 2 * (culled / 2)
    }
}

/// A collection of networks evolved together.
///
/// Member order only matters between [`Population::shuffle`] and
/// [`Population::advance_generation`]: it decides who plays whom.
#[derive(Debug, Clone)]
pub struct Population {
    networks: Vec<Network>,
    rates: PopulationRates,
}

impl Population {
    /// Creates `size` random networks with zero fitness.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn random<R>(size: usize, rates: PopulationRates, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        assert!(size > 0, "population must not be empty");
        let networks = (0..size).map(|_| Network::random(rng)).collect();
        Self { networks, rates }
    }

    #[must_use]
    pub fn rates(&self) -> &PopulationRates {
        &self.rates
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.networks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    #[must_use]
    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    pub fn networks_mut(&mut self) -> &mut [Network] {
        &mut self.networks
    }

    /// The member with the highest current fitness; the first one on ties.
    #[must_use]
    pub fn best(&self) -> &Network {
        self.networks
            .iter()
            .reduce(|best, n| if n.fitness() > best.fitness() { n } else { best })
            .expect("population is never empty")
    }

    pub fn shuffle<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        self.networks.shuffle(rng);
    }

    /// Sorts members by fitness, best first. The sort is stable.
    pub fn rank(&mut self) {
        self.networks
            .sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
    }

    /// Turns the evaluated population into the next generation.
    ///
    /// 1. Rank by fitness, best first
    /// 2. Keep a copy of the fittest network to return
    /// 3. Cull the lowest [`PopulationRates::cull_count`] networks
    /// 4. Breed the top survivors in pairs `(0, 1), (2, 3), ...`, `cull_count / 2` pairs
    /// 5. Mutate [`PopulationRates::mutation_count`] distinct members
    /// 6. Reset every fitness to zero
    ///
    /// Returns the fittest network of the generation just evaluated, with its
    /// fitness intact.
    pub fn advance_generation<R>(&mut self, rng: &mut R) -> Network
    where
        R: Rng + ?Sized,
    {
        let len = self.networks.len();
        let culled = self.rates.cull_count(len);
        let mutated = self.rates.mutation_count(len);

        self.rank();
        let fittest = self.networks[0].clone();

        self.networks.truncate(len - culled);

        let pairs = (culled / 2).min(self.networks.len() / 2);
        let mut children = Vec::with_capacity(pairs * 2);
        for pair in self.networks.chunks_exact(2).take(pairs) {
            let (first, second) = pair[0].breed(&pair[1], rng);
            children.push(first);
            children.push(second);
        }
        self.networks.extend(children);

        let mutated = mutated.min(self.networks.len());
        for index in rand::seq::index::sample(rng, self.networks.len(), mutated) {
            self.networks[index].mutate(rng);
        }

        for network in &mut self.networks {
            network.reset_fitness();
        }

        fittest
    }
}
