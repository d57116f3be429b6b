use rand::Rng;
use tictactio_engine::{Board, Cell, Marker};

use crate::{DimensionMismatchError, Layer, Neuron};

/// Probability that breeding swaps an entire layer.
const LAYER_CROSSOVER_PROBABILITY: f64 = 0.05;
/// Cumulative probability below which breeding swaps a single neuron; the rest swaps a single weight.
const NEURON_CROSSOVER_THRESHOLD: f64 = LAYER_CROSSOVER_PROBABILITY + 0.475;

/// What a single breeding step exchanges between the two children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossover {
    /// Swap a whole layer.
    Layer { layer: Layer },
    /// Swap the neuron at the same position in both parents.
    Neuron { layer: Layer, neuron: usize },
    /// Swap one weight of the neuron at the same position in both parents.
    Weight {
        layer: Layer,
        neuron: usize,
        weight: usize,
    },
}

impl Crossover {
    /// Rolls a crossover: 5% layer, 47.5% neuron, 47.5% weight, on a uniformly chosen layer.
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let roll: f64 = rng.random();
        let layer = Layer::ALL[rng.random_range(0..Layer::ALL.len())];
        if roll < LAYER_CROSSOVER_PROBABILITY {
            Self::Layer { layer }
        } else if roll < NEURON_CROSSOVER_THRESHOLD {
            Self::Neuron {
                layer,
                neuron: rng.random_range(0..layer.size()),
            }
        } else {
            Self::Weight {
                layer,
                neuron: rng.random_range(0..layer.size()),
                weight: rng.random_range(0..layer.input_arity()),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid {layer} layer: {reason}")]
pub struct NetworkShapeError {
    pub layer: Layer,
    pub reason: String,
}

/// A three-layer feed-forward network with a fitness score.
///
/// Cloning deep-copies every neuron, so children produced by [`Network::breed`]
/// never share storage with their parents.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    layers: [Vec<Neuron>; 3],
    fitness: f32,
}

impl Network {
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let layers = Layer::ALL.map(|layer| {
            (0..layer.size())
                .map(|_| Neuron::random(layer, rng))
                .collect()
        });
        Self {
            layers,
            fitness: 0.0,
        }
    }

    /// Builds a network from explicit layers, ordered input, hidden, output.
    pub fn from_layers(layers: [Vec<Neuron>; 3]) -> Result<Self, NetworkShapeError> {
        for (layer, neurons) in Layer::ALL.into_iter().zip(&layers) {
            if neurons.len() != layer.size() {
                return Err(NetworkShapeError {
                    layer,
                    reason: format!("expected {} neurons, got {}", layer.size(), neurons.len()),
                });
            }
            if let Some(neuron) = neurons.iter().find(|n| n.layer() != layer) {
                return Err(NetworkShapeError {
                    layer,
                    reason: format!("contains a neuron tagged {}", neuron.layer()),
                });
            }
        }
        Ok(Self {
            layers,
            fitness: 0.0,
        })
    }

    #[must_use]
    pub fn layer(&self, layer: Layer) -> &[Neuron] {
        &self.layers[layer.index()]
    }

    pub fn neurons(&self) -> impl Iterator<Item = &Neuron> {
        self.layers.iter().flatten()
    }

    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    pub fn add_fitness(&mut self, delta: f32) {
        self.fitness += delta;
    }

    pub fn reset_fitness(&mut self) {
        self.fitness = 0.0;
    }

    /// Feeds `inputs` through the input, hidden and output layers in turn.
    pub fn feed(&self, inputs: &[f32]) -> Result<Vec<f32>, DimensionMismatchError> {
        let mut values = inputs.to_vec();
        for layer in &self.layers {
            values = layer
                .iter()
                .map(|neuron| neuron.feed(&values))
                .collect::<Result<_, _>>()?;
        }
        Ok(values)
    }

    /// Picks the cell with the highest output; ties go to the lowest cell.
    ///
    /// The chosen cell may already be occupied.
    #[must_use]
    pub fn get_move(&self, turn: Marker, board: &Board) -> Cell {
        let output = self
            .feed(&board.encode(turn))
            .expect("board encoding matches the input layer arity");
        let mut best = 0;
        for (index, value) in output.iter().enumerate() {
            if *value > output[best] {
                best = index;
            }
        }
        Cell::from_index(best).expect("output layer has one neuron per cell")
    }

    /// Mutates one neuron of a uniformly chosen layer.
    pub fn mutate<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let layer_index = rng.random_range(0..self.layers.len());
        let layer = &mut self.layers[layer_index];
        let index = rng.random_range(0..layer.len());
        layer[index].mutate(rng);
    }

    /// Produces two children by a random [`Crossover`] with `other`.
    pub fn breed<R>(&self, other: &Self, rng: &mut R) -> (Self, Self)
    where
        R: Rng + ?Sized,
    {
        self.crossover(other, Crossover::random(rng))
    }

    /// Produces two children: copies of `self` and `other` with the part named
    /// by `crossover` exchanged. Children start with zero fitness.
    #[must_use]
    pub fn crossover(&self, other: &Self, crossover: Crossover) -> (Self, Self) {
        let mut first = self.clone();
        let mut second = other.clone();
        first.reset_fitness();
        second.reset_fitness();

        match crossover {
            Crossover::Layer { layer } => {
                let i = layer.index();
                std::mem::swap(&mut first.layers[i], &mut second.layers[i]);
            }
            Crossover::Neuron { layer, neuron } => {
                let i = layer.index();
                std::mem::swap(&mut first.layers[i][neuron], &mut second.layers[i][neuron]);
            }
            Crossover::Weight {
                layer,
                neuron,
                weight,
            } => {
                let i = layer.index();
                std::mem::swap(
                    &mut first.layers[i][neuron].weights_mut()[weight],
                    &mut second.layers[i][neuron].weights_mut()[weight],
                );
            }
        }
        (first, second)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    /// Every (layer, position, weight) of a network with its bias.
    fn snapshot(network: &Network) -> Vec<(Layer, usize, f32, Vec<f32>)> {
        Layer::ALL
            .into_iter()
            .flat_map(|layer| {
                network
                    .layer(layer)
                    .iter()
                    .enumerate()
                    .map(move |(i, n)| (layer, i, n.bias(), n.weights().to_vec()))
            })
            .collect()
    }

    /// Network whose output layer always favours `cell`.
    fn network_preferring(cell: usize, rng: &mut Pcg32) -> Network {
        let random = Network::random(rng);
        let output = (0..9)
            .map(|i| {
                let bias = if i + 1 == cell { 50.0 } else { -50.0 };
                Neuron::new(Layer::Output, bias, vec![0.0; 9]).unwrap()
            })
            .collect();
        let [input, hidden, _] = random.layers;
        Network::from_layers([input, hidden, output]).unwrap()
    }

    #[test]
    fn test_random_has_fixed_topology() {
        let network = Network::random(&mut rng());
        for layer in Layer::ALL {
            assert_eq!(network.layer(layer).len(), layer.size());
            assert!(
                network
                    .layer(layer)
                    .iter()
                    .all(|n| n.weights().len() == layer.input_arity() && n.layer() == layer)
            );
        }
        assert_eq!(network.neurons().count(), 28);
        assert_eq!(network.fitness(), 0.0);
    }

    #[test]
    fn test_feed_produces_nine_outputs() {
        let network = Network::random(&mut rng());
        let output = network.feed(&Board::new().encode(Marker::X)).unwrap();
        assert_eq!(output.len(), 9);
        assert!(output.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(network.feed(&[0.0; 9]).is_err());
    }

    #[test]
    fn test_get_move_picks_argmax() {
        let mut rng = rng();
        for cell in 1..=9 {
            let network = network_preferring(cell, &mut rng);
            assert_eq!(network.get_move(Marker::O, &Board::new()).number(), cell);
        }
    }

    #[test]
    fn test_get_move_ties_go_to_lowest_cell() {
        let mut rng = rng();
        let random = Network::random(&mut rng);
        let output = (0..9)
            .map(|_| Neuron::new(Layer::Output, 1.0, vec![0.0; 9]).unwrap())
            .collect();
        let [input, hidden, _] = random.layers;
        let network = Network::from_layers([input, hidden, output]).unwrap();
        assert_eq!(network.get_move(Marker::X, &Board::new()).number(), 1);
    }

    #[test]
    fn test_from_layers_validates_shape() {
        let random = Network::random(&mut rng());
        let [input, hidden, mut output] = random.layers.clone();
        output.pop();
        let err = Network::from_layers([input.clone(), hidden.clone(), output]).unwrap_err();
        assert_eq!(err.layer, Layer::Output);

        let err = Network::from_layers([hidden.clone(), hidden, input]).unwrap_err();
        assert_eq!(err.layer, Layer::Input);
    }

    #[test]
    fn test_mutate_changes_at_most_one_neuron() {
        let mut rng = rng();
        let mut network = Network::random(&mut rng);
        for _ in 0..100 {
            let before = snapshot(&network);
            network.mutate(&mut rng);
            let after = snapshot(&network);
            let changed = before.iter().zip(&after).filter(|(a, b)| a != b).count();
            assert!(changed <= 1, "{changed} neurons changed");
        }
    }

    #[test]
    fn test_fitness_accumulates_and_resets() {
        let mut network = Network::random(&mut rng());
        network.add_fitness(30.0);
        network.add_fitness(-40.0);
        assert_eq!(network.fitness(), -10.0);
        network.reset_fitness();
        assert_eq!(network.fitness(), 0.0);
    }

    mod crossover {
        use super::*;

        fn parents() -> (Network, Network) {
            let mut rng = rng();
            let mut a = Network::random(&mut rng);
            let mut b = Network::random(&mut rng);
            a.add_fitness(10.0);
            b.add_fitness(20.0);
            (a, b)
        }

        /// Checks that each child position holds exactly the content of one of
        /// the parents at that position, and that the children are complementary.
        fn assert_recombination(a: &Network, b: &Network, c1: &Network, c2: &Network) {
            for layer in Layer::ALL {
                for i in 0..layer.size() {
                    let [pa, pb, n1, n2] = [a, b, c1, c2].map(|n| &n.layer(layer)[i]);
                    assert_eq!(n1.bias() == pa.bias(), n2.bias() == pb.bias());
                    for w in 0..layer.input_arity() {
                        let (wa, wb) = (pa.weights()[w], pb.weights()[w]);
                        let (w1, w2) = (n1.weights()[w], n2.weights()[w]);
                        assert!(
                            (w1 == wa && w2 == wb) || (w1 == wb && w2 == wa),
                            "weight {layer}/{i}/{w} was invented or dropped"
                        );
                    }
                }
            }
        }

        #[test]
        fn test_layer_swap() {
            let (a, b) = parents();
            let (c1, c2) = a.crossover(&b, Crossover::Layer { layer: Layer::Hidden });
            assert_eq!(c1.layer(Layer::Hidden), b.layer(Layer::Hidden));
            assert_eq!(c2.layer(Layer::Hidden), a.layer(Layer::Hidden));
            assert_eq!(c1.layer(Layer::Input), a.layer(Layer::Input));
            assert_eq!(c2.layer(Layer::Output), b.layer(Layer::Output));
            assert_recombination(&a, &b, &c1, &c2);
        }

        #[test]
        fn test_neuron_swap() {
            let (a, b) = parents();
            let (c1, c2) = a.crossover(
                &b,
                Crossover::Neuron {
                    layer: Layer::Output,
                    neuron: 4,
                },
            );
            assert_eq!(c1.layer(Layer::Output)[4], b.layer(Layer::Output)[4]);
            assert_eq!(c2.layer(Layer::Output)[4], a.layer(Layer::Output)[4]);
            assert_eq!(c1.layer(Layer::Output)[3], a.layer(Layer::Output)[3]);
            assert_recombination(&a, &b, &c1, &c2);
        }

        #[test]
        fn test_weight_swap() {
            let (a, b) = parents();
            let (c1, c2) = a.crossover(
                &b,
                Crossover::Weight {
                    layer: Layer::Input,
                    neuron: 2,
                    weight: 7,
                },
            );
            let n1 = &c1.layer(Layer::Input)[2];
            let n2 = &c2.layer(Layer::Input)[2];
            assert_eq!(n1.weights()[7], b.layer(Layer::Input)[2].weights()[7]);
            assert_eq!(n2.weights()[7], a.layer(Layer::Input)[2].weights()[7]);
            assert_eq!(n1.weights()[6], a.layer(Layer::Input)[2].weights()[6]);
            assert_eq!(n1.bias(), a.layer(Layer::Input)[2].bias());
            assert_recombination(&a, &b, &c1, &c2);
        }

        #[test]
        fn test_children_do_not_alias_parents() {
            let (a, b) = parents();
            let a_before = a.clone();
            let mut rng = rng();
            let (mut c1, _) = a.crossover(&b, Crossover::Layer { layer: Layer::Output });
            for _ in 0..50 {
                c1.mutate(&mut rng);
            }
            assert_eq!(a, a_before);
        }

        #[test]
        fn test_children_start_with_zero_fitness() {
            let (a, b) = parents();
            let mut rng = rng();
            let (c1, c2) = a.breed(&b, &mut rng);
            assert_eq!(c1.fitness(), 0.0);
            assert_eq!(c2.fitness(), 0.0);
        }

        #[test]
        fn test_random_breed_is_recombination() {
            let (a, b) = parents();
            let mut rng = rng();
            for _ in 0..50 {
                let (c1, c2) = a.breed(&b, &mut rng);
                assert_recombination(&a, &b, &c1, &c2);
            }
        }

        #[test]
        fn test_granularity_frequencies() {
            let mut rng = rng();
            let mut counts = [0_usize; 3];
            for _ in 0..10_000 {
                let i = match Crossover::random(&mut rng) {
                    Crossover::Layer { .. } => 0,
                    Crossover::Neuron { .. } => 1,
                    Crossover::Weight { .. } => 2,
                };
                counts[i] += 1;
            }
            assert!((350..650).contains(&counts[0]), "{counts:?}");
            assert!((4400..5100).contains(&counts[1]), "{counts:?}");
            assert!((4400..5100).contains(&counts[2]), "{counts:?}");
        }
    }
}
