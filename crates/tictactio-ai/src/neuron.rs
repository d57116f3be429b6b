use std::ops::RangeInclusive;

use rand::Rng;

use crate::{DimensionMismatchError, Layer};

/// Range freshly generated weights are drawn from.
pub const WEIGHT_RANGE: RangeInclusive<f32> = -1.0..=1.0;
/// Range freshly generated biases are drawn from.
pub const BIAS_RANGE: RangeInclusive<f32> = -7.5..=7.5;

const SCALE_RANGE: RangeInclusive<f32> = 0.5..=1.5;
const OFFSET_RANGE: RangeInclusive<f32> = -1.0..=1.0;
const BIAS_MUTATION_PROBABILITY: f64 = 0.5;

/// The six perturbations [`Neuron::mutate`] chooses from, with equal probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Replace the weight with a fresh random value.
    Replace,
    /// Multiply the weight by a factor in `[0.5, 1.5]`.
    Scale,
    /// Add an offset in `[-1, 1]`.
    Offset,
    /// Flip the weight's sign.
    FlipSign,
    /// Regenerate the whole weight vector; the selected index is ignored.
    Regenerate,
    /// Swap the weight with another weight of the same neuron.
    Swap,
}

impl MutationKind {
    pub const ALL: [Self; 6] = [
        Self::Replace,
        Self::Scale,
        Self::Offset,
        Self::FlipSign,
        Self::Regenerate,
        Self::Swap,
    ];

    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// A sigmoid unit: `sigmoid(bias + Σ inputs[i] * weights[i])`.
///
/// The weight vector length is fixed by the layer and never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Neuron {
    layer: Layer,
    bias: f32,
    weights: Vec<f32>,
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn random_weights<R>(rng: &mut R, len: usize) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    (0..len).map(|_| rng.random_range(WEIGHT_RANGE)).collect()
}

impl Neuron {
    /// Creates a neuron from explicit parameters.
    ///
    /// Fails if `weights` does not match the layer's input arity.
    pub fn new(
        layer: Layer,
        bias: f32,
        weights: Vec<f32>,
    ) -> Result<Self, DimensionMismatchError> {
        if weights.len() != layer.input_arity() {
            return Err(DimensionMismatchError {
                expected: layer.input_arity(),
                actual: weights.len(),
            });
        }
        Ok(Self {
            layer,
            bias,
            weights,
        })
    }

    /// Creates a neuron with weights in [`WEIGHT_RANGE`] and bias in [`BIAS_RANGE`].
    pub fn random<R>(layer: Layer, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self {
            layer,
            weights: random_weights(rng, layer.input_arity()),
            bias: rng.random_range(BIAS_RANGE),
        }
    }

    #[must_use]
    pub fn layer(&self) -> Layer {
        self.layer
    }

    #[must_use]
    pub fn bias(&self) -> f32 {
        self.bias
    }

    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub(crate) fn weights_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }

    pub fn feed(&self, inputs: &[f32]) -> Result<f32, DimensionMismatchError> {
        if inputs.len() != self.weights.len() {
            return Err(DimensionMismatchError {
                expected: self.weights.len(),
                actual: inputs.len(),
            });
        }
        let sum = inputs
            .iter()
            .zip(&self.weights)
            .fold(self.bias, |acc, (input, weight)| acc + input * weight);
        Ok(sigmoid(sum))
    }

    /// Applies one random perturbation to a random weight, and with probability
    /// 0.5 the same kind of perturbation to the bias.
    pub fn mutate<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let index = rng.random_range(0..self.weights.len());
        let kind = MutationKind::random(rng);
        let mutate_bias = rng.random_bool(BIAS_MUTATION_PROBABILITY);
        self.apply_mutation(kind, index, mutate_bias, rng);
    }

    /// Applies a specific perturbation to the weight at `index` (and to the bias
    /// when `mutate_bias` is set).
    ///
    /// [`MutationKind::Swap`] has no bias counterpart and leaves the bias alone.
    /// `index` must be below the layer's input arity.
    pub(crate) fn apply_mutation<R>(
        &mut self,
        kind: MutationKind,
        index: usize,
        mutate_bias: bool,
        rng: &mut R,
    ) where
        R: Rng + ?Sized,
    {
        match kind {
            MutationKind::Replace => {
                self.weights[index] = rng.random_range(WEIGHT_RANGE);
                if mutate_bias {
                    self.bias = rng.random_range(BIAS_RANGE);
                }
            }
            MutationKind::Scale => {
                self.weights[index] *= rng.random_range(SCALE_RANGE);
                if mutate_bias {
                    self.bias *= rng.random_range(SCALE_RANGE);
                }
            }
            MutationKind::Offset => {
                self.weights[index] += rng.random_range(OFFSET_RANGE);
                if mutate_bias {
                    self.bias += rng.random_range(OFFSET_RANGE);
                }
            }
            MutationKind::FlipSign => {
                self.weights[index] = -self.weights[index];
                if mutate_bias {
                    self.bias = -self.bias;
                }
            }
            MutationKind::Regenerate => {
                self.weights = random_weights(rng, self.layer.input_arity());
                if mutate_bias {
                    self.bias = rng.random_range(BIAS_RANGE);
                }
            }
            MutationKind::Swap => {
                if self.weights.len() < 2 {
                    return;
                }
                // pick among the other indices so the swap is never a no-op
                let mut other = rng.random_range(0..self.weights.len() - 1);
                if other >= index {
                    other += 1;
                }
                self.weights.swap(index, other);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    #[test]
    fn test_random_within_bounds() {
        let mut rng = rng();
        for layer in Layer::ALL {
            let neuron = Neuron::random(layer, &mut rng);
            assert_eq!(neuron.weights().len(), layer.input_arity());
            assert!(neuron.weights().iter().all(|w| WEIGHT_RANGE.contains(w)));
            assert!(BIAS_RANGE.contains(&neuron.bias()));
        }
    }

    #[test]
    fn test_feed_is_sigmoid_of_weighted_sum() {
        let weights = vec![1.0, -2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 3.0];
        let neuron = Neuron::new(Layer::Output, 0.5, weights).unwrap();
        let inputs = [1.0, 1.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 0.5];
        let expected = sigmoid(0.5 + 1.0 - 2.0 + 1.5);
        assert!((neuron.feed(&inputs).unwrap() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_feed_is_pure() {
        let mut rng = rng();
        let neuron = Neuron::random(Layer::Input, &mut rng);
        let inputs = [0.001, 0.01, 0.0, 0.001, 0.0, 0.0, 0.01, 0.0, 0.0, 0.001];
        let first = neuron.feed(&inputs).unwrap();
        for _ in 0..10 {
            assert_eq!(neuron.feed(&inputs).unwrap().to_bits(), first.to_bits());
        }
    }

    #[test]
    fn test_feed_rejects_wrong_arity() {
        let mut rng = rng();
        let neuron = Neuron::random(Layer::Output, &mut rng);
        assert_eq!(
            neuron.feed(&[0.0; 10]),
            Err(DimensionMismatchError {
                expected: 9,
                actual: 10
            })
        );
    }

    #[test]
    fn test_new_rejects_wrong_arity() {
        assert!(Neuron::new(Layer::Input, 0.0, vec![0.0; 9]).is_err());
        assert!(Neuron::new(Layer::Output, 0.0, vec![0.0; 9]).is_ok());
    }

    #[test]
    fn test_flip_sign_touches_only_selected_weight() {
        let mut rng = rng();
        let mut neuron = Neuron::random(Layer::Hidden, &mut rng);
        let before = neuron.clone();
        neuron.apply_mutation(MutationKind::FlipSign, 3, false, &mut rng);
        for (i, (a, b)) in before.weights().iter().zip(neuron.weights()).enumerate() {
            if i == 3 {
                assert_eq!(*b, -*a);
            } else {
                assert_eq!(a, b);
            }
        }
        assert_eq!(before.bias(), neuron.bias());

        neuron.apply_mutation(MutationKind::FlipSign, 3, true, &mut rng);
        assert_eq!(neuron.bias(), -before.bias());
        assert_eq!(neuron.weights(), before.weights());
    }

    #[test]
    fn test_swap_exchanges_two_weights() {
        let mut rng = rng();
        let weights = (0..9_u8).map(f32::from).collect::<Vec<_>>();
        let mut neuron = Neuron::new(Layer::Output, 1.0, weights.clone()).unwrap();
        neuron.apply_mutation(MutationKind::Swap, 4, true, &mut rng);
        let moved = neuron
            .weights()
            .iter()
            .zip(&weights)
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(moved, 2);
        assert_ne!(neuron.weights()[4], 4.0);
        assert_eq!(neuron.bias(), 1.0);
        let mut sorted = neuron.weights().to_vec();
        sorted.sort_by(f32::total_cmp);
        assert_eq!(sorted, weights);
    }

    #[test]
    fn test_regenerate_keeps_arity() {
        let mut rng = rng();
        let mut neuron = Neuron::new(Layer::Input, 100.0, vec![5.0; 10]).unwrap();
        neuron.apply_mutation(MutationKind::Regenerate, 0, true, &mut rng);
        assert_eq!(neuron.weights().len(), 10);
        assert!(neuron.weights().iter().all(|w| WEIGHT_RANGE.contains(w)));
        assert!(BIAS_RANGE.contains(&neuron.bias()));
    }

    #[test]
    fn test_mutate_never_resizes() {
        let mut rng = rng();
        for layer in Layer::ALL {
            let mut neuron = Neuron::random(layer, &mut rng);
            for _ in 0..200 {
                neuron.mutate(&mut rng);
                assert_eq!(neuron.weights().len(), layer.input_arity());
            }
        }
    }

    #[test]
    fn test_mutation_kinds_are_uniform() {
        let mut rng = rng();
        let mut counts = [0_usize; 6];
        for _ in 0..6000 {
            let kind = MutationKind::random(&mut rng);
            let i = MutationKind::ALL.iter().position(|k| *k == kind).unwrap();
            counts[i] += 1;
        }
        assert!(counts.iter().all(|c| (800..1200).contains(c)), "{counts:?}");
    }

    #[test]
    fn test_mutate_rolls_bias_independently() {
        const TRIALS: u32 = 12_000;
        let mut rng = rng();
        let mut bias_changed = 0_u32;
        let mut single_weight_hits = [0_u32; 10];
        for _ in 0..TRIALS {
            let mut neuron = Neuron::random(Layer::Hidden, &mut rng);
            let before = neuron.clone();
            neuron.mutate(&mut rng);

            if neuron.bias().to_bits() != before.bias().to_bits() {
                bias_changed += 1;
            }
            let changed = before
                .weights()
                .iter()
                .zip(neuron.weights())
                .enumerate()
                .filter(|(_, (a, b))| a.to_bits() != b.to_bits())
                .map(|(i, _)| i)
                .collect::<Vec<_>>();
            // replace, scale, offset and flip sign touch only the selected weight
            if let [index] = changed[..] {
                single_weight_hits[index] += 1;
            }
        }

        // half of the five kinds with a bias counterpart; swap never touches it
        let share = f64::from(bias_changed) / f64::from(TRIALS);
        assert!((share - 0.5 * 5.0 / 6.0).abs() < 0.03, "bias share {share}");

        let total = single_weight_hits.iter().sum::<u32>();
        assert!((7_500..8_500).contains(&total), "{total}");
        assert!(
            single_weight_hits.iter().all(|c| (650..950).contains(c)),
            "{single_weight_hits:?}"
        );
    }
}
