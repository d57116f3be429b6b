use serde::Serialize;

/// Summary of a population's fitness values for one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitnessStats {
    /// The lowest fitness.
    pub min: f32,
    /// The highest fitness.
    pub max: f32,
    /// The arithmetic mean of all fitness values.
    pub mean: f32,
}

impl FitnessStats {
    /// Computes statistics over `values`.
    ///
    /// Returns `None` if `values` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tictactio_training::FitnessStats;
    /// let stats = FitnessStats::new([30.0, -40.0, 15.0, 5.0]).unwrap();
    /// assert_eq!(stats.min, -40.0);
    /// assert_eq!(stats.max, 30.0);
    /// assert_eq!(stats.mean, 2.5);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut count = 0_u32;
        let mut sum = 0.0_f64;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for value in values {
            count += 1;
            sum += f64::from(value);
            min = min.min(value);
            max = max.max(value);
        }
        if count == 0 {
            return None;
        }
        #[expect(clippy::cast_possible_truncation)]
        let mean = (sum / f64::from(count)) as f32;
        Some(Self { min, max, mean })
    }
}
