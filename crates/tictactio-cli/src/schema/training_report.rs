use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tictactio_training::{TrainerConfig, TrainingOutcome};

/// Summary written next to a trained network by `tictactio train --report`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrainingReport {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub outcome: TrainingOutcome,
    pub generations: usize,
    pub final_fitness: f32,
    /// Where the network was exported; `None` when it went to stdout.
    pub network_path: Option<PathBuf>,
    pub config: TrainerConfig,
}
