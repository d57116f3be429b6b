use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Context;
use chrono::Utc;
use tictactio_training::{StopFlag, Trainer, TrainerConfig};

use crate::{
    schema::training_report::TrainingReport,
    util::{self, Output},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Trainer configuration file (JSON); flags below override it
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Initial size of each population
    #[arg(long)]
    pub(crate) population: Option<usize>,
    /// Stop after the best fitness is unchanged for this many generations
    #[arg(long)]
    pub(crate) gen_same_max: Option<usize>,
    /// Stop after this many generations
    #[arg(long)]
    pub(crate) gen_stop: Option<usize>,
    /// Number of worker threads
    #[arg(long)]
    pub(crate) workers: Option<usize>,
    /// Seed for a reproducible run
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Stop at the first generation boundary after this many seconds
    #[arg(long)]
    pub(crate) time_limit: Option<u64>,
    /// Output file for the trained network
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Output file for the training report (JSON)
    #[arg(long)]
    pub(crate) report: Option<PathBuf>,
    /// Name recorded in the training report
    #[arg(long, default_value = "tictactio")]
    pub(crate) name: String,
}

impl TrainArg {
    fn trainer_config(&self) -> anyhow::Result<TrainerConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_json_file::<TrainerConfig, _>("trainer config", path)?,
            None => TrainerConfig::default(),
        };
        if let Some(n) = self.population {
            config.population_size = n;
        }
        if let Some(n) = self.gen_same_max {
            config.gen_same_max = n;
        }
        if let Some(n) = self.gen_stop {
            config.gen_stop = n;
        }
        if let Some(n) = self.workers {
            config.workers = Some(n);
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        Ok(config)
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = arg.trainer_config()?;
    let trainer = Trainer::new(config).context("Invalid trainer configuration")?;

    let stop = StopFlag::new();
    let deadline = arg
        .time_limit
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    tracing::info!(
        config = ?trainer.config(),
        time_limit = ?arg.time_limit,
        "training started"
    );
    let result = trainer.train_with(&stop, |report| {
        eprintln!(
            "Generation #{}: best {:.3}, plateau {}, sizes {:?}",
            report.generation, report.best_fitness, report.plateau, report.sizes
        );
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            tracing::warn!(generation = report.generation, "time limit reached, stopping");
            stop.stop();
        }
    });

    let network_output = Output::create(arg.output.as_deref())?;
    tracing::info!(destination = %network_output.target(), "saving fittest network");
    network_output.write_network(&result.fittest)?;

    let report = TrainingReport {
        name: arg.name.clone(),
        trained_at: Utc::now(),
        outcome: result.outcome,
        generations: result.generations,
        final_fitness: result.fittest.fitness(),
        network_path: arg.output.clone(),
        config,
    };
    if let Some(path) = &arg.report {
        Output::create(Some(path))?.write_json("training report", &report)?;
    }

    eprintln!();
    eprintln!("Training {} after {} generations", report.outcome, report.generations);
    if let Some(path) = &arg.output {
        eprintln!("  Network: {}", path.display());
    }
    if let Some(path) = &arg.report {
        eprintln!("  Report: {}", path.display());
    }
    eprintln!("  Trained at: {}", report.trained_at);
    eprintln!("  Final fitness: {:.3}", report.final_fitness);

    Ok(())
}
