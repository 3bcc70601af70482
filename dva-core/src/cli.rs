//! Command-line interface definitions (C9): one subcommand per engine plus
//! the analysis utilities, sharing a single `--config <path>` campaign file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(author, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the campaign JSON configuration file.
    #[arg(long, global = true)]
    pub config: PathBuf,

    /// Base RNG seed; benchmark runs use `seed + run_index`.
    #[arg(long, default_value_t = 0, global = true)]
    pub seed: u64,

    /// Emit structured per-generation progress as JSON lines to stderr.
    #[arg(long, default_value_t = false, global = true)]
    pub progress_json: bool,

    /// Optional path to write the benchmark/analysis snapshot as JSON.
    #[arg(long, global = true)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the genetic algorithm engine.
    RunGa {
        #[arg(long, default_value_t = 50)]
        population: usize,
        #[arg(long, default_value_t = 100)]
        generations: usize,
        #[arg(long, default_value_t = 1)]
        runs: usize,
    },
    /// Run the particle swarm optimization engine.
    RunPso {
        #[arg(long, default_value_t = 40)]
        particles: usize,
        #[arg(long, default_value_t = 150)]
        iterations: usize,
        #[arg(long, default_value_t = 1)]
        runs: usize,
    },
    /// Run the differential evolution engine.
    RunDe {
        #[arg(long, default_value_t = 15)]
        popsize: usize,
        #[arg(long, default_value_t = 500)]
        maxiter: usize,
        #[arg(long, default_value_t = 1)]
        runs: usize,
        /// DE mutation strategy (e.g. "rand1bin", "best1bin", "current-to-best1exp").
        #[arg(long, default_value = "rand1bin")]
        strategy: String,
    },
    /// Run the simulated annealing engine.
    RunSa {
        #[arg(long, default_value_t = 5000)]
        iterations: usize,
        #[arg(long, default_value_t = 1)]
        runs: usize,
    },
    /// Run the CMA-ES engine.
    RunCmaes {
        #[arg(long, default_value_t = 150)]
        generations: usize,
        #[arg(long, default_value_t = 1)]
        runs: usize,
    },
    /// Run the NSGA-II multi-objective engine.
    RunNsga2 {
        #[arg(long, default_value_t = 48)]
        population: usize,
        #[arg(long, default_value_t = 80)]
        generations: usize,
    },
    /// Run a Sobol sensitivity analysis over the campaign's bounds.
    RunSobol {
        /// Comma-separated list of sample budgets to sweep (e.g. "64,256,1024").
        #[arg(long, value_delimiter = ',', default_value = "256")]
        sample_sizes: Vec<usize>,
    },
    /// Evaluate the FRF for the campaign's main parameters at a fixed x.
    RunFrf,
    /// Run the omega-points convergence search.
    RunOmegaConv {
        #[arg(long, default_value_t = 50)]
        initial_points: usize,
        #[arg(long, default_value_t = 5000)]
        max_points: usize,
        #[arg(long, default_value_t = 50)]
        step: usize,
        #[arg(long, default_value_t = 0.01)]
        threshold: f64,
        #[arg(long, default_value_t = 50)]
        max_iter: usize,
        #[arg(long, default_value_t = 0)]
        mass_of_interest: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_ga_with_defaults() {
        let args = Args::parse_from(["dva", "--config", "campaign.json", "run-ga"]);
        assert_eq!(args.config, PathBuf::from("campaign.json"));
        match args.command {
            Command::RunGa { population, generations, runs } => {
                assert_eq!(population, 50);
                assert_eq!(generations, 100);
                assert_eq!(runs, 1);
            }
            _ => panic!("expected RunGa"),
        }
    }

    #[test]
    fn parses_overridden_pso_options() {
        let args = Args::parse_from(["dva", "--config", "c.json", "run-pso", "--particles", "10", "--runs", "3"]);
        match args.command {
            Command::RunPso { particles, runs, .. } => {
                assert_eq!(particles, 10);
                assert_eq!(runs, 3);
            }
            _ => panic!("expected RunPso"),
        }
    }

    #[test]
    fn parses_sobol_sample_sizes_list() {
        let args = Args::parse_from(["dva", "--config", "c.json", "run-sobol", "--sample-sizes", "64,256,1024"]);
        match args.command {
            Command::RunSobol { sample_sizes } => assert_eq!(sample_sizes, vec![64, 256, 1024]),
            _ => panic!("expected RunSobol"),
        }
    }

    #[test]
    fn parses_de_strategy_flag() {
        let args = Args::parse_from(["dva", "--config", "c.json", "run-de", "--strategy", "best1bin"]);
        match args.command {
            Command::RunDe { strategy, .. } => assert_eq!(strategy, "best1bin"),
            _ => panic!("expected RunDe"),
        }
    }

    #[test]
    fn missing_config_is_rejected() {
        let res = Args::try_parse_from(["dva", "run-ga"]);
        assert!(res.is_err());
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let args = Args::parse_from(["dva", "--config", "c.json", "--seed", "7", "run-sobol"]);
        assert_eq!(args.seed, 7);
    }
}
