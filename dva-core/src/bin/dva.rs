//! DVA - Dynamic Vibration Absorber parameter optimization campaigns
//!
//! Copyright (C) 2025 Pierre Aubert pierre(at)spinorama(dot)org
//!
//! This program is free software: you can redistribute it and/or modify
//! it under the terms of the GNU General Public License as published by
//! the Free Software Foundation, either version 3 of the License, or
//! (at your option) any later version.
//!
//! This program is distributed in the hope that it will be useful,
//! but WITHOUT ANY WARRANTY; without even the implied warranty of
//! MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//! GNU General Public License for more details.
//!
//! You should have received a copy of the GNU General Public License
//! along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::error::Error;
use std::fs;
use std::sync::Arc;

use clap::Parser;
use ndarray::Array1;

use dva_core::benchmark::{run_benchmark, snapshot_to_json};
use dva_core::cli::{Args, Command};
use dva_core::config::{parse_campaign, validate_campaign_or_exit};
use dva_core::engines::{AbortFlag, Engine, Problem, ProgressSink};
use dva_core::fitness::FitnessContext;
use dva_core::omega_conv::{run_omega_convergence, OmegaConvConfig};
use dva_core::sobol::run_sobol_sweep;
use dva_model::{linspace, N_DVA};

fn install_abort_handler() -> Result<AbortFlag, Box<dyn Error>> {
    let abort = AbortFlag::new();
    let abort_handler = abort.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nreceived interrupt signal, stopping after the current generation...");
        abort_handler.set();
    })?;
    Ok(abort)
}

fn build_problem(
    ctx: Arc<FitnessContext>,
    bounds: Vec<(f64, f64)>,
    parameter_names: Vec<String>,
) -> Problem {
    let fixed_mask: Vec<bool> = bounds.iter().map(|(lo, hi)| (hi - lo).abs() < f64::EPSILON).collect();
    Problem {
        bounds,
        fixed_mask,
        parameter_names,
        fit: Arc::new(move |x: &Array1<f64>| ctx.fitness(x)),
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let threads = dva_env::thread_count()?;
    rayon::ThreadPoolBuilder::new().num_threads(threads).build_global().ok();

    let json = fs::read_to_string(&args.config)?;
    let campaign = parse_campaign(&json)?;
    let (main, bounds, targets, weights) = validate_campaign_or_exit(&campaign);
    let omega = linspace(campaign.frequency.start, campaign.frequency.end, campaign.frequency.points);
    let parameter_names: Vec<String> = campaign.parameters.iter().map(|p| p.name.clone()).collect();

    let ctx = Arc::new(FitnessContext::new(main.clone(), omega.clone(), targets, weights, campaign.sparsity_alpha));
    let problem = build_problem(Arc::clone(&ctx), bounds.clone(), parameter_names.clone());

    let abort = install_abort_handler()?;
    let progress = ProgressSink::default();

    match args.command {
        Command::RunGa { population, generations, runs } => {
            let engine = Engine::Ga(dva_core::engines::ga::GaConfig { population, generations, ..Default::default() });
            let snapshot = run_benchmark("ga", &engine, &problem, runs, args.seed, 1.0, &progress, &abort);
            emit_snapshot(&snapshot, args.output.as_deref())?;
        }
        Command::RunPso { particles, iterations, runs } => {
            let engine = Engine::Pso(dva_core::engines::pso::PsoConfig { particles, iterations, ..Default::default() });
            let snapshot = run_benchmark("pso", &engine, &problem, runs, args.seed, 1.0, &progress, &abort);
            emit_snapshot(&snapshot, args.output.as_deref())?;
        }
        Command::RunDe { popsize, maxiter, runs, strategy } => {
            let engine = Engine::De(dva_core::engines::de::DeConfig { popsize, maxiter, strategy, ..Default::default() });
            let snapshot = run_benchmark("de", &engine, &problem, runs, args.seed, 1.0, &progress, &abort);
            emit_snapshot(&snapshot, args.output.as_deref())?;
        }
        Command::RunSa { iterations, runs } => {
            let engine = Engine::Sa(dva_core::engines::sa::SaConfig { iterations, ..Default::default() });
            let snapshot = run_benchmark("sa", &engine, &problem, runs, args.seed, 1.0, &progress, &abort);
            emit_snapshot(&snapshot, args.output.as_deref())?;
        }
        Command::RunCmaes { generations, runs } => {
            let engine = Engine::CmaEs(dva_core::engines::cmaes::CmaEsConfig { generations, ..Default::default() });
            let snapshot = run_benchmark("cmaes", &engine, &problem, runs, args.seed, 1.0, &progress, &abort);
            emit_snapshot(&snapshot, args.output.as_deref())?;
        }
        Command::RunNsga2 { population, generations } => {
            let costs = vec![1.0; N_DVA];
            let cfg = dva_core::engines::nsga2::Nsga2Config {
                population,
                generations,
                ..dva_core::engines::nsga2::Nsga2Config::with_defaults(N_DVA, costs)
            };
            let record = dva_core::engines::nsga2::run_nsga2(
                &main,
                &omega,
                &ctx.targets,
                &ctx.weights,
                &bounds,
                &problem.fixed_mask,
                &parameter_names,
                &cfg,
                args.seed,
                &progress,
                &abort,
            );
            let json = serde_json::to_string_pretty(&record.pareto_front.iter().map(|ind| ind.x.to_vec()).collect::<Vec<_>>())?;
            if let Some(path) = args.output.as_deref() {
                fs::write(path, json)?;
            } else {
                println!("{json}");
            }
        }
        Command::RunSobol { sample_sizes } => {
            let ctx_clone = Arc::clone(&ctx);
            let model = move |x: &Array1<f64>| ctx_clone.fitness(x);
            let report = run_sobol_sweep(&model, &bounds, &sample_sizes, args.seed);
            let json = serde_json::to_string_pretty(&report)?;
            if let Some(path) = args.output.as_deref() {
                fs::write(path, json)?;
            } else {
                println!("{json}");
            }
        }
        Command::RunFrf => {
            let sys = dva_model::assemble(&main, &Array1::from_elem(N_DVA, 0.3))?;
            let frf = dva_model::sweep(&sys, &omega);
            let json = serde_json::to_string_pretty(&frf.magnitude.iter().map(|m| m.to_vec()).collect::<Vec<_>>())?;
            if let Some(path) = args.output.as_deref() {
                fs::write(path, json)?;
            } else {
                println!("{json}");
            }
        }
        Command::RunOmegaConv { initial_points, max_points, step, threshold, max_iter, mass_of_interest } => {
            let cfg = OmegaConvConfig {
                omega_start: campaign.frequency.start,
                omega_end: campaign.frequency.end,
                initial_points,
                max_points,
                step,
                threshold,
                max_iter,
                mass_of_interest,
            };
            let report = run_omega_convergence(&main, &Array1::from_elem(N_DVA, 0.3), &cfg)?;
            let json = serde_json::to_string_pretty(&report)?;
            if let Some(path) = args.output.as_deref() {
                fs::write(path, json)?;
            } else {
                println!("{json}");
            }
        }
    }

    Ok(())
}

fn emit_snapshot(snapshot: &dva_core::benchmark::BenchmarkSnapshot, output: Option<&std::path::Path>) -> Result<(), Box<dyn Error>> {
    let json = snapshot_to_json(snapshot)?;
    match output {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        if let Some(dva_err) = e.downcast_ref::<dva_core::DvaError>() {
            eprintln!("\u{274c} {dva_err}");
            std::process::exit(dva_err.exit_code());
        }
        eprintln!("\u{274c} {e}");
        std::process::exit(3);
    }
}
