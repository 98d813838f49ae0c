use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use epifit::calibration::{
    evaluate_detailed, evaluate_seir, summarize, sweep, Orientation, RayonExecutor, RunConfig,
    SeirsvbhEvaluator, SerialExecutor,
};
use epifit::io::debug_log::write_trajectory_log;
use epifit::io::grid_artifact::{load_error_grid, save_error_grid};
use epifit::io::reported_csv::load_reported_csv;

#[derive(Parser)]
#[command(name = "epifit")]
#[command(about = "Fit an SEIRSVBH model to reported daily series via the inverse data problem")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a single (xi, c) pair
    Evaluate {
        /// Reported data CSV
        #[arg(long)]
        data: String,
        /// Run config JSON (initial conditions + sweep settings)
        #[arg(long)]
        config: String,
        #[arg(long)]
        xi: f64,
        #[arg(long, allow_hyphen_values = true)]
        c: f64,
        /// Directory for the trajectory log
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },
    /// Evaluate the plain SEIR reference model
    Seir {
        #[arg(long)]
        data: String,
        #[arg(long)]
        config: String,
    },
    /// Sweep the configured (xi, c) grid and save the error grid
    Sweep {
        #[arg(long)]
        data: String,
        #[arg(long)]
        config: String,
        /// Output error-grid JSON
        #[arg(long)]
        out: PathBuf,
        /// Override max_workers from the config (1 runs serially)
        #[arg(long)]
        workers: Option<usize>,
        #[arg(long, value_enum)]
        orientation: Option<OrientationArg>,
        /// Column half-width of the neighborhood scans
        #[arg(long)]
        window: Option<usize>,
    },
    /// Summarize a saved error grid
    Summarize {
        #[arg(long)]
        grid: PathBuf,
        #[arg(long)]
        window: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Rows,
    Columns,
    Auto,
}

impl From<OrientationArg> for Orientation {
    fn from(o: OrientationArg) -> Self {
        match o {
            OrientationArg::Rows => Orientation::Rows,
            OrientationArg::Columns => Orientation::Columns,
            OrientationArg::Auto => Orientation::Auto,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate { data, config, xi, c, log_dir } => {
            let cfg = RunConfig::from_path(&config)?;
            let reported = load_reported_csv(&data, cfg.initial)?;
            let psi = cfg.sweep.psi.build();
            let report = evaluate_detailed(xi, c, cfg.sweep.h, psi.as_ref(), &reported, &cfg.sweep.ode_options())
                .with_context(|| format!("evaluation failed at xi={}, c={}", xi, c))?;
            println!("xi={} c={} rel_l2={:.6e} rel_linf={:.6e}", xi, c, report.errors.l2, report.errors.linf);
            println!("warnings={}", report.diagnostics.warnings().count());
            if let Some(dir) = log_dir {
                let path = write_trajectory_log(dir, &format!("xi{}_c{}", xi, c), xi, c, cfg.sweep.h, &report.model)?;
                println!("trajectory log: {}", path.display());
            }
        }
        Commands::Seir { data, config } => {
            let cfg = RunConfig::from_path(&config)?;
            let reported = load_reported_csv(&data, cfg.initial)?;
            let errors = evaluate_seir(&reported, cfg.sweep.h, &cfg.sweep.ode_options())?;
            println!("seir rel_l2={:.6e} rel_linf={:.6e}", errors.l2, errors.linf);
        }
        Commands::Sweep { data, config, out, workers, orientation, window } => {
            let cfg = RunConfig::from_path(&config)?;
            let reported = load_reported_csv(&data, cfg.initial)?;
            let psi = cfg.sweep.psi.build();
            let evaluator = SeirsvbhEvaluator {
                data: &reported,
                h: cfg.sweep.h,
                psi: psi.as_ref(),
                opts: cfg.sweep.ode_options(),
            };
            let xi = cfg.sweep.xi.values();
            let c = cfg.sweep.c.values();
            let orientation = orientation.map(Orientation::from).unwrap_or(cfg.sweep.orientation);
            let workers = workers.unwrap_or(cfg.sweep.max_workers);

            let outcome = if workers <= 1 {
                sweep(&xi, &c, &evaluator, &SerialExecutor, orientation)?
            } else {
                sweep(&xi, &c, &evaluator, &RayonExecutor::new(workers), orientation)?
            };
            println!(
                "swept {} x {} cells (parallel={}, workers={})",
                xi.len(),
                c.len(),
                outcome.used_parallel,
                outcome.workers_used
            );
            save_error_grid(&out, &outcome.grid)?;
            println!("error grid: {}", out.display());
            print!("{}", summarize(&outcome.grid, window.or(cfg.sweep.window_c)));
        }
        Commands::Summarize { grid, window } => {
            let grid = load_error_grid(&grid)?;
            print!("{}", summarize(&grid, window));
        }
    }

    Ok(())
}
