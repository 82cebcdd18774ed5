// scripts/price.rs
//! Price the European call with both engines and export sample paths
//!
//! ```text
//! cargo run --release --bin price -- --seed 42 --engine both
//! RUST_LOG=bsm_mc=debug cargo run --release --bin price -- --config run.toml
//! ```

use bsm_mc::analytics::bs_analytic;
use bsm_mc::config::{McConfig, SeedSource};
use bsm_mc::math_utils::timed;
use bsm_mc::mc::{simulate_full_paths, simulate_terminal_fast, Engine};
use bsm_mc::output::{export_sample_paths, DEFAULT_PATHS_FILE, SAMPLE_PATH_ROWS};
use bsm_mc::report::{ReportFlags, RunReport};
use bsm_mc::McResult;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum EngineChoice {
    Full,
    Fast,
    Both,
}

/// Monte Carlo price of a European call under Black-Scholes-Merton
#[derive(Parser, Debug)]
#[command(name = "price")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML file with [market] and [sim] tables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of simulated paths (I)
    #[arg(short, long)]
    paths: Option<usize>,

    /// Number of time steps per path (M)
    #[arg(short, long)]
    steps: Option<usize>,

    /// Fixed base seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads (defaults to rayon's global pool)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Run all batches on the calling thread
    #[arg(long)]
    sequential: bool,

    /// Which engine(s) to run
    #[arg(short, long, value_enum, default_value_t = EngineChoice::Both)]
    engine: EngineChoice,

    /// Where to write the first sample paths of the full simulation
    #[arg(long, default_value = DEFAULT_PATHS_FILE)]
    export: PathBuf,

    /// Skip the sample path export
    #[arg(long)]
    no_export: bool,

    /// Also report standard error and the closed-form price
    #[arg(short, long)]
    verbose: bool,
}

fn build_config(cli: &Cli) -> McResult<McConfig> {
    let mut cfg = match &cli.config {
        Some(path) => McConfig::from_path(path)?,
        None => McConfig::default(),
    };

    if let Some(paths) = cli.paths {
        cfg.sim.paths = paths;
    }
    if let Some(steps) = cli.steps {
        cfg.sim.steps = steps;
    }
    if let Some(seed) = cli.seed {
        cfg.sim.seed = SeedSource::Fixed(seed);
    }
    if cli.threads.is_some() {
        cfg.sim.threads = cli.threads;
    }
    if cli.sequential {
        cfg.sim.parallel = false;
    }

    cfg.validate()?;
    Ok(cfg)
}

fn run(cli: &Cli) -> McResult<()> {
    let cfg = build_config(cli)?;
    let m = &cfg.market;
    info!(
        s0 = m.s0,
        k = m.k,
        t = m.t,
        r = m.r,
        sigma = m.sigma,
        paths = cfg.sim.paths,
        steps = cfg.sim.steps,
        "pricing European call"
    );

    let flags = if cli.verbose {
        ReportFlags::all()
    } else {
        ReportFlags::default()
    };
    let reference = bs_analytic::bs_call_price(m.s0, m.k, m.r, m.sigma, m.t);

    if matches!(cli.engine, EngineChoice::Full | EngineChoice::Both) {
        let (result, secs) = timed(|| simulate_full_paths(&cfg));
        let sim = result?;
        let report = RunReport::new(Engine::Full, sim.estimate)
            .with_elapsed(secs)
            .with_reference(reference);
        for line in report.lines(flags) {
            println!("{}", line);
        }
        info!(seed = sim.estimate.seed, "full simulation seed");

        if !cli.no_export {
            export_sample_paths(&cli.export, &sim.paths)?;
            info!(
                rows = SAMPLE_PATH_ROWS.min(sim.paths.n_paths()),
                file = %cli.export.display(),
                "sample paths exported"
            );
        }
    }

    if matches!(cli.engine, EngineChoice::Fast | EngineChoice::Both) {
        let (result, secs) = timed(|| simulate_terminal_fast(&cfg));
        let estimate = result?;
        let report = RunReport::new(Engine::Fast, estimate)
            .with_elapsed(secs)
            .with_reference(reference);
        for line in report.lines(flags) {
            println!("{}", line);
        }
        info!(seed = estimate.seed, "fast simulation seed");
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
