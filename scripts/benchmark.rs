// scripts/benchmark.rs
use bsm_mc::analytics::bs_analytic;
use bsm_mc::config::{MarketParams, McConfig, SeedSource, SimConfig};
use bsm_mc::math_utils::Timer;
use bsm_mc::mc::Engine;
use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

#[derive(Debug)]
struct SystemInfo {
    os: String,
    cpu_model: String,
    cpu_cores: usize,
    rustc_flags: String,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        SystemInfo {
            os: env::consts::OS.to_string(),
            cpu_model: Self::get_cpu_model(),
            cpu_cores: num_cpus::get(),
            rustc_flags: env::var("RUSTFLAGS").unwrap_or_else(|_| "default".to_string()),
            rayon_threads: rayon::current_num_threads(),
        }
    }

    fn get_cpu_model() -> String {
        #[cfg(target_os = "linux")]
        {
            std::fs::read_to_string("/proc/cpuinfo")
                .ok()
                .and_then(|content| {
                    content
                        .lines()
                        .find(|line| line.starts_with("model name"))
                        .and_then(|line| line.split(':').nth(1))
                        .map(|s| s.trim().to_string())
                })
                .unwrap_or_else(|| "Unknown CPU".to_string())
        }

        #[cfg(not(target_os = "linux"))]
        {
            "Unknown CPU".to_string()
        }
    }
}

#[derive(Debug)]
struct BenchmarkResult {
    engine: Engine,
    paths: usize,
    time_ms: f64,
    throughput_paths_per_sec: f64,
    value: f64,
    std_error: f64,
    relative_error: f64,
}

fn run_engine_benchmarks() -> Vec<BenchmarkResult> {
    let mut results = Vec::new();
    let market = MarketParams::default();
    let analytic_price =
        bs_analytic::bs_call_price(market.s0, market.k, market.r, market.sigma, market.t);

    let paths_configs = [10_000, 100_000, 250_000];

    for &paths in &paths_configs {
        println!("Running benchmarks with {} paths...", paths);

        let cfg = McConfig::new(
            market,
            SimConfig {
                paths,
                seed: SeedSource::Fixed(42),
                ..Default::default()
            },
        );

        for engine in [Engine::Full, Engine::Fast] {
            let timer = Timer::new();
            let estimate = match engine.price(&cfg) {
                Ok(estimate) => estimate,
                Err(e) => {
                    eprintln!("{} engine failed with {} paths: {}", engine.name(), paths, e);
                    continue;
                }
            };
            let time_ms = timer.elapsed_ms();

            results.push(BenchmarkResult {
                engine,
                paths,
                time_ms,
                throughput_paths_per_sec: paths as f64 / (time_ms / 1000.0),
                value: estimate.price,
                std_error: estimate.std_error(),
                relative_error: (estimate.price - analytic_price).abs() / analytic_price,
            });
        }
    }

    results
}

fn write_results_to_csv(
    results: &[BenchmarkResult],
    system_info: &SystemInfo,
    filename: &str,
) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);

    // System information as comments
    writeln!(file, "# System Information")?;
    writeln!(file, "# OS: {}", system_info.os)?;
    writeln!(file, "# CPU: {}", system_info.cpu_model)?;
    writeln!(file, "# CPU Cores: {}", system_info.cpu_cores)?;
    writeln!(file, "# RUSTFLAGS: {}", system_info.rustc_flags)?;
    writeln!(file, "# Rayon Threads: {}", system_info.rayon_threads)?;
    writeln!(
        file,
        "# Benchmark Date: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(file, "#")?;

    writeln!(
        file,
        "Engine,Paths,Time_ms,Throughput_paths_per_sec,Value,Std_Error,Relative_Error"
    )?;

    for result in results {
        writeln!(
            file,
            "{},{},{:.2},{:.0},{:.6},{:.6},{:.6}",
            result.engine.name(),
            result.paths,
            result.time_ms,
            result.throughput_paths_per_sec,
            result.value,
            result.std_error,
            result.relative_error
        )?;
    }

    file.flush()
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    println!("bsm-mc Engine Benchmark");
    println!("=======================\n");

    let system_info = SystemInfo::gather();
    println!("System Information:");
    println!("  OS: {}", system_info.os);
    println!("  CPU: {}", system_info.cpu_model);
    println!("  CPU Cores: {}", system_info.cpu_cores);
    println!("  RUSTFLAGS: {}", system_info.rustc_flags);
    println!("  Rayon Threads: {}", system_info.rayon_threads);
    println!();

    let results = run_engine_benchmarks();

    println!("\n{:=<80}", "");
    println!("BENCHMARK RESULTS");
    println!("{:=<80}", "");
    println!(
        "{:<8} {:>8} {:>12} {:>15} {:>10} {:>10} {:>10}",
        "Engine", "Paths", "Time (ms)", "Throughput", "Value", "Std Err", "Rel Error"
    );
    println!("{:-<80}", "");

    for result in &results {
        println!(
            "{:<8} {:>8} {:>12.2} {:>15.0} {:>10.4} {:>10.4} {:>9.2}%",
            result.engine.name(),
            result.paths,
            result.time_ms,
            result.throughput_paths_per_sec,
            result.value,
            result.std_error,
            result.relative_error * 100.0
        );
    }
    println!("{:=<80}", "");

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!("benchmark_results_{}.csv", timestamp);
    match write_results_to_csv(&results, &system_info, &filename) {
        Ok(()) => {
            println!("Results written to {}", filename);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Could not write {}: {}", filename, e);
            ExitCode::FAILURE
        }
    }
}
