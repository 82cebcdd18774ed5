//! Monte Carlo engines for the European call
//!
//! # Strategies
//!
//! - [`simulate_full_paths`]: keeps every price of every path in a
//!   [`PathMatrix`] (O(M) memory per path) for inspection or export
//! - [`simulate_terminal_fast`]: keeps only the running log-return sum of
//!   the current path (O(1) memory per path) and returns the estimate alone
//!
//! # Work Partitioning
//!
//! Paths are grouped into contiguous batches of `batch_size`. Batch `b`
//! draws from `RngFactory::stream(b)` and fills a private
//! [`PayoffAccumulator`]; the partial accumulators are merged in batch
//! order once all batches are done. Consequences:
//! - no shared mutable state inside the parallel region
//! - for a fixed seed the estimate is bit-identical across thread counts
//!   and between parallel and sequential execution
//! - both engines consume the streams identically, so for the same seed
//!   their terminal prices (and estimates) agree up to rounding

use crate::config::{McConfig, SimConfig};
use crate::error::{McError, McResult};
use crate::mc::accumulator::{McEstimate, PayoffAccumulator};
use crate::mc::paths::{evolve_path, terminal_price_log_sum, PathMatrix, StepCoefficients};
use crate::mc::payoffs::EuropeanCall;
use crate::rng::RngFactory;
use rayon::prelude::*;
use tracing::{debug, warn};

/// Output of the full path simulator
#[derive(Clone, Debug)]
pub struct FullSimulation {
    pub paths: PathMatrix,
    pub estimate: McEstimate,
}

/// Choice between the two interchangeable pricing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Engine {
    /// Retains the complete path matrix
    Full,
    /// Memory-light terminal-price-only simulation
    #[default]
    Fast,
}

impl Engine {
    pub fn name(&self) -> &'static str {
        match self {
            Engine::Full => "full",
            Engine::Fast => "fast",
        }
    }

    /// Price the call, discarding any path history
    pub fn price(&self, cfg: &McConfig) -> McResult<McEstimate> {
        match self {
            Engine::Full => simulate_full_paths(cfg).map(|sim| sim.estimate),
            Engine::Fast => simulate_terminal_fast(cfg),
        }
    }
}

/// Shared per-run state derived from a validated configuration
struct RunSetup {
    factory: RngFactory,
    coeffs: StepCoefficients,
    call: EuropeanCall,
    batch: usize,
}

impl RunSetup {
    fn new(cfg: &McConfig, engine: Engine) -> McResult<Self> {
        cfg.validate()?;
        let seed = cfg.sim.seed.resolve();
        let batch = cfg.sim.batch_size.min(cfg.sim.paths);

        debug!(
            engine = engine.name(),
            paths = cfg.sim.paths,
            steps = cfg.sim.steps,
            batches = cfg.sim.n_batches(),
            parallel = cfg.sim.parallel,
            seed,
            "starting simulation"
        );

        Ok(RunSetup {
            factory: RngFactory::new(seed),
            coeffs: StepCoefficients::new(&cfg.market, cfg.sim.steps),
            call: EuropeanCall::new(cfg.market.k),
            batch,
        })
    }

    fn finish(
        &self,
        cfg: &McConfig,
        engine: Engine,
        partials: Vec<PayoffAccumulator>,
    ) -> McEstimate {
        let total = partials
            .into_iter()
            .fold(PayoffAccumulator::new(), PayoffAccumulator::merge);
        let estimate = total.finish(
            cfg.market.discount_factor(),
            cfg.sim.steps,
            self.factory.base_seed(),
        );

        if estimate.price.is_finite() {
            debug!(
                engine = engine.name(),
                price = estimate.price,
                std_error = estimate.std_error(),
                "simulation finished"
            );
        } else {
            warn!(
                engine = engine.name(),
                price = estimate.price,
                sigma = cfg.market.sigma,
                t = cfg.market.t,
                "estimate overflowed to a non-finite value"
            );
        }
        estimate
    }
}

/// Run `job` on a dedicated pool when a thread count is configured
fn in_pool<T, F>(sim: &SimConfig, job: F) -> McResult<T>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    match sim.threads {
        Some(threads) if sim.parallel => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| McError::ThreadPool {
                    reason: e.to_string(),
                })?;
            Ok(pool.install(job))
        }
        _ => Ok(job()),
    }
}

/// Full path simulator
///
/// # Algorithm
///
/// For every path i: `paths[i][0] = S0`, then for t in 1..=M
/// ```text
/// paths[i][t] = paths[i][t-1] * exp((r - σ²/2)dt + σ√dt * Z)
/// ```
/// and the payoff `max(paths[i][M] - K, 0)` is accumulated.
///
/// # Errors
///
/// - invalid configuration
/// - [`McError::AllocationFailure`] when the I x (M+1) matrix cannot be
///   allocated; nothing is simulated in that case
pub fn simulate_full_paths(cfg: &McConfig) -> McResult<FullSimulation> {
    let setup = RunSetup::new(cfg, Engine::Full)?;
    let points = cfg.sim.steps + 1;
    let s0 = cfg.market.s0;

    let mut matrix = PathMatrix::try_zeros(cfg.sim.paths, points)?;
    let chunk_len = setup.batch * points;

    let fill_batch = |(batch_id, chunk): (usize, &mut [f64])| {
        let mut stream = setup.factory.stream(batch_id as u64);
        let mut acc = PayoffAccumulator::new();
        for row in chunk.chunks_exact_mut(points) {
            evolve_path(&setup.coeffs, s0, &mut stream, row);
            acc.add(setup.call.calculate(row));
        }
        acc
    };

    let parallel = cfg.sim.parallel;
    let data = matrix.as_mut_slice()?;
    let partials: Vec<PayoffAccumulator> = in_pool(&cfg.sim, || {
        if parallel {
            data.par_chunks_mut(chunk_len)
                .enumerate()
                .map(fill_batch)
                .collect()
        } else {
            data.chunks_mut(chunk_len).enumerate().map(fill_batch).collect()
        }
    })?;

    let estimate = setup.finish(cfg, Engine::Full, partials);
    Ok(FullSimulation {
        paths: matrix,
        estimate,
    })
}

/// Fast scalar simulator
///
/// # Algorithm
///
/// For every path only the log-return sum is kept:
/// ```text
/// log_sum = Σ_{t=1}^{M} [(r - σ²/2)dt + σ√dt * Z_t]
/// S_T     = S0 * exp(log_sum)
/// ```
/// Same draw count and stream layout as [`simulate_full_paths`], without
/// storing intermediate prices.
pub fn simulate_terminal_fast(cfg: &McConfig) -> McResult<McEstimate> {
    let setup = RunSetup::new(cfg, Engine::Fast)?;
    let paths = cfg.sim.paths;
    let steps = cfg.sim.steps;
    let s0 = cfg.market.s0;
    let n_batches = paths / setup.batch + usize::from(paths % setup.batch != 0);

    let run_batch = |batch_id: usize| {
        let start = batch_id * setup.batch;
        let len = setup.batch.min(paths - start);
        let mut stream = setup.factory.stream(batch_id as u64);
        let mut acc = PayoffAccumulator::new();
        for _ in 0..len {
            let terminal = terminal_price_log_sum(&setup.coeffs, s0, steps, &mut stream);
            acc.add(setup.call.payoff(terminal));
        }
        acc
    };

    let parallel = cfg.sim.parallel;
    let partials: Vec<PayoffAccumulator> = in_pool(&cfg.sim, || {
        if parallel {
            (0..n_batches).into_par_iter().map(run_batch).collect()
        } else {
            (0..n_batches).map(run_batch).collect()
        }
    })?;

    Ok(setup.finish(cfg, Engine::Fast, partials))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MarketParams, SeedSource};
    use approx::assert_relative_eq;

    fn small_config(seed: u64) -> McConfig {
        McConfig {
            market: MarketParams::default(),
            sim: SimConfig {
                steps: 10,
                paths: 5_000,
                seed: SeedSource::Fixed(seed),
                batch_size: 512,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_full_simulation_shape() {
        let cfg = small_config(1);
        let sim = simulate_full_paths(&cfg).expect("Valid configuration");

        assert_eq!(sim.paths.n_paths(), 5_000);
        assert_eq!(sim.paths.n_points(), 11);
        assert!(sim.paths.rows().all(|row| row[0] == 100.0));
        assert!(sim.paths.view().iter().all(|&s| s > 0.0));
        assert_eq!(sim.estimate.paths, 5_000);
        assert_eq!(sim.estimate.seed, 1);
    }

    #[test]
    fn test_full_estimate_matches_its_matrix() {
        let cfg = small_config(2);
        let sim = simulate_full_paths(&cfg).expect("Valid configuration");

        let payoff_sum: f64 = sim
            .paths
            .terminal_prices()
            .iter()
            .map(|&s| (s - cfg.market.k).max(0.0))
            .sum();
        let recomputed = cfg.market.discount_factor() * payoff_sum / cfg.sim.paths as f64;
        assert_relative_eq!(sim.estimate.price, recomputed, max_relative = 1e-10);
    }

    #[test]
    fn test_engines_agree_for_same_seed() {
        let cfg = small_config(3);
        let full = simulate_full_paths(&cfg).expect("Valid configuration");
        let fast = simulate_terminal_fast(&cfg).expect("Valid configuration");

        assert_relative_eq!(full.estimate.price, fast.price, max_relative = 1e-9);
        assert_eq!(full.estimate.seed, fast.seed);
    }

    #[test]
    fn test_parallel_and_sequential_are_bit_identical() {
        let parallel = small_config(4);
        let sequential = McConfig {
            sim: SimConfig {
                parallel: false,
                ..parallel.sim.clone()
            },
            ..parallel.clone()
        };
        let pooled = McConfig {
            sim: SimConfig {
                threads: Some(3),
                ..parallel.sim.clone()
            },
            ..parallel.clone()
        };

        for engine in [Engine::Full, Engine::Fast] {
            let a = engine.price(&parallel).expect("Valid configuration");
            let b = engine.price(&sequential).expect("Valid configuration");
            let c = engine.price(&pooled).expect("Valid configuration");
            assert_eq!(a.price.to_bits(), b.price.to_bits());
            assert_eq!(a.price.to_bits(), c.price.to_bits());
        }
    }

    #[test]
    fn test_ragged_last_batch() {
        let cfg = McConfig {
            sim: SimConfig {
                paths: 1_001,
                batch_size: 100,
                ..small_config(5).sim
            },
            ..small_config(5)
        };
        let full = simulate_full_paths(&cfg).expect("Valid configuration");
        let fast = simulate_terminal_fast(&cfg).expect("Valid configuration");

        assert_eq!(full.paths.n_paths(), 1_001);
        assert_eq!(full.estimate.paths, 1_001);
        assert_eq!(fast.paths, 1_001);
        assert_relative_eq!(full.estimate.price, fast.price, max_relative = 1e-9);
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        let cfg = McConfig {
            sim: SimConfig {
                steps: 0,
                ..small_config(6).sim
            },
            ..small_config(6)
        };
        assert!(simulate_full_paths(&cfg).is_err());
        assert!(simulate_terminal_fast(&cfg).is_err());
    }

    #[test]
    fn test_oversized_matrix_fails_before_simulating() {
        let cfg = McConfig {
            sim: SimConfig {
                paths: usize::MAX / 2,
                ..small_config(7).sim
            },
            ..small_config(7)
        };
        assert!(cfg.validate().is_ok());
        assert!(matches!(
            simulate_full_paths(&cfg),
            Err(McError::AllocationFailure { .. })
        ));
    }

    #[test]
    fn test_engine_names() {
        assert_eq!(Engine::Full.name(), "full");
        assert_eq!(Engine::Fast.name(), "fast");
        assert_eq!(Engine::default(), Engine::Fast);
    }
}
