//! Price path generation under geometric Brownian motion
//!
//! Each step applies the log-space update
//! ```text
//! S_t = S_{t-1} * exp((r - σ²/2)dt + σ√dt * Z_t),   Z_t ~ N(0,1)
//! ```
//! which is exact for GBM. Two kernels share it:
//! - [`evolve_path`] writes every intermediate price into a row
//! - [`terminal_price_log_sum`] keeps only the running log-return sum
//!
//! Fed the same draws, both return the same terminal price up to rounding.

use crate::config::MarketParams;
use crate::error::{McError, McResult};
use crate::rng::NormalSource;
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

/// Per-step drift and diffusion, precomputed once per run
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepCoefficients {
    pub drift_dt: f64,
    pub vol_sqrt_dt: f64,
}

impl StepCoefficients {
    pub fn new(market: &MarketParams, steps: usize) -> Self {
        let dt = market.t / steps as f64;
        StepCoefficients {
            drift_dt: (market.r - 0.5 * market.sigma * market.sigma) * dt,
            vol_sqrt_dt: market.sigma * dt.sqrt(),
        }
    }

    /// Log-return of one step for the normal draw `z`
    #[inline]
    pub fn increment(&self, z: f64) -> f64 {
        self.drift_dt + self.vol_sqrt_dt * z
    }
}

/// Fill `row` with one price path and return its terminal price
///
/// `row[0]` is `s0`; each later entry consumes one draw, so a row of length
/// M+1 uses exactly M draws.
pub fn evolve_path<S: NormalSource + ?Sized>(
    coeffs: &StepCoefficients,
    s0: f64,
    source: &mut S,
    row: &mut [f64],
) -> f64 {
    let Some((first, rest)) = row.split_first_mut() else {
        return s0;
    };
    *first = s0;

    let mut current = s0;
    for price in rest {
        current *= coeffs.increment(source.draw()).exp();
        *price = current;
    }
    current
}

/// Terminal price of one path from the summed log-returns of `steps` draws
pub fn terminal_price_log_sum<S: NormalSource + ?Sized>(
    coeffs: &StepCoefficients,
    s0: f64,
    steps: usize,
    source: &mut S,
) -> f64 {
    let mut log_sum = 0.0;
    for _ in 0..steps {
        log_sum += coeffs.increment(source.draw());
    }
    s0 * log_sum.exp()
}

/// Simulated prices of every path at every step
///
/// Row `i` is path `i`, column `t` is time step `t`; column 0 holds S0.
/// Storage is a single contiguous row-major block.
#[derive(Clone, Debug, PartialEq)]
pub struct PathMatrix {
    data: Array2<f64>,
}

impl PathMatrix {
    /// Allocate a zeroed matrix of `paths` rows and `points` columns
    ///
    /// Fails with [`McError::AllocationFailure`] instead of aborting when the
    /// size overflows or the allocator refuses the request.
    pub fn try_zeros(paths: usize, points: usize) -> McResult<Self> {
        let failure = |reason: String| McError::AllocationFailure {
            paths,
            points,
            reason,
        };

        let len = paths
            .checked_mul(points)
            .filter(|len| len.checked_mul(std::mem::size_of::<f64>()).is_some())
            .ok_or_else(|| failure("matrix size overflows the address space".to_string()))?;

        let mut buffer: Vec<f64> = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|e| failure(e.to_string()))?;
        buffer.resize(len, 0.0);

        let data = Array2::from_shape_vec((paths, points), buffer)
            .map_err(|e| failure(e.to_string()))?;
        Ok(PathMatrix { data })
    }

    pub fn n_paths(&self) -> usize {
        self.data.nrows()
    }

    /// Prices per path (M+1)
    pub fn n_points(&self) -> usize {
        self.data.ncols()
    }

    pub fn row(&self, path: usize) -> ArrayView1<'_, f64> {
        self.data.row(path)
    }

    pub fn rows(&self) -> impl Iterator<Item = ArrayView1<'_, f64>> + '_ {
        self.data.axis_iter(Axis(0))
    }

    /// Last column: S_T of every path
    pub fn terminal_prices(&self) -> ArrayView1<'_, f64> {
        self.data.column(self.n_points() - 1)
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn into_inner(self) -> Array2<f64> {
        self.data
    }

    /// Row-major backing storage, for chunked parallel filling
    pub(crate) fn as_mut_slice(&mut self) -> McResult<&mut [f64]> {
        let (paths, points) = self.data.dim();
        self.data
            .as_slice_mut()
            .ok_or_else(|| McError::AllocationFailure {
                paths,
                points,
                reason: "storage is not contiguous".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{NormalSource, ReplayDraws, RngFactory};
    use approx::assert_relative_eq;

    fn market() -> MarketParams {
        MarketParams::default()
    }

    #[test]
    fn test_step_coefficients() {
        let coeffs = StepCoefficients::new(&market(), 50);
        let dt = 1.0 / 50.0;
        assert_relative_eq!(coeffs.drift_dt, (0.05 - 0.5 * 0.04) * dt, epsilon = 1e-15);
        assert_relative_eq!(coeffs.vol_sqrt_dt, 0.2 * dt.sqrt(), epsilon = 1e-15);
        assert_relative_eq!(coeffs.increment(0.0), coeffs.drift_dt);
    }

    #[test]
    fn test_evolve_path_starts_at_spot_and_stays_positive() {
        let coeffs = StepCoefficients::new(&market(), 50);
        let mut stream = RngFactory::new(1).stream(0);
        let mut row = vec![0.0; 51];

        let terminal = evolve_path(&coeffs, 100.0, &mut stream, &mut row);

        assert_eq!(row[0], 100.0);
        assert_eq!(terminal, row[50]);
        assert!(row.iter().all(|&s| s > 0.0));
    }

    #[test]
    fn test_kernels_agree_on_identical_draws() {
        let coeffs = StepCoefficients::new(&market(), 50);
        let mut stream = RngFactory::new(7).stream(3);
        let draws: Vec<f64> = (0..50).map(|_| stream.draw()).collect();

        let mut row = vec![0.0; 51];
        let mut replay_full = ReplayDraws::new(&draws);
        let full = evolve_path(&coeffs, 100.0, &mut replay_full, &mut row);

        let mut replay_fast = ReplayDraws::new(&draws);
        let fast = terminal_price_log_sum(&coeffs, 100.0, 50, &mut replay_fast);

        assert_eq!(replay_full.remaining(), 0);
        assert_eq!(replay_fast.remaining(), 0);
        assert_relative_eq!(full, fast, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_volatility_is_pure_drift() {
        let flat = MarketParams {
            sigma: 0.0,
            ..market()
        };
        let coeffs = StepCoefficients::new(&flat, 50);
        let draws = vec![3.0; 50];
        let terminal = terminal_price_log_sum(&coeffs, 100.0, 50, &mut ReplayDraws::new(&draws));
        assert_relative_eq!(terminal, 100.0 * 0.05f64.exp(), max_relative = 1e-12);
    }

    #[test]
    fn test_path_matrix_shape() {
        let matrix = PathMatrix::try_zeros(3, 51).expect("small allocation");
        assert_eq!(matrix.n_paths(), 3);
        assert_eq!(matrix.n_points(), 51);
        assert_eq!(matrix.rows().count(), 3);
        assert_eq!(matrix.terminal_prices().len(), 3);
        assert_eq!(matrix.view().dim(), (3, 51));
    }

    #[test]
    fn test_path_matrix_allocation_overflow_fails_fast() {
        let err = PathMatrix::try_zeros(usize::MAX / 2, 51).unwrap_err();
        assert!(matches!(err, McError::AllocationFailure { points: 51, .. }));
    }
}
