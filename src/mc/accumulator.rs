//! Payoff accumulation and the Monte Carlo estimator
//!
//! ```text
//! price    = e^(-rT) * (1/I) Σ X_i
//! variance = e^(-2rT) * Σ (X_i - X̄)² / (I (I - 1))
//! ```
//! where `X_i = max(S_T,i - K, 0)`.
//!
//! Mean and squared deviations are tracked with Welford's update and
//! partial accumulators are combined with Chan's pairwise formula, so the
//! variance stays non-negative even when every payoff is identical and
//! large.

/// Running payoff moments of one batch (or of a whole run after merging)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PayoffAccumulator {
    pub count: usize,
    pub mean: f64,
    /// Sum of squared deviations from `mean`
    pub m2: f64,
}

impl PayoffAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one path's payoff; callers pass payoffs already floored at zero
    #[inline]
    pub fn add(&mut self, payoff: f64) {
        self.count += 1;
        let delta = payoff - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (payoff - self.mean);
    }

    pub fn merge(self, other: PayoffAccumulator) -> Self {
        if other.count == 0 {
            return self;
        }
        if self.count == 0 {
            return other;
        }

        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let count = self.count + other.count;
        let n = count as f64;
        let delta = other.mean - self.mean;

        PayoffAccumulator {
            count,
            mean: self.mean + delta * n_b / n,
            m2: self.m2 + other.m2 + delta * delta * n_a * n_b / n,
        }
    }

    /// Turn the moments into a discounted estimate
    pub fn finish(&self, discount: f64, steps: usize, seed: u64) -> McEstimate {
        let n = self.count as f64;
        let price = discount * self.mean;

        let variance = if self.count < 2 {
            f64::NAN
        } else {
            discount * discount * self.m2 / (n * (n - 1.0))
        };

        McEstimate {
            price,
            variance,
            paths: self.count,
            steps,
            seed,
        }
    }
}

/// Result of one pricing run
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct McEstimate {
    /// Discounted average payoff
    pub price: f64,
    /// Sample variance of `price`; NaN when fewer than two paths were run
    pub variance: f64,
    pub paths: usize,
    pub steps: usize,
    /// Base seed the run resolved, replayable with `SeedSource::Fixed`
    pub seed: u64,
}

impl McEstimate {
    pub fn std_error(&self) -> f64 {
        self.variance.sqrt()
    }

    /// Symmetric interval `price ± z * std_error`
    pub fn confidence_interval(&self, z: f64) -> (f64, f64) {
        let half_width = z * self.std_error();
        (self.price - half_width, self.price + half_width)
    }
}
