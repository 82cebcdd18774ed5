// src/analytics/bs_analytic.rs
//! Closed-form Black-Scholes price of a European call
//!
//! Reference value for the Monte Carlo estimators. Under the risk-neutral
//! measure the underlying follows:
//! ```text
//! dS_t = r S_t dt + σ S_t dW_t
//! ```
//! and the call price is `e^(-rT) E^Q[max(S_T - K, 0)]`.

use crate::math_utils::norm_cdf;

/// Black-Scholes European call option price
///
/// # Formula
/// ```text
/// C(S,K,r,σ,T) = S*Φ(d₁) - K*e^(-rT)*Φ(d₂)
/// d₁ = [ln(S/K) + (r + σ²/2)T] / (σ√T)
/// d₂ = d₁ - σ√T
/// ```
///
/// With `σ√T = 0` the terminal price is the deterministic forward
/// `S*e^(rT)`, so the price collapses to `e^(-rT) * max(S*e^(rT) - K, 0)`.
pub fn bs_call_price(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let vol_sqrt_t = sigma * t.sqrt();
    if vol_sqrt_t == 0.0 {
        let discount = (-r * t).exp();
        return discount * (s * (r * t).exp() - k).max(0.0);
    }

    let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / vol_sqrt_t;
    let d2 = d1 - vol_sqrt_t;
    s * norm_cdf(d1) - k * (-r * t).exp() * norm_cdf(d2)
}
