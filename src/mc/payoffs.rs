//! European call payoff
//!
//! # Mathematical Definition
//!
//! A European call pays `max(S_T - K, 0)` at maturity and depends on the
//! terminal price only. Both engines floor the payoff at zero before it
//! reaches the accumulator, so every finite contribution is non-negative.

/// Vanilla European call with strike `k`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EuropeanCall {
    pub k: f64,
}

impl EuropeanCall {
    pub fn new(k: f64) -> Self {
        EuropeanCall { k }
    }

    /// Payoff from the terminal price: max(S_T - K, 0)
    ///
    /// A NaN terminal price yields a NaN payoff instead of being floored.
    #[inline]
    pub fn payoff(&self, terminal: f64) -> f64 {
        let intrinsic = terminal - self.k;
        if intrinsic > 0.0 || intrinsic.is_nan() {
            intrinsic
        } else {
            0.0
        }
    }

    /// Payoff from a complete price path [S_0, S_1, ..., S_T]
    ///
    /// An empty path pays nothing.
    pub fn calculate(&self, path: &[f64]) -> f64 {
        path.last().map_or(0.0, |&terminal| self.payoff(terminal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_payoff_is_floored() {
        let call = EuropeanCall::new(105.0);
        assert_eq!(call.payoff(110.0), 5.0);
        assert_eq!(call.payoff(105.0), 0.0);
        assert_eq!(call.payoff(90.0), 0.0);
    }

    #[test]
    fn test_calculate_uses_terminal_price() {
        let call = EuropeanCall::new(100.0);
        assert_eq!(call.calculate(&[100.0, 150.0, 103.5]), 3.5);
        assert_eq!(call.calculate(&[100.0, 80.0, 99.0]), 0.0);
        assert_eq!(call.calculate(&[]), 0.0);
    }

    #[test]
    fn test_overflowed_terminal_propagates() {
        let call = EuropeanCall::new(100.0);
        assert_eq!(call.payoff(f64::INFINITY), f64::INFINITY);
        assert!(call.payoff(f64::NAN).is_nan());
        assert!(call.calculate(&[100.0, f64::NAN]).is_nan());
    }
}
