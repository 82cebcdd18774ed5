// src/report.rs
//! Human-readable run reports
//!
//! The engines return values only; this module turns an estimate (plus the
//! optional timing measured around the call) into console lines such as
//! `The European option value is: 7.96`.

use crate::mc::accumulator::McEstimate;
use crate::mc::mc_engine::Engine;
use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ReportFlags: u32 {
        const NONE      = 0;
        const PRICE     = 1 << 0;
        const STD_ERROR = 1 << 1;
        const TIMING    = 1 << 2;
        const REFERENCE = 1 << 3;
    }
}

impl Default for ReportFlags {
    fn default() -> Self {
        ReportFlags::PRICE | ReportFlags::TIMING
    }
}

/// One engine run, ready to be printed
#[derive(Clone, Debug)]
pub struct RunReport {
    pub engine: Engine,
    pub estimate: McEstimate,
    pub elapsed_secs: Option<f64>,
    pub reference_price: Option<f64>,
}

impl RunReport {
    pub fn new(engine: Engine, estimate: McEstimate) -> Self {
        RunReport {
            engine,
            estimate,
            elapsed_secs: None,
            reference_price: None,
        }
    }

    pub fn with_elapsed(mut self, secs: f64) -> Self {
        self.elapsed_secs = Some(secs);
        self
    }

    pub fn with_reference(mut self, price: f64) -> Self {
        self.reference_price = Some(price);
        self
    }

    /// Report lines selected by `flags`; sections without data are skipped
    pub fn lines(&self, flags: ReportFlags) -> Vec<String> {
        let mut lines = Vec::new();

        if flags.contains(ReportFlags::PRICE) {
            lines.push(format!("The European option value is: {}", self.estimate.price));
        }

        if flags.contains(ReportFlags::STD_ERROR) {
            lines.push(format!(
                "Standard error: {:.6} ({} paths, {} steps)",
                self.estimate.std_error(),
                self.estimate.paths,
                self.estimate.steps
            ));
        }

        if flags.contains(ReportFlags::REFERENCE) {
            if let Some(reference) = self.reference_price {
                let diff = self.estimate.price - reference;
                lines.push(format!(
                    "Black-Scholes closed form: {:.6} (difference {:+.6})",
                    reference, diff
                ));
            }
        }

        if flags.contains(ReportFlags::TIMING) {
            if let Some(secs) = self.elapsed_secs {
                let label = match self.engine {
                    Engine::Full => "execution",
                    Engine::Fast => "fast execution",
                };
                lines.push(format!("The {} time was: {} seconds.", label, secs));
            }
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimate() -> McEstimate {
        McEstimate {
            price: 7.86,
            variance: 0.0004,
            paths: 250_000,
            steps: 50,
            seed: 1,
        }
    }

    #[test]
    fn test_default_report() {
        let report = RunReport::new(Engine::Full, estimate()).with_elapsed(1.5);
        let lines = report.lines(ReportFlags::default());
        assert_eq!(
            lines,
            vec![
                "The European option value is: 7.86".to_string(),
                "The execution time was: 1.5 seconds.".to_string(),
            ]
        );
    }

    #[test]
    fn test_fast_engine_timing_label() {
        let report = RunReport::new(Engine::Fast, estimate()).with_elapsed(0.25);
        let lines = report.lines(ReportFlags::TIMING);
        assert_eq!(lines, vec!["The fast execution time was: 0.25 seconds.".to_string()]);
    }

    #[test]
    fn test_missing_sections_are_skipped() {
        let report = RunReport::new(Engine::Fast, estimate());
        let lines = report.lines(ReportFlags::all());
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("0.020000"));
        assert!(lines[1].contains("250000 paths"));
        assert!(report.lines(ReportFlags::NONE).is_empty());
    }

    #[test]
    fn test_reference_line() {
        let report = RunReport::new(Engine::Full, estimate()).with_reference(8.0);
        let lines = report.lines(ReportFlags::REFERENCE);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("8.000000"));
        assert!(lines[0].contains("-0.140000"));
    }
}
