//! # bsm-mc: Monte Carlo Pricing of a European Call
//!
//! Estimates the fair value of a European call under Black-Scholes-Merton
//! dynamics by simulating geometric Brownian motion price paths, averaging
//! the floored terminal payoffs and discounting the mean.
//!
//! ## Engines
//!
//! - **Full**: keeps the complete I x (M+1) path matrix for inspection/export
//! - **Fast**: keeps only a running log-return sum per path
//!
//! Both split the paths into batches with independent random streams, run
//! the batches on rayon and reduce the partial sums in batch order.
//!
//! ## Quick Start
//!
//! ```rust
//! use bsm_mc::config::{McConfig, SeedSource, SimConfig};
//! use bsm_mc::mc::Engine;
//!
//! let cfg = McConfig {
//!     sim: SimConfig {
//!         paths: 20_000,
//!         seed: SeedSource::Fixed(42),
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//!
//! let estimate = Engine::Fast.price(&cfg).expect("Valid configuration");
//! println!("Option price: {:.4} ± {:.4}", estimate.price, estimate.std_error());
//! ```

// Module declarations
pub mod analytics;
pub mod config;
pub mod error;
pub mod math_utils;
pub mod mc;
pub mod output;
pub mod report;
pub mod rng;

// Re-export commonly used types for convenience
pub use config::{MarketParams, McConfig, SeedSource, SimConfig};
pub use error::{McError, McResult};
pub use mc::{simulate_full_paths, simulate_terminal_fast, Engine, FullSimulation, McEstimate};
