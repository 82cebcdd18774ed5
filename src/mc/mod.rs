pub mod accumulator;
pub mod mc_engine;
pub mod paths;
pub mod payoffs;

pub use accumulator::{McEstimate, PayoffAccumulator};
pub use mc_engine::{simulate_full_paths, simulate_terminal_fast, Engine, FullSimulation};
pub use paths::PathMatrix;
