//! rotorlb - Weighted round-robin backend selection
//!
//! This crate provides the selection core of a load balancer:
//! - A thread-safe weighted rotor with deterministic block-expanded ordering
//! - Named pools of rotors built from YAML configuration
//! - A concurrent traffic simulator for checking distribution

pub mod backend;
pub mod config;
pub mod simulate;
pub mod util;

pub use backend::{Backend, RotorError, WeightedRotor};
pub use config::Config;
