//! Configuration validation.

use crate::config::Config;
use std::collections::HashSet;

/// Validate the configuration.
///
/// Checks for:
/// - At least one pool
/// - Non-empty, unique pool names
/// - Non-empty backend ids
/// - Non-negative backend weights
/// - A known log level
/// - Non-zero simulation requests and workers
///
/// Pools whose weights are all zero are accepted; selecting from them
/// reports an empty pool at runtime.
///
/// # Returns
///
/// `Ok(())` if valid, or an error message describing every problem found.
pub fn validate_config(config: &Config) -> Result<(), String> {
    let mut errors = Vec::new();

    if config.pools.is_empty() {
        errors.push("at least one pool must be defined".to_string());
    }

    let mut pool_names = HashSet::new();

    for pool in &config.pools {
        if pool.name.is_empty() {
            errors.push("pool name cannot be empty".to_string());
        }

        if !pool_names.insert(pool.name.as_str()) {
            errors.push(format!("duplicate pool name: {}", pool.name));
        }

        for (index, backend) in pool.backends.iter().enumerate() {
            if backend.id.is_empty() {
                errors.push(format!(
                    "backend at position {} in pool '{}' has an empty id",
                    index, pool.name
                ));
            }

            if backend.weight < 0 {
                errors.push(format!(
                    "backend '{}' in pool '{}' has negative weight {}",
                    backend.id, pool.name, backend.weight
                ));
            }
        }
    }

    // Validate log level
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.global.log_level.to_lowercase().as_str()) {
        errors.push(format!(
            "invalid log level '{}', must be one of: {}",
            config.global.log_level,
            valid_levels.join(", ")
        ));
    }

    if config.simulation.requests == 0 {
        errors.push("simulation requests must be >= 1".to_string());
    }

    if config.simulation.workers == 0 {
        errors.push("simulation workers must be >= 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}
