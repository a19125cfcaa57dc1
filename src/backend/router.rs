//! Pool router for selecting backends by pool name.

use crate::backend::{Backend, RotorError, WeightedRotor};
use crate::config::PoolConfig;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors returned when routing to a pool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("unknown pool '{0}'")]
    UnknownPool(String),

    #[error("pool '{pool}': {source}")]
    Rotor {
        pool: String,
        #[source]
        source: RotorError,
    },
}

impl RouteError {
    /// Whether the pool exists but currently has no backend to offer.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            RouteError::Rotor {
                source: RotorError::EmptyPool,
                ..
            }
        )
    }
}

/// Routes selections to a rotor per named pool.
#[derive(Debug)]
pub struct PoolRouter {
    /// Map of pool name to its rotor.
    pools: HashMap<String, WeightedRotor>,
    /// Pool names in configuration order.
    order: Vec<String>,
}

impl PoolRouter {
    /// Create a new pool router from configuration.
    ///
    /// Fails on the first pool whose rotor cannot be built.
    pub fn new(pools: &[PoolConfig]) -> Result<Self, RouteError> {
        let mut pool_map = HashMap::with_capacity(pools.len());
        let mut order = Vec::with_capacity(pools.len());

        for pool in pools {
            let backends: Vec<Backend> = pool.backends.iter().map(Backend::from).collect();

            let rotor = WeightedRotor::new(&backends).map_err(|source| RouteError::Rotor {
                pool: pool.name.clone(),
                source,
            })?;

            debug!(
                pool = %pool.name,
                backends = backends.len(),
                sequence_len = rotor.len(),
                "built pool rotor"
            );

            if pool_map.insert(pool.name.clone(), rotor).is_none() {
                order.push(pool.name.clone());
            }
        }

        Ok(Self {
            pools: pool_map,
            order,
        })
    }

    /// Select the next backend from the named pool.
    pub fn select(&self, pool: &str) -> Result<&str, RouteError> {
        let rotor = self
            .pools
            .get(pool)
            .ok_or_else(|| RouteError::UnknownPool(pool.to_string()))?;

        match rotor.next() {
            Ok(backend) => {
                debug!(pool, backend, "selected backend");
                Ok(backend)
            }
            Err(source) => {
                warn!(pool, error = %source, "no backend available");
                Err(RouteError::Rotor {
                    pool: pool.to_string(),
                    source,
                })
            }
        }
    }

    /// Get the rotor for a pool.
    pub fn rotor(&self, pool: &str) -> Option<&WeightedRotor> {
        self.pools.get(pool)
    }

    /// Pool names in configuration order.
    pub fn pool_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}
