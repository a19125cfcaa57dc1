//! Simulated request traffic against a pool.
//!
//! Spawns concurrent callers that each route a share of the requested
//! traffic through a [`PoolRouter`] and tallies where every request landed.

use crate::backend::{PoolRouter, RouteError};
use crate::config::SimulationConfig;
use crate::util::RequestId;
use dashmap::DashMap;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{debug, info};

/// Errors that abort a simulation run.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("simulation worker failed: {0}")]
    Join(#[from] JoinError),
}

/// Outcome of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub run_id: RequestId,
    pub pool: String,
    /// Requests that were routed to a backend.
    pub served: u64,
    /// Requests that found the pool empty.
    pub unavailable: u64,
    /// Requests served per backend id.
    pub distribution: BTreeMap<String, u64>,
}

impl SimulationReport {
    /// Fraction of served requests that went to `backend`.
    pub fn share(&self, backend: &str) -> f64 {
        if self.served == 0 {
            return 0.0;
        }
        let count = self.distribution.get(backend).copied().unwrap_or(0);
        count as f64 / self.served as f64
    }
}

/// Route `settings.requests` requests through `pool` using
/// `settings.workers` concurrent tasks.
pub async fn simulate(
    router: Arc<PoolRouter>,
    pool: &str,
    settings: &SimulationConfig,
) -> Result<SimulationReport, SimulationError> {
    if router.rotor(pool).is_none() {
        return Err(RouteError::UnknownPool(pool.to_string()).into());
    }

    let run_id = RequestId::new();
    let workers = settings.workers.max(1);
    let requests = settings.requests;

    info!(run_id = %run_id, pool, requests, workers, "starting simulation");

    let tally: Arc<DashMap<String, u64>> = Arc::new(DashMap::new());
    let unavailable = Arc::new(AtomicU64::new(0));

    let handles = (0..workers).map(|worker| {
        let share = requests / workers + usize::from(worker < requests % workers);
        let router = Arc::clone(&router);
        let tally = Arc::clone(&tally);
        let unavailable = Arc::clone(&unavailable);
        let pool = pool.to_string();

        tokio::spawn(async move {
            for _ in 0..share {
                let request_id = RequestId::short();
                match router.select(&pool) {
                    Ok(backend) => {
                        debug!(request_id = %request_id, worker, backend, "routed request");
                        *tally.entry(backend.to_string()).or_insert(0) += 1;
                    }
                    Err(e) if e.is_unavailable() => {
                        debug!(request_id = %request_id, worker, "no backend for request");
                        unavailable.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => return Err(e),
                }
                tokio::task::yield_now().await;
            }
            Ok(())
        })
    });

    for result in join_all(handles).await {
        result??;
    }

    let distribution: BTreeMap<String, u64> = tally
        .iter()
        .map(|entry| (entry.key().clone(), *entry.value()))
        .collect();
    let served: u64 = distribution.values().sum();
    let unavailable = unavailable.load(Ordering::Relaxed);

    info!(run_id = %run_id, pool, served, unavailable, "simulation finished");

    Ok(SimulationReport {
        run_id,
        pool: pool.to_string(),
        served,
        unavailable,
        distribution,
    })
}
