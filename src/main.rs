//! rotorlb - Weighted round-robin backend selection
//!
//! Usage:
//!     rotorlb --config <path> [--pool <name>] [--requests <n>] [--workers <n>]
//!
//! See --help for more options.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use rotorlb::backend::PoolRouter;
use rotorlb::config::{load_config, Config, SimulationConfig};
use rotorlb::simulate::{simulate, SimulationReport};
use rotorlb::util::init_logging;

/// Route simulated traffic through weighted round-robin pools.
#[derive(Parser, Debug)]
#[command(name = "rotorlb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,

    /// Only simulate this pool
    #[arg(short, long, value_name = "NAME")]
    pool: Option<String>,

    /// Override the number of simulated requests
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    requests: Option<u64>,

    /// Override the number of concurrent callers
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    workers: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config).with_context(|| {
        format!(
            "failed to load configuration from '{}'",
            cli.config.display()
        )
    })?;

    // CLI overrides config
    let log_level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.global.log_level);

    init_logging(log_level, &config.global.log_format);

    let router = PoolRouter::new(&config.pools).context("failed to build pool rotors")?;

    if cli.validate {
        info!("Configuration is valid");
        println!("Configuration is valid.");
        println!("  Pools: {}", config.pools.len());
        for name in router.pool_names() {
            let len = router.rotor(name).map(|r| r.len()).unwrap_or(0);
            println!("    - {} (rotation length {})", name, len);
        }
        return Ok(());
    }

    let settings = SimulationConfig {
        requests: override_or(cli.requests, config.simulation.requests)?,
        workers: override_or(cli.workers, config.simulation.workers)?,
    };

    info!(
        config_path = %cli.config.display(),
        pools = config.pools.len(),
        requests = settings.requests,
        workers = settings.workers,
        "rotorlb starting"
    );

    run(config, router, cli.pool, settings)
}

fn override_or(value: Option<u64>, default: usize) -> Result<usize> {
    match value {
        Some(v) => usize::try_from(v).context("value does not fit in usize"),
        None => Ok(default),
    }
}

/// Run the simulation for the selected pools.
fn run(
    config: Config,
    router: PoolRouter,
    pool: Option<String>,
    settings: SimulationConfig,
) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    let pools: Vec<String> = match pool {
        Some(name) => vec![name],
        None => config.pools.iter().map(|p| p.name.clone()).collect(),
    };

    let router = Arc::new(router);

    runtime.block_on(async {
        for name in &pools {
            let report = simulate(Arc::clone(&router), name, &settings)
                .await
                .with_context(|| format!("simulation of pool '{}' failed", name))?;
            print_report(&report);
        }
        Ok::<(), anyhow::Error>(())
    })
}

fn print_report(report: &SimulationReport) {
    println!(
        "Pool '{}': {} served, {} unavailable",
        report.pool, report.served, report.unavailable
    );
    for (backend, count) in &report.distribution {
        println!(
            "    {:<24} {:>8} ({:.1}%)",
            backend,
            count,
            report.share(backend) * 100.0
        );
    }
}
