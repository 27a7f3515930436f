//! CachePulse CLI entry point

use anyhow::{Context, Result};
use cachepulse::acquire::synthetic::SyntheticAcquirer;
use cachepulse::cache::memory::MemoryCache;
use cachepulse::cache::CacheAccessor;
use cachepulse::config::{cli::Cli, Config};
use cachepulse::coordinator::ExperimentCoordinator;
use cachepulse::output;
use cachepulse::readiness::{GateOutcome, ReadinessGate};
use cachepulse::store::memory::MemoryRecordStore;
use cachepulse::traffic::TrafficGenerator;
use cachepulse::util::logging::init_logging;
use cachepulse::util::scheduler::TokioScheduler;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

fn main() -> Result<()> {
    println!("CachePulse v{}", env!("CARGO_PKG_VERSION"));
    println!("Cache hit-rate experiments under synthetic traffic");
    println!();

    // Parse CLI arguments and load configuration
    let cli = Cli::parse();
    let config = cachepulse::config::toml::load_config(&cli)?;

    cachepulse::config::validator::validate_config(&config)
        .context("Configuration validation failed")?;

    print!("{}", config);

    if config.output.dry_run {
        println!();
        println!("Dry run mode - configuration validated successfully");
        return Ok(());
    }
    println!();

    init_logging(config.output.log_format, config.output.debug)?;

    let runtime = tokio::runtime::Runtime::new()
        .context("Failed to create tokio runtime")?;

    runtime.block_on(run_experiment(config))
}

/// Wire the in-memory collaborators together and run one experiment
async fn run_experiment(config: Config) -> Result<()> {
    let store = Arc::new(MemoryRecordStore::new());
    if let Some(ref path) = config.corpus.seed_file {
        let inserted = store
            .load_json_file(path)
            .with_context(|| format!("Failed to load seed file: {}", path.display()))?;
        info!(inserted, path = %path.display(), "seeded record store");
    }

    let acquirer = match config.simulation.interval.seed {
        Some(seed) => SyntheticAcquirer::with_seed(store.clone(), config.corpus.acquisition_batch_size, seed),
        None => SyntheticAcquirer::new(store.clone(), config.corpus.acquisition_batch_size),
    };

    let scheduler = TokioScheduler::new();
    let shutdown = scheduler.shutdown_handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("interrupt received, shutting down");
                shutdown.trigger();
            }
            Err(e) => error!(error = %e, "could not listen for interrupt"),
        }
    });
    let scheduler = Arc::new(scheduler);

    let (gate, signal) = ReadinessGate::new(
        config.gate_config(),
        store.clone(),
        Arc::new(acquirer),
        scheduler.clone(),
    );

    let cache = Arc::new(CacheAccessor::new(Arc::new(MemoryCache::new()), config.cache_ttl()));
    let generator = TrafficGenerator::new(store, cache, scheduler, config.generator_options());
    let coordinator = ExperimentCoordinator::new(
        generator,
        config.simulation.distributions.clone(),
        config.raw_query_count(),
    );

    // The gate owns the signal sender; it is dropped when the task ends
    let gate_task = tokio::spawn(async move {
        match gate.ensure_minimum().await {
            Ok(GateOutcome::Reached(reached)) => info!(count = reached.event_count, "corpus ready"),
            Ok(GateOutcome::AlreadyActive) => warn!("readiness polling already running"),
            Ok(GateOutcome::Cancelled) => warn!("readiness polling cancelled"),
            Err(e) => error!(error = %e, "readiness polling failed"),
        }
    });

    let report = coordinator.run(signal).await;
    if let Err(e) = gate_task.await {
        error!(error = %e, "readiness task panicked");
    }

    let Some(report) = report? else {
        println!("No experiment was run");
        return Ok(());
    };

    output::text::print_report(&report);

    if let Some(ref path) = config.output.json_output {
        output::json::write_json_output(path, &report, true)?;
        println!("JSON report written to {}", path.display());
    }

    Ok(())
}
