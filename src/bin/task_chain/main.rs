//! Pattern: Task chains on an in-process broker
//!
//! Tasks are looked up by dotted name, run by a pool of worker threads, and
//! chained so that each one is queued only after the previous one finished.
//! Results go to a durable store or to a cache with a time-to-live.
//!
//! Run with: cargo run --bin task_chain

mod broker;
mod chain;
mod registry;

use anyhow::{Context, Result};
use broker::{async_chain, result_group, Broker, BrokerConfig, TaskCall, TaskOutcome};
use chain::{Chain, ChainOptions};
use colored::Colorize;
use registry::Registry;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn format_outcomes(outcomes: &[TaskOutcome]) -> String {
    let parts: Vec<String> = outcomes
        .iter()
        .map(|outcome| match outcome {
            Ok(value) => value.to_string(),
            Err(err) => format!("<{}>", err),
        })
        .collect();
    format!("[{}]", parts.join(", "))
}

fn print_results(label: &str, results: Option<Vec<TaskOutcome>>) {
    match results {
        Some(outcomes) => println!("{} {}", label.green(), format_outcomes(&outcomes)),
        None => println!("{} {}", label.yellow(), "not ready".yellow()),
    }
}

// =============================================================================
// Milestone 1: async_chain + result_group
// =============================================================================

fn async_chain_example(broker: &Broker) {
    println!("\n{}", "=== async_chain ===".bold().cyan());
    let group = async_chain(
        broker,
        vec![
            TaskCall::new("math.copysign", &[1.0, -1.0]),
            TaskCall::new("math.floor", &[1.0]),
        ],
    );
    print_results("Results from async_chain:", result_group(broker, &group, 2));
}

// =============================================================================
// Milestone 2: Chain with cached results
// =============================================================================

fn cached_chain_example(broker: &Broker) {
    println!("\n{}", "=== Chain(cached) ===".bold().cyan());
    let mut chain = Chain::new(broker, ChainOptions::cached());
    chain.append("math.copysign", &[1.0, -1.0]);
    chain.append("math.floor", &[1.0]);
    chain.append("math.sqrt", &[16.0]);

    let group = chain.run();
    println!("Chain started with group ID: {}", group);
    print_results("Results from Chain instance:", chain.result(Duration::from_secs(5)));
    println!("Current task index: {:?}", chain.current());
    println!("Total number of tasks in the chain: {}", chain.length());
}

// =============================================================================
// Milestone 3: Synchronous chain with a failing task
// =============================================================================

fn sync_chain_example(broker: &Broker) {
    println!("\n{}", "=== Chain(sync) ===".bold().cyan());
    let mut chain = Chain::new(broker, ChainOptions::sync());
    chain.append("math.copysign", &[1.0, -1.0]);
    chain.append("math.floor", &[1.0]);
    chain.append("math.sqrt", &[-1.0]);

    print_results(
        "Results from sync chain (with failure handling):",
        chain.result(Duration::from_secs(5)),
    );
    println!("{}", "Failed tasks:".red());
    for record in chain.fetch(true) {
        println!("  {} [{}]", record, record.id);
    }
}

// =============================================================================
// Milestone 4: Named groups
// =============================================================================

fn group_chain_example(broker: &Broker) {
    println!("\n{}", "=== Chain(group) ===".bold().cyan());
    let mut chain = Chain::new(broker, ChainOptions::group("math_operations"));
    chain.append("math.copysign", &[1.0, -1.0]);
    chain.append("math.floor", &[1.0]);

    let group = chain.run();
    println!("Group ID for the chain: {}", chain.group());
    print_results("Group results:", result_group(broker, &group, 2));
}

fn main() -> Result<()> {
    init_tracing();

    let config = BrokerConfig::default();
    let broker =
        Broker::new(config, Registry::with_math()).context("failed to start task workers")?;
    println!(
        "{} {} workers, cache TTL {:?}",
        "Broker:".bold(),
        broker.worker_count(),
        broker.config().cache_ttl
    );

    async_chain_example(&broker);
    cached_chain_example(&broker);
    sync_chain_example(&broker);
    group_chain_example(&broker);

    println!("\n=== Key Points ===");
    println!("1. Each task is queued only after the previous one finished");
    println!("2. A failed task is recorded and the chain moves on");
    println!("3. Sync chains run on the caller's thread; async ones on the workers");
    println!("4. Dropping the broker closes the queue and joins the workers");
    Ok(())
}
