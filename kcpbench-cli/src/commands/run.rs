// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `kcpbench run` command - Run a lifecycle workload over the matrix.

use std::collections::HashSet;

use kcpbench_benchmark::{BenchmarkReport, JsonReporter};
use kcpbench_core::config::MAX_CONCURRENCY;
use kcpbench_core::{
    BenchmarkDriver, ConfigurationError, ContentType, FormatStats, InMemoryFactory,
    KubeClientFactory, LatencyMetrics, Workload,
};
use tokio_util::sync::CancellationToken;

use crate::RunArgs;

pub async fn execute(
    config_path: &str,
    args: RunArgs,
    cancel: &CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    let workload: Workload = args.workload.parse()?;

    let mut config = super::load_config(config_path)?;
    super::apply_connection_overrides(&mut config, args.kubeconfig, args.context, args.cluster)?;

    if !args.content_types.is_empty() {
        config.content_types = parse_content_types(&args.content_types)?;
    }
    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 || concurrency > MAX_CONCURRENCY {
            return Err(ConfigurationError::InvalidFieldValue {
                field: "concurrency",
                value: concurrency.to_string(),
                reason: format!("Must be between 1 and {}", MAX_CONCURRENCY),
            }
            .into());
        }
        config.concurrency = concurrency;
    }
    if let Some(iterations) = args.iterations {
        if iterations == 0 {
            return Err(ConfigurationError::InvalidFieldValue {
                field: "iterations",
                value: "0".to_string(),
                reason: "Must be greater than 0".to_string(),
            }
            .into());
        }
        config.iteration_budget = iterations;
    }
    if let Some(output) = args.output {
        config.output_dir = output.into();
    }

    tracing::info!(
        workload = %workload,
        cluster = %config.cluster,
        concurrency = config.concurrency,
        iterations = config.iteration_budget,
        dry_run = args.dry_run,
        "Starting benchmark"
    );

    let options = config.bench_options();
    let (stats, server) = if args.dry_run {
        let driver = BenchmarkDriver::new(InMemoryFactory::default(), options);
        (driver.run(workload, cancel).await, None)
    } else {
        let credentials = super::load_credentials(&config)?;
        let server = credentials.server.clone();
        let mut factory = KubeClientFactory::new(credentials);
        if let Some(timeout) = config.timeout {
            factory = factory.with_timeout(timeout);
        }
        let driver = BenchmarkDriver::new(factory, options);
        (driver.run(workload, cancel).await, Some(server))
    };

    print_stats(workload, &stats);

    let mut report = BenchmarkReport::new();
    report.server = server;
    report.add_format_stats(&stats);
    let path = JsonReporter::new(&config.output_dir)?.save(&report)?;
    println!("Report: {}", path.display());

    if cancel.is_cancelled() {
        println!("Run was interrupted; results are partial.");
    }
    Ok(())
}

fn parse_content_types(values: &[String]) -> Result<Vec<ContentType>, ConfigurationError> {
    let mut seen = HashSet::new();
    let mut parsed = Vec::with_capacity(values.len());
    for value in values {
        let ct: ContentType = value.parse()?;
        if seen.insert(ct) {
            parsed.push(ct);
        }
    }
    Ok(parsed)
}

fn print_stats(workload: Workload, stats: &[FormatStats]) {
    println!();
    println!("{} ({} formats)", workload.name(), stats.len());
    println!("╔══════════╦═══════════╦══════════╦════════════╦════════════╦════════════╦════════════╗");
    println!("║ Format   ║ Succeeded ║ Failed   ║ Mean       ║ p95        ║ p99        ║ ops/s      ║");
    println!("╠══════════╬═══════════╬══════════╬════════════╬════════════╬════════════╬════════════╣");

    for s in stats {
        if s.configuration_error.is_some() {
            println!(
                "║ {:<8} ║ {:<9} ║ {:<8} ║ {:<10} ║ {:<10} ║ {:<10} ║ {:<10} ║",
                s.content_type.name(),
                "-",
                "-",
                "client",
                "build",
                "failed",
                "-"
            );
            continue;
        }
        println!(
            "║ {:<8} ║ {:<9} ║ {:<8} ║ {:<10} ║ {:<10} ║ {:<10} ║ {:<10.1} ║",
            s.content_type.name(),
            s.succeeded,
            s.failed,
            LatencyMetrics::format_latency(s.latency.mean_ns as u64),
            LatencyMetrics::format_latency(s.latency.p95_ns),
            LatencyMetrics::format_latency(s.latency.p99_ns),
            s.throughput.ops_per_sec
        );
    }

    println!("╚══════════╩═══════════╩══════════╩════════════╩════════════╩════════════╩════════════╝");

    for s in stats {
        if let Some(error) = &s.configuration_error {
            println!("  {}: {}", s.content_type.name(), error);
        }
        if let Some(first) = s.failures.iter().find(|f| !f.cancelled) {
            println!(
                "  {}: {} failure(s), first: {}",
                s.content_type.name(),
                s.failed,
                first.message
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_types_keeps_order_and_dedups() {
        let values = vec![
            "cbor".to_string(),
            "application/json".to_string(),
            "CBOR".to_string(),
        ];
        assert_eq!(
            parse_content_types(&values).unwrap(),
            vec![ContentType::Cbor, ContentType::Json]
        );
        assert!(parse_content_types(&["xml".to_string()]).is_err());
    }
}
