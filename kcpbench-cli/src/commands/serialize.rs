// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `kcpbench serialize` command - Serializer micro-benchmark.

use kcpbench_benchmark::{BenchmarkReport, JsonReporter};
use kcpbench_core::config::MAX_SERIALIZER_ITERATIONS;
use kcpbench_core::{
    ConfigurationError, LatencyMetrics, SerializerBenchmark, SerializerRegistry, SerializerStats,
    ThroughputMetrics,
};

pub async fn execute(
    config_path: &str,
    iterations: Option<u64>,
    warmup: Option<u64>,
    output: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;
    if let Some(iterations) = iterations {
        config.serializer_iterations = validate_iterations(iterations)?;
    }
    if let Some(warmup) = warmup {
        config.warmup_iterations = warmup;
    }
    if let Some(output) = output {
        config.output_dir = output.into();
    }

    let registry = SerializerRegistry::strict();
    tracing::info!(
        serializers = registry.len(),
        iterations = config.serializer_iterations,
        warmup = config.warmup_iterations,
        "Running serializer benchmark"
    );

    let stats = SerializerBenchmark::new(registry, config.serializer_harness()).run();
    print_stats(&stats);

    let mut report = BenchmarkReport::new();
    report.add_serializer_stats(&stats);
    let path = JsonReporter::new(&config.output_dir)?.save(&report)?;
    println!("Report: {}", path.display());

    Ok(())
}

fn validate_iterations(iterations: u64) -> Result<u64, ConfigurationError> {
    if iterations == 0 || iterations > MAX_SERIALIZER_ITERATIONS {
        return Err(ConfigurationError::InvalidFieldValue {
            field: "iterations",
            value: iterations.to_string(),
            reason: format!("Must be between 1 and {}", MAX_SERIALIZER_ITERATIONS),
        });
    }
    Ok(iterations)
}

fn print_stats(stats: &[SerializerStats]) {
    println!();
    println!("╔══════════╦═══════════╦════════════╦════════════╦══════════════╦══════════╗");
    println!("║ Format   ║ Bytes     ║ Mean       ║ p95        ║ Throughput   ║ Errors   ║");
    println!("╠══════════╬═══════════╬════════════╬════════════╬══════════════╬══════════╣");

    for s in stats {
        println!(
            "║ {:<8} ║ {:<9} ║ {:<10} ║ {:<10} ║ {:<12} ║ {:<8} ║",
            s.name,
            s.encoded_bytes,
            LatencyMetrics::format_latency(s.latency.mean_ns as u64),
            LatencyMetrics::format_latency(s.latency.p95_ns),
            ThroughputMetrics::format_bytes_per_sec(s.throughput.bytes_per_sec),
            s.errors
        );
    }

    println!("╚══════════╩═══════════╩════════════╩════════════╩══════════════╩══════════╝");

    for s in stats.iter().filter(|s| s.errors > 0) {
        if let Some(error) = &s.first_error {
            println!("  {}: {}", s.name, error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_iterations_rejected() {
        assert!(matches!(
            validate_iterations(0),
            Err(ConfigurationError::InvalidFieldValue {
                field: "iterations",
                ..
            })
        ));
        assert!(validate_iterations(MAX_SERIALIZER_ITERATIONS + 1).is_err());
        assert_eq!(validate_iterations(500).unwrap(), 500);
    }
}
