// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Serializer micro-benchmark.
//!
//! Measures encode-then-decode of the sample ClusterRole as one paired
//! operation per registry entry, with no network involved.

use serde::{Deserialize, Serialize};

use crate::error::SerializationError;
use crate::harness::BenchmarkHarness;
use crate::registry::SerializerRegistry;
use crate::resources::{sample_cluster_role, ClusterRole};
use crate::stats::{LatencyMetrics, ThroughputMetrics};

/// Name of the sample object.
pub const SAMPLE_NAME: &str = "serialization-sample";

/// Result for one serializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializerStats {
    pub name: String,
    pub mime: String,
    /// Size of the encoded sample in bytes.
    pub encoded_bytes: usize,
    pub iterations: u64,
    pub errors: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_error: Option<String>,
    pub latency: LatencyMetrics,
    pub throughput: ThroughputMetrics,
}

/// Runs every registry entry through the harness.
pub struct SerializerBenchmark {
    registry: SerializerRegistry,
    harness: BenchmarkHarness,
    sample: ClusterRole,
    keep_samples: bool,
}

impl SerializerBenchmark {
    pub fn new(registry: SerializerRegistry, harness: BenchmarkHarness) -> Self {
        Self {
            registry,
            harness,
            sample: sample_cluster_role(SAMPLE_NAME),
            keep_samples: false,
        }
    }

    pub fn keep_samples(mut self, keep: bool) -> Self {
        self.keep_samples = keep;
        self
    }

    pub fn run(&self) -> Vec<SerializerStats> {
        self.registry
            .iter()
            .map(|entry| {
                let encoded_bytes = entry
                    .serializer
                    .encode(&self.sample)
                    .map(|b| b.len())
                    .unwrap_or(0);

                let run = self.harness.run(|| {
                    let bytes = entry.serializer.encode(&self.sample)?;
                    let decoded: ClusterRole = entry.serializer.decode(&bytes)?;
                    Ok::<_, SerializationError>(decoded)
                });

                let ops = run.samples.len() as u64;
                let stats = SerializerStats {
                    name: entry.name.to_string(),
                    mime: entry.serializer.content_type().mime().to_string(),
                    encoded_bytes,
                    iterations: self.harness.measurement_iterations(),
                    errors: run.errors,
                    first_error: run.first_error,
                    throughput: ThroughputMetrics::calculate(
                        ops,
                        ops * encoded_bytes as u64,
                        run.elapsed,
                    ),
                    latency: LatencyMetrics::from_samples(run.samples, self.keep_samples),
                };

                tracing::info!(
                    serializer = %stats.name,
                    bytes = stats.encoded_bytes,
                    errors = stats.errors,
                    mean = %LatencyMetrics::format_latency(stats.latency.mean_ns as u64),
                    "Measured serializer"
                );
                stats
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_strict_serializer_measured_without_errors() {
        let bench = SerializerBenchmark::new(
            SerializerRegistry::strict(),
            BenchmarkHarness::new().warmup(2).iterations(25),
        );
        let stats = bench.run();

        assert_eq!(stats.len(), 4);
        for s in &stats {
            assert_eq!(s.errors, 0, "{}: {:?}", s.name, s.first_error);
            assert_eq!(s.latency.count, 25);
            assert!(s.encoded_bytes > 0);
        }
    }

    #[test]
    fn test_protobuf_is_smallest() {
        let stats = SerializerBenchmark::new(
            SerializerRegistry::strict(),
            BenchmarkHarness::new().warmup(0).iterations(1),
        )
        .run();
        let size = |name: &str| {
            stats
                .iter()
                .find(|s| s.name == name)
                .map(|s| s.encoded_bytes)
                .unwrap()
        };
        assert!(size("protobuf") < size("json"));
        assert!(size("cbor") < size("json"));
    }

    #[test]
    fn test_keep_samples_retains_raw_latencies() {
        let harness = BenchmarkHarness::new().warmup(0).iterations(5);
        let kept = SerializerBenchmark::new(SerializerRegistry::strict(), harness)
            .keep_samples(true)
            .run();
        assert!(kept
            .iter()
            .all(|s| s.latency.samples.as_ref().map(Vec::len) == Some(5)));

        let dropped = SerializerBenchmark::new(SerializerRegistry::strict(), harness).run();
        assert!(dropped.iter().all(|s| s.latency.samples.is_none()));
    }
}
