// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Latency and throughput statistics.
//!
//! Samples are nanoseconds. Percentiles use the nearest-rank index over the
//! sorted samples, so every reported value is an observed sample.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Latency distribution of one measured operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyMetrics {
    /// Number of samples
    pub count: u64,
    /// Minimum observed latency in nanoseconds
    pub min_ns: u64,
    /// Maximum observed latency in nanoseconds
    pub max_ns: u64,
    /// Arithmetic mean latency in nanoseconds
    pub mean_ns: f64,
    /// Median (p50) latency in nanoseconds
    pub median_ns: u64,
    /// 95th percentile latency in nanoseconds
    pub p95_ns: u64,
    /// 99th percentile latency in nanoseconds
    pub p99_ns: u64,
    /// Standard deviation in nanoseconds
    pub std_dev_ns: f64,
    /// Raw samples, downsampled above 10 000 entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<Vec<u64>>,
}

impl LatencyMetrics {
    /// Calculate metrics from latency samples in nanoseconds.
    pub fn from_samples(mut samples: Vec<u64>, keep_raw: bool) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        samples.sort_unstable();
        let len = samples.len();

        let sum: u128 = samples.iter().map(|&s| u128::from(s)).sum();
        let mean_ns = sum as f64 / len as f64;

        let variance: f64 = samples
            .iter()
            .map(|&x| {
                let diff = x as f64 - mean_ns;
                diff * diff
            })
            .sum::<f64>()
            / len as f64;

        let raw = if keep_raw {
            if len > 10_000 {
                Some(samples.iter().step_by(len / 1000).copied().collect())
            } else {
                Some(samples.clone())
            }
        } else {
            None
        };

        Self {
            count: len as u64,
            min_ns: samples[0],
            max_ns: samples[len - 1],
            mean_ns,
            median_ns: samples[len / 2],
            p95_ns: percentile(&samples, 0.95),
            p99_ns: percentile(&samples, 0.99),
            std_dev_ns: variance.sqrt(),
            samples: raw,
        }
    }

    /// Format latency in human-readable form (auto-selects ns/μs/ms/s).
    pub fn format_latency(ns: u64) -> String {
        if ns < 1_000 {
            format!("{}ns", ns)
        } else if ns < 1_000_000 {
            format!("{:.2}μs", ns as f64 / 1_000.0)
        } else if ns < 1_000_000_000 {
            format!("{:.2}ms", ns as f64 / 1_000_000.0)
        } else {
            format!("{:.2}s", ns as f64 / 1_000_000_000.0)
        }
    }
}

fn percentile(sorted: &[u64], q: f64) -> u64 {
    let idx = ((sorted.len() as f64 * q) as usize).min(sorted.len() - 1);
    sorted[idx]
}

/// Saturating nanoseconds of a duration.
pub fn duration_ns(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Operations and bytes per second over a wall-clock window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThroughputMetrics {
    pub ops_per_sec: f64,
    pub bytes_per_sec: f64,
    pub total_ops: u64,
    pub total_bytes: u64,
    pub duration_ns: u64,
}

impl ThroughputMetrics {
    pub fn calculate(ops: u64, bytes: u64, duration: Duration) -> Self {
        let secs = duration.as_secs_f64();
        let rate = |n: u64| if secs > 0.0 { n as f64 / secs } else { 0.0 };
        Self {
            ops_per_sec: rate(ops),
            bytes_per_sec: rate(bytes),
            total_ops: ops,
            total_bytes: bytes,
            duration_ns: duration_ns(duration),
        }
    }

    pub fn format_bytes_per_sec(bps: f64) -> String {
        if bps < 1_000.0 {
            format!("{:.2} B/s", bps)
        } else if bps < 1_000_000.0 {
            format!("{:.2} KB/s", bps / 1_000.0)
        } else if bps < 1_000_000_000.0 {
            format!("{:.2} MB/s", bps / 1_000_000.0)
        } else {
            format!("{:.2} GB/s", bps / 1_000_000_000.0)
        }
    }
}
