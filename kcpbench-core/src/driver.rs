// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! The parallel lifecycle benchmark.
//!
//! For each content type, in matrix order, the driver builds one client and
//! runs a fixed pool of worker tasks against it. Workers share the client, the
//! base name and an atomic budget of `concurrency * iteration_budget` tickets;
//! each invocation consumes one ticket. A failing or panicking invocation is
//! recorded and its worker moves on.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::client::ClientFactory;
use crate::content_type::ContentType;
use crate::error::WorkloadError;
use crate::harness::Timer;
use crate::naming::{base_name, run_id};
use crate::stats::{LatencyMetrics, ThroughputMetrics};
use crate::transport::ClusterPath;
use crate::workload::{Step, Workload};

/// Knobs of one driver run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchOptions {
    /// Formats to measure, in order.
    pub content_types: Vec<ContentType>,
    /// Worker tasks per format.
    pub concurrency: usize,
    /// Invocations per worker; the pool shares `concurrency * iteration_budget`.
    pub iteration_budget: u64,
    /// Logical cluster the workloads target.
    pub cluster: ClusterPath,
    /// Keep raw latency samples in the stats.
    pub keep_samples: bool,
}

impl Default for BenchOptions {
    fn default() -> Self {
        Self {
            content_types: ContentType::ALL.to_vec(),
            concurrency: num_cpus::get(),
            iteration_budget: 100,
            cluster: ClusterPath::root(),
            keep_samples: false,
        }
    }
}

impl BenchOptions {
    pub fn total_invocations(&self) -> u64 {
        (self.concurrency as u64).saturating_mul(self.iteration_budget)
    }
}

/// One failed invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationFailure {
    /// Index of the worker, absent when the worker task itself was lost.
    pub worker: Option<usize>,
    /// Step that failed, absent when the invocation panicked.
    pub step: Option<Step>,
    pub cancelled: bool,
    pub message: String,
}

/// Aggregated result of one workload over one content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatStats {
    pub workload: Workload,
    pub content_type: ContentType,
    pub run_id: String,
    pub base_name: String,
    pub concurrency: usize,
    /// Invocations that ran to an outcome (success or failure, not cancelled).
    pub completed: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub cancelled: u64,
    pub latency: LatencyMetrics,
    pub throughput: ThroughputMetrics,
    pub failures: Vec<InvocationFailure>,
    /// Set when no client could be built; no invocation ran.
    pub configuration_error: Option<String>,
}

impl FormatStats {
    fn configuration_failure(
        workload: Workload,
        content_type: ContentType,
        concurrency: usize,
        message: String,
    ) -> Self {
        let id = run_id(workload.name(), content_type.mime());
        Self {
            workload,
            content_type,
            base_name: base_name(&id),
            run_id: id,
            concurrency,
            completed: 0,
            succeeded: 0,
            failed: 0,
            cancelled: 0,
            latency: LatencyMetrics::default(),
            throughput: ThroughputMetrics::default(),
            failures: Vec::new(),
            configuration_error: Some(message),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.configuration_error.is_none() && self.failed == 0 && self.cancelled == 0
    }
}

#[derive(Default)]
struct WorkerOutcome {
    samples: Vec<u64>,
    succeeded: u64,
    cancelled: u64,
    failures: Vec<InvocationFailure>,
}

impl WorkerOutcome {
    fn record(&mut self, worker: usize, joined: Result<(Result<(), WorkloadError>, u64), JoinError>) {
        match joined {
            Ok((Ok(()), ns)) => {
                self.succeeded += 1;
                self.samples.push(ns);
            }
            Ok((Err(e), ns)) => {
                let cancelled = matches!(e, WorkloadError::Cancelled { .. });
                if cancelled {
                    self.cancelled += 1;
                } else {
                    self.samples.push(ns);
                    tracing::debug!(worker = worker, error = %e, "Invocation failed");
                }
                self.failures.push(InvocationFailure {
                    worker: Some(worker),
                    step: Some(e.step()),
                    cancelled,
                    message: e.to_string(),
                });
            }
            Err(e) => {
                let cancelled = e.is_cancelled();
                if cancelled {
                    self.cancelled += 1;
                } else {
                    tracing::warn!(worker = worker, error = %e, "Invocation panicked");
                }
                self.failures.push(InvocationFailure {
                    worker: Some(worker),
                    step: None,
                    cancelled,
                    message: e.to_string(),
                });
            }
        }
    }
}

/// Runs workloads over the content-type matrix.
pub struct BenchmarkDriver<F> {
    factory: F,
    options: BenchOptions,
}

impl<F: ClientFactory> BenchmarkDriver<F> {
    pub fn new(factory: F, options: BenchOptions) -> Self {
        Self { factory, options }
    }

    /// Run `workload` once per configured content type, in order.
    pub async fn run(&self, workload: Workload, cancel: &CancellationToken) -> Vec<FormatStats> {
        let mut results = Vec::with_capacity(self.options.content_types.len());
        for &content_type in &self.options.content_types {
            if cancel.is_cancelled() {
                tracing::info!(content_type = %content_type, "Skipping format after cancellation");
                break;
            }
            results.push(self.run_format(workload, content_type, cancel).await);
        }
        results
    }

    /// Run `workload` over one content type.
    pub async fn run_format(
        &self,
        workload: Workload,
        content_type: ContentType,
        cancel: &CancellationToken,
    ) -> FormatStats {
        let concurrency = self.options.concurrency.max(1);

        let client = match self.factory.build(content_type.mime()) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                tracing::warn!(
                    workload = %workload,
                    content_type = %content_type,
                    error = %e,
                    "Failed to build client, skipping format"
                );
                return FormatStats::configuration_failure(
                    workload,
                    content_type,
                    concurrency,
                    e.to_string(),
                );
            }
        };

        let id = run_id(workload.name(), content_type.mime());
        let base: Arc<str> = Arc::from(base_name(&id));
        let total = (concurrency as u64).saturating_mul(self.options.iteration_budget);
        let budget = Arc::new(AtomicU64::new(total));

        tracing::info!(
            run_id = %id,
            concurrency = concurrency,
            invocations = total,
            "Starting sub-benchmark"
        );

        let started = Instant::now();
        let cluster = Arc::new(self.options.cluster.clone());
        let mut workers = JoinSet::new();
        for worker in 0..concurrency {
            let client = Arc::clone(&client);
            let budget = Arc::clone(&budget);
            let base = Arc::clone(&base);
            let cluster = Arc::clone(&cluster);
            let cancel = cancel.clone();

            workers.spawn(async move {
                let mut outcome = WorkerOutcome::default();
                // One invocation at a time, each in its own task to contain panics.
                let mut inflight = JoinSet::new();
                while !cancel.is_cancelled() && claim(&budget) {
                    let client = Arc::clone(&client);
                    let base = Arc::clone(&base);
                    let cluster = Arc::clone(&cluster);
                    let token = cancel.clone();
                    inflight.spawn(async move {
                        let timer = Timer::start();
                        let result = workload
                            .run_in(&token, client.as_ref(), &cluster, &base)
                            .await;
                        (result, timer.stop())
                    });
                    let Some(joined) = inflight.join_next().await else {
                        break;
                    };
                    outcome.record(worker, joined);
                }
                outcome
            });
        }

        let mut samples = Vec::with_capacity(total.min(1 << 20) as usize);
        let mut succeeded = 0;
        let mut cancelled = 0;
        let mut failures = Vec::new();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(outcome) => {
                    samples.extend(outcome.samples);
                    succeeded += outcome.succeeded;
                    cancelled += outcome.cancelled;
                    failures.extend(outcome.failures);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Worker task did not finish");
                    failures.push(InvocationFailure {
                        worker: None,
                        step: None,
                        cancelled: e.is_cancelled(),
                        message: e.to_string(),
                    });
                }
            }
        }
        let elapsed = started.elapsed();

        let failed = failures.iter().filter(|f| !f.cancelled).count() as u64;
        let completed = succeeded + failed;
        let latency = LatencyMetrics::from_samples(samples, self.options.keep_samples);
        let throughput = ThroughputMetrics::calculate(completed, 0, elapsed);

        tracing::info!(
            run_id = %id,
            succeeded = succeeded,
            failed = failed,
            cancelled = cancelled,
            mean = %LatencyMetrics::format_latency(latency.mean_ns as u64),
            ops_per_sec = throughput.ops_per_sec,
            "Finished sub-benchmark"
        );

        FormatStats {
            workload,
            content_type,
            run_id: id,
            base_name: base.to_string(),
            concurrency,
            completed,
            succeeded,
            failed,
            cancelled,
            latency,
            throughput,
            failures,
            configuration_error: None,
        }
    }
}

/// Take one ticket from the shared budget.
fn claim(budget: &AtomicU64) -> bool {
    budget
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        .is_ok()
}
