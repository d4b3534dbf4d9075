// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Lifecycle benchmarks.
//!
//! The in-memory groups always run and isolate codec cost inside the
//! lifecycle. The live group runs only when a kubeconfig is present, taken
//! from `KCPBENCH_KUBECONFIG` or the default `.kcp/admin.kubeconfig`.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use kcpbench_core::kubeconfig::DEFAULT_KUBECONFIG;
use kcpbench_core::naming::{base_name, run_id};
use kcpbench_core::{
    BenchOptions, BenchmarkDriver, ClientFactory, ContentType, InMemoryFactory,
    KubeClientFactory, KubeconfigLoader, Workload,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

const PARALLEL_WORKERS: usize = 8;

fn runtime() -> Runtime {
    Runtime::new().expect("Failed to build tokio runtime")
}

/// One lifecycle per iteration over the in-memory cluster.
fn bench_in_memory_lifecycle(c: &mut Criterion) {
    let rt = runtime();
    let factory = InMemoryFactory::default();
    let cancel = CancellationToken::new();

    for workload in Workload::ALL {
        let mut group = c.benchmark_group(format!("in_memory_{}", workload.name()));
        group.measurement_time(Duration::from_secs(5));

        for ct in ContentType::ALL {
            let client = factory.build(ct.mime()).expect("in-memory factory");
            let base = base_name(&run_id(workload.name(), ct.mime()));

            group.bench_function(BenchmarkId::from_parameter(ct.name()), |b| {
                b.to_async(&rt)
                    .iter(|| async { workload.run(&cancel, &client, &base).await.ok() });
            });
        }

        group.finish();
    }
}

/// The driver's worker pool under contention on one shared cluster.
fn bench_in_memory_parallel(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("in_memory_parallel");
    group.sample_size(20);

    for ct in ContentType::ALL {
        group.bench_function(BenchmarkId::new("clusterrole", ct.name()), |b| {
            b.to_async(&rt).iter_custom(|iters| async move {
                let driver = BenchmarkDriver::new(
                    InMemoryFactory::default(),
                    BenchOptions {
                        content_types: vec![ct],
                        concurrency: PARALLEL_WORKERS,
                        iteration_budget: iters.div_ceil(PARALLEL_WORKERS as u64),
                        ..BenchOptions::default()
                    },
                );
                let start = Instant::now();
                driver
                    .run(Workload::ClusterRole, &CancellationToken::new())
                    .await;
                start.elapsed()
            });
        });
    }

    group.finish();
}

fn live_kubeconfig() -> Option<PathBuf> {
    let path = std::env::var_os("KCPBENCH_KUBECONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_KUBECONFIG));
    path.exists().then_some(path)
}

/// Round trips against a live server, one lifecycle per iteration.
fn bench_live_lifecycle(c: &mut Criterion) {
    let Some(path) = live_kubeconfig() else {
        eprintln!("No kubeconfig found, skipping live lifecycle benchmarks");
        return;
    };
    let credentials = match KubeconfigLoader::load_file(&path) {
        Ok(credentials) => credentials,
        Err(e) => {
            eprintln!("Skipping live lifecycle benchmarks: {}", e);
            return;
        }
    };

    let rt = runtime();
    let factory = KubeClientFactory::new(credentials);
    let cancel = CancellationToken::new();

    for workload in Workload::ALL {
        let mut group = c.benchmark_group(format!("live_{}", workload.name()));
        group.sample_size(20);
        group.measurement_time(Duration::from_secs(15));

        for ct in ContentType::ALL {
            let client = match factory.build(ct.mime()) {
                Ok(client) => client,
                Err(e) => {
                    eprintln!("Skipping {}: {}", ct, e);
                    continue;
                }
            };
            let base = base_name(&run_id(workload.name(), ct.mime()));

            group.bench_function(BenchmarkId::from_parameter(ct.name()), |b| {
                b.to_async(&rt)
                    .iter(|| async { workload.run(&cancel, &client, &base).await.ok() });
            });
        }

        group.finish();
    }
}

criterion_group!(
    benches,
    bench_in_memory_lifecycle,
    bench_in_memory_parallel,
    bench_live_lifecycle,
);

criterion_main!(benches);
