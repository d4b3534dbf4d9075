// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Serializer microbenchmarks.
//!
//! Measures encode, decode and the paired encode-then-decode of the sample
//! ClusterRole for every strict serializer in the registry.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kcpbench_core::microbench::SAMPLE_NAME;
use kcpbench_core::resources::{sample_cluster_role, ClusterRole};
use kcpbench_core::SerializerRegistry;
use std::time::Duration;

fn bench_encode(c: &mut Criterion) {
    let registry = SerializerRegistry::strict();
    let sample = sample_cluster_role(SAMPLE_NAME);

    let mut group = c.benchmark_group("serialization_encode");
    group.measurement_time(Duration::from_secs(5));

    for entry in registry.iter() {
        let size = entry.serializer.encode(&sample).map(|b| b.len()).unwrap_or(0);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(entry.name), entry, |b, entry| {
            b.iter(|| entry.serializer.encode(black_box(&sample)));
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let registry = SerializerRegistry::strict();
    let sample = sample_cluster_role(SAMPLE_NAME);

    let mut group = c.benchmark_group("serialization_decode");
    group.measurement_time(Duration::from_secs(5));

    for entry in registry.iter() {
        let bytes = entry
            .serializer
            .encode(&sample)
            .expect("sample must encode");
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(entry.name), &bytes, |b, bytes| {
            b.iter(|| entry.serializer.decode::<ClusterRole>(black_box(bytes)));
        });
    }

    group.finish();
}

/// The paired operation the `serialize` command reports.
fn bench_round_trip(c: &mut Criterion) {
    let registry = SerializerRegistry::strict();
    let sample = sample_cluster_role(SAMPLE_NAME);

    let mut group = c.benchmark_group("serialization_round_trip");
    group.measurement_time(Duration::from_secs(5));

    for entry in registry.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(entry.name), entry, |b, entry| {
            b.iter(|| entry.round_trip(black_box(&sample)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_round_trip);

criterion_main!(benches);
