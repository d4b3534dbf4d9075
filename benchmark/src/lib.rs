// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! kcpbench reporting
//!
//! Turns driver and serializer statistics into JSON reports with the
//! machine's system information, for later comparison across runs.
//!
//! # Benchmark Categories
//!
//! - **Lifecycle**: create/get/delete of ConfigMaps and ClusterRoles per wire format
//! - **Serialization**: encode-then-decode of the sample ClusterRole per wire format
//!
//! The criterion benches under `benches/` measure the same two categories.

pub mod metrics;
pub mod reporter;

pub use metrics::{BenchmarkCategory, BenchmarkReport, BenchmarkResult, SystemInfo};
pub use reporter::{JsonReporter, ReporterError};
