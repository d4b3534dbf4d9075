//! kcpbench core library
//!
//! Measures how the wire format (JSON, YAML, Protobuf, CBOR) affects a
//! multi-cluster API client talking to a kcp server. Provides the wire
//! codecs, a cluster-aware HTTP transport, the lifecycle workloads, the
//! parallel benchmark driver and the serializer micro-benchmark.

pub mod client;
pub mod codec;
pub mod config;
pub mod content_type;
pub mod driver;
pub mod error;
pub mod harness;
pub mod kubeconfig;
pub mod memory;
pub mod microbench;
pub mod naming;
pub mod ratelimit;
pub mod registry;
pub mod resources;
pub mod stats;
pub mod transport;
pub mod workload;

// Re-export commonly used types
pub use client::{ClientConfig, ClientFactory, ClusterClient, KubeClientFactory};
pub use codec::Serializer;
pub use config::{BenchConfig, ConfigLoader};
pub use content_type::ContentType;
pub use driver::{BenchOptions, BenchmarkDriver, FormatStats, InvocationFailure};
pub use error::{
    BenchError, BenchResult, ConfigurationError, SerializationError, TransportError,
    WorkloadError,
};
pub use harness::BenchmarkHarness;
pub use kubeconfig::{Credentials, KubeconfigLoader};
pub use memory::{InMemoryCluster, InMemoryFactory, InMemoryTransport};
pub use microbench::{SerializerBenchmark, SerializerStats};
pub use registry::{SerializerEntry, SerializerRegistry};
pub use stats::{LatencyMetrics, ThroughputMetrics};
pub use transport::{Api, ClusterPath, Scope, Transport};
pub use workload::{ResourceKind, Step, Workload};
