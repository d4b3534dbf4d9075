// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Timing primitives for fallible operations.

use std::fmt::Display;
use std::time::{Duration, Instant};

use crate::stats::duration_ns;

/// Upper bound on the sample buffer reserved up front.
const MAX_PREALLOCATED_SAMPLES: u64 = 1 << 20;

/// Outcome of a measured loop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HarnessRun {
    /// Latency of every successful measured iteration, in nanoseconds.
    pub samples: Vec<u64>,
    /// Failed measured iterations.
    pub errors: u64,
    /// Message of the first failure.
    pub first_error: Option<String>,
    /// Wall time of the measured phase.
    pub elapsed: Duration,
}

/// Runs an operation through warmup and measurement phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkHarness {
    warmup_iterations: u64,
    measurement_iterations: u64,
}

impl BenchmarkHarness {
    pub fn new() -> Self {
        Self {
            warmup_iterations: 10,
            measurement_iterations: 100,
        }
    }

    pub fn warmup(mut self, iterations: u64) -> Self {
        self.warmup_iterations = iterations;
        self
    }

    pub fn iterations(mut self, iterations: u64) -> Self {
        self.measurement_iterations = iterations;
        self
    }

    pub fn warmup_iterations(&self) -> u64 {
        self.warmup_iterations
    }

    pub fn measurement_iterations(&self) -> u64 {
        self.measurement_iterations
    }

    /// Time each call of `operation`. Failures are counted, never propagated.
    ///
    /// Warmup results are discarded, including their errors.
    pub fn run<T, E, F>(&self, mut operation: F) -> HarnessRun
    where
        E: Display,
        F: FnMut() -> Result<T, E>,
    {
        for _ in 0..self.warmup_iterations {
            let _ = operation();
        }

        let mut run = HarnessRun {
            samples: Vec::with_capacity(sample_capacity(self.measurement_iterations)),
            ..HarnessRun::default()
        };
        let started = Instant::now();
        for _ in 0..self.measurement_iterations {
            let timer = Timer::start();
            let result = operation();
            let ns = timer.stop();
            match result {
                Ok(value) => {
                    std::hint::black_box(value);
                    run.samples.push(ns);
                }
                Err(e) => {
                    run.errors += 1;
                    if run.first_error.is_none() {
                        run.first_error = Some(e.to_string());
                    }
                }
            }
        }
        run.elapsed = started.elapsed();
        run
    }
}

impl Default for BenchmarkHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn sample_capacity(iterations: u64) -> usize {
    usize::try_from(iterations.min(MAX_PREALLOCATED_SAMPLES)).unwrap_or(0)
}

/// Timer for measuring individual operations.
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Stop the timer and return elapsed nanoseconds.
    pub fn stop(self) -> u64 {
        duration_ns(self.start.elapsed())
    }
}
