// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! kcpbench CLI
//!
//! Command-line interface for the wire-format benchmarks.

use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;

mod commands;

/// kcpbench - wire-format benchmarks for a multi-cluster API client
#[derive(Parser)]
#[command(name = "kcpbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (optional; defaults apply when absent)
    #[arg(short, long, default_value = kcpbench_core::config::DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a lifecycle workload over the content-type matrix
    Run(RunArgs),

    /// Measure encode-then-decode of the sample object per serializer
    Serialize {
        /// Measured iterations per serializer
        #[arg(short, long)]
        iterations: Option<u64>,

        /// Warmup iterations per serializer
        #[arg(short, long)]
        warmup: Option<u64>,

        /// Directory to write the JSON report to
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List namespaces of a logical cluster
    Namespaces {
        /// Kubeconfig path
        #[arg(short, long)]
        kubeconfig: Option<String>,

        /// Kubeconfig context
        #[arg(long)]
        context: Option<String>,

        /// Logical cluster path
        #[arg(long)]
        cluster: Option<String>,

        /// Label selector, e.g. `team=red,tier!=cache`
        #[arg(short = 'l', long)]
        selector: Option<String>,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: String,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Workload: configmap or clusterrole
    #[arg(short, long)]
    pub workload: String,

    /// Content types to measure, in order (repeatable; defaults to the full matrix)
    #[arg(short = 't', long = "content-type")]
    pub content_types: Vec<String>,

    /// Worker tasks per content type
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Invocations per worker
    #[arg(short = 'n', long)]
    pub iterations: Option<u64>,

    /// Kubeconfig path
    #[arg(short, long)]
    pub kubeconfig: Option<String>,

    /// Kubeconfig context
    #[arg(long)]
    pub context: Option<String>,

    /// Logical cluster path
    #[arg(long)]
    pub cluster: Option<String>,

    /// Run against an in-process server instead of the kubeconfig's
    #[arg(long)]
    pub dry_run: bool,

    /// Directory to write the JSON report to
    #[arg(short, long)]
    pub output: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling in-flight invocations");
            on_interrupt.cancel();
        }
    });

    // Dispatch to command handlers
    match cli.command {
        Commands::Run(args) => commands::run::execute(&cli.config, args, &cancel).await,
        Commands::Serialize {
            iterations,
            warmup,
            output,
        } => commands::serialize::execute(&cli.config, iterations, warmup, output).await,
        Commands::Namespaces {
            kubeconfig,
            context,
            cluster,
            selector,
        } => {
            commands::namespaces::execute(&cli.config, kubeconfig, context, cluster, selector)
                .await
        }
        Commands::Validate { file } => commands::validate::execute(&file).await,
    }
}
