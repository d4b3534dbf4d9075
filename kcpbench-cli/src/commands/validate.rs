// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `kcpbench validate` command - Validate configuration file.

use kcpbench_core::ConfigLoader;

pub async fn execute(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file, "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Connection:");
            println!("  Kubeconfig:         {}", config.kubeconfig.display());
            println!(
                "  Context:            {}",
                config.context.as_deref().unwrap_or("(current)")
            );
            println!("  Cluster:            {}", config.cluster);
            match config.timeout {
                Some(timeout) => println!("  Request Timeout:    {}ms", timeout.as_millis()),
                None => println!("  Request Timeout:    none"),
            }
            println!();
            println!("Workload Settings:");
            println!("  Concurrency:        {}", config.concurrency);
            println!("  Iterations/worker:  {}", config.iteration_budget);
            println!("  Warmup Iterations:  {}", config.warmup_iterations);
            println!("  Serializer Iters:   {}", config.serializer_iterations);
            println!("  Output Directory:   {}", config.output_dir.display());
            println!();
            println!("Content Types ({}):", config.content_types.len());
            for ct in &config.content_types {
                println!("  - {} ({})", ct.name(), ct.mime());
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
