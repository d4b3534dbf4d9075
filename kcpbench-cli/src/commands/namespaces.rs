// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `kcpbench namespaces` command - List namespaces of a logical cluster.

use kcpbench_core::resources::Namespace;
use kcpbench_core::{
    Api, BenchConfig, BenchResult, ClientFactory, ClusterClient, ConfigurationError, ContentType,
    Credentials, KubeClientFactory,
};

/// Wire format of the namespace listing.
const LIST_FORMAT: ContentType = ContentType::Protobuf;

pub async fn execute(
    config_path: &str,
    kubeconfig: Option<String>,
    context: Option<String>,
    cluster: Option<String>,
    selector: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;
    super::apply_connection_overrides(&mut config, kubeconfig, context, cluster)?;

    let namespaces = fetch(&config, selector.as_deref()).await?;

    if namespaces.is_empty() {
        println!("No namespaces in {}", config.cluster);
        return Ok(());
    }

    println!("╔════════════════════════════════════════╦════════════╗");
    println!("║ Namespace                              ║ Phase      ║");
    println!("╠════════════════════════════════════════╬════════════╣");
    for ns in &namespaces {
        let phase = ns
            .status
            .as_ref()
            .and_then(|s| s.phase.as_deref())
            .unwrap_or("-");
        println!(
            "║ {:<38} ║ {:<10} ║",
            ns.metadata.name().unwrap_or("<unnamed>"),
            phase
        );
    }
    println!("╚════════════════════════════════════════╩════════════╝");
    println!("{} namespace(s) in {}", namespaces.len(), config.cluster);

    Ok(())
}

async fn fetch(config: &BenchConfig, selector: Option<&str>) -> BenchResult<Vec<Namespace>> {
    let credentials = super::load_credentials(config)?;
    let client = list_client(credentials, config)?;

    let namespaces = Api::<_, Namespace>::all(&client, &config.cluster)
        .list(selector)
        .await?;
    Ok(namespaces)
}

fn list_client(
    credentials: Credentials,
    config: &BenchConfig,
) -> Result<ClusterClient, ConfigurationError> {
    let mut factory = KubeClientFactory::new(credentials);
    if let Some(timeout) = config.timeout {
        factory = factory.with_timeout(timeout);
    }
    factory.build(LIST_FORMAT.mime())
}
