// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// nanobridge — host shell for the GeminiNano bridge.
//
// Entry point. Initialises logging, loads configuration, registers the bridge
// over the platform's capabilities and serves JSON-line calls on stdin, one
// JSON-line outcome per call on stdout.

mod transport;

use nanobridge_core::BridgeConfig;
use nanobridge_core::error::Result;
use nanobridge_plugin::{Bridge, completion_channel};

/// Environment variable naming the JSON config file.
const CONFIG_ENV: &str = "NANOBRIDGE_CONFIG";

#[tokio::main]
async fn main() {
    // stdout carries the transport, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("nanobridge starting");

    if let Err(e) = run().await {
        tracing::error!(error = %e, "nanobridge stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => BridgeConfig::load(path)?,
        None => BridgeConfig::default(),
    };

    let capabilities = nanobridge_bridge::platform_capabilities();
    let bridge = Bridge::from_config(&config, &capabilities);

    let (completion, queue) = completion_channel();
    let writer = tokio::spawn(transport::write_completions(queue, tokio::io::stdout()));

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let calls = transport::serve_calls(&bridge, completion, stdin).await?;

    // Outstanding generations finish before the writer sees the queue close.
    let written = writer
        .await
        .map_err(|e| nanobridge_core::BridgeError::Bridge(format!("completion writer failed: {e}")))??;
    tracing::info!(calls, written, "input closed; all calls completed");
    Ok(())
}
