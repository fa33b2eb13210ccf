//! HTML precompressor.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                 HTML PRECOMPRESSOR               │
//!                      │                                                  │
//!   POST /{id}         │  ┌─────────┐    ┌────────────┐    ┌──────────┐   │
//!   POST /batch  ──────┼─▶│  http   │───▶│compression │───▶│  relay   │───┼──▶ HTML storage
//!                      │  │handlers │    │ (zstd dict)│    │ (reqwest)│   │    ?is_precompressed=true
//!   200 / 400 / 500 ◀──┼──│         │◀───────────────────────│          │◀──┼──
//!                      │  └─────────┘                       └──────────┘   │
//!                      │                                                  │
//!                      │  config · lifecycle · observability (/metrics)   │
//!                      └──────────────────────────────────────────────────┘
//! ```
//!
//! Single items are acknowledged before compression and relayed in the
//! background; batches are compressed and relayed before the response.

use clap::Parser;

use html_precompressor::config::Cli;
use html_precompressor::lifecycle::{signals, startup, Shutdown};
use html_precompressor::observability::logging;
use html_precompressor::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = startup::resolve_config(&cli)?;

    logging::init(&config.observability.log_filter);
    tracing::info!("html-precompressor v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        endpoint = %config.downstream.endpoint,
        timeout_secs = config.downstream.timeout_secs,
        dictionary = %config.dictionary.path.display(),
        level = config.dictionary.level,
        "Configuration loaded"
    );

    // Without a dictionary nothing can be served.
    let dictionary = startup::load_dictionary(&config.dictionary)?;

    let listener = startup::bind(&config.listener).await?;
    let server = HttpServer::new(config, dictionary)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
