#![cfg_attr(not(test), deny(clippy::panic))]

use clap::Parser;
use draftroom_server::archive::create_archive;
use draftroom_server::config;
use draftroom_server::logging;
use draftroom_server::server::{DraftServer, ServerConfig};
use draftroom_server::websocket;
use std::net::SocketAddr;
use tokio::time::Duration;

/// Draftroom -- authoritative WebSocket coordination server for pick/ban drafts
#[derive(Parser, Debug)]
#[command(name = "draftroom-server")]
#[command(about = "Authoritative WebSocket coordination server for competitive pick/ban drafts")]
#[command(version)]
struct Cli {
    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines and pre-deployment checks.
    #[arg(long, short = 'c', conflicts_with = "print_config")]
    validate_config: bool,

    /// Print the loaded configuration to stdout (as JSON) and exit.
    /// Useful for debugging configuration loading from multiple sources.
    #[arg(long, conflicts_with = "validate_config")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from config.json / environment; defaults otherwise.
    let cfg = config::load();

    if cli.print_config {
        let json = serde_json::to_string_pretty(&cfg)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    let validation_result = config::validate_config(&cfg);

    if cli.validate_config {
        match validation_result {
            Ok(()) => {
                println!("Configuration validation passed");
                println!();
                println!("Configuration summary:");
                println!("  Bind address: {}", cfg.bind_address());
                println!("  WebSocket path: {}", cfg.ws_path);
                println!("  Archive backend: {:?}", cfg.archive.backend);
                println!(
                    "  Finished room grace: {}s",
                    cfg.server.finished_room_grace_secs
                );
                println!("  CORS origins: {}", cfg.security.cors_origins);
                return Ok(());
            }
            Err(e) => {
                eprintln!("Configuration validation failed:\n{e}");
                std::process::exit(1);
            }
        }
    }

    validation_result?;

    logging::init_with_config(&cfg.logging);

    let server_config = ServerConfig {
        finished_room_grace: Duration::from_secs(cfg.server.finished_room_grace_secs),
        client_queue_capacity: cfg.server.client_queue_capacity,
        max_message_size: cfg.security.max_message_size,
    };

    let archive = create_archive(&cfg.archive);
    let server = DraftServer::new(server_config, archive);

    let app = websocket::create_router(&cfg.ws_path, &cfg.security.cors_origins)
        .with_state(server);

    let listener = tokio::net::TcpListener::bind(cfg.bind_address()).await?;
    tracing::info!(
        address = %cfg.bind_address(),
        ws_path = %cfg.ws_path,
        "Draftroom server started"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
