//! livehue color server
//!
//! Run with: livehue-server [--help]
//!
//! All settings come from the environment:
//!
//!   PORT=3000 HOST=0.0.0.0 livehue-server
//!   LIVEHUE_MODE=simulation livehue-server
//!   LIVEHUE_SOURCES=https://www.youtube.com/watch?v=xyz,https://example.com/feed.m3u8 livehue-server
//!
//! Viewers connect to `ws://HOST:PORT/ws`.

use livehue::{ColorServer, ServerConfig};

fn print_usage() {
    eprintln!("Usage: livehue-server");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PORT                            HTTP port (default: 3000)");
    eprintln!("  HOST                            Bind address (default: 0.0.0.0)");
    eprintln!("  LIVEHUE_MODE                    live | simulation (default: live)");
    eprintln!("  LIVEHUE_SOURCES                 Comma-separated candidate sources");
    eprintln!("  LIVEHUE_UPDATE_INTERVAL_MS      Broadcast interval");
    eprintln!("  LIVEHUE_CAPTURE_TIMEOUT_MS      Frame sampling deadline");
    eprintln!("  LIVEHUE_RESOLVE_TIMEOUT_MS      Source resolution deadline");
    eprintln!("  LIVEHUE_BLACK_THRESHOLD         Channel floor for a usable frame (default: 1)");
    eprintln!("  LIVEHUE_SAMPLING                uniform | center (default: uniform)");
    eprintln!("  LIVEHUE_HEARTBEAT_INTERVAL_MS   WebSocket ping interval");
    eprintln!("  LIVEHUE_SCRATCH_DIR             Transient frame directory (default: ./temp)");
    eprintln!("  LIVEHUE_PUBLIC_DIR              Static files, empty to disable (default: ./public)");
    eprintln!("  ALLOWED_ORIGINS                 Comma-separated CORS origins (default: any)");
    eprintln!("  RUST_LOG                        Log filter");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::args().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("livehue=info".parse()?)
                .add_directive("livehue_server=info".parse()?),
        )
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        addr = %config.bind_addr,
        mode = config.capture.mode.as_str(),
        interval_ms = config.hub.tick_interval.as_millis() as u64,
        "Starting livehue"
    );

    let server = match ColorServer::new(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start");
            std::process::exit(1);
        }
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    if let Err(e) = server.run_until(shutdown).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
    Ok(())
}
