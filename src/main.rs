//! Weather & traffic relay entry point.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use utoipa::OpenApi;

use weather_traffic_relay::api::{create_router, ApiDoc, AppState};
use weather_traffic_relay::config::{redact, Config};
use weather_traffic_relay::metrics;
use weather_traffic_relay::provider::RelayClient;
use weather_traffic_relay::utils::shutdown_signal;

/// Weather & traffic relay.
#[derive(Parser, Debug)]
#[command(name = "weather-traffic-relay")]
#[command(about = "Relay current weather (OpenWeather) and live traffic (TomTom) by lat/lon")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP relay (default).
    Serve {
        /// Interface to bind, overrides HOST.
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on, overrides PORT.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Print the OpenAPI document.
    Openapi,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // .env may carry RUST_LOG, so load it before the filter reads the environment
    dotenvy::dotenv().ok();

    let filter = if args.verbose {
        EnvFilter::new("weather_traffic_relay=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let fmt_layer = if args.json_logs {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .init();

    match args.command {
        Some(Command::Serve { host, port }) => cmd_serve(host, port).await,
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::Openapi) => cmd_openapi(),
        None => cmd_serve(None, None).await,
    }
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("WEATHER & TRAFFIC RELAY - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration check failed"));
        }
    };

    print!("Building provider client... ");
    match RelayClient::new(&config) {
        Ok(_) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Provider client could not be built"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  OpenWeather Key: {}", redact(&config.openweather_api_key));
    println!("  TomTom Key: {}", redact(&config.tomtom_api_key));
    println!("  OpenWeather URL: {}", config.openweather_url);
    println!("  TomTom URL: {}", config.tomtom_url);
    println!("  Listen: {}:{}", config.host, config.port);
    println!("  Upstream Timeout: {}ms", config.upstream_timeout_ms);
    println!(
        "  TLS Verification: {}",
        if config.insecure_skip_tls_verify { "DISABLED" } else { "Enabled" }
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Print the OpenAPI document.
fn cmd_openapi() -> anyhow::Result<()> {
    let doc = ApiDoc::openapi()
        .to_pretty_json()
        .context("failed to render OpenAPI document")?;
    println!("{}", doc);
    Ok(())
}

/// Run the HTTP relay until a shutdown signal arrives.
async fn cmd_serve(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Override with CLI args if provided
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    info!("Configuration loaded successfully");
    info!("Weather provider: {}", config.openweather_url);
    info!("Traffic provider: {}", config.tomtom_url);
    info!("Upstream timeout: {}ms", config.upstream_timeout_ms);

    if config.insecure_skip_tls_verify {
        warn!("TLS certificate verification is DISABLED for provider calls");
    }

    let prometheus = metrics::install_recorder().context("failed to install metrics recorder")?;
    let client = RelayClient::new(&config).context("failed to build provider client")?;
    let state = AppState::new(client).with_metrics(prometheus);

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
