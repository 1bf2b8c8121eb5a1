//! KLF-200 bridge binary.
//!
//! # Usage
//!
//! ```bash
//! # Password via flag
//! klf-bridge --gateway 192.168.1.30 --password wifipassword
//!
//! # Password via environment
//! KLF_PASSWORD=wifipassword klf-bridge --gateway klf200.local
//! ```

use std::future::IntoFuture;

use clap::Parser;
use klf_client::GatewayClient;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// REST bridge for the Velux KLF-200 gateway
#[derive(Parser, Debug)]
#[command(name = "klf-bridge")]
#[command(about = "Expose a Velux KLF-200 gateway over a JSON/HTTP API")]
#[command(version)]
struct Args {
    /// Gateway host name or IP address
    #[arg(short, long)]
    gateway: String,

    /// Gateway TCP port
    #[arg(long, default_value_t = klf_client::transport::GATEWAY_PORT)]
    gateway_port: u16,

    /// Gateway password (the Wi-Fi password printed on the unit)
    #[arg(short, long, env = "KLF_PASSWORD", hide_env_values = true)]
    password: String,

    /// Address for the REST listener
    #[arg(short, long, default_value = "0.0.0.0:52280")]
    listen: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("connecting to gateway {}:{}", args.gateway, args.gateway_port);
    let client = GatewayClient::connect(&args.gateway, args.gateway_port).await?;

    if !client.authenticate(&args.password).await? {
        tracing::error!("cannot authenticate on the gateway: invalid credentials");
        std::process::exit(1);
    }

    let keep_alive = client.spawn_keep_alive();

    let app = klf_bridge::router(client.clone());
    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    tracing::info!("REST server listening on {}", listener.local_addr()?);

    tokio::select! {
        served = axum::serve(listener, app).into_future() => {
            served?;
        },
        () = client.closed() => {
            keep_alive.abort();
            tracing::error!("gateway connection lost, shutting down");
            return Err("gateway connection lost".into());
        },
    }

    Ok(())
}
