use anyhow::Result;
use axum::Router;
use clap::Parser;
use songrec_core::BuildOptions;
use songrec_server::{build_app, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "songrec-server")]
#[command(about = "Serve lyrics-based song recommendations over HTTP")]
struct Args {
    /// CSV dataset with artist, song, link and text columns
    #[arg(long, env = "CSV_PATH", default_value = "spotify_millsongdata.csv")]
    dataset: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Vocabulary size cap
    #[arg(long, default_value_t = songrec_core::engine::DEFAULT_MAX_FEATURES)]
    max_features: usize,
    /// Token required by POST /admin/reload
    #[arg(long, env = "ADMIN_TOKEN", hide_env_values = true)]
    admin_token: Option<String>,
    /// Comma-separated CORS origins (any origin when unset)
    #[arg(long, env = "CORS_ALLOW_ORIGIN")]
    cors_allow_origin: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = ServerConfig {
        dataset: args.dataset,
        build: BuildOptions { max_features: args.max_features, ..BuildOptions::default() },
        admin_token: args.admin_token,
        cors_allow_origin: args.cors_allow_origin,
    };
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
