//! RingCache Daemon - HTTP peer of a distributed key/value cache

mod client;
mod error;
mod pool;
mod server;
mod source;

use anyhow::{Context, Result};
use clap::Parser;
use ringcache::GroupRegistry;
use ringhash::{RingConfig, DEFAULT_REPLICAS};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info};

use crate::client::DEFAULT_PEER_TIMEOUT;
use crate::pool::{HttpPool, DEFAULT_BASE_PATH};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bind address for the peer endpoint
    #[arg(short, long, default_value = "127.0.0.1:8001")]
    bind: String,

    /// URL other peers use to reach this node (defaults to http://<bind>)
    #[arg(long)]
    self_url: Option<String>,

    /// Path prefix of the peer endpoint
    #[arg(long, default_value = DEFAULT_BASE_PATH)]
    base_path: String,

    /// Comma separated peer URLs, including this node
    #[arg(short, long, value_delimiter = ',')]
    peers: Vec<String>,

    /// Virtual replicas per peer on the hash ring
    #[arg(short, long, default_value_t = DEFAULT_REPLICAS)]
    replicas: usize,

    /// Cache budget per group in bytes
    #[arg(short, long, default_value_t = 2 << 10)]
    cache_bytes: usize,

    /// Timeout for one request to a remote peer, in seconds
    #[arg(long, default_value_t = DEFAULT_PEER_TIMEOUT.as_secs())]
    peer_timeout: u64,

    /// Name of the demo group
    #[arg(short, long, default_value = "scores")]
    group: String,

    /// Also serve the client API (`GET /api?key=`) on this address
    #[arg(long)]
    api: Option<String>,

    /// Health check mode (for Docker)
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    if args.health {
        match TcpStream::connect(&args.bind).await {
            Ok(_) => {
                println!("OK");
                std::process::exit(0);
            }
            Err(_) => {
                eprintln!("FAILED");
                std::process::exit(1);
            }
        }
    }

    info!("Starting RingCache Daemon v{}", env!("CARGO_PKG_VERSION"));

    let self_url = args
        .self_url
        .clone()
        .unwrap_or_else(|| format!("http://{}", args.bind));

    let registry = Arc::new(GroupRegistry::new());
    let group = registry.create(&args.group, args.cache_bytes, source::slow_db)?;

    let config = RingConfig::default().with_replicas(args.replicas);
    let timeout = Duration::from_secs(args.peer_timeout);
    let pool = Arc::new(
        HttpPool::new(&self_url, &args.base_path, config, timeout)
            .context("invalid peer pool configuration")?,
    );

    let mut peers = args.peers.clone();
    if peers.is_empty() {
        peers.push(self_url.clone());
    }
    pool.set_peers(&peers)?;
    group.register_peers(pool.clone())?;

    info!(self_url = %pool.self_url(), peers = ?pool.peers(), replicas = args.replicas, "peer ring ready");

    if let Some(api_addr) = args.api.clone() {
        let listener = TcpListener::bind(&api_addr).await?;
        let router = server::api_router(Arc::clone(&group));
        info!("API server listening on {}", api_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                error!("API server error: {}", e);
            }
        });
    }

    let listener = TcpListener::bind(&args.bind).await?;
    info!(
        "Peer server listening on {}{}",
        args.bind,
        pool.base_path()
    );

    axum::serve(listener, server::peer_router(registry, pool.base_path())).await?;
    Ok(())
}
