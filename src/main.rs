use std::net::SocketAddr;

use anyhow::Context;
use gaming_engine::{SseServer, SseServerConfig, tools};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".to_string().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = match std::env::var("PORT") {
        Ok(raw) => raw
            .parse::<u16>()
            .with_context(|| format!("invalid PORT value {raw:?}"))?,
        Err(_) => DEFAULT_PORT,
    };

    let registry = tools::registry().context("tool registration failed")?;
    tracing::info!(tools = ?registry.tool_names(), "registered tools");

    let config = SseServerConfig::new(SocketAddr::from(([0, 0, 0, 0], port)));
    let signal_ct = config.ct.clone();
    let server = SseServer::serve(config, registry)
        .await
        .context("failed to bind sse server")?;
    tracing::info!(
        "gaming engine listening on {} (sse: {}, messages: {})",
        server.config.bind,
        server.config.sse_path,
        server.config.post_path,
    );

    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("shutdown signal received");
        signal_ct.cancel();
    });

    server.config.ct.cancelled().await;
    Ok(())
}
