use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Use JSON logs in production (BRANDKIT_LOG_JSON=1), human-readable otherwise
    let json_logs = std::env::var("BRANDKIT_LOG_JSON").unwrap_or_default() == "1";
    let filter = EnvFilter::from_default_env()
        .add_directive("brandkit_server=info".parse()?)
        .add_directive("brandkit_core=info".parse()?);
    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = brandkit_server::config::ServerConfig::parse();
    tracing::info!("Starting brandkit on {}", config.listen_addr);
    tracing::info!(
        pipeline = %config.pipeline_url,
        device = %config.device,
        logo_dir = %config.logo_dir.display(),
        "Image pipeline configured"
    );

    let server = brandkit_server::server::Server::new(config);
    server.run().await
}
