use anyhow::Context;
use fx_dashboard::config::Config;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();
    info!("Configuration loaded, rates from {}", config.api_base);
    let listen_addr = config.listen_addr.clone();
    let state = fx_dashboard::live_state(config)?;
    info!("Starting idle session reaper");
    tokio::spawn(state.sessions.clone().run_reaper());
    let app = fx_dashboard::app(state);
    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("binding {listen_addr}"))?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Could not listen for shutdown signal: {e:?}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
