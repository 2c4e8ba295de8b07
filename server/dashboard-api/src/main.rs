//! Binary entrypoint for the dashboard API.

use std::sync::Arc;

use dashboard_api::{AppState, ServerConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "dashboard_api=info,tower_http=info".into()))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = ServerConfig::from_env()?;
  let state = Arc::new(AppState::new(&config));
  let app = dashboard_api::router(state);

  let addr = config.socket_addr();
  info!(%addr, window = config.engine.running_average_window, "dashboard-api listening");

  let listener = tokio::net::TcpListener::bind(addr).await?;
  axum::serve(listener, app).await?;

  Ok(())
}
