// trattoria_server/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;

use trattoria_server::config::AppConfig;
use trattoria_server::state::AppState;
use trattoria_server::web::configure_app_routes;
use trattoria_server::{startup, telemetry};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok(); // Load .env file if present

  let app_config = Arc::new(AppConfig::from_env().context("Configuration error")?);
  telemetry::init(app_config.log_format);
  tracing::info!(backend = ?app_config.store_backend, "Starting Trattoria server...");

  let store = startup::open_store(&app_config).await?;
  let app_state = AppState::new(store.clone(), app_config.clone()).context("Failed to build application state")?;

  let server_address = app_config.bind_address();
  tracing::info!("Binding server to {}...", server_address);

  let server_result = HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await;

  tracing::info!("Server stopped; closing the store.");
  store.close().await;
  server_result.context("HTTP server error")
}
