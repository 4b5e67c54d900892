// trattoria_server/src/startup.rs

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use trattoria::{MemoryStore, PgStore, Store};

use crate::config::{AppConfig, StoreBackend};

/// Opens the configured store, running migrations and seeding as configured.
pub async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
  let store: Arc<dyn Store> = match config.store_backend {
    StoreBackend::Memory => {
      warn!("Using the in-memory store; data is lost on shutdown.");
      Arc::new(MemoryStore::new())
    }
    StoreBackend::Postgres => {
      let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required for the postgres backend")?;
      let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(url)
        .await
        .context("Failed to connect to the database")?;
      info!(max_connections = config.db_max_connections, "Connected to the database.");

      let store = PgStore::new(pool);
      if config.run_migrations {
        store.run_migrations().await.context("Failed to run migrations")?;
        info!("Database migrations applied.");
      }
      Arc::new(store)
    }
  };

  if config.seed_db {
    crate::seed::seed(store.as_ref()).await.context("Failed to seed the store")?;
  }
  Ok(store)
}
