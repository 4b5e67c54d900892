// trattoria_server/src/config.rs

use crate::errors::{AppError, Result};
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use trattoria::reports::{DEFAULT_POPULAR_LIMIT, MAX_POPULAR_LIMIT};
use trattoria::PricePolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  Postgres,
  Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub store_backend: StoreBackend,
  /// Required for the postgres backend only.
  pub database_url: Option<String>,
  pub db_max_connections: u32,
  pub run_migrations: bool,
  pub seed_db: bool,
  /// `None` trusts the prices submitted with an order.
  pub price_tolerance_percent: Option<Decimal>,
  pub log_format: LogFormat,
  pub popular_items_limit: usize,
}

impl AppConfig {
  /// Reads the configuration from the process environment (after `.env`, if loaded).
  pub fn from_env() -> Result<Self> {
    Self::from_vars(|name| env::var(name).ok())
  }

  /// Builds the configuration from any variable lookup.
  pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let server_host = get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_or("SERVER_PORT", get("SERVER_PORT"), 8080u16)?;

    let store_backend = match get("STORE_BACKEND").map(|v| v.to_ascii_lowercase()).as_deref() {
      None | Some("postgres") => StoreBackend::Postgres,
      Some("memory") => StoreBackend::Memory,
      Some(other) => {
        return Err(AppError::Config(format!(
          "Invalid STORE_BACKEND '{}': expected 'postgres' or 'memory'.",
          other
        )))
      }
    };

    let database_url = get("DATABASE_URL");
    if store_backend == StoreBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "Missing environment variable 'DATABASE_URL'.".to_string(),
      ));
    }

    let db_max_connections = parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 5u32)?;
    let run_migrations = parse_or("RUN_MIGRATIONS", get("RUN_MIGRATIONS"), true)?;
    let seed_db = parse_or("SEED_DB", get("SEED_DB"), false)?;

    let price_tolerance_percent = match get("PRICE_TOLERANCE_PERCENT") {
      None => None,
      Some(raw) => {
        let value = Decimal::from_str(&raw)
          .map_err(|e| AppError::Config(format!("Invalid PRICE_TOLERANCE_PERCENT: {}", e)))?;
        if value.is_sign_negative() {
          return Err(AppError::Config(
            "PRICE_TOLERANCE_PERCENT cannot be negative.".to_string(),
          ));
        }
        Some(value)
      }
    };

    let log_format = match get("LOG_FORMAT").map(|v| v.to_ascii_lowercase()).as_deref() {
      None | Some("pretty") => LogFormat::Pretty,
      Some("json") => LogFormat::Json,
      Some(other) => return Err(AppError::Config(format!("Invalid LOG_FORMAT '{}'.", other))),
    };

    let popular_items_limit = parse_or("POPULAR_ITEMS_LIMIT", get("POPULAR_ITEMS_LIMIT"), DEFAULT_POPULAR_LIMIT)?;
    if popular_items_limit == 0 || popular_items_limit > MAX_POPULAR_LIMIT {
      return Err(AppError::Config(format!(
        "POPULAR_ITEMS_LIMIT must be between 1 and {}.",
        MAX_POPULAR_LIMIT
      )));
    }

    Ok(Self {
      server_host,
      server_port,
      store_backend,
      database_url,
      db_max_connections,
      run_migrations,
      seed_db,
      price_tolerance_percent,
      log_format,
      popular_items_limit,
    })
  }

  pub fn price_policy(&self) -> PricePolicy {
    match self.price_tolerance_percent {
      Some(tolerance) => PricePolicy::within_percent(tolerance),
      None => PricePolicy::trust_client(),
    }
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match raw {
    None => Ok(default),
    Some(raw) => raw
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", name, raw, e))),
  }
}
