// trattoria_server/src/state.rs
use crate::config::AppConfig;
use crate::errors::Result;
use std::sync::Arc;
use trattoria::{MenuService, OrderService, ReportService, Store};

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub orders: Arc<OrderService>,
  pub menu: Arc<MenuService>,
  pub reports: Arc<ReportService>,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  /// Wires the domain services around one shared store handle.
  pub fn new(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Result<Self> {
    let orders = OrderService::new(store.clone(), config.price_policy())?;
    Ok(Self {
      orders: Arc::new(orders),
      menu: Arc::new(MenuService::new(store.clone())),
      reports: Arc::new(ReportService::new(store.clone(), config.popular_items_limit)),
      store,
      config,
    })
  }
}
