// trattoria/src/store/memory.rs

//! In-process store used by tests and by `STORE_BACKEND=memory` runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{newest_first, OrderFilter, Store};
use crate::error::{Error, Result};
use crate::models::{MenuItem, Order, OrderStatus, User};

#[derive(Debug, Default)]
struct Tables {
  users: HashMap<Uuid, User>,
  menu_items: HashMap<Uuid, MenuItem>,
  orders: HashMap<Uuid, Order>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
  tables: RwLock<Tables>,
  unavailable: AtomicBool,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// While set, every operation fails like a lost database connection.
  pub fn set_unavailable(&self, unavailable: bool) {
    self.unavailable.store(unavailable, Ordering::SeqCst);
  }

  fn check_available(&self) -> Result<()> {
    if self.unavailable.load(Ordering::SeqCst) {
      Err(Error::Database(sqlx::Error::PoolClosed))
    } else {
      Ok(())
    }
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    self.check_available()?;
    Ok(self.tables.read().users.get(&id).cloned())
  }

  async fn users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>> {
    self.check_available()?;
    let tables = self.tables.read();
    Ok(ids.iter().filter_map(|id| tables.users.get(id).cloned()).collect())
  }

  async fn insert_user(&self, user: &User) -> Result<()> {
    self.check_available()?;
    let mut tables = self.tables.write();
    if tables.users.values().any(|u| u.id == user.id || u.email == user.email) {
      return Err(Error::Conflict(format!("User {} already exists.", user.email)));
    }
    tables.users.insert(user.id, user.clone());
    Ok(())
  }

  async fn list_menu_items(&self) -> Result<Vec<MenuItem>> {
    self.check_available()?;
    let mut items: Vec<MenuItem> = self.tables.read().menu_items.values().cloned().collect();
    items.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    Ok(items)
  }

  async fn get_menu_item(&self, id: Uuid) -> Result<Option<MenuItem>> {
    self.check_available()?;
    Ok(self.tables.read().menu_items.get(&id).cloned())
  }

  async fn menu_items_by_ids(&self, ids: &[Uuid]) -> Result<Vec<MenuItem>> {
    self.check_available()?;
    let tables = self.tables.read();
    Ok(ids.iter().filter_map(|id| tables.menu_items.get(id).cloned()).collect())
  }

  async fn insert_menu_item(&self, item: &MenuItem) -> Result<()> {
    self.check_available()?;
    self.tables.write().menu_items.insert(item.id, item.clone());
    Ok(())
  }

  async fn update_menu_item(&self, item: &MenuItem) -> Result<bool> {
    self.check_available()?;
    let mut tables = self.tables.write();
    match tables.menu_items.get_mut(&item.id) {
      Some(existing) => {
        *existing = item.clone();
        Ok(true)
      }
      None => Ok(false),
    }
  }

  #[instrument(name = "memory_store::delete_menu_item", skip(self))]
  async fn delete_menu_item(&self, id: Uuid) -> Result<bool> {
    self.check_available()?;
    let mut tables = self.tables.write();
    let referenced = tables
      .orders
      .values()
      .any(|order| order.items.iter().any(|line| line.menu_item_id == id));
    if referenced {
      debug!("Menu item is referenced by an order.");
      return Err(Error::Conflict(format!(
        "Menu item {} is referenced by existing orders.",
        id
      )));
    }
    Ok(tables.menu_items.remove(&id).is_some())
  }

  async fn insert_order(&self, order: &Order) -> Result<()> {
    self.check_available()?;
    let mut tables = self.tables.write();
    if !tables.users.contains_key(&order.user_id) {
      return Err(Error::Validation(format!("Unknown user {}.", order.user_id)));
    }
    if let Some(line) = order
      .items
      .iter()
      .find(|line| !tables.menu_items.contains_key(&line.menu_item_id))
    {
      return Err(Error::Validation(format!("Unknown menu item {}.", line.menu_item_id)));
    }
    tables.orders.insert(order.id, order.clone());
    Ok(())
  }

  async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
    self.check_available()?;
    Ok(self.tables.read().orders.get(&id).cloned())
  }

  async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
    self.check_available()?;
    let mut orders: Vec<Order> = self
      .tables
      .read()
      .orders
      .values()
      .filter(|order| filter.matches(order))
      .cloned()
      .collect();
    orders.sort_by(newest_first);
    Ok(orders)
  }

  async fn update_order_status(
    &self,
    id: Uuid,
    from: OrderStatus,
    to: OrderStatus,
    at: DateTime<Utc>,
  ) -> Result<bool> {
    self.check_available()?;
    let mut tables = self.tables.write();
    match tables.orders.get_mut(&id) {
      Some(order) if order.status == from => {
        order.status = to;
        order.updated_at = at;
        Ok(true)
      }
      _ => Ok(false),
    }
  }
}
