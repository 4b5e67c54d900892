// trattoria/src/store/mod.rs

//! The persistence handle injected into every service.
//!
//! Each method is a single atomic operation of the backing store; there are no
//! transactions spanning several calls.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::access::OrderScope;
use crate::error::Result;
use crate::models::{MenuItem, Order, OrderStatus, User};

/// Query for `Store::list_orders`. Results are always sorted by `created_at`
/// descending, ties broken by id descending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
  pub user_id: Option<Uuid>,
  pub status: Option<OrderStatus>,
  /// Inclusive lower bound on `created_at`.
  pub created_from: Option<DateTime<Utc>>,
  /// Exclusive upper bound on `created_at`.
  pub created_before: Option<DateTime<Utc>>,
}

impl OrderFilter {
  pub fn for_scope(scope: &OrderScope) -> Self {
    Self {
      user_id: scope.owner(),
      ..Self::default()
    }
  }

  pub fn with_status(mut self, status: Option<OrderStatus>) -> Self {
    self.status = status;
    self
  }

  pub fn matches(&self, order: &Order) -> bool {
    self.user_id.map_or(true, |user_id| order.user_id == user_id)
      && self.status.map_or(true, |status| order.status == status)
      && self.created_from.map_or(true, |from| order.created_at >= from)
      && self.created_before.map_or(true, |before| order.created_at < before)
  }
}

#[async_trait]
pub trait Store: Send + Sync {
  async fn get_user(&self, id: Uuid) -> Result<Option<User>>;
  async fn users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>>;
  async fn insert_user(&self, user: &User) -> Result<()>;

  /// All menu items, available or not, sorted by name.
  async fn list_menu_items(&self) -> Result<Vec<MenuItem>>;
  async fn get_menu_item(&self, id: Uuid) -> Result<Option<MenuItem>>;
  async fn menu_items_by_ids(&self, ids: &[Uuid]) -> Result<Vec<MenuItem>>;
  async fn insert_menu_item(&self, item: &MenuItem) -> Result<()>;
  /// Returns `false` when no item has `item.id`.
  async fn update_menu_item(&self, item: &MenuItem) -> Result<bool>;
  /// Returns `false` when no item has `id`; fails with `Error::Conflict` when
  /// an order still references the item.
  async fn delete_menu_item(&self, id: Uuid) -> Result<bool>;

  /// Persists an order together with its lines, all or nothing.
  async fn insert_order(&self, order: &Order) -> Result<()>;
  async fn get_order(&self, id: Uuid) -> Result<Option<Order>>;
  async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>>;
  /// Sets `status` to `to` only if it is still `from`. Returns whether a row changed.
  async fn update_order_status(&self, id: Uuid, from: OrderStatus, to: OrderStatus, at: DateTime<Utc>)
    -> Result<bool>;

  /// Releases backing resources. Called once at shutdown.
  async fn close(&self) {}
}

/// Sort order shared by every `list_orders` implementation.
pub(crate) fn newest_first(a: &Order, b: &Order) -> std::cmp::Ordering {
  b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
}
