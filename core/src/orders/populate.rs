// trattoria/src/orders/populate.rs

//! Resolves the user and menu-item references of orders with batched lookups.

use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{MenuItem, Order, OrderLineView, OrderView, User};
use crate::store::Store;

/// Builds the view of one order from already-loaded users and menu items.
pub fn order_view(order: Order, users: &HashMap<Uuid, User>, menu: &HashMap<Uuid, MenuItem>) -> Result<OrderView> {
  let user = users
    .get(&order.user_id)
    .ok_or_else(|| Error::NotFound(format!("User {} referenced by order {}.", order.user_id, order.id)))?;

  let items = order
    .items
    .into_iter()
    .map(|line| {
      let menu_item = menu.get(&line.menu_item_id).cloned().ok_or_else(|| {
        Error::NotFound(format!(
          "Menu item {} referenced by order {}.",
          line.menu_item_id, order.id
        ))
      })?;
      Ok(OrderLineView {
        menu_item,
        quantity: line.quantity,
        price: line.price,
      })
    })
    .collect::<Result<Vec<_>>>()?;

  Ok(OrderView {
    id: order.id,
    user: user.summary(),
    items,
    total_amount: order.total_amount,
    status: order.status,
    created_at: order.created_at,
    updated_at: order.updated_at,
  })
}

/// Loads every referenced user and menu item once, then builds the views in input order.
pub async fn populate_orders(store: &dyn Store, orders: Vec<Order>) -> Result<Vec<OrderView>> {
  if orders.is_empty() {
    return Ok(Vec::new());
  }

  let user_ids: Vec<Uuid> = orders
    .iter()
    .map(|o| o.user_id)
    .collect::<HashSet<_>>()
    .into_iter()
    .collect();
  let menu_ids: Vec<Uuid> = orders
    .iter()
    .flat_map(|o| o.items.iter().map(|line| line.menu_item_id))
    .collect::<HashSet<_>>()
    .into_iter()
    .collect();

  let users: HashMap<Uuid, User> = store
    .users_by_ids(&user_ids)
    .await?
    .into_iter()
    .map(|u| (u.id, u))
    .collect();
  let menu: HashMap<Uuid, MenuItem> = store
    .menu_items_by_ids(&menu_ids)
    .await?
    .into_iter()
    .map(|m| (m.id, m))
    .collect();

  orders.into_iter().map(|order| order_view(order, &users, &menu)).collect()
}
