// trattoria/src/models/views.rs

//! Orders with their user and menu-item references resolved, as returned by the API.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::{MenuItem, OrderStatus, UserSummary};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineView {
  pub menu_item: MenuItem,
  pub quantity: i32,
  #[serde(with = "rust_decimal::serde::float")]
  pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
  pub id: Uuid,
  pub user: UserSummary,
  pub items: Vec<OrderLineView>,
  #[serde(with = "rust_decimal::serde::float")]
  pub total_amount: Decimal,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
