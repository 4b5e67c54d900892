// trattoria/src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::Type as SqlxType;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Lifecycle of an order.
///
/// `pending -> processing | cancelled`, `processing -> completed | cancelled`.
/// `completed` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Processing,
  Completed,
  Cancelled,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 4] = [
    OrderStatus::Pending,
    OrderStatus::Processing,
    OrderStatus::Completed,
    OrderStatus::Cancelled,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Processing => "processing",
      OrderStatus::Completed => "completed",
      OrderStatus::Cancelled => "cancelled",
    }
  }

  pub fn allowed_transitions(self) -> &'static [OrderStatus] {
    match self {
      OrderStatus::Pending => &[OrderStatus::Processing, OrderStatus::Cancelled],
      OrderStatus::Processing => &[OrderStatus::Completed, OrderStatus::Cancelled],
      OrderStatus::Completed | OrderStatus::Cancelled => &[],
    }
  }

  pub fn can_transition_to(self, next: OrderStatus) -> bool {
    self.allowed_transitions().contains(&next)
  }

  pub fn is_terminal(self) -> bool {
    self.allowed_transitions().is_empty()
  }

  /// Checks `self -> next` against the transition table.
  pub fn transition_to(self, next: OrderStatus) -> Result<OrderStatus> {
    if self.can_transition_to(next) {
      Ok(next)
    } else {
      Err(Error::InvalidTransition { from: self, to: next })
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    OrderStatus::ALL
      .into_iter()
      .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| Error::Validation(format!("Unknown order status '{}'.", s)))
  }
}

/// One line of an order. `price` is the unit price captured at submission time.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
  pub menu_item_id: Uuid,
  pub quantity: i32,
  pub price: Decimal,
}

impl OrderLine {
  /// `price * quantity`, or `None` on decimal overflow.
  pub fn subtotal(&self) -> Option<Decimal> {
    self.price.checked_mul(Decimal::from(self.quantity))
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub items: Vec<OrderLine>,
  pub total_amount: Decimal,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  /// A freshly submitted order: status `pending`, timestamps set to now.
  pub fn new_pending(user_id: Uuid, items: Vec<OrderLine>, total_amount: Decimal) -> Self {
    let now = super::now();
    Self {
      id: Uuid::new_v4(),
      user_id,
      items,
      total_amount,
      status: OrderStatus::Pending,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn is_cancelled(&self) -> bool {
    self.status == OrderStatus::Cancelled
  }
}
