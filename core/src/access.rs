// trattoria/src/access.rs

//! Authorization predicates, evaluated before any query is built.

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Order, OrderStatus, User};

/// Which orders a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
  All,
  OwnedBy(Uuid),
}

impl OrderScope {
  pub fn for_user(user: &User) -> Self {
    if user.is_admin() {
      OrderScope::All
    } else {
      OrderScope::OwnedBy(user.id)
    }
  }

  pub fn owner(&self) -> Option<Uuid> {
    match self {
      OrderScope::All => None,
      OrderScope::OwnedBy(user_id) => Some(*user_id),
    }
  }

  pub fn permits(&self, order: &Order) -> bool {
    match self {
      OrderScope::All => true,
      OrderScope::OwnedBy(user_id) => order.user_id == *user_id,
    }
  }
}

pub fn require_admin(user: &User, action: &str) -> Result<()> {
  if user.is_admin() {
    Ok(())
  } else {
    Err(Error::Forbidden(format!("Only administrators may {}.", action)))
  }
}

/// Admins may move an order along any allowed transition; an owner may only
/// cancel their own pending order.
pub fn authorize_status_change(user: &User, order: &Order, next: OrderStatus) -> Result<()> {
  if user.is_admin() {
    return Ok(());
  }
  let owner_cancelling_pending =
    order.user_id == user.id && order.status == OrderStatus::Pending && next == OrderStatus::Cancelled;
  if owner_cancelling_pending {
    Ok(())
  } else {
    Err(Error::Forbidden(
      "Only administrators may change this order's status.".to_string(),
    ))
  }
}
