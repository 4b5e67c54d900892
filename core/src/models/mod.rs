// trattoria/src/models/mod.rs

//! Data structures representing persisted entities and their populated read models.

pub mod menu_item;
pub mod order;
pub mod user;
pub mod views;

pub use menu_item::{MenuItem, MenuItemInput};
pub use order::{Order, OrderLine, OrderStatus};
pub use user::{Role, User, UserSummary};
pub use views::{OrderLineView, OrderView};

use chrono::{DateTime, SubsecRound, Utc};

/// Current time at the precision the database keeps (microseconds), so values
/// compare equal after a round trip through any store.
pub fn now() -> DateTime<Utc> {
  Utc::now().trunc_subsecs(6)
}
