// trattoria_server/src/seed.rs

use rust_decimal::Decimal;
use tracing::{info, instrument};
use trattoria::{MenuItem, MenuItemInput, Role, Store, User};

const SEED_MENU: &[(&str, &str, i64)] = &[
  ("Margherita", "Tomato, mozzarella, basil", 1000),
  ("Minestrone", "Seasonal vegetable soup", 550),
  ("Lasagna", "Beef ragu, bechamel", 1250),
  ("Tiramisu", "Mascarpone, espresso, cocoa", 600),
];

/// Seeds an empty store with one admin, one customer, and a small menu.
/// Returns `false` without writing anything when menu items already exist.
#[instrument(name = "seed::run", skip(store))]
pub async fn seed(store: &dyn Store) -> trattoria::Result<bool> {
  if !store.list_menu_items().await?.is_empty() {
    info!("Store already has menu items; skipping seed.");
    return Ok(false);
  }

  let admin = User::new("Admin", "admin@trattoria.local", Role::Admin);
  let customer = User::new("Customer", "customer@trattoria.local", Role::Customer);
  store.insert_user(&admin).await?;
  store.insert_user(&customer).await?;

  for (name, description, cents) in SEED_MENU {
    let item = MenuItem::from_input(MenuItemInput {
      name: (*name).to_string(),
      description: (*description).to_string(),
      price: Decimal::new(*cents, 2),
      image: None,
      available: true,
    })?;
    store.insert_menu_item(&item).await?;
  }

  info!(
    admin_id = %admin.id,
    customer_id = %customer.id,
    menu_items = SEED_MENU.len(),
    "Store seeded."
  );
  Ok(true)
}
