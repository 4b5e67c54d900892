// trattoria/src/menu.rs

//! Menu catalog: readable by every authenticated user, editable by admins.

use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::require_admin;
use crate::error::{Error, Result};
use crate::models::{MenuItem, MenuItemInput, User};
use crate::store::Store;

pub struct MenuService {
  store: Arc<dyn Store>,
}

impl MenuService {
  pub fn new(store: Arc<dyn Store>) -> Self {
    Self { store }
  }

  /// Every item, including unavailable ones; clients filter on `available`.
  pub async fn list(&self) -> Result<Vec<MenuItem>> {
    self.store.list_menu_items().await
  }

  pub async fn get(&self, id: Uuid) -> Result<MenuItem> {
    self
      .store
      .get_menu_item(id)
      .await?
      .ok_or_else(|| Error::NotFound(format!("Menu item {} not found.", id)))
  }

  #[instrument(name = "menu_service::create", skip(self, caller, input), fields(user_id = %caller.id))]
  pub async fn create(&self, caller: &User, input: MenuItemInput) -> Result<MenuItem> {
    require_admin(caller, "add menu items")?;
    let item = MenuItem::from_input(input)?;
    self.store.insert_menu_item(&item).await?;
    info!(menu_item_id = %item.id, name = %item.name, "Menu item created.");
    Ok(item)
  }

  #[instrument(name = "menu_service::update", skip(self, caller, input), fields(user_id = %caller.id))]
  pub async fn update(&self, caller: &User, id: Uuid, input: MenuItemInput) -> Result<MenuItem> {
    require_admin(caller, "edit menu items")?;
    let mut item = self.get(id).await?;
    item.apply(input)?;
    if !self.store.update_menu_item(&item).await? {
      return Err(Error::NotFound(format!("Menu item {} not found.", id)));
    }
    info!(menu_item_id = %item.id, "Menu item updated.");
    Ok(item)
  }

  #[instrument(name = "menu_service::delete", skip(self, caller), fields(user_id = %caller.id))]
  pub async fn delete(&self, caller: &User, id: Uuid) -> Result<()> {
    require_admin(caller, "delete menu items")?;
    if !self.store.delete_menu_item(id).await? {
      return Err(Error::NotFound(format!("Menu item {} not found.", id)));
    }
    info!(menu_item_id = %id, "Menu item deleted.");
    Ok(())
  }
}
