// trattoria/src/models/menu_item.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
  pub id: Uuid,
  pub name: String,
  pub description: String,
  #[serde(with = "rust_decimal::serde::float")]
  pub price: Decimal,
  pub image: Option<String>,
  pub available: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Editable fields of a menu item, as submitted by an admin.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemInput {
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(with = "rust_decimal::serde::float")]
  pub price: Decimal,
  #[serde(default)]
  pub image: Option<String>,
  #[serde(default = "available_by_default")]
  pub available: bool,
}

fn available_by_default() -> bool {
  true
}

impl MenuItemInput {
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::Validation("Menu item name cannot be empty.".to_string()));
    }
    if !crate::pricing::is_valid_price(self.price) {
      return Err(Error::Validation(format!(
        "Menu item price must be greater than zero, at most {}, with at most two decimals.",
        crate::pricing::MAX_PRICE
      )));
    }
    if let Some(image) = self.image.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
      let looks_like_url = image.starts_with("http://") || image.starts_with("https://") || image.starts_with('/');
      if !looks_like_url {
        return Err(Error::Validation(
          "Menu item image must be an http(s) URL or an absolute path.".to_string(),
        ));
      }
    }
    Ok(())
  }
}

impl MenuItem {
  /// Builds a new catalog entry from validated input.
  pub fn from_input(input: MenuItemInput) -> Result<Self> {
    input.validate()?;
    let now = super::now();
    Ok(Self {
      id: Uuid::new_v4(),
      name: input.name.trim().to_string(),
      description: input.description,
      price: input.price,
      image: normalize_image(input.image),
      available: input.available,
      created_at: now,
      updated_at: now,
    })
  }

  /// Replaces the editable fields, keeping identity and creation time.
  pub fn apply(&mut self, input: MenuItemInput) -> Result<()> {
    input.validate()?;
    self.name = input.name.trim().to_string();
    self.description = input.description;
    self.price = input.price;
    self.image = normalize_image(input.image);
    self.available = input.available;
    self.updated_at = super::now();
    Ok(())
  }
}

fn normalize_image(image: Option<String>) -> Option<String> {
  image.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
