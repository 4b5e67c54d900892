// trattoria/src/pricing.rs

//! Line-item validation and order totals.
//!
//! Totals are computed from the unit prices submitted with the order, not from the
//! current catalog: an order records what the customer saw when submitting it.
//! `PricePolicy` can additionally bound submitted prices against the catalog.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{MenuItem, OrderLine};

/// Prices are stored with cent precision.
pub const MAX_PRICE_SCALE: u32 = 2;

/// Largest unit price a `NUMERIC(12, 2)` column holds.
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Largest order total a `NUMERIC(14, 2)` column holds.
pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// True for a positive price with at most two decimals that fits the price column.
pub fn is_valid_price(price: Decimal) -> bool {
  price > Decimal::ZERO && price <= MAX_PRICE && price.normalize().scale() <= MAX_PRICE_SCALE
}

/// A line item as submitted by the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
  pub menu_item: String,
  pub quantity: i64,
  #[serde(with = "rust_decimal::serde::float")]
  pub price: Decimal,
}

/// How far a submitted unit price may deviate from the catalog price.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PricePolicy {
  /// `None` trusts the submitted price as-is.
  pub tolerance_percent: Option<Decimal>,
}

impl PricePolicy {
  pub fn trust_client() -> Self {
    Self { tolerance_percent: None }
  }

  pub fn within_percent(tolerance_percent: Decimal) -> Self {
    Self {
      tolerance_percent: Some(tolerance_percent.abs()),
    }
  }

  pub fn checks_catalog(&self) -> bool {
    self.tolerance_percent.is_some()
  }

  /// Rejects a line whose unit price is outside `catalog price ± tolerance%`.
  pub fn check_line(&self, line: &OrderLine, catalog_item: &MenuItem) -> Result<()> {
    let Some(tolerance) = self.tolerance_percent else {
      return Ok(());
    };
    let allowed = catalog_item
      .price
      .checked_mul(tolerance)
      .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED));
    let deviation = line.price.checked_sub(catalog_item.price).map(|d| d.abs());
    let within = matches!((deviation, allowed), (Some(deviation), Some(allowed)) if deviation <= allowed);
    if !within {
      return Err(Error::Validation(format!(
        "Price {} for '{}' does not match the current menu price {}.",
        line.price, catalog_item.name, catalog_item.price
      )));
    }
    Ok(())
  }
}

/// Validates submitted line items and converts them into order lines.
///
/// `None` stands for a missing `items` field.
pub fn validate_line_items(items: Option<&[LineItemInput]>) -> Result<Vec<OrderLine>> {
  let items = match items {
    Some(items) if !items.is_empty() => items,
    _ => return Err(Error::Validation("Invalid order items".to_string())),
  };

  items
    .iter()
    .enumerate()
    .map(|(idx, item)| {
      let menu_item_id = Uuid::parse_str(item.menu_item.trim())
        .map_err(|_| Error::Validation(format!("Item {}: invalid menu item id '{}'.", idx, item.menu_item)))?;
      let quantity = i32::try_from(item.quantity)
        .ok()
        .filter(|q| *q >= 1)
        .ok_or_else(|| Error::Validation(format!("Item {}: quantity must be a positive integer.", idx)))?;
      if !is_valid_price(item.price) {
        return Err(Error::Validation(format!(
          "Item {}: price must be greater than zero, at most {}, with at most two decimals.",
          idx, MAX_PRICE
        )));
      }
      Ok(OrderLine {
        menu_item_id,
        quantity,
        price: item.price,
      })
    })
    .collect()
}

/// Sum of `price * quantity` over all lines, exact in decimal arithmetic.
/// Totals above `MAX_ORDER_TOTAL` are rejected.
pub fn order_total(lines: &[OrderLine]) -> Result<Decimal> {
  lines
    .iter()
    .try_fold(Decimal::ZERO, |acc, line| {
      line.subtotal().and_then(|subtotal| acc.checked_add(subtotal))
    })
    .filter(|total| *total <= MAX_ORDER_TOTAL)
    .ok_or_else(|| Error::Validation("Order total is too large.".to_string()))
}

/// Every referenced menu item must exist in `catalog`.
pub fn ensure_items_known(lines: &[OrderLine], catalog: &HashMap<Uuid, MenuItem>) -> Result<()> {
  match lines.iter().find(|line| !catalog.contains_key(&line.menu_item_id)) {
    Some(line) => Err(Error::Validation(format!("Unknown menu item {}.", line.menu_item_id))),
    None => Ok(()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
  }

  fn input(quantity: i64, price: &str) -> LineItemInput {
    LineItemInput {
      menu_item: Uuid::new_v4().to_string(),
      quantity,
      price: dec(price),
    }
  }

  #[test]
  fn total_is_exact_sum_of_price_times_quantity() {
    let lines = validate_line_items(Some(&[input(2, "10.00"), input(1, "5.50")])).unwrap();
    assert_eq!(order_total(&lines).unwrap(), dec("25.50"));
  }

  #[test]
  fn total_has_no_binary_float_drift() {
    let lines = validate_line_items(Some(&[input(3, "0.10"), input(1, "0.20")])).unwrap();
    assert_eq!(order_total(&lines).unwrap(), dec("0.50"));
  }

  #[test]
  fn missing_or_empty_items_are_rejected() {
    assert!(matches!(validate_line_items(None), Err(Error::Validation(_))));
    assert!(matches!(validate_line_items(Some(&[])), Err(Error::Validation(_))));
  }

  #[test]
  fn bad_lines_are_rejected() {
    assert!(validate_line_items(Some(&[input(0, "1.00")])).is_err());
    assert!(validate_line_items(Some(&[input(-3, "1.00")])).is_err());
    assert!(validate_line_items(Some(&[input(i64::from(i32::MAX) + 1, "1.00")])).is_err());
    assert!(validate_line_items(Some(&[input(1, "0")])).is_err());
    assert!(validate_line_items(Some(&[input(1, "3.333")])).is_err());
    assert!(validate_line_items(Some(&[input(1, "3.300")])).is_ok());

    let mut malformed = input(1, "1.00");
    malformed.menu_item = "not-an-id".to_string();
    assert!(validate_line_items(Some(&[malformed])).is_err());
  }

  #[test]
  fn line_order_is_preserved() {
    let items = [input(1, "1.00"), input(2, "2.00"), input(3, "3.00")];
    let lines = validate_line_items(Some(&items)).unwrap();
    let quantities: Vec<i32> = lines.iter().map(|l| l.quantity).collect();
    assert_eq!(quantities, vec![1, 2, 3]);
  }

  #[test]
  fn tolerance_bounds_submitted_price() {
    let catalog = MenuItem::from_input(crate::models::MenuItemInput {
      name: "Pizza".to_string(),
      description: String::new(),
      price: dec("10.00"),
      image: None,
      available: true,
    })
    .unwrap();
    let line = |price: &str| OrderLine {
      menu_item_id: catalog.id,
      quantity: 1,
      price: dec(price),
    };

    let policy = PricePolicy::within_percent(dec("10"));
    assert!(policy.check_line(&line("10.99"), &catalog).is_ok());
    assert!(policy.check_line(&line("9.00"), &catalog).is_ok());
    assert!(policy.check_line(&line("8.99"), &catalog).is_err());
    assert!(PricePolicy::trust_client().check_line(&line("0.01"), &catalog).is_ok());
  }

  #[test]
  fn price_limits_match_the_numeric_columns() {
    assert_eq!(MAX_PRICE, dec("9999999999.99"));
    assert_eq!(MAX_ORDER_TOTAL, dec("999999999999.99"));
    assert!(validate_line_items(Some(&[input(1, "9999999999.99")])).is_ok());
    assert!(matches!(
      validate_line_items(Some(&[input(1, "10000000000.00")])),
      Err(Error::Validation(_))
    ));
  }

  #[test]
  fn total_beyond_column_range_is_a_validation_error() {
    let lines = validate_line_items(Some(&[input(1_000_000, "1000000")])).unwrap();
    assert!(matches!(order_total(&lines), Err(Error::Validation(_))));

    let at_limit = validate_line_items(Some(&[input(100, "9999999999.99")])).unwrap();
    assert_eq!(order_total(&at_limit).unwrap(), dec("999999999999.00"));
  }

  #[test]
  fn tolerance_check_does_not_overflow() {
    let mut catalog = MenuItem::from_input(crate::models::MenuItemInput {
      name: "Caviar".to_string(),
      description: String::new(),
      price: dec("10.00"),
      image: None,
      available: true,
    })
    .unwrap();
    catalog.price = Decimal::MAX;
    let line = OrderLine {
      menu_item_id: catalog.id,
      quantity: 1,
      price: dec("1.00"),
    };
    let result = PricePolicy::within_percent(dec("10")).check_line(&line, &catalog);
    assert!(matches!(result, Err(Error::Validation(_))));
  }
}
