// trattoria/src/reports.rs

//! Sales reports: a read-only aggregation over the orders at call time.
//!
//! Revenue and popularity count only non-cancelled orders; status counts include
//! every order. Days are UTC calendar days.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::require_admin;
use crate::error::{Error, Result};
use crate::models::{MenuItem, Order, OrderStatus, User};
use crate::store::{OrderFilter, Store};

pub const DEFAULT_POPULAR_LIMIT: usize = 5;
pub const MAX_POPULAR_LIMIT: usize = 50;

/// Inclusive range of UTC days. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportRange {
  pub from: Option<NaiveDate>,
  pub to: Option<NaiveDate>,
}

impl ReportRange {
  pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self> {
    if let (Some(from), Some(to)) = (from, to) {
      if from > to {
        return Err(Error::Validation(format!(
          "Report range start {} is after its end {}.",
          from, to
        )));
      }
    }
    Ok(Self { from, to })
  }

  pub fn contains(&self, at: DateTime<Utc>) -> bool {
    let day = at.date_naive();
    self.from.map_or(true, |from| day >= from) && self.to.map_or(true, |to| day <= to)
  }

  pub fn to_filter(&self) -> OrderFilter {
    OrderFilter {
      created_from: self.from.map(start_of_day),
      created_before: self.to.and_then(|to| to.succ_opt()).map(start_of_day),
      ..OrderFilter::default()
    }
  }
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
  Utc.from_utc_datetime(&day.and_time(NaiveTime::default()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRevenue {
  pub date: NaiveDate,
  #[serde(with = "rust_decimal::serde::float")]
  pub revenue: Decimal,
  pub orders: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularItem {
  pub menu_item_id: Uuid,
  pub name: String,
  pub total_quantity: i64,
  #[serde(with = "rust_decimal::serde::float")]
  pub total_revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
  pub daily_revenue: Vec<DailyRevenue>,
  pub orders_by_status: BTreeMap<&'static str, u64>,
  pub popular_items: Vec<PopularItem>,
}

/// Aggregates `orders` falling inside `range`. `menu` supplies item names; items
/// missing from it are reported as "Unknown item".
pub fn aggregate(
  orders: &[Order],
  menu: &HashMap<Uuid, MenuItem>,
  range: &ReportRange,
  popular_limit: usize,
) -> SalesReport {
  let mut orders_by_status: BTreeMap<&'static str, u64> =
    OrderStatus::ALL.iter().map(|status| (status.as_str(), 0)).collect();
  let mut daily: BTreeMap<NaiveDate, (Decimal, u64)> = BTreeMap::new();
  let mut per_item: HashMap<Uuid, (i64, Decimal)> = HashMap::new();

  for order in orders.iter().filter(|o| range.contains(o.created_at)) {
    *orders_by_status.entry(order.status.as_str()).or_insert(0) += 1;
    if order.is_cancelled() {
      continue;
    }

    let day = daily.entry(order.created_at.date_naive()).or_insert((Decimal::ZERO, 0));
    day.0 = day.0.saturating_add(order.total_amount);
    day.1 += 1;

    for line in &order.items {
      let entry = per_item.entry(line.menu_item_id).or_insert((0, Decimal::ZERO));
      entry.0 += i64::from(line.quantity);
      entry.1 = entry
        .1
        .saturating_add(line.price.saturating_mul(Decimal::from(line.quantity)));
    }
  }

  let daily_revenue = daily
    .into_iter()
    .map(|(date, (revenue, orders))| DailyRevenue { date, revenue, orders })
    .collect();

  let mut popular_items: Vec<PopularItem> = per_item
    .into_iter()
    .map(|(menu_item_id, (total_quantity, total_revenue))| PopularItem {
      menu_item_id,
      name: menu
        .get(&menu_item_id)
        .map(|item| item.name.clone())
        .unwrap_or_else(|| "Unknown item".to_string()),
      total_quantity,
      total_revenue,
    })
    .collect();
  popular_items.sort_by(|a, b| {
    b.total_quantity
      .cmp(&a.total_quantity)
      .then_with(|| b.total_revenue.cmp(&a.total_revenue))
      .then_with(|| a.name.cmp(&b.name))
      .then_with(|| a.menu_item_id.cmp(&b.menu_item_id))
  });
  popular_items.truncate(popular_limit);

  SalesReport {
    daily_revenue,
    orders_by_status,
    popular_items,
  }
}

pub struct ReportService {
  store: Arc<dyn Store>,
  default_limit: usize,
}

impl ReportService {
  pub fn new(store: Arc<dyn Store>, default_limit: usize) -> Self {
    Self {
      store,
      default_limit: default_limit.clamp(1, MAX_POPULAR_LIMIT),
    }
  }

  #[instrument(name = "report_service::stats", skip(self, caller), fields(user_id = %caller.id))]
  pub async fn stats(&self, caller: &User, range: ReportRange, limit: Option<usize>) -> Result<SalesReport> {
    require_admin(caller, "view sales reports")?;
    let limit = limit.unwrap_or(self.default_limit).clamp(1, MAX_POPULAR_LIMIT);

    let orders = self.store.list_orders(&range.to_filter()).await?;
    let menu_ids: Vec<Uuid> = orders
      .iter()
      .flat_map(|o| o.items.iter().map(|l| l.menu_item_id))
      .collect::<HashSet<_>>()
      .into_iter()
      .collect();
    let menu: HashMap<Uuid, MenuItem> = self
      .store
      .menu_items_by_ids(&menu_ids)
      .await?
      .into_iter()
      .map(|item| (item.id, item))
      .collect();

    let report = aggregate(&orders, &menu, &range, limit);
    info!(
      orders = orders.len(),
      days = report.daily_revenue.len(),
      "Sales report aggregated."
    );
    Ok(report)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::OrderLine;
  use chrono::Duration;

  fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
  }

  fn order_at(at: DateTime<Utc>, status: OrderStatus, lines: &[(Uuid, i32, &str)]) -> Order {
    let items: Vec<OrderLine> = lines
      .iter()
      .map(|(id, quantity, price)| OrderLine {
        menu_item_id: *id,
        quantity: *quantity,
        price: dec(price),
      })
      .collect();
    let total = crate::pricing::order_total(&items).unwrap();
    let mut order = Order::new_pending(Uuid::new_v4(), items, total);
    order.status = status;
    order.created_at = at;
    order
  }

  fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
  }

  #[test]
  fn daily_revenue_excludes_cancelled_orders_and_sums_to_totals() {
    let pizza = Uuid::new_v4();
    let soup = Uuid::new_v4();
    let orders = vec![
      order_at(day(2024, 3, 1), OrderStatus::Completed, &[(pizza, 2, "10.00")]),
      order_at(day(2024, 3, 1), OrderStatus::Pending, &[(soup, 1, "5.50")]),
      order_at(day(2024, 3, 2), OrderStatus::Cancelled, &[(pizza, 5, "10.00")]),
      order_at(day(2024, 3, 3), OrderStatus::Processing, &[(pizza, 1, "10.00"), (soup, 2, "5.50")]),
    ];

    let report = aggregate(&orders, &HashMap::new(), &ReportRange::default(), 5);

    let days: Vec<(NaiveDate, Decimal, u64)> =
      report.daily_revenue.iter().map(|d| (d.date, d.revenue, d.orders)).collect();
    assert_eq!(
      days,
      vec![
        (day(2024, 3, 1).date_naive(), dec("25.50"), 2),
        (day(2024, 3, 3).date_naive(), dec("21.00"), 1),
      ]
    );

    let revenue_sum: Decimal = report.daily_revenue.iter().map(|d| d.revenue).sum();
    let expected: Decimal = orders.iter().filter(|o| !o.is_cancelled()).map(|o| o.total_amount).sum();
    assert_eq!(revenue_sum, expected);
  }

  #[test]
  fn status_counts_include_every_status() {
    let item = Uuid::new_v4();
    let orders = vec![
      order_at(day(2024, 3, 1), OrderStatus::Cancelled, &[(item, 1, "1.00")]),
      order_at(day(2024, 3, 1), OrderStatus::Cancelled, &[(item, 1, "1.00")]),
      order_at(day(2024, 3, 1), OrderStatus::Completed, &[(item, 1, "1.00")]),
    ];
    let report = aggregate(&orders, &HashMap::new(), &ReportRange::default(), 5);
    assert_eq!(report.orders_by_status["cancelled"], 2);
    assert_eq!(report.orders_by_status["completed"], 1);
    assert_eq!(report.orders_by_status["pending"], 0);
    assert_eq!(report.orders_by_status["processing"], 0);
  }

  #[test]
  fn popular_items_rank_by_quantity_then_revenue() {
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let orders = vec![
      order_at(day(2024, 3, 1), OrderStatus::Completed, &[(a, 3, "2.00"), (b, 3, "4.00")]),
      order_at(day(2024, 3, 2), OrderStatus::Pending, &[(c, 1, "50.00")]),
      order_at(day(2024, 3, 2), OrderStatus::Cancelled, &[(c, 10, "50.00")]),
    ];
    let report = aggregate(&orders, &HashMap::new(), &ReportRange::default(), 2);

    let ranked: Vec<(Uuid, i64, Decimal)> = report
      .popular_items
      .iter()
      .map(|p| (p.menu_item_id, p.total_quantity, p.total_revenue))
      .collect();
    assert_eq!(ranked, vec![(b, 3, dec("12.00")), (a, 3, dec("6.00"))]);
    assert_eq!(report.popular_items[0].name, "Unknown item");
  }

  #[test]
  fn daily_revenue_serializes_with_a_date_key() {
    let orders = vec![order_at(day(2024, 3, 1), OrderStatus::Pending, &[(Uuid::new_v4(), 1, "4.50")])];
    let report = aggregate(&orders, &HashMap::new(), &ReportRange::default(), 5);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(
      json["dailyRevenue"][0],
      serde_json::json!({ "date": "2024-03-01", "revenue": 4.5, "orders": 1 })
    );
  }

  #[test]
  fn full_ties_are_ordered_by_menu_item_id() {
    let mut ids: Vec<Uuid> = (0..6).map(|_| Uuid::new_v4()).collect();
    let lines: Vec<(Uuid, i32, &str)> = ids.iter().map(|id| (*id, 2, "3.00")).collect();
    let orders = vec![order_at(day(2024, 3, 1), OrderStatus::Pending, &lines)];
    let report = aggregate(&orders, &HashMap::new(), &ReportRange::default(), 10);

    ids.sort();
    let ranked: Vec<Uuid> = report.popular_items.iter().map(|p| p.menu_item_id).collect();
    assert_eq!(ranked, ids);
  }

  #[test]
  fn range_is_inclusive_of_both_days() {
    let item = Uuid::new_v4();
    let first = day(2024, 3, 1);
    let orders = vec![
      order_at(first - Duration::days(1), OrderStatus::Completed, &[(item, 1, "1.00")]),
      order_at(first, OrderStatus::Completed, &[(item, 1, "2.00")]),
      order_at(first + Duration::days(1), OrderStatus::Completed, &[(item, 1, "4.00")]),
      order_at(first + Duration::days(2), OrderStatus::Completed, &[(item, 1, "8.00")]),
    ];
    let range = ReportRange::new(Some(first.date_naive()), Some((first + Duration::days(1)).date_naive())).unwrap();
    let report = aggregate(&orders, &HashMap::new(), &range, 5);
    let revenue: Decimal = report.daily_revenue.iter().map(|d| d.revenue).sum();
    assert_eq!(revenue, dec("6.00"));
  }

  #[test]
  fn range_filter_bounds_whole_days() {
    let from = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
    let filter = ReportRange::new(Some(from), Some(to)).unwrap().to_filter();
    assert_eq!(filter.created_from, Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()));
    assert_eq!(filter.created_before, Some(Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap()));
    assert!(ReportRange::new(Some(to), Some(from)).is_err());
  }
}
