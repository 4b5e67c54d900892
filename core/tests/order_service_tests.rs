// tests/order_service_tests.rs
mod common;

use common::*;
use serial_test::serial;
use std::time::Duration;
use trattoria::{Error, OrderService, OrderStatus, PricePolicy, Store};
use uuid::Uuid;

fn service(fx: &Fixture) -> OrderService {
  OrderService::new(fx.store(), PricePolicy::trust_client()).expect("order pipeline builds")
}

#[tokio::test]
#[serial]
async fn test_create_computes_total_and_populates_references() {
  let fx = fixture().await;
  let orders = service(&fx);

  let view = orders
    .create(
      &fx.alice,
      Some(vec![line(&fx.pizza, 2, "10.00"), line(&fx.soup, 1, "5.50")]),
    )
    .await
    .unwrap();

  assert_eq!(view.total_amount, dec("25.50"));
  assert_eq!(view.status, OrderStatus::Pending);
  assert_eq!(view.user.id, fx.alice.id);
  assert_eq!(view.user.email, fx.alice.email);
  assert_eq!(view.items.len(), 2);
  assert_eq!(view.items[0].menu_item.id, fx.pizza.id);
  assert_eq!(view.items[0].quantity, 2);
  assert_eq!(view.items[1].menu_item.name, "Soup");
  assert_eq!(view.created_at, view.updated_at);

  let stored = fx.store.get_order(view.id).await.unwrap().expect("order persisted");
  assert_eq!(stored.total_amount, dec("25.50"));
  assert_eq!(stored.user_id, fx.alice.id);
}

#[tokio::test]
#[serial]
async fn test_total_uses_submitted_price_not_catalog_price() {
  let fx = fixture().await;
  let view = service(&fx)
    .create(&fx.alice, Some(vec![line(&fx.pizza, 3, "8.00")]))
    .await
    .unwrap();
  assert_eq!(view.total_amount, dec("24.00"));
  assert_eq!(view.items[0].price, dec("8.00"));
}

#[tokio::test]
#[serial]
async fn test_missing_or_empty_items_are_rejected_and_nothing_is_stored() {
  let fx = fixture().await;
  let orders = service(&fx);

  for items in [None, Some(Vec::new())] {
    let err = orders.create(&fx.alice, items).await.unwrap_err();
    assert!(matches!(err, Error::Validation(ref m) if m == "Invalid order items"), "got {:?}", err);
  }
  let err = orders
    .create(&fx.alice, Some(vec![line(&fx.pizza, 0, "10.00")]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));

  let all = fx.store.list_orders(&Default::default()).await.unwrap();
  assert!(all.is_empty());
}

#[tokio::test]
#[serial]
async fn test_unknown_and_unavailable_menu_items_are_rejected() {
  let fx = fixture().await;
  let orders = service(&fx);

  let mut unknown = line(&fx.pizza, 1, "10.00");
  unknown.menu_item = Uuid::new_v4().to_string();
  let err = orders.create(&fx.alice, Some(vec![unknown])).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));

  let mut malformed = line(&fx.pizza, 1, "10.00");
  malformed.menu_item = "not-an-id".to_string();
  let err = orders.create(&fx.alice, Some(vec![malformed])).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));

  let err = orders
    .create(&fx.alice, Some(vec![line(&fx.tiramisu, 1, "6.00")]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(ref m) if m.contains("Tiramisu")));

  assert!(fx.store.list_orders(&Default::default()).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_price_tolerance_rejects_out_of_range_prices() {
  let fx = fixture().await;
  let orders = OrderService::new(fx.store(), PricePolicy::within_percent(dec("10"))).unwrap();

  let ok = orders
    .create(&fx.alice, Some(vec![line(&fx.pizza, 1, "9.50")]))
    .await
    .unwrap();
  assert_eq!(ok.total_amount, dec("9.50"));

  let err = orders
    .create(&fx.alice, Some(vec![line(&fx.pizza, 1, "1.00")]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
#[serial]
async fn test_listing_is_scoped_and_sorted_newest_first() {
  let fx = fixture().await;
  let orders = service(&fx);

  let first = orders
    .create(&fx.alice, Some(vec![line(&fx.pizza, 1, "10.00")]))
    .await
    .unwrap();
  tokio::time::sleep(Duration::from_millis(5)).await;
  let second = orders
    .create(&fx.bob, Some(vec![line(&fx.soup, 2, "5.50")]))
    .await
    .unwrap();
  tokio::time::sleep(Duration::from_millis(5)).await;
  let third = orders
    .create(&fx.alice, Some(vec![line(&fx.soup, 1, "5.50")]))
    .await
    .unwrap();

  let alice_view = orders.list(&fx.alice, None).await.unwrap();
  let ids: Vec<Uuid> = alice_view.iter().map(|o| o.id).collect();
  assert_eq!(ids, vec![third.id, first.id]);
  assert!(alice_view.iter().all(|o| o.user.id == fx.alice.id));

  let admin_view = orders.list(&fx.admin, None).await.unwrap();
  let ids: Vec<Uuid> = admin_view.iter().map(|o| o.id).collect();
  assert_eq!(ids, vec![third.id, second.id, first.id]);
  assert!(admin_view
    .windows(2)
    .all(|pair| pair[0].created_at >= pair[1].created_at));
  assert_eq!(admin_view[1].user.name, "Bob");
}

#[tokio::test]
#[serial]
async fn test_listing_filters_by_status() {
  let fx = fixture().await;
  let orders = service(&fx);
  let keep = orders
    .create(&fx.alice, Some(vec![line(&fx.pizza, 1, "10.00")]))
    .await
    .unwrap();
  let cancel = orders
    .create(&fx.alice, Some(vec![line(&fx.soup, 1, "5.50")]))
    .await
    .unwrap();
  orders
    .change_status(&fx.alice, cancel.id, OrderStatus::Cancelled)
    .await
    .unwrap();

  let pending = orders.list(&fx.alice, Some(OrderStatus::Pending)).await.unwrap();
  assert_eq!(pending.len(), 1);
  assert_eq!(pending[0].id, keep.id);

  let cancelled = orders.list(&fx.admin, Some(OrderStatus::Cancelled)).await.unwrap();
  assert_eq!(cancelled.len(), 1);
  assert_eq!(cancelled[0].id, cancel.id);
}

#[tokio::test]
#[serial]
async fn test_get_hides_other_users_orders() {
  let fx = fixture().await;
  let orders = service(&fx);
  let created = orders
    .create(&fx.alice, Some(vec![line(&fx.pizza, 1, "10.00")]))
    .await
    .unwrap();

  let fetched = orders.get(&fx.alice, created.id).await.unwrap();
  assert_eq!(fetched, created);
  assert!(orders.get(&fx.admin, created.id).await.is_ok());

  let err = orders.get(&fx.bob, created.id).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
  let err = orders.get(&fx.alice, Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
#[serial]
async fn test_admin_moves_order_through_lifecycle() {
  let fx = fixture().await;
  let orders = service(&fx);
  let created = orders
    .create(&fx.alice, Some(vec![line(&fx.pizza, 1, "10.00")]))
    .await
    .unwrap();

  let processing = orders
    .change_status(&fx.admin, created.id, OrderStatus::Processing)
    .await
    .unwrap();
  assert_eq!(processing.status, OrderStatus::Processing);
  assert!(processing.updated_at >= created.updated_at);
  assert_eq!(processing.total_amount, created.total_amount);

  let completed = orders
    .change_status(&fx.admin, created.id, OrderStatus::Completed)
    .await
    .unwrap();
  assert_eq!(completed.status, OrderStatus::Completed);

  let err = orders
    .change_status(&fx.admin, created.id, OrderStatus::Cancelled)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::InvalidTransition {
      from: OrderStatus::Completed,
      to: OrderStatus::Cancelled
    }
  ));
  let stored = fx.store.get_order(created.id).await.unwrap().unwrap();
  assert_eq!(stored.status, OrderStatus::Completed);
}

#[tokio::test]
#[serial]
async fn test_customer_may_only_cancel_own_pending_order() {
  let fx = fixture().await;
  let orders = service(&fx);
  let created = orders
    .create(&fx.alice, Some(vec![line(&fx.pizza, 1, "10.00")]))
    .await
    .unwrap();

  let err = orders
    .change_status(&fx.alice, created.id, OrderStatus::Processing)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));

  let err = orders
    .change_status(&fx.bob, created.id, OrderStatus::Cancelled)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));

  let cancelled = orders
    .change_status(&fx.alice, created.id, OrderStatus::Cancelled)
    .await
    .unwrap();
  assert_eq!(cancelled.status, OrderStatus::Cancelled);

  let other = orders
    .create(&fx.alice, Some(vec![line(&fx.soup, 1, "5.50")]))
    .await
    .unwrap();
  orders
    .change_status(&fx.admin, other.id, OrderStatus::Processing)
    .await
    .unwrap();
  let err = orders
    .change_status(&fx.alice, other.id, OrderStatus::Cancelled)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
#[serial]
async fn test_stale_status_write_is_a_conflict() {
  let fx = fixture().await;
  let orders = service(&fx);
  let created = orders
    .create(&fx.alice, Some(vec![line(&fx.pizza, 1, "10.00")]))
    .await
    .unwrap();

  let changed = fx
    .store
    .update_order_status(created.id, OrderStatus::Processing, OrderStatus::Completed, chrono::Utc::now())
    .await
    .unwrap();
  assert!(!changed);
  let stored = fx.store.get_order(created.id).await.unwrap().unwrap();
  assert_eq!(stored.status, OrderStatus::Pending);
}

#[tokio::test]
#[serial]
async fn test_store_failures_surface_as_database_errors() {
  let fx = fixture().await;
  let orders = service(&fx);
  fx.store.set_unavailable(true);

  let err = orders.list(&fx.admin, None).await.unwrap_err();
  assert!(err.is_store_failure());

  let err = orders
    .create(&fx.alice, Some(vec![line(&fx.pizza, 1, "10.00")]))
    .await
    .unwrap_err();
  assert!(err.is_store_failure());

  fx.store.set_unavailable(false);
  assert!(orders.list(&fx.admin, None).await.unwrap().is_empty());
}
