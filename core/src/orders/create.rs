// trattoria/src/orders/create.rs

//! The order-creation workflow.
//!
//! Steps, in order:
//! 1. `validate_items`: shape of the submitted line items.
//! 2. `resolve_menu_items`: batched catalog lookup; unknown or unavailable items are rejected.
//! 3. `check_catalog_prices`: only when a `PricePolicy` tolerance is configured.
//! 4. `compute_total`: `sum(price * quantity)` from the submitted prices.
//! 5. `persist_order`: single atomic insert, status `pending`.
//! 6. `populate_order`: resolves references for the response.

use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::populate;
use crate::error::{Error, Result, WorkflowError};
use crate::models::{MenuItem, Order, OrderLine, OrderView, User};
use crate::pricing::{self, LineItemInput, PricePolicy};
use crate::store::Store;
use crate::workflow::pipeline::skip_when;
use crate::workflow::{ContextData, Pipeline, PipelineControl};

/// Shared state of one order-creation run.
pub struct CreateOrderCtx {
  pub store: Arc<dyn Store>,
  pub caller: User,
  pub price_policy: PricePolicy,
  pub submitted: Option<Vec<LineItemInput>>,
  pub lines: Vec<OrderLine>,
  pub catalog: HashMap<Uuid, MenuItem>,
  pub total_amount: Decimal,
  pub order: Option<Order>,
  pub view: Option<OrderView>,
}

impl CreateOrderCtx {
  pub fn new(
    store: Arc<dyn Store>,
    caller: User,
    price_policy: PricePolicy,
    submitted: Option<Vec<LineItemInput>>,
  ) -> Self {
    Self {
      store,
      caller,
      price_policy,
      submitted,
      lines: Vec::new(),
      catalog: HashMap::new(),
      total_amount: Decimal::ZERO,
      order: None,
      view: None,
    }
  }
}

pub fn create_order_pipeline() -> Result<Pipeline<CreateOrderCtx, Error>, WorkflowError> {
  let mut p = Pipeline::<CreateOrderCtx, Error>::new(&[
    ("validate_items", false, None),
    ("resolve_menu_items", false, None),
    (
      "check_catalog_prices",
      false,
      Some(skip_when(|ctx: &CreateOrderCtx| !ctx.price_policy.checks_catalog())),
    ),
    ("compute_total", false, None),
    ("persist_order", false, None),
    ("populate_order", false, None),
  ]);

  p.on_root("validate_items", validate_items)?;
  p.on_root("resolve_menu_items", resolve_menu_items)?;
  p.on_root("check_catalog_prices", check_catalog_prices)?;
  p.on_root("compute_total", compute_total)?;
  p.on_root("persist_order", persist_order)?;
  p.on_root("populate_order", populate_order)?;
  Ok(p)
}

async fn validate_items(ctx: ContextData<CreateOrderCtx>) -> Result<PipelineControl> {
  let submitted = ctx.take(|c| &mut c.submitted);
  let lines = pricing::validate_line_items(submitted.as_deref())?;
  debug!(lines = lines.len(), "Line items validated.");
  ctx.write().lines = lines;
  Ok(PipelineControl::Continue)
}

async fn resolve_menu_items(ctx: ContextData<CreateOrderCtx>) -> Result<PipelineControl> {
  let (store, ids) = {
    let guard = ctx.read();
    let ids: HashSet<Uuid> = guard.lines.iter().map(|l| l.menu_item_id).collect();
    (guard.store.clone(), ids.into_iter().collect::<Vec<_>>())
  };

  let catalog: HashMap<Uuid, MenuItem> = store
    .menu_items_by_ids(&ids)
    .await?
    .into_iter()
    .map(|item| (item.id, item))
    .collect();

  let mut guard = ctx.write();
  pricing::ensure_items_known(&guard.lines, &catalog)?;
  if let Some(item) = catalog.values().find(|item| !item.available) {
    warn!(menu_item_id = %item.id, "Order references an unavailable menu item.");
    return Err(Error::Validation(format!("'{}' is not available right now.", item.name)));
  }
  guard.catalog = catalog;
  Ok(PipelineControl::Continue)
}

async fn check_catalog_prices(ctx: ContextData<CreateOrderCtx>) -> Result<PipelineControl> {
  let guard = ctx.read();
  for line in &guard.lines {
    let item = guard
      .catalog
      .get(&line.menu_item_id)
      .ok_or_else(|| Error::Validation(format!("Unknown menu item {}.", line.menu_item_id)))?;
    guard.price_policy.check_line(line, item)?;
  }
  debug!("Submitted prices are within tolerance.");
  Ok(PipelineControl::Continue)
}

async fn compute_total(ctx: ContextData<CreateOrderCtx>) -> Result<PipelineControl> {
  let total = pricing::order_total(&ctx.read().lines)?;
  debug!(%total, "Order total computed.");
  ctx.write().total_amount = total;
  Ok(PipelineControl::Continue)
}

async fn persist_order(ctx: ContextData<CreateOrderCtx>) -> Result<PipelineControl> {
  let (store, order) = {
    let guard = ctx.read();
    let order = Order::new_pending(guard.caller.id, guard.lines.clone(), guard.total_amount);
    (guard.store.clone(), order)
  };

  store.insert_order(&order).await?;
  info!(order_id = %order.id, total = %order.total_amount, "Order created.");
  ctx.write().order = Some(order);
  Ok(PipelineControl::Continue)
}

async fn populate_order(ctx: ContextData<CreateOrderCtx>) -> Result<PipelineControl> {
  let mut guard = ctx.write();
  let order = guard.order.clone().ok_or_else(|| WorkflowError::MissingOutput {
    output: "order".to_string(),
  })?;
  let users = HashMap::from([(guard.caller.id, guard.caller.clone())]);
  let view = populate::order_view(order, &users, &guard.catalog)?;
  guard.view = Some(view);
  Ok(PipelineControl::Continue)
}
