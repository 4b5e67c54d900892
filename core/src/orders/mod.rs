// trattoria/src/orders/mod.rs

//! Order service: creation, scoped listing, lookup, and status changes.

pub mod create;
pub mod populate;

use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::access::{self, OrderScope};
use crate::error::{Error, Result, WorkflowError};
use crate::models::{self, Order, OrderStatus, OrderView, User};
use crate::pricing::{LineItemInput, PricePolicy};
use crate::store::{OrderFilter, Store};
use crate::workflow::{ContextData, Pipeline, PipelineResult};
use create::{create_order_pipeline, CreateOrderCtx};

pub struct OrderService {
  store: Arc<dyn Store>,
  price_policy: PricePolicy,
  create_pipeline: Pipeline<CreateOrderCtx, Error>,
}

impl OrderService {
  pub fn new(store: Arc<dyn Store>, price_policy: PricePolicy) -> Result<Self> {
    Ok(Self {
      store,
      price_policy,
      create_pipeline: create_order_pipeline()?,
    })
  }

  /// Creates a pending order owned by `caller`. `items == None` means the field was absent.
  #[instrument(name = "order_service::create", skip(self, caller, items), fields(user_id = %caller.id))]
  pub async fn create(&self, caller: &User, items: Option<Vec<LineItemInput>>) -> Result<OrderView> {
    let ctx = ContextData::new(CreateOrderCtx::new(
      self.store.clone(),
      caller.clone(),
      self.price_policy,
      items,
    ));

    match self.create_pipeline.run(ctx.clone()).await? {
      PipelineResult::Completed => ctx.take(|c| &mut c.view).ok_or_else(|| {
        Error::from(WorkflowError::MissingOutput {
          output: "order view".to_string(),
        })
      }),
      PipelineResult::Stopped => {
        warn!("Order creation workflow stopped before completion.");
        Err(Error::from(WorkflowError::MissingOutput {
          output: "order".to_string(),
        }))
      }
    }
  }

  /// Orders visible to `caller`, newest first.
  #[instrument(name = "order_service::list", skip(self, caller), fields(user_id = %caller.id, admin = caller.is_admin()))]
  pub async fn list(&self, caller: &User, status: Option<OrderStatus>) -> Result<Vec<OrderView>> {
    let scope = OrderScope::for_user(caller);
    let filter = OrderFilter::for_scope(&scope).with_status(status);
    let mut orders = self.store.list_orders(&filter).await?;
    orders.retain(|order| scope.permits(order));
    info!(count = orders.len(), "Orders fetched.");
    populate::populate_orders(self.store.as_ref(), orders).await
  }

  #[instrument(name = "order_service::get", skip(self, caller), fields(user_id = %caller.id))]
  pub async fn get(&self, caller: &User, order_id: Uuid) -> Result<OrderView> {
    let order = self.load_visible(caller, order_id).await?;
    self.populate_one(order).await
  }

  /// Moves an order to `next`, enforcing permissions and the transition table.
  #[instrument(name = "order_service::change_status", skip(self, caller), fields(user_id = %caller.id))]
  pub async fn change_status(&self, caller: &User, order_id: Uuid, next: OrderStatus) -> Result<OrderView> {
    let order = self.load_visible(caller, order_id).await?;
    access::authorize_status_change(caller, &order, next)?;
    let next = order.status.transition_to(next)?;

    let changed = self
      .store
      .update_order_status(order_id, order.status, next, models::now())
      .await?;
    if !changed {
      warn!(from = %order.status, to = %next, "Order status changed concurrently.");
      return Err(Error::Conflict(
        "The order was modified by another request; reload it and try again.".to_string(),
      ));
    }
    info!(from = %order.status, to = %next, "Order status changed.");

    let updated = self
      .store
      .get_order(order_id)
      .await?
      .ok_or_else(|| Error::NotFound(format!("Order {} not found.", order_id)))?;
    self.populate_one(updated).await
  }

  /// Loads an order, reporting orders outside the caller's scope as missing.
  async fn load_visible(&self, caller: &User, order_id: Uuid) -> Result<Order> {
    let scope = OrderScope::for_user(caller);
    match self.store.get_order(order_id).await? {
      Some(order) if scope.permits(&order) => Ok(order),
      _ => Err(Error::NotFound(format!("Order {} not found.", order_id))),
    }
  }

  async fn populate_one(&self, order: Order) -> Result<OrderView> {
    populate::populate_orders(self.store.as_ref(), vec![order])
      .await?
      .pop()
      .ok_or_else(|| Error::NotFound("Order could not be populated.".to_string()))
  }
}
