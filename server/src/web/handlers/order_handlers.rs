// trattoria_server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};
use trattoria::{LineItemInput, OrderStatus};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

const INVALID_ITEMS: &str = "Invalid order items";

#[derive(Deserialize, Debug)]
pub struct ListOrdersQuery {
  pub status: Option<String>,
}

/// `items` stays untyped so that a missing, non-list, or malformed value is
/// reported as one validation error instead of a generic body error.
#[derive(Deserialize, Debug)]
pub struct CreateOrderPayload {
  #[serde(default)]
  pub items: Option<Value>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateStatusPayload {
  pub status: String,
}

fn parse_status(raw: &str) -> Result<OrderStatus, AppError> {
  raw.parse::<OrderStatus>().map_err(AppError::from)
}

fn parse_items(items: Option<Value>) -> Result<Option<Vec<LineItemInput>>, AppError> {
  match items {
    None | Some(Value::Null) => Ok(None),
    Some(value @ Value::Array(_)) => serde_json::from_value(value)
      .map(Some)
      .map_err(|_| AppError::Validation(INVALID_ITEMS.to_string())),
    Some(_) => Err(AppError::Validation(INVALID_ITEMS.to_string())),
  }
}

#[instrument(name = "handler::list_orders", skip(app_state, auth_user), fields(user_id = %auth_user.id))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  query: web::Query<ListOrdersQuery>,
) -> Result<HttpResponse, AppError> {
  let status = query.status.as_deref().map(parse_status).transpose()?;
  let orders = app_state
    .orders
    .list(&auth_user, status)
    .await
    .map_err(|e| AppError::from_domain(e, "Failed to fetch orders"))?;
  info!(count = orders.len(), "Orders listed.");
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(name = "handler::create_order", skip(app_state, auth_user, payload), fields(user_id = %auth_user.id))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<CreateOrderPayload>,
) -> Result<HttpResponse, AppError> {
  let items = parse_items(payload.into_inner().items)?;
  let order = app_state
    .orders
    .create(&auth_user, items)
    .await
    .map_err(|e| AppError::from_domain(e, "Failed to create order"))?;
  info!(order_id = %order.id, total = %order.total_amount, "Order placed.");
  Ok(HttpResponse::Created().json(order))
}

#[instrument(name = "handler::get_order", skip(app_state, auth_user, path), fields(user_id = %auth_user.id))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .orders
    .get(&auth_user, path.into_inner())
    .await
    .map_err(|e| AppError::from_domain(e, "Failed to fetch order"))?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::update_order_status", skip(app_state, auth_user, path, payload), fields(user_id = %auth_user.id))]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateStatusPayload>,
) -> Result<HttpResponse, AppError> {
  let next = parse_status(&payload.status)?;
  let order = app_state
    .orders
    .change_status(&auth_user, path.into_inner(), next)
    .await
    .map_err(|e| AppError::from_domain(e, "Failed to update order status"))?;
  Ok(HttpResponse::Ok().json(order))
}
