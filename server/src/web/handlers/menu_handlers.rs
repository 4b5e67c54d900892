// trattoria_server/src/web/handlers/menu_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;
use trattoria::MenuItemInput;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

const STORE_FAILURE: &str = "Failed to access the menu";

#[instrument(name = "handler::list_menu", skip(app_state, _auth_user))]
pub async fn list_menu_handler(
  app_state: web::Data<AppState>,
  _auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let items = app_state
    .menu
    .list()
    .await
    .map_err(|e| AppError::from_domain(e, STORE_FAILURE))?;
  Ok(HttpResponse::Ok().json(items))
}

#[instrument(name = "handler::get_menu_item", skip(app_state, _auth_user, path), fields(menu_item_id = %path.as_ref()))]
pub async fn get_menu_item_handler(
  app_state: web::Data<AppState>,
  _auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let item = app_state
    .menu
    .get(path.into_inner())
    .await
    .map_err(|e| AppError::from_domain(e, STORE_FAILURE))?;
  Ok(HttpResponse::Ok().json(item))
}

#[instrument(name = "handler::create_menu_item", skip(app_state, auth_user, payload), fields(user_id = %auth_user.id))]
pub async fn create_menu_item_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<MenuItemInput>,
) -> Result<HttpResponse, AppError> {
  let item = app_state
    .menu
    .create(&auth_user, payload.into_inner())
    .await
    .map_err(|e| AppError::from_domain(e, STORE_FAILURE))?;
  Ok(HttpResponse::Created().json(item))
}

#[instrument(name = "handler::update_menu_item", skip(app_state, auth_user, path, payload), fields(user_id = %auth_user.id))]
pub async fn update_menu_item_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<MenuItemInput>,
) -> Result<HttpResponse, AppError> {
  let item = app_state
    .menu
    .update(&auth_user, path.into_inner(), payload.into_inner())
    .await
    .map_err(|e| AppError::from_domain(e, STORE_FAILURE))?;
  Ok(HttpResponse::Ok().json(item))
}

#[instrument(name = "handler::delete_menu_item", skip(app_state, auth_user, path), fields(user_id = %auth_user.id))]
pub async fn delete_menu_item_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state
    .menu
    .delete(&auth_user, path.into_inner())
    .await
    .map_err(|e| AppError::from_domain(e, STORE_FAILURE))?;
  Ok(HttpResponse::NoContent().finish())
}
