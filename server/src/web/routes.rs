// trattoria_server/src/web/routes.rs

use actix_web::{error::InternalError, web, HttpResponse, ResponseError};
use serde_json::json;
use tracing::warn;

use crate::errors::AppError;
use crate::web::handlers::{menu_handlers, order_handlers, report_handlers};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Malformed bodies and query strings become 400s; unparsable path ids become 404s,
/// all in the same `{ "error": ... }` shape as other failures.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(|err, _req| {
      warn!(error = %err, "Rejected request body.");
      InternalError::from_response(
        err.to_string(),
        AppError::Validation("Invalid request body".to_string()).error_response(),
      )
      .into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
      warn!(error = %err, "Rejected query string.");
      InternalError::from_response(
        err.to_string(),
        AppError::Validation(format!("Invalid query: {}", err)).error_response(),
      )
      .into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
      InternalError::from_response(
        err.to_string(),
        AppError::NotFound("Resource not found".to_string()).error_response(),
      )
      .into()
    }));
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  extractor_configs(cfg);
  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/orders")
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("", web::post().to(order_handlers::create_order_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route(
            "/{order_id}/status",
            web::patch().to(order_handlers::update_order_status_handler),
          ),
      )
      .service(
        web::scope("/menu")
          .route("", web::get().to(menu_handlers::list_menu_handler))
          .route("", web::post().to(menu_handlers::create_menu_item_handler))
          .route("/{menu_item_id}", web::get().to(menu_handlers::get_menu_item_handler))
          .route("/{menu_item_id}", web::put().to(menu_handlers::update_menu_item_handler))
          .route("/{menu_item_id}", web::delete().to(menu_handlers::delete_menu_item_handler)),
      )
      .route("/reports/stats", web::get().to(report_handlers::stats_handler)),
  );
}
