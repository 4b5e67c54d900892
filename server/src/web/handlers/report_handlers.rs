// trattoria_server/src/web/handlers/report_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;
use trattoria::ReportRange;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

/// `from` and `to` are inclusive `YYYY-MM-DD` UTC days.
#[derive(Deserialize, Debug)]
pub struct StatsQuery {
  pub from: Option<NaiveDate>,
  pub to: Option<NaiveDate>,
  pub limit: Option<usize>,
}

#[instrument(name = "handler::report_stats", skip(app_state, auth_user), fields(user_id = %auth_user.id))]
pub async fn stats_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  query: web::Query<StatsQuery>,
) -> Result<HttpResponse, AppError> {
  let StatsQuery { from, to, limit } = query.into_inner();
  let range = ReportRange::new(from, to)?;
  let report = app_state
    .reports
    .stats(&auth_user, range, limit)
    .await
    .map_err(|e| AppError::from_domain(e, "Failed to compute sales report"))?;
  Ok(HttpResponse::Ok().json(report))
}
