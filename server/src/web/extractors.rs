// trattoria_server/src/web/extractors.rs

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::warn;
use trattoria::User;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

/// Header carrying the id of the user authenticated by the upstream session layer.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// The caller, resolved from `X-User-Id` against the user store.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl std::ops::Deref for AuthenticatedUser {
  type Target = User;

  fn deref(&self) -> &User {
    &self.0
  }
}

fn header_user_id(req: &HttpRequest) -> Option<Uuid> {
  req
    .headers()
    .get(USER_ID_HEADER)
    .and_then(|value| value.to_str().ok())
    .and_then(|value| Uuid::parse_str(value.trim()).ok())
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let user_id = header_user_id(req);
    let state = req.app_data::<web::Data<AppState>>().cloned();

    Box::pin(async move {
      let state = state.ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;
      let Some(user_id) = user_id else {
        warn!("Missing or invalid {} header.", USER_ID_HEADER);
        return Err(AppError::Auth("Unauthorized".to_string()));
      };

      match state.store.get_user(user_id).await {
        Ok(Some(user)) => Ok(AuthenticatedUser(user)),
        Ok(None) => {
          warn!(%user_id, "Unknown user in {} header.", USER_ID_HEADER);
          Err(AppError::Auth("Unauthorized".to_string()))
        }
        Err(e) => Err(AppError::from_domain(e, "Failed to resolve the current user")),
      }
    })
  }
}
