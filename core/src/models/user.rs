// trattoria/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Customer,
}

/// An identity known to the service. Sessions live outside of it; only the
/// role matters for authorization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: Uuid,
  pub name: String,
  pub email: String,
  pub role: Role,
  pub created_at: DateTime<Utc>,
}

impl User {
  pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
    Self {
      id: Uuid::new_v4(),
      name: name.into(),
      email: email.into(),
      role,
      created_at: super::now(),
    }
  }

  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }

  pub fn summary(&self) -> UserSummary {
    UserSummary {
      id: self.id,
      name: self.name.clone(),
      email: self.email.clone(),
    }
  }
}

/// The part of a user embedded in populated orders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
  pub id: Uuid,
  pub name: String,
  pub email: String,
}
