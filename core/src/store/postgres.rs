// trattoria/src/store/postgres.rs

//! PostgreSQL store (runtime-checked sqlx queries).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::{OrderFilter, Store};
use crate::error::{Error, Result};
use crate::models::{MenuItem, Order, OrderLine, OrderStatus, User};

const USER_COLUMNS: &str = "id, name, email, role, created_at";
const MENU_ITEM_COLUMNS: &str = "id, name, description, price, image, available, created_at, updated_at";

#[derive(Debug, FromRow)]
struct OrderRow {
  id: Uuid,
  user_id: Uuid,
  total_amount: Decimal,
  status: OrderStatus,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct OrderLineRow {
  order_id: Uuid,
  menu_item_id: Uuid,
  quantity: i32,
  price: Decimal,
}

#[derive(Debug, Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Applies the migrations embedded from `core/migrations`.
  #[instrument(name = "pg_store::run_migrations", skip(self))]
  pub async fn run_migrations(&self) -> Result<()> {
    sqlx::migrate!("./migrations").run(&self.pool).await.map_err(|e| {
      error!(error = %e, "Database migration failed.");
      Error::Database(e.into())
    })?;
    info!("Database migrations applied.");
    Ok(())
  }

  /// Loads the lines of `rows` and assembles full orders, keeping the row order.
  async fn attach_lines(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>> {
    if rows.is_empty() {
      return Ok(Vec::new());
    }
    let order_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let line_rows: Vec<OrderLineRow> = sqlx::query_as(
      "SELECT order_id, menu_item_id, quantity, price FROM order_items WHERE order_id = ANY($1) ORDER BY order_id, position",
    )
    .bind(&order_ids)
    .fetch_all(&self.pool)
    .await?;

    let mut lines_by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
    for line in line_rows {
      lines_by_order.entry(line.order_id).or_default().push(OrderLine {
        menu_item_id: line.menu_item_id,
        quantity: line.quantity,
        price: line.price,
      });
    }

    Ok(
      rows
        .into_iter()
        .map(|row| Order {
          items: lines_by_order.remove(&row.id).unwrap_or_default(),
          id: row.id,
          user_id: row.user_id,
          total_amount: row.total_amount,
          status: row.status,
          created_at: row.created_at,
          updated_at: row.updated_at,
        })
        .collect(),
    )
  }
}

fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
  matches!(e, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
  matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[async_trait]
impl Store for PgStore {
  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>> {
    let users = sqlx::query_as(&format!("SELECT {} FROM users WHERE id = ANY($1)", USER_COLUMNS))
      .bind(ids)
      .fetch_all(&self.pool)
      .await?;
    Ok(users)
  }

  #[instrument(name = "pg_store::insert_user", skip(self, user), fields(user_id = %user.id))]
  async fn insert_user(&self, user: &User) -> Result<()> {
    sqlx::query("INSERT INTO users (id, name, email, role, created_at) VALUES ($1, $2, $3, $4, $5)")
      .bind(user.id)
      .bind(&user.name)
      .bind(&user.email)
      .bind(user.role)
      .bind(user.created_at)
      .execute(&self.pool)
      .await
      .map_err(|e| {
        if is_unique_violation(&e) {
          Error::Conflict(format!("User {} already exists.", user.email))
        } else {
          Error::Database(e)
        }
      })?;
    Ok(())
  }

  async fn list_menu_items(&self) -> Result<Vec<MenuItem>> {
    let items = sqlx::query_as(&format!(
      "SELECT {} FROM menu_items ORDER BY name ASC, id ASC",
      MENU_ITEM_COLUMNS
    ))
    .fetch_all(&self.pool)
    .await?;
    Ok(items)
  }

  async fn get_menu_item(&self, id: Uuid) -> Result<Option<MenuItem>> {
    let item = sqlx::query_as(&format!("SELECT {} FROM menu_items WHERE id = $1", MENU_ITEM_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(item)
  }

  async fn menu_items_by_ids(&self, ids: &[Uuid]) -> Result<Vec<MenuItem>> {
    let items = sqlx::query_as(&format!(
      "SELECT {} FROM menu_items WHERE id = ANY($1)",
      MENU_ITEM_COLUMNS
    ))
    .bind(ids)
    .fetch_all(&self.pool)
    .await?;
    Ok(items)
  }

  #[instrument(name = "pg_store::insert_menu_item", skip(self, item), fields(menu_item_id = %item.id))]
  async fn insert_menu_item(&self, item: &MenuItem) -> Result<()> {
    sqlx::query(
      "INSERT INTO menu_items (id, name, description, price, image, available, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(item.id)
    .bind(&item.name)
    .bind(&item.description)
    .bind(item.price)
    .bind(&item.image)
    .bind(item.available)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  #[instrument(name = "pg_store::update_menu_item", skip(self, item), fields(menu_item_id = %item.id))]
  async fn update_menu_item(&self, item: &MenuItem) -> Result<bool> {
    let result = sqlx::query(
      "UPDATE menu_items SET name = $2, description = $3, price = $4, image = $5, available = $6, updated_at = $7 \
       WHERE id = $1",
    )
    .bind(item.id)
    .bind(&item.name)
    .bind(&item.description)
    .bind(item.price)
    .bind(&item.image)
    .bind(item.available)
    .bind(item.updated_at)
    .execute(&self.pool)
    .await?;
    Ok(result.rows_affected() == 1)
  }

  #[instrument(name = "pg_store::delete_menu_item", skip(self))]
  async fn delete_menu_item(&self, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await
      .map_err(|e| {
        if is_foreign_key_violation(&e) {
          Error::Conflict(format!("Menu item {} is referenced by existing orders.", id))
        } else {
          Error::Database(e)
        }
      })?;
    Ok(result.rows_affected() == 1)
  }

  #[instrument(name = "pg_store::insert_order", skip(self, order), fields(order_id = %order.id, lines = order.items.len()))]
  async fn insert_order(&self, order: &Order) -> Result<()> {
    let mut tx = self.pool.begin().await?;

    sqlx::query(
      "INSERT INTO orders (id, user_id, total_amount, status, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(order.total_amount)
    .bind(order.status)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
      if is_foreign_key_violation(&e) {
        Error::Validation(format!("Unknown user {}.", order.user_id))
      } else {
        Error::Database(e)
      }
    })?;

    if !order.items.is_empty() {
      let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO order_items (order_id, position, menu_item_id, quantity, price) ");
      builder.push_values(order.items.iter().enumerate(), |mut row, (position, line)| {
        row
          .push_bind(order.id)
          .push_bind(position as i32)
          .push_bind(line.menu_item_id)
          .push_bind(line.quantity)
          .push_bind(line.price);
      });
      builder.build().execute(&mut *tx).await.map_err(|e| {
        if is_foreign_key_violation(&e) {
          Error::Validation("Order references an unknown menu item.".to_string())
        } else {
          Error::Database(e)
        }
      })?;
    }

    tx.commit().await?;
    info!("Order persisted.");
    Ok(())
  }

  async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
    let row: Option<OrderRow> = sqlx::query_as(
      "SELECT id, user_id, total_amount, status, created_at, updated_at FROM orders WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;
    match row {
      Some(row) => Ok(self.attach_lines(vec![row]).await?.pop()),
      None => Ok(None),
    }
  }

  #[instrument(name = "pg_store::list_orders", skip(self))]
  async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
    let mut builder: QueryBuilder<Postgres> =
      QueryBuilder::new("SELECT id, user_id, total_amount, status, created_at, updated_at FROM orders WHERE TRUE");
    if let Some(user_id) = filter.user_id {
      builder.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(status) = filter.status {
      builder.push(" AND status = ").push_bind(status);
    }
    if let Some(from) = filter.created_from {
      builder.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(before) = filter.created_before {
      builder.push(" AND created_at < ").push_bind(before);
    }
    builder.push(" ORDER BY created_at DESC, id DESC");

    let rows: Vec<OrderRow> = builder.build_query_as().fetch_all(&self.pool).await?;
    self.attach_lines(rows).await
  }

  #[instrument(name = "pg_store::update_order_status", skip(self))]
  async fn update_order_status(
    &self,
    id: Uuid,
    from: OrderStatus,
    to: OrderStatus,
    at: DateTime<Utc>,
  ) -> Result<bool> {
    let result = sqlx::query("UPDATE orders SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4")
      .bind(to)
      .bind(at)
      .bind(id)
      .bind(from)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() == 1)
  }

  async fn close(&self) {
    info!("Closing database pool.");
    self.pool.close().await;
  }
}
