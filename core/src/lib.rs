// trattoria/src/lib.rs

//! Trattoria: domain logic for a restaurant ordering service.
//!
//! The crate covers the parts of the service that carry business rules:
//!  - Order creation as a step workflow (validation, catalog lookup, optional
//!    price checks, total computation, persistence, reference population).
//!  - The order status lifecycle with an explicit transition table.
//!  - Visibility and permission predicates evaluated before any query is built.
//!  - Sales report aggregation (daily revenue, status counts, popular items).
//!  - A `Store` trait with PostgreSQL and in-memory implementations.
//!
//! HTTP, configuration, and process lifecycle live in the `trattoria_server` crate.

pub mod access;
pub mod error;
pub mod menu;
pub mod models;
pub mod orders;
pub mod pricing;
pub mod reports;
pub mod store;
pub mod workflow;

// --- Re-exports for the Public API ---

pub use crate::error::{Error, Result, WorkflowError};

pub use crate::models::{
  MenuItem, MenuItemInput, Order, OrderLine, OrderLineView, OrderStatus, OrderView, Role, User, UserSummary,
};

pub use crate::access::OrderScope;
pub use crate::menu::MenuService;
pub use crate::orders::OrderService;
pub use crate::pricing::{LineItemInput, PricePolicy};
pub use crate::reports::{ReportRange, ReportService, SalesReport};
pub use crate::store::{memory::MemoryStore, postgres::PgStore, OrderFilter, Store};
pub use crate::workflow::{ContextData, Handler, Pipeline, PipelineControl, PipelineResult, StepDef};
