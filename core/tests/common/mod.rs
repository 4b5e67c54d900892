// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::Level;
use trattoria::{
  ContextData, LineItemInput, MemoryStore, MenuItem, MenuItemInput, PipelineControl, Role, Store, User, WorkflowError,
};

// --- Tracing setup (once per test binary) ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn dec(s: &str) -> Decimal {
  s.parse().expect("valid decimal literal")
}

// --- Workflow test context and error ---
#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub steps_executed: Vec<String>,
  pub should_stop_at: Option<String>,
  pub skip_optional: bool,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Workflow framework error: {0}")]
  Workflow(String),

  #[error("Test handler failed: {0}")]
  Handler(String),
}

impl From<WorkflowError> for TestError {
  fn from(e: WorkflowError) -> Self {
    TestError::Workflow(format!("{:?}", e))
  }
}

pub type TestFuture = Pin<Box<dyn Future<Output = Result<PipelineControl, TestError>> + Send>>;

/// Counts and records every call; stops the pipeline at `should_stop_at`.
pub fn recording_handler(
  step_name: &'static str,
) -> impl Fn(ContextData<TestContext>) -> TestFuture + Send + Sync + 'static {
  move |ctx: ContextData<TestContext>| -> TestFuture {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.steps_executed.push(step_name.to_string());
      if guard.should_stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  }
}

pub fn failing_handler(
  step_name: &'static str,
  message: &'static str,
) -> impl Fn(ContextData<TestContext>) -> TestFuture + Send + Sync + 'static {
  move |ctx: ContextData<TestContext>| -> TestFuture {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Err(TestError::Handler(message.to_string()))
    })
  }
}

// --- Store fixture ---
pub struct Fixture {
  pub store: Arc<MemoryStore>,
  pub admin: User,
  pub alice: User,
  pub bob: User,
  pub pizza: MenuItem,
  pub soup: MenuItem,
  pub tiramisu: MenuItem,
}

impl Fixture {
  pub fn store(&self) -> Arc<dyn Store> {
    self.store.clone()
  }
}

fn menu_item(name: &str, price: &str, available: bool) -> MenuItem {
  MenuItem::from_input(MenuItemInput {
    name: name.to_string(),
    description: format!("House {}", name.to_lowercase()),
    price: dec(price),
    image: None,
    available,
  })
  .expect("valid menu item")
}

pub async fn fixture() -> Fixture {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());

  let admin = User::new("Ada Admin", "ada@trattoria.test", Role::Admin);
  let alice = User::new("Alice", "alice@trattoria.test", Role::Customer);
  let bob = User::new("Bob", "bob@trattoria.test", Role::Customer);
  for user in [&admin, &alice, &bob] {
    store.insert_user(user).await.expect("insert user");
  }

  let pizza = menu_item("Pizza", "10.00", true);
  let soup = menu_item("Soup", "5.50", true);
  let tiramisu = menu_item("Tiramisu", "6.00", false);
  for item in [&pizza, &soup, &tiramisu] {
    store.insert_menu_item(item).await.expect("insert menu item");
  }

  Fixture {
    store,
    admin,
    alice,
    bob,
    pizza,
    soup,
    tiramisu,
  }
}

pub fn line(item: &MenuItem, quantity: i64, price: &str) -> LineItemInput {
  LineItemInput {
    menu_item: item.id.to_string(),
    quantity,
    price: dec(price),
  }
}
