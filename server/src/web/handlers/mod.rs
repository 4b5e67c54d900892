// trattoria_server/src/web/handlers/mod.rs

pub mod menu_handlers;
pub mod order_handlers;
pub mod report_handlers;
